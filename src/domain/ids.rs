//! Domain identifier types with validation
//!
//! Newtype wrappers for page numbers and export job identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::NonZeroUsize;
use std::str::FromStr;
use uuid::Uuid;

/// 1-based page number of a logical flyer page
///
/// Page numbers follow document order and appear in artifact names
/// (`flyer-2.jpg`).
///
/// # Examples
///
/// ```
/// use flyerpress::domain::ids::PageNumber;
/// use std::str::FromStr;
///
/// let page = PageNumber::from_str("2").unwrap();
/// assert_eq!(page.get(), 2);
/// assert!(PageNumber::new(0).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PageNumber(NonZeroUsize);

impl PageNumber {
    /// First page
    pub const FIRST: PageNumber = PageNumber(NonZeroUsize::MIN);

    /// Creates a page number, rejecting zero
    pub fn new(number: usize) -> Result<Self, String> {
        NonZeroUsize::new(number)
            .map(Self)
            .ok_or_else(|| "Page numbers start at 1".to_string())
    }

    /// Page number for the element at `index` of a 0-based sequence
    pub fn from_index(index: usize) -> Self {
        Self(NonZeroUsize::MIN.saturating_add(index))
    }

    /// Returns the page number as an integer
    pub fn get(self) -> usize {
        self.0.get()
    }

    /// Returns the 0-based index of this page
    pub fn index(self) -> usize {
        self.0.get() - 1
    }
}

impl fmt::Display for PageNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for PageNumber {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let number: usize = s
            .trim()
            .parse()
            .map_err(|_| format!("Invalid page number: {s}"))?;
        Self::new(number)
    }
}

/// Identifier of one export request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobId(Uuid);

impl JobId {
    /// Generates a fresh random job id
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the underlying UUID
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::generate()
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_number_rejects_zero() {
        assert!(PageNumber::new(0).is_err());
        assert!(PageNumber::from_str("0").is_err());
        assert!(PageNumber::from_str("two").is_err());
    }

    #[test]
    fn test_page_number_from_index() {
        assert_eq!(PageNumber::from_index(0), PageNumber::FIRST);
        assert_eq!(PageNumber::from_index(4).get(), 5);
        assert_eq!(PageNumber::from_index(4).index(), 4);
    }

    #[test]
    fn test_page_number_display_and_order() {
        let two = PageNumber::new(2).unwrap();
        let ten = PageNumber::new(10).unwrap();
        assert_eq!(two.to_string(), "2");
        assert!(two < ten);
    }

    #[test]
    fn test_job_ids_are_unique() {
        assert_ne!(JobId::generate(), JobId::generate());
    }
}
