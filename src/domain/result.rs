//! Result type alias for flyerpress
//!
//! This module provides a convenient Result type alias that uses FlyerError
//! as the error type.

use super::errors::FlyerError;

/// Result type alias for flyerpress operations
///
/// # Examples
///
/// ```
/// use flyerpress::domain::result::Result;
/// use flyerpress::domain::errors::FlyerError;
///
/// fn example_function() -> Result<String> {
///     Ok("success".to_string())
/// }
///
/// fn failing_function() -> Result<()> {
///     Err(FlyerError::Document("no root element".to_string()))
/// }
/// ```
pub type Result<T> = std::result::Result<T, FlyerError>;
