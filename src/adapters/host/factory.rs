//! Host capability factory
//!
//! This module builds the local host capabilities from configuration.

use crate::adapters::filesystem::{
    FixedDirectoryPicker, FsDownloader, PromptDirectoryPicker, UnsupportedDirectoryPicker,
};
use crate::adapters::host::{DirectoryPicker, HostCapabilities};
use crate::adapters::rasterizer::ResvgRasterizer;
use crate::config::schema::{DirectoryMode, FlyerConfig};
use crate::core::capture::FontLibrary;
use crate::domain::errors::FlyerError;
use crate::domain::Result;
use std::sync::Arc;

/// Create host capabilities based on the configuration
///
/// This factory function examines `destination.directory_mode` to choose the
/// directory picker, and wires the filesystem download trigger, the export
/// font library and the `resvg` rasterizer.
///
/// # Errors
///
/// Returns an error if `directory_mode = "fixed"` has no directory
pub fn create_host(config: &FlyerConfig) -> Result<HostCapabilities> {
    let picker: Arc<dyn DirectoryPicker> = match config.destination.directory_mode {
        DirectoryMode::Prompt => {
            tracing::debug!("Using terminal directory prompt");
            Arc::new(PromptDirectoryPicker::new(
                config.destination.directory.clone(),
            ))
        }
        DirectoryMode::Fixed => {
            let directory = config.destination.directory.clone().ok_or_else(|| {
                FlyerError::Configuration(
                    "destination.directory is required when directory_mode = 'fixed'"
                        .to_string(),
                )
            })?;
            tracing::debug!(directory = %directory.display(), "Using fixed output directory");
            Arc::new(FixedDirectoryPicker::new(directory))
        }
        DirectoryMode::Disabled => {
            tracing::debug!("Directory selection disabled, batches will be archived");
            Arc::new(UnsupportedDirectoryPicker)
        }
    };

    Ok(HostCapabilities::new(
        picker,
        Arc::new(FsDownloader::new(config.destination.downloads_dir.clone())),
        Arc::new(FontLibrary::new(config.fonts.files.clone())),
        Arc::new(ResvgRasterizer::new(config.fonts.load_system_fonts)),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_disabled_mode_has_no_directory_picker() {
        let mut config = FlyerConfig::default();
        config.destination.directory_mode = DirectoryMode::Disabled;

        let host = create_host(&config).unwrap();
        assert!(!host.picker.is_supported());
    }

    #[test]
    fn test_fixed_mode_requires_directory() {
        let mut config = FlyerConfig::default();
        config.destination.directory_mode = DirectoryMode::Fixed;
        assert!(create_host(&config).is_err());

        config.destination.directory = Some(PathBuf::from("./out"));
        let host = create_host(&config).unwrap();
        assert!(host.picker.is_supported());
    }
}
