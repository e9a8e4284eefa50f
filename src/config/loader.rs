//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::{DirectoryMode, FlyerConfig};
use crate::domain::errors::FlyerError;
use crate::domain::result::Result;
use regex::Regex;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into FlyerConfig
/// 4. Applies environment variable overrides (FLYERPRESS_* prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns an error if:
/// - File cannot be read
/// - TOML parsing fails
/// - Environment variable substitution fails
/// - Configuration validation fails
///
/// # Examples
///
/// ```no_run
/// use flyerpress::config::loader::load_config;
///
/// let config = load_config("flyerpress.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<FlyerConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(FlyerError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        FlyerError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    let contents = substitute_env_vars(&contents)?;

    let mut config: FlyerConfig = toml::from_str(&contents)
        .map_err(|e| FlyerError::Configuration(format!("Failed to parse TOML: {}", e)))?;

    apply_env_overrides(&mut config)?;

    config.validate().map_err(|e| {
        FlyerError::Configuration(format!("Configuration validation failed: {}", e))
    })?;

    Ok(config)
}

/// Loads `path` when given, otherwise the defaults with environment overrides
///
/// # Errors
///
/// Returns an error if the given file cannot be loaded, or if the resulting
/// configuration is invalid.
pub fn load_config_or_default(path: Option<&Path>) -> Result<FlyerConfig> {
    if let Some(path) = path {
        return load_config(path);
    }

    let mut config = FlyerConfig::default();
    apply_env_overrides(&mut config)?;
    config.validate().map_err(|e| {
        FlyerError::Configuration(format!("Configuration validation failed: {}", e))
    })?;
    Ok(config)
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// # Errors
///
/// Returns an error naming every referenced variable that is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
        .map_err(|e| FlyerError::Other(format!("Invalid substitution pattern: {e}")))?;
    let mut lines = Vec::new();
    let mut missing_vars: Vec<String> = Vec::new();

    for line in input.lines() {
        // Placeholders in comments are left alone
        if line.trim_start().starts_with('#') {
            lines.push(line.to_string());
            continue;
        }

        let mut processed_line = line.to_string();
        for cap in re.captures_iter(line) {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => {
                    processed_line = processed_line.replace(&format!("${{{var_name}}}"), &value);
                }
                Err(_) => {
                    if !missing_vars.iter().any(|v| v == var_name) {
                        missing_vars.push(var_name.to_string());
                    }
                }
            }
        }
        lines.push(processed_line);
    }

    if !missing_vars.is_empty() {
        return Err(FlyerError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(lines.join("\n"))
}

fn parse_override<T: std::str::FromStr>(name: &str, value: &str) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| FlyerError::Configuration(format!("Invalid value for {name}: {e}")))
}

fn parse_enum_override<T: serde::de::DeserializeOwned>(name: &str, value: &str) -> Result<T> {
    T::deserialize(toml::Value::String(value.trim().to_lowercase()))
        .map_err(|e| FlyerError::Configuration(format!("Invalid value for {name}: {e}")))
}

/// Applies environment variable overrides using FLYERPRESS_* prefix
///
/// Environment variables follow the pattern: FLYERPRESS_<SECTION>_<KEY>
/// For example: FLYERPRESS_RENDER_JPEG_QUALITY, FLYERPRESS_PDF_PLACEMENT
fn apply_env_overrides(config: &mut FlyerConfig) -> Result<()> {
    let var = |key: &str| std::env::var(format!("FLYERPRESS_{key}")).ok();

    // Application overrides
    if let Some(val) = var("APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }

    // Render overrides
    if let Some(val) = var("RENDER_TARGET_WIDTH") {
        config.render.target_width = parse_override("FLYERPRESS_RENDER_TARGET_WIDTH", &val)?;
    }
    if let Some(val) = var("RENDER_TARGET_HEIGHT") {
        config.render.target_height = parse_override("FLYERPRESS_RENDER_TARGET_HEIGHT", &val)?;
    }
    if let Some(val) = var("RENDER_JPEG_QUALITY") {
        config.render.jpeg_quality = parse_override("FLYERPRESS_RENDER_JPEG_QUALITY", &val)?;
    }
    if let Some(val) = var("RENDER_BACKGROUND") {
        config.render.background = parse_override("FLYERPRESS_RENDER_BACKGROUND", &val)?;
    }

    // PDF overrides
    if let Some(val) = var("PDF_PAGE_SIZE") {
        config.pdf.page_size = parse_enum_override("FLYERPRESS_PDF_PAGE_SIZE", &val)?;
    }
    if let Some(val) = var("PDF_ORIENTATION") {
        config.pdf.orientation = parse_enum_override("FLYERPRESS_PDF_ORIENTATION", &val)?;
    }
    if let Some(val) = var("PDF_PLACEMENT") {
        config.pdf.placement = parse_enum_override("FLYERPRESS_PDF_PLACEMENT", &val)?;
    }

    // Export overrides
    if let Some(val) = var("EXPORT_BASE_FILENAME") {
        config.export.base_filename = val;
    }
    if let Some(val) = var("EXPORT_SETTLE_DELAY_MS") {
        config.export.settle_delay_ms = parse_override("FLYERPRESS_EXPORT_SETTLE_DELAY_MS", &val)?;
    }

    // Font overrides
    if let Some(val) = var("FONTS_FAMILY") {
        config.fonts.family = Some(val).filter(|family| !family.trim().is_empty());
    }
    if let Some(val) = var("FONTS_LOAD_SYSTEM_FONTS") {
        config.fonts.load_system_fonts =
            parse_override("FLYERPRESS_FONTS_LOAD_SYSTEM_FONTS", &val)?;
    }

    // Destination overrides
    if let Some(val) = var("DESTINATION_DIRECTORY_MODE") {
        config.destination.directory_mode =
            parse_enum_override::<DirectoryMode>("FLYERPRESS_DESTINATION_DIRECTORY_MODE", &val)?;
    }
    if let Some(val) = var("DESTINATION_DIRECTORY") {
        config.destination.directory = Some(PathBuf::from(val));
    }
    if let Some(val) = var("DESTINATION_DOWNLOADS_DIR") {
        config.destination.downloads_dir = PathBuf::from(val);
    }

    // Logging overrides
    if let Some(val) = var("LOGGING_LOCAL_ENABLED") {
        config.logging.local_enabled =
            parse_override("FLYERPRESS_LOGGING_LOCAL_ENABLED", &val)?;
    }
    if let Some(val) = var("LOGGING_LOCAL_PATH") {
        config.logging.local_path = PathBuf::from(val);
    }
    if let Some(val) = var("LOGGING_LOCAL_ROTATION") {
        config.logging.local_rotation = val;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::job::PdfPlacement;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_substitute_env_vars() {
        std::env::set_var("FLYERPRESS_TEST_FONT_DIR", "/opt/fonts");
        let input = "files = [\"${FLYERPRESS_TEST_FONT_DIR}/Anton.ttf\"]";
        let result = substitute_env_vars(input).unwrap();
        assert_eq!(result, "files = [\"/opt/fonts/Anton.ttf\"]");
        std::env::remove_var("FLYERPRESS_TEST_FONT_DIR");
    }

    #[test]
    fn test_substitute_env_vars_missing() {
        std::env::remove_var("FLYERPRESS_TEST_MISSING_A");
        std::env::remove_var("FLYERPRESS_TEST_MISSING_B");
        let input = "a = \"${FLYERPRESS_TEST_MISSING_A}\"\nb = \"${FLYERPRESS_TEST_MISSING_B}\"";
        let err = substitute_env_vars(input).unwrap_err().to_string();
        assert!(err.contains("FLYERPRESS_TEST_MISSING_A"));
        assert!(err.contains("FLYERPRESS_TEST_MISSING_B"));
    }

    #[test]
    fn test_substitute_env_vars_skips_comments() {
        std::env::remove_var("FLYERPRESS_TEST_COMMENTED");
        let input = "# directory = \"${FLYERPRESS_TEST_COMMENTED}\"\nlog_level = \"info\"";
        let result = substitute_env_vars(input).unwrap();
        assert_eq!(result, input);
    }

    #[test]
    fn test_load_config_missing_file() {
        let result = load_config("nonexistent.toml");
        assert!(matches!(result, Err(FlyerError::Configuration(_))));
    }

    #[test]
    fn test_load_config_valid() {
        let toml_content = r#"
[application]
log_level = "debug"

[render]
jpeg_quality = 90

[pdf]
placement = "contain"

[export]
base_filename = "ofertas"
settle_delay_ms = 250
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(toml_content.as_bytes()).unwrap();
        temp_file.flush().unwrap();

        let config = load_config(temp_file.path()).unwrap();
        assert_eq!(config.application.log_level, "debug");
        assert_eq!(config.render.jpeg_quality, 90);
        assert_eq!(config.pdf.placement, PdfPlacement::Contain);
        assert_eq!(config.export.base_filename, "ofertas");
        assert_eq!(config.export.settle_delay_ms, 250);
    }

    #[test]
    fn test_load_config_invalid_values() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[render]\njpeg_quality = 0\n")
            .unwrap();
        temp_file.flush().unwrap();

        let err = load_config(temp_file.path()).unwrap_err();
        assert!(err.to_string().contains("jpeg_quality"));
    }

    #[test]
    fn test_parse_enum_override() {
        let placement: PdfPlacement = parse_enum_override("X", "Contain").unwrap();
        assert_eq!(placement, PdfPlacement::Contain);
        assert!(parse_enum_override::<PdfPlacement>("X", "fill").is_err());
    }
}
