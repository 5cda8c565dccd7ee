//! TOML configuration file I/O
//!
//! Handles loading and saving service configuration to/from TOML files
//! in the user's configuration directory.

use crate::config::ServiceConfig;
use crate::error::{ConfigError, InfotagError};
use std::path::{Path, PathBuf};

/// Default configuration file name
const CONFIG_FILE_NAME: &str = "config.toml";

/// Get the default configuration directory
///
/// Returns ~/.config/infotag on Linux, or the INFOTAG_CONFIG_DIR
/// environment variable if set (used by tests).
pub fn get_config_dir() -> Result<PathBuf, InfotagError> {
    if let Ok(config_dir) = std::env::var("INFOTAG_CONFIG_DIR") {
        return Ok(PathBuf::from(config_dir));
    }

    let home = std::env::var("HOME").map_err(|_| {
        InfotagError::Config(ConfigError::IoError {
            message: "HOME environment variable not set".to_string(),
        })
    })?;

    Ok(PathBuf::from(home).join(".config").join("infotag"))
}

/// Get the default configuration file path
pub fn get_config_path() -> Result<PathBuf, InfotagError> {
    let config_dir = get_config_dir()?;
    Ok(config_dir.join(CONFIG_FILE_NAME))
}

/// Ensure the configuration directory exists
pub fn ensure_config_dir() -> Result<(), InfotagError> {
    let config_dir = get_config_dir()?;
    std::fs::create_dir_all(&config_dir).map_err(|e| {
        InfotagError::Config(ConfigError::IoError {
            message: format!("Failed to create config directory: {}", e),
        })
    })?;
    Ok(())
}

/// Check if a configuration file exists
pub fn config_exists() -> Result<bool, InfotagError> {
    let config_path = get_config_path()?;
    Ok(config_path.exists())
}

/// Load service configuration from the default TOML file
pub fn load_config() -> Result<ServiceConfig, InfotagError> {
    let config_path = get_config_path()?;
    load_config_from_path(&config_path)
}

/// Load service configuration from a specific TOML file
pub fn load_config_from_path<P: AsRef<Path>>(path: P) -> Result<ServiceConfig, InfotagError> {
    let contents = std::fs::read_to_string(&path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => InfotagError::Config(ConfigError::LoadFailed {
            path: path.as_ref().to_string_lossy().to_string(),
        }),
        _ => InfotagError::Config(ConfigError::IoError {
            message: format!("Failed to read config file: {}", e),
        }),
    })?;

    let config: ServiceConfig = toml::from_str(&contents).map_err(|e| {
        InfotagError::Config(ConfigError::ValidationError {
            message: format!("Failed to parse config file: {}", e),
        })
    })?;

    config.validate()?;

    Ok(config)
}

/// Save service configuration to the default TOML file
pub fn save_config(config: &ServiceConfig) -> Result<(), InfotagError> {
    let config_path = get_config_path()?;
    save_config_to_path(config, &config_path)
}

/// Save service configuration to a specific TOML file
pub fn save_config_to_path<P: AsRef<Path>>(
    config: &ServiceConfig,
    path: P,
) -> Result<(), InfotagError> {
    config.validate()?;

    // Ensure config directory exists
    if let Some(parent) = path.as_ref().parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            InfotagError::Config(ConfigError::IoError {
                message: format!("Failed to create config directory: {}", e),
            })
        })?;
    }

    let contents = toml::to_string_pretty(config)?;

    std::fs::write(&path, contents).map_err(|_e| {
        InfotagError::Config(ConfigError::SaveFailed {
            path: path.as_ref().to_string_lossy().to_string(),
        })
    })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_config_roundtrip() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("test_config.toml");

        let mut original_config = ServiceConfig::default();
        original_config.store.endpoint = Some("https://records.example.com/api".to_string());
        original_config.store.timeout_secs = 5;
        original_config.lockout.max_failures = 5;

        // Save config
        save_config_to_path(&original_config, &config_path).unwrap();

        // Load config
        let loaded_config = load_config_from_path(&config_path).unwrap();

        assert_eq!(original_config, loaded_config);
    }

    #[test]
    fn test_invalid_config_rejected_on_save() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("test_config.toml");

        let mut config = ServiceConfig::default();
        config.store.endpoint = Some("ftp://records.example.com".to_string());

        assert!(save_config_to_path(&config, &config_path).is_err());
    }

    #[test]
    fn test_load_missing_file_is_load_failed() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("does_not_exist.toml");

        let result = load_config_from_path(&config_path);
        assert!(matches!(
            result,
            Err(InfotagError::Config(ConfigError::LoadFailed { .. }))
        ));
    }
}
