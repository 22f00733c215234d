mod config;

pub use config::{AlertConfig, Config, DisplayConfig};

use std::path::PathBuf;

use crate::error::ConfigError;

/// Returns the configuration directory.
///
/// `STUDYTRACK_CONFIG_DIR` wins when set. Otherwise `~/.config/studytrack[-dev]/`
/// based on STUDYTRACK_ENV; set STUDYTRACK_ENV=dev to use the development
/// directory.
///
/// # Errors
/// Returns an error if creating the config directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let dir = match std::env::var_os("STUDYTRACK_CONFIG_DIR") {
        Some(dir) => PathBuf::from(dir),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");

            let env = std::env::var("STUDYTRACK_ENV").unwrap_or_else(|_| "production".to_string());

            if env == "dev" {
                base_dir.join("studytrack-dev")
            } else {
                base_dir.join("studytrack")
            }
        }
    };

    std::fs::create_dir_all(&dir).map_err(|e| ConfigError::SaveFailed {
        path: dir.clone(),
        message: e.to_string(),
    })?;
    Ok(dir)
}
