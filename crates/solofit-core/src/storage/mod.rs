mod config;
pub mod database;

pub use config::{Config, ExerciseConfig, NotificationsConfig, TimersConfig, WorkoutConfig};
pub use database::Database;

use std::path::PathBuf;

use crate::error::ConfigError;

/// Returns the SoloFit data directory, creating it if needed.
///
/// `SOLOFIT_DATA_DIR` wins when set. Otherwise `~/.config/solofit`, or
/// `~/.config/solofit-dev` with SOLOFIT_ENV=dev.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let dir = match std::env::var_os("SOLOFIT_DATA_DIR") {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("SOLOFIT_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("solofit-dev")
            } else {
                base_dir.join("solofit")
            }
        }
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
