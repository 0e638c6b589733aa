mod config;
pub mod database;
pub mod memory;
pub mod migrations;
mod store;

pub use config::{Config, LoggingConfig, StorageConfig, UserConfig};
pub use database::Database;
pub use memory::MemoryStore;
pub use store::{StreakStore, StreakWrite, TaskSource, TaskStore};

use std::path::PathBuf;

use crate::error::ConfigError;

/// Returns the data directory, creating it if needed.
///
/// `TASKTRACK_DATA_DIR` wins when set. Otherwise `~/.config/tasktrack`, or
/// `~/.config/tasktrack-dev` when `TASKTRACK_ENV=dev`.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let dir = match std::env::var_os("TASKTRACK_DATA_DIR") {
        Some(explicit) => PathBuf::from(explicit),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("TASKTRACK_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("tasktrack-dev")
            } else {
                base_dir.join("tasktrack")
            }
        }
    };

    std::fs::create_dir_all(&dir)
        .map_err(|e| ConfigError::DataDir(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}
