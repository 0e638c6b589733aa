pub mod config;
pub mod stats;
pub mod streak;
pub mod task;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tasktrack_core::clock::{resolve_now, SystemClock};
use tasktrack_core::{Config, Database};

pub type CommandResult = Result<(), Box<dyn std::error::Error>>;

/// Resolved per-invocation settings.
pub struct Context {
    pub user: String,
    pub config: Config,
}

impl Context {
    pub fn open_db(&self) -> tasktrack_core::Result<Database> {
        tracing::debug!(
            user = %self.user,
            file = %self.config.storage.database_file,
            "opening store"
        );
        Database::open(&self.config.storage)
    }
}

/// Wall-clock time unless `--simulated-date` was given.
pub fn now(simulated: Option<DateTime<Utc>>) -> DateTime<Utc> {
    resolve_now(&SystemClock, simulated)
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> CommandResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
