//! # Tasktrack Core Library
//!
//! Core business logic for the tasktrack task tracker. Every operation is
//! reachable from the standalone `tasktrack` CLI, which stays a thin layer
//! over this crate.
//!
//! ## Architecture
//!
//! - **Streak**: a per-user completion streak advanced inside a store
//!   transaction, with the set of weekdays it covered
//! - **Stats**: productivity histograms over the current week, month or year
//!   and completed/missed/deleted task counts
//! - **Storage**: SQLite persistence, an in-memory store for tests and
//!   TOML-based configuration
//! - **Calendar**: UTC day keys and calendar window arithmetic
//!
//! ## Key Components
//!
//! - [`record_completion`]: credit a completion to a user's streak
//! - [`productivity`]: completion histogram for a [`ViewMode`]
//! - [`Database`]: task and streak persistence
//! - [`Config`]: application configuration management

pub mod calendar;
pub mod clock;
pub mod error;
pub mod stats;
pub mod storage;
pub mod streak;
pub mod task;

pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{ConfigError, CoreError, DatabaseError, Result};
pub use stats::{
    count_tasks, productivity, ProductivityAggregator, ProductivityHistogram, TaskStats, ViewMode,
};
pub use storage::{Config, Database, MemoryStore, StreakStore, StreakWrite, TaskSource, TaskStore};
pub use streak::{load_streak, record_completion, StreakDays, StreakState};
pub use task::{
    complete_task, create_task, delete_task, update_task, NewTask, Task, TaskPatch, TaskStatus,
};
