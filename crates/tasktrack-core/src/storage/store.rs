//! Store capabilities consumed by the core.
//!
//! Any backend offering an atomic read-modify-write over one keyed record
//! can implement [`StreakStore`]; [`TaskSource`] only needs reads.

use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::stats::{count_tasks, TaskStats};
use crate::streak::StreakState;
use crate::task::Task;

/// Outcome of a streak update closure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreakWrite {
    /// Leave the stored record as it is and report this state.
    Keep(StreakState),
    /// Persist this state.
    Put(StreakState),
}

/// Per-user streak persistence with transactional updates.
pub trait StreakStore {
    /// Read the stored record, `None` if the user has never completed.
    fn read_streak(&self, user_id: &str) -> Result<Option<StreakState>>;

    /// Run `update` on the current record and apply its result atomically.
    ///
    /// Concurrent calls for the same user must serialize: the closure of a
    /// later call observes the write of an earlier one. An error from the
    /// closure aborts the transaction without writing.
    fn transact_streak(
        &self,
        user_id: &str,
        update: &mut dyn FnMut(Option<StreakState>) -> Result<StreakWrite>,
    ) -> Result<StreakState>;
}

/// Read access to a user's tasks.
pub trait TaskSource {
    /// Completed, non-deleted tasks with `completed_at` in `[start, end]`.
    fn completed_tasks_in_range(
        &self,
        user_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Task>>;

    /// Every task of the user, soft-deleted ones included.
    fn all_tasks(&self, user_id: &str) -> Result<Vec<Task>>;

    /// Completed, missed and deleted counts as of `now`.
    ///
    /// The default filters [`all_tasks`](Self::all_tasks) in memory;
    /// backends with a query language may count server-side instead.
    fn task_stats(&self, user_id: &str, now: DateTime<Utc>) -> Result<TaskStats> {
        Ok(count_tasks(&self.all_tasks(user_id)?, now))
    }
}

/// Task record persistence.
pub trait TaskStore: TaskSource {
    fn insert_task(&self, task: &Task) -> Result<()>;

    /// Fetch by id, soft-deleted tasks included.
    fn get_task(&self, user_id: &str, id: &str) -> Result<Option<Task>>;

    /// Non-deleted tasks, newest `created_at` first.
    fn list_tasks(&self, user_id: &str) -> Result<Vec<Task>>;

    /// Overwrite an existing task record.
    fn save_task(&self, task: &Task) -> Result<()>;
}
