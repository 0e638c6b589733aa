//! Completed / missed / deleted task counts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::task::Task;

/// Task counts for one user at a point in time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskStats {
    /// Completed and not deleted
    pub completed: u64,
    /// Pending, not deleted, due before now
    pub missed: u64,
    /// Soft-deleted, whatever the status
    pub deleted: u64,
}

/// Count `tasks` as of `now`.
pub fn count_tasks<'a, I>(tasks: I, now: DateTime<Utc>) -> TaskStats
where
    I: IntoIterator<Item = &'a Task>,
{
    tasks.into_iter().fold(TaskStats::default(), |mut stats, task| {
        if task.is_live_completion() {
            stats.completed += 1;
        }
        if task.is_deleted() {
            stats.deleted += 1;
        }
        if task.is_missed(now) {
            stats.missed += 1;
        }
        stats
    })
}
