//! In-process store backed by mutex-guarded maps.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use super::store::{StreakStore, StreakWrite, TaskSource, TaskStore};
use crate::error::{CoreError, DatabaseError, Result};
use crate::streak::StreakState;
use crate::task::Task;

/// Store that keeps everything in memory. The streak map lock is held for
/// the whole update closure, which serializes same-user transitions.
#[derive(Debug, Default)]
pub struct MemoryStore {
    streaks: Mutex<HashMap<String, StreakState>>,
    tasks: Mutex<HashMap<String, Task>>,
}

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>> {
    mutex.lock().map_err(|_| DatabaseError::Poisoned.into())
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a streak record directly.
    pub fn put_streak(&self, user_id: &str, state: StreakState) -> Result<()> {
        lock(&self.streaks)?.insert(user_id.to_string(), state);
        Ok(())
    }
}

impl StreakStore for MemoryStore {
    fn read_streak(&self, user_id: &str) -> Result<Option<StreakState>> {
        Ok(lock(&self.streaks)?.get(user_id).cloned())
    }

    fn transact_streak(
        &self,
        user_id: &str,
        update: &mut dyn FnMut(Option<StreakState>) -> Result<StreakWrite>,
    ) -> Result<StreakState> {
        let mut streaks = lock(&self.streaks)?;
        match update(streaks.get(user_id).cloned())? {
            StreakWrite::Put(state) => {
                streaks.insert(user_id.to_string(), state.clone());
                Ok(state)
            }
            StreakWrite::Keep(state) => Ok(state),
        }
    }
}

impl TaskSource for MemoryStore {
    fn completed_tasks_in_range(
        &self,
        user_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Task>> {
        Ok(lock(&self.tasks)?
            .values()
            .filter(|t| t.user_id == user_id && t.is_live_completion())
            .filter(|t| t.completed_at.is_some_and(|c| c >= start && c <= end))
            .cloned()
            .collect())
    }

    fn all_tasks(&self, user_id: &str) -> Result<Vec<Task>> {
        Ok(lock(&self.tasks)?
            .values()
            .filter(|t| t.user_id == user_id)
            .cloned()
            .collect())
    }
}

impl TaskStore for MemoryStore {
    fn insert_task(&self, task: &Task) -> Result<()> {
        lock(&self.tasks)?.insert(task.id.clone(), task.clone());
        Ok(())
    }

    fn get_task(&self, user_id: &str, id: &str) -> Result<Option<Task>> {
        Ok(lock(&self.tasks)?
            .get(id)
            .filter(|t| t.user_id == user_id)
            .cloned())
    }

    fn list_tasks(&self, user_id: &str) -> Result<Vec<Task>> {
        let mut tasks: Vec<Task> = lock(&self.tasks)?
            .values()
            .filter(|t| t.user_id == user_id && !t.is_deleted())
            .cloned()
            .collect();
        tasks.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(tasks)
    }

    fn save_task(&self, task: &Task) -> Result<()> {
        let mut tasks = lock(&self.tasks)?;
        match tasks.get_mut(&task.id) {
            Some(stored) if stored.user_id == task.user_id => {
                *stored = task.clone();
                Ok(())
            }
            _ => Err(CoreError::TaskNotFound(task.id.clone())),
        }
    }
}
