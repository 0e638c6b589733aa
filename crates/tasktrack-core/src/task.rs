//! Task records and their lifecycle.
//!
//! Tasks are never hard-deleted. Status transitions keep two invariants:
//!
//! - `completed_at` is set iff `status == Completed`
//! - `deleted_at` is set iff `status == Deleted`
//!
//!   Pending <────────> Completed
//!      \                  /
//!       +──> Deleted <───+      (soft delete only, terminal)

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::{CoreError, Result};
use crate::storage::{StreakStore, TaskStore};
use crate::streak::{record_completion, StreakState};

const DEFAULT_LABEL: &str = "None";

/// Lifecycle status of a task.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    #[default]
    Pending,
    Completed,
    Deleted,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::Completed => "completed",
            TaskStatus::Deleted => "deleted",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "pending" => Ok(TaskStatus::Pending),
            "completed" => Ok(TaskStatus::Completed),
            "deleted" => Ok(TaskStatus::Deleted),
            other => Err(CoreError::InvalidStatusTransition(format!(
                "unknown status '{other}'"
            ))),
        }
    }
}

/// A user's task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub details: String,
    pub category: String,
    pub priority: String,
    pub status: TaskStatus,
    pub due_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Input for task creation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTask {
    pub title: String,
    #[serde(default)]
    pub details: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
}

/// Partial update. Identity, owner and creation time are not patchable.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskPatch {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub details: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub status: Option<TaskStatus>,
}

impl TaskPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.details.is_none()
            && self.category.is_none()
            && self.priority.is_none()
            && self.due_date.is_none()
            && self.status.is_none()
    }

    /// Patch that only marks the task completed.
    pub fn complete() -> Self {
        Self {
            status: Some(TaskStatus::Completed),
            ..Self::default()
        }
    }
}

/// Stored timestamps keep millisecond precision.
fn to_millis(instant: DateTime<Utc>) -> DateTime<Utc> {
    instant.trunc_subsecs(3)
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

impl Task {
    /// Build a pending task owned by `user_id`.
    ///
    /// # Errors
    /// Returns `MissingRequiredField("title")` if the title is blank.
    pub fn create(user_id: &str, new: NewTask, now: DateTime<Utc>) -> Result<Self> {
        if new.title.trim().is_empty() {
            return Err(CoreError::MissingRequiredField("title"));
        }
        let now = to_millis(now);
        Ok(Self {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            title: new.title,
            details: non_blank(new.details).unwrap_or_default(),
            category: non_blank(new.category).unwrap_or_else(|| DEFAULT_LABEL.to_string()),
            priority: non_blank(new.priority).unwrap_or_else(|| DEFAULT_LABEL.to_string()),
            status: TaskStatus::Pending,
            due_date: new.due_date.map(to_millis),
            created_at: now,
            updated_at: now,
            completed_at: None,
            deleted_at: None,
        })
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Pending, not deleted, and past its due date.
    pub fn is_missed(&self, now: DateTime<Utc>) -> bool {
        self.status == TaskStatus::Pending
            && !self.is_deleted()
            && self.due_date.is_some_and(|due| due < now)
    }

    /// Completed and not deleted.
    pub fn is_live_completion(&self) -> bool {
        self.status == TaskStatus::Completed && !self.is_deleted()
    }

    /// Apply a partial update at `now`.
    ///
    /// Moving to `Completed` stamps `completed_at`; any other status given
    /// in the patch clears it.
    ///
    /// # Errors
    /// Rejects empty patches, blank titles, updates to soft-deleted tasks
    /// and attempts to set `Deleted` directly.
    pub fn apply(&mut self, patch: TaskPatch, now: DateTime<Utc>) -> Result<()> {
        if self.is_deleted() {
            return Err(CoreError::TaskNotFound(self.id.clone()));
        }
        if patch.is_empty() {
            return Err(CoreError::MissingRequiredField("update"));
        }
        if patch.status == Some(TaskStatus::Deleted) {
            return Err(CoreError::InvalidStatusTransition(
                "use soft delete to mark a task deleted".into(),
            ));
        }
        let now = to_millis(now);
        if let Some(title) = patch.title {
            if title.trim().is_empty() {
                return Err(CoreError::MissingRequiredField("title"));
            }
            self.title = title;
        }
        if let Some(details) = patch.details {
            self.details = details;
        }
        if let Some(category) = patch.category {
            self.category = category;
        }
        if let Some(priority) = patch.priority {
            self.priority = priority;
        }
        if let Some(due) = patch.due_date {
            self.due_date = Some(to_millis(due));
        }
        if let Some(status) = patch.status {
            self.status = status;
            self.completed_at = match status {
                TaskStatus::Completed => Some(now),
                _ => None,
            };
        }
        self.updated_at = now;
        Ok(())
    }

    /// Mark the task deleted. A second call keeps the first deletion time.
    pub fn soft_delete(&mut self, now: DateTime<Utc>) {
        let now = to_millis(now);
        if self.deleted_at.is_none() {
            self.deleted_at = Some(now);
        }
        self.status = TaskStatus::Deleted;
        self.completed_at = None;
        self.updated_at = now;
    }
}

/// Validate and persist a new task.
///
/// # Errors
/// `MissingRequiredField` for a blank title, or the store's failure.
pub fn create_task<S: TaskStore + ?Sized>(
    store: &S,
    user_id: &str,
    new: NewTask,
    now: DateTime<Utc>,
) -> Result<Task> {
    let task = Task::create(user_id, new, now)?;
    store.insert_task(&task)?;
    tracing::debug!(user = user_id, id = %task.id, "task created");
    Ok(task)
}

fn load_live<S: TaskStore + ?Sized>(store: &S, user_id: &str, id: &str) -> Result<Task> {
    store
        .get_task(user_id, id)?
        .filter(|task| !task.is_deleted())
        .ok_or_else(|| CoreError::TaskNotFound(id.to_string()))
}

/// Apply `patch` to an existing, non-deleted task.
///
/// # Errors
/// `TaskNotFound` for unknown or soft-deleted ids, plus the errors of
/// [`Task::apply`].
pub fn update_task<S: TaskStore + ?Sized>(
    store: &S,
    user_id: &str,
    id: &str,
    patch: TaskPatch,
    now: DateTime<Utc>,
) -> Result<Task> {
    let mut task = load_live(store, user_id, id)?;
    task.apply(patch, now)?;
    store.save_task(&task)?;
    tracing::debug!(user = user_id, id, status = %task.status, "task updated");
    Ok(task)
}

/// Soft-delete a task. Deleting an already deleted task is a no-op.
///
/// # Errors
/// `TaskNotFound` if no such task exists for the user.
pub fn delete_task<S: TaskStore + ?Sized>(
    store: &S,
    user_id: &str,
    id: &str,
    now: DateTime<Utc>,
) -> Result<Task> {
    let mut task = store
        .get_task(user_id, id)?
        .ok_or_else(|| CoreError::TaskNotFound(id.to_string()))?;
    if task.is_deleted() {
        return Ok(task);
    }
    task.soft_delete(now);
    store.save_task(&task)?;
    tracing::debug!(user = user_id, id, "task soft-deleted");
    Ok(task)
}

/// Mark a task completed and credit the user's streak for the same instant.
///
/// The task write and the streak transaction are separate store
/// operations; a streak failure leaves the task completed.
///
/// # Errors
/// Errors of [`update_task`] or of the streak transaction.
pub fn complete_task<S: TaskStore + StreakStore + ?Sized>(
    store: &S,
    user_id: &str,
    id: &str,
    now: DateTime<Utc>,
) -> Result<(Task, StreakState)> {
    let task = update_task(store, user_id, id, TaskPatch::complete(), now)?;
    let streak = record_completion(store, user_id, now)?;
    Ok((task, streak))
}
