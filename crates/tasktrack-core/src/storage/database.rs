//! SQLite-backed store for tasks and streak records.
//!
//! Streak updates run inside `BEGIN IMMEDIATE` transactions: the write lock
//! is taken before the record is read, so two connections crediting the
//! same user serialize instead of both reading the old state.

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension, Transaction, TransactionBehavior};
use std::path::Path;
use std::time::Duration;

use super::config::StorageConfig;
use super::migrations;
use super::store::{StreakStore, StreakWrite, TaskSource, TaskStore};
use crate::error::{CoreError, DatabaseError, Result};
use crate::stats::TaskStats;
use crate::streak::StreakState;
use crate::task::{Task, TaskStatus};

const TASK_COLUMNS: &str = "id, user_id, title, details, category, priority, status,
     due_date, created_at, updated_at, completed_at, deleted_at";

/// Fixed-width RFC 3339 so text comparison in SQL is chronological.
fn format_ts(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn conversion_error(
    idx: usize,
    err: impl std::error::Error + Send + Sync + 'static,
) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(err))
}

fn parse_ts(idx: usize, raw: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| conversion_error(idx, e))
}

fn parse_opt_ts(idx: usize, raw: Option<String>) -> rusqlite::Result<Option<DateTime<Utc>>> {
    raw.map(|s| parse_ts(idx, &s)).transpose()
}

/// Build a Task from a row selected with `TASK_COLUMNS`.
fn row_to_task(row: &rusqlite::Row) -> rusqlite::Result<Task> {
    let status: String = row.get(6)?;
    let status = status
        .parse::<TaskStatus>()
        .map_err(|e| conversion_error(6, e))?;
    let created_at: String = row.get(8)?;
    let updated_at: String = row.get(9)?;

    Ok(Task {
        id: row.get(0)?,
        user_id: row.get(1)?,
        title: row.get(2)?,
        details: row.get(3)?,
        category: row.get(4)?,
        priority: row.get(5)?,
        status,
        due_date: parse_opt_ts(7, row.get(7)?)?,
        created_at: parse_ts(8, &created_at)?,
        updated_at: parse_ts(9, &updated_at)?,
        completed_at: parse_opt_ts(10, row.get(10)?)?,
        deleted_at: parse_opt_ts(11, row.get(11)?)?,
    })
}

/// SQLite database for tasks and streaks.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Get a reference to the underlying SQLite connection.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Open the configured database file inside the data directory.
    ///
    /// # Errors
    /// Returns an error if the data directory or database cannot be opened
    /// or migrated.
    pub fn open(config: &StorageConfig) -> Result<Self> {
        let path = config.database_path()?;
        Self::open_path(path, config.busy_timeout())
    }

    /// Open (or create) a database at an explicit path.
    ///
    /// # Errors
    /// Returns an error if the file cannot be opened or migrated.
    pub fn open_path(path: impl AsRef<Path>, busy_timeout: Duration) -> Result<Self> {
        let path = path.as_ref();
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        conn.busy_timeout(busy_timeout)?;
        let db = Self { conn };
        db.migrate()?;
        tracing::debug!(path = %path.display(), "database opened");
        Ok(db)
    }

    /// Open an in-memory database.
    ///
    /// # Errors
    /// Returns an error if the schema cannot be created.
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<()> {
        migrations::migrate(&self.conn)
            .map_err(|e| DatabaseError::MigrationFailed(e.to_string()).into())
    }

    fn query_tasks(&self, sql: &str, params: &[&dyn rusqlite::ToSql]) -> Result<Vec<Task>> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt.query_map(params, row_to_task)?;
        let mut tasks = Vec::new();
        for row in rows {
            tasks.push(row?);
        }
        Ok(tasks)
    }

    fn count(&self, sql: &str, params: &[&dyn rusqlite::ToSql]) -> Result<u64> {
        Ok(self.conn.query_row(sql, params, |row| row.get::<_, u64>(0))?)
    }

    fn write_streak(&self, user_id: &str, state: &StreakState) -> Result<()> {
        self.conn.execute(
            "INSERT INTO streaks (user_id, current_streak, last_completion_date, streak_days)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(user_id) DO UPDATE SET
                current_streak = excluded.current_streak,
                last_completion_date = excluded.last_completion_date,
                streak_days = excluded.streak_days",
            params![
                user_id,
                state.current_streak,
                state.last_completion_date,
                state.streak_days.to_string(),
            ],
        )?;
        Ok(())
    }

    fn streak_transaction_body(
        &self,
        user_id: &str,
        update: &mut dyn FnMut(Option<StreakState>) -> Result<StreakWrite>,
    ) -> Result<StreakState> {
        let current = self.read_streak(user_id)?;
        match update(current)? {
            StreakWrite::Put(state) => {
                self.write_streak(user_id, &state)?;
                Ok(state)
            }
            StreakWrite::Keep(state) => Ok(state),
        }
    }
}

impl StreakStore for Database {
    fn read_streak(&self, user_id: &str) -> Result<Option<StreakState>> {
        let row = self
            .conn
            .query_row(
                "SELECT current_streak, last_completion_date, streak_days
                 FROM streaks WHERE user_id = ?1",
                params![user_id],
                |row| {
                    Ok((
                        row.get::<_, u32>(0)?,
                        row.get::<_, Option<String>>(1)?,
                        row.get::<_, String>(2)?,
                    ))
                },
            )
            .optional()?;

        row.map(|(current_streak, last_completion_date, streak_days)| {
            Ok(StreakState {
                current_streak,
                last_completion_date,
                streak_days: streak_days.parse()?,
            })
        })
        .transpose()
    }

    fn transact_streak(
        &self,
        user_id: &str,
        update: &mut dyn FnMut(Option<StreakState>) -> Result<StreakWrite>,
    ) -> Result<StreakState> {
        // Dropping `tx` without a successful commit rolls back, including
        // when COMMIT itself fails on a busy database.
        let tx = Transaction::new_unchecked(&self.conn, TransactionBehavior::Immediate)?;
        let state = self.streak_transaction_body(user_id, update)?;
        tx.commit()?;
        Ok(state)
    }
}

impl TaskSource for Database {
    fn completed_tasks_in_range(
        &self,
        user_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Task>> {
        self.query_tasks(
            &format!(
                "SELECT {TASK_COLUMNS} FROM tasks
                 WHERE user_id = ?1 AND status = 'completed' AND deleted_at IS NULL
                   AND completed_at >= ?2 AND completed_at <= ?3"
            ),
            params![user_id, format_ts(start), format_ts(end)],
        )
    }

    fn all_tasks(&self, user_id: &str) -> Result<Vec<Task>> {
        self.query_tasks(
            &format!("SELECT {TASK_COLUMNS} FROM tasks WHERE user_id = ?1"),
            params![user_id],
        )
    }

    fn task_stats(&self, user_id: &str, now: DateTime<Utc>) -> Result<TaskStats> {
        let completed = self.count(
            "SELECT COUNT(*) FROM tasks
             WHERE user_id = ?1 AND status = 'completed' AND deleted_at IS NULL",
            params![user_id],
        )?;
        let deleted = self.count(
            "SELECT COUNT(*) FROM tasks WHERE user_id = ?1 AND deleted_at IS NOT NULL",
            params![user_id],
        )?;
        let missed = self.count(
            "SELECT COUNT(*) FROM tasks
             WHERE user_id = ?1 AND status = 'pending' AND deleted_at IS NULL
               AND due_date IS NOT NULL AND due_date < ?2",
            params![user_id, format_ts(now)],
        )?;
        Ok(TaskStats {
            completed,
            missed,
            deleted,
        })
    }
}

impl TaskStore for Database {
    fn insert_task(&self, task: &Task) -> Result<()> {
        self.conn.execute(
            &format!(
                "INSERT INTO tasks ({TASK_COLUMNS})
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)"
            ),
            params![
                task.id,
                task.user_id,
                task.title,
                task.details,
                task.category,
                task.priority,
                task.status.as_str(),
                task.due_date.map(format_ts),
                format_ts(task.created_at),
                format_ts(task.updated_at),
                task.completed_at.map(format_ts),
                task.deleted_at.map(format_ts),
            ],
        )?;
        Ok(())
    }

    fn get_task(&self, user_id: &str, id: &str) -> Result<Option<Task>> {
        Ok(self
            .conn
            .query_row(
                &format!("SELECT {TASK_COLUMNS} FROM tasks WHERE user_id = ?1 AND id = ?2"),
                params![user_id, id],
                row_to_task,
            )
            .optional()?)
    }

    fn list_tasks(&self, user_id: &str) -> Result<Vec<Task>> {
        self.query_tasks(
            &format!(
                "SELECT {TASK_COLUMNS} FROM tasks
                 WHERE user_id = ?1 AND deleted_at IS NULL
                 ORDER BY created_at DESC"
            ),
            params![user_id],
        )
    }

    fn save_task(&self, task: &Task) -> Result<()> {
        let changed = self.conn.execute(
            "UPDATE tasks SET
                title = ?3, details = ?4, category = ?5, priority = ?6, status = ?7,
                due_date = ?8, updated_at = ?9, completed_at = ?10, deleted_at = ?11
             WHERE id = ?1 AND user_id = ?2",
            params![
                task.id,
                task.user_id,
                task.title,
                task.details,
                task.category,
                task.priority,
                task.status.as_str(),
                task.due_date.map(format_ts),
                format_ts(task.updated_at),
                task.completed_at.map(format_ts),
                task.deleted_at.map(format_ts),
            ],
        )?;
        if changed == 0 {
            return Err(CoreError::TaskNotFound(task.id.clone()));
        }
        Ok(())
    }
}
