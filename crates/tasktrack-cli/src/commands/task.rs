//! Task management commands for CLI.

use chrono::{DateTime, Utc};
use clap::Subcommand;
use tasktrack_core::clock::parse_instant;
use tasktrack_core::{
    complete_task, create_task, delete_task, update_task, CoreError, NewTask, TaskPatch,
    TaskStatus, TaskStore,
};

use super::{now, print_json, CommandResult, Context};

#[derive(Subcommand)]
pub enum TaskAction {
    /// Create a new task
    Create {
        /// Task title
        title: String,
        /// Free-form notes
        #[arg(long)]
        details: Option<String>,
        /// Category label (default: None)
        #[arg(long)]
        category: Option<String>,
        /// Priority label (default: None)
        #[arg(long)]
        priority: Option<String>,
        /// Due date, RFC 3339 or YYYY-MM-DD
        #[arg(long, value_parser = parse_instant)]
        due: Option<DateTime<Utc>>,
    },
    /// List tasks, newest first
    List,
    /// Get task details
    Get {
        /// Task ID
        id: String,
    },
    /// Update a task
    Update {
        /// Task ID
        id: String,
        /// New title
        #[arg(long)]
        title: Option<String>,
        /// New details
        #[arg(long)]
        details: Option<String>,
        /// New category
        #[arg(long)]
        category: Option<String>,
        /// New priority
        #[arg(long)]
        priority: Option<String>,
        /// New due date
        #[arg(long, value_parser = parse_instant)]
        due: Option<DateTime<Utc>>,
        /// New status: pending or completed
        #[arg(long)]
        status: Option<TaskStatus>,
        /// Act as if it were this instant
        #[arg(long, value_parser = parse_instant)]
        simulated_date: Option<DateTime<Utc>>,
    },
    /// Complete a task and credit the streak
    Complete {
        /// Task ID
        id: String,
        /// Act as if it were this instant
        #[arg(long, value_parser = parse_instant)]
        simulated_date: Option<DateTime<Utc>>,
    },
    /// Soft-delete a task
    Delete {
        /// Task ID
        id: String,
    },
}

pub fn run(action: TaskAction, ctx: &Context) -> CommandResult {
    let db = ctx.open_db()?;
    let user = ctx.user.as_str();

    match action {
        TaskAction::Create {
            title,
            details,
            category,
            priority,
            due,
        } => {
            let new = NewTask {
                title,
                details,
                category,
                priority,
                due_date: due,
            };
            let task = create_task(&db, user, new, now(None))?;
            print_json(&task)?;
        }
        TaskAction::List => {
            print_json(&db.list_tasks(user)?)?;
        }
        TaskAction::Get { id } => {
            let task = db
                .get_task(user, &id)?
                .ok_or(CoreError::TaskNotFound(id))?;
            print_json(&task)?;
        }
        TaskAction::Update {
            id,
            title,
            details,
            category,
            priority,
            due,
            status,
            simulated_date,
        } => {
            let patch = TaskPatch {
                title,
                details,
                category,
                priority,
                due_date: due,
                status,
            };
            let task = update_task(&db, user, &id, patch, now(simulated_date))?;
            print_json(&task)?;
        }
        TaskAction::Complete { id, simulated_date } => {
            let (task, streak) = complete_task(&db, user, &id, now(simulated_date))?;
            print_json(&serde_json::json!({ "task": task, "streak": streak }))?;
        }
        TaskAction::Delete { id } => {
            let task = delete_task(&db, user, &id, now(None))?;
            print_json(&task)?;
        }
    }
    Ok(())
}
