use chrono::{DateTime, Utc};
use clap::Subcommand;
use tasktrack_core::clock::parse_instant;
use tasktrack_core::{productivity, TaskSource, ViewMode};

use super::{now, print_json, CommandResult, Context};

#[derive(Subcommand)]
pub enum StatsAction {
    /// Completion histogram for this week, month or year
    Productivity {
        /// daily, weekly or monthly
        #[arg(long)]
        view: ViewMode,
        /// Act as if it were this instant
        #[arg(long, value_parser = parse_instant)]
        simulated_date: Option<DateTime<Utc>>,
    },
    /// Completed, missed and deleted task counts
    Counts {
        /// Act as if it were this instant
        #[arg(long, value_parser = parse_instant)]
        simulated_date: Option<DateTime<Utc>>,
    },
}

pub fn run(action: StatsAction, ctx: &Context) -> CommandResult {
    let db = ctx.open_db()?;

    match action {
        StatsAction::Productivity {
            view,
            simulated_date,
        } => {
            let histogram = productivity(&db, &ctx.user, view, now(simulated_date))?;
            print_json(&histogram)?;
        }
        StatsAction::Counts { simulated_date } => {
            print_json(&db.task_stats(&ctx.user, now(simulated_date))?)?;
        }
    }
    Ok(())
}
