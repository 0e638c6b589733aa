use chrono::{DateTime, Utc};
use clap::Subcommand;
use tasktrack_core::clock::parse_instant;
use tasktrack_core::{load_streak, record_completion};

use super::{now, print_json, CommandResult, Context};

#[derive(Subcommand)]
pub enum StreakAction {
    /// Show the current streak
    Show,
    /// Record a completion for today
    Complete {
        /// Act as if it were this instant (RFC 3339 or YYYY-MM-DD)
        #[arg(long, value_parser = parse_instant)]
        simulated_date: Option<DateTime<Utc>>,
    },
}

pub fn run(action: StreakAction, ctx: &Context) -> CommandResult {
    let db = ctx.open_db()?;

    match action {
        StreakAction::Show => {
            print_json(&load_streak(&db, &ctx.user)?)?;
        }
        StreakAction::Complete { simulated_date } => {
            let state = record_completion(&db, &ctx.user, now(simulated_date))?;
            print_json(&state)?;
        }
    }
    Ok(())
}
