//! Completion streak state machine.
//!
//! One transition per completion event, credited at most once per UTC
//! calendar day:
//!
//! - same day as the last credit: no change
//! - day after the last credit: streak + 1, today's weekday added
//! - any other day (or no prior credit): streak 0, weekdays untouched
//!
//! A first-ever completion leaves the streak at 0 and only records the date;
//! the count starts with the following consecutive day.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::days::StreakDays;
use crate::calendar::{date_key, is_preceding_day, weekday_index};
use crate::error::Result;
use crate::storage::{StreakStore, StreakWrite};

/// Persisted per-user streak record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreakState {
    pub current_streak: u32,
    pub last_completion_date: Option<String>,
    pub streak_days: StreakDays,
}

/// Result of applying one completion event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreakTransition {
    pub state: StreakState,
    /// False when today had already been credited.
    pub credited: bool,
}

impl StreakState {
    /// Compute the state after a completion at `now`.
    pub fn advance(&self, now: DateTime<Utc>) -> StreakTransition {
        let today = date_key(now);

        if self.last_completion_date.as_deref() == Some(today.as_str()) {
            tracing::debug!(date = %today, "streak already credited today");
            return StreakTransition {
                state: self.clone(),
                credited: false,
            };
        }

        let new_streak = match self.last_completion_date.as_deref() {
            Some(last) if is_preceding_day(last, &today) => self.current_streak.saturating_add(1),
            // No prior credit, or a gap of two days or more.
            _ => 0,
        };

        let weekday = weekday_index(now);
        let streak_days = if new_streak > self.current_streak {
            let mut days = self.streak_days.clone();
            days.insert(weekday);
            days
        } else if new_streak == 1 {
            StreakDays::single(weekday)
        } else {
            self.streak_days.clone()
        };

        tracing::debug!(
            previous = self.current_streak,
            next = new_streak,
            last = ?self.last_completion_date,
            date = %today,
            weekday,
            "streak transition"
        );

        StreakTransition {
            state: StreakState {
                current_streak: new_streak,
                last_completion_date: Some(today),
                streak_days,
            },
            credited: true,
        }
    }
}

/// Read a user's streak, defaulting to the zero state without creating it.
///
/// # Errors
/// Propagates store failures and malformed stored weekday lists.
pub fn load_streak<S: StreakStore + ?Sized>(store: &S, user_id: &str) -> Result<StreakState> {
    Ok(store.read_streak(user_id)?.unwrap_or_default())
}

/// Credit a completion at `now` inside one store transaction and return
/// the resulting state.
///
/// # Errors
/// Store failures are returned unchanged; nothing is retried here.
pub fn record_completion<S: StreakStore + ?Sized>(
    store: &S,
    user_id: &str,
    now: DateTime<Utc>,
) -> Result<StreakState> {
    let state = store.transact_streak(user_id, &mut |current| {
        let transition = current.unwrap_or_default().advance(now);
        Ok(if transition.credited {
            StreakWrite::Put(transition.state)
        } else {
            StreakWrite::Keep(transition.state)
        })
    })?;
    tracing::info!(
        user = user_id,
        streak = state.current_streak,
        date = ?state.last_completion_date,
        "completion recorded"
    );
    Ok(state)
}
