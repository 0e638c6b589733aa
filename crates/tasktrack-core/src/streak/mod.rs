mod days;
mod engine;

pub use days::{StreakDays, MAX_WEEKDAY};
pub use engine::{load_streak, record_completion, StreakState, StreakTransition};
