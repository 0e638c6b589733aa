//! Statistics over a user's tasks: productivity histograms and status counts.

mod productivity;
mod task_counts;

pub use productivity::{productivity, ProductivityAggregator, ProductivityHistogram, ViewMode};
pub use task_counts::{count_tasks, TaskStats};
