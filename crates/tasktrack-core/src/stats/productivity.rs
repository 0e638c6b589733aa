//! Productivity histograms over rolling calendar windows.
//!
//! | view    | window     | buckets | bucket of `completed_at`          |
//! |---------|------------|---------|-----------------------------------|
//! | daily   | this week  | 7       | weekday, Sunday = 0               |
//! | weekly  | this month | 5       | `(day_of_month - 1) / 7`          |
//! | monthly | this year  | 12      | month, January = 0                |

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::calendar::{
    sunday_weekday_index, this_month_range, this_week_range, this_year_range, DateRange,
};
use crate::error::{CoreError, Result};
use crate::storage::TaskSource;
use crate::task::Task;

/// Histogram granularity selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    Daily,
    Weekly,
    Monthly,
}

impl ViewMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ViewMode::Daily => "daily",
            ViewMode::Weekly => "weekly",
            ViewMode::Monthly => "monthly",
        }
    }

    /// Time window the view covers at `now`.
    pub fn window(&self, now: DateTime<Utc>) -> DateRange {
        match self {
            ViewMode::Daily => this_week_range(now),
            ViewMode::Weekly => this_month_range(now),
            ViewMode::Monthly => this_year_range(now),
        }
    }

    /// Fixed histogram length.
    pub fn bucket_count(&self) -> usize {
        match self {
            ViewMode::Daily => 7,
            ViewMode::Weekly => 5,
            ViewMode::Monthly => 12,
        }
    }

    /// Bucket a completion instant falls into.
    pub fn bucket_index(&self, completed_at: DateTime<Utc>) -> usize {
        match self {
            ViewMode::Daily => usize::from(sunday_weekday_index(completed_at)),
            // Days 29-31 share the fifth bucket.
            ViewMode::Weekly => ((completed_at.day0() / 7) as usize).min(4),
            ViewMode::Monthly => completed_at.month0() as usize,
        }
    }
}

impl fmt::Display for ViewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ViewMode {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "daily" => Ok(ViewMode::Daily),
            "weekly" => Ok(ViewMode::Weekly),
            "monthly" => Ok(ViewMode::Monthly),
            other => Err(CoreError::InvalidViewMode(other.to_string())),
        }
    }
}

/// Fixed-length completion counts; serializes as a flat JSON array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductivityHistogram(Vec<u64>);

impl ProductivityHistogram {
    fn zeroed(len: usize) -> Self {
        Self(vec![0; len])
    }

    pub fn buckets(&self) -> &[u64] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn total(&self) -> u64 {
        self.0.iter().sum()
    }
}

/// Folds completed tasks into a histogram for one view.
#[derive(Debug, Clone, Copy)]
pub struct ProductivityAggregator {
    view: ViewMode,
}

impl ProductivityAggregator {
    pub fn new(view: ViewMode) -> Self {
        Self { view }
    }

    /// Count completed, non-deleted tasks whose `completed_at` lies in the
    /// view's window at `now`. Everything else contributes nothing.
    pub fn aggregate<'a, I>(&self, tasks: I, now: DateTime<Utc>) -> ProductivityHistogram
    where
        I: IntoIterator<Item = &'a Task>,
    {
        let window = self.view.window(now);
        let mut histogram = ProductivityHistogram::zeroed(self.view.bucket_count());

        for completed_at in tasks
            .into_iter()
            .filter(|task| task.is_live_completion())
            .filter_map(|task| task.completed_at)
            .filter(|completed_at| window.contains(*completed_at))
        {
            histogram.0[self.view.bucket_index(completed_at)] += 1;
        }

        histogram
    }
}

/// Histogram of a user's completions for `view` at `now`.
///
/// # Errors
/// Store failures are returned unchanged.
pub fn productivity<S: TaskSource + ?Sized>(
    source: &S,
    user_id: &str,
    view: ViewMode,
    now: DateTime<Utc>,
) -> Result<ProductivityHistogram> {
    let window = view.window(now);
    let tasks = source.completed_tasks_in_range(user_id, window.start, window.end)?;
    let histogram = ProductivityAggregator::new(view).aggregate(&tasks, now);
    tracing::debug!(
        user = user_id,
        view = %view,
        fetched = tasks.len(),
        counted = histogram.total(),
        "productivity histogram"
    );
    Ok(histogram)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::{NewTask, TaskPatch, TaskStatus};
    use chrono::{Duration, TimeZone};
    use proptest::prelude::*;

    fn utc(year: i32, month: u32, day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(year, month, day, hour, 0, 0).unwrap()
    }

    fn completed_at(at: DateTime<Utc>) -> Task {
        let mut task = Task::create(
            "u1",
            NewTask {
                title: "done".into(),
                ..NewTask::default()
            },
            at - Duration::days(400),
        )
        .unwrap();
        task.apply(TaskPatch::complete(), at).unwrap();
        task
    }

    #[test]
    fn view_mode_parse() {
        assert_eq!("daily".parse::<ViewMode>().unwrap(), ViewMode::Daily);
        assert_eq!("weekly".parse::<ViewMode>().unwrap(), ViewMode::Weekly);
        assert_eq!("monthly".parse::<ViewMode>().unwrap(), ViewMode::Monthly);
        for bad in ["", "Daily", "yearly"] {
            assert!(matches!(
                bad.parse::<ViewMode>(),
                Err(CoreError::InvalidViewMode(_))
            ));
        }
    }

    #[test]
    fn monthly_scenario_january_and_march() {
        let now = utc(2024, 6, 15, 12);
        let tasks = vec![
            completed_at(utc(2024, 1, 3, 9)),
            completed_at(utc(2024, 1, 17, 9)),
            completed_at(utc(2024, 1, 31, 23)),
            completed_at(utc(2024, 3, 5, 9)),
        ];
        let histogram = ProductivityAggregator::new(ViewMode::Monthly).aggregate(&tasks, now);
        assert_eq!(histogram.buckets(), &[3, 0, 1, 0, 0, 0, 0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn daily_buckets_use_sunday_zero() {
        // Week of Sunday 2024-03-03 .. Saturday 2024-03-09
        let now = utc(2024, 3, 6, 12);
        let tasks = vec![
            completed_at(utc(2024, 3, 3, 8)),
            completed_at(utc(2024, 3, 4, 8)),
            completed_at(utc(2024, 3, 9, 23)),
            completed_at(utc(2024, 3, 9, 1)),
            // Previous Saturday, outside the window
            completed_at(utc(2024, 3, 2, 12)),
        ];
        let histogram = ProductivityAggregator::new(ViewMode::Daily).aggregate(&tasks, now);
        assert_eq!(histogram.buckets(), &[1, 1, 0, 0, 0, 0, 2]);
    }

    #[test]
    fn weekly_buckets_by_day_of_month() {
        let now = utc(2024, 3, 20, 12);
        let tasks: Vec<Task> = [1, 7, 8, 14, 15, 22, 28, 29, 31]
            .into_iter()
            .map(|day| completed_at(utc(2024, 3, day, 10)))
            .collect();
        let histogram = ProductivityAggregator::new(ViewMode::Weekly).aggregate(&tasks, now);
        assert_eq!(histogram.buckets(), &[2, 2, 1, 2, 2]);
    }

    #[test]
    fn excludes_pending_deleted_and_out_of_window() {
        let now = utc(2024, 3, 20, 12);
        let mut deleted = completed_at(utc(2024, 3, 10, 9));
        deleted.soft_delete(utc(2024, 3, 11, 9));
        let mut pending = completed_at(utc(2024, 3, 10, 9));
        pending.status = TaskStatus::Pending;
        let last_month = completed_at(utc(2024, 2, 28, 9));
        let tasks = vec![deleted, pending, last_month, completed_at(utc(2024, 3, 10, 9))];

        let histogram = ProductivityAggregator::new(ViewMode::Weekly).aggregate(&tasks, now);
        assert_eq!(histogram.total(), 1);
        assert_eq!(histogram.buckets()[1], 1);
    }

    #[test]
    fn empty_input_yields_zeroed_histogram_of_view_length() {
        let now = utc(2024, 3, 20, 12);
        for (view, len) in [
            (ViewMode::Daily, 7),
            (ViewMode::Weekly, 5),
            (ViewMode::Monthly, 12),
        ] {
            let histogram = ProductivityAggregator::new(view).aggregate(std::iter::empty::<&Task>(), now);
            assert_eq!(histogram.len(), len);
            assert_eq!(histogram.total(), 0);
        }
    }

    #[test]
    fn histogram_serializes_as_flat_array() {
        let histogram = ProductivityAggregator::new(ViewMode::Weekly)
            .aggregate(&[completed_at(utc(2024, 3, 2, 9))], utc(2024, 3, 5, 0));
        assert_eq!(serde_json::to_string(&histogram).unwrap(), "[1,0,0,0,0]");
    }

    fn arb_view() -> impl Strategy<Value = ViewMode> {
        prop_oneof![
            Just(ViewMode::Daily),
            Just(ViewMode::Weekly),
            Just(ViewMode::Monthly)
        ]
    }

    proptest! {
        #[test]
        fn prop_total_matches_in_window_count(
            view in arb_view(),
            now_offset in 0i64..(3 * 365 * 24),
            offsets in proptest::collection::vec(-(400i64 * 24)..(400 * 24), 0..60),
        ) {
            let now = utc(2022, 1, 1, 0) + Duration::hours(now_offset);
            let tasks: Vec<Task> = offsets
                .iter()
                .map(|h| completed_at(now + Duration::hours(*h)))
                .collect();
            let window = view.window(now);
            let expected = tasks
                .iter()
                .filter(|t| t.completed_at.is_some_and(|c| window.contains(c)))
                .count() as u64;

            let histogram = ProductivityAggregator::new(view).aggregate(&tasks, now);
            prop_assert_eq!(histogram.len(), view.bucket_count());
            prop_assert_eq!(histogram.total(), expected);
        }
    }
}
