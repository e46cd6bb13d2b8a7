//! Derived, read-only views over a task list: date buckets, the filtered
//! "all tasks" list and the mood-based focus set. Every function takes the
//! reference time explicitly and leaves its input untouched.

pub mod buckets;
pub mod dates;
pub mod filter;
pub mod mood;
pub mod stats;

pub use buckets::{classify_by_date, TaskBuckets};
pub use dates::{end_of_week, is_later, is_overdue, is_this_week, is_today, is_tomorrow, is_yesterday};
pub use filter::{filter_and_sort, sort_tasks, DateFilter, SortKey, StatusFilter, TaskQuery};
pub use mood::{reorder_for_mood, FOCUS_LIMIT};
pub use stats::{
    calculate_stats, celebration_message, completion_percentage, day_summary_message,
    mood_change_message, TaskStats,
};
