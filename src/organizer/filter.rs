use super::dates::{due_timestamp, is_overdue, is_this_week, is_today, is_tomorrow};
use crate::domain::{Priority, Task};
use chrono::NaiveDateTime;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Completion / priority filter of the task list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Completed,
    Incomplete,
    High,
    Medium,
    Low,
}

impl StatusFilter {
    pub fn matches(&self, task: &Task) -> bool {
        match self {
            Self::All => true,
            Self::Completed => task.completed,
            Self::Incomplete => !task.completed,
            Self::High => task.priority == Priority::High,
            Self::Medium => task.priority == Priority::Medium,
            Self::Low => task.priority == Priority::Low,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Completed => "completed",
            Self::Incomplete => "incomplete",
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

impl FromStr for StatusFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "all" => Ok(Self::All),
            "completed" | "done" => Ok(Self::Completed),
            "incomplete" | "open" => Ok(Self::Incomplete),
            "high" => Ok(Self::High),
            "medium" => Ok(Self::Medium),
            "low" => Ok(Self::Low),
            other => Err(format!("unknown status filter: {}", other)),
        }
    }
}

/// Due-date filter of the task list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DateFilter {
    #[default]
    All,
    Today,
    Tomorrow,
    ThisWeek,
    Overdue,
    NoDate,
}

impl DateFilter {
    /// `NoDate` means the field is absent; blank text still counts as a date
    pub fn matches(&self, task: &Task, now: NaiveDateTime) -> bool {
        let due = task.due_date.as_deref();
        match self {
            Self::All => true,
            Self::Today => is_today(due, now),
            Self::Tomorrow => is_tomorrow(due, now),
            Self::ThisWeek => is_this_week(due, now),
            Self::Overdue => is_overdue(task, now),
            Self::NoDate => due.is_none(),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Today => "today",
            Self::Tomorrow => "tomorrow",
            Self::ThisWeek => "this-week",
            Self::Overdue => "overdue",
            Self::NoDate => "no-date",
        }
    }
}

impl FromStr for DateFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "all" => Ok(Self::All),
            "today" => Ok(Self::Today),
            "tomorrow" => Ok(Self::Tomorrow),
            "this-week" | "week" => Ok(Self::ThisWeek),
            "overdue" => Ok(Self::Overdue),
            "no-date" | "none" => Ok(Self::NoDate),
            other => Err(format!("unknown date filter: {}", other)),
        }
    }
}

/// Field the task list is ordered by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    #[default]
    Priority,
    Difficulty,
    EstimatedTime,
    DueDate,
    Category,
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "priority" => Ok(Self::Priority),
            "difficulty" => Ok(Self::Difficulty),
            "time" | "estimated-time" | "estimatedtime" => Ok(Self::EstimatedTime),
            "due" | "due-date" | "duedate" => Ok(Self::DueDate),
            "category" => Ok(Self::Category),
            other => Err(format!("unknown sort key: {}", other)),
        }
    }
}

/// Search, filter and sort settings of the "all tasks" view
#[derive(Debug, Clone, Default)]
pub struct TaskQuery {
    pub search: String,
    pub status: StatusFilter,
    /// `None` means every category
    pub category: Option<String>,
    pub date: DateFilter,
    pub sort: SortKey,
}

impl TaskQuery {
    /// Whether any filter narrows the list
    pub fn is_filtered(&self) -> bool {
        !self.search.trim().is_empty()
            || self.status != StatusFilter::All
            || self.category.is_some()
            || self.date != DateFilter::All
    }

    /// Search text, status, category and date filters all hold
    pub fn matches(&self, task: &Task, now: NaiveDateTime) -> bool {
        matches_search(task, &self.search)
            && self.status.matches(task)
            && self.category.as_deref().map_or(true, |c| task.category == c)
            && self.date.matches(task, now)
    }
}

fn matches_search(task: &Task, query: &str) -> bool {
    if query.is_empty() {
        return true;
    }
    // Case-insensitive substring over title, description, category and steps
    let needle = query.to_lowercase();
    task.searchable_fields().any(|field| field.to_lowercase().contains(&needle))
}

/// Tasks matching every filter of `query`, ordered by its sort key.
/// Equal keys keep their list order.
pub fn filter_and_sort(tasks: &[Task], query: &TaskQuery, now: NaiveDateTime) -> Vec<Task> {
    let mut matching: Vec<Task> = tasks.iter().filter(|t| query.matches(t, now)).cloned().collect();
    sort_tasks(&mut matching, query.sort, now);
    matching
}

/// Stable in-place sort by a single key
pub fn sort_tasks(tasks: &mut [Task], key: SortKey, now: NaiveDateTime) {
    match key {
        SortKey::Priority => tasks.sort_by_key(|t| t.priority),
        SortKey::Difficulty => tasks.sort_by_key(|t| t.difficulty),
        SortKey::EstimatedTime => tasks.sort_by_key(|t| t.estimated_time),
        SortKey::DueDate => tasks.sort_by_cached_key(|t| due_rank(t, now)),
        SortKey::Category => tasks.sort_by(|a, b| compare_category(&a.category, &b.category)),
    }
}

/// Ordering rank for due dates: dated tasks by time, then text that could
/// not be read as a date (all equal), then undated tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum DueRank {
    Dated(NaiveDateTime),
    Unreadable,
    Undated,
}

fn due_rank(task: &Task, now: NaiveDateTime) -> DueRank {
    match task.due_date.as_deref() {
        None => DueRank::Undated,
        Some(raw) => match due_timestamp(raw, now) {
            Some(ts) => DueRank::Dated(ts),
            None => {
                debug!(task = %task.id, due = raw, "unreadable due date left in place while sorting");
                DueRank::Unreadable
            }
        },
    }
}

/// Case-insensitive first, raw text as tie breaker
fn compare_category(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase()).then_with(|| a.cmp(b))
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Priority => "priority",
            Self::Difficulty => "difficulty",
            Self::EstimatedTime => "estimated time",
            Self::DueDate => "due date",
            Self::Category => "category",
        };
        f.write_str(name)
    }
}
