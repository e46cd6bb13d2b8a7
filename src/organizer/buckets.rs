use super::dates::{is_later, is_overdue, is_this_week, is_today, is_tomorrow, is_yesterday};
use crate::domain::{Priority, Task};
use chrono::NaiveDateTime;

/// Most high-priority tasks shown at the top of the today view
pub const PRIORITY_LIMIT: usize = 3;

/// Task groupings for the today / upcoming / completed views.
///
/// `priority` and `today` never share a task. The other buckets are
/// independent views and may overlap with them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskBuckets {
    /// Incomplete high-priority tasks, easiest first, at most three
    pub priority: Vec<Task>,
    /// Incomplete tasks due today that are not high priority
    pub today: Vec<Task>,
    pub overdue: Vec<Task>,
    pub tomorrow: Vec<Task>,
    /// Due this week but not tomorrow
    pub this_week: Vec<Task>,
    /// Undated or due after the end of this week
    pub later: Vec<Task>,
    pub today_completed: Vec<Task>,
    pub yesterday_completed: Vec<Task>,
    pub other_completed: Vec<Task>,
}

impl TaskBuckets {
    /// Number of tasks on the today view (priority + today buckets)
    pub fn today_count(&self) -> usize {
        self.priority.len() + self.today.len()
    }

    /// Tomorrow, this week and later together
    pub fn upcoming_count(&self) -> usize {
        self.tomorrow.len() + self.this_week.len() + self.later.len()
    }

    pub fn completed_count(&self) -> usize {
        self.today_completed.len() + self.yesterday_completed.len() + self.other_completed.len()
    }
}

/// Split a task list into display buckets relative to `now`
pub fn classify_by_date(tasks: &[Task], now: NaiveDateTime) -> TaskBuckets {
    let (completed, incomplete): (Vec<&Task>, Vec<&Task>) = tasks.iter().partition(|t| t.completed);

    let mut priority = select(&incomplete, |t| t.priority == Priority::High);
    // Stable: equal difficulty keeps list order
    priority.sort_by_key(|t| t.difficulty);
    priority.truncate(PRIORITY_LIMIT);

    let today = select(&incomplete, |t| is_today(due(t), now) && t.priority != Priority::High);
    let overdue = select(&incomplete, |t| is_overdue(t, now));
    let tomorrow = select(&incomplete, |t| is_tomorrow(due(t), now));
    let this_week = select(&incomplete, |t| is_this_week(due(t), now) && !is_tomorrow(due(t), now));
    let later = select(&incomplete, |t| is_later(due(t), now));

    // Completed tasks are grouped by the day they were due
    let mut today_completed = Vec::new();
    let mut yesterday_completed = Vec::new();
    let mut other_completed = Vec::new();
    for task in completed {
        if is_today(due(task), now) {
            today_completed.push(task.clone());
        } else if is_yesterday(due(task), now) {
            yesterday_completed.push(task.clone());
        } else {
            other_completed.push(task.clone());
        }
    }

    TaskBuckets {
        priority,
        today,
        overdue,
        tomorrow,
        this_week,
        later,
        today_completed,
        yesterday_completed,
        other_completed,
    }
}

fn due(task: &Task) -> Option<&str> {
    task.due_date.as_deref()
}

fn select(tasks: &[&Task], pred: impl Fn(&Task) -> bool) -> Vec<Task> {
    tasks.iter().copied().filter(|t| pred(*t)).cloned().collect()
}
