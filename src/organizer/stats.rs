use super::buckets::TaskBuckets;
use crate::domain::{Mood, Task};

/// Counters shown above the task list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TaskStats {
    pub total: usize,
    pub completed: usize,
    pub incomplete: usize,
    /// High-priority tasks still open
    pub high_priority: usize,
    pub overdue: usize,
    /// Tasks on the today view
    pub today: usize,
}

/// Calculate list statistics from the tasks and their buckets
pub fn calculate_stats(tasks: &[Task], buckets: &TaskBuckets) -> TaskStats {
    let completed = tasks.iter().filter(|t| t.completed).count();

    TaskStats {
        total: tasks.len(),
        completed,
        incomplete: tasks.len() - completed,
        high_priority: tasks
            .iter()
            .filter(|t| t.is_high_priority() && !t.completed)
            .count(),
        overdue: buckets.overdue.len(),
        today: buckets.today_count(),
    }
}

/// Rounded share of completed tasks, zero for an empty list
pub fn completion_percentage(completed: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    ((completed as f64 / total as f64) * 100.0).round().min(100.0) as u8
}

/// Message shown after finishing a task
pub fn celebration_message(percent: u8) -> &'static str {
    match percent {
        100.. => "Incredible work! You've completed everything planned for today!",
        75..=99 => "You're on fire! Almost there - fantastic progress today!",
        50..=74 => "Great momentum! You're making solid progress today!",
        _ => "Every step counts! You're building positive momentum!",
    }
}

/// Message shown on the evening summary
pub fn day_summary_message(completed: usize, percent: u8) -> &'static str {
    match percent {
        100.. => "Perfect day! You completed everything you set out to do! 🌟",
        75..=99 => "Excellent progress! You accomplished most of your goals today! 🚀",
        50..=74 => "Solid work today! You're building great momentum! 💪",
        _ if completed > 0 => "Every step counts! You made progress and that's what matters! 🌊",
        _ => "Tomorrow is a fresh start! Sometimes rest days are exactly what we need! 🌱",
    }
}

/// Compare the evening mood against the morning check-in
pub fn mood_change_message(morning: Mood, evening: Mood) -> &'static str {
    match evening.value().cmp(&morning.value()) {
        std::cmp::Ordering::Greater => "Your mood improved throughout the day! 📈",
        std::cmp::Ordering::Equal => "You maintained your energy well today! ⚖️",
        std::cmp::Ordering::Less => "Rest well tonight - tomorrow brings new opportunities! 🌙",
    }
}
