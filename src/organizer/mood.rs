use crate::domain::{Difficulty, Mood, Task};
use std::cmp::Reverse;

/// Size of the "Today's Focus" list
pub const FOCUS_LIMIT: usize = 3;

/// Longest task (minutes) suggested on a low-energy day
pub const LOW_ENERGY_MAX_MINUTES: u32 = 30;

/// Pick up to three incomplete tasks suited to the given mood.
///
/// - Low (1-2): only easy/medium tasks of at most 30 minutes, easiest first.
/// - Neutral (3): most urgent first.
/// - High (4-5): most urgent first, harder work first within a priority.
pub fn reorder_for_mood(tasks: &[Task], mood: Mood) -> Vec<Task> {
    let mut picked: Vec<Task> = tasks.iter().filter(|t| !t.completed).cloned().collect();

    if mood.is_low() {
        picked.retain(|t| t.difficulty <= Difficulty::Medium && t.estimated_time <= LOW_ENERGY_MAX_MINUTES);
        picked.sort_by_key(|t| t.difficulty);
    } else if mood.is_high() {
        picked.sort_by_key(|t| (t.priority, Reverse(t.difficulty)));
    } else {
        picked.sort_by_key(|t| t.priority);
    }

    picked.truncate(FOCUS_LIMIT);
    picked
}
