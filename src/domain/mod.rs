pub mod enums;
pub mod focus;
pub mod task;

pub use enums::{Difficulty, Mood, Priority};
pub use focus::{format_clock, FocusTimer};
pub use task::{replace_task, Task, TaskDraft, TaskError, TaskRecord, UNCATEGORIZED, UNTITLED};
