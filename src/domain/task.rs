use super::enums::{Difficulty, Priority};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

pub const UNTITLED: &str = "Untitled Task";
pub const UNCATEGORIZED: &str = "Uncategorized";
pub const DEFAULT_ESTIMATE_MINUTES: u32 = 30;

/// Errors raised when building a task from user input
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TaskError {
    #[error("task title cannot be empty")]
    EmptyTitle,
    #[error("estimated time must be at least one minute")]
    ZeroEstimate,
    #[error("difficulty must be 1, 2 or 3 (got {0})")]
    InvalidDifficulty(u8),
    #[error("priority must be 1, 2 or 3 (got {0})")]
    InvalidPriority(u8),
    #[error("mood must be between 1 and 5 (got {0})")]
    InvalidMood(u8),
    #[error("no task with id {0}")]
    NotFound(String),
}

/// A single unit of work.
///
/// Tasks are treated as values: completing or editing one produces a new
/// `Task` that replaces the old one by id (see [`replace_task`]).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub title: String,
    pub description: String,
    pub category: String,
    pub difficulty: Difficulty,
    pub priority: Priority,
    /// Estimate in minutes, always positive
    pub estimated_time: u32,
    /// Calendar date or one of the free-text tokens ("today", "tomorrow", "...week...")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    pub completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress: Option<u8>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub micro_tasks: Vec<String>,
}

impl Task {
    /// Validate a loosely-shaped record, filling in defaults for anything
    /// missing or out of range. Never fails.
    pub fn from_record(record: TaskRecord) -> Self {
        let id = non_blank(record.id).unwrap_or_else(|| {
            debug!("task record without id, assigning a new one");
            Uuid::new_v4().to_string()
        });

        let title = non_blank(record.title).unwrap_or_else(|| UNTITLED.to_string());
        let category = non_blank(record.category).unwrap_or_else(|| UNCATEGORIZED.to_string());

        let difficulty = record
            .difficulty
            .and_then(|d| Difficulty::try_from(d).ok())
            .unwrap_or(Difficulty::Medium);
        let priority = record
            .priority
            .and_then(|p| Priority::try_from(p).ok())
            .unwrap_or(Priority::Medium);

        let estimated_time = match record.estimated_time {
            Some(minutes) if minutes > 0 => minutes,
            _ => DEFAULT_ESTIMATE_MINUTES,
        };

        let completed = record.completed.unwrap_or(false);
        let progress = record.progress.map(|p| p.min(100) as u8);

        Self {
            id,
            title,
            description: record.description.unwrap_or_default(),
            category,
            difficulty,
            priority,
            estimated_time,
            due_date: non_blank(record.due_date),
            completed,
            progress,
            micro_tasks: clean_steps(record.micro_tasks.unwrap_or_default()),
        }
    }

    /// Copy of this task marked as finished
    pub fn completed(&self) -> Self {
        Self {
            completed: true,
            progress: Some(100),
            ..self.clone()
        }
    }

    pub fn is_high_priority(&self) -> bool {
        self.priority == Priority::High
    }

    /// Text fields searched by the task list query
    pub fn searchable_fields(&self) -> impl Iterator<Item = &str> {
        [self.title.as_str(), self.description.as_str(), self.category.as_str()]
            .into_iter()
            .chain(self.micro_tasks.iter().map(String::as_str))
    }
}

/// Persisted task shape as it may arrive from storage: every field optional,
/// numbers unchecked.
///
/// Deserialization never fails on a field: a value of the wrong type reads as
/// absent, so [`Task::from_record`] substitutes the default for it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskRecord {
    #[serde(default, deserialize_with = "lenient::text")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "lenient::difficulty")]
    pub difficulty: Option<u8>,
    #[serde(default, deserialize_with = "lenient::priority")]
    pub priority: Option<u8>,
    #[serde(default, deserialize_with = "lenient::minutes")]
    pub estimated_time: Option<u32>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub due_date: Option<String>,
    #[serde(default, deserialize_with = "lenient::flag")]
    pub completed: Option<bool>,
    #[serde(default, deserialize_with = "lenient::percent")]
    pub progress: Option<u32>,
    #[serde(default, deserialize_with = "lenient::steps")]
    pub micro_tasks: Option<Vec<String>>,
}

/// Field deserializers for [`TaskRecord`] that coerce what they can and read
/// everything else as `None`.
mod lenient {
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;
    use tracing::debug;

    fn value<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Value>, D::Error> {
        Option::<Value>::deserialize(deserializer)
    }

    fn ignored<T>(field: &str, value: &Value) -> Option<T> {
        debug!(field, %value, "ignoring task field of unexpected type");
        None
    }

    /// Number as f64, accepting numeric strings
    fn number(value: &Value) -> Option<f64> {
        match value {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Strings as-is, numbers in their JSON form (`7` -> "7")
    pub fn text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
        Ok(match value(deserializer)? {
            None => None,
            Some(Value::String(s)) => Some(s),
            Some(Value::Number(n)) => Some(n.to_string()),
            Some(other) => ignored("text", &other),
        })
    }

    /// 1..=3, or the labels Easy / Medium / Hard (Complex)
    pub fn difficulty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u8>, D::Error> {
        let Some(v) = value(deserializer)? else { return Ok(None) };
        let label = v.as_str().map(|s| s.trim().to_lowercase());
        Ok(match label.as_deref() {
            Some("easy") => Some(1),
            Some("medium") => Some(2),
            Some("hard") | Some("complex") => Some(3),
            _ => level(&v).or_else(|| ignored("difficulty", &v)),
        })
    }

    /// 1..=3, or the labels High / Medium / Low
    pub fn priority<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u8>, D::Error> {
        let Some(v) = value(deserializer)? else { return Ok(None) };
        let label = v.as_str().map(|s| s.trim().to_lowercase());
        Ok(match label.as_deref() {
            Some("high") => Some(1),
            Some("medium") => Some(2),
            Some("low") => Some(3),
            _ => level(&v).or_else(|| ignored("priority", &v)),
        })
    }

    // Out-of-range levels are left for the range check in `from_record`
    fn level(value: &Value) -> Option<u8> {
        let n = number(value)?.round();
        (0.0..=f64::from(u8::MAX)).contains(&n).then_some(n as u8)
    }

    /// Whole minutes, fractions rounded; zero and negatives read as absent
    pub fn minutes<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u32>, D::Error> {
        let Some(v) = value(deserializer)? else { return Ok(None) };
        Ok(match number(&v).map(f64::round) {
            Some(n) if n >= 1.0 && n <= f64::from(u32::MAX) => Some(n as u32),
            _ => ignored("estimatedTime", &v),
        })
    }

    /// Rounded percentage; negatives clamp to zero (the upper clamp is in `from_record`)
    pub fn percent<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u32>, D::Error> {
        let Some(v) = value(deserializer)? else { return Ok(None) };
        Ok(match number(&v) {
            Some(n) if n.is_finite() => Some(n.round().clamp(0.0, f64::from(u32::MAX)) as u32),
            _ => ignored("progress", &v),
        })
    }

    pub fn flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<bool>, D::Error> {
        let Some(v) = value(deserializer)? else { return Ok(None) };
        Ok(match &v {
            Value::Bool(b) => Some(*b),
            Value::String(s) if s.eq_ignore_ascii_case("true") => Some(true),
            Value::String(s) if s.eq_ignore_ascii_case("false") => Some(false),
            _ => ignored("completed", &v),
        })
    }

    /// A list of steps; non-text entries are dropped, a lone string is one step
    pub fn steps<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Vec<String>>, D::Error> {
        let Some(v) = value(deserializer)? else { return Ok(None) };
        Ok(match v {
            Value::Array(items) => Some(
                items
                    .into_iter()
                    .filter_map(|item| match item {
                        Value::String(s) => Some(s),
                        Value::Number(n) => Some(n.to_string()),
                        _ => None,
                    })
                    .collect(),
            ),
            Value::String(s) => Some(vec![s]),
            other => ignored("microTasks", &other),
        })
    }
}

/// Values collected by the add-task form
#[derive(Debug, Clone)]
pub struct TaskDraft {
    pub title: String,
    pub description: String,
    pub category: Option<String>,
    pub difficulty: Difficulty,
    pub priority: Priority,
    pub estimated_time: u32,
    pub due_date: Option<String>,
    pub micro_tasks: Vec<String>,
}

impl TaskDraft {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: String::new(),
            category: None,
            difficulty: Difficulty::Easy,
            priority: Priority::Medium,
            estimated_time: DEFAULT_ESTIMATE_MINUTES,
            due_date: None,
            micro_tasks: Vec::new(),
        }
    }

    /// Build a fresh task with a new id, `completed = false` and zero progress
    pub fn into_task(self, default_category: &str) -> Result<Task, TaskError> {
        let title = self.title.trim().to_string();
        if title.is_empty() {
            return Err(TaskError::EmptyTitle);
        }
        if self.estimated_time == 0 {
            return Err(TaskError::ZeroEstimate);
        }

        let category = non_blank(self.category).unwrap_or_else(|| default_category.to_string());

        Ok(Task {
            id: Uuid::new_v4().to_string(),
            title,
            description: self.description.trim().to_string(),
            category,
            difficulty: self.difficulty,
            priority: self.priority,
            estimated_time: self.estimated_time,
            due_date: non_blank(self.due_date),
            completed: false,
            progress: Some(0),
            micro_tasks: clean_steps(self.micro_tasks),
        })
    }
}

/// Return a new list where the task with the same id is swapped for `task`
pub fn replace_task(tasks: &[Task], task: Task) -> Result<Vec<Task>, TaskError> {
    if !tasks.iter().any(|t| t.id == task.id) {
        return Err(TaskError::NotFound(task.id));
    }

    Ok(tasks
        .iter()
        .map(|t| if t.id == task.id { task.clone() } else { t.clone() })
        .collect())
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn clean_steps(steps: Vec<String>) -> Vec<String> {
    steps
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_from_record_fills_defaults() {
        let task = Task::from_record(TaskRecord::default());

        assert!(!task.id.is_empty());
        assert_eq!(task.title, UNTITLED);
        assert_eq!(task.category, UNCATEGORIZED);
        assert_eq!(task.difficulty, Difficulty::Medium);
        assert_eq!(task.priority, Priority::Medium);
        assert_eq!(task.estimated_time, DEFAULT_ESTIMATE_MINUTES);
        assert_eq!(task.due_date, None);
        assert!(!task.completed);
    }

    #[test]
    fn test_from_record_rejects_out_of_range_numbers() {
        let task = Task::from_record(TaskRecord {
            difficulty: Some(0),
            priority: Some(9),
            estimated_time: Some(0),
            progress: Some(250),
            ..TaskRecord::default()
        });

        assert_eq!(task.difficulty, Difficulty::Medium);
        assert_eq!(task.priority, Priority::Medium);
        assert_eq!(task.estimated_time, DEFAULT_ESTIMATE_MINUTES);
        assert_eq!(task.progress, Some(100));
    }

    #[test]
    fn test_from_record_parses_camel_case_json() {
        let json = r#"{
            "id": "1",
            "title": "Review quarterly reports",
            "estimatedTime": 45,
            "difficulty": 2,
            "category": "Work",
            "priority": 1,
            "completed": false,
            "progress": 20,
            "microTasks": ["Open reports folder", "  "],
            "dueDate": "Today"
        }"#;
        let record: TaskRecord = serde_json::from_str(json).unwrap();
        let task = Task::from_record(record);

        assert_eq!(task.id, "1");
        assert_eq!(task.estimated_time, 45);
        assert_eq!(task.priority, Priority::High);
        assert_eq!(task.due_date.as_deref(), Some("Today"));
        assert_eq!(task.micro_tasks, vec!["Open reports folder".to_string()]);
        assert_eq!(task.description, "");
    }

    #[test]
    fn test_record_tolerates_wrong_field_types() {
        let json = r#"{
            "id": 7,
            "title": "Stretch",
            "difficulty": "Complex",
            "priority": "low",
            "estimatedTime": 22.5,
            "completed": "yes",
            "progress": -5,
            "microTasks": ["Mat", 3, null],
            "dueDate": {"when": "soon"}
        }"#;
        let record: TaskRecord = serde_json::from_str(json).unwrap();
        let task = Task::from_record(record);

        assert_eq!(task.id, "7");
        assert_eq!(task.difficulty, Difficulty::Hard);
        assert_eq!(task.priority, Priority::Low);
        assert_eq!(task.estimated_time, 23);
        assert!(!task.completed);
        assert_eq!(task.progress, Some(0));
        assert_eq!(task.micro_tasks, vec!["Mat".to_string(), "3".to_string()]);
        assert_eq!(task.due_date, None);
    }

    #[test]
    fn test_record_unknown_labels_fall_back() {
        let record: TaskRecord =
            serde_json::from_str(r#"{"difficulty": "Brutal", "priority": [1], "estimatedTime": -10}"#).unwrap();
        let task = Task::from_record(record);

        assert_eq!(task.difficulty, Difficulty::Medium);
        assert_eq!(task.priority, Priority::Medium);
        assert_eq!(task.estimated_time, DEFAULT_ESTIMATE_MINUTES);
    }

    #[test]
    fn test_draft_requires_title() {
        let draft = TaskDraft::new("   ");
        assert_eq!(draft.into_task("Personal"), Err(TaskError::EmptyTitle));
    }

    #[test]
    fn test_draft_rejects_zero_estimate() {
        let mut draft = TaskDraft::new("Stretch");
        draft.estimated_time = 0;
        assert_eq!(draft.into_task("Personal"), Err(TaskError::ZeroEstimate));
    }

    #[test]
    fn test_draft_into_task() {
        let mut draft = TaskDraft::new("  Call mom  ");
        draft.micro_tasks = vec!["Find a quiet moment".into(), "".into()];
        draft.due_date = Some("".into());

        let task = draft.into_task("Personal").unwrap();
        assert_eq!(task.title, "Call mom");
        assert_eq!(task.category, "Personal");
        assert_eq!(task.progress, Some(0));
        assert!(!task.completed);
        assert_eq!(task.due_date, None);
        assert_eq!(task.micro_tasks.len(), 1);
    }

    #[test]
    fn test_completed_copy() {
        let task = TaskDraft::new("Write notes").into_task("Work").unwrap();
        let done = task.completed();

        assert!(!task.completed);
        assert!(done.completed);
        assert_eq!(done.progress, Some(100));
        assert_eq!(done.id, task.id);
    }

    #[test]
    fn test_replace_task() {
        let a = TaskDraft::new("A").into_task("Work").unwrap();
        let b = TaskDraft::new("B").into_task("Work").unwrap();
        let tasks = vec![a.clone(), b.clone()];

        let updated = replace_task(&tasks, b.completed()).unwrap();
        assert_eq!(updated[0], a);
        assert!(updated[1].completed);
        assert!(!tasks[1].completed);

        let stranger = TaskDraft::new("C").into_task("Work").unwrap();
        assert_eq!(
            replace_task(&tasks, stranger.clone()),
            Err(TaskError::NotFound(stranger.id))
        );
    }

    #[test]
    fn test_searchable_fields_include_micro_tasks() {
        let mut draft = TaskDraft::new("Plan hike");
        draft.description = "Saturday".into();
        draft.micro_tasks = vec!["Pack gear".into()];
        let task = draft.into_task("Health").unwrap();

        let fields: Vec<&str> = task.searchable_fields().collect();
        assert_eq!(fields, vec!["Plan hike", "Saturday", "Health", "Pack gear"]);
    }
}
