use super::{atomic_write, read_file};
use crate::domain::{Task, TaskRecord};
use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const TASKS: &str = "tasks";
pub const LAST_MOOD_CHECK_IN: &str = "lastMoodCheckIn";
pub const TODAY_MOOD: &str = "todayMood";
pub const ONBOARDING_COMPLETED: &str = "onboardingCompleted";
pub const USER_NAME: &str = "userName";
pub const EMOTIONAL_PROFILE: &str = "emotionalProfile";
pub const COMMUNICATION_PREFS: &str = "communicationPrefs";
pub const INITIAL_TASKS: &str = "initialTasks";

/// String-keyed JSON storage the session reads and writes through
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<&Value>;
    fn set(&mut self, key: &str, value: Value) -> Result<()>;
}

/// Read a typed value; a value of the wrong shape reads as absent
pub fn get_as<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> Option<T> {
    let value = store.get(key)?;
    match serde_json::from_value(value.clone()) {
        Ok(v) => Some(v),
        Err(e) => {
            debug!(key, error = %e, "ignoring stored value of unexpected shape");
            None
        }
    }
}

pub fn set_as<T: Serialize>(store: &mut dyn KeyValueStore, key: &str, value: &T) -> Result<()> {
    let value = serde_json::to_value(value).with_context(|| format!("Failed to encode {}", key))?;
    store.set(key, value)
}

/// Load the task list, falling back to the tasks created during onboarding.
///
/// Entries go through the lenient record boundary; ones that are not even
/// objects are dropped.
pub fn load_tasks(store: &dyn KeyValueStore) -> Vec<Task> {
    let Some(Value::Array(items)) = store.get(TASKS).or_else(|| store.get(INITIAL_TASKS)) else {
        return Vec::new();
    };

    items
        .iter()
        .filter_map(|item| match serde_json::from_value::<TaskRecord>(item.clone()) {
            Ok(record) => Some(Task::from_record(record)),
            Err(e) => {
                debug!(error = %e, "dropping unreadable task entry");
                None
            }
        })
        .collect()
}

pub fn save_tasks(store: &mut dyn KeyValueStore, tasks: &[Task]) -> Result<()> {
    set_as(store, TASKS, &tasks)
}

/// Store kept only in memory
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: Map<String, Value>,
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    fn set(&mut self, key: &str, value: Value) -> Result<()> {
        self.values.insert(key.to_string(), value);
        Ok(())
    }
}

/// Store backed by a JSON object on disk, rewritten atomically on every set
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
    values: Map<String, Value>,
}

impl FileStore {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let content = read_file(&path)?;
        let values = if content.trim().is_empty() {
            Map::new()
        } else {
            serde_json::from_str(&content)
                .with_context(|| format!("Invalid store file: {}", path.display()))?
        };
        Ok(Self { path, values })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    fn set(&mut self, key: &str, value: Value) -> Result<()> {
        self.values.insert(key.to_string(), value);
        let json = serde_json::to_string_pretty(&self.values)?;
        atomic_write(&self.path, &json)?;
        info!(key, path = %self.path.display(), "store updated");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Difficulty;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use tempfile::tempdir;

    #[test]
    fn test_file_store_persists() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("store.json");

        let mut store = FileStore::open(&path).unwrap();
        assert!(store.get(TODAY_MOOD).is_none());
        store.set(TODAY_MOOD, json!(4)).unwrap();
        set_as(&mut store, USER_NAME, &"Sam").unwrap();

        let reopened = FileStore::open(&path).unwrap();
        assert_eq!(reopened.get(TODAY_MOOD), Some(&json!(4)));
        assert_eq!(get_as::<String>(&reopened, USER_NAME), Some("Sam".to_string()));
    }

    #[test]
    fn test_wrong_shape_reads_as_absent() {
        let mut store = MemoryStore::default();
        store.set(TODAY_MOOD, json!("sunny")).unwrap();
        assert_eq!(get_as::<u8>(&store, TODAY_MOOD), None);
    }

    #[test]
    fn test_load_tasks_applies_defaults() {
        let mut store = MemoryStore::default();
        store
            .set(
                TASKS,
                json!([
                    {"id": "a", "title": "Write", "priority": 1, "estimatedTime": 20},
                    {"id": "b", "title": "", "difficulty": 9},
                    "not a task"
                ]),
            )
            .unwrap();

        let tasks = load_tasks(&store);
        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[0].title, "Write");
        assert_eq!(tasks[0].estimated_time, 20);
        assert_eq!(tasks[1].title, "Untitled Task");
        assert_eq!(tasks[1].category, "Uncategorized");
    }

    #[test]
    fn test_load_tasks_falls_back_to_initial_tasks() {
        let mut store = MemoryStore::default();
        store.set(INITIAL_TASKS, json!([{"id": "x", "title": "From onboarding"}])).unwrap();
        assert_eq!(load_tasks(&store)[0].title, "From onboarding");

        save_tasks(&mut store, &[]).unwrap();
        assert!(load_tasks(&store).is_empty());
    }

    #[test]
    fn test_loosely_typed_tasks_survive_load_and_save() {
        let mut store = MemoryStore::default();
        store
            .set(
                INITIAL_TASKS,
                json!([
                    {"title": "Reply to emails", "category": "Work", "priority": 1, "difficulty": "Easy",
                     "aiReason": "Starting with easy wins for your energy level"},
                    {"id": 7, "title": "Book dentist", "difficulty": "Complex"},
                    {"id": "c", "title": "Read", "estimatedTime": 22.5},
                    {"id": "d", "title": "Stretch", "progress": -5}
                ]),
            )
            .unwrap();

        let tasks = load_tasks(&store);
        let titles: Vec<&str> = tasks.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["Reply to emails", "Book dentist", "Read", "Stretch"]);
        assert_eq!(tasks[0].difficulty, Difficulty::Easy);
        assert_eq!(tasks[1].id, "7");
        assert_eq!(tasks[1].difficulty, Difficulty::Hard);
        assert_eq!(tasks[2].estimated_time, 23);
        assert_eq!(tasks[3].progress, Some(0));

        // Saving and reloading keeps every task and its generated id
        save_tasks(&mut store, &tasks).unwrap();
        let reloaded = load_tasks(&store);
        assert_eq!(reloaded, tasks);
    }

    #[test]
    fn test_invalid_store_file() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("store.json");
        std::fs::write(&path, "[1, 2]").unwrap();
        assert!(FileStore::open(&path).is_err());
    }
}
