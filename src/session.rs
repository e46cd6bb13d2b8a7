use crate::domain::{replace_task, Mood, Task, TaskDraft, TaskError};
use crate::flow::OnboardingProfile;
use crate::organizer::{
    calculate_stats, classify_by_date, completion_percentage, filter_and_sort, reorder_for_mood, TaskBuckets,
    TaskQuery, TaskStats,
};
use crate::persistence::store::{
    COMMUNICATION_PREFS, EMOTIONAL_PROFILE, INITIAL_TASKS, LAST_MOOD_CHECK_IN, ONBOARDING_COMPLETED,
    TODAY_MOOD, USER_NAME,
};
use crate::persistence::{get_as, load_tasks, save_tasks, set_as, KeyValueStore, Settings};
use anyhow::Result;
use chrono::{NaiveDate, NaiveDateTime};
use serde_json::json;
use tracing::{debug, info};

/// Result of completing a task
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub task: Task,
    /// Every task in the list is now done
    pub all_done: bool,
    pub percent: u8,
}

/// Task list, today's mood and check-in state for one run of the app
#[derive(Debug, Clone)]
pub struct Session {
    tasks: Vec<Task>,
    mood: Option<Mood>,
    checked_in: bool,
    settings: Settings,
}

impl Session {
    pub fn new(tasks: Vec<Task>, settings: Settings) -> Self {
        Self {
            tasks,
            mood: None,
            checked_in: false,
            settings,
        }
    }

    /// Restore tasks and, if the check-in happened today, today's mood
    pub fn load(store: &dyn KeyValueStore, settings: Settings, today: NaiveDate) -> Self {
        let mut session = Self::new(load_tasks(store), settings);

        // A mood from an earlier day does not carry over
        let last = get_as::<NaiveDate>(store, LAST_MOOD_CHECK_IN);
        if last == Some(today) {
            session.mood = get_as::<u8>(store, TODAY_MOOD).and_then(|m| Mood::new(m).ok());
            session.checked_in = session.mood.is_some();
        } else {
            debug!(?last, "no mood check-in for today");
        }
        session
    }

    /// Every task, in the order they were added
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Today's mood, if the check-in happened today
    pub fn mood(&self) -> Option<Mood> {
        self.mood
    }

    pub fn checked_in(&self) -> bool {
        self.checked_in
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Whether first-run setup has finished; a missing flag means no
    pub fn onboarded(store: &dyn KeyValueStore) -> bool {
        get_as::<bool>(store, ONBOARDING_COMPLETED).unwrap_or(false)
    }

    pub fn user_name(store: &dyn KeyValueStore) -> Option<String> {
        get_as::<String>(store, USER_NAME).filter(|n| !n.trim().is_empty())
    }

    /// Record today's mood
    pub fn check_in(&mut self, store: &mut dyn KeyValueStore, mood: Mood, today: NaiveDate) -> Result<()> {
        set_as(store, LAST_MOOD_CHECK_IN, &today)?;
        set_as(store, TODAY_MOOD, &mood)?;
        self.mood = Some(mood);
        self.checked_in = true;
        info!(mood = mood.value(), "mood check-in recorded");
        Ok(())
    }

    /// Build a task from the add-task form and append it
    pub fn add_task(&mut self, draft: TaskDraft) -> Result<&Task, TaskError> {
        let task = draft.into_task(&self.settings.default_category)?;
        debug!(id = %task.id, title = %task.title, "task added");
        self.tasks.push(task);
        Ok(&self.tasks[self.tasks.len() - 1])
    }

    /// Find a task by id or by a unique id prefix
    pub fn find(&self, id: &str) -> Result<&Task, TaskError> {
        if let Some(task) = self.tasks.iter().find(|t| t.id == id) {
            return Ok(task);
        }

        // Prefix match only when exactly one task has it
        let mut matching = self.tasks.iter().filter(|t| !id.is_empty() && t.id.starts_with(id));
        match (matching.next(), matching.next()) {
            (Some(task), None) => Ok(task),
            _ => Err(TaskError::NotFound(id.to_string())),
        }
    }

    /// Mark a task done, replacing it in the list by id
    pub fn complete_task(&mut self, id: &str) -> Result<Completion, TaskError> {
        let done = self.find(id)?.completed();
        self.tasks = replace_task(&self.tasks, done.clone())?;

        // Progress over the whole list, including earlier completions
        let completed = self.tasks.iter().filter(|t| t.completed).count();
        let completion = Completion {
            task: done,
            all_done: completed == self.tasks.len(),
            percent: completion_percentage(completed, self.tasks.len()),
        };
        info!(id = %completion.task.id, all_done = completion.all_done, "task completed");
        Ok(completion)
    }

    /// Put an updated task (e.g. from a finished focus timer) back into the list
    pub fn update_task(&mut self, task: Task) -> Result<(), TaskError> {
        self.tasks = replace_task(&self.tasks, task)?;
        Ok(())
    }

    /// Today's focus list for the current mood, neutral when not checked in
    pub fn focus(&self) -> Vec<Task> {
        reorder_for_mood(&self.tasks, self.mood.unwrap_or_default())
    }

    /// Tasks grouped by due date relative to `now`
    pub fn buckets(&self, now: NaiveDateTime) -> TaskBuckets {
        classify_by_date(&self.tasks, now)
    }

    /// Filtered and sorted copy of the task list
    pub fn query(&self, query: &TaskQuery, now: NaiveDateTime) -> Vec<Task> {
        filter_and_sort(&self.tasks, query, now)
    }

    pub fn stats(&self, now: NaiveDateTime) -> TaskStats {
        calculate_stats(&self.tasks, &self.buckets(now))
    }

    /// Write the whole task list back under `tasks`
    pub fn save(&self, store: &mut dyn KeyValueStore) -> Result<()> {
        save_tasks(store, &self.tasks)
    }

    /// Persist what onboarding collected and adopt its first tasks
    pub fn apply_onboarding(&mut self, store: &mut dyn KeyValueStore, profile: &OnboardingProfile) -> Result<()> {
        set_as(store, USER_NAME, &profile.user_name)?;
        set_as(store, EMOTIONAL_PROFILE, &profile.emotional_profile)?;
        store.set(
            COMMUNICATION_PREFS,
            json!({
                "method": profile.communication,
                "whatsappNumber": profile.whatsapp_number,
            }),
        )?;
        set_as(store, INITIAL_TASKS, &profile.initial_tasks)?;
        set_as(store, ONBOARDING_COMPLETED, &true)?;

        // Initial tasks join the live list so the next load finds them under `tasks`
        self.tasks.extend(profile.initial_tasks.iter().cloned());
        self.save(store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Difficulty, Priority, TaskRecord};
    use crate::persistence::MemoryStore;
    use pretty_assertions::assert_eq;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 5).unwrap()
    }

    fn now() -> NaiveDateTime {
        today().and_hms_opt(9, 0, 0).unwrap()
    }

    fn record(id: &str, due: Option<&str>) -> Task {
        Task::from_record(TaskRecord {
            id: Some(id.to_string()),
            title: Some(format!("Task {}", id)),
            due_date: due.map(str::to_string),
            ..TaskRecord::default()
        })
    }

    #[test]
    fn test_check_in_survives_reload_same_day_only() {
        let mut store = MemoryStore::default();
        let mut session = Session::load(&store, Settings::default(), today());
        assert!(!session.checked_in());

        session.check_in(&mut store, Mood::new(4).unwrap(), today()).unwrap();

        let reloaded = Session::load(&store, Settings::default(), today());
        assert!(reloaded.checked_in());
        assert_eq!(reloaded.mood(), Some(Mood::new(4).unwrap()));

        let next_day = Session::load(&store, Settings::default(), today().succ_opt().unwrap());
        assert!(!next_day.checked_in());
        assert_eq!(next_day.mood(), None);
    }

    #[test]
    fn test_add_task_uses_default_category() {
        let settings = Settings {
            default_category: "Work".into(),
            ..Settings::default()
        };
        let mut session = Session::new(Vec::new(), settings);

        let task = session.add_task(TaskDraft::new("Plan sprint")).unwrap();
        assert_eq!(task.category, "Work");
        assert!(!task.completed);

        assert_eq!(session.add_task(TaskDraft::new("   ")).err(), Some(TaskError::EmptyTitle));
        assert_eq!(session.tasks().len(), 1);
    }

    #[test]
    fn test_complete_task_reports_all_done() {
        let mut session = Session::new(vec![record("a1", None), record("b2", None)], Settings::default());

        let first = session.complete_task("a1").unwrap();
        assert!(!first.all_done);
        assert_eq!(first.percent, 50);
        assert_eq!(first.task.progress, Some(100));

        // Unique prefix
        let second = session.complete_task("b").unwrap();
        assert!(second.all_done);
        assert_eq!(second.percent, 100);

        assert_eq!(
            session.complete_task("zz").err(),
            Some(TaskError::NotFound("zz".to_string()))
        );
    }

    #[test]
    fn test_ambiguous_prefix_not_found() {
        let session = Session::new(vec![record("ab1", None), record("ab2", None)], Settings::default());
        assert!(session.find("ab").is_err());
        assert_eq!(session.find("ab2").unwrap().id, "ab2");
    }

    #[test]
    fn test_save_and_reload_tasks() {
        let mut store = MemoryStore::default();
        let session = Session::new(vec![record("a", Some("today"))], Settings::default());
        session.save(&mut store).unwrap();

        let reloaded = Session::load(&store, Settings::default(), today());
        assert_eq!(reloaded.tasks(), session.tasks());
        assert_eq!(reloaded.stats(now()).today, 1);
        assert_eq!(reloaded.buckets(now()).today.len(), 1);
    }

    #[test]
    fn test_focus_defaults_to_neutral() {
        let mut high = record("h", None);
        high.priority = Priority::High;
        high.difficulty = Difficulty::Hard;
        let session = Session::new(vec![record("m", None), high], Settings::default());

        let focus: Vec<String> = session.focus().into_iter().map(|t| t.id).collect();
        assert_eq!(focus, vec!["h".to_string(), "m".to_string()]);
    }

    #[test]
    fn test_apply_onboarding_persists_profile() {
        let mut store = MemoryStore::default();
        let mut session = Session::new(Vec::new(), Settings::default());
        let profile = OnboardingProfile {
            user_name: "Sam".into(),
            emotional_profile: vec!["guilt".into()],
            communication: "whatsapp".into(),
            whatsapp_number: Some("+100".into()),
            mood: Mood::new(3).unwrap(),
            initial_tasks: vec![record("first", Some("today"))],
            skipped: false,
        };

        session.apply_onboarding(&mut store, &profile).unwrap();

        assert!(Session::onboarded(&store));
        assert_eq!(Session::user_name(&store), Some("Sam".to_string()));
        assert_eq!(
            store.get(COMMUNICATION_PREFS),
            Some(&json!({"method": "whatsapp", "whatsappNumber": "+100"}))
        );
        assert_eq!(session.tasks().len(), 1);
        assert_eq!(Session::load(&store, Settings::default(), today()).tasks().len(), 1);
    }
}
