use super::controller::{FlowController, FlowError, FlowOutcome, Transition};
use crate::domain::{Mood, Task};
use crate::organizer::{completion_percentage, day_summary_message, mood_change_message};
use serde::Serialize;
use tracing::info;

pub const EVENING_MOOD: &str = "evening_mood";
pub const REFLECTION: &str = "reflection";
pub const GRATITUDE: &str = "gratitude";
pub const TOMORROW_PRIORITY: &str = "tomorrow_priority";

/// Steps of the evening reflection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReflectionStep {
    /// Day summary and evening mood
    Summary,
    /// Optional "what went well" and gratitude questions
    Questions,
    /// Main priority for tomorrow
    Tomorrow,
    Goodnight,
}

impl ReflectionStep {
    pub fn all() -> Vec<ReflectionStep> {
        vec![Self::Summary, Self::Questions, Self::Tomorrow, Self::Goodnight]
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::Summary => "Today's Achievements",
            Self::Questions => "Reflect on your day",
            Self::Tomorrow => "Plan tomorrow",
            Self::Goodnight => "Good night",
        }
    }
}

/// What the day looked like, shown on the first reflection step
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DaySummary {
    pub completed: usize,
    pub total: usize,
    pub percent: u8,
    pub completed_titles: Vec<String>,
    pub morning_mood: Option<Mood>,
}

impl DaySummary {
    pub fn from_tasks(tasks: &[Task], morning_mood: Option<Mood>) -> Self {
        let completed_titles: Vec<String> = tasks
            .iter()
            .filter(|t| t.completed)
            .map(|t| t.title.clone())
            .collect();
        let completed = completed_titles.len();

        Self {
            completed,
            total: tasks.len(),
            percent: completion_percentage(completed, tasks.len()),
            completed_titles,
            morning_mood,
        }
    }

    pub fn encouragement(&self) -> &'static str {
        day_summary_message(self.completed, self.percent)
    }
}

/// Final reflection handed back to the host
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reflection {
    pub evening_mood: Mood,
    pub reflection: Option<String>,
    pub gratitude: Option<String>,
    pub tomorrow_priority: Option<String>,
    pub skipped: bool,
}

impl Reflection {
    fn from_outcome(outcome: FlowOutcome, fallback_mood: Mood) -> Self {
        let text = |name: &str| {
            outcome
                .fields
                .get(name)
                .and_then(|v| v.as_text())
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };
        let evening_mood = outcome
            .fields
            .get(EVENING_MOOD)
            .and_then(|v| v.as_number())
            .and_then(|n| u8::try_from(n).ok())
            .and_then(|n| Mood::new(n).ok())
            .unwrap_or(fallback_mood);

        Self {
            evening_mood,
            reflection: text(REFLECTION),
            gratitude: text(GRATITUDE),
            tomorrow_priority: text(TOMORROW_PRIORITY),
            skipped: outcome.skipped,
        }
    }
}

/// Result of moving through the reflection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReflectionEvent {
    Step(ReflectionStep),
    Done(Reflection),
    Exit,
}

/// Four-step evening reflection: summary, questions, tomorrow, goodnight.
///
/// The evening mood must be chosen before leaving the summary. Skipping the
/// questions jumps to tomorrow's priority and leaves the answers out.
#[derive(Debug, Clone)]
pub struct ReflectionWizard {
    flow: FlowController<ReflectionStep>,
    summary: DaySummary,
}

impl ReflectionWizard {
    pub fn new(tasks: &[Task], morning_mood: Option<Mood>) -> Result<Self, FlowError> {
        let flow = FlowController::new(ReflectionStep::all())?
            .with_required(ReflectionStep::Summary, EVENING_MOOD)
            .with_optional(&[REFLECTION, GRATITUDE]);

        Ok(Self {
            flow,
            summary: DaySummary::from_tasks(tasks, morning_mood),
        })
    }

    pub fn summary(&self) -> &DaySummary {
        &self.summary
    }

    pub fn current_step(&self) -> ReflectionStep {
        self.flow.current_step()
    }

    pub fn progress_percent(&self) -> u8 {
        self.flow.progress_percent()
    }

    /// Required before leaving the summary step
    pub fn set_evening_mood(&mut self, mood: Mood) -> Result<(), FlowError> {
        self.flow.set_field(EVENING_MOOD, i64::from(mood.value()))
    }

    pub fn evening_mood(&self) -> Option<Mood> {
        self.flow
            .field(EVENING_MOOD)
            .and_then(|v| v.as_number())
            .and_then(|n| u8::try_from(n).ok())
            .and_then(|n| Mood::new(n).ok())
    }

    /// Comparison with the morning check-in, once both moods are known
    pub fn mood_change(&self) -> Option<&'static str> {
        let morning = self.summary.morning_mood?;
        let evening = self.evening_mood()?;
        Some(mood_change_message(morning, evening))
    }

    pub fn set_reflection(&mut self, text: &str) -> Result<(), FlowError> {
        self.flow.set_field(REFLECTION, text)
    }

    pub fn set_gratitude(&mut self, text: &str) -> Result<(), FlowError> {
        self.flow.set_field(GRATITUDE, text)
    }

    pub fn set_tomorrow_priority(&mut self, text: &str) -> Result<(), FlowError> {
        self.flow.set_field(TOMORROW_PRIORITY, text)
    }

    /// Next step, or the finished [`Reflection`] from the goodnight step
    pub fn advance(&mut self) -> Result<ReflectionEvent, FlowError> {
        // Only reached if the evening mood was never stored as a number
        let fallback = self.summary.morning_mood.unwrap_or_default();
        let event = match self.flow.advance()? {
            Transition::Moved(step) => ReflectionEvent::Step(step),
            Transition::Completed(outcome) => {
                let reflection = Reflection::from_outcome(outcome, fallback);
                info!(
                    evening_mood = reflection.evening_mood.value(),
                    skipped = reflection.skipped,
                    "evening reflection completed"
                );
                ReflectionEvent::Done(reflection)
            }
            Transition::Exited => ReflectionEvent::Exit,
        };
        Ok(event)
    }

    pub fn retreat(&mut self) -> Result<ReflectionEvent, FlowError> {
        Ok(match self.flow.retreat()? {
            Transition::Moved(step) => ReflectionEvent::Step(step),
            Transition::Completed(_) | Transition::Exited => ReflectionEvent::Exit,
        })
    }

    /// Skip the optional questions and go straight to tomorrow's priority
    pub fn skip_questions(&mut self) -> Result<ReflectionEvent, FlowError> {
        self.flow.jump_to(ReflectionStep::Tomorrow)?;
        Ok(ReflectionEvent::Step(ReflectionStep::Tomorrow))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TaskRecord;
    use pretty_assertions::assert_eq;

    fn tasks() -> Vec<Task> {
        let make = |title: &str, completed: bool| {
            Task::from_record(TaskRecord {
                title: Some(title.to_string()),
                completed: Some(completed),
                ..TaskRecord::default()
            })
        };
        vec![make("Reports", true), make("Call mom", true), make("Desk", false), make("Hike", false)]
    }

    fn mood(v: u8) -> Mood {
        Mood::new(v).unwrap()
    }

    #[test]
    fn test_day_summary() {
        let summary = DaySummary::from_tasks(&tasks(), Some(mood(2)));
        assert_eq!(summary.completed, 2);
        assert_eq!(summary.total, 4);
        assert_eq!(summary.percent, 50);
        assert_eq!(summary.completed_titles, vec!["Reports".to_string(), "Call mom".to_string()]);
        assert!(summary.encouragement().starts_with("Solid work"));
    }

    #[test]
    fn test_summary_requires_evening_mood() {
        let mut wizard = ReflectionWizard::new(&tasks(), None).unwrap();
        assert!(matches!(wizard.advance(), Err(FlowError::MissingField { .. })));

        wizard.set_evening_mood(mood(4)).unwrap();
        assert_eq!(wizard.advance(), Ok(ReflectionEvent::Step(ReflectionStep::Questions)));
    }

    #[test]
    fn test_full_reflection() {
        let mut wizard = ReflectionWizard::new(&tasks(), Some(mood(2))).unwrap();
        wizard.set_evening_mood(mood(4)).unwrap();
        assert_eq!(wizard.mood_change(), Some("Your mood improved throughout the day! 📈"));

        wizard.advance().unwrap();
        wizard.set_reflection("Finished the reports").unwrap();
        wizard.set_gratitude("  ").unwrap();
        wizard.advance().unwrap();
        wizard.set_tomorrow_priority("Plan the hike").unwrap();
        assert_eq!(wizard.advance(), Ok(ReflectionEvent::Step(ReflectionStep::Goodnight)));
        assert_eq!(wizard.progress_percent(), 100);

        let Ok(ReflectionEvent::Done(reflection)) = wizard.advance() else {
            panic!("expected the reflection to complete");
        };
        assert_eq!(
            reflection,
            Reflection {
                evening_mood: mood(4),
                reflection: Some("Finished the reports".into()),
                gratitude: None,
                tomorrow_priority: Some("Plan the hike".into()),
                skipped: false,
            }
        );
        assert_eq!(wizard.advance(), Err(FlowError::Finished));
    }

    #[test]
    fn test_skip_questions_drops_answers() {
        let mut wizard = ReflectionWizard::new(&tasks(), None).unwrap();
        wizard.set_evening_mood(mood(3)).unwrap();
        wizard.advance().unwrap();
        wizard.set_reflection("half-typed").unwrap();

        assert_eq!(wizard.skip_questions(), Ok(ReflectionEvent::Step(ReflectionStep::Tomorrow)));
        wizard.set_tomorrow_priority("Sleep in").unwrap();
        wizard.advance().unwrap();

        let Ok(ReflectionEvent::Done(reflection)) = wizard.advance() else {
            panic!("expected the reflection to complete");
        };
        assert!(reflection.skipped);
        assert_eq!(reflection.reflection, None);
        assert_eq!(reflection.tomorrow_priority.as_deref(), Some("Sleep in"));
    }

    #[test]
    fn test_going_back_after_skip_keeps_new_answers() {
        let mut wizard = ReflectionWizard::new(&tasks(), None).unwrap();
        wizard.set_evening_mood(mood(4)).unwrap();
        wizard.advance().unwrap();
        wizard.skip_questions().unwrap();

        assert_eq!(wizard.retreat(), Ok(ReflectionEvent::Step(ReflectionStep::Questions)));
        wizard.set_reflection("Actually, a lot went well").unwrap();
        wizard.advance().unwrap();
        wizard.advance().unwrap();

        let Ok(ReflectionEvent::Done(reflection)) = wizard.advance() else {
            panic!("expected the reflection to complete");
        };
        assert!(!reflection.skipped);
        assert_eq!(reflection.reflection.as_deref(), Some("Actually, a lot went well"));
    }

    #[test]
    fn test_back_from_summary_exits() {
        let mut wizard = ReflectionWizard::new(&tasks(), None).unwrap();
        assert_eq!(wizard.retreat(), Ok(ReflectionEvent::Exit));
        assert_eq!(wizard.current_step(), ReflectionStep::Summary);
    }
}
