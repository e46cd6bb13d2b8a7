use super::controller::{Fields, FlowController, FlowError, Transition};
use crate::domain::{Difficulty, Mood, Priority, Task, TaskDraft, TaskError};
use crate::ticker::{processing_delay, Delay};
use std::time::Instant;
use tracing::{debug, info};

pub const USER_NAME: &str = "user_name";
pub const EMOTIONAL_PROFILE: &str = "emotional_profile";
pub const COMMUNICATION: &str = "communication";
pub const WHATSAPP_NUMBER: &str = "whatsapp_number";
pub const FIRST_MOOD: &str = "first_mood";

/// Categories offered while entering the first tasks
pub const TASK_CATEGORIES: &[&str] = &["Work", "Personal", "Learning", "Health"];

/// What tends to overwhelm the user, picked during onboarding
pub const OVERWHELM_OPTIONS: &[(&str, &str)] = &[
    ("choices", "Too many choices"),
    ("perfectionism", "Perfectionism paralysis"),
    ("priorities", "Unclear priorities"),
    ("guilt", "Feeling guilty about delays"),
];

/// How reminders are delivered
pub const COMMUNICATION_OPTIONS: &[(&str, &str)] = &[
    ("whatsapp", "WhatsApp reminders"),
    ("email", "Email notifications"),
    ("app", "App notifications only"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnboardingStep {
    Welcome,
    EmotionalProfile,
    CommunicationPreferences,
    FirstMoodCheck,
    TaskWalkthrough,
    AddFirstTask,
    AddSecondTask,
    AddThirdTask,
    AiProcessing,
    TaskPrioritization,
    TutorialOverlays,
    Complete,
}

impl OnboardingStep {
    pub fn all() -> Vec<OnboardingStep> {
        vec![
            Self::Welcome,
            Self::EmotionalProfile,
            Self::CommunicationPreferences,
            Self::FirstMoodCheck,
            Self::TaskWalkthrough,
            Self::AddFirstTask,
            Self::AddSecondTask,
            Self::AddThirdTask,
            Self::AiProcessing,
            Self::TaskPrioritization,
            Self::TutorialOverlays,
            Self::Complete,
        ]
    }

    /// Position among the three task-entry steps
    pub fn task_number(&self) -> Option<usize> {
        match self {
            Self::AddFirstTask => Some(1),
            Self::AddSecondTask => Some(2),
            Self::AddThirdTask => Some(3),
            _ => None,
        }
    }

    pub fn prompt(&self) -> &'static str {
        match self {
            Self::Welcome => "What should we call you?",
            Self::EmotionalProfile => "What overwhelms you most?",
            Self::CommunicationPreferences => "How would you like to be reminded?",
            Self::FirstMoodCheck => "How's your energy right now?",
            Self::TaskWalkthrough => "Let's brain-dump three things on your mind",
            Self::AddFirstTask => "What's the first thing on your mind?",
            Self::AddSecondTask => "Great! What else needs to be done?",
            Self::AddThirdTask => "One more task to complete your initial list",
            Self::AiProcessing => "Organizing your tasks...",
            Self::TaskPrioritization => "Here's your personalized order",
            Self::TutorialOverlays => "Tap any task to see micro-steps",
            Self::Complete => "You're all set!",
        }
    }
}

/// A task entered during onboarding, before prioritisation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskIdea {
    pub title: String,
    pub category: String,
}

/// A task idea after prioritisation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrioritizedTask {
    pub title: String,
    pub category: String,
    pub priority: Priority,
    pub difficulty: Difficulty,
    pub estimated_time: u32,
    pub reason: &'static str,
}

/// Order task ideas by entry and shape their difficulty to the mood
pub fn prioritize(ideas: &[TaskIdea], mood: Mood, estimate_minutes: u32) -> Vec<PrioritizedTask> {
    let (difficulty, reason) = if mood.is_low() {
        (Difficulty::Easy, "Starting with easy wins for your energy level")
    } else if mood.is_high() {
        (Difficulty::Hard, "Perfect energy for challenging tasks!")
    } else {
        (Difficulty::Medium, "Balanced approach for your current mood")
    };

    ideas
        .iter()
        .enumerate()
        .map(|(rank, idea)| PrioritizedTask {
            title: idea.title.clone(),
            category: idea.category.clone(),
            priority: Priority::from_rank(rank),
            difficulty,
            estimated_time: estimate_minutes,
            reason,
        })
        .collect()
}

/// Everything collected by onboarding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OnboardingProfile {
    pub user_name: String,
    pub emotional_profile: Vec<String>,
    pub communication: String,
    pub whatsapp_number: Option<String>,
    pub mood: Mood,
    pub initial_tasks: Vec<Task>,
    /// The tutorial was skipped
    pub skipped: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OnboardingEvent {
    Step(OnboardingStep),
    Done(OnboardingProfile),
    Exit,
}

/// First-run wizard: profile questions, a first mood check, three task ideas,
/// a simulated prioritisation pause and a short tutorial.
#[derive(Debug, Clone)]
pub struct OnboardingWizard {
    flow: FlowController<OnboardingStep>,
    ideas: Vec<TaskIdea>,
    prioritized: Vec<PrioritizedTask>,
    processing: Option<Delay>,
    estimate_minutes: u32,
}

impl OnboardingWizard {
    pub fn new(estimate_minutes: u32) -> Result<Self, FlowError> {
        let flow = FlowController::new(OnboardingStep::all())?
            .with_required(OnboardingStep::Welcome, USER_NAME)
            .with_required(OnboardingStep::CommunicationPreferences, COMMUNICATION);

        Ok(Self {
            flow,
            ideas: Vec::new(),
            prioritized: Vec::new(),
            processing: None,
            estimate_minutes,
        })
    }

    pub fn current_step(&self) -> OnboardingStep {
        self.flow.current_step()
    }

    pub fn progress_percent(&self) -> u8 {
        self.flow.progress_percent()
    }

    pub fn ideas(&self) -> &[TaskIdea] {
        &self.ideas
    }

    pub fn prioritized(&self) -> &[PrioritizedTask] {
        &self.prioritized
    }

    pub fn set_user_name(&mut self, name: &str) -> Result<(), FlowError> {
        self.flow.set_field(USER_NAME, name.trim())
    }

    /// Add or remove an overwhelm option
    pub fn toggle_overwhelm(&mut self, option: &str) -> Result<(), FlowError> {
        let mut selected: Vec<String> = self
            .flow
            .field(EMOTIONAL_PROFILE)
            .and_then(|v| v.as_list())
            .map(|l| l.to_vec())
            .unwrap_or_default();

        if let Some(pos) = selected.iter().position(|s| s == option) {
            selected.remove(pos);
        } else {
            selected.push(option.to_string());
        }
        self.flow.set_field(EMOTIONAL_PROFILE, selected)
    }

    /// Preferred check-in channel; the WhatsApp number is kept only when given
    pub fn set_communication(&mut self, channel: &str, whatsapp_number: Option<&str>) -> Result<(), FlowError> {
        self.flow.set_field(COMMUNICATION, channel)?;
        if let Some(number) = whatsapp_number {
            self.flow.set_field(WHATSAPP_NUMBER, number.trim())?;
        }
        Ok(())
    }

    pub fn set_mood(&mut self, mood: Mood) -> Result<(), FlowError> {
        self.flow.set_field(FIRST_MOOD, i64::from(mood.value()))
    }

    /// The first mood picked, neutral until one is chosen
    pub fn mood(&self) -> Mood {
        mood_field(self.flow.fields())
    }

    /// Record the task idea for the current add-task step and move on
    pub fn add_task(&mut self, title: &str, category: &str) -> Result<OnboardingEvent, AddTaskError> {
        let step = self.current_step();
        let Some(number) = step.task_number() else {
            return Err(AddTaskError::Flow(FlowError::WrongStep {
                step: format!("{:?}", step),
                action: "add a task",
            }));
        };

        let title = title.trim();
        if title.is_empty() {
            return Err(AddTaskError::Task(TaskError::EmptyTitle));
        }

        // Re-entering a step after going back replaces its idea
        self.ideas.truncate(number - 1);
        self.prioritized.clear();
        self.ideas.push(TaskIdea {
            title: title.to_string(),
            category: category.to_string(),
        });
        debug!(number, title, "onboarding task added");

        Ok(self.advance()?)
    }

    /// Start the prioritisation pause
    pub fn begin_processing(&mut self, now: Instant) -> Result<(), FlowError> {
        self.expect_step(OnboardingStep::AiProcessing, "start processing")?;
        self.processing = Some(Delay::start(now, processing_delay()));
        Ok(())
    }

    /// Finish prioritising once the pause has elapsed
    pub fn poll_processing(&mut self, now: Instant) -> Result<Option<OnboardingEvent>, FlowError> {
        let mood = self.mood();
        let estimate = self.estimate_minutes;
        let ideas = &self.ideas;
        let Some(delay) = self.processing.as_mut() else {
            return Ok(None);
        };

        let Some(prioritized) = delay.poll(now, || prioritize(ideas, mood, estimate)) else {
            return Ok(None);
        };

        self.prioritized = prioritized;
        self.processing = None;
        self.advance().map(Some)
    }

    /// Drop a pending prioritisation pause (e.g. the wizard is being closed)
    pub fn cancel_processing(&mut self) {
        if let Some(delay) = self.processing.as_mut() {
            delay.cancel();
        }
        self.processing = None;
    }

    /// Leave the tutorial overlays and go straight to the final step
    pub fn skip_tutorial(&mut self) -> Result<OnboardingEvent, FlowError> {
        self.expect_step(OnboardingStep::TutorialOverlays, "skip the tutorial")?;
        self.flow.jump_to(OnboardingStep::Complete)?;
        Ok(OnboardingEvent::Step(OnboardingStep::Complete))
    }

    /// Move on, refusing to leave a task step without its idea or the
    /// processing step before prioritisation finished
    pub fn advance(&mut self) -> Result<OnboardingEvent, FlowError> {
        let step = self.current_step();
        if step.task_number().is_some_and(|n| self.ideas.len() < n) {
            return Err(FlowError::MissingField {
                step: format!("{:?}", step),
                field: "task",
            });
        }
        if step == OnboardingStep::AiProcessing && self.prioritized.len() != self.ideas.len() {
            return Err(FlowError::WrongStep {
                step: format!("{:?}", step),
                action: "continue before processing finishes",
            });
        }

        match self.flow.advance()? {
            Transition::Moved(next) => Ok(OnboardingEvent::Step(next)),
            Transition::Exited => Ok(OnboardingEvent::Exit),
            Transition::Completed(outcome) => {
                let text = |name: &str| {
                    outcome
                        .fields
                        .get(name)
                        .and_then(|v| v.as_text())
                        .map(str::to_string)
                        .filter(|s| !s.is_empty())
                };
                let initial_tasks = self.build_tasks();
                let profile = OnboardingProfile {
                    user_name: text(USER_NAME).unwrap_or_default(),
                    emotional_profile: outcome
                        .fields
                        .get(EMOTIONAL_PROFILE)
                        .and_then(|v| v.as_list())
                        .map(|l| l.to_vec())
                        .unwrap_or_default(),
                    communication: text(COMMUNICATION).unwrap_or_default(),
                    whatsapp_number: text(WHATSAPP_NUMBER),
                    mood: mood_field(&outcome.fields),
                    initial_tasks,
                    skipped: outcome.skipped,
                };
                info!(
                    user = %profile.user_name,
                    tasks = profile.initial_tasks.len(),
                    "onboarding completed"
                );
                Ok(OnboardingEvent::Done(profile))
            }
        }
    }

    pub fn retreat(&mut self) -> Result<OnboardingEvent, FlowError> {
        // Leaving mid-pause must not let the delay fire later
        if self.current_step() == OnboardingStep::AiProcessing {
            self.cancel_processing();
        }
        Ok(match self.flow.retreat()? {
            Transition::Moved(step) => OnboardingEvent::Step(step),
            Transition::Completed(_) | Transition::Exited => OnboardingEvent::Exit,
        })
    }

    fn build_tasks(&self) -> Vec<Task> {
        self.prioritized
            .iter()
            .filter_map(|p| {
                let mut draft = TaskDraft::new(p.title.clone());
                draft.category = Some(p.category.clone());
                draft.priority = p.priority;
                draft.difficulty = p.difficulty;
                draft.estimated_time = p.estimated_time;
                // First tasks are meant for the day onboarding happens
                draft.due_date = Some("today".to_string());
                draft.into_task(&p.category).ok()
            })
            .collect()
    }

    fn expect_step(&self, expected: OnboardingStep, action: &'static str) -> Result<(), FlowError> {
        let step = self.current_step();
        if step == expected {
            Ok(())
        } else {
            Err(FlowError::WrongStep {
                step: format!("{:?}", step),
                action,
            })
        }
    }
}

fn mood_field(fields: &Fields) -> Mood {
    fields
        .get(FIRST_MOOD)
        .and_then(|v| v.as_number())
        .and_then(|n| u8::try_from(n).ok())
        .and_then(|n| Mood::new(n).ok())
        .unwrap_or_default()
}

/// Errors from entering a task idea
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AddTaskError {
    #[error(transparent)]
    Flow(#[from] FlowError),
    #[error(transparent)]
    Task(#[from] TaskError),
}
