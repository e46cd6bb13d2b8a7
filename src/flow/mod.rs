//! Linear step-by-step wizards built on one generic controller.

pub mod controller;
pub mod onboarding;
pub mod reflection;

pub use controller::{FieldValue, Fields, FlowController, FlowError, FlowOutcome, Transition};
pub use onboarding::{
    prioritize, AddTaskError, OnboardingEvent, OnboardingProfile, OnboardingStep, OnboardingWizard,
    PrioritizedTask, TaskIdea,
};
pub use reflection::{DaySummary, Reflection, ReflectionEvent, ReflectionStep, ReflectionWizard};
