use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::Debug;
use thiserror::Error;

/// A value captured by a wizard form field
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    Number(i64),
    List(Vec<String>),
    Flag(bool),
}

impl FieldValue {
    /// Blank text and empty lists count as "not filled in"
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Text(s) => s.trim().is_empty(),
            Self::List(items) => items.is_empty(),
            Self::Number(_) | Self::Flag(_) => false,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<i64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        Self::Number(value)
    }
}

impl From<Vec<String>> for FieldValue {
    fn from(value: Vec<String>) -> Self {
        Self::List(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        Self::Flag(value)
    }
}

pub type Fields = BTreeMap<String, FieldValue>;

/// Misuse of a wizard
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FlowError {
    #[error("a flow needs at least one step")]
    NoSteps,
    #[error("the flow has already completed")]
    Finished,
    #[error("step {0} is not part of this flow")]
    UnknownStep(String),
    #[error("{field} must be filled in before leaving {step}")]
    MissingField { step: String, field: &'static str },
    #[error("cannot {action} on step {step}")]
    WrongStep { step: String, action: &'static str },
}

/// What a navigation call did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition<S> {
    /// Now showing this step
    Moved(S),
    /// Advanced past the last step; the flow is done
    Completed(FlowOutcome),
    /// Went back from the first step; the host should leave the wizard
    Exited,
}

/// Data handed to the host when a flow completes
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlowOutcome {
    pub fields: Fields,
    /// Whether optional steps were skipped (their fields are left out)
    pub skipped: bool,
}

/// Drives a fixed, ordered list of steps one at a time.
///
/// The controller accepts no navigation once it has completed.
#[derive(Debug, Clone)]
pub struct FlowController<S> {
    steps: Vec<S>,
    index: usize,
    fields: Fields,
    /// Fields dropped from the outcome when the flow was skipped ahead
    optional: Vec<&'static str>,
    /// Fields that must be non-empty before leaving a step
    required: Vec<(S, &'static str)>,
    skipped: bool,
    /// Step the first skip left from; going back to it undoes the skip
    jumped_from: Option<usize>,
    /// Optional fields answered before the skip, dropped unless answered again
    stale: Vec<String>,
    finished: bool,
}

impl<S: Copy + PartialEq + Debug> FlowController<S> {
    pub fn new(steps: Vec<S>) -> Result<Self, FlowError> {
        if steps.is_empty() {
            return Err(FlowError::NoSteps);
        }
        Ok(Self {
            steps,
            index: 0,
            fields: Fields::new(),
            optional: Vec::new(),
            required: Vec::new(),
            skipped: false,
            jumped_from: None,
            stale: Vec::new(),
            finished: false,
        })
    }

    /// Mark fields that are left out of the outcome when steps were skipped
    pub fn with_optional(mut self, fields: &[&'static str]) -> Self {
        self.optional.extend_from_slice(fields);
        self
    }

    /// Require `field` to be filled in before advancing from `step`
    pub fn with_required(mut self, step: S, field: &'static str) -> Self {
        self.required.push((step, field));
        self
    }

    /// Step currently shown
    pub fn current_step(&self) -> S {
        self.steps[self.index]
    }

    pub fn current_index(&self) -> usize {
        self.index
    }

    pub fn steps(&self) -> &[S] {
        &self.steps
    }

    pub fn fields(&self) -> &Fields {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    pub fn is_last(&self) -> bool {
        self.index + 1 == self.steps.len()
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// A jump is in effect and has not been undone by going back
    pub fn skipped(&self) -> bool {
        self.skipped
    }

    pub fn set_field(&mut self, name: &str, value: impl Into<FieldValue>) -> Result<(), FlowError> {
        self.ensure_active()?;
        self.stale.retain(|s| s != name);
        self.fields.insert(name.to_string(), value.into());
        Ok(())
    }

    /// Move to the next step, or complete the flow from the last one
    pub fn advance(&mut self) -> Result<Transition<S>, FlowError> {
        self.ensure_active()?;
        self.check_required()?;

        if !self.is_last() {
            self.index += 1;
            return Ok(Transition::Moved(self.current_step()));
        }

        // Last step: hand over the fields exactly once
        self.finished = true;
        let mut fields = std::mem::take(&mut self.fields);
        if self.skipped {
            fields.retain(|name, _| !self.stale.contains(name));
        }
        Ok(Transition::Completed(FlowOutcome {
            fields,
            skipped: self.skipped,
        }))
    }

    /// Move to the previous step, or ask the host to exit from the first one
    pub fn retreat(&mut self) -> Result<Transition<S>, FlowError> {
        self.ensure_active()?;
        if self.index == 0 {
            return Ok(Transition::Exited);
        }
        self.index -= 1;

        // Back on or before the step that was skipped from: the skip no longer applies
        if self.jumped_from.is_some_and(|from| self.index <= from) {
            self.skipped = false;
            self.jumped_from = None;
            self.stale.clear();
        }
        Ok(Transition::Moved(self.current_step()))
    }

    /// Skip ahead to `step`, marking the flow as skipped.
    ///
    /// Optional fields answered so far are left out of the outcome unless they
    /// are set again. Retreating to the step the skip started from undoes it.
    pub fn jump_to(&mut self, step: S) -> Result<Transition<S>, FlowError> {
        self.ensure_active()?;
        let position = self
            .steps
            .iter()
            .position(|s| *s == step)
            .ok_or_else(|| FlowError::UnknownStep(format!("{:?}", step)))?;

        if self.jumped_from.is_none() {
            self.jumped_from = Some(self.index);
        }
        for name in &self.optional {
            if self.fields.contains_key(*name) && !self.stale.iter().any(|s| s == name) {
                self.stale.push(name.to_string());
            }
        }
        self.index = position;
        self.skipped = true;
        Ok(Transition::Moved(step))
    }

    /// Position in the flow as a rounded percentage
    pub fn progress_percent(&self) -> u8 {
        if self.steps.len() <= 1 {
            return 100;
        }
        let ratio = self.index as f64 / (self.steps.len() - 1) as f64;
        (ratio * 100.0).round() as u8
    }

    fn ensure_active(&self) -> Result<(), FlowError> {
        if self.finished {
            Err(FlowError::Finished)
        } else {
            Ok(())
        }
    }

    fn check_required(&self) -> Result<(), FlowError> {
        let step = self.current_step();
        for &(required_step, field) in &self.required {
            if required_step != step {
                continue;
            }
            let filled = self.fields.get(field).is_some_and(|v| !v.is_empty());
            if !filled {
                return Err(FlowError::MissingField {
                    step: format!("{:?}", step),
                    field,
                });
            }
        }
        Ok(())
    }
}
