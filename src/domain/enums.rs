use serde::{Deserialize, Serialize};
use std::fmt;

use super::task::TaskError;

/// How much effort a task takes
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Difficulty {
    Easy = 1,
    Medium = 2,
    Hard = 3,
}

impl Difficulty {
    pub fn level(&self) -> u8 {
        *self as u8
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Easy => "Easy",
            Self::Medium => "Medium",
            Self::Hard => "Hard",
        }
    }

    /// Get the emoji symbol for this difficulty
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Easy => "🌊",
            Self::Medium => "⚡",
            Self::Hard => "🔥",
        }
    }

    /// Badge shown when a task of this difficulty is finished
    pub fn celebration_badge(&self) -> &'static str {
        match self {
            Self::Easy => "Quick Win",
            Self::Medium => "Medium Task",
            Self::Hard => "Hard Challenge",
        }
    }

    /// Label adjusted to the user's energy: easy work reads as a quick win on a
    /// good day, hard work reads as a challenge on a low one.
    pub fn label_for_mood(&self, mood: Mood) -> &'static str {
        if mood.is_high() && *self <= Self::Medium {
            "Quick win"
        } else if mood.is_low() && *self == Self::Hard {
            "Challenge"
        } else {
            self.label()
        }
    }
}

impl TryFrom<u8> for Difficulty {
    type Error = TaskError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::Easy),
            2 => Ok(Self::Medium),
            3 => Ok(Self::Hard),
            other => Err(TaskError::InvalidDifficulty(other)),
        }
    }
}

impl From<Difficulty> for u8 {
    fn from(value: Difficulty) -> Self {
        value.level()
    }
}

/// Urgency of a task. Lower level means more urgent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Priority {
    High = 1,
    Medium = 2,
    Low = 3,
}

impl Priority {
    pub fn level(&self) -> u8 {
        *self as u8
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
        }
    }

    /// Position in an entered list mapped to a priority (first = high,
    /// everything past the third = low)
    pub fn from_rank(rank: usize) -> Self {
        match rank {
            0 => Self::High,
            1 => Self::Medium,
            _ => Self::Low,
        }
    }
}

impl TryFrom<u8> for Priority {
    type Error = TaskError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::High),
            2 => Ok(Self::Medium),
            3 => Ok(Self::Low),
            other => Err(TaskError::InvalidPriority(other)),
        }
    }
}

impl From<Priority> for u8 {
    fn from(value: Priority) -> Self {
        value.level()
    }
}

/// Self-reported energy level, 1 (overwhelmed) to 5 (great)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Mood(u8);

impl Mood {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    pub fn new(value: u8) -> Result<Self, TaskError> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Self(value))
        } else {
            Err(TaskError::InvalidMood(value))
        }
    }

    pub fn value(&self) -> u8 {
        self.0
    }

    /// Low energy (1 or 2)
    pub fn is_low(&self) -> bool {
        self.0 <= 2
    }

    /// High energy (4 or 5)
    pub fn is_high(&self) -> bool {
        self.0 >= 4
    }

    /// Low moods get an optional "what's going on?" note
    pub fn asks_for_context(&self) -> bool {
        self.is_low()
    }

    pub fn label(&self) -> &'static str {
        match self.0 {
            1 => "Overwhelmed",
            2 => "Low",
            3 => "Neutral",
            4 => "Good",
            _ => "Great!",
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self.0 {
            1 => "😫",
            2 => "😞",
            3 => "😐",
            4 => "🙂",
            _ => "😄",
        }
    }

    /// Dashboard greeting line for this mood
    pub fn message(&self) -> &'static str {
        match self.0 {
            1 => "Taking it gentle today - that's perfectly okay 🌊",
            2 => "Building momentum with small wins 💫",
            3 => "Ready for a balanced, productive day ⚖️",
            4 => "Great energy for meaningful progress! 🚀",
            _ => "Amazing energy - you're unstoppable today! ⭐",
        }
    }

    /// Explains how the focus list was shaped for this mood
    pub fn focus_hint(&self) -> &'static str {
        if self.is_high() {
            "Great! Your tasks are optimized for high energy today."
        } else if self.is_low() {
            "That's okay! Your tasks are simplified for gentle momentum."
        } else {
            "Perfect! Your tasks are balanced for steady progress."
        }
    }

    /// Get all moods as a list
    pub fn all() -> [Mood; 5] {
        [Mood(1), Mood(2), Mood(3), Mood(4), Mood(5)]
    }
}

impl Default for Mood {
    fn default() -> Self {
        Self(3)
    }
}

impl TryFrom<u8> for Mood {
    type Error = TaskError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Mood> for u8 {
    fn from(value: Mood) -> Self {
        value.0
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.symbol(), self.label())
    }
}
