use std::time::{Duration, Instant};

/// Default tick interval in milliseconds
pub const DEFAULT_TICK_MS: u64 = 250;

/// Pause used to stand in for slow work such as task prioritisation
pub const PROCESSING_DELAY_MS: u64 = 3000;

/// Get tick duration
pub fn tick_duration() -> Duration {
    Duration::from_millis(DEFAULT_TICK_MS)
}

pub fn processing_delay() -> Duration {
    Duration::from_millis(PROCESSING_DELAY_MS)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DelayState {
    Pending,
    Fired,
    Cancelled,
}

/// One-shot timer polled against caller-supplied instants.
///
/// The handler given to [`Delay::poll`] runs at most once, and never after
/// [`Delay::cancel`].
#[derive(Debug, Clone)]
pub struct Delay {
    deadline: Instant,
    state: DelayState,
}

impl Delay {
    pub fn start(now: Instant, length: Duration) -> Self {
        Self {
            deadline: now + length,
            state: DelayState::Pending,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.state == DelayState::Pending
    }

    pub fn is_cancelled(&self) -> bool {
        self.state == DelayState::Cancelled
    }

    /// Time left before the handler may run
    pub fn remaining(&self, now: Instant) -> Duration {
        self.deadline.saturating_duration_since(now)
    }

    /// Stop the timer; a later poll never fires
    pub fn cancel(&mut self) {
        if self.state == DelayState::Pending {
            self.state = DelayState::Cancelled;
        }
    }

    /// Run `on_elapsed` if the deadline has passed and the timer is still pending
    pub fn poll<T>(&mut self, now: Instant, on_elapsed: impl FnOnce() -> T) -> Option<T> {
        if self.state != DelayState::Pending || now < self.deadline {
            return None;
        }
        self.state = DelayState::Fired;
        Some(on_elapsed())
    }
}
