use super::task::Task;
use chrono::Duration;

/// Countdown and micro-step checklist for a task being worked on
#[derive(Debug, Clone)]
pub struct FocusTimer {
    /// The task this timer was started for
    pub task: Task,
    /// Full length of the countdown
    pub total: Duration,
    /// Time left on the countdown, never negative
    pub remaining: Duration,
    pub running: bool,
    /// One flag per micro-step of the task
    pub steps_done: Vec<bool>,
}

impl FocusTimer {
    pub fn new(task: Task) -> Self {
        let total = Duration::minutes(i64::from(task.estimated_time));
        let steps_done = vec![false; task.micro_tasks.len()];
        Self {
            task,
            total,
            remaining: total,
            running: false,
            steps_done,
        }
    }

    /// Toggle between running and paused
    pub fn toggle(&mut self) {
        self.running = !self.running && !self.is_finished();
    }

    /// Advance the countdown by `elapsed` if running
    pub fn tick(&mut self, elapsed: Duration) {
        if !self.running {
            return;
        }
        self.remaining = std::cmp::max(Duration::zero(), self.remaining - elapsed);
        if self.is_finished() {
            self.running = false;
        }
    }

    pub fn is_finished(&self) -> bool {
        self.remaining <= Duration::zero()
    }

    /// Share of the countdown already used (0-100)
    pub fn percent_elapsed(&self) -> f64 {
        let total = self.total.num_seconds() as f64;
        if total == 0.0 {
            return 100.0;
        }
        (total - self.remaining.num_seconds() as f64) / total * 100.0
    }

    /// Flip a micro-step between done and not done
    pub fn toggle_step(&mut self, index: usize) -> bool {
        match self.steps_done.get_mut(index) {
            Some(done) => {
                *done = !*done;
                true
            }
            None => false,
        }
    }

    pub fn steps_completed(&self) -> usize {
        self.steps_done.iter().filter(|d| **d).count()
    }

    /// Checklist completion (0-100), zero when the task has no micro-steps
    pub fn step_percent(&self) -> f64 {
        if self.steps_done.is_empty() {
            return 0.0;
        }
        self.steps_completed() as f64 / self.steps_done.len() as f64 * 100.0
    }

    /// Remaining time as "m:ss", or "h:mm:ss" past the hour
    pub fn clock(&self) -> String {
        format_clock(self.remaining)
    }

    /// Stop the timer and hand back the completed task
    pub fn finish(self) -> Task {
        self.task.completed()
    }
}

/// Format a duration as a countdown clock
pub fn format_clock(duration: Duration) -> String {
    let total = duration.num_seconds().max(0);
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;

    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, seconds)
    } else {
        format!("{}:{:02}", minutes, seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TaskDraft;

    fn timer_for(minutes: u32, steps: &[&str]) -> FocusTimer {
        let mut draft = TaskDraft::new("Focus");
        draft.estimated_time = minutes;
        draft.micro_tasks = steps.iter().map(|s| s.to_string()).collect();
        FocusTimer::new(draft.into_task("Work").unwrap())
    }

    #[test]
    fn test_new_timer() {
        let timer = timer_for(25, &["a", "b"]);
        assert_eq!(timer.total, Duration::minutes(25));
        assert_eq!(timer.remaining, Duration::minutes(25));
        assert!(!timer.running);
        assert_eq!(timer.steps_done, vec![false, false]);
        assert_eq!(timer.clock(), "25:00");
    }

    #[test]
    fn test_tick_only_while_running() {
        let mut timer = timer_for(10, &[]);
        timer.tick(Duration::minutes(1));
        assert_eq!(timer.remaining, Duration::minutes(10));

        timer.toggle();
        timer.tick(Duration::minutes(4));
        assert_eq!(timer.remaining, Duration::minutes(6));
        assert_eq!(timer.percent_elapsed(), 40.0);

        timer.toggle();
        timer.tick(Duration::minutes(4));
        assert_eq!(timer.remaining, Duration::minutes(6));
    }

    #[test]
    fn test_tick_stops_at_zero() {
        let mut timer = timer_for(1, &[]);
        timer.toggle();
        timer.tick(Duration::minutes(5));
        assert_eq!(timer.remaining, Duration::zero());
        assert!(timer.is_finished());
        assert!(!timer.running);

        // A finished timer does not restart
        timer.toggle();
        assert!(!timer.running);
    }

    #[test]
    fn test_step_checklist() {
        let mut timer = timer_for(30, &["a", "b", "c", "d"]);
        assert!(timer.toggle_step(0));
        assert!(timer.toggle_step(2));
        assert!(!timer.toggle_step(9));
        assert_eq!(timer.steps_completed(), 2);
        assert_eq!(timer.step_percent(), 50.0);

        timer.toggle_step(0);
        assert_eq!(timer.steps_completed(), 1);
    }

    #[test]
    fn test_format_clock() {
        assert_eq!(format_clock(Duration::seconds(65)), "1:05");
        assert_eq!(format_clock(Duration::seconds(3600 + 62)), "1:01:02");
        assert_eq!(format_clock(Duration::seconds(-5)), "0:00");
    }

    #[test]
    fn test_finish_completes_task() {
        let timer = timer_for(15, &[]);
        let task = timer.finish();
        assert!(task.completed);
        assert_eq!(task.progress, Some(100));
    }
}
