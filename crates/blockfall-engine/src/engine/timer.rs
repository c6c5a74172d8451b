use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Handle describing the periodic tick schedule a session wants.
///
/// The session never sleeps or spawns anything itself. Its owner polls this handle after each
/// command and mirrors it onto a real clock. Every arm bumps [`TickTimer::generation`], so the
/// owner can tell a re-armed schedule apart from an unchanged one and drop the stale deadline.
///
/// # Example
///
/// ```
/// use std::time::Duration;
///
/// use blockfall_engine::TickTimer;
///
/// let mut timer = TickTimer::new();
/// assert_eq!(timer.interval(), None);
///
/// timer.start(Duration::from_millis(1000));
/// let generation = timer.generation();
/// timer.restart(Duration::from_millis(900));
/// assert!(timer.generation() > generation);
/// assert_eq!(timer.interval(), Some(Duration::from_millis(900)));
///
/// timer.stop();
/// assert!(!timer.is_armed());
/// ```
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickTimer {
    interval: Option<Duration>,
    generation: u64,
}

impl TickTimer {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            interval: None,
            generation: 0,
        }
    }

    /// Arms the timer with a fresh schedule.
    pub fn start(&mut self, interval: Duration) {
        self.arm(interval);
    }

    /// Cancels the schedule. Does nothing if already stopped.
    pub fn stop(&mut self) {
        self.interval = None;
    }

    /// Drops the current schedule and arms a new one, restarting the countdown.
    pub fn restart(&mut self, interval: Duration) {
        self.arm(interval);
    }

    fn arm(&mut self, interval: Duration) {
        self.interval = Some(interval);
        self.generation += 1;
    }

    #[must_use]
    pub const fn is_armed(&self) -> bool {
        self.interval.is_some()
    }

    /// Returns the tick period, or `None` while stopped.
    #[must_use]
    pub const fn interval(&self) -> Option<Duration> {
        self.interval
    }

    /// Number of times the timer has been armed.
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }
}
