//! The shift countdown timer.
//!
//! Counts down once per tick while running, clamps at zero, and reports
//! expiry exactly once. Remaining time is exposed continuously so the UI and
//! any early-completion bonus logic can read it without owning the countdown.

use crate::fixed::{ticks_to_secs, Ticks};

/// What one tick of the timer observed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TimerTick {
    /// Not running (never started, stopped, or already expired).
    Idle,
    /// Still counting down.
    Running { seconds_remaining: f32 },
    /// Just hit zero. Reported exactly once per armed duration.
    Expired,
}

/// One-shot countdown over the shift duration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShiftTimer {
    duration: Ticks,
    remaining: Ticks,
    running: bool,
    expired: bool,
}

impl ShiftTimer {
    /// An armed but not running timer.
    pub fn new(duration: Ticks) -> Self {
        Self {
            duration,
            remaining: duration,
            running: false,
            expired: false,
        }
    }

    /// Start (or resume) the countdown.
    pub fn start(&mut self) {
        if !self.expired {
            self.running = true;
        }
    }

    /// Stop the countdown without firing expiry.
    pub fn stop(&mut self) {
        self.running = false;
    }

    /// Re-arm with a new duration, clearing the expiry latch.
    pub fn reset(&mut self, duration: Ticks) {
        self.duration = duration;
        self.remaining = duration;
        self.running = false;
        self.expired = false;
    }

    /// Advance by one tick.
    pub fn tick(&mut self) -> TimerTick {
        if !self.running || self.expired {
            return TimerTick::Idle;
        }
        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining == 0 {
            self.running = false;
            self.expired = true;
            return TimerTick::Expired;
        }
        TimerTick::Running {
            seconds_remaining: self.remaining_secs(),
        }
    }

    pub fn remaining_secs(&self) -> f32 {
        ticks_to_secs(self.remaining)
    }

    pub fn elapsed_secs(&self) -> f32 {
        ticks_to_secs(self.duration.saturating_sub(self.remaining))
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn has_time_left(&self) -> bool {
        self.remaining > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixed::secs_to_ticks;

    #[test]
    fn armed_timer_is_idle_until_started() {
        let mut timer = ShiftTimer::new(10);
        assert_eq!(timer.tick(), TimerTick::Idle);
        assert!(timer.has_time_left());
    }

    #[test]
    fn counts_down_and_expires_once() {
        let mut timer = ShiftTimer::new(3);
        timer.start();

        assert!(matches!(timer.tick(), TimerTick::Running { .. }));
        assert!(matches!(timer.tick(), TimerTick::Running { .. }));
        assert_eq!(timer.tick(), TimerTick::Expired);

        // The latch holds: no second expiry, no further countdown.
        assert_eq!(timer.tick(), TimerTick::Idle);
        assert_eq!(timer.tick(), TimerTick::Idle);
        assert!(!timer.has_time_left());
    }

    #[test]
    fn start_after_expiry_does_not_revive() {
        let mut timer = ShiftTimer::new(1);
        timer.start();
        assert_eq!(timer.tick(), TimerTick::Expired);

        timer.start();
        assert_eq!(timer.tick(), TimerTick::Idle);
    }

    #[test]
    fn stop_pauses_without_expiring() {
        let mut timer = ShiftTimer::new(5);
        timer.start();
        let _ = timer.tick();
        timer.stop();

        assert_eq!(timer.tick(), TimerTick::Idle);
        assert_eq!(timer.remaining_secs(), ticks_to_secs(4));

        timer.start();
        assert!(matches!(timer.tick(), TimerTick::Running { .. }));
    }

    #[test]
    fn reset_rearms_after_expiry() {
        let mut timer = ShiftTimer::new(1);
        timer.start();
        assert_eq!(timer.tick(), TimerTick::Expired);

        timer.reset(2);
        timer.start();
        assert!(matches!(timer.tick(), TimerTick::Running { .. }));
        assert_eq!(timer.tick(), TimerTick::Expired);
    }

    #[test]
    fn remaining_seconds_track_the_countdown() {
        let mut timer = ShiftTimer::new(secs_to_ticks(120.0));
        timer.start();
        assert_eq!(timer.remaining_secs(), 120.0);

        for _ in 0..secs_to_ticks(30.0) {
            let _ = timer.tick();
        }
        assert_eq!(timer.remaining_secs(), 90.0);
        assert_eq!(timer.elapsed_secs(), 30.0);
    }

    #[test]
    fn zero_duration_expires_immediately() {
        let mut timer = ShiftTimer::new(0);
        timer.start();
        assert_eq!(timer.tick(), TimerTick::Expired);
    }
}
