//! Day progression: per-day difficulty settings, the shift state machine,
//! and the end-of-day result.
//!
//! The machine owns the shift timer. Transitions are guarded: any request
//! made from the wrong state is rejected with a typed [`StateError`] and no
//! state change. That rejection path is expected under concurrent player
//! input, not an exceptional one.

use crate::fixed::{secs_to_ticks, Ticks};
use crate::timer::{ShiftTimer, TimerTick};
use serde::{Deserialize, Serialize};

/// Spawn interval floor: days keep getting faster but never below this.
pub const MIN_SPAWN_INTERVAL_SECS: f32 = 2.0;

/// Difficulty and scoring knobs for one day. Derived deterministically from
/// the day number; immutable for the duration of an attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DaySettings {
    pub day_number: u32,
    pub required_customers: u32,
    pub max_wrong_orders: u32,
    pub duration_secs: f32,
    pub spawn_interval_secs: f32,
    pub max_queue_size: usize,
    pub points_per_customer: u32,
    pub wrong_order_penalty: u32,
}

impl DaySettings {
    /// Settings for the given 1-based day. Requirements, points, and the
    /// penalty grow with the day; the spawn interval shrinks to its floor;
    /// the queue bound grows to its cap.
    pub fn for_day(day_number: u32) -> Self {
        let day = day_number.max(1);
        let step = day - 1;
        Self {
            day_number: day,
            required_customers: 5 + step * 3,
            max_wrong_orders: 5u32.saturating_sub(step).max(1),
            duration_secs: 120.0 + step as f32 * 10.0,
            spawn_interval_secs: (4.0 - step as f32 * 0.2).max(MIN_SPAWN_INTERVAL_SECS),
            max_queue_size: (5 + step).min(8) as usize,
            points_per_customer: 100 + step * 10,
            wrong_order_penalty: 25 + step * 5,
        }
    }

    pub fn duration_ticks(&self) -> Ticks {
        secs_to_ticks(self.duration_secs)
    }

    pub fn spawn_interval_ticks(&self) -> Ticks {
        secs_to_ticks(self.spawn_interval_secs).max(1)
    }
}

/// Where one day attempt currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShiftState {
    /// Settings computed, timer armed but stopped, spawn loop inactive.
    Preparation,
    /// Timer running, spawn loop active.
    Playing,
    /// Shift ended with the quota met.
    DayComplete,
    /// Shift ended short of the quota.
    DayFailed,
}

impl ShiftState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, ShiftState::DayComplete | ShiftState::DayFailed)
    }
}

/// The outcome of one day attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct DayResult {
    pub success: bool,
    pub customers_served: u32,
    pub wrong_orders: u32,
    pub final_score: u32,
    pub time_remaining: f32,
    pub message: String,
}

impl DayResult {
    pub fn new(
        success: bool,
        customers_served: u32,
        wrong_orders: u32,
        final_score: u32,
        time_remaining: f32,
    ) -> Self {
        let message = if success {
            format!(
                "Day complete! Served {customers_served} customers with {wrong_orders} mistakes."
            )
        } else {
            format!("Day failed. Only served {customers_served} customers (needed more).")
        };
        Self {
            success,
            customers_served,
            wrong_orders,
            final_score,
            time_remaining,
            message,
        }
    }
}

/// A transition was requested from the wrong state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum StateError {
    #[error("the day can only start from preparation (currently {actual:?})")]
    NotInPreparation { actual: ShiftState },
    #[error("the shift is still in progress")]
    ShiftInProgress,
    #[error("no finished shift to conclude (currently {actual:?})")]
    NotPlaying { actual: ShiftState },
    #[error("day {requested} is locked (highest unlocked: {highest})")]
    DayLocked { requested: u32, highest: u32 },
}

/// The day/shift state machine. Owns the countdown and the pass/fail call.
#[derive(Debug, Clone)]
pub struct DayMachine {
    state: ShiftState,
    day_number: u32,
    settings: DaySettings,
    timer: ShiftTimer,
    highest_day_reached: u32,
}

impl DayMachine {
    pub fn new(starting_day: u32) -> Self {
        Self::with_settings(DaySettings::for_day(starting_day))
    }

    /// A machine prepared with explicit settings instead of the formula-
    /// derived ones. Advancing or restarting recomputes from the formulas.
    pub fn with_settings(settings: DaySettings) -> Self {
        let timer = ShiftTimer::new(settings.duration_ticks());
        Self {
            state: ShiftState::Preparation,
            day_number: settings.day_number,
            settings,
            timer,
            highest_day_reached: 1,
        }
    }

    pub fn state(&self) -> ShiftState {
        self.state
    }

    pub fn day_number(&self) -> u32 {
        self.day_number
    }

    pub fn settings(&self) -> &DaySettings {
        &self.settings
    }

    pub fn highest_day_reached(&self) -> u32 {
        self.highest_day_reached
    }

    /// Seed the unlock level from persisted progress.
    pub fn set_highest_day_reached(&mut self, day: u32) {
        self.highest_day_reached = day.max(1);
    }

    pub fn time_remaining_secs(&self) -> f32 {
        self.timer.remaining_secs()
    }

    /// Preparation -> Playing. Arms and starts the countdown.
    pub fn start_day(&mut self) -> Result<DaySettings, StateError> {
        if self.state != ShiftState::Preparation {
            return Err(StateError::NotInPreparation { actual: self.state });
        }
        self.timer.reset(self.settings.duration_ticks());
        self.timer.start();
        self.state = ShiftState::Playing;
        Ok(self.settings.clone())
    }

    /// One tick of the countdown. Idle outside Playing.
    pub fn tick_timer(&mut self) -> TimerTick {
        if self.state != ShiftState::Playing {
            return TimerTick::Idle;
        }
        self.timer.tick()
    }

    /// Playing -> DayComplete/DayFailed, decided by the served count.
    pub fn conclude(&mut self, served: u32) -> Result<bool, StateError> {
        if self.state != ShiftState::Playing {
            return Err(StateError::NotPlaying { actual: self.state });
        }
        self.timer.stop();
        let success = served >= self.settings.required_customers;
        self.state = if success {
            ShiftState::DayComplete
        } else {
            ShiftState::DayFailed
        };
        Ok(success)
    }

    /// After a successful day, bump the unlock level. Returns true when the
    /// new level should be persisted.
    pub fn record_progress(&mut self) -> bool {
        if self.day_number >= self.highest_day_reached {
            self.highest_day_reached = self.day_number + 1;
            return true;
        }
        false
    }

    /// Terminal -> Preparation for the next day.
    pub fn advance_day(&mut self) -> Result<DaySettings, StateError> {
        if !self.state.is_terminal() {
            return Err(StateError::ShiftInProgress);
        }
        Ok(self.prepare(self.day_number + 1))
    }

    /// Terminal -> Preparation for the same day.
    pub fn restart_day(&mut self) -> Result<DaySettings, StateError> {
        if !self.state.is_terminal() {
            return Err(StateError::ShiftInProgress);
        }
        Ok(self.prepare(self.day_number))
    }

    /// Jump to an unlocked day. Rejected mid-shift and for locked days.
    pub fn go_to_day(&mut self, day: u32) -> Result<DaySettings, StateError> {
        if self.state == ShiftState::Playing {
            return Err(StateError::ShiftInProgress);
        }
        let day = day.max(1);
        if day > self.highest_day_reached {
            return Err(StateError::DayLocked {
                requested: day,
                highest: self.highest_day_reached,
            });
        }
        Ok(self.prepare(day))
    }

    fn prepare(&mut self, day: u32) -> DaySettings {
        self.day_number = day;
        self.settings = DaySettings::for_day(day);
        self.timer.reset(self.settings.duration_ticks());
        self.state = ShiftState::Preparation;
        self.settings.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_scale_monotonically() {
        let day1 = DaySettings::for_day(1);
        let day3 = DaySettings::for_day(3);

        assert!(day3.required_customers > day1.required_customers);
        assert!(day3.points_per_customer > day1.points_per_customer);
        assert!(day3.wrong_order_penalty > day1.wrong_order_penalty);
        assert!(day3.spawn_interval_secs < day1.spawn_interval_secs);
        assert!(day3.duration_secs > day1.duration_secs);
    }

    #[test]
    fn spawn_interval_clamps_at_floor() {
        // Day 11 would be 4.0 - 2.0 = 2.0; day 30 would go far below.
        assert_eq!(DaySettings::for_day(11).spawn_interval_secs, 2.0);
        assert_eq!(
            DaySettings::for_day(30).spawn_interval_secs,
            MIN_SPAWN_INTERVAL_SECS
        );
    }

    #[test]
    fn queue_size_caps_and_wrong_orders_floor() {
        assert_eq!(DaySettings::for_day(1).max_queue_size, 5);
        assert_eq!(DaySettings::for_day(4).max_queue_size, 8);
        assert_eq!(DaySettings::for_day(20).max_queue_size, 8);

        assert_eq!(DaySettings::for_day(1).max_wrong_orders, 5);
        assert_eq!(DaySettings::for_day(20).max_wrong_orders, 1);
    }

    #[test]
    fn day_zero_is_treated_as_day_one() {
        assert_eq!(DaySettings::for_day(0), DaySettings::for_day(1));
    }

    #[test]
    fn start_requires_preparation() {
        let mut machine = DayMachine::new(1);
        assert!(machine.start_day().is_ok());
        assert_eq!(machine.state(), ShiftState::Playing);

        // A second start mid-shift is rejected without a state change.
        assert_eq!(
            machine.start_day(),
            Err(StateError::NotInPreparation {
                actual: ShiftState::Playing
            })
        );
        assert_eq!(machine.state(), ShiftState::Playing);
    }

    #[test]
    fn conclude_decides_by_quota() {
        let mut machine = DayMachine::new(1);
        machine.start_day().unwrap();
        assert_eq!(machine.conclude(4), Ok(false));
        assert_eq!(machine.state(), ShiftState::DayFailed);

        let mut machine = DayMachine::new(1);
        machine.start_day().unwrap();
        assert_eq!(machine.conclude(5), Ok(true));
        assert_eq!(machine.state(), ShiftState::DayComplete);
    }

    #[test]
    fn conclude_outside_playing_is_rejected() {
        let mut machine = DayMachine::new(1);
        assert!(machine.conclude(5).is_err());
    }

    #[test]
    fn next_and_restart_require_a_finished_day() {
        let mut machine = DayMachine::new(2);
        assert_eq!(machine.advance_day(), Err(StateError::ShiftInProgress));

        machine.start_day().unwrap();
        assert_eq!(machine.restart_day(), Err(StateError::ShiftInProgress));

        machine.conclude(0).unwrap();
        let settings = machine.restart_day().unwrap();
        assert_eq!(settings.day_number, 2);
        assert_eq!(machine.state(), ShiftState::Preparation);

        machine.start_day().unwrap();
        machine.conclude(100).unwrap();
        let settings = machine.advance_day().unwrap();
        assert_eq!(settings.day_number, 3);
    }

    #[test]
    fn progress_records_only_new_highs() {
        let mut machine = DayMachine::new(1);
        assert!(machine.record_progress());
        assert_eq!(machine.highest_day_reached(), 2);

        // Replaying day 1 after unlocking day 2 records nothing new.
        assert!(!machine.record_progress());
        machine.set_highest_day_reached(5);
        assert!(!machine.record_progress());
        assert_eq!(machine.highest_day_reached(), 5);
    }

    #[test]
    fn locked_days_are_rejected() {
        let mut machine = DayMachine::new(1);
        assert_eq!(
            machine.go_to_day(3),
            Err(StateError::DayLocked {
                requested: 3,
                highest: 1
            })
        );

        machine.set_highest_day_reached(3);
        let settings = machine.go_to_day(3).unwrap();
        assert_eq!(settings.day_number, 3);
        assert_eq!(machine.state(), ShiftState::Preparation);
    }

    #[test]
    fn go_to_day_rejected_mid_shift() {
        let mut machine = DayMachine::new(1);
        machine.set_highest_day_reached(3);
        machine.start_day().unwrap();
        assert_eq!(machine.go_to_day(2), Err(StateError::ShiftInProgress));
    }

    #[test]
    fn timer_only_runs_while_playing() {
        let mut machine = DayMachine::new(1);
        assert_eq!(machine.tick_timer(), TimerTick::Idle);

        machine.start_day().unwrap();
        assert!(matches!(machine.tick_timer(), TimerTick::Running { .. }));

        machine.conclude(0).unwrap();
        assert_eq!(machine.tick_timer(), TimerTick::Idle);
    }
}
