//! The autopilot clerk: a policy that reads the engine's public state and
//! decides the next command.
//!
//! The careful clerk fills every order correctly: fetch from the ordered
//! shelf, rotate genre and cover at the sorting table, stamp, deliver. The
//! hasty clerk grabs a book and shoves it across the counter unstamped,
//! which every customer rejects -- useful for exercising the failure path.

use bookrush_core::command::Command;
use bookrush_core::day::ShiftState;
use bookrush_core::engine::Engine;
use bookrush_core::fixed::{secs_to_ticks, Ticks};

/// How the clerk works the counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClerkStyle {
    /// Fetch, re-sort, stamp, deliver: every order filled correctly.
    Careful,
    /// Grab and deliver without stamping: every delivery gets rejected.
    Hasty,
}

/// One clerk working the shift, acting at a human-ish cadence.
#[derive(Debug, Clone)]
pub struct Clerk {
    style: ClerkStyle,
    act_interval: Ticks,
    countdown: Ticks,
}

impl Clerk {
    pub fn new(style: ClerkStyle, act_interval_secs: f32) -> Self {
        Self {
            style,
            act_interval: secs_to_ticks(act_interval_secs).max(1),
            countdown: 0,
        }
    }

    pub fn style(&self) -> ClerkStyle {
        self.style
    }

    /// Decide the next command, if it is time to act. Call once per tick,
    /// before stepping the engine.
    pub fn tick(&mut self, engine: &Engine) -> Option<Command> {
        if self.countdown > 0 {
            self.countdown -= 1;
            return None;
        }
        let command = self.decide(engine)?;
        self.countdown = self.act_interval;
        Some(command)
    }

    fn decide(&self, engine: &Engine) -> Option<Command> {
        if engine.shift_state() != ShiftState::Playing {
            return None;
        }
        // Nothing to do until a customer is deliverable.
        let order = engine.current_order()?;

        let Some(book) = engine.held_book() else {
            return Some(Command::Pickup { shelf: order.genre });
        };

        match self.style {
            ClerkStyle::Hasty => Some(Command::Deliver),
            ClerkStyle::Careful => {
                if book.genre() != order.genre {
                    Some(Command::ChangeGenre)
                } else if book.cover() != order.cover {
                    Some(Command::CycleCover)
                } else if !book.is_stamped() {
                    Some(Command::Stamp)
                } else {
                    Some(Command::Deliver)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bookrush_core::test_utils::*;

    fn drive(engine: &mut Engine, clerk: &mut Clerk, secs: f32) {
        for _ in 0..secs_to_ticks(secs) {
            if let Some(command) = clerk.tick(engine) {
                engine.submit(command);
            }
            engine.step();
        }
    }

    #[test]
    fn careful_clerk_serves_customers() {
        let mut engine = make_engine(31);
        let mut clerk = Clerk::new(ClerkStyle::Careful, 0.25);
        start_day(&mut engine);

        drive(&mut engine, &mut clerk, 60.0);

        assert!(engine.customers_served() >= 5, "served {}", engine.customers_served());
        assert_eq!(engine.wrong_deliveries(), 0);
        assert!(engine.score() > 0);
    }

    #[test]
    fn hasty_clerk_disappoints_everyone() {
        let mut engine = make_engine(33);
        let mut clerk = Clerk::new(ClerkStyle::Hasty, 0.25);
        start_day(&mut engine);

        drive(&mut engine, &mut clerk, 60.0);

        assert_eq!(engine.customers_served(), 0);
        assert!(engine.wrong_deliveries() >= 1);
        assert_eq!(engine.score(), 0);
    }

    #[test]
    fn clerk_idles_outside_a_shift() {
        let engine = make_engine(35);
        let mut clerk = Clerk::new(ClerkStyle::Careful, 0.25);
        assert_eq!(clerk.tick(&engine), None);
    }
}
