//! A complete headless session: shop data, engine, and clerk.

use crate::clerk::{Clerk, ClerkStyle};
use crate::error::DemoError;
use bookrush_core::command::Command;
use bookrush_core::day::DayResult;
use bookrush_core::engine::{Engine, EngineConfig};
use bookrush_core::event::{Event, EventKind};
use bookrush_core::fixed::secs_to_ticks;
use bookrush_data::{load_store_str, resolve, Format};

/// The embedded default shop definition.
pub const DEFAULT_STORE: &str = include_str!("../data/bookstore.ron");

/// How fast the autopilot clerk acts.
const CLERK_ACT_INTERVAL_SECS: f32 = 0.25;

/// Grace period past the shift duration before giving up on a conclusion.
const CONCLUSION_GRACE_SECS: f32 = 60.0;

/// An engine plus a clerk, ready to play days back to back.
#[derive(Debug)]
pub struct DemoSession {
    pub engine: Engine,
    clerk: Clerk,
}

impl DemoSession {
    /// A session over the embedded default shop.
    pub fn new(seed: u64, starting_day: u32, style: ClerkStyle) -> Result<Self, DemoError> {
        Self::with_store(DEFAULT_STORE, Format::Ron, seed, starting_day, style)
    }

    /// A session over caller-provided shop data.
    pub fn with_store(
        content: &str,
        format: Format,
        seed: u64,
        starting_day: u32,
        style: ClerkStyle,
    ) -> Result<Self, DemoError> {
        let store = load_store_str(content, format)?;
        let (catalog, spawner) = resolve(&store)?;
        let config = EngineConfig {
            seed,
            starting_day,
            ..EngineConfig::default()
        };
        Ok(Self {
            engine: Engine::new(catalog, spawner, config),
            clerk: Clerk::new(style, CLERK_ACT_INTERVAL_SECS),
        })
    }

    /// Start the prepared day and play it to its conclusion.
    pub fn run_day(&mut self) -> Result<DayResult, DemoError> {
        log::info!(
            "playing day {} with a {:?} clerk",
            self.engine.day_number(),
            self.clerk.style()
        );
        self.engine.submit(Command::StartDay);

        let budget = secs_to_ticks(self.engine.settings().duration_secs)
            + secs_to_ticks(CONCLUSION_GRACE_SECS);
        for _ in 0..budget {
            if let Some(command) = self.clerk.tick(&self.engine) {
                self.engine.submit(command);
            }
            self.engine.step();
            if self.engine.shift_state().is_terminal() {
                break;
            }
        }

        match self.engine.event_bus.last(EventKind::DayCompleted) {
            Some(Event::DayCompleted { result, .. }) => Ok(result.clone()),
            _ => Err(DemoError::ShiftNeverEnded),
        }
    }

    /// Prepare the next day after a finished one.
    pub fn next_day(&mut self) {
        self.engine.submit(Command::NextDay);
        self.engine.step();
    }

    /// Re-prepare the same day after a finished one.
    pub fn restart_day(&mut self) {
        self.engine.submit(Command::RestartDay);
        self.engine.step();
    }
}
