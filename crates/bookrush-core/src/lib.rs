//! Bookrush Core -- the shift simulation engine for the bookshop rush game.
//!
//! Customers queue up and order books by (genre, cover). The player fetches a
//! book from a shelf, re-sorts it at the sorting table if needed, stamps it at
//! checkout, and delivers it before the shift timer runs out. This crate owns
//! the queue and fulfillment state machine, the day progression, and the
//! deterministic tick pipeline that drives both.
//!
//! # Six-Phase Tick Pipeline
//!
//! Each call to [`engine::Engine::step`] advances the simulation by one tick
//! through the following phases:
//!
//! 1. **Commands** -- Drain and execute queued input commands (pickup, stamp,
//!    sort, deliver, day control). Rejected commands are logged, never fatal.
//! 2. **Timer** -- Decrement the shift countdown; fire at most one expiry and
//!    conclude the day against the required-customers threshold.
//! 3. **Spawn** -- Run the spawn-interval countdown and the post-failure
//!    advance delay; enqueue new customers while the queue has room.
//! 4. **Sequences** -- Advance every customer's movement/celebration/sulk
//!    sequence by one tick and resolve completions (arrivals and exits).
//! 5. **Post-tick** -- Deliver buffered events to subscribers.
//! 6. **Bookkeeping** -- Increment the tick counter.
//!
//! # Key Types
//!
//! - [`engine::Engine`] -- Queue & fulfillment orchestrator and pipeline.
//! - [`catalog::Catalog`] -- Immutable shelf catalog (frozen at startup by a
//!   validating builder).
//! - [`spawner::Spawner`] -- Weighted/uniform customer order generator.
//! - [`day::DayMachine`] -- Preparation -> Playing -> DayComplete/DayFailed.
//! - [`event::EventBus`] -- Subscription-based event bus with ring buffers.
//! - [`command::CommandQueue`] -- Tick-boundary input command queue.
//! - [`rng::SimRng`] -- Deterministic PRNG; same seed, same shift.

pub mod book;
pub mod catalog;
pub mod command;
pub mod customer;
pub mod day;
pub mod engine;
pub mod event;
pub mod fixed;
pub mod id;
pub mod order;
pub mod progress;
pub mod query;
pub mod rng;
pub mod sequence;
pub mod spawner;
pub mod timer;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
