//! Shared test helpers for unit, integration, and property tests.
//!
//! Gated behind `#[cfg(any(test, feature = "test-utils"))]` so these helpers
//! are available to this crate's tests and, via the `test-utils` feature, to
//! downstream crates' test suites.

use crate::catalog::{Catalog, CatalogBuilder, Color, CoverDef, RESERVED_GENRE};
use crate::command::Command;
use crate::engine::{Engine, EngineConfig};
use crate::event::{Event, EventBus, EventKind};
use crate::id::CoverId;
use crate::spawner::Spawner;
use std::cell::RefCell;
use std::rc::Rc;

// ===========================================================================
// Catalog fixtures
// ===========================================================================

pub fn fantasy_covers() -> Vec<CoverDef> {
    vec![
        CoverDef::new("Dragon", Color::rgb(0.2, 0.4, 0.8)),
        CoverDef::new("Sword", Color::rgb(0.6, 0.6, 0.6)),
        CoverDef::new("Crystal", Color::rgb(0.5, 0.2, 0.8)),
        CoverDef::new("Castle", Color::rgb(0.4, 0.3, 0.2)),
    ]
}

pub fn romance_covers() -> Vec<CoverDef> {
    vec![
        CoverDef::new("Rose", Color::rgb(0.9, 0.1, 0.4)),
        CoverDef::new("Heart", Color::rgb(0.8, 0.2, 0.2)),
        CoverDef::new("Ring", Color::rgb(0.9, 0.8, 0.1)),
        CoverDef::new("Sunset", Color::rgb(0.9, 0.5, 0.2)),
    ]
}

/// The standard shop: Fantasy and Romance shelves plus the reserved General
/// shelf that customers never order from.
pub fn bookstore_catalog() -> Catalog {
    let mut builder = CatalogBuilder::new();
    builder.register_shelf("Fantasy", "Fantasy Shelf", fantasy_covers());
    builder.register_shelf("Romance", "Romance Shelf", romance_covers());
    builder.register_shelf(
        RESERVED_GENRE,
        "General Shelf",
        vec![CoverDef::new("Plain", Color::WHITE)],
    );
    builder.build().expect("fixture catalog is valid")
}

/// The minimal two-shelf shop used by the queue-bound scenario:
/// Fantasy:[Dragon, Sword], Romance:[Rose].
pub fn small_catalog() -> Catalog {
    let mut builder = CatalogBuilder::new();
    builder.register_shelf(
        "Fantasy",
        "Fantasy Shelf",
        vec![
            CoverDef::new("Dragon", Color::rgb(0.2, 0.4, 0.8)),
            CoverDef::new("Sword", Color::rgb(0.6, 0.6, 0.6)),
        ],
    );
    builder.register_shelf(
        "Romance",
        "Romance Shelf",
        vec![CoverDef::new("Rose", Color::rgb(0.9, 0.1, 0.4))],
    );
    builder.build().expect("fixture catalog is valid")
}

// ===========================================================================
// Engine fixtures
// ===========================================================================

/// An engine over [`bookstore_catalog`] with default tuning.
pub fn make_engine(seed: u64) -> Engine {
    let config = EngineConfig {
        seed,
        ..EngineConfig::default()
    };
    Engine::new(bookstore_catalog(), Spawner::new(), config)
}

/// An engine over an arbitrary catalog.
pub fn make_engine_with(catalog: Catalog, seed: u64) -> Engine {
    let config = EngineConfig {
        seed,
        ..EngineConfig::default()
    };
    Engine::new(catalog, Spawner::new(), config)
}

/// Submit `StartDay` and run one tick; the first customer spawns and is
/// promoted to the counter within that tick.
pub fn start_day(engine: &mut Engine) {
    engine.submit(Command::StartDay);
    engine.step();
}

/// Step until a customer is deliverable at the counter.
pub fn wait_for_current(engine: &mut Engine) {
    for _ in 0..100_000 {
        if engine.current_order().is_some() {
            return;
        }
        engine.step();
    }
    panic!("no customer ever became deliverable");
}

/// Cycle the held book's cover until it shows `target`.
pub fn align_held_cover(engine: &mut Engine, target: CoverId) {
    let held = engine.held_book().expect("a held book");
    let genre = held.genre();
    let from = held.cover().0 as usize;
    let len = engine.catalog().covers_for(genre).len();
    assert!(len > 0, "held book's genre has covers");

    let cycles = (target.0 as usize + len - from) % len;
    for _ in 0..cycles {
        engine.submit(Command::CycleCover);
    }
    if cycles > 0 {
        engine.step();
    }
}

/// Serve the current customer correctly: pickup from the ordered shelf,
/// align the cover, stamp, deliver.
pub fn fulfill_current_order(engine: &mut Engine) {
    let order = engine.current_order().expect("a deliverable customer");
    engine.submit(Command::Pickup { shelf: order.genre });
    engine.step();
    align_held_cover(engine, order.cover);
    engine.submit(Command::Stamp);
    engine.submit(Command::Deliver);
    engine.step();
}

/// Deliver a stamped book that does NOT match the current order. Requires a
/// catalog whose shelves carry more than one cover (see
/// [`bookstore_catalog`]).
pub fn deliver_wrong_book(engine: &mut Engine) {
    let order = engine.current_order().expect("a deliverable customer");
    engine.submit(Command::Pickup { shelf: order.genre });
    engine.step();

    let held = engine.held_book().expect("a held book");
    if held.cover() == order.cover {
        engine.submit(Command::CycleCover);
    }
    engine.submit(Command::Stamp);
    engine.submit(Command::Deliver);
    engine.step();
}

// ===========================================================================
// Event helpers
// ===========================================================================

/// Delivered events of one kind (bounded by the ring buffer capacity).
pub fn count_events(engine: &Engine, kind: EventKind) -> usize {
    engine.event_bus.recent(kind).count()
}

/// Record every delivered event of one kind into a shared vec.
pub fn record_events(bus: &mut EventBus, kind: EventKind) -> Rc<RefCell<Vec<Event>>> {
    let log = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&log);
    bus.subscribe(kind, Box::new(move |event| sink.borrow_mut().push(event.clone())));
    log
}
