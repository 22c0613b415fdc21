//! Property-based tests for the queue & fulfillment engine.
//!
//! Random command/tick sequences are thrown at the engine and the structural
//! invariants are checked after every operation: the queue bound holds, at
//! most one customer is ever deliverable, and nothing panics.

use bookrush_core::command::Command;
use bookrush_core::customer::CustomerState;
use bookrush_core::engine::Engine;
use bookrush_core::id::GenreId;
use bookrush_core::test_utils::*;
use proptest::prelude::*;
use proptest::test_runner::TestCaseError;

// ===========================================================================
// Generators
// ===========================================================================

/// One externally-visible operation against the engine.
#[derive(Debug, Clone, Copy)]
enum Op {
    /// Run up to this many ticks.
    Run(u8),
    /// Pick up from a shelf index (may be out of range on purpose).
    Pickup(u8),
    Stamp,
    CycleCover,
    ChangeGenre,
    Deliver,
    StartDay,
    RestartDay,
    NextDay,
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (1..40u8).prop_map(Op::Run),
        (0..5u8).prop_map(Op::Pickup),
        Just(Op::Stamp),
        Just(Op::CycleCover),
        Just(Op::ChangeGenre),
        Just(Op::Deliver),
        Just(Op::StartDay),
        Just(Op::RestartDay),
        Just(Op::NextDay),
    ]
}

fn apply(engine: &mut Engine, op: Op) {
    match op {
        Op::Run(ticks) => engine.run(ticks as u64),
        Op::Pickup(shelf) => {
            engine.submit(Command::Pickup {
                shelf: GenreId(shelf as u32),
            });
            engine.step();
        }
        Op::Stamp => {
            engine.submit(Command::Stamp);
            engine.step();
        }
        Op::CycleCover => {
            engine.submit(Command::CycleCover);
            engine.step();
        }
        Op::ChangeGenre => {
            engine.submit(Command::ChangeGenre);
            engine.step();
        }
        Op::Deliver => {
            engine.submit(Command::Deliver);
            engine.step();
        }
        Op::StartDay => {
            engine.submit(Command::StartDay);
            engine.step();
        }
        Op::RestartDay => {
            engine.submit(Command::RestartDay);
            engine.step();
        }
        Op::NextDay => {
            engine.submit(Command::NextDay);
            engine.step();
        }
    }
}

fn check_invariants(engine: &Engine) -> Result<(), TestCaseError> {
    // Queue bound: waiting customers plus the counter never exceed the cap.
    prop_assert!(
        engine.total_customers() <= engine.settings().max_queue_size,
        "queue bound violated: {} > {}",
        engine.total_customers(),
        engine.settings().max_queue_size
    );

    // At most one customer is deliverable at any moment.
    let current_count = engine
        .customers()
        .filter(|(_, c)| c.state == CustomerState::Current)
        .count();
    prop_assert!(current_count <= 1, "{current_count} customers are Current");

    // The counter reference, when set, points at a live entity.
    if let Some(id) = engine.current_customer() {
        prop_assert!(engine.customer(id).is_some());
    }
    Ok(())
}

// ===========================================================================
// Properties
// ===========================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Invariants hold under arbitrary command/tick sequences.
    #[test]
    fn invariants_hold_under_chaos(seed in 0..1000u64, ops in proptest::collection::vec(arb_op(), 1..60)) {
        let mut engine = make_engine(seed);
        for op in ops {
            apply(&mut engine, op);
            check_invariants(&engine)?;
        }
    }

    /// Identical seeds and op sequences produce identical outcomes.
    #[test]
    fn deterministic_replay(seed in 0..1000u64, ops in proptest::collection::vec(arb_op(), 1..40)) {
        let mut a = make_engine(seed);
        let mut b = make_engine(seed);
        for op in &ops {
            apply(&mut a, *op);
            apply(&mut b, *op);
        }
        prop_assert_eq!(a.tick(), b.tick());
        prop_assert_eq!(a.score(), b.score());
        prop_assert_eq!(a.customers_served(), b.customers_served());
        prop_assert_eq!(a.wrong_deliveries(), b.wrong_deliveries());
        prop_assert_eq!(a.total_customers(), b.total_customers());
        prop_assert_eq!(a.shift_state(), b.shift_state());
    }

    /// Served customers and penalties bound the score exactly:
    /// score <= served * points, and score is never "negative" (the penalty
    /// saturates instead of underflowing).
    #[test]
    fn score_stays_bounded(seed in 0..1000u64, ops in proptest::collection::vec(arb_op(), 1..60)) {
        let mut engine = make_engine(seed);
        let mut max_points_seen = engine.settings().points_per_customer;
        for op in ops {
            apply(&mut engine, op);
            max_points_seen = max_points_seen.max(engine.settings().points_per_customer);
            prop_assert!(
                engine.customers_served() as u64 * max_points_seen as u64
                    >= engine.score() as u64,
                "score {} exceeds what {} served customers can earn",
                engine.score(),
                engine.customers_served()
            );
        }
    }
}
