//! Read-only snapshots of engine state for renderers and UI.
//!
//! Snapshots are plain values detached from the engine's borrow, cheap to
//! take once per frame. Anything richer (per-event reactions) should hang
//! off the event bus instead.

use crate::customer::CustomerState;
use crate::day::ShiftState;
use crate::engine::Engine;
use crate::fixed::Ticks;
use crate::id::{CoverId, CustomerId, GenreId};
use crate::order::Order;

/// The held book as the UI cares about it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeldBookView {
    pub genre: GenreId,
    pub cover: CoverId,
    pub stamped: bool,
}

/// One customer on the floor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CustomerView {
    pub id: CustomerId,
    pub state: CustomerState,
    pub position: f32,
}

/// A frame-ready aggregate of everything visible on screen.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineSnapshot {
    pub tick: Ticks,
    pub shift: ShiftState,
    pub day_number: u32,
    pub score: u32,
    pub served: u32,
    pub wrong: u32,
    pub time_remaining_secs: f32,
    pub queue_len: usize,
    /// Revealed only while the current customer is deliverable.
    pub current_order: Option<Order>,
    pub held_book: Option<HeldBookView>,
    pub customers: Vec<CustomerView>,
}

impl Engine {
    /// Capture a snapshot of the visible state.
    pub fn snapshot(&self) -> EngineSnapshot {
        let held_book = self.held_book().map(|book| HeldBookView {
            genre: book.genre(),
            cover: book.cover(),
            stamped: book.is_stamped(),
        });
        let mut customers: Vec<CustomerView> = self
            .customers()
            .map(|(id, customer)| CustomerView {
                id,
                state: customer.state,
                position: customer.position,
            })
            .collect();
        customers.sort_by(|a, b| {
            a.position
                .partial_cmp(&b.position)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        EngineSnapshot {
            tick: self.tick(),
            shift: self.shift_state(),
            day_number: self.day_number(),
            score: self.score(),
            served: self.customers_served(),
            wrong: self.wrong_deliveries(),
            time_remaining_secs: self.time_remaining_secs(),
            queue_len: self.queue_len(),
            current_order: self.current_order(),
            held_book,
            customers,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::Command;
    use crate::test_utils::*;

    #[test]
    fn snapshot_of_a_fresh_engine() {
        let engine = make_engine(1);
        let snapshot = engine.snapshot();

        assert_eq!(snapshot.shift, ShiftState::Preparation);
        assert_eq!(snapshot.day_number, 1);
        assert_eq!(snapshot.score, 0);
        assert!(snapshot.customers.is_empty());
        assert!(snapshot.current_order.is_none());
        assert!(snapshot.held_book.is_none());
    }

    #[test]
    fn snapshot_tracks_the_running_shift() {
        let mut engine = make_engine(2);
        start_day(&mut engine);
        let order = engine.current_order().unwrap();

        engine.submit(Command::Pickup { shelf: order.genre });
        engine.step();

        let snapshot = engine.snapshot();
        assert_eq!(snapshot.shift, ShiftState::Playing);
        assert_eq!(snapshot.current_order, Some(order));
        assert_eq!(snapshot.customers.len(), engine.floor_count());

        let held = snapshot.held_book.expect("a held book");
        assert_eq!(held.genre, order.genre);
        assert!(!held.stamped);
    }

    #[test]
    fn snapshot_customers_are_sorted_by_position() {
        let mut engine = make_engine(3);
        start_day(&mut engine);
        engine.run_secs(engine.settings().spawn_interval_secs * 2.0 + 1.0);

        let snapshot = engine.snapshot();
        assert!(snapshot.customers.len() >= 2);
        for pair in snapshot.customers.windows(2) {
            assert!(pair[0].position <= pair[1].position);
        }
    }
}
