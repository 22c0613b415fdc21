//! The customer entity and its lifecycle.
//!
//! A customer is spawned Waiting at the back of the queue, promoted to
//! Current when it reaches the counter (which is when its order becomes
//! visible), and leaves through exactly one of two exits: satisfied
//! (celebration, right side) or disappointed (shake, left side). BeingServed
//! and Disappointed are entered at most once and never re-entered; together
//! with the Current check they guard against double-submission.

use crate::fixed::Ticks;
use crate::order::Order;
use crate::sequence::{Sequence, SequenceOutcome, SequenceTuning};

/// Lifecycle state, driven exclusively by the engine and by sequence
/// completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CustomerState {
    /// In the queue at the given slot (0 = front). Order hidden.
    Waiting { slot: usize },
    /// At the counter, order revealed, deliverable.
    Current,
    /// Delivery accepted; celebrating and on the way out.
    BeingServed,
    /// Delivery rejected; sulking and on the way out.
    Disappointed,
}

/// A customer on the shop floor.
#[derive(Debug, Clone)]
pub struct Customer {
    pub order: Order,
    pub state: CustomerState,
    /// Tick at which the customer joined the queue.
    pub enqueued_at: Ticks,
    /// Current spot on the 1-D shop lane.
    pub position: f32,
    pub sequence: Sequence,
}

impl Customer {
    pub fn new(order: Order, spawn_position: f32, now: Ticks) -> Self {
        Self {
            order,
            state: CustomerState::Waiting { slot: 0 },
            enqueued_at: now,
            position: spawn_position,
            sequence: Sequence::Idle,
        }
    }

    pub fn is_current(&self) -> bool {
        self.state == CustomerState::Current
    }

    /// Place the customer at a queue slot and start the walk there.
    pub fn set_waiting(&mut self, slot: usize, target: f32, tuning: &SequenceTuning) {
        self.state = CustomerState::Waiting { slot };
        self.start_move(target, tuning);
    }

    /// Promote to the counter. The queue engine guarantees at most one
    /// customer is Current at a time.
    pub fn set_current(&mut self, service_position: f32, tuning: &SequenceTuning) {
        self.state = CustomerState::Current;
        self.start_move(service_position, tuning);
    }

    /// Accept a matching delivery: celebrate, then walk to the satisfied exit.
    pub fn begin_service(&mut self, exit_target: f32, tuning: &SequenceTuning) {
        self.state = CustomerState::BeingServed;
        self.sequence = Sequence::celebrate(exit_target, tuning);
    }

    /// Reject a delivery: sulk, then walk to the disappointed exit.
    pub fn begin_disappointment(&mut self, exit_target: f32, tuning: &SequenceTuning) {
        self.state = CustomerState::Disappointed;
        self.sequence = Sequence::sulk(exit_target, tuning);
    }

    /// Start a plain walk, superseding any non-exit sequence.
    pub fn start_move(&mut self, target: f32, tuning: &SequenceTuning) {
        if self.sequence.is_exit_path() {
            log::warn!("refusing to interrupt an exit sequence with a move");
            return;
        }
        self.sequence = Sequence::move_to(self.position, target, tuning);
    }

    /// Advance the active sequence by one tick.
    pub fn advance_sequence(&mut self, tuning: &SequenceTuning) -> SequenceOutcome {
        self.sequence.advance(&mut self.position, tuning)
    }
}
