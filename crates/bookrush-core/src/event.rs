//! Typed simulation events with pre-allocated ring buffers.
//!
//! Events are emitted during the command/timer/spawn/sequence phases and
//! delivered in batch during post-tick. Each event kind has its own ring
//! buffer, so a chatty kind (like [`Event::TimerUpdate`]) can never evict a
//! rare one (like [`Event::DayCompleted`]).
//!
//! Subscribers are passive, read-only listeners registered at construction
//! time -- the renderer, audio, and UI layers hang off these, so lifecycle
//! is explicit and testable. Event kinds can be suppressed entirely;
//! suppressed events cost nothing.

use crate::day::{DayResult, DaySettings};
use crate::fixed::Ticks;
use crate::id::{BookId, CoverId, CustomerId, GenreId};
use crate::order::Order;

// ---------------------------------------------------------------------------
// Event types
// ---------------------------------------------------------------------------

/// A simulation event. All events carry the tick at which they occurred.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    // -- Day & timer --
    DayStarted {
        settings: DaySettings,
        tick: Ticks,
    },
    DayCompleted {
        result: DayResult,
        tick: Ticks,
    },
    TimerUpdate {
        seconds_remaining: f32,
        tick: Ticks,
    },
    TimerFinished {
        tick: Ticks,
    },

    // -- Queue --
    CustomerArrived {
        customer: CustomerId,
        slot: usize,
        tick: Ticks,
    },
    CustomerPromoted {
        customer: CustomerId,
        order: Order,
        tick: Ticks,
    },
    CustomerLeft {
        customer: CustomerId,
        satisfied: bool,
        tick: Ticks,
    },
    QueueFull {
        tick: Ticks,
    },

    // -- Fulfillment --
    CustomerServed {
        customer: CustomerId,
        points: u32,
        tick: Ticks,
    },
    DeliveryRejected {
        customer: CustomerId,
        genre: GenreId,
        cover: CoverId,
        tick: Ticks,
    },
    WrongOrderCharged {
        customer: CustomerId,
        penalty: u32,
        tick: Ticks,
    },
    ScoreChanged {
        score: u32,
        tick: Ticks,
    },

    // -- Books --
    BookPickedUp {
        book: BookId,
        shelf: GenreId,
        tick: Ticks,
    },
    BookStamped {
        book: BookId,
        tick: Ticks,
    },
    BookResorted {
        book: BookId,
        genre: GenreId,
        cover: CoverId,
        tick: Ticks,
    },
}

/// Discriminant tag for event types, used for suppression and subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    DayStarted,
    DayCompleted,
    TimerUpdate,
    TimerFinished,
    CustomerArrived,
    CustomerPromoted,
    CustomerLeft,
    QueueFull,
    CustomerServed,
    DeliveryRejected,
    WrongOrderCharged,
    ScoreChanged,
    BookPickedUp,
    BookStamped,
    BookResorted,
}

/// Total number of event kinds.
const EVENT_KIND_COUNT: usize = 15;

impl Event {
    /// Get the discriminant kind for this event.
    pub fn kind(&self) -> EventKind {
        match self {
            Event::DayStarted { .. } => EventKind::DayStarted,
            Event::DayCompleted { .. } => EventKind::DayCompleted,
            Event::TimerUpdate { .. } => EventKind::TimerUpdate,
            Event::TimerFinished { .. } => EventKind::TimerFinished,
            Event::CustomerArrived { .. } => EventKind::CustomerArrived,
            Event::CustomerPromoted { .. } => EventKind::CustomerPromoted,
            Event::CustomerLeft { .. } => EventKind::CustomerLeft,
            Event::QueueFull { .. } => EventKind::QueueFull,
            Event::CustomerServed { .. } => EventKind::CustomerServed,
            Event::DeliveryRejected { .. } => EventKind::DeliveryRejected,
            Event::WrongOrderCharged { .. } => EventKind::WrongOrderCharged,
            Event::ScoreChanged { .. } => EventKind::ScoreChanged,
            Event::BookPickedUp { .. } => EventKind::BookPickedUp,
            Event::BookStamped { .. } => EventKind::BookStamped,
            Event::BookResorted { .. } => EventKind::BookResorted,
        }
    }

    /// The tick this event occurred on.
    pub fn tick(&self) -> Ticks {
        match self {
            Event::DayStarted { tick, .. }
            | Event::DayCompleted { tick, .. }
            | Event::TimerUpdate { tick, .. }
            | Event::TimerFinished { tick }
            | Event::CustomerArrived { tick, .. }
            | Event::CustomerPromoted { tick, .. }
            | Event::CustomerLeft { tick, .. }
            | Event::QueueFull { tick }
            | Event::CustomerServed { tick, .. }
            | Event::DeliveryRejected { tick, .. }
            | Event::WrongOrderCharged { tick, .. }
            | Event::ScoreChanged { tick, .. }
            | Event::BookPickedUp { tick, .. }
            | Event::BookStamped { tick, .. }
            | Event::BookResorted { tick, .. } => *tick,
        }
    }
}

impl EventKind {
    fn index(self) -> usize {
        self as usize
    }
}

// ---------------------------------------------------------------------------
// EventBuffer -- pre-allocated ring buffer
// ---------------------------------------------------------------------------

/// A pre-allocated ring buffer for events. Fixed capacity; when full, the
/// oldest events are dropped.
#[derive(Debug)]
pub struct EventBuffer {
    events: Vec<Option<Event>>,
    /// Write position (wraps around).
    head: usize,
    /// Number of events currently stored.
    len: usize,
    /// Total events ever written (including dropped).
    total_written: u64,
}

impl EventBuffer {
    /// Create a new ring buffer. A capacity of 0 is clamped to 1.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            events: (0..capacity).map(|_| None).collect(),
            head: 0,
            len: 0,
            total_written: 0,
        }
    }

    /// Push an event. If full, the oldest event is dropped.
    pub fn push(&mut self, event: Event) {
        self.events[self.head] = Some(event);
        self.head = (self.head + 1) % self.capacity();
        if self.len < self.capacity() {
            self.len += 1;
        }
        self.total_written += 1;
    }

    pub fn capacity(&self) -> usize {
        self.events.len()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Total events written since creation (including dropped).
    pub fn total_written(&self) -> u64 {
        self.total_written
    }

    /// Events dropped because the buffer was full.
    pub fn dropped_count(&self) -> u64 {
        self.total_written.saturating_sub(self.capacity() as u64)
    }

    /// Iterate from oldest to newest.
    pub fn iter(&self) -> EventBufferIter<'_> {
        let start = if self.len < self.capacity() {
            0
        } else {
            // head is the next write position, which is the oldest entry
            self.head
        };
        EventBufferIter {
            buffer: self,
            index: start,
            remaining: self.len,
        }
    }

    pub fn clear(&mut self) {
        for slot in &mut self.events {
            *slot = None;
        }
        self.head = 0;
        self.len = 0;
    }
}

/// Iterator over events in an [`EventBuffer`], from oldest to newest.
pub struct EventBufferIter<'a> {
    buffer: &'a EventBuffer,
    index: usize,
    remaining: usize,
}

impl<'a> Iterator for EventBufferIter<'a> {
    type Item = &'a Event;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let event = self.buffer.events[self.index].as_ref();
        self.index = (self.index + 1) % self.buffer.capacity();
        self.remaining -= 1;
        event
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for EventBufferIter<'_> {}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// A passive listener receives events read-only.
pub type PassiveListener = Box<dyn FnMut(&Event)>;

/// Default per-kind ring buffer capacity.
pub const DEFAULT_BUFFER_CAPACITY: usize = 256;

/// The central event bus: one ring buffer per event kind, subscriber lists,
/// and suppression flags. Emitted events stage in a pending list and are
/// delivered in batch during post-tick.
pub struct EventBus {
    buffers: [EventBuffer; EVENT_KIND_COUNT],
    suppressed: [bool; EVENT_KIND_COUNT],
    subscribers: [Vec<PassiveListener>; EVENT_KIND_COUNT],
    pending: Vec<Event>,
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("suppressed", &self.suppressed)
            .field("pending", &self.pending)
            .finish_non_exhaustive()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_BUFFER_CAPACITY)
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// A bus whose per-kind ring buffers hold `capacity` events each.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffers: std::array::from_fn(|_| EventBuffer::new(capacity)),
            suppressed: [false; EVENT_KIND_COUNT],
            subscribers: std::array::from_fn(|_| Vec::new()),
            pending: Vec::new(),
        }
    }

    /// Register a passive listener for one event kind. Listeners run in
    /// registration order during post-tick delivery.
    pub fn subscribe(&mut self, kind: EventKind, listener: PassiveListener) {
        self.subscribers[kind.index()].push(listener);
    }

    /// Suppress an event kind: emits of that kind are dropped at zero cost.
    pub fn suppress(&mut self, kind: EventKind) {
        self.suppressed[kind.index()] = true;
    }

    pub fn unsuppress(&mut self, kind: EventKind) {
        self.suppressed[kind.index()] = false;
    }

    pub fn is_suppressed(&self, kind: EventKind) -> bool {
        self.suppressed[kind.index()]
    }

    /// Stage an event for delivery at the end of the current tick.
    pub fn emit(&mut self, event: Event) {
        if self.suppressed[event.kind().index()] {
            return;
        }
        self.pending.push(event);
    }

    /// Deliver all staged events: notify subscribers and record into the
    /// per-kind ring buffers, in emission order.
    pub fn deliver(&mut self) {
        for event in self.pending.drain(..) {
            let index = event.kind().index();
            for listener in &mut self.subscribers[index] {
                listener(&event);
            }
            self.buffers[index].push(event);
        }
    }

    /// Delivered events of one kind, oldest first (bounded by capacity).
    pub fn recent(&self, kind: EventKind) -> EventBufferIter<'_> {
        self.buffers[kind.index()].iter()
    }

    /// The most recently delivered event of one kind.
    pub fn last(&self, kind: EventKind) -> Option<&Event> {
        self.buffers[kind.index()].iter().last()
    }

    /// Events staged but not yet delivered.
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Ring buffer stats for one kind: (stored, total written, dropped).
    pub fn buffer_stats(&self, kind: EventKind) -> (usize, u64, u64) {
        let buffer = &self.buffers[kind.index()];
        (buffer.len(), buffer.total_written(), buffer.dropped_count())
    }

    /// Clear every ring buffer (subscribers and suppression stay).
    pub fn clear_buffers(&mut self) {
        for buffer in &mut self.buffers {
            buffer.clear();
        }
    }
}

// ===========================================================================
// Tests
// ===========================================================================
