//! The queue & fulfillment engine: owns every live entity and orchestrates
//! the six-phase tick pipeline.
//!
//! # Architecture
//!
//! The `Engine` owns:
//! - The frozen [`Catalog`] and the [`Spawner`] that draws orders from it
//! - Entity slotmaps for [`Customer`]s and [`Book`]s
//! - The waiting queue, the single current-customer slot, and the held book
//! - Score/served/wrong counters for the running attempt
//! - A [`DayMachine`] (shift state + countdown), a [`CommandQueue`], an
//!   [`EventBus`], and a seeded [`SimRng`]
//!
//! External layers never touch this state directly: input submits
//! [`Command`]s, output hangs off the event bus and [`snapshot`] queries.
//!
//! # Six-Phase Pipeline
//!
//! Each `step()` runs: commands, timer, spawn, sequences, post-tick event
//! delivery, bookkeeping. See the crate docs for the full description.
//!
//! [`snapshot`]: Engine::snapshot

use crate::book::Book;
use crate::catalog::{Catalog, Color};
use crate::command::{Command, CommandQueue};
use crate::customer::{Customer, CustomerState};
use crate::day::{DayMachine, DayResult, DaySettings, ShiftState};
use crate::event::{Event, EventBus};
use crate::fixed::{secs_to_ticks, Ticks};
use crate::id::{BookId, CoverId, CustomerId, GenreId};
use crate::order::Order;
use crate::progress::ProgressStore;
use crate::rng::SimRng;
use crate::sequence::{SequenceOutcome, SequenceTuning};
use crate::spawner::Spawner;
use crate::timer::TimerTick;
use serde::{Deserialize, Serialize};
use slotmap::SlotMap;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// 1-D lane positions of the shop floor. The renderer maps these onto the
/// scene; the engine only needs them for walk durations and slot targets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FloorPlan {
    /// Where the current customer stands to be served.
    pub service_position: f32,
    /// Position of queue slot 0.
    pub queue_start: f32,
    /// Distance between adjacent queue slots.
    pub queue_spacing: f32,
    /// Where new customers appear.
    pub spawn_position: f32,
    /// Satisfied customers leave to the right.
    pub satisfied_exit: f32,
    /// Disappointed customers leave to the left.
    pub disappointed_exit: f32,
}

impl Default for FloorPlan {
    fn default() -> Self {
        Self {
            service_position: 0.0,
            queue_start: 3.0,
            queue_spacing: 2.0,
            spawn_position: 12.0,
            satisfied_exit: 15.0,
            disappointed_exit: -15.0,
        }
    }
}

impl FloorPlan {
    /// Lane position of a queue slot (0 = front).
    pub fn queue_slot(&self, slot: usize) -> f32 {
        self.queue_start + slot as f32 * self.queue_spacing
    }
}

/// Engine construction parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// 1-based day to prepare first.
    pub starting_day: u32,
    /// PRNG seed. Same seed, same shift.
    pub seed: u64,
    pub floor_plan: FloorPlan,
    pub tuning: SequenceTuning,
    /// Pause before the next customer steps up after a failed delivery.
    pub respawn_delay_secs: f32,
    /// Executed-command history to retain (0 disables).
    pub command_history: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            starting_day: 1,
            seed: 0,
            floor_plan: FloorPlan::default(),
            tuning: SequenceTuning::default(),
            respawn_delay_secs: 1.0,
            command_history: 0,
        }
    }
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// The queue & fulfillment orchestrator.
#[derive(Debug)]
pub struct Engine {
    catalog: Catalog,
    spawner: Spawner,
    config: EngineConfig,
    day: DayMachine,

    // -- Entities --
    customers: SlotMap<CustomerId, Customer>,
    books: SlotMap<BookId, Book>,

    // -- Queue bookkeeping --
    queue: Vec<CustomerId>,
    current: Option<CustomerId>,
    held_book: Option<BookId>,

    // -- Attempt counters --
    score: u32,
    served: u32,
    wrong: u32,

    // -- Countdowns --
    spawn_countdown: Ticks,
    pending_advance: Option<Ticks>,

    tick: Ticks,
    rng: SimRng,
    commands: CommandQueue,

    /// Typed event bus for simulation events.
    pub event_bus: EventBus,

    progress: Option<Box<dyn ProgressStore>>,
}

impl Engine {
    /// Create an engine over a frozen catalog. The first day is prepared but
    /// not started; submit [`Command::StartDay`] to begin.
    pub fn new(catalog: Catalog, spawner: Spawner, config: EngineConfig) -> Self {
        let commands = if config.command_history > 0 {
            CommandQueue::with_max_history(config.command_history)
        } else {
            CommandQueue::new()
        };
        Self {
            day: DayMachine::new(config.starting_day),
            rng: SimRng::new(config.seed),
            catalog,
            spawner,
            config,
            customers: SlotMap::with_key(),
            books: SlotMap::with_key(),
            queue: Vec::new(),
            current: None,
            held_book: None,
            score: 0,
            served: 0,
            wrong: 0,
            spawn_countdown: 0,
            pending_advance: None,
            tick: 0,
            commands,
            event_bus: EventBus::default(),
            progress: None,
        }
    }

    /// An engine whose day machine is supplied by the caller, for tuned
    /// scenarios and sandboxes.
    pub fn with_day_machine(
        catalog: Catalog,
        spawner: Spawner,
        config: EngineConfig,
        day: DayMachine,
    ) -> Self {
        let mut engine = Self::new(catalog, spawner, config);
        engine.day = day;
        engine
    }

    /// Attach persisted progress. Reads the highest day reached immediately;
    /// a missing or corrupt store degrades to day 1 with a warning.
    pub fn set_progress_store(&mut self, mut store: Box<dyn ProgressStore>) {
        match store.load() {
            Ok(highest) => self.day.set_highest_day_reached(highest),
            Err(err) => log::warn!("could not load progress, starting from day 1: {err}"),
        }
        self.progress = Some(store);
    }

    // -----------------------------------------------------------------------
    // Input
    // -----------------------------------------------------------------------

    /// Queue a command for the next tick.
    pub fn submit(&mut self, command: Command) {
        self.commands.push(command);
    }

    /// Queue several commands; they execute in order on the next tick.
    pub fn submit_batch(&mut self, commands: impl IntoIterator<Item = Command>) {
        self.commands.push_batch(commands);
    }

    /// Executed-command history, if enabled in the config.
    pub fn command_history(&self) -> &[(u64, Command)] {
        self.commands.history()
    }

    // -----------------------------------------------------------------------
    // Tick pipeline
    // -----------------------------------------------------------------------

    /// Advance the simulation by one tick.
    pub fn step(&mut self) {
        // Phase 1: commands
        let commands = self.commands.drain(self.tick);
        for command in commands {
            self.execute(command);
        }

        // Phase 2: timer
        self.timer_phase();

        // Phase 3: spawn loop and the post-failure advance delay
        self.spawn_phase();

        // Phase 4: sequences
        self.sequence_phase();

        // Phase 5: post-tick event delivery
        self.event_bus.deliver();

        // Phase 6: bookkeeping
        self.tick += 1;
    }

    /// Run several ticks.
    pub fn run(&mut self, ticks: Ticks) {
        for _ in 0..ticks {
            self.step();
        }
    }

    /// Run the equivalent of `secs` of simulated time.
    pub fn run_secs(&mut self, secs: f32) {
        self.run(secs_to_ticks(secs));
    }

    fn execute(&mut self, command: Command) {
        match command {
            Command::StartDay => self.exec_start_day(),
            Command::RestartDay => self.exec_reprepare(false),
            Command::NextDay => self.exec_reprepare(true),
            Command::GoToDay { day } => self.exec_go_to_day(day),
            Command::Pickup { shelf } => self.exec_pickup(shelf),
            Command::Stamp => self.exec_stamp(),
            Command::CycleCover => self.exec_cycle_cover(),
            Command::ChangeGenre => self.exec_change_genre(),
            Command::Deliver => self.exec_deliver(),
        }
    }

    fn timer_phase(&mut self) {
        match self.day.tick_timer() {
            TimerTick::Running { seconds_remaining } => {
                self.event_bus.emit(Event::TimerUpdate {
                    seconds_remaining,
                    tick: self.tick,
                });
            }
            TimerTick::Expired => {
                self.event_bus.emit(Event::TimerFinished { tick: self.tick });
                self.finish_day();
            }
            TimerTick::Idle => {}
        }
    }

    fn spawn_phase(&mut self) {
        if self.day.state() == ShiftState::Playing {
            if self.spawn_countdown == 0 {
                self.try_spawn();
                self.spawn_countdown = self.day.settings().spawn_interval_ticks();
            } else {
                self.spawn_countdown -= 1;
            }
        }

        if let Some(remaining) = self.pending_advance {
            if remaining == 0 {
                self.pending_advance = None;
                self.advance_queue();
            } else {
                self.pending_advance = Some(remaining - 1);
            }
        }
    }

    fn sequence_phase(&mut self) {
        let ids: Vec<CustomerId> = self.customers.keys().collect();
        let mut exits: Vec<(CustomerId, bool)> = Vec::new();
        for id in ids {
            let Some(customer) = self.customers.get_mut(id) else {
                continue;
            };
            match customer.advance_sequence(&self.config.tuning) {
                SequenceOutcome::Exited { satisfied } => exits.push((id, satisfied)),
                SequenceOutcome::Arrived | SequenceOutcome::Pending => {}
            }
        }
        for (id, satisfied) in exits {
            self.resolve_exit(id, satisfied);
        }
    }

    // -----------------------------------------------------------------------
    // Day control
    // -----------------------------------------------------------------------

    fn exec_start_day(&mut self) {
        match self.day.start_day() {
            Ok(settings) => {
                self.reset_attempt();
                log::info!(
                    "day {} started: serve {} customers in {}s",
                    settings.day_number,
                    settings.required_customers,
                    settings.duration_secs
                );
                self.event_bus.emit(Event::DayStarted {
                    settings,
                    tick: self.tick,
                });
            }
            Err(err) => log::warn!("StartDay rejected: {err}"),
        }
    }

    fn exec_reprepare(&mut self, next: bool) {
        let result = if next {
            self.day.advance_day()
        } else {
            self.day.restart_day()
        };
        match result {
            Ok(settings) => {
                self.reset_attempt();
                log::info!("day {} prepared", settings.day_number);
            }
            Err(err) => {
                let name = if next { "NextDay" } else { "RestartDay" };
                log::warn!("{name} rejected: {err}");
            }
        }
    }

    fn exec_go_to_day(&mut self, day: u32) {
        match self.day.go_to_day(day) {
            Ok(settings) => {
                self.reset_attempt();
                log::info!("day {} prepared", settings.day_number);
            }
            Err(err) => log::warn!("GoToDay rejected: {err}"),
        }
    }

    fn finish_day(&mut self) {
        let time_remaining = self.day.time_remaining_secs();
        let success = match self.day.conclude(self.served) {
            Ok(success) => success,
            Err(err) => {
                log::error!("could not conclude the day: {err}");
                return;
            }
        };
        let result = DayResult::new(success, self.served, self.wrong, self.score, time_remaining);
        log::info!("{}", result.message);

        if success && self.day.record_progress() {
            let highest = self.day.highest_day_reached();
            if let Some(store) = self.progress.as_mut() {
                if let Err(err) = store.save(highest) {
                    log::warn!("could not persist progress: {err}");
                }
            }
        }

        self.event_bus.emit(Event::DayCompleted {
            result,
            tick: self.tick,
        });
    }

    /// Clear all per-attempt state. Mid-exit customers from the previous
    /// attempt are dropped with the rest of the floor.
    fn reset_attempt(&mut self) {
        self.customers.clear();
        self.books.clear();
        self.queue.clear();
        self.current = None;
        self.held_book = None;
        self.score = 0;
        self.served = 0;
        self.wrong = 0;
        self.spawn_countdown = 0;
        self.pending_advance = None;
    }

    // -----------------------------------------------------------------------
    // Queue management
    // -----------------------------------------------------------------------

    /// Spawn one customer if the queue has room. Driven by the spawn loop
    /// while a shift runs; also callable directly for sandbox setups.
    pub fn try_spawn(&mut self) {
        let bound = self.day.settings().max_queue_size;
        let total = self.queue.len() + usize::from(self.current.is_some());
        if total >= bound {
            log::debug!("queue full ({total}/{bound}); skipping spawn");
            self.event_bus.emit(Event::QueueFull { tick: self.tick });
            return;
        }

        let order = match self.spawner.draw_order(&self.catalog, &mut self.rng) {
            Ok(order) => order,
            Err(err) => {
                log::warn!("could not spawn a customer: {err}");
                return;
            }
        };

        let customer = Customer::new(order, self.config.floor_plan.spawn_position, self.tick);
        let id = self.customers.insert(customer);
        self.queue.push(id);
        let slot = self.queue.len() - 1;
        self.place_in_queue(id, slot);
        self.event_bus.emit(Event::CustomerArrived {
            customer: id,
            slot,
            tick: self.tick,
        });

        if self.current.is_none() {
            self.advance_queue();
        }
    }

    /// Promote the front of the queue to the counter. Idempotent on an empty
    /// queue: `current` simply stays empty.
    fn advance_queue(&mut self) {
        if self.queue.is_empty() {
            self.current = None;
            return;
        }
        let next = self.queue.remove(0);
        self.current = Some(next);

        let order = match self.customers.get_mut(next) {
            Some(customer) => {
                customer.set_current(self.config.floor_plan.service_position, &self.config.tuning);
                customer.order
            }
            None => {
                log::error!("queued customer {next:?} is missing; advancing past it");
                self.current = None;
                return self.advance_queue();
            }
        };
        self.event_bus.emit(Event::CustomerPromoted {
            customer: next,
            order,
            tick: self.tick,
        });

        // Everyone left in line shuffles forward one slot.
        let remaining = self.queue.clone();
        for (slot, id) in remaining.into_iter().enumerate() {
            self.place_in_queue(id, slot);
        }
    }

    fn place_in_queue(&mut self, id: CustomerId, slot: usize) {
        let target = self.config.floor_plan.queue_slot(slot);
        if let Some(customer) = self.customers.get_mut(id) {
            customer.set_waiting(slot, target, &self.config.tuning);
        }
    }

    /// A customer finished walking off the floor.
    fn resolve_exit(&mut self, id: CustomerId, satisfied: bool) {
        if satisfied {
            if self.current == Some(id) {
                // Served customers leave the counter at delivery time.
                self.current = None;
            }
            self.customers.remove(id);
            self.event_bus.emit(Event::CustomerLeft {
                customer: id,
                satisfied: true,
                tick: self.tick,
            });
            return;
        }

        // Disappointed exits carry the penalty bookkeeping.
        self.wrong += 1;
        let penalty = self.day.settings().wrong_order_penalty;
        self.event_bus.emit(Event::WrongOrderCharged {
            customer: id,
            penalty,
            tick: self.tick,
        });
        self.add_score(-(penalty as i64));

        if let Some(index) = self.queue.iter().position(|&queued| queued == id) {
            self.queue.remove(index);
            let remaining = self.queue.clone();
            for (slot, queued) in remaining.into_iter().enumerate() {
                self.place_in_queue(queued, slot);
            }
        }

        if self.current == Some(id) {
            self.current = None;
            self.pending_advance = Some(secs_to_ticks(self.config.respawn_delay_secs).max(1));
        }

        self.customers.remove(id);
        self.event_bus.emit(Event::CustomerLeft {
            customer: id,
            satisfied: false,
            tick: self.tick,
        });
    }

    // -----------------------------------------------------------------------
    // Player commands
    // -----------------------------------------------------------------------

    fn exec_pickup(&mut self, shelf: GenreId) {
        if self.day.state() != ShiftState::Playing {
            log::warn!("Pickup rejected: shift is not in progress");
            return;
        }
        if self.held_book.is_some() {
            log::debug!("Pickup rejected: hands full");
            return;
        }
        let covers = self.catalog.covers_for(shelf);
        if covers.is_empty() {
            log::warn!("Pickup rejected: unknown or empty shelf {shelf:?}");
            return;
        }

        // Shelf pickups grab whatever cover comes to hand.
        let index = self.rng.index(covers.len());
        let color = self
            .catalog
            .cover(shelf, CoverId(index as u16))
            .map(|c| c.color)
            .unwrap_or(Color::WHITE);
        let book = Book::new(shelf, CoverId(index as u16), color, shelf);
        let id = self.books.insert(book);
        self.held_book = Some(id);
        self.event_bus.emit(Event::BookPickedUp {
            book: id,
            shelf,
            tick: self.tick,
        });
    }

    fn exec_stamp(&mut self) {
        if self.day.state() != ShiftState::Playing {
            log::warn!("Stamp rejected: shift is not in progress");
            return;
        }
        let Some(id) = self.held_book else {
            log::debug!("Stamp rejected: not holding a book");
            return;
        };
        let Some(book) = self.books.get_mut(id) else {
            log::error!("held book {id:?} is missing");
            self.held_book = None;
            return;
        };
        if book.is_stamped() {
            log::debug!("Stamp ignored: book already stamped");
            return;
        }
        book.stamp();
        self.event_bus.emit(Event::BookStamped {
            book: id,
            tick: self.tick,
        });
    }

    fn exec_cycle_cover(&mut self) {
        if self.day.state() != ShiftState::Playing {
            log::warn!("CycleCover rejected: shift is not in progress");
            return;
        }
        let Some(id) = self.held_book else {
            log::debug!("CycleCover rejected: not holding a book");
            return;
        };
        let (genre, cover) = match self.books.get(id) {
            Some(book) => (book.genre(), book.cover()),
            None => {
                log::error!("held book {id:?} is missing");
                self.held_book = None;
                return;
            }
        };
        let Some(next) = self.catalog.next_cover(genre, cover) else {
            log::warn!("CycleCover rejected: no covers registered for {genre:?}");
            return;
        };
        let color = self
            .catalog
            .cover(genre, next)
            .map(|c| c.color)
            .unwrap_or(Color::WHITE);

        let Some(book) = self.books.get_mut(id) else {
            return;
        };
        match book.set_cover(next, color) {
            Ok(()) => self.event_bus.emit(Event::BookResorted {
                book: id,
                genre,
                cover: next,
                tick: self.tick,
            }),
            Err(err) => log::warn!("CycleCover rejected: {err}"),
        }
    }

    fn exec_change_genre(&mut self) {
        if self.day.state() != ShiftState::Playing {
            log::warn!("ChangeGenre rejected: shift is not in progress");
            return;
        }
        let Some(id) = self.held_book else {
            log::debug!("ChangeGenre rejected: not holding a book");
            return;
        };
        let genre = match self.books.get(id) {
            Some(book) => book.genre(),
            None => {
                log::error!("held book {id:?} is missing");
                self.held_book = None;
                return;
            }
        };
        let Some(next_genre) = self.catalog.next_genre(genre) else {
            log::warn!("ChangeGenre rejected: need at least two orderable genres");
            return;
        };
        // Genre swaps land on the new genre's first cover.
        let first = CoverId(0);
        let color = self
            .catalog
            .cover(next_genre, first)
            .map(|c| c.color)
            .unwrap_or(Color::WHITE);

        let Some(book) = self.books.get_mut(id) else {
            return;
        };
        match book.set_genre_and_cover(next_genre, first, color) {
            Ok(()) => self.event_bus.emit(Event::BookResorted {
                book: id,
                genre: next_genre,
                cover: first,
                tick: self.tick,
            }),
            Err(err) => log::warn!("ChangeGenre rejected: {err}"),
        }
    }

    fn exec_deliver(&mut self) {
        if self.day.state() != ShiftState::Playing {
            log::warn!("Deliver rejected: shift is not in progress");
            return;
        }
        let Some(book_id) = self.held_book else {
            log::debug!("Deliver rejected: not holding a book");
            return;
        };
        let Some(customer_id) = self.current else {
            log::debug!("Deliver rejected: no customer at the counter");
            return;
        };
        let state = match self.customers.get(customer_id) {
            Some(customer) => customer.state,
            None => {
                log::error!("current customer {customer_id:?} is missing");
                self.current = None;
                return;
            }
        };
        // Waiting customers can never be targets; Disappointed/BeingServed
        // customers reject double submissions.
        if state != CustomerState::Current {
            log::debug!("Deliver rejected: customer is busy ({state:?})");
            return;
        }

        // The book is consumed no matter how the delivery goes: there is no
        // take-the-book-back path.
        let Some(book) = self.books.remove(book_id) else {
            log::error!("held book {book_id:?} is missing");
            self.held_book = None;
            return;
        };
        self.held_book = None;

        let matched = match self.customers.get_mut(customer_id) {
            Some(customer) => {
                let matched = book.matches(&customer.order);
                if matched {
                    customer.begin_service(
                        self.config.floor_plan.satisfied_exit,
                        &self.config.tuning,
                    );
                } else {
                    customer.begin_disappointment(
                        self.config.floor_plan.disappointed_exit,
                        &self.config.tuning,
                    );
                }
                matched
            }
            None => return,
        };

        if matched {
            self.served += 1;
            let points = self.day.settings().points_per_customer;
            self.event_bus.emit(Event::CustomerServed {
                customer: customer_id,
                points,
                tick: self.tick,
            });
            self.add_score(points as i64);
            // The counter frees up immediately; the celebration plays out on
            // the way to the exit.
            self.current = None;
            self.advance_queue();
        } else {
            self.event_bus.emit(Event::DeliveryRejected {
                customer: customer_id,
                genre: book.genre(),
                cover: book.cover(),
                tick: self.tick,
            });
            // wrong/penalty bookkeeping happens when the sulk exit completes
        }
    }

    /// Apply a score delta, clamping at zero, and announce the new total.
    fn add_score(&mut self, delta: i64) {
        self.score = (self.score as i64 + delta).max(0) as u32;
        self.event_bus.emit(Event::ScoreChanged {
            score: self.score,
            tick: self.tick,
        });
    }

    // -----------------------------------------------------------------------
    // Read access
    // -----------------------------------------------------------------------

    pub fn tick(&self) -> Ticks {
        self.tick
    }

    pub fn shift_state(&self) -> ShiftState {
        self.day.state()
    }

    pub fn day_number(&self) -> u32 {
        self.day.day_number()
    }

    pub fn settings(&self) -> &DaySettings {
        self.day.settings()
    }

    pub fn highest_day_reached(&self) -> u32 {
        self.day.highest_day_reached()
    }

    pub fn time_remaining_secs(&self) -> f32 {
        self.day.time_remaining_secs()
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn customers_served(&self) -> u32 {
        self.served
    }

    pub fn wrong_deliveries(&self) -> u32 {
        self.wrong
    }

    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    /// Queue plus the counter slot.
    pub fn total_customers(&self) -> usize {
        self.queue.len() + usize::from(self.current.is_some())
    }

    /// Everyone on the floor, including customers mid-exit.
    pub fn floor_count(&self) -> usize {
        self.customers.len()
    }

    pub fn current_customer(&self) -> Option<CustomerId> {
        self.current
    }

    /// The current customer's order, visible only while they are deliverable.
    pub fn current_order(&self) -> Option<Order> {
        let id = self.current?;
        let customer = self.customers.get(id)?;
        customer.is_current().then_some(customer.order)
    }

    pub fn customer(&self, id: CustomerId) -> Option<&Customer> {
        self.customers.get(id)
    }

    pub fn held_book_id(&self) -> Option<BookId> {
        self.held_book
    }

    pub fn held_book(&self) -> Option<&Book> {
        self.books.get(self.held_book?)
    }

    pub fn book(&self, id: BookId) -> Option<&Book> {
        self.books.get(id)
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Iterate over every customer on the floor.
    pub fn customers(&self) -> impl Iterator<Item = (CustomerId, &Customer)> {
        self.customers.iter()
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventKind;
    use crate::progress::MemoryProgressStore;
    use crate::test_utils::*;

    #[test]
    fn engine_starts_in_preparation() {
        let engine = make_engine(1);
        assert_eq!(engine.shift_state(), ShiftState::Preparation);
        assert_eq!(engine.total_customers(), 0);
        assert_eq!(engine.score(), 0);
    }

    #[test]
    fn start_day_begins_spawning() {
        let mut engine = make_engine(1);
        start_day(&mut engine);

        assert_eq!(engine.shift_state(), ShiftState::Playing);
        // The first spawn fires on the first playing tick and is promoted
        // straight to the counter.
        assert_eq!(engine.total_customers(), 1);
        assert!(engine.current_customer().is_some());
        assert_eq!(count_events(&engine, EventKind::CustomerPromoted), 1);
    }

    #[test]
    fn player_commands_rejected_outside_playing() {
        let mut engine = make_engine(1);
        let fantasy = engine.catalog().genre_id("Fantasy").unwrap();

        engine.submit_batch([
            Command::Pickup { shelf: fantasy },
            Command::Stamp,
            Command::Deliver,
        ]);
        engine.step();

        assert!(engine.held_book().is_none());
        assert_eq!(engine.customers_served(), 0);
    }

    #[test]
    fn start_day_twice_is_rejected() {
        let mut engine = make_engine(1);
        start_day(&mut engine);
        let customers_before = engine.total_customers();

        engine.submit(Command::StartDay);
        engine.step();

        // The rejected restart must not wipe the floor.
        assert_eq!(engine.shift_state(), ShiftState::Playing);
        assert!(engine.total_customers() >= customers_before);
    }

    #[test]
    fn pickup_stamp_and_matching_delivery() {
        let mut engine = make_engine(3);
        start_day(&mut engine);

        assert!(engine.current_order().is_some(), "customer at the counter");
        fulfill_current_order(&mut engine);

        assert_eq!(engine.customers_served(), 1);
        assert_eq!(engine.score(), engine.settings().points_per_customer);
        assert!(engine.held_book().is_none(), "the book was consumed");

        match engine.event_bus.last(EventKind::CustomerServed) {
            Some(Event::CustomerServed { points, .. }) => {
                assert_eq!(*points, engine.settings().points_per_customer);
            }
            other => panic!("expected CustomerServed, got {other:?}"),
        }
        // The served customer left the counter even though they are still
        // celebrating on the floor.
        assert!(engine.floor_count() >= engine.total_customers());
    }

    #[test]
    fn unstamped_delivery_is_always_wrong() {
        let mut engine = make_engine(5);
        start_day(&mut engine);

        let order = engine.current_order().unwrap();
        // Fetch the exact ordered book but skip the stamp.
        engine.submit(Command::Pickup { shelf: order.genre });
        engine.step();
        align_held_cover(&mut engine, order.cover);
        engine.submit(Command::Deliver);
        engine.step();

        assert_eq!(engine.customers_served(), 0);
        assert!(engine.event_bus.last(EventKind::DeliveryRejected).is_some());

        // Let the sulk-and-exit sequence finish: the penalty lands then.
        engine.run_secs(15.0);
        assert_eq!(engine.wrong_deliveries(), 1);
        assert_eq!(engine.score(), 0);
    }

    #[test]
    fn penalty_saturates_at_zero() {
        let mut engine = make_engine(5);
        start_day(&mut engine);

        deliver_wrong_book(&mut engine);
        engine.run_secs(15.0);

        assert_eq!(engine.wrong_deliveries(), 1);
        assert_eq!(engine.score(), 0, "penalty must clamp, not underflow");
    }

    #[test]
    fn failed_delivery_advances_after_delay() {
        let mut engine = make_engine(7);
        start_day(&mut engine);
        // Let a second customer queue up behind the first.
        engine.run_secs(engine.settings().spawn_interval_secs + 0.5);
        assert!(engine.total_customers() >= 2);

        let first = engine.current_customer().unwrap();
        deliver_wrong_book(&mut engine);

        // While the customer sulks, the counter slot stays blocked.
        assert_eq!(engine.current_customer(), Some(first));

        engine.run_secs(20.0);
        let next = engine.current_customer();
        assert!(next.is_some(), "queue must not stall after a failure");
        assert_ne!(next, Some(first));
    }

    #[test]
    fn double_deliver_hits_the_busy_guard() {
        let mut engine = make_engine(9);
        start_day(&mut engine);

        deliver_wrong_book(&mut engine);
        let wrong_events = count_events(&engine, EventKind::DeliveryRejected);

        // Second delivery against the sulking customer: rejected outright.
        let order = engine
            .customer(engine.current_customer().unwrap())
            .unwrap()
            .order;
        engine.submit(Command::Pickup { shelf: order.genre });
        engine.submit(Command::Stamp);
        engine.submit(Command::Deliver);
        engine.step();

        assert_eq!(count_events(&engine, EventKind::DeliveryRejected), wrong_events);
        // The held book is kept: the busy guard fires before consumption.
        assert!(engine.held_book().is_some());
    }

    #[test]
    fn exactly_one_promotion_per_fulfillment() {
        let mut engine = make_engine(11);
        start_day(&mut engine);
        engine.run_secs(engine.settings().spawn_interval_secs + 0.5);
        let promoted_before = count_events(&engine, EventKind::CustomerPromoted);

        fulfill_current_order(&mut engine);
        engine.run_secs(0.5);

        let promoted_after = count_events(&engine, EventKind::CustomerPromoted);
        assert_eq!(promoted_after, promoted_before + 1);
    }

    #[test]
    fn stamped_book_cannot_be_resorted() {
        let mut engine = make_engine(13);
        start_day(&mut engine);

        let order = engine.current_order().unwrap();
        engine.submit(Command::Pickup { shelf: order.genre });
        engine.submit(Command::Stamp);
        engine.step();
        let before = engine.held_book().unwrap().clone();

        engine.submit(Command::CycleCover);
        engine.submit(Command::ChangeGenre);
        engine.step();

        assert_eq!(engine.held_book().unwrap(), &before);
    }

    #[test]
    fn reserved_shelf_allows_pickup_but_never_orders() {
        let mut engine = make_engine(15);
        start_day(&mut engine);
        let general = engine.catalog().genre_id("General").unwrap();

        engine.submit(Command::Pickup { shelf: general });
        engine.step();

        let held = engine.held_book().expect("general stock is pickable");
        assert_eq!(held.genre(), general);

        // No spawned order ever points at the reserved shelf.
        for (_, customer) in engine.customers() {
            assert_ne!(customer.order.genre, general);
        }
    }

    #[test]
    fn progress_persists_on_success() {
        let mut engine = make_engine(17);
        engine.set_progress_store(Box::new(MemoryProgressStore::new(1)));
        start_day(&mut engine);

        let required = engine.settings().required_customers;
        for _ in 0..required {
            wait_for_current(&mut engine);
            fulfill_current_order(&mut engine);
        }
        engine.run_secs(engine.settings().duration_secs + 1.0);

        assert_eq!(engine.shift_state(), ShiftState::DayComplete);
        assert_eq!(engine.highest_day_reached(), 2);
        match engine.event_bus.last(EventKind::DayCompleted) {
            Some(Event::DayCompleted { result, .. }) => {
                assert!(result.success);
                assert_eq!(result.customers_served, required);
            }
            other => panic!("expected DayCompleted, got {other:?}"),
        }
    }

    #[test]
    fn next_day_resets_the_attempt() {
        let mut engine = make_engine(19);
        start_day(&mut engine);
        engine.run_secs(engine.settings().duration_secs + 1.0);
        assert_eq!(engine.shift_state(), ShiftState::DayFailed);

        engine.submit(Command::RestartDay);
        engine.step();
        assert_eq!(engine.shift_state(), ShiftState::Preparation);
        assert_eq!(engine.total_customers(), 0);
        assert_eq!(engine.score(), 0);
        assert_eq!(engine.day_number(), 1);
    }

    #[test]
    fn timer_fires_exactly_once() {
        let mut engine = make_engine(21);
        start_day(&mut engine);
        engine.run_secs(engine.settings().duration_secs + 30.0);
        assert_eq!(count_events(&engine, EventKind::TimerFinished), 1);
        assert_eq!(count_events(&engine, EventKind::DayCompleted), 1);
    }

    #[test]
    fn advance_queue_is_idempotent_on_empty() {
        let mut engine = make_engine(23);
        engine.advance_queue();
        engine.advance_queue();
        assert!(engine.current_customer().is_none());
        assert_eq!(engine.queue_len(), 0);
    }
}
