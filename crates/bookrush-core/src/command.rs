//! Input command queue for externally-submitted engine operations.
//!
//! The interaction layer (keyboard, UI buttons, bots) never mutates engine
//! state directly: it queues commands, and the engine executes them at the
//! start of the next tick. That keeps the simulation deterministic and makes
//! every player action replayable from the optional history.

use crate::id::GenreId;

// ---------------------------------------------------------------------------
// Command enum
// ---------------------------------------------------------------------------

/// A single command that can be submitted to the engine.
///
/// Commands are queued and executed at the next tick boundary. Commands that
/// are invalid in the current state are logged and dropped, never fatal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Begin the prepared day: starts the timer and the spawn loop.
    StartDay,
    /// After a finished day, re-prepare the same day.
    RestartDay,
    /// After a finished day, prepare the next day.
    NextDay,
    /// Jump to a previously unlocked day.
    GoToDay { day: u32 },
    /// Take a fresh book (random cover) from the given shelf.
    Pickup { shelf: GenreId },
    /// Stamp the held book at the checkout counter.
    Stamp,
    /// Sorting table: rotate the held book to its genre's next cover.
    CycleCover,
    /// Sorting table: move the held book to the next genre's first cover.
    ChangeGenre,
    /// Hand the held book to the current customer.
    Deliver,
}

// ---------------------------------------------------------------------------
// CommandQueue
// ---------------------------------------------------------------------------

/// A queue of commands waiting to be executed at the next tick boundary.
///
/// Supports optional history tracking for replay and debugging.
#[derive(Debug)]
pub struct CommandQueue {
    pending: Vec<Command>,
    /// History of executed commands: (tick, command).
    history: Vec<(u64, Command)>,
    /// Maximum history entries to retain. 0 = no history.
    max_history: usize,
}

impl Default for CommandQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandQueue {
    /// A new empty command queue with no history tracking.
    pub fn new() -> Self {
        Self {
            pending: Vec::new(),
            history: Vec::new(),
            max_history: 0,
        }
    }

    /// A queue that retains up to `max_history` executed commands.
    pub fn with_max_history(max_history: usize) -> Self {
        Self {
            pending: Vec::new(),
            history: Vec::new(),
            max_history,
        }
    }

    /// Push a single command onto the queue.
    pub fn push(&mut self, command: Command) {
        self.pending.push(command);
    }

    /// Push multiple commands at once.
    pub fn push_batch(&mut self, commands: impl IntoIterator<Item = Command>) {
        self.pending.extend(commands);
    }

    /// Drain all pending commands, moving them to history with the given
    /// tick. Returns the drained commands in submission order.
    pub fn drain(&mut self, tick: u64) -> Vec<Command> {
        let commands: Vec<Command> = self.pending.drain(..).collect();

        if self.max_history > 0 {
            for command in &commands {
                self.history.push((tick, *command));
            }
            let excess = self.history.len().saturating_sub(self.max_history);
            if excess > 0 {
                self.history.drain(..excess);
            }
        }

        commands
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// The (tick, command) history of executed commands.
    pub fn history(&self) -> &[(u64, Command)] {
        &self.history
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }
}
