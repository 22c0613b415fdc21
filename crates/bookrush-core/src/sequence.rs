//! Per-customer animation sequences, advanced one tick at a time.
//!
//! Each customer runs a small explicit state machine: Idle, Moving,
//! Celebrating (jump, sparkle, linger), Shaking (shake, sulk), Exiting.
//! Exactly one sequence is active per customer; starting a new one replaces
//! whatever was running. The engine never blocks on a sequence -- completions
//! surface as [`SequenceOutcome`] values it consumes on the same tick.

use crate::fixed::{secs_to_ticks, Ticks, TICKS_PER_SECOND};
use serde::{Deserialize, Serialize};

/// Tick durations and movement speed for customer sequences.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SequenceTuning {
    /// Walk speed in lane units per second.
    pub move_speed: f32,
    /// Celebration jump.
    pub jump_ticks: Ticks,
    /// Celebration sparkle flashes.
    pub sparkle_ticks: Ticks,
    /// Hold the celebration before walking out.
    pub linger_ticks: Ticks,
    /// Disappointed shake.
    pub shake_ticks: Ticks,
    /// Sulk after the shake before walking out.
    pub sulk_ticks: Ticks,
}

impl Default for SequenceTuning {
    fn default() -> Self {
        // 1 s jump, 0.6 s of sparkle flashes, 1.5 s linger, 0.5 s shake,
        // 1 s sulk, 3 units/s walking.
        Self {
            move_speed: 3.0,
            jump_ticks: secs_to_ticks(1.0),
            sparkle_ticks: secs_to_ticks(0.6),
            linger_ticks: secs_to_ticks(1.5),
            shake_ticks: secs_to_ticks(0.5),
            sulk_ticks: secs_to_ticks(1.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CelebratePhase {
    Jump,
    Sparkle,
    Linger,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShakePhase {
    Shake,
    Sulk,
}

/// What a sequence reported after one tick of advancement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use = "exit outcomes drive queue bookkeeping and must be handled"]
pub enum SequenceOutcome {
    /// Still running (or idle).
    Pending,
    /// A movement finished: the customer stands at its target.
    Arrived,
    /// An exit walk finished: the customer has left the floor.
    Exited { satisfied: bool },
}

/// The active sequence of one customer.
#[derive(Debug, Clone, PartialEq)]
pub enum Sequence {
    Idle,
    /// Walking to a queue slot or the service position.
    Moving {
        from: f32,
        target: f32,
        elapsed: Ticks,
        total: Ticks,
    },
    /// Jump, sparkle, linger -- then walk to the satisfied exit.
    Celebrating {
        phase: CelebratePhase,
        remaining: Ticks,
        exit_target: f32,
    },
    /// Shake, sulk -- then walk to the disappointed exit.
    Shaking {
        phase: ShakePhase,
        remaining: Ticks,
        exit_target: f32,
    },
    /// Final walk off the floor.
    Exiting {
        from: f32,
        target: f32,
        elapsed: Ticks,
        total: Ticks,
        satisfied: bool,
    },
}

impl Sequence {
    /// Start walking from `from` to `target` at the tuned speed.
    pub fn move_to(from: f32, target: f32, tuning: &SequenceTuning) -> Self {
        Sequence::Moving {
            from,
            target,
            elapsed: 0,
            total: travel_ticks(from, target, tuning.move_speed),
        }
    }

    /// Start the success celebration, ending at the satisfied exit.
    pub fn celebrate(exit_target: f32, tuning: &SequenceTuning) -> Self {
        Sequence::Celebrating {
            phase: CelebratePhase::Jump,
            remaining: tuning.jump_ticks,
            exit_target,
        }
    }

    /// Start the disappointment reaction, ending at the disappointed exit.
    pub fn sulk(exit_target: f32, tuning: &SequenceTuning) -> Self {
        Sequence::Shaking {
            phase: ShakePhase::Shake,
            remaining: tuning.shake_ticks,
            exit_target,
        }
    }

    fn exit(from: f32, target: f32, satisfied: bool, tuning: &SequenceTuning) -> Self {
        Sequence::Exiting {
            from,
            target,
            elapsed: 0,
            total: travel_ticks(from, target, tuning.move_speed),
            satisfied,
        }
    }

    /// Whether the customer is on its way out (celebrating, sulking, or
    /// already walking off). Exit paths are never superseded.
    pub fn is_exit_path(&self) -> bool {
        matches!(
            self,
            Sequence::Celebrating { .. } | Sequence::Shaking { .. } | Sequence::Exiting { .. }
        )
    }

    /// Advance by one tick, updating `position` in place.
    pub fn advance(&mut self, position: &mut f32, tuning: &SequenceTuning) -> SequenceOutcome {
        match self {
            Sequence::Idle => SequenceOutcome::Pending,

            Sequence::Moving {
                from,
                target,
                elapsed,
                total,
            } => {
                *elapsed += 1;
                if *elapsed >= *total {
                    *position = *target;
                    *self = Sequence::Idle;
                    SequenceOutcome::Arrived
                } else {
                    *position = lerp(*from, *target, *elapsed as f32 / *total as f32);
                    SequenceOutcome::Pending
                }
            }

            Sequence::Celebrating {
                phase,
                remaining,
                exit_target,
            } => {
                *remaining = remaining.saturating_sub(1);
                if *remaining == 0 {
                    match *phase {
                        CelebratePhase::Jump => {
                            *phase = CelebratePhase::Sparkle;
                            *remaining = tuning.sparkle_ticks;
                        }
                        CelebratePhase::Sparkle => {
                            *phase = CelebratePhase::Linger;
                            *remaining = tuning.linger_ticks;
                        }
                        CelebratePhase::Linger => {
                            let target = *exit_target;
                            *self = Sequence::exit(*position, target, true, tuning);
                        }
                    }
                }
                SequenceOutcome::Pending
            }

            Sequence::Shaking {
                phase,
                remaining,
                exit_target,
            } => {
                *remaining = remaining.saturating_sub(1);
                if *remaining == 0 {
                    match *phase {
                        ShakePhase::Shake => {
                            *phase = ShakePhase::Sulk;
                            *remaining = tuning.sulk_ticks;
                        }
                        ShakePhase::Sulk => {
                            let target = *exit_target;
                            *self = Sequence::exit(*position, target, false, tuning);
                        }
                    }
                }
                SequenceOutcome::Pending
            }

            Sequence::Exiting {
                from,
                target,
                elapsed,
                total,
                satisfied,
            } => {
                *elapsed += 1;
                if *elapsed >= *total {
                    *position = *target;
                    let satisfied = *satisfied;
                    *self = Sequence::Idle;
                    SequenceOutcome::Exited { satisfied }
                } else {
                    *position = lerp(*from, *target, *elapsed as f32 / *total as f32);
                    SequenceOutcome::Pending
                }
            }
        }
    }
}

fn lerp(from: f32, to: f32, t: f32) -> f32 {
    from + (to - from) * t
}

/// Ticks needed to cover the distance at `speed` units/second. Always at
/// least one tick so zero-length moves still complete through the pipeline.
fn travel_ticks(from: f32, target: f32, speed: f32) -> Ticks {
    if speed <= 0.0 {
        return 1;
    }
    let secs = (target - from).abs() / speed;
    ((secs * TICKS_PER_SECOND as f32).ceil() as Ticks).max(1)
}
