use fixed::types::I32F32;

/// Q32.32 fixed-point: 32 integer bits, 32 fractional bits.
/// Used for deterministic probabilities and weights.
pub type Fixed64 = I32F32;

/// Ticks are the atomic unit of simulation time.
pub type Ticks = u64;

/// Fixed simulation rate. All second-valued tuning converts through this.
pub const TICKS_PER_SECOND: u32 = 20;

/// Convert wall-clock seconds to ticks, rounding to the nearest tick.
/// Negative inputs clamp to zero.
#[inline]
pub fn secs_to_ticks(secs: f32) -> Ticks {
    if secs <= 0.0 {
        return 0;
    }
    (secs * TICKS_PER_SECOND as f32).round() as Ticks
}

/// Convert ticks back to seconds. Use for display and event payloads only.
#[inline]
pub fn ticks_to_secs(ticks: Ticks) -> f32 {
    ticks as f32 / TICKS_PER_SECOND as f32
}

/// Convert an f64 to Fixed64. Use only for initialization, never in sim loop.
#[inline]
pub fn f64_to_fixed64(v: f64) -> Fixed64 {
    Fixed64::from_num(v)
}

/// Convert Fixed64 to f64. Use only for display, never in sim loop.
#[inline]
pub fn fixed64_to_f64(v: Fixed64) -> f64 {
    v.to_num::<f64>()
}
