//! Numeric conversion helpers centralizing safe numeric casts.

use num_traits::cast::cast;

/// Ceil a f64 and clamp it to the u32 range, returning 0 for non-finite values.
#[must_use]
pub fn ceil_f64_to_u32(value: f64) -> u32 {
    if !value.is_finite() {
        return 0;
    }
    let max = cast::<u32, f64>(u32::MAX).unwrap_or(f64::MAX);
    let clamped = value.clamp(0.0, max).ceil();
    cast::<f64, u32>(clamped).unwrap_or(0)
}

/// Floor a f64 into the i64 range, returning 0 for non-finite or out-of-range values.
#[must_use]
pub fn floor_f64_to_i64(value: f64) -> i64 {
    cast::<f64, i64>(value.floor()).unwrap_or(0)
}

/// Integer ceiling of `value / 2`.
#[must_use]
pub const fn half_ceil(value: u32) -> u32 {
    value / 2 + value % 2
}

/// Euclidean distance between two points.
#[must_use]
pub fn distance(ax: f64, ay: f64, bx: f64, by: f64) -> f64 {
    (bx - ax).hypot(by - ay)
}
