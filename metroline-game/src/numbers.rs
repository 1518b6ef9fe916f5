//! Numeric conversion helpers centralizing safe numeric casts.

use num_traits::cast::cast;

/// Slack applied before flooring ratios so `0.3 / 0.01` lands on 30, not 29.
const RATIO_EPSILON: f64 = 1e-9;

/// Floor a non-negative ratio into a `usize`, returning 0 for non-finite,
/// negative, or zero-denominator inputs.
#[must_use]
pub fn floor_ratio_to_usize(numerator: f64, denominator: f64) -> usize {
    if denominator <= 0.0 || !numerator.is_finite() || !denominator.is_finite() {
        return 0;
    }
    let ratio = numerator / denominator;
    if ratio <= 0.0 {
        return 0;
    }
    cast::<f64, usize>((ratio + RATIO_EPSILON).floor()).unwrap_or(usize::MAX)
}

/// Round a seconds value into a whole tick count at the given rate.
#[must_use]
pub fn secs_to_ticks(secs: f64, ticks_per_second: u32) -> u64 {
    if !secs.is_finite() || secs <= 0.0 {
        return 0;
    }
    let ticks = (secs * f64::from(ticks_per_second)).round();
    cast::<f64, u64>(ticks).unwrap_or(u64::MAX)
}

/// Convert a tick count into a float while allowing precision loss in a single location.
#[must_use]
pub fn u64_to_f64(value: u64) -> f64 {
    cast::<u64, f64>(value).unwrap_or(0.0)
}

/// Convert a count into a float while allowing precision loss in a single location.
#[must_use]
pub fn usize_to_f64(value: usize) -> f64 {
    cast::<usize, f64>(value).unwrap_or(0.0)
}

/// Integer ceiling of `value / 2`.
#[must_use]
pub const fn half_rounded_up(value: u32) -> u32 {
    value.div_ceil(2)
}
