//! Numeric conversion and display helpers centralizing casts and rounding.

use num_traits::cast::cast;

/// Convert a count to f64 while allowing precision loss in a single location.
#[must_use]
pub fn count_to_f64(value: usize) -> f64 {
    cast::<usize, f64>(value).unwrap_or(0.0)
}

/// Round half away from zero to `decimals` places.
#[must_use]
pub fn round_to(value: f64, decimals: u8) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }
    let factor = 10_f64.powi(i32::from(decimals));
    (value * factor).round() / factor
}

/// Fixed-point display string, e.g. `fixed(2.5, 2) == "2.50"`.
///
/// Non-finite values render as zero so report tables never show `NaN`.
#[must_use]
pub fn fixed(value: f64, decimals: u8) -> String {
    let rounded = round_to(value, decimals);
    // Avoid "-0.00" after rounding tiny negatives.
    let rounded = if rounded == 0.0 { 0.0 } else { rounded };
    format!("{rounded:.prec$}", prec = usize::from(decimals))
}

/// `part / whole * 100` to one decimal place, `"0.0"` when `whole` is zero.
#[must_use]
pub fn percentage(part: usize, whole: usize) -> String {
    if whole == 0 {
        return fixed(0.0, 1);
    }
    fixed(count_to_f64(part) / count_to_f64(whole) * 100.0, 1)
}
