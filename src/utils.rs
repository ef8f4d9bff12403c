//! Utility functions for the aquacal crate.

/// Round a value to a fixed number of decimal places.
///
/// Used when encoding wire payloads, which carry a fixed precision per field.
///
/// # Arguments
///
/// * `value` - The value to round
/// * `decimals` - Number of digits to keep after the decimal point
///
/// # Example
///
/// ```
/// use aquacal::round_to;
///
/// assert_eq!(round_to(-21.923076, 5), -21.92308);
/// assert_eq!(round_to(25.004, 2), 25.0);
/// ```
#[inline]
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}

/// Clamp a value into `[min, max]`, mapping NaN to `min`.
///
/// `f64::clamp` propagates NaN; model outputs must never surface one.
#[inline]
pub fn clamp_finite(value: f64, min: f64, max: f64) -> f64 {
    if value.is_nan() {
        min
    } else {
        value.clamp(min, max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(1.23456789, 5), 1.23457);
        assert_eq!(round_to(1.23456789, 4), 1.2346);
        assert_eq!(round_to(1.23456789, 2), 1.23);
        assert_eq!(round_to(-0.004, 2), -0.0);
        assert_eq!(round_to(500.0, 2), 500.0);
    }

    #[test]
    fn test_clamp_finite() {
        assert_eq!(clamp_finite(25.0, 0.0, 20.0), 20.0);
        assert_eq!(clamp_finite(-1.0, 0.0, 20.0), 0.0);
        assert_eq!(clamp_finite(f64::NAN, 0.0, 20.0), 0.0);
        assert_eq!(clamp_finite(f64::INFINITY, 0.0, 1000.0), 1000.0);
        assert_eq!(clamp_finite(7.5, 0.0, 20.0), 7.5);
    }
}
