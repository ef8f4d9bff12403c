//! TDS (Total Dissolved Solids) model.
//!
//! The probe voltage is first compensated to its 25°C equivalent (2% per
//! degree), then run through an empirical cubic curve to estimate ppm. A
//! reference standard solution yields a scale constant K that corrects the
//! curve for the individual probe.

use serde::{Deserialize, Serialize};

use crate::utils::clamp_finite;

/// Reference temperature for compensation in Celsius.
pub const REFERENCE_TEMPERATURE_C: f64 = 25.0;

/// Fractional change in conductivity per degree Celsius.
pub const TEMPERATURE_COEFFICIENT_PER_C: f64 = 0.02;

/// Upper bound for a calibrated TDS value in ppm.
pub const MAX_TDS_PPM: f64 = 1000.0;

/// Temperature compensation coefficient.
///
/// Exactly 1.0 at 25°C.
///
/// ```
/// use aquacal::compensation_coefficient;
///
/// assert_eq!(compensation_coefficient(25.0), 1.0);
/// assert!((compensation_coefficient(30.0) - 1.1).abs() < 1e-12);
/// ```
#[inline]
pub fn compensation_coefficient(temperature_c: f64) -> f64 {
    1.0 + TEMPERATURE_COEFFICIENT_PER_C * (temperature_c - REFERENCE_TEMPERATURE_C)
}

/// Empirical cubic conversion from compensated voltage to ppm, floored at 0.
#[inline]
fn cubic_estimate(v: f64) -> f64 {
    let ppm = (133.42 * v.powi(3) - 255.86 * v.powi(2) + 857.39 * v) * 0.5;
    // NaN from a zero coefficient maps to 0 as well.
    if ppm > 0.0 {
        ppm
    } else {
        0.0
    }
}

/// Intermediate and final values of a TDS computation.
///
/// Fully derived from `(voltage, temperature, reference standard)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TdsCompensation {
    /// `1 + 0.02 × (T − 25)`.
    pub temperature_coefficient: f64,
    /// Voltage scaled to its 25°C equivalent.
    pub compensated_voltage: f64,
    /// Uncalibrated ppm estimate from the cubic curve (never negative).
    pub raw_estimate: f64,
    /// Scale constant K; 1.0 when no usable standard is given.
    pub scale_constant: f64,
}

impl TdsCompensation {
    /// Calibrated TDS in ppm, `raw × K` clamped to `[0, 1000]`.
    pub fn calibrated_value(&self) -> f64 {
        clamp_finite(self.raw_estimate * self.scale_constant, 0.0, MAX_TDS_PPM)
    }

    /// Calibrated TDS with a caller-supplied upper bound.
    pub fn calibrated_value_with_max(&self, max_ppm: f64) -> f64 {
        clamp_finite(self.raw_estimate * self.scale_constant, 0.0, max_ppm)
    }
}

/// Run the TDS model for one reading.
///
/// When `reference_standard_ppm` is given and the raw estimate is positive,
/// the scale constant is `standard / raw`; otherwise it is 1.0.
pub fn compute_tds(
    voltage: f64,
    temperature_c: f64,
    reference_standard_ppm: Option<f64>,
) -> TdsCompensation {
    let temperature_coefficient = compensation_coefficient(temperature_c);
    let compensated_voltage = voltage / temperature_coefficient;
    let raw_estimate = cubic_estimate(compensated_voltage);

    let scale_constant = match reference_standard_ppm {
        Some(standard) if raw_estimate > 0.0 => standard / raw_estimate,
        _ => 1.0,
    };

    TdsCompensation {
        temperature_coefficient,
        compensated_voltage,
        raw_estimate,
        scale_constant,
    }
}

/// Apply a previously determined scale constant to a live reading.
pub fn apply_scale(voltage: f64, temperature_c: f64, scale_constant: f64) -> f64 {
    let mut compensation = compute_tds(voltage, temperature_c, None);
    compensation.scale_constant = scale_constant;
    compensation.calibrated_value()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_identity_at_reference_temperature() {
        assert_eq!(compensation_coefficient(25.0), 1.0);
        let result = compute_tds(1.234, 25.0, None);
        assert_eq!(result.temperature_coefficient, 1.0);
        assert_eq!(result.compensated_voltage, 1.234);
    }

    #[test]
    fn test_cubic_curve_at_one_volt() {
        // (133.42 - 255.86 + 857.39) * 0.5 = 367.475
        let result = compute_tds(1.0, 25.0, None);
        assert!((result.raw_estimate - 367.475).abs() < 1e-9);
        assert_eq!(result.scale_constant, 1.0);
        assert!((result.calibrated_value() - 367.475).abs() < 1e-9);
    }

    #[test]
    fn test_scale_constant_from_standard() {
        let result = compute_tds(1.0, 25.0, Some(342.0));
        assert!((result.scale_constant - 342.0 / 367.475).abs() < 1e-12);
        assert!((result.calibrated_value() - 342.0).abs() < 1e-9);
    }

    #[test]
    fn test_temperature_compensation() {
        // At 30°C the coefficient is 1.1, so 1.1 V compensates back to 1.0 V.
        let result = compute_tds(1.1, 30.0, None);
        assert!((result.temperature_coefficient - 1.1).abs() < 1e-12);
        assert!((result.compensated_voltage - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_negative_voltage_floors_estimate() {
        let result = compute_tds(-0.5, 25.0, Some(500.0));
        assert_eq!(result.raw_estimate, 0.0);
        assert_eq!(result.scale_constant, 1.0);
        assert_eq!(result.calibrated_value(), 0.0);
    }

    #[test]
    fn test_zero_voltage_keeps_unit_scale() {
        let result = compute_tds(0.0, 20.0, Some(1000.0));
        assert_eq!(result.raw_estimate, 0.0);
        assert_eq!(result.scale_constant, 1.0);
    }

    #[test]
    fn test_calibrated_value_clamped() {
        let result = compute_tds(2.3, 25.0, None);
        assert!(result.raw_estimate > MAX_TDS_PPM);
        assert_eq!(result.calibrated_value(), MAX_TDS_PPM);
        assert!(result.calibrated_value_with_max(5000.0) > MAX_TDS_PPM);
    }

    #[test]
    fn test_zero_coefficient_is_not_nan() {
        // 1 + 0.02 × (−25 − 25) = 0
        let result = compute_tds(0.0, -25.0, Some(342.0));
        assert_eq!(result.raw_estimate, 0.0);
        assert_eq!(result.calibrated_value(), 0.0);
    }

    #[test]
    fn test_apply_scale() {
        let k = compute_tds(1.0, 25.0, Some(500.0)).scale_constant;
        assert!((apply_scale(1.0, 25.0, k) - 500.0).abs() < 1e-9);
    }

    proptest! {
        #[test]
        fn prop_calibrated_value_in_range(
            voltage in -5.0f64..5.0,
            temperature in 0.0f64..50.0,
            standard in 1.0f64..2000.0,
        ) {
            let value = compute_tds(voltage, temperature, Some(standard)).calibrated_value();
            prop_assert!((0.0..=MAX_TDS_PPM).contains(&value));
        }
    }
}
