//! Dissolved-oxygen model.
//!
//! Galvanic DO probes output a voltage proportional to oxygen partial
//! pressure. Calibration records the saturation voltage in air-saturated
//! water; the reading is then scaled against the temperature-dependent
//! saturation concentration from [`SATURATION_TABLE`].

use serde::{Deserialize, Serialize};

use crate::data::DoCalibrationPoint;
use crate::utils::clamp_finite;

/// Oxygen saturation in fresh water at sea level, mg/L, indexed by whole
/// degrees Celsius from 0 to 40.
pub const SATURATION_TABLE: [f64; 41] = [
    14.46, 14.22, 13.82, 13.44, 13.09, 12.74, 12.42, 12.11, 11.81, 11.53, // 0-9
    11.26, 11.01, 10.77, 10.53, 10.30, 10.08, 9.86, 9.66, 9.46, 9.27, // 10-19
    9.08, 8.90, 8.73, 8.57, 8.41, 8.25, 8.11, 7.96, 7.82, 7.69, // 20-29
    7.56, 7.43, 7.30, 7.18, 7.07, 6.95, 6.84, 6.73, 6.63, 6.53, // 30-39
    6.41, // 40
];

/// Upper bound for a dissolved-oxygen value in mg/L.
pub const MAX_DO_MG_PER_L: f64 = 20.0;

/// Uncalibrated sensitivity, mg/L per volt.
const UNCALIBRATED_MG_PER_L_PER_V: f64 = 6.5;

const POLY_A: f64 = 14.652;
const POLY_B: f64 = -0.41022;
const POLY_C: f64 = 0.007991;
const POLY_D: f64 = -0.000077774;

/// DO calibration mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DoMode {
    /// One air-saturated reference point.
    #[default]
    Single,
    /// Two reference points at different temperatures.
    Double,
}

impl DoMode {
    /// Number of points this mode needs before submission.
    pub fn required_points(&self) -> usize {
        match self {
            Self::Single => 1,
            Self::Double => 2,
        }
    }

    /// Get a human-readable name for this mode.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Single => "Single-point",
            Self::Double => "Two-point",
        }
    }
}

/// Saturation concentration for a temperature, from the table.
///
/// The temperature is floored to whole degrees and clamped to 0–40°C.
///
/// ```
/// use aquacal::saturation_from_table;
///
/// assert_eq!(saturation_from_table(25.9), saturation_from_table(25.0));
/// assert_eq!(saturation_from_table(-5.0), saturation_from_table(0.0));
/// ```
pub fn saturation_from_table(temperature_c: f64) -> f64 {
    // `as` saturates and maps NaN to 0.
    let index = temperature_c.floor().clamp(0.0, 40.0) as usize;
    SATURATION_TABLE[index]
}

/// Continuous cubic approximation of the saturation curve.
///
/// Used for display and as the `ref` value on the wire; the table stays
/// authoritative for [`calibrated_do`].
pub fn saturation_polynomial(temperature_c: f64) -> f64 {
    let t = temperature_c;
    POLY_A + POLY_B * t + POLY_C * t * t + POLY_D * t * t * t
}

/// DO estimate before any calibration, in mg/L.
#[inline]
pub fn uncalibrated_do(voltage_mv: f64) -> f64 {
    (voltage_mv * UNCALIBRATED_MG_PER_L_PER_V) / 1000.0
}

/// Linear interpolation of the saturation voltage between two points.
///
/// Returns `None` when the points share a temperature.
pub fn interpolate_saturation_voltage(
    point1: &DoCalibrationPoint,
    point2: &DoCalibrationPoint,
    temperature_c: f64,
) -> Option<f64> {
    if point1.temperature == point2.temperature {
        return None;
    }
    Some(
        point1.voltage
            + ((temperature_c - point1.temperature) * (point2.voltage - point1.voltage))
                / (point2.temperature - point1.temperature),
    )
}

/// Saturation voltage (volts) to scale the reading against.
///
/// - `Double` with both points at distinct temperatures: interpolated.
/// - `Single` with a first point: that point's voltage.
/// - Otherwise the live reading is its own reference (`voltage_mv / 1000`),
///   which degrades the result to an uncalibrated estimate.
pub fn saturation_voltage(
    voltage_mv: f64,
    temperature_c: f64,
    mode: DoMode,
    point1: Option<&DoCalibrationPoint>,
    point2: Option<&DoCalibrationPoint>,
) -> f64 {
    let calibrated = match (mode, point1, point2) {
        (DoMode::Double, Some(p1), Some(p2)) => {
            interpolate_saturation_voltage(p1, p2, temperature_c)
        }
        (DoMode::Single, Some(p1), _) => Some(p1.voltage),
        _ => None,
    };
    calibrated.unwrap_or(voltage_mv / 1000.0)
}

/// Calibrated dissolved oxygen in mg/L, clamped to `[0, 20]`.
pub fn calibrated_do(
    voltage_mv: f64,
    temperature_c: f64,
    mode: DoMode,
    point1: Option<&DoCalibrationPoint>,
    point2: Option<&DoCalibrationPoint>,
) -> f64 {
    calibrated_do_with_max(
        voltage_mv,
        temperature_c,
        mode,
        point1,
        point2,
        MAX_DO_MG_PER_L,
    )
}

/// Calibrated dissolved oxygen with a caller-supplied upper bound.
pub fn calibrated_do_with_max(
    voltage_mv: f64,
    temperature_c: f64,
    mode: DoMode,
    point1: Option<&DoCalibrationPoint>,
    point2: Option<&DoCalibrationPoint>,
    max_mg_per_l: f64,
) -> f64 {
    let saturation = saturation_from_table(temperature_c);
    let v_sat = saturation_voltage(voltage_mv, temperature_c, mode, point1, point2);

    if v_sat.is_nan() || v_sat <= 0.0 {
        return 0.0;
    }

    clamp_finite(
        (voltage_mv * saturation) / (v_sat * 1000.0),
        0.0,
        max_mg_per_l,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn point(voltage: f64, temperature: f64) -> DoCalibrationPoint {
        DoCalibrationPoint::new(voltage, temperature)
    }

    #[test]
    fn test_table_clamping() {
        assert_eq!(saturation_from_table(-5.0), saturation_from_table(0.0));
        assert_eq!(saturation_from_table(99.0), saturation_from_table(40.0));
        assert_eq!(saturation_from_table(-0.5), SATURATION_TABLE[0]);
        assert_eq!(saturation_from_table(40.9), SATURATION_TABLE[40]);
        assert_eq!(saturation_from_table(f64::NAN), SATURATION_TABLE[0]);
    }

    #[test]
    fn test_table_floor() {
        assert_eq!(saturation_from_table(20.0), 9.08);
        assert_eq!(saturation_from_table(20.99), 9.08);
        assert_eq!(saturation_from_table(21.0), 8.90);
    }

    #[test]
    fn test_table_is_decreasing() {
        for pair in SATURATION_TABLE.windows(2) {
            assert!(pair[1] < pair[0]);
        }
    }

    #[test]
    fn test_polynomial_tracks_table() {
        for t in [0.0, 10.0, 20.0, 25.0, 30.0] {
            let table = saturation_from_table(t);
            let poly = saturation_polynomial(t);
            assert!((table - poly).abs() < 0.3, "t={t}: {table} vs {poly}");
        }
        assert_eq!(saturation_polynomial(0.0), 14.652);
    }

    #[test]
    fn test_uncalibrated() {
        assert!((uncalibrated_do(1000.0) - 6.5).abs() < 1e-12);
        assert_eq!(uncalibrated_do(0.0), 0.0);
    }

    #[test]
    fn test_two_point_interpolation_exact() {
        let p1 = point(7.0, 20.0);
        let p2 = point(8.0, 30.0);
        assert_eq!(interpolate_saturation_voltage(&p1, &p2, 25.0), Some(7.5));
        assert_eq!(
            saturation_voltage(1000.0, 25.0, DoMode::Double, Some(&p1), Some(&p2)),
            7.5
        );
    }

    #[test]
    fn test_interpolation_same_temperature_falls_back() {
        let p1 = point(1.2, 25.0);
        let p2 = point(1.3, 25.0);
        assert_eq!(interpolate_saturation_voltage(&p1, &p2, 25.0), None);
        assert_eq!(
            saturation_voltage(900.0, 25.0, DoMode::Double, Some(&p1), Some(&p2)),
            0.9
        );
    }

    #[test]
    fn test_single_point_uses_first_point() {
        let p1 = point(1.5, 25.0);
        assert_eq!(
            saturation_voltage(900.0, 25.0, DoMode::Single, Some(&p1), None),
            1.5
        );
        // 1500 mV at saturation voltage 1.5 V reads exactly the table value.
        let value = calibrated_do(1500.0, 25.0, DoMode::Single, Some(&p1), None);
        assert!((value - 8.25).abs() < 1e-12);
    }

    #[test]
    fn test_double_mode_with_one_point_falls_back() {
        let p1 = point(1.5, 25.0);
        assert_eq!(
            saturation_voltage(900.0, 25.0, DoMode::Double, Some(&p1), None),
            0.9
        );
    }

    #[test]
    fn test_uncalibrated_fallback_reads_saturation() {
        // With no points the reading is its own reference.
        let value = calibrated_do(1200.0, 20.0, DoMode::Single, None, None);
        assert!((value - 9.08).abs() < 1e-12);
    }

    #[test]
    fn test_non_positive_saturation_voltage() {
        assert_eq!(calibrated_do(0.0, 20.0, DoMode::Single, None, None), 0.0);
        assert_eq!(calibrated_do(-50.0, 20.0, DoMode::Single, None, None), 0.0);
        let p1 = point(-0.1, 20.0);
        assert_eq!(
            calibrated_do(500.0, 20.0, DoMode::Single, Some(&p1), None),
            0.0
        );
    }

    #[test]
    fn test_clamped_to_upper_bound() {
        let p1 = point(0.1, 20.0);
        assert_eq!(
            calibrated_do(5000.0, 20.0, DoMode::Single, Some(&p1), None),
            MAX_DO_MG_PER_L
        );
    }

    #[test]
    fn test_custom_upper_bound() {
        let p1 = point(0.1, 20.0);
        assert_eq!(
            calibrated_do_with_max(5000.0, 20.0, DoMode::Single, Some(&p1), None, 12.5),
            12.5
        );
        let unclamped = calibrated_do(100.0, 20.0, DoMode::Single, Some(&p1), None);
        assert_eq!(
            calibrated_do_with_max(100.0, 20.0, DoMode::Single, Some(&p1), None, 12.5),
            unclamped
        );
    }

    #[test]
    fn test_mode_required_points() {
        assert_eq!(DoMode::Single.required_points(), 1);
        assert_eq!(DoMode::Double.required_points(), 2);
        assert_eq!(DoMode::default(), DoMode::Single);
    }

    proptest! {
        #[test]
        fn prop_calibrated_do_in_range(
            voltage_mv in -5000.0f64..5000.0,
            temperature in -10.0f64..60.0,
            v1 in -2.0f64..3.0,
            v2 in -2.0f64..3.0,
            t1 in 0.0f64..40.0,
            t2 in 0.0f64..40.0,
        ) {
            let p1 = point(v1, t1);
            let p2 = point(v2, t2);
            for mode in [DoMode::Single, DoMode::Double] {
                let value = calibrated_do(voltage_mv, temperature, mode, Some(&p1), Some(&p2));
                prop_assert!((0.0..=MAX_DO_MG_PER_L).contains(&value));
            }
            let value = calibrated_do(voltage_mv, temperature, DoMode::Double, None, None);
            prop_assert!((0.0..=MAX_DO_MG_PER_L).contains(&value));
        }
    }
}
