//! pH linear model.
//!
//! A pH probe's output is close to linear in voltage over the working range,
//! so calibration fits `pH = slope × voltage + intercept` by ordinary least
//! squares over the captured buffer points and reports R² as fit quality.

use serde::{Deserialize, Serialize};

use crate::config::CalibrationConfig;
use crate::data::CalibrationPoint;

/// Fitted pH conversion `pH = slope × voltage + intercept`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearModel {
    /// pH units per volt.
    pub slope: f64,
    /// pH at zero volts.
    pub intercept: f64,
}

impl LinearModel {
    /// Create a model from explicit parameters.
    pub fn new(slope: f64, intercept: f64) -> Self {
        Self { slope, intercept }
    }

    /// Convert a probe voltage to pH.
    ///
    /// # Example
    ///
    /// ```
    /// use aquacal::LinearModel;
    ///
    /// let model = LinearModel::new(-20.0, 7.0);
    /// assert!((model.predict(0.1) - 5.0).abs() < 1e-12);
    /// ```
    #[inline]
    pub fn predict(&self, voltage: f64) -> f64 {
        self.slope * voltage + self.intercept
    }

    /// Goodness of fit of this model against `points`, with default cutpoints.
    pub fn quality(&self, points: &[CalibrationPoint]) -> FitQuality {
        FitQuality::new(compute_r_squared(points, self.slope, self.intercept))
    }

    /// Goodness of fit of this model against `points`, with the cutpoints from `config`.
    pub fn quality_with(
        &self,
        points: &[CalibrationPoint],
        config: &CalibrationConfig,
    ) -> FitQuality {
        let r_squared = compute_r_squared(points, self.slope, self.intercept);
        FitQuality::with_config(r_squared, config)
    }
}

/// Fit a linear model to the captured points.
///
/// Returns `None` with fewer than two points, or when every point has the
/// same voltage (the regression is undefined and would otherwise produce
/// infinities).
///
/// ```text
/// slope     = (n·Σ(v·p) − Σv·Σp) / (n·Σ(v²) − (Σv)²)
/// intercept = (Σp − slope·Σv) / n
/// ```
pub fn fit_linear_model(points: &[CalibrationPoint]) -> Option<LinearModel> {
    if points.len() < 2 {
        return None;
    }

    let first_voltage = points[0].measured_voltage;
    if points.iter().all(|p| p.measured_voltage == first_voltage) {
        return None;
    }

    let n = points.len() as f64;
    let (sum_v, sum_p, sum_vp, sum_vv) =
        points
            .iter()
            .fold((0.0, 0.0, 0.0, 0.0), |(sv, sp, svp, svv), point| {
                let v = point.measured_voltage;
                let p = point.reference;
                (sv + v, sp + p, svp + v * p, svv + v * v)
            });

    let denominator = n * sum_vv - sum_v * sum_v;
    if denominator == 0.0 {
        return None;
    }

    let slope = (n * sum_vp - sum_v * sum_p) / denominator;
    let intercept = (sum_p - slope * sum_v) / n;

    if !slope.is_finite() || !intercept.is_finite() {
        return None;
    }

    Some(LinearModel { slope, intercept })
}

/// Coefficient of determination for a line against `points`.
///
/// Returns 0 with fewer than two points. The value is not clamped: a line
/// that fits worse than the mean yields a negative R².
///
/// When every reference is identical the total sum of squares is zero; the
/// result is then 1 for an exact fit and 0 otherwise.
pub fn compute_r_squared(points: &[CalibrationPoint], slope: f64, intercept: f64) -> f64 {
    if points.len() < 2 {
        return 0.0;
    }

    let n = points.len() as f64;
    let mean = points.iter().map(|p| p.reference).sum::<f64>() / n;

    let mut ss_tot = 0.0;
    let mut ss_res = 0.0;
    for point in points {
        let predicted = slope * point.measured_voltage + intercept;
        ss_tot += (point.reference - mean).powi(2);
        ss_res += (point.reference - predicted).powi(2);
    }

    if ss_tot == 0.0 {
        return if ss_res <= f64::EPSILON { 1.0 } else { 0.0 };
    }

    1.0 - ss_res / ss_tot
}

/// Qualitative fit band shown to the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QualityBand {
    /// R² above 0.99.
    Excellent,
    /// R² from 0.95 up to and including 0.99.
    Good,
    /// R² below 0.95; the operator should be warned.
    Poor,
}

impl QualityBand {
    /// Classify an R² value with the default cutpoints.
    pub fn classify(r_squared: f64) -> Self {
        Self::classify_with(r_squared, &CalibrationConfig::default())
    }

    /// Classify an R² value with the cutpoints from `config`.
    pub fn classify_with(r_squared: f64, config: &CalibrationConfig) -> Self {
        if r_squared > config.excellent_r_squared {
            Self::Excellent
        } else if r_squared >= config.good_r_squared {
            Self::Good
        } else {
            Self::Poor
        }
    }

    /// Get a human-readable name for this band.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Excellent => "Excellent",
            Self::Good => "Good",
            Self::Poor => "Poor",
        }
    }
}

/// Fit quality derived from a model and its source points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitQuality {
    /// Coefficient of determination.
    pub r_squared: f64,
    /// Band the R² falls in, fixed when the quality is computed.
    pub band: QualityBand,
}

impl FitQuality {
    /// Wrap an R² value, classified with the default cutpoints.
    pub fn new(r_squared: f64) -> Self {
        Self::with_config(r_squared, &CalibrationConfig::default())
    }

    /// Wrap an R² value, classified with the cutpoints from `config`.
    pub fn with_config(r_squared: f64, config: &CalibrationConfig) -> Self {
        Self {
            r_squared,
            band: QualityBand::classify_with(r_squared, config),
        }
    }

    /// Quality band.
    pub fn band(&self) -> QualityBand {
        self.band
    }

    /// Whether the operator should be warned about this fit.
    pub fn needs_warning(&self) -> bool {
        self.band() == QualityBand::Poor
    }

    /// R² as a percentage, for display.
    pub fn percent(&self) -> f64 {
        self.r_squared * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn points(pairs: &[(f64, f64)]) -> Vec<CalibrationPoint> {
        pairs
            .iter()
            .map(|&(reference, voltage)| CalibrationPoint::new(reference, voltage))
            .collect()
    }

    #[test]
    fn test_fit_requires_two_points() {
        assert!(fit_linear_model(&[]).is_none());
        assert!(fit_linear_model(&points(&[(7.0, 0.0)])).is_none());
    }

    #[test]
    fn test_fit_two_buffer_example() {
        let pts = points(&[(4.01, 0.180), (6.86, 0.050)]);
        let model = fit_linear_model(&pts).unwrap();

        let expected_slope = (4.01 - 6.86) / (0.180 - 0.050);
        assert!((model.slope - expected_slope).abs() < 1e-9);
        assert!((model.slope - (-21.9231)).abs() < 1e-4);
        assert!((model.intercept - (6.86 - expected_slope * 0.050)).abs() < 1e-9);
        assert!((model.intercept - 7.956).abs() < 1e-3);

        let r2 = compute_r_squared(&pts, model.slope, model.intercept);
        assert!((r2 - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_fit_zero_variance_is_unavailable() {
        let pts = points(&[(4.01, 0.1), (6.86, 0.1), (9.18, 0.1)]);
        assert!(fit_linear_model(&pts).is_none());
    }

    #[test]
    fn test_r_squared_needs_two_points() {
        assert_eq!(compute_r_squared(&[], 1.0, 0.0), 0.0);
        assert_eq!(compute_r_squared(&points(&[(7.0, 0.0)]), 1.0, 0.0), 0.0);
    }

    #[test]
    fn test_r_squared_negative_preserved() {
        // A line with the wrong sign fits worse than the mean.
        let pts = points(&[(4.0, 0.2), (7.0, 0.0), (10.0, -0.2)]);
        let r2 = compute_r_squared(&pts, 15.0, 7.0);
        assert!(r2 < 0.0);
    }

    #[test]
    fn test_r_squared_constant_references() {
        let pts = points(&[(7.0, 0.1), (7.0, 0.2)]);
        assert_eq!(compute_r_squared(&pts, 0.0, 7.0), 1.0);
        assert_eq!(compute_r_squared(&pts, 1.0, 7.0), 0.0);
    }

    #[test]
    fn test_three_point_noisy_fit() {
        let pts = points(&[(4.01, 0.178), (6.86, 0.002), (9.18, -0.171)]);
        let model = fit_linear_model(&pts).unwrap();
        let quality = model.quality(&pts);
        assert!(quality.r_squared > 0.99);
        assert!(quality.r_squared <= 1.0);
        assert_eq!(quality.band(), QualityBand::Excellent);
    }

    #[test]
    fn test_quality_band_cutpoints() {
        assert_eq!(QualityBand::classify(1.0), QualityBand::Excellent);
        assert_eq!(QualityBand::classify(0.991), QualityBand::Excellent);
        assert_eq!(QualityBand::classify(0.99), QualityBand::Good);
        assert_eq!(QualityBand::classify(0.95), QualityBand::Good);
        assert_eq!(QualityBand::classify(0.9499), QualityBand::Poor);
        assert_eq!(QualityBand::classify(-0.5), QualityBand::Poor);
    }

    #[test]
    fn test_fit_quality_warning() {
        assert!(FitQuality::new(0.9).needs_warning());
        assert!(!FitQuality::new(0.97).needs_warning());
        assert!((FitQuality::new(0.975).percent() - 97.5).abs() < 1e-9);

        let config = CalibrationConfig {
            excellent_r_squared: 0.999,
            good_r_squared: 0.98,
            ..CalibrationConfig::default()
        };
        assert_eq!(FitQuality::with_config(0.995, &config).band(), QualityBand::Good);
        assert!(FitQuality::with_config(0.97, &config).needs_warning());
    }

    #[test]
    fn test_predict() {
        let model = LinearModel::new(-21.9231, 7.956);
        assert!((model.predict(0.0) - 7.956).abs() < 1e-12);
    }

    proptest! {
        #[test]
        fn prop_fit_recovers_exact_line(
            slope in -30.0f64..-1.0,
            intercept in 0.0f64..14.0,
            millivolts in prop::collection::btree_set(-500i32..500, 2..8),
        ) {
            let pts: Vec<CalibrationPoint> = millivolts
                .iter()
                .map(|&mv| {
                    let v = mv as f64 / 1000.0;
                    CalibrationPoint::new(slope * v + intercept, v)
                })
                .collect();

            let model = fit_linear_model(&pts).unwrap();
            prop_assert!((model.slope - slope).abs() < 1e-6);
            prop_assert!((model.intercept - intercept).abs() < 1e-6);

            let r2 = compute_r_squared(&pts, model.slope, model.intercept);
            prop_assert!(r2.is_finite());
            prop_assert!((r2 - 1.0).abs() < 1e-9);
        }

        #[test]
        fn prop_point_on_fitted_line_does_not_lower_r_squared(
            millivolts in prop::collection::btree_set(-500i32..500, 3..8),
            noise in prop::collection::vec(-0.5f64..0.5, 8),
        ) {
            let mut pts: Vec<CalibrationPoint> = millivolts
                .iter()
                .zip(noise.iter())
                .map(|(&mv, &n)| {
                    let v = mv as f64 / 1000.0;
                    CalibrationPoint::new(-20.0 * v + 7.0 + n, v)
                })
                .collect();

            let model = fit_linear_model(&pts).unwrap();
            let before = compute_r_squared(&pts, model.slope, model.intercept);

            pts.push(CalibrationPoint::new(model.predict(0.75), 0.75));
            let refit = fit_linear_model(&pts).unwrap();
            let after = compute_r_squared(&pts, refit.slope, refit.intercept);

            prop_assert!(after >= before - 1e-9);
        }
    }
}
