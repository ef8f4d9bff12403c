//! pH calibration session.
//!
//! Collects (buffer pH, probe voltage) points, keeps them sorted by
//! reference value, and fits the linear model on demand.

use tracing::{debug, info, warn};
use uuid::Uuid;

use super::Calibration;
use crate::config::CalibrationConfig;
use crate::data::{CalibrationPoint, SensorReading, SensorType};
use crate::error::{Error, Result};
use crate::model::{fit_linear_model, FitQuality, LinearModel};
use crate::protocol::CalibrationPayload;

/// Minimum number of points for a pH fit.
pub const MIN_PH_POINTS: usize = 2;

/// Where the reference pH of a new point comes from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ReferenceSource {
    /// One of the configured standard buffers, by index.
    Buffer(usize),
    /// A value typed by the operator.
    Custom(f64),
}

/// Insert `point` into `points`, keeping ascending reference order.
///
/// Returns `None` when a point whose reference is within `tolerance` of the
/// new one already exists; the input is left untouched in that case.
pub fn add_point(
    points: &[CalibrationPoint],
    point: CalibrationPoint,
    tolerance: f64,
) -> Option<Vec<CalibrationPoint>> {
    if points
        .iter()
        .any(|existing| (existing.reference - point.reference).abs() < tolerance)
    {
        return None;
    }

    let mut updated = points.to_vec();
    updated.push(point);
    updated.sort_by(|a, b| a.reference.total_cmp(&b.reference));
    Some(updated)
}

/// Remove the point at `index`. Out-of-range indices leave the set unchanged.
pub fn remove_point(points: &[CalibrationPoint], index: usize) -> Vec<CalibrationPoint> {
    points
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != index)
        .map(|(_, p)| p.clone())
        .collect()
}

/// Operator workflow for a multi-point pH calibration.
#[derive(Debug, Clone)]
pub struct PhCalibrationSession {
    id: Uuid,
    points: Vec<CalibrationPoint>,
    config: CalibrationConfig,
}

impl PhCalibrationSession {
    /// Create an empty session with the default configuration.
    pub fn new() -> Self {
        Self::with_config(CalibrationConfig::default())
    }

    /// Create an empty session with a custom configuration.
    pub fn with_config(config: CalibrationConfig) -> Self {
        Self {
            id: Uuid::new_v4(),
            points: Vec::new(),
            config,
        }
    }

    /// Unique session identifier.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Captured points in ascending reference order.
    pub fn points(&self) -> &[CalibrationPoint] {
        &self.points
    }

    /// Number of captured points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether no point has been captured yet.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Resolve a reference source to a pH value.
    pub fn resolve_reference(&self, source: ReferenceSource) -> Result<f64> {
        match source {
            ReferenceSource::Buffer(index) => {
                self.config
                    .ph_buffer(index)
                    .ok_or_else(|| Error::InvalidParameter {
                        name: "buffer".to_string(),
                        value: index.to_string(),
                    })
            }
            ReferenceSource::Custom(value) if value.is_finite() => Ok(value),
            ReferenceSource::Custom(value) => Err(Error::InvalidParameter {
                name: "reference".to_string(),
                value: value.to_string(),
            }),
        }
    }

    /// Capture a point for `source` at the given probe voltage.
    ///
    /// Returns the index of the new point in the sorted set.
    ///
    /// # Errors
    ///
    /// - [`Error::DuplicatePoint`] if a point within the duplicate tolerance
    ///   exists; the point set is unchanged.
    /// - [`Error::InvalidParameter`] for an unknown buffer or a non-finite value.
    pub fn add_point(&mut self, source: ReferenceSource, voltage: f64) -> Result<usize> {
        let reference = self.resolve_reference(source)?;
        if !voltage.is_finite() {
            return Err(Error::InvalidParameter {
                name: "voltage".to_string(),
                value: voltage.to_string(),
            });
        }

        let point = CalibrationPoint::new(reference, voltage);
        let Some(updated) = add_point(&self.points, point, self.config.duplicate_tolerance)
        else {
            warn!(session = %self.id, reference, "Rejected duplicate pH calibration point");
            return Err(Error::DuplicatePoint { reference });
        };

        self.points = updated;
        let index = self
            .points
            .iter()
            .position(|p| p.reference == reference)
            .unwrap_or(self.points.len() - 1);

        debug!(
            session = %self.id,
            reference,
            voltage,
            count = self.points.len(),
            "Captured pH calibration point"
        );
        Ok(index)
    }

    /// Capture a point from a live reading.
    pub fn capture(&mut self, source: ReferenceSource, reading: &SensorReading) -> Result<usize> {
        if !reading.connected {
            return Err(Error::NotReady {
                reason: "device offline".to_string(),
            });
        }
        self.add_point(source, reading.voltage)
    }

    /// Remove the point at `index`.
    pub fn remove_point(&mut self, index: usize) -> Option<CalibrationPoint> {
        if index >= self.points.len() {
            return None;
        }
        let removed = self.points.get(index).cloned();
        self.points = remove_point(&self.points, index);
        debug!(session = %self.id, index, count = self.points.len(), "Removed pH calibration point");
        removed
    }

    /// Discard all captured points.
    pub fn clear(&mut self) {
        self.points.clear();
    }

    /// The fitted model, if one is available.
    pub fn model(&self) -> Option<LinearModel> {
        fit_linear_model(&self.points)
    }

    /// Fit the model, explaining why it is unavailable.
    pub fn fit(&self) -> Result<LinearModel> {
        if self.points.len() < MIN_PH_POINTS {
            return Err(Error::InsufficientPoints {
                required: MIN_PH_POINTS,
                actual: self.points.len(),
            });
        }
        fit_linear_model(&self.points).ok_or(Error::DegenerateFit)
    }

    /// Fit quality of the current model.
    pub fn quality(&self) -> Option<FitQuality> {
        self.model()
            .map(|model| model.quality_with(&self.points, &self.config))
    }

    /// Calibrated pH for a live voltage with the current model.
    pub fn predict(&self, voltage: f64) -> Option<f64> {
        self.model().map(|model| model.predict(voltage))
    }

    /// Configuration in use.
    pub fn config(&self) -> &CalibrationConfig {
        &self.config
    }
}

impl Default for PhCalibrationSession {
    fn default() -> Self {
        Self::new()
    }
}

impl Calibration for PhCalibrationSession {
    fn sensor_type(&self) -> SensorType {
        SensorType::Ph
    }

    fn can_submit(&self, _reading: &SensorReading) -> bool {
        self.model().is_some()
    }

    fn payload(&self, _reading: &SensorReading) -> Result<CalibrationPayload> {
        let model = self.fit()?;
        if let Some(quality) = self.quality() {
            info!(
                session = %self.id,
                slope = model.slope,
                intercept = model.intercept,
                r_squared = quality.r_squared,
                band = quality.band().name(),
                "Prepared pH calibration"
            );
        }
        Ok(CalibrationPayload::ph(&model))
    }
}
