//! Dissolved-oxygen calibration session.
//!
//! Single-point mode captures one air-saturated reference. Two-point mode
//! walks a small state machine:
//!
//! ```text
//!   AwaitingPoint1 --capture--> AwaitingPoint2 --capture--> BothCaptured
//!         ^                                                     |
//!         +---------------------- reset ------------------------+
//! ```
//!
//! Transitions are a pure function of `(session, event)`; see
//! [`DoCalibrationSession::apply`].

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::Calibration;
use crate::config::CalibrationConfig;
use crate::data::{DoCalibrationPoint, SensorReading, SensorType};
use crate::error::{Error, Result};
use crate::model::{calibrated_do_with_max, saturation_polynomial, uncalibrated_do, DoMode};
use crate::protocol::CalibrationPayload;

/// Where a DO session is in its capture sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DoCalibrationState {
    /// No point captured yet.
    AwaitingPoint1,
    /// Two-point mode with the first point captured.
    AwaitingPoint2,
    /// Two-point mode with both points captured.
    BothCaptured,
    /// Single-point mode with its point captured.
    SinglePointCaptured,
}

impl DoCalibrationState {
    /// Whether the session can be submitted from this state.
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::BothCaptured | Self::SinglePointCaptured)
    }
}

/// Input to the DO state machine.
#[derive(Debug, Clone, PartialEq)]
pub enum DoEvent {
    /// Capture a point from the given reading (millivolts).
    Capture(SensorReading),
    /// Discard all points and return to the first step.
    Reset,
    /// Switch calibration mode.
    SetMode(DoMode),
}

/// DO calibration session state.
///
/// Invariants:
/// - in single mode `point2` is always `None` and `step` stays at 1;
/// - `step` is 2 only while `point1` is captured;
/// - changing mode clears both points;
/// - the configuration survives resets and mode changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DoCalibrationSession {
    mode: DoMode,
    step: u8,
    point1: Option<DoCalibrationPoint>,
    point2: Option<DoCalibrationPoint>,
    #[serde(skip)]
    config: CalibrationConfig,
}

impl DoCalibrationSession {
    /// Create a session in the given mode with no points.
    pub fn new(mode: DoMode) -> Self {
        Self::with_config(mode, CalibrationConfig::default())
    }

    /// Create a session with a custom configuration.
    pub fn with_config(mode: DoMode, config: CalibrationConfig) -> Self {
        Self {
            mode,
            step: 1,
            point1: None,
            point2: None,
            config,
        }
    }

    /// Configuration in use.
    pub fn config(&self) -> &CalibrationConfig {
        &self.config
    }

    fn cleared(self, mode: DoMode) -> Self {
        Self {
            mode,
            step: 1,
            point1: None,
            point2: None,
            ..self
        }
    }

    /// Current mode.
    pub fn mode(&self) -> DoMode {
        self.mode
    }

    /// Current capture step (1 or 2).
    pub fn step(&self) -> u8 {
        self.step
    }

    /// First captured point.
    pub fn point1(&self) -> Option<&DoCalibrationPoint> {
        self.point1.as_ref()
    }

    /// Second captured point.
    pub fn point2(&self) -> Option<&DoCalibrationPoint> {
        self.point2.as_ref()
    }

    /// Derived state.
    pub fn state(&self) -> DoCalibrationState {
        match (self.mode, &self.point1, &self.point2) {
            (_, None, _) => DoCalibrationState::AwaitingPoint1,
            (DoMode::Single, Some(_), _) => DoCalibrationState::SinglePointCaptured,
            (DoMode::Double, Some(_), None) => DoCalibrationState::AwaitingPoint2,
            (DoMode::Double, Some(_), Some(_)) => DoCalibrationState::BothCaptured,
        }
    }

    /// Whether a point may be captured from this reading.
    pub fn can_calibrate(reading: &SensorReading) -> bool {
        reading.is_capturable()
    }

    /// Apply an event and return the next session state.
    ///
    /// Illegal transitions (capturing from an unusable reading, or once all
    /// points for the mode are captured) return the session unchanged.
    #[must_use]
    pub fn apply(self, event: DoEvent) -> Self {
        match event {
            DoEvent::Reset => {
                let mode = self.mode;
                self.cleared(mode)
            }
            DoEvent::SetMode(mode) if mode == self.mode => self,
            DoEvent::SetMode(mode) => {
                debug!(from = self.mode.name(), to = mode.name(), "DO calibration mode changed");
                self.cleared(mode)
            }
            DoEvent::Capture(reading) => {
                if !Self::can_calibrate(&reading) {
                    debug!("Ignoring DO capture: reading not usable");
                    return self;
                }
                let point = DoCalibrationPoint::from_reading(&reading);
                match self.state() {
                    DoCalibrationState::AwaitingPoint1 => {
                        debug!(
                            voltage = point.voltage,
                            temperature = point.temperature,
                            "Captured DO point 1"
                        );
                        let step = match self.mode {
                            DoMode::Single => 1,
                            DoMode::Double => 2,
                        };
                        Self {
                            step,
                            point1: Some(point),
                            ..self
                        }
                    }
                    DoCalibrationState::AwaitingPoint2 => {
                        debug!(
                            voltage = point.voltage,
                            temperature = point.temperature,
                            "Captured DO point 2"
                        );
                        Self {
                            point2: Some(point),
                            ..self
                        }
                    }
                    DoCalibrationState::BothCaptured
                    | DoCalibrationState::SinglePointCaptured => self,
                }
            }
        }
    }

    /// Capture a point from a live reading.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotReady`] if the reading is unusable or the session
    /// already holds all points for its mode; the session is unchanged.
    pub fn capture_point(&mut self, reading: &SensorReading) -> Result<DoCalibrationState> {
        if !Self::can_calibrate(reading) {
            return Err(Error::NotReady {
                reason: "reading unavailable or device offline".to_string(),
            });
        }
        if self.state().is_ready() {
            return Err(Error::NotReady {
                reason: "all points captured; reset first".to_string(),
            });
        }
        self.dispatch(DoEvent::Capture(reading.clone()));
        Ok(self.state())
    }

    /// Discard all points.
    pub fn reset(&mut self) {
        self.dispatch(DoEvent::Reset);
    }

    /// Switch mode. Any actual change clears captured points.
    pub fn set_mode(&mut self, mode: DoMode) {
        self.dispatch(DoEvent::SetMode(mode));
    }

    fn dispatch(&mut self, event: DoEvent) {
        let current = std::mem::take(self);
        *self = current.apply(event);
    }

    /// Calibrated DO in mg/L for a live reading, clamped to the configured maximum.
    pub fn calibrated_value(&self, reading: &SensorReading) -> f64 {
        calibrated_do_with_max(
            reading.voltage,
            reading.temperature,
            self.mode,
            self.point1.as_ref(),
            self.point2.as_ref(),
            self.config.do_max_mg_per_l,
        )
    }

    /// Uncalibrated DO estimate in mg/L for a live reading.
    pub fn uncalibrated_value(&self, reading: &SensorReading) -> f64 {
        uncalibrated_do(reading.voltage)
    }
}

impl Default for DoCalibrationSession {
    fn default() -> Self {
        Self::new(DoMode::default())
    }
}

impl Calibration for DoCalibrationSession {
    fn sensor_type(&self) -> SensorType {
        SensorType::Do
    }

    fn can_submit(&self, _reading: &SensorReading) -> bool {
        self.state().is_ready()
    }

    fn payload(&self, _reading: &SensorReading) -> Result<CalibrationPayload> {
        match (self.mode, &self.point1, &self.point2) {
            (DoMode::Single, Some(p1), _) => Ok(CalibrationPayload::do_single(
                saturation_polynomial(p1.temperature),
                p1,
            )),
            (DoMode::Double, Some(p1), Some(p2)) => Ok(CalibrationPayload::do_double(
                saturation_polynomial(p1.temperature),
                p1,
                p2,
            )),
            _ => Err(Error::NotReady {
                reason: format!(
                    "{} calibration needs {} captured point(s)",
                    self.mode.name(),
                    self.mode.required_points()
                ),
            }),
        }
    }
}
