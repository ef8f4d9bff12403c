//! Operator calibration workflows.
//!
//! Each session is created when an operator opens a calibration workflow for
//! one device and sensor, is mutated only by its own capture/reset
//! operations, and is dropped when the workflow closes or submits.

pub mod dissolved_oxygen;
pub mod ph;
pub mod tds;

pub use dissolved_oxygen::{DoCalibrationSession, DoCalibrationState, DoEvent};
pub use ph::{PhCalibrationSession, ReferenceSource};
pub use tds::{StandardSource, TdsCalibrationSession};

use crate::data::{SensorReading, SensorType};
use crate::error::Result;
use crate::protocol::CalibrationPayload;

/// A calibration session that can be serialized for submission.
pub trait Calibration {
    /// Sensor this session calibrates.
    fn sensor_type(&self) -> SensorType;

    /// Whether the session holds enough data to submit, given the latest
    /// reading for the device.
    fn can_submit(&self, reading: &SensorReading) -> bool;

    /// Build the wire payload.
    ///
    /// # Errors
    ///
    /// Returns an error describing the missing data when [`can_submit`]
    /// would return `false`.
    ///
    /// [`can_submit`]: Calibration::can_submit
    fn payload(&self, reading: &SensorReading) -> Result<CalibrationPayload>;
}
