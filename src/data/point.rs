//! Captured calibration points.
//!
//! Points are immutable once captured and owned by the session that
//! created them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::reading::SensorReading;

/// A (reference value, measured voltage) pair captured by the operator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationPoint {
    /// Known reference value (e.g. buffer pH).
    pub reference: f64,
    /// Voltage measured with the probe in the reference solution.
    pub measured_voltage: f64,
    /// When the point was captured.
    pub captured_at: DateTime<Utc>,
}

impl CalibrationPoint {
    /// Capture a point now.
    pub fn new(reference: f64, measured_voltage: f64) -> Self {
        Self::at(reference, measured_voltage, Utc::now())
    }

    /// Create a point with an explicit capture time.
    pub fn at(reference: f64, measured_voltage: f64, captured_at: DateTime<Utc>) -> Self {
        Self {
            reference,
            measured_voltage,
            captured_at,
        }
    }

    /// Both the reference and the voltage are finite numbers.
    pub fn is_finite(&self) -> bool {
        self.reference.is_finite() && self.measured_voltage.is_finite()
    }
}

/// A dissolved-oxygen calibration point.
///
/// The probe reports millivolts; the point stores volts, which is the unit
/// the saturation-voltage interpolation works in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DoCalibrationPoint {
    /// Saturation voltage in volts.
    pub voltage: f64,
    /// Water temperature in Celsius at capture time.
    pub temperature: f64,
    /// When the point was captured.
    pub captured_at: DateTime<Utc>,
}

impl DoCalibrationPoint {
    /// Create a point from a voltage in volts and a temperature.
    pub fn new(voltage: f64, temperature: f64) -> Self {
        Self {
            voltage,
            temperature,
            captured_at: Utc::now(),
        }
    }

    /// Capture a point from a live DO reading (millivolts).
    pub fn from_reading(reading: &SensorReading) -> Self {
        Self {
            voltage: reading.voltage / 1000.0,
            temperature: reading.temperature,
            captured_at: reading.received_at,
        }
    }

    /// Voltage in millivolts, the unit used on the wire.
    pub fn voltage_mv(&self) -> f64 {
        self.voltage * 1000.0
    }

    /// Both the voltage and the temperature are finite numbers.
    pub fn is_finite(&self) -> bool {
        self.voltage.is_finite() && self.temperature.is_finite()
    }
}
