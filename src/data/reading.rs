//! Live sensor readings.
//!
//! Readings arrive from the real-time feed at unspecified intervals. Each one
//! is an independent snapshot; models recompute from the latest snapshot only.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single telemetry snapshot for one device.
///
/// `voltage` is in the sensor's native unit: volts for pH and TDS probes,
/// millivolts for the dissolved-oxygen probe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorReading {
    /// Probe output voltage.
    pub voltage: f64,
    /// Water temperature in Celsius.
    pub temperature: f64,
    /// Raw ADC count behind `voltage`.
    pub raw: f64,
    /// Whether the device is currently online.
    pub connected: bool,
    /// When this snapshot was received.
    pub received_at: DateTime<Utc>,
}

impl SensorReading {
    /// Create a reading stamped with the current time.
    pub fn new(voltage: f64, temperature: f64, raw: f64, connected: bool) -> Self {
        Self {
            voltage,
            temperature,
            raw,
            connected,
            received_at: Utc::now(),
        }
    }

    /// A placeholder reading for a device that has not reported yet.
    pub fn offline() -> Self {
        Self::new(0.0, 0.0, 0.0, false)
    }

    /// Whether this reading may be used to capture a calibration point.
    ///
    /// Requires a positive voltage, a positive temperature and an online device.
    pub fn is_capturable(&self) -> bool {
        self.voltage > 0.0 && self.temperature > 0.0 && self.connected
    }

    /// Age of this reading relative to `now`.
    pub fn age(&self, now: DateTime<Utc>) -> chrono::Duration {
        now - self.received_at
    }
}

impl Default for SensorReading {
    fn default() -> Self {
        Self::offline()
    }
}
