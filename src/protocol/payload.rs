//! Calibration submission payloads.
//!
//! Defines the JSON body the backend expects for a completed calibration:
//!
//! ```text
//! { "sensor_type": "ph" | "tds" | "do", "calibration_data": { ... } }
//! ```
//!
//! | Sensor      | `calibration_data` fields                          |
//! |-------------|----------------------------------------------------|
//! | ph          | `m` (5dp), `c` (5dp)                               |
//! | tds         | `v` (4dp), `std` (2dp), `t` (2dp)                  |
//! | do (single) | `ref`, `v` (2dp), `t` (2dp), `calibrated: true`    |
//! | do (double) | `ref`, `v1`, `t1`, `v2`, `t2` (2dp), `calibrated: true` |
//!
//! Rounding is applied by the constructors, so a payload value always holds
//! exactly what goes on the wire.

use bytes::Bytes;
use serde::Serialize;

use crate::data::{DoCalibrationPoint, SensorType};
use crate::error::Result;
use crate::model::LinearModel;
use crate::utils::round_to;

/// Decimal places for pH slope and intercept.
pub const PH_DECIMALS: u32 = 5;
/// Decimal places for the TDS voltage.
pub const TDS_VOLTAGE_DECIMALS: u32 = 4;
/// Decimal places for temperatures, standards and DO voltages.
pub const DEFAULT_DECIMALS: u32 = 2;

/// Sensor-specific calibration parameters.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CalibrationData {
    /// pH linear model.
    Ph {
        /// Slope.
        m: f64,
        /// Intercept.
        c: f64,
    },
    /// TDS reference measurement.
    Tds {
        /// Probe voltage in volts.
        v: f64,
        /// Reference standard in ppm.
        std: f64,
        /// Temperature in Celsius.
        t: f64,
    },
    /// Single-point DO calibration.
    DoSingle {
        /// Saturation concentration at `t` in mg/L.
        #[serde(rename = "ref")]
        reference: f64,
        /// Saturation voltage in millivolts.
        v: f64,
        /// Temperature in Celsius.
        t: f64,
        /// Always `true`.
        calibrated: bool,
    },
    /// Two-point DO calibration.
    DoDouble {
        /// Saturation concentration at `t1` in mg/L.
        #[serde(rename = "ref")]
        reference: f64,
        /// First point voltage in millivolts.
        v1: f64,
        /// First point temperature in Celsius.
        t1: f64,
        /// Second point voltage in millivolts.
        v2: f64,
        /// Second point temperature in Celsius.
        t2: f64,
        /// Always `true`.
        calibrated: bool,
    },
}

/// A complete calibration submission.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalibrationPayload {
    /// Sensor being calibrated.
    pub sensor_type: SensorType,
    /// Sensor-specific parameters.
    pub calibration_data: CalibrationData,
}

impl CalibrationPayload {
    /// pH payload from a fitted model.
    pub fn ph(model: &LinearModel) -> Self {
        Self {
            sensor_type: SensorType::Ph,
            calibration_data: CalibrationData::Ph {
                m: round_to(model.slope, PH_DECIMALS),
                c: round_to(model.intercept, PH_DECIMALS),
            },
        }
    }

    /// TDS payload from the reading taken in the reference standard.
    pub fn tds(voltage: f64, standard_ppm: f64, temperature_c: f64) -> Self {
        Self {
            sensor_type: SensorType::Tds,
            calibration_data: CalibrationData::Tds {
                v: round_to(voltage, TDS_VOLTAGE_DECIMALS),
                std: round_to(standard_ppm, DEFAULT_DECIMALS),
                t: round_to(temperature_c, DEFAULT_DECIMALS),
            },
        }
    }

    /// Single-point DO payload.
    pub fn do_single(reference: f64, point: &DoCalibrationPoint) -> Self {
        Self {
            sensor_type: SensorType::Do,
            calibration_data: CalibrationData::DoSingle {
                reference,
                v: round_to(point.voltage_mv(), DEFAULT_DECIMALS),
                t: round_to(point.temperature, DEFAULT_DECIMALS),
                calibrated: true,
            },
        }
    }

    /// Two-point DO payload.
    pub fn do_double(
        reference: f64,
        point1: &DoCalibrationPoint,
        point2: &DoCalibrationPoint,
    ) -> Self {
        Self {
            sensor_type: SensorType::Do,
            calibration_data: CalibrationData::DoDouble {
                reference,
                v1: round_to(point1.voltage_mv(), DEFAULT_DECIMALS),
                t1: round_to(point1.temperature, DEFAULT_DECIMALS),
                v2: round_to(point2.voltage_mv(), DEFAULT_DECIMALS),
                t2: round_to(point2.temperature, DEFAULT_DECIMALS),
                calibrated: true,
            },
        }
    }

    /// Encode as a JSON value.
    pub fn to_value(&self) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }

    /// Encode as a JSON string.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Encode as a request body.
    pub fn to_bytes(&self) -> Result<Bytes> {
        Ok(Bytes::from(serde_json::to_vec(self)?))
    }
}
