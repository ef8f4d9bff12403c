//! Protocol module for the calibration submission wire format.
//!
//! This module contains:
//! - Payload types and their JSON encoding
//! - The backend resource path for calibration submissions

pub mod payload;

pub use payload::{CalibrationData, CalibrationPayload};

/// Backend resource path that receives calibration payloads for a device.
///
/// ```
/// use aquacal::protocol::calibration_path;
///
/// assert_eq!(calibration_path("tank-7"), "/devices/tank-7/calibrations");
/// ```
pub fn calibration_path(device_id: &str) -> String {
    format!("/devices/{}/calibrations", device_id)
}
