//! Data structures shared by the models and sessions.
//!
//! This module contains the value objects the calibration engine operates
//! on: sensor kinds, live readings, and captured calibration points.

pub mod point;
pub mod reading;
pub mod sensor;

pub use point::{CalibrationPoint, DoCalibrationPoint};
pub use reading::SensorReading;
pub use sensor::SensorType;
