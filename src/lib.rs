// Allow derivable impls for clarity
#![allow(clippy::derivable_impls)]

//! # aquacal
//!
//! Calibration engine for aquarium water-quality sensors.
//!
//! Converts raw analog probe signals (voltage, temperature) into calibrated
//! pH, TDS and dissolved-oxygen values, and drives the operator workflows
//! that collect the reference points those models need.
//!
//! ## Features
//!
//! - **pH**: least-squares linear fit over buffer points, with R² fit quality
//! - **TDS**: 25°C temperature compensation, cubic curve, scale constant K
//! - **Dissolved Oxygen**: saturation table lookup, single- and two-point
//!   calibration with an explicit state machine
//! - **Submission**: wire payloads for the backend and a single-flight
//!   submission workflow over an injected adapter
//! - **Telemetry**: latest-snapshot store fed by the real-time reading stream
//!
//! ## Quick Start
//!
//! ```rust
//! use aquacal::{PhCalibrationSession, QualityBand, ReferenceSource, Result};
//!
//! fn main() -> Result<()> {
//!     let mut session = PhCalibrationSession::new();
//!
//!     // Probe voltage measured in pH 4.01 and pH 6.86 buffers.
//!     session.add_point(ReferenceSource::Buffer(0), 0.180)?;
//!     session.add_point(ReferenceSource::Buffer(1), 0.050)?;
//!
//!     let model = session.fit()?;
//!     let quality = session.quality().expect("model available");
//!     assert_eq!(quality.band(), QualityBand::Excellent);
//!
//!     println!("pH at 0.1 V: {:.2}", model.predict(0.1));
//!     Ok(())
//! }
//! ```
//!
//! All model functions are pure and synchronous. The only asynchronous
//! boundary is [`CalibrationSubmitter::submit`].

// Public modules
pub mod config;
pub mod data;
pub mod error;
pub mod model;
pub mod protocol;
pub mod session;
pub mod submission;
pub mod telemetry;
pub mod utils;

// Re-exports for convenience
pub use config::CalibrationConfig;
pub use error::{Error, Result};
pub use submission::{CalibrationSubmitter, CalibrationWorkflow, SubmissionStatus};
pub use telemetry::TelemetryHub;
pub use utils::round_to;

// Re-export commonly used types from submodules
pub use data::{CalibrationPoint, DoCalibrationPoint, SensorReading, SensorType};
pub use model::{
    calibrated_do, compensation_coefficient, compute_r_squared, compute_tds, fit_linear_model,
    saturation_from_table, saturation_polynomial, uncalibrated_do, DoMode, FitQuality,
    LinearModel, QualityBand, TdsCompensation, SATURATION_TABLE,
};
pub use protocol::{CalibrationData, CalibrationPayload};
pub use session::{
    Calibration, DoCalibrationSession, DoCalibrationState, DoEvent, PhCalibrationSession,
    ReferenceSource, StandardSource, TdsCalibrationSession,
};
