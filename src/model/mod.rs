//! Numeric sensor models.
//!
//! Pure functions converting (voltage, temperature, calibration parameters)
//! into physical values. Nothing here performs I/O or keeps state between
//! calls; out-of-range inputs yield a best-effort value rather than an error.

pub mod dissolved_oxygen;
pub mod ph;
pub mod tds;

pub use dissolved_oxygen::{
    calibrated_do, calibrated_do_with_max, interpolate_saturation_voltage, saturation_from_table,
    saturation_polynomial, saturation_voltage, uncalibrated_do, DoMode, SATURATION_TABLE,
};
pub use ph::{compute_r_squared, fit_linear_model, FitQuality, LinearModel, QualityBand};
pub use tds::{apply_scale, compensation_coefficient, compute_tds, TdsCompensation};
