//! Calibration engine configuration.
//!
//! Holds the tolerances, quality cutpoints, presets and clamp ranges used by
//! the models and sessions. [`CalibrationConfig::default`] reproduces the
//! values the backend and dashboard were built against; hosts may load an
//! override from JSON.

use serde::{Deserialize, Serialize};

/// Standard pH buffer solutions offered to the operator.
pub const PH_STANDARD_BUFFERS: [f64; 3] = [4.01, 6.86, 9.18];

/// TDS reference standard presets in ppm.
pub const TDS_STANDARD_PRESETS: [f64; 3] = [342.0, 500.0, 1000.0];

/// Tunable parameters for calibration sessions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibrationConfig {
    /// Two pH points closer than this (in pH units) are duplicates.
    pub duplicate_tolerance: f64,
    /// R² strictly above this is an excellent fit.
    pub excellent_r_squared: f64,
    /// R² at or above this (and not excellent) is a good fit.
    pub good_r_squared: f64,
    /// Standard pH buffers selectable by index.
    pub ph_buffers: Vec<f64>,
    /// TDS reference standard presets in ppm.
    pub tds_presets: Vec<f64>,
    /// Upper bound for a calibrated TDS value in ppm.
    pub tds_max_ppm: f64,
    /// Upper bound for a dissolved-oxygen value in mg/L.
    pub do_max_mg_per_l: f64,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            duplicate_tolerance: 0.01,
            excellent_r_squared: 0.99,
            good_r_squared: 0.95,
            ph_buffers: PH_STANDARD_BUFFERS.to_vec(),
            tds_presets: TDS_STANDARD_PRESETS.to_vec(),
            tds_max_ppm: 1000.0,
            do_max_mg_per_l: 20.0,
        }
    }
}

impl CalibrationConfig {
    /// Create a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a configuration from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Look up a standard pH buffer by index.
    pub fn ph_buffer(&self, index: usize) -> Option<f64> {
        self.ph_buffers.get(index).copied()
    }

    /// Look up a TDS preset by index.
    pub fn tds_preset(&self, index: usize) -> Option<f64> {
        self.tds_presets.get(index).copied()
    }
}
