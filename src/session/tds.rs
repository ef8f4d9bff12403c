//! TDS calibration session.
//!
//! Holds the reference standard chosen by the operator. The compensation is
//! recomputed from every new reading; nothing else is stored.

use tracing::{debug, info};
use uuid::Uuid;

use super::Calibration;
use crate::config::CalibrationConfig;
use crate::data::{SensorReading, SensorType};
use crate::error::{Error, Result};
use crate::model::{compute_tds, TdsCompensation};
use crate::protocol::CalibrationPayload;

/// Where the reference standard comes from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StandardSource {
    /// One of the configured presets, by index.
    Preset(usize),
    /// A value in ppm typed by the operator.
    Custom(f64),
}

/// Operator workflow for a single-standard TDS calibration.
#[derive(Debug, Clone)]
pub struct TdsCalibrationSession {
    id: Uuid,
    standard: Option<f64>,
    config: CalibrationConfig,
}

impl TdsCalibrationSession {
    /// Create a session with no standard selected.
    pub fn new() -> Self {
        Self::with_config(CalibrationConfig::default())
    }

    /// Create a session with a custom configuration.
    pub fn with_config(config: CalibrationConfig) -> Self {
        Self {
            id: Uuid::new_v4(),
            standard: None,
            config,
        }
    }

    /// Unique session identifier.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// The selected reference standard in ppm.
    pub fn standard(&self) -> Option<f64> {
        self.standard
    }

    /// Select the reference standard. Returns the resolved value in ppm.
    pub fn select_standard(&mut self, source: StandardSource) -> Result<f64> {
        let value = match source {
            StandardSource::Preset(index) => {
                self.config
                    .tds_preset(index)
                    .ok_or_else(|| Error::InvalidParameter {
                        name: "preset".to_string(),
                        value: index.to_string(),
                    })?
            }
            StandardSource::Custom(value) if value.is_finite() => value,
            StandardSource::Custom(value) => {
                return Err(Error::InvalidParameter {
                    name: "standard".to_string(),
                    value: value.to_string(),
                })
            }
        };

        debug!(session = %self.id, standard = value, "Selected TDS reference standard");
        self.standard = Some(value);
        Ok(value)
    }

    /// Clear the selected standard.
    pub fn clear_standard(&mut self) {
        self.standard = None;
    }

    /// Compensation for the given reading against the selected standard.
    pub fn compensation(&self, reading: &SensorReading) -> TdsCompensation {
        compute_tds(reading.voltage, reading.temperature, self.standard)
    }

    /// Calibrated TDS in ppm for the given reading.
    pub fn calibrated_value(&self, reading: &SensorReading) -> f64 {
        self.compensation(reading)
            .calibrated_value_with_max(self.config.tds_max_ppm)
    }

    /// Whether a calibration can be taken from this reading.
    ///
    /// Requires a positive standard, voltage and temperature, and an online device.
    pub fn can_calibrate(&self, reading: &SensorReading) -> bool {
        matches!(self.standard, Some(standard) if standard > 0.0) && reading.is_capturable()
    }
}

impl Default for TdsCalibrationSession {
    fn default() -> Self {
        Self::new()
    }
}

impl Calibration for TdsCalibrationSession {
    fn sensor_type(&self) -> SensorType {
        SensorType::Tds
    }

    fn can_submit(&self, reading: &SensorReading) -> bool {
        self.can_calibrate(reading)
    }

    fn payload(&self, reading: &SensorReading) -> Result<CalibrationPayload> {
        let standard = match self.standard {
            Some(standard) if standard > 0.0 => standard,
            _ => {
                return Err(Error::NotReady {
                    reason: "no reference standard selected".to_string(),
                })
            }
        };
        if !reading.is_capturable() {
            return Err(Error::NotReady {
                reason: "reading unavailable or device offline".to_string(),
            });
        }

        let compensation = self.compensation(reading);
        info!(
            session = %self.id,
            standard,
            voltage = reading.voltage,
            temperature = reading.temperature,
            scale_constant = compensation.scale_constant,
            "Prepared TDS calibration"
        );
        Ok(CalibrationPayload::tds(
            reading.voltage,
            standard,
            reading.temperature,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::CalibrationData;

    fn live(voltage: f64, temperature: f64) -> SensorReading {
        SensorReading::new(voltage, temperature, 2048.0, true)
    }

    #[test]
    fn test_select_preset_and_custom() {
        let mut session = TdsCalibrationSession::new();
        assert_eq!(session.select_standard(StandardSource::Preset(0)).unwrap(), 342.0);
        assert_eq!(session.standard(), Some(342.0));
        assert_eq!(
            session.select_standard(StandardSource::Custom(707.0)).unwrap(),
            707.0
        );
        assert!(session.select_standard(StandardSource::Preset(3)).is_err());
        assert!(session
            .select_standard(StandardSource::Custom(f64::NAN))
            .is_err());
        assert_eq!(session.standard(), Some(707.0));
    }

    #[test]
    fn test_can_calibrate_gate() {
        let mut session = TdsCalibrationSession::new();
        assert!(!session.can_calibrate(&live(1.0, 25.0)));

        session.select_standard(StandardSource::Preset(1)).unwrap();
        assert!(session.can_calibrate(&live(1.0, 25.0)));
        assert!(!session.can_calibrate(&live(0.0, 25.0)));
        assert!(!session.can_calibrate(&live(1.0, 0.0)));
        assert!(!session.can_calibrate(&SensorReading::new(1.0, 25.0, 0.0, false)));

        session.select_standard(StandardSource::Custom(0.0)).unwrap();
        assert!(!session.can_calibrate(&live(1.0, 25.0)));
    }

    #[test]
    fn test_compensation_follows_standard() {
        let mut session = TdsCalibrationSession::new();
        let reading = live(1.0, 25.0);
        assert_eq!(session.compensation(&reading).scale_constant, 1.0);

        session.select_standard(StandardSource::Preset(1)).unwrap();
        let compensation = session.compensation(&reading);
        assert!((compensation.scale_constant - 500.0 / 367.475).abs() < 1e-12);
        assert!((session.calibrated_value(&reading) - 500.0).abs() < 1e-9);
    }

    #[test]
    fn test_payload() {
        let mut session = TdsCalibrationSession::new();
        let reading = live(1.23456, 24.567);
        assert!(matches!(
            session.payload(&reading),
            Err(Error::NotReady { .. })
        ));

        session.select_standard(StandardSource::Preset(2)).unwrap();
        let payload = session.payload(&reading).unwrap();
        assert_eq!(payload.sensor_type, SensorType::Tds);
        assert_eq!(
            payload.calibration_data,
            CalibrationData::Tds {
                v: 1.2346,
                std: 1000.0,
                t: 24.57
            }
        );

        let offline = SensorReading::new(1.2, 25.0, 0.0, false);
        assert!(session.payload(&offline).is_err());
    }

    #[test]
    fn test_clear_standard() {
        let mut session = TdsCalibrationSession::new();
        session.select_standard(StandardSource::Preset(0)).unwrap();
        session.clear_standard();
        assert!(session.standard().is_none());
        assert!(!session.can_submit(&live(1.0, 25.0)));
    }
}
