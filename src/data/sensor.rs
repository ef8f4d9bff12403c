//! Sensor kinds handled by the calibration engine.

use serde::{Deserialize, Serialize};
use std::fmt;

/// An analog sensor that can be calibrated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SensorType {
    /// pH probe (volts in, pH out).
    Ph,
    /// Total Dissolved Solids probe (volts in, ppm out).
    Tds,
    /// Dissolved Oxygen probe (millivolts in, mg/L out).
    Do,
}

impl SensorType {
    /// All calibratable sensor types.
    pub const ALL: [SensorType; 3] = [Self::Ph, Self::Tds, Self::Do];

    /// Parse the wire name (`"ph"`, `"tds"`, `"do"`).
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "ph" => Some(Self::Ph),
            "tds" => Some(Self::Tds),
            "do" => Some(Self::Do),
            _ => None,
        }
    }

    /// Wire name used in the `sensor_type` payload field.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ph => "ph",
            Self::Tds => "tds",
            Self::Do => "do",
        }
    }

    /// Unit of the calibrated measurement.
    pub fn unit(&self) -> &'static str {
        match self {
            Self::Ph => "pH",
            Self::Tds => "ppm",
            Self::Do => "mg/L",
        }
    }
}

impl fmt::Display for SensorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_name() {
        assert_eq!(SensorType::from_name("ph"), Some(SensorType::Ph));
        assert_eq!(SensorType::from_name("TDS"), Some(SensorType::Tds));
        assert_eq!(SensorType::from_name("do"), Some(SensorType::Do));
        assert_eq!(SensorType::from_name("orp"), None);
    }

    #[test]
    fn test_name_roundtrip() {
        for sensor in SensorType::ALL {
            assert_eq!(SensorType::from_name(sensor.as_str()), Some(sensor));
        }
    }

    #[test]
    fn test_serde_names() {
        assert_eq!(serde_json::to_string(&SensorType::Do).unwrap(), "\"do\"");
        let parsed: SensorType = serde_json::from_str("\"tds\"").unwrap();
        assert_eq!(parsed, SensorType::Tds);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", SensorType::Ph), "ph");
        assert_eq!(SensorType::Do.unit(), "mg/L");
    }
}
