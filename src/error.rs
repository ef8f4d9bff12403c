//! Error types for the aquacal crate.

use thiserror::Error;

/// The main error type for this crate.
#[derive(Error, Debug)]
pub enum Error {
    /// Not enough calibration points to build a model.
    #[error("Insufficient calibration points: need {required}, have {actual}")]
    InsufficientPoints {
        /// Minimum number of points the operation needs.
        required: usize,
        /// Number of points currently captured.
        actual: usize,
    },

    /// A point with (nearly) the same reference value is already captured.
    #[error("Duplicate calibration point for reference {reference}")]
    DuplicatePoint {
        /// The rejected reference value.
        reference: f64,
    },

    /// The regression could not be fitted (all voltages identical).
    #[error("Linear fit unavailable: measured voltages have zero variance")]
    DegenerateFit,

    /// The session is not in a state that allows the requested operation.
    #[error("Calibration not ready: {reason}")]
    NotReady {
        /// Description of what is missing.
        reason: String,
    },

    /// An invalid parameter was provided.
    #[error("Invalid parameter: {name} = {value}")]
    InvalidParameter {
        /// The name of the parameter.
        name: String,
        /// The invalid value that was provided.
        value: String,
    },

    /// A submission for this session is already in flight.
    #[error("Calibration submission already in progress")]
    SubmissionInProgress,

    /// The session was already submitted successfully.
    #[error("Calibration session already completed")]
    SessionCompleted,

    /// The submission adapter rejected the payload.
    #[error("Calibration submission failed: {reason}")]
    SubmissionFailed {
        /// Description of why the submission failed.
        reason: String,
    },

    /// No telemetry has been published for the device.
    #[error("Device not found: {device_id}")]
    DeviceNotFound {
        /// The device identifier that was looked up.
        device_id: String,
    },

    /// Payload encoding failed.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Whether the operator can recover by retrying the same action.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::SubmissionFailed { .. } | Self::SubmissionInProgress)
    }
}

/// A specialized Result type for this crate.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::InsufficientPoints {
            required: 2,
            actual: 1,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient calibration points: need 2, have 1"
        );

        let err = Error::SubmissionFailed {
            reason: "HTTP 500".to_string(),
        };
        assert_eq!(err.to_string(), "Calibration submission failed: HTTP 500");
    }

    #[test]
    fn test_retryable() {
        assert!(Error::SubmissionFailed {
            reason: "timeout".into()
        }
        .is_retryable());
        assert!(!Error::DegenerateFit.is_retryable());
        assert!(!Error::SessionCompleted.is_retryable());
    }
}
