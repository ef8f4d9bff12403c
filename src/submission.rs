//! Calibration submission.
//!
//! The engine hands completed sessions to an injected
//! [`CalibrationSubmitter`], conceptually `POST /devices/{id}/calibrations`.
//! [`CalibrationWorkflow`] wraps one session for one device and enforces a
//! single submission in flight at a time. Retries and timeouts belong to the
//! submitter; the workflow never retries on its own.

use async_trait::async_trait;
use parking_lot::RwLock;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::data::{SensorReading, SensorType};
use crate::error::{Error, Result};
use crate::protocol::CalibrationPayload;
use crate::session::Calibration;

/// Capability that delivers a payload to the backend.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CalibrationSubmitter: Send + Sync {
    /// Deliver `payload` for `device_id`.
    ///
    /// Implementations should report failures as [`Error::SubmissionFailed`].
    async fn submit(&self, device_id: &str, payload: &CalibrationPayload) -> Result<()>;
}

/// Submission status of a workflow.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SubmissionStatus {
    /// Nothing submitted yet.
    #[default]
    Idle,
    /// A submission is awaiting the submitter.
    InFlight,
    /// The last submission failed; the session is intact.
    Failed(String),
    /// The calibration was accepted.
    Completed,
}

impl SubmissionStatus {
    /// Whether the workflow has finished.
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed)
    }
}

impl fmt::Display for SubmissionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "Idle"),
            Self::InFlight => write!(f, "InFlight"),
            Self::Failed(reason) => write!(f, "Failed: {}", reason),
            Self::Completed => write!(f, "Completed"),
        }
    }
}

/// Clears the in-flight flag when a submission ends, however it ends.
struct InFlightGuard<'a>(&'a AtomicBool);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// One calibration workflow for one device and sensor.
pub struct CalibrationWorkflow<C> {
    /// Workflow identifier.
    id: Uuid,
    /// Device being calibrated.
    device_id: String,
    /// Session state.
    session: RwLock<C>,
    /// Injected delivery capability.
    submitter: Arc<dyn CalibrationSubmitter>,
    /// Set while a submission awaits the submitter.
    in_flight: AtomicBool,
    /// Set once a submission succeeded.
    completed: AtomicBool,
    /// Latest status.
    status: RwLock<SubmissionStatus>,
    /// Status change channel.
    status_tx: broadcast::Sender<SubmissionStatus>,
}

impl<C: Calibration> CalibrationWorkflow<C> {
    /// Open a workflow for `device_id` around `session`.
    pub fn new(
        device_id: impl Into<String>,
        session: C,
        submitter: Arc<dyn CalibrationSubmitter>,
    ) -> Self {
        let (status_tx, _) = broadcast::channel(16);
        let workflow = Self {
            id: Uuid::new_v4(),
            device_id: device_id.into(),
            session: RwLock::new(session),
            submitter,
            in_flight: AtomicBool::new(false),
            completed: AtomicBool::new(false),
            status: RwLock::new(SubmissionStatus::Idle),
            status_tx,
        };
        debug!(
            workflow = %workflow.id,
            device = %workflow.device_id,
            sensor = %workflow.sensor_type(),
            "Opened calibration workflow"
        );
        workflow
    }

    /// Workflow identifier.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Device being calibrated.
    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    /// Sensor being calibrated.
    pub fn sensor_type(&self) -> SensorType {
        self.session.read().sensor_type()
    }

    /// Latest submission status.
    pub fn status(&self) -> SubmissionStatus {
        self.status.read().clone()
    }

    /// Subscribe to status changes.
    pub fn subscribe(&self) -> broadcast::Receiver<SubmissionStatus> {
        self.status_tx.subscribe()
    }

    /// Whether a submission is awaiting the submitter.
    pub fn is_submitting(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Whether the calibration was accepted.
    pub fn is_completed(&self) -> bool {
        self.completed.load(Ordering::SeqCst)
    }

    /// Read the session.
    pub fn with_session<R>(&self, f: impl FnOnce(&C) -> R) -> R {
        f(&self.session.read())
    }

    /// Mutate the session.
    ///
    /// # Errors
    ///
    /// Rejected while a submission is in flight or after completion.
    pub fn update<R>(&self, f: impl FnOnce(&mut C) -> R) -> Result<R> {
        // `submit` claims the in-flight flag under the session lock, so the
        // flags cannot change while this write guard is held.
        let mut session = self.session.write();
        if self.is_completed() {
            return Err(Error::SessionCompleted);
        }
        if self.is_submitting() {
            return Err(Error::SubmissionInProgress);
        }
        Ok(f(&mut session))
    }

    /// Whether the submit affordance should be enabled for this reading.
    pub fn can_submit(&self, reading: &SensorReading) -> bool {
        !self.is_completed() && !self.is_submitting() && self.session.read().can_submit(reading)
    }

    /// Build the payload and hand it to the submitter.
    ///
    /// On success the workflow is completed and the delivered payload is
    /// returned. On failure the session is left exactly as it was so the
    /// operator can retry.
    ///
    /// # Errors
    ///
    /// - [`Error::SessionCompleted`] after a successful submission.
    /// - [`Error::SubmissionInProgress`] while another submission is pending.
    /// - [`Error::NotReady`] or a model error when the session is incomplete.
    /// - [`Error::SubmissionFailed`] when the submitter rejects the payload.
    pub async fn submit(&self, reading: &SensorReading) -> Result<CalibrationPayload> {
        let (payload, _guard) = {
            let session = self.session.read();
            if self.is_completed() {
                return Err(Error::SessionCompleted);
            }
            if self
                .in_flight
                .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
                .is_err()
            {
                debug!(workflow = %self.id, "Submission already in flight");
                return Err(Error::SubmissionInProgress);
            }
            let guard = InFlightGuard(&self.in_flight);

            if !session.can_submit(reading) {
                return Err(Error::NotReady {
                    reason: format!("{} calibration incomplete", session.sensor_type()),
                });
            }
            (session.payload(reading)?, guard)
        };

        self.set_status(SubmissionStatus::InFlight);
        info!(
            workflow = %self.id,
            device = %self.device_id,
            sensor = %payload.sensor_type,
            "Submitting calibration"
        );

        match self.submitter.submit(&self.device_id, &payload).await {
            Ok(()) => {
                self.completed.store(true, Ordering::SeqCst);
                self.set_status(SubmissionStatus::Completed);
                info!(workflow = %self.id, device = %self.device_id, "Calibration accepted");
                Ok(payload)
            }
            Err(e) => {
                warn!(
                    workflow = %self.id,
                    device = %self.device_id,
                    "Calibration submission failed: {}",
                    e
                );
                let err = match e {
                    Error::SubmissionFailed { .. } => e,
                    other => Error::SubmissionFailed {
                        reason: other.to_string(),
                    },
                };
                self.set_status(SubmissionStatus::Failed(err.to_string()));
                Err(err)
            }
        }
    }

    /// Close the workflow and take the session back.
    pub fn into_session(self) -> C {
        self.session.into_inner()
    }

    fn set_status(&self, status: SubmissionStatus) {
        *self.status.write() = status.clone();
        let _ = self.status_tx.send(status);
    }
}
