use thiserror::Error;

/// Errors returned by faceid operations.
#[derive(Debug, Error)]
pub enum FaceIdError {
    #[error("storage error: {0}")]
    Storage(String),

    #[error("detector error: {0}")]
    Detector(String),

    #[error("capture device unavailable: {0}")]
    Device(String),

    #[error("capture limit reached ({max} samples)")]
    CaptureLimit { max: usize },

    #[error("enrollment not ready: {0}")]
    NotReady(String),

    #[error("enrollment session is closed")]
    SessionClosed,

    #[error("an enrollment session is already active")]
    EnrollmentActive,
}
