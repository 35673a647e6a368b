//! Error types for protocol construction and tomography analysis.

use thiserror::Error;

/// Errors raised while building teleportation circuits or reducing
/// measurement counts to expectation values.
#[derive(Error, Debug)]
pub enum TomoError {
    /// An outcome label could not be interpreted as a bitstring.
    #[error("malformed outcome label {label:?}: {reason}")]
    MalformedLabel { label: String, reason: String },

    /// The nominal shot count was zero.
    #[error("shot count must be non-zero")]
    ZeroShots,

    /// An execution result did not carry the expected classical register.
    #[error("result is missing classical register '{0}'")]
    MissingRegister(String),

    /// The backend returned a different number of results than circuits submitted.
    #[error("expected {expected} results, backend returned {got}")]
    ResultCountMismatch { expected: usize, got: usize },

    /// The submitted job failed on the backend.
    #[error("job {job_id} failed: {message}")]
    JobFailed { job_id: String, message: String },

    /// Circuit construction failed.
    #[error("circuit error: {0}")]
    Circuit(#[from] bifrost_ir::IrError),

    /// Backend execution failed.
    #[error("backend error: {0}")]
    Backend(#[from] bifrost_hal::HalError),
}

/// Result alias for tomography operations.
pub type TomoResult<T> = std::result::Result<T, TomoError>;
