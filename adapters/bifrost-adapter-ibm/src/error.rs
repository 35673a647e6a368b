//! Error types for the IBM Quantum adapter.

use thiserror::Error;

/// Result type for IBM operations.
pub type IbmResult<T> = Result<T, IbmError>;

/// Errors that can occur when using IBM Quantum.
#[derive(Debug, Error)]
pub enum IbmError {
    /// Missing API token.
    #[error("IBM Quantum API token not found. Set the IBM_QUANTUM_TOKEN environment variable.")]
    MissingToken,

    /// Invalid API token.
    #[error("Invalid IBM Quantum API token")]
    InvalidToken,

    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// API returned an error.
    #[error("IBM Quantum API error: {message}")]
    ApiError {
        /// Error code from API.
        code: Option<String>,
        /// Error message.
        message: String,
    },

    /// Job not found.
    #[error("Job not found: {0}")]
    JobNotFound(String),

    /// Job failed.
    #[error("Job failed: {0}")]
    JobFailed(String),

    /// Circuit conversion error.
    #[error("Circuit conversion error: {0}")]
    CircuitError(String),

    /// Backend not available.
    #[error("Backend not available: {0}")]
    BackendUnavailable(String),

    /// No operational hardware device found.
    #[error("No operational non-simulator device available")]
    NoDeviceAvailable,

    /// JSON parsing error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Retries exhausted on a transient failure.
    #[error("Request failed after {attempts} attempts: {message}")]
    RetriesExhausted {
        /// Number of attempts made.
        attempts: u32,
        /// Last error message.
        message: String,
    },
}

impl From<IbmError> for bifrost_hal::HalError {
    fn from(e: IbmError) -> Self {
        match e {
            IbmError::MissingToken | IbmError::InvalidToken => {
                bifrost_hal::HalError::AuthenticationFailed(e.to_string())
            }
            IbmError::JobNotFound(id) => bifrost_hal::HalError::JobNotFound(id),
            IbmError::JobFailed(msg) => bifrost_hal::HalError::JobFailed(msg),
            IbmError::BackendUnavailable(msg) => bifrost_hal::HalError::BackendUnavailable(msg),
            IbmError::NoDeviceAvailable => {
                bifrost_hal::HalError::BackendUnavailable("no operational device".into())
            }
            IbmError::CircuitError(msg) => bifrost_hal::HalError::InvalidCircuit(msg),
            _ => bifrost_hal::HalError::Backend(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_token_display() {
        let err = IbmError::MissingToken;
        assert!(err.to_string().contains("IBM_QUANTUM_TOKEN"));
    }

    #[test]
    fn test_hal_error_conversion() {
        let hal: bifrost_hal::HalError = IbmError::JobNotFound("abc".into()).into();
        assert!(matches!(hal, bifrost_hal::HalError::JobNotFound(_)));

        let hal: bifrost_hal::HalError = IbmError::MissingToken.into();
        assert!(matches!(
            hal,
            bifrost_hal::HalError::AuthenticationFailed(_)
        ));
    }
}
