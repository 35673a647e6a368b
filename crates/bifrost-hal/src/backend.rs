//! Backend trait and configuration.
//!
//! The [`Backend`] trait defines the lifecycle for interacting with a
//! quantum backend:
//!
//! ```text
//!   capabilities() ──→ validate() ──→ submit() ──→ status() ──→ results()
//!    (sync, &ref)       (async)       (async)      (async)       (async)
//! ```
//!
//! Submission is batch-first: `submit()` takes a slice of circuits that run
//! under one job, and `results()` returns one [`ExecutionResult`] per
//! circuit in submission order. Tomography always submits its three basis
//! circuits as a single batch so they share a queue slot and calibration
//! window.
//!
//! ## Design principles
//!
//! - **Async-native**: all I/O methods are async.
//! - **Thread-safe**: `Send + Sync` bound enables shared ownership.
//! - **Infallible introspection**: `capabilities()` is synchronous and
//!   infallible — a backend that cannot report capabilities without I/O
//!   is not correctly initialized.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use bifrost_ir::Circuit;

use crate::capability::Capabilities;
use crate::error::{HalError, HalResult};
use crate::job::{JobId, JobStatus};
use crate::result::ExecutionResult;

/// Configuration for a backend instance.
#[derive(Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Name of the backend.
    pub name: String,
    /// API endpoint URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    /// Authentication token.
    #[serde(skip_serializing)]
    pub token: Option<String>,
    /// Additional configuration.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl BackendConfig {
    /// Create a new backend configuration.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            endpoint: None,
            token: None,
            extra: serde_json::Map::new(),
        }
    }

    /// Set the endpoint URL.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Set the authentication token.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Add extra configuration.
    pub fn with_extra(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }
}

impl fmt::Debug for BackendConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackendConfig")
            .field("name", &self.name)
            .field("endpoint", &self.endpoint)
            .field("token", &"[REDACTED]")
            .field("extra", &self.extra)
            .finish()
    }
}

/// Trait for quantum backends.
///
/// # Contract
///
/// - `capabilities()` MUST be synchronous and infallible. Capabilities
///   MUST be cached at construction time.
/// - `availability()` SHOULD perform a lightweight liveness check.
/// - `validate()` MUST check the circuit against backend constraints
///   before submission.
/// - `submit()` MUST return a `JobId` with initial status `Queued` and
///   MUST reject `shots == 0` and empty batches.
/// - `results()` MUST only be called when status is `Completed`, and
///   MUST return results in submission order.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Get the name of this backend.
    fn name(&self) -> &str;

    /// Get the capabilities of this backend.
    ///
    /// This method is synchronous and infallible. Implementations MUST
    /// cache capabilities at construction time and return a reference.
    fn capabilities(&self) -> &Capabilities;

    /// Check backend availability with queue depth information.
    ///
    /// Returns richer information than a simple boolean: queue depth,
    /// estimated wait time, and an optional status message.
    async fn availability(&self) -> HalResult<BackendAvailability>;

    /// Validate a circuit against backend constraints.
    ///
    /// SHOULD check at minimum:
    /// - Qubit count vs `capabilities().num_qubits`
    /// - Gate support vs `capabilities().gate_set`
    /// - Conditional gates vs `supports_dynamic_circuits()`
    async fn validate(&self, circuit: &Circuit) -> HalResult<ValidationResult>;

    /// Submit a batch of circuits for execution.
    ///
    /// All circuits run with the same shot count under one job. The job
    /// MUST start in `Queued` status.
    async fn submit(&self, circuits: &[Circuit], shots: u32) -> HalResult<JobId>;

    /// Get the status of a job.
    async fn status(&self, job_id: &JobId) -> HalResult<JobStatus>;

    /// Get the results of a completed job, one per submitted circuit.
    ///
    /// MUST only be called when `status()` returns `Completed`.
    async fn results(&self, job_id: &JobId) -> HalResult<Vec<ExecutionResult>>;

    /// Cancel a running job.
    async fn cancel(&self, job_id: &JobId) -> HalResult<()>;

    /// Wait for a job to complete and return its results.
    ///
    /// Default implementation polls every 500ms for up to 5 minutes.
    /// Hardware queues routinely exceed that; use [`Backend::wait_timeout`]
    /// with an explicit budget there.
    async fn wait(&self, job_id: &JobId) -> HalResult<Vec<ExecutionResult>> {
        self.wait_timeout(job_id, Duration::from_secs(300)).await
    }

    /// Wait for a job to complete with an explicit timeout.
    async fn wait_timeout(
        &self,
        job_id: &JobId,
        timeout: Duration,
    ) -> HalResult<Vec<ExecutionResult>> {
        use tokio::time::sleep;

        let poll_interval = Duration::from_millis(500);
        let deadline = tokio::time::Instant::now() + timeout;

        loop {
            let status = self.status(job_id).await?;
            tracing::debug!(job_id = %job_id, status = %status, "polled job status");

            match status {
                JobStatus::Completed => return self.results(job_id).await,
                JobStatus::Failed(msg) => return Err(HalError::JobFailed(msg)),
                JobStatus::Cancelled => return Err(HalError::JobCancelled),
                JobStatus::Queued | JobStatus::Running => {
                    if tokio::time::Instant::now() + poll_interval > deadline {
                        return Err(HalError::Timeout(job_id.0.clone()));
                    }
                    sleep(poll_interval).await;
                }
            }
        }
    }
}

/// Backend availability information.
///
/// Provides richer availability data than a simple boolean, enabling
/// least-busy device selection based on queue depth.
#[derive(Debug, Clone)]
pub struct BackendAvailability {
    /// Whether the backend is currently accepting jobs.
    pub is_available: bool,
    /// Number of jobs currently in queue (if known).
    pub queue_depth: Option<u32>,
    /// Estimated wait time for a new job (if known).
    pub estimated_wait: Option<Duration>,
    /// Human-readable status message.
    pub status_message: Option<String>,
}

impl BackendAvailability {
    /// Create availability for a backend that is always available.
    ///
    /// Typical for simulators — zero queue, zero wait.
    pub fn always_available() -> Self {
        Self {
            is_available: true,
            queue_depth: Some(0),
            estimated_wait: Some(Duration::ZERO),
            status_message: None,
        }
    }

    /// Create availability for an offline backend.
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self {
            is_available: false,
            queue_depth: None,
            estimated_wait: None,
            status_message: Some(reason.into()),
        }
    }
}

/// Result of circuit validation against backend constraints.
#[derive(Debug, Clone)]
pub enum ValidationResult {
    /// Circuit is valid and can be submitted directly.
    Valid,
    /// Circuit is invalid for this backend.
    Invalid {
        /// Reasons the circuit is invalid.
        reasons: Vec<String>,
    },
    /// Circuit could run after transpilation.
    RequiresTranspilation {
        /// What transpilation is needed.
        details: String,
    },
}

impl ValidationResult {
    /// Check if the circuit is valid (can be submitted as-is).
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationResult::Valid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Backend that reports `Queued` for a fixed number of polls, then a
    /// terminal status.
    struct ScriptedBackend {
        capabilities: Capabilities,
        polls_until_done: u32,
        polls: AtomicU32,
        terminal: JobStatus,
    }

    impl ScriptedBackend {
        fn new(polls_until_done: u32, terminal: JobStatus) -> Self {
            Self {
                capabilities: Capabilities::simulator(4),
                polls_until_done,
                polls: AtomicU32::new(0),
                terminal,
            }
        }
    }

    #[async_trait]
    impl Backend for ScriptedBackend {
        fn name(&self) -> &str {
            "scripted"
        }

        fn capabilities(&self) -> &Capabilities {
            &self.capabilities
        }

        async fn availability(&self) -> HalResult<BackendAvailability> {
            Ok(BackendAvailability::always_available())
        }

        async fn validate(&self, _circuit: &Circuit) -> HalResult<ValidationResult> {
            Ok(ValidationResult::Valid)
        }

        async fn submit(&self, _circuits: &[Circuit], _shots: u32) -> HalResult<JobId> {
            Ok(JobId::new("scripted-job"))
        }

        async fn status(&self, _job_id: &JobId) -> HalResult<JobStatus> {
            let seen = self.polls.fetch_add(1, Ordering::SeqCst);
            if seen < self.polls_until_done {
                Ok(JobStatus::Queued)
            } else {
                Ok(self.terminal.clone())
            }
        }

        async fn results(&self, _job_id: &JobId) -> HalResult<Vec<ExecutionResult>> {
            Ok(vec![ExecutionResult::new(crate::Counts::new(), 1)])
        }

        async fn cancel(&self, _job_id: &JobId) -> HalResult<()> {
            Ok(())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_polls_until_completed() {
        let backend = ScriptedBackend::new(3, JobStatus::Completed);
        let results = backend.wait(&JobId::new("j")).await.unwrap();
        assert_eq!(results.len(), 1);
        assert!(backend.polls.load(Ordering::SeqCst) >= 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_surfaces_job_failure() {
        let backend = ScriptedBackend::new(1, JobStatus::Failed("calibration drift".into()));
        let err = backend.wait(&JobId::new("j")).await.unwrap_err();
        assert!(matches!(err, HalError::JobFailed(msg) if msg == "calibration drift"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_timeout_expires() {
        let backend = ScriptedBackend::new(u32::MAX, JobStatus::Completed);
        let err = backend
            .wait_timeout(&JobId::new("j"), Duration::from_secs(2))
            .await
            .unwrap_err();
        assert!(matches!(err, HalError::Timeout(_)));
    }

    #[test]
    fn test_backend_config() {
        let config = BackendConfig::new("test")
            .with_endpoint("https://api.example.com")
            .with_token("secret-token")
            .with_extra("timeout", serde_json::json!(30));

        assert_eq!(config.name, "test");
        assert_eq!(config.endpoint, Some("https://api.example.com".to_string()));
        assert_eq!(config.token, Some("secret-token".to_string()));
        assert!(config.extra.contains_key("timeout"));
    }

    #[test]
    fn test_config_debug_redacts_token() {
        let config = BackendConfig::new("test").with_token("secret-token");
        let debug = format!("{config:?}");
        assert!(!debug.contains("secret-token"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn test_backend_availability_always_available() {
        let avail = BackendAvailability::always_available();
        assert!(avail.is_available);
        assert_eq!(avail.queue_depth, Some(0));
        assert_eq!(avail.estimated_wait, Some(Duration::ZERO));
        assert!(avail.status_message.is_none());
    }

    #[test]
    fn test_backend_availability_unavailable() {
        let avail = BackendAvailability::unavailable("maintenance");
        assert!(!avail.is_available);
        assert_eq!(avail.status_message, Some("maintenance".to_string()));
    }

    #[test]
    fn test_validation_result_is_valid() {
        assert!(ValidationResult::Valid.is_valid());
        assert!(!ValidationResult::Invalid { reasons: vec![] }.is_valid());
        assert!(
            !ValidationResult::RequiresTranspilation {
                details: String::new()
            }
            .is_valid()
        );
    }
}
