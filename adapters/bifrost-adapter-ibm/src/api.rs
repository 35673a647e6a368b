//! IBM Quantum Platform API client.
//!
//! This module implements the IBM Quantum Cloud REST API for:
//! - Listing devices and selecting the least busy one
//! - Submitting batched jobs (Qiskit Runtime Sampler V2)
//! - Polling job status and retrieving per-register results
//!
//! Device listing and job submission retry transient failures (network
//! errors and 5xx responses) with exponential backoff before giving up.

use reqwest::{Client, header};
use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use crate::error::{IbmError, IbmResult};

/// Default IBM Quantum Cloud API endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://quantum.cloud.ibm.com/api";

/// User-Agent sent with requests (Cloudflare blocks default reqwest UA).
const USER_AGENT: &str = "bifrost/0.3.2 (quantum-sdk; +https://github.com/bifrost-q/bifrost)";

/// Attempts for retryable requests (device list, submission).
const MAX_ATTEMPTS: u32 = 3;

/// Initial backoff between retries; doubles per attempt.
const RETRY_BACKOFF: Duration = Duration::from_millis(500);

/// IBM Quantum API client.
pub struct IbmClient {
    /// HTTP client.
    client: Client,
    /// API endpoint URL.
    endpoint: String,
}

impl fmt::Debug for IbmClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IbmClient")
            .field("endpoint", &self.endpoint)
            .field("token", &"[REDACTED]")
            .finish()
    }
}

impl IbmClient {
    /// Create a new IBM Quantum client.
    pub fn new(endpoint: impl Into<String>, token: &str) -> IbmResult<Self> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            header::HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|_| IbmError::InvalidToken)?,
        );
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json"),
        );

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .timeout(Duration::from_secs(60))
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    /// Create a client against the default endpoint, reading the token from
    /// the `IBM_QUANTUM_TOKEN` environment variable.
    pub fn from_env() -> IbmResult<Self> {
        let token = std::env::var("IBM_QUANTUM_TOKEN").map_err(|_| IbmError::MissingToken)?;
        Self::new(DEFAULT_ENDPOINT, &token)
    }

    /// List available devices.
    pub async fn list_devices(&self) -> IbmResult<Vec<DeviceInfo>> {
        let url = format!("{}/v1/backends", self.endpoint);

        let response = self.get_with_retry(&url).await?;
        let devices: DevicesResponse = response.json().await?;
        Ok(devices.devices)
    }

    /// Get details for a specific device.
    pub async fn get_device(&self, name: &str) -> IbmResult<DeviceInfo> {
        let url = format!("{}/v1/backends/{}", self.endpoint, name);

        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            if response.status() == reqwest::StatusCode::NOT_FOUND {
                return Err(IbmError::BackendUnavailable(name.to_string()));
            }
            return Err(api_error(response).await);
        }

        response.json().await.map_err(IbmError::from)
    }

    /// Pick the operational non-simulator device with the shortest queue.
    ///
    /// Ties break on device name so selection is deterministic.
    pub async fn least_busy(&self) -> IbmResult<DeviceInfo> {
        let devices = self.list_devices().await?;

        devices
            .into_iter()
            .filter(|d| d.status.operational && !d.simulator)
            .min_by(|a, b| {
                let qa = a.status.pending_jobs.unwrap_or(u32::MAX);
                let qb = b.status.pending_jobs.unwrap_or(u32::MAX);
                qa.cmp(&qb).then_with(|| a.name.cmp(&b.name))
            })
            .ok_or(IbmError::NoDeviceAvailable)
    }

    /// Submit a batch of circuits using the Sampler V2 primitive.
    ///
    /// Each circuit becomes one PUB `(qasm, params, shots)`. Results come
    /// back in PUB order.
    pub async fn submit_sampler_job(
        &self,
        backend: &str,
        circuits: Vec<String>,
        shots: u32,
    ) -> IbmResult<SubmitResponse> {
        let url = format!("{}/v1/jobs", self.endpoint);

        let pubs: Vec<serde_json::Value> = circuits
            .into_iter()
            .map(|c| serde_json::json!([c, {}, shots]))
            .collect();

        let body = serde_json::json!({
            "program_id": "sampler",
            "backend": backend,
            "params": {
                "version": 2,
                "pubs": pubs,
                "options": {
                    // Dynamic circuits need the provider's routing pass.
                    "optimization_level": 1
                }
            }
        });

        let mut last_err = String::new();
        for attempt in 0..MAX_ATTEMPTS {
            if attempt > 0 {
                tokio::time::sleep(RETRY_BACKOFF * 2u32.pow(attempt - 1)).await;
                tracing::debug!(attempt, "retrying job submission");
            }

            match self.client.post(&url).json(&body).send().await {
                Ok(response) if response.status().is_success() => {
                    return response.json().await.map_err(IbmError::from);
                }
                Ok(response) if response.status().is_server_error() => {
                    last_err = format!("server returned {}", response.status());
                }
                Ok(response) => return Err(api_error(response).await),
                Err(e) => last_err = e.to_string(),
            }
        }

        Err(IbmError::RetriesExhausted {
            attempts: MAX_ATTEMPTS,
            message: last_err,
        })
    }

    /// Get job status.
    pub async fn get_job_status(&self, job_id: &str) -> IbmResult<JobStatusResponse> {
        let url = format!("{}/v1/jobs/{}", self.endpoint, job_id);

        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            if response.status() == reqwest::StatusCode::NOT_FOUND {
                return Err(IbmError::JobNotFound(job_id.to_string()));
            }
            return Err(api_error(response).await);
        }

        response.json().await.map_err(IbmError::from)
    }

    /// Get job results.
    pub async fn get_job_results(&self, job_id: &str) -> IbmResult<JobResultResponse> {
        let url = format!("{}/v1/jobs/{}/results", self.endpoint, job_id);

        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            if response.status() == reqwest::StatusCode::NOT_FOUND {
                return Err(IbmError::JobNotFound(job_id.to_string()));
            }
            return Err(api_error(response).await);
        }

        response.json().await.map_err(IbmError::from)
    }

    /// Cancel a job.
    pub async fn cancel_job(&self, job_id: &str) -> IbmResult<()> {
        let url = format!("{}/v1/jobs/{}/cancel", self.endpoint, job_id);

        let response = self.client.post(&url).send().await?;
        if !response.status().is_success() {
            return Err(api_error(response).await);
        }

        Ok(())
    }

    /// GET with retry on transient failures (network errors, 5xx).
    async fn get_with_retry(&self, url: &str) -> IbmResult<reqwest::Response> {
        let mut last_err = String::new();

        for attempt in 0..MAX_ATTEMPTS {
            if attempt > 0 {
                tokio::time::sleep(RETRY_BACKOFF * 2u32.pow(attempt - 1)).await;
                tracing::debug!(attempt, url, "retrying request");
            }

            match self.client.get(url).send().await {
                Ok(response) if response.status().is_success() => return Ok(response),
                Ok(response) if response.status().is_server_error() => {
                    last_err = format!("server returned {}", response.status());
                }
                Ok(response) => return Err(api_error(response).await),
                Err(e) => last_err = e.to_string(),
            }
        }

        Err(IbmError::RetriesExhausted {
            attempts: MAX_ATTEMPTS,
            message: last_err,
        })
    }
}

/// Turn a non-success response into an `ApiError`.
async fn api_error(response: reqwest::Response) -> IbmError {
    let status = response.status();
    match response.json::<ApiErrorResponse>().await {
        Ok(error) => IbmError::ApiError {
            code: error.code,
            message: error.message,
        },
        Err(_) => IbmError::ApiError {
            code: None,
            message: format!("request failed with status {status}"),
        },
    }
}

// ============================================================================
// Response types
// ============================================================================

/// API error response.
#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    /// Error code.
    #[serde(default)]
    code: Option<String>,
    /// Error message.
    #[serde(default)]
    message: String,
}

/// Device list response (`{"devices": [...]}`).
#[derive(Debug, Deserialize)]
struct DevicesResponse {
    /// List of devices.
    devices: Vec<DeviceInfo>,
}

/// Device information.
#[derive(Debug, Clone, Deserialize)]
pub struct DeviceInfo {
    /// Device name (e.g. "ibm_torino").
    pub name: String,
    /// Number of qubits.
    pub num_qubits: usize,
    /// Device status.
    pub status: DeviceStatus,
    /// Whether this is a simulator.
    #[serde(default)]
    pub simulator: bool,
    /// Maximum number of shots.
    #[serde(default)]
    pub max_shots: Option<u32>,
}

/// Device status.
#[derive(Debug, Clone, Deserialize)]
pub struct DeviceStatus {
    /// Whether the device is operational.
    pub operational: bool,
    /// Status message.
    #[serde(default)]
    pub status_msg: Option<String>,
    /// Number of pending jobs in the device queue.
    #[serde(default)]
    pub pending_jobs: Option<u32>,
}

/// Job submission response.
#[derive(Debug, Deserialize)]
pub struct SubmitResponse {
    /// Job ID.
    pub id: String,
    /// Job status.
    #[serde(default)]
    pub status: String,
}

/// Job status response.
#[derive(Debug, Clone, Deserialize)]
pub struct JobStatusResponse {
    /// Job ID.
    pub id: String,
    /// Job status string (may be mixed case).
    pub status: String,
    /// State object with failure reason.
    #[serde(default)]
    pub state: Option<JobState>,
}

/// Job state with reason.
#[derive(Debug, Clone, Deserialize)]
pub struct JobState {
    /// Status string.
    #[serde(default)]
    pub status: String,
    /// Reason for failure.
    #[serde(default)]
    pub reason: Option<String>,
}

impl JobStatusResponse {
    fn normalized_status(&self) -> String {
        self.status.to_uppercase()
    }

    /// Check if job completed successfully.
    pub fn is_completed(&self) -> bool {
        self.normalized_status() == "COMPLETED"
    }

    /// Check if job failed.
    pub fn is_failed(&self) -> bool {
        matches!(self.normalized_status().as_str(), "FAILED" | "ERROR")
    }

    /// Check if job was cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.normalized_status() == "CANCELLED"
    }

    /// Get the failure reason message.
    pub fn error_message(&self) -> Option<String> {
        self.state.as_ref().and_then(|s| s.reason.clone())
    }
}

/// Job result response.
#[derive(Debug, Deserialize)]
pub struct JobResultResponse {
    /// One result per submitted PUB, in submission order.
    pub results: Vec<SamplerResult>,
}

/// Sampler V2 result for one circuit.
#[derive(Debug, Deserialize)]
pub struct SamplerResult {
    /// Map of classical register names to sample data. Each register holds
    /// a `samples` array of hex strings, one per shot, aligned by shot
    /// index across registers.
    #[serde(default)]
    pub data: HashMap<String, ClassicalRegisterData>,
    /// Metadata.
    #[serde(default)]
    pub metadata: Option<serde_json::Value>,
}

/// Classical register data from Sampler V2 results.
#[derive(Debug, Deserialize)]
pub struct ClassicalRegisterData {
    /// Raw measurement samples as hex strings (e.g., `["0x0", "0x2", ...]`).
    pub samples: Vec<String>,
}
