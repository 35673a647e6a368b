//! IBM Quantum backend implementation.

use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

use async_trait::async_trait;
use bifrost_hal::{
    Backend, BackendAvailability, BackendConfig, Capabilities, Counts, ExecutionResult, HalError,
    HalResult, JobId, JobStatus, ValidationResult,
};
use bifrost_ir::Circuit;
use bifrost_qasm3::emit;

use crate::api::{DEFAULT_ENDPOINT, DeviceInfo, IbmClient, SamplerResult};
use crate::error::{IbmError, IbmResult};

/// How long to cache device info before refreshing from the API.
const DEVICE_INFO_TTL: Duration = Duration::from_secs(5 * 60);

/// IBM Quantum backend adapter.
///
/// Submits circuit batches through the Qiskit Runtime Sampler V2 and
/// normalizes its per-register hex samples into [`ExecutionResult`]s.
pub struct IbmBackend {
    /// API client.
    client: Arc<IbmClient>,
    /// Target device name.
    target: String,
    /// Cached capabilities (sync introspection).
    capabilities: Capabilities,
    /// Cached device info with fetch timestamp for TTL-based refresh.
    device_info: Arc<RwLock<Option<(DeviceInfo, Instant)>>>,
}

impl IbmBackend {
    /// Connect to a named IBM Quantum device.
    ///
    /// Reads the API token from the `IBM_QUANTUM_TOKEN` environment
    /// variable and fetches the device's qubit count from the API.
    pub async fn connect(target: impl Into<String>) -> IbmResult<Self> {
        let client = IbmClient::from_env()?;
        let target = target.into();

        let info = client.get_device(&target).await?;
        Ok(Self::from_parts(client, info))
    }

    /// Connect to the least busy operational hardware device.
    ///
    /// Simulators and offline devices are excluded; ties on queue depth
    /// break deterministically on device name.
    pub async fn connect_least_busy() -> IbmResult<Self> {
        let client = IbmClient::from_env()?;

        let info = client.least_busy().await?;
        tracing::info!(device = %info.name, queue = ?info.status.pending_jobs, "selected least busy device");
        Ok(Self::from_parts(client, info))
    }

    /// Create a backend with explicit configuration.
    pub async fn with_config(config: BackendConfig) -> IbmResult<Self> {
        let endpoint = config.endpoint.as_deref().unwrap_or(DEFAULT_ENDPOINT);
        let token = config.token.as_ref().ok_or(IbmError::MissingToken)?;
        let client = IbmClient::new(endpoint, token)?;

        let info = match config.extra.get("backend").and_then(|v| v.as_str()) {
            Some(name) => client.get_device(name).await?,
            None => client.least_busy().await?,
        };

        Ok(Self::from_parts(client, info))
    }

    fn from_parts(client: IbmClient, info: DeviceInfo) -> Self {
        let mut capabilities = Capabilities::ibm(&info.name, info.num_qubits as u32);
        if let Some(max_shots) = info.max_shots {
            capabilities.max_shots = max_shots;
        }

        Self {
            client: Arc::new(client),
            target: info.name.clone(),
            capabilities,
            device_info: Arc::new(RwLock::new(Some((info, Instant::now())))),
        }
    }

    /// Get the target device name.
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Get device information, refreshing from the API when stale.
    async fn get_device_info(&self) -> IbmResult<DeviceInfo> {
        {
            let cached = self.device_info.read().await;
            if let Some((ref info, fetched_at)) = *cached {
                if fetched_at.elapsed() < DEVICE_INFO_TTL {
                    return Ok(info.clone());
                }
            }
        }

        let info = self.client.get_device(&self.target).await?;

        {
            let mut cached = self.device_info.write().await;
            *cached = Some((info.clone(), Instant::now()));
        }

        Ok(info)
    }

    /// Convert a circuit to `OpenQASM` 3.0 source.
    ///
    /// Adds `include "stdgates.inc";` after the version header so that
    /// IBM's QASM loader can resolve standard gate definitions.
    fn circuit_to_qasm(circuit: &Circuit) -> IbmResult<String> {
        let qasm = emit(circuit).map_err(|e| IbmError::CircuitError(e.to_string()))?;
        Ok(qasm.replacen(
            "OPENQASM 3.0;",
            "OPENQASM 3.0;\ninclude \"stdgates.inc\";",
            1,
        ))
    }

    /// Convert one Sampler V2 result into an [`ExecutionResult`].
    ///
    /// Each classical register arrives as a hex sample array, one entry per
    /// shot, aligned by shot index across registers. Per-register counts
    /// are decoded directly; combined counts are rebuilt shot by shot with
    /// registers concatenated in reverse name order so the output label is
    /// deterministic.
    fn result_from_sampler(result: &SamplerResult, shots: u32) -> ExecutionResult {
        let mut names: Vec<&String> = result.data.keys().collect();
        names.sort();

        // Per-register counts.
        let mut registers: Vec<(String, Vec<String>, usize)> = Vec::with_capacity(names.len());
        let mut execution = ExecutionResult::new(Counts::new(), shots);

        for name in &names {
            let samples = &result.data[*name].samples;
            let width = infer_bit_width(samples);

            let mut counts = Counts::new();
            for sample in samples {
                counts.record(hex_to_binary(sample, width));
            }
            execution = execution.with_register((*name).clone(), counts);
            registers.push(((*name).clone(), samples.clone(), width));
        }

        // Combined counts, shot-aligned across registers.
        let num_shots = registers.first().map_or(0, |(_, samples, _)| samples.len());
        let mut combined = Counts::new();
        for shot in 0..num_shots {
            let label: String = registers
                .iter()
                .rev()
                .filter_map(|(_, samples, width)| {
                    samples.get(shot).map(|s| hex_to_binary(s, *width))
                })
                .collect();
            combined.record(label);
        }
        execution.counts = combined;

        execution
    }
}

/// Infer the classical register bit width from the V2 hex samples.
///
/// Finds the maximum value across all samples and uses its bit length.
/// For example, if samples contain "0x3" the max is 3, which needs 2 bits.
/// Falls back to 1 if all samples are zero.
fn infer_bit_width(samples: &[String]) -> usize {
    let max_val = samples
        .iter()
        .filter_map(|s| {
            let hex = s.strip_prefix("0x").unwrap_or(s);
            u64::from_str_radix(hex, 16).ok()
        })
        .max()
        .unwrap_or(0);

    if max_val == 0 {
        1
    } else {
        64 - max_val.leading_zeros() as usize
    }
}

/// Convert hex string to binary string, padded to `width`.
///
/// If `width` is 0 the width falls back to 4 bits per hex digit.
fn hex_to_binary(hex: &str, width: usize) -> String {
    let hex = hex.strip_prefix("0x").unwrap_or(hex);

    if let Ok(value) = u64::from_str_radix(hex, 16) {
        let width = if width > 0 { width } else { hex.len() * 4 };
        format!("{value:0>width$b}")
    } else {
        // If not hex, assume it's already binary
        hex.to_string()
    }
}

#[async_trait]
impl Backend for IbmBackend {
    fn name(&self) -> &str {
        &self.capabilities.name
    }

    fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    async fn availability(&self) -> HalResult<BackendAvailability> {
        match self.get_device_info().await {
            Ok(info) => {
                if info.status.operational {
                    Ok(BackendAvailability {
                        is_available: true,
                        queue_depth: info.status.pending_jobs,
                        estimated_wait: None,
                        status_message: info.status.status_msg,
                    })
                } else {
                    Ok(BackendAvailability::unavailable(
                        info.status
                            .status_msg
                            .unwrap_or_else(|| "device offline".to_string()),
                    ))
                }
            }
            Err(e) => {
                tracing::warn!("IBM availability check failed: {e}");
                Ok(BackendAvailability::unavailable("failed to query device"))
            }
        }
    }

    async fn validate(&self, circuit: &Circuit) -> HalResult<ValidationResult> {
        let caps = self.capabilities();
        let mut reasons = Vec::new();

        if circuit.num_qubits() > caps.num_qubits as usize {
            reasons.push(format!(
                "circuit requires {} qubits but device has {}",
                circuit.num_qubits(),
                caps.num_qubits
            ));
        }

        for instruction in circuit.instructions() {
            if let Some(gate) = instruction.as_gate() {
                if !caps.gate_set.supports(gate.name()) {
                    reasons.push(format!("unsupported gate: {}", gate.name()));
                    break;
                }
            }
        }

        if circuit.has_conditional_gates() && !caps.supports_dynamic_circuits() {
            reasons.push("device does not support dynamic circuits".into());
        }

        if reasons.is_empty() {
            Ok(ValidationResult::Valid)
        } else {
            Ok(ValidationResult::Invalid { reasons })
        }
    }

    async fn submit(&self, circuits: &[Circuit], shots: u32) -> HalResult<JobId> {
        if circuits.is_empty() {
            return Err(HalError::SubmissionFailed("empty circuit batch".into()));
        }
        if shots == 0 {
            return Err(HalError::InvalidShots("shots must be positive".into()));
        }

        let info = self
            .get_device_info()
            .await
            .map_err(|e| HalError::Backend(e.to_string()))?;

        if !info.status.operational {
            return Err(HalError::BackendUnavailable(
                info.status
                    .status_msg
                    .unwrap_or_else(|| "device offline".to_string()),
            ));
        }

        for circuit in circuits {
            if circuit.num_qubits() > info.num_qubits {
                return Err(HalError::InvalidCircuit(format!(
                    "circuit '{}' requires {} qubits but device has {}",
                    circuit.name(),
                    circuit.num_qubits(),
                    info.num_qubits
                )));
            }
        }

        let qasm: Vec<String> = circuits
            .iter()
            .map(|c| Self::circuit_to_qasm(c).map_err(|e| HalError::InvalidCircuit(e.to_string())))
            .collect::<HalResult<_>>()?;

        let response = self
            .client
            .submit_sampler_job(&self.target, qasm, shots)
            .await
            .map_err(|e| HalError::SubmissionFailed(e.to_string()))?;

        tracing::info!(job_id = %response.id, device = %self.target, "submitted batch");
        Ok(JobId(response.id))
    }

    async fn status(&self, job_id: &JobId) -> HalResult<JobStatus> {
        let status = self
            .client
            .get_job_status(&job_id.0)
            .await
            .map_err(|e| match e {
                IbmError::JobNotFound(id) => HalError::JobNotFound(id),
                other => HalError::Backend(other.to_string()),
            })?;

        let job_status = match status.status.to_uppercase().as_str() {
            "QUEUED" => JobStatus::Queued,
            "VALIDATING" | "RUNNING" => JobStatus::Running,
            "COMPLETED" => JobStatus::Completed,
            "FAILED" | "ERROR" => {
                let msg = status
                    .error_message()
                    .unwrap_or_else(|| "unknown error".to_string());
                JobStatus::Failed(msg)
            }
            "CANCELLED" => JobStatus::Cancelled,
            // Treat unknown as running
            _ => JobStatus::Running,
        };

        Ok(job_status)
    }

    async fn results(&self, job_id: &JobId) -> HalResult<Vec<ExecutionResult>> {
        let status = self
            .client
            .get_job_status(&job_id.0)
            .await
            .map_err(|e| HalError::Backend(e.to_string()))?;

        if !status.is_completed() {
            if status.is_failed() {
                let msg = status
                    .error_message()
                    .unwrap_or_else(|| "job failed".to_string());
                return Err(HalError::JobFailed(msg));
            }
            if status.is_cancelled() {
                return Err(HalError::JobCancelled);
            }
            return Err(HalError::ResultsNotReady(job_id.0.clone()));
        }

        let response = self
            .client
            .get_job_results(&job_id.0)
            .await
            .map_err(|e| HalError::Backend(e.to_string()))?;

        Ok(response
            .results
            .iter()
            .map(|r| {
                let shots = r
                    .data
                    .values()
                    .next()
                    .map_or(0, |reg| reg.samples.len() as u32);
                Self::result_from_sampler(r, shots)
            })
            .collect())
    }

    async fn cancel(&self, job_id: &JobId) -> HalResult<()> {
        self.client
            .cancel_job(&job_id.0)
            .await
            .map_err(|e| HalError::Backend(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ClassicalRegisterData;
    use std::collections::HashMap;

    #[test]
    fn test_hex_to_binary() {
        // With width=0, falls back to hex-digit heuristic (4 bits per digit)
        assert_eq!(hex_to_binary("0x0", 0), "0000");
        assert_eq!(hex_to_binary("0x3", 0), "0011");
        assert_eq!(hex_to_binary("0xff", 0), "11111111");
        assert_eq!(hex_to_binary("3", 0), "0011");

        // With explicit width, pads to correct width
        assert_eq!(hex_to_binary("0x1", 5), "00001");
        assert_eq!(hex_to_binary("0x3", 8), "00000011");
    }

    #[test]
    fn test_infer_bit_width() {
        let samples: Vec<String> = vec!["0x0".into(), "0x3".into(), "0x0".into()];
        assert_eq!(infer_bit_width(&samples), 2);

        let samples: Vec<String> = vec!["0x0".into(), "0x7".into()];
        assert_eq!(infer_bit_width(&samples), 3);

        let samples: Vec<String> = vec!["0x0".into(), "0x0".into()];
        assert_eq!(infer_bit_width(&samples), 1);

        let samples: Vec<String> = vec!["0x0".into(), "0x1".into()];
        assert_eq!(infer_bit_width(&samples), 1);
    }

    #[test]
    fn test_result_from_sampler_per_register() {
        let mut data = HashMap::new();
        data.insert(
            "tomo".to_string(),
            ClassicalRegisterData {
                samples: vec!["0x0".into(), "0x1".into(), "0x0".into(), "0x0".into()],
            },
        );
        data.insert(
            "crz".to_string(),
            ClassicalRegisterData {
                samples: vec!["0x1".into(), "0x0".into(), "0x1".into(), "0x1".into()],
            },
        );

        let result = SamplerResult {
            data,
            metadata: None,
        };

        let execution = IbmBackend::result_from_sampler(&result, 4);
        assert_eq!(execution.shots, 4);

        let tomo = execution.register("tomo").unwrap();
        assert_eq!(tomo.get("0"), 3);
        assert_eq!(tomo.get("1"), 1);

        let crz = execution.register("crz").unwrap();
        assert_eq!(crz.get("1"), 3);

        // Combined labels: registers in reverse name order, tomo leftmost.
        assert_eq!(execution.counts.get("01"), 3);
        assert_eq!(execution.counts.get("10"), 1);
        assert_eq!(execution.counts.total_shots(), 4);
    }

    #[test]
    fn test_result_from_sampler_all_zeros() {
        let mut data = HashMap::new();
        data.insert(
            "c".to_string(),
            ClassicalRegisterData {
                samples: vec!["0x0".into(), "0x0".into(), "0x0".into()],
            },
        );

        let result = SamplerResult {
            data,
            metadata: None,
        };

        let execution = IbmBackend::result_from_sampler(&result, 3);
        assert_eq!(execution.register("c").unwrap().get("0"), 3);
        assert_eq!(execution.counts.get("0"), 3);
    }
}
