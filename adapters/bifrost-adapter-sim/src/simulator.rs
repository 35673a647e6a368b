//! Simulator backend implementation.

use async_trait::async_trait;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rustc_hash::FxHashMap;
use std::sync::{Arc, Mutex};
use std::time::Instant;
use tracing::{debug, instrument};
use uuid::Uuid;

use bifrost_hal::{
    Backend, BackendAvailability, BackendConfig, Capabilities, Counts, ExecutionResult, HalError,
    HalResult, Job, JobId, JobStatus, ValidationResult,
};
use bifrost_ir::{Circuit, ClbitId, InstructionKind};

use crate::statevector::Statevector;

/// Job data for the simulator.
struct SimJob {
    job: Job,
    results: Option<Vec<ExecutionResult>>,
}

/// Local statevector simulator backend.
///
/// Supports circuits up to ~20 qubits (limited by memory), including
/// dynamic circuits: measurements collapse the state mid-circuit and
/// classically conditioned gates are evaluated per shot against the
/// classical register contents at that point.
pub struct SimulatorBackend {
    /// Backend configuration.
    config: BackendConfig,
    /// Cached capabilities.
    capabilities: Capabilities,
    /// Active jobs.
    jobs: Arc<Mutex<FxHashMap<String, SimJob>>>,
    /// Fixed RNG seed for reproducible sampling, if set.
    seed: Option<u64>,
}

impl SimulatorBackend {
    /// Create a new simulator backend with default settings.
    pub fn new() -> Self {
        Self::with_max_qubits(20)
    }

    /// Create a simulator with custom max qubits.
    pub fn with_max_qubits(max_qubits: u32) -> Self {
        Self {
            config: BackendConfig::new("simulator"),
            capabilities: Capabilities::simulator(max_qubits),
            jobs: Arc::new(Mutex::new(FxHashMap::default())),
            seed: None,
        }
    }

    /// Fix the RNG seed so sampling is reproducible across runs.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Run one circuit for `shots` shots.
    #[instrument(skip(self, circuit, rng), fields(circuit = circuit.name()))]
    fn run_circuit(&self, circuit: &Circuit, shots: u32, rng: &mut StdRng) -> ExecutionResult {
        let start = Instant::now();

        let num_qubits = circuit.num_qubits();
        let num_clbits = circuit.num_clbits();
        debug!(num_qubits, num_clbits, shots, "starting simulation");

        let mut counts = Counts::new();

        for _ in 0..shots {
            let bits = self.run_shot(circuit, rng);

            // Combined label, MSB-first: highest clbit id leftmost.
            let label: String = bits
                .iter()
                .rev()
                .map(|b| if *b == 1 { '1' } else { '0' })
                .collect();
            counts.record(label);
        }

        let elapsed = start.elapsed();
        debug!(?elapsed, "simulation completed");

        let mut result =
            ExecutionResult::new(counts, shots).with_execution_time(elapsed.as_millis() as u64);

        for (name, bits) in circuit.cregs() {
            let indices: Vec<u32> = bits.iter().map(|b| b.0).collect();
            let per_register = result.counts.marginalize(&indices);
            result = result.with_register(name, per_register);
        }

        result
    }

    /// Execute the instruction list once, returning the classical bits.
    fn run_shot(&self, circuit: &Circuit, rng: &mut StdRng) -> Vec<u8> {
        let mut sv = Statevector::new(circuit.num_qubits());
        let mut bits = vec![0u8; circuit.num_clbits()];

        for instruction in circuit.instructions() {
            match &instruction.kind {
                InstructionKind::Gate(gate) => {
                    if let Some(condition) = &gate.condition {
                        let value = register_value(circuit, &condition.register, &bits);
                        if value != condition.value {
                            continue;
                        }
                    }
                    let qubits: Vec<_> =
                        instruction.qubits.iter().map(|q| q.0 as usize).collect();
                    sv.apply_gate(&gate.kind, &qubits);
                }
                InstructionKind::Measure => {
                    let qubit = instruction.qubits[0].0 as usize;
                    let clbit = instruction.clbits[0].0 as usize;
                    bits[clbit] = sv.measure(qubit, rng);
                }
                InstructionKind::Barrier => {}
            }
        }

        bits
    }

    fn make_rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }
}

/// Read a classical register as an unsigned integer, bit 0 least significant.
fn register_value(circuit: &Circuit, register: &str, bits: &[u8]) -> u64 {
    let reg_bits: Vec<ClbitId> = circuit.creg(register).unwrap_or_default();
    reg_bits
        .iter()
        .enumerate()
        .map(|(i, clbit)| u64::from(bits[clbit.0 as usize]) << i)
        .sum()
}

impl Default for SimulatorBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Backend for SimulatorBackend {
    fn name(&self) -> &str {
        &self.config.name
    }

    fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    async fn availability(&self) -> HalResult<BackendAvailability> {
        Ok(BackendAvailability::always_available())
    }

    async fn validate(&self, circuit: &Circuit) -> HalResult<ValidationResult> {
        let mut reasons = vec![];

        if circuit.num_qubits() > self.capabilities.num_qubits as usize {
            reasons.push(format!(
                "circuit has {} qubits but simulator supports {}",
                circuit.num_qubits(),
                self.capabilities.num_qubits
            ));
        }

        for instruction in circuit.instructions() {
            if let Some(gate) = instruction.as_gate() {
                if !self.capabilities.gate_set.supports(gate.name()) {
                    reasons.push(format!("unsupported gate '{}'", gate.name()));
                }
            }
        }

        if reasons.is_empty() {
            Ok(ValidationResult::Valid)
        } else {
            Ok(ValidationResult::Invalid { reasons })
        }
    }

    #[instrument(skip(self, circuits))]
    async fn submit(&self, circuits: &[Circuit], shots: u32) -> HalResult<JobId> {
        if circuits.is_empty() {
            return Err(HalError::SubmissionFailed("empty circuit batch".into()));
        }
        if shots == 0 {
            return Err(HalError::InvalidShots("shots must be positive".into()));
        }

        for circuit in circuits {
            if circuit.num_qubits() > self.capabilities.num_qubits as usize {
                return Err(HalError::InvalidCircuit(format!(
                    "circuit '{}' has {} qubits but simulator supports {}",
                    circuit.name(),
                    circuit.num_qubits(),
                    self.capabilities.num_qubits
                )));
            }
        }

        let job_id = JobId::new(Uuid::new_v4().to_string());
        let job = Job::new(job_id.clone(), circuits.len() as u32, shots).with_backend("simulator");

        {
            let mut jobs = self
                .jobs
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner);
            jobs.insert(job_id.0.clone(), SimJob { job, results: None });
        }

        debug!(job_id = %job_id, num_circuits = circuits.len(), "submitted job");

        // Run synchronously; the whole batch shares one RNG stream so a
        // fixed seed reproduces the full run.
        let mut rng = self.make_rng();
        let results: Vec<_> = circuits
            .iter()
            .map(|c| self.run_circuit(c, shots, &mut rng))
            .collect();

        {
            let mut jobs = self
                .jobs
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner);
            if let Some(sim_job) = jobs.get_mut(&job_id.0) {
                sim_job.results = Some(results);
                sim_job.job = sim_job.job.clone().with_status(JobStatus::Completed);
            }
        }

        Ok(job_id)
    }

    async fn status(&self, job_id: &JobId) -> HalResult<JobStatus> {
        let jobs = self
            .jobs
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        jobs.get(&job_id.0)
            .map(|j| j.job.status.clone())
            .ok_or_else(|| HalError::JobNotFound(job_id.0.clone()))
    }

    async fn results(&self, job_id: &JobId) -> HalResult<Vec<ExecutionResult>> {
        let jobs = self
            .jobs
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let sim_job = jobs
            .get(&job_id.0)
            .ok_or_else(|| HalError::JobNotFound(job_id.0.clone()))?;
        sim_job
            .results
            .clone()
            .ok_or_else(|| HalError::ResultsNotReady(job_id.0.clone()))
    }

    async fn cancel(&self, job_id: &JobId) -> HalResult<()> {
        let mut jobs = self
            .jobs
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        if let Some(sim_job) = jobs.get_mut(&job_id.0) {
            if !sim_job.job.status.is_terminal() {
                sim_job.job = sim_job.job.clone().with_status(JobStatus::Cancelled);
            }
            Ok(())
        } else {
            Err(HalError::JobNotFound(job_id.0.clone()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bifrost_ir::{ClassicalCondition, StandardGate};

    #[test]
    fn test_simulator_capabilities() {
        let backend = SimulatorBackend::new();
        let caps = backend.capabilities();

        assert!(caps.is_simulator);
        assert_eq!(caps.num_qubits, 20);
        assert!(caps.supports_dynamic_circuits());
    }

    #[tokio::test]
    async fn test_simulator_bell_state() {
        let backend = SimulatorBackend::new();

        let circuit = Circuit::bell().unwrap();
        let job_id = backend
            .submit(std::slice::from_ref(&circuit), 1000)
            .await
            .unwrap();

        let status = backend.status(&job_id).await.unwrap();
        assert!(status.is_success());

        let results = backend.results(&job_id).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].shots, 1000);

        // Bell state should produce only 00 and 11
        let counts = &results[0].counts;
        assert_eq!(counts.get("00") + counts.get("11"), 1000);
        assert_eq!(counts.get("01") + counts.get("10"), 0);
    }

    #[tokio::test]
    async fn test_batch_preserves_order() {
        let backend = SimulatorBackend::new();

        let mut zero = Circuit::with_size("zero", 1, 1);
        zero.measure(0.into(), 0.into()).unwrap();

        let mut one = Circuit::with_size("one", 1, 1);
        one.x(0.into()).unwrap();
        one.measure(0.into(), 0.into()).unwrap();

        let job_id = backend.submit(&[zero, one], 100).await.unwrap();
        let results = backend.wait(&job_id).await.unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].counts.get("0"), 100);
        assert_eq!(results[1].counts.get("1"), 100);
    }

    #[tokio::test]
    async fn test_conditional_gate_applies_per_shot() {
        let backend = SimulatorBackend::new();

        // Entangle two qubits, measure the first, then flip the second
        // iff the first read 1. The second must then always read 0.
        let mut circuit = Circuit::new("dyn");
        let q = circuit.add_qreg("q", 2);
        let c = circuit.add_creg("c", 1).unwrap();
        let out = circuit.add_creg("out", 1).unwrap();

        circuit.h(q[0]).unwrap();
        circuit.cx(q[0], q[1]).unwrap();
        circuit.measure(q[0], c[0]).unwrap();
        circuit
            .gate_if(StandardGate::X, [q[1]], ClassicalCondition::new("c", 1))
            .unwrap();
        circuit.measure(q[1], out[0]).unwrap();

        let job_id = backend
            .submit(std::slice::from_ref(&circuit), 500)
            .await
            .unwrap();
        let results = backend.wait(&job_id).await.unwrap();

        let out_counts = results[0].register("out").unwrap();
        assert_eq!(out_counts.get("0"), 500);

        // The control register must still show both outcomes.
        let c_counts = results[0].register("c").unwrap();
        assert!(c_counts.get("0") > 0);
        assert!(c_counts.get("1") > 0);
    }

    #[tokio::test]
    async fn test_seeded_runs_reproduce() {
        let mut circuit = Circuit::with_size("coin", 1, 1);
        circuit.h(0.into()).unwrap();
        circuit.measure(0.into(), 0.into()).unwrap();

        let backend_a = SimulatorBackend::new().with_seed(1234);
        let backend_b = SimulatorBackend::new().with_seed(1234);

        let id_a = backend_a
            .submit(std::slice::from_ref(&circuit), 256)
            .await
            .unwrap();
        let id_b = backend_b
            .submit(std::slice::from_ref(&circuit), 256)
            .await
            .unwrap();

        let a = backend_a.results(&id_a).await.unwrap();
        let b = backend_b.results(&id_b).await.unwrap();
        assert_eq!(a[0].counts, b[0].counts);
    }

    #[tokio::test]
    async fn test_zero_shots_rejected() {
        let backend = SimulatorBackend::new();
        let circuit = Circuit::bell().unwrap();
        let result = backend.submit(std::slice::from_ref(&circuit), 0).await;
        assert!(matches!(result, Err(HalError::InvalidShots(_))));
    }

    #[tokio::test]
    async fn test_empty_batch_rejected() {
        let backend = SimulatorBackend::new();
        let result = backend.submit(&[], 100).await;
        assert!(matches!(result, Err(HalError::SubmissionFailed(_))));
    }

    #[tokio::test]
    async fn test_too_many_qubits() {
        let backend = SimulatorBackend::with_max_qubits(5);
        let circuit = Circuit::with_size("big", 10, 0);
        let result = backend.submit(std::slice::from_ref(&circuit), 100).await;
        assert!(matches!(result, Err(HalError::InvalidCircuit(_))));
    }
}
