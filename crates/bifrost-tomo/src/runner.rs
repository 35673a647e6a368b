//! End-to-end tomography execution against a [`Backend`].

use std::time::Duration;

use bifrost_hal::{Backend, Counts, ExecutionResult, JobId};
use tracing::{debug, info};

use crate::basis::{CREG_TOMO, MeasurementBasis, tomography_circuits};
use crate::bloch::BlochVector;
use crate::error::{TomoError, TomoResult};
use crate::expectation::expectation;
use crate::protocol::StatePrep;

/// Default shot count per basis circuit.
pub const DEFAULT_SHOTS: u32 = 4096;

/// Default wall-clock budget for one tomography job.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);

/// Outcome of one full tomography run.
#[derive(Debug, Clone)]
pub struct TomographyOutcome {
    /// Estimated Bloch vector of the teleported state.
    pub bloch: BlochVector,
    /// Job that produced the result, for provenance.
    pub job_id: JobId,
    /// Name of the backend that executed the circuits.
    pub backend: String,
    /// Shots per basis circuit.
    pub shots: u32,
}

/// Runs the three-axis teleportation tomography against one backend.
///
/// The three basis circuits are submitted as a single batch so they share
/// one queue slot and calibration window. Construct with [`new`], adjust
/// with the builder methods, then call [`run`].
///
/// [`new`]: TomographyRunner::new
/// [`run`]: TomographyRunner::run
pub struct TomographyRunner<'a> {
    backend: &'a dyn Backend,
    prep: StatePrep,
    shots: u32,
    timeout: Duration,
}

impl<'a> TomographyRunner<'a> {
    /// Create a runner with the default preparation, shots, and timeout.
    pub fn new(backend: &'a dyn Backend) -> Self {
        Self {
            backend,
            prep: StatePrep::default(),
            shots: DEFAULT_SHOTS,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Set the state preparation to teleport.
    #[must_use]
    pub fn with_prep(mut self, prep: StatePrep) -> Self {
        self.prep = prep;
        self
    }

    /// Set the shot count per basis circuit.
    #[must_use]
    pub fn with_shots(mut self, shots: u32) -> Self {
        self.shots = shots;
        self
    }

    /// Set the wall-clock budget for job completion. Hardware queues
    /// routinely need more than [`DEFAULT_TIMEOUT`].
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Build, submit, and reduce the three basis circuits to a Bloch vector.
    pub async fn run(&self) -> TomoResult<TomographyOutcome> {
        if self.shots == 0 {
            return Err(TomoError::ZeroShots);
        }

        let circuits = tomography_circuits(&self.prep)?;
        let job_id = self.backend.submit(&circuits, self.shots).await?;
        info!(
            backend = self.backend.name(),
            job_id = %job_id,
            shots = self.shots,
            "submitted tomography batch"
        );

        let results = match self.backend.wait_timeout(&job_id, self.timeout).await {
            Ok(results) => results,
            Err(bifrost_hal::HalError::JobFailed(message)) => {
                return Err(TomoError::JobFailed {
                    job_id: job_id.0.clone(),
                    message,
                });
            }
            Err(e) => return Err(e.into()),
        };
        if results.len() != circuits.len() {
            return Err(TomoError::ResultCountMismatch {
                expected: circuits.len(),
                got: results.len(),
            });
        }

        let mut components = [0.0f64; 3];
        for (i, (basis, result)) in MeasurementBasis::ALL.iter().zip(&results).enumerate() {
            let value = axis_expectation(result, self.shots)?;
            debug!(basis = %basis, value, "axis expectation");
            components[i] = value;
        }

        Ok(TomographyOutcome {
            bloch: BlochVector::new(components[0], components[1], components[2]),
            job_id,
            backend: self.backend.name().to_string(),
            shots: self.shots,
        })
    }
}

/// Reduce one basis circuit's result to its Pauli expectation value.
///
/// Reads the per-register counts for the tomography register when the
/// backend provides them. Falling back to combined counts is equivalent:
/// the tomography register is declared last, so its bit is the leftmost
/// character of a combined MSB-first label, which is designated bit 0.
pub fn axis_expectation(result: &ExecutionResult, shots: u32) -> TomoResult<f64> {
    let counts: &Counts = match result.register(CREG_TOMO) {
        Some(counts) => counts,
        None => &result.counts,
    };
    expectation(counts, 0, shots)
}
