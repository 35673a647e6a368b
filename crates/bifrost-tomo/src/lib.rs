//! Quantum teleportation with single-qubit state tomography.
//!
//! This crate builds the three-qubit teleportation protocol as a dynamic
//! circuit (classically conditioned corrections inside the circuit), derives
//! the three Pauli-basis measurement variants that share the teleportation
//! prefix, and reduces measurement counts to a Bloch vector estimate of the
//! teleported state.
//!
//! ```no_run
//! use bifrost_adapter_sim::SimulatorBackend;
//! use bifrost_tomo::TomographyRunner;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let backend = SimulatorBackend::new();
//! let outcome = TomographyRunner::new(&backend).run().await?;
//! println!("bloch = {}", outcome.bloch);
//! # Ok(())
//! # }
//! ```

pub mod basis;
pub mod bloch;
pub mod error;
pub mod expectation;
pub mod protocol;
pub mod runner;

pub use basis::{CREG_TOMO, MeasurementBasis, tomography_circuits};
pub use bloch::BlochVector;
pub use error::{TomoError, TomoResult};
pub use expectation::expectation;
pub use protocol::{CREG_X, CREG_Z, StatePrep, teleportation_circuit};
pub use runner::{DEFAULT_SHOTS, DEFAULT_TIMEOUT, TomographyOutcome, TomographyRunner, axis_expectation};
