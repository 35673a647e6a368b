//! Bifrost Hardware Abstraction Layer
//!
//! This crate provides a unified interface for interacting with quantum
//! backends, so the tomography layer can target a local simulator and a
//! remote queued device through the same trait.
//!
//! # Overview
//!
//! The HAL abstracts away backend-specific details, providing:
//! - A common [`Backend`] trait for batch job submission and management
//! - [`Capabilities`] to describe hardware features and constraints
//! - Unified result handling via [`ExecutionResult`] and [`Counts`]
//!
//! # Supported Backends
//!
//! | Backend | Crate | Authentication |
//! |---------|-------|----------------|
//! | Local Simulator | `bifrost-adapter-sim` | None |
//! | IBM Quantum | `bifrost-adapter-ibm` | `IBM_QUANTUM_TOKEN` env var |
//!
//! # Example: Running a Circuit
//!
//! ```ignore
//! use bifrost_hal::Backend;
//! use bifrost_adapter_sim::SimulatorBackend;
//! use bifrost_ir::Circuit;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let circuit = Circuit::bell()?;
//!     let backend = SimulatorBackend::new();
//!
//!     // Batch of one; tomography submits three.
//!     let job_id = backend.submit(std::slice::from_ref(&circuit), 1000).await?;
//!     println!("Job submitted: {}", job_id);
//!
//!     let results = backend.wait(&job_id).await?;
//!     if let Some((bitstring, count)) = results[0].counts.most_frequent() {
//!         println!("Most frequent: {} ({} times)", bitstring, count);
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod backend;
pub mod capability;
pub mod error;
pub mod job;
pub mod result;

pub use backend::{Backend, BackendAvailability, BackendConfig, ValidationResult};
pub use capability::{Capabilities, GateSet};
pub use error::{HalError, HalResult};
pub use job::{Job, JobId, JobStatus};
pub use result::{Counts, ExecutionResult};
