//! Bifrost Local Statevector Simulator
//!
//! This crate provides a local quantum simulator for testing, development,
//! and small-scale experiments. It uses statevector simulation with
//! per-shot measurement collapse, so dynamic circuits (mid-circuit
//! measurement plus classically conditioned gates) behave exactly as they
//! would on hardware.
//!
//! # Features
//!
//! - **Mid-Circuit Measurement**: Measurements collapse the state and feed
//!   classical registers during the shot
//! - **Dynamic Circuits**: `if (reg == value)` gates evaluated per shot
//! - **Reproducible Sampling**: Optional fixed RNG seed
//! - **Batch Submission**: One job runs many circuits, results in order
//!
//! # Example
//!
//! ```ignore
//! use bifrost_adapter_sim::SimulatorBackend;
//! use bifrost_hal::Backend;
//! use bifrost_ir::Circuit;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let backend = SimulatorBackend::new().with_seed(42);
//!
//!     let circuit = Circuit::bell()?;
//!     let job_id = backend.submit(std::slice::from_ref(&circuit), 1000).await?;
//!     let results = backend.wait(&job_id).await?;
//!
//!     // Expect ~50% |00⟩ and ~50% |11⟩
//!     println!("Results: {:?}", results[0].counts);
//!
//!     Ok(())
//! }
//! ```

mod simulator;
mod statevector;

pub use simulator::SimulatorBackend;
