//! IBM Quantum Backend Adapter for Bifrost
//!
//! This crate connects Bifrost to IBM Quantum hardware through the Qiskit
//! Runtime REST API:
//!
//! - Token authentication via the `IBM_QUANTUM_TOKEN` environment variable
//! - Least-busy device selection over operational non-simulator devices
//! - Batched circuit submission (Sampler V2 PUBs, `OpenQASM` 3.0 payloads)
//! - Per-register result decoding from hex sample arrays
//!
//! Hardware queues are slow; pair `submit()` with
//! [`Backend::wait_timeout`](bifrost_hal::Backend::wait_timeout) and a
//! generous budget.
//!
//! # Example
//!
//! ```ignore
//! use bifrost_adapter_ibm::IbmBackend;
//! use bifrost_hal::Backend;
//!
//! # async fn run(circuits: Vec<bifrost_ir::Circuit>) -> anyhow::Result<()> {
//! let backend = IbmBackend::connect_least_busy().await?;
//! println!("running on {}", backend.target());
//!
//! let job_id = backend.submit(&circuits, 4096).await?;
//! let results = backend
//!     .wait_timeout(&job_id, std::time::Duration::from_secs(3600))
//!     .await?;
//! # Ok(())
//! # }
//! ```

mod api;
mod backend;
mod error;

pub use api::{DeviceInfo, DeviceStatus, IbmClient};
pub use backend::IbmBackend;
pub use error::{IbmError, IbmResult};
