//! `OpenQASM` 3 Emitter for Bifrost
//!
//! This crate serializes Bifrost circuits to `OpenQASM` 3.0 source, the wire
//! format remote backends accept for submission. Dynamic circuits are
//! supported: classically conditioned gates become `if (reg == value)`
//! blocks.
//!
//! # Example
//!
//! ```rust
//! use bifrost_ir::Circuit;
//! use bifrost_qasm3::emit;
//!
//! let circuit = Circuit::bell().unwrap();
//!
//! let qasm = emit(&circuit).unwrap();
//! assert!(qasm.contains("OPENQASM 3.0;"));
//! assert!(qasm.contains("h q[0];"));
//! assert!(qasm.contains("cx q[0], q[1];"));
//! ```

pub mod emitter;
pub mod error;

pub use emitter::emit;
pub use error::{EmitError, EmitResult};
