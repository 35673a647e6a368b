//! # Bifrost IR
//!
//! Circuit intermediate representation for the Bifrost quantum toolkit.
//!
//! Circuits are ordered instruction lists over named quantum and classical
//! registers. Gates may carry a classical condition referencing a register
//! by name, which backends evaluate per shot — this is what makes
//! teleportation-style correction gates expressible without host round
//! trips.
//!
//! ## Example
//!
//! ```
//! use bifrost_ir::{Circuit, ClassicalCondition, StandardGate};
//!
//! let mut circuit = Circuit::new("teleport");
//! let q = circuit.add_qreg("q", 3);
//! let crz = circuit.add_creg("crz", 1).unwrap();
//!
//! circuit.h(q[1]).unwrap();
//! circuit.cx(q[1], q[2]).unwrap();
//! circuit.measure(q[0], crz[0]).unwrap();
//! circuit
//!     .gate_if(StandardGate::Z, [q[2]], ClassicalCondition::new("crz", 1))
//!     .unwrap();
//!
//! assert!(circuit.has_conditional_gates());
//! ```

pub mod circuit;
pub mod error;
pub mod gate;
pub mod instruction;
pub mod qubit;

pub use circuit::Circuit;
pub use error::{IrError, IrResult};
pub use gate::{ClassicalCondition, Gate, StandardGate};
pub use instruction::{Instruction, InstructionKind};
pub use qubit::{Clbit, ClbitId, Qubit, QubitId};
