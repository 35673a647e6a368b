//! Quantum teleportation circuit construction.
//!
//! The protocol uses three qubits: `q[0]` carries the state to teleport,
//! `q[1]` and `q[2]` hold a Bell pair. After the Bell measurement of
//! `q[0]`/`q[1]`, classically conditioned X and Z corrections on `q[2]`
//! complete the transfer within the same circuit, so the corrections are
//! applied per shot from that shot's own measurement outcomes.

use std::f64::consts::FRAC_PI_2;

use bifrost_ir::{Circuit, ClassicalCondition, IrResult, StandardGate};
use serde::{Deserialize, Serialize};

/// Names of the classical registers holding the Bell measurement outcomes.
pub const CREG_Z: &str = "crz";
pub const CREG_X: &str = "crx";

/// Single-qubit state preparation as a pair of rotation angles.
///
/// The source qubit is prepared by `rx(theta)` followed by `rz(phi)` from
/// `|0>`. The default angles put the qubit on the +X axis of the Bloch
/// sphere, so a faithful teleportation reports a Bloch vector near
/// `(1, 0, 0)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StatePrep {
    /// Rx rotation angle in radians.
    pub theta: f64,
    /// Rz rotation angle in radians.
    pub phi: f64,
}

impl StatePrep {
    /// Create a preparation from explicit angles.
    pub fn new(theta: f64, phi: f64) -> Self {
        Self { theta, phi }
    }
}

impl Default for StatePrep {
    fn default() -> Self {
        Self {
            theta: FRAC_PI_2,
            phi: FRAC_PI_2,
        }
    }
}

/// Build the full teleportation circuit, corrections included.
///
/// Register layout: quantum register `q[3]`, classical registers `crz[1]`
/// and `crx[1]`. The returned circuit ends with the conditional corrections
/// on `q[2]`; callers append their own measurement of `q[2]`.
pub fn teleportation_circuit(prep: &StatePrep) -> IrResult<Circuit> {
    let mut circuit = Circuit::new("teleport");
    let q = circuit.add_qreg("q", 3);
    let crz = circuit.add_creg(CREG_Z, 1)?;
    let crx = circuit.add_creg(CREG_X, 1)?;

    // Prepare the state to teleport on q[0].
    circuit.rx(prep.theta, q[0])?.rz(prep.phi, q[0])?;
    circuit.barrier_all()?;

    // Bell pair on q[1]/q[2].
    circuit.h(q[1])?.cx(q[1], q[2])?;
    circuit.barrier_all()?;

    // Bell measurement of q[0]/q[1].
    circuit.cx(q[0], q[1])?.h(q[0])?;
    circuit.measure(q[0], crz[0])?.measure(q[1], crx[0])?;

    // Corrections on q[2], conditioned on the measured bits.
    circuit.gate_if(StandardGate::X, [q[2]], ClassicalCondition::new(CREG_X, 1))?;
    circuit.gate_if(StandardGate::Z, [q[2]], ClassicalCondition::new(CREG_Z, 1))?;

    Ok(circuit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bifrost_ir::QubitId;

    #[test]
    fn test_register_layout() {
        let circuit = teleportation_circuit(&StatePrep::default()).unwrap();
        assert_eq!(circuit.num_qubits(), 3);
        assert_eq!(circuit.num_clbits(), 2);
        assert_eq!(circuit.creg(CREG_Z).unwrap().len(), 1);
        assert_eq!(circuit.creg(CREG_X).unwrap().len(), 1);
    }

    #[test]
    fn test_corrections_are_conditional() {
        let circuit = teleportation_circuit(&StatePrep::default()).unwrap();
        assert!(circuit.has_conditional_gates());
        assert!(circuit.has_mid_circuit_measurement());

        let conditionals: Vec<_> = circuit
            .instructions()
            .iter()
            .filter(|i| i.is_conditional())
            .collect();
        assert_eq!(conditionals.len(), 2);
        assert_eq!(conditionals[0].name(), "x");
        assert_eq!(conditionals[1].name(), "z");
        assert_eq!(conditionals[0].qubits, vec![QubitId(2)]);
        assert_eq!(conditionals[1].qubits, vec![QubitId(2)]);
    }

    #[test]
    fn test_default_prep_angles() {
        let prep = StatePrep::default();
        assert_eq!(prep.theta, FRAC_PI_2);
        assert_eq!(prep.phi, FRAC_PI_2);
    }
}
