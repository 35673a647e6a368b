//! Measurement bases and per-axis tomography circuits.

use std::f64::consts::FRAC_PI_2;

use bifrost_ir::{Circuit, ClbitId, IrResult, QubitId};
use serde::{Deserialize, Serialize};

use crate::protocol::{StatePrep, teleportation_circuit};

/// Name of the classical register holding the tomography outcome.
pub const CREG_TOMO: &str = "tomo";

/// Pauli measurement basis for a single qubit.
///
/// Hardware measures in the computational (Z) basis only; X and Y are
/// realized by rotating the measured axis onto Z immediately before the
/// final measurement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MeasurementBasis {
    X,
    Y,
    Z,
}

impl MeasurementBasis {
    /// All three bases, in reporting order.
    pub const ALL: [MeasurementBasis; 3] =
        [MeasurementBasis::X, MeasurementBasis::Y, MeasurementBasis::Z];

    /// Lowercase axis label, used in circuit names and output.
    pub fn label(&self) -> &'static str {
        match self {
            MeasurementBasis::X => "x",
            MeasurementBasis::Y => "y",
            MeasurementBasis::Z => "z",
        }
    }

    /// Append the basis-change rotation and final measurement to a circuit.
    pub fn append_measurement(
        &self,
        circuit: &mut Circuit,
        qubit: QubitId,
        clbit: ClbitId,
    ) -> IrResult<()> {
        match self {
            MeasurementBasis::X => {
                circuit.h(qubit)?;
            }
            MeasurementBasis::Y => {
                // Rz(-pi/2) then H maps the Y axis onto Z.
                circuit.rz(-FRAC_PI_2, qubit)?.h(qubit)?;
            }
            MeasurementBasis::Z => {}
        }
        circuit.measure(qubit, clbit)?;
        Ok(())
    }
}

impl std::fmt::Display for MeasurementBasis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Build the three tomography circuits for one state preparation.
///
/// All three share the teleportation prefix instruction-for-instruction and
/// differ only in the basis-change suffix on `q[2]`. Returned in
/// [`MeasurementBasis::ALL`] order, named `teleport-x`, `teleport-y`,
/// `teleport-z`.
pub fn tomography_circuits(prep: &StatePrep) -> IrResult<Vec<Circuit>> {
    let base = teleportation_circuit(prep)?;
    let target = QubitId(2);

    let mut circuits = Vec::with_capacity(MeasurementBasis::ALL.len());
    for basis in MeasurementBasis::ALL {
        let mut circuit = base.clone();
        circuit.set_name(format!("teleport-{basis}"));
        let tomo = circuit.add_creg(CREG_TOMO, 1)?;
        basis.append_measurement(&mut circuit, target, tomo[0])?;
        circuits.push(circuit);
    }
    Ok(circuits)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_three_circuits_in_axis_order() {
        let circuits = tomography_circuits(&StatePrep::default()).unwrap();
        assert_eq!(circuits.len(), 3);
        assert_eq!(circuits[0].name(), "teleport-x");
        assert_eq!(circuits[1].name(), "teleport-y");
        assert_eq!(circuits[2].name(), "teleport-z");
    }

    #[test]
    fn test_shared_prefix_is_identical() {
        let prep = StatePrep::default();
        let prefix_len = teleportation_circuit(&prep).unwrap().num_ops();
        let circuits = tomography_circuits(&prep).unwrap();

        for pair in circuits.windows(2) {
            assert_eq!(
                pair[0].instructions()[..prefix_len],
                pair[1].instructions()[..prefix_len],
            );
        }
        // Suffixes differ between bases.
        assert_ne!(
            circuits[0].instructions()[prefix_len..],
            circuits[2].instructions()[prefix_len..],
        );
    }

    #[test]
    fn test_suffix_shapes() {
        let circuits = tomography_circuits(&StatePrep::default()).unwrap();
        let prefix_len = teleportation_circuit(&StatePrep::default())
            .unwrap()
            .num_ops();

        let names = |c: &Circuit| -> Vec<String> {
            c.instructions()[prefix_len..]
                .iter()
                .map(|i| i.name().to_string())
                .collect()
        };

        assert_eq!(names(&circuits[0]), ["h", "measure"]);
        assert_eq!(names(&circuits[1]), ["rz", "h", "measure"]);
        assert_eq!(names(&circuits[2]), ["measure"]);
    }

    #[test]
    fn test_tomo_register_added() {
        for circuit in tomography_circuits(&StatePrep::default()).unwrap() {
            assert_eq!(circuit.num_clbits(), 3);
            assert_eq!(circuit.creg(CREG_TOMO).unwrap().len(), 1);
        }
    }
}
