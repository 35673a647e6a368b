//! High-level circuit builder API.

use crate::error::{IrError, IrResult};
use crate::gate::{ClassicalCondition, Gate, StandardGate};
use crate::instruction::{Instruction, InstructionKind};
use crate::qubit::{Clbit, ClbitId, Qubit, QubitId};

/// A quantum circuit.
///
/// Instructions are held as an ordered list, which keeps prefix sharing
/// between circuit variants directly inspectable: two circuits built from
/// the same prefix compare equal over `instructions()[..n]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Circuit {
    /// Name of the circuit.
    name: String,
    /// Qubits in the circuit.
    qubits: Vec<Qubit>,
    /// Classical bits in the circuit.
    clbits: Vec<Clbit>,
    /// Classical register names in declaration order.
    creg_order: Vec<String>,
    /// The instruction sequence.
    instructions: Vec<Instruction>,
}

impl Circuit {
    /// Create a new empty circuit.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            qubits: vec![],
            clbits: vec![],
            creg_order: vec![],
            instructions: vec![],
        }
    }

    /// Create a circuit with a given number of anonymous qubits and classical bits.
    pub fn with_size(name: impl Into<String>, num_qubits: u32, num_clbits: u32) -> Self {
        let mut circuit = Self::new(name);
        for _ in 0..num_qubits {
            circuit.add_qubit();
        }
        for _ in 0..num_clbits {
            circuit.add_clbit();
        }
        circuit
    }

    /// Add a single qubit to the circuit.
    pub fn add_qubit(&mut self) -> QubitId {
        let id = QubitId(self.qubits.len() as u32);
        self.qubits.push(Qubit::new(id));
        id
    }

    /// Add a quantum register with multiple qubits.
    pub fn add_qreg(&mut self, name: impl Into<String>, size: u32) -> Vec<QubitId> {
        let name = name.into();
        let mut ids = vec![];
        for i in 0..size {
            let id = QubitId(self.qubits.len() as u32);
            self.qubits.push(Qubit::with_register(id, &name, i));
            ids.push(id);
        }
        ids
    }

    /// Add a single classical bit to the circuit.
    pub fn add_clbit(&mut self) -> ClbitId {
        let id = ClbitId(self.clbits.len() as u32);
        self.clbits.push(Clbit::new(id));
        id
    }

    /// Add a classical register with multiple bits.
    ///
    /// Returns an error if a register with the same name already exists.
    pub fn add_creg(&mut self, name: impl Into<String>, size: u32) -> IrResult<Vec<ClbitId>> {
        let name = name.into();
        if self.creg_order.iter().any(|r| *r == name) {
            return Err(IrError::DuplicateRegister(name));
        }
        let mut ids = vec![];
        for i in 0..size {
            let id = ClbitId(self.clbits.len() as u32);
            self.clbits.push(Clbit::with_register(id, &name, i));
            ids.push(id);
        }
        self.creg_order.push(name);
        Ok(ids)
    }

    // =========================================================================
    // Single-qubit gates
    // =========================================================================

    /// Apply Hadamard gate.
    pub fn h(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.apply(Instruction::single_qubit_gate(StandardGate::H, qubit))?;
        Ok(self)
    }

    /// Apply Pauli-X gate.
    pub fn x(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.apply(Instruction::single_qubit_gate(StandardGate::X, qubit))?;
        Ok(self)
    }

    /// Apply Pauli-Y gate.
    pub fn y(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.apply(Instruction::single_qubit_gate(StandardGate::Y, qubit))?;
        Ok(self)
    }

    /// Apply Pauli-Z gate.
    pub fn z(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.apply(Instruction::single_qubit_gate(StandardGate::Z, qubit))?;
        Ok(self)
    }

    /// Apply S gate.
    pub fn s(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.apply(Instruction::single_qubit_gate(StandardGate::S, qubit))?;
        Ok(self)
    }

    /// Apply S-dagger gate.
    pub fn sdg(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.apply(Instruction::single_qubit_gate(StandardGate::Sdg, qubit))?;
        Ok(self)
    }

    /// Apply Rx rotation gate.
    pub fn rx(&mut self, theta: f64, qubit: QubitId) -> IrResult<&mut Self> {
        self.apply(Instruction::single_qubit_gate(StandardGate::Rx(theta), qubit))?;
        Ok(self)
    }

    /// Apply Ry rotation gate.
    pub fn ry(&mut self, theta: f64, qubit: QubitId) -> IrResult<&mut Self> {
        self.apply(Instruction::single_qubit_gate(StandardGate::Ry(theta), qubit))?;
        Ok(self)
    }

    /// Apply Rz rotation gate.
    pub fn rz(&mut self, theta: f64, qubit: QubitId) -> IrResult<&mut Self> {
        self.apply(Instruction::single_qubit_gate(StandardGate::Rz(theta), qubit))?;
        Ok(self)
    }

    /// Apply phase gate.
    pub fn p(&mut self, theta: f64, qubit: QubitId) -> IrResult<&mut Self> {
        self.apply(Instruction::single_qubit_gate(StandardGate::P(theta), qubit))?;
        Ok(self)
    }

    // =========================================================================
    // Two-qubit gates
    // =========================================================================

    /// Apply CNOT (CX) gate.
    pub fn cx(&mut self, control: QubitId, target: QubitId) -> IrResult<&mut Self> {
        self.apply(Instruction::two_qubit_gate(StandardGate::CX, control, target))?;
        Ok(self)
    }

    /// Apply CZ gate.
    pub fn cz(&mut self, control: QubitId, target: QubitId) -> IrResult<&mut Self> {
        self.apply(Instruction::two_qubit_gate(StandardGate::CZ, control, target))?;
        Ok(self)
    }

    /// Apply SWAP gate.
    pub fn swap(&mut self, q1: QubitId, q2: QubitId) -> IrResult<&mut Self> {
        self.apply(Instruction::two_qubit_gate(StandardGate::Swap, q1, q2))?;
        Ok(self)
    }

    // =========================================================================
    // Other operations
    // =========================================================================

    /// Apply a gate with a classical condition (dynamic-circuit branch).
    ///
    /// The condition references a classical register by name; the gate is
    /// applied per shot iff that register's measured value equals the
    /// condition value at the moment the gate is reached.
    pub fn gate_if(
        &mut self,
        gate: StandardGate,
        qubits: impl IntoIterator<Item = QubitId>,
        condition: ClassicalCondition,
    ) -> IrResult<&mut Self> {
        if !self.creg_order.iter().any(|r| *r == condition.register) {
            return Err(IrError::RegisterNotFound(condition.register));
        }
        let gate = Gate::new(gate).with_condition(condition);
        self.apply(Instruction::gate(gate, qubits))?;
        Ok(self)
    }

    /// Apply a custom gate instruction.
    pub fn gate(
        &mut self,
        gate: impl Into<Gate>,
        qubits: impl IntoIterator<Item = QubitId>,
    ) -> IrResult<&mut Self> {
        self.apply(Instruction::gate(gate, qubits))?;
        Ok(self)
    }

    /// Measure a qubit to a classical bit.
    pub fn measure(&mut self, qubit: QubitId, clbit: ClbitId) -> IrResult<&mut Self> {
        self.apply(Instruction::measure(qubit, clbit))?;
        Ok(self)
    }

    /// Apply a barrier to specified qubits.
    pub fn barrier(&mut self, qubits: impl IntoIterator<Item = QubitId>) -> IrResult<&mut Self> {
        self.apply(Instruction::barrier(qubits))?;
        Ok(self)
    }

    /// Apply a barrier to all qubits.
    pub fn barrier_all(&mut self) -> IrResult<&mut Self> {
        let qubits: Vec<_> = self.qubits.iter().map(|q| q.id).collect();
        self.apply(Instruction::barrier(qubits))?;
        Ok(self)
    }

    /// Append a validated instruction to the circuit.
    pub fn apply(&mut self, instruction: Instruction) -> IrResult<()> {
        self.validate_instruction(&instruction)?;
        self.instructions.push(instruction);
        Ok(())
    }

    fn validate_instruction(&self, instruction: &Instruction) -> IrResult<()> {
        let gate_name = || Some(instruction.name().to_string());

        for (i, qubit) in instruction.qubits.iter().enumerate() {
            if qubit.0 as usize >= self.qubits.len() {
                return Err(IrError::QubitNotFound {
                    qubit: *qubit,
                    gate_name: gate_name(),
                });
            }
            if instruction.qubits[..i].contains(qubit) {
                return Err(IrError::DuplicateQubit {
                    qubit: *qubit,
                    gate_name: gate_name(),
                });
            }
        }

        for clbit in &instruction.clbits {
            if clbit.0 as usize >= self.clbits.len() {
                return Err(IrError::ClbitNotFound {
                    clbit: *clbit,
                    gate_name: gate_name(),
                });
            }
        }

        if let InstructionKind::Gate(gate) = &instruction.kind {
            let expected = gate.num_qubits();
            let got = instruction.qubits.len() as u32;
            if expected != got {
                return Err(IrError::QubitCountMismatch {
                    gate_name: gate.name().to_string(),
                    expected,
                    got,
                });
            }
        }

        Ok(())
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Get the circuit name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rename the circuit.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Get the number of qubits.
    pub fn num_qubits(&self) -> usize {
        self.qubits.len()
    }

    /// Get the number of classical bits.
    pub fn num_clbits(&self) -> usize {
        self.clbits.len()
    }

    /// Get the number of instructions.
    pub fn num_ops(&self) -> usize {
        self.instructions.len()
    }

    /// Get the instruction sequence.
    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    /// Get the qubits in the circuit.
    pub fn qubits(&self) -> &[Qubit] {
        &self.qubits
    }

    /// Get the classical bits in the circuit.
    pub fn clbits(&self) -> &[Clbit] {
        &self.clbits
    }

    /// Get the bits of a named classical register, ascending register index.
    pub fn creg(&self, name: &str) -> IrResult<Vec<ClbitId>> {
        if !self.creg_order.iter().any(|r| r == name) {
            return Err(IrError::RegisterNotFound(name.to_string()));
        }
        Ok(self.creg_bits(name))
    }

    /// Get all classical registers in declaration order.
    pub fn cregs(&self) -> Vec<(&str, Vec<ClbitId>)> {
        self.creg_order
            .iter()
            .map(|name| (name.as_str(), self.creg_bits(name)))
            .collect()
    }

    fn creg_bits(&self, name: &str) -> Vec<ClbitId> {
        let mut bits: Vec<_> = self
            .clbits
            .iter()
            .filter(|c| c.register.as_deref() == Some(name))
            .collect();
        bits.sort_by_key(|c| c.index);
        bits.into_iter().map(|c| c.id).collect()
    }

    /// Check whether the circuit contains classically conditioned gates.
    pub fn has_conditional_gates(&self) -> bool {
        self.instructions.iter().any(Instruction::is_conditional)
    }

    /// Check whether the circuit measures before its last gate (mid-circuit
    /// measurement, required for dynamic circuits).
    pub fn has_mid_circuit_measurement(&self) -> bool {
        let last_gate = self.instructions.iter().rposition(Instruction::is_gate);
        let first_measure = self.instructions.iter().position(Instruction::is_measure);
        matches!((first_measure, last_gate), (Some(m), Some(g)) if m < g)
    }

    // =========================================================================
    // Pre-built circuits
    // =========================================================================

    /// Create a Bell state circuit.
    pub fn bell() -> IrResult<Self> {
        let mut circuit = Self::with_size("bell", 2, 2);
        circuit
            .h(QubitId(0))?
            .cx(QubitId(0), QubitId(1))?
            .measure(QubitId(0), ClbitId(0))?
            .measure(QubitId(1), ClbitId(1))?;
        Ok(circuit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_new_circuit() {
        let circuit = Circuit::new("test");
        assert_eq!(circuit.name(), "test");
        assert_eq!(circuit.num_qubits(), 0);
        assert_eq!(circuit.num_clbits(), 0);
    }

    #[test]
    fn test_add_registers() {
        let mut circuit = Circuit::new("test");
        let qreg = circuit.add_qreg("q", 3);
        let crz = circuit.add_creg("crz", 1).unwrap();
        let crx = circuit.add_creg("crx", 1).unwrap();

        assert_eq!(qreg.len(), 3);
        assert_eq!(crz, vec![ClbitId(0)]);
        assert_eq!(crx, vec![ClbitId(1)]);
        assert_eq!(circuit.creg("crx").unwrap(), vec![ClbitId(1)]);
        assert!(circuit.creg("nope").is_err());
    }

    #[test]
    fn test_duplicate_register_rejected() {
        let mut circuit = Circuit::new("test");
        circuit.add_creg("c", 1).unwrap();
        assert!(matches!(
            circuit.add_creg("c", 1),
            Err(IrError::DuplicateRegister(_))
        ));
    }

    #[test]
    fn test_fluent_api() {
        let mut circuit = Circuit::bell().unwrap();
        assert_eq!(circuit.num_ops(), 4);
        circuit.barrier_all().unwrap();
        assert_eq!(circuit.num_ops(), 5);
    }

    #[test]
    fn test_unknown_qubit_rejected() {
        let mut circuit = Circuit::with_size("test", 1, 0);
        assert!(matches!(
            circuit.h(QubitId(4)),
            Err(IrError::QubitNotFound { .. })
        ));
    }

    #[test]
    fn test_duplicate_qubit_rejected() {
        let mut circuit = Circuit::with_size("test", 2, 0);
        assert!(matches!(
            circuit.cx(QubitId(0), QubitId(0)),
            Err(IrError::DuplicateQubit { .. })
        ));
    }

    #[test]
    fn test_gate_if_requires_register() {
        let mut circuit = Circuit::with_size("test", 1, 0);
        let result = circuit.gate_if(
            StandardGate::X,
            [QubitId(0)],
            ClassicalCondition::new("missing", 1),
        );
        assert!(matches!(result, Err(IrError::RegisterNotFound(_))));
    }

    #[test]
    fn test_conditional_detection() {
        let mut circuit = Circuit::new("dyn");
        let q = circuit.add_qreg("q", 1);
        let c = circuit.add_creg("c", 1).unwrap();

        circuit.h(q[0]).unwrap();
        circuit.measure(q[0], c[0]).unwrap();
        assert!(!circuit.has_conditional_gates());
        assert!(!circuit.has_mid_circuit_measurement());

        circuit
            .gate_if(StandardGate::X, [q[0]], ClassicalCondition::new("c", 1))
            .unwrap();
        assert!(circuit.has_conditional_gates());
        assert!(circuit.has_mid_circuit_measurement());
    }

    #[test]
    fn test_prefix_equality() {
        let mut prefix = Circuit::with_size("prefix", 1, 1);
        prefix.rx(PI / 2.0, QubitId(0)).unwrap();

        let mut a = prefix.clone();
        a.h(QubitId(0)).unwrap();
        let mut b = prefix.clone();
        b.measure(QubitId(0), ClbitId(0)).unwrap();

        let n = prefix.num_ops();
        assert_eq!(a.instructions()[..n], b.instructions()[..n]);
        assert_ne!(a.instructions()[n], b.instructions()[n]);
    }
}
