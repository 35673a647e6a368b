//! QASM3 emitter for serializing circuits.

use bifrost_ir::{Circuit, ClbitId, Gate, Instruction, InstructionKind, QubitId, StandardGate};

use crate::error::{EmitError, EmitResult};

/// Emit a circuit as QASM3 source code.
///
/// Register-named bits are declared per register (`bit[1] crz;`) and
/// referenced by register index; anonymous bits fall back to a single
/// `q`/`c` array. Classically conditioned gates are emitted as
/// `if (reg == value) { ... }` blocks.
pub fn emit(circuit: &Circuit) -> EmitResult<String> {
    let mut emitter = Emitter::new(circuit)?;
    emitter.emit_circuit()
}

/// How bits of one kind are addressed in the output.
enum Addressing {
    /// All bits belong to named registers.
    Registers(Vec<(String, u32)>),
    /// No bits belong to registers; declare one array with the given name.
    Anonymous(&'static str, u32),
}

/// QASM3 emitter.
struct Emitter<'a> {
    circuit: &'a Circuit,
    qubit_addressing: Addressing,
    clbit_addressing: Addressing,
    output: String,
    indent: usize,
}

impl<'a> Emitter<'a> {
    fn new(circuit: &'a Circuit) -> EmitResult<Self> {
        let qubit_addressing = resolve_addressing(
            circuit.name(),
            "qubit",
            "q",
            circuit.qubits().iter().map(|q| q.register.as_deref()),
        )?;
        let clbit_addressing = resolve_addressing(
            circuit.name(),
            "bit",
            "c",
            circuit.clbits().iter().map(|c| c.register.as_deref()),
        )?;

        Ok(Self {
            circuit,
            qubit_addressing,
            clbit_addressing,
            output: String::new(),
            indent: 0,
        })
    }

    fn emit_circuit(&mut self) -> EmitResult<String> {
        self.writeln("OPENQASM 3.0;");
        self.writeln("");

        let mut declared = false;
        for (keyword, addressing) in [
            ("qubit", &self.qubit_addressing),
            ("bit", &self.clbit_addressing),
        ] {
            match addressing {
                Addressing::Registers(regs) => {
                    for (name, size) in regs {
                        self.output.push_str(&format!("{keyword}[{size}] {name};\n"));
                        declared = true;
                    }
                }
                Addressing::Anonymous(name, size) => {
                    if *size > 0 {
                        self.output.push_str(&format!("{keyword}[{size}] {name};\n"));
                        declared = true;
                    }
                }
            }
        }
        if declared {
            self.writeln("");
        }

        for instruction in self.circuit.instructions() {
            self.emit_instruction(instruction)?;
        }

        Ok(self.output.clone())
    }

    fn emit_instruction(&mut self, instruction: &Instruction) -> EmitResult<()> {
        match &instruction.kind {
            InstructionKind::Gate(gate) => self.emit_gate(gate, &instruction.qubits)?,

            InstructionKind::Measure => {
                let qubit = self.qubit_ref(instruction.qubits[0]);
                let clbit = self.clbit_ref(instruction.clbits[0]);
                self.writeln(&format!("{clbit} = measure {qubit};"));
            }

            InstructionKind::Barrier => {
                let qubits = self.qubit_list(&instruction.qubits);
                if qubits.is_empty() {
                    self.writeln("barrier;");
                } else {
                    self.writeln(&format!("barrier {qubits};"));
                }
            }
        }

        Ok(())
    }

    fn emit_gate(&mut self, gate: &Gate, qubits: &[QubitId]) -> EmitResult<()> {
        if let Some(condition) = &gate.condition {
            if !self
                .circuit
                .cregs()
                .iter()
                .any(|(name, _)| *name == condition.register)
            {
                return Err(EmitError::UndeclaredConditionRegister(
                    condition.register.clone(),
                ));
            }
            self.writeln(&format!("if ({} == {}) {{", condition.register, condition.value));
            self.indent += 1;
            self.emit_gate_application(&gate.kind, qubits);
            self.indent -= 1;
            self.writeln("}");
        } else {
            self.emit_gate_application(&gate.kind, qubits);
        }
        Ok(())
    }

    fn emit_gate_application(&mut self, kind: &StandardGate, qubits: &[QubitId]) {
        let name = kind.name();
        let params = emit_params(kind);
        let qubits = self.qubit_list(qubits);

        if params.is_empty() {
            self.writeln(&format!("{name} {qubits};"));
        } else {
            self.writeln(&format!("{name}({params}) {qubits};"));
        }
    }

    fn qubit_ref(&self, id: QubitId) -> String {
        let qubit = &self.circuit.qubits()[id.0 as usize];
        match (&qubit.register, qubit.index) {
            (Some(reg), Some(idx)) => format!("{reg}[{idx}]"),
            _ => format!("q[{}]", id.0),
        }
    }

    fn clbit_ref(&self, id: ClbitId) -> String {
        let clbit = &self.circuit.clbits()[id.0 as usize];
        match (&clbit.register, clbit.index) {
            (Some(reg), Some(idx)) => format!("{reg}[{idx}]"),
            _ => format!("c[{}]", id.0),
        }
    }

    fn qubit_list(&self, qubits: &[QubitId]) -> String {
        qubits
            .iter()
            .map(|q| self.qubit_ref(*q))
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn writeln(&mut self, line: &str) {
        if line.is_empty() {
            self.output.push('\n');
            return;
        }
        for _ in 0..self.indent {
            self.output.push_str("  ");
        }
        self.output.push_str(line);
        self.output.push('\n');
    }
}

/// Group bit register membership into an addressing scheme.
fn resolve_addressing<'r>(
    circuit_name: &str,
    kind: &'static str,
    anon_name: &'static str,
    registers: impl Iterator<Item = Option<&'r str>>,
) -> EmitResult<Addressing> {
    let mut named: Vec<(String, u32)> = vec![];
    let mut anonymous = 0u32;

    for register in registers {
        match register {
            Some(reg) => match named.iter_mut().find(|(name, _)| name == reg) {
                Some((_, size)) => *size += 1,
                None => named.push((reg.to_string(), 1)),
            },
            None => anonymous += 1,
        }
    }

    if !named.is_empty() && anonymous > 0 {
        return Err(EmitError::MixedAddressing {
            circuit: circuit_name.to_string(),
            kind,
        });
    }

    if named.is_empty() {
        Ok(Addressing::Anonymous(anon_name, anonymous))
    } else {
        Ok(Addressing::Registers(named))
    }
}

fn emit_params(kind: &StandardGate) -> String {
    kind.parameters()
        .iter()
        .map(|p| emit_param(*p))
        .collect::<Vec<_>>()
        .join(", ")
}

fn emit_param(value: f64) -> String {
    // Check if close to common fractions of pi
    let pi = std::f64::consts::PI;
    if (value - pi).abs() < 1e-10 {
        "pi".into()
    } else if (value - pi / 2.0).abs() < 1e-10 {
        "pi/2".into()
    } else if (value - pi / 4.0).abs() < 1e-10 {
        "pi/4".into()
    } else if (value + pi / 2.0).abs() < 1e-10 {
        "-pi/2".into()
    } else if (value + pi / 4.0).abs() < 1e-10 {
        "-pi/4".into()
    } else {
        format!("{value:.6}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bifrost_ir::ClassicalCondition;
    use std::f64::consts::PI;

    #[test]
    fn test_emit_bell() {
        let circuit = Circuit::bell().unwrap();
        let qasm = emit(&circuit).unwrap();

        assert!(qasm.contains("OPENQASM 3.0;"));
        assert!(qasm.contains("qubit[2] q;"));
        assert!(qasm.contains("bit[2] c;"));
        assert!(qasm.contains("h q[0];"));
        assert!(qasm.contains("cx q[0], q[1];"));
        assert!(qasm.contains("c[0] = measure q[0];"));
    }

    #[test]
    fn test_emit_named_registers() {
        let mut circuit = Circuit::new("teleport");
        let q = circuit.add_qreg("q", 3);
        let crz = circuit.add_creg("crz", 1).unwrap();
        let crx = circuit.add_creg("crx", 1).unwrap();

        circuit.h(q[1]).unwrap();
        circuit.measure(q[0], crz[0]).unwrap();
        circuit.measure(q[1], crx[0]).unwrap();

        let qasm = emit(&circuit).unwrap();
        assert!(qasm.contains("qubit[3] q;"));
        assert!(qasm.contains("bit[1] crz;"));
        assert!(qasm.contains("bit[1] crx;"));
        assert!(qasm.contains("crz[0] = measure q[0];"));
        assert!(qasm.contains("crx[0] = measure q[1];"));
    }

    #[test]
    fn test_emit_conditional_gate() {
        let mut circuit = Circuit::new("dyn");
        let q = circuit.add_qreg("q", 3);
        let crx = circuit.add_creg("crx", 1).unwrap();

        circuit.measure(q[0], crx[0]).unwrap();
        circuit
            .gate_if(StandardGate::X, [q[2]], ClassicalCondition::new("crx", 1))
            .unwrap();

        let qasm = emit(&circuit).unwrap();
        assert!(qasm.contains("if (crx == 1) {"));
        assert!(qasm.contains("  x q[2];"));
        assert!(qasm.contains("}\n"));
    }

    #[test]
    fn test_emit_pi_fractions() {
        let mut circuit = Circuit::with_size("rot", 1, 0);
        circuit.rx(PI / 2.0, 0.into()).unwrap();
        circuit.rz(-PI / 2.0, 0.into()).unwrap();
        circuit.ry(1.234_567, 0.into()).unwrap();

        let qasm = emit(&circuit).unwrap();
        assert!(qasm.contains("rx(pi/2) q[0];"));
        assert!(qasm.contains("rz(-pi/2) q[0];"));
        assert!(qasm.contains("ry(1.234567) q[0];"));
    }

    #[test]
    fn test_mixed_addressing_rejected() {
        let mut circuit = Circuit::new("mixed");
        circuit.add_qreg("q", 1);
        circuit.add_qubit();

        assert!(matches!(
            emit(&circuit),
            Err(EmitError::MixedAddressing { kind: "qubit", .. })
        ));
    }

    #[test]
    fn test_barrier_emission() {
        let mut circuit = Circuit::with_size("b", 2, 0);
        circuit.barrier_all().unwrap();
        let qasm = emit(&circuit).unwrap();
        assert!(qasm.contains("barrier q[0], q[1];"));
    }
}
