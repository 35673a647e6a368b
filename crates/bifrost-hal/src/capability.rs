//! Backend capability introspection.
//!
//! Describes what a quantum backend can do: qubit count, supported gates,
//! shot limits, and feature flags. The tomography runner uses these to
//! decide whether a backend can run dynamic (classically conditioned)
//! circuits at all.

use serde::{Deserialize, Serialize};

/// Hardware capabilities of a quantum backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Capabilities {
    /// Name of the backend.
    pub name: String,
    /// Number of qubits available.
    pub num_qubits: u32,
    /// Supported gate set (OpenQASM 3 naming convention).
    pub gate_set: GateSet,
    /// Maximum number of shots per circuit.
    pub max_shots: u32,
    /// Maximum circuits per batch submission.
    pub max_batch_size: u32,
    /// Whether this is a simulator (`true`) vs real hardware (`false`).
    /// MUST be set from authoritative source data, not string heuristics.
    pub is_simulator: bool,
    /// Additional capability flags: `"statevector"`, `"dynamic_circuits"`,
    /// `"mid_circuit_measurement"`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub features: Vec<String>,
}

impl Capabilities {
    /// Create capabilities for the local statevector simulator.
    pub fn simulator(num_qubits: u32) -> Self {
        Self {
            name: "simulator".into(),
            num_qubits,
            gate_set: GateSet::universal(),
            max_shots: 100_000,
            max_batch_size: 1_024,
            is_simulator: true,
            features: vec![
                "statevector".into(),
                "dynamic_circuits".into(),
                "mid_circuit_measurement".into(),
            ],
        }
    }

    /// Create capabilities for IBM devices.
    ///
    /// Used as the construction-time cache; the device list endpoint
    /// overrides qubit count and queue depth at runtime.
    pub fn ibm(name: impl Into<String>, num_qubits: u32) -> Self {
        Self {
            name: name.into(),
            num_qubits,
            gate_set: GateSet::ibm_heron(),
            max_shots: 100_000,
            max_batch_size: 300,
            is_simulator: false,
            features: vec![
                "dynamic_circuits".into(),
                "mid_circuit_measurement".into(),
            ],
        }
    }

    /// Check whether a feature flag is present.
    pub fn has_feature(&self, feature: &str) -> bool {
        self.features.iter().any(|f| f == feature)
    }

    /// Check whether the backend can run classically conditioned gates.
    pub fn supports_dynamic_circuits(&self) -> bool {
        self.has_feature("dynamic_circuits")
    }
}

/// Supported gate operations, OpenQASM 3 naming.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GateSet {
    /// Single-qubit gates supported.
    pub single_qubit: Vec<String>,
    /// Two-qubit gates supported.
    pub two_qubit: Vec<String>,
}

impl GateSet {
    /// Create a universal gate set (simulator).
    pub fn universal() -> Self {
        Self {
            single_qubit: vec![
                "id".into(),
                "x".into(),
                "y".into(),
                "z".into(),
                "h".into(),
                "s".into(),
                "sdg".into(),
                "rx".into(),
                "ry".into(),
                "rz".into(),
                "p".into(),
            ],
            two_qubit: vec!["cx".into(), "cz".into(), "swap".into()],
        }
    }

    /// Create IBM Heron gate set (156-qubit processors: ibm_torino, ibm_marrakesh, etc.).
    ///
    /// Listed gates are what `validate()` accepts; the provider transpiles
    /// to true native gates (`cz, rz, sx, x`) before running.
    pub fn ibm_heron() -> Self {
        Self {
            single_qubit: vec![
                "id".into(),
                "x".into(),
                "y".into(),
                "z".into(),
                "h".into(),
                "s".into(),
                "sdg".into(),
                "rx".into(),
                "ry".into(),
                "rz".into(),
                "p".into(),
            ],
            two_qubit: vec!["cx".into(), "cz".into()],
        }
    }

    /// Check if a gate is supported by name.
    pub fn supports(&self, gate: &str) -> bool {
        self.single_qubit.iter().any(|g| g == gate) || self.two_qubit.iter().any(|g| g == gate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simulator_capabilities() {
        let caps = Capabilities::simulator(24);
        assert!(caps.is_simulator);
        assert_eq!(caps.num_qubits, 24);
        assert!(caps.supports_dynamic_circuits());
        assert!(caps.has_feature("statevector"));
        assert!(!caps.has_feature("ion_trap"));
    }

    #[test]
    fn test_gate_set_supports() {
        let gates = GateSet::universal();
        assert!(gates.supports("h"));
        assert!(gates.supports("cx"));
        assert!(!gates.supports("ccx"));
    }

    #[test]
    fn test_ibm_capabilities() {
        let caps = Capabilities::ibm("ibm_torino", 156);
        assert!(!caps.is_simulator);
        assert!(caps.supports_dynamic_circuits());
        assert!(caps.gate_set.supports("cz"));
    }
}
