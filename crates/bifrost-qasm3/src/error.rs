//! Error types for the QASM3 emitter.

use thiserror::Error;

/// Errors that can occur during emission.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum EmitError {
    /// Circuit mixes register-named and anonymous bits of the same kind.
    ///
    /// Declarations are emitted per register, so every qubit (and every
    /// classical bit) must either belong to a register or none may.
    #[error("Circuit '{circuit}' mixes register-named and anonymous {kind}s")]
    MixedAddressing {
        /// Name of the circuit.
        circuit: String,
        /// "qubit" or "bit".
        kind: &'static str,
    },

    /// A conditional gate references a register the circuit does not declare.
    #[error("Conditional gate references undeclared register '{0}'")]
    UndeclaredConditionRegister(String),

    /// IR error during emission.
    #[error("Circuit error: {0}")]
    CircuitError(#[from] bifrost_ir::IrError),
}

/// Result type for emission operations.
pub type EmitResult<T> = Result<T, EmitError>;
