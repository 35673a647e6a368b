//! Bloch vector representation of a single-qubit state estimate.

use serde::{Deserialize, Serialize};

/// Estimated Bloch vector `(<X>, <Y>, <Z>)`.
///
/// Components are Pauli expectation values in `[-1, 1]` for exact counts;
/// sampling noise on real shots keeps them near but not exactly at the
/// ideal values.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BlochVector {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl BlochVector {
    /// Create a Bloch vector from its components.
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Euclidean norm. 1.0 for a pure state, less for mixed estimates.
    pub fn norm(&self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }
}

impl std::fmt::Display for BlochVector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.3}, {:.3}, {:.3})", self.x, self.y, self.z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_norm() {
        assert_eq!(BlochVector::new(1.0, 0.0, 0.0).norm(), 1.0);
        assert_eq!(BlochVector::default().norm(), 0.0);
        let v = BlochVector::new(0.6, 0.0, 0.8);
        assert!((v.norm() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_display() {
        let v = BlochVector::new(0.4648, -0.0012, 1.0);
        assert_eq!(v.to_string(), "(0.465, -0.001, 1.000)");
    }
}
