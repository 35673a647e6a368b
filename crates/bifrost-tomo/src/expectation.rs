//! Expectation values from measurement counts.
//!
//! The reduction here is the analysis core of the tomography pipeline:
//! every basis measurement ends up as a [`Counts`] table, and every
//! Bloch component is one call to [`expectation`].

use bifrost_hal::Counts;

use crate::error::{TomoError, TomoResult};

/// Computes the Pauli expectation value `(shots_0 - shots_1) / shots` for a
/// single classical bit of a counts table.
///
/// Outcome labels are bitstrings with the most significant bit on the left;
/// `bit_index` selects a character counted from the left of the label after
/// whitespace is stripped. Register-separator spaces (as produced by some
/// hardware result formats) are therefore tolerated.
///
/// The divisor is the *nominal* shot count that was requested, not the sum
/// of the observed counts. Backends may drop shots; dropped shots dilute the
/// expectation value toward zero rather than silently renormalizing.
///
/// An empty counts table yields `0.0`. A zero `shots` value is an error, as
/// is any label that is not a bitstring or is too short to cover `bit_index`.
pub fn expectation(counts: &Counts, bit_index: usize, shots: u32) -> TomoResult<f64> {
    if shots == 0 {
        return Err(TomoError::ZeroShots);
    }
    if counts.is_empty() {
        return Ok(0.0);
    }

    let mut shots_0: u64 = 0;
    let mut shots_1: u64 = 0;
    for (label, occurrences) in counts.iter() {
        let clean: String = label.chars().filter(|c| !c.is_whitespace()).collect();
        let Some(bit) = clean.chars().nth(bit_index) else {
            return Err(TomoError::MalformedLabel {
                label: label.clone(),
                reason: format!("label has fewer than {} bits", bit_index + 1),
            });
        };
        match bit {
            '0' => shots_0 += occurrences,
            '1' => shots_1 += occurrences,
            other => {
                return Err(TomoError::MalformedLabel {
                    label: label.clone(),
                    reason: format!("unexpected character '{other}'"),
                });
            }
        }
    }

    Ok((shots_0 as f64 - shots_1 as f64) / f64::from(shots))
}
