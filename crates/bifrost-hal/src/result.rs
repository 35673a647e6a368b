//! Execution results and measurement counts.
//!
//! # Label convention
//!
//! Outcome labels are bitstrings written MSB-first: the leftmost character
//! is the highest-numbered classical bit. Per-register labels follow the
//! same convention within the register. Adapters normalize whatever their
//! provider returns (hex samples, little-endian strings) into this form
//! before constructing a [`Counts`].

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Measurement outcome counts for one circuit execution.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counts {
    counts: FxHashMap<String, u64>,
}

impl Counts {
    /// Create an empty counts map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create counts from label/count pairs.
    pub fn from_pairs(pairs: impl IntoIterator<Item = (impl Into<String>, u64)>) -> Self {
        let mut counts = Self::new();
        for (label, count) in pairs {
            counts.insert(label, count);
        }
        counts
    }

    /// Add `count` occurrences of an outcome label.
    ///
    /// Accumulates if the label is already present.
    pub fn insert(&mut self, label: impl Into<String>, count: u64) {
        *self.counts.entry(label.into()).or_insert(0) += count;
    }

    /// Record a single occurrence of an outcome label.
    pub fn record(&mut self, label: impl Into<String>) {
        self.insert(label, 1);
    }

    /// Get the count for a label, or 0 if absent.
    pub fn get(&self, label: &str) -> u64 {
        self.counts.get(label).copied().unwrap_or(0)
    }

    /// Iterate over (label, count) pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &u64)> {
        self.counts.iter()
    }

    /// Number of distinct outcome labels.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// Check whether no outcomes were recorded.
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Total number of recorded shots.
    pub fn total_shots(&self) -> u64 {
        self.counts.values().sum()
    }

    /// Get the most frequent outcome, if any.
    pub fn most_frequent(&self) -> Option<(&str, u64)> {
        self.counts
            .iter()
            .max_by_key(|(_, count)| **count)
            .map(|(label, count)| (label.as_str(), *count))
    }

    /// Marginalize combined counts down to a subset of classical bits.
    ///
    /// `bits` lists the global clbit indices of the target register in
    /// ascending register order. Output labels are MSB-first within the
    /// register (last element of `bits` becomes the leftmost character).
    /// Whitespace in input labels is ignored.
    pub fn marginalize(&self, bits: &[u32]) -> Counts {
        let mut out = Counts::new();
        for (label, count) in &self.counts {
            let clean: Vec<char> = label.chars().filter(|c| !c.is_whitespace()).collect();
            let width = clean.len();
            let sub: String = bits
                .iter()
                .rev()
                .map(|b| {
                    let pos = width.checked_sub(1 + *b as usize);
                    pos.and_then(|p| clean.get(p)).copied().unwrap_or('0')
                })
                .collect();
            out.insert(sub, *count);
        }
        out
    }
}

impl<S: Into<String>> FromIterator<(S, u64)> for Counts {
    fn from_iter<T: IntoIterator<Item = (S, u64)>>(iter: T) -> Self {
        Self::from_pairs(iter)
    }
}

/// Result of executing one circuit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionResult {
    /// Combined counts over all classical bits.
    pub counts: Counts,
    /// Counts per named classical register.
    ///
    /// Both the simulator and remote adapters populate this; it is the
    /// canonical way to read a single register without slicing combined
    /// labels.
    #[serde(default, skip_serializing_if = "FxHashMap::is_empty")]
    pub register_counts: FxHashMap<String, Counts>,
    /// Number of shots requested.
    pub shots: u32,
    /// Wall-clock execution time in milliseconds, if known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub execution_time_ms: Option<u64>,
}

impl ExecutionResult {
    /// Create a new execution result.
    pub fn new(counts: Counts, shots: u32) -> Self {
        Self {
            counts,
            register_counts: FxHashMap::default(),
            shots,
            execution_time_ms: None,
        }
    }

    /// Set the execution time.
    #[must_use]
    pub fn with_execution_time(mut self, ms: u64) -> Self {
        self.execution_time_ms = Some(ms);
        self
    }

    /// Add counts for a named classical register.
    #[must_use]
    pub fn with_register(mut self, name: impl Into<String>, counts: Counts) -> Self {
        self.register_counts.insert(name.into(), counts);
        self
    }

    /// Get the counts for a named register.
    pub fn register(&self, name: &str) -> Option<&Counts> {
        self.register_counts.get(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_accumulate() {
        let mut counts = Counts::new();
        counts.insert("00", 10);
        counts.insert("00", 5);
        counts.insert("11", 7);

        assert_eq!(counts.get("00"), 15);
        assert_eq!(counts.get("11"), 7);
        assert_eq!(counts.get("01"), 0);
        assert_eq!(counts.total_shots(), 22);
        assert_eq!(counts.len(), 2);
    }

    #[test]
    fn test_most_frequent() {
        let counts = Counts::from_pairs([("00", 900), ("11", 100)]);
        assert_eq!(counts.most_frequent(), Some(("00", 900)));
        assert_eq!(Counts::new().most_frequent(), None);
    }

    #[test]
    fn test_marginalize_single_bit() {
        // 3 clbits: crz = bit 0, crx = bit 1, tomo = bit 2.
        // Label "101" reads tomo=1, crx=0, crz=1.
        let counts = Counts::from_pairs([("101", 60), ("001", 40)]);

        let tomo = counts.marginalize(&[2]);
        assert_eq!(tomo.get("1"), 60);
        assert_eq!(tomo.get("0"), 40);

        let crz = counts.marginalize(&[0]);
        assert_eq!(crz.get("1"), 100);
    }

    #[test]
    fn test_marginalize_merges_outcomes() {
        let counts = Counts::from_pairs([("10", 3), ("00", 4), ("11", 5)]);
        // Keep only bit 1 (leftmost char).
        let m = counts.marginalize(&[1]);
        assert_eq!(m.get("1"), 8);
        assert_eq!(m.get("0"), 4);
    }

    #[test]
    fn test_marginalize_ignores_whitespace() {
        let counts = Counts::from_pairs([("1 0 1", 2)]);
        let m = counts.marginalize(&[2]);
        assert_eq!(m.get("1"), 2);
    }

    #[test]
    fn test_execution_result() {
        let counts = Counts::from_pairs([("0", 512), ("1", 512)]);
        let result = ExecutionResult::new(counts, 1024)
            .with_execution_time(12)
            .with_register("tomo", Counts::from_pairs([("0", 512), ("1", 512)]));

        assert_eq!(result.shots, 1024);
        assert_eq!(result.execution_time_ms, Some(12));
        assert_eq!(result.register("tomo").unwrap().get("0"), 512);
        assert!(result.register("crz").is_none());
    }
}
