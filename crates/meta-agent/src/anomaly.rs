//! Frequency-based novelty classification.
//!
//! A record is novel when its fingerprint has been seen rarely relative to
//! everything seen before it:
//!
//! ```text
//!   frequency     = count(fp in history) / max(len(history), 1)
//!   anomaly_score = 1 - frequency
//!   anomalous     = anomaly_score > threshold
//! ```
//!
//! Classification always runs against history as it stands *before* the
//! record being classified is appended.

use crate::fingerprint::Fingerprint;

/// Append-only log of every fingerprint processed, duplicates included.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct History {
    entries: Vec<Fingerprint>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, fingerprint: Fingerprint) {
        self.entries.push(fingerprint);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of prior occurrences of `fingerprint`.
    pub fn count(&self, fingerprint: &Fingerprint) -> usize {
        self.entries.iter().filter(|fp| *fp == fingerprint).count()
    }

    /// Share of history taken up by `fingerprint`.
    pub fn frequency(&self, fingerprint: &Fingerprint) -> f64 {
        frequency(fingerprint, self)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Fingerprint> {
        self.entries.iter()
    }

    pub fn as_slice(&self) -> &[Fingerprint] {
        &self.entries
    }
}

/// Occurrences of `fingerprint` divided by history length (at least 1).
pub fn frequency(fingerprint: &Fingerprint, history: &History) -> f64 {
    history.count(fingerprint) as f64 / history.len().max(1) as f64
}

/// `1 - frequency`; 1.0 for anything not yet seen.
pub fn anomaly_score(fingerprint: &Fingerprint, history: &History) -> f64 {
    1.0 - frequency(fingerprint, history)
}

/// Whether `fingerprint` is novel enough to count as an anomaly.
pub fn is_anomaly(fingerprint: &Fingerprint, history: &History, threshold: f64) -> bool {
    anomaly_score(fingerprint, history) > threshold
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fp(tag: &str) -> Fingerprint {
        Fingerprint::of_value(&json!({ "tag": tag }))
    }

    fn history_of(tags: &[&str]) -> History {
        let mut h = History::new();
        for t in tags {
            h.push(fp(t));
        }
        h
    }

    #[test]
    fn empty_history_scores_one() {
        let h = History::new();
        assert_eq!(frequency(&fp("a"), &h), 0.0);
        assert_eq!(anomaly_score(&fp("a"), &h), 1.0);
        assert!(is_anomaly(&fp("a"), &h, 0.99));
        assert!(!is_anomaly(&fp("a"), &h, 1.0));
    }

    #[test]
    fn frequency_counts_duplicates() {
        let h = history_of(&["a", "b", "a", "a"]);
        assert_eq!(h.len(), 4);
        assert_eq!(h.count(&fp("a")), 3);
        assert!((h.frequency(&fp("a")) - 0.75).abs() < f64::EPSILON);
        assert!((anomaly_score(&fp("b"), &h) - 0.75).abs() < f64::EPSILON);
        assert_eq!(h.count(&fp("c")), 0);
    }

    #[test]
    fn score_equal_to_threshold_is_not_anomalous() {
        let h = history_of(&["a", "b"]);
        // frequency 0.5, score 0.5
        assert!(!is_anomaly(&fp("a"), &h, 0.5));
        assert!(is_anomaly(&fp("a"), &h, 0.49));
    }

    #[test]
    fn lower_threshold_flags_more() {
        let h = history_of(&["a", "a", "a", "b"]);
        // score for "a" is 0.25
        assert!(!is_anomaly(&fp("a"), &h, 0.5));
        assert!(is_anomaly(&fp("a"), &h, 0.2));
        assert!(is_anomaly(&fp("a"), &h, -1.0));
    }

    #[test]
    fn classification_does_not_touch_history() {
        let h = history_of(&["a", "b"]);
        let before = h.clone();
        let _ = is_anomaly(&fp("a"), &h, 0.5);
        assert_eq!(h, before);
    }

    #[test]
    fn iteration_preserves_insertion_order() {
        let h = history_of(&["c", "a", "c"]);
        let collected: Vec<_> = h.iter().cloned().collect();
        assert_eq!(collected, vec![fp("c"), fp("a"), fp("c")]);
        assert_eq!(h.as_slice().len(), 3);
    }
}
