//! Accumulator state: insight level and curiosity.
//!
//! Both scalars start at 1.0 and only ever move up, and only on anomalies.
//! `insight_level` saturates at [`INSIGHT_CEILING`] instead of overflowing
//! to infinity, which would have no JSON representation.

use serde::{Deserialize, Serialize};

/// Starting value for both scalars.
pub const INITIAL_LEVEL: f64 = 1.0;

/// Fractional growth of `insight_level` per anomaly.
pub const INSIGHT_GROWTH: f64 = 0.1;

/// Additive growth of `curiosity` per anomaly.
pub const CURIOSITY_STEP: f64 = 0.05;

/// Upper bound on `curiosity`.
pub const CURIOSITY_CAP: f64 = 2.0;

/// Largest value `insight_level` reaches.
pub const INSIGHT_CEILING: f64 = f64::MAX;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct AgentState {
    pub insight_level: f64,
    pub curiosity: f64,
}

impl AgentState {
    pub fn new() -> Self {
        Self {
            insight_level: INITIAL_LEVEL,
            curiosity: INITIAL_LEVEL,
        }
    }

    /// Fold one classification result into the state.
    pub fn update(&mut self, anomaly: bool) -> &mut Self {
        let hit = if anomaly { 1.0 } else { 0.0 };
        let grown = self.insight_level * (1.0 + INSIGHT_GROWTH * hit);
        self.insight_level = grown.min(INSIGHT_CEILING);
        self.curiosity = (self.curiosity + CURIOSITY_STEP * hit).min(CURIOSITY_CAP);
        self
    }

    pub fn is_curiosity_saturated(&self) -> bool {
        self.curiosity >= CURIOSITY_CAP
    }
}

impl Default for AgentState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn starts_at_one() {
        let s = AgentState::new();
        assert_eq!(s.insight_level, 1.0);
        assert_eq!(s.curiosity, 1.0);
        assert_eq!(s, AgentState::default());
    }

    #[test]
    fn anomaly_raises_both() {
        let mut s = AgentState::new();
        s.update(true);
        assert!((s.insight_level - 1.1).abs() < 1e-12);
        assert!((s.curiosity - 1.05).abs() < 1e-12);

        s.update(true);
        assert!((s.insight_level - 1.21).abs() < 1e-12);
        assert!((s.curiosity - 1.10).abs() < 1e-12);
    }

    #[test]
    fn stable_record_leaves_state_alone() {
        let mut s = AgentState::new();
        s.update(true);
        let before = s;
        s.update(false);
        assert_eq!(s, before);
    }

    #[test]
    fn curiosity_caps_at_two() {
        let mut s = AgentState::new();
        for _ in 0..100 {
            s.update(true);
        }
        assert_eq!(s.curiosity, CURIOSITY_CAP);
        assert!(s.is_curiosity_saturated());
        assert!(s.insight_level > 1000.0);
    }

    #[test]
    fn insight_level_saturates_instead_of_overflowing() {
        let mut s = AgentState::new();
        for _ in 0..8_000 {
            s.update(true);
        }
        assert!(s.insight_level.is_finite());
        assert_eq!(s.insight_level, INSIGHT_CEILING);

        s.update(true);
        assert_eq!(s.insight_level, INSIGHT_CEILING);

        let json = serde_json::to_value(s).unwrap();
        assert_eq!(json["insight_level"].as_f64(), Some(f64::MAX));
        let back: AgentState = serde_json::from_value(json).unwrap();
        assert_eq!(back, s);
    }

    #[test]
    fn update_returns_self_for_chaining() {
        let mut s = AgentState::new();
        let level = s.update(true).update(false).insight_level;
        assert!((level - 1.1).abs() < 1e-12);
    }

    #[test]
    fn serializes_with_field_names() {
        let json = serde_json::to_value(AgentState::new()).unwrap();
        assert_eq!(json["insight_level"], 1.0);
        assert_eq!(json["curiosity"], 1.0);
    }

    proptest! {
        /// Neither scalar ever decreases, and curiosity never passes its cap.
        #[test]
        fn state_is_monotone_and_bounded(flags in prop::collection::vec(any::<bool>(), 0..200)) {
            let mut s = AgentState::new();
            for flag in flags {
                let before = s;
                s.update(flag);
                prop_assert!(s.insight_level >= before.insight_level);
                prop_assert!(s.curiosity >= before.curiosity);
                prop_assert!(s.curiosity <= CURIOSITY_CAP);
                prop_assert!(s.insight_level.is_finite());
            }
        }
    }
}
