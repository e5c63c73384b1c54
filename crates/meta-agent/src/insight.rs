//! Per-record classification results.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::fingerprint::Fingerprint;
use crate::state::AgentState;

/// Note attached to anomalous records.
pub const NOVELTY_NOTE: &str = "⚡ Novelty detected — insight elevated";

/// Note attached to everything else.
pub const STABLE_NOTE: &str = "Stable pattern";

/// One record's classification, annotated and timestamped.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Insight {
    /// The record exactly as supplied.
    pub input: Value,
    pub fingerprint: Fingerprint,
    pub anomaly: bool,
    /// State right after this record was folded in.
    pub state: AgentState,
    /// Wall-clock time of classification, written as float epoch seconds.
    #[serde(with = "epoch_seconds")]
    pub timestamp: DateTime<Utc>,
    /// Empty until the synthesizer annotates the insight.
    #[serde(default)]
    pub note: String,
}

/// Ordered output of one synthesis call.
pub type InsightBatch = Vec<Insight>;

impl Insight {
    /// Attach the note matching the anomaly flag.
    pub fn annotate(&mut self) {
        self.note = note_for(self.anomaly).to_string();
    }

    pub fn annotated(mut self) -> Self {
        self.annotate();
        self
    }
}

pub fn note_for(anomaly: bool) -> &'static str {
    if anomaly {
        NOVELTY_NOTE
    } else {
        STABLE_NOTE
    }
}

/// `DateTime<Utc>` as fractional seconds since the Unix epoch.
pub mod epoch_seconds {
    use chrono::{DateTime, Utc};
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(dt: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        let secs = dt.timestamp() as f64 + f64::from(dt.timestamp_subsec_nanos()) / 1e9;
        serializer.serialize_f64(secs)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        if !secs.is_finite() {
            return Err(de::Error::custom("timestamp is not a finite number"));
        }
        let whole = secs.floor();
        let nanos = (((secs - whole) * 1e9).round() as u32).min(999_999_999);
        DateTime::from_timestamp(whole as i64, nanos)
            .ok_or_else(|| de::Error::custom(format!("timestamp out of range: {}", secs)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn sample(anomaly: bool) -> Insight {
        let input = json!({"event": "login", "user": "alice"});
        Insight {
            fingerprint: Fingerprint::of_value(&input),
            input,
            anomaly,
            state: AgentState::new(),
            timestamp: Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 45).unwrap(),
            note: String::new(),
        }
    }

    #[test]
    fn annotate_picks_note_from_flag() {
        assert_eq!(sample(true).annotated().note, NOVELTY_NOTE);
        assert_eq!(sample(false).annotated().note, STABLE_NOTE);
    }

    #[test]
    fn serialized_shape() {
        let insight = sample(true).annotated();
        let v = serde_json::to_value(&insight).unwrap();

        assert_eq!(v["input"]["user"], "alice");
        assert_eq!(v["fingerprint"].as_str().unwrap().len(), 64);
        assert_eq!(v["anomaly"], true);
        assert_eq!(v["state"]["insight_level"], 1.0);
        assert_eq!(v["state"]["curiosity"], 1.0);
        assert_eq!(v["timestamp"].as_f64().unwrap(), 1_709_296_245.0);
        assert_eq!(v["note"], NOVELTY_NOTE);

        let keys: Vec<_> = v.as_object().unwrap().keys().cloned().collect();
        for expected in ["input", "fingerprint", "anomaly", "state", "timestamp", "note"] {
            assert!(keys.iter().any(|k| k == expected), "missing {}", expected);
        }
    }

    #[test]
    fn timestamp_keeps_sub_second_precision() {
        let mut insight = sample(false);
        insight.timestamp = Utc.timestamp_opt(1_700_000_000, 250_000_000).unwrap();
        let v = serde_json::to_value(&insight).unwrap();
        assert!((v["timestamp"].as_f64().unwrap() - 1_700_000_000.25).abs() < 1e-6);

        let back: Insight = serde_json::from_value(v).unwrap();
        let drift = (back.timestamp - insight.timestamp).num_microseconds().unwrap().abs();
        assert!(drift < 1_000);
    }

    #[test]
    fn archive_entry_without_note_deserializes() {
        let v = json!({
            "input": {"a": 1},
            "fingerprint": "00",
            "anomaly": false,
            "state": {"insight_level": 1.0, "curiosity": 1.0},
            "timestamp": 1_700_000_000.5,
        });
        let insight: Insight = serde_json::from_value(v).unwrap();
        assert!(insight.note.is_empty());
    }

    #[test]
    fn non_numeric_timestamp_is_rejected() {
        let v = json!({
            "input": {},
            "fingerprint": "00",
            "anomaly": false,
            "state": {"insight_level": 1.0, "curiosity": 1.0},
            "timestamp": "yesterday",
            "note": "",
        });
        assert!(serde_json::from_value::<Insight>(v).is_err());
    }
}
