//! # meta-agent
//!
//! A stateful novelty accumulator over a stream of JSON records.
//!
//! Every record is fingerprinted, compared against how often that
//! fingerprint has been seen so far, and flagged as anomalous when it is
//! rare enough. Anomalies nudge two state scalars upward, and each
//! synthesized batch is archived to its own timestamped JSON file.
//!
//! ## Architecture
//!
//! ```text
//!   records ──► MetaAgent::synthesize
//!                  │
//!                  │  for each record, in order
//!                  ├──► fingerprint      (canonical JSON + SHA-256)
//!                  ├──► anomaly          (frequency vs threshold, pre-append)
//!                  ├──► History::push
//!                  └──► AgentState::update
//!                  │
//!                  ▼
//!           InsightBatch ──► InsightPersistence::save  (exactly once)
//!                                   │
//!                                   ▼
//!                 MetaAgent_Insights_<YYYYMMDD>_<HHMMSS>[_N].json
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use meta_agent::MetaAgent;
//! use serde_json::json;
//!
//! let mut agent = MetaAgent::new(0.5);
//! let batch = agent
//!     .synthesize(&[
//!         json!({"event": "login", "user": "alice"}),
//!         json!({"event": "login", "user": "alice"}),
//!     ])
//!     .unwrap();
//! assert!(batch[0].anomaly);
//! assert!(!batch[1].anomaly);
//! ```

#![deny(unsafe_code)]

pub mod agent;
pub mod anomaly;
pub mod config;
pub mod error;
mod finite;
pub mod fingerprint;
pub mod insight;
pub mod persistence;
pub mod state;

// ── Re-exports ──────────────────────────────────────────────────────────

pub use agent::MetaAgent;
pub use anomaly::{anomaly_score, frequency, is_anomaly, History};
pub use config::{AgentConfig, DEFAULT_THRESHOLD};
pub use error::{AgentError, AgentResult};
pub use fingerprint::{canonical_json, fingerprint, Fingerprint, FINGERPRINT_HEX_LEN};
pub use insight::{Insight, InsightBatch, NOVELTY_NOTE, STABLE_NOTE};
pub use persistence::{
    read_batch, InMemoryInsights, InsightPersistence, TimestampedJsonWriter, DEFAULT_FILE_PREFIX,
};
pub use state::{AgentState, CURIOSITY_CAP, INSIGHT_CEILING};
