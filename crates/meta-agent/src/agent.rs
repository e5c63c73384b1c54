//! The insight accumulator.
//!
//! `MetaAgent` owns the fingerprint history and the state scalars, and is
//! the only thing that mutates them. Each record goes through:
//!
//! ```text
//!   record ──► fingerprint ──► classify vs history ──► append ──► update state
//!                                                                     │
//!                                         Insight { ..., state copy } ◄┘
//! ```
//!
//! `synthesize` runs that for a whole batch in input order, annotates every
//! insight and hands the batch to persistence exactly once.

use std::path::PathBuf;

use chrono::Utc;
use serde::Serialize;

use crate::anomaly::{self, History};
use crate::config::AgentConfig;
use crate::error::AgentResult;
use crate::fingerprint::{to_record_value, Fingerprint};
use crate::insight::{Insight, InsightBatch};
use crate::persistence::{InsightPersistence, TimestampedJsonWriter};
use crate::state::AgentState;

/// Stateful novelty accumulator.
///
/// Single-owner: `reflect` reads then appends history, so concurrent callers
/// must serialize access to one instance themselves.
pub struct MetaAgent {
    threshold: f64,
    history: History,
    state: AgentState,
    persistence: Box<dyn InsightPersistence>,
}

impl MetaAgent {
    /// Accumulator writing archives to the current directory.
    pub fn new(threshold: f64) -> Self {
        Self::with_persistence(threshold, TimestampedJsonWriter::default())
    }

    /// Accumulator built from a validated config.
    pub fn from_config(config: &AgentConfig) -> AgentResult<Self> {
        config.validate()?;
        Ok(Self::with_persistence(config.threshold, config.writer()))
    }

    pub fn with_persistence(threshold: f64, persistence: impl InsightPersistence + 'static) -> Self {
        Self {
            threshold,
            history: History::new(),
            state: AgentState::new(),
            persistence: Box::new(persistence),
        }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn state(&self) -> AgentState {
        self.state
    }

    /// Classify one record and fold it into history and state.
    ///
    /// The returned insight carries no note; `synthesize` attaches it.
    pub fn reflect<T: Serialize + ?Sized>(&mut self, record: &T) -> AgentResult<Insight> {
        let input = to_record_value(record)?;
        let fingerprint = Fingerprint::of_value(&input);

        let score = anomaly::anomaly_score(&fingerprint, &self.history);
        let is_anomaly = anomaly::is_anomaly(&fingerprint, &self.history, self.threshold);
        self.history.push(fingerprint.clone());
        self.state.update(is_anomaly);

        tracing::debug!(
            fingerprint = fingerprint.short(12),
            score,
            anomaly = is_anomaly,
            insight_level = self.state.insight_level,
            curiosity = self.state.curiosity,
            "record classified"
        );

        Ok(Insight {
            input,
            fingerprint,
            anomaly: is_anomaly,
            state: self.state,
            timestamp: Utc::now(),
            note: String::new(),
        })
    }

    /// Classify a batch in order, annotate it and persist it once.
    ///
    /// A record without a JSON form aborts the call before anything is
    /// written; records ahead of it stay in history.
    pub fn synthesize<T: Serialize>(&mut self, records: &[T]) -> AgentResult<InsightBatch> {
        let mut batch = Vec::with_capacity(records.len());
        for record in records {
            batch.push(self.reflect(record)?.annotated());
        }

        let anomalies = batch.iter().filter(|i| i.anomaly).count();
        tracing::info!(
            records = batch.len(),
            anomalies,
            history = self.history.len(),
            "batch synthesized"
        );

        self.autosave(&batch)?;
        Ok(batch)
    }

    /// Hand a batch to the configured persistence.
    pub fn autosave(&self, batch: &[Insight]) -> AgentResult<PathBuf> {
        self.persistence.save(batch)
    }
}

impl std::fmt::Debug for MetaAgent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetaAgent")
            .field("threshold", &self.threshold)
            .field("history_len", &self.history.len())
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}
