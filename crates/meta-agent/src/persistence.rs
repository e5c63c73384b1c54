//! Insight persistence: archive each synthesized batch.
//!
//! Provides the `InsightPersistence` trait, a `TimestampedJsonWriter` that
//! writes every batch to its own timestamp-named JSON file, and an
//! `InMemoryInsights` store for tests and embedding.
//!
//! ## File naming
//!
//! ```text
//!   MetaAgent_Insights_20240301_123045.json      first batch in that second
//!   MetaAgent_Insights_20240301_123045_1.json    name already taken
//!   MetaAgent_Insights_20240301_123045_2.json    ...
//! ```

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{DateTime, Utc};

use crate::error::{AgentError, AgentResult};
use crate::insight::{Insight, InsightBatch};

/// Default file name prefix for insight archives.
pub const DEFAULT_FILE_PREFIX: &str = "MetaAgent_Insights";

/// Extension of insight archives.
pub const ARCHIVE_EXTENSION: &str = "json";

/// Destination for synthesized insight batches.
pub trait InsightPersistence {
    /// Persist one whole batch, returning where it went.
    fn save(&self, batch: &[Insight]) -> AgentResult<PathBuf>;
}

/// Writes each batch to a fresh, timestamp-named JSON file.
///
/// Never overwrites: names are tried until a free one is found, and the
/// final create refuses to clobber a file that appeared in the meantime.
#[derive(Clone, Debug)]
pub struct TimestampedJsonWriter {
    dir: PathBuf,
    prefix: String,
}

impl TimestampedJsonWriter {
    /// Writer that places archives in `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            prefix: DEFAULT_FILE_PREFIX.to_string(),
        }
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Collision-free stem for `now`, second granularity.
    pub fn base_name(&self, now: DateTime<Utc>) -> String {
        format!("{}_{}", self.prefix, now.format("%Y%m%d_%H%M%S"))
    }

    /// First unused archive path for `now`.
    ///
    /// Tries the bare name, then `_1`, `_2`, ... with no upper bound.
    pub fn next_available_path(&self, now: DateTime<Utc>) -> PathBuf {
        let base = self.base_name(now);
        let mut path = self.dir.join(format!("{}.{}", base, ARCHIVE_EXTENSION));
        let mut counter: u64 = 1;
        while path.exists() {
            path = self
                .dir
                .join(format!("{}_{}.{}", base, counter, ARCHIVE_EXTENSION));
            counter += 1;
        }
        path
    }

    /// Write `batch` under the name derived from `now`.
    ///
    /// The archive is staged in a temp file inside the output directory and
    /// linked into place only once fully written, so a failed write leaves
    /// no archive behind.
    pub fn write_at(&self, batch: &[Insight], now: DateTime<Utc>) -> AgentResult<PathBuf> {
        crate::finite::check(batch).map_err(|e| {
            AgentError::Serialization(format!("insight batch serialization failed: {}", e))
        })?;
        let json = serde_json::to_string_pretty(batch).map_err(|e| {
            AgentError::Serialization(format!("insight batch serialization failed: {}", e))
        })?;

        if !self.dir.as_os_str().is_empty() && !self.dir.exists() {
            std::fs::create_dir_all(&self.dir)?;
        }

        let path = self.next_available_path(now);
        self.write_new(&path, json.as_bytes())?;

        tracing::info!(
            path = %path.display(),
            insights = batch.len(),
            bytes = json.len(),
            "insight batch archived"
        );
        println!("📝 Insights autonomously saved to: {}", path.display());

        Ok(path)
    }

    /// Stage `bytes` next to `path`, then move them there unless `path`
    /// already exists. The staged file is removed on every failure.
    fn write_new(&self, path: &Path, bytes: &[u8]) -> AgentResult<()> {
        let staging_dir = if self.dir.as_os_str().is_empty() {
            Path::new(".")
        } else {
            self.dir.as_path()
        };

        let mut staged = tempfile::Builder::new()
            .prefix(&format!(".{}", self.prefix))
            .suffix(".tmp")
            .tempfile_in(staging_dir)
            .map_err(|e| {
                AgentError::Persistence(format!(
                    "cannot stage archive in {}: {}",
                    staging_dir.display(),
                    e
                ))
            })?;
        staged.write_all(bytes)?;
        staged.as_file().sync_all()?;

        staged.persist_noclobber(path).map_err(|e| {
            AgentError::Persistence(format!("cannot create {}: {}", path.display(), e.error))
        })?;
        Ok(())
    }
}

impl Default for TimestampedJsonWriter {
    fn default() -> Self {
        Self::new(".")
    }
}

impl InsightPersistence for TimestampedJsonWriter {
    fn save(&self, batch: &[Insight]) -> AgentResult<PathBuf> {
        self.write_at(batch, Utc::now())
    }
}

/// Read an archive written by [`TimestampedJsonWriter`].
pub fn read_batch(path: impl AsRef<Path>) -> AgentResult<InsightBatch> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path)?;
    serde_json::from_str(&contents).map_err(|e| {
        AgentError::Persistence(format!("cannot parse {}: {}", path.display(), e))
    })
}

/// In-memory insight store (for testing and embedding).
pub struct InMemoryInsights {
    batches: Mutex<Vec<InsightBatch>>,
}

impl InMemoryInsights {
    pub fn new() -> Self {
        Self {
            batches: Mutex::new(Vec::new()),
        }
    }

    /// Every batch saved so far, oldest first.
    pub fn batches(&self) -> AgentResult<Vec<InsightBatch>> {
        let batches = self
            .batches
            .lock()
            .map_err(|_| AgentError::Persistence("insight store lock poisoned".into()))?;
        Ok(batches.clone())
    }

    pub fn save_count(&self) -> usize {
        self.batches.lock().map(|b| b.len()).unwrap_or(0)
    }
}

impl Default for InMemoryInsights {
    fn default() -> Self {
        Self::new()
    }
}

impl InsightPersistence for InMemoryInsights {
    fn save(&self, batch: &[Insight]) -> AgentResult<PathBuf> {
        let mut batches = self
            .batches
            .lock()
            .map_err(|_| AgentError::Persistence("insight store lock poisoned".into()))?;
        batches.push(batch.to_vec());
        Ok(PathBuf::from(format!("memory:{}", batches.len())))
    }
}

impl<P: InsightPersistence + ?Sized> InsightPersistence for std::sync::Arc<P> {
    fn save(&self, batch: &[Insight]) -> AgentResult<PathBuf> {
        (**self).save(batch)
    }
}
