//! Accumulator configuration

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{AgentError, AgentResult};
use crate::persistence::{TimestampedJsonWriter, DEFAULT_FILE_PREFIX};

/// Default anomaly threshold.
pub const DEFAULT_THRESHOLD: f64 = 0.7;

/// Environment variable prefix for configuration overrides.
pub const ENV_PREFIX: &str = "META_AGENT";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Anomaly sensitivity; lower values flag more records.
    #[serde(default = "default_threshold")]
    pub threshold: f64,

    /// Directory that receives insight archives
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Archive file name prefix
    #[serde(default = "default_file_prefix")]
    pub file_prefix: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            output_dir: default_output_dir(),
            file_prefix: default_file_prefix(),
        }
    }
}

fn default_threshold() -> f64 {
    DEFAULT_THRESHOLD
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_file_prefix() -> String {
    DEFAULT_FILE_PREFIX.to_string()
}

impl AgentConfig {
    /// Config with the given threshold and defaults elsewhere.
    pub fn with_threshold(threshold: f64) -> Self {
        Self {
            threshold,
            ..Default::default()
        }
    }

    /// Load configuration: defaults, then an optional file, then
    /// `META_AGENT_*` environment variables (`__` separates nested keys).
    pub fn load(path: Option<&Path>) -> AgentResult<Self> {
        Self::load_with_defaults(AgentConfig::default(), path)
    }

    /// Like [`AgentConfig::load`], with `defaults` as the bottom layer.
    pub fn load_with_defaults(defaults: AgentConfig, path: Option<&Path>) -> AgentResult<Self> {
        let mut builder = config::Config::builder();

        builder = builder.add_source(config::Config::try_from(&defaults)?);

        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(true));
        }

        builder = builder.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config: AgentConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the accumulator cannot work with.
    pub fn validate(&self) -> AgentResult<()> {
        if !self.threshold.is_finite() {
            return Err(AgentError::InvalidConfig(format!(
                "threshold must be a finite number, got {}",
                self.threshold
            )));
        }
        if self.file_prefix.is_empty() {
            return Err(AgentError::InvalidConfig("file_prefix must not be empty".into()));
        }
        if self.file_prefix.contains(['/', '\\']) {
            return Err(AgentError::InvalidConfig(format!(
                "file_prefix must not contain path separators: {}",
                self.file_prefix
            )));
        }
        if !(0.0..=1.0).contains(&self.threshold) {
            tracing::warn!(
                threshold = self.threshold,
                "threshold outside [0, 1]; every record will be classified the same way"
            );
        }
        Ok(())
    }

    /// Archive writer described by this config.
    pub fn writer(&self) -> TimestampedJsonWriter {
        TimestampedJsonWriter::new(&self.output_dir).with_prefix(self.file_prefix.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AgentConfig::default();
        assert_eq!(config.threshold, 0.7);
        assert_eq!(config.output_dir, PathBuf::from("."));
        assert_eq!(config.file_prefix, "MetaAgent_Insights");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_with_threshold() {
        let config = AgentConfig::with_threshold(0.5);
        assert_eq!(config.threshold, 0.5);
        assert_eq!(config.file_prefix, DEFAULT_FILE_PREFIX);
    }

    #[test]
    fn test_rejects_non_finite_threshold() {
        for bad in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let err = AgentConfig::with_threshold(bad).validate().unwrap_err();
            assert!(matches!(err, AgentError::InvalidConfig(_)));
        }
    }

    #[test]
    fn test_out_of_range_threshold_is_allowed() {
        assert!(AgentConfig::with_threshold(1.5).validate().is_ok());
        assert!(AgentConfig::with_threshold(-0.5).validate().is_ok());
    }

    #[test]
    fn test_rejects_bad_prefix() {
        let mut config = AgentConfig::default();
        config.file_prefix = String::new();
        assert!(config.validate().is_err());
        config.file_prefix = "../escape".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_from_toml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("agent.toml");
        std::fs::write(&path, "threshold = 0.25\noutput_dir = \"archive\"\n").unwrap();

        let config = AgentConfig::load(Some(&path)).unwrap();
        assert_eq!(config.threshold, 0.25);
        assert_eq!(config.output_dir, PathBuf::from("archive"));
        assert_eq!(config.file_prefix, DEFAULT_FILE_PREFIX);
    }

    #[test]
    fn test_file_overrides_custom_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("agent.toml");
        std::fs::write(&path, "threshold = 0.9\n").unwrap();

        let base = AgentConfig::with_threshold(0.5);
        let config = AgentConfig::load_with_defaults(base.clone(), Some(&path)).unwrap();
        assert_eq!(config.threshold, 0.9);

        let empty = dir.path().join("empty.toml");
        std::fs::write(&empty, "").unwrap();
        let config = AgentConfig::load_with_defaults(base, Some(&empty)).unwrap();
        assert_eq!(config.threshold, 0.5);
    }

    #[test]
    fn test_load_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = AgentConfig::load(Some(&dir.path().join("absent.toml"))).unwrap_err();
        assert!(matches!(err, AgentError::InvalidConfig(_)));
    }

    #[test]
    fn test_writer_uses_config() {
        let mut config = AgentConfig::default();
        config.output_dir = PathBuf::from("/var/insights");
        config.file_prefix = "Audit".into();
        let writer = config.writer();
        assert_eq!(writer.dir(), Path::new("/var/insights"));
    }
}
