use std::path::{Path, PathBuf};

use anyhow::Context;
use meta_agent::{AgentConfig, Insight, MetaAgent};
use serde_json::Value;

use crate::input;

/// Demo threshold when neither flag, config file nor environment sets one.
const DEMO_THRESHOLD: f64 = 0.5;

/// Command-line values that take precedence over loaded configuration.
pub struct Overrides {
    pub config: Option<PathBuf>,
    pub threshold: Option<f64>,
    pub output_dir: Option<PathBuf>,
}

impl Overrides {
    fn resolve(&self, defaults: AgentConfig) -> anyhow::Result<AgentConfig> {
        let mut config = AgentConfig::load_with_defaults(defaults, self.config.as_deref())
            .context("failed to load configuration")?;
        if let Some(threshold) = self.threshold {
            config.threshold = threshold;
        }
        if let Some(dir) = &self.output_dir {
            config.output_dir = dir.clone();
        }
        Ok(config)
    }
}

pub fn run(overrides: &Overrides, path: &Path) -> anyhow::Result<()> {
    let config = overrides.resolve(AgentConfig::default())?;
    let records = input::read_records(path)?;
    tracing::info!(records = records.len(), source = %path.display(), "records loaded");
    synthesize(&config, &records)
}

pub fn demo(overrides: &Overrides) -> anyhow::Result<()> {
    let config = overrides.resolve(AgentConfig::with_threshold(DEMO_THRESHOLD))?;
    synthesize(&config, &input::demo_records())
}

pub fn fingerprint(path: &Path) -> anyhow::Result<()> {
    for record in input::read_records(path)? {
        let fp = meta_agent::fingerprint(&record).context("record has no canonical form")?;
        println!("{}", fp);
    }
    Ok(())
}

fn synthesize(config: &AgentConfig, records: &[Value]) -> anyhow::Result<()> {
    let mut agent = MetaAgent::from_config(config).context("invalid configuration")?;
    let batch = agent.synthesize(records).context("synthesis failed")?;

    for (idx, insight) in batch.iter().enumerate() {
        println!("{}", summary_line(idx + 1, insight));
    }

    let anomalies = batch.iter().filter(|i| i.anomaly).count();
    let state = agent.state();
    println!(
        "{} records, {} novel | insight_level {:.4} | curiosity {:.2}",
        batch.len(),
        anomalies,
        state.insight_level,
        state.curiosity
    );
    Ok(())
}

fn summary_line(position: usize, insight: &Insight) -> String {
    format!(
        "{:>4}  {}  {:<7}  {}",
        position,
        insight.fingerprint.short(12),
        if insight.anomaly { "NOVEL" } else { "stable" },
        insight.note
    )
}
