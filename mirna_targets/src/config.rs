use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::analysis::tool_comparison::ComparisonColumns;

pub const CONFIG_FILE: &str = "mirna_targets.json";

/// Settings shared by every subcommand. Missing keys fall back to defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub base_url: String,
    pub user_agent: String,
    pub timeout_secs: u64,
    /// How often to look for the custom prediction result file.
    pub poll_attempts: u32,
    pub poll_interval_ms: u64,
    /// Post "Return to Custom Prediction" after retrieving a result.
    pub reset_session: bool,
    pub columns: ComparisonColumns,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            base_url: "http://mirdb.org".to_string(),
            user_agent: format!("mirna_targets/{}", env!("CARGO_PKG_VERSION")),
            timeout_secs: 60,
            poll_attempts: 5,
            poll_interval_ms: 2_000,
            reset_session: true,
            columns: ComparisonColumns::default(),
        }
    }
}

pub fn default_config_path(project_root: &Path) -> PathBuf {
    project_root.join(CONFIG_FILE)
}

/// Read `path` if it exists, otherwise use defaults.
pub fn load_config(path: &Path) -> anyhow::Result<PipelineConfig> {
    if !path.exists() {
        debug!("No config at {}, using defaults", path.display());
        return Ok(PipelineConfig::default());
    }

    let text = fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    let config: PipelineConfig = serde_json::from_str(&text)
        .with_context(|| format!("parsing config {}", path.display()))?;
    info!("Loaded config from {}", path.display());
    debug!("Config: {:?}", config);
    Ok(config)
}

pub fn write_default_config(path: &Path, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        bail!("{} already exists (use --force to overwrite)", path.display());
    }
    let config = PipelineConfig::default();
    fs::write(path, serde_json::to_string_pretty(&config)?)
        .with_context(|| format!("writing config {}", path.display()))?;
    info!("Wrote default config to {}", path.display());
    Ok(())
}
