use figment::{Figment, providers::{Env, Format, Yaml}};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::UplatError;

/// Top-level uplat configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UplatConfig {
    #[serde(default)]
    pub input: InputConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub extract: ExtractConfig,
}

/// Where access logs are read from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputConfig {
    #[serde(default = "default_input_dir")]
    pub dir: PathBuf,
    /// Only files whose name starts with this prefix are read.
    #[serde(default = "default_prefix")]
    pub prefix: String,
}

/// Where charts are written and how large they are drawn.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Output directory. `None` = same as the input directory.
    #[serde(default)]
    pub dir: Option<PathBuf>,
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
}

/// Record extraction policy.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractConfig {
    #[serde(default)]
    pub missing_response_time: MissingResponseTime,
}

/// What to do with a record that has no `upstream_response_time`.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MissingResponseTime {
    /// Treat the record as a zero-latency sample.
    #[default]
    Zero,
    /// Drop the record.
    Skip,
}

// ── Defaults ──────────────────────────────────────────────────

fn default_input_dir() -> PathBuf { PathBuf::from(".") }
fn default_prefix() -> String { "access.log-".into() }
fn default_width() -> u32 { 1280 }
fn default_height() -> u32 { 720 }

// ── Impls ─────────────────────────────────────────────────────

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            dir: default_input_dir(),
            prefix: default_prefix(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: None,
            width: default_width(),
            height: default_height(),
        }
    }
}

impl UplatConfig {
    /// Load configuration from YAML file + env overrides. A missing file
    /// contributes nothing; env still applies.
    ///
    /// Env keys nest on a double underscore, e.g.
    /// `UPLAT_EXTRACT__MISSING_RESPONSE_TIME=skip`.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let config: UplatConfig = Figment::new()
            .merge(Yaml::file(path))
            .merge(Env::prefixed("UPLAT_").split("__"))
            .extract()
            .map_err(|e| UplatError::ConfigError(e.to_string()))?;
        Ok(config)
    }

    /// Effective output directory (unset → input directory).
    pub fn output_dir(&self) -> &Path {
        self.output.dir.as_deref().unwrap_or(&self.input.dir)
    }
}
