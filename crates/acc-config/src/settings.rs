//! Harness settings file.
//!
//! ```yaml
//! engine:
//!   program: dotnet
//!   args: ["run", "-c", "Release", "--project", "src/Engine.Sim", "--"]
//! paths:
//!   baseline_config: tests/fixtures/backtest_m0/config.backtest-m0.json
//!   output_root: journals/M0
//!   scratch_dir: acceptance_tmp
//!   workspace_root: .
//! settle_ms: 250
//! exposure_symbol: EURUSD
//! ```
//!
//! Every field is optional here; the driver decides which are required.
//! Unknown keys are rejected so a typo cannot silently fall back to a default.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::variant::{RiskMode, ThresholdOverride, VariantSpec};

/// Settle delay before the post-run snapshot when nothing overrides it.
pub const DEFAULT_SETTLE_MS: u64 = 250;
pub const DEFAULT_EXPOSURE_SYMBOL: &str = "EURUSD";
/// Fallback for the engine program when neither flag nor file provides one.
pub const ENV_ENGINE_PROGRAM: &str = "ACC_ENGINE_PROGRAM";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HarnessSettings {
    #[serde(default)]
    pub engine: EngineSettings,
    #[serde(default)]
    pub paths: PathSettings,
    pub settle_ms: Option<u64>,
    pub exposure_symbol: Option<String>,
    /// Custom matrix. Empty means the default four variants.
    #[serde(default)]
    pub variants: Vec<VariantSettings>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EngineSettings {
    pub program: Option<String>,
    /// Leading arguments; `--config <path> --run-id <id>` are appended.
    #[serde(default)]
    pub args: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PathSettings {
    pub baseline_config: Option<PathBuf>,
    pub output_root: Option<PathBuf>,
    pub scratch_dir: Option<PathBuf>,
    /// Engine working directory; report `run_dir` values are relative to it.
    pub workspace_root: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VariantSettings {
    pub name: String,
    pub risk: RiskMode,
    #[serde(default)]
    pub thresholds: ThresholdOverride,
}

impl From<&VariantSettings> for VariantSpec {
    fn from(v: &VariantSettings) -> Self {
        VariantSpec::new(v.name.clone(), v.risk, v.thresholds)
    }
}

impl HarnessSettings {
    pub fn from_yaml_str(raw: &str) -> Result<Self> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(raw).context("invalid harness settings yaml")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("read settings failed: {}", path.display()))?;
        Self::from_yaml_str(&raw)
            .with_context(|| format!("parse settings failed: {}", path.display()))
    }

    pub fn settle_ms(&self) -> u64 {
        self.settle_ms.unwrap_or(DEFAULT_SETTLE_MS)
    }

    pub fn exposure_symbol(&self) -> &str {
        self.exposure_symbol
            .as_deref()
            .unwrap_or(DEFAULT_EXPOSURE_SYMBOL)
    }

    /// Configured matrix, or `None` to use the default one.
    pub fn variant_specs(&self) -> Option<Vec<VariantSpec>> {
        if self.variants.is_empty() {
            None
        } else {
            Some(self.variants.iter().map(VariantSpec::from).collect())
        }
    }
}
