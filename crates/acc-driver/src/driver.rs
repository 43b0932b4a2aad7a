//! Sequential variant driver.
//!
//! One variant at a time: write its config, snapshot the output root, run the
//! engine, settle, snapshot again, resolve the run directory, digest the
//! journals. The first failure aborts the batch.

use std::env;
use std::fs;
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use anyhow::Context;
use tracing::{debug, info};

use acc_config::{
    default_matrix, validate_matrix, ConfigDocument, HarnessSettings, VariantSpec,
    ENV_ENGINE_PROGRAM,
};
use acc_journal::{JournalCapture, JournalPair};
use acc_rundir::{resolve, RunDirectorySnapshot};

use crate::engine::{parse_command_line, EngineCommand};
use crate::error::{require_existing, DriverError};
use crate::report::{display_relative, AcceptanceReport, VariantResult};

pub const DEFAULT_SCRATCH_DIR: &str = "acceptance_tmp";

/// Everything one batch needs, fully resolved.
///
/// Paths are absolute after [`DriverConfig::from_settings`]; relative inputs
/// are taken relative to `workspace_root`.
#[derive(Debug, Clone)]
pub struct DriverConfig {
    pub engine: EngineCommand,
    pub baseline_config: PathBuf,
    pub output_root: PathBuf,
    pub scratch_dir: PathBuf,
    /// Engine working directory; report paths are shown relative to it.
    pub workspace_root: PathBuf,
    pub settle_delay: Duration,
    pub exposure_symbol: String,
    pub variants: Vec<VariantSpec>,
}

impl DriverConfig {
    /// Build from merged settings. The engine program falls back to
    /// `ACC_ENGINE_PROGRAM` when the settings carry none.
    pub fn from_settings(settings: &HarnessSettings) -> Result<Self, DriverError> {
        let env_program = env::var(ENV_ENGINE_PROGRAM)
            .ok()
            .filter(|v| !v.trim().is_empty());
        Self::from_settings_with_env(settings, env_program.as_deref())
    }

    pub fn from_settings_with_env(
        settings: &HarnessSettings,
        env_program: Option<&str>,
    ) -> Result<Self, DriverError> {
        let engine = match (settings.engine.program.as_deref(), env_program) {
            (Some(program), _) => EngineCommand::new(program),
            (None, Some(line)) => parse_command_line(line)?,
            (None, None) => {
                return Err(DriverError::missing(
                    "engine program",
                    format!("set engine.program, --engine, or {ENV_ENGINE_PROGRAM}"),
                ))
            }
        };
        let engine = engine.with_args(settings.engine.args.iter().cloned());

        let workspace_root = settings
            .paths
            .workspace_root
            .clone()
            .unwrap_or_else(|| PathBuf::from("."));
        require_existing("workspace root", &workspace_root)?;
        let workspace_root = fs::canonicalize(&workspace_root)
            .with_context(|| format!("canonicalize {}", workspace_root.display()))?;

        let baseline_config = settings
            .paths
            .baseline_config
            .as_deref()
            .ok_or_else(|| {
                DriverError::missing("baseline config", "set paths.baseline_config or --baseline-config")
            })?;
        let output_root = settings
            .paths
            .output_root
            .as_deref()
            .ok_or_else(|| {
                DriverError::missing("output root", "set paths.output_root or --output-root")
            })?;
        let scratch_dir = settings
            .paths
            .scratch_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SCRATCH_DIR));

        Ok(Self {
            engine,
            baseline_config: workspace_root.join(baseline_config),
            output_root: workspace_root.join(output_root),
            scratch_dir: workspace_root.join(scratch_dir),
            settle_delay: Duration::from_millis(settings.settle_ms()),
            exposure_symbol: settings.exposure_symbol().to_string(),
            variants: settings.variant_specs().unwrap_or_else(default_matrix),
            workspace_root,
        })
    }
}

// ---------------------------------------------------------------------------
// Driver
// ---------------------------------------------------------------------------

pub struct VariantDriver {
    cfg: DriverConfig,
}

impl VariantDriver {
    pub fn new(cfg: DriverConfig) -> Self {
        Self { cfg }
    }

    pub fn config(&self) -> &DriverConfig {
        &self.cfg
    }

    /// Run every variant in order and collect the report.
    pub fn run(&self) -> Result<AcceptanceReport, DriverError> {
        require_existing("baseline config", &self.cfg.baseline_config)?;
        validate_matrix(&self.cfg.variants)?;

        let baseline = ConfigDocument::load(&self.cfg.baseline_config)?;
        fs::create_dir_all(&self.cfg.scratch_dir)
            .with_context(|| format!("create_dir_all {}", self.cfg.scratch_dir.display()))?;

        info!(
            "acceptance start variants={} output_root={} settle_ms={}",
            self.cfg.variants.len(),
            self.cfg.output_root.display(),
            self.cfg.settle_delay.as_millis()
        );

        let mut report = AcceptanceReport::new();
        for spec in &self.cfg.variants {
            let result = self.run_variant(spec, &baseline)?;
            report.push(spec.name.clone(), result);
        }

        info!("acceptance done variants={}", report.len());
        Ok(report)
    }

    /// One variant, start to finish.
    pub fn run_variant(
        &self,
        spec: &VariantSpec,
        baseline: &ConfigDocument,
    ) -> Result<VariantResult, DriverError> {
        let run_id = spec.run_id();
        let scratch_path = self.write_variant_config(spec, baseline)?;

        let before = RunDirectorySnapshot::capture(&self.cfg.output_root)?;
        debug!("snapshot before variant={} dirs={}", spec.name, before.len());

        self.cfg
            .engine
            .invoke(&spec.name, &scratch_path, &run_id, &self.cfg.workspace_root)?;

        if !self.cfg.settle_delay.is_zero() {
            thread::sleep(self.cfg.settle_delay);
        }

        let after = RunDirectorySnapshot::capture(&self.cfg.output_root)?;
        debug!("snapshot after variant={} dirs={}", spec.name, after.len());

        let resolution =
            resolve(&self.cfg.output_root, &before, &after).map_err(|source| {
                DriverError::Detection {
                    variant: spec.name.clone(),
                    source,
                }
            })?;
        let run_dir = resolution.run_dir();
        info!(
            "run dir variant={} rule={} dir={}",
            spec.name,
            resolution.rule.as_str(),
            run_dir.display()
        );

        let pair = JournalPair::locate(&run_dir).map_err(|source| DriverError::MissingJournal {
            variant: spec.name.clone(),
            source,
            candidates: resolution.candidates.clone(),
        })?;
        let capture = JournalCapture::read(&pair)?;

        let result = VariantResult::new(
            display_relative(&self.cfg.workspace_root, &run_dir),
            capture.events_sha(),
            capture.trades_sha(),
            capture.markers,
        );
        info!(
            "variant done variant={} events_sha={} trades_sha={} trades_file={}",
            spec.name,
            result.events_sha,
            result.trades_sha,
            pair.has_trades()
        );
        Ok(result)
    }

    fn write_variant_config(
        &self,
        spec: &VariantSpec,
        baseline: &ConfigDocument,
    ) -> Result<PathBuf, DriverError> {
        let doc = spec.apply(baseline, &self.cfg.exposure_symbol);
        let path = self.cfg.scratch_dir.join(spec.scratch_file_name());
        doc.write_compact(&path)?;

        info!(
            "variant config variant={} run_id={} path={} config_hash={}",
            spec.name,
            spec.run_id(),
            path.display(),
            doc.config_hash()?
        );
        debug!(
            "variant overrides variant={} changed={:?}",
            spec.name,
            baseline.changed_leaf_pointers(&doc)
        );
        Ok(path)
    }
}
