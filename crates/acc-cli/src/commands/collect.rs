//! `acc collect`: run the variant matrix and print the digest report.

use std::path::{Path, PathBuf};

use clap::Args;
use tracing::{info, warn};

use acc_config::HarnessSettings;
use acc_driver::{
    compare_with_baseline, exit, load_baseline_report, DriverConfig, DriverError, VariantDriver,
};

#[derive(Args, Debug, Default)]
pub struct CollectArgs {
    /// Harness settings YAML; flags below override its values
    #[arg(long)]
    pub settings: Option<PathBuf>,

    /// Engine program (falls back to ACC_ENGINE_PROGRAM)
    #[arg(long)]
    pub engine: Option<String>,

    /// Leading engine argument; repeat for several. Replaces engine.args
    #[arg(long = "engine-arg", allow_hyphen_values = true)]
    pub engine_args: Vec<String>,

    /// Baseline engine config (JSON or YAML)
    #[arg(long)]
    pub baseline_config: Option<PathBuf>,

    /// Directory the engine writes run directories into
    #[arg(long)]
    pub output_root: Option<PathBuf>,

    /// Where per-variant config files are written
    #[arg(long)]
    pub scratch_dir: Option<PathBuf>,

    /// Engine working directory; relative paths resolve against it
    #[arg(long)]
    pub workspace_root: Option<PathBuf>,

    /// Fixed delay before the post-run snapshot
    #[arg(long)]
    pub settle_ms: Option<u64>,

    /// Symbol whose exposure cap the breach variants override
    #[arg(long)]
    pub exposure_symbol: Option<String>,

    /// Accepted report to compare digests against (exit 6 on mismatch)
    #[arg(long)]
    pub expect: Option<PathBuf>,
}

impl CollectArgs {
    /// Layer flags over the settings file. A flag always wins.
    pub fn merge_into(&self, settings: &mut HarnessSettings) {
        if let Some(p) = &self.engine {
            settings.engine.program = Some(p.clone());
        }
        if !self.engine_args.is_empty() {
            settings.engine.args = self.engine_args.clone();
        }
        if let Some(p) = &self.baseline_config {
            settings.paths.baseline_config = Some(p.clone());
        }
        if let Some(p) = &self.output_root {
            settings.paths.output_root = Some(p.clone());
        }
        if let Some(p) = &self.scratch_dir {
            settings.paths.scratch_dir = Some(p.clone());
        }
        if let Some(p) = &self.workspace_root {
            settings.paths.workspace_root = Some(p.clone());
        }
        if let Some(ms) = self.settle_ms {
            settings.settle_ms = Some(ms);
        }
        if let Some(sym) = &self.exposure_symbol {
            settings.exposure_symbol = Some(sym.clone());
        }
    }
}

fn load_settings(path: Option<&Path>) -> Result<HarnessSettings, DriverError> {
    match path {
        None => Ok(HarnessSettings::default()),
        Some(p) if !p.is_file() => Err(DriverError::missing_path("settings file", p)),
        Some(p) => Ok(HarnessSettings::load(p)?),
    }
}

/// Execute `acc collect`.
pub fn collect(args: CollectArgs) -> Result<u8, DriverError> {
    let mut settings = load_settings(args.settings.as_deref())?;
    args.merge_into(&mut settings);

    // Load the expectation first so a bad path fails before any engine run.
    let expected = match &args.expect {
        Some(p) if !p.is_file() => return Err(DriverError::missing_path("expected report", p)),
        Some(p) => Some(load_baseline_report(p)?),
        None => None,
    };

    let cfg = DriverConfig::from_settings(&settings)?;
    let report = VariantDriver::new(cfg).run()?;
    super::print_json(&report)?;

    let Some(expected) = expected else {
        return Ok(exit::OK);
    };

    let mismatches = compare_with_baseline(&report, &expected);
    if mismatches.is_empty() {
        info!("baseline check ok variants={}", report.len());
        return Ok(exit::OK);
    }
    for m in &mismatches {
        warn!(
            "BASELINE_MISMATCH variant={} field={} expected={} actual={}",
            m.variant, m.field, m.expected, m.actual
        );
    }
    Err(DriverError::ParityMismatch {
        mismatches: mismatches.len(),
    })
}
