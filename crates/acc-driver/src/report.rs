//! Acceptance report: one entry per variant, in matrix order.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

use acc_journal::MarkerLines;

/// Outcome of one variant run.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantResult {
    /// Run directory, relative to the workspace root when possible.
    pub run_dir: String,
    pub events_sha: String,
    pub trades_sha: String,
    #[serde(default)]
    pub eval_line: String,
    #[serde(default)]
    pub alert_block_exposure: String,
    #[serde(default)]
    pub alert_block_drawdown: String,
}

impl VariantResult {
    pub fn new(run_dir: String, events_sha: String, trades_sha: String, markers: MarkerLines) -> Self {
        Self {
            run_dir,
            events_sha,
            trades_sha,
            eval_line: markers.eval_line,
            alert_block_exposure: markers.alert_block_exposure,
            alert_block_drawdown: markers.alert_block_drawdown,
        }
    }
}

/// Variant name → result. Serializes as a JSON object whose keys keep
/// insertion order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AcceptanceReport {
    entries: Vec<(String, VariantResult)>,
}

impl AcceptanceReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, variant: impl Into<String>, result: VariantResult) {
        self.entries.push((variant.into(), result));
    }

    pub fn get(&self, variant: &str) -> Option<&VariantResult> {
        self.entries
            .iter()
            .find(|(name, _)| name == variant)
            .map(|(_, r)| r)
    }

    pub fn variant_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &VariantResult)> + '_ {
        self.entries.iter().map(|(name, r)| (name.as_str(), r))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn to_pretty_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("serialize acceptance report failed")
    }
}

impl Serialize for AcceptanceReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, result) in &self.entries {
            map.serialize_entry(name, result)?;
        }
        map.end()
    }
}

/// Render `path` relative to `workspace_root`, or in full when it lies
/// outside. Separators are normalized to `/`.
pub fn display_relative(workspace_root: &Path, path: &Path) -> String {
    let shown = path.strip_prefix(workspace_root).unwrap_or(path);
    shown.to_string_lossy().replace('\\', "/")
}

// ---------------------------------------------------------------------------
// Baseline check
// ---------------------------------------------------------------------------

/// Load a previously accepted report. Digests are upper-cased so baselines
/// recorded in lowercase hex compare equal.
pub fn load_baseline_report(path: &Path) -> Result<BTreeMap<String, VariantResult>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("read baseline report failed: {}", path.display()))?;
    let mut baseline: BTreeMap<String, VariantResult> = serde_json::from_str(&raw)
        .with_context(|| format!("parse baseline report failed: {}", path.display()))?;
    for r in baseline.values_mut() {
        r.events_sha.make_ascii_uppercase();
        r.trades_sha.make_ascii_uppercase();
    }
    Ok(baseline)
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct BaselineMismatch {
    pub variant: String,
    /// `events_sha`, `trades_sha`, or `variant` for a missing/extra entry.
    pub field: &'static str,
    pub expected: String,
    pub actual: String,
}

/// Digest differences between `report` and an accepted baseline.
///
/// Only digests are compared, ignoring hex case; `run_dir` and marker lines
/// are ignored.
pub fn compare_with_baseline(
    report: &AcceptanceReport,
    baseline: &BTreeMap<String, VariantResult>,
) -> Vec<BaselineMismatch> {
    let mut out = Vec::new();

    for (name, actual) in report.iter() {
        let Some(expected) = baseline.get(name) else {
            out.push(BaselineMismatch {
                variant: name.to_string(),
                field: "variant",
                expected: "<absent>".to_string(),
                actual: "present".to_string(),
            });
            continue;
        };
        if !expected.events_sha.eq_ignore_ascii_case(&actual.events_sha) {
            out.push(BaselineMismatch {
                variant: name.to_string(),
                field: "events_sha",
                expected: expected.events_sha.clone(),
                actual: actual.events_sha.clone(),
            });
        }
        if !expected.trades_sha.eq_ignore_ascii_case(&actual.trades_sha) {
            out.push(BaselineMismatch {
                variant: name.to_string(),
                field: "trades_sha",
                expected: expected.trades_sha.clone(),
                actual: actual.trades_sha.clone(),
            });
        }
    }

    for name in baseline.keys() {
        if report.get(name).is_none() {
            out.push(BaselineMismatch {
                variant: name.clone(),
                field: "variant",
                expected: "present".to_string(),
                actual: "<absent>".to_string(),
            });
        }
    }

    out
}
