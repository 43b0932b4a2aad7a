//! Acceptance matrix: named mutations of the baseline engine config.

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::document::ConfigDocument;

/// Object holding feature-enablement flags (`risk` lives here).
pub const FEATURE_FLAGS_KEY: &str = "featureFlags";
/// Object holding risk-limit thresholds and toggles.
pub const RISK_CONFIG_KEY: &str = "riskConfig";

/// Exposure cap large enough that no fixture can breach it.
pub const UNBOUNDED_EXPOSURE: i64 = 999_999_999;
/// Drawdown cap large enough that no fixture can breach it.
pub const UNBOUNDED_DRAWDOWN_CCY: f64 = 999_999_999.0;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskMode {
    Off,
    Shadow,
    Active,
}

impl RiskMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskMode::Off => "off",
            RiskMode::Shadow => "shadow",
            RiskMode::Active => "active",
        }
    }
}

impl fmt::Display for RiskMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RiskMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "off" => Ok(RiskMode::Off),
            "shadow" => Ok(RiskMode::Shadow),
            "active" => Ok(RiskMode::Active),
            other => bail!("invalid risk mode '{}'. expected one of: off | shadow | active", other),
        }
    }
}

/// How a variant forces the threshold outcome.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThresholdOverride {
    /// Leave baseline limits as they are.
    #[default]
    Unchanged,
    /// Limits so high nothing can breach.
    NoBreach,
    /// Zero exposure cap on the configured symbol: the first order breaches.
    Breach,
}

/// One named row of the acceptance matrix.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VariantSpec {
    pub name: String,
    pub mode: RiskMode,
    pub thresholds: ThresholdOverride,
}

impl VariantSpec {
    pub fn new(name: impl Into<String>, mode: RiskMode, thresholds: ThresholdOverride) -> Self {
        Self {
            name: name.into(),
            mode,
            thresholds,
        }
    }

    /// Run identifier handed to the engine, e.g. `ACC-ACTIVE_WITH_BREACH`.
    pub fn run_id(&self) -> String {
        format!("ACC-{}", self.name.to_ascii_uppercase())
    }

    /// Scratch config file name, unique per variant name.
    pub fn scratch_file_name(&self) -> String {
        format!("acc.{}.json", self.name)
    }

    /// Derive this variant's document from `baseline`. `baseline` is not modified.
    pub fn apply(&self, baseline: &ConfigDocument, exposure_symbol: &str) -> ConfigDocument {
        let mut doc = baseline.clone();
        doc.set(FEATURE_FLAGS_KEY, "risk", Value::from(self.mode.as_str()));

        if matches!(self.mode, RiskMode::Shadow | RiskMode::Active) {
            doc.set(RISK_CONFIG_KEY, "emitEvaluations", Value::Bool(true));
        }
        if self.mode == RiskMode::Active {
            doc.set(RISK_CONFIG_KEY, "blockOnBreach", Value::Bool(true));
        }

        let exposure_cap = match self.thresholds {
            ThresholdOverride::Unchanged => None,
            ThresholdOverride::NoBreach => Some(UNBOUNDED_EXPOSURE),
            ThresholdOverride::Breach => Some(0),
        };
        if let Some(cap) = exposure_cap {
            doc.set(
                RISK_CONFIG_KEY,
                "maxNetExposureBySymbol",
                json!({ exposure_symbol: cap }),
            );
            doc.set(
                RISK_CONFIG_KEY,
                "maxRunDrawdownCCY",
                json!(UNBOUNDED_DRAWDOWN_CCY),
            );
        }

        doc
    }
}

/// The standard four-row matrix, in report order.
pub fn default_matrix() -> Vec<VariantSpec> {
    vec![
        VariantSpec::new("off", RiskMode::Off, ThresholdOverride::Unchanged),
        VariantSpec::new("shadow", RiskMode::Shadow, ThresholdOverride::Unchanged),
        VariantSpec::new("active_no_breach", RiskMode::Active, ThresholdOverride::NoBreach),
        VariantSpec::new("active_with_breach", RiskMode::Active, ThresholdOverride::Breach),
    ]
}

/// Names must be non-empty, safe inside a file name, and unique ignoring
/// ASCII case (run ids upper-case the name).
pub fn validate_matrix(variants: &[VariantSpec]) -> Result<()> {
    if variants.is_empty() {
        bail!("variant matrix is empty");
    }
    let mut seen = BTreeSet::new();
    for v in variants {
        let ok = !v.name.is_empty()
            && v
                .name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !ok {
            bail!(
                "invalid variant name '{}': use [A-Za-z0-9_-] only",
                v.name
            );
        }
        if !seen.insert(v.run_id()) {
            bail!(
                "duplicate variant name '{}': run id {} already used",
                v.name,
                v.run_id()
            );
        }
    }
    Ok(())
}
