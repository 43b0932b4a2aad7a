//! acc-config
//!
//! Two kinds of configuration live here:
//! - [`ConfigDocument`]: the engine's own config, an opaque JSON object the
//!   harness edits a handful of known fields of (one scratch copy per variant)
//! - [`HarnessSettings`]: where the engine, baseline, output root and scratch
//!   directory are (YAML, optional; CLI flags override)

mod document;
mod settings;
mod variant;

pub use document::ConfigDocument;
pub use settings::{
    EngineSettings, HarnessSettings, PathSettings, VariantSettings, DEFAULT_EXPOSURE_SYMBOL,
    DEFAULT_SETTLE_MS, ENV_ENGINE_PROGRAM,
};
pub use variant::{
    default_matrix, validate_matrix, RiskMode, ThresholdOverride, VariantSpec, FEATURE_FLAGS_KEY,
    RISK_CONFIG_KEY, UNBOUNDED_DRAWDOWN_CCY, UNBOUNDED_EXPOSURE,
};
