//! Variant derivation: only declared keys change, everything else survives.

use acc_config::{
    default_matrix, validate_matrix, ConfigDocument, RiskMode, ThresholdOverride, VariantSpec,
    UNBOUNDED_DRAWDOWN_CCY, UNBOUNDED_EXPOSURE,
};
use serde_json::json;

fn baseline() -> ConfigDocument {
    ConfigDocument::from_value(json!({
        "schemaVersion": "1.3.0",
        "name": "backtest-m0",
        "instruments": ["EURUSD", "GBPUSD"],
        "featureFlags": { "sentiment": "off", "risk": "off" },
        "riskConfig": {
            "maxNetExposureBySymbol": { "EURUSD": 500000 },
            "maxRunDrawdownCCY": 2500.0,
            "emitEvaluations": false
        },
        "output": { "journalDir": "journals" }
    }))
    .unwrap()
}

fn spec(name: &str) -> VariantSpec {
    default_matrix()
        .into_iter()
        .find(|v| v.name == name)
        .unwrap()
}

#[test]
fn default_matrix_order_and_names() {
    let names: Vec<String> = default_matrix().into_iter().map(|v| v.name).collect();
    assert_eq!(
        names,
        vec!["off", "shadow", "active_no_breach", "active_with_breach"]
    );
    validate_matrix(&default_matrix()).unwrap();
}

#[test]
fn off_only_touches_risk_flag() {
    let base = baseline();
    let doc = spec("off").apply(&base, "EURUSD");
    // baseline already had risk=off, so nothing changes at all.
    assert!(base.changed_leaf_pointers(&doc).is_empty());
    assert_eq!(doc.pointer("/featureFlags/risk"), Some(&json!("off")));
}

#[test]
fn shadow_enables_evaluations_only() {
    let base = baseline();
    let doc = spec("shadow").apply(&base, "EURUSD");
    assert_eq!(
        base.changed_leaf_pointers(&doc),
        vec!["/featureFlags/risk", "/riskConfig/emitEvaluations"]
    );
    assert_eq!(doc.pointer("/riskConfig/emitEvaluations"), Some(&json!(true)));
    assert_eq!(doc.pointer("/riskConfig/blockOnBreach"), None);
}

#[test]
fn active_no_breach_raises_limits() {
    let base = baseline();
    let doc = spec("active_no_breach").apply(&base, "EURUSD");
    assert_eq!(doc.pointer("/featureFlags/risk"), Some(&json!("active")));
    assert_eq!(doc.pointer("/riskConfig/blockOnBreach"), Some(&json!(true)));
    assert_eq!(
        doc.pointer("/riskConfig/maxNetExposureBySymbol"),
        Some(&json!({ "EURUSD": UNBOUNDED_EXPOSURE }))
    );
    assert_eq!(
        doc.pointer("/riskConfig/maxRunDrawdownCCY"),
        Some(&json!(UNBOUNDED_DRAWDOWN_CCY))
    );
}

#[test]
fn active_with_breach_zeroes_exposure_cap() {
    let doc = spec("active_with_breach").apply(&baseline(), "EURUSD");
    assert_eq!(
        doc.pointer("/riskConfig/maxNetExposureBySymbol/EURUSD"),
        Some(&json!(0))
    );
}

#[test]
fn unrelated_fields_survive_every_variant() {
    let base = baseline();
    for v in default_matrix() {
        let doc = v.apply(&base, "EURUSD");
        assert_eq!(doc.pointer("/schemaVersion"), Some(&json!("1.3.0")));
        assert_eq!(doc.pointer("/instruments/1"), Some(&json!("GBPUSD")));
        assert_eq!(doc.pointer("/featureFlags/sentiment"), Some(&json!("off")));
        assert_eq!(doc.pointer("/output/journalDir"), Some(&json!("journals")));
        for changed in base.changed_leaf_pointers(&doc) {
            assert!(
                changed.starts_with("/featureFlags/risk") || changed.starts_with("/riskConfig/"),
                "variant {} touched undeclared key {}",
                v.name,
                changed
            );
        }
    }
}

#[test]
fn baseline_is_not_mutated() {
    let base = baseline();
    let before = base.clone();
    let _ = spec("active_with_breach").apply(&base, "EURUSD");
    assert_eq!(base, before);
}

#[test]
fn missing_sections_are_created() {
    let base = ConfigDocument::from_value(json!({ "name": "bare" })).unwrap();
    let doc = VariantSpec::new("x", RiskMode::Active, ThresholdOverride::Breach).apply(&base, "USDJPY");
    assert_eq!(doc.pointer("/featureFlags/risk"), Some(&json!("active")));
    assert_eq!(
        doc.pointer("/riskConfig/maxNetExposureBySymbol/USDJPY"),
        Some(&json!(0))
    );
}

#[test]
fn run_id_and_scratch_name_derive_from_variant_name() {
    let v = spec("active_with_breach");
    assert_eq!(v.run_id(), "ACC-ACTIVE_WITH_BREACH");
    assert_eq!(v.scratch_file_name(), "acc.active_with_breach.json");
}

#[test]
fn matrix_validation_rejects_duplicates_and_unsafe_names() {
    let dup = vec![
        VariantSpec::new("a", RiskMode::Off, ThresholdOverride::Unchanged),
        VariantSpec::new("a", RiskMode::Shadow, ThresholdOverride::Unchanged),
    ];
    assert!(validate_matrix(&dup).is_err());

    let unsafe_name = vec![VariantSpec::new("../x", RiskMode::Off, ThresholdOverride::Unchanged)];
    assert!(validate_matrix(&unsafe_name).is_err());

    assert!(validate_matrix(&[]).is_err());
}

#[test]
fn risk_mode_parses_case_insensitively() {
    assert_eq!("Shadow".parse::<RiskMode>().unwrap(), RiskMode::Shadow);
    assert!("paper".parse::<RiskMode>().is_err());
}

#[test]
fn names_differing_only_in_case_collide() {
    let clash = vec![
        VariantSpec::new("off", RiskMode::Off, ThresholdOverride::Unchanged),
        VariantSpec::new("Off", RiskMode::Shadow, ThresholdOverride::Unchanged),
    ];
    let err = validate_matrix(&clash).unwrap_err();
    assert!(err.to_string().contains("ACC-OFF"));
}
