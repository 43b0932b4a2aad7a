#![cfg(unix)]

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use acc_config::{default_matrix, RiskMode, ThresholdOverride, VariantSpec};
use acc_driver::{DriverConfig, EngineCommand, VariantDriver};
use acc_journal::EMPTY_SHA256;

const EVENTS_SHA: &str = "5943E3B5F8EE7526D2CD9A06EE053EE6C903FE0C97DE78E3E2F0D43E52079BE6";

// Fake engine: `sh engine.sh <output_root> --config <path> --run-id <id>`.
// Writes one run directory with a fixed events journal and no trades file.
// Active variants also emit a blocked-order alert line.
const ENGINE: &str = r#"
ROOT="$1"; shift
while [ $# -gt 0 ]; do
  case "$1" in
    --config) CONFIG="$2"; shift 2 ;;
    --run-id) RUN_ID="$2"; shift 2 ;;
    *) shift ;;
  esac
done
DIR="$ROOT/M0-RUN-$RUN_ID"
mkdir -p "$DIR"
printf 'META,run=%s\nHEADER,ts,kind\nINFO_X,1\nINFO_Y,2\n' "$RUN_ID" > "$DIR/events.csv"
if grep -q '"risk":"active"' "$CONFIG"; then
  printf 'ALERT_BLOCK_NET_EXPOSURE,%s\n' "$RUN_ID" >> "$DIR/events.csv"
fi
"#;

fn setup(ws: &Path, variants: Vec<VariantSpec>) -> DriverConfig {
    let root = fs::canonicalize(ws).unwrap();
    let script = root.join("engine.sh");
    fs::write(&script, ENGINE).unwrap();

    let baseline = root.join("config.json");
    fs::write(
        &baseline,
        r#"{"name":"m0","featureFlags":{"risk":"off"},"riskConfig":{"maxRunDrawdownCCY":50.0}}"#,
    )
    .unwrap();

    let output_root = root.join("journals").join("M0");
    DriverConfig {
        engine: EngineCommand::new("sh")
            .with_args([script.display().to_string(), output_root.display().to_string()]),
        baseline_config: baseline,
        output_root,
        scratch_dir: root.join("acceptance_tmp"),
        workspace_root: root,
        settle_delay: Duration::ZERO,
        exposure_symbol: "EURUSD".to_string(),
        variants,
    }
}

#[test]
fn off_variant_digests_match_known_values() {
    let ws = tempfile::tempdir().unwrap();
    let cfg = setup(
        ws.path(),
        vec![VariantSpec::new("off", RiskMode::Off, ThresholdOverride::Unchanged)],
    );

    let report = VariantDriver::new(cfg).run().unwrap();
    let off = report.get("off").unwrap();

    assert_eq!(off.run_dir, "journals/M0/M0-RUN-ACC-OFF");
    assert_eq!(off.events_sha, EVENTS_SHA);
    assert_eq!(off.trades_sha, EMPTY_SHA256);
    assert_eq!(off.eval_line, "");
    assert_eq!(off.alert_block_exposure, "");
    assert_eq!(off.alert_block_drawdown, "");
}

#[test]
fn default_matrix_runs_in_order_with_one_dir_per_variant() {
    let ws = tempfile::tempdir().unwrap();
    let cfg = setup(ws.path(), default_matrix());
    let scratch = cfg.scratch_dir.clone();

    let report = VariantDriver::new(cfg).run().unwrap();

    let names: Vec<&str> = report.variant_names().collect();
    assert_eq!(names, vec!["off", "shadow", "active_no_breach", "active_with_breach"]);

    // META differs per run but sits in the excluded header lines.
    assert_eq!(report.get("off").unwrap().events_sha, EVENTS_SHA);
    assert_eq!(report.get("shadow").unwrap().events_sha, EVENTS_SHA);

    let breach = report.get("active_with_breach").unwrap();
    assert_ne!(breach.events_sha, EVENTS_SHA);
    assert_eq!(
        breach.alert_block_exposure,
        "ALERT_BLOCK_NET_EXPOSURE,ACC-ACTIVE_WITH_BREACH"
    );
    assert_eq!(report.get("shadow").unwrap().alert_block_exposure, "");

    for (name, r) in report.iter() {
        assert_eq!(r.trades_sha, EMPTY_SHA256, "variant {name}");
        assert_eq!(
            r.run_dir,
            format!("journals/M0/M0-RUN-ACC-{}", name.to_ascii_uppercase())
        );
    }

    let json = report.to_pretty_json().unwrap();
    let off = json.find("\"off\"").unwrap();
    let breach = json.find("\"active_with_breach\"").unwrap();
    assert!(off < breach);

    let mut files: Vec<PathBuf> = fs::read_dir(&scratch)
        .unwrap()
        .map(|e| e.unwrap().path())
        .collect();
    files.sort();
    assert_eq!(files.len(), 4);
}

#[test]
fn breach_variant_config_zeroes_symbol_cap() {
    let ws = tempfile::tempdir().unwrap();
    let cfg = setup(ws.path(), default_matrix());
    let scratch = cfg.scratch_dir.clone();

    VariantDriver::new(cfg).run().unwrap();

    let raw = fs::read_to_string(scratch.join("acc.active_with_breach.json")).unwrap();
    let v: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(v["featureFlags"]["risk"], "active");
    assert_eq!(v["riskConfig"]["maxNetExposureBySymbol"]["EURUSD"], 0);
    assert_eq!(v["riskConfig"]["blockOnBreach"], true);
    assert_eq!(v["name"], "m0");

    let raw = fs::read_to_string(scratch.join("acc.off.json")).unwrap();
    let v: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(v["riskConfig"]["maxRunDrawdownCCY"], 50.0);
    assert!(v["riskConfig"].get("emitEvaluations").is_none());
}
