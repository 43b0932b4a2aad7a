#![cfg(unix)]

use std::fs;
use std::path::Path;
use std::time::Duration;

use acc_config::{RiskMode, ThresholdOverride, VariantSpec};
use acc_driver::{exit, DriverConfig, DriverError, EngineCommand, VariantDriver};

fn config_with_engine(ws: &Path, body: &str) -> DriverConfig {
    let root = fs::canonicalize(ws).unwrap();
    let script = root.join("engine.sh");
    fs::write(&script, body).unwrap();

    let baseline = root.join("config.json");
    fs::write(&baseline, r#"{"featureFlags":{},"riskConfig":{}}"#).unwrap();

    let output_root = root.join("out");
    DriverConfig {
        engine: EngineCommand::new("sh")
            .with_args([script.display().to_string(), output_root.display().to_string()]),
        baseline_config: baseline,
        output_root,
        scratch_dir: root.join("scratch"),
        workspace_root: root,
        settle_delay: Duration::ZERO,
        exposure_symbol: "EURUSD".to_string(),
        variants: vec![
            VariantSpec::new("off", RiskMode::Off, ThresholdOverride::Unchanged),
            VariantSpec::new("shadow", RiskMode::Shadow, ThresholdOverride::Unchanged),
        ],
    }
}

#[test]
fn engine_failure_propagates_code_and_output() {
    let ws = tempfile::tempdir().unwrap();
    let cfg = config_with_engine(ws.path(), "echo engine-out; echo engine-err >&2; exit 7\n");

    let err = VariantDriver::new(cfg).run().unwrap_err();
    assert_eq!(err.exit_code(), 7);
    match &err {
        DriverError::Engine {
            variant,
            run_id,
            stdout,
            stderr,
            ..
        } => {
            assert_eq!(variant, "off");
            assert_eq!(run_id, "ACC-OFF");
            assert!(stdout.contains("engine-out"));
            assert!(stderr.contains("engine-err"));
        }
        other => panic!("expected engine failure, got {other}"),
    }
    let shown = err.to_string();
    assert!(shown.contains("engine-out") && shown.contains("engine-err"));
}

#[test]
fn engine_that_writes_nothing_fails_detection() {
    let ws = tempfile::tempdir().unwrap();
    let cfg = config_with_engine(ws.path(), "exit 0\n");

    let err = VariantDriver::new(cfg).run().unwrap_err();
    assert_eq!(err.exit_code(), exit::DETECTION_FAILED);
    assert!(err.to_string().contains("RUN_DIR_NOT_DETECTED"));
}

#[test]
fn run_dir_without_events_is_missing_journal() {
    let ws = tempfile::tempdir().unwrap();
    let cfg = config_with_engine(ws.path(), "mkdir -p \"$1/M0-RUN\"\n");

    let err = VariantDriver::new(cfg).run().unwrap_err();
    assert_eq!(err.exit_code(), exit::MISSING_JOURNAL);
    match &err {
        DriverError::MissingJournal { candidates, .. } => {
            assert_eq!(candidates, &vec!["M0-RUN".to_string()]);
        }
        other => panic!("expected missing journal, got {other}"),
    }
    let shown = err.to_string();
    assert!(shown.contains("events.csv"));
    assert!(shown.contains("candidates=[M0-RUN]"));
}

#[test]
fn first_failure_stops_the_batch() {
    let ws = tempfile::tempdir().unwrap();
    // Second invocation fails; the first must have completed and nothing after.
    let body = r#"
ROOT="$1"; shift
while [ $# -gt 0 ]; do
  case "$1" in
    --run-id) RUN_ID="$2"; shift 2 ;;
    *) shift ;;
  esac
done
if [ "$RUN_ID" = "ACC-SHADOW" ]; then exit 9; fi
mkdir -p "$ROOT/$RUN_ID"
printf 'M\nH\nE1\n' > "$ROOT/$RUN_ID/events.csv"
"#;
    let mut cfg = config_with_engine(ws.path(), body);
    cfg.variants.push(VariantSpec::new(
        "active",
        RiskMode::Active,
        ThresholdOverride::NoBreach,
    ));
    let out = cfg.output_root.clone();

    let err = VariantDriver::new(cfg).run().unwrap_err();
    assert_eq!(err.exit_code(), 9);
    assert!(out.join("ACC-OFF").is_dir());
    assert!(!out.join("ACC-ACTIVE").exists());
}

#[test]
fn missing_baseline_is_missing_input() {
    let ws = tempfile::tempdir().unwrap();
    let mut cfg = config_with_engine(ws.path(), "exit 0\n");
    cfg.baseline_config = cfg.workspace_root.join("nope.json");

    let err = VariantDriver::new(cfg).run().unwrap_err();
    assert_eq!(err.exit_code(), exit::MISSING_INPUT);
}

#[test]
fn unknown_engine_program_is_missing_input() {
    let ws = tempfile::tempdir().unwrap();
    let mut cfg = config_with_engine(ws.path(), "exit 0\n");
    cfg.engine = EngineCommand::new("acc-engine-that-does-not-exist");

    let err = VariantDriver::new(cfg).run().unwrap_err();
    assert_eq!(err.exit_code(), exit::MISSING_INPUT);
}
