use assert_cmd::Command;
use predicates::prelude::*;
use predicates::str::contains;
use std::fs::write;

const ENV_VARS: [&str; 5] = [
    "EXOSCAN_ENDPOINT",
    "EXOSCAN_PREDICT_PATH",
    "EXOSCAN_MODEL",
    "EXOSCAN_MANUAL_STRATEGY",
    "EXOSCAN_TIMEOUT_SECS",
];

fn exoscan() -> Command {
    let mut cmd = Command::cargo_bin("exoscan").unwrap();
    for var in ENV_VARS {
        cmd.env_remove(var);
    }
    cmd.env("RUST_LOG", "warn");
    cmd.args(["--no-color", "--no-animate"]);
    cmd
}

const FULL_FIELDS: [&str; 16] = [
    "--koi-fpflag-ss",
    "0",
    "--koi-fpflag-nt",
    "0",
    "--koi-fpflag-co",
    "0",
    "--koi-duration",
    "5.2",
    "--koi-time0bk",
    "170.5",
    "--koi-fpflag-ec",
    "0",
    "--ra",
    "291.9",
    "--koi-count",
    "2",
];

#[test]
fn lists_models_in_tab_order() {
    exoscan()
        .arg("models")
        .assert()
        .success()
        .stdout(contains("4 model(s) available"))
        .stdout(contains("logistic").and(contains("Logistic Regression (default)")))
        .stdout(contains("random-forest"))
        .stdout(contains("gradient-boosting"))
        .stdout(contains("LightGBM"));
}

#[test]
fn models_json_lists_wire_ids() {
    let output = exoscan().args(["--json", "models"]).output().unwrap();
    assert!(output.status.success());
    let rows: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let ids: Vec<_> = rows
        .as_array()
        .unwrap()
        .iter()
        .map(|row| row["id"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(
        ids,
        ["logistic", "random-forest", "gradient-boosting", "lightgbm"]
    );
}

#[test]
fn analyze_file_reports_rows() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("kepler.csv");
    write(&path, "kepid,koi_score\n1,0.9\n2,0.1\n3,0.5").unwrap();

    exoscan()
        .arg("analyze-file")
        .arg(&path)
        .assert()
        .success()
        .stdout(contains("Staged kepler.csv (33 B)"))
        .stdout(contains("Analyzing CSV data..."))
        .stdout(contains("Model Used: Logistic Regression"))
        .stdout(contains("File: kepler.csv"))
        .stdout(contains("Rows Processed: 3"));
}

#[test]
fn analyze_file_rejects_non_csv() {
    let file = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();
    write(file.path(), "not a table").unwrap();

    exoscan()
        .arg("analyze-file")
        .arg(file.path())
        .assert()
        .failure()
        .stdout(contains("Please upload a CSV file only."))
        .stdout(contains("Rows Processed").not());
}

#[test]
fn heuristic_manual_entry_scores_full_marks() {
    exoscan()
        .args(["--model", "lightgbm", "analyze-manual", "--strategy", "heuristic"])
        .args(FULL_FIELDS)
        .assert()
        .success()
        .stdout(contains("Analyzing data with LightGBM..."))
        .stdout(contains("Model Used: LightGBM"))
        .stdout(contains("Confidence Score: 100/100"))
        .stdout(contains("Classification: High Confidence"));
}

#[test]
fn missing_field_is_reported_without_dispatch() {
    exoscan()
        .args([
            "--endpoint",
            "http://127.0.0.1:9",
            "analyze-manual",
            "--koi-fpflag-ss",
            "0",
        ])
        .assert()
        .failure()
        .stdout(contains("Please fill in all fields before analyzing."))
        .stdout(contains("Analyzing data with").not());
}

#[test]
fn non_numeric_field_is_rejected() {
    let mut args = FULL_FIELDS;
    args[7] = "long";
    exoscan()
        .args(["analyze-manual", "--strategy", "heuristic"])
        .args(args)
        .assert()
        .failure()
        .stdout(contains("koi_duration"));
}

#[test]
fn config_file_selects_heuristic_strategy() {
    let file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    write(
        file.path(),
        "model = \"random-forest\"\nmanual_strategy = \"heuristic\"\n",
    )
    .unwrap();

    exoscan()
        .arg("--config")
        .arg(file.path())
        .arg("analyze-manual")
        .args(FULL_FIELDS)
        .assert()
        .success()
        .stdout(contains("Model Used: Random Forest"))
        .stdout(contains("Confidence Score: 100/100"));
}

#[test]
fn config_file_env_layer_accepts_cli_spellings() {
    let file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    write(file.path(), "timeout_secs = 5\n").unwrap();

    exoscan()
        .env("EXOSCAN_MODEL", "LightGBM")
        .env("EXOSCAN_MANUAL_STRATEGY", "local")
        .arg("--config")
        .arg(file.path())
        .arg("analyze-manual")
        .args(FULL_FIELDS)
        .assert()
        .success()
        .stdout(contains("Model Used: LightGBM"))
        .stdout(contains("Confidence Score: 100/100"));
}

#[test]
fn environment_selects_initial_model() {
    exoscan()
        .env("EXOSCAN_MODEL", "gradient-boosting")
        .env("EXOSCAN_MANUAL_STRATEGY", "heuristic")
        .arg("analyze-manual")
        .args(FULL_FIELDS)
        .assert()
        .success()
        .stdout(contains("Model Used: Gradient Boosting"));
}

#[test]
fn invalid_model_flag_is_a_usage_error() {
    exoscan()
        .args(["--model", "svm", "models"])
        .assert()
        .failure()
        .stderr(contains("unknown model"));
}

#[test]
fn gauge_json_describes_frame() {
    let output = exoscan().args(["--json", "gauge", "55"]).output().unwrap();
    assert!(output.status.success());
    let frame: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(frame["band"], "amber");
    assert_eq!(frame["readout"], 55);
    assert_eq!(frame["track"]["radius"], 120.0);
}

#[test]
fn gauge_clamps_out_of_range_values() {
    exoscan()
        .args(["gauge", "140"])
        .assert()
        .success()
        .stdout(contains("100"))
        .stdout(contains("band Green"));
}

#[test]
#[ignore = "requires loopback networking"]
fn unreachable_endpoint_reports_connection_failure() {
    exoscan()
        .args(["--endpoint", "http://127.0.0.1:9", "analyze-manual"])
        .args(FULL_FIELDS)
        .assert()
        .failure()
        .stdout(contains("Failed to connect to backend"));
}
