use std::path::PathBuf;

fn config_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/data/mitigated_measles.json")
}

#[test]
fn summary_for_default_run() {
    assert_cmd::cargo::cargo_bin_cmd!("geospread")
        .args(["--days", "5"])
        .assert()
        .success()
        .stdout("Origin: 30.59, 114.31\nDay: 5\nInfections: 1\nR₀: 2.0\n");
}

#[test]
fn json_report_from_config() {
    let output = assert_cmd::cargo::cargo_bin_cmd!("geospread")
        .arg("--config")
        .arg(config_path())
        .args(["--output", "json", "--random-seed", "9"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["status"]["day"], 20);
    assert_eq!(report["origin"]["lat"], 40.7128);
    assert_eq!(report["history"].as_array().unwrap().len(), 20);
    let sites = report["sites"].as_array().unwrap();
    assert!(!sites.is_empty() && sites.len() <= 150);
}

#[test]
fn command_line_overrides_origin_and_pathogen() {
    assert_cmd::cargo::cargo_bin_cmd!("geospread")
        .args(["--origin", "-33.87,151.21", "--pathogen", "ebola", "--days", "1"])
        .assert()
        .success()
        .stdout("Origin: -33.87, 151.21\nDay: 1\nInfections: 1\nR₀: 1.8\n");
}

#[test]
fn logs_go_to_stderr() {
    let output = assert_cmd::cargo::cargo_bin_cmd!("geospread")
        .args(["--days", "2", "--log-level", "info"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("geospread::outbreak - outbreak started"));
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.starts_with("Origin: "));
}

#[test]
fn rejects_bad_origin() {
    assert_cmd::cargo::cargo_bin_cmd!("geospread")
        .args(["--origin", "north"])
        .assert()
        .failure();
}

#[test]
fn rejects_unknown_config_fields() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.json");
    std::fs::write(&path, r#"{ "orign": { "lat": 0, "lng": 0 } }"#).unwrap();
    let output = assert_cmd::cargo::cargo_bin_cmd!("geospread")
        .arg("--config")
        .arg(&path)
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(String::from_utf8(output.stderr).unwrap().contains("invalid config"));
}
