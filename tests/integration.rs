use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tempfile::TempDir;

fn hexval_binary() -> PathBuf {
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // remove test binary name
    path.pop(); // remove deps/
    path.push("hexval");
    path
}

fn setup_test_env() -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().to_path_buf();

    let config_dir = root.join("config");
    fs::create_dir_all(&config_dir).unwrap();

    let config_content = r#"[import]
required_fields = ["cve"]
abort_threshold_pct = 50.0

[columns]
hostname = ["Asset"]
"#;
    let config_path = config_dir.join("hexval.toml");
    fs::write(&config_path, config_content).unwrap();

    (tmp, config_path)
}

fn run_hexval(config_path: &Path, args: &[&str]) -> (String, String, bool) {
    let binary = hexval_binary();
    let output = Command::new(&binary)
        .arg("--config")
        .arg(config_path.to_str().unwrap())
        .args(args)
        .output()
        .unwrap_or_else(|e| panic!("Failed to run hexval binary at {:?}: {}", binary, e));

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (stdout, stderr, output.status.success())
}

fn run_hexval_stdin(config_path: &Path, args: &[&str], input: &str) -> (String, bool) {
    let mut child = Command::new(hexval_binary())
        .arg("--config")
        .arg(config_path.to_str().unwrap())
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();
    child
        .stdin
        .take()
        .unwrap()
        .write_all(input.as_bytes())
        .unwrap();
    let output = child.wait_with_output().unwrap();
    (
        String::from_utf8_lossy(&output.stdout).to_string(),
        output.status.success(),
    )
}

#[test]
fn test_check_mixed_batch() {
    let (tmp, config_path) = setup_test_env();
    let rows = tmp.path().join("export.json");
    fs::write(
        &rows,
        r#"[
  {"Asset": "web01.corp.example", "cve": "CVE-2024-0001", "severity": "Critical", "vpr": 9.8},
  {"cve": "CVE-2024-0002", "severity": "Low", "VPR Score": "3.1"},
  {"cve": "bad-id", "severity": "Extreme", "vpr": 15}
]"#,
    )
    .unwrap();

    let (stdout, stderr, success) =
        run_hexval(&config_path, &["check", rows.to_str().unwrap(), "--progress", "off"]);
    assert!(success, "check failed: stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("Accepted:    2"));
    assert!(stdout.contains("Rejected:    1"));
    assert!(stdout.contains("Invalid CVE format"));
    assert!(stdout.contains("Status:      ok"));
}

#[test]
fn test_check_strict_fails_on_rejections() {
    let (tmp, config_path) = setup_test_env();
    let rows = tmp.path().join("export.ndjson");
    fs::write(
        &rows,
        "{\"cve\": \"CVE-2024-0001\"}\n{\"cve\": \"CVE-2024-0002\"}\n{\"severity\": \"High\"}\n",
    )
    .unwrap();

    let (_, _, lenient) =
        run_hexval(&config_path, &["check", rows.to_str().unwrap(), "--progress", "off"]);
    assert!(lenient);

    let (_, stderr, strict) = run_hexval(
        &config_path,
        &["check", rows.to_str().unwrap(), "--strict", "--progress", "off"],
    );
    assert!(!strict);
    assert!(stderr.contains("1 row(s) rejected"));
}

#[test]
fn test_check_aborts_when_mostly_invalid() {
    let (tmp, config_path) = setup_test_env();
    let rows = tmp.path().join("bad.json");
    fs::write(&rows, r#"[{"cve": "x"}, {"cve": "y"}, {"cve": "CVE-2024-0001"}]"#).unwrap();

    let (stdout, stderr, success) =
        run_hexval(&config_path, &["check", rows.to_str().unwrap(), "--progress", "off"]);
    assert!(!success);
    assert!(stdout.contains("ABORTED"));
    assert!(stderr.contains("Too many invalid rows (66.7%)"));
}

#[test]
fn test_check_json_report_to_file() {
    let (tmp, config_path) = setup_test_env();
    let rows = tmp.path().join("rows.json");
    fs::write(
        &rows,
        r#"[{"asset.name": "NWAN10.MMPLP.NET", "definition.cve": "CVE-2023-44487", "First Seen": "01/15/2024"}]"#,
    )
    .unwrap();
    let out = tmp.path().join("reports/report.json");

    let (_, stderr, success) = run_hexval(
        &config_path,
        &[
            "check",
            rows.to_str().unwrap(),
            "--format",
            "json",
            "--output",
            out.to_str().unwrap(),
            "--progress",
            "off",
        ],
    );
    assert!(success, "stderr={}", stderr);

    let report: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
    let record = &report["accepted"][0]["record"];
    assert_eq!(record["hostname"], "nwan10");
    assert_eq!(record["cve"], "CVE-2023-44487");
    assert_eq!(record["first_detected"], "2024-01-15");
}

#[test]
fn test_check_json_progress_on_stderr() {
    let (tmp, config_path) = setup_test_env();
    let rows = tmp.path().join("rows.json");
    fs::write(&rows, r#"[{"cve": "CVE-2024-0001"}]"#).unwrap();

    let (stdout, stderr, success) = run_hexval(
        &config_path,
        &["check", rows.to_str().unwrap(), "--format", "json", "--progress", "json"],
    );
    assert!(success);
    let report: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(report["total_rows"], 1);
    assert!(stderr.contains("\"phase\":\"finished\""));
}

#[test]
fn test_row_command() {
    let (_tmp, config_path) = setup_test_env();

    let (stdout, _, success) = run_hexval(
        &config_path,
        &["row", r#"{"cve": "CVE-2024-0001", "severity": "Critical", "vpr": 9.8}"#],
    );
    assert!(success);
    let out: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(out["valid"], true);
    assert_eq!(out["errors"], serde_json::json!([]));

    let (stdout, _, success) = run_hexval(
        &config_path,
        &["row", r#"{"cve": "bad-id", "severity": "Extreme", "vpr": 15}"#],
    );
    assert!(!success);
    let out: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(out["valid"], false);
    assert_eq!(out["errors"].as_array().unwrap().len(), 3);
    assert!(out["record"].is_null());
}

#[test]
fn test_row_uses_required_fields_from_config() {
    let (_tmp, config_path) = setup_test_env();
    let (stdout, _, success) = run_hexval(&config_path, &["row", r#"{"severity": "High"}"#]);
    assert!(!success);
    assert!(stdout.contains("Missing required field: cve"));
}

#[test]
fn test_field_command() {
    let (_tmp, config_path) = setup_test_env();

    let (stdout, _, ok) = run_hexval(&config_path, &["field", "cve", "CVE-2024-0001"]);
    assert!(ok);
    assert_eq!(stdout.trim(), "valid");

    let (stdout, _, ok) = run_hexval(&config_path, &["field", "vpr", "-1"]);
    assert!(!ok);
    assert_eq!(stdout.trim(), "invalid");

    let (_, _, ok) = run_hexval(&config_path, &["field", "ip", "2001:db8::1"]);
    assert!(ok);
}

#[test]
fn test_names_args_and_stdin() {
    let (_tmp, config_path) = setup_test_env();

    let (stdout, _, ok) = run_hexval(&config_path, &["names", "SMITH,JOHN; DOE,JANE"]);
    assert!(ok);
    assert_eq!(stdout.trim(), "John Smith; Jane Doe");

    let (stdout, ok) = run_hexval_stdin(
        &config_path,
        &["names"],
        "SMITH,JOHN\n\nJohn Smith\nO'BRIEN,PAT\n",
    );
    assert!(ok);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines, vec!["John Smith", "John Smith", "Pat O'Brien"]);
}

#[test]
fn test_date_command_reports_unparseable() {
    let (_tmp, config_path) = setup_test_env();

    let (stdout, _, ok) = run_hexval(&config_path, &["date", "03/15/2024", "Mar 15, 2024"]);
    assert!(ok);
    assert_eq!(stdout.lines().collect::<Vec<_>>(), vec!["2024-03-15", "2024-03-15"]);

    let (stdout, stderr, ok) = run_hexval(&config_path, &["date", "2024-01-02", "whenever"]);
    assert!(!ok);
    assert_eq!(stdout.trim(), "2024-01-02");
    assert!(stderr.contains("unrecognized date format: 'whenever'"));
}

#[test]
fn test_hostname_command() {
    let (_tmp, config_path) = setup_test_env();
    let (stdout, _, ok) = run_hexval(
        &config_path,
        &["hostname", "NWAN10.MMPLP.NET", "10.95.6.210"],
    );
    assert!(ok);
    assert_eq!(stdout.lines().collect::<Vec<_>>(), vec!["nwan10", "10.95.6.210"]);
}

#[test]
fn test_bad_config_is_reported() {
    let tmp = TempDir::new().unwrap();
    let config_path = tmp.path().join("bad.toml");
    fs::write(&config_path, "[columns]\nowner = [\"Owner\"]\n").unwrap();

    let (_, stderr, ok) = run_hexval(&config_path, &["names", "SMITH,JOHN"]);
    assert!(!ok);
    assert!(stderr.contains("owner"));
}
