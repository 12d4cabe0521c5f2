//! CLI integration tests

use std::io::Write;
use std::process::{Command, Stdio};
use tempfile::NamedTempFile;

const MANIFEST: &str = r#"---
# Source: app/templates/hpa.yaml
apiVersion: autoscaling/v2
kind: HorizontalPodAutoscaler
metadata:
  name: api
spec:
  scaleTargetRef:
    apiVersion: apps/v1
    kind: Deployment
    name: api
  minReplicas: 2
  maxReplicas: 6
---
# Source: app/templates/deployment.yaml
apiVersion: apps/v1
kind: Deployment
metadata:
  name: api
spec:
  replicas: 2
  template:
    spec:
      containers:
        - name: api
          resources:
            requests:
              cpu: 500m
              memory: 1Gi
            limits:
              cpu: "1"
              memory: 2Gi
---
apiVersion: v1
kind: ConfigMap
metadata:
  name: api-settings
"#;

fn kest() -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_kest"));
    // keep results independent of the developer's environment
    command
        .env("HOME", std::env::temp_dir())
        .env_remove("KEST_CONFIG")
        .env_remove("KEST_FORMAT")
        .env_remove("KEST_VERBOSITY")
        .env_remove("KEST_MANIFEST_PATH")
        .env_remove("KEST_WORKLOAD_KINDS")
        .env_remove("RUST_LOG");
    command
}

fn manifest_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

/// Test that the CLI shows help
#[test]
fn test_cli_help() {
    let output = kest()
        .arg("--help")
        .output()
        .expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "CLI help should succeed");
    assert!(stdout.contains("estimate"), "Should show estimate command");
    assert!(stdout.contains("--format"), "Should show format option");
}

/// Test that the CLI shows version
#[test]
fn test_cli_version() {
    let output = kest()
        .arg("--version")
        .output()
        .expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "CLI version should succeed");
    assert!(stdout.contains("kest"), "Should show binary name");
}

/// Test estimate subcommand help
#[test]
fn test_estimate_help() {
    let output = kest()
        .args(["estimate", "--help"])
        .output()
        .expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success());
    assert!(stdout.contains("--filepath"), "Should show filepath option");
    assert!(stdout.contains("--verbosity"), "Should show verbosity option");
}

#[test]
fn test_estimate_table() {
    let file = manifest_file(MANIFEST);
    let output = kest()
        .args(["estimate", "-f"])
        .arg(file.path())
        .args(["-v", "2"])
        .output()
        .expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    assert!(stdout.contains("api"));
    assert!(stdout.contains("HPA Max"));
    assert!(stdout.contains("1 / 1 / 3"), "cpu request at replicas/min/max");
    assert!(stdout.contains("Gross totals"));
    assert!(!stdout.contains("api-settings"));
}

#[test]
fn test_estimate_json() {
    let file = manifest_file(MANIFEST);
    let output = kest()
        .args(["--format", "json", "estimate", "-f"])
        .arg(file.path())
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();

    assert_eq!(report["records"].as_array().unwrap().len(), 1);
    assert_eq!(report["records"][0]["replicas"], 2);
    assert_eq!(report["records"][0]["max_replicas"], 6);
    assert_eq!(report["gross"]["cpu_request"]["at_max"], "3");
    assert_eq!(report["gross"]["memory_limit"]["at_replicas"], "4294967296");
}

#[test]
fn test_estimate_from_stdin() {
    let mut child = kest()
        .args(["--format", "json", "estimate", "-f", "-"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .expect("Failed to execute command");

    child
        .stdin
        .take()
        .unwrap()
        .write_all(MANIFEST.as_bytes())
        .unwrap();
    let output = child.wait_with_output().unwrap();

    assert!(output.status.success());
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["source"], "<stdin>");
    assert_eq!(report["gross"]["cpu_request"]["at_min"], "1");
}

#[test]
fn test_malformed_quantity_is_reported() {
    let file = manifest_file(&MANIFEST.replace("memory: 1Gi", "memory: 1GB"));
    let output = kest()
        .args(["estimate", "-f"])
        .arg(file.path())
        .output()
        .expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "malformed quantities do not fail the run");
    assert!(stdout.contains("memory request"));
    assert!(stdout.contains("1GB"));
}

#[test]
fn test_missing_manifest_fails() {
    let output = kest()
        .args(["estimate", "-f", "/nonexistent/rendered.yml"])
        .output()
        .expect("Failed to execute command");

    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(!output.status.success());
    assert!(stderr.contains("/nonexistent/rendered.yml"));
}

#[test]
fn test_verbosity_out_of_range_rejected() {
    let output = kest()
        .args(["estimate", "-v", "3"])
        .output()
        .expect("Failed to execute command");

    assert!(!output.status.success());
}

#[test]
fn test_config_file_sets_defaults() {
    let manifest = manifest_file(MANIFEST);
    let mut config = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
    write!(
        config,
        r#"{{"format": "json", "manifest_path": {}}}"#,
        serde_json::to_string(&manifest.path()).unwrap()
    )
    .unwrap();

    let output = kest()
        .arg("--config")
        .arg(config.path())
        .arg("estimate")
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["records"][0]["name"], "api");
}

#[test]
fn test_environment_overrides() {
    let rollout = r#"apiVersion: argoproj.io/v1alpha1
kind: Rollout
metadata:
  name: canary
spec:
  replicas: 4
  template:
    spec:
      containers:
        - resources:
            requests:
              cpu: 250m
"#;
    let file = manifest_file(&format!("{}---\n{}", MANIFEST, rollout));

    let output = kest()
        .env("KEST_WORKLOAD_KINDS", "Deployment,Rollout")
        .env("KEST_VERBOSITY", "1")
        .env("KEST_MANIFEST_PATH", file.path())
        .arg("estimate")
        .output()
        .expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    assert!(stdout.contains("Replicas"), "verbosity 1 adds the replicas column");
    assert!(stdout.contains("canary"), "configured kind is estimated");
    assert!(!stdout.contains("HPA Min"));
}

#[test]
fn test_environment_format_json() {
    let file = manifest_file(MANIFEST);

    let output = kest()
        .env("KEST_FORMAT", "json")
        .args(["estimate", "-f"])
        .arg(file.path())
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["records"][0]["name"], "api");
}
