use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::{json, Value};
use tempfile::TempDir;

fn critique() -> Command {
    let mut cmd = Command::cargo_bin("critique").unwrap();
    cmd.env_remove("CRITIQUE_CONFIG")
        .env_remove("CRITIQUE_ENDPOINT")
        .arg("--quiet");
    cmd
}

fn write_document(dir: &TempDir) -> std::path::PathBuf {
    let doc = json!([
        {
            "id": "10:1", "name": "Checkout", "type": "FRAME", "width": 390, "height": 844,
            "children": [
                {"id": "10:2", "name": "Heading", "type": "TEXT", "characters": "Payment"},
                {"id": "10:3", "name": "Pay Button", "type": "INSTANCE", "children": [
                    {"id": "10:4", "name": "Label", "type": "TEXT", "characters": "Pay now"}
                ]}
            ]
        },
        {"id": "11:1", "name": "Divider", "type": "LINE"}
    ]);
    let path = dir.path().join("document.json");
    std::fs::write(&path, doc.to_string()).unwrap();
    path
}

#[test]
fn schema_lists_the_wire_types() {
    critique()
        .arg("schema")
        .assert()
        .success()
        .stdout(predicate::str::contains("AnalysisRequest"))
        .stdout(predicate::str::contains("InboundCommand"));
}

#[test]
fn payload_prints_the_request_body() {
    let dir = TempDir::new().unwrap();
    let doc = write_document(&dir);
    let output = critique()
        .args(["payload", "--document"])
        .arg(&doc)
        .args(["--select", "10:1", "--context", "checkout flow"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let body: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(body["frames"][0]["id"], "10:1");
    assert_eq!(body["context"]["userContext"], "checkout flow");
    assert!(body["timestamp"].as_u64().is_some());
}

#[test]
fn payload_without_frames_fails_with_the_user_sentence() {
    let dir = TempDir::new().unwrap();
    let doc = write_document(&dir);
    critique()
        .args(["payload", "--document"])
        .arg(&doc)
        .args(["--select", "11:1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "Please select one or more frames to analyze.",
        ));
}

#[test]
fn analyze_with_empty_selection_emits_analysis_error() {
    let dir = TempDir::new().unwrap();
    let doc = write_document(&dir);
    critique()
        .args(["analyze", "--document"])
        .arg(&doc)
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""type":"analysis-error""#))
        .stdout(predicate::str::contains("Please select one or more frames"));
}

#[test]
fn locate_resolves_a_report_to_a_node() {
    let dir = TempDir::new().unwrap();
    let doc = write_document(&dir);
    let report = dir.path().join("report.json");
    std::fs::write(
        &report,
        json!({"title": "\"Pay Button\" is too small", "severity": "high"}).to_string(),
    )
    .unwrap();

    let output = critique()
        .args(["locate", "--document"])
        .arg(&doc)
        .args(["--select", "10:1", "--report"])
        .arg(&report)
        .output()
        .unwrap();
    assert!(output.status.success());

    let out: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(out["matched"], "10:3");
    assert_eq!(out["selection"], json!(["10:3"]));
    assert_eq!(
        out["notifications"][0],
        "Found: \"Pay Button\" is too small"
    );
}

#[test]
fn unreadable_document_is_an_error() {
    critique()
        .args(["payload", "--document", "/nonexistent/doc.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read"));
}
