mod support;

use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::tempdir;

use support::{all_fixtures, path_as_str};

#[test]
fn validate_accepts_fixtures() {
    Command::new(assert_cmd::cargo::cargo_bin!("sgmigrate"))
        .arg("validate")
        .args(all_fixtures())
        .assert()
        .success()
        .stdout(predicate::str::contains("valid"))
        .stdout(predicate::str::contains("role_mapping.json"));
}

#[test]
fn validate_prints_json_errors() {
    let dir = tempdir().expect("tempdir");
    let mappings = dir.path().join("role_mapping.json");
    fs::write(
        &mappings,
        r#"{"m":{"roles":["r"],"rules":{"field":{"username":"a"},"any":[]}}}"#,
    )
    .expect("write");

    let output = Command::new(assert_cmd::cargo::cargo_bin!("sgmigrate"))
        .arg("validate")
        .arg(path_as_str(&mappings))
        .arg("--format")
        .arg("json")
        .output()
        .expect("command output");
    assert!(!output.status.success());

    let errors: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json");
    assert_eq!(errors[0]["file"], "role_mapping.json");
    assert_eq!(errors[0]["errors"][0]["path"], "m.rules");
}

#[test]
fn validate_rejects_unknown_file_names() {
    let dir = tempdir().expect("tempdir");
    let other = dir.path().join("logstash.yml");
    fs::write(&other, "http.port: 9600\n").expect("write");

    Command::new(assert_cmd::cargo::cargo_bin!("sgmigrate"))
        .arg("validate")
        .arg(path_as_str(&other))
        .assert()
        .failure()
        .stderr(predicate::str::contains("unrecognized input file"));
}
