mod support;

use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::tempdir;

use support::{all_fixtures, fixture, path_as_str};

fn sgmigrate() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("sgmigrate"))
}

#[test]
fn migrate_writes_target_files_and_report() {
    let dir = tempdir().expect("tempdir");
    let out = dir.path().join("sg");

    sgmigrate()
        .arg("migrate")
        .args(all_fixtures())
        .arg("--output-dir")
        .arg(path_as_str(&out))
        .assert()
        .success()
        .stdout(predicate::str::contains("sg_roles.yml"))
        .stdout(predicate::str::contains("X-Pack to Search Guard migration report"))
        .stdout(predicate::str::contains("bind_password"))
        .stdout(predicate::str::contains(
            "migrate_summary auth_domains=2 users=2 roles=2 role_mappings=2 files=6 problems=3 \
             inconvertible=0",
        ));

    for name in [
        "sg_authc.yml",
        "sg_frontend_authc.yml",
        "sg_internal_users.yml",
        "sg_roles.yml",
        "sg_roles_mapping.yml",
        "elasticsearch.yml",
    ] {
        assert!(out.join(name).exists(), "{name} should be written");
    }
    let users = fs::read_to_string(out.join("sg_internal_users.yml")).expect("users file");
    assert!(users.contains("kirk"));
    assert!(!users.contains("$2a$10$"), "password hashes must not be copied");
}

#[test]
fn migrate_json_output_lists_problems() {
    let dir = tempdir().expect("tempdir");
    let out = dir.path().join("sg");

    let output = sgmigrate()
        .arg("migrate")
        .arg(fixture("elasticsearch.yml"))
        .arg("-o")
        .arg(path_as_str(&out))
        .arg("--format")
        .arg("json")
        .output()
        .expect("command output");
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json report");
    assert_eq!(report["summary"]["auth_domains"], 2);
    let problems = report["problems"].as_array().expect("problems");
    assert_eq!(problems.len(), 1);
    assert_eq!(
        problems[0]["source"],
        "elasticsearch.yml: xpack.security.authc.realms.ldap.corp.bind_password"
    );
    assert_eq!(problems[0]["value"], "***");
}

#[test]
fn migrate_refuses_existing_output_without_force() {
    let dir = tempdir().expect("tempdir");
    let out = dir.path().join("sg");
    fs::create_dir_all(&out).expect("mkdir");
    fs::write(out.join("sg_roles.yml"), "{}\n").expect("write");

    sgmigrate()
        .arg("migrate")
        .arg(fixture("role.json"))
        .arg("-o")
        .arg(path_as_str(&out))
        .assert()
        .failure()
        .stderr(predicate::str::contains("refusing to overwrite existing file"));
    assert_eq!(fs::read_to_string(out.join("sg_roles.yml")).expect("read"), "{}\n");

    sgmigrate()
        .arg("migrate")
        .arg(fixture("role.json"))
        .arg("-o")
        .arg(path_as_str(&out))
        .arg("--force")
        .assert()
        .success();
    let roles = fs::read_to_string(out.join("sg_roles.yml")).expect("read");
    assert!(roles.contains("SGS_CLUSTER_ALL"));
}

#[test]
fn migrate_never_overwrites_its_input() {
    let dir = tempdir().expect("tempdir");
    let input = dir.path().join("elasticsearch.yml");
    fs::copy(fixture("elasticsearch.yml"), &input).expect("copy");
    let before = fs::read_to_string(&input).expect("read");

    sgmigrate()
        .arg("migrate")
        .arg(path_as_str(&input))
        .arg("-o")
        .arg(path_as_str(dir.path()))
        .arg("--force")
        .assert()
        .failure()
        .stderr(predicate::str::contains("refusing to overwrite source file"));
    assert_eq!(fs::read_to_string(&input).expect("read"), before);
}

#[test]
fn migrate_stops_on_unsupported_realm() {
    let dir = tempdir().expect("tempdir");
    let input = dir.path().join("elasticsearch.yml");
    fs::write(
        &input,
        "xpack.security.authc.realms.kerberos.kerb1:\n  order: 0\n  keytab.path: es.keytab\n",
    )
    .expect("write");
    let out = dir.path().join("sg");

    sgmigrate()
        .arg("migrate")
        .arg(path_as_str(&input))
        .arg("-o")
        .arg(path_as_str(&out))
        .assert()
        .failure()
        .stderr(predicate::str::contains("realm type 'kerberos'"));
    assert!(!out.exists());
}

#[test]
fn migrate_reports_validation_errors_of_every_file() {
    let dir = tempdir().expect("tempdir");
    let users = dir.path().join("user.json");
    let roles = dir.path().join("role.json");
    fs::write(&users, r#"{"hits":{"hits":[{"_source":{"username":"a"}}]}}"#).expect("write");
    fs::write(&roles, r#"{"r":{"cluster":"all","indices":[{"names":["*"]}]}}"#).expect("write");

    sgmigrate()
        .arg("migrate")
        .arg(path_as_str(&users))
        .arg(path_as_str(&roles))
        .arg("-o")
        .arg(path_as_str(&dir.path().join("sg")))
        .assert()
        .failure()
        .stdout(predicate::str::contains("user.json"))
        .stdout(predicate::str::contains("roles"))
        .stdout(predicate::str::contains("privileges"))
        .stderr(predicate::str::contains("validation failed: 2 input file(s) are invalid"));
}

#[test]
fn settings_file_can_override_the_report_title() {
    let dir = tempdir().expect("tempdir");
    let settings = dir.path().join("settings.toml");
    fs::write(&settings, "report_title = \"Cluster prod\"\n").expect("write");

    sgmigrate()
        .arg("migrate")
        .arg(fixture("user.json"))
        .arg("-o")
        .arg(path_as_str(&dir.path().join("sg")))
        .arg("--settings")
        .arg(path_as_str(&settings))
        .assert()
        .success()
        .stdout(predicate::str::contains("Cluster prod"));
}
