use config_trace::{parse_file, parse_json, parse_yaml, write_file, write_json, write_yaml};

const DOC: &str = r#"
auth_domains:
  - type: basic/ldap
    enabled: true
    order: 1
    ldap:
      idp:
        hosts: ["ldap://x"]
        bind_dn: "cn=admin"
        password: ""
  - type: basic/internal_users_db
    enabled: false
    order: 2
"#;

#[test]
fn yaml_write_parse_round_trip_preserves_tree() {
    let first = parse_yaml(DOC.as_bytes()).expect("initial parse should succeed");
    let written = write_yaml(&first).expect("write should succeed");
    let second = parse_yaml(written.as_bytes()).expect("re-parse should succeed");
    assert_eq!(first, second);
}

#[test]
fn json_write_parse_round_trip_preserves_tree() {
    let first = parse_yaml(DOC.as_bytes()).expect("parse");
    let written = write_json(&first).expect("write");
    let second = parse_json(written.as_bytes()).expect("re-parse");
    assert_eq!(first, second);
}

#[test]
fn parse_and_write_file_round_trip() {
    let out_dir = tempfile::tempdir().expect("tempdir should be created");
    let out_path = out_dir.path().join("sg_authc.yml");

    let node = parse_yaml(DOC.as_bytes()).expect("parse should succeed");
    write_file(&node, &out_path).expect("write_file should succeed");

    let reparsed = parse_file(&out_path).expect("parse_file should succeed");
    assert_eq!(node, reparsed);
}
