use config_trace::{
    parse_document, parse_expanded_document, parse_yaml, ConfigEnum, DocNode, ParseOptions,
    Traceable, TraceableDocNode, ValidationErrorKind,
};
use pretty_assertions::assert_eq;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Full,
    None,
}

impl ConfigEnum for Mode {
    fn variants() -> &'static [(&'static str, Self)] {
        &[("full", Mode::Full), ("none", Mode::None)]
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Server {
    host: Traceable<String>,
    port: Traceable<i32>,
    mode: Traceable<Mode>,
    tags: Vec<Traceable<String>>,
}

fn parse_server(node: &TraceableDocNode<'_>) -> Option<Server> {
    let host = node.get("host").required().as_string();
    let port = node.get("port").as_i32_or(389);
    let mode = node.get("mode").as_enum_or(Mode::Full);
    let tags = node
        .get("tags")
        .as_list_of_strings()
        .into_option()
        .unwrap_or_default();
    Some(Server {
        host: host?,
        port,
        mode,
        tags,
    })
}

fn doc(text: &str) -> DocNode {
    parse_yaml(text.as_bytes()).expect("yaml")
}

#[test]
fn nested_list_errors_carry_index_segments() {
    let input = doc(
        r#"
servers:
  - host: a
  - port: 1
  - host: c
    port: nope
  - host: d
    mode: partial
"#,
    );
    let err = parse_document(&input, Some("servers.yml"), ParseOptions::default(), |root| {
        root.get("servers").required().as_list_of(parse_server)
    })
    .unwrap_err();

    let found: Vec<(String, ValidationErrorKind)> =
        err.errors.into_iter().map(|e| (e.path, e.kind)).collect();
    assert_eq!(
        found,
        vec![
            ("servers.1.host".to_string(), ValidationErrorKind::MissingAttribute),
            (
                "servers.2.port".to_string(),
                ValidationErrorKind::InvalidValue {
                    expected: "an integer value".to_string(),
                    actual: "nope".to_string(),
                }
            ),
            (
                "servers.3.mode".to_string(),
                ValidationErrorKind::InvalidValue {
                    expected: "Any of: [full, none]".to_string(),
                    actual: "partial".to_string(),
                }
            ),
        ]
    );
}

#[test]
fn successful_parse_traces_every_level() {
    let input = doc("servers:\n  - host: a\n    tags: [x, y]\n");
    let parsed = parse_document(&input, Some("servers.yml"), ParseOptions::default(), |root| {
        root.get("servers").required().as_list_of(parse_server)
    })
    .expect("parse");

    let servers = parsed.into_value().into_value();
    assert_eq!(servers.len(), 1);
    let server = servers[0].get();
    assert_eq!(servers[0].source().full_path_string(), "servers.yml: servers.0");
    assert_eq!(server.host.source().full_path_string(), "servers.yml: servers.0.host");
    assert_eq!(server.tags[1].source().full_path_string(), "servers.yml: servers.0.tags.1");
    assert_eq!(*server.port.get(), 389);
}

#[test]
fn defaults_are_explicit_unless_tracked() {
    let input = doc("servers:\n  - host: a\n");
    let parse = |options| {
        parse_document(&input, None, options, |root| {
            root.get("servers").required().as_list_of(parse_server)
        })
        .expect("parse")
        .into_value()
        .into_value()
        .remove(0)
        .into_value()
    };

    assert!(!parse(ParseOptions::default()).port.is_defaulted());
    assert!(parse(ParseOptions { track_defaults: true }).port.is_defaulted());
}

#[test]
fn missing_optional_fields_record_nothing() {
    let input = doc("host: a\n");
    let parsed = parse_document(&input, None, ParseOptions::default(), parse_server);
    assert!(parsed.is_ok());
}

#[test]
fn map_where_list_expected_is_a_type_mismatch() {
    let input = doc("servers:\n  host: a\n");
    let err = parse_document(&input, None, ParseOptions::default(), |root| {
        root.get("servers").required().as_list_of(parse_server)
    })
    .unwrap_err();
    assert_eq!(
        err.errors[0].to_string(),
        "servers: Invalid value; expected: a list; found: object"
    );
}

#[test]
fn expanded_documents_accept_flat_keys() {
    let input = doc("a.b.host: x\na:\n  b:\n    port: 10\n");
    let parsed = parse_expanded_document(&input, Some("es.yml"), ParseOptions::default(), |root| {
        root.get("a.b").required().as_parsed(parse_server)
    })
    .expect("parse")
    .into_value()
    .into_value();
    assert_eq!(parsed.host.get(), "x");
    assert_eq!(*parsed.port.get(), 10);
    assert_eq!(parsed.host.source().full_path_string(), "es.yml: a.b.host");
}

#[test]
fn expanded_documents_report_collisions() {
    let input = doc("a.b: 1\na:\n  b:\n    host: x\n");
    let err = parse_expanded_document(&input, None, ParseOptions::default(), |_| Some(()))
        .unwrap_err();
    assert_eq!(err.errors[0].path, "a.b");
    assert!(matches!(
        err.errors[0].kind,
        ValidationErrorKind::InvalidTreeStructure { .. }
    ));
}
