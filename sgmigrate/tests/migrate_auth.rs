mod support;

use config_trace::ParseOptions;
use pretty_assertions::assert_eq;
use sgmigrate::load::SourceKind;
use sgmigrate::migrate::{MigrateError, ProblemKind};
use sgmigrate::searchguard::{AuthBackend, FrontendBackend, IdentityProvider, SgConfig};

use support::{context_from, context_with_options, migrate};

#[test]
fn single_ldap_realm_becomes_one_ldap_domain_without_problems() {
    let context = context_from(
        SourceKind::Elasticsearch,
        r#"
xpack.security.authc.realms.ldap.ldap1:
  url: ldap://x
  bind_dn: cn=admin
  enabled: true
  order: 1
"#,
    );
    let (result, reporter) = migrate(&context);
    let result = result.expect("migration should succeed");

    assert_eq!(result.len(), 1);
    let Some(SgConfig::Authc(authc)) = result.find("sg_authc.yml") else {
        panic!("expected sg_authc.yml");
    };
    assert_eq!(authc.auth_domains.len(), 1);
    let domain = &authc.auth_domains[0];
    assert_eq!(domain.id.as_deref(), Some("ldap1"));
    assert!(domain.enabled);
    assert_eq!(domain.order, 1);
    let AuthBackend::Ldap(ldap) = &domain.backend else {
        panic!("expected an ldap backend");
    };
    assert_eq!(
        ldap.idp,
        IdentityProvider {
            hosts: vec!["ldap://x".to_string()],
            bind_dn: Some("cn=admin".to_string()),
            password: String::new(),
            min_pool_size: None,
            max_pool_size: None,
        }
    );
    assert!(reporter.is_empty(), "unexpected problems: {:?}", reporter.problems());
}

#[test]
fn realms_keep_their_order_and_enabled_state() {
    let context = context_from(
        SourceKind::Elasticsearch,
        r#"
xpack.security.authc.realms:
  ldap.corp:
    order: 2
    enabled: false
    url: ldap://corp
  native.local:
    order: 0
  file.fallback:
    order: 5
"#,
    );
    let (result, _) = migrate(&context);
    let result = result.expect("migration should succeed");
    let Some(SgConfig::Authc(authc)) = result.find("sg_authc.yml") else {
        panic!("expected sg_authc.yml");
    };

    let summary: Vec<_> = authc
        .auth_domains
        .iter()
        .map(|domain| (domain.id.clone().unwrap_or_default(), domain.order, domain.enabled))
        .collect();
    assert_eq!(
        summary,
        vec![
            ("local".to_string(), 0, true),
            ("corp".to_string(), 2, false),
            ("fallback".to_string(), 5, true),
        ]
    );
    assert_eq!(authc.auth_domains[0].backend, AuthBackend::Internal);
    assert_eq!(authc.auth_domains[2].backend, AuthBackend::Internal);
}

#[test]
fn unsupported_realm_stops_the_migration() {
    let context = context_from(
        SourceKind::Elasticsearch,
        r#"
xpack.security.authc.realms:
  native.local:
    order: 0
  kerberos.kerb1:
    order: 1
    keytab.path: es.keytab
"#,
    );
    let (result, _) = migrate(&context);
    let err = result.expect_err("kerberos has no Search Guard counterpart here");
    assert!(matches!(&err, MigrateError::UnsupportedRealm { kind, .. } if kind == "kerberos"));
    assert!(err
        .to_string()
        .contains("elasticsearch.yml: xpack.security.authc.realms.kerberos.kerb1"));
}

#[test]
fn saml_realms_go_to_the_frontend_config_only() {
    let context = context_from(
        SourceKind::Elasticsearch,
        r#"
xpack.security.authc.realms:
  native.local:
    order: 0
  saml.sso:
    order: 1
    idp.metadata.path: https://idp.example.com/metadata.xml
    idp.entity_id: https://idp.example.com
    sp.entity_id: https://kibana.example.com
"#,
    );
    let (result, reporter) = migrate(&context);
    let result = result.expect("migration should succeed");

    let Some(SgConfig::Authc(authc)) = result.find("sg_authc.yml") else {
        panic!("expected sg_authc.yml");
    };
    assert_eq!(authc.auth_domains.len(), 1);
    assert_eq!(authc.auth_domains[0].id.as_deref(), Some("local"));

    let Some(SgConfig::FrontendAuthc(frontend)) = result.find("sg_frontend_authc.yml") else {
        panic!("expected sg_frontend_authc.yml");
    };
    let kinds: Vec<_> = frontend
        .auth_domains
        .iter()
        .map(|domain| matches!(domain.backend, FrontendBackend::Saml(_)))
        .collect();
    assert_eq!(kinds, vec![false, true]);
    assert!(reporter.is_empty(), "unexpected problems: {:?}", reporter.problems());
}

#[test]
fn tracked_defaults_are_reported_per_realm() {
    let context = context_with_options(
        SourceKind::Elasticsearch,
        "xpack.security.authc.realms.native.local.order: 0\n\
         xpack.security.authc.realms.file.backup.order: 1\n\
         xpack.security.authc.realms.file.backup.enabled: true\n",
        ParseOptions {
            track_defaults: true,
        },
    );
    let (result, reporter) = migrate(&context);
    result.expect("migration should succeed");

    let defaults: Vec<_> = reporter
        .problems()
        .iter()
        .filter(|problem| problem.kind == ProblemKind::DefaultApplied)
        .filter_map(|problem| problem.path())
        .collect();
    assert_eq!(
        defaults,
        vec!["elasticsearch.yml: xpack.security.authc.realms.native.local.enabled"]
    );
}

#[test]
fn duplicate_realm_order_is_a_validation_error() {
    let doc = config_trace::parse_yaml(
        b"xpack.security.authc.realms:\n  native.a:\n    order: 1\n  file.b:\n    order: 1\n",
    )
    .expect("yaml");
    let err = sgmigrate::load::build_context(
        vec![(SourceKind::Elasticsearch, doc)],
        ParseOptions::default(),
    )
    .expect_err("orders collide");
    let messages = err.validation_errors()[0].messages();
    assert!(
        messages.iter().any(|message| message.contains("already used by realm")),
        "{messages:?}"
    );
}
