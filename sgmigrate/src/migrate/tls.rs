use config_trace::{OptTraceable, Traceable};
use tracing::debug;

use crate::migrate::{MigrateError, MigrationContext, MigrationReporter, Migrator};
use crate::searchguard::{ClientAuthMode, SgConfig, SgSslLayer, SgTlsSettings};
use crate::xpack::{ClientAuthentication, SslSettings, StoreSettings, VerificationMode};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Layer {
    Transport,
    Http,
}

/// `xpack.security.{transport,http}.ssl.*` to `searchguard.ssl.*` for the
/// target `elasticsearch.yml`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TlsMigrator;

impl Migrator for TlsMigrator {
    fn name(&self) -> &'static str {
        "tls"
    }

    fn migrate(
        &self,
        context: &MigrationContext,
        reporter: &mut MigrationReporter,
    ) -> Result<Vec<SgConfig>, MigrateError> {
        let Some(tls) = &context.tls else {
            return Ok(Vec::new());
        };
        let transport = match tls.transport.get() {
            Some(settings) => Some(migrate_layer(Layer::Transport, settings, reporter)?),
            None => None,
        };
        let http = match tls.http.get() {
            Some(settings) => Some(migrate_layer(Layer::Http, settings, reporter)?),
            None => None,
        };
        if transport.is_none() && http.is_none() {
            return Ok(Vec::new());
        }
        Ok(vec![SgConfig::Tls(SgTlsSettings { transport, http })])
    }
}

fn migrate_layer(
    layer: Layer,
    settings: &SslSettings,
    reporter: &mut MigrationReporter,
) -> Result<SgSslLayer, MigrateError> {
    debug!(?layer, "migrating tls layer");
    let mut target = SgSslLayer {
        // Search Guard requires transport TLS, so it is always switched on.
        enabled: match layer {
            Layer::Transport => None,
            Layer::Http => settings.enabled.get().copied(),
        },
        pemcert_filepath: settings.certificate.get().cloned(),
        pemkey_filepath: settings.key.get().cloned(),
        enabled_protocols: texts(&settings.supported_protocols),
        enabled_ciphers: texts(&settings.cipher_suites),
        ..SgSslLayer::default()
    };

    if layer == Layer::Transport && settings.enabled.get() == Some(&false) {
        reporter.inconvertible(
            &settings.enabled,
            reporter.translate("{TLS_TRANSPORT_DISABLED}")?,
        );
    }

    if let Some(authorities) = settings.certificate_authorities.get() {
        target.pemtrustedcas_filepath = authorities.first().map(|ca| ca.get().clone());
        if authorities.len() > 1 {
            reporter.problem(
                settings.certificate_authorities.source(),
                reporter.translate("{TLS_MULTIPLE_CAS}")?,
            );
        }
    }

    if let Some(keystore) = settings.keystore.get() {
        target.keystore_filepath = keystore.path.get().cloned();
        target.keystore_type = keystore.store_type.get().cloned();
        target.keystore_password = store_password(keystore, reporter)?;
    }
    if let Some(truststore) = settings.truststore.get() {
        target.truststore_filepath = truststore.path.get().cloned();
        target.truststore_type = truststore.store_type.get().cloned();
        target.truststore_password = store_password(truststore, reporter)?;
    }

    match settings.verification_mode.get() {
        Some(VerificationMode::None) => {
            reporter.inconvertible(
                &settings.verification_mode,
                reporter.translate("{TLS_VERIFICATION_NONE}")?,
            );
        }
        Some(mode) if layer == Layer::Transport => {
            target.enforce_hostname_verification = Some(*mode == VerificationMode::Full);
        }
        _ => {}
    }

    match (layer, settings.client_authentication.get()) {
        (Layer::Http, Some(mode)) => {
            target.clientauth_mode = Some(match mode {
                ClientAuthentication::None => ClientAuthMode::None,
                ClientAuthentication::Optional => ClientAuthMode::Optional,
                ClientAuthentication::Required => ClientAuthMode::Require,
            });
        }
        (Layer::Transport, Some(mode)) if *mode != ClientAuthentication::Required => {
            reporter.problem(
                &settings.client_authentication,
                reporter.translate("{TLS_TRANSPORT_CLIENT_AUTH}")?,
            );
        }
        _ => {}
    }

    Ok(target)
}

/// Store passwords are secrets; only an empty placeholder is written.
fn store_password(
    store: &StoreSettings,
    reporter: &mut MigrationReporter,
) -> Result<Option<String>, MigrateError> {
    let Some(password) = store.any_password() else {
        return Ok(None);
    };
    reporter.problem(password, reporter.translate("{TLS_PASSWORD}")?);
    Ok(Some(String::new()))
}

fn texts(values: &OptTraceable<Vec<Traceable<String>>>) -> Vec<String> {
    values
        .get()
        .map(|values| values.iter().map(|value| value.get().clone()).collect())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::TlsMigrator;
    use crate::migrate::{MigrationContext, MigrationReporter, Migrator, ProblemKind};
    use crate::searchguard::{ClientAuthMode, SgConfig, SgTlsSettings};
    use crate::translate::Translator;
    use crate::xpack::XPackElasticsearchConfig;
    use config_trace::{parse_yaml, ParseOptions};
    use pretty_assertions::assert_eq;

    fn migrate(yaml: &str) -> (Option<SgTlsSettings>, MigrationReporter) {
        let doc = parse_yaml(yaml.as_bytes()).expect("yaml");
        let config =
            XPackElasticsearchConfig::parse_document(&doc, ParseOptions::default()).expect("valid");
        let context = MigrationContext::from_elasticsearch(config);
        let translator = Translator::embedded().expect("translations");
        let mut reporter = MigrationReporter::new(Arc::new(translator));
        let configs = TlsMigrator.migrate(&context, &mut reporter).expect("migrated");
        let tls = configs.into_iter().find_map(|config| match config {
            SgConfig::Tls(tls) => Some(tls),
            _ => None,
        });
        (tls, reporter)
    }

    #[test]
    fn pem_files_and_stores_carry_over_without_passwords() {
        let (tls, reporter) = migrate(
            "xpack.security.transport.ssl.enabled: true\n\
             xpack.security.transport.ssl.verification_mode: certificate\n\
             xpack.security.transport.ssl.keystore.path: node.p12\n\
             xpack.security.transport.ssl.keystore.password: changeme\n\
             xpack.security.http.ssl.enabled: true\n\
             xpack.security.http.ssl.key: node.key\n\
             xpack.security.http.ssl.certificate: node.crt\n\
             xpack.security.http.ssl.certificate_authorities: [ca.crt]\n\
             xpack.security.http.ssl.client_authentication: optional\n",
        );
        let tls = tls.expect("tls");
        let transport = tls.transport.expect("transport");
        assert_eq!(transport.keystore_filepath.as_deref(), Some("node.p12"));
        assert_eq!(transport.keystore_password.as_deref(), Some(""));
        assert_eq!(transport.enforce_hostname_verification, Some(false));

        let http = tls.http.expect("http");
        assert_eq!(http.enabled, Some(true));
        assert_eq!(http.pemkey_filepath.as_deref(), Some("node.key"));
        assert_eq!(http.pemcert_filepath.as_deref(), Some("node.crt"));
        assert_eq!(http.pemtrustedcas_filepath.as_deref(), Some("ca.crt"));
        assert_eq!(http.clientauth_mode, Some(ClientAuthMode::Optional));

        assert_eq!(reporter.len(), 1);
        assert_eq!(reporter.problems()[0].value.as_deref(), Some("***"));
    }

    #[test]
    fn disabled_verification_and_several_cas_are_reported() {
        let (_, reporter) = migrate(
            "xpack.security.http.ssl.verification_mode: none\n\
             xpack.security.http.ssl.certificate_authorities: [a.crt, b.crt]\n",
        );
        let kinds: Vec<_> = reporter.problems().iter().map(|p| p.kind).collect();
        assert_eq!(kinds, vec![ProblemKind::Problem, ProblemKind::Inconvertible]);
    }

    #[test]
    fn transport_client_auth_is_always_required() {
        let (_, reporter) = migrate("xpack.security.transport.ssl.client_authentication: none\n");
        assert_eq!(reporter.len(), 1);
        assert_eq!(
            reporter.problems()[0].path().as_deref(),
            Some("elasticsearch.yml: xpack.security.transport.ssl.client_authentication")
        );
    }

    #[test]
    fn disabled_transport_tls_is_inconvertible() {
        let (tls, reporter) = migrate(
            "xpack.security.transport.ssl.enabled: false\n\
             xpack.security.transport.ssl.certificate: n.crt\n",
        );
        let transport = tls.expect("tls").transport.expect("transport");
        assert_eq!(transport.enabled, None);
        assert_eq!(transport.pemcert_filepath.as_deref(), Some("n.crt"));

        assert_eq!(reporter.len(), 1);
        let problem = &reporter.problems()[0];
        assert_eq!(problem.kind, ProblemKind::Inconvertible);
        assert_eq!(
            problem.path().as_deref(),
            Some("elasticsearch.yml: xpack.security.transport.ssl.enabled")
        );
    }

    #[test]
    fn no_tls_settings_no_artifact() {
        let (tls, reporter) = migrate("cluster.name: x\n");
        assert!(tls.is_none());
        assert!(reporter.is_empty());
    }
}
