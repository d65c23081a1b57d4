use config_trace::Traceable;
use tracing::debug;

use crate::migrate::{MigrateError, MigrationContext, MigrationReporter, Migrator};
use crate::searchguard::{
    FrontendAuthDomain, FrontendBackend, OidcDomain, SamlDomain, SgConfig, SgFrontendAuthc,
    UserMapping,
};
use crate::xpack::{
    KibanaConfig, KibanaProvider, OidcRealm, ProviderSettings, Realm, RealmSettings, SamlRealm,
};

const KIBANA_SAML_ACS: &str = "/api/security/saml/callback";
const SEARCHGUARD_SAML_ACS: &str = "/searchguard/saml/acs";
const OPENID_CONFIGURATION: &str = ".well-known/openid-configuration";
const SAML_LABEL: &str = "SAML Login";
const OIDC_LABEL: &str = "OIDC Login";

/// Kibana login providers, or the browser-facing realms of `elasticsearch.yml`
/// when no provider is configured, to `sg_frontend_authc.yml`.
#[derive(Debug, Clone, Copy, Default)]
pub struct FrontendAuthMigrator;

impl Migrator for FrontendAuthMigrator {
    fn name(&self) -> &'static str {
        "frontend_auth"
    }

    fn migrate(
        &self,
        context: &MigrationContext,
        reporter: &mut MigrationReporter,
    ) -> Result<Vec<SgConfig>, MigrateError> {
        let realms: &[Traceable<Realm>] = context
            .realms
            .as_ref()
            .map(|realms| realms.get().as_slice())
            .unwrap_or_default();

        let mut auth_domains = match &context.kibana {
            Some(kibana) => migrate_providers(kibana.get(), realms, reporter)?,
            None => Vec::new(),
        };
        if auth_domains.is_empty() {
            auth_domains = migrate_realms(realms, reporter)?;
        }
        if auth_domains.is_empty() {
            debug!("no frontend auth domains");
            return Ok(Vec::new());
        }
        Ok(vec![SgConfig::FrontendAuthc(SgFrontendAuthc { auth_domains })])
    }
}

fn migrate_providers(
    kibana: &KibanaConfig,
    realms: &[Traceable<Realm>],
    reporter: &mut MigrationReporter,
) -> Result<Vec<FrontendAuthDomain>, MigrateError> {
    if !*kibana.security_enabled.get() {
        reporter.problem(
            &kibana.security_enabled,
            reporter.translate("{KIBANA_SECURITY_DISABLED}")?,
        );
    }

    let providers = kibana.providers.get();
    let auto_select = !*kibana.selector_enabled.get() && providers.len() == 1;
    let mut auth_domains = Vec::with_capacity(providers.len());
    for provider in providers {
        let value = provider.get();
        if !*value.enabled.get() {
            debug!(provider = %value.name, kind = %value.kind, "skipping disabled provider");
            continue;
        }
        let Some(mut domain) = migrate_provider(provider, realms, reporter)? else {
            continue;
        };
        let is_basic = |domain: &FrontendAuthDomain| domain.backend == FrontendBackend::Basic;
        if is_basic(&domain) && auth_domains.iter().any(is_basic) {
            debug!(provider = %value.name, "basic login already configured");
            continue;
        }
        domain.auto_select = auto_select;
        auth_domains.push(domain);
    }
    Ok(auth_domains)
}

fn migrate_provider(
    provider: &Traceable<KibanaProvider>,
    realms: &[Traceable<Realm>],
    reporter: &mut MigrationReporter,
) -> Result<Option<FrontendAuthDomain>, MigrateError> {
    let value = provider.get();
    debug!(provider = %value.name, kind = %value.kind, "migrating kibana provider");
    let description = value.description.get().cloned();
    let domain = match &value.settings {
        ProviderSettings::Basic | ProviderSettings::Token => FrontendAuthDomain {
            label: description,
            ..FrontendAuthDomain::basic()
        },
        ProviderSettings::Saml { realm } => {
            let Some(saml) = find_realm(realms, realm.get(), |settings| match settings {
                RealmSettings::Saml(saml) => Some(saml),
                _ => None,
            }) else {
                reporter.problem(realm, reporter.translate("{FRONTEND_REALM_NOT_FOUND}")?);
                return Ok(None);
            };
            FrontendAuthDomain {
                id: Some(value.name.clone()),
                label: Some(description.unwrap_or_else(|| SAML_LABEL.to_string())),
                auto_select: false,
                backend: FrontendBackend::Saml(saml_domain(saml, reporter)?),
            }
        }
        ProviderSettings::Oidc { realm } => {
            let Some(oidc) = find_realm(realms, realm.get(), |settings| match settings {
                RealmSettings::Oidc(oidc) => Some(oidc),
                _ => None,
            }) else {
                reporter.problem(realm, reporter.translate("{FRONTEND_REALM_NOT_FOUND}")?);
                return Ok(None);
            };
            FrontendAuthDomain {
                id: Some(value.name.clone()),
                label: Some(description.unwrap_or_else(|| OIDC_LABEL.to_string())),
                auto_select: false,
                backend: FrontendBackend::Oidc(oidc_domain(oidc, reporter)?),
            }
        }
        ProviderSettings::Other => {
            reporter.inconvertible(
                provider,
                reporter.translate("{FRONTEND_PROVIDER_UNSUPPORTED}")?,
            );
            return Ok(None);
        }
    };
    Ok(Some(domain))
}

fn find_realm<'r, T>(
    realms: &'r [Traceable<Realm>],
    name: &str,
    settings: impl Fn(&'r RealmSettings) -> Option<&'r T>,
) -> Option<&'r T> {
    realms
        .iter()
        .map(Traceable::get)
        .filter(|realm| realm.name == name)
        .find_map(|realm| settings(&realm.settings))
}

/// Enabled realms in order; the first one is selected automatically.
fn migrate_realms(
    realms: &[Traceable<Realm>],
    reporter: &mut MigrationReporter,
) -> Result<Vec<FrontendAuthDomain>, MigrateError> {
    let mut auth_domains = Vec::new();
    let mut has_basic = false;
    let mut first = true;
    for realm in realms.iter().map(Traceable::get) {
        if !*realm.enabled.get() {
            debug!(realm = %realm.name, "skipping disabled realm");
            continue;
        }
        let auto_select = first;
        first = false;
        let domain = match &realm.settings {
            RealmSettings::Native | RealmSettings::File | RealmSettings::Basic => {
                if has_basic {
                    continue;
                }
                has_basic = true;
                FrontendAuthDomain::basic()
            }
            RealmSettings::Saml(saml) => FrontendAuthDomain {
                id: Some(realm.name.clone()),
                label: Some(realm.name.clone()),
                auto_select,
                backend: FrontendBackend::Saml(saml_domain(saml, reporter)?),
            },
            RealmSettings::Oidc(oidc) => FrontendAuthDomain {
                id: Some(realm.name.clone()),
                label: Some(realm.name.clone()),
                auto_select,
                backend: FrontendBackend::Oidc(oidc_domain(oidc, reporter)?),
            },
            RealmSettings::Ldap(_)
            | RealmSettings::ActiveDirectory(_)
            | RealmSettings::Unsupported { .. } => {
                debug!(realm = %realm.name, kind = %realm.kind, "no frontend login for realm");
                continue;
            }
        };
        auth_domains.push(domain);
    }
    Ok(auth_domains)
}

fn saml_domain(
    saml: &SamlRealm,
    reporter: &mut MigrationReporter,
) -> Result<SamlDomain, MigrateError> {
    let metadata = saml.idp_metadata_path.get();
    if !(metadata.starts_with("https://") || metadata.starts_with("http://")) {
        reporter.problem(&saml.idp_metadata_path, reporter.translate("{SAML_METADATA_FILE}")?);
    }
    Ok(SamlDomain {
        idp_metadata_url: metadata.clone(),
        idp_entity_id: saml.idp_entity_id.get().clone(),
        sp_entity_id: saml.sp_entity_id.get().clone(),
        sp_acs: saml
            .sp_acs
            .get()
            .map(|acs| acs.replace(KIBANA_SAML_ACS, SEARCHGUARD_SAML_ACS)),
        user_mapping: UserMapping {
            user_name_from: saml.principal_attribute.get().map(|name| saml_attribute(name)),
            roles_from: saml.groups_attribute.get().map(|name| saml_attribute(name)),
        },
    })
}

/// Where an X-Pack SAML attribute name is found in a Search Guard SAML response.
fn saml_attribute(name: &str) -> String {
    let lower = name.to_ascii_lowercase();
    let attribute = match lower.as_str() {
        "nameid" | "nameid:persistent" | "nameid:transient" => {
            return "saml_response.name_id".to_string();
        }
        "email" | "mail" => "email",
        "uid" | "userid" => "uid",
        "name" | "displayname" => "name",
        "groups" | "roles" => "groups",
        other => other,
    };
    format!("saml_response.attributes.{attribute}")
}

fn oidc_domain(
    oidc: &OidcRealm,
    reporter: &mut MigrationReporter,
) -> Result<OidcDomain, MigrateError> {
    reporter.problem(
        &oidc.client_secret,
        reporter.translate("{OIDC_CLIENT_SECRET_MANUAL}")?,
    );
    let issuer = oidc.issuer.get().trim_end_matches('/');
    Ok(OidcDomain {
        client_id: oidc.client_id.get().clone(),
        client_secret: String::new(),
        openid_configuration_url: format!("{issuer}/{OPENID_CONFIGURATION}"),
        user_mapping: UserMapping {
            user_name_from: oidc.principal_claim.get().map(|claim| id_token_claim(claim)),
            roles_from: oidc.groups_claim.get().map(|claim| id_token_claim(claim)),
        },
    })
}

fn id_token_claim(claim: &str) -> String {
    format!("oidc_id_token.{claim}")
}
