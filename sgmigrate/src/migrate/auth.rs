use config_trace::{OptTraceable, Traceable};
use tracing::debug;

use crate::message::MessageBuilder;
use crate::migrate::{MigrateError, MigrationContext, MigrationReporter, Migrator};
use crate::searchguard::{
    AuthBackend, AuthDomain, IdentityProvider, LdapDomain, LdapFilter, LdapScope, LdapSearch,
    SgAuthc, SgConfig,
};
use crate::xpack::{ActiveDirectoryRealm, LdapRealm, Realm, RealmSettings, SearchScope};

const USER_NAME: &str = "${user.name}";
const USER_DN: &str = "${dn}";
const DEFAULT_LDAP_USER_FILTER: &str = "(uid=${user.name})";
const AD_USER_FILTER: &str = "(&(objectClass=user)(sAMAccountName=${user.name}))";
const AD_GROUP_FILTER: &str = "(member=${dn})";
const AD_PORT: u16 = 389;

/// Realms to `sg_authc.yml` authentication domains. Browser login realms
/// (SAML, OIDC) are left to the frontend migrator.
#[derive(Debug, Clone, Copy, Default)]
pub struct AuthMigrator;

impl Migrator for AuthMigrator {
    fn name(&self) -> &'static str {
        "auth"
    }

    fn migrate(
        &self,
        context: &MigrationContext,
        reporter: &mut MigrationReporter,
    ) -> Result<Vec<SgConfig>, MigrateError> {
        let Some(realms) = &context.realms else {
            return Ok(Vec::new());
        };
        // Nothing is produced for a realm set this tool cannot fully handle.
        if let Some(realm) = realms
            .get()
            .iter()
            .find(|realm| matches!(realm.get().settings, RealmSettings::Unsupported { .. }))
        {
            return Err(unsupported(realm));
        }

        if let Some(enabled) = &context.security_enabled {
            if !*enabled.get() {
                reporter.problem(enabled, reporter.translate("{SECURITY_DISABLED}")?);
            }
        }

        let mut auth_domains = Vec::with_capacity(realms.get().len());
        for realm in realms.get() {
            if let Some(domain) = migrate_realm(realm, reporter)? {
                auth_domains.push(domain);
            }
        }
        if auth_domains.is_empty() {
            return Ok(Vec::new());
        }
        Ok(vec![SgConfig::Authc(SgAuthc { auth_domains })])
    }
}

fn unsupported(realm: &Traceable<Realm>) -> MigrateError {
    MigrateError::UnsupportedRealm {
        kind: realm.get().kind.clone(),
        location: realm.source().clone(),
    }
}

fn migrate_realm(
    realm: &Traceable<Realm>,
    reporter: &mut MigrationReporter,
) -> Result<Option<AuthDomain>, MigrateError> {
    let value = realm.get();
    debug!(realm = %value.name, kind = %value.kind, order = *value.order.get(), "migrating realm");
    if value.enabled.is_defaulted() {
        reporter.default_applied(&value.enabled)?;
    }

    let backend = match &value.settings {
        RealmSettings::Native | RealmSettings::File | RealmSettings::Basic => AuthBackend::Internal,
        RealmSettings::Ldap(ldap) => AuthBackend::Ldap(migrate_ldap(ldap, reporter)?),
        RealmSettings::ActiveDirectory(ad) => {
            AuthBackend::Ldap(migrate_active_directory(ad, reporter)?)
        }
        RealmSettings::Saml(_) | RealmSettings::Oidc(_) => {
            debug!(realm = %value.name, "browser login realm, left to sg_frontend_authc.yml");
            return Ok(None);
        }
        RealmSettings::Unsupported { .. } => return Err(unsupported(realm)),
    };

    Ok(Some(AuthDomain {
        id: Some(value.name.clone()),
        enabled: *value.enabled.get(),
        order: *value.order.get(),
        backend,
    }))
}

fn migrate_ldap(
    ldap: &LdapRealm,
    reporter: &mut MigrationReporter,
) -> Result<LdapDomain, MigrateError> {
    let hosts = ldap.urls.get().map(|urls| texts(urls)).unwrap_or_default();
    let idp = identity_provider(ldap, hosts, reporter)?;
    let user_search = match dn_template_search(ldap, reporter)? {
        Some(search) => Some(search),
        None => match ldap.user_search.get() {
            Some(search) => Some(LdapSearch {
                base_dn: search.base_dn.get().cloned(),
                scope: migrate_scope(&search.scope, reporter)?,
                filter: Some(LdapFilter::Raw(
                    search
                        .filter
                        .get()
                        .map(|filter| filter.replace("{0}", USER_NAME))
                        .unwrap_or_else(|| DEFAULT_LDAP_USER_FILTER.to_string()),
                )),
            }),
            None => None,
        },
    };
    let group_search = match ldap.group_search.get() {
        Some(search) => Some(LdapSearch {
            base_dn: search.base_dn.get().cloned(),
            scope: migrate_scope(&search.scope, reporter)?,
            filter: search
                .filter
                .get()
                .map(|filter| LdapFilter::Raw(filter.replace("{0}", USER_DN))),
        }),
        None => None,
    };
    Ok(LdapDomain {
        idp,
        user_search,
        group_search,
    })
}

/// Active Directory is LDAP with searches rooted at the domain.
fn migrate_active_directory(
    ad: &ActiveDirectoryRealm,
    reporter: &mut MigrationReporter,
) -> Result<LdapDomain, MigrateError> {
    let ldap = &ad.ldap;
    let domain_dn = ad.domain_dn();
    let hosts = match ldap.urls.get() {
        Some(urls) => texts(urls),
        None => vec![format!("ldap://{}:{AD_PORT}", ad.domain_name.get())],
    };
    let idp = identity_provider(ldap, hosts, reporter)?;

    let user_search = ldap.user_search.get();
    let user_scope = match user_search {
        Some(search) => migrate_scope(&search.scope, reporter)?,
        None => None,
    };
    let user_search = LdapSearch {
        base_dn: Some(
            user_search
                .and_then(|search| search.base_dn.get().cloned())
                .unwrap_or_else(|| domain_dn.clone()),
        ),
        scope: user_scope,
        filter: Some(LdapFilter::Raw(
            user_search
                .and_then(|search| search.filter.get())
                .map(|filter| filter.replace("{0}", USER_NAME))
                .unwrap_or_else(|| AD_USER_FILTER.to_string()),
        )),
    };

    let group_search = ldap.group_search.get();
    let group_scope = match group_search {
        Some(search) => migrate_scope(&search.scope, reporter)?,
        None => None,
    };
    let group_search = LdapSearch {
        base_dn: Some(
            group_search
                .and_then(|search| search.base_dn.get().cloned())
                .unwrap_or(domain_dn),
        ),
        scope: group_scope,
        filter: Some(LdapFilter::Raw(
            group_search
                .and_then(|search| search.filter.get())
                .map(|filter| filter.replace("{0}", USER_DN))
                .unwrap_or_else(|| AD_GROUP_FILTER.to_string()),
        )),
    };

    Ok(LdapDomain {
        idp,
        user_search: Some(user_search),
        group_search: Some(group_search),
    })
}

fn identity_provider(
    ldap: &LdapRealm,
    hosts: Vec<String>,
    reporter: &mut MigrationReporter,
) -> Result<IdentityProvider, MigrateError> {
    let passwords: Vec<&OptTraceable<String>> = [&ldap.bind_password, &ldap.secure_bind_password]
        .into_iter()
        .filter(|password| password.is_present())
        .collect();
    for password in &passwords {
        reporter.problem(*password, reporter.translate("{BIND_PASSWORD_MANUAL}")?);
    }
    if passwords.len() > 1 {
        reporter.problem(
            &ldap.secure_bind_password,
            reporter.translate("{BIND_PASSWORD_CONFLICT}")?,
        );
    }

    let (mut min_pool_size, mut max_pool_size) = (None, None);
    if let Some(search) = ldap.user_search.get() {
        if search.pool_enabled.get() == Some(&false) {
            reporter.inconvertible(
                &search.pool_enabled,
                reporter.translate("{CONNECTION_POOL_DISABLED}")?,
            );
        }
        min_pool_size = search.pool_initial_size.get().copied();
        max_pool_size = search.pool_size.get().copied();
    }

    Ok(IdentityProvider {
        hosts,
        bind_dn: ldap.bind_dn.get().cloned(),
        password: String::new(),
        min_pool_size,
        max_pool_size,
    })
}

/// `uid={0},ou=people,dc=example,dc=com` becomes a one level search for
/// `(uid=${user.name})` below `ou=people,dc=example,dc=com`.
fn dn_template_search(
    ldap: &LdapRealm,
    reporter: &mut MigrationReporter,
) -> Result<Option<LdapSearch>, MigrateError> {
    let Some(template) = ldap
        .user_dn_templates
        .get()
        .and_then(|templates| templates.first())
    else {
        return Ok(None);
    };
    let explicit_base = ldap
        .user_search
        .get()
        .is_some_and(|search| search.base_dn.is_present());
    if explicit_base {
        reporter.problem(template, reporter.translate("{USER_DN_TEMPLATE_IGNORED}")?);
        return Ok(None);
    }

    let Some((attribute, base_dn)) = parse_dn_template(template.get()) else {
        reporter.inconvertible(template, reporter.translate("{USER_DN_TEMPLATE_UNPARSABLE}")?);
        return Ok(None);
    };
    reporter.problem(template, reporter.translate("{USER_DN_TEMPLATE_APPROXIMATED}")?);
    Ok(Some(LdapSearch {
        base_dn: Some(base_dn.to_string()),
        scope: Some(LdapScope::One),
        filter: Some(LdapFilter::Raw(format!("({attribute}={USER_NAME})"))),
    }))
}

fn parse_dn_template(template: &str) -> Option<(&str, &str)> {
    let (first, base_dn) = template.split_once(',')?;
    let (attribute, placeholder) = first.split_once('=')?;
    let attribute = attribute.trim();
    let base_dn = base_dn.trim();
    (placeholder.trim() == "{0}" && !attribute.is_empty() && !base_dn.is_empty())
        .then_some((attribute, base_dn))
}

fn migrate_scope(
    scope: &OptTraceable<SearchScope>,
    reporter: &mut MigrationReporter,
) -> Result<Option<LdapScope>, MigrateError> {
    match scope.get() {
        None => Ok(None),
        Some(SearchScope::SubTree) => Ok(Some(LdapScope::Sub)),
        Some(SearchScope::OneLevel) => Ok(Some(LdapScope::One)),
        Some(SearchScope::Base) => {
            let mut message = MessageBuilder::new();
            message
                .append_key_value(
                    reporter.translate("{SEARCH_SCOPE_ALTERNATIVES}")?,
                    "SUB, ONE",
                )
                .next_sentence()
                .append(reporter.translate("{SEARCH_SCOPE_OMITTED}")?);
            reporter.inconvertible(scope, message.finalize());
            Ok(None)
        }
    }
}

fn texts(values: &[Traceable<String>]) -> Vec<String> {
    values.iter().map(|value| value.get().clone()).collect()
}
