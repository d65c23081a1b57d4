use std::collections::HashMap;

use config_trace::{
    parse_expanded_document, ConfigEnum, ConfigValidationError, DocNode, OptTraceable,
    ParseOptions, Traceable, TraceableDocNode, ValidationErrorKind,
};

use crate::xpack::tls::TlsConfig;

/// Security-related settings of an X-Pack `elasticsearch.yml`.
#[derive(Debug, Clone, PartialEq)]
pub struct XPackElasticsearchConfig {
    pub security_enabled: Traceable<bool>,
    /// Realms sorted by their `order`.
    pub realms: Traceable<Vec<Traceable<Realm>>>,
    pub tls: TlsConfig,
}

impl XPackElasticsearchConfig {
    pub const FILE_NAME: &'static str = "elasticsearch.yml";

    pub fn parse_document(
        doc: &DocNode,
        options: ParseOptions,
    ) -> Result<Traceable<Self>, ConfigValidationError> {
        parse_expanded_document(doc, Some(Self::FILE_NAME), options, Self::parse)
    }

    pub fn parse(node: &TraceableDocNode<'_>) -> Option<Self> {
        let security_enabled = node.get("xpack.security.enabled").as_bool_or(true);
        let realms_attr = node.get("xpack.security.authc.realms");
        let realms_source = realms_attr.source();
        let by_type = realms_attr
            .as_map_of(|type_node| {
                let kind = type_node.key().unwrap_or_default().to_string();
                type_node
                    .as_attribute()
                    .as_map_of(|realm_node| Realm::parse(&kind, realm_node))
                    .into_option()
            })
            .into_option()
            .unwrap_or_default();

        let mut realms: Vec<Traceable<Realm>> = by_type
            .into_values()
            .flat_map(|named| named.into_value().into_values())
            .collect();
        realms.sort_by_key(|realm| *realm.get().order.get());
        check_unique_order(node, &realms);

        let tls = TlsConfig::parse(node);

        Some(Self {
            security_enabled,
            realms: Traceable::of(realms_source, realms),
            tls,
        })
    }
}

fn check_unique_order(node: &TraceableDocNode<'_>, realms: &[Traceable<Realm>]) {
    let mut seen: HashMap<i32, &str> = HashMap::new();
    for realm in realms {
        let realm = realm.get();
        let order = *realm.order.get();
        if let Some(first) = seen.insert(order, &realm.name) {
            node.add_error_at(
                &format!("xpack.security.authc.realms.{}.{}.order", realm.kind, realm.name),
                ValidationErrorKind::Custom {
                    message: format!("Realm order {order} is already used by realm {first}"),
                },
            );
        }
    }
}

/// One `xpack.security.authc.realms.<kind>.<name>` entry.
#[derive(Debug, Clone, PartialEq)]
pub struct Realm {
    pub kind: String,
    pub name: String,
    pub order: Traceable<i32>,
    pub enabled: Traceable<bool>,
    pub settings: RealmSettings,
}

/// Kind-specific settings; the closed set of realm kinds this tool knows.
#[derive(Debug, Clone, PartialEq)]
pub enum RealmSettings {
    Native,
    File,
    Basic,
    Ldap(LdapRealm),
    ActiveDirectory(ActiveDirectoryRealm),
    Saml(SamlRealm),
    Oidc(OidcRealm),
    /// Any other kind (pki, jwt, kerberos, custom realms).
    Unsupported { raw: DocNode },
}

impl Realm {
    pub fn parse(kind: &str, node: &TraceableDocNode<'_>) -> Option<Self> {
        let name = node.key().unwrap_or_default().to_string();
        let order = node.get("order").required().as_i32();
        let enabled = node.get("enabled").as_bool_or(true);
        let settings = match kind {
            "native" => Some(RealmSettings::Native),
            "file" => Some(RealmSettings::File),
            "basic" => Some(RealmSettings::Basic),
            "ldap" => LdapRealm::parse(node, true).map(RealmSettings::Ldap),
            "active_directory" => {
                ActiveDirectoryRealm::parse(node).map(RealmSettings::ActiveDirectory)
            }
            "saml" => SamlRealm::parse(node).map(RealmSettings::Saml),
            "oidc" => OidcRealm::parse(node).map(RealmSettings::Oidc),
            _ => Some(RealmSettings::Unsupported {
                raw: node.doc().clone(),
            }),
        };
        Some(Self {
            kind: kind.to_string(),
            name,
            order: order?,
            enabled,
            settings: settings?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchScope {
    SubTree,
    OneLevel,
    Base,
}

impl ConfigEnum for SearchScope {
    fn variants() -> &'static [(&'static str, Self)] {
        &[
            ("sub_tree", SearchScope::SubTree),
            ("one_level", SearchScope::OneLevel),
            ("base", SearchScope::Base),
        ]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LdapRealm {
    pub urls: OptTraceable<Vec<Traceable<String>>>,
    pub bind_dn: OptTraceable<String>,
    pub bind_password: OptTraceable<String>,
    pub secure_bind_password: OptTraceable<String>,
    pub user_dn_templates: OptTraceable<Vec<Traceable<String>>>,
    pub user_search: OptTraceable<UserSearch>,
    pub group_search: OptTraceable<GroupSearch>,
}

impl LdapRealm {
    pub fn parse(node: &TraceableDocNode<'_>, url_required: bool) -> Option<Self> {
        let url = node.get("url");
        let urls = if url_required {
            url.required().as_list_of_strings().map(|urls| {
                OptTraceable::of_nullable(urls.source().clone(), Some(urls.into_value()))
            })
        } else {
            Some(url.as_list_of_strings())
        };
        Some(Self {
            urls: urls?,
            bind_dn: node.get("bind_dn").as_string(),
            bind_password: node.get("bind_password").secret().as_string(),
            secure_bind_password: node.get("secure_bind_password").secret().as_string(),
            user_dn_templates: node.get("user_dn_templates").as_list_of_strings(),
            user_search: node.get("user_search").as_parsed(UserSearch::parse),
            group_search: node.get("group_search").as_parsed(GroupSearch::parse),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct UserSearch {
    pub base_dn: OptTraceable<String>,
    pub filter: OptTraceable<String>,
    pub scope: OptTraceable<SearchScope>,
    pub pool_enabled: OptTraceable<bool>,
    pub pool_initial_size: OptTraceable<i32>,
    pub pool_size: OptTraceable<i32>,
}

impl UserSearch {
    fn parse(node: &TraceableDocNode<'_>) -> Option<Self> {
        Some(Self {
            base_dn: node.get("base_dn").as_string(),
            filter: node.get("filter").as_string(),
            scope: node.get("scope").as_enum(),
            pool_enabled: node.get("pool.enabled").as_bool(),
            pool_initial_size: node.get("pool.initial_size").as_i32(),
            pool_size: node.get("pool.size").as_i32(),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GroupSearch {
    pub base_dn: OptTraceable<String>,
    pub filter: OptTraceable<String>,
    pub scope: OptTraceable<SearchScope>,
}

impl GroupSearch {
    fn parse(node: &TraceableDocNode<'_>) -> Option<Self> {
        Some(Self {
            base_dn: node.get("base_dn").as_string(),
            filter: node.get("filter").as_string(),
            scope: node.get("scope").as_enum(),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ActiveDirectoryRealm {
    pub domain_name: Traceable<String>,
    pub ldap: LdapRealm,
}

impl ActiveDirectoryRealm {
    pub fn parse(node: &TraceableDocNode<'_>) -> Option<Self> {
        let domain_name = node.get("domain_name").required().as_string();
        let ldap = LdapRealm::parse(node, false);
        Some(Self {
            domain_name: domain_name?,
            ldap: ldap?,
        })
    }

    /// `example.com` becomes `DC=example,DC=com`.
    pub fn domain_dn(&self) -> String {
        self.domain_name
            .get()
            .split('.')
            .filter(|part| !part.is_empty())
            .map(|part| format!("DC={part}"))
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// Browser single sign-on through a SAML identity provider.
#[derive(Debug, Clone, PartialEq)]
pub struct SamlRealm {
    pub idp_metadata_path: Traceable<String>,
    pub idp_entity_id: Traceable<String>,
    pub sp_entity_id: Traceable<String>,
    pub sp_acs: OptTraceable<String>,
    pub principal_attribute: OptTraceable<String>,
    pub groups_attribute: OptTraceable<String>,
}

impl SamlRealm {
    pub fn parse(node: &TraceableDocNode<'_>) -> Option<Self> {
        let idp_metadata_path = node.get("idp.metadata.path").required().as_string();
        let idp_entity_id = node.get("idp.entity_id").required().as_string();
        let sp_entity_id = node.get("sp.entity_id").required().as_string();
        Some(Self {
            idp_metadata_path: idp_metadata_path?,
            idp_entity_id: idp_entity_id?,
            sp_entity_id: sp_entity_id?,
            sp_acs: node.get("sp.acs").as_string(),
            principal_attribute: node.get("attributes.principal").as_string(),
            groups_attribute: node.get("attributes.groups").as_string(),
        })
    }
}

/// OpenID Connect relying party settings.
#[derive(Debug, Clone, PartialEq)]
pub struct OidcRealm {
    pub client_id: Traceable<String>,
    pub client_secret: OptTraceable<String>,
    pub issuer: Traceable<String>,
    pub principal_claim: OptTraceable<String>,
    pub groups_claim: OptTraceable<String>,
}

impl OidcRealm {
    pub fn parse(node: &TraceableDocNode<'_>) -> Option<Self> {
        let client_id = node.get("rp.client_id").required().as_string();
        let issuer = node.get("op.issuer").required().as_string();
        Some(Self {
            client_id: client_id?,
            client_secret: node.get("rp.client_secret").secret().as_string(),
            issuer: issuer?,
            principal_claim: node.get("claims.principal").as_string(),
            groups_claim: node.get("claims.groups").as_string(),
        })
    }
}
