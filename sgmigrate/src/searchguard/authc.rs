use config_trace::{ConfigEnum, DocNode, TraceableDocNode, ValidationErrorKind};

use crate::searchguard::{DocBuilder, NamedConfig};

const INTERNAL_TYPE: &str = "basic/internal_users_db";
const LDAP_TYPE: &str = "basic/ldap";

/// `sg_authc.yml`
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SgAuthc {
    pub auth_domains: Vec<AuthDomain>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AuthDomain {
    pub id: Option<String>,
    pub enabled: bool,
    pub order: i32,
    pub backend: AuthBackend,
}

/// Credential backend behind the `basic` HTTP authenticator.
#[derive(Debug, Clone, PartialEq)]
pub enum AuthBackend {
    Internal,
    Ldap(LdapDomain),
}

#[derive(Debug, Clone, PartialEq)]
pub struct LdapDomain {
    pub idp: IdentityProvider,
    pub user_search: Option<LdapSearch>,
    pub group_search: Option<LdapSearch>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IdentityProvider {
    pub hosts: Vec<String>,
    pub bind_dn: Option<String>,
    /// Always written empty; bind credentials are entered by an operator.
    pub password: String,
    pub min_pool_size: Option<i32>,
    pub max_pool_size: Option<i32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LdapScope {
    Sub,
    One,
}

impl ConfigEnum for LdapScope {
    fn variants() -> &'static [(&'static str, Self)] {
        &[("sub", LdapScope::Sub), ("one", LdapScope::One)]
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LdapFilter {
    /// Raw filter with `${user.name}` and `${dn}` placeholders.
    Raw(String),
    ByAttribute(String),
}

impl LdapFilter {
    fn key(&self) -> &'static str {
        match self {
            LdapFilter::Raw(_) => "filter.raw",
            LdapFilter::ByAttribute(_) => "filter.by_attribute",
        }
    }

    fn value(&self) -> &str {
        match self {
            LdapFilter::Raw(value) | LdapFilter::ByAttribute(value) => value,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LdapSearch {
    pub base_dn: Option<String>,
    pub scope: Option<LdapScope>,
    pub filter: Option<LdapFilter>,
}

impl LdapSearch {
    fn to_doc(&self) -> DocNode {
        let builder = DocBuilder::new()
            .put_opt("base_dn", self.base_dn.clone())
            .put_opt("scope", self.scope.map(ConfigEnum::config_name));
        let builder = match &self.filter {
            Some(filter) => builder.put(filter.key(), filter.value()),
            None => builder,
        };
        builder.build()
    }

    fn parse(node: &TraceableDocNode<'_>) -> Option<Self> {
        let raw = node.get("filter.raw").as_string().into_option();
        let by_attribute = node.get("filter.by_attribute").as_string().into_option();
        Some(Self {
            base_dn: node.get("base_dn").as_string().into_option(),
            scope: node.get("scope").as_enum().into_option(),
            filter: raw
                .map(LdapFilter::Raw)
                .or(by_attribute.map(LdapFilter::ByAttribute)),
        })
    }
}

impl IdentityProvider {
    fn to_doc(&self) -> DocNode {
        DocBuilder::new()
            .put("hosts", self.hosts.clone())
            .put_opt("bind_dn", self.bind_dn.clone())
            .put("password", self.password.as_str())
            .put_opt("min_pool_size", self.min_pool_size)
            .put_opt("max_pool_size", self.max_pool_size)
            .build()
    }

    fn parse(node: &TraceableDocNode<'_>) -> Option<Self> {
        let hosts = node.get("hosts").required().as_list_of_strings()?;
        Some(Self {
            hosts: hosts.into_value().into_iter().map(|host| host.into_value()).collect(),
            bind_dn: node.get("bind_dn").as_string().into_option(),
            password: node.get("password").as_string_or("").into_value(),
            min_pool_size: node.get("min_pool_size").as_i32().into_option(),
            max_pool_size: node.get("max_pool_size").as_i32().into_option(),
        })
    }
}

impl AuthDomain {
    fn to_doc(&self) -> DocNode {
        let builder = DocBuilder::new();
        let builder = match &self.backend {
            AuthBackend::Internal => builder.put("type", INTERNAL_TYPE),
            AuthBackend::Ldap(_) => builder.put("type", LDAP_TYPE),
        };
        let builder = builder
            .put_opt("id", self.id.clone())
            .put("enabled", self.enabled)
            .put("order", self.order);
        let builder = match &self.backend {
            AuthBackend::Internal => builder,
            AuthBackend::Ldap(ldap) => {
                let inner = DocBuilder::new()
                    .put("idp", ldap.idp.to_doc())
                    .put_opt("user_search", ldap.user_search.as_ref().map(LdapSearch::to_doc))
                    .put_opt("group_search", ldap.group_search.as_ref().map(LdapSearch::to_doc));
                builder.put("ldap", inner.build())
            }
        };
        builder.build()
    }

    fn parse(node: &TraceableDocNode<'_>) -> Option<Self> {
        let kind = node.get("type").required().as_string()?;
        let backend = match kind.get().as_str() {
            INTERNAL_TYPE => AuthBackend::Internal,
            LDAP_TYPE => {
                let idp = node.get("ldap.idp").required().as_parsed(IdentityProvider::parse);
                let user_search = node.get("ldap.user_search").as_parsed(LdapSearch::parse);
                let group_search = node.get("ldap.group_search").as_parsed(LdapSearch::parse);
                AuthBackend::Ldap(LdapDomain {
                    idp: idp?.into_value(),
                    user_search: user_search.into_option(),
                    group_search: group_search.into_option(),
                })
            }
            other => {
                node.add_error_at(
                    "type",
                    ValidationErrorKind::InvalidValue {
                        expected: format!("Any of: [{INTERNAL_TYPE}, {LDAP_TYPE}]"),
                        actual: other.to_string(),
                    },
                );
                return None;
            }
        };
        Some(Self {
            id: node.get("id").as_string().into_option(),
            enabled: node.get("enabled").as_bool_or(true).into_value(),
            order: node.get("order").as_i32_or(0).into_value(),
            backend,
        })
    }
}

impl NamedConfig for SgAuthc {
    const FILE_NAME: &'static str = "sg_authc.yml";

    fn to_doc(&self) -> DocNode {
        let domains = self.auth_domains.iter().map(AuthDomain::to_doc).collect();
        DocBuilder::new().put("auth_domains", DocNode::List(domains)).build()
    }

    fn parse(node: &TraceableDocNode<'_>) -> Option<Self> {
        let domains = node.get("auth_domains").as_list_of(AuthDomain::parse).into_option();
        Some(Self {
            auth_domains: domains
                .unwrap_or_default()
                .into_iter()
                .map(|domain| domain.into_value())
                .collect(),
        })
    }
}
