use config_trace::{DocNode, TraceableDocNode, ValidationErrorKind};

use crate::searchguard::{DocBuilder, NamedConfig};

/// Config id every Kibana instance reads when none is selected.
const DEFAULT_CONFIG: &str = "default";

/// `sg_frontend_authc.yml`
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SgFrontendAuthc {
    pub auth_domains: Vec<FrontendAuthDomain>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FrontendAuthDomain {
    pub id: Option<String>,
    pub label: Option<String>,
    /// Skip the login selector and go straight to this domain.
    pub auto_select: bool,
    pub backend: FrontendBackend,
}

impl FrontendAuthDomain {
    pub fn basic() -> Self {
        Self {
            id: None,
            label: None,
            auto_select: false,
            backend: FrontendBackend::Basic,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FrontendBackend {
    /// Username and password form, checked against `sg_authc.yml`.
    Basic,
    Saml(SamlDomain),
    Oidc(OidcDomain),
}

impl FrontendBackend {
    fn type_name(&self) -> &'static str {
        match self {
            FrontendBackend::Basic => "basic",
            FrontendBackend::Saml(_) => "saml",
            FrontendBackend::Oidc(_) => "oidc",
        }
    }
}

/// Where the user name and roles of a logged in user come from.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct UserMapping {
    pub user_name_from: Option<String>,
    pub roles_from: Option<String>,
}

impl UserMapping {
    fn to_doc(&self) -> Option<DocNode> {
        if self.user_name_from.is_none() && self.roles_from.is_none() {
            return None;
        }
        let user_name = self
            .user_name_from
            .as_deref()
            .map(|from| DocBuilder::new().put("from", from).build());
        let roles = self
            .roles_from
            .as_deref()
            .map(|from| DocBuilder::new().put("from_comma_separated_string", from).build());
        Some(
            DocBuilder::new()
                .put_opt("user_name", user_name)
                .put_opt("roles", roles)
                .build(),
        )
    }

    fn parse(node: &TraceableDocNode<'_>) -> Self {
        Self {
            user_name_from: node.get("user_mapping.user_name.from").as_string().into_option(),
            roles_from: node
                .get("user_mapping.roles.from_comma_separated_string")
                .as_string()
                .into_option(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SamlDomain {
    pub idp_metadata_url: String,
    pub idp_entity_id: String,
    pub sp_entity_id: String,
    pub sp_acs: Option<String>,
    pub user_mapping: UserMapping,
}

impl SamlDomain {
    fn to_doc(&self) -> DocNode {
        let idp = DocBuilder::new()
            .put("metadata_url", self.idp_metadata_url.as_str())
            .put("entity_id", self.idp_entity_id.as_str())
            .build();
        let sp = DocBuilder::new()
            .put("entity_id", self.sp_entity_id.as_str())
            .put_opt("acs", self.sp_acs.clone())
            .build();
        DocBuilder::new().put("idp", idp).put("sp", sp).build()
    }

    fn parse(node: &TraceableDocNode<'_>) -> Option<Self> {
        let metadata_url = node.get("saml.idp.metadata_url").required().as_string();
        let idp_entity_id = node.get("saml.idp.entity_id").required().as_string();
        let sp_entity_id = node.get("saml.sp.entity_id").required().as_string();
        Some(Self {
            idp_metadata_url: metadata_url?.into_value(),
            idp_entity_id: idp_entity_id?.into_value(),
            sp_entity_id: sp_entity_id?.into_value(),
            sp_acs: node.get("saml.sp.acs").as_string().into_option(),
            user_mapping: UserMapping::parse(node),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OidcDomain {
    pub client_id: String,
    /// Always written empty; the secret is entered by an operator.
    pub client_secret: String,
    pub openid_configuration_url: String,
    pub user_mapping: UserMapping,
}

impl OidcDomain {
    fn to_doc(&self) -> DocNode {
        let idp = DocBuilder::new()
            .put("openid_configuration_url", self.openid_configuration_url.as_str())
            .build();
        DocBuilder::new()
            .put("client_id", self.client_id.as_str())
            .put("client_secret", self.client_secret.as_str())
            .put("idp", idp)
            .build()
    }

    fn parse(node: &TraceableDocNode<'_>) -> Option<Self> {
        let client_id = node.get("oidc.client_id").required().as_string();
        let url = node
            .get("oidc.idp.openid_configuration_url")
            .required()
            .as_string();
        Some(Self {
            client_id: client_id?.into_value(),
            client_secret: node.get("oidc.client_secret").as_string_or("").into_value(),
            openid_configuration_url: url?.into_value(),
            user_mapping: UserMapping::parse(node),
        })
    }
}

impl FrontendAuthDomain {
    fn to_doc(&self) -> DocNode {
        let builder = DocBuilder::new()
            .put("type", self.backend.type_name())
            .put_opt("id", self.id.clone())
            .put_opt("label", self.label.clone());
        let builder = if self.auto_select {
            builder.put("auto_select", true)
        } else {
            builder
        };
        let (builder, user_mapping) = match &self.backend {
            FrontendBackend::Basic => (builder, None),
            FrontendBackend::Saml(saml) => {
                (builder.put("saml", saml.to_doc()), Some(&saml.user_mapping))
            }
            FrontendBackend::Oidc(oidc) => {
                (builder.put("oidc", oidc.to_doc()), Some(&oidc.user_mapping))
            }
        };
        builder
            .put_opt("user_mapping", user_mapping.and_then(UserMapping::to_doc))
            .build()
    }

    fn parse(node: &TraceableDocNode<'_>) -> Option<Self> {
        let kind = node.get("type").required().as_string()?;
        let backend = match kind.get().as_str() {
            "basic" => FrontendBackend::Basic,
            "saml" => FrontendBackend::Saml(SamlDomain::parse(node)?),
            "oidc" => FrontendBackend::Oidc(OidcDomain::parse(node)?),
            other => {
                node.add_error_at(
                    "type",
                    ValidationErrorKind::InvalidValue {
                        expected: "Any of: [basic, saml, oidc]".to_string(),
                        actual: other.to_string(),
                    },
                );
                return None;
            }
        };
        Some(Self {
            id: node.get("id").as_string().into_option(),
            label: node.get("label").as_string().into_option(),
            auto_select: node.get("auto_select").as_bool_or(false).into_value(),
            backend,
        })
    }
}

impl NamedConfig for SgFrontendAuthc {
    const FILE_NAME: &'static str = "sg_frontend_authc.yml";

    fn to_doc(&self) -> DocNode {
        let domains = self.auth_domains.iter().map(FrontendAuthDomain::to_doc).collect();
        let config = DocBuilder::new()
            .put("auth_domains", DocNode::List(domains))
            .build();
        DocBuilder::new().put(DEFAULT_CONFIG, config).build()
    }

    fn parse(node: &TraceableDocNode<'_>) -> Option<Self> {
        let domains = node
            .get(DEFAULT_CONFIG)
            .required()
            .as_parsed(|config| {
                let domains = config.get("auth_domains").as_list_of(FrontendAuthDomain::parse);
                Some(domains.into_option().unwrap_or_default())
            })?
            .into_value();
        Some(Self {
            auth_domains: domains
                .into_iter()
                .map(|domain| domain.into_value())
                .collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{
        FrontendAuthDomain, FrontendBackend, OidcDomain, SamlDomain, SgFrontendAuthc, UserMapping,
    };
    use crate::searchguard::NamedConfig;
    use config_trace::{parse_yaml, write_yaml};
    use pretty_assertions::assert_eq;

    fn saml_domain() -> FrontendAuthDomain {
        FrontendAuthDomain {
            id: Some("saml1".to_string()),
            label: Some("Log in with SSO".to_string()),
            auto_select: false,
            backend: FrontendBackend::Saml(SamlDomain {
                idp_metadata_url: "https://idp.example.com/metadata.xml".to_string(),
                idp_entity_id: "https://idp.example.com".to_string(),
                sp_entity_id: "https://kibana.example.com".to_string(),
                sp_acs: Some("https://kibana.example.com/searchguard/saml/acs".to_string()),
                user_mapping: UserMapping {
                    user_name_from: Some("saml_response.name_id".to_string()),
                    roles_from: Some("saml_response.attributes.groups".to_string()),
                },
            }),
        }
    }

    #[test]
    fn domains_render_under_the_default_config() {
        let config = SgFrontendAuthc {
            auth_domains: vec![FrontendAuthDomain::basic(), saml_domain()],
        };
        let doc = config.to_doc();
        let domains = doc
            .get_path(&["default", "auth_domains"])
            .and_then(|domains| domains.as_list())
            .expect("auth domains");
        assert_eq!(domains.len(), 2);
        assert_eq!(domains[0].get_child("type").and_then(|t| t.as_str()), Some("basic"));
        assert_eq!(
            domains[1]
                .get_path(&["saml", "idp", "metadata_url"])
                .and_then(|url| url.as_str()),
            Some("https://idp.example.com/metadata.xml")
        );
        assert_eq!(
            domains[1]
                .get_path(&["user_mapping", "roles", "from_comma_separated_string"])
                .and_then(|from| from.as_str()),
            Some("saml_response.attributes.groups")
        );

        let yaml = write_yaml(&doc).expect("yaml");
        assert!(!yaml.contains("auto_select"));
        let reparsed = parse_yaml(yaml.as_bytes()).expect("reparse");
        let reparsed = SgFrontendAuthc::from_doc(&reparsed).expect("parse");
        assert_eq!(reparsed, config);
    }

    #[test]
    fn oidc_domain_reads_back_with_an_empty_secret() {
        let doc = parse_yaml(
            b"default:\n  auth_domains:\n  - type: oidc\n    auto_select: true\n    oidc:\n      \
              client_id: kibana\n      idp:\n        \
              openid_configuration_url: https://op.example.com/.well-known/openid-configuration\n",
        )
        .expect("yaml");
        let config = SgFrontendAuthc::from_doc(&doc).expect("parse");
        assert_eq!(
            config.auth_domains,
            vec![FrontendAuthDomain {
                id: None,
                label: None,
                auto_select: true,
                backend: FrontendBackend::Oidc(OidcDomain {
                    client_id: "kibana".to_string(),
                    client_secret: String::new(),
                    openid_configuration_url:
                        "https://op.example.com/.well-known/openid-configuration".to_string(),
                    user_mapping: UserMapping::default(),
                }),
            }]
        );
    }

    #[test]
    fn unknown_domain_type_is_rejected() {
        let doc = parse_yaml(b"default:\n  auth_domains:\n  - type: kerberos\n").expect("yaml");
        let err = SgFrontendAuthc::from_doc(&doc).unwrap_err();
        assert_eq!(err.errors[0].path, "default.auth_domains.0.type");
    }
}
