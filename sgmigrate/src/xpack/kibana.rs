use std::collections::HashMap;

use config_trace::{
    parse_expanded_document, ConfigValidationError, DocNode, OptTraceable, ParseOptions,
    Traceable, TraceableDocNode, ValidationErrorKind,
};

const PROVIDERS: &str = "xpack.security.authc.providers";

/// Login settings of a `kibana.yml`.
#[derive(Debug, Clone, PartialEq)]
pub struct KibanaConfig {
    pub security_enabled: Traceable<bool>,
    /// Providers sorted by their `order`.
    pub providers: Traceable<Vec<Traceable<KibanaProvider>>>,
    /// Defaults to on when more than one provider is configured.
    pub selector_enabled: Traceable<bool>,
}

impl KibanaConfig {
    pub const FILE_NAME: &'static str = "kibana.yml";

    pub fn parse_document(
        doc: &DocNode,
        options: ParseOptions,
    ) -> Result<Traceable<Self>, ConfigValidationError> {
        parse_expanded_document(doc, Some(Self::FILE_NAME), options, Self::parse)
    }

    pub fn parse(node: &TraceableDocNode<'_>) -> Option<Self> {
        let security_enabled = node.get("xpack.security.enabled").as_bool_or(true);
        let providers_attr = node.get(PROVIDERS);
        let providers_source = providers_attr.source();
        let by_type = providers_attr
            .as_map_of(|type_node| {
                let kind = type_node.key().unwrap_or_default().to_string();
                type_node
                    .as_attribute()
                    .as_map_of(|provider_node| KibanaProvider::parse(&kind, provider_node))
                    .into_option()
            })
            .into_option()
            .unwrap_or_default();

        let mut providers: Vec<Traceable<KibanaProvider>> = by_type
            .into_values()
            .flat_map(|named| named.into_value().into_values())
            .collect();
        providers.sort_by_key(|provider| *provider.get().order.get());
        check_unique_order(node, &providers);

        let selector_enabled = node
            .get("xpack.security.authc.selector.enabled")
            .as_bool_or(providers.len() > 1);

        Some(Self {
            security_enabled,
            providers: Traceable::of(providers_source, providers),
            selector_enabled,
        })
    }
}

fn check_unique_order(node: &TraceableDocNode<'_>, providers: &[Traceable<KibanaProvider>]) {
    let mut seen: HashMap<i32, &str> = HashMap::new();
    for provider in providers {
        let provider = provider.get();
        let order = *provider.order.get();
        if let Some(first) = seen.insert(order, &provider.name) {
            node.add_error_at(
                &format!("{PROVIDERS}.{}.{}.order", provider.kind, provider.name),
                ValidationErrorKind::Custom {
                    message: format!("Provider order {order} is already used by provider {first}"),
                },
            );
        }
    }
}

/// One `xpack.security.authc.providers.<kind>.<name>` entry.
#[derive(Debug, Clone, PartialEq)]
pub struct KibanaProvider {
    pub kind: String,
    pub name: String,
    pub order: Traceable<i32>,
    pub enabled: Traceable<bool>,
    pub description: OptTraceable<String>,
    pub settings: ProviderSettings,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ProviderSettings {
    Basic,
    Token,
    /// Names the Elasticsearch SAML realm that backs the login.
    Saml { realm: Traceable<String> },
    Oidc { realm: Traceable<String> },
    /// anonymous, pki, kerberos and anything else.
    Other,
}

impl KibanaProvider {
    fn parse(kind: &str, node: &TraceableDocNode<'_>) -> Option<Self> {
        let name = node.key().unwrap_or_default().to_string();
        let order = node.get("order").required().as_i32();
        let enabled = node.get("enabled").as_bool_or(true);
        let description = node.get("description").as_string();
        let settings = match kind {
            "basic" => Some(ProviderSettings::Basic),
            "token" => Some(ProviderSettings::Token),
            "saml" => {
                let realm = node.get("realm").required().as_string();
                realm.map(|realm| ProviderSettings::Saml { realm })
            }
            "oidc" => {
                let realm = node.get("realm").required().as_string();
                realm.map(|realm| ProviderSettings::Oidc { realm })
            }
            _ => Some(ProviderSettings::Other),
        };
        Some(Self {
            kind: kind.to_string(),
            name,
            order: order?,
            enabled,
            description,
            settings: settings?,
        })
    }
}
