use config_trace::{
    parse_expanded_document, ConfigEnum, ConfigValidationError, DocNode, ParseOptions, Traceable,
    TraceableDocNode,
};

use crate::searchguard::{strings, NamedConfig};

const TRANSPORT_PREFIX: &str = "searchguard.ssl.transport";
const HTTP_PREFIX: &str = "searchguard.ssl.http";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientAuthMode {
    None,
    Optional,
    Require,
}

impl ConfigEnum for ClientAuthMode {
    fn variants() -> &'static [(&'static str, Self)] {
        &[
            ("NONE", ClientAuthMode::None),
            ("OPTIONAL", ClientAuthMode::Optional),
            ("REQUIRE", ClientAuthMode::Require),
        ]
    }
}

/// Settings of one TLS layer, written under `searchguard.ssl.<layer>.`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SgSslLayer {
    pub enabled: Option<bool>,
    pub pemcert_filepath: Option<String>,
    pub pemkey_filepath: Option<String>,
    pub pemtrustedcas_filepath: Option<String>,
    pub keystore_type: Option<String>,
    pub keystore_filepath: Option<String>,
    /// Placeholder only; store passwords are entered by an operator.
    pub keystore_password: Option<String>,
    pub truststore_type: Option<String>,
    pub truststore_filepath: Option<String>,
    pub truststore_password: Option<String>,
    pub enforce_hostname_verification: Option<bool>,
    pub clientauth_mode: Option<ClientAuthMode>,
    pub enabled_protocols: Vec<String>,
    pub enabled_ciphers: Vec<String>,
}

impl SgSslLayer {
    fn entries(&self) -> Vec<(&'static str, DocNode)> {
        let mut entries = Vec::new();
        let mut text = |key: &'static str, value: &Option<String>| {
            if let Some(value) = value {
                entries.push((key, DocNode::from(value.as_str())));
            }
        };
        text("pemcert_filepath", &self.pemcert_filepath);
        text("pemkey_filepath", &self.pemkey_filepath);
        text("pemtrustedcas_filepath", &self.pemtrustedcas_filepath);
        text("keystore_type", &self.keystore_type);
        text("keystore_filepath", &self.keystore_filepath);
        text("keystore_password", &self.keystore_password);
        text("truststore_type", &self.truststore_type);
        text("truststore_filepath", &self.truststore_filepath);
        text("truststore_password", &self.truststore_password);

        if let Some(enabled) = self.enabled {
            entries.insert(0, ("enabled", DocNode::Bool(enabled)));
        }
        if let Some(enforce) = self.enforce_hostname_verification {
            entries.push(("enforce_hostname_verification", DocNode::Bool(enforce)));
        }
        if let Some(mode) = self.clientauth_mode {
            entries.push(("clientauth_mode", DocNode::from(mode.config_name())));
        }
        if !self.enabled_protocols.is_empty() {
            entries.push(("enabled_protocols", DocNode::from(self.enabled_protocols.clone())));
        }
        if !self.enabled_ciphers.is_empty() {
            entries.push(("enabled_ciphers", DocNode::from(self.enabled_ciphers.clone())));
        }
        entries
    }

    fn parse(node: &TraceableDocNode<'_>) -> Option<Self> {
        let text = |key: &str| node.get(key).as_string().into_option();
        Some(Self {
            enabled: node.get("enabled").as_bool().into_option(),
            pemcert_filepath: text("pemcert_filepath"),
            pemkey_filepath: text("pemkey_filepath"),
            pemtrustedcas_filepath: text("pemtrustedcas_filepath"),
            keystore_type: text("keystore_type"),
            keystore_filepath: text("keystore_filepath"),
            keystore_password: text("keystore_password"),
            truststore_type: text("truststore_type"),
            truststore_filepath: text("truststore_filepath"),
            truststore_password: text("truststore_password"),
            enforce_hostname_verification: node
                .get("enforce_hostname_verification")
                .as_bool()
                .into_option(),
            clientauth_mode: node.get("clientauth_mode").as_enum().into_option(),
            enabled_protocols: strings(node, "enabled_protocols"),
            enabled_ciphers: strings(node, "enabled_ciphers"),
        })
    }
}

/// The `searchguard.ssl.*` block to be added to the target `elasticsearch.yml`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SgTlsSettings {
    pub transport: Option<SgSslLayer>,
    pub http: Option<SgSslLayer>,
}

impl NamedConfig for SgTlsSettings {
    const FILE_NAME: &'static str = "elasticsearch.yml";

    fn to_doc(&self) -> DocNode {
        let mut doc = DocNode::map();
        for (prefix, layer) in [(TRANSPORT_PREFIX, &self.transport), (HTTP_PREFIX, &self.http)] {
            let Some(layer) = layer else { continue };
            for (key, value) in layer.entries() {
                doc.insert(format!("{prefix}.{key}"), value);
            }
        }
        doc
    }

    fn parse(node: &TraceableDocNode<'_>) -> Option<Self> {
        Some(Self {
            transport: node.get(TRANSPORT_PREFIX).as_parsed(SgSslLayer::parse).into_option(),
            http: node.get(HTTP_PREFIX).as_parsed(SgSslLayer::parse).into_option(),
        })
    }

    // Written with flat keys, so they are expanded before parsing.
    fn from_doc(doc: &DocNode) -> Result<Self, ConfigValidationError> {
        parse_expanded_document(doc, Some(Self::FILE_NAME), ParseOptions::default(), Self::parse)
            .map(Traceable::into_value)
    }
}

#[cfg(test)]
mod tests {
    use super::{ClientAuthMode, SgSslLayer, SgTlsSettings};
    use crate::searchguard::NamedConfig;
    use config_trace::{parse_yaml, write_yaml, DocNode};
    use pretty_assertions::assert_eq;

    #[test]
    fn layers_render_as_flat_keys_and_read_back() {
        let settings = SgTlsSettings {
            transport: Some(SgSslLayer {
                enabled: Some(true),
                keystore_filepath: Some("node.p12".to_string()),
                keystore_password: Some(String::new()),
                enforce_hostname_verification: Some(false),
                ..SgSslLayer::default()
            }),
            http: Some(SgSslLayer {
                pemtrustedcas_filepath: Some("ca.crt".to_string()),
                clientauth_mode: Some(ClientAuthMode::Optional),
                enabled_protocols: vec!["TLSv1.3".to_string()],
                ..SgSslLayer::default()
            }),
        };
        let doc = settings.to_doc();
        assert_eq!(
            doc.get_child("searchguard.ssl.transport.enabled"),
            Some(&DocNode::Bool(true))
        );
        assert_eq!(
            doc.get_child("searchguard.ssl.http.clientauth_mode"),
            Some(&DocNode::from("OPTIONAL"))
        );

        let yaml = write_yaml(&doc).expect("yaml");
        let reparsed = parse_yaml(yaml.as_bytes()).expect("yaml");
        let reparsed = SgTlsSettings::from_doc(&reparsed).expect("parse");
        assert_eq!(reparsed, settings);
    }

    #[test]
    fn absent_layers_stay_absent() {
        let reparsed = SgTlsSettings::from_doc(&DocNode::map()).expect("parse");
        assert_eq!(reparsed, SgTlsSettings::default());
    }
}
