use config_trace::{ConfigEnum, OptTraceable, Traceable, TraceableDocNode};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerificationMode {
    Full,
    Certificate,
    None,
}

impl ConfigEnum for VerificationMode {
    fn variants() -> &'static [(&'static str, Self)] {
        &[
            ("full", VerificationMode::Full),
            ("certificate", VerificationMode::Certificate),
            ("none", VerificationMode::None),
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientAuthentication {
    None,
    Optional,
    Required,
}

impl ConfigEnum for ClientAuthentication {
    fn variants() -> &'static [(&'static str, Self)] {
        &[
            ("none", ClientAuthentication::None),
            ("optional", ClientAuthentication::Optional),
            ("required", ClientAuthentication::Required),
        ]
    }
}

/// Keystore or truststore reference.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreSettings {
    pub path: OptTraceable<String>,
    pub store_type: OptTraceable<String>,
    pub password: OptTraceable<String>,
    pub secure_password: OptTraceable<String>,
}

impl StoreSettings {
    fn parse(node: &TraceableDocNode<'_>) -> Option<Self> {
        Some(Self {
            path: node.get("path").as_string(),
            store_type: node.get("type").as_string(),
            password: node.get("password").secret().as_string(),
            secure_password: node.get("secure_password").secret().as_string(),
        })
    }

    /// The first configured password setting, plain or secure.
    pub fn any_password(&self) -> Option<&OptTraceable<String>> {
        [&self.password, &self.secure_password]
            .into_iter()
            .find(|password| password.is_present())
    }
}

/// `xpack.security.{transport,http}.ssl.*`
#[derive(Debug, Clone, PartialEq)]
pub struct SslSettings {
    pub enabled: OptTraceable<bool>,
    pub key: OptTraceable<String>,
    pub certificate: OptTraceable<String>,
    pub certificate_authorities: OptTraceable<Vec<Traceable<String>>>,
    pub keystore: OptTraceable<StoreSettings>,
    pub truststore: OptTraceable<StoreSettings>,
    pub verification_mode: OptTraceable<VerificationMode>,
    pub client_authentication: OptTraceable<ClientAuthentication>,
    pub supported_protocols: OptTraceable<Vec<Traceable<String>>>,
    pub cipher_suites: OptTraceable<Vec<Traceable<String>>>,
}

impl SslSettings {
    pub fn parse(node: &TraceableDocNode<'_>) -> Option<Self> {
        Some(Self {
            enabled: node.get("enabled").as_bool(),
            key: node.get("key").as_string(),
            certificate: node.get("certificate").as_string(),
            certificate_authorities: node.get("certificate_authorities").as_list_of_strings(),
            keystore: node.get("keystore").as_parsed(StoreSettings::parse),
            truststore: node.get("truststore").as_parsed(StoreSettings::parse),
            verification_mode: node.get("verification_mode").as_enum(),
            client_authentication: node.get("client_authentication").as_enum(),
            supported_protocols: node.get("supported_protocols").as_list_of_strings(),
            cipher_suites: node.get("cipher_suites").as_list_of_strings(),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TlsConfig {
    pub transport: OptTraceable<SslSettings>,
    pub http: OptTraceable<SslSettings>,
}

impl TlsConfig {
    pub fn parse(node: &TraceableDocNode<'_>) -> Self {
        Self {
            transport: node
                .get("xpack.security.transport.ssl")
                .as_parsed(SslSettings::parse),
            http: node.get("xpack.security.http.ssl").as_parsed(SslSettings::parse),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.transport.is_present() || self.http.is_present()
    }
}
