use config_trace::Traceable;

use crate::xpack::{
    KibanaConfig, Realm, RoleMappings, Roles, TlsConfig, Users, XPackElasticsearchConfig,
};

/// The parsed source fragments of one run. Every fragment is optional; a
/// migrator whose fragment is absent has nothing to do.
#[derive(Debug, Clone, Default)]
pub struct MigrationContext {
    pub security_enabled: Option<Traceable<bool>>,
    pub realms: Option<Traceable<Vec<Traceable<Realm>>>>,
    pub tls: Option<TlsConfig>,
    pub users: Option<Traceable<Users>>,
    pub roles: Option<Traceable<Roles>>,
    pub role_mappings: Option<Traceable<RoleMappings>>,
    pub kibana: Option<Traceable<KibanaConfig>>,
}

impl MigrationContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Realms, TLS and the security switch of one `elasticsearch.yml`.
    pub fn from_elasticsearch(config: Traceable<XPackElasticsearchConfig>) -> Self {
        Self::new().with_elasticsearch(config)
    }

    pub fn with_elasticsearch(mut self, config: Traceable<XPackElasticsearchConfig>) -> Self {
        let config = config.into_value();
        self.security_enabled = Some(config.security_enabled);
        self.realms = Some(config.realms);
        self.tls = config.tls.is_configured().then_some(config.tls);
        self
    }

    pub fn with_users(mut self, users: Traceable<Users>) -> Self {
        self.users = Some(users);
        self
    }

    pub fn with_roles(mut self, roles: Traceable<Roles>) -> Self {
        self.roles = Some(roles);
        self
    }

    pub fn with_role_mappings(mut self, role_mappings: Traceable<RoleMappings>) -> Self {
        self.role_mappings = Some(role_mappings);
        self
    }

    pub fn with_kibana(mut self, kibana: Traceable<KibanaConfig>) -> Self {
        self.kibana = Some(kibana);
        self
    }
}
