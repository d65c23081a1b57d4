//! Source side: the X-Pack documents this tool reads.

pub mod elasticsearch;
pub mod kibana;
pub mod role_mappings;
pub mod roles;
pub mod tls;
pub mod users;

pub use elasticsearch::{
    ActiveDirectoryRealm, GroupSearch, LdapRealm, OidcRealm, Realm, RealmSettings, SamlRealm,
    SearchScope, UserSearch, XPackElasticsearchConfig,
};
pub use kibana::{KibanaConfig, KibanaProvider, ProviderSettings};
pub use role_mappings::{FieldRule, FieldTarget, MappedRoles, RoleMapping, RoleMappings, Rule};
pub use roles::{IndexPrivileges, Role, Roles};
pub use tls::{ClientAuthentication, SslSettings, StoreSettings, TlsConfig, VerificationMode};
pub use users::{User, Users};
