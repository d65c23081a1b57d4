//! Target side: the Search Guard configuration files this tool writes.
//!
//! Target values are plain data. Each file type renders itself to a
//! [`DocNode`] and can be read back with the same traceable parser used for
//! sources, so written output can be checked by re-parsing it.

pub mod authc;
pub mod frontend_authc;
pub mod internal_users;
pub mod roles;
pub mod roles_mapping;
pub mod tls;

use config_trace::{
    parse_document, ConfigValidationError, DocNode, ParseOptions, Traceable, TraceableDocNode,
};

pub use authc::{
    AuthBackend, AuthDomain, IdentityProvider, LdapDomain, LdapFilter, LdapScope, LdapSearch,
    SgAuthc,
};
pub use frontend_authc::{
    FrontendAuthDomain, FrontendBackend, OidcDomain, SamlDomain, SgFrontendAuthc, UserMapping,
};
pub use internal_users::{InternalUser, SgInternalUsers};
pub use roles::{IndexPermission, SgRole, SgRoles};
pub use roles_mapping::{RoleMappingEntry, SgRolesMapping};
pub use tls::{ClientAuthMode, SgSslLayer, SgTlsSettings};

/// A Search Guard configuration file.
pub trait NamedConfig: Sized {
    const FILE_NAME: &'static str;

    fn to_doc(&self) -> DocNode;

    fn parse(node: &TraceableDocNode<'_>) -> Option<Self>;

    fn from_doc(doc: &DocNode) -> Result<Self, ConfigValidationError> {
        parse_document(doc, Some(Self::FILE_NAME), ParseOptions::default(), Self::parse)
            .map(Traceable::into_value)
    }
}

/// One migration artifact.
#[derive(Debug, Clone, PartialEq)]
pub enum SgConfig {
    Authc(SgAuthc),
    FrontendAuthc(SgFrontendAuthc),
    InternalUsers(SgInternalUsers),
    Roles(SgRoles),
    RolesMapping(SgRolesMapping),
    Tls(SgTlsSettings),
}

impl SgConfig {
    pub fn file_name(&self) -> &'static str {
        match self {
            SgConfig::Authc(_) => SgAuthc::FILE_NAME,
            SgConfig::FrontendAuthc(_) => SgFrontendAuthc::FILE_NAME,
            SgConfig::InternalUsers(_) => SgInternalUsers::FILE_NAME,
            SgConfig::Roles(_) => SgRoles::FILE_NAME,
            SgConfig::RolesMapping(_) => SgRolesMapping::FILE_NAME,
            SgConfig::Tls(_) => SgTlsSettings::FILE_NAME,
        }
    }

    pub fn to_doc(&self) -> DocNode {
        match self {
            SgConfig::Authc(config) => config.to_doc(),
            SgConfig::FrontendAuthc(config) => config.to_doc(),
            SgConfig::InternalUsers(config) => config.to_doc(),
            SgConfig::Roles(config) => config.to_doc(),
            SgConfig::RolesMapping(config) => config.to_doc(),
            SgConfig::Tls(config) => config.to_doc(),
        }
    }

    /// Read back a written artifact; `None` for a file name this tool never writes.
    pub fn parse(
        file_name: &str,
        doc: &DocNode,
    ) -> Option<Result<Self, ConfigValidationError>> {
        let parsed = match file_name {
            SgAuthc::FILE_NAME => SgAuthc::from_doc(doc).map(SgConfig::Authc),
            SgFrontendAuthc::FILE_NAME => {
                SgFrontendAuthc::from_doc(doc).map(SgConfig::FrontendAuthc)
            }
            SgInternalUsers::FILE_NAME => {
                SgInternalUsers::from_doc(doc).map(SgConfig::InternalUsers)
            }
            SgRoles::FILE_NAME => SgRoles::from_doc(doc).map(SgConfig::Roles),
            SgRolesMapping::FILE_NAME => {
                SgRolesMapping::from_doc(doc).map(SgConfig::RolesMapping)
            }
            SgTlsSettings::FILE_NAME => SgTlsSettings::from_doc(doc).map(SgConfig::Tls),
            _ => return None,
        };
        Some(parsed)
    }
}

/// Ordered mapping builder that leaves out absent and empty values.
#[derive(Debug, Default)]
pub(crate) struct DocBuilder {
    node: DocNode,
}

impl DocBuilder {
    pub(crate) fn new() -> Self {
        Self {
            node: DocNode::map(),
        }
    }

    pub(crate) fn put(mut self, key: &str, value: impl Into<DocNode>) -> Self {
        self.node.insert(key, value.into());
        self
    }

    pub(crate) fn put_opt<V: Into<DocNode>>(self, key: &str, value: Option<V>) -> Self {
        match value {
            Some(value) => self.put(key, value),
            None => self,
        }
    }

    pub(crate) fn put_list(self, key: &str, values: &[String]) -> Self {
        if values.is_empty() {
            self
        } else {
            self.put(key, values.to_vec())
        }
    }

    pub(crate) fn build(self) -> DocNode {
        self.node
    }
}

pub(crate) fn strings(node: &TraceableDocNode<'_>, key: &str) -> Vec<String> {
    node.get(key)
        .as_list_of_strings()
        .into_option()
        .unwrap_or_default()
        .into_iter()
        .map(Traceable::into_value)
        .collect()
}
