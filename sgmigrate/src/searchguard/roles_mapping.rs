use config_trace::{DocNode, TraceableDocNode};
use indexmap::IndexMap;

use crate::searchguard::{strings, DocBuilder, NamedConfig};

/// Who receives one Search Guard role.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RoleMappingEntry {
    pub users: Vec<String>,
    pub backend_roles: Vec<String>,
    pub hosts: Vec<String>,
    pub ips: Vec<String>,
}

impl RoleMappingEntry {
    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
            && self.backend_roles.is_empty()
            && self.hosts.is_empty()
            && self.ips.is_empty()
    }

    /// Union with `other`, keeping first-seen order.
    pub fn absorb(&mut self, other: RoleMappingEntry) {
        fn extend(target: &mut Vec<String>, values: Vec<String>) {
            for value in values {
                if !target.contains(&value) {
                    target.push(value);
                }
            }
        }
        extend(&mut self.users, other.users);
        extend(&mut self.backend_roles, other.backend_roles);
        extend(&mut self.hosts, other.hosts);
        extend(&mut self.ips, other.ips);
    }

    fn to_doc(&self) -> DocNode {
        DocBuilder::new()
            .put_list("users", &self.users)
            .put_list("backend_roles", &self.backend_roles)
            .put_list("hosts", &self.hosts)
            .put_list("ips", &self.ips)
            .build()
    }

    fn parse(node: &TraceableDocNode<'_>) -> Option<Self> {
        Some(Self {
            users: strings(node, "users"),
            backend_roles: strings(node, "backend_roles"),
            hosts: strings(node, "hosts"),
            ips: strings(node, "ips"),
        })
    }
}

/// `sg_roles_mapping.yml`, keyed by Search Guard role name.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SgRolesMapping {
    pub mappings: IndexMap<String, RoleMappingEntry>,
}

impl NamedConfig for SgRolesMapping {
    const FILE_NAME: &'static str = "sg_roles_mapping.yml";

    fn to_doc(&self) -> DocNode {
        DocNode::Map(
            self.mappings
                .iter()
                .map(|(role, entry)| (role.clone(), entry.to_doc()))
                .collect(),
        )
    }

    fn parse(node: &TraceableDocNode<'_>) -> Option<Self> {
        if node.doc().is_null() {
            return Some(Self::default());
        }
        let mappings = node
            .as_attribute()
            .as_map_of(RoleMappingEntry::parse)
            .into_option()?;
        Some(Self {
            mappings: mappings
                .into_iter()
                .map(|(role, entry)| (role, entry.into_value()))
                .collect(),
        })
    }
}
