use config_trace::{DocNode, TraceableDocNode};
use indexmap::IndexMap;

use crate::searchguard::{strings, DocBuilder, NamedConfig};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct IndexPermission {
    pub index_patterns: Vec<String>,
    pub allowed_actions: Vec<String>,
    /// Field level security; `~field` excludes a field.
    pub fls: Vec<String>,
    /// Document level security query as JSON text.
    pub dls: Option<String>,
}

impl IndexPermission {
    fn to_doc(&self) -> DocNode {
        DocBuilder::new()
            .put("index_patterns", self.index_patterns.clone())
            .put("allowed_actions", self.allowed_actions.clone())
            .put_list("fls", &self.fls)
            .put_opt("dls", self.dls.clone())
            .build()
    }

    fn parse(node: &TraceableDocNode<'_>) -> Option<Self> {
        Some(Self {
            index_patterns: strings(node, "index_patterns"),
            allowed_actions: strings(node, "allowed_actions"),
            fls: strings(node, "fls"),
            dls: node.get("dls").as_string().into_option(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SgRole {
    pub description: Option<String>,
    pub cluster_permissions: Vec<String>,
    pub index_permissions: Vec<IndexPermission>,
}

impl SgRole {
    fn to_doc(&self) -> DocNode {
        let index = self.index_permissions.iter().map(IndexPermission::to_doc).collect::<Vec<_>>();
        DocBuilder::new()
            .put_opt("description", self.description.clone())
            .put("cluster_permissions", self.cluster_permissions.clone())
            .put_opt("index_permissions", (!index.is_empty()).then_some(DocNode::List(index)))
            .build()
    }

    fn parse(node: &TraceableDocNode<'_>) -> Option<Self> {
        let index_permissions = node
            .get("index_permissions")
            .as_list_of(IndexPermission::parse)
            .into_option()
            .unwrap_or_default();
        Some(Self {
            description: node.get("description").as_string().into_option(),
            cluster_permissions: strings(node, "cluster_permissions"),
            index_permissions: index_permissions
                .into_iter()
                .map(|permission| permission.into_value())
                .collect(),
        })
    }
}

/// `sg_roles.yml`
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SgRoles {
    pub roles: IndexMap<String, SgRole>,
}

impl NamedConfig for SgRoles {
    const FILE_NAME: &'static str = "sg_roles.yml";

    fn to_doc(&self) -> DocNode {
        DocNode::Map(
            self.roles
                .iter()
                .map(|(name, role)| (name.clone(), role.to_doc()))
                .collect(),
        )
    }

    fn parse(node: &TraceableDocNode<'_>) -> Option<Self> {
        if node.doc().is_null() {
            return Some(Self::default());
        }
        let roles = node.as_attribute().as_map_of(SgRole::parse).into_option()?;
        Some(Self {
            roles: roles
                .into_iter()
                .map(|(name, role)| (name, role.into_value()))
                .collect(),
        })
    }
}
