use config_trace::{DocNode, TraceableDocNode};
use indexmap::IndexMap;

use crate::searchguard::{strings, DocBuilder, NamedConfig};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct InternalUser {
    /// Empty after migration: source hashes are not usable by Search Guard.
    pub hash: String,
    pub search_guard_roles: Vec<String>,
    pub attributes: IndexMap<String, DocNode>,
    pub description: Option<String>,
    pub enabled: bool,
}

impl InternalUser {
    fn to_doc(&self) -> DocNode {
        let attributes = DocNode::Map(self.attributes.clone());
        let builder = DocBuilder::new()
            .put("hash", self.hash.as_str())
            .put_list("search_guard_roles", &self.search_guard_roles)
            .put_opt(
                "attributes",
                (!self.attributes.is_empty()).then_some(attributes),
            )
            .put_opt("description", self.description.clone());
        // Only the exceptional value is written.
        builder.put_opt("enabled", (!self.enabled).then_some(false)).build()
    }

    fn parse(node: &TraceableDocNode<'_>) -> Option<Self> {
        let attributes = node
            .get("attributes")
            .as_map_of(|value| Some(value.doc().clone()))
            .into_option()
            .unwrap_or_default();
        Some(Self {
            hash: node.get("hash").as_string_or("").into_value(),
            search_guard_roles: strings(node, "search_guard_roles"),
            attributes: attributes
                .into_iter()
                .map(|(key, value)| (key, value.into_value()))
                .collect(),
            description: node.get("description").as_string().into_option(),
            enabled: node.get("enabled").as_bool_or(true).into_value(),
        })
    }
}

/// `sg_internal_users.yml`
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SgInternalUsers {
    pub users: IndexMap<String, InternalUser>,
}

impl NamedConfig for SgInternalUsers {
    const FILE_NAME: &'static str = "sg_internal_users.yml";

    fn to_doc(&self) -> DocNode {
        DocNode::Map(
            self.users
                .iter()
                .map(|(name, user)| (name.clone(), user.to_doc()))
                .collect(),
        )
    }

    fn parse(node: &TraceableDocNode<'_>) -> Option<Self> {
        if node.doc().is_null() {
            return Some(Self::default());
        }
        let users = node.as_attribute().as_map_of(InternalUser::parse).into_option()?;
        Some(Self {
            users: users
                .into_iter()
                .map(|(name, user)| (name, user.into_value()))
                .collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{InternalUser, SgInternalUsers};
    use crate::searchguard::NamedConfig;
    use config_trace::DocNode;
    use indexmap::IndexMap;
    use pretty_assertions::assert_eq;

    #[test]
    fn enabled_users_omit_the_flag() {
        let mut users = SgInternalUsers::default();
        users.users.insert(
            "alice".to_string(),
            InternalUser {
                search_guard_roles: vec!["admin".to_string()],
                enabled: true,
                ..InternalUser::default()
            },
        );
        users.users.insert(
            "bob".to_string(),
            InternalUser {
                attributes: IndexMap::from([("team".to_string(), DocNode::from("ops"))]),
                enabled: false,
                ..InternalUser::default()
            },
        );
        let doc = users.to_doc();
        assert!(doc.get_path(&["alice", "enabled"]).is_none());
        assert_eq!(doc.get_path(&["bob", "enabled"]), Some(&DocNode::Bool(false)));
        assert_eq!(doc.get_path(&["alice", "hash"]), Some(&DocNode::from("")));

        let reparsed = SgInternalUsers::from_doc(&doc).expect("parse");
        assert_eq!(reparsed, users);
    }
}
