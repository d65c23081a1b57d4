use std::cell::RefCell;
use std::collections::HashSet;

use config_trace::{
    parse_document, ConfigValidationError, DocNode, OptTraceable, ParseOptions, Traceable,
    TraceableDocNode, ValidationErrorKind,
};
use indexmap::IndexMap;

/// A native realm user as exported from the security index.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub username: Traceable<String>,
    pub roles: Traceable<Vec<Traceable<String>>>,
    pub password: OptTraceable<String>,
    pub full_name: OptTraceable<String>,
    pub email: OptTraceable<String>,
    pub metadata: OptTraceable<IndexMap<String, Traceable<DocNode>>>,
    pub enabled: Traceable<bool>,
}

impl User {
    pub fn parse(node: &TraceableDocNode<'_>) -> Option<Self> {
        let username = node.get("username").required().as_string();
        let roles = node.get("roles").required().as_list_of_strings();
        Some(Self {
            username: username?,
            roles: roles?,
            password: node.get("password").secret().as_string(),
            full_name: node.get("full_name").as_string(),
            email: node.get("email").as_string(),
            metadata: node
                .get("metadata")
                .as_map_of(|value| Some(value.doc().clone())),
            enabled: node.get("enabled").as_bool_or(true),
        })
    }
}

/// `{"hits": {"hits": [{"_source": {...}}]}}`
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Users {
    pub users: Vec<Traceable<User>>,
}

impl Users {
    pub const FILE_NAME: &'static str = "user.json";

    pub fn parse_document(
        doc: &DocNode,
        options: ParseOptions,
    ) -> Result<Traceable<Self>, ConfigValidationError> {
        parse_document(doc, Some(Self::FILE_NAME), options, Self::parse)
    }

    pub fn parse(node: &TraceableDocNode<'_>) -> Option<Self> {
        let seen = RefCell::new(HashSet::new());
        let hits = node.get("hits.hits").required().as_list_of(|hit| {
            let user = hit
                .get("_source")
                .required()
                .as_parsed(User::parse)?
                .into_value();
            if !seen.borrow_mut().insert(user.username.get().clone()) {
                hit.add_error_at(
                    "_source.username",
                    ValidationErrorKind::Custom {
                        message: format!("Duplicate username {}", user.username.get()),
                    },
                );
                return None;
            }
            Some(user)
        })?;

        Some(Self {
            users: hits.into_value(),
        })
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}
