use std::fmt::{self, Display, Formatter};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A generic configuration document node as produced by YAML or JSON loaders.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DocNode {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    List(Vec<DocNode>),
    Map(IndexMap<String, DocNode>),
}

impl DocNode {
    /// Create an empty mapping node.
    pub fn map() -> Self {
        DocNode::Map(IndexMap::new())
    }

    /// Human-readable shape name used in type-mismatch diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            DocNode::Null => "null",
            DocNode::Bool(_) => "boolean",
            DocNode::Int(_) => "integer",
            DocNode::Float(_) => "number",
            DocNode::String(_) => "string",
            DocNode::List(_) => "list",
            DocNode::Map(_) => "object",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, DocNode::Null)
    }

    pub fn as_map(&self) -> Option<&IndexMap<String, DocNode>> {
        match self {
            DocNode::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[DocNode]> {
        match self {
            DocNode::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            DocNode::String(value) => Some(value),
            _ => None,
        }
    }

    /// Return the direct child stored under `key`.
    pub fn get_child(&self, key: &str) -> Option<&DocNode> {
        self.as_map().and_then(|map| map.get(key))
    }

    /// Walk a nested key path and return the terminal node if found.
    pub fn get_path<'a>(&'a self, path: &[&str]) -> Option<&'a DocNode> {
        let mut current = self;
        for segment in path {
            current = current.get_child(segment)?;
        }
        Some(current)
    }

    /// Insert into a mapping node; no-op on other shapes.
    pub fn insert(&mut self, key: impl Into<String>, value: DocNode) {
        if let DocNode::Map(map) = self {
            map.insert(key.into(), value);
        }
    }

    /// Render a scalar without quoting; containers fall back to JSON text.
    pub fn scalar_text(&self) -> String {
        match self {
            DocNode::Null => String::new(),
            DocNode::Bool(value) => value.to_string(),
            DocNode::Int(value) => value.to_string(),
            DocNode::Float(value) => value.to_string(),
            DocNode::String(value) => value.clone(),
            DocNode::List(_) | DocNode::Map(_) => self.to_string(),
        }
    }

    /// Rewrite flat dotted keys (`a.b: 1`) into nested mappings.
    ///
    /// Returns the expanded tree together with the dotted paths where a scalar
    /// and a mapping collided. On collision the first value seen is kept.
    pub fn expand_dotted_keys(&self) -> (DocNode, Vec<String>) {
        let mut conflicts = Vec::new();
        let expanded = expand_node(self, "", &mut conflicts);
        (expanded, conflicts)
    }
}

fn expand_node(node: &DocNode, prefix: &str, conflicts: &mut Vec<String>) -> DocNode {
    match node {
        DocNode::Map(map) => {
            let mut out = DocNode::map();
            for (key, value) in map {
                let parts: Vec<&str> = key.split('.').filter(|part| !part.is_empty()).collect();
                if parts.is_empty() {
                    continue;
                }
                let full = join_path(prefix, key);
                let value = expand_node(value, &full, conflicts);
                merge_at(&mut out, &parts, value, prefix, conflicts);
            }
            out
        }
        DocNode::List(items) => DocNode::List(
            items
                .iter()
                .enumerate()
                .map(|(index, item)| {
                    expand_node(item, &join_path(prefix, &index.to_string()), conflicts)
                })
                .collect(),
        ),
        other => other.clone(),
    }
}

fn merge_at(
    target: &mut DocNode,
    parts: &[&str],
    value: DocNode,
    prefix: &str,
    conflicts: &mut Vec<String>,
) {
    let DocNode::Map(map) = target else {
        conflicts.push(prefix.to_string());
        return;
    };
    let (head, rest) = match parts.split_first() {
        Some(split) => split,
        None => return,
    };
    let here = join_path(prefix, head);

    if rest.is_empty() {
        match map.get_mut(*head) {
            None => {
                map.insert((*head).to_string(), value);
            }
            Some(existing @ DocNode::Map(_)) => {
                if let DocNode::Map(incoming) = value {
                    for (key, child) in incoming {
                        merge_at(existing, &[key.as_str()], child, &here, conflicts);
                    }
                } else {
                    conflicts.push(here);
                }
            }
            Some(_) => conflicts.push(here),
        }
        return;
    }

    let child = map
        .entry((*head).to_string())
        .or_insert_with(DocNode::map);
    if !matches!(child, DocNode::Map(_)) {
        conflicts.push(here);
        return;
    }
    merge_at(child, rest, value, &here, conflicts);
}

fn join_path(prefix: &str, segment: &str) -> String {
    if prefix.is_empty() {
        segment.to_string()
    } else {
        format!("{prefix}.{segment}")
    }
}

impl Display for DocNode {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match serde_json::to_string(self) {
            Ok(text) => f.write_str(&text),
            Err(_) => f.write_str(self.type_name()),
        }
    }
}

impl From<&str> for DocNode {
    fn from(value: &str) -> Self {
        DocNode::String(value.to_string())
    }
}

impl From<String> for DocNode {
    fn from(value: String) -> Self {
        DocNode::String(value)
    }
}

impl From<bool> for DocNode {
    fn from(value: bool) -> Self {
        DocNode::Bool(value)
    }
}

impl From<i64> for DocNode {
    fn from(value: i64) -> Self {
        DocNode::Int(value)
    }
}

impl From<i32> for DocNode {
    fn from(value: i32) -> Self {
        DocNode::Int(i64::from(value))
    }
}

impl From<Vec<String>> for DocNode {
    fn from(values: Vec<String>) -> Self {
        DocNode::List(values.into_iter().map(DocNode::String).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::DocNode;
    use pretty_assertions::assert_eq;

    fn yaml(text: &str) -> DocNode {
        serde_yaml::from_str(text).expect("yaml")
    }

    #[test]
    fn get_path_walks_nested_maps() {
        let doc = yaml("a:\n  b:\n    c: value\n");
        assert_eq!(
            doc.get_path(&["a", "b", "c"]),
            Some(&DocNode::String("value".to_string()))
        );
        assert_eq!(doc.get_path(&["a", "x"]), None);
    }

    #[test]
    fn expand_merges_flat_and_nested_keys() {
        let doc =
            yaml("xpack.security.enabled: true\nxpack:\n  security:\n    authc:\n      x: 1\n");
        let (expanded, conflicts) = doc.expand_dotted_keys();
        assert!(conflicts.is_empty());
        assert_eq!(
            expanded,
            yaml("xpack:\n  security:\n    enabled: true\n    authc:\n      x: 1\n")
        );
    }

    #[test]
    fn expand_reports_scalar_map_collision() {
        let doc = yaml("a.b: 1\na:\n  b:\n    c: 2\n");
        let (_, conflicts) = doc.expand_dotted_keys();
        assert_eq!(conflicts, vec!["a.b".to_string()]);
    }

    #[test]
    fn type_names_cover_every_shape() {
        assert_eq!(yaml("1").type_name(), "integer");
        assert_eq!(yaml("1.5").type_name(), "number");
        assert_eq!(yaml("[1]").type_name(), "list");
        assert_eq!(yaml("{}").type_name(), "object");
        assert_eq!(yaml("~").type_name(), "null");
    }
}
