use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::tree::DocNode;

/// Errors that can occur while loading a document into a [`DocNode`] tree.
#[derive(Debug, Error)]
pub enum ParseError {
    /// Input YAML could not be decoded.
    #[error("failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
    /// Input JSON could not be decoded.
    #[error("failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),
    /// Failed to read input file.
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
}

/// Parse YAML bytes into a [`DocNode`] tree. An empty document is `Null`.
pub fn parse_yaml(bytes: &[u8]) -> Result<DocNode, ParseError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(DocNode::Null);
    }
    Ok(serde_yaml::from_slice(bytes)?)
}

/// Parse JSON bytes into a [`DocNode`] tree.
pub fn parse_json(bytes: &[u8]) -> Result<DocNode, ParseError> {
    Ok(serde_json::from_slice(bytes)?)
}

/// Parse a file into a [`DocNode`] tree, choosing the format from its extension.
pub fn parse_file(path: &Path) -> Result<DocNode, ParseError> {
    let bytes = fs::read(path)?;
    if is_json(path) {
        parse_json(&bytes)
    } else {
        parse_yaml(&bytes)
    }
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}
