use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::tree::DocNode;

/// Errors that can occur while writing a [`DocNode`] tree.
#[derive(Debug, Error)]
pub enum WriteError {
    /// Failed to serialize YAML.
    #[error("failed to write YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
    /// Failed to serialize JSON.
    #[error("failed to write JSON: {0}")]
    Json(#[from] serde_json::Error),
    /// Failed to write output file.
    #[error("failed to write config file: {0}")]
    Io(#[from] std::io::Error),
}

/// Serialize a [`DocNode`] tree into YAML text.
pub fn write_yaml(node: &DocNode) -> Result<String, WriteError> {
    Ok(serde_yaml::to_string(node)?)
}

/// Serialize a [`DocNode`] tree into pretty-printed JSON text.
pub fn write_json(node: &DocNode) -> Result<String, WriteError> {
    Ok(serde_json::to_string_pretty(node)?)
}

/// Serialize a [`DocNode`] tree and write it to `path`, JSON for `.json` files.
pub fn write_file(node: &DocNode, path: &Path) -> Result<(), WriteError> {
    let is_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    let text = if is_json {
        write_json(node)?
    } else {
        write_yaml(node)?
    };
    fs::write(path, text)?;
    Ok(())
}
