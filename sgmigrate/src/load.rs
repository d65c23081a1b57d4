use std::collections::HashSet;
use std::mem;
use std::path::{Path, PathBuf};

use config_trace::{parse_file, ConfigValidationError, DocNode, ParseError, ParseOptions};
use thiserror::Error;
use tracing::debug;

use crate::migrate::MigrationContext;
use crate::xpack::{KibanaConfig, RoleMappings, Roles, Users, XPackElasticsearchConfig};

/// The X-Pack documents an input file name stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    Elasticsearch,
    Users,
    Roles,
    RoleMappings,
    Kibana,
}

impl SourceKind {
    pub const ALL: [SourceKind; 5] = [
        SourceKind::Elasticsearch,
        SourceKind::Users,
        SourceKind::Roles,
        SourceKind::RoleMappings,
        SourceKind::Kibana,
    ];

    pub fn file_name(self) -> &'static str {
        match self {
            SourceKind::Elasticsearch => XPackElasticsearchConfig::FILE_NAME,
            SourceKind::Users => Users::FILE_NAME,
            SourceKind::Roles => Roles::FILE_NAME,
            SourceKind::RoleMappings => RoleMappings::FILE_NAME,
            SourceKind::Kibana => KibanaConfig::FILE_NAME,
        }
    }

    pub fn from_path(path: &Path) -> Option<Self> {
        let name = path.file_name()?.to_str()?;
        Self::ALL.into_iter().find(|kind| kind.file_name() == name)
    }
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to parse {path}: {source}")]
    Parse { path: String, source: ParseError },
    #[error("unrecognized input file {path}; expected one of: {expected}")]
    UnknownFile { path: String, expected: String },
    #[error("{file} was given more than once")]
    DuplicateInput { file: String },
    #[error("{} input file(s) failed validation", .0.len())]
    Invalid(Vec<ConfigValidationError>),
}

impl LoadError {
    pub fn validation_errors(&self) -> &[ConfigValidationError] {
        match self {
            LoadError::Invalid(errors) => errors,
            _ => &[],
        }
    }
}

/// Parse every input and bundle the results. Validation errors of all files
/// are collected before failing.
pub fn load_context(
    paths: &[PathBuf],
    options: ParseOptions,
) -> Result<MigrationContext, LoadError> {
    let mut seen = HashSet::new();
    let mut inputs = Vec::with_capacity(paths.len());
    for path in paths {
        let kind = SourceKind::from_path(path).ok_or_else(|| LoadError::UnknownFile {
            path: path.display().to_string(),
            expected: expected_names(),
        })?;
        if !seen.insert(kind) {
            return Err(LoadError::DuplicateInput {
                file: kind.file_name().to_string(),
            });
        }
        let doc = parse_file(path).map_err(|source| LoadError::Parse {
            path: path.display().to_string(),
            source,
        })?;
        debug!(path = %path.display(), ?kind, "loaded input");
        inputs.push((kind, doc));
    }
    build_context(inputs, options)
}

/// Documents already in memory, keyed by kind.
pub fn build_context(
    inputs: Vec<(SourceKind, DocNode)>,
    options: ParseOptions,
) -> Result<MigrationContext, LoadError> {
    let mut context = MigrationContext::new();
    let mut failures = Vec::new();
    for (kind, doc) in inputs {
        if let Err(error) = add_document(&mut context, kind, &doc, options) {
            failures.push(error);
        }
    }
    if failures.is_empty() {
        Ok(context)
    } else {
        Err(LoadError::Invalid(failures))
    }
}

fn add_document(
    context: &mut MigrationContext,
    kind: SourceKind,
    doc: &DocNode,
    options: ParseOptions,
) -> Result<(), ConfigValidationError> {
    match kind {
        SourceKind::Elasticsearch => {
            let config = XPackElasticsearchConfig::parse_document(doc, options)?;
            *context = mem::take(context).with_elasticsearch(config);
        }
        SourceKind::Users => context.users = Some(Users::parse_document(doc, options)?),
        SourceKind::Roles => context.roles = Some(Roles::parse_document(doc, options)?),
        SourceKind::RoleMappings => {
            context.role_mappings = Some(RoleMappings::parse_document(doc, options)?);
        }
        SourceKind::Kibana => context.kibana = Some(KibanaConfig::parse_document(doc, options)?),
    }
    Ok(())
}

fn expected_names() -> String {
    SourceKind::ALL
        .iter()
        .map(|kind| kind.file_name())
        .collect::<Vec<_>>()
        .join(", ")
}
