#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use config_trace::{parse_json, parse_yaml, ParseOptions};
use sgmigrate::load::{build_context, load_context, SourceKind};
use sgmigrate::migrate::{
    default_migrators, run_migration, MigrateError, MigrationContext, MigrationReporter,
    MigrationResult,
};
use sgmigrate::translate::Translator;

pub fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("fixtures")
        .join(name)
}

pub fn all_fixtures() -> Vec<PathBuf> {
    [
        "elasticsearch.yml",
        "kibana.yml",
        "user.json",
        "role.json",
        "role_mapping.json",
    ]
        .into_iter()
        .map(fixture)
        .collect()
}

pub fn path_as_str(path: &Path) -> &str {
    path.to_str().expect("path should be valid utf-8")
}

pub fn context_from_fixtures(paths: &[PathBuf]) -> MigrationContext {
    load_context(paths, ParseOptions::default()).expect("fixtures should be valid")
}

/// Context from one in-memory document; YAML for the `.yml` inputs, JSON otherwise.
pub fn context_from(kind: SourceKind, raw: &str) -> MigrationContext {
    context_with_options(kind, raw, ParseOptions::default())
}

pub fn context_with_options(
    kind: SourceKind,
    raw: &str,
    options: ParseOptions,
) -> MigrationContext {
    let doc = match kind {
        SourceKind::Elasticsearch | SourceKind::Kibana => {
            parse_yaml(raw.as_bytes()).expect("yaml")
        }
        _ => parse_json(raw.as_bytes()).expect("json"),
    };
    build_context(vec![(kind, doc)], options).expect("document should be valid")
}

pub fn reporter() -> MigrationReporter {
    let translator = Translator::embedded().expect("translations");
    MigrationReporter::new(Arc::new(translator))
}

pub fn migrate(
    context: &MigrationContext,
) -> (Result<MigrationResult, MigrateError>, MigrationReporter) {
    let mut reporter = reporter();
    let result = run_migration(&default_migrators(), context, &mut reporter);
    (result, reporter)
}
