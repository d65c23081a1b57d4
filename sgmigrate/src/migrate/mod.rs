//! X-Pack to Search Guard migration.
//!
//! Every [`Migrator`] reads its fragment of the [`MigrationContext`], reports
//! what it cannot carry over exactly to the [`MigrationReporter`] and returns
//! target artifacts. [`run_migration`] folds users, roles and role mappings of
//! all migrators through the [`IntermediateRepresentation`].

use std::collections::HashSet;

use config_trace::Source;
use thiserror::Error;
use tracing::{debug, info};

use crate::message::MessageBuilder;
use crate::searchguard::SgConfig;
use crate::translate::TranslateError;

pub mod auth;
pub mod context;
pub mod frontend_auth;
pub mod ir;
pub mod privileges;
pub mod reporter;
pub mod role_mappings;
pub mod roles;
pub mod tls;
pub mod users;

pub use auth::AuthMigrator;
pub use context::MigrationContext;
pub use frontend_auth::FrontendAuthMigrator;
pub use ir::IntermediateRepresentation;
pub use reporter::{MigrationReporter, Problem, ProblemKind, Severity};
pub use role_mappings::RoleMappingsMigrator;
pub use roles::RolesMigrator;
pub use tls::TlsMigrator;
pub use users::UserMigrator;

/// Failures that stop a migration run. Data that merely cannot be carried over
/// exactly is reported through the [`MigrationReporter`] instead.
#[derive(Debug, Error)]
pub enum MigrateError {
    #[error("realm type '{kind}' at {location} is not supported")]
    UnsupportedRealm { kind: String, location: Source },
    #[error("more than one migrator produced {file}")]
    DuplicateOutput { file: String },
    #[error(transparent)]
    Translation(#[from] TranslateError),
}

pub trait Migrator {
    fn name(&self) -> &'static str;

    fn migrate(
        &self,
        context: &MigrationContext,
        reporter: &mut MigrationReporter,
    ) -> Result<Vec<SgConfig>, MigrateError>;
}

/// All migrators in the order their artifacts are written.
pub fn default_migrators() -> Vec<Box<dyn Migrator>> {
    vec![
        Box::new(AuthMigrator),
        Box::new(FrontendAuthMigrator),
        Box::new(UserMigrator),
        Box::new(RolesMigrator),
        Box::new(RoleMappingsMigrator),
        Box::new(TlsMigrator),
    ]
}

/// Target artifacts of one run, at most one per file.
#[derive(Debug, Clone, Default)]
pub struct MigrationResult {
    pub configs: Vec<SgConfig>,
}

impl MigrationResult {
    pub fn find(&self, file_name: &str) -> Option<&SgConfig> {
        self.configs
            .iter()
            .find(|config| config.file_name() == file_name)
    }

    pub fn len(&self) -> usize {
        self.configs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.configs.is_empty()
    }
}

pub fn run_migration(
    migrators: &[Box<dyn Migrator>],
    context: &MigrationContext,
    reporter: &mut MigrationReporter,
) -> Result<MigrationResult, MigrateError> {
    let mut ir = IntermediateRepresentation::new();
    let mut configs = Vec::new();
    let mut seen = HashSet::new();

    for migrator in migrators {
        let before = reporter.len();
        let produced = migrator.migrate(context, reporter)?;
        info!(
            migrator = migrator.name(),
            artifacts = produced.len(),
            problems = reporter.len() - before,
            "migrator finished"
        );
        for config in produced {
            match config {
                SgConfig::InternalUsers(users) => {
                    let duplicates = ir.add_users(users);
                    report_duplicates(reporter, "{DUPLICATE_USER}", &duplicates)?;
                }
                SgConfig::Roles(roles) => {
                    let duplicates = ir.add_roles(roles);
                    report_duplicates(reporter, "{DUPLICATE_ROLE}", &duplicates)?;
                }
                SgConfig::RolesMapping(mappings) => {
                    let duplicates = ir.add_role_mappings(mappings);
                    report_duplicates(reporter, "{DUPLICATE_ROLE_MAPPING}", &duplicates)?;
                }
                other => {
                    if !seen.insert(other.file_name()) {
                        return Err(MigrateError::DuplicateOutput {
                            file: other.file_name().to_string(),
                        });
                    }
                    configs.push(other);
                }
            }
        }
    }

    configs.extend(ir.render());
    debug!(files = configs.len(), "migration rendered");
    Ok(MigrationResult { configs })
}

fn report_duplicates(
    reporter: &mut MigrationReporter,
    label: &str,
    names: &[String],
) -> Result<(), MigrateError> {
    for name in names {
        let mut message = MessageBuilder::new();
        message
            .append_key_value(reporter.translate(label)?, name)
            .next_sentence()
            .append(reporter.translate("{LAST_DEFINITION_WINS}")?);
        reporter.general(message.finalize());
    }
    Ok(())
}
