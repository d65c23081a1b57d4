use config_trace::{DocNode, OptTraceable};
use indexmap::IndexMap;
use tracing::debug;

use crate::migrate::{MigrateError, MigrationContext, MigrationReporter, Migrator};
use crate::searchguard::{InternalUser, SgConfig, SgInternalUsers};
use crate::xpack::User;

/// Native realm users to `sg_internal_users.yml`.
#[derive(Debug, Clone, Copy, Default)]
pub struct UserMigrator;

impl Migrator for UserMigrator {
    fn name(&self) -> &'static str {
        "users"
    }

    fn migrate(
        &self,
        context: &MigrationContext,
        reporter: &mut MigrationReporter,
    ) -> Result<Vec<SgConfig>, MigrateError> {
        let Some(users) = &context.users else {
            return Ok(Vec::new());
        };

        let mut target = SgInternalUsers::default();
        for user in &users.get().users {
            let user = user.get();
            debug!(user = %user.username.get(), enabled = *user.enabled.get(), "migrating user");
            let migrated = migrate_user(user, reporter)?;
            target.users.insert(user.username.get().clone(), migrated);
        }

        // Once per run, whether or not any user exists.
        reporter.problem(users.source(), reporter.translate("{PASSWORD_RESET}")?);
        Ok(vec![SgConfig::InternalUsers(target)])
    }
}

fn migrate_user(
    user: &User,
    reporter: &mut MigrationReporter,
) -> Result<InternalUser, MigrateError> {
    let mut attributes: IndexMap<String, DocNode> = user
        .metadata
        .get()
        .map(|metadata| {
            metadata
                .iter()
                .map(|(key, value)| (key.clone(), value.get().clone()))
                .collect()
        })
        .unwrap_or_default();
    copy_attribute(&mut attributes, "full_name", &user.full_name, reporter)?;
    copy_attribute(&mut attributes, "email", &user.email, reporter)?;

    Ok(InternalUser {
        hash: String::new(),
        search_guard_roles: user.roles.get().iter().map(|role| role.get().clone()).collect(),
        attributes,
        description: None,
        enabled: *user.enabled.get(),
    })
}

fn copy_attribute(
    attributes: &mut IndexMap<String, DocNode>,
    key: &str,
    value: &OptTraceable<String>,
    reporter: &mut MigrationReporter,
) -> Result<(), MigrateError> {
    let Some(text) = value.get() else {
        return Ok(());
    };
    if attributes.contains_key(key) {
        reporter.problem(value, reporter.translate("{ATTRIBUTE_CONFLICT}")?);
        return Ok(());
    }
    attributes.insert(key.to_string(), DocNode::from(text.as_str()));
    Ok(())
}
