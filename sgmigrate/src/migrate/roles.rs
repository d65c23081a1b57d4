use config_trace::{DocNode, Source, Traceable};
use tracing::debug;

use crate::message::MessageBuilder;
use crate::migrate::privileges::{cluster_privilege, index_privilege, PrivilegeMapping};
use crate::migrate::{MigrateError, MigrationContext, MigrationReporter, Migrator};
use crate::searchguard::{IndexPermission, SgConfig, SgRole, SgRoles};
use crate::xpack::roles::FieldSecurity;
use crate::xpack::{IndexPrivileges, Role};

/// Roles to `sg_roles.yml`, privileges through the action group tables.
#[derive(Debug, Clone, Copy, Default)]
pub struct RolesMigrator;

impl Migrator for RolesMigrator {
    fn name(&self) -> &'static str {
        "roles"
    }

    fn migrate(
        &self,
        context: &MigrationContext,
        reporter: &mut MigrationReporter,
    ) -> Result<Vec<SgConfig>, MigrateError> {
        let Some(roles) = &context.roles else {
            return Ok(Vec::new());
        };

        let mut target = SgRoles::default();
        for (name, role) in &roles.get().roles {
            if role.get().is_reserved() {
                reporter.inconvertible(role.source(), reporter.translate("{ROLE_RESERVED}")?);
                continue;
            }
            debug!(role = %name, "migrating role");
            target.roles.insert(name.clone(), migrate_role(role.get(), reporter)?);
        }
        Ok(vec![SgConfig::Roles(target)])
    }
}

fn migrate_role(role: &Role, reporter: &mut MigrationReporter) -> Result<SgRole, MigrateError> {
    if role.applications.is_present() {
        reporter.inconvertible(
            role.applications.source(),
            reporter.translate("{APPLICATION_PRIVILEGES}")?,
        );
    }
    if role.run_as.get().is_some_and(|run_as| !run_as.is_empty()) {
        reporter.inconvertible(role.run_as.source(), reporter.translate("{RUN_AS}")?);
    }
    if role.metadata.get().is_some_and(|metadata| !metadata.is_empty()) {
        reporter.problem(role.metadata.source(), reporter.translate("{ROLE_METADATA}")?);
    }

    let cluster_permissions = map_privileges(
        &role.cluster,
        cluster_privilege,
        ("{UNKNOWN_CLUSTER_PRIVILEGE}", "{UNKNOWN_CLUSTER_PRIVILEGES}"),
        reporter,
    )?;
    let mut index_permissions = Vec::with_capacity(role.indices.get().len());
    for entry in role.indices.get() {
        index_permissions.push(migrate_index_privileges(entry.get(), reporter)?);
    }

    Ok(SgRole {
        description: role.description.get().cloned(),
        cluster_permissions,
        index_permissions,
    })
}

fn migrate_index_privileges(
    entry: &IndexPrivileges,
    reporter: &mut MigrationReporter,
) -> Result<IndexPermission, MigrateError> {
    if *entry.allow_restricted_indices.get() {
        reporter.inconvertible(
            &entry.allow_restricted_indices,
            reporter.translate("{RESTRICTED_INDICES}")?,
        );
    }
    let allowed_actions = map_privileges(
        &entry.privileges,
        index_privilege,
        ("{UNKNOWN_INDEX_PRIVILEGE}", "{UNKNOWN_INDEX_PRIVILEGES}"),
        reporter,
    )?;
    let fls = match entry.field_security.get() {
        Some(field_security) => {
            migrate_fls(field_security, entry.field_security.source(), reporter)?
        }
        None => Vec::new(),
    };
    let dls = entry.query.get().map(|query| match query {
        DocNode::String(text) => text.clone(),
        other => serde_json::to_string(other).unwrap_or_else(|_| other.scalar_text()),
    });

    Ok(IndexPermission {
        index_patterns: entry.names.get().iter().map(|name| name.get().clone()).collect(),
        allowed_actions,
        fls,
        dls,
    })
}

fn map_privileges(
    privileges: &Traceable<Vec<Traceable<String>>>,
    lookup: fn(&str) -> PrivilegeMapping,
    (singular, plural): (&str, &str),
    reporter: &mut MigrationReporter,
) -> Result<Vec<String>, MigrateError> {
    let mut mapped: Vec<String> = Vec::new();
    let mut unknown: Vec<&str> = Vec::new();
    for privilege in privileges.get() {
        let name = privilege.get();
        let target = match lookup(name) {
            PrivilegeMapping::Exact(target) => target.to_string(),
            PrivilegeMapping::Approximate(target) => {
                let mut message = MessageBuilder::new();
                message.append_key_value(reporter.translate("{PRIVILEGE_APPROXIMATED}")?, target);
                reporter.problem(privilege, message.finalize());
                target.to_string()
            }
            PrivilegeMapping::Action => name.clone(),
            PrivilegeMapping::Unknown => {
                unknown.push(name);
                continue;
            }
        };
        if !mapped.contains(&target) {
            mapped.push(target);
        }
    }

    if !unknown.is_empty() {
        let mut message = MessageBuilder::new();
        message
            .append_key_value_separated(
                reporter.translate(singular)?,
                reporter.translate(plural)?,
                &unknown,
            )
            .next_sentence()
            .append(reporter.translate("{PRIVILEGE_OMITTED}")?);
        reporter.problem(privileges.source(), message.finalize());
    }
    Ok(mapped)
}

/// Granted fields as they are, excluded fields as `~field`.
fn migrate_fls(
    field_security: &FieldSecurity,
    source: &Source,
    reporter: &mut MigrationReporter,
) -> Result<Vec<String>, MigrateError> {
    let names = |fields: Option<&Vec<Traceable<String>>>| -> Vec<String> {
        fields
            .map(|fields| fields.iter().map(|field| field.get().clone()).collect())
            .unwrap_or_default()
    };
    let grant = names(field_security.grant.get());
    let except = names(field_security.except.get());
    let grants_all = grant.is_empty() || grant.iter().all(|field| field == "*");

    if except.is_empty() {
        return Ok(if grants_all { Vec::new() } else { grant });
    }
    if grants_all {
        return Ok(except.iter().map(|field| format!("~{field}")).collect());
    }
    reporter.problem(source, reporter.translate("{FLS_GRANT_AND_EXCEPT}")?);
    Ok(grant)
}
