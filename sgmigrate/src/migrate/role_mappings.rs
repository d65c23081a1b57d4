use config_trace::Traceable;
use tracing::debug;

use crate::migrate::{MigrateError, MigrationContext, MigrationReporter, Migrator};
use crate::searchguard::{RoleMappingEntry, SgConfig, SgRolesMapping};
use crate::xpack::{FieldRule, FieldTarget, MappedRoles, Rule};

/// Role mappings to `sg_roles_mapping.yml`.
///
/// X-Pack maps a rule to many roles; Search Guard maps each role to the users
/// and backend roles that receive it. Every convertible rule is therefore
/// folded into the entry of each role it grants.
#[derive(Debug, Clone, Copy, Default)]
pub struct RoleMappingsMigrator;

impl Migrator for RoleMappingsMigrator {
    fn name(&self) -> &'static str {
        "role_mappings"
    }

    fn migrate(
        &self,
        context: &MigrationContext,
        reporter: &mut MigrationReporter,
    ) -> Result<Vec<SgConfig>, MigrateError> {
        let Some(mappings) = &context.role_mappings else {
            return Ok(Vec::new());
        };

        let mut target = SgRolesMapping::default();
        for (name, mapping) in &mappings.get().mappings {
            let mapping = mapping.get();
            if !*mapping.enabled.get() {
                reporter.inconvertible(&mapping.enabled, reporter.translate("{MAPPING_DISABLED}")?);
                continue;
            }
            let roles = match mapping.roles.get() {
                MappedRoles::Roles(roles) => roles,
                MappedRoles::Templates(_) => {
                    reporter.inconvertible(
                        mapping.roles.source(),
                        reporter.translate("{MAPPING_TEMPLATES}")?,
                    );
                    continue;
                }
            };
            let Some(entry) = migrate_rule(&mapping.rules, reporter)? else {
                continue;
            };
            debug!(mapping = %name, roles = roles.len(), "migrating role mapping");
            if entry.is_empty() {
                continue;
            }
            for role in roles {
                target
                    .mappings
                    .entry(role.get().clone())
                    .or_default()
                    .absorb(entry.clone());
            }
        }
        Ok(vec![SgConfig::RolesMapping(target)])
    }
}

/// `None` when the rule cannot be expressed at all.
fn migrate_rule(
    rule: &Traceable<Rule>,
    reporter: &mut MigrationReporter,
) -> Result<Option<RoleMappingEntry>, MigrateError> {
    match rule.get() {
        Rule::Field(field) => migrate_field(field, reporter).map(Some),
        Rule::Any(rules) => {
            let mut entry = RoleMappingEntry::default();
            for rule in rules {
                if let Some(alternative) = migrate_rule(rule, reporter)? {
                    entry.absorb(alternative);
                }
            }
            Ok(Some(entry))
        }
        Rule::All(rules) => {
            // `all` of one condition plus realm checks still works once the
            // realm checks are dropped.
            let (realm_rules, others): (Vec<_>, Vec<_>) = rules.iter().partition(|rule| {
                matches!(rule.get(), Rule::Field(FieldRule { target: FieldTarget::RealmName, .. }))
            });
            if others.len() > 1 {
                reporter.inconvertible(rule.source(), reporter.translate("{RULE_ALL}")?);
                return Ok(None);
            }
            for realm_rule in realm_rules {
                migrate_rule(realm_rule, reporter)?;
            }
            match others.first() {
                Some(other) => migrate_rule(other, reporter),
                None => Ok(Some(RoleMappingEntry::default())),
            }
        }
        Rule::Except(_) => {
            reporter.inconvertible(rule.source(), reporter.translate("{RULE_EXCEPT}")?);
            Ok(None)
        }
    }
}

fn migrate_field(
    field: &FieldRule,
    reporter: &mut MigrationReporter,
) -> Result<RoleMappingEntry, MigrateError> {
    let values: Vec<String> = field.values.get().iter().map(|value| value.get().clone()).collect();
    let mut entry = RoleMappingEntry::default();
    match &field.target {
        FieldTarget::Username => entry.users = values,
        FieldTarget::Groups => entry.backend_roles = values,
        FieldTarget::Host => entry.hosts = values,
        FieldTarget::RemoteIp => entry.ips = values,
        FieldTarget::Dn => {
            reporter.problem(field.values.source(), reporter.translate("{RULE_DN}")?);
            entry.users = values;
        }
        FieldTarget::RealmName => {
            reporter.problem(field.values.source(), reporter.translate("{RULE_REALM_NAME}")?);
        }
        FieldTarget::Metadata(_) => {
            reporter.problem(field.values.source(), reporter.translate("{RULE_METADATA}")?);
        }
    }
    Ok(entry)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::RoleMappingsMigrator;
    use crate::migrate::{MigrationContext, MigrationReporter, Migrator, ProblemKind};
    use crate::searchguard::{SgConfig, SgRolesMapping};
    use crate::translate::Translator;
    use crate::xpack::RoleMappings;
    use config_trace::{parse_json, ParseOptions};
    use pretty_assertions::assert_eq;

    fn migrate(json: &str) -> (SgRolesMapping, MigrationReporter) {
        let doc = parse_json(json.as_bytes()).expect("json");
        let mappings = RoleMappings::parse_document(&doc, ParseOptions::default()).expect("valid");
        let context = MigrationContext::new().with_role_mappings(mappings);
        let translator = Translator::embedded().expect("translations");
        let mut reporter = MigrationReporter::new(Arc::new(translator));
        let mut configs = RoleMappingsMigrator
            .migrate(&context, &mut reporter)
            .expect("migrated");
        let Some(SgConfig::RolesMapping(mappings)) = configs.pop() else {
            panic!("expected sg_roles_mapping");
        };
        (mappings, reporter)
    }

    #[test]
    fn any_rules_fold_into_each_role() {
        let (mappings, reporter) = migrate(
            r#"{"admins":{"roles":["admin","monitoring"],"rules":{"any":[
                {"field":{"username":["kirk","spock"]}},
                {"field":{"groups":"cn=admins,dc=example,dc=com"}}
            ]}}}"#,
        );
        for role in ["admin", "monitoring"] {
            assert_eq!(mappings.mappings[role].users, vec!["kirk", "spock"]);
            assert_eq!(mappings.mappings[role].backend_roles, vec!["cn=admins,dc=example,dc=com"]);
        }
        assert!(reporter.is_empty());
    }

    #[test]
    fn mappings_granting_the_same_role_are_merged() {
        let (mappings, _) = migrate(
            r#"{
                "a":{"roles":["viewer"],"rules":{"field":{"username":"a"}}},
                "b":{"roles":["viewer"],"rules":{"field":{"username":["b","a"]}}}
            }"#,
        );
        assert_eq!(mappings.mappings["viewer"].users, vec!["a", "b"]);
    }

    #[test]
    fn realm_conditions_inside_all_are_dropped() {
        let (mappings, reporter) = migrate(
            r#"{"ldap_admins":{"roles":["admin"],"rules":{"all":[
                {"field":{"realm.name":"ldap1"}},
                {"field":{"groups":"admins"}}
            ]}}}"#,
        );
        assert_eq!(mappings.mappings["admin"].backend_roles, vec!["admins"]);
        assert_eq!(reporter.len(), 1);
        assert_eq!(
            reporter.problems()[0].path().as_deref(),
            Some("role_mapping.json: ldap_admins.rules.all.0.field.realm.name")
        );
    }

    #[test]
    fn inexpressible_rules_are_inconvertible() {
        let (mappings, reporter) = migrate(
            r#"{
                "both":{"roles":["r1"],"rules":{"all":[
                    {"field":{"username":"a"}},{"field":{"groups":"g"}}
                ]}},
                "not":{"roles":["r2"],"rules":{"except":{"field":{"username":"a"}}}},
                "off":{"roles":["r3"],"enabled":false,"rules":{"field":{"username":"a"}}},
                "tpl":{
                    "role_templates":[{"template":{"source":"{{_user.username}}"}}],
                    "rules":{"field":{"username":"*"}}
                }
            }"#,
        );
        assert!(mappings.mappings.is_empty());
        let kinds: Vec<_> = reporter.problems().iter().map(|p| p.kind).collect();
        assert_eq!(kinds, vec![ProblemKind::Inconvertible; 4]);
        let paths: Vec<_> = reporter.problems().iter().filter_map(|p| p.path()).collect();
        assert_eq!(
            paths,
            vec![
                "role_mapping.json: both.rules",
                "role_mapping.json: not.rules",
                "role_mapping.json: off.enabled",
                "role_mapping.json: tpl.role_templates",
            ]
        );
    }

    #[test]
    fn dn_rules_map_to_users_with_a_warning() {
        let (mappings, reporter) =
            migrate(r#"{"dn":{"roles":["r"],"rules":{"field":{"dn":"cn=kirk,dc=example"}}}}"#);
        assert_eq!(mappings.mappings["r"].users, vec!["cn=kirk,dc=example"]);
        assert_eq!(reporter.problems()[0].kind, ProblemKind::Problem);
    }

    #[test]
    fn host_and_remote_ip_rules_fill_hosts_and_ips() {
        let (mappings, reporter) = migrate(
            r#"{"internal":{"roles":["ops"],"rules":{"any":[
                {"field":{"host":["*.corp.example.com"]}},
                {"field":{"remote_ip":["10.0.0.0/8","192.168.1.7"]}}
            ]}}}"#,
        );
        let entry = &mappings.mappings["ops"];
        assert_eq!(entry.hosts, vec!["*.corp.example.com"]);
        assert_eq!(entry.ips, vec!["10.0.0.0/8", "192.168.1.7"]);
        assert!(entry.users.is_empty());
        assert!(reporter.is_empty());
    }
}
