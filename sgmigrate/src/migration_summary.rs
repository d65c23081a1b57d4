use serde::Serialize;

use crate::migrate::{MigrationReporter, MigrationResult, ProblemKind};
use crate::searchguard::SgConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct MigrationSummary {
    pub auth_domains: usize,
    pub users: usize,
    pub roles: usize,
    pub role_mappings: usize,
    pub files: usize,
    pub problems: usize,
    pub inconvertible: usize,
}

pub fn summarize(result: &MigrationResult, reporter: &MigrationReporter) -> MigrationSummary {
    let mut summary = MigrationSummary {
        files: result.len(),
        problems: reporter.len(),
        inconvertible: reporter
            .problems()
            .iter()
            .filter(|problem| problem.kind == ProblemKind::Inconvertible)
            .count(),
        ..MigrationSummary::default()
    };
    for config in &result.configs {
        match config {
            SgConfig::Authc(authc) => summary.auth_domains = authc.auth_domains.len(),
            SgConfig::InternalUsers(users) => summary.users = users.users.len(),
            SgConfig::Roles(roles) => summary.roles = roles.roles.len(),
            SgConfig::RolesMapping(mappings) => summary.role_mappings = mappings.mappings.len(),
            SgConfig::FrontendAuthc(_) | SgConfig::Tls(_) => {}
        }
    }
    summary
}

pub fn render(summary: MigrationSummary) -> String {
    format!(
        "migrate_summary auth_domains={} users={} roles={} role_mappings={} files={} \
         problems={} inconvertible={}",
        summary.auth_domains,
        summary.users,
        summary.roles,
        summary.role_mappings,
        summary.files,
        summary.problems,
        summary.inconvertible
    )
}
