/// How one X-Pack privilege carries over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrivilegeMapping {
    Exact(&'static str),
    /// Nearest Search Guard action group; broader or narrower than the source.
    Approximate(&'static str),
    /// Transport action names and patterns, copied as they are.
    Action,
    Unknown,
}

const CLUSTER: &[(&str, PrivilegeMapping)] = &[
    ("all", PrivilegeMapping::Exact("SGS_CLUSTER_ALL")),
    ("monitor", PrivilegeMapping::Exact("SGS_CLUSTER_MONITOR")),
    (
        "manage_index_templates",
        PrivilegeMapping::Exact("SGS_CLUSTER_MANAGE_INDEX_TEMPLATES"),
    ),
    ("manage_ingest_pipelines", PrivilegeMapping::Exact("SGS_CLUSTER_MANAGE_PIPELINES")),
    ("manage_pipeline", PrivilegeMapping::Exact("SGS_CLUSTER_MANAGE_PIPELINES")),
    ("manage_ilm", PrivilegeMapping::Exact("SGS_CLUSTER_MANAGE_ILM")),
    ("read_ilm", PrivilegeMapping::Exact("SGS_CLUSTER_READ_ILM")),
    ("create_snapshot", PrivilegeMapping::Approximate("SGS_MANAGE_SNAPSHOTS")),
    ("manage", PrivilegeMapping::Approximate("SGS_CLUSTER_ALL")),
];

const INDEX: &[(&str, PrivilegeMapping)] = &[
    ("all", PrivilegeMapping::Exact("SGS_INDICES_ALL")),
    ("read", PrivilegeMapping::Exact("SGS_READ")),
    ("write", PrivilegeMapping::Exact("SGS_WRITE")),
    ("create_index", PrivilegeMapping::Exact("SGS_CREATE_INDEX")),
    ("delete", PrivilegeMapping::Exact("SGS_DELETE")),
    ("manage", PrivilegeMapping::Exact("SGS_MANAGE")),
    ("monitor", PrivilegeMapping::Exact("SGS_INDICES_MONITOR")),
    ("index", PrivilegeMapping::Approximate("SGS_WRITE")),
    ("create", PrivilegeMapping::Approximate("SGS_WRITE")),
    ("create_doc", PrivilegeMapping::Approximate("SGS_WRITE")),
    ("delete_index", PrivilegeMapping::Approximate("SGS_MANAGE")),
    ("view_index_metadata", PrivilegeMapping::Approximate("SGS_INDICES_MONITOR")),
];

pub fn cluster_privilege(name: &str) -> PrivilegeMapping {
    lookup(CLUSTER, name)
}

pub fn index_privilege(name: &str) -> PrivilegeMapping {
    lookup(INDEX, name)
}

/// `indices:data/read/*` and `cluster:monitor/health` style names.
pub fn is_action_pattern(name: &str) -> bool {
    name.contains(':')
}

fn lookup(table: &[(&str, PrivilegeMapping)], name: &str) -> PrivilegeMapping {
    if is_action_pattern(name) {
        return PrivilegeMapping::Action;
    }
    table
        .iter()
        .find(|(privilege, _)| privilege.eq_ignore_ascii_case(name))
        .map(|(_, mapping)| *mapping)
        .unwrap_or(PrivilegeMapping::Unknown)
}

#[cfg(test)]
mod tests {
    use super::{cluster_privilege, index_privilege, PrivilegeMapping};

    #[test]
    fn known_privileges_resolve() {
        assert_eq!(cluster_privilege("monitor"), PrivilegeMapping::Exact("SGS_CLUSTER_MONITOR"));
        assert_eq!(index_privilege("READ"), PrivilegeMapping::Exact("SGS_READ"));
        assert_eq!(
            index_privilege("view_index_metadata"),
            PrivilegeMapping::Approximate("SGS_INDICES_MONITOR")
        );
    }

    #[test]
    fn actions_pass_through_and_rest_is_unknown() {
        assert_eq!(index_privilege("indices:data/read/*"), PrivilegeMapping::Action);
        assert_eq!(cluster_privilege("manage_ccr"), PrivilegeMapping::Unknown);
        assert_eq!(cluster_privilege("token:create"), PrivilegeMapping::Action);
    }
}
