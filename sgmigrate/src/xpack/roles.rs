use config_trace::{
    parse_document, ConfigValidationError, DocNode, OptTraceable, ParseOptions, Traceable,
    TraceableDocNode,
};
use indexmap::IndexMap;

/// `field_security` of an index privilege entry.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSecurity {
    pub grant: OptTraceable<Vec<Traceable<String>>>,
    pub except: OptTraceable<Vec<Traceable<String>>>,
}

impl FieldSecurity {
    fn parse(node: &TraceableDocNode<'_>) -> Option<Self> {
        Some(Self {
            grant: node.get("grant").as_list_of_strings(),
            except: node.get("except").as_list_of_strings(),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndexPrivileges {
    pub names: Traceable<Vec<Traceable<String>>>,
    pub privileges: Traceable<Vec<Traceable<String>>>,
    pub field_security: OptTraceable<FieldSecurity>,
    /// Document level security query, a JSON string or an inline object.
    pub query: OptTraceable<DocNode>,
    pub allow_restricted_indices: Traceable<bool>,
}

impl IndexPrivileges {
    fn parse(node: &TraceableDocNode<'_>) -> Option<Self> {
        let names = node.get("names").required().as_list_of_strings();
        let privileges = node.get("privileges").required().as_list_of_strings();
        let field_security = node.get("field_security").as_parsed(FieldSecurity::parse);
        let query = node.get("query").as_doc();
        let allow_restricted_indices = node.get("allow_restricted_indices").as_bool_or(false);
        Some(Self {
            names: names?,
            privileges: privileges?,
            field_security,
            query,
            allow_restricted_indices,
        })
    }
}

/// Kibana and other application privileges; never migrated.
#[derive(Debug, Clone, PartialEq)]
pub struct ApplicationPrivileges {
    pub application: Traceable<String>,
    pub privileges: Traceable<Vec<Traceable<String>>>,
    pub resources: Traceable<Vec<Traceable<String>>>,
}

impl ApplicationPrivileges {
    fn parse(node: &TraceableDocNode<'_>) -> Option<Self> {
        let application = node.get("application").required().as_string();
        let privileges = node.get("privileges").required().as_list_of_strings();
        let resources = node.get("resources").required().as_list_of_strings();
        Some(Self {
            application: application?,
            privileges: privileges?,
            resources: resources?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Role {
    pub cluster: Traceable<Vec<Traceable<String>>>,
    pub indices: Traceable<Vec<Traceable<IndexPrivileges>>>,
    pub applications: OptTraceable<Vec<Traceable<ApplicationPrivileges>>>,
    pub run_as: OptTraceable<Vec<Traceable<String>>>,
    pub metadata: OptTraceable<IndexMap<String, Traceable<DocNode>>>,
    pub description: OptTraceable<String>,
}

impl Role {
    pub fn parse(node: &TraceableDocNode<'_>) -> Option<Self> {
        let cluster = node.get("cluster").required().as_list_of_strings();
        let indices = node
            .get("indices")
            .required()
            .as_list_of(IndexPrivileges::parse);
        let applications = node
            .get("applications")
            .as_list_of(ApplicationPrivileges::parse);
        Some(Self {
            cluster: cluster?,
            indices: indices?,
            applications,
            run_as: node.get("run_as").as_list_of_strings(),
            metadata: node
                .get("metadata")
                .as_map_of(|value| Some(value.doc().clone())),
            description: node.get("description").as_string(),
        })
    }

    /// Built-in roles carry `metadata._reserved: true`.
    pub fn is_reserved(&self) -> bool {
        self.metadata
            .get()
            .and_then(|metadata| metadata.get("_reserved"))
            .is_some_and(|reserved| matches!(reserved.get(), DocNode::Bool(true)))
    }
}

/// Role name to definition, as returned by `GET _security/role`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Roles {
    pub roles: IndexMap<String, Traceable<Role>>,
}

impl Roles {
    pub const FILE_NAME: &'static str = "role.json";

    pub fn parse_document(
        doc: &DocNode,
        options: ParseOptions,
    ) -> Result<Traceable<Self>, ConfigValidationError> {
        parse_document(doc, Some(Self::FILE_NAME), options, Self::parse)
    }

    pub fn parse(node: &TraceableDocNode<'_>) -> Option<Self> {
        if node.doc().is_null() {
            return Some(Self::default());
        }
        let roles = node.as_attribute().as_map_of(Role::parse).into_option()?;
        Some(Self { roles })
    }

    pub fn len(&self) -> usize {
        self.roles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::Roles;
    use config_trace::{parse_json, DocNode, ParseOptions};
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_roles_with_index_privileges() {
        let doc = parse_json(
            br#"{
              "logs_reader": {
                "cluster": ["monitor"],
                "indices": [{
                  "names": ["logs-*"],
                  "privileges": ["read", "view_index_metadata"],
                  "field_security": {"grant": ["*"], "except": ["secret"]},
                  "query": "{\"term\": {\"public\": true}}"
                }],
                "run_as": ["bob"],
                "metadata": {"version": 1}
              },
              "superuser": {
                "cluster": ["all"],
                "indices": [
                  {"names": "*", "privileges": ["all"], "allow_restricted_indices": true}
                ],
                "metadata": {"_reserved": true}
              }
            }"#,
        )
        .expect("json");
        let roles = Roles::parse_document(&doc, ParseOptions::default())
            .expect("parse")
            .into_value();

        assert_eq!(roles.len(), 2);
        let reader = roles.roles["logs_reader"].get();
        let index = reader.indices.get()[0].get();
        assert_eq!(index.privileges.get().len(), 2);
        assert!(matches!(index.query.get(), Some(DocNode::String(_))));
        assert_eq!(
            index.names.get()[0].source().full_path_string(),
            "role.json: logs_reader.indices.0.names.0"
        );
        assert!(!reader.is_reserved());

        let superuser = roles.roles["superuser"].get();
        assert!(superuser.is_reserved());
        assert!(*superuser.indices.get()[0].get().allow_restricted_indices.get());
    }

    #[test]
    fn missing_fields_are_reported_per_role_and_index() {
        let doc = parse_json(
            br#"{
              "a": {"indices": []},
              "b": {"cluster": [], "indices": [{"names": ["x"]}, {"privileges": ["read"]}]}
            }"#,
        )
        .expect("json");
        let err = Roles::parse_document(&doc, ParseOptions::default()).unwrap_err();
        let paths: Vec<&str> = err.errors.iter().map(|e| e.path.as_str()).collect();
        assert_eq!(paths, vec!["a.cluster", "b.indices.0.privileges", "b.indices.1.names"]);
    }

    #[test]
    fn null_document_has_no_roles() {
        let roles = Roles::parse_document(&DocNode::Null, ParseOptions::default()).expect("parse");
        assert!(roles.get().is_empty());
    }
}
