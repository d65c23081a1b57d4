use config_trace::{
    parse_document, ConfigEnum, ConfigValidationError, DocNode, OptTraceable, ParseOptions,
    Traceable, TraceableDocNode, ValidationErrorKind,
};
use indexmap::IndexMap;

const RULE_KINDS: &str = "Rule must have exactly one of: [any, all, except, field]";
const FIELD_KINDS: &str =
    "Any of: [username, dn, groups, realm.name, host, remote_ip, metadata.*]";

/// What a `field` rule compares against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldTarget {
    Username,
    Dn,
    Groups,
    RealmName,
    Host,
    RemoteIp,
    Metadata(String),
}

impl FieldTarget {
    fn from_key(key: &str) -> Option<Self> {
        match key {
            "username" => Some(FieldTarget::Username),
            "dn" => Some(FieldTarget::Dn),
            "groups" => Some(FieldTarget::Groups),
            "realm.name" => Some(FieldTarget::RealmName),
            "host" => Some(FieldTarget::Host),
            "remote_ip" => Some(FieldTarget::RemoteIp),
            _ => key
                .strip_prefix("metadata.")
                .filter(|name| !name.is_empty())
                .map(|name| FieldTarget::Metadata(name.to_string())),
        }
    }

    pub fn key(&self) -> String {
        match self {
            FieldTarget::Username => "username".to_string(),
            FieldTarget::Dn => "dn".to_string(),
            FieldTarget::Groups => "groups".to_string(),
            FieldTarget::RealmName => "realm.name".to_string(),
            FieldTarget::Host => "host".to_string(),
            FieldTarget::RemoteIp => "remote_ip".to_string(),
            FieldTarget::Metadata(name) => format!("metadata.{name}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldRule {
    pub target: FieldTarget,
    pub values: Traceable<Vec<Traceable<String>>>,
}

impl FieldRule {
    fn parse(node: &TraceableDocNode<'_>) -> Option<Self> {
        let keys = node.keys();
        let [key] = keys.as_slice() else {
            node.add_error(ValidationErrorKind::Custom {
                message: "Field rule must name exactly one field".to_string(),
            });
            return None;
        };
        let values = node.get(key).required().as_list_of_strings();
        let Some(target) = FieldTarget::from_key(key) else {
            node.add_error_at(
                key,
                ValidationErrorKind::InvalidValue {
                    expected: FIELD_KINDS.to_string(),
                    actual: key.to_string(),
                },
            );
            return None;
        };
        Some(Self {
            target,
            values: values?,
        })
    }
}

/// Role mapping rule tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Rule {
    Any(Vec<Traceable<Rule>>),
    All(Vec<Traceable<Rule>>),
    Except(Box<Traceable<Rule>>),
    Field(FieldRule),
}

impl Rule {
    pub fn parse(node: &TraceableDocNode<'_>) -> Option<Self> {
        let keys = node.keys();
        let [key] = keys.as_slice() else {
            node.add_error(ValidationErrorKind::Custom {
                message: RULE_KINDS.to_string(),
            });
            return None;
        };
        let attribute = node.get(key).required();
        match *key {
            "any" => attribute
                .as_list_of(Rule::parse)
                .map(|rules| Rule::Any(rules.into_value())),
            "all" => attribute
                .as_list_of(Rule::parse)
                .map(|rules| Rule::All(rules.into_value())),
            "except" => attribute
                .as_parsed(Rule::parse)
                .map(|rule| Rule::Except(Box::new(rule))),
            "field" => attribute
                .as_parsed(FieldRule::parse)
                .map(|rule| Rule::Field(rule.into_value())),
            _ => {
                node.add_error(ValidationErrorKind::Custom {
                    message: RULE_KINDS.to_string(),
                });
                None
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateFormat {
    String,
    Json,
}

impl ConfigEnum for TemplateFormat {
    fn variants() -> &'static [(&'static str, Self)] {
        &[("string", TemplateFormat::String), ("json", TemplateFormat::Json)]
    }
}

/// Mustache role template; Search Guard has no equivalent.
#[derive(Debug, Clone, PartialEq)]
pub struct RoleTemplate {
    pub format: Traceable<TemplateFormat>,
    pub script: OptTraceable<DocNode>,
}

impl RoleTemplate {
    fn parse(node: &TraceableDocNode<'_>) -> Option<Self> {
        Some(Self {
            format: node.get("format").as_enum_or(TemplateFormat::String),
            script: node.get("template").as_doc(),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum MappedRoles {
    Roles(Vec<Traceable<String>>),
    Templates(Vec<Traceable<RoleTemplate>>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct RoleMapping {
    pub enabled: Traceable<bool>,
    pub roles: Traceable<MappedRoles>,
    pub rules: Traceable<Rule>,
    pub metadata: OptTraceable<IndexMap<String, Traceable<DocNode>>>,
}

impl RoleMapping {
    pub fn parse(node: &TraceableDocNode<'_>) -> Option<Self> {
        let enabled = node.get("enabled").as_bool_or(true);
        let rules = node.get("rules").required().as_parsed(Rule::parse);
        let metadata = node
            .get("metadata")
            .as_map_of(|value| Some(value.doc().clone()));

        let roles_attr = node.get("roles");
        let templates_attr = node.get("role_templates");
        let roles = match (roles_attr.is_present(), templates_attr.is_present()) {
            (true, true) => {
                node.add_error_at(
                    "roles",
                    ValidationErrorKind::Custom {
                        message: "Role mapping cannot have both 'roles' and 'role_templates'"
                            .to_string(),
                    },
                );
                None
            }
            (true, false) => roles_attr
                .required()
                .as_list_of_strings()
                .map(|roles| roles.map(MappedRoles::Roles)),
            (false, true) => templates_attr
                .required()
                .as_list_of(RoleTemplate::parse)
                .map(|templates| templates.map(MappedRoles::Templates)),
            (false, false) => {
                node.add_error_at("roles", ValidationErrorKind::MissingAttribute);
                None
            }
        };

        Some(Self {
            enabled,
            roles: roles?,
            rules: rules?,
            metadata,
        })
    }
}

/// Mapping name to definition, as returned by `GET _security/role_mapping`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RoleMappings {
    pub mappings: IndexMap<String, Traceable<RoleMapping>>,
}

impl RoleMappings {
    pub const FILE_NAME: &'static str = "role_mapping.json";

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
        let mappings = node
            .as_attribute()
            .as_map_of(RoleMapping::parse)
            .into_option()?;
        Some(Self { mappings })
    }

    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }
}
