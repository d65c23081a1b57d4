use std::sync::Arc;

use indexmap::IndexMap;

use crate::errors::{ConfigValidationError, ValidationError, ValidationErrorKind, ValidationErrors};
use crate::source::{DocPath, PathSegment, Source};
use crate::traceable::{OptTraceable, Traceable};
use crate::tree::DocNode;

const EXPECT_STRING: &str = "a string value";
const EXPECT_BOOLEAN: &str = "true or false";
const EXPECT_INTEGER: &str = "an integer value";
const EXPECT_NUMBER: &str = "a numeric value";
const EXPECT_LIST: &str = "a list";
const EXPECT_OBJECT: &str = "an object";

/// Knobs shared by every node of one parse session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseOptions {
    /// Mark substituted defaults as [`crate::ValueOrigin::Defaulted`].
    pub track_defaults: bool,
}

/// A closed set of string values accepted case-insensitively.
pub trait ConfigEnum: Sized + Copy + 'static {
    fn variants() -> &'static [(&'static str, Self)];

    fn config_name(self) -> &'static str
    where
        Self: PartialEq,
    {
        Self::variants()
            .iter()
            .find(|(_, variant)| *variant == self)
            .map(|(name, _)| *name)
            .unwrap_or("")
    }
}

#[derive(Clone)]
struct Session<'a> {
    file: Option<Arc<str>>,
    errors: &'a ValidationErrors,
    options: ParseOptions,
}

impl Session<'_> {
    fn source(&self, path: &DocPath) -> Source {
        match &self.file {
            Some(file) => Source::Config {
                file: Arc::clone(file),
                path: path.clone(),
            },
            None => Source::None,
        }
    }

    fn error(&self, path: &DocPath, kind: ValidationErrorKind) {
        self.errors.add(ValidationError::new(path.to_string(), kind));
    }

    fn type_error(&self, path: &DocPath, expected: &str, actual: &DocNode) {
        self.errors.add(ValidationError::invalid_type(
            path.to_string(),
            expected,
            actual.type_name(),
        ));
    }
}

/// Navigator over a document tree that yields traced, typed values and
/// collects every validation problem into the session's [`ValidationErrors`].
#[derive(Clone)]
pub struct TraceableDocNode<'a> {
    node: &'a DocNode,
    path: DocPath,
    session: Session<'a>,
}

impl<'a> TraceableDocNode<'a> {
    /// Root node of a session. Without a file label all sources are
    /// [`Source::None`]; error paths are tracked either way.
    pub fn new(
        node: &'a DocNode,
        file: Option<&str>,
        errors: &'a ValidationErrors,
        options: ParseOptions,
    ) -> Self {
        Self {
            node,
            path: DocPath::root(),
            session: Session {
                file: file.map(Arc::from),
                errors,
                options,
            },
        }
    }

    pub fn doc(&self) -> &'a DocNode {
        self.node
    }

    pub fn path(&self) -> &DocPath {
        &self.path
    }

    pub fn source(&self) -> Source {
        self.session.source(&self.path)
    }

    /// Last segment of this node's path when it is a mapping key.
    pub fn key(&self) -> Option<&str> {
        match self.path.segments().last() {
            Some(PathSegment::Key(key)) => Some(key),
            _ => None,
        }
    }

    pub fn errors(&self) -> &'a ValidationErrors {
        self.session.errors
    }

    pub fn options(&self) -> ParseOptions {
        self.session.options
    }

    /// Record an error at this node's own path.
    pub fn add_error(&self, kind: ValidationErrorKind) {
        self.session.error(&self.path, kind);
    }

    /// Record an error at `path` relative to this node.
    pub fn add_error_at(&self, path: &str, kind: ValidationErrorKind) {
        let mut target = self.path.clone();
        for part in path.split('.') {
            target = target.child(part);
        }
        self.session.error(&target, kind);
    }

    /// Keys of a mapping node in document order; empty for other shapes.
    pub fn keys(&self) -> Vec<&'a str> {
        self.node
            .as_map()
            .map(|map| map.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Field accessor at a dotted `path` relative to this node. A literal key
    /// containing dots wins over nested navigation.
    pub fn get(&self, path: &str) -> Attribute<'a> {
        let Some(map) = self.node.as_map() else {
            if !self.node.is_null() {
                self.session.type_error(&self.path, EXPECT_OBJECT, self.node);
            }
            return self.attribute(None, self.path.child(path));
        };
        if let Some(found) = map.get(path) {
            return self.attribute(Some(found), self.path.child(path));
        }

        let parts: Vec<&str> = path.split('.').filter(|part| !part.is_empty()).collect();
        let mut current = self.node;
        let mut current_path = self.path.clone();
        for (index, part) in parts.iter().enumerate() {
            let next_path = current_path.child(*part);
            let next = match current {
                DocNode::Map(map) => map.get(*part),
                DocNode::Null => None,
                other => {
                    self.session.type_error(&current_path, EXPECT_OBJECT, other);
                    None
                }
            };
            match next {
                Some(next) => current = next,
                None => return self.attribute(None, extend(next_path, &parts[index + 1..])),
            }
            current_path = next_path;
        }
        self.attribute(Some(current), current_path)
    }

    /// View this node itself as a field.
    pub fn as_attribute(&self) -> Attribute<'a> {
        self.attribute(Some(self.node), self.path.clone())
    }

    fn attribute(&self, node: Option<&'a DocNode>, path: DocPath) -> Attribute<'a> {
        Attribute {
            node: node.filter(|node| !node.is_null()),
            parent_path: self.path.clone(),
            path,
            session: self.session.clone(),
            secret: false,
        }
    }

    pub fn throw_exception_for_present_errors(&self) -> Result<(), ConfigValidationError> {
        self.session.errors.throw_exception_for_present_errors()
    }
}

fn extend(mut path: DocPath, parts: &[&str]) -> DocPath {
    for part in parts {
        path = path.child(*part);
    }
    path
}

/// An optional field. Missing fields never produce errors.
#[derive(Clone)]
pub struct Attribute<'a> {
    node: Option<&'a DocNode>,
    parent_path: DocPath,
    path: DocPath,
    session: Session<'a>,
    secret: bool,
}

impl<'a> Attribute<'a> {
    pub fn is_present(&self) -> bool {
        self.node.is_some()
    }

    /// Source of the field itself.
    pub fn source(&self) -> Source {
        self.session.source(&self.path)
    }

    /// Values from this field are masked in diagnostics.
    pub fn secret(mut self) -> Self {
        self.secret = true;
        self
    }

    pub fn required(self) -> RequiredAttribute<'a> {
        RequiredAttribute { inner: self }
    }

    pub fn as_string(&self) -> OptTraceable<String> {
        self.convert(|node, path, session| scalar_string(node, path, session))
    }

    pub fn as_bool(&self) -> OptTraceable<bool> {
        self.convert(scalar_bool)
    }

    pub fn as_i64(&self) -> OptTraceable<i64> {
        self.convert(scalar_i64)
    }

    pub fn as_i32(&self) -> OptTraceable<i32> {
        self.convert(scalar_i32)
    }

    pub fn as_f64(&self) -> OptTraceable<f64> {
        self.convert(scalar_f64)
    }

    pub fn as_enum<E: ConfigEnum>(&self) -> OptTraceable<E> {
        self.convert(scalar_enum::<E>)
    }

    pub fn as_string_or(&self, default: &str) -> Traceable<String> {
        self.or_default(self.as_string(), default.to_string())
    }

    pub fn as_bool_or(&self, default: bool) -> Traceable<bool> {
        self.or_default(self.as_bool(), default)
    }

    pub fn as_i32_or(&self, default: i32) -> Traceable<i32> {
        self.or_default(self.as_i32(), default)
    }

    pub fn as_enum_or<E: ConfigEnum>(&self, default: E) -> Traceable<E> {
        self.or_default(self.as_enum(), default)
    }

    /// The raw subtree.
    pub fn as_doc(&self) -> OptTraceable<DocNode> {
        self.convert(|node, _, _| Some(node.clone()))
    }

    /// Run a nested parser at this field's position.
    pub fn as_parsed<T>(
        &self,
        parser: impl FnOnce(&TraceableDocNode<'a>) -> Option<T>,
    ) -> OptTraceable<T> {
        let Some(node) = self.node else {
            return self.absent();
        };
        let child = self.node_at(node, self.path.clone());
        self.present(parser(&child))
    }

    /// Each element is parsed at `path.<index>`; failed elements are left out
    /// after their errors have been recorded. A lone scalar is a one-element list.
    pub fn as_list_of<T>(
        &self,
        parser: impl Fn(&TraceableDocNode<'a>) -> Option<T>,
    ) -> OptTraceable<Vec<Traceable<T>>> {
        let Some(node) = self.node else {
            return self.absent();
        };
        let items: Vec<(usize, &'a DocNode)> = match node {
            DocNode::List(items) => items.iter().enumerate().collect(),
            DocNode::Map(_) => {
                self.session.type_error(&self.path, EXPECT_LIST, node);
                return self.present(None);
            }
            scalar => vec![(0, scalar)],
        };

        let parsed = items
            .into_iter()
            .filter_map(|(index, item)| {
                let child = self.node_at(item, self.path.child(index));
                let source = child.source();
                parser(&child).map(|value| self.wrap(Traceable::of(source, value)))
            })
            .collect();
        self.present(Some(parsed))
    }

    pub fn as_list_of_strings(&self) -> OptTraceable<Vec<Traceable<String>>> {
        self.as_list_of(|child| scalar_string(child.node, &child.path, &child.session))
    }

    /// Parse every entry of a mapping at `path.<key>`.
    pub fn as_map_of<T>(
        &self,
        parser: impl Fn(&TraceableDocNode<'a>) -> Option<T>,
    ) -> OptTraceable<IndexMap<String, Traceable<T>>> {
        let Some(node) = self.node else {
            return self.absent();
        };
        let Some(map) = node.as_map() else {
            self.session.type_error(&self.path, EXPECT_OBJECT, node);
            return self.present(None);
        };

        let parsed = map
            .iter()
            .filter_map(|(key, value)| {
                let child = self.node_at(value, self.path.child(key.as_str()));
                let source = child.source();
                parser(&child).map(|parsed| (key.clone(), self.wrap(Traceable::of(source, parsed))))
            })
            .collect();
        self.present(Some(parsed))
    }

    fn convert<T>(
        &self,
        f: impl FnOnce(&'a DocNode, &DocPath, &Session<'a>) -> Option<T>,
    ) -> OptTraceable<T> {
        match self.node {
            None => self.absent(),
            Some(node) => self.present(f(node, &self.path, &self.session)),
        }
    }

    fn or_default<T>(&self, value: OptTraceable<T>, default: T) -> Traceable<T> {
        value.or_default_value(default, self.session.options.track_defaults)
    }

    fn node_at(&self, node: &'a DocNode, path: DocPath) -> TraceableDocNode<'a> {
        TraceableDocNode {
            node,
            path,
            session: self.session.clone(),
        }
    }

    // Absence is attributed to the parent, there is nothing deeper to point at.
    fn absent<T>(&self) -> OptTraceable<T> {
        let empty = OptTraceable::empty(self.session.source(&self.parent_path));
        if self.secret {
            empty.into_secret()
        } else {
            empty
        }
    }

    fn present<T>(&self, value: Option<T>) -> OptTraceable<T> {
        let traced = OptTraceable::of_nullable(self.source(), value);
        if self.secret {
            traced.into_secret()
        } else {
            traced
        }
    }

    fn wrap<T>(&self, value: Traceable<T>) -> Traceable<T> {
        if self.secret {
            value.into_secret()
        } else {
            value
        }
    }
}

/// A mandatory field. Conversions return `None` once an error is recorded so
/// parsers can short-circuit with `?` after reading all their fields.
#[derive(Clone)]
pub struct RequiredAttribute<'a> {
    inner: Attribute<'a>,
}

impl<'a> RequiredAttribute<'a> {
    pub fn as_string(&self) -> Option<Traceable<String>> {
        self.require(self.inner.as_string())
    }

    pub fn as_bool(&self) -> Option<Traceable<bool>> {
        self.require(self.inner.as_bool())
    }

    pub fn as_i64(&self) -> Option<Traceable<i64>> {
        self.require(self.inner.as_i64())
    }

    pub fn as_i32(&self) -> Option<Traceable<i32>> {
        self.require(self.inner.as_i32())
    }

    pub fn as_f64(&self) -> Option<Traceable<f64>> {
        self.require(self.inner.as_f64())
    }

    pub fn as_enum<E: ConfigEnum>(&self) -> Option<Traceable<E>> {
        self.require(self.inner.as_enum())
    }

    pub fn as_doc(&self) -> Option<Traceable<DocNode>> {
        self.require(self.inner.as_doc())
    }

    pub fn as_parsed<T>(
        &self,
        parser: impl FnOnce(&TraceableDocNode<'a>) -> Option<T>,
    ) -> Option<Traceable<T>> {
        self.require(self.inner.as_parsed(parser))
    }

    pub fn as_list_of<T>(
        &self,
        parser: impl Fn(&TraceableDocNode<'a>) -> Option<T>,
    ) -> Option<Traceable<Vec<Traceable<T>>>> {
        self.require(self.inner.as_list_of(parser))
    }

    pub fn as_list_of_strings(&self) -> Option<Traceable<Vec<Traceable<String>>>> {
        self.require(self.inner.as_list_of_strings())
    }

    pub fn as_map_of<T>(
        &self,
        parser: impl Fn(&TraceableDocNode<'a>) -> Option<T>,
    ) -> Option<Traceable<IndexMap<String, Traceable<T>>>> {
        self.require(self.inner.as_map_of(parser))
    }

    fn require<T>(&self, value: OptTraceable<T>) -> Option<Traceable<T>> {
        if !self.inner.is_present() {
            self.inner
                .session
                .error(&self.inner.path, ValidationErrorKind::MissingAttribute);
            return None;
        }
        value.into_traceable()
    }
}

fn scalar_string(node: &DocNode, path: &DocPath, session: &Session<'_>) -> Option<String> {
    match node {
        DocNode::String(_) | DocNode::Int(_) | DocNode::Float(_) | DocNode::Bool(_) => {
            Some(node.scalar_text())
        }
        other => {
            session.type_error(path, EXPECT_STRING, other);
            None
        }
    }
}

fn scalar_bool(node: &DocNode, path: &DocPath, session: &Session<'_>) -> Option<bool> {
    match node {
        DocNode::Bool(value) => Some(*value),
        DocNode::String(text) if text.eq_ignore_ascii_case("true") => Some(true),
        DocNode::String(text) if text.eq_ignore_ascii_case("false") => Some(false),
        DocNode::String(text) => {
            session.error(
                path,
                ValidationErrorKind::InvalidValue {
                    expected: EXPECT_BOOLEAN.to_string(),
                    actual: text.clone(),
                },
            );
            None
        }
        other => {
            session.type_error(path, EXPECT_BOOLEAN, other);
            None
        }
    }
}

fn scalar_i64(node: &DocNode, path: &DocPath, session: &Session<'_>) -> Option<i64> {
    match node {
        DocNode::Int(value) => Some(*value),
        DocNode::Float(value)
            if value.fract() == 0.0 && *value >= i64::MIN as f64 && *value <= i64::MAX as f64 =>
        {
            Some(*value as i64)
        }
        DocNode::String(text) => match text.trim().parse::<i64>() {
            Ok(value) => Some(value),
            Err(_) => {
                session.error(
                    path,
                    ValidationErrorKind::InvalidValue {
                        expected: EXPECT_INTEGER.to_string(),
                        actual: text.clone(),
                    },
                );
                None
            }
        },
        other => {
            session.type_error(path, EXPECT_INTEGER, other);
            None
        }
    }
}

fn scalar_i32(node: &DocNode, path: &DocPath, session: &Session<'_>) -> Option<i32> {
    let wide = scalar_i64(node, path, session)?;
    match i32::try_from(wide) {
        Ok(value) => Some(value),
        Err(_) => {
            session.error(
                path,
                ValidationErrorKind::InvalidValue {
                    expected: format!("an integer between {} and {}", i32::MIN, i32::MAX),
                    actual: wide.to_string(),
                },
            );
            None
        }
    }
}

fn scalar_f64(node: &DocNode, path: &DocPath, session: &Session<'_>) -> Option<f64> {
    match node {
        DocNode::Int(value) => Some(*value as f64),
        DocNode::Float(value) => Some(*value),
        DocNode::String(text) if text.trim().parse::<f64>().is_ok() => text.trim().parse().ok(),
        other => {
            session.type_error(path, EXPECT_NUMBER, other);
            None
        }
    }
}

fn scalar_enum<E: ConfigEnum>(node: &DocNode, path: &DocPath, session: &Session<'_>) -> Option<E> {
    let text = scalar_string(node, path, session)?;
    let found = E::variants()
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(&text))
        .map(|(_, variant)| *variant);
    if found.is_none() {
        let names: Vec<&str> = E::variants().iter().map(|(name, _)| *name).collect();
        session.error(
            path,
            ValidationErrorKind::InvalidValue {
                expected: format!("Any of: [{}]", names.join(", ")),
                actual: text,
            },
        );
    }
    found
}

/// Run `parser` over one document as a single session and fail with every
/// recorded problem at once.
pub fn parse_document<T>(
    doc: &DocNode,
    file: Option<&str>,
    options: ParseOptions,
    parser: impl FnOnce(&TraceableDocNode<'_>) -> Option<T>,
) -> Result<Traceable<T>, ConfigValidationError> {
    let errors = ValidationErrors::new();
    let root = TraceableDocNode::new(doc, file, &errors, options);
    let parsed = parser(&root);
    finish(&errors, file, root.source(), parsed)
}

/// Like [`parse_document`], but flat dotted keys are expanded first and every
/// scalar/mapping collision is recorded as an invalid tree structure.
pub fn parse_expanded_document<T>(
    doc: &DocNode,
    file: Option<&str>,
    options: ParseOptions,
    parser: impl FnOnce(&TraceableDocNode<'_>) -> Option<T>,
) -> Result<Traceable<T>, ConfigValidationError> {
    let (expanded, conflicts) = doc.expand_dotted_keys();
    let errors = ValidationErrors::new();
    for conflict in conflicts {
        errors.add(ValidationError::new(
            conflict,
            ValidationErrorKind::InvalidTreeStructure {
                detail: "a value and an object were both given for this key".to_string(),
            },
        ));
    }
    let root = TraceableDocNode::new(&expanded, file, &errors, options);
    let parsed = parser(&root);
    finish(&errors, file, root.source(), parsed)
}

fn finish<T>(
    errors: &ValidationErrors,
    file: Option<&str>,
    source: Source,
    parsed: Option<T>,
) -> Result<Traceable<T>, ConfigValidationError> {
    let labelled = |err: ConfigValidationError| match file {
        Some(file) => err.with_file(file),
        None => err,
    };
    errors.throw_exception_for_present_errors().map_err(labelled)?;
    match parsed {
        Some(value) => Ok(Traceable::of(source, value)),
        None => Err(labelled(ConfigValidationError {
            file: None,
            errors: vec![ValidationError::custom("", "document could not be parsed")],
        })),
    }
}
