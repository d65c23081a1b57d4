use std::fmt::{self, Display, Formatter};
use std::sync::Arc;

use serde::Serialize;

/// One step of a document path: a mapping key or a list index.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

impl Display for PathSegment {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Key(key) => f.write_str(key),
            PathSegment::Index(index) => write!(f, "{index}"),
        }
    }
}

impl From<&str> for PathSegment {
    fn from(value: &str) -> Self {
        PathSegment::Key(value.to_string())
    }
}

impl From<String> for PathSegment {
    fn from(value: String) -> Self {
        PathSegment::Key(value)
    }
}

impl From<usize> for PathSegment {
    fn from(value: usize) -> Self {
        PathSegment::Index(value)
    }
}

/// Absolute position inside a document, root is the empty path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
pub struct DocPath(Vec<PathSegment>);

impl DocPath {
    pub fn root() -> Self {
        Self::default()
    }

    /// Return a new path with `segment` appended. Empty keys are dropped.
    pub fn child(&self, segment: impl Into<PathSegment>) -> Self {
        let segment = segment.into();
        let mut segments = self.0.clone();
        if !matches!(&segment, PathSegment::Key(key) if key.is_empty()) {
            segments.push(segment);
        }
        Self(segments)
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }
}

impl Display for DocPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for (index, segment) in self.0.iter().enumerate() {
            if index > 0 {
                f.write_str(".")?;
            }
            write!(f, "{segment}")?;
        }
        Ok(())
    }
}

/// Where a configuration value came from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum Source {
    /// No provenance is known.
    #[default]
    None,
    /// A position inside a named configuration document.
    Config { file: Arc<str>, path: DocPath },
}

impl Source {
    /// Root of the document identified by `file`.
    pub fn root(file: impl Into<Arc<str>>) -> Self {
        Source::Config {
            file: file.into(),
            path: DocPath::root(),
        }
    }

    /// Return a new source one segment deeper. `None` stays `None`.
    pub fn child(&self, segment: impl Into<PathSegment>) -> Self {
        match self {
            Source::None => Source::None,
            Source::Config { file, path } => Source::Config {
                file: Arc::clone(file),
                path: path.child(segment),
            },
        }
    }

    pub fn file(&self) -> Option<&str> {
        match self {
            Source::None => None,
            Source::Config { file, .. } => Some(file),
        }
    }

    /// Dotted path within the document, empty for the root or no provenance.
    pub fn path_string(&self) -> String {
        match self {
            Source::None => String::new(),
            Source::Config { path, .. } => path.to_string(),
        }
    }

    /// `file: a.b.0.c`, or just `file` for a document root.
    pub fn full_path_string(&self) -> String {
        match self {
            Source::None => "<unknown>".to_string(),
            Source::Config { file, path } if path.is_root() => file.to_string(),
            Source::Config { file, path } => format!("{file}: {path}"),
        }
    }
}

impl Display for Source {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full_path_string())
    }
}

impl Serialize for Source {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.full_path_string())
    }
}

#[cfg(test)]
mod tests {
    use super::{PathSegment, Source};

    #[test]
    fn child_appends_without_touching_parent() {
        let root = Source::root("roles.json");
        let child = root.child("admin").child("indices").child(0usize);
        assert_eq!(root.full_path_string(), "roles.json");
        assert_eq!(child.full_path_string(), "roles.json: admin.indices.0");
        assert_eq!(child.path_string(), "admin.indices.0");
    }

    #[test]
    fn empty_segments_are_never_stored() {
        let source = Source::root("f").child("").child("a");
        match source {
            Source::Config { path, .. } => {
                assert_eq!(path.segments(), &[PathSegment::Key("a".to_string())]);
            }
            Source::None => panic!("expected config source"),
        }
    }

    #[test]
    fn none_has_no_location() {
        assert_eq!(Source::None.child("x"), Source::None);
        assert_eq!(Source::None.to_string(), "<unknown>");
    }
}
