use std::cell::RefCell;
use std::fmt::{self, Display, Formatter};

use serde::Serialize;
use thiserror::Error;

/// What went wrong at one document path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValidationErrorKind {
    MissingAttribute,
    InvalidType { expected: String, actual: String },
    InvalidValue { expected: String, actual: String },
    InvalidTreeStructure { detail: String },
    Custom { message: String },
}

impl Display for ValidationErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ValidationErrorKind::MissingAttribute => f.write_str("Required attribute is missing"),
            ValidationErrorKind::InvalidType { expected, actual } => {
                write!(f, "Invalid value; expected: {expected}; found: {actual}")
            }
            ValidationErrorKind::InvalidValue { expected, actual } => {
                write!(f, "Invalid value '{actual}'; expected: {expected}")
            }
            ValidationErrorKind::InvalidTreeStructure { detail } => {
                write!(f, "Invalid tree structure: {detail}")
            }
            ValidationErrorKind::Custom { message } => f.write_str(message),
        }
    }
}

/// A single path-qualified validation problem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationError {
    /// Absolute dotted path from the document root; empty for the root itself.
    pub path: String,
    #[serde(flatten)]
    pub kind: ValidationErrorKind,
}

impl ValidationError {
    pub fn new(path: impl Into<String>, kind: ValidationErrorKind) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }

    pub fn missing(path: impl Into<String>) -> Self {
        Self::new(path, ValidationErrorKind::MissingAttribute)
    }

    pub fn invalid_type(path: impl Into<String>, expected: &str, actual: &str) -> Self {
        Self::new(
            path,
            ValidationErrorKind::InvalidType {
                expected: expected.to_string(),
                actual: actual.to_string(),
            },
        )
    }

    pub fn invalid_value(
        path: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        Self::new(
            path,
            ValidationErrorKind::InvalidValue {
                expected: expected.into(),
                actual: actual.into(),
            },
        )
    }

    pub fn custom(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(
            path,
            ValidationErrorKind::Custom {
                message: message.into(),
            },
        )
    }
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}", self.kind)
        } else {
            write!(f, "{}: {}", self.path, self.kind)
        }
    }
}

/// Accumulates every validation problem of one parse session.
///
/// Shared by reference across all nodes of a session. Not `Sync`: each
/// session owns its own accumulator.
#[derive(Debug, Default)]
pub struct ValidationErrors {
    entries: RefCell<Vec<ValidationError>>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `error`; an identical entry is only kept once.
    pub fn add(&self, error: ValidationError) {
        let mut entries = self.entries.borrow_mut();
        if !entries.contains(&error) {
            entries.push(error);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn errors(&self) -> Vec<ValidationError> {
        self.entries.borrow().clone()
    }

    /// Turn the accumulated errors into a failure. Does not clear them, so
    /// calling it again yields the same result.
    pub fn throw_exception_for_present_errors(&self) -> Result<(), ConfigValidationError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(ConfigValidationError {
                file: None,
                errors: self.errors(),
            })
        }
    }
}

/// Aggregate failure carrying every problem found in one parse session.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
pub struct ConfigValidationError {
    pub file: Option<String>,
    pub errors: Vec<ValidationError>,
}

impl ConfigValidationError {
    pub fn with_file(mut self, file: impl Into<String>) -> Self {
        self.file = Some(file.into());
        self
    }

    /// Messages without any location, for comparing validation outcomes.
    pub fn messages(&self) -> Vec<String> {
        self.errors.iter().map(|error| error.kind.to_string()).collect()
    }
}

impl Display for ConfigValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match &self.file {
            Some(file) => write!(f, "invalid configuration in {file}")?,
            None => f.write_str("invalid configuration")?,
        }
        write!(f, " ({} error(s))", self.errors.len())?;
        for error in &self.errors {
            write!(f, "\n  {error}")?;
        }
        Ok(())
    }
}
