//! Provenance-tracking parsing of configuration documents.
//!
//! Documents are loaded into a generic [`DocNode`] tree. A
//! [`TraceableDocNode`] walks that tree and yields [`Traceable`] values that
//! remember the file and dotted path they came from. Every validation problem
//! of a parse session is collected in one [`ValidationErrors`] and raised once,
//! as a [`ConfigValidationError`], after the whole document has been visited.

pub mod errors;
pub mod node;
pub mod parser;
pub mod source;
pub mod traceable;
pub mod tree;
pub mod writer;

pub use errors::{ConfigValidationError, ValidationError, ValidationErrorKind, ValidationErrors};
pub use node::{
    parse_document, parse_expanded_document, Attribute, ConfigEnum, ParseOptions,
    RequiredAttribute, TraceableDocNode,
};
pub use parser::{parse_file, parse_json, parse_yaml, ParseError};
pub use source::{DocPath, PathSegment, Source};
pub use traceable::{OptTraceable, Traceable, Traced, ValueOrigin};
pub use tree::DocNode;
pub use writer::{write_file, write_json, write_yaml, WriteError};
