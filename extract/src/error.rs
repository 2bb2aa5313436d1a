//! Error types for descriptor extraction.

use docargs_core::{MergeError, ValidationError};
use thiserror::Error;

/// Errors raised while parsing a documentation comment.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DocstringError {
    /// A `choices=` or `gui_options=` value is not a valid literal.
    #[error("invalid {field} literal for parameter '{param}': {reason}")]
    InvalidLiteral {
        /// Parameter whose header line carries the literal.
        param: String,
        /// Attribute being parsed (`choices` or `gui_options`).
        field: &'static str,
        /// Parser message.
        reason: String,
    },

    /// A `choices=` literal is not a tuple or list.
    #[error("choices for parameter '{0}' must be a tuple or list")]
    ChoicesNotSequence(String),

    /// A `nargs=` count does not fit in a `usize`.
    #[error("invalid nargs for parameter '{param}': {value}")]
    InvalidNargs {
        /// Parameter whose header line carries the count.
        param: String,
        /// Raw count text.
        value: String,
    },
}

/// Errors raised while turning a declaration into a descriptor.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DescribeError {
    /// The callable has no documentation comment.
    #[error("could not find documentation for function '{function}'")]
    MissingDocumentation {
        /// Declared identifier of the callable.
        function: String,
    },

    /// The documentation comment is malformed.
    #[error(transparent)]
    Docstring(#[from] DocstringError),

    /// Signature and documentation disagree.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A declared type cannot be reduced to a single canonical type.
    #[error("failed to resolve type annotation for parameter '{param}': {reason}")]
    UnresolvedType {
        /// Parameter name.
        param: String,
        /// What made the annotation unusable.
        reason: String,
    },

    /// A parameter defaults to an empty tuple or list.
    #[error("parameter '{param}' uses an empty sequence as default; use None instead")]
    EmptySequenceDefault {
        /// Parameter name.
        param: String,
    },

    /// The descriptor could not be merged into the manifest.
    #[error(transparent)]
    Merge(#[from] MergeError),
}
