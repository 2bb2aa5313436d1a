//! Error types for parser compilation, argument parsing and export.

use docargs_core::{CanonicalType, ValidationError};
use docargs_extract::DescribeError;
use docargs_sidecar::SidecarError;
use thiserror::Error;

/// Errors raised while building a parser.
#[derive(Debug, Error)]
pub enum CompileError {
    /// The manifest lacks a field needed to build a command.
    #[error("manifest is missing required field '{0}'")]
    MissingField(String),

    /// The parameter list breaks a structural invariant.
    #[error("invalid parameter list for '{command}': {source}")]
    Validation {
        /// Command being compiled.
        command: String,
        /// First violation found.
        #[source]
        source: ValidationError,
    },

    /// A boolean flag defaults to `true` under [`BooleanMode::Strict`](crate::BooleanMode::Strict).
    #[error("boolean parameter '{0}' defaults to true; a presence flag could never turn it off")]
    TrueDefaultFlag(String),

    /// A string default cannot be converted to the parameter's type.
    #[error("invalid default for parameter '{param}': {reason}")]
    InvalidDefault {
        /// Parameter name.
        param: String,
        /// Conversion failure.
        reason: String,
    },

    /// A parameter accepts zero values.
    #[error("parameter '{0}' must accept at least one value")]
    ZeroCardinality(String),

    /// Two subcommands share a name.
    #[error("duplicate subcommand: {0}")]
    DuplicateCommand(String),

    /// The declaration could not be described.
    #[error(transparent)]
    Describe(#[from] DescribeError),
}

/// Errors raised while parsing a command line.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The command line was rejected, or help/version output was requested.
    #[error(transparent)]
    Clap(#[from] clap::Error),

    /// The configuration file could not be read.
    #[error(transparent)]
    Config(#[from] SidecarError),

    /// The configuration file names an unknown parameter.
    #[error("unknown argument in config file: {0}")]
    UnknownConfigKey(String),

    /// A configuration value cannot be converted to the parameter's type.
    #[error("invalid config value for parameter '{param}': {reason}")]
    InvalidConfigValue {
        /// Parameter name.
        param: String,
        /// Conversion failure.
        reason: String,
    },

    /// A mandatory parameter received no value from any source.
    #[error("the following required argument was not provided: {flag}")]
    MissingRequired {
        /// Parameter name.
        param: String,
        /// Long option string.
        flag: String,
    },
}

/// Errors raised while exporting a compiled parser.
#[derive(Debug, Error)]
pub enum ExportError {
    /// A parser with subcommands cannot be described as one tool.
    #[error("a parser with subcommands cannot be exported as a single command-line tool")]
    MultiCommand,

    /// A parameter type has no workflow counterpart.
    #[error("parameter '{param}' has type '{ty}', which has no workflow input type")]
    UnmappedType {
        /// Parameter name.
        param: String,
        /// Canonical type of the parameter.
        ty: CanonicalType,
    },

    /// The base document has a field of the wrong shape.
    #[error("base document field '{0}' must be a mapping")]
    InvalidBase(String),

    /// A sidecar file could not be read or written.
    #[error(transparent)]
    Sidecar(#[from] SidecarError),
}
