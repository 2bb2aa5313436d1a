//! Error types for sidecar file operations.
//!
//! Covers I/O, JSON and YAML failures plus the structural checks applied to
//! configuration overlays and workflow documents.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while reading or writing sidecar files.
#[derive(Debug, Error)]
pub enum SidecarError {
    /// File I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing or serialization failure.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML parsing or serialization failure.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// The file extension is not `.json`, `.yaml` or `.yml`.
    #[error("unsupported file extension for '{}': expected .json, .yaml or .yml", .0.display())]
    UnsupportedExtension(PathBuf),

    /// The document's top level is not a mapping.
    #[error("top level of '{}' must be a mapping", .0.display())]
    NotAMapping(PathBuf),

    /// A configuration overlay is structurally invalid.
    #[error("invalid configuration overlay: {0}")]
    InvalidOverlay(String),
}

/// Convenience alias for results with [`SidecarError`].
pub type Result<T> = std::result::Result<T, SidecarError>;
