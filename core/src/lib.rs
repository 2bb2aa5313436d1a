//! Core parameter, descriptor and manifest types.
//!
//! This crate defines the shared vocabulary of the docargs pipeline:
//!
//! - [`FunctionDeclaration`] / [`ParameterDeclaration`]: a callable's
//!   signature as declared, with [`TypeShape`] annotations.
//! - [`ParameterSpec`] / [`FunctionDescriptor`]: the normalized, serializable
//!   parameter schema.
//! - [`Manifest`]: the persisted sidecar, either a legacy single command or a
//!   list of [`FunctionEntry`] values.
//! - [`AbbreviationTable`]: deterministic short aliases for one command.
//!
//! Validation ([`validate_documentation`], [`validate_parameters`]) checks a
//! signature against its documentation and a parameter list against the
//! invariants a parser needs. Merging ([`merge_manifest`],
//! [`ManifestBuilder`]) applies descriptors to an existing manifest.
//!
//! # Example
//!
//! ```
//! use docargs_core::*;
//! use serde_json::json;
//!
//! let descriptor = FunctionDescriptor::new("resize", "resize_image")
//!     .with_description("Resize an image")
//!     .with_param(ParameterSpec::new("input_file", CanonicalType::Path))
//!     .with_param(ParameterSpec::new("scale", CanonicalType::Float).with_default(json!(0.5)));
//!
//! assert!(validate_parameters(&descriptor.params, &[]).is_empty());
//!
//! let table = AbbreviationTable::assign(descriptor.param_names());
//! assert_eq!(table.get("input_file"), Some("i"));
//! assert_eq!(table.get("scale"), Some("s"));
//!
//! let manifest = merge_manifest(Manifest::new(), &[descriptor]).unwrap();
//! assert_eq!(manifest.params.unwrap()[0].flag, "--input-file");
//! ```

mod abbrev;
mod declaration;
mod manifest;
mod merge;
mod types;
mod validate;

pub use abbrev::AbbreviationTable;
pub use declaration::*;
pub use manifest::{
    CommandView, DEFAULT_MANIFEST_VERSION, FunctionEntry, Manifest, ManifestLayout,
};
pub use merge::{ManifestBuilder, MergeError, merge_manifest};
pub use types::*;
pub use validate::{ValidationError, validate_documentation, validate_parameters};
