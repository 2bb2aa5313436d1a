//! Descriptor extraction from documented declarations.
//!
//! This crate turns a [`FunctionDeclaration`] (identifier, documentation
//! comment and typed parameters) into a [`FunctionDescriptor`]:
//!
//! 1. the documentation comment is parsed ([`parse_docstring`]);
//! 2. underscore-prefixed and variadic parameters are dropped;
//! 3. the remaining names are cross-checked against the documented ones
//!    ([`validate_documentation`]);
//! 4. each parameter's type is normalized into a canonical element type and
//!    a cardinality.
//!
//! # Main entry points
//!
//! - [`describe_function`]: one declaration to one descriptor.
//! - [`build_manifest`]: several declarations merged into a manifest.
//!
//! # Example
//!
//! ```
//! use docargs_core::*;
//! use docargs_extract::describe_function;
//! use serde_json::json;
//!
//! let decl = FunctionDeclaration::new("fetch")
//!     .with_doc("fetch Download a file\n\nParameters\n----------\nurl : str\n    Source URL\nretries : int\n    Attempts\n")
//!     .with_param(ParameterDeclaration::required("url", TypeShape::named("str")))
//!     .with_param(ParameterDeclaration::optional("retries", TypeShape::named("int"), json!(3)));
//!
//! let descriptor = describe_function(&decl).unwrap();
//! assert_eq!(descriptor.name, "fetch");
//! assert_eq!(descriptor.description, "");
//! assert_eq!(descriptor.params[1].value, Some(json!(3)));
//! ```
//!
//! [`validate_documentation`]: docargs_core::validate_documentation

pub mod docstring;
pub mod error;
pub mod literal;
mod signature;

use docargs_core::{
    FunctionDeclaration, FunctionDescriptor, Manifest, ParameterDeclaration, ValidationError,
    merge_manifest, validate_documentation,
};
use tracing::debug;

pub use docstring::{Docstring, ParamDoc, parse_docstring};
pub use error::{DescribeError, DocstringError};

/// Builds the descriptor of one declared callable.
///
/// The descriptor's `name` is the first token of the documentation comment,
/// or the callable's identifier when the first line is blank.
pub fn describe_function(decl: &FunctionDeclaration) -> Result<FunctionDescriptor, DescribeError> {
    let doc = decl
        .doc
        .as_deref()
        .ok_or_else(|| DescribeError::MissingDocumentation {
            function: decl.name.clone(),
        })?;
    let docstring = parse_docstring(doc)?;

    let retained: Vec<&ParameterDeclaration> = decl
        .parameters
        .iter()
        .filter(|param| !param.is_excluded())
        .collect();
    let signature_names: Vec<&str> = retained.iter().map(|param| param.name.as_str()).collect();
    validate_documentation(&signature_names, &docstring.param_names())?;

    let name = docstring.name.as_deref().unwrap_or(&decl.name);
    let mut descriptor =
        FunctionDescriptor::new(name, &decl.name).with_description(&docstring.description);

    for param in retained {
        let param_doc = docstring
            .find(&param.name)
            .ok_or_else(|| ValidationError::UndocumentedParameter(param.name.clone()))?;
        descriptor
            .params
            .push(signature::resolve_parameter(param, param_doc)?);
    }

    debug!(
        function = %decl.name,
        params = descriptor.params.len(),
        "Described function"
    );
    Ok(descriptor)
}

/// Describes `decls` and merges them into `base`.
///
/// # Examples
///
/// ```
/// use docargs_core::*;
/// use docargs_extract::build_manifest;
///
/// let decl = FunctionDeclaration::new("ping").with_doc("ping Check a host\n");
/// let manifest = build_manifest(&[decl], Manifest::new()).unwrap();
/// assert_eq!(manifest.name.as_deref(), Some("ping"));
/// assert_eq!(manifest.params, Some(vec![]));
/// ```
pub fn build_manifest(decls: &[FunctionDeclaration], base: Manifest) -> Result<Manifest, DescribeError> {
    let descriptors = decls
        .iter()
        .map(describe_function)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(merge_manifest(base, &descriptors)?)
}
