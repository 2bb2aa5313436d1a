//! Compiles docargs manifests into runnable command-line parsers.
//!
//! A [`CompiledParser`] is built from a [`Manifest`](docargs_core::Manifest),
//! a [`FunctionDescriptor`](docargs_core::FunctionDescriptor) or directly
//! from a [`FunctionDeclaration`](docargs_core::FunctionDeclaration). It
//! parses command lines into an ordered namespace of [`ArgValue`]s and can be
//! exported back to a manifest or to a CWL tool description.
//!
//! # Example
//!
//! ```
//! use docargs_compile::{CompileOptions, compile_declaration};
//! use docargs_core::{FunctionDeclaration, ParameterDeclaration, TypeShape};
//! use serde_json::json;
//!
//! let decl = FunctionDeclaration::new("scale")
//!     .with_doc("scale\n\nParameters\n----------\nfactor : float\n    Scale factor\n")
//!     .with_param(ParameterDeclaration::optional("factor", TypeShape::named("float"), json!(1.5)));
//!
//! let parser = compile_declaration(&decl, &CompileOptions::new()).unwrap();
//! let args = parser.parse_from(["scale"]).unwrap();
//! assert_eq!(args.get("factor").map(ToString::to_string).as_deref(), Some("1.5"));
//! ```

mod argv;
mod compiler;
pub mod error;
mod export;
mod overlay;
mod value;
mod workflow;

pub use compiler::{
    BooleanMode, CONF, CompileOptions, CompiledCommand, CompiledParser, OptionKind, ParsedArgs,
    ResolvedOption, UnknownKeyPolicy, compile_declaration, compile_descriptor, compile_manifest,
};
pub use error::{CompileError, ExportError, ParseError};
pub use export::{export_manifest, write_manifest};
pub use value::{ArgValue, coerce, str_to_bool};
pub use workflow::{export_workflow, write_workflow};
