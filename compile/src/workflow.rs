//! CWL `CommandLineTool` export.

use std::path::Path;

use docargs_core::CanonicalType;
use docargs_sidecar::{load_workflow_base, save_workflow};
use serde_json::{Map, Value, json};
use tracing::debug;

use crate::compiler::{CompiledParser, OptionKind, ResolvedOption};
use crate::error::ExportError;

const CWL_VERSION: &str = "v1.2";

fn cwl_type(option: &ResolvedOption) -> Result<&'static str, ExportError> {
    if option.kind != OptionKind::Valued {
        return Ok("boolean");
    }
    match &option.spec.value_type {
        CanonicalType::Str => Ok("string"),
        CanonicalType::Bool => Ok("boolean"),
        CanonicalType::Float => Ok("float"),
        CanonicalType::Int => Ok("int"),
        CanonicalType::Path => Ok("File"),
        ty @ (CanonicalType::Dict | CanonicalType::Other(_)) => Err(ExportError::UnmappedType {
            param: option.spec.name.clone(),
            ty: ty.clone(),
        }),
    }
}

/// Builds a CWL tool description for a single-command parser.
///
/// The generated `label`, `doc`, `cwlVersion`, `class` and `inputs` are
/// overwritten by fields of `base`; inputs are then added to whatever
/// `inputs` mapping results.
///
/// # Examples
///
/// ```
/// use docargs_compile::{CompileOptions, compile_descriptor, export_workflow};
/// use docargs_core::{CanonicalType, FunctionDescriptor, ParameterSpec};
///
/// let descriptor = FunctionDescriptor::new("count", "count")
///     .with_param(ParameterSpec::new("n", CanonicalType::Int));
/// let parser = compile_descriptor(&descriptor, &CompileOptions::new()).unwrap();
///
/// let cwl = export_workflow(&parser, Default::default()).unwrap();
/// assert_eq!(cwl["class"], "CommandLineTool");
/// assert_eq!(cwl["inputs"]["n"]["type"], "int");
/// assert_eq!(cwl["inputs"]["n"]["inputBinding"]["position"], 1);
/// ```
pub fn export_workflow(
    parser: &CompiledParser,
    base: Map<String, Value>,
) -> Result<Value, ExportError> {
    if parser.is_multi_command() {
        return Err(ExportError::MultiCommand);
    }
    let Some(command) = parser.commands().first() else {
        return Err(ExportError::MultiCommand);
    };

    let mut document = Map::new();
    document.insert("label".into(), json!(parser.prog()));
    document.insert("doc".into(), json!(parser.description()));
    document.insert("cwlVersion".into(), json!(CWL_VERSION));
    document.insert("class".into(), json!("CommandLineTool"));
    document.insert("inputs".into(), Value::Object(Map::new()));
    document.extend(base);

    // `--help` is registered first, `--conf` second.
    let offset = 1 + usize::from(parser.compile_options().config_overlay.is_some());

    for (index, option) in command.options().iter().enumerate() {
        let mut ty = cwl_type(option)?.to_string();

        if let Some(choices) = &option.spec.choices {
            let enum_name = format!("{}_enum", option.spec.name.replace('-', "_"));
            enum_types(&mut document)?.push(json!({
                "type": "enum",
                "name": enum_name,
                "symbols": choices,
            }));
            ty = enum_name;
        }
        if option.spec.nargs.is_sequence() {
            ty.push_str("[]");
        }
        if !option.is_required() {
            ty.push('?');
        }

        let mut input = Map::new();
        input.insert("type".into(), json!(ty));
        input.insert("doc".into(), json!(option.spec.description));
        input.insert(
            "inputBinding".into(),
            json!({"position": index + offset, "prefix": option.spec.flag}),
        );
        if let Some(default) = &option.default {
            input.insert("default".into(), default.to_json());
        }

        object_field(&mut document, "inputs")?.insert(option.spec.name.clone(), Value::Object(input));
    }

    debug!(label = %parser.prog(), inputs = command.options().len(), "Built workflow description");
    Ok(Value::Object(document))
}

/// Returns `document[key]` as a mapping, creating it if absent.
fn object_field<'a>(
    document: &'a mut Map<String, Value>,
    key: &str,
) -> Result<&'a mut Map<String, Value>, ExportError> {
    document
        .entry(key)
        .or_insert_with(|| Value::Object(Map::new()))
        .as_object_mut()
        .ok_or_else(|| ExportError::InvalidBase(key.to_string()))
}

fn enum_types(document: &mut Map<String, Value>) -> Result<&mut Vec<Value>, ExportError> {
    let requirements = object_field(document, "requirements")?;
    let schema = object_field(requirements, "SchemaDefRequirement")?;
    schema
        .entry("types")
        .or_insert_with(|| Value::Array(Vec::new()))
        .as_array_mut()
        .ok_or_else(|| ExportError::InvalidBase("requirements.SchemaDefRequirement.types".into()))
}

/// Exports the parser as YAML to `outfile`, using the sidecar base next to it.
pub fn write_workflow(outfile: impl AsRef<Path>, parser: &CompiledParser) -> Result<Value, ExportError> {
    let outfile = outfile.as_ref();
    let base = load_workflow_base(outfile)?;
    let document = export_workflow(parser, base)?;
    save_workflow(outfile, &document)?;
    Ok(document)
}
