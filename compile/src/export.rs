//! Manifest export from a compiled parser.

use std::path::Path;

use docargs_core::{DEFAULT_MANIFEST_VERSION, FunctionEntry, Manifest};
use docargs_sidecar::{MANIFEST_JSON, load_manifest, save_manifest};
use tracing::debug;

use crate::compiler::{CompiledCommand, CompiledParser};
use crate::error::ExportError;

/// Writes the parser's commands into `base`.
///
/// A single-command parser fills the legacy top-level fields, unless `base`
/// already uses the `functions` layout; subcommands update the entry with
/// the same name or are appended. Fields the parser does not own are kept.
///
/// # Examples
///
/// ```
/// use docargs_compile::{CompileOptions, compile_manifest, export_manifest};
/// use docargs_core::Manifest;
///
/// let manifest: Manifest = serde_json::from_value(serde_json::json!({
///     "name": "noop", "version": "4", "description": "Does nothing",
///     "params": [], "container": "noop:1"
/// })).unwrap();
///
/// let parser = compile_manifest(&manifest, &CompileOptions::new()).unwrap();
/// assert_eq!(export_manifest(&parser, manifest.clone()), manifest);
/// ```
pub fn export_manifest(parser: &CompiledParser, base: Manifest) -> Manifest {
    let mut manifest = base;

    if !parser.is_multi_command() && manifest.functions.is_none() {
        if let Some(command) = parser.commands().first() {
            if manifest.name.is_none() {
                manifest.name = Some(parser.prog().to_string());
            }
            if manifest.version.is_none() {
                manifest.version = Some(DEFAULT_MANIFEST_VERSION.to_string());
            }
            manifest.description = command.description().map(str::to_string);
            manifest.params = Some(command.params());
        }
        return manifest;
    }

    let entries = manifest.functions.get_or_insert_with(Vec::new);
    for command in parser.commands() {
        upsert_entry(entries, command);
    }
    manifest
}

fn upsert_entry(entries: &mut Vec<FunctionEntry>, command: &CompiledCommand) {
    let index = match entries
        .iter()
        .position(|entry| entry.name.as_deref() == Some(command.name()))
    {
        Some(index) => index,
        None => {
            entries.push(FunctionEntry {
                name: Some(command.name().to_string()),
                ..Default::default()
            });
            entries.len() - 1
        }
    };
    let entry = &mut entries[index];
    entry.description = command.description().map(str::to_string);
    entry.params = command.params();
}

/// Exports the parser to `outfile`, seeding from the `manifest.json` next to it.
pub fn write_manifest(
    outfile: impl AsRef<Path>,
    parser: &CompiledParser,
) -> Result<Manifest, ExportError> {
    let outfile = outfile.as_ref();
    let seed = outfile
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."))
        .join(MANIFEST_JSON);

    let base = if seed.is_file() {
        debug!(path = %seed.display(), "Seeding manifest export");
        load_manifest(&seed)?
    } else {
        Manifest::new()
    };

    let manifest = export_manifest(parser, base);
    save_manifest(outfile, &manifest)?;
    debug!(path = %outfile.display(), "Wrote manifest");
    Ok(manifest)
}

#[cfg(test)]
mod tests {
    use docargs_core::{CanonicalType, FunctionDescriptor, ParameterSpec};
    use serde_json::json;

    use super::*;
    use crate::{CompileOptions, compile_descriptor, compile_manifest};

    #[test]
    fn test_single_command_into_empty_manifest() {
        let descriptor = FunctionDescriptor::new("resize", "resize")
            .with_description("Resize images")
            .with_param(ParameterSpec::new("scale", CanonicalType::Float).with_default(json!(0.5)));
        let parser = compile_descriptor(&descriptor, &CompileOptions::new()).unwrap();

        let manifest = export_manifest(&parser, Manifest::new());
        assert_eq!(manifest.name.as_deref(), Some("resize"));
        assert_eq!(manifest.version.as_deref(), Some("1"));
        assert_eq!(manifest.description.as_deref(), Some("Resize images"));
        assert_eq!(manifest.params, Some(descriptor.params));
    }

    #[test]
    fn test_multi_command_updates_and_appends_entries() {
        let manifest: Manifest = serde_json::from_value(json!({
            "name": "suite",
            "functions": [
                {"function": "suite.run", "name": "run", "description": "Run", "params": [], "queue": "gpu"},
                {"function": "suite.stop", "name": "stop", "params": []}
            ]
        }))
        .unwrap();
        let parser = compile_manifest(&manifest, &CompileOptions::new()).unwrap();

        let mut base = manifest.clone();
        base.functions.as_mut().unwrap().remove(1);
        let exported = export_manifest(&parser, base);

        let entries = exported.functions.unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].extra["queue"], json!("gpu"));
        assert_eq!(entries[1].name.as_deref(), Some("stop"));
        assert_eq!(entries[1].function, None);
    }
}
