use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use docargs_compile::{
    BooleanMode, CompileOptions, ParseError, UnknownKeyPolicy, compile_manifest, export_manifest,
    export_workflow,
};
use docargs_core::{FunctionDeclaration, Manifest};
use docargs_extract::build_manifest;
use docargs_sidecar::{
    SidecarFormat, load_manifest, load_manifest_sidecar, load_workflow_base, save_manifest,
    save_workflow,
};
use serde::Deserialize;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// CLI-specific unknown-key policy with clap argument parsing support.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum CliUnknownKeys {
    Error,
    Warning,
}

impl From<CliUnknownKeys> for UnknownKeyPolicy {
    fn from(policy: CliUnknownKeys) -> Self {
        match policy {
            CliUnknownKeys::Error => Self::Error,
            CliUnknownKeys::Warning => Self::Warning,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "docargs")]
#[command(about = "Build command-line interfaces from documented function declarations")]
struct Cli {
    /// Enable debug logging (overridden by RUST_LOG).
    #[arg(long, short, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Build or update a manifest from function declarations.
    Describe(DescribeArgs),
    /// Export a manifest, or a CWL tool description, from a compiled manifest.
    Export(ExportArgs),
    /// Parse a command line against a manifest and print the resolved values.
    Parse(ParseArgs),
}

#[derive(Debug, Args)]
struct DescribeArgs {
    /// JSON or YAML file with one declaration or a list of declarations.
    #[arg(long)]
    declarations: PathBuf,
    /// File whose directory holds the manifest sidecar to merge into.
    #[arg(long)]
    anchor: Option<PathBuf>,
    /// Output manifest path (.json, .yaml or .yml); prints JSON when omitted.
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct ExportArgs {
    /// Manifest file (.json, .yaml or .yml).
    #[arg(long)]
    manifest: PathBuf,
    /// Export a CWL CommandLineTool instead of a manifest.
    #[arg(long)]
    workflow: bool,
    /// Output path; prints to stdout when omitted.
    #[arg(long)]
    output: Option<PathBuf>,
    /// Reject boolean parameters that default to true.
    #[arg(long)]
    strict_booleans: bool,
}

#[derive(Debug, Args)]
struct ParseArgs {
    /// Manifest file (.json, .yaml or .yml).
    #[arg(long)]
    manifest: PathBuf,
    /// Add a --conf option to the compiled parser.
    #[arg(long)]
    conf: bool,
    /// How configuration keys naming no parameter are handled.
    #[arg(long, default_value = "error")]
    unknown_keys: CliUnknownKeys,
    /// Reject boolean parameters that default to true.
    #[arg(long)]
    strict_booleans: bool,
    /// Command line for the compiled parser.
    #[arg(last = true, allow_hyphen_values = true)]
    args: Vec<String>,
}

/// A declaration file holds one declaration or a list of them.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum DeclarationFile {
    Many(Vec<FunctionDeclaration>),
    One(FunctionDeclaration),
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Command::Describe(args) => run_describe(args),
        Command::Export(args) => run_export(args),
        Command::Parse(args) => run_parse(args),
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) if verbose => EnvFilter::new("debug"),
        Err(_) => EnvFilter::new("warn"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run_describe(args: DescribeArgs) -> Result<(), String> {
    let decls = read_declarations(&args.declarations)?;

    let base = match &args.anchor {
        Some(anchor) => load_manifest_sidecar(anchor)
            .map_err(|err| err.to_string())?
            .unwrap_or_default(),
        None => Manifest::new(),
    };

    let manifest = build_manifest(&decls, base).map_err(|err| err.to_string())?;
    match &args.output {
        Some(path) => {
            ensure_parent_dir(path)?;
            save_manifest(path, &manifest).map_err(|err| err.to_string())?;
            println!(
                "Described {} function(s) into '{}'.",
                decls.len(),
                path.display()
            );
        }
        None => print_json(&manifest)?,
    }
    Ok(())
}

fn run_export(args: ExportArgs) -> Result<(), String> {
    let manifest = load_manifest(&args.manifest).map_err(|err| err.to_string())?;
    let options = compile_options(args.strict_booleans, None);
    let parser = compile_manifest(&manifest, &options).map_err(|err| err.to_string())?;

    if args.workflow {
        let base = load_workflow_base(&args.manifest).map_err(|err| err.to_string())?;
        let document = export_workflow(&parser, base).map_err(|err| err.to_string())?;
        return match &args.output {
            Some(path) => {
                ensure_parent_dir(path)?;
                save_workflow(path, &document).map_err(|err| err.to_string())?;
                println!("Wrote workflow description to '{}'.", path.display());
                Ok(())
            }
            None => {
                let raw = serde_yaml::to_string(&document)
                    .map_err(|err| format!("Failed to serialize workflow description: {err}"))?;
                print!("{raw}");
                Ok(())
            }
        };
    }

    let exported = export_manifest(&parser, manifest);
    match &args.output {
        Some(path) => {
            ensure_parent_dir(path)?;
            save_manifest(path, &exported).map_err(|err| err.to_string())?;
            println!("Wrote manifest to '{}'.", path.display());
            Ok(())
        }
        None => print_json(&exported),
    }
}

fn run_parse(args: ParseArgs) -> Result<(), String> {
    let manifest = load_manifest(&args.manifest).map_err(|err| err.to_string())?;
    let overlay = args.conf.then_some(args.unknown_keys.into());
    let options = compile_options(args.strict_booleans, overlay);
    let parser = compile_manifest(&manifest, &options).map_err(|err| err.to_string())?;

    let argv = std::iter::once(parser.prog().to_string()).chain(args.args);
    let parsed = match parser.parse_from(argv) {
        Ok(parsed) => parsed,
        Err(ParseError::Clap(err)) if !err.use_stderr() => {
            print!("{err}");
            return Ok(());
        }
        Err(ParseError::Clap(err)) => {
            let rendered = err.to_string();
            return Err(rendered
                .trim_start_matches("error: ")
                .trim_end()
                .to_string());
        }
        Err(err) => return Err(err.to_string()),
    };

    debug!(command = ?parsed.command, "Resolved command line");
    print_json(&parsed)
}

fn compile_options(strict_booleans: bool, overlay: Option<UnknownKeyPolicy>) -> CompileOptions {
    let mut options = CompileOptions::new();
    if strict_booleans {
        options = options.with_boolean_mode(BooleanMode::Strict);
    }
    if let Some(policy) = overlay {
        options = options.with_config_overlay(policy);
    }
    options
}

fn read_declarations(path: &Path) -> Result<Vec<FunctionDeclaration>, String> {
    let format = SidecarFormat::from_path(path).map_err(|err| err.to_string())?;
    let file: DeclarationFile = format.read(path).map_err(|err| {
        format!("Failed to read declarations from '{}': {err}", path.display())
    })?;
    Ok(match file {
        DeclarationFile::Many(decls) => decls,
        DeclarationFile::One(decl) => vec![decl],
    })
}

fn ensure_parent_dir(path: &Path) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|err| {
                format!(
                    "Failed to create output directory '{}': {err}",
                    parent.display()
                )
            })?;
        }
    }
    Ok(())
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), String> {
    let raw = serde_json::to_string_pretty(value)
        .map_err(|err| format!("Failed to serialize output: {err}"))?;
    println!("{raw}");
    Ok(())
}
