//! Manifest to clap parser compilation.
//!
//! Every parameter becomes a named option `--<flag>`, with a `-<alias>`
//! short form taken from the command's [`AbbreviationTable`]. Defaults are
//! not registered with clap: they are resolved after parsing, together with
//! an optional configuration overlay, so that the precedence is always
//! defaults < overlay < command line.

use std::collections::HashSet;
use std::ffi::OsString;
use std::path::PathBuf;

use clap::parser::ValueSource;
use clap::{Arg, ArgAction, ArgMatches, Command};
use docargs_core::{
    AbbreviationTable, CanonicalType, Cardinality, FunctionDeclaration, FunctionDescriptor,
    Manifest, ManifestLayout, ParameterSpec, ValidationError, validate_parameters,
};
use docargs_extract::describe_function;
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::argv::expand_aliases;
use crate::error::{CompileError, ParseError};
use crate::overlay::apply_overlay;
use crate::value::{ArgValue, CoercingParser, coerce_json};

/// Long name of the configuration file option.
pub const CONF: &str = "conf";

const DEFAULT_PROG: &str = "command";

/// How scalar boolean parameters that default to `true` are compiled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BooleanMode {
    /// `--flag` / `--no-flag` pair, last one wins.
    #[default]
    Negatable,
    /// Rejected with [`CompileError::TrueDefaultFlag`].
    Strict,
}

/// Handling of configuration keys that name no parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnknownKeyPolicy {
    /// Fail with [`ParseError::UnknownConfigKey`].
    Error,
    /// Log a warning and keep the value.
    Warning,
}

/// Compilation settings.
///
/// # Examples
///
/// ```
/// use docargs_compile::{BooleanMode, CompileOptions, UnknownKeyPolicy};
///
/// let options = CompileOptions::new()
///     .with_boolean_mode(BooleanMode::Strict)
///     .with_config_overlay(UnknownKeyPolicy::Warning);
/// assert_eq!(options.config_overlay, Some(UnknownKeyPolicy::Warning));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CompileOptions {
    /// Treatment of `true` boolean defaults.
    pub boolean_mode: BooleanMode,
    /// Adds `--conf <file>` with the given unknown-key policy.
    pub config_overlay: Option<UnknownKeyPolicy>,
}

impl CompileOptions {
    /// Default settings: negatable booleans, no `--conf`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the boolean mode.
    pub fn with_boolean_mode(mut self, mode: BooleanMode) -> Self {
        self.boolean_mode = mode;
        self
    }

    /// Enables `--conf <file>`.
    pub fn with_config_overlay(mut self, policy: UnknownKeyPolicy) -> Self {
        self.config_overlay = Some(policy);
        self
    }
}

/// How a parameter is matched on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionKind {
    /// Boolean switch: present means `true`, absent means `false`.
    Presence,
    /// Boolean `--flag` / `--no-flag` pair defaulting to `true`.
    Negatable,
    /// Option taking one or more values.
    Valued,
}

/// A parameter as registered in a compiled command.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedOption {
    /// Parameter as declared in the manifest.
    pub spec: ParameterSpec,
    /// Command-line shape.
    pub kind: OptionKind,
    /// Usable short alias, without the leading `-`.
    pub alias: Option<String>,
    /// Value used when neither the command line nor an overlay sets one.
    pub default: Option<ArgValue>,
}

impl ResolvedOption {
    /// Returns `true` if a value must come from the command line or an overlay.
    pub fn is_required(&self) -> bool {
        self.kind == OptionKind::Valued && self.spec.mandatory
    }

    /// Long option without the leading `--`.
    pub fn long(&self) -> &str {
        self.spec.flag.trim_start_matches('-')
    }

    fn negation_id(&self) -> String {
        format!("no-{}", self.long())
    }

    fn help(&self) -> String {
        match &self.default {
            Some(default) if self.kind == OptionKind::Valued => {
                format!("{} (default: {default})", self.spec.description)
                    .trim_start()
                    .to_string()
            }
            _ => self.spec.description.clone(),
        }
    }

    /// Builds the clap arguments. With an overlay, required values are
    /// checked after resolution instead of by clap.
    fn to_args(&self, conf: bool) -> Vec<Arg> {
        let name = self.spec.name.clone();
        let short = self.alias.as_deref().and_then(single_char);

        match self.kind {
            OptionKind::Presence => {
                let mut arg = Arg::new(name)
                    .long(self.long().to_string())
                    .action(ArgAction::SetTrue)
                    .help(self.help());
                if let Some(ch) = short {
                    arg = arg.short(ch);
                }
                vec![arg]
            }
            OptionKind::Negatable => {
                let negation = self.negation_id();
                vec![
                    Arg::new(name.clone())
                        .long(self.long().to_string())
                        .action(ArgAction::SetTrue)
                        .overrides_with(negation.clone())
                        .help(
                            format!("{} (default: true)", self.spec.description)
                                .trim_start()
                                .to_string(),
                        ),
                    Arg::new(negation.clone())
                        .long(negation)
                        .action(ArgAction::SetTrue)
                        .overrides_with(name)
                        .help(format!("Negate {}", self.spec.flag)),
                ]
            }
            OptionKind::Valued => {
                let choices = self
                    .spec
                    .choices
                    .as_ref()
                    .map(|choices| {
                        choices
                            .iter()
                            .map(|choice| self.choice_value(choice))
                            .collect()
                    });
                let value_name = self
                    .spec
                    .metavar
                    .clone()
                    .unwrap_or_else(|| self.spec.name.to_uppercase());

                let mut arg = Arg::new(name)
                    .long(self.long().to_string())
                    .action(ArgAction::Set)
                    .value_name(value_name)
                    .value_parser(CoercingParser::new(self.spec.value_type.clone(), choices))
                    .required(self.is_required() && !conf)
                    .help(self.help());
                arg = match self.spec.nargs {
                    Cardinality::Scalar => arg.num_args(1),
                    Cardinality::Multiple => arg.num_args(1..),
                    Cardinality::Exactly(count) => arg.num_args(count),
                };
                if matches!(self.spec.value_type, CanonicalType::Int | CanonicalType::Float) {
                    arg = arg.allow_negative_numbers(true);
                }
                if let Some(ch) = short {
                    arg = arg.short(ch);
                }
                vec![arg]
            }
        }
    }

    /// Converts a documented choice to the parameter's type so it compares
    /// equal to a coerced command-line value.
    fn choice_value(&self, choice: &Value) -> ArgValue {
        coerce_json(&self.spec.value_type, choice)
            .unwrap_or_else(|_| ArgValue::from_json(choice))
    }

    /// Reads the command-line value, if one was given.
    fn matched_value(&self, matches: &ArgMatches) -> Option<ArgValue> {
        let given = |id: &str| matches.value_source(id) == Some(ValueSource::CommandLine);
        match self.kind {
            OptionKind::Presence => {
                given(self.spec.name.as_str()).then_some(ArgValue::Bool(true))
            }
            OptionKind::Negatable => {
                if given(self.spec.name.as_str()) {
                    Some(ArgValue::Bool(true))
                } else if given(self.negation_id().as_str()) {
                    Some(ArgValue::Bool(false))
                } else {
                    None
                }
            }
            OptionKind::Valued => {
                if !given(self.spec.name.as_str()) {
                    return None;
                }
                let mut values: Vec<ArgValue> = matches
                    .get_many::<ArgValue>(&self.spec.name)?
                    .cloned()
                    .collect();
                if self.spec.nargs.is_sequence() {
                    Some(ArgValue::List(values))
                } else {
                    values.pop()
                }
            }
        }
    }
}

fn single_char(alias: &str) -> Option<char> {
    let mut chars = alias.chars();
    match (chars.next(), chars.next()) {
        (Some(ch), None) => Some(ch),
        _ => None,
    }
}

/// One compiled command: the program itself or one subcommand.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledCommand {
    name: String,
    description: Option<String>,
    options: Vec<ResolvedOption>,
    abbreviations: AbbreviationTable,
}

impl CompiledCommand {
    /// Command name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Command description, as declared.
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Options in registration order.
    pub fn options(&self) -> &[ResolvedOption] {
        &self.options
    }

    /// Finds an option by parameter name.
    pub fn find_option(&self, name: &str) -> Option<&ResolvedOption> {
        self.options.iter().find(|option| option.spec.name == name)
    }

    /// Short aliases of this command, `help` included.
    pub fn abbreviations(&self) -> &AbbreviationTable {
        &self.abbreviations
    }

    /// Parameters as declared, in order.
    pub fn params(&self) -> Vec<ParameterSpec> {
        self.options.iter().map(|option| option.spec.clone()).collect()
    }

    fn to_command(&self, conf: bool) -> Command {
        let mut command = Command::new(self.name.clone()).args_override_self(true);
        if let Some(description) = &self.description {
            command = command.about(description.clone());
        }
        if conf {
            command = command.arg(
                Arg::new(CONF)
                    .long(CONF)
                    .value_name("FILE")
                    .value_parser(clap::value_parser!(PathBuf))
                    .help("Configuration YAML or JSON file to set parameters"),
            );
        }
        for option in &self.options {
            command = command.args(option.to_args(conf));
        }
        command
    }
}

/// Parsed command line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParsedArgs {
    /// Selected subcommand of a multi-command parser.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    /// Parameter values in declaration order.
    pub values: IndexMap<String, ArgValue>,
}

impl ParsedArgs {
    /// Returns the value of a parameter.
    pub fn get(&self, name: &str) -> Option<&ArgValue> {
        self.values.get(name)
    }
}

/// A runnable parser compiled from a manifest or descriptor.
#[derive(Debug, Clone)]
pub struct CompiledParser {
    prog: String,
    description: Option<String>,
    commands: Vec<CompiledCommand>,
    multi: bool,
    options: CompileOptions,
    command: Command,
}

impl CompiledParser {
    /// Program name.
    pub fn prog(&self) -> &str {
        &self.prog
    }

    /// Program description.
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Compiled commands; exactly one unless the parser has subcommands.
    pub fn commands(&self) -> &[CompiledCommand] {
        &self.commands
    }

    /// Returns `true` if the parser dispatches to subcommands.
    pub fn is_multi_command(&self) -> bool {
        self.multi
    }

    /// Settings the parser was compiled with.
    pub fn compile_options(&self) -> CompileOptions {
        self.options
    }

    /// Renders the help text.
    pub fn render_help(&self) -> String {
        self.command.clone().render_help().to_string()
    }

    /// Parses a command line.
    ///
    /// As with clap, the first item is the program name.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::Clap`] for rejected input and for help requests,
    /// and the overlay or required-value errors described on [`ParseError`].
    pub fn parse_from<I, T>(&self, args: I) -> Result<ParsedArgs, ParseError>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        let args = expand_aliases(self, args.into_iter().map(Into::into).collect());
        let matches = self.command.clone().try_get_matches_from(args)?;

        let (compiled, sub_matches, selected) = if self.multi {
            let Some((name, sub_matches)) = matches.subcommand() else {
                return Err(clap::Error::new(clap::error::ErrorKind::MissingSubcommand)
                    .with_cmd(&self.command)
                    .into());
            };
            let Some(compiled) = self.commands.iter().find(|cmd| cmd.name == name) else {
                return Err(clap::Error::new(clap::error::ErrorKind::InvalidSubcommand)
                    .with_cmd(&self.command)
                    .into());
            };
            (compiled, sub_matches, Some(name.to_string()))
        } else {
            (&self.commands[0], &matches, None)
        };

        let values = self.resolve(compiled, sub_matches)?;
        debug!(command = ?selected, values = values.len(), "Parsed command line");
        Ok(ParsedArgs {
            command: selected,
            values,
        })
    }

    fn resolve(
        &self,
        compiled: &CompiledCommand,
        matches: &ArgMatches,
    ) -> Result<IndexMap<String, ArgValue>, ParseError> {
        let mut values: IndexMap<String, ArgValue> = compiled
            .options
            .iter()
            .map(|option| {
                let value = option.default.clone().unwrap_or(ArgValue::Null);
                (option.spec.name.clone(), value)
            })
            .collect();
        let mut provided: HashSet<String> = HashSet::new();

        if let Some(policy) = self.options.config_overlay {
            if let Some(path) = matches.get_one::<PathBuf>(CONF) {
                provided = apply_overlay(compiled, path, policy, &mut values)?;
            }
        }

        for option in &compiled.options {
            if let Some(value) = option.matched_value(matches) {
                provided.insert(option.spec.name.clone());
                values.insert(option.spec.name.clone(), value);
            }
        }

        if let Some(missing) = compiled
            .options
            .iter()
            .find(|option| option.is_required() && !provided.contains(&option.spec.name))
        {
            return Err(ParseError::MissingRequired {
                param: missing.spec.name.clone(),
                flag: missing.spec.flag.clone(),
            });
        }

        Ok(values)
    }
}

/// Compiles a manifest.
///
/// A `functions` list with one entry yields a plain command; any other
/// length yields one subcommand per entry. Without `functions`, the legacy
/// top-level `name` and `params` are required.
///
/// # Examples
///
/// ```
/// use docargs_compile::{CompileOptions, compile_manifest};
/// use docargs_core::Manifest;
///
/// let manifest: Manifest = serde_json::from_value(serde_json::json!({
///     "name": "greet",
///     "params": [{
///         "mandatory": true, "description": "Who to greet", "type": "str",
///         "name": "who", "tag": "--who", "value": null, "nargs": null, "choices": null
///     }]
/// })).unwrap();
///
/// let parser = compile_manifest(&manifest, &CompileOptions::new()).unwrap();
/// let args = parser.parse_from(["greet", "-w", "world"]).unwrap();
/// assert_eq!(args.get("who").and_then(|v| v.as_str()), Some("world"));
/// ```
pub fn compile_manifest(
    manifest: &Manifest,
    options: &CompileOptions,
) -> Result<CompiledParser, CompileError> {
    match manifest.layout() {
        ManifestLayout::Single(view) => {
            let name = view
                .name
                .ok_or_else(|| CompileError::MissingField("name".to_string()))?;
            let params = view
                .params
                .ok_or_else(|| CompileError::MissingField("params".to_string()))?;
            let description = match manifest.functions.as_deref() {
                Some([only]) => only.description.clone(),
                _ => manifest.description.clone(),
            };
            let command = compile_command(name, description, params, options)?;
            Ok(single(command, *options))
        }
        ManifestLayout::Multi(views) => {
            if views.is_empty() {
                return Err(CompileError::MissingField("functions".to_string()));
            }
            let mut commands = Vec::with_capacity(views.len());
            let mut seen = HashSet::new();
            let entries = manifest.functions.as_deref().unwrap_or_default();
            for (index, (view, entry)) in views.iter().zip(entries).enumerate() {
                let name = view
                    .name
                    .ok_or_else(|| CompileError::MissingField(format!("functions[{index}].name")))?;
                if !seen.insert(name) {
                    return Err(CompileError::DuplicateCommand(name.to_string()));
                }
                let params = view.params.unwrap_or_default();
                commands.push(compile_command(
                    name,
                    entry.description.clone(),
                    params,
                    options,
                )?);
            }
            let prog = manifest.name.clone().unwrap_or_else(|| DEFAULT_PROG.to_string());
            Ok(multi(prog, manifest.description.clone(), commands, *options))
        }
    }
}

/// Compiles a single descriptor.
pub fn compile_descriptor(
    descriptor: &FunctionDescriptor,
    options: &CompileOptions,
) -> Result<CompiledParser, CompileError> {
    let command = compile_command(
        &descriptor.name,
        Some(descriptor.description.clone()),
        &descriptor.params,
        options,
    )?;
    Ok(single(command, *options))
}

/// Describes a declaration and compiles the result.
///
/// # Examples
///
/// ```
/// use docargs_compile::{CompileOptions, compile_declaration};
/// use docargs_core::{FunctionDeclaration, ParameterDeclaration, TypeShape};
///
/// let decl = FunctionDeclaration::new("double")
///     .with_doc("double\n\nParameters\n----------\nx : int\n    Value\n")
///     .with_param(ParameterDeclaration::required("x", TypeShape::named("int")));
///
/// let parser = compile_declaration(&decl, &CompileOptions::new()).unwrap();
/// let args = parser.parse_from(["double", "--x", "-4"]).unwrap();
/// assert_eq!(args.get("x").and_then(|v| v.as_i64()), Some(-4));
/// ```
pub fn compile_declaration(
    decl: &FunctionDeclaration,
    options: &CompileOptions,
) -> Result<CompiledParser, CompileError> {
    let descriptor = describe_function(decl)?;
    compile_descriptor(&descriptor, options)
}

fn single(command: CompiledCommand, options: CompileOptions) -> CompiledParser {
    let clap_command = command.to_command(options.config_overlay.is_some());
    CompiledParser {
        prog: command.name.clone(),
        description: command.description.clone(),
        commands: vec![command],
        multi: false,
        options,
        command: clap_command,
    }
}

fn multi(
    prog: String,
    description: Option<String>,
    commands: Vec<CompiledCommand>,
    options: CompileOptions,
) -> CompiledParser {
    let conf = options.config_overlay.is_some();
    let mut clap_command = Command::new(prog.clone()).subcommand_required(true);
    if let Some(description) = &description {
        clap_command = clap_command.about(description.clone());
    }
    for command in &commands {
        clap_command = clap_command.subcommand(command.to_command(conf));
    }
    CompiledParser {
        prog,
        description,
        commands,
        multi: true,
        options,
        command: clap_command,
    }
}

fn compile_command(
    name: &str,
    description: Option<String>,
    params: &[ParameterSpec],
    options: &CompileOptions,
) -> Result<CompiledCommand, CompileError> {
    let reserved: &[&str] = if options.config_overlay.is_some() { &[CONF] } else { &[] };
    if let Some(source) = validate_parameters(params, reserved).into_iter().next() {
        return Err(CompileError::Validation {
            command: name.to_string(),
            source,
        });
    }

    let abbreviations = AbbreviationTable::assign(params.iter().map(|param| param.name.as_str()));
    let mut resolved = Vec::with_capacity(params.len());
    for spec in params {
        resolved.push(resolve_option(spec, &abbreviations, options.boolean_mode)?);
    }
    check_negation_flags(name, &resolved)?;

    debug!(command = %name, options = resolved.len(), "Compiled command");
    Ok(CompiledCommand {
        name: name.to_string(),
        description,
        options: resolved,
        abbreviations,
    })
}

fn resolve_option(
    spec: &ParameterSpec,
    abbreviations: &AbbreviationTable,
    mode: BooleanMode,
) -> Result<ResolvedOption, CompileError> {
    let kind = if spec.is_scalar_bool() {
        if spec.value == Some(Value::Bool(true)) {
            if mode == BooleanMode::Strict {
                return Err(CompileError::TrueDefaultFlag(spec.name.clone()));
            }
            OptionKind::Negatable
        } else {
            OptionKind::Presence
        }
    } else {
        OptionKind::Valued
    };

    if spec.nargs == Cardinality::Exactly(0) && kind == OptionKind::Valued {
        return Err(CompileError::ZeroCardinality(spec.name.clone()));
    }

    if !spec.value_type.is_known() {
        warn!(
            param = %spec.name,
            ty = %spec.value_type,
            "Parameter type has no coercion; values will not be type-checked"
        );
    }

    let default = match kind {
        OptionKind::Presence => Some(ArgValue::Bool(false)),
        OptionKind::Negatable => Some(ArgValue::Bool(true)),
        OptionKind::Valued => match &spec.value {
            None | Some(Value::Null) => None,
            Some(value) => Some(coerce_json(&spec.value_type, value).map_err(|reason| {
                CompileError::InvalidDefault {
                    param: spec.name.clone(),
                    reason,
                }
            })?),
        },
    };

    let alias = match kind {
        OptionKind::Negatable => None,
        _ => abbreviations.get(&spec.name).map(str::to_string),
    };

    Ok(ResolvedOption {
        spec: spec.clone(),
        kind,
        alias,
        default,
    })
}

/// Rejects a `--no-<flag>` negation that collides with another option.
fn check_negation_flags(command: &str, options: &[ResolvedOption]) -> Result<(), CompileError> {
    let longs: HashSet<&str> = options.iter().map(ResolvedOption::long).collect();
    for option in options.iter().filter(|option| option.kind == OptionKind::Negatable) {
        let negation = option.negation_id();
        if longs.contains(negation.as_str()) {
            return Err(CompileError::Validation {
                command: command.to_string(),
                source: ValidationError::DuplicateFlag(format!("--{negation}")),
            });
        }
    }
    Ok(())
}
