//! Parameter and function descriptor types.
//!
//! These are the canonical, serializable forms produced by the extraction
//! pipeline and consumed by the parser compiler. A [`ParameterSpec`] is
//! serialized with the field names used by manifest sidecars (`tag`, `value`,
//! `nargs`, ...), so it can round-trip through JSON and YAML unchanged.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// Normalized parameter type after unwrapping optionality and containers.
///
/// Serialized as its type name (`"int"`, `"float"`, `"str"`, `"bool"`,
/// `"Path"`, `"dict"`). Any other name is kept verbatim in
/// [`Other`](CanonicalType::Other); compiled parsers accept such values
/// without coercion.
///
/// # Examples
///
/// ```
/// use docargs_core::CanonicalType;
///
/// assert_eq!(CanonicalType::from_name("int"), CanonicalType::Int);
/// assert_eq!(CanonicalType::from_name("pathlib.Path"), CanonicalType::Path);
/// assert_eq!(CanonicalType::from_name("Color").as_str(), "Color");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum CanonicalType {
    /// Integer value.
    Int,
    /// Floating point value.
    Float,
    /// Free-form string.
    Str,
    /// Boolean value.
    Bool,
    /// Filesystem path.
    Path,
    /// Mapping of string keys to arbitrary values.
    Dict,
    /// Any other declared type name.
    Other(String),
}

impl CanonicalType {
    /// Maps a declared type name to its canonical form.
    ///
    /// Module qualifiers are ignored for the known names, so `pathlib.Path`
    /// and `Path` both resolve to [`CanonicalType::Path`].
    pub fn from_name(name: &str) -> Self {
        let short = name.rsplit('.').next().unwrap_or(name);
        match short {
            "int" => Self::Int,
            "float" => Self::Float,
            "str" => Self::Str,
            "bool" => Self::Bool,
            "Path" => Self::Path,
            "dict" => Self::Dict,
            _ => Self::Other(name.to_string()),
        }
    }

    /// Returns the type name as written in manifests.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Int => "int",
            Self::Float => "float",
            Self::Str => "str",
            Self::Bool => "bool",
            Self::Path => "Path",
            Self::Dict => "dict",
            Self::Other(name) => name,
        }
    }

    /// Returns `true` for [`CanonicalType::Bool`].
    pub fn is_bool(&self) -> bool {
        matches!(self, Self::Bool)
    }

    /// Returns `true` if the type has a known coercion.
    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Other(_))
    }
}

impl From<String> for CanonicalType {
    fn from(name: String) -> Self {
        Self::from_name(&name)
    }
}

impl From<CanonicalType> for String {
    fn from(ty: CanonicalType) -> Self {
        ty.as_str().to_string()
    }
}

impl fmt::Display for CanonicalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How many values a parameter accepts.
///
/// Serialized as the manifest `nargs` field: `null` for
/// [`Scalar`](Cardinality::Scalar), `"+"` for
/// [`Multiple`](Cardinality::Multiple) and an integer for
/// [`Exactly`](Cardinality::Exactly). `"*"` is accepted as multiple on input.
///
/// # Examples
///
/// ```
/// use docargs_core::Cardinality;
///
/// let nargs: Cardinality = serde_json::from_str("\"+\"").unwrap();
/// assert_eq!(nargs, Cardinality::Multiple);
/// assert_eq!(serde_json::to_string(&Cardinality::Exactly(2)).unwrap(), "2");
/// assert_eq!(serde_json::to_string(&Cardinality::Scalar).unwrap(), "null");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cardinality {
    /// One value.
    #[default]
    Scalar,
    /// One or more values.
    Multiple,
    /// A fixed number of values, set from documentation.
    Exactly(usize),
}

impl Cardinality {
    /// Returns `true` unless the cardinality is [`Cardinality::Scalar`].
    pub fn is_sequence(self) -> bool {
        !matches!(self, Self::Scalar)
    }
}

impl Serialize for Cardinality {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Scalar => serializer.serialize_none(),
            Self::Multiple => serializer.serialize_str("+"),
            Self::Exactly(count) => serializer.serialize_u64(*count as u64),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NargsRepr {
    Count(usize),
    Symbol(String),
}

impl<'de> Deserialize<'de> for Cardinality {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match Option::<NargsRepr>::deserialize(deserializer)? {
            None => Ok(Self::Scalar),
            Some(NargsRepr::Count(count)) => Ok(Self::Exactly(count)),
            Some(NargsRepr::Symbol(symbol)) => match symbol.as_str() {
                "+" | "*" => Ok(Self::Multiple),
                other => Err(serde::de::Error::custom(format!(
                    "unsupported nargs value: {other}"
                ))),
            },
        }
    }
}

/// Returns the long option string for a parameter name.
///
/// # Examples
///
/// ```
/// assert_eq!(docargs_core::flag_for_name("output_dir"), "--output-dir");
/// ```
pub fn flag_for_name(name: &str) -> String {
    format!("--{}", name.replace('_', "-"))
}

/// Canonical description of one parameter.
///
/// Field order follows the manifest layout. Use [`ParameterSpec::new`] and
/// the `with_*` builder methods to construct one by hand.
///
/// # Examples
///
/// ```
/// use docargs_core::{CanonicalType, Cardinality, ParameterSpec};
///
/// let spec = ParameterSpec::new("input_files", CanonicalType::Path)
///     .with_description("Files to read")
///     .with_cardinality(Cardinality::Multiple);
/// assert_eq!(spec.flag, "--input-files");
/// assert!(spec.mandatory);
///
/// let spec = ParameterSpec::new("retries", CanonicalType::Int)
///     .with_default(serde_json::json!(3));
/// assert!(!spec.mandatory);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterSpec {
    /// `true` iff no default was declared.
    pub mandatory: bool,
    /// Help text gathered from the documentation comment.
    #[serde(default)]
    pub description: String,
    /// Canonical type of a single value.
    #[serde(rename = "type")]
    pub value_type: CanonicalType,
    /// Parameter identifier.
    pub name: String,
    /// Long option string (`--kebab-name`).
    #[serde(rename = "tag")]
    pub flag: String,
    /// Declared default value, `None` when absent or declared as null.
    #[serde(default)]
    pub value: Option<Value>,
    /// Number of values accepted.
    #[serde(default)]
    pub nargs: Cardinality,
    /// Allowed values, in declaration order.
    #[serde(default)]
    pub choices: Option<Vec<Value>>,
    /// Placeholder shown in help output.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metavar: Option<String>,
    /// Opaque GUI hints, passed through untouched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gui_options: Option<Value>,
}

impl ParameterSpec {
    /// Creates a mandatory scalar parameter with no documentation.
    pub fn new(name: &str, value_type: CanonicalType) -> Self {
        Self {
            mandatory: true,
            description: String::new(),
            value_type,
            name: name.to_string(),
            flag: flag_for_name(name),
            value: None,
            nargs: Cardinality::Scalar,
            choices: None,
            metavar: None,
            gui_options: None,
        }
    }

    /// Sets a default value and marks the parameter optional.
    ///
    /// A `null` default still makes the parameter optional; only the absence
    /// of any default makes it mandatory.
    pub fn with_default(mut self, value: Value) -> Self {
        self.mandatory = false;
        self.value = if value.is_null() { None } else { Some(value) };
        self
    }

    /// Adds help text.
    pub fn with_description(mut self, desc: &str) -> Self {
        self.description = desc.to_string();
        self
    }

    /// Restricts the accepted values.
    pub fn with_choices(mut self, choices: Vec<Value>) -> Self {
        self.choices = Some(choices);
        self
    }

    /// Sets the number of accepted values.
    pub fn with_cardinality(mut self, nargs: Cardinality) -> Self {
        self.nargs = nargs;
        self
    }

    /// Attaches opaque GUI hints.
    pub fn with_gui_options(mut self, gui_options: Value) -> Self {
        self.gui_options = Some(gui_options);
        self
    }

    /// Returns `true` for a single boolean value.
    pub fn is_scalar_bool(&self) -> bool {
        self.value_type.is_bool() && self.nargs == Cardinality::Scalar
    }
}

/// Canonical description of one callable.
///
/// # Examples
///
/// ```
/// use docargs_core::{CanonicalType, FunctionDescriptor, ParameterSpec};
///
/// let descriptor = FunctionDescriptor::new("train", "train_model")
///     .with_description("Train a model")
///     .with_param(ParameterSpec::new("epochs", CanonicalType::Int));
/// assert_eq!(descriptor.param_names(), vec!["epochs"]);
/// assert!(descriptor.find_param("epochs").is_some());
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FunctionDescriptor {
    /// Short name taken from the documentation comment.
    pub name: String,
    /// Declared identifier of the callable, used to match manifest entries.
    pub callable: String,
    /// Free-text description.
    pub description: String,
    /// Parameters in declaration order.
    pub params: Vec<ParameterSpec>,
}

impl FunctionDescriptor {
    /// Creates an empty descriptor.
    pub fn new(name: &str, callable: &str) -> Self {
        Self {
            name: name.to_string(),
            callable: callable.to_string(),
            ..Default::default()
        }
    }

    /// Sets the description.
    pub fn with_description(mut self, desc: &str) -> Self {
        self.description = desc.to_string();
        self
    }

    /// Appends a parameter.
    pub fn with_param(mut self, param: ParameterSpec) -> Self {
        self.params.push(param);
        self
    }

    /// Finds a parameter by name.
    pub fn find_param(&self, name: &str) -> Option<&ParameterSpec> {
        self.params.iter().find(|p| p.name == name)
    }

    /// Returns parameter names in declaration order.
    pub fn param_names(&self) -> Vec<&str> {
        self.params.iter().map(|p| p.name.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_canonical_type_round_trips_names() {
        for name in ["int", "float", "str", "bool", "Path", "dict", "Color"] {
            let ty = CanonicalType::from_name(name);
            assert_eq!(ty.as_str(), name);
        }
        assert!(!CanonicalType::from_name("Color").is_known());
    }

    #[test]
    fn test_parameter_spec_serializes_manifest_fields() {
        let spec = ParameterSpec::new("k", CanonicalType::Str)
            .with_default(json!("choice1"))
            .with_choices(vec![json!("choice1"), json!("choice2")])
            .with_description("Fifth arg");

        let value = serde_json::to_value(&spec).unwrap();
        assert_eq!(
            value,
            json!({
                "mandatory": false,
                "description": "Fifth arg",
                "type": "str",
                "name": "k",
                "tag": "--k",
                "value": "choice1",
                "nargs": null,
                "choices": ["choice1", "choice2"],
            })
        );
    }

    #[test]
    fn test_parameter_spec_deserializes_sparse_entry() {
        let spec: ParameterSpec = serde_json::from_value(json!({
            "mandatory": true,
            "type": "int",
            "name": "ll",
            "tag": "--ll",
            "nargs": "+",
        }))
        .unwrap();

        assert_eq!(spec.nargs, Cardinality::Multiple);
        assert_eq!(spec.value, None);
        assert_eq!(spec.description, "");
        assert_eq!(spec.choices, None);
    }

    #[test]
    fn test_null_default_keeps_parameter_optional() {
        let spec = ParameterSpec::new("ll", CanonicalType::Int).with_default(Value::Null);
        assert!(!spec.mandatory);
        assert_eq!(spec.value, None);
    }

    #[test]
    fn test_cardinality_rejects_unknown_symbol() {
        let result: Result<Cardinality, _> = serde_json::from_str("\"?\"");
        assert!(result.is_err());
    }
}
