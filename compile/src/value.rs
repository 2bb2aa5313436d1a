//! Parsed argument values and string coercion.

use std::ffi::OsStr;
use std::fmt;
use std::path::PathBuf;

use clap::builder::{PossibleValue, TypedValueParser};
use clap::error::ErrorKind;
use clap::{Arg, Command};
use docargs_core::CanonicalType;
use serde::Serialize;
use serde_json::{Map, Value};

/// One resolved argument value.
///
/// Serializes as plain JSON (`Path` as a string).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ArgValue {
    /// No value.
    Null,
    /// Boolean.
    Bool(bool),
    /// Integer.
    Int(i64),
    /// Floating-point number.
    Float(f64),
    /// String, including values of types without coercion.
    Str(String),
    /// Filesystem path.
    Path(PathBuf),
    /// JSON object.
    Dict(Map<String, Value>),
    /// Values of a multi-valued parameter.
    List(Vec<ArgValue>),
}

impl ArgValue {
    /// Converts a JSON value without any type information.
    ///
    /// # Examples
    ///
    /// ```
    /// use docargs_compile::ArgValue;
    /// use serde_json::json;
    ///
    /// assert_eq!(ArgValue::from_json(&json!(54)), ArgValue::Int(54));
    /// assert_eq!(
    ///     ArgValue::from_json(&json!(["hey", "ho"])),
    ///     ArgValue::List(vec![ArgValue::Str("hey".into()), ArgValue::Str("ho".into())])
    /// );
    /// ```
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(flag) => Self::Bool(*flag),
            Value::Number(number) => match number.as_i64() {
                Some(int) => Self::Int(int),
                None => Self::Float(number.as_f64().unwrap_or(f64::NAN)),
            },
            Value::String(text) => Self::Str(text.clone()),
            Value::Array(items) => Self::List(items.iter().map(Self::from_json).collect()),
            Value::Object(map) => Self::Dict(map.clone()),
        }
    }

    /// Converts back to JSON.
    pub fn to_json(&self) -> Value {
        match self {
            Self::Null => Value::Null,
            Self::Bool(flag) => Value::Bool(*flag),
            Self::Int(int) => Value::from(*int),
            Self::Float(float) => serde_json::Number::from_f64(*float)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            Self::Str(text) => Value::String(text.clone()),
            Self::Path(path) => Value::String(path.to_string_lossy().into_owned()),
            Self::Dict(map) => Value::Object(map.clone()),
            Self::List(items) => Value::Array(items.iter().map(Self::to_json).collect()),
        }
    }

    /// Returns the integer, if this is one.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(int) => Some(*int),
            _ => None,
        }
    }

    /// Returns the boolean, if this is one.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(flag) => Some(*flag),
            _ => None,
        }
    }

    /// Returns the string, if this is one.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(text) => Some(text),
            _ => None,
        }
    }

    /// Returns the path, if this is one.
    pub fn as_path(&self) -> Option<&std::path::Path> {
        match self {
            Self::Path(path) => Some(path),
            _ => None,
        }
    }

    /// Returns the items, if this is a list.
    pub fn as_list(&self) -> Option<&[ArgValue]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// Returns `true` for [`ArgValue::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

impl fmt::Display for ArgValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("None"),
            Self::Bool(flag) => write!(f, "{flag}"),
            Self::Int(int) => write!(f, "{int}"),
            Self::Float(float) if float.is_finite() && float.fract() == 0.0 => {
                write!(f, "{float:.1}")
            }
            Self::Float(float) => write!(f, "{float}"),
            Self::Str(text) => f.write_str(text),
            Self::Path(path) => write!(f, "{}", path.display()),
            Self::Dict(map) => write!(f, "{}", Value::Object(map.clone())),
            Self::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
        }
    }
}

/// Parses `"true"` or `"false"`, ignoring ASCII case.
///
/// # Examples
///
/// ```
/// use docargs_compile::str_to_bool;
///
/// assert_eq!(str_to_bool("FALSE"), Ok(false));
/// assert!(str_to_bool("yes").is_err());
/// ```
pub fn str_to_bool(raw: &str) -> Result<bool, String> {
    if raw.eq_ignore_ascii_case("true") {
        Ok(true)
    } else if raw.eq_ignore_ascii_case("false") {
        Ok(false)
    } else {
        Err(format!("invalid boolean value '{raw}'"))
    }
}

/// Converts command-line text to a value of `ty`.
///
/// Types without a coercion keep the text as [`ArgValue::Str`].
///
/// # Examples
///
/// ```
/// use docargs_compile::{ArgValue, coerce};
/// use docargs_core::CanonicalType;
///
/// assert_eq!(coerce(&CanonicalType::Int, "5"), Ok(ArgValue::Int(5)));
/// assert!(coerce(&CanonicalType::Int, "7.5").is_err());
/// assert!(coerce(&CanonicalType::Int, "ho").is_err());
/// ```
pub fn coerce(ty: &CanonicalType, raw: &str) -> Result<ArgValue, String> {
    match ty {
        CanonicalType::Int => raw
            .trim()
            .parse::<i64>()
            .map(ArgValue::Int)
            .map_err(|_| format!("invalid int value: '{raw}'")),
        CanonicalType::Float => raw
            .trim()
            .parse::<f64>()
            .map(ArgValue::Float)
            .map_err(|_| format!("invalid float value: '{raw}'")),
        CanonicalType::Bool => str_to_bool(raw).map(ArgValue::Bool),
        CanonicalType::Path => Ok(ArgValue::Path(PathBuf::from(raw))),
        CanonicalType::Dict => match serde_json::from_str::<Value>(raw) {
            Ok(Value::Object(map)) => Ok(ArgValue::Dict(map)),
            _ => Err(format!("invalid dict value: '{raw}' (expected a JSON object)")),
        },
        CanonicalType::Str | CanonicalType::Other(_) => Ok(ArgValue::Str(raw.to_string())),
    }
}

/// Converts a JSON value (a default or a config entry) for a parameter.
///
/// Strings go through [`coerce`], including the items of a list. Numbers
/// widen to floats for a `float` parameter; other values are taken as they
/// are.
pub(crate) fn coerce_json(ty: &CanonicalType, value: &Value) -> Result<ArgValue, String> {
    match value {
        Value::String(raw) => coerce(ty, raw),
        Value::Number(number) if *ty == CanonicalType::Float => number
            .as_f64()
            .map(ArgValue::Float)
            .ok_or_else(|| format!("invalid float value: '{number}'")),
        Value::Array(items) => items
            .iter()
            .map(|item| coerce_json(ty, item))
            .collect::<Result<Vec<_>, _>>()
            .map(ArgValue::List),
        other => Ok(ArgValue::from_json(other)),
    }
}

/// Value parser that coerces to a canonical type, then checks choices.
#[derive(Debug, Clone)]
pub(crate) struct CoercingParser {
    ty: CanonicalType,
    choices: Option<Vec<ArgValue>>,
}

impl CoercingParser {
    pub(crate) fn new(ty: CanonicalType, choices: Option<Vec<ArgValue>>) -> Self {
        Self { ty, choices }
    }
}

impl TypedValueParser for CoercingParser {
    type Value = ArgValue;

    fn parse_ref(
        &self,
        cmd: &Command,
        arg: Option<&Arg>,
        value: &OsStr,
    ) -> Result<Self::Value, clap::Error> {
        let Some(raw) = value.to_str() else {
            return Err(clap::Error::new(ErrorKind::InvalidUtf8).with_cmd(cmd));
        };

        let parsed = coerce(&self.ty, raw).map_err(|reason| invalid_value(cmd, arg, &reason))?;

        if let Some(choices) = &self.choices {
            if !choices.contains(&parsed) {
                let listed = choices
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(", ");
                let reason = format!("invalid choice: '{raw}' (choose from {listed})");
                return Err(invalid_value(cmd, arg, &reason));
            }
        }

        Ok(parsed)
    }

    fn possible_values(&self) -> Option<Box<dyn Iterator<Item = PossibleValue> + '_>> {
        let choices = self.choices.as_ref()?;
        Some(Box::new(
            choices.iter().map(|choice| PossibleValue::new(choice.to_string())),
        ))
    }
}

fn invalid_value(cmd: &Command, arg: Option<&Arg>, reason: &str) -> clap::Error {
    let message = match arg {
        Some(arg) => format!("argument {arg}: {reason}\n"),
        None => format!("{reason}\n"),
    };
    clap::Error::raw(ErrorKind::InvalidValue, message).with_cmd(cmd)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_coerce_dict_requires_object() {
        assert_eq!(
            coerce(&CanonicalType::Dict, r#"{"a": 1}"#),
            Ok(ArgValue::Dict(json!({"a": 1}).as_object().unwrap().clone()))
        );
        assert!(coerce(&CanonicalType::Dict, "[1]").is_err());
    }

    #[test]
    fn test_unknown_type_passes_text_through() {
        assert_eq!(
            coerce(&CanonicalType::Other("Color".into()), "red"),
            Ok(ArgValue::Str("red".into()))
        );
    }

    #[test]
    fn test_coerce_json_converts_string_items() {
        assert_eq!(
            coerce_json(&CanonicalType::Int, &json!(["1", 2])),
            Ok(ArgValue::List(vec![ArgValue::Int(1), ArgValue::Int(2)]))
        );
        assert_eq!(
            coerce_json(&CanonicalType::Path, &json!("a.txt")),
            Ok(ArgValue::Path(PathBuf::from("a.txt")))
        );
    }

    #[test]
    fn test_display_matches_help_rendering() {
        let list = ArgValue::List(vec![ArgValue::Str("hey".into()), ArgValue::Str("ho".into())]);
        assert_eq!(list.to_string(), "[hey, ho]");
        assert_eq!(ArgValue::Null.to_string(), "None");
    }

    #[test]
    fn test_whole_floats_keep_decimal_point() {
        assert_eq!(ArgValue::Float(1.0).to_string(), "1.0");
        assert_eq!(ArgValue::Float(-3.0).to_string(), "-3.0");
        assert_eq!(ArgValue::Float(1.5).to_string(), "1.5");
        assert_eq!(ArgValue::Float(f64::INFINITY).to_string(), "inf");
    }

    #[test]
    fn test_coerce_json_widens_numbers_for_float() {
        assert_eq!(
            coerce_json(&CanonicalType::Float, &json!(1)),
            Ok(ArgValue::Float(1.0))
        );
        assert_eq!(
            coerce_json(&CanonicalType::Int, &json!(1)),
            Ok(ArgValue::Int(1))
        );
    }

    #[test]
    fn test_serializes_as_plain_json() {
        let value = ArgValue::List(vec![ArgValue::Path("a/b".into()), ArgValue::Null]);
        assert_eq!(serde_json::to_value(&value).unwrap(), json!(["a/b", null]));
    }
}
