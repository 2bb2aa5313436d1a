//! Documentation comment parsing.
//!
//! The expected layout is a short name on the first line, a free-text
//! description, and a `Parameters` section listing one header line per
//! parameter followed by indented help lines:
//!
//! ```text
//! resize Resize an image
//!
//! Scales the input by a constant factor.
//!
//! Parameters
//! ----------
//! input_file : Path
//!     Image to read
//! mode : str, choices=("fast", "exact")
//!     Resampling mode
//! ```
//!
//! A blank line ends the section. Header lines may carry `choices=<literal>`,
//! `nargs=<count>` and `gui_options=<literal>` attributes.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;
use tracing::debug;

use crate::error::DocstringError;
use crate::literal::parse_literal_prefix;

static PARAM_HEADER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Za-z_][A-Za-z0-9_]*)\s*:").expect("static regex must compile"));
static CHOICES_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bchoices\s*=\s*").expect("static regex must compile"));
static GUI_OPTIONS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bgui_options\s*=\s*").expect("static regex must compile"));
static NARGS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bnargs\s*=\s*(\d+)").expect("static regex must compile"));

const PARAMETERS_HEADER: &str = "Parameters";

/// Documentation of one parameter.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParamDoc {
    /// Parameter name from the header line.
    pub name: String,
    /// Help text, space-joined.
    pub doc: String,
    /// Allowed values from `choices=`.
    pub choices: Option<Vec<Value>>,
    /// Explicit count from `nargs=`.
    pub nargs: Option<usize>,
    /// Opaque hints from `gui_options=`.
    pub gui_options: Option<Value>,
}

impl ParamDoc {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }
}

/// A parsed documentation comment.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Docstring {
    /// First token of the first line, `None` when that line is blank.
    pub name: Option<String>,
    /// Non-blank lines between the first line and the `Parameters` header.
    pub description: String,
    /// Documented parameters in order of appearance.
    pub params: Vec<ParamDoc>,
}

impl Docstring {
    /// Finds a documented parameter by name.
    pub fn find(&self, name: &str) -> Option<&ParamDoc> {
        self.params.iter().find(|p| p.name == name)
    }

    /// Returns documented parameter names in order.
    pub fn param_names(&self) -> Vec<&str> {
        self.params.iter().map(|p| p.name.as_str()).collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Outside,
    Parameters,
}

/// Parses a documentation comment.
///
/// # Examples
///
/// ```
/// use docargs_extract::parse_docstring;
///
/// let doc = "\
/// scale Scale a value
///
/// Multiplies the input.
///
/// Parameters
/// ----------
/// value : float
///     Value to scale
/// mode : str, choices=(\"up\", \"down\")
///     Direction
/// ";
/// let parsed = parse_docstring(doc).unwrap();
/// assert_eq!(parsed.name.as_deref(), Some("scale"));
/// assert_eq!(parsed.description, "Multiplies the input.");
/// assert_eq!(parsed.param_names(), vec!["value", "mode"]);
/// assert_eq!(parsed.params[1].choices.as_ref().unwrap().len(), 2);
/// ```
pub fn parse_docstring(doc: &str) -> Result<Docstring, DocstringError> {
    let lines: Vec<&str> = doc.lines().map(str::trim).collect();

    let name = lines
        .first()
        .and_then(|first| first.split_whitespace().next())
        .map(str::to_string);

    let description = lines
        .iter()
        .skip(1)
        .take_while(|line| !line.starts_with(PARAMETERS_HEADER))
        .filter(|line| !line.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(" ");

    let mut params: Vec<ParamDoc> = Vec::new();
    let mut current: Option<usize> = None;
    let mut section = Section::Outside;

    for line in &lines {
        match section {
            Section::Outside => {
                if line.starts_with(PARAMETERS_HEADER) {
                    section = Section::Parameters;
                }
            }
            Section::Parameters if line.is_empty() => section = Section::Outside,
            Section::Parameters => {
                if let Some(caps) = PARAM_HEADER_RE.captures(line) {
                    let entry = parse_header(&caps[1], line)?;
                    current = Some(match params.iter().position(|p| p.name == entry.name) {
                        Some(index) => {
                            params[index] = entry;
                            index
                        }
                        None => {
                            params.push(entry);
                            params.len() - 1
                        }
                    });
                } else if let Some(index) = current {
                    let entry = &mut params[index];
                    entry.doc.push_str(line);
                    entry.doc.push(' ');
                }
            }
        }
    }

    for param in &mut params {
        let trimmed = param.doc.trim_end().len();
        param.doc.truncate(trimmed);
    }

    debug!(name = ?name, params = params.len(), "Parsed documentation comment");
    Ok(Docstring {
        name,
        description,
        params,
    })
}

fn parse_header(name: &str, line: &str) -> Result<ParamDoc, DocstringError> {
    let mut entry = ParamDoc::new(name);

    if let Some(found) = CHOICES_RE.find(line) {
        let (value, _) = parse_literal_prefix(&line[found.end()..]).map_err(|err| {
            DocstringError::InvalidLiteral {
                param: name.to_string(),
                field: "choices",
                reason: err.to_string(),
            }
        })?;
        match value {
            Value::Array(items) => entry.choices = Some(items),
            _ => return Err(DocstringError::ChoicesNotSequence(name.to_string())),
        }
    }

    if let Some(found) = GUI_OPTIONS_RE.find(line) {
        let (value, _) = parse_literal_prefix(&line[found.end()..]).map_err(|err| {
            DocstringError::InvalidLiteral {
                param: name.to_string(),
                field: "gui_options",
                reason: err.to_string(),
            }
        })?;
        entry.gui_options = Some(value);
    }

    if let Some(caps) = NARGS_RE.captures(line) {
        let count = caps[1].parse().map_err(|_| DocstringError::InvalidNargs {
            param: name.to_string(),
            value: caps[1].to_string(),
        })?;
        entry.nargs = Some(count);
    }

    Ok(entry)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_blank_first_line_has_no_name() {
        let parsed = parse_docstring("\n    Does a thing\n").unwrap();
        assert_eq!(parsed.name, None);
        assert_eq!(parsed.description, "Does a thing");
        assert!(parsed.params.is_empty());
    }

    #[test]
    fn test_multiline_help_is_space_joined() {
        let doc = "f\n\nParameters\n----------\nw : list[str]\n    Fourth arg.\n    Multiline documentation\n";
        let parsed = parse_docstring(doc).unwrap();
        assert_eq!(parsed.params[0].doc, "Fourth arg. Multiline documentation");
    }

    #[test]
    fn test_blank_line_ends_section() {
        let doc = "f\nParameters\n----------\nx : int\n    First\n\nExamples\n--------\ny : int\n";
        let parsed = parse_docstring(doc).unwrap();
        assert_eq!(parsed.param_names(), vec!["x"]);
    }

    #[test]
    fn test_repeated_name_replaces_in_place() {
        let doc = "f\nParameters\na : int\n    old\nb : int\n    bee\na : str\n    new\n";
        let parsed = parse_docstring(doc).unwrap();
        assert_eq!(parsed.param_names(), vec!["a", "b"]);
        assert_eq!(parsed.params[0].doc, "new");
    }

    #[test]
    fn test_header_attributes() {
        let doc = "f\nParameters\n\
                   k : str, choices=['a', 'b'], nargs=2, gui_options={'widget': 'combo'}\n    pick\n";
        let parsed = parse_docstring(doc).unwrap();
        let k = &parsed.params[0];
        assert_eq!(k.choices, Some(vec![json!("a"), json!("b")]));
        assert_eq!(k.nargs, Some(2));
        assert_eq!(k.gui_options, Some(json!({"widget": "combo"})));
    }

    #[test]
    fn test_choices_must_be_a_sequence() {
        let doc = "f\nParameters\nk : str, choices='a'\n";
        assert_eq!(
            parse_docstring(doc),
            Err(DocstringError::ChoicesNotSequence("k".to_string()))
        );
    }

    #[test]
    fn test_malformed_literal_names_parameter() {
        let doc = "f\nParameters\nk : str, choices=('a', \n";
        let err = parse_docstring(doc).unwrap_err();
        assert!(matches!(
            err,
            DocstringError::InvalidLiteral { ref param, field: "choices", .. } if param == "k"
        ));
    }

    #[test]
    fn test_missing_parameters_section() {
        let parsed = parse_docstring("tool Runs things\nLine one\n\nLine two").unwrap();
        assert_eq!(parsed.name.as_deref(), Some("tool"));
        assert_eq!(parsed.description, "Line one Line two");
        assert!(parsed.params.is_empty());
    }
}
