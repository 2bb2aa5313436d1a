//! Declared callable signatures.
//!
//! A [`FunctionDeclaration`] is the neutral view of a callable that the
//! extraction pipeline consumes: its identifier, its documentation comment
//! and an ordered list of [`ParameterDeclaration`]s. Declarations are built
//! by hand with the builder methods, or deserialized from a declaration file
//! where types are written as annotation text and parsed into [`TypeShape`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Structural shape of a declared parameter type.
///
/// # Examples
///
/// ```
/// use docargs_core::TypeShape;
///
/// let shape: TypeShape = "list[int] | None".parse().unwrap();
/// assert_eq!(
///     shape,
///     TypeShape::optional(TypeShape::sequence(TypeShape::named("int")))
/// );
///
/// let shape: TypeShape = "Optional[Path]".parse().unwrap();
/// assert_eq!(shape.to_string(), "Path | None");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum TypeShape {
    /// A plain named type (`int`, `Path`, `None`, a user type, ...).
    Named(String),
    /// A two-armed union of a type and `None`.
    Optional(Box<TypeShape>),
    /// Any other union.
    Union(Vec<TypeShape>),
    /// A list or other homogeneous sequence.
    Sequence(Box<TypeShape>),
    /// A tuple; `tuple[T, ...]` is stored as a single element.
    Tuple(Vec<TypeShape>),
    /// A mapping from keys to values.
    Mapping(Box<TypeShape>, Box<TypeShape>),
}

impl TypeShape {
    /// Creates a named type.
    pub fn named(name: &str) -> Self {
        Self::Named(name.to_string())
    }

    /// Wraps a type as optional.
    pub fn optional(inner: TypeShape) -> Self {
        Self::Optional(Box::new(inner))
    }

    /// Creates a sequence of `element`.
    pub fn sequence(element: TypeShape) -> Self {
        Self::Sequence(Box::new(element))
    }

    /// Creates a mapping type.
    pub fn mapping(key: TypeShape, value: TypeShape) -> Self {
        Self::Mapping(Box::new(key), Box::new(value))
    }

    /// Builds a union, collapsing `T | None` into [`TypeShape::Optional`].
    pub fn union(mut arms: Vec<TypeShape>) -> Self {
        if arms.len() == 1 {
            return arms.remove(0);
        }
        if arms.len() == 2 {
            if arms[1].is_none_type() {
                return Self::optional(arms.remove(0));
            }
            if arms[0].is_none_type() {
                return Self::optional(arms.remove(1));
            }
        }
        Self::Union(arms)
    }

    /// Returns `true` for the `None` type.
    pub fn is_none_type(&self) -> bool {
        matches!(self, Self::Named(name) if name == "None" || name == "NoneType")
    }
}

impl fmt::Display for TypeShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named(name) => f.write_str(name),
            Self::Optional(inner) => write!(f, "{inner} | None"),
            Self::Union(arms) => {
                for (i, arm) in arms.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" | ")?;
                    }
                    write!(f, "{arm}")?;
                }
                Ok(())
            }
            Self::Sequence(element) => write!(f, "list[{element}]"),
            Self::Tuple(items) if items.len() == 1 => write!(f, "tuple[{}, ...]", items[0]),
            Self::Tuple(items) => {
                f.write_str("tuple[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Self::Mapping(key, value) => write!(f, "dict[{key}, {value}]"),
        }
    }
}

/// Error raised when annotation text cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid type annotation '{input}': {reason}")]
pub struct TypeParseError {
    /// The annotation text.
    pub input: String,
    /// What went wrong.
    pub reason: String,
}

impl FromStr for TypeShape {
    type Err = TypeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parser = AnnotationParser { input: s, pos: 0 };
        let shape = parser.parse_union().map_err(|reason| TypeParseError {
            input: s.to_string(),
            reason,
        })?;
        parser.skip_ws();
        if parser.pos != s.len() {
            return Err(TypeParseError {
                input: s.to_string(),
                reason: format!("unexpected trailing input at offset {}", parser.pos),
            });
        }
        Ok(shape)
    }
}

impl TryFrom<String> for TypeShape {
    type Error = TypeParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TypeShape> for String {
    fn from(shape: TypeShape) -> Self {
        shape.to_string()
    }
}

struct AnnotationParser<'a> {
    input: &'a str,
    pos: usize,
}

impl AnnotationParser<'_> {
    fn skip_ws(&mut self) {
        while let Some(ch) = self.peek() {
            if !ch.is_whitespace() {
                break;
            }
            self.pos += ch.len_utf8();
        }
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn eat(&mut self, expected: char) -> bool {
        self.skip_ws();
        if self.peek() == Some(expected) {
            self.pos += expected.len_utf8();
            true
        } else {
            false
        }
    }

    fn parse_union(&mut self) -> Result<TypeShape, String> {
        let mut arms = vec![self.parse_term()?];
        while self.eat('|') {
            arms.push(self.parse_term()?);
        }
        Ok(TypeShape::union(arms))
    }

    fn parse_ident(&mut self) -> Result<&str, String> {
        self.skip_ws();
        let start = self.pos;
        while let Some(ch) = self.peek() {
            if ch.is_alphanumeric() || ch == '_' || ch == '.' {
                self.pos += ch.len_utf8();
            } else {
                break;
            }
        }
        if start == self.pos {
            return Err(format!("expected a type name at offset {start}"));
        }
        Ok(&self.input[start..self.pos])
    }

    fn parse_term(&mut self) -> Result<TypeShape, String> {
        let ident = self.parse_ident()?.to_string();
        if !self.eat('[') {
            return Ok(TypeShape::Named(ident));
        }

        let mut args = Vec::new();
        let mut variadic = false;
        loop {
            self.skip_ws();
            if self.input[self.pos..].starts_with("...") {
                self.pos += 3;
                variadic = true;
            } else {
                args.push(self.parse_union()?);
            }
            if self.eat(']') {
                break;
            }
            if !self.eat(',') {
                return Err(format!("expected ',' or ']' at offset {}", self.pos));
            }
        }

        let base = ident.rsplit('.').next().unwrap_or(&ident);
        match base {
            "list" | "List" | "Sequence" | "Iterable" | "set" | "Set" | "frozenset" => {
                expect_arity(base, &args, 1)?;
                Ok(TypeShape::sequence(args.remove(0)))
            }
            "tuple" | "Tuple" => {
                if variadic {
                    expect_arity(base, &args, 1)?;
                }
                Ok(TypeShape::Tuple(args))
            }
            "dict" | "Dict" | "Mapping" => {
                expect_arity(base, &args, 2)?;
                let value = args.remove(1);
                let key = args.remove(0);
                Ok(TypeShape::mapping(key, value))
            }
            "Optional" => {
                expect_arity(base, &args, 1)?;
                Ok(TypeShape::optional(args.remove(0)))
            }
            "Union" if !args.is_empty() => Ok(TypeShape::union(args)),
            _ => Err(format!("unsupported generic type '{ident}'")),
        }
    }
}

fn expect_arity(base: &str, args: &[TypeShape], n: usize) -> Result<(), String> {
    if args.len() == n {
        Ok(())
    } else {
        Err(format!("{base} takes {n} type argument(s), got {}", args.len()))
    }
}

/// Role of a parameter in the callable's signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParameterKind {
    /// A regular named parameter.
    #[default]
    Regular,
    /// Catch-all for extra positional arguments.
    VarPositional,
    /// Catch-all for extra keyword arguments.
    VarKeyword,
}

/// One parameter of a declared callable.
///
/// `default` distinguishes "no default" (`None`) from an explicit null
/// default (`Some(Value::Null)`).
///
/// # Examples
///
/// ```
/// use docargs_core::{ParameterDeclaration, TypeShape};
///
/// let x = ParameterDeclaration::required("x", TypeShape::named("int"));
/// assert!(x.default.is_none());
///
/// let ll = ParameterDeclaration::optional(
///     "ll",
///     TypeShape::sequence(TypeShape::named("int")),
///     serde_json::Value::Null,
/// );
/// assert_eq!(ll.default, Some(serde_json::Value::Null));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterDeclaration {
    /// Parameter identifier.
    pub name: String,
    /// Signature role.
    #[serde(default)]
    pub kind: ParameterKind,
    /// Declared type, if annotated.
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub annotation: Option<TypeShape>,
    /// Declared default, if any.
    #[serde(
        default,
        deserialize_with = "deserialize_present",
        skip_serializing_if = "Option::is_none"
    )]
    pub default: Option<Value>,
}

fn deserialize_present<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Value>, D::Error> {
    Value::deserialize(deserializer).map(Some)
}

impl ParameterDeclaration {
    /// Creates a parameter without a default.
    pub fn required(name: &str, annotation: TypeShape) -> Self {
        Self {
            name: name.to_string(),
            kind: ParameterKind::Regular,
            annotation: Some(annotation),
            default: None,
        }
    }

    /// Creates a parameter with a default.
    pub fn optional(name: &str, annotation: TypeShape, default: Value) -> Self {
        Self {
            default: Some(default),
            ..Self::required(name, annotation)
        }
    }

    /// Creates a variadic parameter of the given kind.
    pub fn variadic(name: &str, kind: ParameterKind) -> Self {
        Self {
            name: name.to_string(),
            kind,
            annotation: None,
            default: None,
        }
    }

    /// Returns `true` if the parameter never appears on the command line.
    pub fn is_excluded(&self) -> bool {
        self.name.starts_with('_') || self.kind != ParameterKind::Regular
    }
}

/// A callable's identifier, documentation and signature.
///
/// # Examples
///
/// ```
/// use docargs_core::{FunctionDeclaration, ParameterDeclaration, TypeShape};
///
/// let decl = FunctionDeclaration::new("greet")
///     .with_doc("greet Say hello\n\nParameters\n----------\nname : str\n    Who to greet\n")
///     .with_param(ParameterDeclaration::required("name", TypeShape::named("str")));
/// assert_eq!(decl.parameters.len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FunctionDeclaration {
    /// Declared identifier of the callable.
    pub name: String,
    /// Documentation comment, if present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc: Option<String>,
    /// Parameters in signature order.
    #[serde(default)]
    pub parameters: Vec<ParameterDeclaration>,
}

impl FunctionDeclaration {
    /// Creates an undocumented declaration with no parameters.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    /// Sets the documentation comment.
    pub fn with_doc(mut self, doc: &str) -> Self {
        self.doc = Some(doc.to_string());
        self
    }

    /// Appends a parameter.
    pub fn with_param(mut self, param: ParameterDeclaration) -> Self {
        self.parameters.push(param);
        self
    }
}
