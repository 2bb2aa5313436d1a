//! Literal values embedded in documentation comments.
//!
//! Parameter headers may carry `choices=` and `gui_options=` attributes
//! written as literals: quoted strings, numbers, `True`/`False`/`None`,
//! tuples, lists, sets and dicts. They are converted to JSON values; tuples
//! and sets become arrays and dict keys are stringified.

use serde_json::{Map, Number, Value};
use thiserror::Error;

/// Error raised for malformed literal text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{reason} at offset {offset}")]
pub struct LiteralError {
    /// Byte offset into the input.
    pub offset: usize,
    /// What went wrong.
    pub reason: String,
}

/// Parses one literal at the start of `input`.
///
/// Returns the value and the unparsed remainder.
///
/// # Examples
///
/// ```
/// use docargs_extract::literal::parse_literal_prefix;
/// use serde_json::json;
///
/// let (value, rest) = parse_literal_prefix(r#"("a", 'b') trailing"#).unwrap();
/// assert_eq!(value, json!(["a", "b"]));
/// assert_eq!(rest, " trailing");
/// ```
pub fn parse_literal_prefix(input: &str) -> Result<(Value, &str), LiteralError> {
    let mut cursor = Cursor { src: input, pos: 0 };
    let value = cursor.value()?;
    Ok((value, &input[cursor.pos..]))
}

/// Parses `input` as exactly one literal, surrounded by optional whitespace.
///
/// # Examples
///
/// ```
/// use docargs_extract::literal::parse_literal;
/// use serde_json::json;
///
/// assert_eq!(parse_literal("{'min': 0, 1: None}").unwrap(), json!({"min": 0, "1": null}));
/// assert!(parse_literal("[1, 2").is_err());
/// ```
pub fn parse_literal(input: &str) -> Result<Value, LiteralError> {
    let mut cursor = Cursor { src: input, pos: 0 };
    let value = cursor.value()?;
    cursor.skip_ws();
    if cursor.pos < input.len() {
        return Err(cursor.error("unexpected trailing characters"));
    }
    Ok(value)
}

struct Cursor<'a> {
    src: &'a str,
    pos: usize,
}

impl Cursor<'_> {
    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += ch.len_utf8();
        Some(ch)
    }

    fn skip_ws(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
    }

    fn eat(&mut self, expected: char) -> bool {
        self.skip_ws();
        if self.peek() == Some(expected) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn error(&self, reason: &str) -> LiteralError {
        LiteralError {
            offset: self.pos,
            reason: reason.to_string(),
        }
    }

    fn value(&mut self) -> Result<Value, LiteralError> {
        self.skip_ws();
        match self.peek() {
            Some('\'' | '"') => self.string().map(Value::String),
            Some('(') => self.tuple(),
            Some('[') => {
                self.bump();
                self.items(']').map(Value::Array)
            }
            Some('{') => self.dict_or_set(),
            Some(ch) if ch.is_ascii_digit() || matches!(ch, '-' | '+' | '.') => self.number(),
            Some(ch) if ch.is_alphabetic() || ch == '_' => self.keyword(),
            Some(_) => Err(self.error("unexpected character")),
            None => Err(self.error("unexpected end of input")),
        }
    }

    fn string(&mut self) -> Result<String, LiteralError> {
        let Some(quote) = self.bump() else {
            return Err(self.error("expected string"));
        };
        let mut out = String::new();
        loop {
            match self.bump() {
                None => return Err(self.error("unterminated string")),
                Some(ch) if ch == quote => return Ok(out),
                Some('\\') => match self.bump() {
                    Some('n') => out.push('\n'),
                    Some('t') => out.push('\t'),
                    Some('r') => out.push('\r'),
                    Some('0') => out.push('\0'),
                    Some(ch @ ('\\' | '\'' | '"')) => out.push(ch),
                    Some(ch) => {
                        out.push('\\');
                        out.push(ch);
                    }
                    None => return Err(self.error("unterminated string")),
                },
                Some(ch) => out.push(ch),
            }
        }
    }

    /// `(x)` is a parenthesized value, `(x,)` and `(x, y)` are tuples.
    fn tuple(&mut self) -> Result<Value, LiteralError> {
        self.bump();
        if self.eat(')') {
            return Ok(Value::Array(Vec::new()));
        }
        let first = self.value()?;
        if self.eat(')') {
            return Ok(first);
        }
        if !self.eat(',') {
            return Err(self.error("expected ',' or ')'"));
        }
        let mut items = vec![first];
        items.extend(self.items(')')?);
        Ok(Value::Array(items))
    }

    /// Comma-separated values up to `close`; a trailing comma is allowed.
    fn items(&mut self, close: char) -> Result<Vec<Value>, LiteralError> {
        let mut items = Vec::new();
        loop {
            if self.eat(close) {
                return Ok(items);
            }
            items.push(self.value()?);
            if self.eat(close) {
                return Ok(items);
            }
            if !self.eat(',') {
                return Err(self.error(&format!("expected ',' or '{close}'")));
            }
        }
    }

    fn dict_or_set(&mut self) -> Result<Value, LiteralError> {
        self.bump();
        if self.eat('}') {
            return Ok(Value::Object(Map::new()));
        }
        let first = self.value()?;
        if !self.eat(':') {
            // Set literal.
            if self.eat('}') {
                return Ok(Value::Array(vec![first]));
            }
            if !self.eat(',') {
                return Err(self.error("expected ',', ':' or '}'"));
            }
            let mut items = vec![first];
            items.extend(self.items('}')?);
            return Ok(Value::Array(items));
        }

        let mut map = Map::new();
        let value = self.value()?;
        map.insert(key_string(first), value);
        loop {
            if self.eat('}') {
                return Ok(Value::Object(map));
            }
            if !self.eat(',') {
                return Err(self.error("expected ',' or '}'"));
            }
            if self.eat('}') {
                return Ok(Value::Object(map));
            }
            let key = self.value()?;
            if !self.eat(':') {
                return Err(self.error("expected ':'"));
            }
            let value = self.value()?;
            map.insert(key_string(key), value);
        }
    }

    fn number(&mut self) -> Result<Value, LiteralError> {
        let start = self.pos;
        if matches!(self.peek(), Some('-' | '+')) {
            self.bump();
        }
        let mut is_float = false;
        while let Some(ch) = self.peek() {
            match ch {
                '0'..='9' | '_' => {}
                '.' => is_float = true,
                'e' | 'E' => {
                    is_float = true;
                    self.bump();
                    if matches!(self.peek(), Some('-' | '+')) {
                        self.bump();
                    }
                    continue;
                }
                _ => break,
            }
            self.bump();
        }

        let text: String = self.src[start..self.pos].chars().filter(|&c| c != '_').collect();
        if !is_float {
            if let Ok(int) = text.parse::<i64>() {
                return Ok(Value::Number(int.into()));
            }
        }
        text.parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map(Value::Number)
            .ok_or_else(|| LiteralError {
                offset: start,
                reason: format!("invalid number '{text}'"),
            })
    }

    fn keyword(&mut self) -> Result<Value, LiteralError> {
        let start = self.pos;
        while self.peek().is_some_and(|ch| ch.is_alphanumeric() || ch == '_') {
            self.bump();
        }
        match &self.src[start..self.pos] {
            "True" => Ok(Value::Bool(true)),
            "False" => Ok(Value::Bool(false)),
            "None" => Ok(Value::Null),
            other => Err(LiteralError {
                offset: start,
                reason: format!("unsupported name '{other}'"),
            }),
        }
    }
}

fn key_string(key: Value) -> String {
    match key {
        Value::String(text) => text,
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_scalars() {
        assert_eq!(parse_literal("42").unwrap(), json!(42));
        assert_eq!(parse_literal("-3").unwrap(), json!(-3));
        assert_eq!(parse_literal("2.5").unwrap(), json!(2.5));
        assert_eq!(parse_literal("1e3").unwrap(), json!(1000.0));
        assert_eq!(parse_literal("1_000").unwrap(), json!(1000));
        assert_eq!(parse_literal("True").unwrap(), json!(true));
        assert_eq!(parse_literal("None").unwrap(), Value::Null);
        assert_eq!(parse_literal(r#""a\"b""#).unwrap(), json!("a\"b"));
    }

    #[test]
    fn test_parenthesized_value_is_not_a_tuple() {
        assert_eq!(parse_literal("(5)").unwrap(), json!(5));
        assert_eq!(parse_literal("(5,)").unwrap(), json!([5]));
        assert_eq!(parse_literal("()").unwrap(), json!([]));
    }

    #[test]
    fn test_nested_containers() {
        let value = parse_literal("{'type': 'slider', 'range': (0, 10), 'tags': {'a', 'b'},}").unwrap();
        assert_eq!(
            value,
            json!({"type": "slider", "range": [0, 10], "tags": ["a", "b"]})
        );
    }

    #[test]
    fn test_rejects_unknown_names() {
        let err = parse_literal("[foo]").unwrap_err();
        assert_eq!(err.offset, 1);
    }

    #[test]
    fn test_prefix_stops_after_first_value() {
        let (value, rest) = parse_literal_prefix("['x', 'y'], nargs=2").unwrap();
        assert_eq!(value, json!(["x", "y"]));
        assert_eq!(rest, ", nargs=2");
    }
}
