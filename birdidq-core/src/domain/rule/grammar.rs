// birdidq-core/src/domain/rule/grammar.rs

// Closed grammar for rule statements such as
//   validator.expect_column_values_to_be_between(column="amount", min_value=0)
// Statements are parsed into data, never executed as code.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

pub const VALIDATOR_PREFIX: &str = "validator.";

#[derive(Debug, Error, PartialEq)]
#[error("{message} (at char {position})")]
pub struct GrammarError {
    pub message: String,
    pub position: usize,
}

/// A literal argument value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ArgValue {
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<ArgValue>),
}

impl ArgValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ArgValue::Int(i) => Some(*i as f64),
            ArgValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ArgValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ArgValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Textual form compared against cell values.
    pub fn to_text(&self) -> String {
        match self {
            ArgValue::None => String::new(),
            ArgValue::Bool(b) => b.to_string(),
            ArgValue::Int(i) => i.to_string(),
            ArgValue::Float(f) => f.to_string(),
            ArgValue::Str(s) => s.clone(),
            ArgValue::List(items) => items
                .iter()
                .map(ArgValue::to_text)
                .collect::<Vec<_>>()
                .join(","),
        }
    }
}

impl fmt::Display for ArgValue {
    /// Renders the value back in statement syntax.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgValue::None => write!(f, "None"),
            ArgValue::Bool(true) => write!(f, "True"),
            ArgValue::Bool(false) => write!(f, "False"),
            ArgValue::Int(i) => write!(f, "{i}"),
            ArgValue::Float(x) => write!(f, "{x:?}"),
            ArgValue::Str(s) if s.contains('\\') && !s.contains('"') => write!(f, "r\"{s}\""),
            ArgValue::Str(s) => write!(f, "\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\"")),
            ArgValue::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
        }
    }
}

/// A parsed statement: rule name plus its arguments, in source order.
#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
    pub name: String,
    pub positional: Vec<ArgValue>,
    pub keywords: Vec<(String, ArgValue)>,
}

pub fn parse_statement(input: &str) -> Result<Invocation, GrammarError> {
    let mut parser = Parser::new(input);
    parser.skip_ws();
    parser.eat_keyword(VALIDATOR_PREFIX);
    let name = parser.identifier()?;
    parser.skip_ws();
    parser.expect('(')?;

    let mut positional = Vec::new();
    let mut keywords: Vec<(String, ArgValue)> = Vec::new();

    loop {
        parser.skip_ws();
        if parser.peek() == Some(')') {
            parser.bump();
            break;
        }

        let start = parser.pos;
        if let Some(key) = parser.try_keyword_name() {
            let value = parser.value()?;
            if keywords.iter().any(|(k, _)| *k == key) {
                return Err(parser.error_at(start, format!("duplicate argument '{key}'")));
            }
            keywords.push((key, value));
        } else {
            if !keywords.is_empty() {
                return Err(parser.error_at(start, "positional argument after keyword argument"));
            }
            positional.push(parser.value()?);
        }

        parser.skip_ws();
        match parser.bump() {
            Some(',') => continue,
            Some(')') => break,
            Some(c) => return Err(parser.error(format!("expected ',' or ')', found '{c}'"))),
            None => return Err(parser.error("unterminated argument list")),
        }
    }

    parser.skip_ws();
    while parser.peek() == Some(';') {
        parser.bump();
        parser.skip_ws();
    }
    if let Some(c) = parser.peek() {
        return Err(parser.error(format!("unexpected trailing '{c}'")));
    }

    Ok(Invocation {
        name,
        positional,
        keywords,
    })
}

struct Parser {
    chars: Vec<char>,
    pos: usize,
}

impl Parser {
    fn new(input: &str) -> Self {
        Self {
            chars: input.chars().collect(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        Some(c)
    }

    fn skip_ws(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
    }

    fn error(&self, message: impl Into<String>) -> GrammarError {
        self.error_at(self.pos, message)
    }

    fn error_at(&self, position: usize, message: impl Into<String>) -> GrammarError {
        GrammarError {
            message: message.into(),
            position,
        }
    }

    fn expect(&mut self, expected: char) -> Result<(), GrammarError> {
        match self.bump() {
            Some(c) if c == expected => Ok(()),
            Some(c) => Err(self.error_at(self.pos - 1, format!("expected '{expected}', found '{c}'"))),
            None => Err(self.error(format!("expected '{expected}'"))),
        }
    }

    fn eat_keyword(&mut self, keyword: &str) -> bool {
        let kw: Vec<char> = keyword.chars().collect();
        if self.chars[self.pos..].starts_with(&kw) {
            self.pos += kw.len();
            true
        } else {
            false
        }
    }

    fn identifier(&mut self) -> Result<String, GrammarError> {
        let start = self.pos;
        match self.peek() {
            Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
            _ => return Err(self.error("expected a rule name")),
        }
        while self
            .peek()
            .is_some_and(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            self.pos += 1;
        }
        Ok(self.chars[start..self.pos].iter().collect())
    }

    /// Consumes `name =` when present; rewinds otherwise.
    fn try_keyword_name(&mut self) -> Option<String> {
        let start = self.pos;
        let Ok(name) = self.identifier() else {
            self.pos = start;
            return None;
        };
        self.skip_ws();
        if self.peek() == Some('=') && self.peek_at(1) != Some('=') {
            self.pos += 1;
            Some(name)
        } else {
            self.pos = start;
            None
        }
    }

    fn value(&mut self) -> Result<ArgValue, GrammarError> {
        self.skip_ws();
        let Some(c) = self.peek() else {
            return Err(self.error("expected a value"));
        };

        match c {
            '"' | '\'' => self.string(false).map(ArgValue::Str),
            'r' | 'R' if matches!(self.peek_at(1), Some('"' | '\'')) => {
                self.pos += 1;
                self.string(true).map(ArgValue::Str)
            }
            'u' | 'U' if matches!(self.peek_at(1), Some('"' | '\'')) => {
                self.pos += 1;
                self.string(false).map(ArgValue::Str)
            }
            '[' => self.sequence(']'),
            '(' => self.sequence(')'),
            '{' => self.sequence('}'),
            c if c.is_ascii_digit() || c == '-' || c == '+' || c == '.' => self.number(),
            c if c.is_ascii_alphabetic() => {
                let start = self.pos;
                let word = self.identifier()?;
                match word.as_str() {
                    "True" | "true" => Ok(ArgValue::Bool(true)),
                    "False" | "false" => Ok(ArgValue::Bool(false)),
                    "None" | "null" => Ok(ArgValue::None),
                    other => Err(self.error_at(start, format!("unsupported expression '{other}'"))),
                }
            }
            other => Err(self.error(format!("unexpected '{other}'"))),
        }
    }

    fn string(&mut self, raw: bool) -> Result<String, GrammarError> {
        let quote = self.bump().ok_or_else(|| self.error("expected a string"))?;
        let mut out = String::new();
        loop {
            let Some(c) = self.bump() else {
                return Err(self.error("unterminated string"));
            };
            if c == quote {
                return Ok(out);
            }
            if c != '\\' {
                out.push(c);
                continue;
            }
            let Some(next) = self.bump() else {
                return Err(self.error("unterminated string"));
            };
            if raw {
                // Raw strings keep the backslash, an escaped quote does not terminate.
                out.push('\\');
                out.push(next);
                continue;
            }
            match next {
                '\\' => out.push('\\'),
                '\'' => out.push('\''),
                '"' => out.push('"'),
                'n' => out.push('\n'),
                't' => out.push('\t'),
                other => {
                    out.push('\\');
                    out.push(other);
                }
            }
        }
    }

    fn sequence(&mut self, close: char) -> Result<ArgValue, GrammarError> {
        self.bump();
        let mut items = Vec::new();
        loop {
            self.skip_ws();
            if self.peek() == Some(close) {
                self.bump();
                return Ok(ArgValue::List(items));
            }
            items.push(self.value()?);
            self.skip_ws();
            match self.bump() {
                Some(',') => continue,
                Some(c) if c == close => return Ok(ArgValue::List(items)),
                Some(c) => return Err(self.error(format!("expected ',' or '{close}', found '{c}'"))),
                None => return Err(self.error("unterminated list")),
            }
        }
    }

    fn number(&mut self) -> Result<ArgValue, GrammarError> {
        let start = self.pos;
        if matches!(self.peek(), Some('-' | '+')) {
            self.pos += 1;
        }
        while self
            .peek()
            .is_some_and(|c| c.is_ascii_digit() || matches!(c, '.' | '_' | 'e' | 'E'))
        {
            // exponent sign
            if matches!(self.peek(), Some('e' | 'E')) && matches!(self.peek_at(1), Some('-' | '+')) {
                self.pos += 1;
            }
            self.pos += 1;
        }
        let text: String = self.chars[start..self.pos]
            .iter()
            .filter(|c| **c != '_')
            .collect();

        let is_float = text.contains(['.', 'e', 'E']);
        if !is_float && let Ok(i) = text.parse::<i64>() {
            return Ok(ArgValue::Int(i));
        }
        text.parse::<f64>()
            .map(ArgValue::Float)
            .map_err(|_| self.error_at(start, format!("invalid number '{text}'")))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_keyword_statement() {
        let inv = parse_statement(
            r#"validator.expect_column_values_to_be_between(column="amount", min_value=0, strict_min=True)"#,
        )
        .unwrap();
        assert_eq!(inv.name, "expect_column_values_to_be_between");
        assert!(inv.positional.is_empty());
        assert_eq!(
            inv.keywords,
            vec![
                ("column".to_string(), ArgValue::Str("amount".into())),
                ("min_value".to_string(), ArgValue::Int(0)),
                ("strict_min".to_string(), ArgValue::Bool(true)),
            ]
        );
    }

    #[test]
    fn test_parse_without_prefix_and_positional() {
        let inv = parse_statement("expect_column_values_to_be_unique('id');").unwrap();
        assert_eq!(inv.name, "expect_column_values_to_be_unique");
        assert_eq!(inv.positional, vec![ArgValue::Str("id".into())]);
    }

    #[test]
    fn test_parse_raw_regex_keeps_backslashes() {
        let inv = parse_statement(
            r#"validator.expect_column_values_to_not_match_regex(column="address", regex=r"^\d")"#,
        )
        .unwrap();
        assert_eq!(inv.keywords[1].1, ArgValue::Str(r"^\d".into()));
    }

    #[test]
    fn test_parse_lists_and_floats() {
        let inv = parse_statement(
            "validator.expect_column_values_to_be_in_set(column='status', value_set=['A', 'B', 3], mostly=0.95)",
        )
        .unwrap();
        assert_eq!(
            inv.keywords[1].1,
            ArgValue::List(vec![
                ArgValue::Str("A".into()),
                ArgValue::Str("B".into()),
                ArgValue::Int(3)
            ])
        );
        assert_eq!(inv.keywords[2].1, ArgValue::Float(0.95));
    }

    #[test]
    fn test_rejects_code_injection() {
        assert!(parse_statement("validator.expect_x(column=__import__('os'))").is_err());
        assert!(parse_statement("import os").is_err());
        assert!(parse_statement("validator.expect_x(column='a'); os.system('rm')").is_err());
    }

    #[test]
    fn test_rejects_unterminated() {
        let err = parse_statement("validator.expect_x(column='a'").unwrap_err();
        assert!(err.message.contains("unterminated"));
    }

    #[test]
    fn test_display_round_trips_through_parser() {
        let values = vec![
            ArgValue::Str(r"^\d{3}$".into()),
            ArgValue::Str("say \"hi\" \\ there".into()),
            ArgValue::Float(1.0),
            ArgValue::List(vec![ArgValue::Int(-2), ArgValue::None]),
        ];
        for value in values {
            let stmt = format!("expect_x(v={value})");
            let inv = parse_statement(&stmt).unwrap();
            assert_eq!(inv.keywords[0].1, value, "statement: {stmt}");
        }
    }
}
