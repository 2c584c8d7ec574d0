//! Values written to devices
//!
//! A value is a number or text. Numbers read from table cells are floats;
//! integers exist for commands built directly by callers.

use crate::number::{format_float, parse_number};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Value of a Set, Wait or list element
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Integer(i64),
    Number(f64),
    Text(String),
}

impl Value {
    /// Number if the text looks like one, otherwise text
    pub fn parse(text: &str) -> Self {
        let text = text.trim();
        match parse_number(text) {
            Some(n) => Value::Number(n),
            None => Value::Text(text.to_string()),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Rendering used inside command text: text is quoted, numbers are not
    pub fn repr(&self) -> String {
        match self {
            Value::Text(s) => quote(s),
            other => other.to_string(),
        }
    }
}

/// Single-quote text the way command renderings show it
pub fn quote(text: &str) -> String {
    format!("'{}'", text.replace('\\', "\\\\").replace('\'', "\\'"))
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Integer(i) => write!(f, "{}", i),
            Value::Number(n) => write!(f, "{}", format_float(*n)),
            Value::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Integer(i as i64)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}
