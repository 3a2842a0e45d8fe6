//! Literal values carried by metadata entries and attributes.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Tagged literal value as written in the source.
///
/// Every literal form of the language has its own variant, so a value read
/// from the source can be written back without losing its kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum Value {
    /// Double-quoted string, already unescaped.
    String(String),
    Number(f64),
    Bool(bool),
    /// Hex color such as `#4A90D9`, kept verbatim.
    Color(String),
    /// Signed percentage, `-5%` is `Percent(-5)`.
    Percent(i64),
    /// Two-stop gradient call `name(#from, #to)`.
    Gradient {
        name: String,
        from: String,
        to: String,
    },
    /// Parenthesized list of items.
    Array(Vec<ArrayItem>),
    /// Bare identifier used as a value, e.g. `direction: LR`.
    Identifier(String),
}

/// One entry of an array value with its optional attribute list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArrayItem {
    pub value: Value,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub attributes: IndexMap<String, Value>,
}

impl ArrayItem {
    pub fn new(value: Value) -> Self {
        Self {
            value,
            attributes: IndexMap::new(),
        }
    }

    pub fn with_attributes(value: Value, attributes: IndexMap<String, Value>) -> Self {
        Self { value, attributes }
    }
}

impl Value {
    /// Returns the text of string-like values.
    ///
    /// Strings, identifiers and colors all have textual content; every other
    /// variant returns `None`.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::String(s) | Self::Identifier(s) | Self::Color(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[ArrayItem]> {
        match self {
            Self::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Returns whether the value counts as "set" for flag-like attributes.
    ///
    /// `false`, `0` and the empty string are falsy, everything else is truthy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Bool(b) => *b,
            Self::Number(n) => *n != 0.0,
            Self::String(s) => !s.is_empty(),
            Self::Percent(p) => *p != 0,
            _ => true,
        }
    }

    /// Returns the name of the variant, used in diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::String(_) => "string",
            Self::Number(_) => "number",
            Self::Bool(_) => "boolean",
            Self::Color(_) => "color",
            Self::Percent(_) => "percentage",
            Self::Gradient { .. } => "gradient",
            Self::Array(_) => "array",
            Self::Identifier(_) => "identifier",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) => write!(f, "{s:?}"),
            Self::Number(n) => write!(f, "{n}"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Color(c) | Self::Identifier(c) => f.write_str(c),
            Self::Percent(p) => write!(f, "{p}%"),
            Self::Gradient { name, from, to } => write!(f, "{name}({from}, {to})"),
            Self::Array(items) => {
                f.write_str("(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item.value)?;
                    if !item.attributes.is_empty() {
                        f.write_str(" [")?;
                        for (j, (key, value)) in item.attributes.iter().enumerate() {
                            if j > 0 {
                                f.write_str(", ")?;
                            }
                            write!(f, "{key}: {value}")?;
                        }
                        f.write_str("]")?;
                    }
                }
                f.write_str(")")
            }
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}
