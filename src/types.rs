//! Shared value types: semantic argument values, raw textual input, and the
//! config-file location.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::validator::render_list;

/// Reserved config key recording which sub-command was selected in a section.
///
/// It is also the name of the selector argument in a [`Schema`](crate::Schema)
/// and the name to put in an ask-list to have the selector prompted.
pub const SUBCOMMAND_KEY: &str = "__subcommand__";

/// The semantic value of one argument.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    Text(String),
    List(Vec<String>),
}

impl Value {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{b}"),
            Value::Text(s) => f.write_str(s),
            Value::List(items) => f.write_str(&render_list(items)),
        }
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

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<Vec<String>> for Value {
    fn from(items: Vec<String>) -> Self {
        Value::List(items)
    }
}

impl From<Vec<&str>> for Value {
    fn from(items: Vec<&str>) -> Self {
        Value::List(items.into_iter().map(str::to_string).collect())
    }
}

/// Raw input handed to a validator: a single piece of text (a config value or
/// one typed line) or lines that were already split (multi-line prompts,
/// native TOML arrays).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawInput {
    Text(String),
    Lines(Vec<String>),
}

impl RawInput {
    pub fn is_empty(&self) -> bool {
        match self {
            RawInput::Text(s) => s.is_empty(),
            RawInput::Lines(lines) => lines.is_empty(),
        }
    }
}

impl From<&str> for RawInput {
    fn from(s: &str) -> Self {
        RawInput::Text(s.to_string())
    }
}

impl From<String> for RawInput {
    fn from(s: String) -> Self {
        RawInput::Text(s)
    }
}

impl From<Vec<String>> for RawInput {
    fn from(lines: Vec<String>) -> Self {
        RawInput::Lines(lines)
    }
}

/// How many values an argument takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Multiplicity {
    #[default]
    Single,
    ZeroOrMore,
    OneOrMore,
}

/// Where the config file lives.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchPath {
    /// Platform config directory (XDG on Linux, ~/Library/Application Support on macOS).
    Platform,
    /// A subdirectory under the user's home directory, e.g. `Home(".myapp")`.
    Home(&'static str),
    /// Current working directory.
    Cwd,
    /// An explicit directory.
    Path(PathBuf),
}
