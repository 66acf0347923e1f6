//! Validators: per-kind conversion between text and semantic values.
//!
//! A validator is a stateless bundle of four capabilities:
//!
//! - [`parse`](Validator::parse) turns raw input (a config value, typed lines)
//!   into a [`Value`].
//! - [`render`](Validator::render) turns a value back into the text that is
//!   written to the config file and offered as a prompt default.
//! - [`validate`](Validator::validate) decides whether a parsed value is
//!   acceptable. A [`Rejection`] is recoverable: prompts ask again, the
//!   importer skips the key.
//! - [`matches`](Validator::matches) decides whether an argument should use the
//!   validator when nothing more specific applies.
//!
//! The built-ins are unit structs exposed through [`Kind`]. Path, file and
//! directory validators never match automatically; register them per
//! argument with [`Validators::with`](crate::Validators::with).

use std::fmt;
use std::path::Path;

use crate::error::{ClapfillError, Rejection};
use crate::schema::{Action, ArgSpec};
use crate::types::{Multiplicity, RawInput, Value};

/// Conversion and validation for one value kind.
pub trait Validator: fmt::Debug {
    /// Short name used in diagnostics and logs.
    fn name(&self) -> &'static str;

    /// Render a value as config-file / default text.
    fn render(&self, value: &Value) -> String;

    /// Convert raw input into a semantic value.
    ///
    /// # Errors
    ///
    /// [`ClapfillError::UnsupportedUsage`] when the input shape cannot be
    /// handled by this kind, [`ClapfillError::InvalidLiteral`] for malformed
    /// list literals.
    fn parse(&self, raw: RawInput) -> Result<Value, ClapfillError>;

    /// Whether a parsed value is acceptable.
    fn validate(&self, value: &Value) -> Result<(), Rejection>;

    /// Whether an argument should use this validator by default.
    fn matches(&self, _spec: &ArgSpec) -> bool {
        false
    }

    /// How prompts collect input for this kind.
    fn question(&self) -> Question {
        Question::Line
    }
}

/// The shape of a prompt question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Question {
    /// One line of text.
    Line,
    /// One item per line until the user ends the list.
    Lines,
    YesNo,
}

/// Tag of a built-in validator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Str,
    Bool,
    List,
    Dummy,
}

static STR: StrValidator = StrValidator;
static BOOL: BoolValidator = BoolValidator;
static LIST: ListValidator = ListValidator;
static DUMMY: DummyValidator = DummyValidator;

impl Kind {
    /// The built-in validator for this kind.
    pub fn validator(self) -> &'static dyn Validator {
        match self {
            Kind::Str => &STR,
            Kind::Bool => &BOOL,
            Kind::List => &LIST,
            Kind::Dummy => &DUMMY,
        }
    }

    /// The kind a value of this shape is handled by.
    pub fn of(value: &Value) -> Kind {
        match value {
            Value::Text(_) => Kind::Str,
            Value::Bool(_) => Kind::Bool,
            Value::List(_) => Kind::List,
        }
    }
}

fn expect_text(validator: &'static str, raw: RawInput) -> Result<String, ClapfillError> {
    match raw {
        RawInput::Text(s) => Ok(s),
        RawInput::Lines(lines) => Err(ClapfillError::UnsupportedUsage {
            validator,
            reason: format!("expected a single value, got {} lines", lines.len()),
        }),
    }
}

/// Free text, trimmed. Empty text is rejected.
#[derive(Debug, Clone, Copy, Default)]
pub struct StrValidator;

impl Validator for StrValidator {
    fn name(&self) -> &'static str {
        "string"
    }

    fn render(&self, value: &Value) -> String {
        value.to_string()
    }

    fn parse(&self, raw: RawInput) -> Result<Value, ClapfillError> {
        let text = expect_text(self.name(), raw)?;
        Ok(Value::Text(text.trim().to_string()))
    }

    fn validate(&self, value: &Value) -> Result<(), Rejection> {
        match value {
            Value::Text(s) if s.is_empty() => Err(Rejection::new("a value is required")),
            _ => Ok(()),
        }
    }

    fn matches(&self, spec: &ArgSpec) -> bool {
        matches!(spec.action, Action::Store | Action::Subcommand)
            && !LIST.matches(spec)
            && !BOOL.matches(spec)
    }
}

/// Tokens that parse as `true`; everything else is `false`.
const TRUE_TOKENS: [&str; 3] = ["1", "true", "yes"];

/// Boolean flags: `1`, `true` and `yes` (any case) are true.
#[derive(Debug, Clone, Copy, Default)]
pub struct BoolValidator;

impl Validator for BoolValidator {
    fn name(&self) -> &'static str {
        "boolean"
    }

    fn render(&self, value: &Value) -> String {
        value.to_string()
    }

    fn parse(&self, raw: RawInput) -> Result<Value, ClapfillError> {
        let text = expect_text(self.name(), raw)?;
        let token = text.trim().to_lowercase();
        Ok(Value::Bool(TRUE_TOKENS.contains(&token.as_str())))
    }

    fn validate(&self, _value: &Value) -> Result<(), Rejection> {
        Ok(())
    }

    fn matches(&self, spec: &ArgSpec) -> bool {
        matches!(spec.default, Some(Value::Bool(_))) || matches!(spec.action, Action::Toggle { .. })
    }

    fn question(&self) -> Question {
        Question::YesNo
    }
}

/// Lists of strings, persisted as a single literal such as `['a', 'b']`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ListValidator;

impl Validator for ListValidator {
    fn name(&self) -> &'static str {
        "list"
    }

    fn render(&self, value: &Value) -> String {
        match value {
            Value::List(items) => render_list(items),
            other => render_list(&[other.to_string()]),
        }
    }

    fn parse(&self, raw: RawInput) -> Result<Value, ClapfillError> {
        let items = match raw {
            RawInput::Text(text) => parse_list(&text)?,
            RawInput::Lines(lines) => lines,
        };
        Ok(Value::List(
            items
                .into_iter()
                .map(|item| item.trim().to_string())
                .filter(|item| !item.is_empty())
                .collect(),
        ))
    }

    fn validate(&self, _value: &Value) -> Result<(), Rejection> {
        Ok(())
    }

    fn matches(&self, spec: &ArgSpec) -> bool {
        spec.action == Action::Append || spec.multiplicity != Multiplicity::Single
    }

    fn question(&self) -> Question {
        Question::Lines
    }
}

/// Used for arguments whose value can never come from a file or a prompt.
#[derive(Debug, Clone, Copy, Default)]
pub struct DummyValidator;

impl Validator for DummyValidator {
    fn name(&self) -> &'static str {
        "dummy"
    }

    fn render(&self, _value: &Value) -> String {
        String::new()
    }

    fn parse(&self, raw: RawInput) -> Result<Value, ClapfillError> {
        Ok(match raw {
            RawInput::Text(s) => Value::Text(s),
            RawInput::Lines(lines) => Value::List(lines),
        })
    }

    fn validate(&self, _value: &Value) -> Result<(), Rejection> {
        Err(Rejection::new("this argument cannot be configured"))
    }
}

/// What a [`PathValidator`] requires the path to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathKind {
    Any,
    File,
    Directory,
}

/// Filesystem paths. Surrounding double quotes (as pasted from a file
/// manager) are stripped once; the path must exist.
#[derive(Debug, Clone, Copy)]
pub struct PathValidator {
    kind: PathKind,
}

impl PathValidator {
    pub fn any() -> Self {
        Self {
            kind: PathKind::Any,
        }
    }

    pub fn file() -> Self {
        Self {
            kind: PathKind::File,
        }
    }

    pub fn directory() -> Self {
        Self {
            kind: PathKind::Directory,
        }
    }

    pub fn kind(&self) -> PathKind {
        self.kind
    }
}

impl Validator for PathValidator {
    fn name(&self) -> &'static str {
        match self.kind {
            PathKind::Any => "path",
            PathKind::File => "file",
            PathKind::Directory => "directory",
        }
    }

    fn render(&self, value: &Value) -> String {
        value.to_string()
    }

    fn parse(&self, raw: RawInput) -> Result<Value, ClapfillError> {
        let text = expect_text(self.name(), raw)?;
        let trimmed = text.trim();
        let unquoted = trimmed
            .strip_prefix('"')
            .and_then(|rest| rest.strip_suffix('"'))
            .unwrap_or(trimmed);
        Ok(Value::Text(unquoted.to_string()))
    }

    fn validate(&self, value: &Value) -> Result<(), Rejection> {
        let Value::Text(text) = value else {
            return Err(Rejection::new("expected a single path"));
        };
        if text.is_empty() {
            return Err(Rejection::new("a path is required"));
        }
        let path = Path::new(text);
        match self.kind {
            PathKind::Any if !path.exists() => {
                Err(Rejection::new(format!("path does not exist: {}", path.display())))
            }
            PathKind::File if !path.is_file() => {
                Err(Rejection::new(format!("not a file: {}", path.display())))
            }
            PathKind::Directory if !path.is_dir() => {
                Err(Rejection::new(format!("not a directory: {}", path.display())))
            }
            _ => Ok(()),
        }
    }
}

/// Render items as a single-quoted list literal: `['a', 'b']`.
pub fn render_list<S: AsRef<str>>(items: &[S]) -> String {
    let quoted: Vec<String> = items
        .iter()
        .map(|item| {
            let mut out = String::with_capacity(item.as_ref().len() + 2);
            out.push('\'');
            for c in item.as_ref().chars() {
                match c {
                    '\\' => out.push_str("\\\\"),
                    '\'' => out.push_str("\\'"),
                    '\n' => out.push_str("\\n"),
                    '\t' => out.push_str("\\t"),
                    c => out.push(c),
                }
            }
            out.push('\'');
            out
        })
        .collect();
    format!("[{}]", quoted.join(", "))
}

/// Parse a list literal of quoted strings.
///
/// Accepts `[...]` or `(...)`, single or double quotes, the escapes written by
/// [`render_list`], and a trailing comma. Nothing is evaluated.
pub fn parse_list(text: &str) -> Result<Vec<String>, ClapfillError> {
    let fail = |reason: &str| ClapfillError::InvalidLiteral {
        text: text.to_string(),
        reason: reason.to_string(),
    };

    let trimmed = text.trim();
    let close = match trimmed.chars().next() {
        Some('[') => ']',
        Some('(') => ')',
        _ => return Err(fail("expected '[' or '('")),
    };
    let inner = trimmed
        .get(1..)
        .and_then(|rest| rest.strip_suffix(close))
        .ok_or_else(|| fail("missing closing bracket"))?;

    let mut items = Vec::new();
    let mut chars = inner.chars().peekable();
    loop {
        while chars.next_if(|c| c.is_whitespace()).is_some() {}
        let Some(quote) = chars.next() else {
            break;
        };
        if quote != '\'' && quote != '"' {
            return Err(fail("expected a quoted string"));
        }

        let mut item = String::new();
        loop {
            match chars.next() {
                None => return Err(fail("unterminated string")),
                Some(c) if c == quote => break,
                Some('\\') => match chars.next() {
                    Some('n') => item.push('\n'),
                    Some('t') => item.push('\t'),
                    Some(c) => item.push(c),
                    None => return Err(fail("unterminated escape")),
                },
                Some(c) => item.push(c),
            }
        }
        items.push(item);

        while chars.next_if(|c| c.is_whitespace()).is_some() {}
        match chars.next() {
            None => break,
            Some(',') => continue,
            Some(_) => return Err(fail("expected ',' between items")),
        }
    }
    Ok(items)
}
