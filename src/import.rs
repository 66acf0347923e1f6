//! Config import: read staged defaults out of a config document.
//!
//! The root table is the top-level section. The reserved
//! [`SUBCOMMAND_KEY`](crate::SUBCOMMAND_KEY) names the selected sub-command,
//! whose own section is the table of the same name inside the current one:
//!
//! ```toml
//! test = "123"
//! ok = "true"
//! __subcommand__ = "sub1"
//!
//! [sub1]
//! sub1 = "aaa"
//! ```
//!
//! Nothing here touches the schema. The staged values are returned to the
//! caller, which applies them with [`Schema::with_defaults`].

use std::path::Path;

use toml_edit::{DocumentMut, Item, TableLike};

use crate::error::ClapfillError;
use crate::registry::Validators;
use crate::schema::Schema;
use crate::types::{RawInput, Value};
use crate::values::{ArgValues, dotted};

/// Stage the values of a config file. A missing file stages nothing.
///
/// # Errors
///
/// I/O failures other than a missing file, plus everything
/// [`import_document`] returns.
pub fn import_file(
    schema: &Schema,
    validators: &Validators,
    path: &Path,
) -> Result<ArgValues, ClapfillError> {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "no config file, nothing to import");
            return Ok(ArgValues::new());
        }
        Err(e) => {
            return Err(ClapfillError::IoError {
                path: path.to_path_buf(),
                source: e,
            });
        }
    };
    import_document(schema, validators, &content, path)
}

/// Stage the values of a config document. `path` is only used in errors.
///
/// Values the validator rejects are skipped with a warning and keep their
/// prior default.
///
/// # Errors
///
/// [`ClapfillError::ParseError`] for a malformed document,
/// [`ClapfillError::InvalidValue`] for a value its validator cannot parse.
pub fn import_document(
    schema: &Schema,
    validators: &Validators,
    content: &str,
    path: &Path,
) -> Result<ArgValues, ClapfillError> {
    let doc: DocumentMut = content.parse().map_err(|e| ClapfillError::ParseError {
        path: path.to_path_buf(),
        source: e,
    })?;
    import_section(schema, validators, doc.as_table(), "")
}

fn import_section(
    schema: &Schema,
    validators: &Validators,
    section: &dyn TableLike,
    prefix: &str,
) -> Result<ArgValues, ClapfillError> {
    let mut staged = ArgValues::new();

    for (spec, validator) in validators.walk(schema, None)? {
        let Some(item) = section.get(&spec.name) else {
            continue;
        };
        let key = dotted(prefix, &spec.name);
        let Some(raw) = raw_input(item) else {
            tracing::warn!(%key, "config entry is not a value, skipping");
            continue;
        };

        let parsed = validator.parse(raw).map_err(|e| match e {
            ClapfillError::InvalidLiteral { reason, .. } => ClapfillError::InvalidValue {
                key: key.clone(),
                reason,
            },
            other => other,
        })?;
        if let Err(rejection) = validator.validate(&parsed) {
            tracing::warn!(%key, %rejection, "config value rejected, keeping default");
            continue;
        }

        if spec.is_selector() {
            let Value::Text(name) = parsed else {
                continue;
            };
            let Some(child) = schema.find_subcommand(&name) else {
                tracing::warn!(%key, subcommand = %name, "unknown subcommand in config, skipping");
                continue;
            };
            let child_values = match section.get(&name).and_then(Item::as_table_like) {
                Some(child_section) => {
                    import_section(child, validators, child_section, &dotted(prefix, &name))?
                }
                None => ArgValues::new(),
            };
            tracing::debug!(%key, subcommand = %name, "staged subcommand");
            staged.set_subcommand(&name, child_values);
            continue;
        }

        let value = match (spec.is_toggle(), parsed) {
            (true, Value::Bool(engaged)) => spec
                .toggle_value(engaged)
                .ok_or_else(|| ClapfillError::UnsupportedShape(spec.name.clone()))?,
            (_, parsed) => parsed,
        };
        tracing::debug!(%key, %value, "staged config value");
        staged.set(&spec.name, value);
    }

    Ok(staged)
}

/// Raw input for a config entry. Strings are taken verbatim, other scalars by
/// their TOML text, arrays as already-split lines. Tables yield `None`.
fn raw_input(item: &Item) -> Option<RawInput> {
    let value = item.as_value()?;
    if let Some(array) = value.as_array() {
        return Some(RawInput::Lines(array.iter().map(scalar_text).collect()));
    }
    if value.is_inline_table() {
        return None;
    }
    Some(RawInput::Text(scalar_text(value)))
}

fn scalar_text(value: &toml_edit::Value) -> String {
    match value {
        toml_edit::Value::String(s) => s.value().clone(),
        toml_edit::Value::Integer(i) => i.value().to_string(),
        toml_edit::Value::Float(f) => f.value().to_string(),
        toml_edit::Value::Boolean(b) => b.value().to_string(),
        toml_edit::Value::Datetime(d) => d.value().to_string(),
        other => other.to_string().trim().to_string(),
    }
}
