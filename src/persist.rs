//! Config export: write a resolved argument set back into a TOML file while
//! preserving everything else in it.
//!
//! Uses `toml_edit` for comment-preserving edits. Every value is written as a
//! string rendered by its validator, so the file reads the same whether it was
//! written by hand or by [`save`]. Creates parent directories as needed.

use std::path::Path;

use toml_edit::{DocumentMut, Item, Table, TableLike};

use crate::error::ClapfillError;
use crate::registry::Validators;
use crate::schema::Schema;
use crate::types::Value;
use crate::validator::Kind;
use crate::values::{ArgValues, dotted};

/// Pure function: merge `values` into a TOML document string.
///
/// If `content` is `None` (no file yet), starts from an empty document.
/// `path` is only used in errors.
///
/// Returns the modified document string.
pub fn export_document(
    content: Option<&str>,
    path: &Path,
    schema: &Schema,
    validators: &Validators,
    values: &ArgValues,
) -> Result<String, ClapfillError> {
    let mut doc: DocumentMut = content.unwrap_or_default().parse().map_err(|e| {
        ClapfillError::ParseError {
            path: path.to_path_buf(),
            source: e,
        }
    })?;
    export_section(schema, validators, values, doc.as_table_mut(), "")?;
    Ok(doc.to_string())
}

/// I/O wrapper: reads the file (if it exists), merges `values` into it and
/// writes it back. Creates parent directories if needed.
pub fn save(
    file_path: &Path,
    schema: &Schema,
    validators: &Validators,
    values: &ArgValues,
) -> Result<(), ClapfillError> {
    let content = match std::fs::read_to_string(file_path) {
        Ok(c) => Some(c),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
        Err(e) => {
            return Err(ClapfillError::IoError {
                path: file_path.to_path_buf(),
                source: e,
            });
        }
    };

    let new_content =
        export_document(content.as_deref(), file_path, schema, validators, values)?;

    if let Some(parent) = file_path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| ClapfillError::IoError {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }

    std::fs::write(file_path, &new_content).map_err(|e| ClapfillError::IoError {
        path: file_path.to_path_buf(),
        source: e,
    })?;
    tracing::debug!(path = %file_path.display(), "saved config");
    Ok(())
}

fn export_section(
    schema: &Schema,
    validators: &Validators,
    values: &ArgValues,
    section: &mut dyn TableLike,
    prefix: &str,
) -> Result<(), ClapfillError> {
    for (spec, validator) in validators.walk(schema, Some(values))? {
        if spec.is_selector() {
            let Some((name, sub_values)) = values.subcommand() else {
                continue;
            };
            let Some(child) = schema.find_subcommand(name) else {
                return Err(ClapfillError::UnknownSubcommand(name.to_string()));
            };
            if schema.args().iter().any(|arg| arg.name == name) {
                return Err(ClapfillError::NameCollision(name.to_string()));
            }
            write_value(section, &spec.name, validator.render(&Value::from(name)));
            if !section.get(name).is_some_and(Item::is_table_like) {
                section.insert(name, Item::Table(Table::new()));
            }
            if let Some(child_section) = section.get_mut(name).and_then(Item::as_table_like_mut) {
                export_section(child, validators, sub_values, child_section, &dotted(prefix, name))?;
            }
            continue;
        }

        let Some(value) = values.get(&spec.name) else {
            continue;
        };
        let text = match spec.engaged(value) {
            Some(engaged) => Kind::Bool.validator().render(&Value::Bool(engaged)),
            None => validator.render(value),
        };
        tracing::debug!(key = %dotted(prefix, &spec.name), %text, "writing config value");
        write_value(section, &spec.name, text);
    }
    Ok(())
}

/// Set `key` to a string, keeping the key's comments and the value's
/// trailing comment when the key already exists.
fn write_value(section: &mut dyn TableLike, key: &str, text: String) {
    let mut value = toml_edit::Value::from(text);
    match section.get_mut(key) {
        Some(item) => {
            if let Some(old) = item.as_value() {
                *value.decor_mut() = old.decor().clone();
            }
            *item = Item::Value(value);
        }
        None => {
            section.insert(key, Item::Value(value));
        }
    }
}
