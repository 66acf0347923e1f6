//! The resolved argument set: argument name → value, plus the selected
//! sub-command and its own nested set.
//!
//! The same shape carries staged overrides from the importer, answers from the
//! prompter and values extracted from clap matches.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::{SUBCOMMAND_KEY, Value};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArgValues {
    #[serde(flatten)]
    values: BTreeMap<String, Value>,
    #[serde(
        rename = "__subcommand__",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    subcommand: Option<Box<Selected>>,
}

/// A selected sub-command with the values of its own arguments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selected {
    pub name: String,
    pub values: ArgValues,
}

impl ArgValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.set(name, value);
        self
    }

    /// Builder-style sub-command selection.
    pub fn with_subcommand(mut self, name: &str, values: ArgValues) -> Self {
        self.set_subcommand(name, values);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> Option<Value> {
        self.values.insert(name.to_string(), value.into())
    }

    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.values.remove(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of values at this level (the sub-command is not counted).
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty() && self.subcommand.is_none()
    }

    pub fn subcommand(&self) -> Option<(&str, &ArgValues)> {
        self.subcommand
            .as_deref()
            .map(|sel| (sel.name.as_str(), &sel.values))
    }

    pub fn subcommand_name(&self) -> Option<&str> {
        self.subcommand.as_deref().map(|sel| sel.name.as_str())
    }

    pub fn set_subcommand(&mut self, name: &str, values: ArgValues) {
        self.subcommand = Some(Box::new(Selected {
            name: name.to_string(),
            values,
        }));
    }

    pub fn clear_subcommand(&mut self) -> Option<Selected> {
        self.subcommand.take().map(|sel| *sel)
    }

    /// Flattened `(dotted key, value)` pairs; sub-command values are prefixed
    /// with the sub-command name and the selection itself appears under
    /// [`SUBCOMMAND_KEY`].
    pub fn entries(&self) -> Vec<(String, String)> {
        let mut out = Vec::new();
        self.collect_entries("", &mut out);
        out
    }

    fn collect_entries(&self, prefix: &str, out: &mut Vec<(String, String)>) {
        for (key, value) in &self.values {
            out.push((dotted(prefix, key), value.to_string()));
        }
        if let Some(sel) = self.subcommand.as_deref() {
            out.push((dotted(prefix, SUBCOMMAND_KEY), sel.name.clone()));
            sel.values.collect_entries(&dotted(prefix, &sel.name), out);
        }
    }
}

pub(crate) fn dotted(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{prefix}.{key}")
    }
}

/// Merge `overlay` on top of `base`.
///
/// Values are replaced key by key. When both sides select the same
/// sub-command its values merge recursively; otherwise the overlay's
/// selection wins if it has one.
pub fn merge(mut base: ArgValues, overlay: ArgValues) -> ArgValues {
    for (key, value) in overlay.values {
        base.values.insert(key, value);
    }
    match (base.subcommand.take(), overlay.subcommand) {
        (Some(base_sel), Some(overlay_sel)) if base_sel.name == overlay_sel.name => {
            let Selected { name, values } = *overlay_sel;
            base.set_subcommand(&name, merge(base_sel.values, values));
        }
        (base_sel, overlay_sel) => {
            base.subcommand = overlay_sel.or(base_sel);
        }
    }
    base
}

impl fmt::Display for ArgValues {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (key, value)) in self.entries().iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{key} = {value}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_and_get() {
        let mut values = ArgValues::new();
        assert!(values.is_empty());
        values.set("test", "123");
        assert_eq!(values.get("test"), Some(&Value::from("123")));
        assert_eq!(values.len(), 1);
        assert!(values.contains("test"));
        assert_eq!(values.remove("test"), Some(Value::from("123")));
    }

    #[test]
    fn subcommand_selection() {
        let values = ArgValues::new().with_subcommand("sub1", ArgValues::new().with("sub1", "aaa"));
        let (name, sub) = values.subcommand().unwrap();
        assert_eq!(name, "sub1");
        assert_eq!(sub.get("sub1"), Some(&Value::from("aaa")));
        assert!(!values.is_empty());
    }

    #[test]
    fn merge_overlay_wins() {
        let base = ArgValues::new().with("a", "1").with("b", "2");
        let overlay = ArgValues::new().with("b", "3");
        let merged = merge(base, overlay);
        assert_eq!(merged.get("a"), Some(&Value::from("1")));
        assert_eq!(merged.get("b"), Some(&Value::from("3")));
    }

    #[test]
    fn merge_same_subcommand_recurses() {
        let base = ArgValues::new().with_subcommand(
            "sub1",
            ArgValues::new().with("x", "1").with("y", "2"),
        );
        let overlay = ArgValues::new().with_subcommand("sub1", ArgValues::new().with("y", "9"));
        let merged = merge(base, overlay);
        let (_, sub) = merged.subcommand().unwrap();
        assert_eq!(sub.get("x"), Some(&Value::from("1")));
        assert_eq!(sub.get("y"), Some(&Value::from("9")));
    }

    #[test]
    fn merge_different_subcommand_replaces() {
        let base = ArgValues::new().with_subcommand("a", ArgValues::new().with("x", "1"));
        let overlay = ArgValues::new().with_subcommand("b", ArgValues::new());
        let merged = merge(base, overlay);
        assert_eq!(merged.subcommand_name(), Some("b"));
        assert!(merged.subcommand().unwrap().1.is_empty());
    }

    #[test]
    fn merge_keeps_base_selection_without_overlay() {
        let base = ArgValues::new().with_subcommand("a", ArgValues::new());
        let merged = merge(base, ArgValues::new().with("k", true));
        assert_eq!(merged.subcommand_name(), Some("a"));
    }

    #[test]
    fn display_lists_dotted_entries() {
        let values = ArgValues::new()
            .with("ok", true)
            .with_subcommand("sub1", ArgValues::new().with("sub1", "aaa"));
        assert_eq!(
            values.to_string(),
            "ok = true\n__subcommand__ = sub1\nsub1.sub1 = aaa"
        );
    }

    #[test]
    fn serializes_to_json() {
        let values = ArgValues::new()
            .with("options", vec!["a", "b"])
            .with_subcommand("sub1", ArgValues::new().with("sub1", "aaa"));
        let json = serde_json::to_value(&values).unwrap();
        assert_eq!(json["options"][1], "b");
        assert_eq!(json["__subcommand__"]["name"], "sub1");
        assert_eq!(json["__subcommand__"]["values"]["sub1"], "aaa");
    }
}
