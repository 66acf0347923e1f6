//! Argument schema: an explicit tree of argument specifications.
//!
//! A [`Schema`] node holds its arguments in declaration order, an optional
//! sub-command selector (always walked last) and the child schemas the
//! selector can choose from. Schemas are built by hand with the builder
//! methods below, or derived from a `clap::Command` (see
//! [`Schema::from_command`], `clap` feature).
//!
//! Schemas are values: importing a config file never mutates one. Instead
//! [`Schema::with_defaults`] produces a new snapshot with staged defaults
//! applied.

use crate::error::ClapfillError;
use crate::types::{Multiplicity, SUBCOMMAND_KEY, Value};
use crate::values::ArgValues;

/// What an argument does with the values it receives.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Store the given value(s).
    Store,
    /// Accumulate one value per occurrence.
    Append,
    /// Store `constant` when the flag is given, the default otherwise.
    Toggle { constant: Value },
    /// Count occurrences. Never configured from a file or a prompt.
    Count,
    /// The sub-command selector.
    Subcommand,
    /// Help, version and similar arguments that carry no configuration.
    Meta,
}

/// Declarative description of one configurable argument.
#[derive(Debug, Clone, PartialEq)]
pub struct ArgSpec {
    pub name: String,
    pub action: Action,
    pub multiplicity: Multiplicity,
    pub default: Option<Value>,
    pub required: bool,
    pub choices: Vec<String>,
    pub help: Option<String>,
}

impl ArgSpec {
    pub fn new(name: &str, action: Action) -> Self {
        Self {
            name: name.to_string(),
            action,
            multiplicity: Multiplicity::Single,
            default: None,
            required: false,
            choices: Vec::new(),
            help: None,
        }
    }

    /// A single free-text value.
    pub fn string(name: &str) -> Self {
        Self::new(name, Action::Store)
    }

    /// A `store true` flag, off by default.
    pub fn flag(name: &str) -> Self {
        Self::new(
            name,
            Action::Toggle {
                constant: Value::Bool(true),
            },
        )
        .default(false)
    }

    /// A `store false` flag, on by default.
    pub fn negated_flag(name: &str) -> Self {
        Self::new(
            name,
            Action::Toggle {
                constant: Value::Bool(false),
            },
        )
        .default(true)
    }

    /// A flag storing `constant` when given. Needs an explicit default to be
    /// usable with config files and prompts.
    pub fn constant(name: &str, constant: impl Into<Value>) -> Self {
        Self::new(
            name,
            Action::Toggle {
                constant: constant.into(),
            },
        )
    }

    /// Zero or more values given after one switch.
    pub fn list(name: &str) -> Self {
        Self::new(name, Action::Store).multiplicity(Multiplicity::ZeroOrMore)
    }

    /// One value per repeated switch.
    pub fn append(name: &str) -> Self {
        Self::new(name, Action::Append).multiplicity(Multiplicity::ZeroOrMore)
    }

    pub fn count(name: &str) -> Self {
        Self::new(name, Action::Count)
    }

    pub(crate) fn selector() -> Self {
        Self::new(SUBCOMMAND_KEY, Action::Subcommand).help("Choose a subcommand")
    }

    pub fn default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn choices<I, S>(mut self, choices: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.choices = choices.into_iter().map(Into::into).collect();
        self
    }

    pub fn help(mut self, help: &str) -> Self {
        self.help = Some(help.to_string());
        self
    }

    pub fn multiplicity(mut self, multiplicity: Multiplicity) -> Self {
        self.multiplicity = multiplicity;
        self
    }

    pub fn is_selector(&self) -> bool {
        self.action == Action::Subcommand
    }

    pub fn is_meta(&self) -> bool {
        self.action == Action::Meta
    }

    pub fn is_toggle(&self) -> bool {
        matches!(self.action, Action::Toggle { .. })
    }

    /// Whether the argument collects several values (asked line by line).
    pub fn is_multi(&self) -> bool {
        self.action == Action::Append || self.multiplicity != Multiplicity::Single
    }

    /// For toggles: whether `value` is the engaged state.
    pub fn engaged(&self, value: &Value) -> Option<bool> {
        match &self.action {
            Action::Toggle { constant } => Some(value == constant),
            _ => None,
        }
    }

    /// For toggles: the value stored for an engaged / disengaged flag.
    pub fn toggle_value(&self, engaged: bool) -> Option<Value> {
        let Action::Toggle { constant } = &self.action else {
            return None;
        };
        if engaged {
            return Some(constant.clone());
        }
        match (&self.default, constant) {
            (Some(default), _) if default != constant => Some(default.clone()),
            (_, Value::Bool(b)) => Some(Value::Bool(!b)),
            (default, _) => default.clone(),
        }
    }
}

/// A named child schema.
#[derive(Debug, Clone)]
pub struct Subcommand {
    pub name: String,
    pub help: Option<String>,
    pub schema: Schema,
}

/// One node of the argument tree.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    args: Vec<ArgSpec>,
    selector: Option<ArgSpec>,
    subcommands: Vec<Subcommand>,
    #[cfg(feature = "clap")]
    pub(crate) command: Option<clap::Command>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an argument.
    pub fn arg(mut self, spec: ArgSpec) -> Self {
        self.args.push(spec);
        self
    }

    /// Add a child schema selectable under `name`.
    pub fn subcommand(self, name: &str, schema: Schema) -> Self {
        self.subcommand_with_help(name, None, schema)
    }

    pub fn subcommand_with_help(mut self, name: &str, help: Option<&str>, schema: Schema) -> Self {
        self.subcommands.push(Subcommand {
            name: name.to_string(),
            help: help.map(str::to_string),
            schema,
        });
        let names: Vec<String> = self.subcommands.iter().map(|s| s.name.clone()).collect();
        let selector = self.selector.get_or_insert_with(ArgSpec::selector);
        selector.choices = names;
        self
    }

    /// Require a sub-command to be selected.
    pub fn subcommand_required(mut self, required: bool) -> Self {
        if let Some(selector) = &mut self.selector {
            selector.required = required;
        }
        self
    }

    pub fn args(&self) -> &[ArgSpec] {
        &self.args
    }

    pub fn selector(&self) -> Option<&ArgSpec> {
        self.selector.as_ref()
    }

    pub fn subcommands(&self) -> &[Subcommand] {
        &self.subcommands
    }

    pub fn find_subcommand(&self, name: &str) -> Option<&Schema> {
        self.subcommands
            .iter()
            .find(|s| s.name == name)
            .map(|s| &s.schema)
    }

    /// All argument specifications in walk order: arguments, then the selector.
    pub fn specs(&self) -> impl Iterator<Item = &ArgSpec> {
        self.args.iter().chain(self.selector.as_ref())
    }

    pub fn get(&self, name: &str) -> Option<&ArgSpec> {
        self.specs().find(|spec| spec.name == name)
    }

    /// A new snapshot with `overrides` installed as defaults, recursing into
    /// the selected sub-command.
    pub fn with_defaults(&self, overrides: &ArgValues) -> Schema {
        let mut next = self.clone();
        for spec in &mut next.args {
            if let Some(value) = overrides.get(&spec.name) {
                spec.default = Some(value.clone());
            }
        }
        if let Some((name, sub_overrides)) = overrides.subcommand() {
            if let Some(selector) = &mut next.selector {
                selector.default = Some(Value::Text(name.to_string()));
            }
            if let Some(child) = next.subcommands.iter_mut().find(|s| s.name == name) {
                child.schema = child.schema.with_defaults(sub_overrides);
            }
        }
        next
    }

    /// The defaults of every argument, following the default sub-command.
    pub fn default_values(&self) -> ArgValues {
        let mut values = ArgValues::new();
        for spec in &self.args {
            if let Some(default) = &spec.default {
                values.set(&spec.name, default.clone());
            }
        }
        if let Some(name) = self.default_subcommand()
            && let Some(child) = self.find_subcommand(name)
        {
            values.set_subcommand(name, child.default_values());
        }
        values
    }

    pub(crate) fn default_subcommand(&self) -> Option<&str> {
        self.selector
            .as_ref()
            .and_then(|s| s.default.as_ref())
            .and_then(Value::as_text)
    }

    /// Check a resolved set against the schema's own rules: defaults fill
    /// missing values, required arguments must end up with a value, choices
    /// and one-or-more lists are enforced and the selected sub-command must
    /// exist.
    ///
    /// # Errors
    ///
    /// [`ClapfillError::MissingRequiredArgument`], [`ClapfillError::InvalidValue`]
    /// or [`ClapfillError::UnknownSubcommand`].
    pub fn check(&self, values: &ArgValues) -> Result<ArgValues, ClapfillError> {
        let mut out = ArgValues::new();
        for spec in &self.args {
            if spec.is_meta() {
                continue;
            }
            let value = values.get(&spec.name).or(spec.default.as_ref());
            let Some(value) = value else {
                if spec.required {
                    return Err(ClapfillError::MissingRequiredArgument(spec.name.clone()));
                }
                continue;
            };
            check_choices(spec, value)?;
            if spec.multiplicity == Multiplicity::OneOrMore
                && value.as_list().is_some_and(<[String]>::is_empty)
            {
                return Err(ClapfillError::InvalidValue {
                    key: spec.name.clone(),
                    reason: "at least one is required".into(),
                });
            }
            out.set(&spec.name, value.clone());
        }

        let Some(selector) = &self.selector else {
            return Ok(out);
        };
        let chosen = match values.subcommand() {
            Some((name, sub)) => Some((name, sub.clone())),
            None => self.default_subcommand().map(|name| (name, ArgValues::new())),
        };
        match chosen {
            None if selector.required => {
                Err(ClapfillError::MissingRequiredArgument(SUBCOMMAND_KEY.into()))
            }
            None => Ok(out),
            Some((name, sub)) => {
                let child = self
                    .find_subcommand(name)
                    .ok_or_else(|| ClapfillError::UnknownSubcommand(name.to_string()))?;
                out.set_subcommand(name, child.check(&sub)?);
                Ok(out)
            }
        }
    }

    /// Final validation of a resolved set: [`check`](Self::check), then, for
    /// schemas derived from a clap command, a reparse of the synthesized
    /// argv through clap.
    ///
    /// # Errors
    ///
    /// Everything [`check`](Self::check) returns, plus
    /// [`ClapfillError::Cli`] when clap rejects the arguments.
    pub fn finalize(&self, values: &ArgValues) -> Result<ArgValues, ClapfillError> {
        let checked = self.check(values)?;
        #[cfg(feature = "clap")]
        if let Some(command) = &self.command {
            return crate::cli::reparse(command, self, &checked);
        }
        Ok(checked)
    }
}

fn check_choices(spec: &ArgSpec, value: &Value) -> Result<(), ClapfillError> {
    if spec.choices.is_empty() {
        return Ok(());
    }
    let invalid = match value {
        Value::Text(s) => (!spec.choices.contains(s)).then_some(s),
        Value::List(items) => items.iter().find(|item| !spec.choices.contains(item)),
        Value::Bool(_) => None,
    };
    match invalid {
        Some(bad) => Err(ClapfillError::InvalidValue {
            key: spec.name.clone(),
            reason: format!(
                "'{bad}' is not a valid choice (expected one of: {})",
                spec.choices.join(", ")
            ),
        }),
        None => Ok(()),
    }
}
