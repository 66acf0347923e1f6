//! Clap adapter for clapfill.
//!
//! This module is the **optional integration layer** between clapfill's
//! framework-agnostic core and the [clap](https://docs.rs/clap) CLI parser.
//! It is compiled only when the `clap` Cargo feature is enabled (on by
//! default).
//!
//! Three bridges connect the two worlds:
//!
//! - [`Schema::from_command`] reads a `clap::Command`'s declarative metadata
//!   into a [`Schema`] tree.
//! - [`to_argv`] turns a resolved [`ArgValues`] back into command-line
//!   arguments and [`to_matches`] parses them, so clap can validate answers
//!   with its own rules (the schema remembers its command and does this in
//!   [`Schema::finalize`]).
//! - [`values_from_matches`] / [`explicit_values`] read `ArgMatches` into
//!   [`ArgValues`].
//!
//! If you use a different CLI parser (or no CLI at all), build schemas by hand
//! and skip this module entirely.

use clap::parser::ValueSource;
use clap::{Arg, ArgAction, ArgMatches, Command};

use crate::error::ClapfillError;
use crate::schema::{Action, ArgSpec, Schema};
use crate::types::{Multiplicity, Value};
use crate::values::ArgValues;

impl Schema {
    /// Derive a schema from a clap command.
    ///
    /// `SetTrue`/`SetFalse` become toggles, `Append` and multi-value `Set`
    /// become lists, help and version become meta arguments. Possible values
    /// become choices. Sub-commands become child nodes; clap's generated
    /// `help` sub-command and global arguments propagated from an ancestor
    /// are left out.
    ///
    /// The schema keeps a copy of the command and reparses final values
    /// through it (see [`Schema::finalize`]).
    pub fn from_command(command: &Command) -> Schema {
        let mut built = command.clone();
        built.build();
        let mut schema = convert(command, &built, &[]);
        schema.command = Some(command.clone());
        schema
    }
}

impl From<Command> for Schema {
    fn from(command: Command) -> Self {
        Schema::from_command(&command)
    }
}

fn convert(original: &Command, built: &Command, inherited: &[String]) -> Schema {
    let mut schema = Schema::new();
    for arg in built.get_arguments() {
        let id = arg.get_id().as_str();
        if arg.is_global_set() && inherited.iter().any(|g| g == id) {
            continue;
        }
        schema = schema.arg(spec_from_arg(arg));
    }

    let mut globals = inherited.to_vec();
    globals.extend(
        built
            .get_arguments()
            .filter(|arg| arg.is_global_set())
            .map(|arg| arg.get_id().as_str().to_string()),
    );
    let mut has_subcommands = false;
    for sub in original.get_subcommands() {
        let Some(built_sub) = built.find_subcommand(sub.get_name()) else {
            continue;
        };
        has_subcommands = true;
        let about = sub.get_about().map(ToString::to_string);
        let child = convert(sub, built_sub, &globals);
        schema = schema.subcommand_with_help(sub.get_name(), about.as_deref(), child);
    }
    if has_subcommands {
        schema = schema.subcommand_required(built.is_subcommand_required_set());
    }
    schema
}

fn spec_from_arg(arg: &Arg) -> ArgSpec {
    let name = arg.get_id().as_str();
    let action = match arg.get_action() {
        ArgAction::SetTrue => Action::Toggle {
            constant: Value::Bool(true),
        },
        ArgAction::SetFalse => Action::Toggle {
            constant: Value::Bool(false),
        },
        ArgAction::Append => Action::Append,
        ArgAction::Count => Action::Count,
        ArgAction::Help | ArgAction::HelpShort | ArgAction::HelpLong | ArgAction::Version => {
            Action::Meta
        }
        _ => Action::Store,
    };

    let multiplicity = match (&action, arg.get_num_args()) {
        (Action::Append, _) => Multiplicity::ZeroOrMore,
        (Action::Store, Some(range)) if range.max_values() > 1 => {
            if range.min_values() == 0 {
                Multiplicity::ZeroOrMore
            } else {
                Multiplicity::OneOrMore
            }
        }
        _ => Multiplicity::Single,
    };

    let mut spec = ArgSpec::new(name, action)
        .multiplicity(multiplicity)
        .required(arg.is_required_set());
    if let Some(help) = arg.get_help() {
        spec = spec.help(&help.to_string());
    }

    let defaults: Vec<String> = arg
        .get_default_values()
        .iter()
        .map(|v| v.to_string_lossy().into_owned())
        .collect();
    spec.default = match &spec.action {
        Action::Toggle { .. } => defaults
            .first()
            .map(|d| Value::Bool(d.eq_ignore_ascii_case("true"))),
        Action::Count | Action::Meta => None,
        _ if defaults.is_empty() => None,
        _ if spec.is_multi() => Some(Value::List(defaults)),
        _ => defaults.into_iter().next().map(Value::Text),
    };

    if matches!(spec.action, Action::Store | Action::Append) {
        spec.choices = arg
            .get_possible_values()
            .into_iter()
            .filter(|pv| !pv.is_hide_set())
            .map(|pv| pv.get_name().to_string())
            .collect();
    }
    spec
}

/// Token closing the items of a multi-value option in [`to_matches`].
pub const VALUE_TERMINATOR: &str = ";";

/// Synthesize command-line arguments for `values`, program name first.
///
/// Positionals come first, in index order. Options follow as `--long=value`
/// (or `-svalue`), toggles as bare switches when engaged and appends as one
/// switch per item. Multi-value options come last, one switch followed by
/// every item, then the sub-command name and its own arguments.
///
/// A multi-value option directly before a sub-command would swallow the
/// sub-command's name; [`to_matches`] terminates those items and parses
/// the result.
pub fn to_argv(command: &Command, values: &ArgValues) -> Vec<String> {
    synthesize(command, values, None)
}

/// Parse `values` with `command`, as if they had been typed.
///
/// Multi-value options are closed with [`VALUE_TERMINATOR`] on a copy of the
/// command, so positionals and sub-commands after them parse unambiguously.
///
/// # Errors
///
/// Whatever clap reports for the synthesized arguments.
pub fn to_matches(command: &Command, values: &ArgValues) -> Result<ArgMatches, clap::Error> {
    let argv = synthesize(command, values, Some(VALUE_TERMINATOR));
    tracing::debug!(?argv, "parsing synthesized arguments");
    terminated(command.clone()).try_get_matches_from(&argv)
}

fn synthesize(command: &Command, values: &ArgValues, terminator: Option<&str>) -> Vec<String> {
    let mut built = command.clone();
    built.build();
    let mut argv = vec![command.get_name().to_string()];
    push_args(&built, values, terminator, &mut argv);
    argv
}

fn is_multi_value(arg: &Arg) -> bool {
    matches!(arg.get_action(), ArgAction::Set)
        && arg.get_num_args().is_some_and(|range| range.max_values() > 1)
}

fn terminated(command: Command) -> Command {
    command
        .mut_args(|arg| {
            if is_multi_value(&arg) && !arg.is_positional() {
                arg.value_terminator(VALUE_TERMINATOR)
            } else {
                arg
            }
        })
        .mut_subcommands(terminated)
}

fn push_args(
    command: &Command,
    values: &ArgValues,
    terminator: Option<&str>,
    argv: &mut Vec<String>,
) {
    let mut positionals: Vec<(usize, &Value)> = Vec::new();
    let mut options = Vec::new();
    let mut multi = Vec::new();

    for arg in command.get_arguments() {
        let id = arg.get_id().as_str();
        let Some(value) = values.get(id) else {
            continue;
        };
        if arg.is_positional() {
            positionals.push((arg.get_index().unwrap_or(usize::MAX), value));
            continue;
        }
        let (switch, attached) = match (arg.get_long(), arg.get_short()) {
            (Some(long), _) => (format!("--{long}"), format!("--{long}=")),
            (None, Some(short)) => (format!("-{short}"), format!("-{short}")),
            (None, None) => continue,
        };

        match arg.get_action() {
            ArgAction::SetTrue | ArgAction::SetFalse => {
                let on = matches!(arg.get_action(), ArgAction::SetTrue);
                if value.as_bool() == Some(on) {
                    options.push(switch);
                }
            }
            ArgAction::Append => {
                for item in items(value) {
                    options.push(format!("{attached}{item}"));
                }
            }
            ArgAction::Set if is_multi_value(arg) => {
                multi.push(switch);
                multi.extend(items(value).iter().map(ToString::to_string));
                if let Some(terminator) = terminator {
                    multi.push(terminator.to_string());
                }
            }
            ArgAction::Set => options.push(format!("{attached}{value}")),
            _ => {}
        }
    }

    positionals.sort_by_key(|(index, _)| *index);
    for (_, value) in positionals {
        argv.extend(items(value).iter().map(ToString::to_string));
    }
    argv.extend(options);
    argv.extend(multi);

    if let Some((name, sub_values)) = values.subcommand()
        && let Some(sub) = command.find_subcommand(name)
    {
        argv.push(name.to_string());
        push_args(sub, sub_values, terminator, argv);
    }
}

fn items(value: &Value) -> Vec<&str> {
    match value {
        Value::List(items) => items.iter().map(String::as_str).collect(),
        Value::Text(text) => vec![text.as_str()],
        Value::Bool(b) => vec![if *b { "true" } else { "false" }],
    }
}

/// Run `command` over argv synthesized from `values` and read the result
/// back through `schema`.
pub(crate) fn reparse(
    command: &Command,
    schema: &Schema,
    values: &ArgValues,
) -> Result<ArgValues, ClapfillError> {
    let matches = to_matches(command, values)?;
    Ok(values_from_matches(schema, &matches))
}

/// `command` with every requirement lifted, so a partial command line parses
/// and missing values can come from the config file instead.
pub(crate) fn relaxed(command: Command) -> Command {
    command
        .subcommand_required(false)
        .arg_required_else_help(false)
        .mut_args(|arg| arg.required(false))
        .mut_subcommands(relaxed)
}

/// Every value present in `matches`, defaults included.
pub fn values_from_matches(schema: &Schema, matches: &ArgMatches) -> ArgValues {
    extract(schema, matches, false)
}

/// Only the values given on the command line or through the environment.
pub fn explicit_values(schema: &Schema, matches: &ArgMatches) -> ArgValues {
    extract(schema, matches, true)
}

fn extract(schema: &Schema, matches: &ArgMatches, explicit_only: bool) -> ArgValues {
    let mut values = ArgValues::new();
    for spec in schema.args() {
        if matches!(spec.action, Action::Meta | Action::Count) {
            continue;
        }
        let id = spec.name.as_str();
        if explicit_only
            && !matches!(
                matches.value_source(id),
                Some(ValueSource::CommandLine | ValueSource::EnvVariable)
            )
        {
            continue;
        }
        let value = if spec.is_toggle() {
            matches
                .try_get_one::<bool>(id)
                .ok()
                .flatten()
                .map(|b| Value::Bool(*b))
        } else {
            matches.try_get_raw(id).ok().flatten().map(|raw| {
                let items: Vec<String> = raw.map(|s| s.to_string_lossy().into_owned()).collect();
                if spec.is_multi() {
                    Value::List(items)
                } else {
                    Value::Text(items.into_iter().next().unwrap_or_default())
                }
            })
        };
        if let Some(value) = value {
            values.set(id, value);
        }
    }

    if let Some((name, sub_matches)) = matches.subcommand()
        && let Some(child) = schema.find_subcommand(name)
    {
        values.set_subcommand(name, extract(child, sub_matches, explicit_only));
    }
    values
}
