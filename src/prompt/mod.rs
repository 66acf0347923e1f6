//! Interactive prompting.
//!
//! [`Prompter`] walks a schema and asks one question per argument through a
//! [`Frontend`]. The front-end only moves text: it shows help, collects raw
//! answers and prints diagnostics. Parsing, validation, default substitution
//! and retrying live here, so every front-end behaves the same.
//!
//! Two front-ends ship with the crate: [`PlainFrontend`] (line-based, any
//! reader/writer) and, with the `widgets` feature, [`WidgetFrontend`]
//! (crossterm selection widgets).

use std::io;

use crate::error::ClapfillError;
use crate::registry::Validators;
use crate::schema::{Action, ArgSpec, Schema};
use crate::types::{Multiplicity, RawInput, Value};
use crate::validator::{Kind, Question, Validator};
use crate::values::ArgValues;

mod plain;
#[cfg(feature = "widgets")]
mod widget;

pub use plain::PlainFrontend;
#[cfg(feature = "widgets")]
pub use widget::WidgetFrontend;

pub(crate) const NOT_A_VALID_CHOICE: &str = "not a valid choice";
pub(crate) const AT_LEAST_ONE: &str = "at least one is required";

/// Terminal side of a prompt session.
///
/// Every `ask_*` method returns what the user entered, untouched. An empty
/// answer means "keep the default".
pub trait Frontend {
    /// Print informational text (help, defaults).
    fn show(&mut self, text: &str) -> io::Result<()>;

    /// Print a diagnostic after a rejected answer.
    fn warn(&mut self, text: &str) -> io::Result<()>;

    /// Ask for one line.
    fn ask_text(&mut self, label: &str) -> io::Result<String>;

    /// Ask for a list, one item per line.
    fn ask_lines(&mut self, label: &str) -> io::Result<Vec<String>>;

    /// Ask to pick one of `options`. `default` indexes the preselected option.
    fn ask_choice(&mut self, label: &str, options: &[String], default: usize)
    -> io::Result<String>;

    /// Ask a yes/no question.
    fn ask_flag(&mut self, label: &str, default: bool) -> io::Result<String>;
}

/// Asks for argument values, optionally restricted to an ask-list.
#[derive(Debug, Clone, Copy)]
pub struct Prompter<'a> {
    validators: &'a Validators,
    only_ask: &'a [String],
}

impl<'a> Prompter<'a> {
    pub fn new(validators: &'a Validators) -> Self {
        Self {
            validators,
            only_ask: &[],
        }
    }

    /// Only ask for these arguments (names at any depth; the sub-command
    /// selector is `__subcommand__`). The others adopt their defaults. An
    /// empty list asks for everything.
    pub fn only_ask(mut self, names: &'a [String]) -> Self {
        self.only_ask = names;
        self
    }

    /// Prompt for every argument of `schema`, recursing into the chosen
    /// sub-command, then check the answers against the schema.
    ///
    /// # Errors
    ///
    /// [`ClapfillError::MissingRequiredArgument`] when the ask-list excludes a
    /// required argument without a default, terminal failures, and everything
    /// [`Schema::finalize`] returns.
    pub fn run<F: Frontend + ?Sized>(
        &self,
        schema: &Schema,
        frontend: &mut F,
    ) -> Result<ArgValues, ClapfillError> {
        let answers = self.prompt_node(schema, frontend)?;
        schema.finalize(&answers)
    }

    fn asks(&self, spec: &ArgSpec) -> bool {
        spec.action != Action::Count
            && (self.only_ask.is_empty() || self.only_ask.iter().any(|n| *n == spec.name))
    }

    fn prompt_node<F: Frontend + ?Sized>(
        &self,
        schema: &Schema,
        frontend: &mut F,
    ) -> Result<ArgValues, ClapfillError> {
        if let Some(spec) = schema
            .specs()
            .filter(|spec| !spec.is_meta() && !self.asks(spec))
            .find(|spec| spec.required && spec.default.is_none())
        {
            return Err(ClapfillError::MissingRequiredArgument(spec.name.clone()));
        }

        let mut values = ArgValues::new();
        for (spec, validator) in self.validators.walk(schema, None)? {
            let answer = if self.asks(spec) {
                Some(self.ask(spec, validator, frontend)?)
            } else {
                spec.default.clone()
            };
            let Some(value) = answer else {
                continue;
            };

            if spec.is_selector() {
                let Value::Text(name) = value else {
                    continue;
                };
                let child = schema
                    .find_subcommand(&name)
                    .ok_or_else(|| ClapfillError::UnknownSubcommand(name.clone()))?;
                tracing::debug!(subcommand = %name, "entering subcommand");
                let child_values = self.prompt_node(child, frontend)?;
                values.set_subcommand(&name, child_values);
            } else {
                values.set(&spec.name, value);
            }
        }
        Ok(values)
    }

    fn ask<F: Frontend + ?Sized>(
        &self,
        spec: &ArgSpec,
        validator: &dyn Validator,
        frontend: &mut F,
    ) -> Result<Value, ClapfillError> {
        let default_text = spec
            .default
            .as_ref()
            .map(|default| match spec.engaged(default) {
                Some(engaged) => Kind::Bool.validator().render(&Value::Bool(engaged)),
                None => validator.render(default),
            })
            .filter(|text| !text.is_empty());
        let question = validator.question();
        let has_choices = !spec.choices.is_empty();

        let help = spec.help.as_deref().unwrap_or_default();
        let title = match default_text.as_deref() {
            Some(text) if !has_choices && question != Question::YesNo => {
                format!("{help} (Default: {text})").trim_start().to_string()
            }
            _ => help.to_string(),
        };
        if !title.is_empty() {
            frontend.show(&title)?;
        }

        let label = if spec.is_selector() {
            "subcommand? ".to_string()
        } else {
            format!("{}? ", spec.name)
        };
        let default_flag = spec
            .default
            .as_ref()
            .and_then(|d| spec.engaged(d).or(d.as_bool()))
            .unwrap_or(false);

        loop {
            let raw = match (has_choices, question) {
                (true, _) => {
                    let index = default_text
                        .as_ref()
                        .and_then(|text| spec.choices.iter().position(|c| c == text))
                        .unwrap_or(0);
                    let picked = frontend.ask_choice(&label, &spec.choices, index)?;
                    match question {
                        Question::Lines if !picked.is_empty() => RawInput::Lines(vec![picked]),
                        _ => RawInput::Text(picked),
                    }
                }
                (false, Question::Lines) => RawInput::Lines(frontend.ask_lines(&label)?),
                (false, Question::YesNo) => {
                    RawInput::Text(frontend.ask_flag(&label, default_flag)?)
                }
                (false, Question::Line) => RawInput::Text(frontend.ask_text(&label)?),
            };
            let raw = match &default_text {
                Some(text) if is_blank(&raw) => RawInput::Text(text.clone()),
                _ => raw,
            };

            let value = match validator.parse(raw) {
                Ok(value) => value,
                Err(ClapfillError::InvalidLiteral { reason, .. }) => {
                    frontend.warn(&reason)?;
                    continue;
                }
                Err(e) => return Err(e),
            };
            if has_choices && !within_choices(spec, &value) {
                frontend.warn(NOT_A_VALID_CHOICE)?;
                continue;
            }
            if spec.multiplicity == Multiplicity::OneOrMore
                && value.as_list().is_some_and(<[String]>::is_empty)
            {
                frontend.warn(AT_LEAST_ONE)?;
                continue;
            }
            if let Err(rejection) = validator.validate(&value) {
                frontend.warn(rejection.reason())?;
                continue;
            }

            let value = match (spec.is_toggle(), value) {
                (true, Value::Bool(engaged)) => spec
                    .toggle_value(engaged)
                    .ok_or_else(|| ClapfillError::UnsupportedShape(spec.name.clone()))?,
                (_, value) => value,
            };
            tracing::debug!(arg = %spec.name, %value, "answer accepted");
            return Ok(value);
        }
    }
}

fn is_blank(raw: &RawInput) -> bool {
    match raw {
        RawInput::Text(text) => text.trim().is_empty(),
        RawInput::Lines(lines) => lines.iter().all(|line| line.trim().is_empty()),
    }
}

fn within_choices(spec: &ArgSpec, value: &Value) -> bool {
    match value {
        Value::Text(text) => spec.choices.contains(text),
        Value::List(items) => items.iter().all(|item| spec.choices.contains(item)),
        Value::Bool(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::test::{
        ScriptedFrontend, multiline_schema, simple_schema, subcommand_schema,
    };
    use crate::types::SUBCOMMAND_KEY;
    use crate::validator::{BoolValidator, PathValidator};
    use std::fs;
    use tempfile::TempDir;

    fn run(schema: &Schema, answers: &[&str]) -> (Result<ArgValues, ClapfillError>, ScriptedFrontend) {
        let mut frontend = ScriptedFrontend::new(answers);
        let result = Prompter::new(&Validators::new()).run(schema, &mut frontend);
        (result, frontend)
    }

    #[test]
    fn answers_every_question() {
        let (result, frontend) = run(&simple_schema(), &["123", "aaa", "banana", "1"]);
        let values = result.unwrap();
        assert_eq!(values.get("test"), Some(&Value::from("123")));
        assert_eq!(values.get("other"), Some(&Value::from("aaa")));
        assert_eq!(values.get("fruit"), Some(&Value::from("banana")));
        assert_eq!(values.get("ok"), Some(&Value::Bool(true)));
        assert_eq!(frontend.asked, vec!["test? ", "other? ", "fruit? ", "ok? "]);
    }

    #[test]
    fn empty_answers_keep_defaults() {
        let defaults = ArgValues::new()
            .with("test", "123")
            .with("other", "aaa")
            .with("fruit", "banana")
            .with("ok", true);
        let schema = simple_schema().with_defaults(&defaults);
        let (result, _) = run(&schema, &["", "", "", ""]);
        assert_eq!(result.unwrap(), defaults);
    }

    #[test]
    fn only_ask_adopts_defaults_for_the_rest() {
        let names = vec!["test".to_string()];
        let mut frontend = ScriptedFrontend::new(&["123"]);
        let values = Prompter::new(&Validators::new())
            .only_ask(&names)
            .run(&simple_schema(), &mut frontend)
            .unwrap();
        assert_eq!(values.get("test"), Some(&Value::from("123")));
        assert_eq!(values.get("other"), None);
        assert_eq!(values.get("ok"), Some(&Value::Bool(false)));
        assert_eq!(frontend.asked.len(), 1);
    }

    #[test]
    fn excluded_required_argument_fails_before_asking() {
        let schema = simple_schema().arg(ArgSpec::string("out").required(true));
        let names = vec!["test".to_string()];
        let mut frontend = ScriptedFrontend::new(&["123"]);
        let err = Prompter::new(&Validators::new())
            .only_ask(&names)
            .run(&schema, &mut frontend)
            .unwrap_err();
        assert!(matches!(err, ClapfillError::MissingRequiredArgument(name) if name == "out"));
        assert!(frontend.asked.is_empty());
    }

    #[test]
    fn excluded_required_argument_with_default_is_fine() {
        let schema = Schema::new()
            .arg(ArgSpec::string("out").required(true).default("a.txt"))
            .arg(ArgSpec::string("test"));
        let names = vec!["test".to_string()];
        let mut frontend = ScriptedFrontend::new(&["x"]);
        let values = Prompter::new(&Validators::new())
            .only_ask(&names)
            .run(&schema, &mut frontend)
            .unwrap();
        assert_eq!(values.get("out"), Some(&Value::from("a.txt")));
    }

    #[test]
    fn invalid_choice_is_asked_again() {
        let (result, frontend) = run(&simple_schema(), &["1", "2", "cherry", "apple", "no"]);
        assert_eq!(result.unwrap().get("fruit"), Some(&Value::from("apple")));
        assert_eq!(frontend.warned, vec![NOT_A_VALID_CHOICE]);
    }

    #[test]
    fn empty_string_without_default_is_asked_again() {
        let (result, frontend) = run(&simple_schema(), &["", "  ", "1", "2", "apple", ""]);
        let values = result.unwrap();
        assert_eq!(values.get("test"), Some(&Value::from("1")));
        assert_eq!(values.get("ok"), Some(&Value::Bool(false)));
        assert_eq!(frontend.warned, vec!["a value is required"; 2]);
    }

    #[test]
    fn help_shows_defaults_except_inline_options() {
        let schema = Schema::new()
            .arg(ArgSpec::string("name").help("Your name").default("bob"))
            .arg(ArgSpec::string("size").choices(["s", "m"]).help("Size").default("m"))
            .arg(ArgSpec::flag("ok").help("Proceed"));
        let (result, frontend) = run(&schema, &["", "", ""]);
        result.unwrap();
        assert_eq!(frontend.shown, vec!["Your name (Default: bob)", "Size", "Proceed"]);
        assert_eq!(frontend.choice_defaults, vec![1]);
        assert_eq!(frontend.flag_defaults, vec![false]);
    }

    #[test]
    fn lists_are_collected_line_by_line() {
        let (result, _) = run(&multiline_schema(), &["aaa\nbbb", "1\n2"]);
        let values = result.unwrap();
        assert_eq!(values.get("options"), Some(&Value::from(vec!["aaa", "bbb"])));
        assert_eq!(values.get("flags"), Some(&Value::from(vec!["1", "2"])));
    }

    #[test]
    fn empty_lists_keep_defaults() {
        let defaults = ArgValues::new()
            .with("options", vec!["aaa", "bbb"])
            .with("flags", vec!["1", "2"]);
        let schema = multiline_schema().with_defaults(&defaults);
        let (result, frontend) = run(&schema, &["", ""]);
        assert_eq!(result.unwrap(), defaults);
        assert_eq!(frontend.shown[0], "(Default: ['aaa', 'bbb'])");
    }

    #[test]
    fn one_or_more_needs_an_item() {
        let schema =
            Schema::new().arg(ArgSpec::list("files").multiplicity(Multiplicity::OneOrMore));
        let (result, frontend) = run(&schema, &["", "a.txt"]);
        assert_eq!(result.unwrap().get("files"), Some(&Value::from(vec!["a.txt"])));
        assert_eq!(frontend.warned, vec![AT_LEAST_ONE]);
    }

    #[test]
    fn rejection_reason_is_shown() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("in.txt");
        fs::write(&file, "x").unwrap();
        let schema = Schema::new().arg(ArgSpec::string("input"));
        let validators = Validators::new().with("input", PathValidator::file());
        let missing = dir.path().join("missing.txt").display().to_string();
        let quoted = format!("\"{}\"", file.display());
        let mut frontend = ScriptedFrontend::new(&[missing.as_str(), quoted.as_str()]);

        let values = Prompter::new(&validators).run(&schema, &mut frontend).unwrap();
        assert_eq!(
            values.get("input"),
            Some(&Value::from(file.display().to_string()))
        );
        assert_eq!(frontend.warned.len(), 1);
        assert!(frontend.warned[0].contains("missing.txt"));
    }

    #[test]
    fn toggles_store_their_constants() {
        let schema = Schema::new()
            .arg(ArgSpec::negated_flag("color"))
            .arg(ArgSpec::constant("mode", "fast").default("slow"));
        let (result, frontend) = run(&schema, &["yes", ""]);
        let values = result.unwrap();
        assert_eq!(values.get("color"), Some(&Value::Bool(false)));
        assert_eq!(values.get("mode"), Some(&Value::from("slow")));
        assert_eq!(frontend.flag_defaults, vec![false, false]);
    }

    #[test]
    fn constant_toggle_without_default_cannot_be_declined() {
        let schema = Schema::new().arg(ArgSpec::constant("mode", "fast"));
        let validators = Validators::new().with("mode", BoolValidator);

        let mut frontend = ScriptedFrontend::new(&["yes"]);
        let values = Prompter::new(&validators).run(&schema, &mut frontend).unwrap();
        assert_eq!(values.get("mode"), Some(&Value::from("fast")));

        let mut frontend = ScriptedFrontend::new(&["no", "no"]);
        let err = Prompter::new(&validators)
            .run(&schema, &mut frontend)
            .unwrap_err();
        assert!(matches!(err, ClapfillError::UnsupportedShape(name) if name == "mode"));
        assert_eq!(frontend.asked, vec!["mode? "]);
    }

    #[test]
    fn selector_recurses_into_subcommand() {
        let (result, frontend) = run(&subcommand_schema(), &["", "sub1", "aaa"]);
        let values = result.unwrap();
        assert_eq!(values.get("name"), Some(&Value::from("demo")));
        let (name, sub) = values.subcommand().unwrap();
        assert_eq!(name, "sub1");
        assert_eq!(sub.get("sub1"), Some(&Value::from("aaa")));
        assert_eq!(frontend.asked, vec!["name? ", "subcommand? ", "sub1? "]);
    }

    #[test]
    fn excluded_selector_follows_its_default() {
        let defaults = ArgValues::new().with_subcommand("sub2", ArgValues::new().with("fast", true));
        let schema = subcommand_schema().with_defaults(&defaults);
        let names = vec!["fast".to_string()];
        let mut frontend = ScriptedFrontend::new(&["no"]);
        let values = Prompter::new(&Validators::new())
            .only_ask(&names)
            .run(&schema, &mut frontend)
            .unwrap();
        let (name, sub) = values.subcommand().unwrap();
        assert_eq!(name, "sub2");
        assert_eq!(sub.get("fast"), Some(&Value::Bool(false)));
        assert_eq!(frontend.asked, vec!["fast? "]);
    }

    #[test]
    fn selector_can_be_asked_by_reserved_key() {
        let names = vec![SUBCOMMAND_KEY.to_string()];
        let mut frontend = ScriptedFrontend::new(&["sub2"]);
        let values = Prompter::new(&Validators::new())
            .only_ask(&names)
            .run(&subcommand_schema(), &mut frontend)
            .unwrap();
        assert_eq!(values.subcommand_name(), Some("sub2"));
        assert_eq!(values.get("name"), Some(&Value::from("demo")));
    }

    #[test]
    fn counters_are_never_asked() {
        let schema = Schema::new()
            .arg(ArgSpec::count("verbose"))
            .arg(ArgSpec::string("test"));
        let (result, frontend) = run(&schema, &["x"]);
        result.unwrap();
        assert_eq!(frontend.asked, vec!["test? "]);
    }

    #[test]
    fn exhausted_input_is_a_terminal_error() {
        let (result, _) = run(&simple_schema(), &["123"]);
        assert!(matches!(result.unwrap_err(), ClapfillError::Terminal(_)));
    }
}
