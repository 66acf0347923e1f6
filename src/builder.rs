use std::path::PathBuf;

use crate::error::ClapfillError;
use crate::file;
use crate::import;
use crate::persist;
use crate::prompt::{Frontend, Prompter};
use crate::registry::Validators;
use crate::schema::Schema;
use crate::types::SearchPath;
use crate::validator::Validator;
use crate::values::ArgValues;

/// Entry point for syncing a schema with its config file.
pub struct Clapfill;

impl Clapfill {
    /// Start from a hand-built [`Schema`] or, with the `clap` feature, a
    /// `clap::Command`.
    pub fn builder(schema: impl Into<Schema>) -> ClapfillBuilder {
        ClapfillBuilder::new(schema.into())
    }
}

/// Builder for loading, prompting and saving one schema's values.
///
/// The config file is `{location}/{file_name}` unless
/// [`config_file()`](Self::config_file) names it directly. Every operation
/// reads the file fresh; nothing is cached between calls.
#[derive(Debug)]
pub struct ClapfillBuilder {
    schema: Schema,
    app_name: Option<String>,
    file_name: Option<String>,
    location: Option<SearchPath>,
    config_file: Option<PathBuf>,
    validators: Validators,
    only_ask: Vec<String>,
}

impl ClapfillBuilder {
    fn new(schema: Schema) -> Self {
        Self {
            schema,
            app_name: None,
            file_name: None,
            location: None,
            config_file: None,
            validators: Validators::new(),
            only_ask: Vec::new(),
        }
    }

    /// Set the application name. This derives sensible defaults:
    /// - `file_name` → `"{app_name}.toml"`
    /// - `location` → [`SearchPath::Platform`] under `app_name`
    pub fn app_name(mut self, name: &str) -> Self {
        self.app_name = Some(name.to_string());
        self
    }

    /// Override the config file name (default: `"{app_name}.toml"`).
    pub fn file_name(mut self, name: &str) -> Self {
        self.file_name = Some(name.to_string());
        self
    }

    /// Set the directory holding the config file (default: [`SearchPath::Platform`]).
    pub fn location(mut self, location: SearchPath) -> Self {
        self.location = Some(location);
        self
    }

    /// Use this exact file, ignoring `app_name`, `file_name` and `location`.
    pub fn config_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_file = Some(path.into());
        self
    }

    /// Use `validator` for every argument named `name`.
    pub fn validator(mut self, name: &str, validator: impl Validator + 'static) -> Self {
        self.validators.insert(name, validator);
        self
    }

    /// Only prompt for these arguments; the rest keep their defaults.
    /// The sub-command selector is named `__subcommand__`.
    pub fn only_ask<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.only_ask = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Resolve the effective app name, or error if not set.
    fn effective_app_name(&self) -> Result<&str, ClapfillError> {
        self.app_name
            .as_deref()
            .ok_or(ClapfillError::AppNameRequired)
    }

    /// Resolve the effective file name.
    fn effective_file_name(&self) -> Result<String, ClapfillError> {
        if let Some(name) = &self.file_name {
            return Ok(name.clone());
        }
        let app = self.effective_app_name()?;
        Ok(format!("{app}.toml"))
    }

    fn effective_location(&self) -> SearchPath {
        self.location.clone().unwrap_or(SearchPath::Platform)
    }

    /// The config file every operation reads and writes.
    ///
    /// # Errors
    ///
    /// [`ClapfillError::AppNameRequired`] without an app name or explicit
    /// file, [`ClapfillError::NoConfigPath`] when the location cannot be
    /// resolved.
    pub fn config_path(&self) -> Result<PathBuf, ClapfillError> {
        if let Some(path) = &self.config_file {
            return Ok(path.clone());
        }
        let app = self.effective_app_name()?;
        file::config_path(&self.effective_location(), &self.effective_file_name()?, app)
    }

    /// Import the config file and return a schema snapshot whose defaults
    /// are the stored values.
    pub fn load(&self) -> Result<Schema, ClapfillError> {
        let path = self.config_path()?;
        let staged = import::import_file(&self.schema, &self.validators, &path)?;
        tracing::debug!(path = %path.display(), staged = staged.len(), "loaded config");
        Ok(self.schema.with_defaults(&staged))
    }

    /// Prompt for values, offering the stored ones as defaults. Nothing is
    /// written.
    pub fn prompt<F: Frontend + ?Sized>(&self, frontend: &mut F) -> Result<ArgValues, ClapfillError> {
        let snapshot = self.load()?;
        Prompter::new(&self.validators)
            .only_ask(&self.only_ask)
            .run(&snapshot, frontend)
    }

    /// Write `values` into the config file, keeping unrelated content.
    pub fn save(&self, values: &ArgValues) -> Result<(), ClapfillError> {
        let path = self.config_path()?;
        persist::save(&path, &self.schema, &self.validators, values)
    }

    /// Load, prompt and save in one go. Returns the answers.
    pub fn interactive<F: Frontend + ?Sized>(
        &self,
        frontend: &mut F,
    ) -> Result<ArgValues, ClapfillError> {
        let values = self.prompt(frontend)?;
        self.save(&values)?;
        Ok(values)
    }

    /// Parse a command line with the stored values standing in for anything
    /// not given on it, then save the result.
    ///
    /// Values given on the command line (or through the environment) win over
    /// the config file, which wins over the command's own defaults. Required
    /// arguments may be satisfied by the file alone.
    ///
    /// # Errors
    ///
    /// [`ClapfillError::NoCommand`] for a hand-built schema,
    /// [`ClapfillError::Cli`] when clap rejects the line (including
    /// `--help`), plus everything [`load`](Self::load) and
    /// [`Schema::finalize`] return.
    #[cfg(feature = "clap")]
    pub fn parse_from<I, T>(&self, argv: I) -> Result<ArgValues, ClapfillError>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let snapshot = self.load()?;
        let command = snapshot.command.clone().ok_or(ClapfillError::NoCommand)?;
        let matches = crate::cli::relaxed(command).try_get_matches_from(argv)?;
        let explicit = crate::cli::explicit_values(&snapshot, &matches);
        let merged = crate::values::merge(snapshot.default_values(), explicit);
        let values = snapshot.finalize(&merged)?;
        self.save(&values)?;
        Ok(values)
    }

    /// [`parse_from`](Self::parse_from) over the process arguments.
    #[cfg(feature = "clap")]
    pub fn parse(&self) -> Result<ArgValues, ClapfillError> {
        self.parse_from(std::env::args_os())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::test::{ScriptedFrontend, simple_schema, subcommand_schema};
    use crate::types::Value;
    use crate::validator::PathValidator;
    use std::fs;
    use tempfile::TempDir;

    fn in_dir(dir: &TempDir, schema: Schema) -> ClapfillBuilder {
        Clapfill::builder(schema)
            .app_name("test")
            .location(SearchPath::Path(dir.path().to_path_buf()))
    }

    #[test]
    fn missing_app_name_errors() {
        let result = Clapfill::builder(simple_schema()).load();
        assert!(matches!(result, Err(ClapfillError::AppNameRequired)));
    }

    #[test]
    fn app_name_derives_file_name() {
        let dir = TempDir::new().unwrap();
        let path = in_dir(&dir, simple_schema()).config_path().unwrap();
        assert_eq!(path, dir.path().join("test.toml"));
    }

    #[test]
    fn file_name_can_be_overridden() {
        let dir = TempDir::new().unwrap();
        let path = in_dir(&dir, simple_schema())
            .file_name("custom.toml")
            .config_path()
            .unwrap();
        assert_eq!(path, dir.path().join("custom.toml"));
    }

    #[test]
    fn explicit_file_needs_no_app_name() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("nested/app.toml");
        let builder = Clapfill::builder(simple_schema()).config_file(&file);
        assert_eq!(builder.config_path().unwrap(), file);
        assert!(builder.load().is_ok());
    }

    #[test]
    fn load_turns_stored_values_into_defaults() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("test.toml"), "test = \"stored\"\nok = \"true\"\n").unwrap();
        let snapshot = in_dir(&dir, simple_schema()).load().unwrap();
        assert_eq!(
            snapshot.get("test").unwrap().default,
            Some(Value::from("stored"))
        );
        assert_eq!(snapshot.get("ok").unwrap().default, Some(Value::Bool(true)));
        assert_eq!(snapshot.get("other").unwrap().default, None);
    }

    #[test]
    fn load_without_file_keeps_schema_defaults() {
        let dir = TempDir::new().unwrap();
        let snapshot = in_dir(&dir, subcommand_schema()).load().unwrap();
        assert_eq!(snapshot.default_values().get("name"), Some(&Value::from("demo")));
        assert!(!dir.path().join("test.toml").exists());
    }

    #[test]
    fn interactive_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("test.toml");
        fs::write(&path, "# my settings\ntest = \"stored\"\n").unwrap();
        let builder = in_dir(&dir, simple_schema());

        let mut frontend = ScriptedFrontend::new(&["", "bbb", "apple", "yes"]);
        let values = builder.interactive(&mut frontend).unwrap();
        assert_eq!(values.get("test"), Some(&Value::from("stored")));
        assert_eq!(values.get("other"), Some(&Value::from("bbb")));

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("# my settings\n"));
        assert!(content.contains("other = \"bbb\""));
        assert!(content.contains("fruit = \"apple\""));
        assert!(content.contains("ok = \"true\""));

        // A second run offers the saved answers as defaults.
        let mut frontend = ScriptedFrontend::new(&["", "", "", ""]);
        assert_eq!(builder.prompt(&mut frontend).unwrap(), values);
    }

    #[test]
    fn only_ask_limits_the_questions() {
        let dir = TempDir::new().unwrap();
        let builder = in_dir(&dir, simple_schema()).only_ask(["other"]);
        let mut frontend = ScriptedFrontend::new(&["bbb"]);
        let values = builder.prompt(&mut frontend).unwrap();
        assert_eq!(frontend.asked, vec!["other? "]);
        assert_eq!(values.get("other"), Some(&Value::from("bbb")));
        assert!(!values.contains("test"));
    }

    #[test]
    fn custom_validators_apply_to_prompts() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("missing");
        let builder = in_dir(&dir, simple_schema())
            .validator("test", PathValidator::directory())
            .only_ask(["test"]);
        let answers = [missing.to_str().unwrap(), dir.path().to_str().unwrap()];
        let mut frontend = ScriptedFrontend::new(&answers);
        let values = builder.prompt(&mut frontend).unwrap();
        assert_eq!(frontend.warned.len(), 1);
        assert_eq!(
            values.get("test"),
            Some(&Value::from(dir.path().to_str().unwrap()))
        );
    }

    #[test]
    fn subcommand_answers_are_saved_in_their_section() {
        let dir = TempDir::new().unwrap();
        let builder = in_dir(&dir, subcommand_schema());
        let mut frontend = ScriptedFrontend::new(&["", "sub1", "hello"]);
        builder.interactive(&mut frontend).unwrap();

        let content = fs::read_to_string(dir.path().join("test.toml")).unwrap();
        assert!(content.contains("__subcommand__ = \"sub1\""));
        assert!(content.contains("[sub1]\nsub1 = \"hello\""));

        let snapshot = builder.load().unwrap();
        let defaults = snapshot.default_values();
        assert_eq!(defaults.subcommand_name(), Some("sub1"));
        assert_eq!(
            defaults.subcommand().unwrap().1.get("sub1"),
            Some(&Value::from("hello"))
        );
    }

    #[cfg(feature = "clap")]
    mod clap_tests {
        use super::*;
        use crate::fixtures::test::subcommand_command;

        #[test]
        fn parse_fills_gaps_from_the_file() {
            let dir = TempDir::new().unwrap();
            let path = dir.path().join("test.toml");
            fs::write(&path, "name = \"saved\"\n").unwrap();
            let builder = in_dir(&dir, Schema::from_command(&subcommand_command()));

            let values = builder.parse_from(["nested", "sub2", "--fast"]).unwrap();
            assert_eq!(values.get("name"), Some(&Value::from("saved")));
            assert_eq!(values.subcommand_name(), Some("sub2"));
            assert_eq!(
                values.subcommand().unwrap().1.get("fast"),
                Some(&Value::Bool(true))
            );

            let content = fs::read_to_string(&path).unwrap();
            assert!(content.contains("__subcommand__ = \"sub2\""));
            assert!(content.contains("[sub2]\nfast = \"true\""));
        }

        #[test]
        fn command_line_wins_over_the_file() {
            let dir = TempDir::new().unwrap();
            fs::write(dir.path().join("test.toml"), "name = \"saved\"\n").unwrap();
            let builder = in_dir(&dir, Schema::from_command(&subcommand_command()));
            let values = builder
                .parse_from(["nested", "--name", "cli", "sub1", "--sub1", "x"])
                .unwrap();
            assert_eq!(values.get("name"), Some(&Value::from("cli")));
            assert_eq!(
                values.subcommand().unwrap().1.get("sub1"),
                Some(&Value::from("x"))
            );
        }

        #[test]
        fn required_arguments_can_come_from_the_file() {
            use clap::{Arg, Command};
            let dir = TempDir::new().unwrap();
            fs::write(dir.path().join("test.toml"), "input = \"data.csv\"\n").unwrap();
            let command = Command::new("req").arg(Arg::new("input").long("input").required(true));
            let builder = in_dir(&dir, Schema::from_command(&command));
            let values = builder.parse_from(["req"]).unwrap();
            assert_eq!(values.get("input"), Some(&Value::from("data.csv")));
        }

        #[test]
        fn missing_required_argument_is_reported() {
            use clap::{Arg, Command};
            let dir = TempDir::new().unwrap();
            let command = Command::new("req").arg(Arg::new("input").long("input").required(true));
            let builder = in_dir(&dir, Schema::from_command(&command));
            let result = builder.parse_from(["req"]);
            assert!(matches!(
                result,
                Err(ClapfillError::MissingRequiredArgument(name)) if name == "input"
            ));
        }

        #[test]
        fn hand_built_schema_cannot_parse() {
            let dir = TempDir::new().unwrap();
            let result = in_dir(&dir, simple_schema()).parse_from(["simple"]);
            assert!(matches!(result, Err(ClapfillError::NoCommand)));
        }
    }
}
