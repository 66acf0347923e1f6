#[cfg(test)]
pub mod test {
    use std::collections::VecDeque;
    use std::io;

    use crate::prompt::Frontend;
    use crate::schema::{ArgSpec, Schema};

    /// `--test`, `--other`, `--fruit {apple,banana}` and a `--ok` flag.
    pub fn simple_schema() -> Schema {
        Schema::new()
            .arg(ArgSpec::string("test"))
            .arg(ArgSpec::string("other"))
            .arg(ArgSpec::string("fruit").choices(["apple", "banana"]))
            .arg(ArgSpec::flag("ok"))
    }

    /// `--options` taking any number of values and a repeatable `--flags`.
    pub fn multiline_schema() -> Schema {
        Schema::new()
            .arg(ArgSpec::list("options"))
            .arg(ArgSpec::append("flags"))
    }

    /// A top-level `--name` (default `demo`) and two sub-commands:
    /// `sub1 --sub1 <text>` and `sub2 --fast`.
    pub fn subcommand_schema() -> Schema {
        Schema::new()
            .arg(ArgSpec::string("name").default("demo"))
            .subcommand("sub1", Schema::new().arg(ArgSpec::string("sub1")))
            .subcommand("sub2", Schema::new().arg(ArgSpec::flag("fast")))
    }

    // -- clap equivalents of the schemas above -----------------------------------

    #[cfg(feature = "clap")]
    pub fn simple_command() -> clap::Command {
        use clap::{Arg, ArgAction, Command};
        Command::new("simple")
            .arg(Arg::new("test").long("test"))
            .arg(Arg::new("other").long("other"))
            .arg(
                Arg::new("fruit")
                    .long("fruit")
                    .value_parser(["apple", "banana"]),
            )
            .arg(Arg::new("ok").long("ok").action(ArgAction::SetTrue))
    }

    #[cfg(feature = "clap")]
    pub fn multiline_command() -> clap::Command {
        use clap::{Arg, ArgAction, Command};
        Command::new("multiline")
            .arg(Arg::new("options").long("options").num_args(0..))
            .arg(Arg::new("flags").long("flags").action(ArgAction::Append))
    }

    #[cfg(feature = "clap")]
    pub fn subcommand_command() -> clap::Command {
        use clap::{Arg, ArgAction, Command};
        Command::new("nested")
            .arg(Arg::new("name").long("name").default_value("demo"))
            .subcommand(
                Command::new("sub1")
                    .about("First")
                    .arg(Arg::new("sub1").long("sub1")),
            )
            .subcommand(
                Command::new("sub2")
                    .about("Second")
                    .arg(Arg::new("fast").long("fast").action(ArgAction::SetTrue)),
            )
    }

    // -- Scripted front-end -------------------------------------------------------

    /// Replays queued answers and records what the prompter showed and asked.
    ///
    /// List answers are split on `\n`; an empty answer is an empty list. Once
    /// the script runs out every question fails with `UnexpectedEof`.
    #[derive(Debug, Default)]
    pub struct ScriptedFrontend {
        answers: VecDeque<String>,
        pub asked: Vec<String>,
        pub shown: Vec<String>,
        pub warned: Vec<String>,
        pub choice_defaults: Vec<usize>,
        pub flag_defaults: Vec<bool>,
    }

    impl ScriptedFrontend {
        pub fn new(answers: &[&str]) -> Self {
            Self {
                answers: answers.iter().map(|a| a.to_string()).collect(),
                ..Self::default()
            }
        }

        fn next(&mut self, label: &str) -> io::Result<String> {
            self.asked.push(label.to_string());
            self.answers
                .pop_front()
                .ok_or_else(|| io::Error::new(io::ErrorKind::UnexpectedEof, "script exhausted"))
        }
    }

    impl Frontend for ScriptedFrontend {
        fn show(&mut self, text: &str) -> io::Result<()> {
            self.shown.push(text.to_string());
            Ok(())
        }

        fn warn(&mut self, text: &str) -> io::Result<()> {
            self.warned.push(text.to_string());
            Ok(())
        }

        fn ask_text(&mut self, label: &str) -> io::Result<String> {
            self.next(label)
        }

        fn ask_lines(&mut self, label: &str) -> io::Result<Vec<String>> {
            let answer = self.next(label)?;
            if answer.is_empty() {
                return Ok(Vec::new());
            }
            Ok(answer.split('\n').map(str::to_string).collect())
        }

        fn ask_choice(
            &mut self,
            label: &str,
            _options: &[String],
            default: usize,
        ) -> io::Result<String> {
            self.choice_defaults.push(default);
            self.next(label)
        }

        fn ask_flag(&mut self, label: &str, default: bool) -> io::Result<String> {
            self.flag_defaults.push(default);
            self.next(label)
        }
    }

    #[test]
    fn scripted_frontend_replays_in_order() {
        let mut frontend = ScriptedFrontend::new(&["a", "x\ny", ""]);
        assert_eq!(frontend.ask_text("one? ").unwrap(), "a");
        assert_eq!(frontend.ask_lines("two? ").unwrap(), vec!["x", "y"]);
        assert!(frontend.ask_lines("three? ").unwrap().is_empty());
        assert!(frontend.ask_text("four? ").is_err());
        assert_eq!(frontend.asked, vec!["one? ", "two? ", "three? ", "four? "]);
    }
}
