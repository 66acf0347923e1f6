//! Remember command-line arguments in a config file and ask for them
//! interactively.
//!
//! Clapfill keeps a CLI's argument tree in sync with a config file. Values
//! saved from one run become the defaults of the next, and any argument can
//! be collected through a prompt instead of a flag.
//!
//! ```ignore
//! let values = Clapfill::builder(Cli::command())
//!     .app_name("myapp")
//!     .interactive(&mut PlainFrontend::stdio())?;
//! ```
//!
//! That single call reads `myapp.toml` from the platform config directory,
//! asks one question per argument with the stored answer as default, checks
//! the answers through clap, and writes them back.
//!
//! # Schema as source of truth
//!
//! A [`Schema`] is a tree of [`ArgSpec`]s: one node per command, one child
//! per sub-command. Build it by hand or, with the `clap` feature (on by
//! default), derive it from a `clap::Command` with [`Schema::from_command`].
//! Each argument records its action, multiplicity, default, choices and help
//! text; these drive everything else:
//!
//! - **Validators** turn values into file text and back. The kind is picked
//!   per argument (string, boolean, list, or skipped) unless a
//!   [`Validators`] override names the argument.
//! - **Import** stages the file's values; [`Schema::with_defaults`] installs
//!   them as defaults in a new snapshot.
//! - **Prompting** walks the snapshot and asks for every argument, or only
//!   the ones in an ask-list.
//! - **Export** writes a resolved set back into the file.
//!
//! # File layout
//!
//! The file is TOML used the way INI files are: the top-level table holds
//! the root command's arguments and every sub-command gets its own table,
//! nested the way the commands nest. The reserved key `__subcommand__`
//! records which sub-command was selected in a section.
//!
//! ```toml
//! name = "demo"
//! __subcommand__ = "build"
//!
//! [build]
//! release = "true"
//! targets = "['x86', 'arm']"
//! ```
//!
//! Values are stored as strings rendered by their validator; lists use a
//! single-quoted literal. Export edits the document with `toml_edit`, so
//! comments, unrelated keys and other sections survive.
//!
//! # Prompting
//!
//! [`Prompter`] owns the question logic: help and default display, blank
//! answers keeping the default, choice checking and re-asking after a
//! rejected answer. A [`Frontend`] only moves text. [`PlainFrontend`] reads
//! lines from any reader; with the `widgets` feature [`WidgetFrontend`]
//! offers arrow-key selection lists and yes/no toggles on a crossterm
//! terminal.
//!
//! # Error handling
//!
//! All fallible operations return [`ClapfillError`]. A rejected answer is a
//! [`Rejection`]: prompts print it and ask again, import skips the value and
//! keeps its default. Everything else is fatal and propagates.

pub mod error;
pub mod types;
pub mod validator;

mod builder;
#[cfg(feature = "clap")]
mod cli;
mod file;
mod import;
mod persist;
mod prompt;
mod registry;
mod schema;
mod values;

#[cfg(test)]
mod fixtures;

pub use builder::{Clapfill, ClapfillBuilder};
#[cfg(feature = "clap")]
pub use cli::{VALUE_TERMINATOR, explicit_values, to_argv, to_matches, values_from_matches};
pub use error::{ClapfillError, Rejection};
pub use file::resolve_search_path;
pub use import::{import_document, import_file};
pub use persist::{export_document, save};
pub use prompt::{Frontend, PlainFrontend, Prompter};
#[cfg(feature = "widgets")]
pub use prompt::WidgetFrontend;
pub use registry::Validators;
pub use schema::{Action, ArgSpec, Schema, Subcommand};
pub use types::{Multiplicity, RawInput, SUBCOMMAND_KEY, SearchPath, Value};
pub use validator::{
    BoolValidator, DummyValidator, Kind, ListValidator, PathKind, PathValidator, Question,
    StrValidator, Validator, parse_list, render_list,
};
pub use values::{ArgValues, Selected, merge};
