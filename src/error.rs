use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClapfillError {
    #[error("Missing required argument '{0}': it is not in the ask-list and has no default")]
    MissingRequiredArgument(String),

    #[error("Unsupported use of the {validator} validator: {reason}")]
    UnsupportedUsage {
        validator: &'static str,
        reason: String,
    },

    #[error("Argument '{0}' stores a constant but has no default; this shape is not supported")]
    UnsupportedShape(String),

    #[error("Invalid value for '{key}': {reason}")]
    InvalidValue { key: String, reason: String },

    #[error("Invalid list literal {text:?}: {reason}")]
    InvalidLiteral { text: String, reason: String },

    #[error("Unknown subcommand '{0}'")]
    UnknownSubcommand(String),

    #[error("Subcommand '{0}' has the same name as an argument beside it; both would use the same config key")]
    NameCollision(String),

    #[error("Failed to parse {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml_edit::TomlError,
    },

    #[error("I/O error on {path}: {source}")]
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Terminal I/O failed: {0}")]
    Terminal(#[from] std::io::Error),

    #[cfg(feature = "clap")]
    #[error(transparent)]
    Cli(#[from] clap::Error),

    #[cfg(feature = "clap")]
    #[error("Schema has no clap command to parse with: build it with Schema::from_command")]
    NoCommand,

    #[error("App name is required: call .app_name() on the builder")]
    AppNameRequired,

    #[error("No config file location could be resolved: call .config_file() on the builder")]
    NoConfigPath,
}

/// A recoverable validation failure. Prompts print it and ask again.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{reason}")]
pub struct Rejection {
    reason: String,
}

impl Rejection {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }
}
