//! # clapfill demo application
//!
//! A small greeter CLI wired through clapfill. Arguments given on one run are
//! saved to `clapfill-demo.toml` in the working directory and become the
//! defaults of the next.
//!
//! ## Running
//!
//! ```sh
//! cargo run --example clapfill_demo                       # prompt for everything
//! cargo run --example clapfill_demo -- --name Ada greet   # parse, fill gaps from the file
//! cargo run --example clapfill_demo -- --ask name         # prompt for `name` only
//! RUST_LOG=clapfill=debug cargo run --example clapfill_demo
//! ```
//!
//! With the `widgets` feature and a terminal on stdin, choices and yes/no
//! questions use arrow-key widgets; otherwise prompts are plain lines.

use std::process::ExitCode;

use clap::{CommandFactory, FromArgMatches, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use clapfill::{
    ArgValues, Clapfill, ClapfillBuilder, ClapfillError, PlainFrontend, SearchPath, to_matches,
};

// ---------------------------------------------------------------------------
// CLI definitions
// ---------------------------------------------------------------------------

/// clapfill demo: a greeter that remembers its arguments.
#[derive(Parser, Debug)]
#[command(name = "clapfill-demo")]
struct Cli {
    /// Who to greet.
    #[arg(long, default_value = "world")]
    name: String,

    /// How loudly to greet.
    #[arg(long, value_parser = ["plain", "shout"], default_value = "plain")]
    style: String,

    /// Print the resolved arguments first.
    #[arg(long)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Say hello.
    Greet {
        /// Extra lines to print after the greeting.
        #[arg(long, num_args = 0..)]
        extra: Vec<String>,
    },
    /// Say goodbye.
    Farewell {
        /// Wave as well.
        #[arg(long)]
        wave: bool,
    },
}

fn make_builder() -> ClapfillBuilder {
    Clapfill::builder(Cli::command())
        .app_name("clapfill-demo")
        .location(SearchPath::Cwd)
}

/// `--ask a,b` is handled here rather than by clap so it never lands in the
/// config file.
fn split_ask(args: Vec<String>) -> (Vec<String>, Option<Vec<String>>) {
    let mut rest = Vec::with_capacity(args.len());
    let mut ask = None;
    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        if arg == "--ask" {
            let names = iter.next().unwrap_or_default();
            ask = Some(names.split(',').map(str::to_string).collect());
        } else {
            rest.push(arg);
        }
    }
    (rest, ask)
}

fn prompt(builder: &ClapfillBuilder) -> Result<ArgValues, ClapfillError> {
    #[cfg(feature = "widgets")]
    {
        use std::io::IsTerminal;
        if std::io::stdin().is_terminal() {
            return builder.interactive(&mut clapfill::WidgetFrontend::stdout());
        }
    }
    builder.interactive(&mut PlainFrontend::stdio())
}

fn run(cli: &Cli) {
    let shout = cli.style == "shout";
    let say = |text: String| {
        if shout {
            println!("{}!", text.to_uppercase());
        } else {
            println!("{text}.");
        }
    };
    match &cli.command {
        None | Some(Commands::Greet { .. }) => say(format!("Hello, {}", cli.name)),
        Some(Commands::Farewell { .. }) => say(format!("Goodbye, {}", cli.name)),
    }
    match &cli.command {
        Some(Commands::Greet { extra }) => extra.iter().for_each(|line| println!("{line}")),
        Some(Commands::Farewell { wave: true }) => println!("o/"),
        _ => {}
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let (argv, ask) = split_ask(std::env::args().collect());
    let mut builder = make_builder();
    let result = match ask {
        Some(names) => {
            builder = builder.only_ask(names);
            prompt(&builder)
        }
        None if argv.len() <= 1 => prompt(&builder),
        None => builder.parse_from(&argv),
    };

    let values = match result {
        Ok(values) => values,
        Err(ClapfillError::Cli(e)) => e.exit(),
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };

    let parsed = to_matches(&Cli::command(), &values).and_then(|m| Cli::from_arg_matches(&m));
    let cli = match parsed {
        Ok(cli) => cli,
        Err(e) => e.exit(),
    };
    if cli.verbose {
        println!("{values}");
    }
    run(&cli);
    ExitCode::SUCCESS
}
