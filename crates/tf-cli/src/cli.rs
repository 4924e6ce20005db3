//! Command-line argument parsing for treefold

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tf_core::{OptimizationLevel, OutputFormat};

/// Treefold - tokenize, parse, validate, optimize and regenerate source text
#[derive(Parser, Debug)]
#[command(name = "treefold")]
#[command(author, version, about = "Treefold - structural source optimizer", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Config file (JSON); defaults to <config dir>/treefold/config.json
    #[arg(long, global = true, env = "TREEFOLD_CONFIG", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Log pipeline details to stderr
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Markup documents
    #[command(alias = "html")]
    Markup {
        #[command(subcommand)]
        action: Action,
    },

    /// Stylesheets
    #[command(alias = "css")]
    Stylesheet {
        #[command(subcommand)]
        action: Action,
    },

    /// Scripts
    #[command(alias = "js")]
    Script {
        #[command(subcommand)]
        action: Action,
    },

    /// Minimize an automaton read from a JSON file
    Minimize {
        /// Automaton JSON (`states`, `initialState`, `transitions`, `acceptingStates`)
        input: PathBuf,

        #[command(flatten)]
        output: OutputArgs,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum Action {
    /// Parse a file and regenerate it
    Parse {
        /// Input source file
        input: PathBuf,

        /// Run the optimizer before generating
        #[arg(long)]
        optimize: bool,

        /// Fail if validation reports any problem
        #[arg(long)]
        validate: bool,

        /// Optimization level; implies --optimize
        #[arg(long, value_enum)]
        level: Option<Level>,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Print the token stream of a file
    Tokenize {
        /// Input source file
        input: PathBuf,

        #[command(flatten)]
        output: OutputArgs,
    },
}

#[derive(Args, Debug, Clone, Default)]
pub struct OutputArgs {
    /// Output format; defaults to the config's `output.format`
    #[arg(short = 'f', long, value_enum)]
    pub format: Option<Format>,

    /// Write to this file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// JSON document
    Json,
    /// Generated source or a plain listing
    Text,
}

impl From<Format> for OutputFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Json => OutputFormat::Json,
            Format::Text => OutputFormat::Text,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    /// Local rewrite passes only
    Safe,
    /// Rewrite passes plus automaton dedup
    Structural,
}

impl From<Level> for OptimizationLevel {
    fn from(level: Level) -> Self {
        match level {
            Level::Safe => OptimizationLevel::Safe,
            Level::Structural => OptimizationLevel::Structural,
        }
    }
}

impl Cli {
    /// Logs go to stderr; `--debug` wins over `RUST_LOG`.
    pub fn init_logging(&self) {
        use tracing_subscriber::{fmt, EnvFilter};

        let filter = if self.debug {
            EnvFilter::new("debug")
        } else {
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
        };

        fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
    }
}
