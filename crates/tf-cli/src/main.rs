//! treefold: tokenize, parse, validate, optimize and regenerate source files,
//! or minimize an automaton.

mod cli;
mod commands;
mod output;

use anyhow::Result;
use clap::Parser;
use std::process;
use tf_core::TreefoldConfig;

use cli::{Cli, Command};

fn main() {
    let cli = Cli::parse();
    cli.init_logging();

    if let Err(e) = run(cli) {
        // one line, whatever the error chain looks like
        let message = format!("{e:#}").replace('\n', " ");
        eprintln!("Error: {message}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = TreefoldConfig::load(cli.config.as_deref())?;

    match cli.command {
        Command::Markup { action } => commands::source::run(&config, "markup", action),
        Command::Stylesheet { action } => commands::source::run(&config, "stylesheet", action),
        Command::Script { action } => commands::source::run(&config, "script", action),
        Command::Minimize { input, output } => commands::minimize::run(&config, &input, &output),
    }
}
