//! `minimize` subcommand.

use anyhow::{Context, Result};
use std::fmt::Write;
use std::fs;
use std::path::Path;
use tf_automaton::{minimize, Automaton, MinimizedAutomaton};
use tf_core::{OutputFormat, TreefoldConfig};

use crate::cli::OutputArgs;
use crate::output::OutputFormatter;

pub fn run(config: &TreefoldConfig, input: &Path, output: &OutputArgs) -> Result<()> {
    let json = fs::read_to_string(input).with_context(|| format!("Input file not found: {}", input.display()))?;
    config.check_input_size(json.len())?;
    let automaton = Automaton::from_json(&json)
        .with_context(|| format!("Invalid automaton JSON in {}", input.display()))?;
    let minimized = minimize(&automaton)?;

    let formatter = OutputFormatter::from_args(config, output);
    let content = match formatter.format() {
        OutputFormat::Json => formatter.json(&minimized)?,
        OutputFormat::Text => summary(&automaton, &minimized),
    };
    formatter.emit(&content, output.output.as_deref())
}

fn summary(original: &Automaton, minimized: &MinimizedAutomaton) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "states: {} -> {} ({} refinement passes)",
        original.state_count(),
        minimized.state_count(),
        minimized.passes()
    );
    if let Some(initial) = minimized.initial_state() {
        let _ = writeln!(out, "initial: {initial}");
    }
    for block in minimized.blocks() {
        let members: Vec<_> = block.iter().map(|s| s.as_str()).collect();
        if let Some(rep) = block.first() {
            let marker = if minimized.automaton().is_accepting(rep) { " (accepting)" } else { "" };
            let _ = writeln!(out, "{rep} = {{{}}}{marker}", members.join(", "));
        }
    }
    for (from, edges) in &minimized.automaton().transitions {
        for (symbol, to) in edges {
            let _ = writeln!(out, "{from} --{symbol}--> {to}");
        }
    }
    out
}
