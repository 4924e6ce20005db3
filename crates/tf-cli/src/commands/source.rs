//! `markup`, `stylesheet` and `script` subcommands.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tf_core::{OutputFormat, Token, TreefoldConfig};
use tf_optimizer::OptimizerPipeline;
use tf_core::config::LimitsConfig;
use tf_parser::{Dialect, PipelineOptions};
use tracing::{info, warn};

use crate::cli::Action;
use crate::output::OutputFormatter;

pub fn run(config: &TreefoldConfig, dialect_name: &str, action: Action) -> Result<()> {
    let dialect = tf_parser::dialect(dialect_name, &config.limits)?;
    let input = match &action {
        Action::Tokenize { input, .. } | Action::Parse { input, .. } => input,
    };
    if let Some(suggested) = extension_mismatch(dialect.as_ref(), input, &config.limits) {
        warn!(input = %input.display(), dialect = dialect.name(), suggested, "file extension belongs to another dialect");
    }

    match action {
        Action::Tokenize { input, output } => {
            let source = read_source(config, &input)?;
            let tokens = dialect.tokenize(&source)?;
            let formatter = OutputFormatter::from_args(config, &output);
            let content = match formatter.format() {
                OutputFormat::Json => formatter.json(&tokens)?,
                OutputFormat::Text => render_tokens(&tokens),
            };
            formatter.emit(&content, output.output.as_deref())
        }
        Action::Parse { input, optimize, validate, level, output } => {
            let source = read_source(config, &input)?;
            let mut options = PipelineOptions { validate, optimizer: None };
            if optimize || level.is_some() {
                let mut pipeline = OptimizerPipeline::from_config(&config.optimizer);
                if let Some(level) = level {
                    pipeline = pipeline.with_level(level.into());
                }
                options.optimizer = Some(pipeline);
            }

            let result = tf_parser::run(dialect.as_ref(), &source, &options)?;
            if let Some(opt) = &result.optimization {
                info!(
                    original = opt.original_nodes,
                    optimized = opt.optimized_nodes,
                    reduction_pct = opt.reduction_pct,
                    passes = ?opt.passes_applied,
                    "optimized"
                );
            }

            let formatter = OutputFormatter::from_args(config, &output);
            let content = match formatter.format() {
                OutputFormat::Json => formatter.json(&result)?,
                OutputFormat::Text => result.output,
            };
            formatter.emit(&content, output.output.as_deref())
        }
    }
}

/// Read an input file, refusing anything over `limits.max_input_bytes`.
fn read_source(config: &TreefoldConfig, path: &Path) -> Result<String> {
    let meta = fs::metadata(path).with_context(|| format!("Input file not found: {}", path.display()))?;
    config.check_input_size(meta.len() as usize)?;
    fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

/// The dialect the input's extension points at, when it is not `dialect`.
fn extension_mismatch(dialect: &dyn Dialect, input: &Path, limits: &LimitsConfig) -> Option<&'static str> {
    let by_path = tf_parser::dialect_for_path(&input.to_string_lossy(), limits).ok()?;
    (by_path.name() != dialect.name()).then(|| by_path.name())
}

fn render_tokens(tokens: &[Token]) -> String {
    tokens
        .iter()
        .map(|t| format!("{}\t{:?}\t{:?}", t.position, t.kind, t.text))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tf_core::{Position, TokenKind};

    #[test]
    fn test_render_tokens() {
        let tokens = vec![
            Token::new(TokenKind::TagOpen, "p", Position::start()),
            Token::new(TokenKind::Text, "a\tb", Position { offset: 3, line: 1, column: 4 }),
        ];
        assert_eq!(render_tokens(&tokens), "1:1\tTagOpen\t\"p\"\n1:4\tText\t\"a\\tb\"");
    }

    #[test]
    fn test_extension_mismatch() {
        let limits = LimitsConfig::default();
        let css = tf_parser::dialect("stylesheet", &limits).unwrap();
        assert_eq!(extension_mismatch(css.as_ref(), Path::new("a.css"), &limits), None);
        assert_eq!(extension_mismatch(css.as_ref(), Path::new("page.html"), &limits), Some("markup"));
        assert_eq!(extension_mismatch(css.as_ref(), Path::new("notes"), &limits), None);
    }

    #[test]
    fn test_read_source_limit() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("big.css");
        fs::write(&path, "a{b:c}").unwrap();
        let mut config = TreefoldConfig::default();
        config.limits.max_input_bytes = 3;
        let err = read_source(&config, &path).unwrap_err();
        assert!(err.to_string().contains("Limit exceeded"), "{err}");
        config.limits.max_input_bytes = 6;
        assert_eq!(read_source(&config, &path).unwrap(), "a{b:c}");
    }
}
