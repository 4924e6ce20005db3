use tf_core::{AstNode, NodeKind, OptimizationLevel, Result, Token, ValidationError};
use tf_optimizer::{OptimizationResult, OptimizerPipeline};

/// Trait for source dialects: tokenize → parse → validate → optimize → generate.
pub trait Dialect: Send + Sync {
    /// Registry name, also the CLI subcommand.
    fn name(&self) -> &'static str;

    /// Split source text into tokens. Lexical errors are `Syntax` errors.
    fn tokenize(&self, source: &str) -> Result<Vec<Token>>;

    /// Build a tree from tokens.
    fn parse(&self, tokens: &[Token]) -> Result<AstNode>;

    /// Collect semantic problems. Never fails.
    fn validate(&self, ast: &AstNode) -> Vec<ValidationError>;

    /// Serialize a tree back to source text.
    fn generate(&self, ast: &AstNode) -> Result<String>;

    /// Supported file extensions.
    fn supported_extensions(&self) -> Vec<String>;

    /// Node kinds whose identical siblings structural dedup may drop.
    fn sibling_dedup_kinds(&self) -> &'static [NodeKind] {
        &[]
    }

    /// Optimize with a default pipeline at the given level.
    fn optimize(&self, ast: &AstNode, level: OptimizationLevel) -> Result<OptimizationResult> {
        self.optimize_with(ast, &OptimizerPipeline::new(level))
    }

    /// Optimize with a configured pipeline; the dialect's sibling dedup kinds
    /// replace whatever the pipeline carries.
    fn optimize_with(&self, ast: &AstNode, pipeline: &OptimizerPipeline) -> Result<OptimizationResult> {
        pipeline
            .clone()
            .with_sibling_dedup(self.sibling_dedup_kinds())
            .optimize(ast)
    }

    /// Tokenize and parse in one step.
    fn parse_source(&self, source: &str) -> Result<AstNode> {
        let tokens = self.tokenize(source)?;
        self.parse(&tokens)
    }

    /// Parse from file path.
    fn parse_file(&self, path: &str) -> Result<AstNode> {
        let content = std::fs::read_to_string(path)?;
        self.parse_source(&content)
    }

    /// Check if a file can be parsed.
    fn can_parse(&self, path: &str) -> bool {
        let ext = std::path::Path::new(path)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("");
        let ext_with_dot = format!(".{}", ext.to_ascii_lowercase());
        self.supported_extensions().contains(&ext_with_dot)
    }
}
