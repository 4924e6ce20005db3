//! End-to-end runner: tokenize → parse → validate → optimize → generate.

use crate::traits::Dialect;
use serde::Serialize;
use tf_core::{AstNode, Result, Token, TreefoldError, ValidationError};
use tf_optimizer::{OptimizationResult, OptimizerPipeline};
use tracing::debug;

#[derive(Debug, Clone, Default)]
pub struct PipelineOptions {
    /// Fail when validation reports anything. Otherwise the errors are only
    /// recorded in [`PipelineOutput::validation`].
    pub validate: bool,
    /// `None` skips the optimize stage.
    pub optimizer: Option<OptimizerPipeline>,
}

impl PipelineOptions {
    pub fn with_validation(mut self) -> Self {
        self.validate = true;
        self
    }

    pub fn with_optimizer(mut self, optimizer: OptimizerPipeline) -> Self {
        self.optimizer = Some(optimizer);
        self
    }
}

/// Everything the stages produced for one source text.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineOutput {
    pub dialect: String,
    pub tokens: Vec<Token>,
    pub ast: AstNode,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub validation: Vec<ValidationError>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub optimization: Option<OptimizationResult>,
    pub output: String,
}

impl PipelineOutput {
    /// The tree that was generated from.
    pub fn final_ast(&self) -> &AstNode {
        self.optimization.as_ref().map_or(&self.ast, |o| &o.ast)
    }
}

pub fn run(dialect: &dyn Dialect, source: &str, options: &PipelineOptions) -> Result<PipelineOutput> {
    let tokens = dialect.tokenize(source)?;
    let ast = dialect.parse(&tokens)?;

    let validation = dialect.validate(&ast);
    if options.validate && !validation.is_empty() {
        debug!(dialect = dialect.name(), errors = validation.len(), "validation failed");
        return Err(TreefoldError::Validation(validation));
    }

    let optimization = match &options.optimizer {
        Some(pipeline) => Some(dialect.optimize_with(&ast, pipeline)?),
        None => None,
    };
    let output = dialect.generate(optimization.as_ref().map_or(&ast, |o| &o.ast))?;

    debug!(
        dialect = dialect.name(),
        tokens = tokens.len(),
        nodes = ast.node_count(),
        output_bytes = output.len(),
        "pipeline finished"
    );
    Ok(PipelineOutput {
        dialect: dialect.name().to_string(),
        tokens,
        ast,
        validation,
        optimization,
        output,
    })
}
