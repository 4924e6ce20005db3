//! Optimizer pipeline — orchestrates the rewrite passes and automaton dedup.

use crate::dedup::{AutomatonDedup, DedupReport};
use crate::{pass_prune, pass_text};
use serde::Serialize;
use tf_automaton::ProjectedTree;
use tf_core::config::OptimizerConfig;
use tf_core::{AstNode, NodeKind, OptimizationLevel, Result};
use tracing::debug;

/// Optimization result with statistics.
#[derive(Debug, Clone, Serialize)]
pub struct OptimizationResult {
    pub ast: AstNode,
    pub original_nodes: usize,
    pub optimized_nodes: usize,
    pub reduction_pct: f64,
    pub level: OptimizationLevel,
    pub passes_applied: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dedup: Option<DedupReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub projection: Option<ProjectedTree>,
}

impl OptimizationResult {
    pub fn ratio(&self) -> f64 {
        if self.original_nodes == 0 { return 1.0; }
        self.optimized_nodes as f64 / self.original_nodes as f64
    }
}

/// The main optimizer pipeline.
#[derive(Debug, Clone)]
pub struct OptimizerPipeline {
    pub level: OptimizationLevel,
    pub strip_comments: bool,
    pub collapse_whitespace: bool,
    /// Node kinds whose identical siblings structural dedup may drop.
    pub sibling_dedup: Vec<NodeKind>,
}

impl OptimizerPipeline {
    pub fn new(level: OptimizationLevel) -> Self {
        Self {
            level,
            strip_comments: false,
            collapse_whitespace: true,
            sibling_dedup: Vec::new(),
        }
    }

    pub fn safe() -> Self { Self::new(OptimizationLevel::Safe) }
    pub fn structural() -> Self { Self::new(OptimizationLevel::Structural) }

    pub fn from_config(config: &OptimizerConfig) -> Self {
        Self {
            level: config.level,
            strip_comments: config.strip_comments,
            collapse_whitespace: config.collapse_whitespace,
            sibling_dedup: Vec::new(),
        }
    }

    pub fn with_level(mut self, level: OptimizationLevel) -> Self {
        self.level = level;
        self
    }

    pub fn with_sibling_dedup(mut self, kinds: &[NodeKind]) -> Self {
        self.sibling_dedup = kinds.to_vec();
        self
    }

    /// Optimize a tree through the pipeline. The input is not modified.
    pub fn optimize(&self, ast: &AstNode) -> Result<OptimizationResult> {
        let original_nodes = ast.node_count();
        let mut result = ast.clone();
        let mut passes = Vec::new();
        let mut dedup = None;
        let mut projection = None;

        // Comments (opt-in)
        if self.strip_comments {
            let n = pass_prune::strip_comments(&mut result);
            debug!(removed = n, "strip_comments");
            passes.push("strip_comments".to_string());
        }

        // Text merge (always applied)
        let n = pass_text::merge_adjacent(&mut result);
        debug!(merged = n, "merge_adjacent");
        passes.push("merge_adjacent".into());

        // Pruning (always applied)
        let n = pass_prune::remove_empty(&mut result);
        debug!(removed = n, "remove_empty");
        passes.push("remove_empty".into());

        // Whitespace runs; indentation-only text is already pruned
        if self.collapse_whitespace {
            let n = pass_text::collapse_whitespace(&mut result);
            debug!(changed = n, "collapse_whitespace");
            passes.push("collapse_whitespace".into());
        }

        // Structural dedup (Structural only)
        if matches!(self.level, OptimizationLevel::Structural) {
            let outcome = AutomatonDedup::new(self.sibling_dedup.clone()).run(&result)?;
            result = outcome.ast;
            dedup = Some(outcome.report);
            projection = Some(outcome.projection);
            passes.push("automaton_dedup".into());
        }

        let optimized_nodes = result.node_count();
        let reduction = if original_nodes > 0 {
            (original_nodes.saturating_sub(optimized_nodes) as f64 / original_nodes as f64) * 100.0
        } else {
            0.0
        };

        Ok(OptimizationResult {
            ast: result,
            original_nodes,
            optimized_nodes,
            reduction_pct: reduction,
            level: self.level,
            passes_applied: passes,
            dedup,
            projection,
        })
    }
}

impl Default for OptimizerPipeline {
    fn default() -> Self {
        Self::new(OptimizationLevel::Safe)
    }
}
