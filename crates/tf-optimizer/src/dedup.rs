//! Structural dedup through the automaton engine.
//!
//! The syntax tree is mirrored into a [`TreeNode`], turned into an automaton
//! whose states are equivalent exactly when their subtrees are identical,
//! minimized, and projected back. The projection is the deduplicated graph.
//! Optionally, identical siblings of selected kinds are dropped from the
//! syntax tree, keeping the last occurrence.

use crate::bridge::to_tree;
use serde::Serialize;
use tf_automaton::{extract_automaton, minimize, project_onto_tree, MinimizedAutomaton, ProjectedTree, TreeNode};
use tf_core::{AstNode, NodeKind, Result};
use tracing::debug;

/// Statistics from one dedup run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DedupReport {
    pub automaton_states: usize,
    pub minimized_states: usize,
    pub refinement_passes: usize,
    pub source_nodes: usize,
    pub projected_nodes: usize,
    pub removed_siblings: usize,
}

impl DedupReport {
    /// Nodes that became shared in the projection.
    pub fn shared_nodes(&self) -> usize {
        self.source_nodes.saturating_sub(self.projected_nodes)
    }
}

#[derive(Debug, Clone)]
pub struct DedupOutcome {
    pub ast: AstNode,
    pub projection: ProjectedTree,
    pub report: DedupReport,
}

#[derive(Debug, Clone, Default)]
pub struct AutomatonDedup {
    /// Kinds whose identical siblings may be collapsed.
    pub sibling_kinds: Vec<NodeKind>,
}

impl AutomatonDedup {
    pub fn new(sibling_kinds: Vec<NodeKind>) -> Self {
        Self { sibling_kinds }
    }

    pub fn run(&self, ast: &AstNode) -> Result<DedupOutcome> {
        let tree = to_tree(ast);
        let automaton = extract_automaton(&tree)?;
        let minimized = minimize(&automaton)?;
        let projection = project_onto_tree(&tree, &minimized)?;

        let mut out = ast.clone();
        let removed_siblings = if self.sibling_kinds.is_empty() {
            0
        } else {
            self.drop_duplicate_siblings(&mut out, &tree, &minimized)
        };

        let report = DedupReport {
            automaton_states: automaton.state_count(),
            minimized_states: minimized.state_count(),
            refinement_passes: minimized.passes(),
            source_nodes: projection.source_len(),
            projected_nodes: projection.len(),
            removed_siblings,
        };
        debug!(?report, "automaton dedup finished");
        Ok(DedupOutcome { ast: out, projection, report })
    }

    /// `ast` and `tree` have the same shape; `tree` supplies the state of
    /// each node.
    fn drop_duplicate_siblings(&self, ast: &mut AstNode, tree: &TreeNode, minimized: &MinimizedAutomaton) -> usize {
        let Some(children) = ast.children_mut() else {
            return 0;
        };
        let reps: Vec<_> = tree
            .children
            .iter()
            .map(|c| minimized.representative(&c.id))
            .collect();

        let mut removed = 0;
        let mut kept = Vec::with_capacity(children.len());
        for (i, (child, child_tree)) in children.drain(..).zip(&tree.children).enumerate() {
            let collapsible = self.sibling_kinds.contains(&child.kind());
            let repeated_later = reps[i].is_some() && reps[i + 1..].contains(&reps[i]);
            if collapsible && repeated_later {
                removed += 1;
                continue;
            }
            kept.push((child, child_tree));
        }

        let mut next = Vec::with_capacity(kept.len());
        for (mut child, child_tree) in kept {
            removed += self.drop_duplicate_siblings(&mut child, child_tree, minimized);
            next.push(child);
        }
        *children = next;
        removed
    }
}
