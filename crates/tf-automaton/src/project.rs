//! Projection of a minimized automaton back onto a tree.
//!
//! Every node is rewritten to its block representative. Nodes sharing a
//! representative collapse into one slot of the output arena, so the result
//! is a graph with shared substructure rather than a tree.

use crate::error::{AutomatonError, Result};
use crate::minimize::MinimizedAutomaton;
use crate::model::{State, Symbol};
use crate::tree::TreeNode;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tracing::{debug, trace};

/// Index of a node in a [`ProjectedTree`].
pub type NodeRef = usize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectedNode {
    pub id: State,
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    pub transitions: BTreeMap<Symbol, NodeRef>,
    pub children: Vec<NodeRef>,
}

/// Arena of projected nodes. Slot 0 is the root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectedTree {
    nodes: Vec<ProjectedNode>,
    source_nodes: usize,
}

impl ProjectedTree {
    pub fn root(&self) -> NodeRef {
        0
    }

    pub fn node(&self, node: NodeRef) -> &ProjectedNode {
        &self.nodes[node]
    }

    pub fn nodes(&self) -> &[ProjectedNode] {
        &self.nodes
    }

    /// Number of distinct nodes after projection.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of nodes in the tree that was projected.
    pub fn source_len(&self) -> usize {
        self.source_nodes
    }

    /// Nodes saved by sharing.
    pub fn shared(&self) -> usize {
        self.source_nodes.saturating_sub(self.nodes.len())
    }

    pub fn find(&self, id: &State) -> Option<NodeRef> {
        self.nodes.iter().position(|n| &n.id == id)
    }

    /// Symbols on transitions reachable from the root.
    pub fn reachable_symbols(&self) -> BTreeSet<&Symbol> {
        let mut symbols = BTreeSet::new();
        let mut seen = vec![false; self.nodes.len()];
        let mut stack = vec![self.root()];
        while let Some(n) = stack.pop() {
            if std::mem::replace(&mut seen[n], true) {
                continue;
            }
            let node = &self.nodes[n];
            for (symbol, &target) in &node.transitions {
                symbols.insert(symbol);
                stack.push(target);
            }
            stack.extend(node.children.iter().copied());
        }
        symbols
    }
}

/// Rewrite `tree` onto the representatives of `minimized`.
///
/// A node's transition on `symbol` survives only if the minimized automaton
/// has a transition from the node's representative on that symbol and the
/// target representative is materialized by some node of the tree. Slots are
/// allocated for every representative before any transition is resolved, so
/// cyclic transition graphs terminate.
///
/// Fails with [`AutomatonError::UnknownTreeState`] if a node id is not a
/// state of the automaton that was minimized.
pub fn project_onto_tree(tree: &TreeNode, minimized: &MinimizedAutomaton) -> Result<ProjectedTree> {
    let mut memo: HashMap<&State, NodeRef> = HashMap::new();
    let mut sources: Vec<&TreeNode> = Vec::new();
    let mut nodes: Vec<ProjectedNode> = Vec::new();
    let mut source_nodes = 0;

    for node in tree.preorder() {
        source_nodes += 1;
        let rep = minimized
            .representative(&node.id)
            .ok_or_else(|| AutomatonError::UnknownTreeState(node.id.clone()))?;
        if memo.contains_key(rep) {
            trace!(node = %node.id, representative = %rep, "node shared");
            continue;
        }
        memo.insert(rep, nodes.len());
        sources.push(node);
        nodes.push(ProjectedNode {
            id: rep.clone(),
            kind: node.kind.clone(),
            value: node.value.clone(),
            transitions: BTreeMap::new(),
            children: Vec::new(),
        });
    }

    let slot_of = |id: &State| minimized.representative(id).and_then(|r| memo.get(r)).copied();

    for (slot, source) in sources.iter().enumerate() {
        let rep = nodes[slot].id.clone();
        let mut transitions = BTreeMap::new();
        for symbol in source.transitions.keys() {
            match minimized.transition(&rep, symbol).and_then(|t| memo.get(t)) {
                Some(&target) => {
                    transitions.insert(symbol.clone(), target);
                }
                None => trace!(node = %rep, %symbol, "transition dropped"),
            }
        }
        let children = source.children.iter().filter_map(|c| slot_of(&c.id)).collect();
        nodes[slot].transitions = transitions;
        nodes[slot].children = children;
    }

    debug!(source_nodes, projected_nodes = nodes.len(), "tree projected");
    Ok(ProjectedTree { nodes, source_nodes })
}
