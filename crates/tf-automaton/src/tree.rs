//! Trees whose node ids double as automaton states.

use crate::model::{State, Symbol};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A tree node carrying its own outgoing transitions.
///
/// `transitions` maps a symbol to the id of another node, usually a child.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeNode {
    pub id: State,
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub transitions: BTreeMap<Symbol, State>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    pub fn new(id: impl Into<State>, kind: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: kind.into(),
            value: None,
            transitions: BTreeMap::new(),
            children: Vec::new(),
        }
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn with_transition(mut self, symbol: impl Into<Symbol>, target: impl Into<State>) -> Self {
        self.transitions.insert(symbol.into(), target.into());
        self
    }

    /// Append a child and a transition to it on `symbol`.
    pub fn with_child_on(mut self, symbol: impl Into<Symbol>, child: TreeNode) -> Self {
        self.transitions.insert(symbol.into(), child.id.clone());
        self.children.push(child);
        self
    }

    /// Append a child without a transition.
    pub fn with_child(mut self, child: TreeNode) -> Self {
        self.children.push(child);
        self
    }

    /// Nodes in preorder, without recursion.
    pub fn preorder(&self) -> Preorder<'_> {
        Preorder { stack: vec![self] }
    }

    /// Number of nodes in the tree.
    pub fn len(&self) -> usize {
        self.preorder().count()
    }

    /// Always false: a tree has at least its root.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// First node in preorder with the given id.
    pub fn find(&self, id: &State) -> Option<&TreeNode> {
        self.preorder().find(|n| &n.id == id)
    }

    /// Longest root-to-leaf path, counted in nodes.
    pub fn depth(&self) -> usize {
        let mut max = 0;
        let mut stack = vec![(self, 1usize)];
        while let Some((node, d)) = stack.pop() {
            max = max.max(d);
            stack.extend(node.children.iter().map(|c| (c, d + 1)));
        }
        max
    }
}

pub struct Preorder<'a> {
    stack: Vec<&'a TreeNode>,
}

impl<'a> Iterator for Preorder<'a> {
    type Item = &'a TreeNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}
