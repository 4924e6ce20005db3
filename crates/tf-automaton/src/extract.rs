//! Build an automaton from a tree so that minimization merges identical
//! subtrees.

use crate::error::{AutomatonError, Result};
use crate::model::{Automaton, State, Symbol};
use crate::tree::TreeNode;
use std::collections::BTreeSet;

/// Accepting sink reached from every node on its label symbol.
pub const LABEL_SINK: &str = "$label";

/// Prefix reserved for label symbols.
pub const LABEL_PREFIX: char = '=';

/// Symbol encoding a node's kind and value.
pub fn label_symbol(node: &TreeNode) -> Symbol {
    Symbol::new(format!("{LABEL_PREFIX}{}:{}", node.kind, node.value.as_deref().unwrap_or("")))
}

/// Every node id becomes a state and every tree transition an automaton
/// transition. Each node also moves to [`LABEL_SINK`] on its label symbol,
/// which is the only accepting state. Two nodes end up equivalent exactly
/// when their labels match and their transitions lead to equivalent nodes.
///
/// The root is the initial state. A transition pointing at an id that is not
/// in the tree leaves the automaton invalid; [`crate::minimize`] reports it.
///
/// Fails on the reserved sink id, on tree symbols starting with
/// [`LABEL_PREFIX`], and on node ids used more than once.
pub fn extract_automaton(tree: &TreeNode) -> Result<Automaton> {
    let sink = State::from(LABEL_SINK);
    let mut automaton = Automaton::new(tree.id.clone());
    automaton.add_accepting(sink.clone());
    let mut seen: BTreeSet<&State> = BTreeSet::new();

    for node in tree.preorder() {
        if node.id == sink {
            return Err(AutomatonError::ReservedState(sink));
        }
        if !seen.insert(&node.id) {
            return Err(AutomatonError::DuplicateTreeState(node.id.clone()));
        }
        if let Some(symbol) = node.transitions.keys().find(|s| s.as_str().starts_with(LABEL_PREFIX)) {
            return Err(AutomatonError::ReservedSymbol { node: node.id.clone(), symbol: symbol.clone() });
        }
        automaton.add_state(node.id.clone());
        let row = automaton.transitions.entry(node.id.clone()).or_default();
        for (symbol, target) in &node.transitions {
            row.insert(symbol.clone(), target.clone());
        }
        row.insert(label_symbol(node), sink.clone());
    }
    Ok(automaton)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_shape() {
        let tree = TreeNode::new("r", "list")
            .with_child_on("#0", TreeNode::new("a", "item").with_value("x"))
            .with_child_on("#1", TreeNode::new("b", "item").with_value("x"));
        let a = extract_automaton(&tree).unwrap();
        assert!(a.validate());
        assert_eq!(a.state_count(), 4);
        assert_eq!(a.initial_state(), Some(&State::from("r")));
        assert!(a.is_accepting(&State::from(LABEL_SINK)));
        assert_eq!(
            a.transition(&"a".into(), &Symbol::from("=item:x")),
            Some(&State::from(LABEL_SINK))
        );
    }

    #[test]
    fn test_reserved_id_rejected() {
        let tree = TreeNode::new("r", "root").with_child_on("#0", TreeNode::new(LABEL_SINK, "x"));
        assert_eq!(
            extract_automaton(&tree),
            Err(AutomatonError::ReservedState(State::from(LABEL_SINK)))
        );
    }

    #[test]
    fn test_label_like_symbol_rejected() {
        let tree = TreeNode::new("r", "item")
            .with_value("x")
            .with_child_on("=item:x", TreeNode::new("a", "item").with_value("x"));
        assert_eq!(
            extract_automaton(&tree),
            Err(AutomatonError::ReservedSymbol { node: State::from("r"), symbol: Symbol::from("=item:x") })
        );
    }

    #[test]
    fn test_repeated_id_rejected() {
        let tree = TreeNode::new("r", "list")
            .with_child_on("#0", TreeNode::new("a", "item").with_value("x"))
            .with_child_on("#1", TreeNode::new("a", "item").with_value("y"));
        assert_eq!(
            extract_automaton(&tree),
            Err(AutomatonError::DuplicateTreeState(State::from("a")))
        );
    }

    #[test]
    fn test_dangling_transition_is_left_for_validation() {
        let tree = TreeNode::new("r", "root").with_transition("jump", "nowhere");
        let a = extract_automaton(&tree).unwrap();
        assert!(!a.validate());
    }
}
