//! Bridge from the syntax tree to automaton-domain trees.

use tf_automaton::TreeNode;
use tf_core::AstNode;

/// Build a [`TreeNode`] mirroring `ast`.
///
/// Ids are `n<k>` with `k` the preorder index. Each child is reached on the
/// symbol `#<i>`, `i` being its position among its siblings. `kind` is the
/// variant name and `value` the node's label value.
pub fn to_tree(ast: &AstNode) -> TreeNode {
    let mut next = 0;
    build(ast, &mut next)
}

fn build(ast: &AstNode, next: &mut usize) -> TreeNode {
    let mut node = TreeNode::new(format!("n{next}"), ast.kind().as_str());
    *next += 1;
    node.value = ast.label_value();
    for (i, child) in ast.children().iter().enumerate() {
        let child = build(child, next);
        node = node.with_child_on(format!("#{i}"), child);
    }
    node
}

#[cfg(test)]
mod tests {
    use super::*;
    use tf_automaton::{State, Symbol};

    #[test]
    fn test_preorder_ids_and_symbols() {
        let ast = AstNode::document(vec![
            AstNode::rule("a", vec![AstNode::declaration("color", "red")]),
            AstNode::comment("c"),
        ]);
        let tree = to_tree(&ast);
        let ids: Vec<&str> = tree.preorder().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["n0", "n1", "n2", "n3"]);
        assert_eq!(tree.transitions.get(&Symbol::from("#1")), Some(&State::from("n3")));
        assert_eq!(tree.children[0].children[0].value.as_deref(), Some("color:red"));
        assert_eq!(tree.children[0].kind, "rule");
        assert!(tree.value.is_none());
    }
}
