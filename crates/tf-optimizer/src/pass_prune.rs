//! Pass: prune nodes that contribute nothing to the output.

use tf_core::AstNode;

use crate::pass_text::is_preserved;

/// Nodes removed by [`remove_empty`]:
/// - empty text, and whitespace-only text spanning a line break (indentation)
/// - rules and block at-rules without children
/// - blank statements and empty blocks
fn is_empty_node(node: &AstNode) -> bool {
    match node {
        AstNode::Text { value } => {
            value.is_empty() || (value.trim().is_empty() && value.contains('\n'))
        }
        AstNode::Rule { children, .. } | AstNode::Block { children } => children.is_empty(),
        AstNode::AtRule { children: Some(children), .. } => children.is_empty(),
        AstNode::Statement { text } => text.trim().is_empty(),
        _ => false,
    }
}

/// Remove empty nodes bottom-up, so a rule emptied by pruning is pruned too.
/// Content of whitespace-sensitive elements is left alone.
/// Returns the number of nodes removed.
pub fn remove_empty(node: &mut AstNode) -> usize {
    if is_preserved(node) {
        return 0;
    }
    let Some(children) = node.children_mut() else {
        return 0;
    };
    let mut removed: usize = children.iter_mut().map(remove_empty).sum();
    let before = children.len();
    children.retain(|c| !is_empty_node(c));
    removed += before - children.len();
    removed
}

/// Remove every comment node. Returns the number removed.
pub fn strip_comments(node: &mut AstNode) -> usize {
    let Some(children) = node.children_mut() else {
        return 0;
    };
    let before = children.len();
    children.retain(|c| !matches!(c, AstNode::Comment { .. }));
    let mut removed = before - children.len();
    removed += children.iter_mut().map(strip_comments).sum::<usize>();
    removed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indentation_text_removed_inline_space_kept() {
        let mut doc = AstNode::document(vec![
            AstNode::text("\n  "),
            AstNode::element("b", vec![], vec![AstNode::text("a")]),
            AstNode::text(" "),
            AstNode::element("i", vec![], vec![AstNode::text("")]),
        ]);
        assert_eq!(remove_empty(&mut doc), 2);
        assert_eq!(doc.children().len(), 3);
        assert_eq!(doc.children()[1], AstNode::text(" "));
        assert!(doc.children()[2].children().is_empty());
    }

    #[test]
    fn test_preserved_element_text_untouched() {
        let pre = AstNode::element(
            "pre",
            vec![],
            vec![
                AstNode::element("b", vec![], vec![AstNode::text("a")]),
                AstNode::text("\n  "),
                AstNode::element("i", vec![], vec![AstNode::text("b")]),
            ],
        );
        let textarea = AstNode::element("TEXTAREA", vec![], vec![AstNode::text("\n")]);
        let mut doc = AstNode::document(vec![pre.clone(), AstNode::text("\n"), textarea.clone()]);
        assert_eq!(remove_empty(&mut doc), 1);
        assert_eq!(doc.children(), &[pre, textarea][..]);
    }

    #[test]
    fn test_rule_emptied_by_comment_strip_is_pruned() {
        let mut sheet = AstNode::document(vec![
            AstNode::rule("a", vec![AstNode::comment("todo")]),
            AstNode::rule("b", vec![AstNode::declaration("color", "red")]),
        ]);
        assert_eq!(strip_comments(&mut sheet), 1);
        assert_eq!(remove_empty(&mut sheet), 1);
        assert_eq!(sheet.children().len(), 1);
    }

    #[test]
    fn test_statement_at_rule_is_kept() {
        let mut sheet = AstNode::document(vec![
            AstNode::AtRule { name: "import".into(), prelude: "\"a.css\"".into(), children: None },
            AstNode::AtRule { name: "media".into(), prelude: "print".into(), children: Some(vec![]) },
        ]);
        assert_eq!(remove_empty(&mut sheet), 1);
        assert_eq!(sheet.children().len(), 1);
    }
}
