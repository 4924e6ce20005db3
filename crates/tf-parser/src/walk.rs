//! Preorder traversal with slash-separated node paths, for validators.

use tf_core::AstNode;

/// Path label of a single node.
pub fn segment(node: &AstNode) -> String {
    match node {
        AstNode::Element { tag, .. } => tag.clone(),
        AstNode::Rule { selector, .. } => selector.clone(),
        AstNode::Declaration { property, .. } => property.clone(),
        AstNode::AtRule { name, .. } => format!("@{name}"),
        other => other.kind().as_str().to_string(),
    }
}

/// Visit every node in document order together with its path from the root.
pub fn walk<'a>(root: &'a AstNode, mut visit: impl FnMut(&'a AstNode, &str)) {
    let mut stack = vec![(root, segment(root))];
    while let Some((node, path)) = stack.pop() {
        visit(node, &path);
        for child in node.children().iter().rev() {
            stack.push((child, format!("{path}/{}", segment(child))));
        }
    }
}
