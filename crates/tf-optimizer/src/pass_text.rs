//! Pass: text cleanup — merge adjacent text siblings, collapse whitespace.

use regex::Regex;
use std::sync::LazyLock;
use tf_core::AstNode;

static RE_WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Elements whose text is whitespace-sensitive.
pub const PRESERVE_TAGS: &[&str] = &["pre", "textarea", "script", "style"];

/// Whether `node` is an element listed in [`PRESERVE_TAGS`].
pub(crate) fn is_preserved(node: &AstNode) -> bool {
    matches!(node, AstNode::Element { tag, .. }
        if PRESERVE_TAGS.iter().any(|t| t.eq_ignore_ascii_case(tag.as_str())))
}

/// Concatenate runs of adjacent text siblings. Returns the number of merges.
pub fn merge_adjacent(node: &mut AstNode) -> usize {
    let Some(children) = node.children_mut() else {
        return 0;
    };
    let mut merged: usize = children.iter_mut().map(merge_adjacent).sum();

    let mut out: Vec<AstNode> = Vec::with_capacity(children.len());
    for child in children.drain(..) {
        if let (Some(AstNode::Text { value: prev }), AstNode::Text { value }) = (out.last_mut(), &child) {
            prev.push_str(value);
            merged += 1;
            continue;
        }
        out.push(child);
    }
    *children = out;
    merged
}

/// Replace whitespace runs in text with a single space, outside
/// [`PRESERVE_TAGS`]. Returns the number of text nodes changed.
pub fn collapse_whitespace(node: &mut AstNode) -> usize {
    if is_preserved(node) {
        return 0;
    }
    if let AstNode::Text { value } = node {
        let collapsed = RE_WHITESPACE.replace_all(value, " ");
        if collapsed != value.as_str() {
            *value = collapsed.into_owned();
            return 1;
        }
        return 0;
    }
    match node.children_mut() {
        Some(children) => children.iter_mut().map(collapse_whitespace).sum(),
        None => 0,
    }
}
