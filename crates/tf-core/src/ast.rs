//! Dialect-neutral syntax tree.
//!
//! Every dialect builds from the same closed set of variants. Passes and the
//! automaton bridge only use the capability methods (`kind`, `label_value`,
//! `children`, `children_mut`), never dialect-specific fields.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl Attribute {
    pub fn new(name: impl Into<String>, value: Option<&str>) -> Self {
        Self {
            name: name.into(),
            value: value.map(str::to_string),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AstNode {
    Document {
        children: Vec<AstNode>,
    },
    Element {
        tag: String,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        attributes: Vec<Attribute>,
        #[serde(default)]
        children: Vec<AstNode>,
    },
    Text {
        value: String,
    },
    Comment {
        value: String,
    },
    Rule {
        selector: String,
        children: Vec<AstNode>,
    },
    Declaration {
        property: String,
        value: String,
    },
    /// `children` is `None` for the statement form (`@import x;`).
    AtRule {
        name: String,
        prelude: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        children: Option<Vec<AstNode>>,
    },
    Statement {
        text: String,
    },
    Block {
        children: Vec<AstNode>,
    },
}

/// Variant tag of an [`AstNode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Document,
    Element,
    Text,
    Comment,
    Rule,
    Declaration,
    AtRule,
    Statement,
    Block,
}

impl NodeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Document => "document",
            Self::Element => "element",
            Self::Text => "text",
            Self::Comment => "comment",
            Self::Rule => "rule",
            Self::Declaration => "declaration",
            Self::AtRule => "at_rule",
            Self::Statement => "statement",
            Self::Block => "block",
        }
    }
}

impl AstNode {
    pub fn document(children: Vec<AstNode>) -> Self {
        Self::Document { children }
    }

    pub fn element(tag: impl Into<String>, attributes: Vec<Attribute>, children: Vec<AstNode>) -> Self {
        Self::Element { tag: tag.into(), attributes, children }
    }

    pub fn text(value: impl Into<String>) -> Self {
        Self::Text { value: value.into() }
    }

    pub fn comment(value: impl Into<String>) -> Self {
        Self::Comment { value: value.into() }
    }

    pub fn rule(selector: impl Into<String>, children: Vec<AstNode>) -> Self {
        Self::Rule { selector: selector.into(), children }
    }

    pub fn declaration(property: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Declaration { property: property.into(), value: value.into() }
    }

    pub fn statement(text: impl Into<String>) -> Self {
        Self::Statement { text: text.into() }
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            Self::Document { .. } => NodeKind::Document,
            Self::Element { .. } => NodeKind::Element,
            Self::Text { .. } => NodeKind::Text,
            Self::Comment { .. } => NodeKind::Comment,
            Self::Rule { .. } => NodeKind::Rule,
            Self::Declaration { .. } => NodeKind::Declaration,
            Self::AtRule { .. } => NodeKind::AtRule,
            Self::Statement { .. } => NodeKind::Statement,
            Self::Block { .. } => NodeKind::Block,
        }
    }

    /// Everything that distinguishes this node from a sibling of the same
    /// kind, children excluded.
    pub fn label_value(&self) -> Option<String> {
        match self {
            Self::Document { .. } | Self::Block { .. } => None,
            Self::Element { tag, attributes, .. } => {
                let mut label = tag.clone();
                for attr in attributes {
                    label.push(' ');
                    label.push_str(&attr.name);
                    if let Some(v) = &attr.value {
                        label.push('=');
                        label.push_str(&format!("{v:?}"));
                    }
                }
                Some(label)
            }
            Self::Text { value } | Self::Comment { value } => Some(value.clone()),
            Self::Rule { selector, .. } => Some(selector.clone()),
            Self::Declaration { property, value } => Some(format!("{property}:{value}")),
            Self::AtRule { name, prelude, children } => Some(format!(
                "@{name} {prelude}{}",
                if children.is_some() { " {}" } else { ";" }
            )),
            Self::Statement { text } => Some(text.clone()),
        }
    }

    pub fn children(&self) -> &[AstNode] {
        match self {
            Self::Document { children }
            | Self::Element { children, .. }
            | Self::Rule { children, .. }
            | Self::Block { children } => children,
            Self::AtRule { children, .. } => children.as_deref().unwrap_or(&[]),
            Self::Text { .. } | Self::Comment { .. } | Self::Declaration { .. } | Self::Statement { .. } => &[],
        }
    }

    /// `None` for leaf variants.
    pub fn children_mut(&mut self) -> Option<&mut Vec<AstNode>> {
        match self {
            Self::Document { children }
            | Self::Element { children, .. }
            | Self::Rule { children, .. }
            | Self::Block { children } => Some(children),
            Self::AtRule { children, .. } => children.as_mut(),
            Self::Text { .. } | Self::Comment { .. } | Self::Declaration { .. } | Self::Statement { .. } => None,
        }
    }

    /// Total number of nodes, this one included.
    pub fn node_count(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            count += 1;
            stack.extend(node.children());
        }
        count
    }

    pub fn depth(&self) -> usize {
        let mut max = 0;
        let mut stack = vec![(self, 1usize)];
        while let Some((node, d)) = stack.pop() {
            max = max.max(d);
            stack.extend(node.children().iter().map(|c| (c, d + 1)));
        }
        max
    }

    pub fn to_json(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::to_value(self)
    }
}
