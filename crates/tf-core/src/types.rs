use serde::{Deserialize, Serialize};
use std::fmt;

/// A semantic problem found by a dialect's validator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    /// Short machine-readable rule name, e.g. `duplicate-attribute`.
    pub rule: String,
    pub message: String,
    /// Slash-separated labels from the document root to the offending node.
    pub path: String,
}

impl ValidationError {
    pub fn new(rule: impl Into<String>, message: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            rule: rule.into(),
            message: message.into(),
            path: path.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {} at {}", self.rule, self.message, self.path)
    }
}

/// Output format for generated artifacts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Json,
    #[default]
    Text,
}

/// How aggressively the optimize stage rewrites the tree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptimizationLevel {
    /// Local rewrite passes only.
    #[default]
    Safe,
    /// Rewrite passes plus automaton-based structural dedup.
    Structural,
}
