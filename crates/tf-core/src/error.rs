use crate::token::Position;
use crate::types::ValidationError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TreefoldError {
    #[error(transparent)]
    Automaton(#[from] tf_automaton::AutomatonError),
    #[error("Syntax error at {position}: {message}{}", found_suffix(.found))]
    Syntax {
        message: String,
        position: Position,
        found: Option<String>,
    },
    #[error("Validation failed with {} error(s): {}", .0.len(), first_error(.0))]
    Validation(Vec<ValidationError>),
    #[error("Unsupported feature for {dialect}: {feature}")]
    UnsupportedFeature { dialect: String, feature: String },
    #[error("Limit exceeded: {0}")]
    LimitExceeded(String),
    #[error("Unknown dialect: {0}")]
    UnknownDialect(String),
    #[error("Config error: {0}")]
    Config(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl TreefoldError {
    pub fn syntax(message: impl Into<String>, position: Position, found: Option<&str>) -> Self {
        Self::Syntax {
            message: message.into(),
            position,
            found: found.map(str::to_string),
        }
    }

    pub fn unsupported(dialect: impl Into<String>, feature: impl Into<String>) -> Self {
        Self::UnsupportedFeature {
            dialect: dialect.into(),
            feature: feature.into(),
        }
    }

    pub fn is_unsupported(&self) -> bool {
        matches!(self, Self::UnsupportedFeature { .. })
    }
}

fn found_suffix(found: &Option<String>) -> String {
    match found {
        Some(f) => format!(" (found {f:?})"),
        None => String::new(),
    }
}

fn first_error(errors: &[ValidationError]) -> String {
    errors.first().map(|e| e.to_string()).unwrap_or_default()
}

pub type Result<T> = std::result::Result<T, TreefoldError>;
