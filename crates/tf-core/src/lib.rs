//! Shared types for the Treefold pipeline: errors, configuration, tokens,
//! the syntax tree and validation results.

pub mod ast;
pub mod config;
pub mod error;
pub mod token;
pub mod types;

pub use ast::{AstNode, Attribute, NodeKind};
pub use config::TreefoldConfig;
pub use error::{Result, TreefoldError};
pub use token::{Position, Token, TokenKind};
pub use types::{OptimizationLevel, OutputFormat, ValidationError};
