//! Tokens shared by every dialect.

use serde::{Deserialize, Serialize};
use std::fmt;

/// 1-based line/column plus byte offset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub offset: usize,
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn start() -> Self {
        Self { offset: 0, line: 1, column: 1 }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    // markup
    TagOpen,
    TagClose,
    TagEnd,
    SelfClose,
    AttrName,
    Equals,
    AttrValue,
    Text,
    // shared
    Comment,
    Ident,
    AtKeyword,
    String,
    Number,
    Colon,
    Semicolon,
    Comma,
    LBrace,
    RBrace,
    LParen,
    RParen,
    LBracket,
    RBracket,
    Keyword,
    Punct,
    Whitespace,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub position: Position,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, position: Position) -> Self {
        Self { kind, text: text.into(), position }
    }

    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }
}
