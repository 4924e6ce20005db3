//! Stylesheet dialect: rules, declarations, at-rules and comments.

use crate::cursor::Cursor;
use crate::traits::Dialect;
use crate::walk::walk;
use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;
use tf_core::config::LimitsConfig;
use tf_core::{AstNode, NodeKind, Position, Result, Token, TokenKind, TreefoldError, ValidationError};
use tracing::debug;

/// At-rules whose block holds declarations rather than rules.
const DECLARATION_AT_RULES: &[&str] = &["font-face", "page", "counter-style", "property", "viewport"];

static RE_PROPERTY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(--[A-Za-z0-9_-]+|-?[A-Za-z][A-Za-z0-9-]*)$").unwrap());

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || !c.is_ascii()
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '-' || c == '_' || !c.is_ascii()
}

fn syntax(message: impl Into<String>, position: Position, found: Option<&str>) -> TreefoldError {
    TreefoldError::syntax(message, position, found)
}

// ========== Tokenizer ==========

pub fn tokenize(source: &str) -> Result<Vec<Token>> {
    let mut cur = Cursor::new(source);
    let mut tokens = Vec::new();

    while let Some(c) = cur.peek() {
        let start = cur.position();
        let next = cur.peek_nth(1);
        if c.is_whitespace() {
            let ws = cur.eat_while(char::is_whitespace);
            tokens.push(Token::new(TokenKind::Whitespace, ws, start));
        } else if cur.starts_with("/*") {
            cur.skip(2);
            let body = cur
                .eat_until("*/")
                .ok_or_else(|| syntax("unterminated comment", start, Some("/*")))?;
            tokens.push(Token::new(TokenKind::Comment, body, start));
            cur.skip(2);
        } else if c == '@' && next.is_some_and(|n| is_ident_start(n) || n == '-') {
            cur.bump();
            let name = cur.eat_while(is_ident_char);
            tokens.push(Token::new(TokenKind::AtKeyword, name, start));
        } else if c == '"' || c == '\'' {
            let text = cur.quoted(false)?;
            tokens.push(Token::new(TokenKind::String, text, start));
        } else if starts_number(c, next, cur.peek_nth(2)) {
            let mut text = String::new();
            if c == '-' || c == '+' {
                cur.bump();
                text.push(c);
            }
            text.push_str(cur.eat_while(|c| c.is_ascii_digit() || c == '.'));
            text.push_str(cur.eat_while(|c| is_ident_char(c) || c == '%'));
            tokens.push(Token::new(TokenKind::Number, text, start));
        } else if is_ident_start(c) || (c == '-' && next.is_some_and(|n| is_ident_start(n) || n == '-')) {
            let ident = cur.eat_while(is_ident_char);
            tokens.push(Token::new(TokenKind::Ident, ident, start));
        } else {
            cur.bump();
            let kind = match c {
                '{' => TokenKind::LBrace,
                '}' => TokenKind::RBrace,
                ':' => TokenKind::Colon,
                ';' => TokenKind::Semicolon,
                ',' => TokenKind::Comma,
                '(' => TokenKind::LParen,
                ')' => TokenKind::RParen,
                '[' => TokenKind::LBracket,
                ']' => TokenKind::RBracket,
                _ => TokenKind::Punct,
            };
            tokens.push(Token::new(kind, c.to_string(), start));
        }
    }

    Ok(tokens)
}

fn starts_number(c: char, next: Option<char>, third: Option<char>) -> bool {
    let digit = |o: Option<char>| o.is_some_and(|c| c.is_ascii_digit());
    match c {
        '0'..='9' => true,
        '.' => digit(next),
        '-' | '+' => digit(next) || (next == Some('.') && digit(third)),
        _ => false,
    }
}

/// Join token texts, folding whitespace runs to one space.
fn join(tokens: &[&Token]) -> String {
    let mut out = String::new();
    for tok in tokens {
        if tok.is(TokenKind::Whitespace) {
            out.push(' ');
        } else {
            out.push_str(&tok.text);
        }
    }
    out.trim().to_string()
}

// ========== Parser ==========

struct Parser<'t> {
    tokens: &'t [Token],
    pos: usize,
    depth: usize,
    max_depth: usize,
}

impl<'t> Parser<'t> {
    fn peek(&self) -> Option<&'t Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<&'t Token> {
        let tok = self.tokens.get(self.pos)?;
        self.pos += 1;
        Some(tok)
    }

    fn skip_ws(&mut self) {
        while self.peek().is_some_and(|t| t.is(TokenKind::Whitespace)) {
            self.pos += 1;
        }
    }

    fn enter(&mut self, open: Position) -> Result<()> {
        self.depth += 1;
        if self.depth > self.max_depth {
            return Err(TreefoldError::LimitExceeded(format!(
                "stylesheet nesting deeper than {} at {open}",
                self.max_depth
            )));
        }
        Ok(())
    }

    /// Rules, at-rules and comments. `open` is the brace of the enclosing
    /// block, `None` at top level.
    fn items(&mut self, open: Option<Position>) -> Result<Vec<AstNode>> {
        if let Some(open) = open {
            self.enter(open)?;
        }
        let mut items = Vec::new();
        loop {
            self.skip_ws();
            let Some(tok) = self.peek() else {
                if let Some(open) = open {
                    return Err(syntax("unclosed block", open, Some("{")));
                }
                break;
            };
            match tok.kind {
                TokenKind::Comment => {
                    self.pos += 1;
                    items.push(AstNode::comment(&tok.text));
                }
                TokenKind::RBrace if open.is_some() => {
                    self.pos += 1;
                    break;
                }
                TokenKind::RBrace => return Err(syntax("unexpected '}'", tok.position, Some("}"))),
                TokenKind::Semicolon => self.pos += 1,
                TokenKind::AtKeyword => items.push(self.at_rule()?),
                _ => items.push(self.rule()?),
            }
        }
        if open.is_some() {
            self.depth -= 1;
        }
        Ok(items)
    }

    fn rule(&mut self) -> Result<AstNode> {
        let start = self.peek().map(|t| t.position).unwrap_or_default();
        let mut prelude = Vec::new();
        let open = loop {
            let Some(tok) = self.next() else {
                return Err(syntax("expected '{' after selector", start, None));
            };
            match tok.kind {
                TokenKind::LBrace => break tok.position,
                TokenKind::Semicolon | TokenKind::RBrace => {
                    return Err(syntax("expected '{' after selector", tok.position, Some(&tok.text)))
                }
                TokenKind::Comment => {}
                _ => prelude.push(tok),
            }
        };
        let children = self.declarations(open)?;
        Ok(AstNode::rule(join(&prelude), children))
    }

    fn declarations(&mut self, open: Position) -> Result<Vec<AstNode>> {
        self.enter(open)?;
        let mut out = Vec::new();
        loop {
            self.skip_ws();
            let Some(tok) = self.peek() else {
                return Err(syntax("unclosed block", open, Some("{")));
            };
            match tok.kind {
                TokenKind::RBrace => {
                    self.pos += 1;
                    break;
                }
                TokenKind::Semicolon => self.pos += 1,
                TokenKind::Comment => {
                    self.pos += 1;
                    out.push(AstNode::comment(&tok.text));
                }
                TokenKind::Ident => out.push(self.declaration()?),
                _ => return Err(syntax("expected property name", tok.position, Some(&tok.text))),
            }
        }
        self.depth -= 1;
        Ok(out)
    }

    fn declaration(&mut self) -> Result<AstNode> {
        let Some(name) = self.next() else {
            return Err(syntax("expected property name", Position::start(), None));
        };
        self.skip_ws();
        match self.peek() {
            Some(t) if t.is(TokenKind::Colon) => self.pos += 1,
            Some(t) => {
                return Err(syntax(
                    format!("expected ':' after property {:?}", name.text),
                    t.position,
                    Some(&t.text),
                ))
            }
            None => return Err(syntax("unexpected end of input in declaration", name.position, None)),
        }

        let mut value = Vec::new();
        let mut parens = 0usize;
        // an unclosed block at EOF is reported by the caller
        while let Some(tok) = self.peek() {
            match tok.kind {
                TokenKind::Semicolon if parens == 0 => {
                    self.pos += 1;
                    break;
                }
                TokenKind::RBrace if parens == 0 => break,
                TokenKind::LBrace => {
                    return Err(syntax("unexpected '{' in declaration value", tok.position, Some("{")))
                }
                TokenKind::Comment => {}
                TokenKind::LParen => {
                    parens += 1;
                    value.push(tok);
                }
                TokenKind::RParen => {
                    parens = parens.saturating_sub(1);
                    value.push(tok);
                }
                _ => value.push(tok),
            }
            self.pos += 1;
        }
        Ok(AstNode::declaration(&name.text, join(&value)))
    }

    fn at_rule(&mut self) -> Result<AstNode> {
        let Some(keyword) = self.next() else {
            return Err(syntax("expected at-rule", Position::start(), None));
        };
        let name = keyword.text.clone();
        let mut prelude = Vec::new();
        let mut parens = 0usize;
        loop {
            let Some(tok) = self.next() else {
                return Err(syntax(format!("unterminated @{name}"), keyword.position, None));
            };
            match tok.kind {
                TokenKind::Semicolon if parens == 0 => {
                    return Ok(AstNode::AtRule { name, prelude: join(&prelude), children: None });
                }
                TokenKind::LBrace => {
                    let children = if DECLARATION_AT_RULES.contains(&name.to_ascii_lowercase().as_str()) {
                        self.declarations(tok.position)?
                    } else {
                        self.items(Some(tok.position))?
                    };
                    return Ok(AstNode::AtRule { name, prelude: join(&prelude), children: Some(children) });
                }
                TokenKind::RBrace => return Err(syntax("unexpected '}'", tok.position, Some("}"))),
                TokenKind::Comment => {}
                TokenKind::LParen => {
                    parens += 1;
                    prelude.push(tok);
                }
                TokenKind::RParen => {
                    parens = parens.saturating_sub(1);
                    prelude.push(tok);
                }
                _ => prelude.push(tok),
            }
        }
    }
}

pub fn parse(tokens: &[Token], max_depth: usize) -> Result<AstNode> {
    let mut parser = Parser { tokens, pos: 0, depth: 0, max_depth };
    Ok(AstNode::document(parser.items(None)?))
}

// ========== Validation ==========

pub fn validate(ast: &AstNode) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    walk(ast, |node, path| match node {
        AstNode::Rule { selector, children } => {
            if selector.trim().is_empty() {
                errors.push(ValidationError::new("empty-selector", "rule has an empty selector", path));
            }
            check_duplicates(children, path, &mut errors);
        }
        AstNode::AtRule { children: Some(children), .. } => check_duplicates(children, path, &mut errors),
        AstNode::Declaration { property, value } => {
            if value.trim().is_empty() {
                errors.push(ValidationError::new(
                    "empty-value",
                    format!("property {property:?} has no value"),
                    path,
                ));
            }
            if !RE_PROPERTY.is_match(property) {
                errors.push(ValidationError::new(
                    "invalid-property",
                    format!("invalid property name {property:?}"),
                    path,
                ));
            }
        }
        _ => {}
    });
    errors
}

fn check_duplicates(children: &[AstNode], path: &str, errors: &mut Vec<ValidationError>) {
    let mut seen = HashSet::new();
    for child in children {
        if let AstNode::Declaration { property, .. } = child {
            if !seen.insert(property.to_ascii_lowercase()) {
                errors.push(ValidationError::new(
                    "duplicate-property",
                    format!("property {property:?} set more than once"),
                    path,
                ));
            }
        }
    }
}

// ========== Generator ==========

/// Compact output: one top-level item per line, no optional whitespace.
pub fn generate(ast: &AstNode) -> Result<String> {
    let mut out = String::new();
    match ast {
        AstNode::Document { children } => write_children(children, &mut out, "\n")?,
        other => write_node(other, &mut out)?,
    }
    Ok(out)
}

fn write_children(children: &[AstNode], out: &mut String, separator: &str) -> Result<()> {
    let mut prev: Option<&AstNode> = None;
    for child in children {
        match prev {
            Some(AstNode::Declaration { .. }) => out.push(';'),
            Some(_) => out.push_str(separator),
            None => {}
        }
        write_node(child, out)?;
        prev = Some(child);
    }
    Ok(())
}

fn write_node(node: &AstNode, out: &mut String) -> Result<()> {
    match node {
        AstNode::Rule { selector, children } => {
            out.push_str(selector);
            out.push('{');
            write_children(children, out, "")?;
            out.push('}');
        }
        AstNode::Declaration { property, value } => {
            out.push_str(property);
            out.push(':');
            out.push_str(value);
        }
        AstNode::AtRule { name, prelude, children } => {
            out.push('@');
            out.push_str(name);
            if !prelude.is_empty() {
                out.push(' ');
                out.push_str(prelude);
            }
            match children {
                None => out.push(';'),
                Some(children) => {
                    out.push('{');
                    write_children(children, out, "")?;
                    out.push('}');
                }
            }
        }
        AstNode::Comment { value } => {
            out.push_str("/*");
            out.push_str(value);
            out.push_str("*/");
        }
        AstNode::Document { children } => write_children(children, out, "\n")?,
        other => {
            return Err(TreefoldError::unsupported(
                "stylesheet",
                format!("generating {} nodes", other.kind().as_str()),
            ))
        }
    }
    Ok(())
}

// ========== Dialect ==========

#[derive(Debug, Clone)]
pub struct StylesheetDialect {
    max_depth: usize,
}

impl StylesheetDialect {
    pub fn new() -> Self {
        Self::from_limits(&LimitsConfig::default())
    }

    pub fn from_limits(limits: &LimitsConfig) -> Self {
        Self { max_depth: limits.max_depth }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

impl Default for StylesheetDialect {
    fn default() -> Self {
        Self::new()
    }
}

impl Dialect for StylesheetDialect {
    fn name(&self) -> &'static str {
        "stylesheet"
    }

    fn tokenize(&self, source: &str) -> Result<Vec<Token>> {
        let tokens = tokenize(source)?;
        debug!(tokens = tokens.len(), "stylesheet tokenized");
        Ok(tokens)
    }

    fn parse(&self, tokens: &[Token]) -> Result<AstNode> {
        let ast = parse(tokens, self.max_depth)?;
        debug!(nodes = ast.node_count(), "stylesheet parsed");
        Ok(ast)
    }

    fn validate(&self, ast: &AstNode) -> Vec<ValidationError> {
        validate(ast)
    }

    fn generate(&self, ast: &AstNode) -> Result<String> {
        generate(ast)
    }

    fn supported_extensions(&self) -> Vec<String> {
        vec![".css".into()]
    }

    /// Later duplicates win in the cascade, so the last copy is kept.
    fn sibling_dedup_kinds(&self) -> &'static [NodeKind] {
        &[NodeKind::Declaration, NodeKind::Rule]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_str(src: &str) -> Result<AstNode> {
        parse(&tokenize(src)?, 16)
    }

    #[test]
    fn test_tokenize_kinds() {
        let tokens = tokenize("@media (min-width: 10px) { a::before { content: \"x\" } }").unwrap();
        let significant: Vec<_> = tokens
            .iter()
            .filter(|t| !t.is(TokenKind::Whitespace))
            .map(|t| (t.kind, t.text.as_str()))
            .collect();
        assert_eq!(significant[0], (TokenKind::AtKeyword, "media"));
        assert_eq!(significant[2], (TokenKind::Ident, "min-width"));
        assert_eq!(significant[4], (TokenKind::Number, "10px"));
        assert!(significant.contains(&(TokenKind::String, "\"x\"")));
    }

    #[test]
    fn test_tokenize_negative_and_custom_property() {
        let tokens = tokenize("--gap:-.5em").unwrap();
        assert_eq!(tokens[0].kind, TokenKind::Ident);
        assert_eq!(tokens[0].text, "--gap");
        assert_eq!(tokens[2].kind, TokenKind::Number);
        assert_eq!(tokens[2].text, "-.5em");
    }

    #[test]
    fn test_parse_rules_and_at_rules() {
        let ast = parse_str(
            "@import url(a.css);\n/* c */\nh1 , h2>p { color : red ; margin: 0 auto !important }\n\
             @media screen { .a { top: 0 } }\n@font-face { font-family: x }",
        )
        .unwrap();
        let items = ast.children();
        assert_eq!(items.len(), 5);
        assert_eq!(
            items[0],
            AstNode::AtRule { name: "import".into(), prelude: "url(a.css)".into(), children: None }
        );
        assert_eq!(items[1], AstNode::comment(" c "));
        assert_eq!(
            items[2],
            AstNode::rule(
                "h1 , h2>p",
                vec![
                    AstNode::declaration("color", "red"),
                    AstNode::declaration("margin", "0 auto !important"),
                ]
            )
        );
        assert_eq!(items[3].children()[0], AstNode::rule(".a", vec![AstNode::declaration("top", "0")]));
        assert_eq!(items[4].children()[0], AstNode::declaration("font-family", "x"));
    }

    #[test]
    fn test_semicolon_inside_parens() {
        let ast = parse_str("a { background: url(data:a;b) }").unwrap();
        assert_eq!(ast.children()[0].children()[0], AstNode::declaration("background", "url(data:a;b)"));
    }

    #[test]
    fn test_syntax_errors() {
        let err = parse_str("a { color red }").unwrap_err();
        assert!(err.to_string().contains("expected ':' after property \"color\""), "{err}");
        let err = parse_str("a { color: red").unwrap_err();
        assert!(err.to_string().starts_with("Syntax error at 1:3: unclosed block"), "{err}");
        let err = parse_str("a { } }").unwrap_err();
        assert!(err.to_string().contains("unexpected '}'"), "{err}");
        let err = parse_str("a b;").unwrap_err();
        assert!(err.to_string().contains("expected '{' after selector"), "{err}");
        assert!(tokenize("a { content: \"x }").is_err());
    }

    #[test]
    fn test_depth_limit() {
        let src = "@media a { @media b { @media c { x { y: z } } } }";
        assert!(parse(&tokenize(src).unwrap(), 4).is_ok());
        let err = parse(&tokenize(src).unwrap(), 3).unwrap_err();
        assert!(matches!(err, TreefoldError::LimitExceeded(_)));
    }

    #[test]
    fn test_validate_rules() {
        let ast = AstNode::document(vec![
            AstNode::rule("", vec![AstNode::declaration("color", "")]),
            AstNode::rule(
                "a",
                vec![
                    AstNode::declaration("1bad", "x"),
                    AstNode::declaration("color", "red"),
                    AstNode::declaration("Color", "blue"),
                ],
            ),
        ]);
        let rules: Vec<_> = validate(&ast).into_iter().map(|e| e.rule).collect();
        assert_eq!(rules, vec!["empty-selector", "empty-value", "duplicate-property", "invalid-property"]);
    }

    #[test]
    fn test_generate_compact() {
        let ast = parse_str("/* k */ a , b { color : red ; margin : 0 }\n@import \"x\";\n@media print { a { top: 0 } }")
            .unwrap();
        assert_eq!(
            generate(&ast).unwrap(),
            "/* k */\na , b{color:red;margin:0}\n@import \"x\";\n@media print{a{top:0}}"
        );
        let again = parse_str(&generate(&ast).unwrap()).unwrap();
        assert_eq!(again, ast);
    }

    #[test]
    fn test_structural_optimize_keeps_last_duplicate() {
        let dialect = StylesheetDialect::new();
        let ast = dialect.parse_source("a { color: red; margin: 0; color: red }").unwrap();
        let result = dialect
            .optimize(&ast, tf_core::OptimizationLevel::Structural)
            .unwrap();
        assert_eq!(dialect.generate(&result.ast).unwrap(), "a{margin:0;color:red}");
        assert_eq!(result.dedup.unwrap().removed_siblings, 1);
    }
}
