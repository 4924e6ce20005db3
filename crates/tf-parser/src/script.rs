//! Script dialect: statements and blocks.
//!
//! Statements are kept as normalized token text; only braces that open a
//! block give the tree its structure. Braces in expression position (object
//! literals, arrow bodies) stay inside the statement. Structural optimization
//! is not supported for scripts.

use crate::cursor::Cursor;
use crate::traits::Dialect;
use crate::walk::walk;
use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;
use tf_core::config::LimitsConfig;
use tf_core::{AstNode, Position, Result, Token, TokenKind, TreefoldError, ValidationError};
use tf_optimizer::{OptimizationResult, OptimizerPipeline};
use tracing::debug;

pub const KEYWORDS: &[&str] = &[
    "async", "await", "break", "case", "catch", "class", "const", "continue", "debugger", "default",
    "delete", "do", "else", "export", "extends", "false", "finally", "for", "from", "function", "if",
    "import", "in", "instanceof", "let", "new", "null", "of", "return", "static", "super", "switch",
    "this", "throw", "true", "try", "typeof", "undefined", "var", "void", "while", "yield",
];

/// Keywords after which `{` starts an expression, not a block.
const EXPRESSION_KEYWORDS: &[&str] = &[
    "return", "typeof", "new", "in", "of", "yield", "await", "case", "throw", "delete", "void",
    "instanceof",
];

const OPERATOR_CHARS: &str = "=+-*/%<>!&|^~?.";

static RE_BINDING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:export\s+)?(?:let|const|class|function\*?)\s+([A-Za-z_$][A-Za-z0-9_$]*)").unwrap()
});

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '$'
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
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
        if c.is_whitespace() {
            let ws = cur.eat_while(char::is_whitespace);
            tokens.push(Token::new(TokenKind::Whitespace, ws, start));
        } else if cur.starts_with("//") {
            cur.skip(2);
            let body = cur.eat_while(|c| c != '\n');
            tokens.push(Token::new(TokenKind::Comment, body, start));
        } else if cur.starts_with("/*") {
            cur.skip(2);
            let body = cur
                .eat_until("*/")
                .ok_or_else(|| syntax("unterminated comment", start, Some("/*")))?;
            tokens.push(Token::new(TokenKind::Comment, body, start));
            cur.skip(2);
        } else if c == '"' || c == '\'' || c == '`' {
            let text = cur.quoted(c == '`')?;
            tokens.push(Token::new(TokenKind::String, text, start));
        } else if c.is_ascii_digit() || (c == '.' && cur.peek_nth(1).is_some_and(|n| n.is_ascii_digit())) {
            let number = cur.eat_while(|c| c.is_ascii_alphanumeric() || c == '.' || c == '_');
            tokens.push(Token::new(TokenKind::Number, number, start));
        } else if is_ident_start(c) {
            let word = cur.eat_while(is_ident_char);
            let kind = if KEYWORDS.contains(&word) { TokenKind::Keyword } else { TokenKind::Ident };
            tokens.push(Token::new(kind, word, start));
        } else if OPERATOR_CHARS.contains(c) {
            let op = cur.eat_while(|c| OPERATOR_CHARS.contains(c));
            tokens.push(Token::new(TokenKind::Punct, op, start));
        } else {
            cur.bump();
            let kind = match c {
                '{' => TokenKind::LBrace,
                '}' => TokenKind::RBrace,
                '(' => TokenKind::LParen,
                ')' => TokenKind::RParen,
                '[' => TokenKind::LBracket,
                ']' => TokenKind::RBracket,
                ';' => TokenKind::Semicolon,
                ',' => TokenKind::Comma,
                ':' => TokenKind::Colon,
                _ => TokenKind::Punct,
            };
            tokens.push(Token::new(kind, c.to_string(), start));
        }
    }

    Ok(tokens)
}

/// Join token texts. Whitespace becomes one space, or one newline if it
/// spanned lines, so statements relying on line breaks keep them.
fn join(tokens: &[&Token]) -> String {
    let mut out = String::new();
    for tok in tokens {
        if tok.is(TokenKind::Whitespace) {
            out.push(if tok.text.contains('\n') { '\n' } else { ' ' });
        } else {
            out.push_str(&tok.text);
        }
    }
    out.trim().to_string()
}

/// Whether a `{` following `parts` is in expression position.
fn expression_context(parts: &[&Token]) -> bool {
    let Some(last) = parts.iter().rev().find(|t| !t.is(TokenKind::Whitespace)) else {
        return false;
    };
    match last.kind {
        TokenKind::Punct | TokenKind::LParen | TokenKind::LBracket | TokenKind::Comma | TokenKind::Colon => true,
        TokenKind::Keyword => EXPRESSION_KEYWORDS.contains(&last.text.as_str()),
        _ => false,
    }
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

    fn skip_ws(&mut self) {
        while self.peek().is_some_and(|t| t.is(TokenKind::Whitespace)) {
            self.pos += 1;
        }
    }

    fn items(&mut self, open: Option<Position>) -> Result<Vec<AstNode>> {
        if let Some(open) = open {
            self.depth += 1;
            if self.depth > self.max_depth {
                return Err(TreefoldError::LimitExceeded(format!(
                    "script nesting deeper than {} at {open}",
                    self.max_depth
                )));
            }
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
                TokenKind::LBrace => {
                    self.pos += 1;
                    let children = self.items(Some(tok.position))?;
                    items.push(AstNode::Block { children });
                }
                _ => items.push(self.statement()),
            }
        }
        if open.is_some() {
            self.depth -= 1;
        }
        Ok(items)
    }

    /// Collect a statement up to `;`, a block-opening `{`, or the `}` that
    /// closes the enclosing block. Bracket balance inside the statement is
    /// left to validation.
    fn statement(&mut self) -> AstNode {
        let mut parts = Vec::new();
        // `(`/`[` and expression braces are counted apart so an unclosed
        // paren cannot swallow the `}` of the enclosing block
        let mut parens = 0usize;
        let mut braces = 0usize;
        while let Some(tok) = self.peek() {
            match tok.kind {
                TokenKind::Semicolon if parens == 0 && braces == 0 => {
                    self.pos += 1;
                    break;
                }
                TokenKind::LBrace if parens == 0 && braces == 0 && !expression_context(&parts) => break,
                TokenKind::RBrace if braces == 0 => break,
                TokenKind::LBrace => {
                    braces += 1;
                    parts.push(tok);
                }
                TokenKind::RBrace => {
                    braces -= 1;
                    parts.push(tok);
                }
                TokenKind::LParen | TokenKind::LBracket => {
                    parens += 1;
                    parts.push(tok);
                }
                TokenKind::RParen | TokenKind::RBracket => {
                    parens = parens.saturating_sub(1);
                    parts.push(tok);
                }
                TokenKind::Comment => {}
                _ => parts.push(tok),
            }
            self.pos += 1;
        }
        AstNode::statement(join(&parts))
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
        AstNode::Document { children } | AstNode::Block { children } => {
            let mut bound = HashSet::new();
            for child in children {
                let AstNode::Statement { text } = child else { continue };
                if let Some(name) = RE_BINDING.captures(text).and_then(|c| c.get(1)) {
                    if !bound.insert(name.as_str()) {
                        errors.push(ValidationError::new(
                            "duplicate-binding",
                            format!("{:?} is declared more than once in this scope", name.as_str()),
                            path,
                        ));
                    }
                }
            }
        }
        AstNode::Statement { text } => {
            if text == "debugger" {
                errors.push(ValidationError::new("no-debugger", "debugger statement", path));
            }
            if let Some(problem) = bracket_problem(text) {
                errors.push(ValidationError::new("unbalanced-brackets", problem, path));
            }
        }
        _ => {}
    });
    errors
}

/// First bracket mismatch in a statement, if any.
fn bracket_problem(text: &str) -> Option<String> {
    let tokens = tokenize(text).ok()?;
    let mut open: Vec<&Token> = Vec::new();
    for tok in &tokens {
        let expected = match tok.kind {
            TokenKind::LParen | TokenKind::LBracket | TokenKind::LBrace => {
                open.push(tok);
                continue;
            }
            TokenKind::RParen => "(",
            TokenKind::RBracket => "[",
            TokenKind::RBrace => "{",
            _ => continue,
        };
        match open.pop() {
            Some(o) if o.text == expected => {}
            Some(o) => return Some(format!("{:?} closed by {:?}", o.text, tok.text)),
            None => return Some(format!("unexpected {:?}", tok.text)),
        }
    }
    open.last().map(|o| format!("unclosed {:?}", o.text))
}

// ========== Generator ==========

pub fn generate(ast: &AstNode) -> Result<String> {
    let mut out = String::new();
    match ast {
        AstNode::Document { children } => write_items(children, &mut out, 0)?,
        other => write_items(std::slice::from_ref(other), &mut out, 0)?,
    }
    Ok(out)
}

fn write_items(items: &[AstNode], out: &mut String, indent: usize) -> Result<()> {
    let pad = "  ".repeat(indent);
    let mut attached = false;
    for (i, item) in items.iter().enumerate() {
        let opens_block = matches!(items.get(i + 1), Some(AstNode::Block { .. }));
        if !attached {
            out.push_str(&pad);
        }
        attached = false;
        match item {
            AstNode::Statement { text } => {
                out.push_str(text);
                if opens_block {
                    out.push(' ');
                    attached = true;
                } else {
                    out.push_str(";\n");
                }
            }
            AstNode::Block { children } => {
                out.push_str("{\n");
                write_items(children, out, indent + 1)?;
                out.push_str(&pad);
                out.push_str("}\n");
            }
            AstNode::Comment { value } if value.contains('\n') => {
                out.push_str("/*");
                out.push_str(value);
                out.push_str("*/\n");
            }
            AstNode::Comment { value } => {
                out.push_str("//");
                out.push_str(value);
                out.push('\n');
            }
            other => {
                return Err(TreefoldError::unsupported(
                    "script",
                    format!("generating {} nodes", other.kind().as_str()),
                ))
            }
        }
    }
    Ok(())
}

// ========== Dialect ==========

#[derive(Debug, Clone)]
pub struct ScriptDialect {
    max_depth: usize,
}

impl ScriptDialect {
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

impl Default for ScriptDialect {
    fn default() -> Self {
        Self::new()
    }
}

impl Dialect for ScriptDialect {
    fn name(&self) -> &'static str {
        "script"
    }

    fn tokenize(&self, source: &str) -> Result<Vec<Token>> {
        let tokens = tokenize(source)?;
        debug!(tokens = tokens.len(), "script tokenized");
        Ok(tokens)
    }

    fn parse(&self, tokens: &[Token]) -> Result<AstNode> {
        let ast = parse(tokens, self.max_depth)?;
        debug!(nodes = ast.node_count(), "script parsed");
        Ok(ast)
    }

    fn validate(&self, ast: &AstNode) -> Vec<ValidationError> {
        validate(ast)
    }

    fn optimize_with(&self, _ast: &AstNode, _pipeline: &OptimizerPipeline) -> Result<OptimizationResult> {
        Err(TreefoldError::unsupported("script", "optimize"))
    }

    fn generate(&self, ast: &AstNode) -> Result<String> {
        generate(ast)
    }

    fn supported_extensions(&self) -> Vec<String> {
        vec![".js".into(), ".mjs".into(), ".cjs".into()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tf_core::OptimizationLevel;

    fn parse_str(src: &str) -> Result<AstNode> {
        parse(&tokenize(src)?, 16)
    }

    #[test]
    fn test_tokenize_kinds() {
        let tokens = tokenize("let x = a >= 1.5; // c\n`t\n`").unwrap();
        let significant: Vec<_> = tokens
            .iter()
            .filter(|t| !t.is(TokenKind::Whitespace))
            .map(|t| (t.kind, t.text.as_str()))
            .collect();
        assert_eq!(
            significant,
            vec![
                (TokenKind::Keyword, "let"),
                (TokenKind::Ident, "x"),
                (TokenKind::Punct, "="),
                (TokenKind::Ident, "a"),
                (TokenKind::Punct, ">="),
                (TokenKind::Number, "1.5"),
                (TokenKind::Semicolon, ";"),
                (TokenKind::Comment, " c"),
                (TokenKind::String, "`t\n`"),
            ]
        );
    }

    #[test]
    fn test_unterminated_string() {
        let err = tokenize("let s = \"abc\n\";").unwrap_err();
        assert!(err.to_string().starts_with("Syntax error at 1:9: unterminated string"), "{err}");
    }

    #[test]
    fn test_parse_blocks() {
        let ast = parse_str("if (a) { b(); } else { c = {x: 1}; }").unwrap();
        assert_eq!(
            ast,
            AstNode::document(vec![
                AstNode::statement("if (a)"),
                AstNode::Block { children: vec![AstNode::statement("b()")] },
                AstNode::statement("else"),
                AstNode::Block { children: vec![AstNode::statement("c = {x: 1}")] },
            ])
        );
    }

    #[test]
    fn test_arrow_body_stays_in_statement() {
        let ast = parse_str("const f = x => { return x; };").unwrap();
        assert_eq!(ast.children(), &[AstNode::statement("const f = x => { return x; }")]);
    }

    #[test]
    fn test_for_header_semicolons() {
        let ast = parse_str("for (let i = 0; i < n; i++) { f(i) }").unwrap();
        assert_eq!(ast.children()[0], AstNode::statement("for (let i = 0; i < n; i++)"));
        assert_eq!(ast.children()[1].children(), &[AstNode::statement("f(i)")]);
    }

    #[test]
    fn test_line_breaks_survive() {
        let ast = parse_str("a = 1\nb = 2").unwrap();
        assert_eq!(ast.children(), &[AstNode::statement("a = 1\nb = 2")]);
    }

    #[test]
    fn test_block_errors() {
        let err = parse_str("function f() {\n  g();").unwrap_err();
        assert!(err.to_string().starts_with("Syntax error at 1:14: unclosed block"), "{err}");
        let err = parse_str("a(); }").unwrap_err();
        assert!(err.to_string().contains("unexpected '}'"), "{err}");
    }

    #[test]
    fn test_depth_limit() {
        assert!(parse(&tokenize("{{{}}}").unwrap(), 3).is_ok());
        let err = parse(&tokenize("{{{}}}").unwrap(), 2).unwrap_err();
        assert!(matches!(err, TreefoldError::LimitExceeded(_)));
    }

    #[test]
    fn test_validate_rules() {
        let ast = parse_str("let a = 1; const a = f(2]; debugger; { let a = (3; }").unwrap();
        let errors = validate(&ast);
        let rules: Vec<_> = errors.iter().map(|e| e.rule.as_str()).collect();
        assert_eq!(
            rules,
            vec!["duplicate-binding", "unbalanced-brackets", "no-debugger", "unbalanced-brackets"]
        );
        assert_eq!(errors[1].message, "\"(\" closed by \"]\"");
        assert_eq!(errors[3].message, "unclosed \"(\"");
        assert_eq!(errors[3].path, "document/block/statement");
    }

    #[test]
    fn test_generate_reparses() {
        let src = "// lead\nif (a) { b(); } else { c = {x: 1}; }\nwhile (k) { { k--; } }";
        let ast = parse_str(src).unwrap();
        let out = generate(&ast).unwrap();
        assert_eq!(
            out,
            "// lead\nif (a) {\n  b();\n}\nelse {\n  c = {x: 1};\n}\nwhile (k) {\n  {\n    k--;\n  }\n}\n"
        );
        assert_eq!(parse_str(&out).unwrap(), ast);
    }

    #[test]
    fn test_optimize_unsupported() {
        let dialect = ScriptDialect::new();
        let ast = dialect.parse_source("a();").unwrap();
        let err = dialect.optimize(&ast, OptimizationLevel::Safe).unwrap_err();
        assert!(err.is_unsupported());
        assert_eq!(err.to_string(), "Unsupported feature for script: optimize");
    }
}
