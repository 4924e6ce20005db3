//! Markup dialect: tags, attributes, void elements, comments and text.
//!
//! The parser is stack based, so nesting depth is bounded by
//! `limits.max_depth` rather than by the call stack.

use crate::cursor::Cursor;
use crate::traits::Dialect;
use crate::walk::walk;
use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;
use tf_core::config::LimitsConfig;
use tf_core::{AstNode, Attribute, Position, Result, Token, TokenKind, TreefoldError, ValidationError};
use tracing::debug;

/// Elements that never have content or a closing tag.
pub const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

/// Elements whose content is taken verbatim up to the closing tag.
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style", "textarea"];

static RE_TAG_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9-]*(:[A-Za-z][A-Za-z0-9-]*)?$").unwrap());

pub fn is_void(tag: &str) -> bool {
    VOID_ELEMENTS.iter().any(|v| v.eq_ignore_ascii_case(tag))
}

fn is_raw_text(tag: &str) -> bool {
    RAW_TEXT_ELEMENTS.iter().any(|v| v.eq_ignore_ascii_case(tag))
}

fn is_name_char(c: char) -> bool {
    !c.is_whitespace() && !matches!(c, '>' | '/' | '=' | '"' | '\'' | '<')
}

fn syntax(message: impl Into<String>, position: Position, found: Option<&str>) -> TreefoldError {
    TreefoldError::syntax(message, position, found)
}

// ========== Tokenizer ==========

pub fn tokenize(source: &str) -> Result<Vec<Token>> {
    let mut cur = Cursor::new(source);
    let mut tokens: Vec<Token> = Vec::new();

    while !cur.is_eof() {
        let start = cur.position();
        if cur.starts_with("<!--") {
            cur.skip(4);
            let body = cur
                .eat_until("-->")
                .ok_or_else(|| syntax("unterminated comment", start, Some("<!--")))?;
            tokens.push(Token::new(TokenKind::Comment, body, start));
            cur.skip(3);
        } else if cur.starts_with("<!") || cur.starts_with("<?") {
            // doctype and processing instructions are kept verbatim
            cur.skip(1);
            let body = cur
                .eat_until(">")
                .ok_or_else(|| syntax("unterminated declaration", start, Some("<!")))?;
            tokens.push(Token::new(TokenKind::Keyword, body, start));
            cur.skip(1);
        } else if cur.starts_with("</") && cur.peek_nth(2).is_some_and(|c| c.is_ascii_alphabetic()) {
            cur.skip(2);
            let name = cur.eat_while(is_name_char);
            tokens.push(Token::new(TokenKind::TagClose, name, start));
            cur.eat_while(char::is_whitespace);
            let end = cur.position();
            match cur.bump() {
                Some('>') => tokens.push(Token::new(TokenKind::TagEnd, ">", end)),
                Some(c) => {
                    return Err(syntax(
                        format!("expected '>' to close </{name}>"),
                        end,
                        Some(&c.to_string()),
                    ))
                }
                None => return Err(syntax("unterminated closing tag", start, Some(name))),
            }
        } else if cur.peek() == Some('<') && cur.peek_nth(1).is_some_and(|c| c.is_ascii_alphabetic()) {
            cur.bump();
            let name = cur.eat_while(is_name_char);
            tokens.push(Token::new(TokenKind::TagOpen, name, start));
            let self_closed = lex_attributes(&mut cur, &mut tokens, start)?;
            if !self_closed && is_raw_text(name) {
                lex_raw_text(&mut cur, &mut tokens, name);
            }
        } else {
            // a '<' that opens nothing is plain text
            let mut first = true;
            let text = cur.eat_while(|c| {
                let keep = first || c != '<';
                first = false;
                keep
            });
            match tokens.last_mut() {
                Some(last) if last.is(TokenKind::Text) => last.text.push_str(text),
                _ => tokens.push(Token::new(TokenKind::Text, text, start)),
            }
        }
    }

    Ok(tokens)
}

/// Lex the attribute list after a tag name. Returns whether the tag was
/// self-closed.
fn lex_attributes(cur: &mut Cursor<'_>, tokens: &mut Vec<Token>, tag_start: Position) -> Result<bool> {
    loop {
        cur.eat_while(char::is_whitespace);
        let pos = cur.position();
        match cur.peek() {
            None => return Err(syntax("unterminated tag", tag_start, None)),
            Some('>') => {
                cur.bump();
                tokens.push(Token::new(TokenKind::TagEnd, ">", pos));
                return Ok(false);
            }
            Some('/') if cur.peek_nth(1) == Some('>') => {
                cur.skip(2);
                tokens.push(Token::new(TokenKind::SelfClose, "/>", pos));
                return Ok(true);
            }
            Some(c) if !is_name_char(c) => {
                return Err(syntax("unexpected character in tag", pos, Some(&c.to_string())));
            }
            Some(_) => {
                let name = cur.eat_while(is_name_char);
                tokens.push(Token::new(TokenKind::AttrName, name, pos));
                cur.eat_while(char::is_whitespace);
                if cur.peek() != Some('=') {
                    continue;
                }
                tokens.push(Token::new(TokenKind::Equals, "=", cur.position()));
                cur.bump();
                cur.eat_while(char::is_whitespace);
                let vpos = cur.position();
                match cur.peek() {
                    Some(q @ ('"' | '\'')) => {
                        cur.bump();
                        let quote = q.to_string();
                        let value = cur.eat_until(&quote).ok_or_else(|| {
                            syntax("unterminated attribute value", vpos, Some(&quote))
                        })?;
                        tokens.push(Token::new(TokenKind::AttrValue, value, vpos));
                        cur.bump();
                    }
                    Some(c) if c != '>' && !c.is_whitespace() => {
                        let value = cur.eat_while(|c| !c.is_whitespace() && c != '>');
                        tokens.push(Token::new(TokenKind::AttrValue, value, vpos));
                    }
                    Some(c) => {
                        return Err(syntax(
                            format!("missing value for attribute {name:?}"),
                            vpos,
                            Some(&c.to_string()),
                        ))
                    }
                    None => return Err(syntax("unterminated tag", tag_start, None)),
                }
            }
        }
    }
}

fn lex_raw_text(cur: &mut Cursor<'_>, tokens: &mut Vec<Token>, tag: &str) {
    let start = cur.position();
    let close = format!("</{tag}");
    // without a closing tag the rest is content; the parser reports the
    // unclosed element
    let body = match cur.eat_until_ignore_case(&close) {
        Some(body) => body,
        None => cur.eat_rest(),
    };
    if !body.is_empty() {
        tokens.push(Token::new(TokenKind::Text, body, start));
    }
}

// ========== Parser ==========

struct Frame {
    tag: String,
    attributes: Vec<Attribute>,
    children: Vec<AstNode>,
    position: Position,
}

fn append(stack: &mut [Frame], root: &mut Vec<AstNode>, node: AstNode) {
    match stack.last_mut() {
        Some(frame) => frame.children.push(node),
        None => root.push(node),
    }
}

pub fn parse(tokens: &[Token], max_depth: usize) -> Result<AstNode> {
    let mut root = Vec::new();
    let mut stack: Vec<Frame> = Vec::new();
    let mut i = 0;

    while i < tokens.len() {
        let tok = &tokens[i];
        i += 1;
        match tok.kind {
            TokenKind::Text => append(&mut stack, &mut root, AstNode::text(&tok.text)),
            TokenKind::Comment => append(&mut stack, &mut root, AstNode::comment(&tok.text)),
            TokenKind::Keyword => append(&mut stack, &mut root, AstNode::statement(&tok.text)),
            TokenKind::TagOpen => {
                let mut attributes = Vec::new();
                let self_closed = loop {
                    let t = tokens
                        .get(i)
                        .ok_or_else(|| syntax("unterminated tag", tok.position, Some(&tok.text)))?;
                    i += 1;
                    match t.kind {
                        TokenKind::TagEnd => break false,
                        TokenKind::SelfClose => break true,
                        TokenKind::AttrName => {
                            let mut value = None;
                            if tokens.get(i).is_some_and(|n| n.is(TokenKind::Equals)) {
                                let v = tokens
                                    .get(i + 1)
                                    .filter(|n| n.is(TokenKind::AttrValue))
                                    .ok_or_else(|| {
                                        syntax("expected attribute value", t.position, Some(&t.text))
                                    })?;
                                value = Some(v.text.as_str());
                                i += 2;
                            }
                            attributes.push(Attribute::new(&t.text, value));
                        }
                        _ => return Err(syntax("unexpected token in tag", t.position, Some(&t.text))),
                    }
                };
                if self_closed || is_void(&tok.text) {
                    append(&mut stack, &mut root, AstNode::element(&tok.text, attributes, Vec::new()));
                } else {
                    if stack.len() >= max_depth {
                        return Err(TreefoldError::LimitExceeded(format!(
                            "markup nesting deeper than {max_depth} at {}",
                            tok.position
                        )));
                    }
                    stack.push(Frame {
                        tag: tok.text.clone(),
                        attributes,
                        children: Vec::new(),
                        position: tok.position,
                    });
                }
            }
            TokenKind::TagClose => {
                if tokens.get(i).is_some_and(|t| t.is(TokenKind::TagEnd)) {
                    i += 1;
                }
                // `</br>` and friends close nothing
                if is_void(&tok.text) {
                    continue;
                }
                let found = format!("</{}>", tok.text);
                match stack.last().map(|f| (f.tag.eq_ignore_ascii_case(&tok.text), f.tag.clone())) {
                    Some((true, _)) => {
                        if let Some(frame) = stack.pop() {
                            let element = AstNode::element(frame.tag, frame.attributes, frame.children);
                            append(&mut stack, &mut root, element);
                        }
                    }
                    Some((false, open)) => {
                        return Err(syntax(
                            format!("mismatched closing tag, expected </{open}>"),
                            tok.position,
                            Some(&found),
                        ))
                    }
                    None => {
                        return Err(syntax(
                            "closing tag without matching open tag",
                            tok.position,
                            Some(&found),
                        ))
                    }
                }
            }
            _ => return Err(syntax("unexpected token", tok.position, Some(&tok.text))),
        }
    }

    if let Some(frame) = stack.last() {
        return Err(syntax(format!("unclosed tag <{}>", frame.tag), frame.position, None));
    }
    Ok(AstNode::document(root))
}

// ========== Validation ==========

pub fn validate(ast: &AstNode) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let mut ids: HashMap<&str, String> = HashMap::new();

    walk(ast, |node, path| {
        let AstNode::Element { tag, attributes, .. } = node else {
            return;
        };
        if !RE_TAG_NAME.is_match(tag) {
            errors.push(ValidationError::new("invalid-tag-name", format!("invalid tag name {tag:?}"), path));
        }
        let mut seen = HashSet::new();
        for attr in attributes {
            if !seen.insert(attr.name.to_ascii_lowercase()) {
                errors.push(ValidationError::new(
                    "duplicate-attribute",
                    format!("attribute {:?} repeated on <{tag}>", attr.name),
                    path,
                ));
            }
        }
        let id = attributes
            .iter()
            .find(|a| a.name.eq_ignore_ascii_case("id"))
            .and_then(|a| a.value.as_deref());
        if let Some(id) = id {
            match ids.get(id) {
                Some(first) => errors.push(ValidationError::new(
                    "duplicate-id",
                    format!("id {id:?} already used at {first}"),
                    path,
                )),
                None => {
                    ids.insert(id, path.to_string());
                }
            }
        }
        if tag.eq_ignore_ascii_case("img") && !attributes.iter().any(|a| a.name.eq_ignore_ascii_case("alt")) {
            errors.push(ValidationError::new("img-alt", "<img> without alt text", path));
        }
    });

    errors
}

// ========== Generator ==========

pub fn generate(ast: &AstNode) -> Result<String> {
    let mut out = String::new();
    write_node(ast, &mut out)?;
    Ok(out)
}

fn write_node(node: &AstNode, out: &mut String) -> Result<()> {
    match node {
        AstNode::Document { children } => {
            for child in children {
                write_node(child, out)?;
            }
        }
        AstNode::Element { tag, attributes, children } => {
            out.push('<');
            out.push_str(tag);
            for attr in attributes {
                out.push(' ');
                out.push_str(&attr.name);
                if let Some(value) = &attr.value {
                    out.push_str("=\"");
                    out.push_str(&value.replace('"', "&quot;"));
                    out.push('"');
                }
            }
            out.push('>');
            if is_void(tag) && children.is_empty() {
                return Ok(());
            }
            for child in children {
                write_node(child, out)?;
            }
            out.push_str("</");
            out.push_str(tag);
            out.push('>');
        }
        AstNode::Text { value } => out.push_str(value),
        AstNode::Comment { value } => {
            out.push_str("<!--");
            out.push_str(value);
            out.push_str("-->");
        }
        AstNode::Statement { text } => {
            out.push('<');
            out.push_str(text);
            out.push('>');
        }
        other => {
            return Err(TreefoldError::unsupported(
                "markup",
                format!("generating {} nodes", other.kind().as_str()),
            ))
        }
    }
    Ok(())
}

// ========== Dialect ==========

#[derive(Debug, Clone)]
pub struct MarkupDialect {
    max_depth: usize,
}

impl MarkupDialect {
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

impl Default for MarkupDialect {
    fn default() -> Self {
        Self::new()
    }
}

impl Dialect for MarkupDialect {
    fn name(&self) -> &'static str {
        "markup"
    }

    fn tokenize(&self, source: &str) -> Result<Vec<Token>> {
        let tokens = tokenize(source)?;
        debug!(tokens = tokens.len(), "markup tokenized");
        Ok(tokens)
    }

    fn parse(&self, tokens: &[Token]) -> Result<AstNode> {
        let ast = parse(tokens, self.max_depth)?;
        debug!(nodes = ast.node_count(), "markup parsed");
        Ok(ast)
    }

    fn validate(&self, ast: &AstNode) -> Vec<ValidationError> {
        validate(ast)
    }

    fn generate(&self, ast: &AstNode) -> Result<String> {
        generate(ast)
    }

    fn supported_extensions(&self) -> Vec<String> {
        vec![".html".into(), ".htm".into(), ".xhtml".into(), ".xml".into(), ".svg".into()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(tokens: &[Token]) -> Vec<TokenKind> {
        tokens.iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_tokenize_attributes() {
        let tokens = tokenize(r#"<a href="/x" data-k='v' hidden n=1>"#).unwrap();
        assert_eq!(
            kinds(&tokens),
            vec![
                TokenKind::TagOpen,
                TokenKind::AttrName,
                TokenKind::Equals,
                TokenKind::AttrValue,
                TokenKind::AttrName,
                TokenKind::Equals,
                TokenKind::AttrValue,
                TokenKind::AttrName,
                TokenKind::AttrName,
                TokenKind::Equals,
                TokenKind::AttrValue,
                TokenKind::TagEnd,
            ]
        );
        assert_eq!(tokens[3].text, "/x");
        assert_eq!(tokens[6].text, "v");
        assert_eq!(tokens[10].text, "1");
    }

    #[test]
    fn test_tokenize_raw_text() {
        let tokens = tokenize("<script>if (a < b) {}</SCRIPT>").unwrap();
        assert_eq!(tokens[2].kind, TokenKind::Text);
        assert_eq!(tokens[2].text, "if (a < b) {}");
        assert_eq!(tokens[3].kind, TokenKind::TagClose);
    }

    #[test]
    fn test_stray_angle_bracket_is_text() {
        let tokens = tokenize("1 < 2").unwrap();
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].text, "1 < 2");
    }

    #[test]
    fn test_unterminated_comment_position() {
        let err = tokenize("ok\n  <!-- never").unwrap_err();
        match err {
            TreefoldError::Syntax { position, .. } => {
                assert_eq!((position.line, position.column), (2, 3));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_parse_nested_and_void() {
        let ast = parse(&tokenize("<p>a<br>b<img src=x /></p>").unwrap(), 16).unwrap();
        let p = &ast.children()[0];
        assert_eq!(p.children().len(), 4);
        assert!(matches!(&p.children()[1], AstNode::Element { tag, .. } if tag == "br"));
    }

    #[test]
    fn test_parse_mismatched_close() {
        let err = parse(&tokenize("<div><span></div>").unwrap(), 16).unwrap_err();
        assert!(err.to_string().contains("expected </span>"), "{err}");
        assert!(err.to_string().contains("found \"</div>\""), "{err}");
    }

    #[test]
    fn test_parse_unclosed() {
        let err = parse(&tokenize("<div>\n<p>").unwrap(), 16).unwrap_err();
        assert!(err.to_string().starts_with("Syntax error at 2:1: unclosed tag <p>"), "{err}");
    }

    #[test]
    fn test_depth_limit() {
        let src = "<b>".repeat(5) + &"</b>".repeat(5);
        assert!(parse(&tokenize(&src).unwrap(), 5).is_ok());
        let err = parse(&tokenize(&src).unwrap(), 4).unwrap_err();
        assert!(matches!(err, TreefoldError::LimitExceeded(_)));
    }

    #[test]
    fn test_validate_rules() {
        let src = r#"<div id="a" class=x CLASS=y><img src=p><span id="a"></span></div>"#;
        let ast = parse(&tokenize(src).unwrap(), 16).unwrap();
        let rules: Vec<_> = validate(&ast).into_iter().map(|e| e.rule).collect();
        assert_eq!(rules, vec!["duplicate-attribute", "img-alt", "duplicate-id"]);
    }

    #[test]
    fn test_validate_tag_name() {
        let ast = AstNode::document(vec![AstNode::element("1x", vec![], vec![])]);
        let errors = validate(&ast);
        assert_eq!(errors[0].rule, "invalid-tag-name");
        assert_eq!(errors[0].path, "document/1x");
    }

    #[test]
    fn test_generate_round_trip() {
        let src = r#"<!DOCTYPE html><ul class="m"><li>a</li><!-- c --><li hidden>b<br></li></ul>"#;
        let ast = parse(&tokenize(src).unwrap(), 16).unwrap();
        assert_eq!(generate(&ast).unwrap(), src);
    }

    #[test]
    fn test_generate_escapes_quotes() {
        let ast = parse(&tokenize(r#"<a title='say "hi"'></a>"#).unwrap(), 16).unwrap();
        assert_eq!(generate(&ast).unwrap(), r#"<a title="say &quot;hi&quot;"></a>"#);
    }

    #[test]
    fn test_generate_rejects_foreign_nodes() {
        let ast = AstNode::document(vec![AstNode::declaration("a", "b")]);
        assert!(generate(&ast).unwrap_err().is_unsupported());
    }
}
