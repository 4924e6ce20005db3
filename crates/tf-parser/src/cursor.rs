//! Character cursor with line/column tracking, shared by the lexers.

use tf_core::{Position, Result, TreefoldError};

pub struct Cursor<'a> {
    src: &'a str,
    pos: Position,
}

impl<'a> Cursor<'a> {
    pub fn new(src: &'a str) -> Self {
        Self { src, pos: Position::start() }
    }

    pub fn position(&self) -> Position {
        self.pos
    }

    pub fn is_eof(&self) -> bool {
        self.pos.offset >= self.src.len()
    }

    pub fn rest(&self) -> &'a str {
        &self.src[self.pos.offset..]
    }

    pub fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    pub fn peek_nth(&self, n: usize) -> Option<char> {
        self.rest().chars().nth(n)
    }

    pub fn starts_with(&self, pat: &str) -> bool {
        self.rest().starts_with(pat)
    }

    pub fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos.offset += c.len_utf8();
        if c == '\n' {
            self.pos.line += 1;
            self.pos.column = 1;
        } else {
            self.pos.column += 1;
        }
        Some(c)
    }

    /// Advance over `n` characters.
    pub fn skip(&mut self, n: usize) {
        for _ in 0..n {
            if self.bump().is_none() {
                break;
            }
        }
    }

    pub fn eat_while(&mut self, mut pred: impl FnMut(char) -> bool) -> &'a str {
        let start = self.pos.offset;
        while let Some(c) = self.peek() {
            if !pred(c) {
                break;
            }
            self.bump();
        }
        &self.src[start..self.pos.offset]
    }

    /// Consume everything before the next occurrence of `pat` and return it,
    /// leaving the cursor on `pat`. Returns `None` without moving if `pat`
    /// does not occur.
    pub fn eat_until(&mut self, pat: &str) -> Option<&'a str> {
        let idx = self.rest().find(pat)?;
        let start = self.pos.offset;
        while self.pos.offset < start + idx {
            self.bump();
        }
        Some(&self.src[start..self.pos.offset])
    }

    /// [`eat_until`](Self::eat_until) with an ASCII case-insensitive match.
    pub fn eat_until_ignore_case(&mut self, pat: &str) -> Option<&'a str> {
        let idx = self
            .rest()
            .to_ascii_lowercase()
            .find(&pat.to_ascii_lowercase())?;
        let start = self.pos.offset;
        while self.pos.offset < start + idx {
            self.bump();
        }
        Some(&self.src[start..self.pos.offset])
    }

    /// Lex a quoted string starting at the current quote character. The
    /// returned text keeps its quotes and escapes.
    pub fn quoted(&mut self, multiline: bool) -> Result<String> {
        let start = self.position();
        let mut text = String::new();
        let Some(quote) = self.bump() else {
            return Err(TreefoldError::syntax("expected string", start, None));
        };
        text.push(quote);
        loop {
            match self.bump() {
                None => return Err(TreefoldError::syntax("unterminated string", start, Some(&text))),
                Some('\n') if !multiline => {
                    return Err(TreefoldError::syntax("unterminated string", start, Some(&text)))
                }
                Some('\\') => {
                    text.push('\\');
                    if let Some(c) = self.bump() {
                        text.push(c);
                    }
                }
                Some(c) => {
                    text.push(c);
                    if c == quote {
                        return Ok(text);
                    }
                }
            }
        }
    }

    /// Consume the remaining input.
    pub fn eat_rest(&mut self) -> &'a str {
        self.eat_while(|_| true)
    }
}
