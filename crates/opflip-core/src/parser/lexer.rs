// Indentation-aware lexer. Leading whitespace becomes Indent/Dedent
// tokens (tabs expand to the next multiple of 8, as in CPython); blank
// and comment-only lines are skipped; newlines inside brackets are
// implicit line joins.

use anyhow::{bail, Context, Result};

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Int(i64),
    Float(f64),
    Str(String),
    Name(String),

    Newline,
    Indent,
    Dedent,
    Eof,

    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Lt,
    Gt,
    Le,
    Ge,
    EqEq,
    NotEq,
    Assign,
    PlusAssign,
    MinusAssign,
    LParen,
    RParen,
    LBracket,
    RBracket,
    Comma,
    Colon,
    Dot,
}

/// A token with its start position: 1-based line, 0-based column.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub line: u32,
    pub column: u32,
}

pub fn tokenize(source: &str) -> Result<Vec<Token>> {
    Lexer::new(source).run()
}

struct Lexer<'a> {
    text: &'a str,
    src: &'a [u8],
    i: usize,
    line: u32,
    line_start: usize,
    bracket_depth: usize,
    indents: Vec<usize>,
    tokens: Vec<Token>,
}

impl<'a> Lexer<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            text: source,
            src: source.as_bytes(),
            i: 0,
            line: 1,
            line_start: 0,
            bracket_depth: 0,
            indents: vec![0],
            tokens: Vec::new(),
        }
    }

    fn column(&self) -> u32 {
        (self.i - self.line_start) as u32
    }

    fn push(&mut self, kind: TokenKind, line: u32, column: u32) {
        self.tokens.push(Token { kind, line, column });
    }

    fn push_here(&mut self, kind: TokenKind) {
        let (line, column) = (self.line, self.column());
        self.push(kind, line, column);
    }

    fn newline(&mut self) {
        self.i += 1;
        self.line += 1;
        self.line_start = self.i;
    }

    fn run(mut self) -> Result<Vec<Token>> {
        self.handle_indentation()?;
        while self.i < self.src.len() {
            let c = self.src[self.i];
            match c {
                b' ' | b'\t' | b'\r' => self.i += 1,
                b'#' => {
                    while self.i < self.src.len() && self.src[self.i] != b'\n' {
                        self.i += 1;
                    }
                }
                b'\n' => {
                    if self.bracket_depth == 0 {
                        self.push_here(TokenKind::Newline);
                        self.newline();
                        self.handle_indentation()?;
                    } else {
                        self.newline();
                    }
                }
                b'"' | b'\'' => self.string(c)?,
                b'0'..=b'9' => self.number()?,
                c if c == b'_' || c.is_ascii_alphabetic() => self.name(),
                _ => self.punct()?,
            }
        }
        let needs_newline = self.tokens.last().is_some_and(|last| {
            !matches!(
                last.kind,
                TokenKind::Newline | TokenKind::Indent | TokenKind::Dedent
            )
        });
        if needs_newline {
            self.push_here(TokenKind::Newline);
        }
        while self.indents.len() > 1 {
            self.indents.pop();
            self.push_here(TokenKind::Dedent);
        }
        self.push_here(TokenKind::Eof);
        Ok(self.tokens)
    }

    /// Measure the indentation of the line starting at the cursor and
    /// emit Indent/Dedent tokens. Blank and comment-only lines are
    /// consumed without affecting the indent stack.
    fn handle_indentation(&mut self) -> Result<()> {
        loop {
            let mut width = 0usize;
            while self.i < self.src.len() {
                match self.src[self.i] {
                    b' ' => {
                        width += 1;
                        self.i += 1;
                    }
                    b'\t' => {
                        width = width / 8 * 8 + 8;
                        self.i += 1;
                    }
                    _ => break,
                }
            }
            if self.i >= self.src.len() {
                return Ok(());
            }
            match self.src[self.i] {
                b'\r' => {
                    self.i += 1;
                    continue;
                }
                b'\n' => {
                    self.newline();
                    continue;
                }
                b'#' => {
                    while self.i < self.src.len() && self.src[self.i] != b'\n' {
                        self.i += 1;
                    }
                    continue;
                }
                _ => {}
            }

            let current = *self.indents.last().unwrap_or(&0);
            if width > current {
                self.indents.push(width);
                self.push(TokenKind::Indent, self.line, 0);
            } else if width < current {
                while width < *self.indents.last().unwrap_or(&0) {
                    self.indents.pop();
                    self.push(TokenKind::Dedent, self.line, 0);
                }
                if width != *self.indents.last().unwrap_or(&0) {
                    bail!(
                        "unindent does not match any outer indentation level at line {}",
                        self.line
                    );
                }
            }
            return Ok(());
        }
    }

    fn string(&mut self, quote: u8) -> Result<()> {
        let (line, column) = (self.line, self.column());
        self.i += 1;
        let mut value = String::new();
        loop {
            if self.i >= self.src.len() || self.src[self.i] == b'\n' {
                bail!("unterminated string literal at line {line}, column {column}");
            }
            let c = self.src[self.i];
            self.i += 1;
            if c == quote {
                break;
            }
            if c == b'\\' {
                if self.i >= self.src.len() {
                    bail!("unterminated string literal at line {line}, column {column}");
                }
                let escaped = self.src[self.i];
                self.i += 1;
                match escaped {
                    b'n' => value.push('\n'),
                    b't' => value.push('\t'),
                    b'r' => value.push('\r'),
                    b'\\' => value.push('\\'),
                    b'\'' => value.push('\''),
                    b'"' => value.push('"'),
                    other => bail!(
                        "unsupported escape sequence '\\{}' at line {}",
                        other as char,
                        self.line
                    ),
                }
            } else if c.is_ascii() {
                value.push(c as char);
            } else {
                // Multi-byte UTF-8 sequence; slice the whole character
                // back out of the source instead of pushing raw bytes.
                let ch = self.text[self.i - 1..]
                    .chars()
                    .next()
                    .expect("source is valid utf-8");
                value.push(ch);
                self.i += ch.len_utf8() - 1;
            }
        }
        self.push(TokenKind::Str(value), line, column);
        Ok(())
    }

    fn number(&mut self) -> Result<()> {
        let (line, column) = (self.line, self.column());
        let start = self.i;
        while self.i < self.src.len() && self.src[self.i].is_ascii_digit() {
            self.i += 1;
        }
        let mut is_float = false;
        if self.i + 1 < self.src.len()
            && self.src[self.i] == b'.'
            && self.src[self.i + 1].is_ascii_digit()
        {
            is_float = true;
            self.i += 1;
            while self.i < self.src.len() && self.src[self.i].is_ascii_digit() {
                self.i += 1;
            }
        }
        let text = std::str::from_utf8(&self.src[start..self.i]).expect("ascii digits");
        let kind = if is_float {
            TokenKind::Float(text.parse().with_context(|| {
                format!("invalid float literal at line {line}, column {column}")
            })?)
        } else {
            TokenKind::Int(text.parse().with_context(|| {
                format!("integer literal out of range at line {line}, column {column}")
            })?)
        };
        self.push(kind, line, column);
        Ok(())
    }

    fn name(&mut self) {
        let (line, column) = (self.line, self.column());
        let start = self.i;
        while self.i < self.src.len()
            && (self.src[self.i] == b'_' || self.src[self.i].is_ascii_alphanumeric())
        {
            self.i += 1;
        }
        let text = std::str::from_utf8(&self.src[start..self.i])
            .expect("ascii identifier")
            .to_string();
        self.push(TokenKind::Name(text), line, column);
    }

    fn punct(&mut self) -> Result<()> {
        let (line, column) = (self.line, self.column());
        let c = self.src[self.i];
        let next = self.src.get(self.i + 1).copied();
        let (kind, len) = match (c, next) {
            (b'+', Some(b'=')) => (TokenKind::PlusAssign, 2),
            (b'+', _) => (TokenKind::Plus, 1),
            (b'-', Some(b'=')) => (TokenKind::MinusAssign, 2),
            (b'-', _) => (TokenKind::Minus, 1),
            (b'*', _) => (TokenKind::Star, 1),
            (b'/', _) => (TokenKind::Slash, 1),
            (b'%', _) => (TokenKind::Percent, 1),
            (b'<', Some(b'=')) => (TokenKind::Le, 2),
            (b'<', _) => (TokenKind::Lt, 1),
            (b'>', Some(b'=')) => (TokenKind::Ge, 2),
            (b'>', _) => (TokenKind::Gt, 1),
            (b'=', Some(b'=')) => (TokenKind::EqEq, 2),
            (b'=', _) => (TokenKind::Assign, 1),
            (b'!', Some(b'=')) => (TokenKind::NotEq, 2),
            (b'(', _) => {
                self.bracket_depth += 1;
                (TokenKind::LParen, 1)
            }
            (b')', _) => {
                self.bracket_depth = self.bracket_depth.saturating_sub(1);
                (TokenKind::RParen, 1)
            }
            (b'[', _) => {
                self.bracket_depth += 1;
                (TokenKind::LBracket, 1)
            }
            (b']', _) => {
                self.bracket_depth = self.bracket_depth.saturating_sub(1);
                (TokenKind::RBracket, 1)
            }
            (b',', _) => (TokenKind::Comma, 1),
            (b':', _) => (TokenKind::Colon, 1),
            (b'.', _) => (TokenKind::Dot, 1),
            (other, _) => bail!(
                "unexpected character '{}' at line {line}, column {column}",
                other as char
            ),
        };
        self.i += len;
        self.push(kind, line, column);
        Ok(())
    }
}
