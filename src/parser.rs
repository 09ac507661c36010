// src/parser.rs
//! Parsing of `{name}` substitution templates used by locators, constants and URLs.

use crate::errors::{Result, ScrapeError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Piece<'a> {
    Literal(&'a str),
    Escaped(char),
    Var(&'a str),
}

/// Split a template into literal runs, escaped braces and placeholders.
pub fn parse_template(input: &str) -> Result<Vec<Piece<'_>>> {
    let mut p = Parser::new(input);
    let mut out = Vec::new();
    while !p.eof() {
        if p.peek_str("{{") {
            p.advance(2);
            out.push(Piece::Escaped('{'));
            continue;
        }
        if p.peek_str("}}") {
            p.advance(2);
            out.push(Piece::Escaped('}'));
            continue;
        }
        if p.consume_char('{') {
            let name = p.capture_until('}')?.trim();
            p.expect('}')?;
            if name.is_empty() {
                return Err(err(input, "empty placeholder"));
            }
            out.push(Piece::Var(name));
            continue;
        }
        if p.peek_char() == Some('}') {
            return Err(err(input, "single '}' encountered"));
        }
        out.push(Piece::Literal(p.take_literal()));
    }
    Ok(out)
}

fn err(input: &str, msg: &str) -> ScrapeError {
    ScrapeError::Template(format!("{msg} in {input:?}"))
}

pub struct Parser<'a> {
    s: &'a str,
    i: usize,
}

impl<'a> Parser<'a> {
    pub fn new(s: &'a str) -> Self {
        Self { s, i: 0 }
    }

    /// Consume text up to the next brace (or the end).
    fn take_literal(&mut self) -> &'a str {
        let start = self.i;
        while let Some(c) = self.peek_char() {
            if c == '{' || c == '}' {
                break;
            }
            self.i += c.len_utf8();
        }
        &self.s[start..self.i]
    }

    pub fn capture_until(&mut self, end: char) -> Result<&'a str> {
        let start = self.i;
        while let Some(c) = self.peek_char() {
            if c == end {
                break;
            }
            self.i += c.len_utf8();
        }
        if self.peek_char() != Some(end) {
            return Err(err(self.s, &format!("expected '{end}'")));
        }
        Ok(&self.s[start..self.i])
    }

    pub fn expect(&mut self, c: char) -> Result<()> {
        if self.consume_char(c) {
            Ok(())
        } else {
            Err(err(self.s, &format!("expected '{c}'")))
        }
    }

    pub fn consume_char(&mut self, c: char) -> bool {
        if self.peek_char() == Some(c) {
            self.i += c.len_utf8();
            true
        } else {
            false
        }
    }

    fn advance(&mut self, bytes: usize) {
        self.i += bytes;
    }

    pub fn peek_char(&self) -> Option<char> {
        self.s[self.i..].chars().next()
    }

    pub fn peek_str(&self, lit: &str) -> bool {
        self.s[self.i..].starts_with(lit)
    }

    pub fn eof(&self) -> bool {
        self.i >= self.s.len()
    }
}
