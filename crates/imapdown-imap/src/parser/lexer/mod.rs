//! Tokenizer for server responses (RFC 9051 §9).
//!
//! The lexer walks one framed response, literals inlined, as a shrinking
//! slice. Byte offsets in errors count from the start of the response.

#![allow(clippy::missing_errors_doc)]

mod token;

pub use token::Token;

use crate::{Error, Result};

/// Lexer over one complete response, literals included.
pub struct Lexer<'a> {
    input: &'a [u8],
    rest: &'a [u8],
}

impl<'a> Lexer<'a> {
    /// Starts at the beginning of `input`.
    #[must_use]
    pub const fn new(input: &'a [u8]) -> Self {
        Self { input, rest: input }
    }

    /// Returns the input not consumed yet.
    #[must_use]
    pub const fn remaining(&self) -> &'a [u8] {
        self.rest
    }

    /// Returns true once everything has been consumed.
    #[must_use]
    pub const fn is_eof(&self) -> bool {
        self.rest.is_empty()
    }

    /// Returns the next byte without consuming it.
    #[must_use]
    pub fn peek(&self) -> Option<u8> {
        self.rest.first().copied()
    }

    /// Consumes and returns the next byte.
    pub fn advance(&mut self) -> Option<u8> {
        let (&byte, rest) = self.rest.split_first()?;
        self.rest = rest;
        Some(byte)
    }

    /// Consumes up to `n` bytes.
    pub fn skip(&mut self, n: usize) {
        self.rest = &self.rest[n.min(self.rest.len())..];
    }

    /// Consumes the longest prefix whose bytes satisfy `accept`.
    fn take_while(&mut self, accept: impl Fn(u8) -> bool) -> &'a [u8] {
        let len = self.rest.iter().position(|&b| !accept(b)).unwrap_or(self.rest.len());
        let (taken, rest) = self.rest.split_at(len);
        self.rest = rest;
        taken
    }

    /// Reads the next token.
    pub fn next_token(&mut self) -> Result<Token<'a>> {
        let token = match self.rest {
            [] => return Ok(Token::Eof),
            [b'\r', b'\n', ..] => {
                self.skip(2);
                return Ok(Token::Crlf);
            }
            [b'\r', ..] => return Err(self.error("expected LF after CR")),
            [b'"', ..] => return self.quoted(),
            [b'{', ..] => return self.literal(),
            [b'0'..=b'9', ..] => return self.number_or_atom(),
            [b' ', ..] => Token::Space,
            [b'(', ..] => Token::LParen,
            [b')', ..] => Token::RParen,
            [b'[', ..] => Token::LBracket,
            [b']', ..] => Token::RBracket,
            [b'*', ..] => Token::Asterisk,
            [b'+', ..] => Token::Plus,
            [b, ..] if is_atom_char(*b) => return self.atom(),
            [b, ..] => return Err(self.error(&format!("unexpected character: {b:#04x}"))),
        };
        self.skip(1);
        Ok(token)
    }

    fn quoted(&mut self) -> Result<Token<'a>> {
        self.skip(1);
        let mut text = Vec::new();
        loop {
            match self.advance() {
                Some(b'"') => break,
                Some(b'\\') => match self.advance() {
                    Some(c @ (b'"' | b'\\')) => text.push(c),
                    Some(c) => return Err(self.error(&format!("invalid escape: \\{}", c as char))),
                    None => return Err(self.error("unterminated quoted string")),
                },
                Some(c) => text.push(c),
                None => return Err(self.error("unterminated quoted string")),
            }
        }
        // Servers do send raw 8-bit header text in quoted strings.
        Ok(Token::QuotedString(String::from_utf8_lossy(&text).into_owned()))
    }

    fn literal(&mut self) -> Result<Token<'a>> {
        self.skip(1);
        let size: usize = std::str::from_utf8(self.take_while(|b| b.is_ascii_digit()))
            .ok()
            .and_then(|digits| digits.parse().ok())
            .ok_or_else(|| self.error("invalid literal size"))?;

        // A non-synchronizing `{n+}` reads the same once framed.
        if self.peek() == Some(b'+') {
            self.skip(1);
        }
        let [b'}', b'\r', b'\n', rest @ ..] = self.rest else {
            return Err(self.error("expected }CRLF after literal size"));
        };
        if rest.len() < size {
            return Err(self.error("incomplete literal data"));
        }
        let (data, rest) = rest.split_at(size);
        self.rest = rest;
        Ok(Token::Literal(data.to_vec()))
    }

    fn number_or_atom(&mut self) -> Result<Token<'a>> {
        let atom = self.atom_str()?;
        if !atom.bytes().all(|b| b.is_ascii_digit()) {
            return Ok(Token::Atom(atom));
        }
        atom.parse()
            .map(Token::Number)
            .map_err(|_| self.error("number too large"))
    }

    fn atom(&mut self) -> Result<Token<'a>> {
        let atom = self.atom_str()?;
        Ok(if atom.eq_ignore_ascii_case("NIL") {
            Token::Nil
        } else {
            Token::Atom(atom)
        })
    }

    fn atom_str(&mut self) -> Result<&'a str> {
        let bytes = self.take_while(is_atom_char);
        std::str::from_utf8(bytes).map_err(|_| self.error("invalid atom"))
    }

    /// Builds a parse error at the current offset.
    pub(crate) fn error(&self, message: &str) -> Error {
        Error::Parse {
            position: self.input.len() - self.rest.len(),
            message: message.to_string(),
        }
    }

    /// Consumes a token of the same kind as `expected`.
    #[allow(clippy::needless_pass_by_value)]
    pub fn expect(&mut self, expected: Token<'_>) -> Result<()> {
        let token = self.next_token()?;
        if std::mem::discriminant(&token) == std::mem::discriminant(&expected) {
            Ok(())
        } else {
            Err(self.error(&format!("expected {expected:?}, got {token:?}")))
        }
    }

    /// Consumes a single space.
    pub fn expect_space(&mut self) -> Result<()> {
        self.expect(Token::Space)
    }

    /// Reads an astring: atom, quoted string or literal.
    ///
    /// Bare astrings may contain `[` and `]`, as in `[Gmail]/Spam`.
    pub fn read_astring(&mut self) -> Result<String> {
        if self.peek().is_some_and(is_astring_char) {
            let bare = self.take_while(is_astring_char);
            return Ok(String::from_utf8_lossy(bare).into_owned());
        }
        match self.next_token()? {
            Token::Atom(s) => Ok(s.to_string()),
            Token::Number(n) => Ok(n.to_string()),
            Token::QuotedString(s) => Ok(s),
            Token::Literal(data) => Ok(String::from_utf8_lossy(&data).into_owned()),
            token => Err(self.error(&format!("expected astring, got {token:?}"))),
        }
    }

    /// Reads an nstring: `NIL` or a string.
    pub fn read_nstring(&mut self) -> Result<Option<String>> {
        match self.next_token()? {
            Token::Nil => Ok(None),
            Token::QuotedString(s) => Ok(Some(s)),
            Token::Literal(data) => Ok(Some(String::from_utf8_lossy(&data).into_owned())),
            token => Err(self.error(&format!("expected nstring, got {token:?}"))),
        }
    }

    /// Reads a number.
    pub fn read_number(&mut self) -> Result<u32> {
        match self.next_token()? {
            Token::Number(n) => Ok(n),
            token => Err(self.error(&format!("expected number, got {token:?}"))),
        }
    }

    /// Reads an atom.
    pub fn read_atom_string(&mut self) -> Result<&'a str> {
        match self.next_token()? {
            Token::Atom(s) => Ok(s),
            token => Err(self.error(&format!("expected atom, got {token:?}"))),
        }
    }
}

/// Returns true if `b` may appear in an atom.
///
/// `\` is accepted so flags such as `\Seen` lex as one atom.
#[must_use]
pub const fn is_atom_char(b: u8) -> bool {
    matches!(b, 0x21 | 0x23 | 0x24 | 0x26 | 0x27 | 0x2B..=0x5A | 0x5C | 0x5E..=0x7A | 0x7C | 0x7E)
}

const fn is_astring_char(b: u8) -> bool {
    is_atom_char(b) || b == b'[' || b == b']'
}
