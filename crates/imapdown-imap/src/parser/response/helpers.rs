//! Parsers shared by several response kinds.

use crate::Result;
use crate::parser::lexer::{Lexer, Token};
use crate::types::{ListResponse, Mailbox, MailboxAttribute, ResponseCode, Uid, UidValidity};

/// Parses a bracketed response code.
pub fn parse_response_code(lexer: &mut Lexer<'_>) -> Result<ResponseCode> {
    lexer.expect(Token::LBracket)?;

    let atom = lexer.read_atom_string()?;
    let code = match atom.to_uppercase().as_str() {
        "READ-ONLY" => ResponseCode::ReadOnly,
        "READ-WRITE" => ResponseCode::ReadWrite,
        "AUTHENTICATIONFAILED" => ResponseCode::AuthenticationFailed,
        "NONEXISTENT" => ResponseCode::Nonexistent,
        "UIDNEXT" => ResponseCode::UidNext(nonzero_arg(lexer, "UIDNEXT", Uid::new)?),
        "UIDVALIDITY" => {
            ResponseCode::UidValidity(nonzero_arg(lexer, "UIDVALIDITY", UidValidity::new)?)
        }
        "CAPABILITY" => ResponseCode::Capability(parse_capability_data(lexer)?),
        _ => ResponseCode::Other(atom.to_string()),
    };

    // Arguments of codes we don't model (PERMANENTFLAGS, ...) are skipped.
    while lexer.peek() != Some(b']') && !lexer.is_eof() {
        lexer.advance();
    }
    lexer.expect(Token::RBracket)?;

    Ok(code)
}

/// Reads ` n` after a response code, rejecting 0.
fn nonzero_arg<T>(
    lexer: &mut Lexer<'_>,
    code: &str,
    wrap: impl FnOnce(u32) -> Option<T>,
) -> Result<T> {
    lexer.expect_space()?;
    let n = lexer.read_number()?;
    wrap(n).ok_or_else(|| lexer.error(&format!("invalid {code} 0")))
}

/// Parses space-separated capability atoms.
pub fn parse_capability_data(lexer: &mut Lexer<'_>) -> Result<Vec<String>> {
    let mut caps = Vec::new();

    while lexer.peek() == Some(b' ') {
        lexer.advance();
        if let Token::Atom(s) = lexer.next_token()? {
            caps.push(s.to_string());
        }
    }

    Ok(caps)
}

/// Parses a parenthesized flag list.
pub fn parse_flag_list(lexer: &mut Lexer<'_>) -> Result<Vec<String>> {
    Ok(parse_atom_list(lexer, "flag list")?
        .into_iter()
        .map(str::to_string)
        .collect())
}

/// Parses `(atom atom ...)`. A bare `*` is kept as an atom, as in the
/// `\*` of PERMANENTFLAGS.
fn parse_atom_list<'a>(lexer: &mut Lexer<'a>, what: &str) -> Result<Vec<&'a str>> {
    lexer.expect(Token::LParen)?;
    let mut atoms = Vec::new();
    loop {
        match lexer.next_token()? {
            Token::RParen => return Ok(atoms),
            Token::Space => {}
            Token::Atom(s) => atoms.push(s),
            Token::Asterisk => atoms.push("*"),
            token => return Err(lexer.error(&format!("unexpected token in {what}: {token:?}"))),
        }
    }
}

/// Parses the data of a LIST response: attributes, delimiter, name.
pub fn parse_list_response(lexer: &mut Lexer<'_>) -> Result<ListResponse> {
    let attributes = parse_atom_list(lexer, "LIST attributes")?
        .into_iter()
        .map(MailboxAttribute::parse)
        .collect();

    lexer.expect_space()?;

    let delimiter = match lexer.next_token()? {
        Token::Nil => None,
        Token::QuotedString(s) => s.chars().next(),
        token => return Err(lexer.error(&format!("expected delimiter, got {token:?}"))),
    };

    lexer.expect_space()?;
    let name = lexer.read_astring()?;

    Ok(ListResponse {
        attributes,
        delimiter,
        mailbox: Mailbox::new(name),
    })
}

/// Reads text until CRLF, consuming the CRLF.
pub fn read_text_until_crlf(lexer: &mut Lexer<'_>) -> String {
    let remaining = lexer.remaining();
    let end = remaining
        .windows(2)
        .position(|w| w == b"\r\n")
        .unwrap_or(remaining.len());

    lexer.skip(end + 2);
    String::from_utf8_lossy(&remaining[..end]).into_owned()
}
