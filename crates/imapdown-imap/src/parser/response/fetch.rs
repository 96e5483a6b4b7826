//! FETCH response parsing.

use crate::Result;
use crate::parser::lexer::{Lexer, Token};
use crate::types::Uid;

use super::helpers::parse_flag_list;
use super::types::{Address, Envelope, FetchItem};

/// Parses the parenthesized data items of a FETCH response.
pub fn parse_fetch_response(lexer: &mut Lexer<'_>) -> Result<Vec<FetchItem>> {
    lexer.expect(Token::LParen)?;

    let mut items = Vec::new();
    loop {
        match lexer.next_token()? {
            Token::RParen => break,
            Token::Space => {}
            Token::Atom(name) => match name.to_uppercase().as_str() {
                "FLAGS" => {
                    lexer.expect_space()?;
                    items.push(FetchItem::Flags(parse_flag_list(lexer)?));
                }
                "UID" => {
                    lexer.expect_space()?;
                    let n = lexer.read_number()?;
                    let uid = Uid::new(n).ok_or_else(|| lexer.error("invalid UID 0"))?;
                    items.push(FetchItem::Uid(uid));
                }
                "ENVELOPE" => {
                    lexer.expect_space()?;
                    items.push(FetchItem::Envelope(Box::new(parse_envelope(lexer)?)));
                }
                "BODY" | "BODY.PEEK" | "RFC822" => {
                    let section = parse_body_section(lexer)?;
                    lexer.expect_space()?;
                    let data = match lexer.next_token()? {
                        Token::Literal(d) => Some(d),
                        Token::QuotedString(s) => Some(s.into_bytes()),
                        Token::Nil => None,
                        token => {
                            return Err(lexer.error(&format!("expected body data, got {token:?}")));
                        }
                    };
                    items.push(FetchItem::Body { section, data });
                }
                _ => skip_fetch_item(lexer)?,
            },
            token => return Err(lexer.error(&format!("unexpected token in FETCH: {token:?}"))),
        }
    }

    Ok(items)
}

/// Parses `[section]` and an optional `<origin>` after BODY.
fn parse_body_section(lexer: &mut Lexer<'_>) -> Result<Option<String>> {
    let mut section = None;

    if lexer.peek() == Some(b'[') {
        lexer.advance();
        let mut buf = String::new();
        loop {
            match lexer.advance() {
                Some(b']') => break,
                Some(b) => buf.push(b as char),
                None => return Err(lexer.error("unterminated body section")),
            }
        }
        if !buf.is_empty() {
            section = Some(buf);
        }
    }

    if lexer.peek() == Some(b'<') {
        while let Some(b) = lexer.advance() {
            if b == b'>' {
                break;
            }
        }
    }

    Ok(section)
}

/// Parses an envelope: date, subject, six address lists, In-Reply-To and
/// Message-ID, in that order (RFC 9051 §7.5.2).
pub fn parse_envelope(lexer: &mut Lexer<'_>) -> Result<Envelope> {
    lexer.expect(Token::LParen)?;

    let date = lexer.read_nstring()?;
    lexer.expect_space()?;
    let subject = lexer.read_nstring()?;

    let mut lists: [Vec<Address>; 6] = Default::default();
    for list in &mut lists {
        lexer.expect_space()?;
        *list = parse_address_list(lexer)?;
    }
    let [from, sender, reply_to, to, cc, bcc] = lists;

    lexer.expect_space()?;
    let in_reply_to = lexer.read_nstring()?;
    lexer.expect_space()?;
    let message_id = lexer.read_nstring()?;
    lexer.expect(Token::RParen)?;

    Ok(Envelope {
        date,
        subject,
        from,
        sender,
        reply_to,
        to,
        cc,
        bcc,
        in_reply_to,
        message_id,
    })
}

fn parse_address_list(lexer: &mut Lexer<'_>) -> Result<Vec<Address>> {
    match lexer.next_token()? {
        Token::Nil => Ok(Vec::new()),
        Token::LParen => {
            let mut addresses = Vec::new();
            loop {
                match lexer.peek() {
                    Some(b')') => {
                        lexer.advance();
                        break;
                    }
                    Some(b'(') => addresses.push(parse_address(lexer)?),
                    Some(b' ') => {
                        lexer.advance();
                    }
                    _ => return Err(lexer.error("malformed address list")),
                }
            }
            Ok(addresses)
        }
        token => Err(lexer.error(&format!("expected address list, got {token:?}"))),
    }
}

fn parse_address(lexer: &mut Lexer<'_>) -> Result<Address> {
    lexer.expect(Token::LParen)?;
    let mut parts: [Option<String>; 4] = Default::default();
    for (i, part) in parts.iter_mut().enumerate() {
        if i > 0 {
            lexer.expect_space()?;
        }
        *part = lexer.read_nstring()?;
    }
    lexer.expect(Token::RParen)?;

    let [name, adl, mailbox, host] = parts;
    Ok(Address {
        name,
        adl,
        mailbox,
        host,
    })
}

/// Skips the value of a FETCH item this parser does not model.
fn skip_fetch_item(lexer: &mut Lexer<'_>) -> Result<()> {
    if lexer.peek() == Some(b' ') {
        lexer.advance();
    }

    let mut depth = 0usize;
    loop {
        match lexer.peek() {
            Some(b'(') => {
                depth += 1;
                lexer.advance();
            }
            Some(b')') => {
                if depth == 0 {
                    break;
                }
                depth -= 1;
                lexer.advance();
            }
            Some(b'"' | b'{') => {
                lexer.next_token()?;
            }
            Some(b' ') if depth == 0 => break,
            Some(_) => {
                lexer.advance();
            }
            None => break,
        }
    }

    Ok(())
}
