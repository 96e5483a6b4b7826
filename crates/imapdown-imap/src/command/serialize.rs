//! Command serialization helpers.

use super::FetchAttribute;

/// Writes an astring (atom or quoted string).
pub fn write_astring(buf: &mut Vec<u8>, s: &str) {
    if s.is_empty() || s.bytes().any(needs_quoting) {
        buf.push(b'"');
        for b in s.bytes() {
            if b == b'"' || b == b'\\' {
                buf.push(b'\\');
            }
            buf.push(b);
        }
        buf.push(b'"');
    } else {
        buf.extend_from_slice(s.as_bytes());
    }
}

const fn needs_quoting(b: u8) -> bool {
    matches!(
        b,
        b' ' | b'"' | b'\\' | b'(' | b')' | b'{' | b'%' | b'*' | b']'
    ) || b < 0x20
        || b == 0x7F
}

/// Writes a FETCH item list, parenthesized when it has more than one entry.
pub fn write_fetch_attributes(buf: &mut Vec<u8>, attrs: &[FetchAttribute]) {
    if let [single] = attrs {
        write_fetch_attribute(buf, single);
        return;
    }
    buf.push(b'(');
    for (i, attr) in attrs.iter().enumerate() {
        if i > 0 {
            buf.push(b' ');
        }
        write_fetch_attribute(buf, attr);
    }
    buf.push(b')');
}

fn write_fetch_attribute(buf: &mut Vec<u8>, attr: &FetchAttribute) {
    match attr {
        FetchAttribute::Uid => buf.extend_from_slice(b"UID"),
        FetchAttribute::Envelope => buf.extend_from_slice(b"ENVELOPE"),
        FetchAttribute::BodyPeek { section } => {
            buf.extend_from_slice(b"BODY.PEEK[");
            if let Some(s) = section {
                buf.extend_from_slice(s.as_bytes());
            }
            buf.push(b']');
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn astring(s: &str) -> String {
        let mut buf = Vec::new();
        write_astring(&mut buf, s);
        String::from_utf8_lossy(&buf).into_owned()
    }

    #[test]
    fn atoms_stay_bare() {
        assert_eq!(astring("INBOX"), "INBOX");
        assert_eq!(astring("Archive/2024"), "Archive/2024");
    }

    #[test]
    fn specials_are_quoted() {
        assert_eq!(astring(""), "\"\"");
        assert_eq!(astring("Sent Items"), "\"Sent Items\"");
        assert_eq!(astring("a\"b"), "\"a\\\"b\"");
        assert_eq!(astring("back\\slash"), "\"back\\\\slash\"");
    }

    #[test]
    fn fetch_list() {
        let mut buf = Vec::new();
        write_fetch_attributes(&mut buf, &[FetchAttribute::Uid, FetchAttribute::Envelope]);
        assert_eq!(buf, b"(UID ENVELOPE)");

        let mut buf = Vec::new();
        write_fetch_attributes(&mut buf, &[FetchAttribute::BodyPeek { section: None }]);
        assert_eq!(buf, b"BODY.PEEK[]");
    }
}
