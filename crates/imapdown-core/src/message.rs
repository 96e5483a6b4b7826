//! Envelope metadata for one message within a selection.

use chrono::{DateTime, FixedOffset, SecondsFormat};
use imapdown_imap::{SeqNum, Uid};

/// Date recorded for messages without a parseable Date header.
pub const UNKNOWN_DATE: &str = "0001-01-01T00:00:00Z";

/// A message as seen during one streaming fetch.
///
/// The sequence number is only meaningful inside the selection the message
/// was fetched from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailboxMessage {
    /// Position within the current selection.
    pub seq: SeqNum,
    /// Stable identifier, when the server returned one.
    pub uid: Option<Uid>,
    /// Envelope metadata.
    pub envelope: Envelope,
}

/// Envelope fields the archive records.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Envelope {
    /// Message-ID header; empty when absent.
    pub message_id: String,
    /// In-Reply-To header; empty when absent.
    pub in_reply_to: String,
    /// Date header, when present and parseable.
    pub date: Option<DateTime<FixedOffset>>,
    /// Subject header; empty when absent.
    pub subject: String,
    /// From addresses in header order.
    pub from: Vec<Sender>,
}

/// One address from the From header.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sender {
    /// Display name.
    pub name: Option<String>,
    /// Local part.
    pub mailbox: String,
    /// Domain part.
    pub host: String,
}

impl Envelope {
    /// Formats the first sender as `Name <mailbox@host>`, or
    /// `<mailbox@host>` without a display name. Empty when there is no
    /// sender.
    #[must_use]
    pub fn format_from(&self) -> String {
        let Some(first) = self.from.first() else {
            return String::new();
        };
        match first.name.as_deref() {
            Some(name) if !name.is_empty() => {
                format!("{name} <{}@{}>", first.mailbox, first.host)
            }
            _ => format!("<{}@{}>", first.mailbox, first.host),
        }
    }

    /// Formats the date as RFC 3339, keeping sub-second digits only when
    /// present and using `Z` for a zero offset. Unknown dates format as
    /// [`UNKNOWN_DATE`].
    #[must_use]
    pub fn format_date(&self) -> String {
        self.date.map_or_else(
            || UNKNOWN_DATE.to_string(),
            |d| d.to_rfc3339_opts(SecondsFormat::AutoSi, true),
        )
    }
}

impl From<&imapdown_imap::Envelope> for Envelope {
    fn from(envelope: &imapdown_imap::Envelope) -> Self {
        Self {
            message_id: envelope.message_id.clone().unwrap_or_default(),
            in_reply_to: envelope.in_reply_to.clone().unwrap_or_default(),
            date: envelope.date.as_deref().and_then(parse_date),
            subject: envelope
                .subject
                .as_deref()
                .map(decode_words)
                .unwrap_or_default(),
            from: envelope
                .from
                .iter()
                .map(|a| Sender {
                    name: a.name.as_deref().map(decode_words),
                    mailbox: a.mailbox.clone().unwrap_or_default(),
                    host: a.host.clone().unwrap_or_default(),
                })
                .collect(),
        }
    }
}

/// Decodes RFC 2047 encoded words, leaving text that is not a valid header
/// value untouched.
fn decode_words(raw: &str) -> String {
    match mailparse::parse_header(format!("X: {raw}").as_bytes()) {
        Ok((header, _)) => header.get_value(),
        Err(_) => raw.to_string(),
    }
}

/// Decodes a mailbox name from IMAP modified UTF-7 (RFC 3501 5.1.3).
#[must_use]
pub fn decode_mailbox_name(raw: &str) -> String {
    utf7_imap::decode_utf7_imap(raw.to_string())
}

/// Parses an RFC 2822 Date header.
///
/// A trailing comment such as `(UTC)` or `(Pacific Standard Time)` is
/// dropped first; unparseable dates yield `None`.
#[must_use]
pub fn parse_date(raw: &str) -> Option<DateTime<FixedOffset>> {
    let mut raw = raw.trim();
    if raw.ends_with(')')
        && let Some(open) = raw.rfind('(')
    {
        raw = raw[..open].trim_end();
    }
    DateTime::parse_from_rfc2822(raw).ok()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn sender(name: Option<&str>, mailbox: &str, host: &str) -> Sender {
        Sender {
            name: name.map(str::to_string),
            mailbox: mailbox.to_string(),
            host: host.to_string(),
        }
    }

    #[test]
    fn from_with_name() {
        let envelope = Envelope {
            from: vec![sender(Some("Ann Lee"), "ann", "x.org"), sender(None, "bob", "y.org")],
            ..Envelope::default()
        };
        assert_eq!(envelope.format_from(), "Ann Lee <ann@x.org>");
    }

    #[test]
    fn from_without_name() {
        let envelope = Envelope {
            from: vec![sender(None, "ann", "x.org")],
            ..Envelope::default()
        };
        assert_eq!(envelope.format_from(), "<ann@x.org>");

        let envelope = Envelope {
            from: vec![sender(Some(""), "ann", "x.org")],
            ..Envelope::default()
        };
        assert_eq!(envelope.format_from(), "<ann@x.org>");
    }

    #[test]
    fn from_empty() {
        assert_eq!(Envelope::default().format_from(), "");
    }

    #[test]
    fn date_formats() {
        let envelope = Envelope {
            date: parse_date("Tue, 1 Oct 2024 10:00:00 +0000"),
            ..Envelope::default()
        };
        assert_eq!(envelope.format_date(), "2024-10-01T10:00:00Z");

        let envelope = Envelope {
            date: parse_date("Mon, 7 Feb 1994 21:52:25 -0800 (PST)"),
            ..Envelope::default()
        };
        assert_eq!(envelope.format_date(), "1994-02-07T21:52:25-08:00");
    }

    #[test]
    fn unknown_date_is_the_zero_time() {
        assert_eq!(parse_date("sometime last week"), None);
        assert_eq!(Envelope::default().format_date(), "0001-01-01T00:00:00Z");
    }

    #[test]
    fn decodes_encoded_subject_and_sender_name() {
        let raw = imapdown_imap::Envelope {
            subject: Some("=?UTF-8?B?SGVsbG8gV8O2cmxk?=".to_string()),
            from: vec![imapdown_imap::Address {
                name: Some("=?ISO-8859-1?Q?Andr=E9_Ruiz?=".to_string()),
                mailbox: Some("andre".to_string()),
                host: Some("x.org".to_string()),
                ..Default::default()
            }],
            ..Default::default()
        };

        let envelope = Envelope::from(&raw);
        assert_eq!(envelope.subject, "Hello Wörld");
        assert_eq!(envelope.from[0].name.as_deref(), Some("André Ruiz"));
        assert_eq!(envelope.format_from(), "André Ruiz <andre@x.org>");
    }

    #[test]
    fn plain_subject_is_unchanged() {
        assert_eq!(decode_words("Re: [list] weekly notes"), "Re: [list] weekly notes");
    }

    #[test]
    fn decodes_modified_utf7_mailbox_names() {
        assert_eq!(decode_mailbox_name("Entw&APw-rfe"), "Entwürfe");
        assert_eq!(decode_mailbox_name("INBOX"), "INBOX");
        assert_eq!(decode_mailbox_name("Tom &- Jerry"), "Tom & Jerry");
    }

    #[test]
    fn converts_protocol_envelope() {
        let raw = imapdown_imap::Envelope {
            date: Some("Wed, 2 Oct 2024 08:30:00 +0200".to_string()),
            subject: Some("Hello".to_string()),
            from: vec![imapdown_imap::Address {
                name: Some("Ann".to_string()),
                mailbox: Some("ann".to_string()),
                host: Some("x.org".to_string()),
                ..Default::default()
            }],
            in_reply_to: Some("<p@x>".to_string()),
            message_id: None,
            ..Default::default()
        };

        let envelope = Envelope::from(&raw);
        assert_eq!(envelope.message_id, "");
        assert_eq!(envelope.in_reply_to, "<p@x>");
        assert_eq!(envelope.subject, "Hello");
        assert_eq!(envelope.format_from(), "Ann <ann@x.org>");
        assert_eq!(envelope.format_date(), "2024-10-02T08:30:00+02:00");
    }
}
