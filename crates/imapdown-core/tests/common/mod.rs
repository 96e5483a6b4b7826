//! Scripted in-memory session for pipeline tests.

#![allow(dead_code)]

use async_trait::async_trait;
use imapdown_core::{
    CancelHandle, Envelope, Error, FetchError, FetchedBody, MailboxMessage, Result, Selection,
    Sender, Session,
};
use imapdown_imap::{SeqNum, SequenceSet, Uid};
use tokio::sync::mpsc;

/// A message in a fake mailbox.
#[derive(Debug, Clone)]
pub struct FakeMessage {
    pub envelope: Envelope,
    pub body: Vec<u8>,
}

/// Builds a message with a sender and a small RFC 5322 body.
pub fn message(message_id: &str, subject: &str) -> FakeMessage {
    let body = format!(
        "Message-ID: {message_id}\r\nSubject: {subject}\r\nFrom: Ann <ann@x.org>\r\n\r\nBody of {subject}.\r\n"
    );
    FakeMessage {
        envelope: Envelope {
            message_id: message_id.to_string(),
            in_reply_to: String::new(),
            date: imapdown_core::message::parse_date("Tue, 1 Oct 2024 10:00:00 +0000"),
            subject: subject.to_string(),
            from: vec![Sender {
                name: Some("Ann".to_string()),
                mailbox: "ann".to_string(),
                host: "x.org".to_string(),
            }],
        },
        body: body.into_bytes(),
    }
}

/// How a scripted fetch ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum End {
    /// Every message is sent, then success.
    Complete,
    /// Nothing is sent; the fetch reports "no matching messages".
    NoMatch,
    /// The first `n` messages are sent, then a protocol failure.
    FailAfter(usize),
}

/// A scripted mailbox.
#[derive(Debug, Clone)]
pub struct FakeMailbox {
    pub name: String,
    pub messages: Vec<FakeMessage>,
    pub envelopes: End,
    pub bodies: End,
    pub selectable: bool,
    /// Messages the body fetch sees instead of `messages`.
    pub replaced: Option<Vec<FakeMessage>>,
}

impl FakeMailbox {
    pub fn new(name: &str, messages: Vec<FakeMessage>) -> Self {
        Self {
            name: name.to_string(),
            messages,
            envelopes: End::Complete,
            bodies: End::Complete,
            selectable: true,
            replaced: None,
        }
    }

    pub fn envelopes_end(mut self, end: End) -> Self {
        self.envelopes = end;
        self
    }

    pub fn bodies_end(mut self, end: End) -> Self {
        self.bodies = end;
        self
    }

    pub fn unselectable(mut self) -> Self {
        self.selectable = false;
        self
    }

    pub fn replaced_before_bodies(mut self, messages: Vec<FakeMessage>) -> Self {
        self.replaced = Some(messages);
        self
    }
}

/// In-memory [`Session`] replaying scripted mailboxes.
#[derive(Debug, Default)]
pub struct FakeSession {
    mailboxes: Vec<FakeMailbox>,
    selected: Option<usize>,
    cancel_during_bodies: Option<(String, CancelHandle)>,
    /// Names passed to `select_read_only`, in call order.
    pub selects: Vec<String>,
    /// Mailboxes whose envelopes were fetched.
    pub envelope_fetches: Vec<String>,
    /// Sequence sets requested by body fetches.
    pub body_fetches: Vec<String>,
    pub logged_out: bool,
}

impl FakeSession {
    pub fn new(mailboxes: Vec<FakeMailbox>) -> Self {
        Self {
            mailboxes,
            ..Self::default()
        }
    }

    /// Fires `handle` right after the first body of `mailbox` is queued.
    pub fn cancel_during_bodies(mut self, mailbox: &str, handle: CancelHandle) -> Self {
        self.cancel_during_bodies = Some((mailbox.to_string(), handle));
        self
    }

    fn current(&self, selection: &Selection) -> std::result::Result<&FakeMailbox, FetchError> {
        self.selected
            .map(|i| &self.mailboxes[i])
            .filter(|m| m.name == selection.name())
            .ok_or_else(|| FetchError::Protocol(format!("{} is not selected", selection.name())))
    }
}

fn seq(index: usize) -> SeqNum {
    SeqNum::new(u32::try_from(index + 1).unwrap()).unwrap()
}

fn contains(set: &SequenceSet, seq: SeqNum) -> bool {
    set.ranges()
        .iter()
        .any(|r| seq >= r.start && r.end.is_none_or(|end| seq <= end))
}

fn mailbox_message(index: usize, message: &FakeMessage) -> MailboxMessage {
    MailboxMessage {
        seq: seq(index),
        uid: Uid::new(u32::try_from(index + 100).unwrap()),
        envelope: message.envelope.clone(),
    }
}

fn finish(end: End, sent: usize) -> std::result::Result<(), FetchError> {
    match end {
        End::Complete => Ok(()),
        End::NoMatch => Err(FetchError::NoMatchingMessages),
        End::FailAfter(n) if sent >= n => {
            Err(FetchError::Protocol("connection reset by peer".to_string()))
        }
        End::FailAfter(_) => Ok(()),
    }
}

#[async_trait]
impl Session for FakeSession {
    async fn list_mailboxes(&mut self) -> Result<Vec<String>> {
        Ok(self.mailboxes.iter().map(|m| m.name.clone()).collect())
    }

    async fn select_read_only(&mut self, name: &str) -> Result<Selection> {
        self.selects.push(name.to_string());
        let index = self
            .mailboxes
            .iter()
            .position(|m| m.name == name && m.selectable)
            .ok_or_else(|| Error::Protocol {
                op: "select mailbox",
                message: format!("{name}: no such mailbox"),
            })?;
        self.selected = Some(index);
        let exists = u32::try_from(self.mailboxes[index].messages.len()).unwrap();
        Ok(Selection::new(name, exists))
    }

    async fn fetch_envelopes(
        &mut self,
        selection: &Selection,
        tx: mpsc::Sender<MailboxMessage>,
    ) -> std::result::Result<(), FetchError> {
        let mailbox = self.current(selection)?.clone();
        self.envelope_fetches.push(mailbox.name.clone());
        if mailbox.envelopes == End::NoMatch {
            return Err(FetchError::NoMatchingMessages);
        }

        let mut sent = 0;
        for (index, message) in mailbox.messages.iter().enumerate() {
            if let End::FailAfter(n) = mailbox.envelopes
                && sent == n
            {
                break;
            }
            tx.send(mailbox_message(index, message))
                .await
                .map_err(|_| FetchError::ConsumerGone)?;
            sent += 1;
        }
        finish(mailbox.envelopes, sent)
    }

    async fn fetch_bodies(
        &mut self,
        selection: &Selection,
        set: &SequenceSet,
        tx: mpsc::Sender<FetchedBody>,
    ) -> std::result::Result<(), FetchError> {
        let mailbox = self.current(selection)?.clone();
        self.body_fetches.push(set.to_string());
        if mailbox.bodies == End::NoMatch {
            return Err(FetchError::NoMatchingMessages);
        }
        let messages = mailbox.replaced.as_ref().unwrap_or(&mailbox.messages);

        let mut sent = 0;
        for (index, message) in messages.iter().enumerate() {
            if !contains(set, seq(index)) {
                continue;
            }
            if let End::FailAfter(n) = mailbox.bodies
                && sent == n
            {
                break;
            }
            let fetched =
                FetchedBody::from_bytes(mailbox_message(index, message), message.body.clone());
            tx.send(fetched).await.map_err(|_| FetchError::ConsumerGone)?;
            sent += 1;

            if let Some((name, handle)) = &self.cancel_during_bodies
                && *name == mailbox.name
            {
                handle.cancel();
            }
        }
        finish(mailbox.bodies, sent)
    }

    async fn logout(&mut self) -> Result<()> {
        self.logged_out = true;
        Ok(())
    }
}
