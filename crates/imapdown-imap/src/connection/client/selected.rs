//! Implementation for the selected state.

use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::mpsc;

use super::states::Selected;
use super::{Client, check_status};
use crate::command::{Command, FetchAttribute};
use crate::parser::{Envelope, FetchItem, Response, UntaggedResponse};
use crate::types::{ListResponse, MailboxStatus, SeqNum, SequenceSet, Status, Uid};
use crate::{Error, Result};

/// One FETCH response, delivered as soon as it has been read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedMessage {
    /// Sequence number the server reported.
    pub seq: SeqNum,
    /// Data items returned for the message.
    pub items: Vec<FetchItem>,
}

impl FetchedMessage {
    /// Returns the UID, if it was fetched.
    #[must_use]
    pub fn uid(&self) -> Option<Uid> {
        self.items.iter().find_map(|item| match item {
            FetchItem::Uid(uid) => Some(*uid),
            _ => None,
        })
    }

    /// Returns the envelope, if it was fetched.
    #[must_use]
    pub fn envelope(&self) -> Option<&Envelope> {
        self.items.iter().find_map(|item| match item {
            FetchItem::Envelope(envelope) => Some(envelope.as_ref()),
            _ => None,
        })
    }

    /// Takes the whole-message body (`BODY[]`) out of the item list.
    pub fn take_body(&mut self) -> Option<Vec<u8>> {
        self.items.iter_mut().find_map(|item| match item {
            FetchItem::Body {
                section: None,
                data,
            } => data.take(),
            _ => None,
        })
    }
}

impl<S> Client<S, Selected>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Returns the name of the selected mailbox.
    #[must_use]
    pub fn mailbox(&self) -> &str {
        self.state.mailbox()
    }

    /// Returns the snapshot reported when the mailbox was opened.
    #[must_use]
    pub const fn status(&self) -> &MailboxStatus {
        self.state.status()
    }

    /// Lists mailboxes matching a pattern.
    pub async fn list(&mut self, reference: &str, pattern: &str) -> Result<Vec<ListResponse>> {
        super::authenticated::list(self, reference, pattern).await
    }

    /// Opens another mailbox read-only without closing this one first.
    pub async fn examine(self, mailbox: &str) -> Result<(Self, MailboxStatus)> {
        super::authenticated::examine(self, mailbox).await
    }

    /// Fetches `items` for `sequence`, handing each message to `tx` as soon
    /// as its response has been read.
    ///
    /// Returns once the server completes the command. A NO or BAD completion
    /// surfaces as [`Error::No`] or [`Error::Bad`] carrying the server text.
    /// If `tx`'s receiver is dropped mid-fetch the call stops reading and
    /// returns [`Error::ReceiverClosed`]; the connection is then mid-response
    /// and should be discarded.
    pub async fn fetch_streaming(
        &mut self,
        sequence: &SequenceSet,
        items: &[FetchAttribute],
        tx: mpsc::Sender<FetchedMessage>,
    ) -> Result<()> {
        let tag = self
            .send(&Command::Fetch {
                sequence: sequence.clone(),
                items: items.to_vec(),
            })
            .await?;

        loop {
            match self.next_response().await? {
                Response::Tagged {
                    tag: done,
                    status,
                    text,
                    ..
                } if done == tag => return check_status(status, text),
                Response::Untagged(UntaggedResponse::Fetch { seq, items }) => {
                    tx.send(FetchedMessage { seq, items })
                        .await
                        .map_err(|_| Error::ReceiverClosed)?;
                }
                Response::Untagged(UntaggedResponse::Condition {
                    status: Status::Bye,
                    text,
                    ..
                }) => return Err(Error::Bye(text)),
                Response::Untagged(UntaggedResponse::Expunge(seq)) => {
                    tracing::debug!(%seq, mailbox = self.mailbox(), "expunged during fetch");
                }
                other => tracing::trace!(response = ?other, "ignoring response during fetch"),
            }
        }
    }
}
