//! Implementation for the authenticated state.

use tokio::io::{AsyncRead, AsyncWrite};

use super::states::{Authenticated, Selected};
use super::{Client, Completion};
use crate::Result;
use crate::command::Command;
use crate::parser::UntaggedResponse;
use crate::types::{ListResponse, Mailbox, MailboxStatus, ResponseCode, Status};

impl<S> Client<S, Authenticated>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Lists mailboxes matching a pattern.
    pub async fn list(&mut self, reference: &str, pattern: &str) -> Result<Vec<ListResponse>> {
        list(self, reference, pattern).await
    }

    /// Opens a mailbox read-only with EXAMINE.
    ///
    /// Consumes self and returns a selected client on success.
    pub async fn examine(self, mailbox: &str) -> Result<(Client<S, Selected>, MailboxStatus)> {
        examine(self, mailbox).await
    }
}

/// Runs LIST from either the authenticated or the selected state.
pub(super) async fn list<S, State>(
    client: &mut Client<S, State>,
    reference: &str,
    pattern: &str,
) -> Result<Vec<ListResponse>>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let done = client
        .execute(&Command::List {
            reference: reference.to_string(),
            pattern: pattern.to_string(),
        })
        .await?;

    Ok(done
        .untagged
        .into_iter()
        .filter_map(|response| match response {
            UntaggedResponse::List(item) => Some(item),
            _ => None,
        })
        .collect())
}

/// Runs EXAMINE from either the authenticated or the selected state.
pub(super) async fn examine<S, State>(
    mut client: Client<S, State>,
    mailbox: &str,
) -> Result<(Client<S, Selected>, MailboxStatus)>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let done = client
        .execute(&Command::Examine {
            mailbox: Mailbox::new(mailbox),
        })
        .await?;

    let status = mailbox_status(&done);
    tracing::debug!(mailbox, exists = status.exists, "examined");

    let selected = Selected {
        mailbox: mailbox.to_string(),
        status: status.clone(),
    };
    Ok((client.transition(selected), status))
}

/// Collects the mailbox snapshot from EXAMINE's responses.
fn mailbox_status(done: &Completion) -> MailboxStatus {
    let mut status = MailboxStatus {
        read_only: matches!(done.code, Some(ResponseCode::ReadOnly)),
        ..MailboxStatus::default()
    };

    for response in &done.untagged {
        match response {
            UntaggedResponse::Exists(n) => status.exists = *n,
            UntaggedResponse::Recent(n) => status.recent = *n,
            UntaggedResponse::Condition {
                status: Status::Ok,
                code: Some(code),
                ..
            } => match code {
                ResponseCode::UidNext(uid) => status.uid_next = Some(*uid),
                ResponseCode::UidValidity(v) => status.uid_validity = Some(*v),
                _ => {}
            },
            _ => {}
        }
    }

    status
}
