//! Type-state client connection.
//!
//! The connection moves through `NotAuthenticated`, `Authenticated` and
//! `Selected`; each state only exposes the commands valid in it.

#![allow(clippy::missing_errors_doc)]

mod authenticated;
mod not_authenticated;
mod selected;
mod states;

use tokio::io::{AsyncRead, AsyncWrite};

pub use self::selected::FetchedMessage;
pub use self::states::{Authenticated, NotAuthenticated, Selected};
use super::framed::FramedStream;
use crate::command::{Command, TagGenerator};
use crate::parser::{Response, ResponseParser, UntaggedResponse};
use crate::types::{Status, Tag};
use crate::{Error, Result};

/// IMAP client connection with type-state.
pub struct Client<S, State> {
    pub(crate) stream: FramedStream<S>,
    pub(crate) tag_gen: TagGenerator,
    pub(crate) capabilities: Vec<String>,
    pub(crate) state: State,
}

impl<S, State: std::fmt::Debug> std::fmt::Debug for Client<S, State> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("state", &self.state)
            .field("capabilities", &self.capabilities)
            .finish_non_exhaustive()
    }
}

/// Outcome of a completed command: the untagged responses it produced and
/// the response code of its tagged completion.
pub(crate) struct Completion {
    pub(crate) untagged: Vec<UntaggedResponse>,
    pub(crate) code: Option<crate::types::ResponseCode>,
}

impl<S, State> Client<S, State>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Returns the capabilities the server advertised.
    #[must_use]
    pub fn capabilities(&self) -> &[String] {
        &self.capabilities
    }

    /// Returns true if the server advertised `cap` (case-insensitive).
    #[must_use]
    pub fn has_capability(&self, cap: &str) -> bool {
        self.capabilities.iter().any(|c| c.eq_ignore_ascii_case(cap))
    }

    /// Moves the connection into another state.
    pub(crate) fn transition<Next>(self, state: Next) -> Client<S, Next> {
        Client {
            stream: self.stream,
            tag_gen: self.tag_gen,
            capabilities: self.capabilities,
            state,
        }
    }

    /// Sends a command and returns its tag.
    pub(crate) async fn send(&mut self, command: &Command) -> Result<Tag> {
        let tag = self.tag_gen.next();
        if command.is_sensitive() {
            tracing::trace!(%tag, "sending credentials");
        } else {
            tracing::trace!(%tag, ?command, "sending command");
        }
        self.stream.write_command(&command.serialize(&tag)).await?;
        Ok(tag)
    }

    /// Reads the next response, skipping untagged lines this client cannot
    /// parse. Unparseable FETCH data is an error, not skipped.
    pub(crate) async fn next_response(&mut self) -> Result<Response> {
        loop {
            let raw = self.stream.read_response().await?;
            match ResponseParser::parse(&raw) {
                Ok(response) => return Ok(response),
                Err(err) if raw.starts_with(b"* ") && !is_fetch_data(&raw) => {
                    tracing::debug!(error = %err, "skipping unparseable untagged response");
                }
                Err(err) => return Err(err),
            }
        }
    }

    /// Runs a command to completion, collecting its untagged responses.
    pub(crate) async fn execute(&mut self, command: &Command) -> Result<Completion> {
        let tag = self.send(command).await?;
        let mut untagged = Vec::new();

        loop {
            match self.next_response().await? {
                Response::Tagged {
                    tag: done,
                    status,
                    code,
                    text,
                } if done == tag => {
                    check_status(status, text)?;
                    return Ok(Completion { untagged, code });
                }
                Response::Tagged { tag: other, .. } => {
                    tracing::warn!(%other, "ignoring completion for unknown tag");
                }
                Response::Untagged(UntaggedResponse::Capability(caps)) => {
                    self.capabilities = caps;
                }
                Response::Untagged(UntaggedResponse::Condition {
                    status: Status::Bye,
                    text,
                    ..
                }) => return Err(Error::Bye(text)),
                Response::Untagged(response) => untagged.push(response),
                Response::Continuation { .. } => {
                    return Err(Error::Protocol(
                        "unexpected continuation request".to_string(),
                    ));
                }
            }
        }
    }

    /// Ends the session.
    ///
    /// The server's BYE and a connection dropped right after it are both
    /// treated as a clean logout.
    pub async fn logout(mut self) -> Result<()> {
        let tag = self.send(&Command::Logout).await?;
        loop {
            match self.next_response().await {
                Ok(Response::Tagged { tag: done, .. }) if done == tag => return Ok(()),
                Ok(_) => {}
                Err(Error::Io(err)) if err.kind() == std::io::ErrorKind::UnexpectedEof => {
                    return Ok(());
                }
                Err(err) => return Err(err),
            }
        }
    }
}

/// Returns true for an untagged `* <n> FETCH` line.
fn is_fetch_data(raw: &[u8]) -> bool {
    let Some(rest) = raw.strip_prefix(b"* ") else {
        return false;
    };
    let digits = rest.iter().take_while(|b| b.is_ascii_digit()).count();
    digits > 0
        && rest[digits..]
            .get(..7)
            .is_some_and(|word| word.eq_ignore_ascii_case(b" FETCH "))
}

/// Maps a tagged status to a result.
pub(crate) fn check_status(status: Status, text: String) -> Result<()> {
    match status {
        Status::Ok | Status::PreAuth => Ok(()),
        Status::No => Err(Error::No(text)),
        Status::Bad => Err(Error::Bad(text)),
        Status::Bye => Err(Error::Bye(text)),
    }
}
