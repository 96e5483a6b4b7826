//! [`Session`] over an `imapdown-imap` connection.

use std::future::Future;

use async_trait::async_trait;
use imapdown_imap::{
    Authenticated, Client, Config, FetchAttribute, FetchedMessage, ImapStream, NotAuthenticated,
    Selected, SequenceSet,
};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::mpsc;

use super::{FetchError, FetchedBody, Selection, Session};
use crate::message::{Envelope, MailboxMessage};
use crate::{Error, Result};

/// A connected server that has not been logged in to yet.
pub struct ImapConnection<S = ImapStream> {
    client: Client<S, NotAuthenticated>,
}

impl ImapConnection {
    /// Dials the server and reads its greeting.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Connection`] if the server cannot be reached, the
    /// TLS handshake fails or the greeting is a rejection.
    pub async fn connect(config: &Config) -> Result<Self> {
        let address = config.address();
        let connection_error = |source| Error::Connection {
            address: address.clone(),
            source,
        };

        let stream = imapdown_imap::connection::connect(config)
            .await
            .map_err(connection_error)?;
        let client = Client::from_stream(stream)
            .await
            .map_err(connection_error)?;
        tracing::debug!(%address, "connected");
        Ok(Self { client })
    }
}

impl<S> ImapConnection<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Wraps a client that has already read the greeting.
    #[must_use]
    pub const fn from_client(client: Client<S, NotAuthenticated>) -> Self {
        Self { client }
    }

    /// Logs in with LOGIN.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Auth`] if the server rejects the credentials.
    pub async fn login(self, user: &str, password: &str) -> Result<ImapSession<S>> {
        let client = self
            .client
            .login(user, password)
            .await
            .map_err(|source| Error::Auth {
                user: user.to_string(),
                source,
            })?;
        tracing::debug!(user, "logged in");
        Ok(ImapSession::from_client(client))
    }
}

enum State<S> {
    Authenticated(Client<S, Authenticated>),
    Selected(Client<S, Selected>),
    Gone,
}

/// Logged-in IMAP session.
///
/// Failing to open a mailbox or losing sync with the server mid-fetch ends
/// the connection; later calls fail and [`Session::logout`] does nothing.
pub struct ImapSession<S = ImapStream> {
    state: State<S>,
}

impl<S> ImapSession<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Wraps an authenticated client.
    #[must_use]
    pub const fn from_client(client: Client<S, Authenticated>) -> Self {
        Self {
            state: State::Authenticated(client),
        }
    }

    /// Returns the client holding `selection`, or an error if another
    /// mailbox is open.
    fn selected(
        &mut self,
        selection: &Selection,
    ) -> std::result::Result<&mut Client<S, Selected>, FetchError> {
        let open = match &self.state {
            State::Selected(client) => Some(client.mailbox().to_owned()),
            _ => None,
        };
        match (&mut self.state, open) {
            (State::Selected(client), Some(open)) if open == selection.name() => Ok(client),
            (_, Some(open)) => Err(FetchError::Protocol(format!(
                "{:?} is not selected; {open:?} is",
                selection.name()
            ))),
            (_, None) => Err(FetchError::Protocol(format!(
                "{:?} is not selected",
                selection.name()
            ))),
        }
    }

    async fn fetch<T, F>(
        &mut self,
        selection: &Selection,
        set: &SequenceSet,
        items: &[FetchAttribute],
        tx: mpsc::Sender<T>,
        convert: F,
    ) -> std::result::Result<(), FetchError>
    where
        F: FnMut(FetchedMessage) -> std::result::Result<Option<T>, FetchError>,
    {
        let client = self.selected(selection)?;
        let (raw_tx, raw_rx) = mpsc::channel(1);
        let fetch = client.fetch_streaming(set, items, raw_tx);
        let result = forward(fetch, raw_rx, tx, convert).await;

        // A tagged NO or BAD leaves the connection usable; anything else may
        // have stopped mid-response.
        if let Err(err) = &result
            && !matches!(err, Forwarded::Server(_))
        {
            self.state = State::Gone;
        }
        result.map_err(FetchError::from)
    }
}

/// Where a forwarded fetch failed.
enum Forwarded {
    Server(String),
    Client(FetchError),
}

impl From<Forwarded> for FetchError {
    fn from(err: Forwarded) -> Self {
        match err {
            Forwarded::Server(text) => Self::from_server_text(&text),
            Forwarded::Client(err) => err,
        }
    }
}

/// Drives `fetch`, converting each raw message it queues on `raw_rx` and
/// passing the result on to `tx`.
///
/// A conversion failure or a closed `tx` stops the pump; dropping `raw_rx`
/// then stops the fetch.
async fn forward<T, F>(
    fetch: impl Future<Output = imapdown_imap::Result<()>>,
    mut raw_rx: mpsc::Receiver<FetchedMessage>,
    tx: mpsc::Sender<T>,
    mut convert: F,
) -> std::result::Result<(), Forwarded>
where
    F: FnMut(FetchedMessage) -> std::result::Result<Option<T>, FetchError>,
{
    let pump = async move {
        while let Some(raw) = raw_rx.recv().await {
            if let Some(item) = convert(raw)? {
                tx.send(item).await.map_err(|_| FetchError::ConsumerGone)?;
            }
        }
        Ok::<_, FetchError>(())
    };

    let (fetched, pumped) = tokio::join!(fetch, pump);
    pumped.map_err(Forwarded::Client)?;
    fetched.map_err(|err| match err {
        imapdown_imap::Error::No(text) | imapdown_imap::Error::Bad(text) => {
            Forwarded::Server(text)
        }
        imapdown_imap::Error::ReceiverClosed => Forwarded::Client(FetchError::ConsumerGone),
        other => Forwarded::Client(FetchError::Protocol(other.to_string())),
    })
}

/// Builds a [`MailboxMessage`], skipping unsolicited FETCH responses that
/// carry no envelope.
fn to_message(raw: &FetchedMessage) -> Option<MailboxMessage> {
    let Some(envelope) = raw.envelope() else {
        tracing::debug!(seq = %raw.seq, "skipping FETCH response without envelope");
        return None;
    };
    Some(MailboxMessage {
        seq: raw.seq,
        uid: raw.uid(),
        envelope: Envelope::from(envelope),
    })
}

#[async_trait]
impl<S> Session for ImapSession<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    async fn list_mailboxes(&mut self) -> Result<Vec<String>> {
        let listed = match &mut self.state {
            State::Authenticated(client) => client.list("", "*").await,
            State::Selected(client) => client.list("", "*").await,
            State::Gone => return Err(Error::protocol("list mailboxes", "session closed")),
        }
        .map_err(|err| Error::protocol("list mailboxes", err))?;

        Ok(listed
            .into_iter()
            .map(|item| item.mailbox.into_string())
            .collect())
    }

    async fn select_read_only(&mut self, name: &str) -> Result<Selection> {
        let examined = match std::mem::replace(&mut self.state, State::Gone) {
            State::Authenticated(client) => client.examine(name).await,
            State::Selected(client) => client.examine(name).await,
            State::Gone => return Err(Error::protocol("select mailbox", "session closed")),
        };
        let (client, status) = examined.map_err(|err| Error::protocol("select mailbox", err))?;
        self.state = State::Selected(client);
        Ok(Selection::new(name, status.exists))
    }

    async fn fetch_envelopes(
        &mut self,
        selection: &Selection,
        tx: mpsc::Sender<MailboxMessage>,
    ) -> std::result::Result<(), FetchError> {
        let items = [FetchAttribute::Envelope, FetchAttribute::Uid];
        self.fetch(
            selection,
            &SequenceSet::all_messages(),
            &items,
            tx,
            |raw| Ok(to_message(&raw)),
        )
        .await
    }

    async fn fetch_bodies(
        &mut self,
        selection: &Selection,
        set: &SequenceSet,
        tx: mpsc::Sender<FetchedBody>,
    ) -> std::result::Result<(), FetchError> {
        let items = [
            FetchAttribute::Envelope,
            FetchAttribute::BodyPeek { section: None },
        ];
        self.fetch(selection, set, &items, tx, |mut raw| {
            let Some(message) = to_message(&raw) else {
                return Ok(None);
            };
            let body = raw.take_body().ok_or_else(|| {
                FetchError::Protocol(format!("server returned no body for message {}", raw.seq))
            })?;
            Ok(Some(FetchedBody::from_bytes(message, body)))
        })
        .await
    }

    async fn logout(&mut self) -> Result<()> {
        let result = match std::mem::replace(&mut self.state, State::Gone) {
            State::Authenticated(client) => client.logout().await,
            State::Selected(client) => client.logout().await,
            State::Gone => return Ok(()),
        };
        result.map_err(|err| Error::protocol("logout", err))
    }
}
