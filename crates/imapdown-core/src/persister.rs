//! Body fetch and persist: stream pending bodies, hash them, write records.

use std::collections::HashMap;
use std::io;
use std::pin::Pin;
use std::task::{Context, Poll, ready};

use blake2::Digest;
use tokio::io::{AsyncRead, AsyncReadExt, ReadBuf};
use tokio::sync::mpsc;

use crate::key::KeyDeriver;
use crate::message::decode_mailbox_name;
use crate::queue::{self, Cancel};
use crate::record::{Blake2b256, Record};
use crate::scanner::Scan;
use crate::session::{FetchError, FetchedBody, Session};
use crate::store::Store;
use crate::{Error, Result};

/// Reader that hashes everything read through it.
pub struct HashingReader<R> {
    inner: R,
    hasher: Blake2b256,
}

impl<R> HashingReader<R> {
    /// Wraps `inner`.
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            hasher: Blake2b256::new(),
        }
    }

    /// Returns the digest of the bytes read so far.
    #[must_use]
    pub fn finish(self) -> Vec<u8> {
        self.hasher.finalize().to_vec()
    }
}

impl<R: AsyncRead + Unpin> AsyncRead for HashingReader<R> {
    fn poll_read(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let before = buf.filled().len();
        let this = &mut *self;
        ready!(Pin::new(&mut this.inner).poll_read(cx, buf))?;
        this.hasher.update(&buf.filled()[before..]);
        Poll::Ready(Ok(()))
    }
}

/// Counts from persisting one mailbox.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Persisted {
    /// Records written.
    pub written: usize,
    /// Bodies skipped because their key was stored earlier in the fetch.
    pub duplicates: usize,
}

/// Fetches the bodies of `scan`'s pending messages and writes one record per
/// new key.
///
/// A server reporting "no matching messages" ends the mailbox with whatever
/// was written.
///
/// # Errors
///
/// Returns an error if a body cannot be read, a record cannot be encoded or
/// written, the fetch fails, or `cancel` fires before the fetch status is
/// collected.
pub async fn persist<Sess, St>(
    session: &mut Sess,
    store: &St,
    deriver: &KeyDeriver,
    scan: &Scan,
    capacity: usize,
    cancel: &Cancel,
) -> Result<Persisted>
where
    Sess: Session,
    St: Store,
{
    if scan.pending.is_empty() {
        return Ok(Persisted::default());
    }

    let mailbox = scan.selection.name();
    let folder = decode_mailbox_name(mailbox);
    let expected: HashMap<_, _> = scan.pending.iter().map(|p| (p.seq, p.key)).collect();
    let set = scan.pending_set();
    tracing::debug!(mailbox, count = scan.pending.len(), "fetching bodies");

    let (tx, mut rx) = mpsc::channel::<FetchedBody>(capacity.max(1));
    let (persisted, status) = queue::run(
        cancel,
        session.fetch_bodies(&scan.selection, &set, tx),
        async move {
            let mut persisted = Persisted::default();
            while let Some(FetchedBody { message, body }) = rx.recv().await {
                let mut reader = HashingReader::new(body);
                let mut bytes = Vec::new();
                reader
                    .read_to_end(&mut bytes)
                    .await
                    .map_err(|err| Error::protocol("read body", err))?;
                let hash = reader.finish();

                let key = deriver.derive(&message.envelope.message_id);
                if let Some(scanned) = expected.get(&message.seq)
                    && *scanned != key
                {
                    tracing::warn!(
                        mailbox,
                        seq = %message.seq,
                        %scanned,
                        fetched = %key,
                        "message changed between scan and fetch"
                    );
                }

                if store.exists(&key).await? {
                    persisted.duplicates += 1;
                    continue;
                }

                let record = Record::new(&key, &folder, &message.envelope, bytes.len(), hash);
                store.write(&key, &record.encode(&bytes)?).await?;
                persisted.written += 1;
                tracing::trace!(mailbox, %key, size = bytes.len(), "stored");
            }
            Ok(persisted)
        },
    )
    .await?;

    match status {
        Ok(()) => {}
        Err(FetchError::NoMatchingMessages) => {
            tracing::debug!(mailbox, "no matching messages");
        }
        Err(err) => return Err(Error::protocol("fetch bodies", err)),
    }

    tracing::debug!(
        mailbox,
        written = persisted.written,
        duplicates = persisted.duplicates,
        "persisted"
    );
    Ok(persisted)
}
