//! Dedup scan: which messages in a mailbox still need their bodies.

use std::collections::HashSet;

use imapdown_imap::{SeqNum, SequenceSet};
use tokio::sync::mpsc;

use crate::key::{KeyDeriver, StoreKey};
use crate::queue::{self, Cancel};
use crate::session::{FetchError, Selection, Session};
use crate::store::Store;
use crate::{Error, Result};

/// A message whose key is not in the store yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pending {
    /// Sequence number within the scan's selection.
    pub seq: SeqNum,
    /// Key derived from the envelope seen during the scan.
    pub key: StoreKey,
}

/// Outcome of scanning one mailbox.
#[derive(Debug)]
pub struct Scan {
    /// The selection the sequence numbers belong to.
    pub selection: Selection,
    /// Messages already archived.
    pub existing: usize,
    /// Messages to fetch, in stream order.
    pub pending: Vec<Pending>,
}

impl Scan {
    /// Sequence set covering every pending message.
    #[must_use]
    pub fn pending_set(&self) -> SequenceSet {
        SequenceSet::from_seq_nums(self.pending.iter().map(|p| p.seq))
    }
}

/// Opens `mailbox` read-only and partitions its messages into archived and
/// pending by looking up each envelope's key in `store`.
///
/// A server reporting "no matching messages" yields an empty scan.
///
/// # Errors
///
/// Returns an error if the mailbox cannot be opened, the envelope fetch
/// fails, the store cannot be queried, or `cancel` fires before the fetch
/// status is collected.
pub async fn scan<Sess, St>(
    session: &mut Sess,
    store: &St,
    deriver: &KeyDeriver,
    mailbox: &str,
    capacity: usize,
    cancel: &Cancel,
) -> Result<Scan>
where
    Sess: Session,
    St: Store,
{
    let selection = session.select_read_only(mailbox).await?;
    tracing::debug!(mailbox, exists = selection.exists(), "selected");
    if selection.exists() == 0 {
        return Ok(Scan {
            selection,
            existing: 0,
            pending: Vec::new(),
        });
    }

    let (tx, mut rx) = mpsc::channel(capacity.max(1));
    let ((existing, pending), status) = queue::run(
        cancel,
        session.fetch_envelopes(&selection, tx),
        async move {
            let mut existing = 0;
            let mut pending = Vec::new();
            let mut seen = HashSet::new();
            while let Some(message) = rx.recv().await {
                let key = deriver.derive(&message.envelope.message_id);
                if store.exists(&key).await? {
                    existing += 1;
                } else if seen.insert(message.seq) {
                    pending.push(Pending {
                        seq: message.seq,
                        key,
                    });
                }
            }
            Ok((existing, pending))
        },
    )
    .await?;

    match status {
        Ok(()) => {}
        Err(FetchError::NoMatchingMessages) => {
            tracing::debug!(mailbox, "no matching messages");
            return Ok(Scan {
                selection,
                existing,
                pending: Vec::new(),
            });
        }
        Err(err) => return Err(Error::protocol("fetch envelopes", err)),
    }

    tracing::debug!(mailbox, existing, pending = pending.len(), "scanned");
    Ok(Scan {
        selection,
        existing,
        pending,
    })
}
