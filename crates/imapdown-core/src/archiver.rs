//! Orchestration: enumerate mailboxes, then scan and persist each in turn.

use crate::key::KeyDeriver;
use crate::persister::persist;
use crate::queue::{Cancel, QUEUE_CAPACITY};
use crate::scanner::scan;
use crate::session::Session;
use crate::store::Store;
use crate::{Error, Result};

/// Tunables for an archive run.
#[derive(Debug, Clone)]
pub struct ArchiveOptions {
    /// Capacity of each fetch queue; values below 1 are treated as 1.
    pub queue_capacity: usize,
    /// Maps Message-IDs to store keys.
    pub deriver: KeyDeriver,
}

impl Default for ArchiveOptions {
    fn default() -> Self {
        Self {
            queue_capacity: QUEUE_CAPACITY,
            deriver: KeyDeriver::new(),
        }
    }
}

/// Counts for one mailbox.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MailboxSummary {
    /// Mailbox name.
    pub name: String,
    /// Messages whose key was already stored.
    pub existing: usize,
    /// Messages the scan found missing.
    pub pending: usize,
    /// Records written.
    pub written: usize,
}

/// Counts for a whole run, one entry per mailbox in processing order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Summary {
    /// Per-mailbox counts.
    pub mailboxes: Vec<MailboxSummary>,
}

impl Summary {
    /// Total messages already stored.
    #[must_use]
    pub fn existing(&self) -> usize {
        self.mailboxes.iter().map(|m| m.existing).sum()
    }

    /// Total messages found missing.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.mailboxes.iter().map(|m| m.pending).sum()
    }

    /// Total records written.
    #[must_use]
    pub fn written(&self) -> usize {
        self.mailboxes.iter().map(|m| m.written).sum()
    }
}

/// Lists every mailbox the session can see, in server order.
///
/// # Errors
///
/// Returns the session's error, or [`Error::Cancelled`] if `cancel` fires
/// before the listing completes.
pub async fn enumerate<Sess: Session>(session: &mut Sess, cancel: &Cancel) -> Result<Vec<String>> {
    tokio::select! {
        biased;
        () = cancel.cancelled() => Err(Error::Cancelled),
        listed = session.list_mailboxes() => listed,
    }
}

/// Archives every mailbox of a session into a store.
#[derive(Debug)]
pub struct Archiver<St> {
    store: St,
    options: ArchiveOptions,
}

impl<St: Store> Archiver<St> {
    /// Creates an archiver with default options.
    #[must_use]
    pub fn new(store: St) -> Self {
        Self::with_options(store, ArchiveOptions::default())
    }

    /// Creates an archiver with explicit options.
    #[must_use]
    pub const fn with_options(store: St, options: ArchiveOptions) -> Self {
        Self { store, options }
    }

    /// Returns the store records are written to.
    pub const fn store(&self) -> &St {
        &self.store
    }

    /// Archives every mailbox, then logs out.
    ///
    /// Cancellation is checked between mailboxes and whenever a fetch's
    /// status is collected, so a run may finish draining the current fetch
    /// before it stops.
    ///
    /// # Errors
    ///
    /// Returns the first error; failures inside a mailbox are wrapped in
    /// [`Error::Mailbox`]. Nothing is retried.
    pub async fn run<Sess: Session>(
        &self,
        session: &mut Sess,
        cancel: &Cancel,
    ) -> Result<Summary> {
        let names = enumerate(session, cancel).await?;
        tracing::debug!(count = names.len(), "mailboxes listed");

        let mut summary = Summary::default();
        for name in names {
            if cancel.is_cancelled() {
                return Err(Error::Cancelled);
            }
            let mailbox = self
                .archive_mailbox(session, &name, cancel)
                .await
                .map_err(|err| err.in_mailbox(&name))?;
            tracing::info!(
                mailbox = %mailbox.name,
                existing = mailbox.existing,
                pending = mailbox.pending,
                written = mailbox.written,
                "mailbox archived"
            );
            summary.mailboxes.push(mailbox);
        }

        session.logout().await?;
        tracing::info!(
            mailboxes = summary.mailboxes.len(),
            existing = summary.existing(),
            written = summary.written(),
            "archive complete"
        );
        Ok(summary)
    }

    async fn archive_mailbox<Sess: Session>(
        &self,
        session: &mut Sess,
        name: &str,
        cancel: &Cancel,
    ) -> Result<MailboxSummary> {
        let capacity = self.options.queue_capacity;
        let deriver = &self.options.deriver;

        let scanned = scan(session, &self.store, deriver, name, capacity, cancel).await?;
        let persisted = persist(session, &self.store, deriver, &scanned, capacity, cancel).await?;

        Ok(MailboxSummary {
            name: name.to_string(),
            existing: scanned.existing + persisted.duplicates,
            pending: scanned.pending.len(),
            written: persisted.written,
        })
    }
}
