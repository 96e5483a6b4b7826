//! Bounded streaming queue with a deferred terminal status, and the
//! cancellation signal checked when the status is collected.

use std::future::Future;

use tokio::sync::{oneshot, watch};

use crate::{Error, Result};

/// Default capacity of a fetch queue.
pub const QUEUE_CAPACITY: usize = 10;

/// Receiving side of the cancellation signal.
#[derive(Debug, Clone)]
pub struct Cancel {
    rx: watch::Receiver<bool>,
}

/// Sending side of the cancellation signal.
#[derive(Debug)]
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

/// Creates a linked handle and signal.
#[must_use]
pub fn cancel_pair() -> (CancelHandle, Cancel) {
    let (tx, rx) = watch::channel(false);
    (CancelHandle { tx }, Cancel { rx })
}

impl CancelHandle {
    /// Fires the signal. Firing twice is harmless.
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }
}

impl Cancel {
    /// A signal that never fires.
    #[must_use]
    pub fn never() -> Self {
        cancel_pair().1
    }

    /// Returns true once the signal has fired.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves once the signal fires; never resolves if its handle was
    /// dropped without firing.
    pub async fn cancelled(&self) {
        let mut rx = self.rx.clone();
        if rx.wait_for(|fired| *fired).await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

/// Runs one producer/consumer exchange over a bounded queue.
///
/// `producer` pushes items into the queue and resolves to its terminal
/// status; `consumer` drains the queue until it closes. Both are polled on
/// the current task, so either may borrow from the caller. Once the consumer
/// is done its error, if any, is returned first. Otherwise the producer's
/// status is collected, unless `cancel` has fired by then.
///
/// # Errors
///
/// Returns the consumer's error, or [`Error::Cancelled`].
pub async fn run<S, R>(
    cancel: &Cancel,
    producer: impl Future<Output = S>,
    consumer: impl Future<Output = Result<R>>,
) -> Result<(R, S)> {
    let (status_tx, status_rx) = oneshot::channel();

    let produce = async move {
        let _ = status_tx.send(producer.await);
    };
    let ((), consumed) = tokio::join!(produce, consumer);
    let value = consumed?;

    tokio::select! {
        biased;
        () = cancel.cancelled() => Err(Error::Cancelled),
        status = status_rx => status
            .map(|status| (value, status))
            .map_err(|_| Error::protocol("collect fetch status", "producer exited without a status")),
    }
}
