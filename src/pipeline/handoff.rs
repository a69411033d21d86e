//! Bounded hand-off channels between stages and the two suspension points
//! every stage goes through: [`push`] and [`Inlet::recv`].

use std::sync::Arc;

use kanal::{AsyncReceiver, AsyncSender};
use tokio::sync::oneshot;

use crate::error::{Error, Result};
use crate::pipeline::cancel::CancelToken;

/// Creates a hand-off channel of the given capacity. A capacity of `0` is a
/// rendezvous: every send waits for a matching receive.
pub fn channel<T>(capacity: usize) -> (Outlet<T>, Inlet<T>) {
    let (tx, rx) = kanal::bounded_async(capacity);
    (Outlet { tx }, Inlet::new(rx))
}

/// Write side of a hand-off channel.
///
/// The channel closes when the last `Outlet` clone is dropped; parallel
/// workers each hold a clone, so the close happens after the last of them
/// returns.
pub struct Outlet<T> {
    tx: AsyncSender<T>,
}

impl<T> Clone for Outlet<T> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

impl<T> Outlet<T> {
    pub async fn push(&self, cancel: &CancelToken, item: T) -> Result<()> {
        push(cancel, self, item).await
    }
}

/// Sends `item`, racing the send against the cancellation signal.
///
/// A cancelled token always wins, even if the channel has room, so no stage
/// keeps producing after cancellation. An item is never lost once this
/// returns `Ok`.
pub async fn push<T>(cancel: &CancelToken, outlet: &Outlet<T>, item: T) -> Result<()> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => {
            #[cfg(feature = "tracing")]
            tracing::event!(tracing::Level::TRACE, event = "streampipe.cancelled", where_ = "send", "streampipe.cancelled");
            Err(cancel.error().unwrap_or(Error::Cancelled))
        },
        res = outlet.tx.send(item) => res.map_err(|_| {
            #[cfg(feature = "tracing")]
            tracing::event!(tracing::Level::DEBUG, event = "streampipe.downstream.closed", "streampipe.downstream.closed");
            Error::pipeline("downstream closed")
        }),
    }
}

/// Read side of a hand-off channel.
///
/// Clones share the same queue; each item is received by exactly one of
/// them.
pub struct Inlet<T> {
    rx: AsyncReceiver<T>,
    drained: Option<Arc<oneshot::Sender<()>>>,
}

impl<T> Clone for Inlet<T> {
    fn clone(&self) -> Self {
        Self {
            rx: self.rx.clone(),
            drained: self.drained.clone(),
        }
    }
}

impl<T> Inlet<T> {
    pub(crate) fn new(rx: AsyncReceiver<T>) -> Self {
        Self { rx, drained: None }
    }

    /// Wraps a foreign receiver. `drained` fires (by being dropped) once the
    /// last clone of this inlet is gone.
    pub(crate) fn with_drain_signal(rx: AsyncReceiver<T>, drained: oneshot::Sender<()>) -> Self {
        Self {
            rx,
            drained: Some(Arc::new(drained)),
        }
    }

    /// Receives the next item. `Ok(None)` means upstream closed and every
    /// buffered item has been consumed.
    ///
    /// Dropping the returned future can discard an item a writer already
    /// handed over, and that writer's `push` has returned `Ok`. Only the
    /// cancellation branch here drops it, and then the pipeline is failing
    /// anyway. Custom stages must not race `recv` against their own timers
    /// in a `select!`. Pin one receive and keep it armed across iterations
    /// instead, as `batch_timeout` does.
    pub async fn recv(&self, cancel: &CancelToken) -> Result<Option<T>> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                #[cfg(feature = "tracing")]
                tracing::event!(tracing::Level::TRACE, event = "streampipe.cancelled", where_ = "recv", "streampipe.cancelled");
                Err(cancel.error().unwrap_or(Error::Cancelled))
            },
            msg = self.rx.recv() => Ok(msg.ok()),
        }
    }
}
