use std::future::Future;
use std::sync::{Arc, OnceLock};

use crate::error::{Error, Result};
use crate::pipeline::cancel::CancelToken;
use crate::pipeline::handoff::Outlet;
use crate::pipeline::stream::Stream;
use crate::source::Source;

/// Sink handed to a [`Source::from_iter`] producer.
///
/// Each [`Yield::emit`] is one hand-off into the stream. Once an emit fails
/// (cancellation, or nobody reads the stream any more) every later emit
/// returns `false` without blocking, and the producer should stop.
pub struct Yield<T> {
    outlet: Outlet<T>,
    cancel: CancelToken,
    failed: Arc<OnceLock<Error>>,
}

impl<T: Send + 'static> Yield<T> {
    pub async fn emit(&self, item: T) -> bool {
        if self.failed.get().is_some() {
            return false;
        }
        match self.outlet.push(&self.cancel, item).await {
            Ok(()) => true,
            Err(err) => {
                let _ = self.failed.set(err);
                false
            }
        }
    }

    pub fn token(&self) -> &CancelToken {
        &self.cancel
    }
}

impl Source {
    /// Drives `produce` with a [`Yield`] sink.
    ///
    /// The source fails with `produce`'s error if it returns one, otherwise
    /// with the error that made an emit fail. The stream closes when
    /// `produce` returns.
    pub fn from_iter<T, F, Fut>(self, produce: F) -> Stream<T>
    where
        T: Send + 'static,
        F: FnOnce(Yield<T>) -> Fut + Send + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        self.launch("from_iter", move |outlet, cancel| {
            let failed = Arc::new(OnceLock::new());
            let sink = Yield {
                outlet,
                cancel,
                failed: failed.clone(),
            };
            let run = produce(sink);

            async move {
                run.await?;
                match failed.get() {
                    Some(err) => Err(err.clone()),
                    None => Ok(()),
                }
            }
        })
    }

    pub fn from_slice<T>(self, items: Vec<T>) -> Stream<T>
    where
        T: Send + 'static,
    {
        self.from_iter(move |sink| async move {
            for item in items {
                if !sink.emit(item).await {
                    break;
                }
            }
            Ok(())
        })
    }
}

impl<T: Send + 'static> Stream<T> {
    /// Shortcut for `Source::new(cancel).from_iter(produce)`.
    pub fn from_iter<F, Fut>(cancel: &CancelToken, produce: F) -> Self
    where
        F: FnOnce(Yield<T>) -> Fut + Send + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        Source::new(cancel).from_iter(produce)
    }

    pub fn from_slice(cancel: &CancelToken, items: Vec<T>) -> Self {
        Source::new(cancel).from_slice(items)
    }
}
