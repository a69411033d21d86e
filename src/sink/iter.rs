use futures_util::stream;

use crate::error::{Error, Result};
use crate::pipeline::stream::Stream;

impl<T: Send + 'static> Stream<T> {
    /// Bridges the pipeline into a [`futures_util::Stream`] of results.
    ///
    /// Items arrive as `Ok`. If the token fires or any stage fails, one final
    /// `Err` carrying the pipeline error is yielded and the stream ends, so a
    /// failure is never mistaken for a clean end of input. An item received
    /// just before the token fired is still yielded, ahead of that `Err`.
    /// Dropping the returned stream early makes upstream writers see a
    /// closed channel and unwind.
    pub fn all(self) -> impl futures_util::Stream<Item = Result<T>> + Send {
        stream::unfold(Some(self), |state| async move {
            let pipeline = state?;
            match pipeline.inlet.recv(&pipeline.cancel).await {
                Ok(Some(item)) => Some((Ok(item), Some(pipeline))),
                Ok(None) => pipeline
                    .finish_clean()
                    .await
                    .map(|err| (Err(err), None)),
                Err(err) => pipeline.finish(err).await.map(|err| (Err(err), None)),
            }
        })
    }

    /// Drops the read side, waits for every stage and picks the error to
    /// surface: the group's first error, falling back to `observed`.
    async fn finish(self, observed: Error) -> Option<Error> {
        let Stream { inlet, group, .. } = self;
        drop(inlet);
        Some(group.wait().await.err().unwrap_or(observed))
    }

    async fn finish_clean(self) -> Option<Error> {
        let Stream { inlet, group, .. } = self;
        drop(inlet);
        group.wait().await.err()
    }
}
