//! Terminal consumers: drain a [`Stream`] and wait for the whole pipeline.

pub mod iter;

use crate::error::{Error, Result};
use crate::pipeline::cancel::CancelToken;
use crate::pipeline::stream::Stream;

impl<T: Send + 'static> Stream<T> {
    /// Calls `f` for every item in order, in the caller's task.
    ///
    /// The token is checked before each call, so a cancellation observed
    /// between items stops the loop even if `f` never fails. An error from
    /// `f` fails the pipeline. Returns once every stage has finished, with
    /// the first error any of them reported.
    pub async fn for_each<F>(self, mut f: F) -> Result<()>
    where
        F: FnMut(&CancelToken, T) -> Result<()>,
    {
        let Stream {
            inlet,
            group,
            cancel,
            ..
        } = self;

        let drained: Result<()> = async {
            while let Some(item) = inlet.recv(&cancel).await? {
                if let Some(err) = cancel.error() {
                    return Err(err);
                }
                f(&cancel, item)?;
            }
            Ok::<(), Error>(())
        }
        .await;

        if let Err(err) = drained {
            group.fail(err);
        }
        drop(inlet);
        group.wait().await
    }

    /// Folds the stream into one value. On error the partial accumulator is
    /// discarded.
    pub async fn reduce<R, F>(self, initial: R, mut f: F) -> Result<R>
    where
        F: FnMut(R, T) -> Result<R>,
    {
        let mut acc = Some(initial);
        self.for_each(|_, item| {
            if let Some(prev) = acc.take() {
                acc = Some(f(prev, item)?);
            }
            Ok(())
        })
        .await?;

        acc.ok_or(Error::pipeline("reduce accumulator lost"))
    }

    pub async fn collect(self) -> Result<Vec<T>> {
        self.reduce(Vec::new(), |mut acc, item| {
            acc.push(item);
            Ok(acc)
        })
        .await
    }
}
