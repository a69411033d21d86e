use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::{Error, Result};
use crate::pipeline::cancel::CancelToken;
use crate::pipeline::handoff::{Inlet, Outlet};
use crate::pipeline::pipe::Pipe;
use crate::pipeline::stream::Stream;

/// filter_map: I -> Option<O>
pub struct FilterMapPipe<F>(pub F);

#[async_trait]
impl<I, O, F, Fut> Pipe<I, O> for FilterMapPipe<F>
where
    I: Send + 'static,
    O: Send + 'static,
    F: Fn(CancelToken, I) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Option<O>>> + Send + 'static,
{
    fn stage_name(&self) -> &'static str {
        "filter_map"
    }

    async fn process(&self, input: Inlet<I>, output: Outlet<O>, cancel: CancelToken) -> Result<()> {
        while let Some(item) = input.recv(&cancel).await? {
            let Some(mapped) = (self.0)(cancel.clone(), item).await? else {
                continue;
            };
            output.push(&cancel, mapped).await?;
        }
        Ok(())
    }
}

/// Groups items into vectors of `size`; the last batch may be shorter.
pub struct BatchPipe {
    size: usize,
}

impl BatchPipe {
    pub fn new(size: usize) -> Self {
        assert!(size > 0, "batch size must be greater than zero");
        Self { size }
    }
}

#[async_trait]
impl<T: Send + 'static> Pipe<T, Vec<T>> for BatchPipe {
    fn stage_name(&self) -> &'static str {
        "batch"
    }

    async fn process(
        &self,
        input: Inlet<T>,
        output: Outlet<Vec<T>>,
        cancel: CancelToken,
    ) -> Result<()> {
        let mut batch = Vec::with_capacity(self.size);
        while let Some(item) = input.recv(&cancel).await? {
            batch.push(item);
            if batch.len() == self.size {
                let full = std::mem::replace(&mut batch, Vec::with_capacity(self.size));
                output.push(&cancel, full).await?;
            }
        }

        if !batch.is_empty() {
            output.push(&cancel, batch).await?;
        }
        Ok(())
    }
}

/// Like [`BatchPipe`], but a non-empty batch is also flushed once `timeout`
/// has passed since its first item arrived.
pub struct BatchTimeoutPipe {
    size: usize,
    timeout: Duration,
}

impl BatchTimeoutPipe {
    pub fn new(size: usize, timeout: Duration) -> Self {
        assert!(size > 0, "batch size must be greater than zero");
        Self { size, timeout }
    }
}

#[async_trait]
impl<T: Send + 'static> Pipe<T, Vec<T>> for BatchTimeoutPipe {
    fn stage_name(&self) -> &'static str {
        "batch_timeout"
    }

    async fn process(
        &self,
        input: Inlet<T>,
        output: Outlet<Vec<T>>,
        cancel: CancelToken,
    ) -> Result<()> {
        let mut batch = Vec::with_capacity(self.size);
        let flush_at = tokio::time::sleep(self.timeout);
        tokio::pin!(flush_at);

        // One receive stays armed across timer flushes: dropping it after a
        // sender handed an item over would lose that item.
        let next = input.recv(&cancel);
        tokio::pin!(next);

        loop {
            tokio::select! {
                msg = &mut next => {
                    next.set(input.recv(&cancel));
                    let Some(item) = msg? else { break; };
                    if batch.is_empty() {
                        flush_at.as_mut().reset(tokio::time::Instant::now() + self.timeout);
                    }
                    batch.push(item);
                    if batch.len() < self.size {
                        continue;
                    }
                }
                _ = &mut flush_at, if !batch.is_empty() => {}
            }

            let ready = std::mem::replace(&mut batch, Vec::with_capacity(self.size));
            output.push(&cancel, ready).await?;
        }

        if !batch.is_empty() {
            output.push(&cancel, batch).await?;
        }
        Ok(())
    }
}

/// Flattens vectors back into single items, preserving order.
pub struct UnBatchPipe;

#[async_trait]
impl<T: Send + 'static> Pipe<Vec<T>, T> for UnBatchPipe {
    fn stage_name(&self) -> &'static str {
        "unbatch"
    }

    async fn process(
        &self,
        input: Inlet<Vec<T>>,
        output: Outlet<T>,
        cancel: CancelToken,
    ) -> Result<()> {
        while let Some(batch) = input.recv(&cancel).await? {
            for item in batch {
                output.push(&cancel, item).await?;
            }
        }
        Ok(())
    }
}

impl<I: Send + 'static> Stream<I> {
    /// Maps and filters in one step: `Ok(None)` drops the item. The first
    /// callback error fails the pipeline. Order is preserved.
    pub fn filter_map<O, F, Fut>(self, f: F) -> Stream<O>
    where
        O: Send + 'static,
        F: Fn(CancelToken, I) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Option<O>>> + Send + 'static,
    {
        self.pipe(FilterMapPipe(f))
    }

    pub fn map<O, F, Fut>(self, f: F) -> Stream<O>
    where
        O: Send + 'static,
        F: Fn(CancelToken, I) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<O>> + Send + 'static,
    {
        self.filter_map(move |cancel, item| {
            let mapped = f(cancel, item);
            async move { mapped.await.map(Some) }
        })
    }

    /// Keeps items for which `f` resolves to `true`. The predicate sees the
    /// item by reference, so the future it returns cannot borrow it.
    pub fn filter<F, Fut>(self, f: F) -> Stream<I>
    where
        F: Fn(CancelToken, &I) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<bool>> + Send + 'static,
    {
        self.filter_map(move |cancel, item| {
            let keep = f(cancel, &item);
            async move {
                let keep = keep.await?;
                Ok::<_, Error>(keep.then_some(item))
            }
        })
    }

    /// # Panics
    ///
    /// Panics if `size` is zero.
    pub fn batch(self, size: usize) -> Stream<Vec<I>> {
        self.pipe(BatchPipe::new(size))
    }

    /// # Panics
    ///
    /// Panics if `size` is zero.
    pub fn batch_timeout(self, size: usize, timeout: Duration) -> Stream<Vec<I>> {
        self.pipe(BatchTimeoutPipe::new(size, timeout))
    }
}

impl<I: Send + 'static> Stream<Vec<I>> {
    pub fn unbatch(self) -> Stream<I> {
        self.pipe(UnBatchPipe)
    }
}
