//! Fan-out variants of the sequential adapters.
//!
//! Each operator runs `num` workers over one shared upstream and one shared
//! downstream channel. Output order follows worker completion, not input
//! order; pair these with a buffered upstream (`stream.buffer(n)`) to keep
//! the workers busy.

use std::future::Future;

use crate::error::{Error, Result};
use crate::pipeline::adapters::FilterMapPipe;
use crate::pipeline::cancel::CancelToken;
use crate::pipeline::stream::Stream;

impl<I: Send + 'static> Stream<I> {
    pub fn par_filter_map<O, F, Fut>(self, num: usize, f: F) -> Stream<O>
    where
        O: Send + 'static,
        F: Fn(CancelToken, I) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Option<O>>> + Send + 'static,
    {
        self.par_pipe(num, FilterMapPipe(f))
    }

    pub fn par_map<O, F, Fut>(self, num: usize, f: F) -> Stream<O>
    where
        O: Send + 'static,
        F: Fn(CancelToken, I) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<O>> + Send + 'static,
    {
        self.par_filter_map(num, move |cancel, item| {
            let mapped = f(cancel, item);
            async move { mapped.await.map(Some) }
        })
    }

    pub fn par_filter<F, Fut>(self, num: usize, f: F) -> Stream<I>
    where
        F: Fn(CancelToken, &I) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<bool>> + Send + 'static,
    {
        self.par_filter_map(num, move |cancel, item| {
            let keep = f(cancel, &item);
            async move {
                let keep = keep.await?;
                Ok::<_, Error>(keep.then_some(item))
            }
        })
    }
}
