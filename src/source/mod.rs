//! Entry points that turn external data into a [`Stream`].
//!
//! Every source starts a new pipeline: it creates the [`TaskGroup`] that all
//! later stages share, bound to a child of the caller's token.

pub mod channel;
pub mod iter;
pub mod seq;

use std::future::Future;

use crate::error::Result;
use crate::pipeline::cancel::CancelToken;
use crate::pipeline::config::Config;
use crate::pipeline::group::TaskGroup;
use crate::pipeline::handoff::{self, Outlet};
use crate::pipeline::stream::Stream;

/// Builder for pipeline sources.
///
/// ```no_run
/// use streampipe::prelude::*;
///
/// # async fn demo() -> streampipe::error::Result<()> {
/// let token = CancelToken::new();
/// let doubled = Source::new(&token)
///     .buffer(8)
///     .from_slice(vec![1, 2, 3])
///     .map(|_, v| async move { Ok(v * 2) })
///     .collect()
///     .await?;
/// assert_eq!(doubled, vec![2, 4, 6]);
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct Source {
    cancel: CancelToken,
    config: Config,
}

impl Source {
    pub fn new(cancel: &CancelToken) -> Self {
        Self {
            cancel: cancel.clone(),
            config: Config::default(),
        }
    }

    /// Capacity of the source's output channel.
    pub fn buffer(mut self, buffer: usize) -> Self {
        self.config = self.config.buffer(buffer);
        self
    }

    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Starts a pipeline whose first task is `produce`, writing into the
    /// returned stream.
    fn launch<T, F, Fut>(self, stage: &'static str, produce: F) -> Stream<T>
    where
        T: Send + 'static,
        F: FnOnce(Outlet<T>, CancelToken) -> Fut,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        let group = TaskGroup::new(&self.cancel);
        let cancel = group.token().clone();
        let (outlet, inlet) = handoff::channel(self.config.buffer_size());

        group.spawn(stage, produce(outlet, cancel.clone()));

        Stream::new(inlet, group, cancel)
    }
}
