use std::sync::Arc;

use crate::pipeline::cancel::CancelToken;
use crate::pipeline::config::Config;
use crate::pipeline::group::TaskGroup;
use crate::pipeline::handoff::{self, Inlet};
use crate::pipeline::pipe::Pipe;

/// Output side of one pipeline stage.
///
/// A `Stream` is produced by exactly one source or stage and consumed by
/// exactly one stage or terminal consumer; every operator takes it by value.
/// All streams of one pipeline share the same [`TaskGroup`] and
/// [`CancelToken`], so a failure anywhere cancels the whole chain.
pub struct Stream<T> {
    pub(crate) inlet: Inlet<T>,
    pub(crate) group: TaskGroup,
    pub(crate) cancel: CancelToken,
    pub(crate) config: Config,
}

impl<T: Send + 'static> Stream<T> {
    pub(crate) fn new(inlet: Inlet<T>, group: TaskGroup, cancel: CancelToken) -> Self {
        Self {
            inlet,
            group,
            cancel,
            config: Config::default(),
        }
    }

    /// Token shared by every stage of this pipeline.
    pub fn token(&self) -> &CancelToken {
        &self.cancel
    }

    /// Sets the capacity of the channel the next stage built on this stream
    /// writes into.
    pub fn buffer(mut self, buffer: usize) -> Self {
        self.config = self.config.buffer(buffer);
        self
    }

    /// Replaces the config used for the next stage's output channel.
    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Runs `pipe` as a single task reading this stream.
    pub fn pipe<O, P>(self, pipe: P) -> Stream<O>
    where
        O: Send + 'static,
        P: Pipe<T, O> + 'static,
    {
        let (outlet, inlet) = handoff::channel(self.config.buffer_size());
        let Stream {
            inlet: input,
            group,
            cancel,
            ..
        } = self;

        let token = cancel.clone();
        let hold = input.clone();
        group.spawn_holding(pipe.stage_name(), hold, async move {
            pipe.process(input, outlet, token).await
        });

        Stream::new(inlet, group, cancel)
    }

    /// Runs `num` workers of `pipe` that share this stream and one output
    /// channel. Output order is unspecified.
    ///
    /// Workers live in a nested group: its first failure is recorded in the
    /// pipeline's group right away, which cancels every stage including
    /// the workers. The output closes after the last worker
    /// returns. `num` is clamped to at least one.
    pub fn par_pipe<O, P>(self, num: usize, pipe: P) -> Stream<O>
    where
        O: Send + 'static,
        P: Pipe<T, O> + 'static,
    {
        let (outlet, inlet) = handoff::channel(self.config.buffer_size());
        let Stream {
            inlet: input,
            group,
            cancel,
            ..
        } = self;

        let stage = pipe.stage_name();
        let pipe = Arc::new(pipe);
        let workers = group.nested();

        group.spawn(stage, async move {
            for _ in 0..num.max(1) {
                let pipe = pipe.clone();
                let input = input.clone();
                let outlet = outlet.clone();
                let token = workers.token().clone();
                let hold = input.clone();
                workers.spawn_holding(stage, hold, async move {
                    pipe.process(input, outlet, token).await
                });
            }
            drop(input);
            drop(outlet);

            workers.wait().await
        });

        Stream::new(inlet, group, cancel)
    }
}
