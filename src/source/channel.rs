use kanal::AsyncReceiver;
use tokio::sync::oneshot;

use crate::pipeline::cancel::CancelToken;
use crate::pipeline::group::TaskGroup;
use crate::pipeline::handoff::Inlet;
use crate::pipeline::stream::Stream;
use crate::source::Source;

impl Source {
    /// Fronts an externally owned queue without copying it into a new
    /// channel. The caller keeps the sending side and closes the stream by
    /// dropping every sender.
    ///
    /// A supervising task waits until the stream has been drained or the
    /// token fires, and then reports the token's error if it has one, so a
    /// producer that cancels and then closes the queue still fails the
    /// pipeline. The builder's buffer setting does not apply here.
    pub fn from_channel<T>(self, rx: AsyncReceiver<T>) -> Stream<T>
    where
        T: Send + 'static,
    {
        let group = TaskGroup::new(&self.cancel);
        let cancel = group.token().clone();
        let (drained_tx, drained_rx) = oneshot::channel::<()>();

        let token = cancel.clone();
        group.spawn("from_channel", async move {
            tokio::select! {
                _ = token.cancelled() => {}
                _ = drained_rx => {}
            }
            match token.error() {
                Some(err) => Err(err),
                None => Ok(()),
            }
        });

        Stream::new(Inlet::with_drain_signal(rx, drained_tx), group, cancel)
    }
}

impl<T: Send + 'static> Stream<T> {
    pub fn from_channel(cancel: &CancelToken, rx: AsyncReceiver<T>) -> Self {
        Source::new(cancel).from_channel(rx)
    }
}
