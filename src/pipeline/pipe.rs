use async_trait::async_trait;

use crate::error::Result;
use crate::pipeline::cancel::CancelToken;
use crate::pipeline::handoff::{Inlet, Outlet};

/// One stage of a pipeline: reads from `input`, writes to `output`.
///
/// Implementations should use [`Inlet::recv`] and [`Outlet::push`] for every
/// hand-off so they unblock when `cancel` fires, and return `Ok(())` once
/// `recv` reports that upstream closed. Returning drops `output`, which is
/// what closes the downstream channel.
///
/// The same instance may be driven by several workers at once (see
/// [`Stream::par_pipe`](crate::pipeline::stream::Stream::par_pipe)).
#[async_trait]
pub trait Pipe<I: Send + 'static, O: Send + 'static>: Send + Sync {
    fn stage_name(&self) -> &'static str {
        "pipe"
    }

    async fn process(&self, input: Inlet<I>, output: Outlet<O>, cancel: CancelToken)
        -> Result<()>;
}
