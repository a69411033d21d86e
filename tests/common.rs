#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use streampipe::error::{Error, Result};
use streampipe::pipeline::cancel::CancelToken;
use streampipe::pipeline::handoff::{Inlet, Outlet};
use streampipe::pipeline::pipe::Pipe;
use streampipe::pipeline::stream::Stream;

/// User error returned by failing test callbacks.
#[derive(Debug, thiserror::Error)]
#[error("boom at item {0}")]
pub struct Boom(pub u32);

pub fn boom() -> Error {
    boom_at(0)
}

pub fn boom_at(item: u32) -> Error {
    Error::stage(Boom(item))
}

/// The [`Boom`] carried by `err`, if it is one.
pub fn as_boom(err: &Error) -> Option<&Boom> {
    match err {
        Error::Stage(inner) => inner.downcast_ref::<Boom>(),
        _ => None,
    }
}

pub fn is_boom(err: &Error) -> bool {
    as_boom(err).is_some()
}

pub fn int_range(n: u32) -> Vec<u32> {
    (0..n).collect()
}

/// Emits `0..n` through the callback sink, stopping when the stream
/// refuses more items.
pub fn producer(cancel: &CancelToken, n: u32) -> Stream<u32> {
    Stream::from_iter(cancel, move |sink| async move {
        for i in 0..n {
            if !sink.emit(i).await {
                break;
            }
        }
        Ok(())
    })
}

/// Emits `0..n` but fails with [`boom`] at `n / 2`.
pub fn failing_producer(cancel: &CancelToken, n: u32) -> Stream<u32> {
    Stream::from_iter(cancel, move |sink| async move {
        for i in 0..n {
            if i >= n / 2 {
                return Err(boom());
            }
            if !sink.emit(i).await {
                break;
            }
        }
        Ok(())
    })
}

/// Pass-through stage that records whether it saw the token fire.
pub struct TrackingPipe {
    pub was_cancelled: Arc<AtomicBool>,
}

#[async_trait]
impl Pipe<u32, u32> for TrackingPipe {
    fn stage_name(&self) -> &'static str {
        "tracking"
    }

    async fn process(
        &self,
        input: Inlet<u32>,
        output: Outlet<u32>,
        cancel: CancelToken,
    ) -> Result<()> {
        loop {
            let item = match input.recv(&cancel).await {
                Ok(Some(item)) => item,
                Ok(None) => return Ok(()),
                Err(err) => {
                    self.was_cancelled.store(true, Ordering::SeqCst);
                    return Err(err);
                }
            };
            output.push(&cancel, item).await?;
        }
    }
}
