use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use streampipe::error::{Error, Result};
use streampipe::pipeline::cancel::CancelToken;
use streampipe::pipeline::handoff::{Inlet, Outlet};
use streampipe::pipeline::pipe::Pipe;
use streampipe::pipeline::stream::Stream;

mod common;
use common::{int_range, producer};

/// Emits the prefix sums of its input.
struct RunningTotal;

#[async_trait]
impl Pipe<u32, u64> for RunningTotal {
    fn stage_name(&self) -> &'static str {
        "running_total"
    }

    async fn process(&self, input: Inlet<u32>, output: Outlet<u64>, cancel: CancelToken) -> Result<()> {
        let mut total = 0u64;
        while let Some(v) = input.recv(&cancel).await? {
            total += u64::from(v);
            output.push(&cancel, total).await?;
        }
        Ok(())
    }
}

/// Squares items and counts how many workers started.
struct Square {
    started: Arc<AtomicUsize>,
}

#[async_trait]
impl Pipe<u32, u32> for Square {
    async fn process(&self, input: Inlet<u32>, output: Outlet<u32>, cancel: CancelToken) -> Result<()> {
        self.started.fetch_add(1, Ordering::SeqCst);
        while let Some(v) = input.recv(&cancel).await? {
            output.push(&cancel, v * v).await?;
        }
        Ok(())
    }
}

/// Fails on the first item it sees.
struct Reject;

#[async_trait]
impl Pipe<u32, u32> for Reject {
    async fn process(&self, input: Inlet<u32>, _output: Outlet<u32>, cancel: CancelToken) -> Result<()> {
        match input.recv(&cancel).await? {
            Some(_) => Err(Error::pipeline("rejected")),
            None => Ok(()),
        }
    }
}

#[tokio::test]
async fn custom_stage_keeps_state_across_items() -> Result<()> {
    let token = CancelToken::new();
    let got = producer(&token, 5).pipe(RunningTotal).collect().await?;

    assert_eq!(got, vec![0, 1, 3, 6, 10]);
    Ok(())
}

#[test]
fn default_stage_name_is_pipe() {
    let square = Square {
        started: Arc::new(AtomicUsize::new(0)),
    };
    assert_eq!(Pipe::<u32, u32>::stage_name(&square), "pipe");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn par_pipe_starts_every_worker() -> Result<()> {
    let token = CancelToken::new();
    let started = Arc::new(AtomicUsize::new(0));

    let mut got = producer(&token, 30)
        .buffer(8)
        .par_pipe(
            3,
            Square {
                started: started.clone(),
            },
        )
        .collect()
        .await?;

    got.sort_unstable();
    let want: Vec<u32> = int_range(30).into_iter().map(|v| v * v).collect();
    assert_eq!(got, want);
    assert_eq!(started.load(Ordering::SeqCst), 3);
    Ok(())
}

#[tokio::test]
async fn custom_stage_error_fails_pipeline() {
    let token = CancelToken::new();
    let err = Stream::from_seq(&token, 0u32..)
        .pipe(Reject)
        .collect()
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Pipeline { context: "rejected" }));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn parallel_custom_stage_error_fails_pipeline() {
    let token = CancelToken::new();
    let err = Stream::from_seq(&token, 0u32..)
        .par_pipe(4, Reject)
        .collect()
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Pipeline { context: "rejected" }));
    assert!(!token.is_cancelled());
}
