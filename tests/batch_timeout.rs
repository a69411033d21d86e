use std::time::Duration;

use streampipe::error::Result;
use streampipe::pipeline::cancel::CancelToken;
use streampipe::pipeline::stream::Stream;

mod common;
use common::int_range;

#[tokio::test]
async fn slow_upstream_flushes_partial_batches() -> Result<()> {
    let token = CancelToken::new();
    let got = Stream::from_iter(&token, |sink| async move {
        for i in 0..4u32 {
            if !sink.emit(i).await {
                break;
            }
            tokio::time::sleep(Duration::from_millis(60)).await;
        }
        Ok(())
    })
    .batch_timeout(10, Duration::from_millis(10))
    .collect()
    .await?;

    assert_eq!(got, vec![vec![0], vec![1], vec![2], vec![3]]);
    Ok(())
}

#[tokio::test]
async fn fast_upstream_fills_batches_before_timeout() -> Result<()> {
    let token = CancelToken::new();
    let got = tokio::time::timeout(
        Duration::from_millis(500),
        Stream::from_slice(&token, int_range(7))
            .batch_timeout(3, Duration::from_secs(30))
            .collect(),
    )
    .await
    .expect("close did not flush the tail batch")?;

    assert_eq!(got, vec![vec![0, 1, 2], vec![3, 4, 5], vec![6]]);
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn timer_flushes_never_lose_handed_over_items() -> Result<()> {
    let token = CancelToken::new();
    let num = 3000u32;
    let got = Stream::from_iter(&token, move |sink| async move {
        for i in 0..num {
            if !sink.emit(i).await {
                break;
            }
            if i % 2 == 1 {
                tokio::time::sleep(Duration::from_micros(900)).await;
            }
        }
        Ok(())
    })
    .batch_timeout(10_000, Duration::from_millis(1))
    .unbatch()
    .collect()
    .await?;

    assert_eq!(got.len(), num as usize);
    assert_eq!(got, int_range(num));
    Ok(())
}

#[test]
#[should_panic(expected = "batch size must be greater than zero")]
fn batch_timeout_of_zero_panics() {
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("tokio runtime");
    rt.block_on(async {
        let token = CancelToken::new();
        let _ = Stream::from_slice(&token, vec![1u32]).batch_timeout(0, Duration::from_secs(1));
    });
}
