//! # streampipe
//!
//! **Composable, cancellable async pipelines in Rust.**
//!
//! `streampipe` builds element-at-a-time processing pipelines out of
//! independent stages. Every stage runs as its own tokio task, stages are
//! connected by bounded hand-off channels, and all stages of one pipeline
//! share a single cancellation token and a single failure slot.
//!
//! It is designed around a few hard guarantees:
//!
//! - exactly one error wins: the first one any stage reports
//! - every stage unblocks promptly on cancellation, even mid-send or mid-receive
//! - strict FIFO through sequential stages
//! - a channel is closed once, after its last writer is done
//!
//! ---
//!
//! ## Core Model
//!
//! A pipeline is a chain of streams:
//!
//! ```text
//! Source → Map → Filter → Batch → ... → ForEach / Reduce / Collect
//! ```
//!
//! Each operator consumes a [`Stream`] and returns a new one bound to the
//! *same* task group and token. The terminal consumer drains the last stream
//! and waits for every stage to finish.
//!
//! ---
//!
//! ## Example
//!
//! ```no_run
//! use streampipe::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> streampipe::error::Result<()> {
//!     let token = CancelToken::new();
//!
//!     let joined = Stream::from_slice(&token, vec![1, 2, 3, 4, 5])
//!         .map(|_, v: i32| async move { Ok(v.to_string()) })
//!         .reduce(String::new(), |acc, s| Ok(acc + &s))
//!         .await?;
//!
//!     assert_eq!(joined, "12345");
//!     Ok(())
//! }
//! ```
//!
//! ---
//!
//! ## Operators
//!
//! - Sources: [`Source::from_slice`], [`Source::from_iter`],
//!   [`Source::from_seq`], [`Source::from_seq2`], [`Source::from_channel`]
//! - Stages: `map`, `filter`, `filter_map`, `batch`, `batch_timeout`, `unbatch`
//! - Parallel stages: `par_map`, `par_filter`, `par_filter_map`
//!   (output order is unspecified)
//! - Custom stages: implement [`Pipe`] and call `Stream::pipe` / `Stream::par_pipe`
//! - Consumers: `for_each`, `reduce`, `collect`, and `all` (a
//!   `futures_util::Stream` of results)
//!
//! ---
//!
//! ## Buffering
//!
//! Channels are rendezvous channels by default. `stream.buffer(n)` sets the
//! capacity of the channel the *next* stage writes into; sources take it
//! through the builder: `Source::new(&token).buffer(n)`.
//!
//! ---
//!
//! ## Cancellation
//!
//! Pipelines stop when the caller's [`CancelToken`] fires. Deadlines live on
//! the token:
//!
//! ```no_run
//! use std::time::Duration;
//! use streampipe::prelude::*;
//!
//! # async fn demo() {
//! let token = CancelToken::new().with_timeout(Duration::from_secs(1));
//! let res = Stream::from_seq(&token, 0..)
//!     .for_each(|_, _: u64| Ok(()))
//!     .await;
//! assert!(res.unwrap_err().is_cancellation());
//! # }
//! ```
//!
//! ---
//!
//! ## Observability
//!
//! With the default `tracing` feature every stage task runs inside a
//! `streampipe.stage` span, and the crate emits `streampipe.group.failed`,
//! `streampipe.task.panicked`, `streampipe.downstream.closed` and
//! `streampipe.cancelled` events. Stages never log on their own.
//!
//! ```ignore
//! use tracing_subscriber::fmt;
//!
//! fn main() {
//!     fmt().with_env_filter("streampipe=debug").init();
//! }
//! ```
//!
//! ---
//!
//! ## Feature Flags
//!
//! - `tracing` *(default)*: enables tracing spans and events.
//!
//! [`Stream`]: pipeline::stream::Stream
//! [`CancelToken`]: pipeline::cancel::CancelToken
//! [`Pipe`]: pipeline::pipe::Pipe
//! [`Source::from_slice`]: source::Source::from_slice
//! [`Source::from_iter`]: source::Source::from_iter
//! [`Source::from_seq`]: source::Source::from_seq
//! [`Source::from_seq2`]: source::Source::from_seq2
//! [`Source::from_channel`]: source::Source::from_channel

pub mod error;
pub mod pipeline;
pub mod sink;
pub mod source;

pub mod prelude {
    //! Convenient imports for most `streampipe` users.

    pub use crate::error::{Error, Result};
    pub use crate::pipeline::cancel::CancelToken;
    pub use crate::pipeline::config::Config;
    pub use crate::pipeline::handoff::{Inlet, Outlet};
    pub use crate::pipeline::pipe::Pipe;
    pub use crate::pipeline::stream::Stream;
    pub use crate::source::iter::Yield;
    pub use crate::source::Source;
}
