use std::sync::Arc;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Boxed user error carried by [`Error::Stage`].
pub type StageError = Arc<dyn std::error::Error + Send + Sync + 'static>;

/// The single error kind that flows through a pipeline.
///
/// A pipeline retains exactly one of these: the first one observed by its
/// task group. It is `Clone` because the cancellation token hands the same
/// cause to every stage that is unblocked by it.
#[derive(Error, Debug, Clone)]
pub enum Error {
    #[error("pipeline cancelled")]
    Cancelled,

    #[error("pipeline deadline exceeded")]
    DeadlineExceeded,

    #[error("pipeline error: {context}")]
    Pipeline { context: &'static str },

    #[error("stage error: {0}")]
    Stage(StageError),

    #[error("task join error: {0}")]
    Join(Arc<tokio::task::JoinError>),
}

impl Error {
    pub fn pipeline(context: &'static str) -> Self {
        Self::Pipeline { context }
    }

    /// Wraps an arbitrary user error returned from a stage callback.
    ///
    /// ```
    /// use std::io;
    /// use streampipe::error::Error;
    ///
    /// let err = Error::stage(io::Error::new(io::ErrorKind::Other, "disk full"));
    /// assert_eq!(err.to_string(), "stage error: disk full");
    ///
    /// let Error::Stage(inner) = &err else { unreachable!() };
    /// assert!(inner.downcast_ref::<io::Error>().is_some());
    /// ```
    pub fn stage<E>(error: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync + 'static>>,
    {
        Self::Stage(Arc::from(error.into()))
    }

    /// True for errors produced by the token rather than by user logic.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, Self::Cancelled | Self::DeadlineExceeded)
    }
}

impl From<tokio::task::JoinError> for Error {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::Join(Arc::new(err))
    }
}
