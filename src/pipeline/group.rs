use std::future::Future;
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

use tokio::task::JoinHandle;

use crate::error::{Error, Result};
use crate::pipeline::cancel::CancelToken;

/// Runs the tasks of one pipeline (or of one parallel stage) and reduces
/// their outcomes to the first failure.
///
/// The group owns a child of the token it was created from. The first task
/// that fails cancels that child, so every sibling unblocks, while the parent
/// token is only affected through whoever waits on this group.
#[derive(Clone)]
pub struct TaskGroup {
    inner: Arc<GroupInner>,
}

struct GroupInner {
    cancel: CancelToken,
    parent: Option<TaskGroup>,
    handles: Mutex<Vec<JoinHandle<()>>>,
    first_error: OnceLock<Error>,
}

impl TaskGroup {
    pub fn new(parent: &CancelToken) -> Self {
        Self::with_parent(parent.child(), None)
    }

    /// A group whose token is a child of this group's token and whose first
    /// failure is also recorded here, before any of its tasks unwind.
    pub fn nested(&self) -> Self {
        Self::with_parent(self.inner.cancel.child(), Some(self.clone()))
    }

    fn with_parent(cancel: CancelToken, parent: Option<TaskGroup>) -> Self {
        Self {
            inner: Arc::new(GroupInner {
                cancel,
                parent,
                handles: Mutex::new(Vec::new()),
                first_error: OnceLock::new(),
            }),
        }
    }

    pub fn token(&self) -> &CancelToken {
        &self.inner.cancel
    }

    /// Launches `task` on the tokio runtime. An `Err` outcome is recorded
    /// through [`TaskGroup::fail`].
    pub fn spawn<F>(&self, stage: &'static str, task: F)
    where
        F: Future<Output = Result<()>> + Send + 'static,
    {
        self.spawn_holding(stage, (), task);
    }

    /// Like [`TaskGroup::spawn`], but `hold` is dropped only after a failure
    /// has been recorded. Stages hold a clone of their input so upstream
    /// cannot observe a closed channel, and report that instead, first.
    pub fn spawn_holding<H, F>(&self, stage: &'static str, hold: H, task: F)
    where
        H: Send + 'static,
        F: Future<Output = Result<()>> + Send + 'static,
    {
        let group = self.clone();
        let run = async move {
            if let Err(err) = task.await {
                group.fail(err);
            }
            drop(hold);
        };

        #[cfg(feature = "tracing")]
        let handle = {
            use tracing::Instrument;
            let span = tracing::info_span!("streampipe.stage", stage = stage);
            tokio::spawn(run.instrument(span))
        };

        #[cfg(not(feature = "tracing"))]
        let handle = {
            let _ = stage;
            tokio::spawn(run)
        };

        self.inner
            .handles
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(handle);
    }

    /// Records `err` if no error was recorded yet and cancels the group.
    pub fn fail(&self, err: Error) {
        if self.inner.first_error.set(err.clone()).is_err() {
            return;
        }

        #[cfg(feature = "tracing")]
        tracing::event!(
            tracing::Level::DEBUG,
            event = "streampipe.group.failed",
            error = %err,
            "streampipe.group.failed"
        );

        if let Some(parent) = &self.inner.parent {
            parent.fail(err.clone());
        }
        self.inner.cancel.cancel_with(err);
    }

    /// Waits for every task launched so far, including tasks launched while
    /// waiting, and returns the first recorded error.
    pub async fn wait(&self) -> Result<()> {
        loop {
            let handles = std::mem::take(
                &mut *self
                    .inner
                    .handles
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner),
            );
            if handles.is_empty() {
                break;
            }

            for handle in handles {
                if let Err(err) = handle.await {
                    #[cfg(feature = "tracing")]
                    tracing::event!(
                        tracing::Level::ERROR,
                        event = "streampipe.task.panicked",
                        error = %err,
                        "streampipe.task.panicked"
                    );
                    self.fail(Error::from(err));
                }
            }
        }

        match self.inner.first_error.get() {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}
