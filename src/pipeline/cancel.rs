use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, OnceLock, PoisonError, Weak};
use std::time::Duration;

use tokio::sync::Notify;
use tokio::time::Instant;

use crate::error::Error;

/// Shared cancellation signal of one pipeline instance.
///
/// Cloning is cheap; all clones observe the same state. Once cancelled the
/// token keeps the first cause it was given and hands a clone of it to every
/// caller of [`CancelToken::error`].
#[derive(Clone, Default)]
pub struct CancelToken {
    inner: Arc<Inner>,
}

#[derive(Default)]
struct Inner {
    cancelled: AtomicBool,
    notify: Notify,
    reason: OnceLock<Error>,
    deadline: Option<Instant>,
    children: Mutex<Vec<Weak<Inner>>>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancels with [`Error::Cancelled`].
    pub fn cancel(&self) {
        self.cancel_with(Error::Cancelled);
    }

    /// Cancels with the given cause. Only the first cause is kept.
    pub fn cancel_with(&self, reason: Error) {
        Self::cancel_inner(&self.inner, reason);
    }

    fn cancel_inner(inner: &Arc<Inner>, reason: Error) {
        if inner.reason.set(reason).is_err() {
            return;
        }
        inner.cancelled.store(true, Ordering::SeqCst);
        inner.notify.notify_waiters();

        let children = std::mem::take(
            &mut *inner
                .children
                .lock()
                .unwrap_or_else(PoisonError::into_inner),
        );
        if let Some(reason) = inner.reason.get() {
            for child in children.iter().filter_map(Weak::upgrade) {
                Self::cancel_inner(&child, reason.clone());
            }
        }
    }

    pub fn is_cancelled(&self) -> bool {
        if self.inner.cancelled.load(Ordering::SeqCst) {
            return true;
        }
        match self.inner.deadline {
            Some(deadline) if Instant::now() >= deadline => {
                self.cancel_with(Error::DeadlineExceeded);
                true
            }
            _ => false,
        }
    }

    /// The recorded cause, or `None` while the token is still live.
    pub fn error(&self) -> Option<Error> {
        if self.is_cancelled() {
            self.inner.reason.get().cloned()
        } else {
            None
        }
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.inner.deadline
    }

    /// Completes once the token is cancelled or its deadline passes.
    pub async fn cancelled(&self) {
        let notified = self.inner.notify.notified();
        tokio::pin!(notified);
        notified.as_mut().enable();

        if self.is_cancelled() {
            return;
        }

        match self.inner.deadline {
            Some(deadline) => tokio::select! {
                _ = &mut notified => {}
                _ = tokio::time::sleep_until(deadline) => self.cancel_with(Error::DeadlineExceeded),
            },
            None => notified.await,
        }
    }

    /// A token that is cancelled whenever `self` is, with the same cause.
    /// Cancelling the child leaves `self` untouched.
    pub fn child(&self) -> CancelToken {
        self.child_with(self.inner.deadline)
    }

    /// A child token whose deadline is the earlier of `deadline` and the
    /// parent's own deadline.
    pub fn with_deadline(&self, deadline: Instant) -> CancelToken {
        let deadline = match self.inner.deadline {
            Some(parent) => parent.min(deadline),
            None => deadline,
        };
        self.child_with(Some(deadline))
    }

    pub fn with_timeout(&self, timeout: Duration) -> CancelToken {
        self.with_deadline(Instant::now() + timeout)
    }

    fn child_with(&self, deadline: Option<Instant>) -> CancelToken {
        let child = CancelToken {
            inner: Arc::new(Inner {
                deadline,
                ..Inner::default()
            }),
        };

        {
            let mut children = self
                .inner
                .children
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            if !self.inner.cancelled.load(Ordering::SeqCst) {
                children.retain(|c| c.strong_count() > 0);
                children.push(Arc::downgrade(&child.inner));
                return child;
            }
        }

        if let Some(reason) = self.inner.reason.get() {
            child.cancel_with(reason.clone());
        }
        child
    }
}

impl fmt::Debug for CancelToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CancelToken")
            .field("cancelled", &self.inner.cancelled.load(Ordering::SeqCst))
            .field("deadline", &self.inner.deadline)
            .finish()
    }
}
