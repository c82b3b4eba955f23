//! Cancellable, request-scoped values passed explicitly to handlers.

use crate::error::ContextError;

use std::fmt;
use std::future;
use std::sync::Arc;
use std::time::Duration;

use http::Extensions;
use once_cell::sync::OnceCell;
use tokio::time::{self, Instant};
use tokio_util::sync::CancellationToken;

/// A cancellation signal, deadline and set of typed values that travel
/// down a handler chain.
///
/// A `Context` is a handle: cloning it gives out another reference to the
/// same value, it never copies the value itself. Contexts are never mutated,
/// new ones are derived from a parent with [`with_cancel`](Context::with_cancel),
/// [`with_deadline`](Context::with_deadline) or [`with_value`](Context::with_value).
/// A derived context is done whenever its parent is.
#[derive(Clone)]
pub struct Context {
    inner: Arc<Inner>,
}

struct Inner {
    parent: Option<Context>,
    token: Option<CancellationToken>,
    // set by this node's `CancelHandle` before its token is cancelled
    cancelled_at: Option<Arc<OnceCell<Instant>>>,
    deadline: Option<Instant>,
    values: Option<Extensions>,
}

impl Context {
    /// The root context: never cancelled, no deadline, no values.
    pub fn background() -> Self {
        Self {
            inner: Arc::new(Inner {
                parent: None,
                token: None,
                cancelled_at: None,
                deadline: None,
                values: None,
            }),
        }
    }

    /// Derive a child context that is cancelled when the returned
    /// handle is.
    pub fn with_cancel(&self) -> (Context, CancelHandle) {
        self.derive(self.inner.deadline)
    }

    /// Derive a child context that expires at `deadline`, or earlier if
    /// the parent does.
    pub fn with_deadline(&self, deadline: Instant) -> (Context, CancelHandle) {
        let deadline = match self.inner.deadline {
            Some(parent) if parent < deadline => parent,
            _ => deadline,
        };

        self.derive(Some(deadline))
    }

    /// Derive a child context that expires after `timeout`.
    pub fn with_timeout(&self, timeout: Duration) -> (Context, CancelHandle) {
        self.with_deadline(Instant::now() + timeout)
    }

    /// Derive a child context carrying `value`.
    ///
    /// Values are keyed by type, a child's value shadows any
    /// value of the same type further up the chain.
    pub fn with_value<T>(&self, value: T) -> Context
    where
        T: Send + Sync + 'static,
    {
        let mut values = Extensions::new();
        values.insert(value);

        Context {
            inner: Arc::new(Inner {
                parent: Some(self.clone()),
                token: self.inner.token.clone(),
                cancelled_at: None,
                deadline: self.inner.deadline,
                values: Some(values),
            }),
        }
    }

    fn derive(&self, deadline: Option<Instant>) -> (Context, CancelHandle) {
        let token = match &self.inner.token {
            Some(parent) => parent.child_token(),
            None => CancellationToken::new(),
        };

        let cancelled_at = Arc::new(OnceCell::new());

        let cx = Context {
            inner: Arc::new(Inner {
                parent: Some(self.clone()),
                token: Some(token.clone()),
                cancelled_at: Some(cancelled_at.clone()),
                deadline,
                values: None,
            }),
        };

        (cx, CancelHandle { token, cancelled_at })
    }

    /// Look up a value by type.
    pub fn get<T>(&self) -> Option<&T>
    where
        T: Send + Sync + 'static,
    {
        let mut cx = self;

        loop {
            if let Some(value) = cx.inner.values.as_ref().and_then(|v| v.get::<T>()) {
                return Some(value);
            }

            cx = cx.inner.parent.as_ref()?;
        }
    }

    /// The time at which this context expires, if any.
    pub fn deadline(&self) -> Option<Instant> {
        self.inner.deadline
    }

    /// Returns `true` if this context was cancelled or its deadline passed.
    pub fn is_cancelled(&self) -> bool {
        self.err().is_some()
    }

    /// Why this context is done, or `None` if it is still live.
    ///
    /// The reason is whichever happened first, cancellation or the
    /// deadline, and does not change once the context is done.
    pub fn err(&self) -> Option<ContextError> {
        match (self.cancelled_at(), self.inner.deadline) {
            (Some(at), Some(deadline)) if deadline <= at => Some(ContextError::DeadlineExceeded),
            (Some(_), _) => Some(ContextError::Canceled),
            (None, Some(deadline)) if Instant::now() >= deadline => {
                Some(ContextError::DeadlineExceeded)
            }
            (None, _) => None,
        }
    }

    /// The earliest time a handle up the chain cancelled this context.
    fn cancelled_at(&self) -> Option<Instant> {
        match &self.inner.token {
            Some(token) if token.is_cancelled() => {}
            _ => return None,
        }

        let mut earliest = None;
        let mut cx = Some(self);

        while let Some(node) = cx {
            if let Some(&at) = node.inner.cancelled_at.as_ref().and_then(|c| c.get()) {
                earliest = Some(earliest.map_or(at, |e: Instant| e.min(at)));
            }

            cx = node.inner.parent.as_ref();
        }

        Some(earliest.unwrap_or_else(Instant::now))
    }

    /// Wait until this context is cancelled or its deadline passes.
    ///
    /// Never resolves for [`Context::background`].
    pub async fn cancelled(&self) {
        match (&self.inner.token, self.inner.deadline) {
            (Some(token), Some(deadline)) => {
                tokio::select! {
                    _ = token.cancelled() => {}
                    _ = time::sleep_until(deadline) => {}
                }
            }
            (Some(token), None) => token.cancelled().await,
            (None, Some(deadline)) => time::sleep_until(deadline).await,
            (None, None) => future::pending().await,
        }
    }

    /// Returns `true` if both handles refer to the same context value.
    pub fn ptr_eq(a: &Context, b: &Context) -> bool {
        Arc::ptr_eq(&a.inner, &b.inner)
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::background()
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("deadline", &self.inner.deadline)
            .field("err", &self.err())
            .finish()
    }
}

/// Cancels the context it was derived with.
///
/// Dropping the handle does *not* cancel the context, call
/// [`cancel`](CancelHandle::cancel) or use a [`drop_guard`](CancelHandle::drop_guard).
#[derive(Debug, Clone)]
pub struct CancelHandle {
    token: CancellationToken,
    cancelled_at: Arc<OnceCell<Instant>>,
}

impl CancelHandle {
    /// Cancel the context and every context derived from it.
    ///
    /// Cancelling more than once has no further effect.
    pub fn cancel(&self) {
        self.cancelled_at.get_or_init(Instant::now);
        self.token.cancel();
    }

    /// Returns `true` if the context was cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Cancel the context when the returned guard is dropped.
    pub fn drop_guard(self) -> CancelGuard {
        CancelGuard { handle: self }
    }
}

/// Cancels a context when dropped, see [`CancelHandle::drop_guard`].
#[derive(Debug)]
pub struct CancelGuard {
    handle: CancelHandle,
}

impl Drop for CancelGuard {
    fn drop(&mut self) {
        self.handle.cancel();
    }
}
