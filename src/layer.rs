//! Context-aware middleware.
//!
//! Each layer derives a child from the context it receives and passes the
//! child to the handler it wraps. Layers compose through
//! [`ContextHandler`], so they belong inside a [`Bridge`](crate::Bridge).

use crate::http::{Request, ResponseWriter};
use crate::{Context, ContextHandler};

use std::time::Duration;

/// Derives a cancellable context for every call, cancelling it once the
/// wrapped handler returns.
///
/// Place this directly inside a [`Bridge`](crate::Bridge) to get a
/// context per request instead of the bridge's shared root.
#[derive(Debug, Clone)]
pub struct PerRequest<H> {
    inner: H,
}

impl<H> PerRequest<H> {
    /// Wrap a handler.
    pub fn new(inner: H) -> Self {
        Self { inner }
    }
}

#[crate::async_trait]
impl<H> ContextHandler for PerRequest<H>
where
    H: ContextHandler,
{
    async fn call(&self, cx: Context, res: ResponseWriter, req: Request) {
        let (cx, cancel) = cx.with_cancel();
        let _guard = cancel.drop_guard();

        tracing::trace!("derived request context");
        self.inner.call(cx, res, req).await
    }
}

/// Derives a context that expires after a fixed duration for every call.
///
/// The wrapped handler is not aborted when the deadline passes, it is
/// expected to watch [`Context::cancelled`].
#[derive(Debug, Clone)]
pub struct Timeout<H> {
    inner: H,
    timeout: Duration,
}

impl<H> Timeout<H> {
    /// Wrap a handler.
    pub fn new(inner: H, timeout: Duration) -> Self {
        Self { inner, timeout }
    }
}

#[crate::async_trait]
impl<H> ContextHandler for Timeout<H>
where
    H: ContextHandler,
{
    async fn call(&self, cx: Context, res: ResponseWriter, req: Request) {
        let (cx, cancel) = cx.with_timeout(self.timeout);
        let _guard = cancel.drop_guard();

        tracing::trace!(timeout = ?self.timeout, "derived request deadline");
        self.inner.call(cx, res, req).await
    }
}

/// Attaches a value to the context of every call.
#[derive(Debug, Clone)]
pub struct WithValue<H, T> {
    inner: H,
    value: T,
}

impl<H, T> WithValue<H, T> {
    /// Wrap a handler.
    pub fn new(inner: H, value: T) -> Self {
        Self { inner, value }
    }
}

#[crate::async_trait]
impl<H, T> ContextHandler for WithValue<H, T>
where
    H: ContextHandler,
    T: Clone + Send + Sync + 'static,
{
    async fn call(&self, cx: Context, res: ResponseWriter, req: Request) {
        self.inner
            .call(cx.with_value(self.value.clone()), res, req)
            .await
    }
}
