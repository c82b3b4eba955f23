//! The two handler contracts and the adapters between them.

mod bridge;
mod function;

pub use bridge::Bridge;
pub use function::{handler_fn, try_handler_fn, HandlerFn, TryHandlerFn};

use crate::http::{Request, ResponseWriter};
use crate::layer::{PerRequest, Timeout, WithValue};
use crate::Context;

use std::sync::Arc;
use std::time::Duration;

/// An asynchronous HTTP handler that receives an explicit [`Context`].
///
/// Implementations must write the response through the [`ResponseWriter`],
/// either directly or by delegating to another handler, and must cancel
/// any context they derived before returning.
///
/// Use a [`Bridge`] to turn a `ContextHandler` into a plain [`Handler`]
/// that a server can call.
#[crate::async_trait]
pub trait ContextHandler: Send + Sync {
    /// Handle a request.
    async fn call(&self, cx: Context, res: ResponseWriter, req: Request);

    /// Expose this handler under the plain [`Handler`] contract.
    fn bridge(self) -> Bridge<Self>
    where
        Self: Sized,
    {
        Bridge::new(self)
    }

    /// Derive a fresh cancellable context for every call.
    fn per_request(self) -> PerRequest<Self>
    where
        Self: Sized,
    {
        PerRequest::new(self)
    }

    /// Derive a context that expires after `timeout` for every call.
    fn timeout(self, timeout: Duration) -> Timeout<Self>
    where
        Self: Sized,
    {
        Timeout::new(self, timeout)
    }

    /// Attach `value` to the context of every call.
    fn with_value<T>(self, value: T) -> WithValue<Self, T>
    where
        T: Clone + Send + Sync + 'static,
        Self: Sized,
    {
        WithValue::new(self, value)
    }
}

/// A plain HTTP handler, as expected by a server or router.
///
/// Plain handlers know nothing about [`Context`]. A middleware written
/// against this trait cannot forward a context, so it must sit outside
/// the [`Bridge`], never between two context-aware layers.
#[crate::async_trait]
pub trait Handler: Send + Sync {
    /// Handle a request.
    async fn call(&self, res: ResponseWriter, req: Request);
}

#[crate::async_trait]
impl<H> ContextHandler for Box<H>
where
    H: ContextHandler + ?Sized,
{
    async fn call(&self, cx: Context, res: ResponseWriter, req: Request) {
        H::call(self, cx, res, req).await
    }
}

#[crate::async_trait]
impl<H> ContextHandler for Arc<H>
where
    H: ContextHandler + ?Sized,
{
    async fn call(&self, cx: Context, res: ResponseWriter, req: Request) {
        H::call(self, cx, res, req).await
    }
}

#[crate::async_trait]
impl<'a, H> ContextHandler for &'a H
where
    H: ContextHandler + ?Sized,
{
    async fn call(&self, cx: Context, res: ResponseWriter, req: Request) {
        H::call(self, cx, res, req).await
    }
}

#[crate::async_trait]
impl<H> Handler for Box<H>
where
    H: Handler + ?Sized,
{
    async fn call(&self, res: ResponseWriter, req: Request) {
        H::call(self, res, req).await
    }
}

#[crate::async_trait]
impl<H> Handler for Arc<H>
where
    H: Handler + ?Sized,
{
    async fn call(&self, res: ResponseWriter, req: Request) {
        H::call(self, res, req).await
    }
}

#[crate::async_trait]
impl<'a, H> Handler for &'a H
where
    H: Handler + ?Sized,
{
    async fn call(&self, res: ResponseWriter, req: Request) {
        H::call(self, res, req).await
    }
}
