use crate::error::AppError;
use crate::http::{Request, ResponseWriter};
use crate::{Context, ContextHandler};

use std::fmt;
use std::future::Future;

/// A [`ContextHandler`] that calls a function.
///
/// Created by [`handler_fn`].
#[derive(Clone)]
pub struct HandlerFn<F> {
    f: F,
}

/// Use an async function as a [`ContextHandler`].
///
/// ```
/// use ctxh::http::StatusCode;
/// use ctxh::{handler_fn, ContextHandler};
///
/// let hello = handler_fn(|_cx, res, _req| async move {
///     res.write_header(StatusCode::OK);
///     res.write("hello");
/// });
///
/// let _bridge = hello.bridge();
/// ```
pub fn handler_fn<F, O>(f: F) -> HandlerFn<F>
where
    F: Fn(Context, ResponseWriter, Request) -> O + Send + Sync + 'static,
    O: Future<Output = ()> + Send + 'static,
{
    HandlerFn::new(f)
}

impl<F> HandlerFn<F> {
    /// Wrap a function.
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

#[crate::async_trait]
impl<F, O> ContextHandler for HandlerFn<F>
where
    F: Fn(Context, ResponseWriter, Request) -> O + Send + Sync + 'static,
    O: Future<Output = ()> + Send + 'static,
{
    async fn call(&self, cx: Context, res: ResponseWriter, req: Request) {
        (self.f)(cx, res, req).await
    }
}

impl<F> fmt::Debug for HandlerFn<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerFn").finish()
    }
}

/// A [`ContextHandler`] that calls a fallible function, replying with
/// an error response when it fails.
///
/// Created by [`try_handler_fn`].
#[derive(Clone)]
pub struct TryHandlerFn<F> {
    f: F,
}

/// Use a fallible async function as a [`ContextHandler`].
///
/// If the function returns an error, the error's message and status
/// code are written as a plain-text response. The error's cause is
/// dropped without being logged or sent to the client. On success the
/// function must have written the response itself.
///
/// An error returned after the function already wrote a status or body
/// is logged and the response is left as written.
///
/// ```
/// use ctxh::http::StatusCode;
/// use ctxh::{try_handler_fn, AppError};
///
/// let lookup = try_handler_fn(|_cx, _res, _req| async move {
///     Err::<(), _>(AppError::new(
///         "db timeout",
///         "service unavailable",
///         StatusCode::SERVICE_UNAVAILABLE,
///     ))
/// });
/// # let _ = lookup;
/// ```
pub fn try_handler_fn<F, O, E>(f: F) -> TryHandlerFn<F>
where
    F: Fn(Context, ResponseWriter, Request) -> O + Send + Sync + 'static,
    O: Future<Output = Result<(), E>> + Send + 'static,
    E: Into<AppError>,
{
    TryHandlerFn::new(f)
}

impl<F> TryHandlerFn<F> {
    /// Wrap a function.
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

#[crate::async_trait]
impl<F, O, E> ContextHandler for TryHandlerFn<F>
where
    F: Fn(Context, ResponseWriter, Request) -> O + Send + Sync + 'static,
    O: Future<Output = Result<(), E>> + Send + 'static,
    E: Into<AppError>,
{
    async fn call(&self, cx: Context, res: ResponseWriter, req: Request) {
        if let Err(err) = (self.f)(cx, res.clone(), req).await {
            let err: AppError = err.into();

            if res.is_written() {
                tracing::warn!(
                    status = err.code().as_u16(),
                    message = %err.message(),
                    "handler failed after writing a response"
                );
                return;
            }

            res.error(err.message(), err.code());
        }
    }
}

impl<F> fmt::Debug for TryHandlerFn<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TryHandlerFn").finish()
    }
}
