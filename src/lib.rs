//! Context-carrying HTTP handlers.
//!
//! A [`ContextHandler`] receives an explicit [`Context`] along with the
//! response writer and request. A [`Bridge`] exposes it as a plain
//! [`Handler`], which is what a server or router expects.
//!
//! ```
//! use ctxh::http::StatusCode;
//! use ctxh::{handler_fn, try_handler_fn, AppError, ContextHandler, Handler};
//!
//! fn assert_handler<H: Handler>(_: &H) {}
//!
//! let hello = handler_fn(|_cx, res, _req| async move {
//!     res.write_header(StatusCode::OK);
//!     res.write("hello");
//! })
//! .per_request()
//! .bridge();
//!
//! let fails = try_handler_fn(|_cx, _res, _req| async move {
//!     Err::<(), _>(AppError::msg("gone", StatusCode::GONE))
//! })
//! .bridge();
//!
//! assert_handler(&hello);
//! assert_handler(&fails);
//! ```
//!
//! # Composing middleware
//!
//! A plain [`Handler`] has no way to pass a context along. Middleware that
//! needs the context must be written against [`ContextHandler`] and placed
//! inside the bridge, see the [`layer`] module. Plain middleware goes
//! outside the bridge. Mixing the two, a plain middleware between two
//! context-aware layers, needs a second bridge, and the second bridge starts
//! over from a fresh root: every value and deadline derived above it is lost.

mod context;
mod error;
mod handler;

pub mod http;
pub mod layer;

pub use async_trait::async_trait;
pub use context::{CancelGuard, CancelHandle, Context};
pub use error::{AppError, BoxError, ContextError};
pub use handler::{
    handler_fn, try_handler_fn, Bridge, ContextHandler, Handler, HandlerFn, TryHandlerFn,
};
