use crate::http::StatusCode;

use std::borrow::Cow;
use std::error::Error as StdError;

/// An dynamically typed [`Error`](std::error::Error).
pub type BoxError = Box<dyn StdError + Send + Sync>;

/// A handled failure returned from a [`TryHandlerFn`](crate::TryHandlerFn).
///
/// The message and status code are sent to the client. The cause is kept
/// only for the code that constructed the error: it is dropped when the
/// error is turned into a response, so log it before returning if you need
/// it.
///
/// ```
/// use ctxh::{AppError, http::StatusCode};
///
/// let err = AppError::new("db timeout", "service unavailable", StatusCode::SERVICE_UNAVAILABLE);
/// assert_eq!(err.message(), "service unavailable");
/// assert_eq!(err.code(), StatusCode::SERVICE_UNAVAILABLE);
/// ```
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct AppError {
    #[source]
    cause: Option<BoxError>,
    message: Cow<'static, str>,
    code: StatusCode,
}

impl AppError {
    /// Create an error with an underlying cause.
    pub fn new(
        cause: impl Into<BoxError>,
        message: impl Into<Cow<'static, str>>,
        code: StatusCode,
    ) -> Self {
        Self {
            cause: Some(cause.into()),
            message: message.into(),
            code,
        }
    }

    /// Create an error without an underlying cause.
    pub fn msg(message: impl Into<Cow<'static, str>>, code: StatusCode) -> Self {
        Self {
            cause: None,
            message: message.into(),
            code,
        }
    }

    /// The message sent to the client.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The status code sent to the client.
    pub fn code(&self) -> StatusCode {
        self.code
    }

    /// The underlying cause, if any.
    pub fn cause(&self) -> Option<&(dyn StdError + Send + Sync + 'static)> {
        self.cause.as_deref()
    }

    /// Split the error into its cause, message and status code.
    pub fn into_parts(self) -> (Option<BoxError>, Cow<'static, str>, StatusCode) {
        (self.cause, self.message, self.code)
    }
}

impl From<StatusCode> for AppError {
    fn from(code: StatusCode) -> Self {
        AppError::msg(code.canonical_reason().unwrap_or("Unknown Status"), code)
    }
}

/// The reason a [`Context`](crate::Context) is done.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ContextError {
    /// The context was cancelled through its [`CancelHandle`](crate::CancelHandle)
    /// or through a parent.
    #[error("context canceled")]
    Canceled,
    /// The context's deadline passed.
    #[error("context deadline exceeded")]
    DeadlineExceeded,
}
