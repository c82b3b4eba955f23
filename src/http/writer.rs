use super::{header, Body, HeaderMap, HeaderName, HeaderValue, Response, StatusCode};

use std::mem;
use std::sync::Arc;

use bytes::{Bytes, BytesMut};
use parking_lot::Mutex;

/// Writes the response to an HTTP request.
///
/// A `ResponseWriter` is a handle created by the server for each request.
/// Handlers write the status line with [`write_header`](Self::write_header)
/// and the body with [`write`](Self::write). Clones share the same response.
///
/// Headers must be set before the status is written: the header map is
/// sent along with the first status and later changes have no effect.
#[derive(Clone, Default)]
pub struct ResponseWriter {
    inner: Arc<Mutex<State>>,
}

#[derive(Default)]
struct State {
    headers: HeaderMap,
    sent: Option<(StatusCode, HeaderMap)>,
    body: BytesMut,
}

impl State {
    fn send(&mut self, status: StatusCode) {
        let headers = mem::take(&mut self.headers);
        self.sent = Some((status, headers));
    }
}

impl ResponseWriter {
    /// Create a writer for a new response.
    pub fn new() -> Self {
        Self::default()
    }

    /// Access the response headers that will be sent with the status.
    pub fn with_headers<R>(&self, f: impl FnOnce(&mut HeaderMap) -> R) -> R {
        f(&mut self.inner.lock().headers)
    }

    /// Set a response header, replacing any existing values.
    pub fn set_header(&self, name: HeaderName, value: HeaderValue) {
        self.with_headers(|headers| headers.insert(name, value));
    }

    /// Get a response header, as sent if the status was already written.
    pub fn header(&self, name: impl header::AsHeaderName) -> Option<HeaderValue> {
        let state = self.inner.lock();
        match &state.sent {
            Some((_, headers)) => headers.get(name).cloned(),
            None => state.headers.get(name).cloned(),
        }
    }

    /// Write the response status along with the current headers.
    ///
    /// Only the first call has any effect.
    pub fn write_header(&self, status: StatusCode) {
        let mut state = self.inner.lock();

        if let Some((sent, _)) = &state.sent {
            tracing::warn!(
                sent = sent.as_u16(),
                ignored = status.as_u16(),
                "superfluous write_header call"
            );
            return;
        }

        state.send(status);
    }

    /// Append data to the response body.
    ///
    /// Writes a `200 OK` status first if none was written.
    pub fn write(&self, data: impl AsRef<[u8]>) {
        let mut state = self.inner.lock();

        if state.sent.is_none() {
            state.send(StatusCode::OK);
        }

        state.body.extend_from_slice(data.as_ref());
    }

    /// Reply with a plain-text error message and status code.
    ///
    /// The message is written as-is as the response body.
    pub fn error(&self, message: &str, code: StatusCode) {
        self.with_headers(|headers| {
            headers.remove(header::CONTENT_LENGTH);
            headers.insert(
                header::CONTENT_TYPE,
                HeaderValue::from_static("text/plain; charset=utf-8"),
            );
            headers.insert(
                header::X_CONTENT_TYPE_OPTIONS,
                HeaderValue::from_static("nosniff"),
            );
        });

        self.write_header(code);
        self.write(message);
    }

    /// Serialize `value` as JSON into the response body.
    ///
    /// Sets the `Content-Type` header if it was not already set.
    #[cfg(feature = "json")]
    pub fn json<T>(&self, value: &T) -> Result<(), serde_json::Error>
    where
        T: serde::Serialize + ?Sized,
    {
        let body = serde_json::to_vec(value)?;

        self.with_headers(|headers| {
            headers
                .entry(header::CONTENT_TYPE)
                .or_insert_with(|| HeaderValue::from_static("application/json"));
        });

        self.write(body);
        Ok(())
    }

    /// The status that was written, if any.
    pub fn status(&self) -> Option<StatusCode> {
        self.inner.lock().sent.as_ref().map(|(status, _)| *status)
    }

    /// Returns `true` if a status was written.
    pub fn is_written(&self) -> bool {
        self.inner.lock().sent.is_some()
    }

    /// Take the written response, leaving this writer empty.
    ///
    /// A writer that was never written to produces an empty
    /// `200 OK` response.
    pub fn take_response(&self) -> Response {
        let mut state = mem::take(&mut *self.inner.lock());

        let (status, headers) = state
            .sent
            .take()
            .unwrap_or_else(|| (StatusCode::OK, mem::take(&mut state.headers)));

        let body = match state.body.is_empty() {
            true => Body::empty(),
            false => Body::once(Bytes::from(state.body)),
        };

        let mut response = Response::new(body);
        *response.status_mut() = status;
        *response.headers_mut() = headers;
        response
    }

    /// Consume the writer, returning the written response.
    pub fn into_response(self) -> Response {
        self.take_response()
    }
}

impl std::fmt::Debug for ResponseWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResponseWriter")
            .field("status", &self.status())
            .finish()
    }
}
