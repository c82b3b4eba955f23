//! HTTP types shared by both handler contracts.

mod body;
mod writer;

pub use body::Body;
pub use writer::ResponseWriter;

pub use bytes::Bytes;
pub use http::{header, HeaderMap, HeaderValue, Method, StatusCode, Uri};
pub use http::header::HeaderName;

/// An HTTP request.
pub type Request = http::Request<Body>;

/// An HTTP response, as taken from a [`ResponseWriter`].
pub type Response = http::Response<Body>;
