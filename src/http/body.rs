use crate::error::BoxError;

use std::error::Error as StdError;
use std::future::poll_fn;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::{fmt, mem};

use bytes::{Bytes, BytesMut};
use futures_core::Stream;

type BoxStream = Pin<Box<dyn Stream<Item = Result<Bytes, BoxError>> + Send + Sync>>;

/// Respresents the body of an HTTP message.
pub struct Body {
    kind: Kind,
}

enum Kind {
    Empty,
    Once(Bytes),
    Stream(BoxStream),
}

impl Body {
    /// Create a `Body` from a stream of bytes.
    pub fn stream<S, E>(stream: S) -> Self
    where
        S: Stream<Item = Result<Bytes, E>> + Send + Sync + 'static,
        E: StdError + Send + Sync + 'static,
    {
        pin_project_lite::pin_project! {
            struct MapErr<S> {
                #[pin]
                stream: S,
            }
        }

        impl<S, E> Stream for MapErr<S>
        where
            S: Stream<Item = Result<Bytes, E>>,
            E: StdError + Send + Sync + 'static,
        {
            type Item = Result<Bytes, BoxError>;

            fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
                self.project()
                    .stream
                    .poll_next(cx)
                    .map(|item| item.map(|chunk| chunk.map_err(|err| Box::new(err) as _)))
            }

            fn size_hint(&self) -> (usize, Option<usize>) {
                self.stream.size_hint()
            }
        }

        Body {
            kind: Kind::Stream(Box::pin(MapErr { stream })),
        }
    }

    /// Create a body directly from bytes.
    pub fn once(bytes: impl Into<Bytes>) -> Self {
        Body {
            kind: Kind::Once(bytes.into()),
        }
    }

    /// Create an empty `Body`.
    pub fn empty() -> Self {
        Body { kind: Kind::Empty }
    }

    /// Returns `true` if the body is known to contain no data.
    pub fn is_empty(&self) -> bool {
        match &self.kind {
            Kind::Empty => true,
            Kind::Once(bytes) => bytes.is_empty(),
            Kind::Stream(_) => false,
        }
    }

    /// Read the whole body into memory.
    pub async fn collect(mut self) -> Result<Bytes, BoxError> {
        match mem::replace(&mut self.kind, Kind::Empty) {
            Kind::Empty => return Ok(Bytes::new()),
            Kind::Once(bytes) => return Ok(bytes),
            kind => self.kind = kind,
        }

        let mut buf = BytesMut::new();
        while let Some(chunk) = poll_fn(|cx| Pin::new(&mut self).poll_next(cx)).await {
            buf.extend_from_slice(&chunk?);
        }

        Ok(buf.freeze())
    }
}

impl Stream for Body {
    type Item = Result<Bytes, BoxError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        match &mut self.kind {
            Kind::Stream(stream) => stream.as_mut().poll_next(cx),
            Kind::Once(bytes) => {
                let bytes = mem::take(bytes);
                self.kind = Kind::Empty;
                Poll::Ready(Some(Ok(bytes)))
            }
            Kind::Empty => Poll::Ready(None),
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match &self.kind {
            Kind::Stream(stream) => stream.size_hint(),
            Kind::Once(bytes) => (bytes.len(), Some(bytes.len())),
            Kind::Empty => (0, Some(0)),
        }
    }
}

impl Default for Body {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Debug for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.kind {
            Kind::Empty => "Empty",
            Kind::Once(_) => "Once",
            Kind::Stream(_) => "Stream",
        };

        f.debug_tuple("Body").field(&kind).finish()
    }
}

macro_rules! from_bytes {
    ($($ty:ty),* $(,)?) => {$(
        impl From<$ty> for Body {
            fn from(bytes: $ty) -> Self {
                Body::once(bytes)
            }
        }
    )*}
}

from_bytes! {
    Bytes,
    Vec<u8>,
    &'static [u8],
    String,
    &'static str,
}
