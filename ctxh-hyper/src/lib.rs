//! Serve [`ctxh`] handlers with [`hyper`].

use std::convert::Infallible;
use std::future::{ready, Future, Ready};
use std::io;
use std::net::*;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use ctxh::http::{Body, Bytes, Request, ResponseWriter};
use ctxh::{BoxError, Handler};
use futures_core::Stream;
use hyper::server::conn::AddrIncoming;
use hyper::service::Service;

pub use hyper::Server;

/// An error that occurred while starting a server.
#[derive(Debug, thiserror::Error)]
pub enum ServeError {
    #[error("failed to resolve address: {0}")]
    Addr(#[from] io::Error),
    #[error("failed to bind server: {0}")]
    Bind(#[from] hyper::Error),
}

/// Serve a plain [`Handler`], usually a [`Bridge`](ctxh::Bridge).
pub trait Serve<H> {
    /// Bind a server to `addr` that calls this handler for every request.
    fn serve(
        self,
        addr: impl ToSocketAddr,
    ) -> Result<Server<AddrIncoming, MakeHandlerService<H>>, ServeError>;

    fn into_make_service(self) -> MakeHandlerService<H>;

    fn into_service(self) -> HandlerService<H>;
}

impl<H> Serve<H> for H
where
    H: Handler + 'static,
{
    fn serve(
        self,
        addr: impl ToSocketAddr,
    ) -> Result<Server<AddrIncoming, MakeHandlerService<H>>, ServeError> {
        let addr = addr.to_socket_addr()?;
        let server = hyper::Server::try_bind(&addr)?.serve(self.into_make_service());
        tracing::info!(%addr, "listening");
        Ok(server)
    }

    fn into_make_service(self) -> MakeHandlerService<H> {
        MakeHandlerService {
            service: self.into_service(),
        }
    }

    fn into_service(self) -> HandlerService<H> {
        HandlerService {
            handler: Arc::new(self),
        }
    }
}

pub struct MakeHandlerService<H> {
    service: HandlerService<H>,
}

impl<T, H> Service<T> for MakeHandlerService<H> {
    type Response = HandlerService<H>;
    type Error = Infallible;
    type Future = Ready<Result<Self::Response, Infallible>>;

    fn poll_ready(&mut self, _: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, _: T) -> Self::Future {
        ready(Ok(self.service.clone()))
    }
}

/// A hyper service that calls a [`Handler`] with a fresh
/// [`ResponseWriter`] for every request.
pub struct HandlerService<H> {
    handler: Arc<H>,
}

impl<H> Service<hyper::Request<hyper::Body>> for HandlerService<H>
where
    H: Handler + 'static,
{
    type Response = hyper::Response<HttpBody>;
    type Error = Infallible;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, _: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: hyper::Request<hyper::Body>) -> Self::Future {
        let (parts, body) = req.into_parts();
        let req = Request::from_parts(parts, Body::stream(body));
        let handler = self.handler.clone();

        Box::pin(async move {
            let res = ResponseWriter::new();
            handler.call(res.clone(), req).await;

            let (parts, body) = res.into_response().into_parts();
            tracing::debug!(status = parts.status.as_u16(), "request served");
            Ok(hyper::Response::from_parts(parts, HttpBody { inner: body }))
        })
    }
}

impl<H> Clone for HandlerService<H> {
    fn clone(&self) -> Self {
        Self {
            handler: self.handler.clone(),
        }
    }
}

/// A [`ctxh::http::Body`] as an [`http_body::Body`].
pub struct HttpBody {
    inner: Body,
}

impl http_body::Body for HttpBody {
    type Data = Bytes;
    type Error = BoxError;

    fn poll_data(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Self::Data, Self::Error>>> {
        Pin::new(&mut self.inner).poll_next(cx)
    }

    fn poll_trailers(
        self: Pin<&mut Self>,
        _: &mut Context<'_>,
    ) -> Poll<Result<Option<hyper::HeaderMap>, Self::Error>> {
        Poll::Ready(Ok(None))
    }

    fn is_end_stream(&self) -> bool {
        self.inner.is_empty()
    }

    fn size_hint(&self) -> http_body::SizeHint {
        let (lower, upper) = self.inner.size_hint();

        let mut hint = http_body::SizeHint::new();
        hint.set_lower(lower as _);
        if let Some(upper) = upper {
            hint.set_upper(upper as _);
        }

        hint
    }
}

pub trait ToSocketAddr {
    fn to_socket_addr(self) -> io::Result<SocketAddr>;
}

impl ToSocketAddr for SocketAddr {
    fn to_socket_addr(self) -> io::Result<SocketAddr> {
        Ok(self)
    }
}

macro_rules! to_socket_addr {
    ($($ty:ty),*) => {$(
        impl ToSocketAddr for $ty {
            fn to_socket_addr(self) -> io::Result<SocketAddr> {
                self.to_socket_addrs()?.next().ok_or_else(|| {
                    io::Error::new(io::ErrorKind::InvalidInput, "no addresses to bind to")
                })
            }
        }
    )*}
}

to_socket_addr! {
    &str,
    String,
    (&str, u16),
    (IpAddr, u16),
    (String, u16),
    (Ipv4Addr, u16),
    (Ipv6Addr, u16),
    SocketAddrV4,
    SocketAddrV6
}
