use crate::http::{Request, ResponseWriter};
use crate::{Context, ContextHandler, Handler};

/// Exposes a [`ContextHandler`] as a plain [`Handler`].
///
/// The bridge creates one [`Context::background`] when it is constructed
/// and hands that same context to the wrapped handler for *every* request.
/// Contexts are therefore not unique per request: wrap the handler in
/// [`PerRequest`](crate::layer::PerRequest) (or another context layer) to
/// derive a child for each call.
///
/// A bridge is the single crossing point between the two contracts.
/// Context-aware middleware goes inside it, plain middleware goes outside.
pub struct Bridge<H> {
    cx: Context,
    handler: H,
}

impl<H> Bridge<H>
where
    H: ContextHandler,
{
    /// Wrap a handler, creating its root context.
    pub fn new(handler: H) -> Self {
        Self {
            cx: Context::background(),
            handler,
        }
    }
}

impl<H> Bridge<H> {
    /// The root context passed to every request.
    pub fn context(&self) -> &Context {
        &self.cx
    }

    /// A reference to the wrapped handler.
    pub fn get_ref(&self) -> &H {
        &self.handler
    }

    /// Unwrap the handler, discarding the root context.
    pub fn into_inner(self) -> H {
        self.handler
    }
}

#[crate::async_trait]
impl<H> Handler for Bridge<H>
where
    H: ContextHandler,
{
    async fn call(&self, res: ResponseWriter, req: Request) {
        tracing::trace!(method = %req.method(), uri = %req.uri(), "bridging request");
        self.handler.call(self.cx.clone(), res, req).await
    }
}

impl<H> std::fmt::Debug for Bridge<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bridge").field("cx", &self.cx).finish()
    }
}
