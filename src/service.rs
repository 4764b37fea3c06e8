use crate::codec::negotiate;
use crate::config::CompressionConfig;
use crate::handler::Handler;
use crate::response::ResponseSink;
use crate::sink::CompressionSink;
use http::Request;

/// A handler wrapper that compresses response bodies.
#[derive(Debug, Clone)]
pub struct CompressionService<H> {
    inner: H,
    config: CompressionConfig,
}

impl<H> CompressionService<H> {
    /// Creates a new compression service wrapping the given handler.
    pub fn new(inner: H, config: CompressionConfig) -> Self {
        Self { inner, config }
    }

    /// Returns the configuration applied to every response.
    pub fn config(&self) -> &CompressionConfig {
        &self.config
    }

    /// Returns a reference to the inner handler.
    pub fn inner(&self) -> &H {
        &self.inner
    }

    /// Returns a mutable reference to the inner handler.
    pub fn inner_mut(&mut self) -> &mut H {
        &mut self.inner
    }

    /// Consumes this service, returning the inner handler.
    pub fn into_inner(self) -> H {
        self.inner
    }
}

impl<H, B> Handler<B> for CompressionService<H>
where
    H: Handler<B>,
{
    fn call(&self, sink: &mut dyn ResponseSink, req: &Request<B>) {
        let Some(codec) = negotiate(req.headers()) else {
            // Client doesn't want compression
            self.inner.call(sink, req);
            return;
        };

        // Close runs on every exit, including a panicking handler.
        let mut sink = scopeguard::guard(
            CompressionSink::new(sink, codec, self.config),
            |mut sink| {
                if let Err(err) = sink.close() {
                    tracing::error!(error = %err, %codec, "finalizing compressed response failed");
                }
            },
        );

        self.inner.call(&mut *sink, req);
    }
}
