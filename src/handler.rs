use crate::response::ResponseSink;
use http::Request;

/// Produces a response by writing into a [`ResponseSink`].
///
/// Implemented for any `Fn(&mut dyn ResponseSink, &Request<B>)`.
pub trait Handler<B> {
    /// Handles `req`, writing the response to `sink`.
    fn call(&self, sink: &mut dyn ResponseSink, req: &Request<B>);
}

impl<F, B> Handler<B> for F
where
    F: Fn(&mut dyn ResponseSink, &Request<B>),
{
    fn call(&self, sink: &mut dyn ResponseSink, req: &Request<B>) {
        self(sink, req)
    }
}
