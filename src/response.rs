use http::StatusCode;
use http::header::{HeaderMap, HeaderName, HeaderValue};
use std::io;

/// The outgoing half of an HTTP exchange.
///
/// Headers may be changed freely until [`commit`](ResponseSink::commit) is
/// called. After that the status line and headers are considered sent and
/// only body bytes may follow.
pub trait ResponseSink {
    /// Returns the response headers.
    fn headers(&self) -> &HeaderMap;

    /// Returns the response headers for modification.
    fn headers_mut(&mut self) -> &mut HeaderMap;

    /// Sends the status line and headers.
    fn commit(&mut self, status: StatusCode);

    /// Writes body bytes, returning how many were accepted.
    fn write(&mut self, buf: &[u8]) -> io::Result<usize>;

    /// Pushes buffered body bytes to the peer.
    ///
    /// Sinks without an explicit flush can rely on this default no-op.
    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }

    /// Sets a header, replacing any previous values.
    fn set_header(&mut self, name: HeaderName, value: HeaderValue) {
        self.headers_mut().insert(name, value);
    }

    /// Writes all of `buf`, retrying short writes.
    fn write_all(&mut self, mut buf: &[u8]) -> io::Result<()> {
        while !buf.is_empty() {
            match self.write(buf) {
                Ok(0) => return Err(io::ErrorKind::WriteZero.into()),
                Ok(n) => buf = &buf[n..],
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }
}

impl<T: ResponseSink + ?Sized> ResponseSink for &mut T {
    fn headers(&self) -> &HeaderMap {
        (**self).headers()
    }

    fn headers_mut(&mut self) -> &mut HeaderMap {
        (**self).headers_mut()
    }

    fn commit(&mut self, status: StatusCode) {
        (**self).commit(status)
    }

    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        (**self).write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        (**self).flush()
    }
}

/// Adapts a [`ResponseSink`] body to [`io::Write`].
pub(crate) struct BodyWriter<'a, S: ?Sized>(pub(crate) &'a mut S);

impl<S: ResponseSink + ?Sized> io::Write for BodyWriter<'_, S> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.0.flush()
    }
}
