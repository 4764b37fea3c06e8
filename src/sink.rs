use crate::codec::Codec;
use crate::compressor::Compressor;
use crate::config::CompressionConfig;
use crate::eligibility::{add_vary_accept_encoding, content_length, is_eligible};
use crate::error::{Error, Result};
use crate::response::{BodyWriter, ResponseSink};
use bytes::{BufMut, BytesMut};
use http::StatusCode;
use http::header::{self, HeaderMap, HeaderValue};
use std::io::{self, Write};
use std::mem;

/// Lifecycle of a [`CompressionSink`].
#[derive(Debug)]
enum State {
    /// Headers not yet committed.
    Pending,
    /// Committed without compression.
    Passthrough,
    /// Compressing into memory; the real commit waits for close.
    Buffering {
        status: StatusCode,
        compressor: Compressor,
        buf: BytesMut,
    },
    /// Compressing straight into the inner sink.
    Streaming { compressor: Compressor },
    /// Finalized.
    Closed,
}

/// A [`ResponseSink`] decorator that compresses eligible bodies.
///
/// Whether to compress is decided once, on the first commit (explicit or
/// implied by the first write). Small compressed bodies are held in memory
/// until [`close`](CompressionSink::close) so an exact Content-Length can be
/// sent; larger ones are streamed without one.
///
/// The first failure is latched: every later write, flush or close returns
/// it without touching the inner sink again.
#[derive(Debug)]
pub struct CompressionSink<S> {
    inner: S,
    codec: Codec,
    config: CompressionConfig,
    state: State,
    error: Option<Error>,
}

impl<S: ResponseSink> CompressionSink<S> {
    /// Wraps `inner`, compressing with `codec` when the response qualifies.
    pub fn new(inner: S, codec: Codec, config: CompressionConfig) -> Self {
        Self {
            inner,
            codec,
            config,
            state: State::Pending,
            error: None,
        }
    }

    /// Returns the latched error, if any.
    pub fn error(&self) -> Option<&Error> {
        self.error.as_ref()
    }

    /// Returns whether the body is being compressed.
    pub fn is_compressing(&self) -> bool {
        matches!(
            self.state,
            State::Buffering { .. } | State::Streaming { .. }
        )
    }

    /// Returns a reference to the inner sink.
    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Consumes this sink, returning the inner sink.
    ///
    /// Call [`close`](CompressionSink::close) first; anything still held by
    /// the encoder or the buffer is dropped.
    pub fn into_inner(self) -> S {
        self.inner
    }

    fn latch(&mut self, err: Error) -> Error {
        self.error = Some(err.clone());
        err
    }

    /// Commits the status and headers, deciding how the body is encoded.
    ///
    /// Only the first call has any effect.
    pub fn commit_header(&mut self, status: StatusCode) {
        if !matches!(self.state, State::Pending) {
            return;
        }

        if !is_eligible(status, self.inner.headers(), self.config.min_length) {
            tracing::debug!(%status, "response not eligible for compression");
            self.inner.commit(status);
            self.state = State::Passthrough;
            return;
        }

        let compressor = match Compressor::open(self.codec, self.config.level) {
            Ok(compressor) => compressor,
            Err(err) => {
                tracing::debug!(error = %err, "falling back to uncompressed response");
                self.latch(err);
                self.inner.commit(status);
                self.state = State::Passthrough;
                return;
            }
        };

        let declared = content_length(self.inner.headers());
        rewrite_headers(self.inner.headers_mut(), compressor.codec());

        if self.config.buffers(declared) {
            tracing::debug!(codec = %self.codec, declared, "buffering compressed response");
            self.state = State::Buffering {
                status,
                compressor,
                buf: BytesMut::with_capacity(self.config.buffer_ceiling),
            };
        } else {
            tracing::debug!(codec = %self.codec, declared, "streaming compressed response");
            self.inner.commit(status);
            self.state = State::Streaming { compressor };
        }
    }

    /// Writes body bytes, committing `200 OK` first if nothing was committed.
    pub fn write_body(&mut self, data: &[u8]) -> Result<usize> {
        if let Some(err) = &self.error {
            return Err(err.clone());
        }

        if matches!(self.state, State::Pending) {
            self.commit_header(StatusCode::OK);
            if let Some(err) = &self.error {
                return Err(err.clone());
            }
        }

        let result = match &mut self.state {
            State::Pending | State::Passthrough => self.inner.write(data),
            State::Buffering {
                compressor, buf, ..
            } => compressor.write(data, &mut buf.writer()),
            State::Streaming { compressor } => {
                compressor.write(data, &mut BodyWriter(&mut self.inner))
            }
            State::Closed => return Err(Error::Closed),
        };

        result.map_err(|e| self.latch(Error::write(e)))
    }

    /// Pushes compressed output so far and flushes the inner sink.
    ///
    /// While buffering nothing has reached the inner sink yet, so only the
    /// encoder is flushed. The inner flush is skipped there on purpose: it
    /// could push out headers before the exact Content-Length is known.
    pub fn flush_body(&mut self) -> Result<()> {
        if let Some(err) = &self.error {
            return Err(err.clone());
        }

        let result = match &mut self.state {
            State::Buffering { compressor, buf, .. } => compressor.flush(&mut buf.writer()),
            State::Streaming { compressor } => compressor
                .flush(&mut BodyWriter(&mut self.inner))
                .and_then(|()| self.inner.flush()),
            State::Pending | State::Passthrough => self.inner.flush(),
            State::Closed => Ok(()),
        };

        result.map_err(|e| self.latch(Error::flush(e)))
    }

    /// Finalizes the response.
    ///
    /// Ends the compressed stream, or for buffered responses sets the exact
    /// Content-Length, commits the deferred status and copies the body out.
    /// The inner sink is flushed on every path. Closing twice is a no-op.
    pub fn close(&mut self) -> Result<()> {
        if let Some(err) = &self.error {
            return Err(err.clone());
        }
        if matches!(self.state, State::Closed) {
            return Ok(());
        }

        let result = match mem::replace(&mut self.state, State::Closed) {
            State::Pending | State::Passthrough | State::Closed => Ok(()),
            State::Streaming { compressor } => compressor
                .finish(&mut BodyWriter(&mut self.inner))
                .map_err(Error::close),
            State::Buffering {
                status,
                compressor,
                buf,
            } => self.emit_buffered(status, compressor, buf),
        };

        let flushed = self.inner.flush().map_err(Error::flush);
        match result.and(flushed) {
            Ok(()) => Ok(()),
            Err(err) => Err(self.latch(err)),
        }
    }

    fn emit_buffered(
        &mut self,
        status: StatusCode,
        compressor: Compressor,
        buf: BytesMut,
    ) -> Result<()> {
        let mut writer = buf.writer();
        compressor.finish(&mut writer).map_err(Error::close)?;
        let body = writer.into_inner().freeze();

        self.inner
            .headers_mut()
            .insert(header::CONTENT_LENGTH, HeaderValue::from(body.len()));
        self.inner.commit(status);
        self.inner.write_all(&body).map_err(Error::copy)
    }
}

/// Rewrites headers for a response about to be compressed with `codec`.
fn rewrite_headers(headers: &mut HeaderMap, codec: Codec) {
    // Compressed size is not known up front
    headers.remove(header::CONTENT_LENGTH);

    // Ranges cannot be served from the compressed representation
    headers.remove(header::ACCEPT_RANGES);

    headers.insert(
        header::CONTENT_ENCODING,
        HeaderValue::from_static(codec.content_encoding()),
    );
    add_vary_accept_encoding(headers);
}

impl<S: ResponseSink> ResponseSink for CompressionSink<S> {
    fn headers(&self) -> &HeaderMap {
        self.inner.headers()
    }

    fn headers_mut(&mut self) -> &mut HeaderMap {
        self.inner.headers_mut()
    }

    fn commit(&mut self, status: StatusCode) {
        self.commit_header(status);
    }

    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        Ok(self.write_body(buf)?)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(self.flush_body()?)
    }
}

impl<S: ResponseSink> Write for CompressionSink<S> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        Ok(self.write_body(buf)?)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(self.flush_body()?)
    }
}
