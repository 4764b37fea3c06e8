use crate::response::ResponseSink;
use bytes::{Bytes, BytesMut};
use http::{HeaderMap, Response, StatusCode};
use http_body_util::Full;
use std::io;

/// An in-memory [`ResponseSink`].
///
/// Records the committed status, headers and body so the result can be
/// inspected or turned into an [`http::Response`]. Writing before an explicit
/// commit commits `200 OK`, the way most HTTP servers behave.
#[derive(Debug, Default)]
pub struct ResponseRecorder {
    headers: HeaderMap,
    status: Option<StatusCode>,
    committed_headers: Option<HeaderMap>,
    body: BytesMut,
    commits: usize,
    flushes: usize,
}

impl ResponseRecorder {
    /// Creates an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the committed status, if any.
    pub fn status(&self) -> Option<StatusCode> {
        self.status
    }

    /// Returns the headers as they were when first committed.
    pub fn committed_headers(&self) -> Option<&HeaderMap> {
        self.committed_headers.as_ref()
    }

    /// Returns the body bytes written so far.
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Returns how many times `commit` was called.
    pub fn commit_count(&self) -> usize {
        self.commits
    }

    /// Returns how many times `flush` was called.
    pub fn flush_count(&self) -> usize {
        self.flushes
    }

    /// Converts the recording into an [`http::Response`].
    ///
    /// Headers are taken from the first commit. A recorder that was never
    /// committed yields `200 OK` with its current headers.
    pub fn into_response(self) -> Response<Full<Bytes>> {
        let mut response = Response::new(Full::new(self.body.freeze()));
        *response.status_mut() = self.status.unwrap_or(StatusCode::OK);
        *response.headers_mut() = self.committed_headers.unwrap_or(self.headers);
        response
    }
}

impl ResponseSink for ResponseRecorder {
    fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    fn commit(&mut self, status: StatusCode) {
        self.commits += 1;
        if self.status.is_none() {
            self.status = Some(status);
            self.committed_headers = Some(self.headers.clone());
        }
    }

    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.status.is_none() {
            self.commit(StatusCode::OK);
        }
        self.body.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.flushes += 1;
        Ok(())
    }
}
