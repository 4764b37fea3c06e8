use crate::codec::Codec;
use std::io;
use std::sync::Arc;

/// Errors produced while compressing a response.
///
/// Every variant is cheap to clone so that a [`CompressionSink`] can keep
/// returning the first failure it saw from all later operations.
///
/// [`CompressionSink`]: crate::CompressionSink
#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    /// No encoder is compiled in for the codec.
    #[error("no encoder registered for {0}")]
    UnsupportedCodec(Codec),

    /// The encoder could not be constructed.
    #[error("opening {codec} compressor failed")]
    CompressorOpenFailed {
        /// Codec that was being opened.
        codec: Codec,
        /// Underlying cause.
        #[source]
        source: Arc<io::Error>,
    },

    /// Writing body bytes through the codec or to the response failed.
    #[error("write in compression sink failed")]
    WriteFailed(#[source] Arc<io::Error>),

    /// Flushing the codec or the response failed.
    #[error("flushing compression sink failed")]
    FlushFailed(#[source] Arc<io::Error>),

    /// Ending the compressed stream failed.
    #[error("closing compression sink failed")]
    CloseFailed(#[source] Arc<io::Error>),

    /// Transferring the buffered body to the response failed.
    #[error("copying buffered body to response failed")]
    CopyFailed(#[source] Arc<io::Error>),

    /// The sink was written to after it was closed.
    #[error("compression sink is closed")]
    Closed,
}

impl Error {
    pub(crate) fn write(err: io::Error) -> Self {
        Error::WriteFailed(Arc::new(err))
    }

    pub(crate) fn flush(err: io::Error) -> Self {
        Error::FlushFailed(Arc::new(err))
    }

    pub(crate) fn close(err: io::Error) -> Self {
        Error::CloseFailed(Arc::new(err))
    }

    pub(crate) fn copy(err: io::Error) -> Self {
        Error::CopyFailed(Arc::new(err))
    }
}

impl From<Error> for io::Error {
    fn from(err: Error) -> Self {
        io::Error::other(err)
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_source_is_preserved() {
        let err = Error::write(io::Error::new(io::ErrorKind::BrokenPipe, "peer gone"));
        let source = err.source().unwrap();
        assert_eq!(source.to_string(), "peer gone");
    }

    #[test]
    fn test_clone_shares_cause() {
        let err = Error::close(io::Error::other("boom"));
        let cloned = err.clone();
        assert_eq!(err.to_string(), cloned.to_string());
        assert_eq!(cloned.source().unwrap().to_string(), "boom");
    }

    #[test]
    fn test_into_io_error() {
        let io_err: io::Error = Error::Closed.into();
        assert_eq!(io_err.kind(), io::ErrorKind::Other);
        assert_eq!(io_err.to_string(), "compression sink is closed");
    }
}
