use crate::error::{Error, Result};
use compression_codecs::EncodeV2;
#[cfg(feature = "deflate")]
use compression_codecs::deflate::DeflateEncoder;
#[cfg(feature = "gzip")]
use compression_codecs::gzip::GzipEncoder;
use compression_core::Level;
use http::header::{self, HeaderMap};
use std::fmt;
use std::io;
use std::sync::Arc;

/// Supported compression codecs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Codec {
    /// Gzip compression (RFC 1952).
    Gzip,
    /// Raw deflate compression (RFC 1951).
    Deflate,
}

impl Codec {
    /// Every codec, in registry order.
    pub const ALL: [Codec; 2] = [Codec::Gzip, Codec::Deflate];

    /// Returns the Content-Encoding header value for this codec.
    pub fn content_encoding(&self) -> &'static str {
        match self {
            Codec::Gzip => "gzip",
            Codec::Deflate => "deflate",
        }
    }

    /// Returns whether an encoder for this codec is compiled in.
    pub fn is_enabled(&self) -> bool {
        match self {
            Codec::Gzip => cfg!(feature = "gzip"),
            Codec::Deflate => cfg!(feature = "deflate"),
        }
    }

    /// Looks up an enabled codec by its exact, case-sensitive token.
    pub fn from_token(token: &str) -> Option<Codec> {
        Codec::ALL
            .into_iter()
            .find(|codec| codec.is_enabled() && codec.content_encoding() == token)
    }

    /// Picks a codec from an Accept-Encoding header value.
    ///
    /// Tokens are tried in the order the client listed them and the first
    /// exact match wins. Quality values are not interpreted, so `gzip;q=0.5`
    /// is an unknown token rather than a weighted `gzip`.
    pub fn from_accept_encoding(header: &str) -> Option<Codec> {
        header.split(',').map(str::trim).find_map(Codec::from_token)
    }

    /// Creates a new encoder for this codec at the given level.
    pub(crate) fn encoder(&self, level: Level) -> Result<Box<dyn EncodeV2 + Send>> {
        check_level(*self, level)?;

        match self {
            #[cfg(feature = "gzip")]
            Codec::Gzip => Ok(Box::new(GzipEncoder::new(level.into()))),
            #[cfg(feature = "deflate")]
            Codec::Deflate => Ok(Box::new(DeflateEncoder::new(level.into()))),
            #[allow(unreachable_patterns)]
            codec => Err(Error::UnsupportedCodec(*codec)),
        }
    }
}

impl fmt::Display for Codec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.content_encoding())
    }
}

/// Reads Accept-Encoding from request headers and picks a codec.
pub fn negotiate(headers: &HeaderMap) -> Option<Codec> {
    headers
        .get(header::ACCEPT_ENCODING)
        .and_then(|v| v.to_str().ok())
        .and_then(Codec::from_accept_encoding)
}

/// Rejects precise levels the flate family cannot represent.
fn check_level(codec: Codec, level: Level) -> Result<()> {
    match level {
        Level::Precise(quality) if !(0..=9).contains(&quality) => {
            Err(Error::CompressorOpenFailed {
                codec,
                source: Arc::new(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("compression level {quality} out of range 0..=9"),
                )),
            })
        }
        _ => Ok(()),
    }
}
