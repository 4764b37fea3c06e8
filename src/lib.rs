//! HTTP response compression for sink-style handlers.
//!
//! This crate provides a [`CompressionService`] (and a Tower
//! [`CompressionLayer`] building it) that wraps a [`Handler`] and compresses
//! the response it writes with gzip or deflate, depending on the client's
//! `Accept-Encoding` header.
//!
//! # Example
//!
//! ```ignore
//! use http_response_compression::{CompressionLayer, Handler, ResponseSink};
//! use tower::ServiceBuilder;
//!
//! let service = ServiceBuilder::new()
//!     .layer(CompressionLayer::new())
//!     .service(|sink: &mut dyn ResponseSink, req: &http::Request<()>| {
//!         // write headers and body to `sink`
//!     });
//!
//! service.call(&mut connection, &request);
//! ```
//!
//! # Negotiation
//!
//! `Accept-Encoding` tokens are tried in the order the client sent them and
//! the first exact (case-sensitive) match of `gzip` or `deflate` wins.
//! Quality values are not interpreted.
//!
//! # Compression Rules
//!
//! A response is compressed only when, at the moment its headers are
//! committed:
//! - the status is `200 OK`
//! - `Content-Length` is present and at least the minimum (default: 256 bytes)
//! - `Content-Type` starts with `text/`, `image/svg`, `application/javascript`
//!   or `application/x-javascript`
//! - no `Trailer` header is set
//! - no `Content-Encoding` header is set
//!
//! # Response Modifications
//!
//! When compression is applied:
//! - `Content-Encoding` header is set to the codec used
//! - `Content-Length` header is removed, and for bodies declared below the
//!   buffering ceiling (default: 16 KiB) it is replaced by the exact
//!   compressed length once the handler is done
//! - `Accept-Ranges` header is removed
//! - `Vary` header includes `Accept-Encoding`

#![deny(missing_docs)]

mod codec;
mod compressor;
mod config;
mod eligibility;
mod error;
mod handler;
mod layer;
mod recorder;
mod response;
mod service;
mod sink;

pub use codec::{Codec, negotiate};
pub use compression_core::Level;
pub use config::{CompressionConfig, DEFAULT_BUFFER_CEILING, DEFAULT_MIN_LENGTH};
pub use eligibility::{content_length, is_eligible};
pub use error::{Error, Result};
pub use handler::Handler;
pub use layer::CompressionLayer;
pub use recorder::ResponseRecorder;
pub use response::ResponseSink;
pub use service::CompressionService;
pub use sink::CompressionSink;
