use crate::config::CompressionConfig;
use crate::service::CompressionService;
use compression_core::Level;
use tower::Layer;

/// A Tower layer that compresses HTTP response bodies.
///
/// This layer wraps handlers and compresses their responses based on the
/// client's Accept-Encoding header.
#[derive(Debug, Clone, Default)]
pub struct CompressionLayer {
    config: CompressionConfig,
}

impl CompressionLayer {
    /// Creates a new compression layer with default settings.
    ///
    /// Responses must declare at least 256 bytes to be compressed, bodies
    /// under 16 KiB are buffered, and the best compression level is used.
    pub fn new() -> Self {
        Self {
            config: CompressionConfig::new(),
        }
    }

    /// Creates a layer from an existing configuration.
    pub fn with_config(config: CompressionConfig) -> Self {
        Self { config }
    }

    /// Sets the minimum declared body size required for compression.
    pub fn min_length(mut self, len: u64) -> Self {
        self.config = self.config.min_length(len);
        self
    }

    /// Sets the size below which compressed bodies are buffered.
    pub fn buffer_ceiling(mut self, size: usize) -> Self {
        self.config = self.config.buffer_ceiling(size);
        self
    }

    /// Sets the compression level.
    pub fn level(mut self, level: Level) -> Self {
        self.config = self.config.level(level);
        self
    }
}

impl<H> Layer<H> for CompressionLayer {
    type Service = CompressionService<H>;

    fn layer(&self, inner: H) -> Self::Service {
        CompressionService::new(inner, self.config)
    }
}
