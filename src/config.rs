use compression_core::Level;

/// Default minimum declared body size for compression.
pub const DEFAULT_MIN_LENGTH: u64 = 256;

/// Default size below which compressed bodies are buffered to compute an
/// exact Content-Length.
pub const DEFAULT_BUFFER_CEILING: usize = 16 * 1024;

/// Tunables shared by every response a service compresses.
#[derive(Debug, Clone, Copy)]
pub struct CompressionConfig {
    /// Responses declaring a Content-Length below this are not compressed.
    pub min_length: u64,
    /// Responses declaring a Content-Length below this are buffered.
    pub buffer_ceiling: usize,
    /// Encoder level.
    pub level: Level,
}

impl CompressionConfig {
    /// Creates a config with default settings.
    pub fn new() -> Self {
        Self {
            min_length: DEFAULT_MIN_LENGTH,
            buffer_ceiling: DEFAULT_BUFFER_CEILING,
            level: Level::Best,
        }
    }

    /// Sets the minimum declared length required for compression.
    pub fn min_length(mut self, len: u64) -> Self {
        self.min_length = len;
        self
    }

    /// Sets the buffering ceiling.
    ///
    /// A ceiling of zero disables buffering: every compressed response is
    /// streamed without a Content-Length.
    pub fn buffer_ceiling(mut self, size: usize) -> Self {
        self.buffer_ceiling = size;
        self
    }

    /// Sets the compression level.
    pub fn level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Returns whether a body of `declared` bytes should be buffered.
    pub(crate) fn buffers(&self, declared: u64) -> bool {
        declared > 0 && declared < self.buffer_ceiling as u64
    }
}

impl Default for CompressionConfig {
    fn default() -> Self {
        Self::new()
    }
}
