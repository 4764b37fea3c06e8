use crate::codec::Codec;
use crate::error::Result;
use compression_codecs::EncodeV2;
use compression_core::Level;
use compression_core::util::{PartialBuffer, WriteBuffer};
use std::fmt;
use std::io::{self, Write};

const OUTPUT_BUFFER_SIZE: usize = 8 * 1024; // 8KB output buffer

/// A streaming encoder that writes its output into a caller-supplied sink.
///
/// The compressor never owns its destination, so the same stream can be
/// pointed at an in-memory buffer or at the network response.
pub(crate) struct Compressor {
    codec: Codec,
    encoder: Box<dyn EncodeV2 + Send>,
    output_buffer: Vec<u8>,
}

impl Compressor {
    /// Opens a compressor for `codec` at `level`.
    pub(crate) fn open(codec: Codec, level: Level) -> Result<Self> {
        Ok(Self {
            codec,
            encoder: codec.encoder(level)?,
            output_buffer: vec![0u8; OUTPUT_BUFFER_SIZE],
        })
    }

    pub(crate) fn codec(&self) -> Codec {
        self.codec
    }

    /// Compresses all of `input`, writing whatever output is ready to `out`.
    pub(crate) fn write<W: Write + ?Sized>(
        &mut self,
        input: &[u8],
        out: &mut W,
    ) -> io::Result<usize> {
        let mut input_buf = PartialBuffer::new(input);

        // Keep encoding until all input is consumed
        loop {
            let consumed = input_buf.written_len();
            let mut output = WriteBuffer::new_initialized(self.output_buffer.as_mut_slice());
            self.encoder.encode(&mut input_buf, &mut output)?;

            let written = output.written_len();
            if written > 0 {
                out.write_all(&self.output_buffer[..written])?;
            }

            if input_buf.written_len() >= input.len() {
                break;
            }

            if is_stalled(consumed, input_buf.written_len(), written) {
                return Err(io::Error::new(
                    io::ErrorKind::WriteZero,
                    "encoder made no progress",
                ));
            }
        }

        Ok(input.len())
    }

    /// Sync-flushes pending compressed bytes to `out` without ending the stream.
    pub(crate) fn flush<W: Write + ?Sized>(&mut self, out: &mut W) -> io::Result<()> {
        loop {
            let mut output = WriteBuffer::new_initialized(self.output_buffer.as_mut_slice());
            let done = self.encoder.flush(&mut output)?;

            let written = output.written_len();
            if written > 0 {
                out.write_all(&self.output_buffer[..written])?;
            }
            if done {
                return Ok(());
            }
        }
    }

    /// Ends the stream, writing the remaining output and the format trailer.
    pub(crate) fn finish<W: Write + ?Sized>(mut self, out: &mut W) -> io::Result<()> {
        loop {
            let mut output = WriteBuffer::new_initialized(self.output_buffer.as_mut_slice());
            let done = self.encoder.finish(&mut output)?;

            let written = output.written_len();
            if written > 0 {
                out.write_all(&self.output_buffer[..written])?;
            }
            if done {
                return Ok(());
            }
        }
    }
}

/// A pass that neither consumed input nor produced output will never finish.
fn is_stalled(consumed_before: usize, consumed_after: usize, written: usize) -> bool {
    written == 0 && consumed_after == consumed_before
}

impl fmt::Debug for Compressor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Compressor")
            .field("codec", &self.codec)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    #[cfg(feature = "gzip")]
    fn gunzip(data: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        flate2::read::GzDecoder::new(data)
            .read_to_end(&mut out)
            .unwrap();
        out
    }

    #[test]
    #[cfg(feature = "gzip")]
    fn test_gzip_roundtrip_in_chunks() {
        let mut compressor = Compressor::open(Codec::Gzip, Level::Best).unwrap();
        let mut out = Vec::new();

        assert_eq!(compressor.write(b"hello ", &mut out).unwrap(), 6);
        assert_eq!(compressor.write(b"world", &mut out).unwrap(), 5);
        compressor.finish(&mut out).unwrap();

        // gzip magic
        assert_eq!(&out[..2], &[0x1f, 0x8b]);
        assert_eq!(gunzip(&out), b"hello world");
    }

    #[test]
    #[cfg(feature = "deflate")]
    fn test_deflate_is_raw() {
        let mut compressor = Compressor::open(Codec::Deflate, Level::Default).unwrap();
        let mut out = Vec::new();
        compressor.write(b"raw deflate stream", &mut out).unwrap();
        compressor.finish(&mut out).unwrap();

        let mut decoded = Vec::new();
        flate2::read::DeflateDecoder::new(out.as_slice())
            .read_to_end(&mut decoded)
            .unwrap();
        assert_eq!(decoded, b"raw deflate stream");
    }

    #[test]
    #[cfg(feature = "gzip")]
    fn test_flush_keeps_stream_open() {
        let mut compressor = Compressor::open(Codec::Gzip, Level::Best).unwrap();
        let mut out = Vec::new();
        compressor.write(b"partial", &mut out).unwrap();
        compressor.flush(&mut out).unwrap();
        let flushed = out.len();
        assert!(flushed > 0);

        compressor.finish(&mut out).unwrap();
        assert!(out.len() > flushed);
        assert_eq!(gunzip(&out), b"partial");
    }

    #[test]
    #[cfg(feature = "gzip")]
    fn test_large_input_spans_output_buffer() {
        let input: Vec<u8> = (0..200_000u32)
            .map(|i| (i.wrapping_mul(2654435761) >> 24) as u8)
            .collect();
        let mut compressor = Compressor::open(Codec::Gzip, Level::Fastest).unwrap();
        let mut out = Vec::new();
        assert_eq!(compressor.write(&input, &mut out).unwrap(), input.len());
        compressor.finish(&mut out).unwrap();
        assert_eq!(gunzip(&out), input);
    }

    #[test]
    fn test_stall_detected_after_partial_progress() {
        // First pass consumed input, later pass moved nothing
        assert!(!is_stalled(0, 4096, 0));
        assert!(is_stalled(4096, 4096, 0));

        // Output alone counts as progress
        assert!(!is_stalled(4096, 4096, 512));
    }

    #[test]
    #[cfg(feature = "gzip")]
    fn test_empty_stream_is_valid() {
        let compressor = Compressor::open(Codec::Gzip, Level::Best).unwrap();
        let mut out = Vec::new();
        compressor.finish(&mut out).unwrap();
        assert!(gunzip(&out).is_empty());
    }
}
