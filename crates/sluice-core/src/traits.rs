//! Core traits for compression and decompression.
//!
//! ## Trait Hierarchy
//!
//! ```text
//! Compressor / Decompressor  (one-shot operations)
//!       ↓
//! StreamingCompressor / StreamingDecompressor  (incremental)
//!       ↓
//! Codec  (combined compress + decompress)
//! ```

use crate::error::Result;
use crate::stats::CompressionStats;
use crate::stream::{Flush, Outcome, StreamState};
use crate::types::{Algorithm, CompressionLevel, CompressionRatio};

/// One-shot compression operations.
pub trait Compressor {
    /// Get the compression algorithm.
    fn algorithm(&self) -> Algorithm;

    /// Get the configured compression level.
    fn level(&self) -> CompressionLevel;

    /// Compress data in one shot.
    ///
    /// # Arguments
    /// * `input` - Data to compress
    ///
    /// # Returns
    /// Compressed data as a vector.
    fn compress(&self, input: &[u8]) -> Result<Vec<u8>>;

    /// Compress data into existing buffer.
    ///
    /// # Arguments
    /// * `input` - Data to compress
    /// * `output` - Buffer to write compressed data
    ///
    /// # Returns
    /// Number of bytes written to output.
    fn compress_to(&self, input: &[u8], output: &mut [u8]) -> Result<usize>;

    /// Calculate maximum compressed size for input length.
    /// Useful for pre-allocating output buffers.
    fn max_compressed_size(&self, input_len: usize) -> usize;
}

/// One-shot decompression operations.
pub trait Decompressor {
    /// Get the decompression algorithm.
    fn algorithm(&self) -> Algorithm;

    /// Decompress data in one shot.
    fn decompress(&self, input: &[u8]) -> Result<Vec<u8>>;

    /// Decompress data into existing buffer.
    ///
    /// # Returns
    /// Number of bytes written to output.
    fn decompress_to(&self, input: &[u8], output: &mut [u8]) -> Result<usize>;

    /// Decompress with known output size (more efficient).
    fn decompress_with_size(&self, input: &[u8], output_size: usize) -> Result<Vec<u8>> {
        let mut output = vec![0u8; output_size];
        let written = self.decompress_to(input, &mut output)?;
        output.truncate(written);
        Ok(output)
    }
}

/// Streaming compression over caller-owned buffers.
///
/// Every call consumes some prefix of `input`, writes some prefix of
/// `output`, and reports both counts. All partial progress is kept inside
/// the compressor, so input and output may be split arbitrarily.
pub trait StreamingCompressor {
    /// Get the compression algorithm.
    fn algorithm(&self) -> Algorithm;

    /// Compress a chunk of data.
    ///
    /// # Arguments
    /// * `input` - Data chunk to compress
    /// * `output` - Buffer for compressed output
    /// * `flush` - Flush mode
    fn compress_chunk(&mut self, input: &[u8], output: &mut [u8], flush: Flush)
        -> Result<Outcome>;

    /// Finish compression and drain remaining data.
    ///
    /// Call repeatedly until the returned status is `StreamEnd`.
    fn finish(&mut self, output: &mut [u8]) -> Result<Outcome> {
        self.compress_chunk(&[], output, Flush::Finish)
    }

    /// Current lifecycle state.
    fn state(&self) -> StreamState;

    /// Totals so far.
    fn stats(&self) -> CompressionStats;

    /// Reset compressor state for reuse.
    fn reset(&mut self);

    /// Release buffers. Every later call fails.
    fn end(&mut self) -> Result<()>;
}

/// Streaming decompression over caller-owned buffers.
pub trait StreamingDecompressor {
    /// Get the decompression algorithm.
    fn algorithm(&self) -> Algorithm;

    /// Decompress a chunk of data.
    ///
    /// `Flush::Finish` tells the decoder no more input follows; a call that
    /// then cannot reach the end of the stream reports `Status::BufError`.
    fn decompress_chunk(
        &mut self,
        input: &[u8],
        output: &mut [u8],
        flush: Flush,
    ) -> Result<Outcome>;

    /// Check if decompression is complete.
    fn is_finished(&self) -> bool;

    /// Current lifecycle state.
    fn state(&self) -> StreamState;

    /// Totals so far.
    fn stats(&self) -> CompressionStats;

    /// Reset decompressor state for reuse.
    fn reset(&mut self);

    /// Release buffers. Every later call fails.
    fn end(&mut self) -> Result<()>;
}

/// Combined codec for both compression and decompression.
pub trait Codec: Compressor + Decompressor {
    /// Create a new codec with default settings.
    fn new() -> Self
    where
        Self: Sized;

    /// Create a new codec with specified level.
    fn with_level(level: CompressionLevel) -> Self
    where
        Self: Sized;

    /// Round-trip test: compress then decompress.
    /// Returns true if data matches.
    fn verify_roundtrip(&self, data: &[u8]) -> Result<bool> {
        let compressed = self.compress(data)?;
        let decompressed = self.decompress(&compressed)?;
        Ok(data == decompressed.as_slice())
    }

    /// Get compression ratio for given data.
    fn measure_ratio(&self, data: &[u8]) -> Result<CompressionRatio> {
        let compressed = self.compress(data)?;
        Ok(CompressionRatio::new(data.len(), compressed.len()))
    }
}

/// Preset-dictionary support for compression.
pub trait DictionaryCompressor: StreamingCompressor {
    /// Prime the history window. Must be called before the first chunk.
    fn set_dictionary(&mut self, dictionary: &[u8]) -> Result<()>;
}

/// Preset-dictionary support for decompression.
pub trait DictionaryDecompressor: StreamingDecompressor {
    /// Supply the dictionary the stream was compressed with.
    /// Must match the dictionary used for compression.
    fn set_dictionary(&mut self, dictionary: &[u8]) -> Result<()>;
}
