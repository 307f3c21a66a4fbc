//! Codec implementations for raw DEFLATE and zlib.

use sluice_core::{
    Algorithm, Codec, CompressionLevel, Compressor, Decompressor, Error, Flush, Result, Status,
};

use crate::config::{DeflateConfig, Format, InflateConfig};
use crate::deflate::{compress_bound, deflate, Deflater};
use crate::inflate::{decompress_into, inflate};
use crate::zlib::{zlib_compress, zlib_decompress};

/// Compress straight into `output`; the stream must end within it.
fn compress_into(config: DeflateConfig, input: &[u8], output: &mut [u8]) -> Result<usize> {
    let format = config.format;
    let mut deflater = Deflater::new(config)?;
    let outcome = deflater.compress(input, output, Flush::Finish)?;
    if outcome.status != Status::StreamEnd {
        return Err(Error::buffer_too_small(
            compress_bound(input.len(), format),
            output.len(),
        ));
    }
    Ok(outcome.produced)
}

// ============================================================================
// Deflate Codec
// ============================================================================

/// Raw DEFLATE codec.
#[derive(Debug, Clone)]
pub struct DeflateCodec {
    level: CompressionLevel,
}

impl DeflateCodec {
    /// Create a new DEFLATE codec.
    pub fn new() -> Self {
        Self {
            level: CompressionLevel::Default,
        }
    }

    /// Create with compression level.
    pub fn with_level(level: CompressionLevel) -> Self {
        Self { level }
    }
}

impl Default for DeflateCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Compressor for DeflateCodec {
    fn algorithm(&self) -> Algorithm {
        Algorithm::Deflate
    }

    fn level(&self) -> CompressionLevel {
        self.level
    }

    fn compress(&self, input: &[u8]) -> Result<Vec<u8>> {
        deflate(input, self.level)
    }

    fn compress_to(&self, input: &[u8], output: &mut [u8]) -> Result<usize> {
        compress_into(DeflateConfig::with_level(self.level).raw(), input, output)
    }

    fn max_compressed_size(&self, input_len: usize) -> usize {
        compress_bound(input_len, Format::Raw)
    }
}

impl Decompressor for DeflateCodec {
    fn algorithm(&self) -> Algorithm {
        Algorithm::Deflate
    }

    fn decompress(&self, input: &[u8]) -> Result<Vec<u8>> {
        let mut output = Vec::new();
        inflate(input, &mut output)?;
        Ok(output)
    }

    fn decompress_to(&self, input: &[u8], output: &mut [u8]) -> Result<usize> {
        decompress_into(InflateConfig::default().raw(), input, output)
    }
}

impl Codec for DeflateCodec {
    fn new() -> Self {
        DeflateCodec::new()
    }

    fn with_level(level: CompressionLevel) -> Self {
        DeflateCodec::with_level(level)
    }
}

// ============================================================================
// Zlib Codec
// ============================================================================

/// Zlib codec (DEFLATE with zlib wrapper).
#[derive(Debug, Clone)]
pub struct ZlibCodec {
    level: CompressionLevel,
}

impl ZlibCodec {
    /// Create a new Zlib codec.
    pub fn new() -> Self {
        Self {
            level: CompressionLevel::Default,
        }
    }

    /// Create with compression level.
    pub fn with_level(level: CompressionLevel) -> Self {
        Self { level }
    }
}

impl Default for ZlibCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Compressor for ZlibCodec {
    fn algorithm(&self) -> Algorithm {
        Algorithm::Zlib
    }

    fn level(&self) -> CompressionLevel {
        self.level
    }

    fn compress(&self, input: &[u8]) -> Result<Vec<u8>> {
        zlib_compress(input, self.level)
    }

    fn compress_to(&self, input: &[u8], output: &mut [u8]) -> Result<usize> {
        compress_into(DeflateConfig::with_level(self.level), input, output)
    }

    fn max_compressed_size(&self, input_len: usize) -> usize {
        compress_bound(input_len, Format::Zlib)
    }
}

impl Decompressor for ZlibCodec {
    fn algorithm(&self) -> Algorithm {
        Algorithm::Zlib
    }

    fn decompress(&self, input: &[u8]) -> Result<Vec<u8>> {
        zlib_decompress(input)
    }

    fn decompress_to(&self, input: &[u8], output: &mut [u8]) -> Result<usize> {
        decompress_into(InflateConfig::default(), input, output)
    }
}

impl Codec for ZlibCodec {
    fn new() -> Self {
        ZlibCodec::new()
    }

    fn with_level(level: CompressionLevel) -> Self {
        ZlibCodec::with_level(level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deflate_codec_roundtrip() {
        let codec = DeflateCodec::new();
        let input = b"Test DEFLATE codec roundtrip!";

        let compressed = codec.compress(input).unwrap();
        let decompressed = codec.decompress(&compressed).unwrap();

        assert_eq!(decompressed.as_slice(), input);
    }

    #[test]
    fn test_zlib_codec_roundtrip() {
        let codec = ZlibCodec::new();
        let input = b"Test Zlib codec roundtrip!";

        let compressed = codec.compress(input).unwrap();
        let decompressed = codec.decompress(&compressed).unwrap();

        assert_eq!(decompressed.as_slice(), input);
    }

    #[test]
    fn test_compression_levels() {
        let input = b"Testing compression levels for the DEFLATE family.";

        for level in (0..=9).map(CompressionLevel::from_level) {
            let deflate = DeflateCodec::with_level(level);
            let c = deflate.compress(input).unwrap();
            let d = deflate.decompress(&c).unwrap();
            assert_eq!(d.as_slice(), input);

            let zlib = ZlibCodec::with_level(level);
            let c = zlib.compress(input).unwrap();
            let d = zlib.decompress(&c).unwrap();
            assert_eq!(d.as_slice(), input);
        }
    }

    #[test]
    fn test_invalid_level_rejected() {
        let codec = ZlibCodec::with_level(CompressionLevel::Custom(12));
        let err = codec.compress(b"data").unwrap_err();
        assert!(matches!(err, Error::InvalidLevel { level: 12, .. }));
    }

    #[test]
    fn test_compress_to_matches_compress() {
        let codec = ZlibCodec::with_level(CompressionLevel::Best);
        let input = b"one-shot into a caller buffer, one-shot into a caller buffer";

        let mut buf = vec![0u8; codec.max_compressed_size(input.len())];
        let written = codec.compress_to(input, &mut buf).unwrap();
        assert_eq!(&buf[..written], codec.compress(input).unwrap().as_slice());

        let mut tiny = [0u8; 4];
        let err = codec.compress_to(input, &mut tiny).unwrap_err();
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_decompress_to_sizes() {
        let codec = DeflateCodec::new();
        let input = [42u8; 300];
        let compressed = codec.compress(&input).unwrap();

        let out = codec.decompress_with_size(&compressed, 300).unwrap();
        assert_eq!(out, input);

        let mut short = [0u8; 299];
        let err = codec.decompress_to(&compressed, &mut short).unwrap_err();
        assert!(matches!(err, Error::BufferTooSmall { .. }));

        let err = codec
            .decompress_to(&compressed[..compressed.len() - 1], &mut [0u8; 400])
            .unwrap_err();
        assert!(matches!(err, Error::UnexpectedEof { .. }));
    }

    #[test]
    fn test_verify_roundtrip() {
        let deflate = DeflateCodec::new();
        let zlib = ZlibCodec::new();

        let input = b"Verify roundtrip functionality.";

        assert!(deflate.verify_roundtrip(input).unwrap());
        assert!(zlib.verify_roundtrip(input).unwrap());
        assert!(zlib.measure_ratio(&[0u8; 4096]).unwrap().is_effective());
    }
}
