//! Zlib format wrapper (RFC 1950).
//!
//! Zlib adds a two-byte header and a big-endian Adler-32 trailer around
//! DEFLATE data. Used by PNG, git objects, and many other formats.
//!
//! The streaming engines write and parse the wrapper themselves; this module
//! holds the header layout and the one-shot helpers.

use sluice_core::{CompressionLevel, Result, StreamConfig};

use crate::config::{Format, InflateConfig};
use crate::deflate::{self, Deflater};
use crate::inflate::{self, Inflater};

/// Zlib compression method: DEFLATE.
pub const CM_DEFLATE: u8 = 8;

/// Header length (CMF, FLG).
pub const HEADER_SIZE: usize = 2;

/// Trailer length (Adler-32).
pub const TRAILER_SIZE: usize = 4;

/// Preset dictionary flag in FLG.
pub const FDICT: u16 = 0x20;

/// Build the CMF/FLG pair for a stream.
///
/// `level_flags` is the two-bit FLEVEL hint; FCHECK is chosen so the pair
/// read as a big-endian `u16` is a multiple of 31.
pub fn header(window_bits: u8, level_flags: u8, dictionary: bool) -> u16 {
    let cmf = (CM_DEFLATE as u16) | (((window_bits - 8) as u16) << 4);
    let mut header = (cmf << 8) | ((level_flags as u16) << 6);
    if dictionary {
        header |= FDICT;
    }
    header + 31 - header % 31
}

/// Compress data with zlib wrapper.
pub fn zlib_compress(input: &[u8], level: CompressionLevel) -> Result<Vec<u8>> {
    let mut deflater = Deflater::zlib(level)?;
    let capacity = deflate::compress_bound(input.len(), Format::Zlib);
    let mut output = Vec::with_capacity(capacity.min(1 << 20));
    deflate::drive(&mut deflater, input, &mut output, &StreamConfig::default())?;
    Ok(output)
}

/// Decompress zlib-wrapped data, verifying the Adler-32 trailer.
pub fn zlib_decompress(input: &[u8]) -> Result<Vec<u8>> {
    let mut inflater = Inflater::zlib()?;
    let mut output = Vec::new();
    inflate::drive(&mut inflater, input, &mut output, &StreamConfig::default())?;
    Ok(output)
}

/// Decompress zlib data into a caller-sized buffer.
///
/// Decodes straight into `output`; a stream that does not end within it
/// is [`BufferTooSmall`](sluice_core::Error::BufferTooSmall).
pub fn zlib_decompress_to(input: &[u8], output: &mut [u8]) -> Result<usize> {
    inflate::decompress_into(InflateConfig::default(), input, output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sluice_core::{DataError, Error};

    #[test]
    fn test_header_values() {
        // The common zlib headers.
        assert_eq!(header(15, 0, false), 0x7801);
        assert_eq!(header(15, 1, false), 0x785E);
        assert_eq!(header(15, 2, false), 0x789C);
        assert_eq!(header(15, 3, false), 0x78DA);
        assert_eq!(header(15, 2, true) % 31, 0);
        assert_ne!(header(15, 2, true) & FDICT, 0);
    }

    #[test]
    fn test_zlib_roundtrip_empty() {
        let input = b"";
        let compressed = zlib_compress(input, CompressionLevel::Default).unwrap();
        assert_eq!(compressed, [0x78, 0x9C, 0x03, 0x00, 0x00, 0x00, 0x00, 0x01]);
        let decompressed = zlib_decompress(&compressed).unwrap();
        assert_eq!(decompressed, input);
    }

    #[test]
    fn test_zlib_roundtrip_small() {
        let input = b"Hello, World!";
        let compressed = zlib_compress(input, CompressionLevel::Default).unwrap();
        let decompressed = zlib_decompress(&compressed).unwrap();
        assert_eq!(decompressed, input);
    }

    #[test]
    fn test_zlib_roundtrip_large() {
        let pattern = b"The quick brown fox jumps over the lazy dog. ";
        let input: Vec<u8> = pattern.iter().cycle().take(10000).copied().collect();

        let compressed = zlib_compress(&input, CompressionLevel::Default).unwrap();

        // Should compress
        assert!(compressed.len() < input.len());

        let decompressed = zlib_decompress(&compressed).unwrap();
        assert_eq!(decompressed, input);
    }

    #[test]
    fn test_repeated_letter_is_short() {
        let compressed = zlib_compress(b"AAAAAAAAAA", CompressionLevel::Default).unwrap();
        assert!(compressed.len() < 10 + 6);
        assert_eq!(zlib_decompress(&compressed).unwrap(), b"AAAAAAAAAA");
    }

    #[test]
    fn test_trailer_bit_flip_is_data_check_error() {
        let compressed = zlib_compress(b"checksummed payload", CompressionLevel::Default).unwrap();
        let trailer = compressed.len() - TRAILER_SIZE;
        for byte in trailer..compressed.len() {
            for bit in 0..8 {
                let mut corrupted = compressed.clone();
                corrupted[byte] ^= 1 << bit;
                let err = zlib_decompress(&corrupted).unwrap_err();
                assert_eq!(err.data_error(), Some(DataError::IncorrectDataCheck));
                assert_eq!(err.to_string(), "corrupted data: incorrect data check");
            }
        }
    }

    #[test]
    fn test_decompress_to_small_buffer() {
        let compressed = zlib_compress(&[1u8; 100], CompressionLevel::Fast).unwrap();
        let mut small = [0u8; 10];
        let err = zlib_decompress_to(&compressed, &mut small).unwrap_err();
        assert!(matches!(err, Error::BufferTooSmall { required, provided: 10 } if required > 10));
        assert_eq!(small, [1u8; 10]);

        let mut exact = [0u8; 100];
        assert_eq!(zlib_decompress_to(&compressed, &mut exact).unwrap(), 100);
        assert_eq!(exact, [1u8; 100]);

        let mut roomy = [0u8; 200];
        assert_eq!(zlib_decompress_to(&compressed, &mut roomy).unwrap(), 100);
    }

    #[test]
    fn test_decompress_to_errors() {
        let compressed = zlib_compress(b"truncated stream", CompressionLevel::Default).unwrap();
        let mut out = [0u8; 64];
        let err = zlib_decompress_to(&compressed[..compressed.len() - 3], &mut out).unwrap_err();
        assert!(matches!(err, Error::UnexpectedEof { .. }));

        // Header with FDICT set and a DICTID.
        let header = header(15, 2, true).to_be_bytes();
        let with_dict = [header[0], header[1], 0, 0, 0, 1];
        let err = zlib_decompress_to(&with_dict, &mut out).unwrap_err();
        assert!(matches!(err, Error::InvalidDictionary(_)));
    }

    #[test]
    fn test_zlib_interop_decompress() {
        // Compress with flate2, decompress with us
        let input = b"Testing zlib interoperability with flate2 reference.";

        let compressed: Vec<u8> = {
            let mut c = flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::default());
            std::io::Write::write_all(&mut c, input).unwrap();
            c.finish().unwrap()
        };

        let decompressed = zlib_decompress(&compressed).unwrap();
        assert_eq!(decompressed.as_slice(), input);
    }

    #[test]
    fn test_zlib_interop_compress() {
        // Compress with us, decompress with flate2
        let input = b"Testing our zlib compression against flate2.";

        let compressed = zlib_compress(input, CompressionLevel::Default).unwrap();

        let decompressed: Vec<u8> = {
            let mut d = flate2::read::ZlibDecoder::new(&compressed[..]);
            let mut out = Vec::new();
            std::io::Read::read_to_end(&mut d, &mut out).unwrap();
            out
        };

        assert_eq!(decompressed.as_slice(), input);
    }
}
