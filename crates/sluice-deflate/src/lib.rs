//! # Sluice Deflate
//!
//! Streaming DEFLATE (RFC 1951) and zlib (RFC 1950) compression.
//!
//! Both directions are re-entrant state machines over caller-owned
//! buffers: input and output may be split at any byte, and the stream
//! picks up exactly where the previous call stopped.
//!
//! ## Formats
//!
//! - **Deflate**: Raw DEFLATE (RFC 1951)
//! - **Zlib**: DEFLATE with zlib wrapper and Adler-32 (RFC 1950)
//!
//! ## Example
//!
//! ```ignore
//! use sluice_core::{Codec, CompressionLevel, Flush, Status};
//! use sluice_deflate::{Deflater, ZlibCodec};
//!
//! // One-shot
//! let zlib = ZlibCodec::new();
//! let packed = zlib.compress(b"hello")?;
//!
//! // Streaming
//! let mut deflater = Deflater::zlib(CompressionLevel::Default)?;
//! let mut out = [0u8; 4096];
//! let outcome = deflater.compress(b"hello", &mut out, Flush::Finish)?;
//! assert_eq!(outcome.status, Status::StreamEnd);
//! ```

pub mod adler32;
pub mod bits;
pub mod codec;
pub mod config;
pub mod deflate;
pub mod huffman;
pub mod inflate;
pub mod zlib;

// Re-export main types
pub use adler32::{adler32, Adler32};
pub use codec::{DeflateCodec, ZlibCodec};
pub use config::{DeflateConfig, Format, InflateConfig, Strategy};
pub use deflate::{compress_bound, deflate_bound, Deflater};
pub use inflate::Inflater;

// Re-export raw functions for advanced use
pub use deflate::deflate;
pub use inflate::inflate;
pub use zlib::{zlib_compress, zlib_decompress, zlib_decompress_to};
