//! # Sluice Core
//!
//! Core traits, types, and streaming API for the sluice compression library.
//!
//! ## Design Philosophy
//!
//! - **Caller-owned buffers**: codecs read from and write into slices the
//!   caller provides, never blocking and never allocating per call
//! - **Streaming-first**: every operation can stop at any byte and resume
//! - **Statuses for flow control, errors for failures**: running out of
//!   space is a [`Status`], corrupt data is an [`Error`]
//!
//! ## Core Traits
//!
//! - [`Compressor`] - One-shot compression operations
//! - [`Decompressor`] - One-shot decompression operations
//! - [`Codec`] - Combined compress/decompress capability
//! - [`StreamingCompressor`] - Incremental compression
//! - [`StreamingDecompressor`] - Incremental decompression
//!
//! ## Example
//!
//! ```ignore
//! use sluice_core::{Codec, CompressionLevel};
//! use sluice_deflate::ZlibCodec;
//!
//! let codec = ZlibCodec::with_level(CompressionLevel::Fast);
//! let compressed = codec.compress(data)?;
//! let original = codec.decompress(&compressed)?;
//! ```

pub mod error;
pub mod stats;
pub mod stream;
pub mod traits;
pub mod types;

pub use error::{DataError, Error, ErrorKind, Result};
pub use stats::CompressionStats;
pub use stream::{Flush, Outcome, Status, StreamConfig, StreamState};
pub use traits::{
    Codec, Compressor, Decompressor, DictionaryCompressor, DictionaryDecompressor,
    StreamingCompressor, StreamingDecompressor,
};
pub use types::{Algorithm, CompressionLevel, CompressionRatio};
