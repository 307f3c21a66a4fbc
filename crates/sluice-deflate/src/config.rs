//! Parameters for deflate and inflate streams.

use sluice_core::{CompressionLevel, Error, Result};

/// Smallest accepted window size (log2). 8 is promoted to 9.
pub const MIN_WINDOW_BITS: u8 = 8;

/// Largest window size (log2), 32 KiB.
pub const MAX_WINDOW_BITS: u8 = 15;

/// Default memory level.
pub const DEFAULT_MEM_LEVEL: u8 = 8;

/// Largest memory level.
pub const MAX_MEM_LEVEL: u8 = 9;

/// Stream framing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Format {
    /// RFC 1950 header and Adler-32 trailer around the deflate data.
    #[default]
    Zlib,
    /// Bare RFC 1951 data.
    Raw,
}

/// Match-finding strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Strategy {
    /// Normal LZ77 + Huffman.
    #[default]
    Default,
    /// Drop short matches (length 5 or less); suits filtered image data.
    Filtered,
    /// Literals only, no string matching.
    HuffmanOnly,
}

/// Configuration for a [`Deflater`](crate::Deflater).
#[derive(Debug, Clone)]
pub struct DeflateConfig {
    /// Compression level.
    pub level: CompressionLevel,
    /// Match-finding strategy.
    pub strategy: Strategy,
    /// Window size as log2, 8..=15.
    pub window_bits: u8,
    /// Memory level 1..=9; sizes the hash table and symbol buffer.
    pub mem_level: u8,
    /// Stream framing.
    pub format: Format,
}

impl Default for DeflateConfig {
    fn default() -> Self {
        Self {
            level: CompressionLevel::Default,
            strategy: Strategy::Default,
            window_bits: MAX_WINDOW_BITS,
            mem_level: DEFAULT_MEM_LEVEL,
            format: Format::Zlib,
        }
    }
}

impl DeflateConfig {
    /// Default configuration at the given level.
    pub fn with_level(level: CompressionLevel) -> Self {
        Self {
            level,
            ..Self::default()
        }
    }

    /// Set the strategy.
    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Set the window size (log2).
    pub fn with_window_bits(mut self, window_bits: u8) -> Self {
        self.window_bits = window_bits;
        self
    }

    /// Set the memory level.
    pub fn with_mem_level(mut self, mem_level: u8) -> Self {
        self.mem_level = mem_level;
        self
    }

    /// Set the framing.
    pub fn with_format(mut self, format: Format) -> Self {
        self.format = format;
        self
    }

    /// Emit raw deflate data without the zlib wrapper.
    pub fn raw(self) -> Self {
        self.with_format(Format::Raw)
    }

    /// Check every field; returns the numeric level.
    pub fn validate(&self) -> Result<u8> {
        let level = self.level.validate()?;
        if !(1..=MAX_MEM_LEVEL).contains(&self.mem_level) {
            return Err(Error::invalid_parameter("mem_level", self.mem_level));
        }
        validate_window_bits(self.window_bits)?;
        Ok(level)
    }

    /// Window bits actually used.
    pub fn effective_window_bits(&self) -> u8 {
        promote_window_bits(self.window_bits)
    }
}

/// Configuration for an [`Inflater`](crate::Inflater).
#[derive(Debug, Clone)]
pub struct InflateConfig {
    /// Largest window (log2) the stream may use, 8..=15.
    pub window_bits: u8,
    /// Stream framing.
    pub format: Format,
    /// Compare the Adler-32 trailer against the decoded data.
    pub verify_checksum: bool,
}

impl Default for InflateConfig {
    fn default() -> Self {
        Self {
            window_bits: MAX_WINDOW_BITS,
            format: Format::Zlib,
            verify_checksum: true,
        }
    }
}

impl InflateConfig {
    /// Set the maximum window size (log2).
    pub fn with_window_bits(mut self, window_bits: u8) -> Self {
        self.window_bits = window_bits;
        self
    }

    /// Set the framing.
    pub fn with_format(mut self, format: Format) -> Self {
        self.format = format;
        self
    }

    /// Expect raw deflate data without the zlib wrapper.
    pub fn raw(self) -> Self {
        self.with_format(Format::Raw)
    }

    /// Enable or disable trailer verification.
    pub fn with_verify_checksum(mut self, verify: bool) -> Self {
        self.verify_checksum = verify;
        self
    }

    /// Check every field.
    pub fn validate(&self) -> Result<()> {
        validate_window_bits(self.window_bits)
    }

    /// Window bits actually used.
    pub fn effective_window_bits(&self) -> u8 {
        promote_window_bits(self.window_bits)
    }
}

fn validate_window_bits(window_bits: u8) -> Result<()> {
    if !(MIN_WINDOW_BITS..=MAX_WINDOW_BITS).contains(&window_bits) {
        return Err(Error::invalid_parameter("window_bits", window_bits));
    }
    Ok(())
}

fn promote_window_bits(window_bits: u8) -> u8 {
    window_bits.max(9)
}
