//! Core type definitions for compression operations.

use crate::error::{Error, Result};

/// Compression level presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CompressionLevel {
    /// No compression, just framing (level 0).
    None,

    /// Optimized for speed over ratio (level 1).
    Fast,

    /// Balanced speed and ratio (level 6).
    #[default]
    Default,

    /// Optimized for ratio over speed (level 9).
    Best,

    /// Explicit numeric level.
    Custom(i32),
}

impl CompressionLevel {
    /// Lowest accepted numeric level.
    pub const MIN: i32 = 0;

    /// Highest accepted numeric level.
    pub const MAX: i32 = 9;

    /// Convert to numeric level for algorithms.
    pub fn to_level(self) -> i32 {
        match self {
            CompressionLevel::None => 0,
            CompressionLevel::Fast => 1,
            CompressionLevel::Default => 6,
            CompressionLevel::Best => 9,
            CompressionLevel::Custom(level) => level,
        }
    }

    /// Create from numeric level.
    pub fn from_level(level: i32) -> Self {
        match level {
            0 => CompressionLevel::None,
            1 => CompressionLevel::Fast,
            6 => CompressionLevel::Default,
            9 => CompressionLevel::Best,
            _ => CompressionLevel::Custom(level),
        }
    }

    /// Numeric level checked against `[MIN, MAX]`.
    pub fn validate(self) -> Result<u8> {
        let level = self.to_level();
        if !(Self::MIN..=Self::MAX).contains(&level) {
            return Err(Error::InvalidLevel {
                level,
                min: Self::MIN,
                max: Self::MAX,
            });
        }
        Ok(level as u8)
    }
}

/// Supported compression algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Algorithm {
    /// Deflate - Widely compatible (RFC 1951).
    Deflate,
    /// Zlib - Deflate with header and Adler-32 trailer (RFC 1950).
    Zlib,
}

impl Algorithm {
    /// Get algorithm name as string.
    pub fn name(self) -> &'static str {
        match self {
            Algorithm::Deflate => "deflate",
            Algorithm::Zlib => "zlib",
        }
    }

    /// Bytes of framing around the compressed blocks.
    pub fn framing_overhead(self) -> usize {
        match self {
            Algorithm::Deflate => 0,
            Algorithm::Zlib => 6,
        }
    }
}

/// Compression ratio metrics.
#[derive(Debug, Clone, Copy)]
pub struct CompressionRatio {
    /// Original uncompressed size in bytes.
    pub original_size: usize,
    /// Compressed size in bytes.
    pub compressed_size: usize,
}

impl CompressionRatio {
    /// Create new ratio from sizes.
    pub fn new(original: usize, compressed: usize) -> Self {
        CompressionRatio {
            original_size: original,
            compressed_size: compressed,
        }
    }

    /// Calculate ratio (original / compressed).
    /// Higher is better (more compression).
    pub fn ratio(&self) -> f64 {
        if self.compressed_size == 0 {
            return 0.0;
        }
        self.original_size as f64 / self.compressed_size as f64
    }

    /// Calculate space savings as percentage (0-100).
    pub fn savings_percent(&self) -> f64 {
        if self.original_size == 0 {
            return 0.0;
        }
        (1.0 - (self.compressed_size as f64 / self.original_size as f64)) * 100.0
    }

    /// Calculate bytes saved.
    pub fn bytes_saved(&self) -> isize {
        self.original_size as isize - self.compressed_size as isize
    }

    /// Check if compression was effective (saved space).
    pub fn is_effective(&self) -> bool {
        self.compressed_size < self.original_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_roundtrip() {
        for level in 0..=9 {
            assert_eq!(CompressionLevel::from_level(level).to_level(), level);
        }
        assert_eq!(CompressionLevel::from_level(6), CompressionLevel::Default);
        assert_eq!(CompressionLevel::from_level(3), CompressionLevel::Custom(3));
    }

    #[test]
    fn test_level_validation() {
        assert_eq!(CompressionLevel::Best.validate().unwrap(), 9);
        assert_eq!(CompressionLevel::None.validate().unwrap(), 0);
        assert!(matches!(
            CompressionLevel::Custom(10).validate(),
            Err(Error::InvalidLevel { level: 10, .. })
        ));
        assert!(CompressionLevel::Custom(-1).validate().is_err());
    }

    #[test]
    fn test_ratio() {
        let ratio = CompressionRatio::new(1000, 250);
        assert!((ratio.ratio() - 4.0).abs() < f64::EPSILON);
        assert!((ratio.savings_percent() - 75.0).abs() < 1e-9);
        assert_eq!(ratio.bytes_saved(), 750);
        assert!(ratio.is_effective());
        assert!(!CompressionRatio::new(10, 16).is_effective());
    }
}
