//! Statistics for compression operations.

use crate::types::{Algorithm, CompressionRatio};

/// Statistics from a compression/decompression operation.
#[derive(Debug, Clone, Default)]
pub struct CompressionStats {
    /// Algorithm used.
    pub algorithm: Option<Algorithm>,

    /// Original (uncompressed) size in bytes.
    pub original_size: usize,

    /// Compressed size in bytes.
    pub compressed_size: usize,

    /// Number of blocks processed.
    pub blocks_processed: usize,

    /// Whether a preset dictionary was used.
    pub dictionary_used: bool,

    /// Checksum (if computed).
    pub checksum: Option<u64>,
}

impl CompressionStats {
    /// Create new empty stats.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create stats from a completed operation.
    pub fn from_operation(algorithm: Algorithm, original_size: usize, compressed_size: usize) -> Self {
        CompressionStats {
            algorithm: Some(algorithm),
            original_size,
            compressed_size,
            blocks_processed: 1,
            ..Default::default()
        }
    }

    /// Get compression ratio.
    pub fn ratio(&self) -> CompressionRatio {
        CompressionRatio::new(self.original_size, self.compressed_size)
    }

    /// Get space savings as percentage.
    pub fn savings_percent(&self) -> f64 {
        self.ratio().savings_percent()
    }

    /// Merge stats from multiple operations.
    pub fn merge(&mut self, other: &CompressionStats) {
        self.original_size += other.original_size;
        self.compressed_size += other.compressed_size;
        self.blocks_processed += other.blocks_processed;
        self.dictionary_used |= other.dictionary_used;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge() {
        let mut a = CompressionStats::from_operation(Algorithm::Zlib, 100, 40);
        let b = CompressionStats::from_operation(Algorithm::Zlib, 300, 60);
        a.merge(&b);
        assert_eq!(a.original_size, 400);
        assert_eq!(a.compressed_size, 100);
        assert_eq!(a.blocks_processed, 2);
        assert!((a.savings_percent() - 75.0).abs() < 1e-9);
    }
}
