//! Value Compression
//!
//! Pluggable codecs applied to the serialized form of compressed entries.
//! The store serializes values with serde_json and then hands the bytes
//! to whichever [`Compressor`] it was built with.

use crate::error::{CacheError, Result};

// == Compressor Trait ==
/// Trait for compression implementations
pub trait Compressor: Send + Sync {
    /// Short codec name, used in logs and errors
    fn name(&self) -> &'static str;

    /// Compress data
    fn compress(&self, data: &[u8]) -> Result<Vec<u8>>;

    /// Decompress data
    fn decompress(&self, data: &[u8]) -> Result<Vec<u8>>;
}

// == No-Op Compressor ==
/// Pass-through codec: entries are kept in their serialized form only.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopCompressor;

impl Compressor for NoopCompressor {
    fn name(&self) -> &'static str {
        "none"
    }

    fn compress(&self, data: &[u8]) -> Result<Vec<u8>> {
        Ok(data.to_vec())
    }

    fn decompress(&self, data: &[u8]) -> Result<Vec<u8>> {
        Ok(data.to_vec())
    }
}

// == LZ4 Compressor ==
/// LZ4 block codec. Output is size-prefixed so it can be decompressed
/// without tracking the original length separately.
#[derive(Debug, Clone, Copy)]
pub struct Lz4Compressor {
    level: Option<i32>,
}

impl Lz4Compressor {
    /// Fast mode
    pub fn new() -> Self {
        Self { level: None }
    }

    /// High-compression mode at the given level
    pub fn with_level(level: i32) -> Self {
        Self { level: Some(level) }
    }

    fn mode(&self) -> lz4::block::CompressionMode {
        match self.level {
            Some(level) => lz4::block::CompressionMode::HIGHCOMPRESSION(level),
            None => lz4::block::CompressionMode::DEFAULT,
        }
    }
}

impl Default for Lz4Compressor {
    fn default() -> Self {
        Self::new()
    }
}

impl Compressor for Lz4Compressor {
    fn name(&self) -> &'static str {
        "lz4"
    }

    fn compress(&self, data: &[u8]) -> Result<Vec<u8>> {
        lz4::block::compress(data, Some(self.mode()), true).map_err(|e| {
            CacheError::Compression {
                codec: self.name().to_string(),
                reason: e.to_string(),
            }
        })
    }

    fn decompress(&self, data: &[u8]) -> Result<Vec<u8>> {
        lz4::block::decompress(data, None).map_err(|e| CacheError::Compression {
            codec: self.name().to_string(),
            reason: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_noop_passthrough() {
        let codec = NoopCompressor;
        let data = b"{\"views\":12}";
        assert_eq!(codec.compress(data).unwrap(), data.to_vec());
        assert_eq!(codec.decompress(data).unwrap(), data.to_vec());
    }

    #[test]
    fn test_lz4_shrinks_repetitive_payload() {
        let codec = Lz4Compressor::new();
        let data = "dashboard-row,".repeat(200).into_bytes();

        let compressed = codec.compress(&data).unwrap();
        assert!(compressed.len() < data.len());
        assert_eq!(codec.decompress(&compressed).unwrap(), data);
    }

    #[test]
    fn test_lz4_high_compression_level() {
        let codec = Lz4Compressor::with_level(9);
        let data = "abc".repeat(500).into_bytes();

        let compressed = codec.compress(&data).unwrap();
        assert_eq!(codec.decompress(&compressed).unwrap(), data);
    }

    #[test]
    fn test_lz4_rejects_garbage() {
        let codec = Lz4Compressor::new();
        // Shorter than the 4-byte size prefix
        let result = codec.decompress(&[0x01]);
        assert!(matches!(result, Err(CacheError::Compression { .. })));
    }
}
