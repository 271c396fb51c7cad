//! # Configuration
//!
//! Runtime settings for the chunk store and the engine. The configuration is
//! plain data deserialized from JSON; every missing field falls back to its
//! default, so an empty object `{}` is a valid configuration.
//!
//! ```json
//! {
//!     "chunk_distance": 2,
//!     "chunk_size": 32,
//!     "chunk_pad": 2,
//!     "cube_size": 25.0,
//!     "transparent_materials": [7, 9],
//!     "worker_count": 4
//! }
//! ```

use std::path::Path;

use serde::Deserialize;

use crate::error::ChunkerError;
use crate::voxels::addressing::ChunkAddressing;

/// Default neighborhood radius, in chunks, used for missing-chunk scans.
pub const DEFAULT_CHUNK_DISTANCE: i32 = 2;
/// Default chunk edge length in voxels.
pub const DEFAULT_CHUNK_SIZE: u32 = 32;
/// Default number of padding voxels per axis.
pub const DEFAULT_CHUNK_PAD: u32 = 0;
/// Default world units per voxel.
pub const DEFAULT_CUBE_SIZE: f64 = 25.0;
/// Default number of worker threads used by the engine.
pub const DEFAULT_WORKER_COUNT: usize = 4;

/// Settings for chunk addressing, storage and background work.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ChunkerConfig {
    /// Neighborhood radius, in chunks, for missing-chunk scans.
    pub chunk_distance: i32,
    /// Chunk edge length in voxels. Must be a power of two.
    pub chunk_size: u32,
    /// Extra voxels per axis around each chunk, split evenly on both sides. Must be even.
    pub chunk_pad: u32,
    /// World units covered by one voxel.
    pub cube_size: f64,
    /// Material ids rendered as transparent geometry.
    pub transparent_materials: Vec<u32>,
    /// Number of worker threads for generation and meshing.
    pub worker_count: usize,
}

impl Default for ChunkerConfig {
    fn default() -> Self {
        ChunkerConfig {
            chunk_distance: DEFAULT_CHUNK_DISTANCE,
            chunk_size: DEFAULT_CHUNK_SIZE,
            chunk_pad: DEFAULT_CHUNK_PAD,
            cube_size: DEFAULT_CUBE_SIZE,
            transparent_materials: Vec::new(),
            worker_count: DEFAULT_WORKER_COUNT,
        }
    }
}

impl ChunkerConfig {
    /// Parses a configuration from a JSON document.
    ///
    /// # Errors
    /// Returns [`ChunkerError::ConfigParse`] if the document is not valid.
    pub fn from_json_str(json: &str) -> Result<Self, ChunkerError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads and parses a JSON configuration file.
    ///
    /// # Errors
    /// Returns [`ChunkerError::ConfigIo`] if the file cannot be read and
    /// [`ChunkerError::ConfigParse`] if its contents are not valid.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ChunkerError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    /// Checks the addressing settings and derives the bit-level constants.
    ///
    /// # Errors
    /// Fails on a chunk size that is not a power of two, an odd padding or a
    /// cube size that is not positive.
    pub fn validate(&self) -> Result<ChunkAddressing, ChunkerError> {
        ChunkAddressing::new(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = ChunkerConfig::default();
        assert_eq!(config.chunk_distance, 2);
        assert_eq!(config.chunk_size, 32);
        assert_eq!(config.chunk_pad, 0);
        assert_eq!(config.cube_size, 25.0);
        assert!(config.transparent_materials.is_empty());
        assert_eq!(config.worker_count, 4);
    }

    #[test]
    fn empty_object_is_default() {
        let config = ChunkerConfig::from_json_str("{}").unwrap();
        assert_eq!(config, ChunkerConfig::default());
    }

    #[test]
    fn partial_document_overrides_fields() {
        let config =
            ChunkerConfig::from_json_str(r#"{ "chunk_size": 16, "transparent_materials": [3] }"#)
                .unwrap();
        assert_eq!(config.chunk_size, 16);
        assert_eq!(config.transparent_materials, vec![3]);
        assert_eq!(config.chunk_pad, DEFAULT_CHUNK_PAD);
    }

    #[test]
    fn malformed_document_is_parse_error() {
        let err = ChunkerConfig::from_json_str(r#"{ "chunk_size": "big" }"#).unwrap_err();
        assert!(matches!(err, ChunkerError::ConfigParse(_)));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = ChunkerConfig::from_file("/nonexistent/voxel-chunker.json").unwrap_err();
        assert!(matches!(err, ChunkerError::ConfigIo(_)));
    }

    #[test]
    fn validate_rejects_bad_settings() {
        let bad_size = ChunkerConfig {
            chunk_size: 24,
            ..ChunkerConfig::default()
        };
        assert!(matches!(
            bad_size.validate(),
            Err(ChunkerError::InvalidChunkSize(24))
        ));

        let odd_pad = ChunkerConfig {
            chunk_pad: 3,
            ..ChunkerConfig::default()
        };
        assert!(matches!(odd_pad.validate(), Err(ChunkerError::OddChunkPad(3))));

        let zero_cube = ChunkerConfig {
            cube_size: 0.0,
            ..ChunkerConfig::default()
        };
        assert!(matches!(
            zero_cube.validate(),
            Err(ChunkerError::InvalidCubeSize(_))
        ));
    }
}
