//! # Error Types
//!
//! Every fallible operation in the crate reports a [`ChunkerError`]. Lookup
//! misses are not errors: they are reported as `None` by the chunk store.

use thiserror::Error;

/// Errors produced while configuring the chunk store, meshing a volume or
/// calling an access path that no longer exists.
#[derive(Error, Debug)]
pub enum ChunkerError {
    /// The configured chunk size is zero or not a power of two.
    #[error("chunk size must be a power of two, got {0}")]
    InvalidChunkSize(u32),

    /// The configured chunk padding cannot be split into two equal halves.
    #[error("chunk padding must be even, got {0}")]
    OddChunkPad(u32),

    /// The configured cube size is not a positive finite number.
    #[error("cube size must be a positive finite number, got {0}")]
    InvalidCubeSize(f64),

    /// A chunk key string is not of the form `"x|y|z"`.
    #[error("invalid chunk key {0:?}")]
    InvalidChunkKey(String),

    /// A generated or registered chunk does not have the configured padded edge length.
    #[error("chunk {coordinate} has edge length {actual}, expected {expected}")]
    ChunkSideMismatch {
        /// Coordinate the chunk was meant for.
        coordinate: crate::voxels::chunk::ChunkCoordinate,
        /// Padded edge length required by the configuration.
        expected: usize,
        /// Edge length of the offered chunk.
        actual: usize,
    },

    /// The voxel buffer handed to the mesher does not match its extents.
    #[error("voxel volume of extents {dims:?} needs {expected:?} voxels, buffer holds {actual}")]
    VolumeSizeMismatch {
        /// Extents of the volume along x, y and z.
        dims: [usize; 3],
        /// Number of voxels implied by the extents, `None` if the product overflows.
        expected: Option<usize>,
        /// Number of voxels actually provided.
        actual: usize,
    },

    /// The configured chunk, padding included, is too large to allocate.
    #[error("chunk size {size} with padding {pad} exceeds the maximum edge length of {max} voxels")]
    ChunkTooLarge {
        /// Configured chunk size.
        size: u32,
        /// Configured chunk padding.
        pad: u32,
        /// Largest allowed padded edge length.
        max: u32,
    },

    /// The generator panicked while filling a chunk.
    #[error("generator panicked while generating chunk {0}")]
    GeneratorPanicked(crate::voxels::chunk::ChunkCoordinate),

    /// A removed access path was called.
    #[error("{name} has been removed, use {replacement}")]
    RemovedOperation {
        /// Name of the removed operation.
        name: &'static str,
        /// Name of the operation that replaces it.
        replacement: &'static str,
    },

    /// The configuration file could not be read.
    #[error("failed to read configuration: {0}")]
    ConfigIo(#[from] std::io::Error),

    /// The configuration file is not valid JSON for [`crate::config::ChunkerConfig`].
    #[error("failed to parse configuration: {0}")]
    ConfigParse(#[from] serde_json::Error),
}
