#![warn(rustdoc::missing_crate_level_docs)]
#![warn(rustdoc::invalid_rust_codeblocks)]

//! # Voxel Chunker
//!
//! A chunked voxel store with a greedy mesher that keeps transparent geometry
//! apart from opaque geometry.
//!
//! ## Key Modules
//!
//! * `voxels` - Voxel ids, chunk addressing, chunks, generators and the chunk store
//! * `meshing` - Greedy meshing of voxel volumes into opaque and transparent quads
//! * `engine` - Background generation and meshing of the chunks around an observer
//! * `task_management` - The worker pool the engine runs on
//! * `config` / `error` - Settings loaded from JSON and the crate error type
//!
//! ## Usage
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use voxel_chunker::config::ChunkerConfig;
//! use voxel_chunker::meshing::{greedy_mesh, TransparencySet};
//! use voxel_chunker::voxels::chunk::{ChunkCoordinate, EmptyGenerator};
//! use voxel_chunker::voxels::store::ChunkStore;
//! use voxel_chunker::voxels::voxel_id::VoxelId;
//!
//! let config = ChunkerConfig { chunk_size: 8, ..ChunkerConfig::default() };
//! let mut store: ChunkStore = ChunkStore::new(&config, Arc::new(EmptyGenerator)).unwrap();
//!
//! // Writing a solid voxel creates its chunk.
//! store.voxel_at_coordinates(-3, 2, 5, Some(VoxelId::new(1)), true).unwrap();
//!
//! let chunk = store.get_chunk(ChunkCoordinate::new(-1, 0, 0)).unwrap();
//! let mesh = greedy_mesh(&chunk.volume(), &TransparencySet::new());
//! assert_eq!(mesh.opaque.quad_count(), 6);
//! ```
//!
//! ## Performance Considerations
//!
//! * Chunk sizes are powers of two, so addressing is shifts and masks
//! * Greedy meshing is linear in the number of voxels
//! * Generation and meshing run on worker threads with per-worker scratch buffers

use std::env;
use std::sync::Arc;

use cgmath::Point3;
use log::info;
use web_time::Instant;

pub mod config;
pub mod core;
pub mod engine;
pub mod error;
pub mod meshing;
pub mod task_management;
pub mod voxels;

pub use config::ChunkerConfig;
pub use engine::ChunkEngine;
pub use error::ChunkerError;
pub use meshing::{greedy_mesh, mesh_voxels, MeshResult, TransparencySet};
pub use voxels::chunk::{ChunkCoordinate, VoxelChunk};
pub use voxels::store::ChunkStore;
pub use voxels::voxel_id::VoxelId;

/// Environment variable holding the path of a JSON configuration file.
pub const CONFIG_PATH_VARIABLE: &str = "VOXEL_CHUNKER_CONFIG";

/// Seed of the terrain generated by [`run`].
const DEMO_TERRAIN_SEED: u32 = 42;

/// Generates and meshes the neighborhood of the origin, logging a summary.
///
/// The logger is configured from `RUST_LOG`. The configuration is read from
/// the file named by `VOXEL_CHUNKER_CONFIG`, or the defaults are used.
///
/// # Errors
/// Fails if the configuration cannot be read, parsed or validated.
pub fn run() -> Result<(), ChunkerError> {
    let mut log_builder = env_logger::Builder::new();
    log_builder
        .target(env_logger::Target::Stdout)
        .parse_env("RUST_LOG")
        .init();

    info!("Logger initialized");

    let config = match env::var_os(CONFIG_PATH_VARIABLE) {
        Some(path) => {
            info!("Loading configuration from {}", path.to_string_lossy());
            ChunkerConfig::from_file(path)?
        }
        None => ChunkerConfig::default(),
    };

    let generator = voxels::chunk::PerlinGenerator::new(
        DEMO_TERRAIN_SEED,
        (1..=4).map(VoxelId::new).collect(),
    );
    let mut engine = ChunkEngine::new(&config, Arc::new(generator))?;

    let start = Instant::now();
    let requested = engine.request_missing_chunks(Point3::new(0.0, 0.0, 0.0));
    engine.finish_tasks();

    let store = engine.store();
    let store = store.get();
    let (mut opaque, mut transparent, mut meshed) = (0, 0, 0);
    for coordinate in store.chunk_coordinates() {
        for mesh in store.meshes(coordinate) {
            opaque += mesh.opaque.quad_count();
            transparent += mesh.transparent.quad_count();
            meshed += 1;
        }
    }

    info!(
        "Generated {} chunks ({} meshed) in {:?}: {} opaque quads, {} transparent quads",
        requested.len(),
        meshed,
        start.elapsed(),
        opaque,
        transparent
    );

    Ok(())
}
