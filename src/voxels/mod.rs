//! # Voxel Storage
//!
//! This module contains everything needed to represent and address a chunked
//! voxel world.
//!
//! ## Architecture
//!
//! * **VoxelId**: packed 32-bit voxel values with a material and a transparency flag
//! * **Addressing**: world position to voxel to chunk coordinate math
//! * **Chunk**: fixed-size padded 3D arrays of voxels and the generators that fill them
//! * **Store**: the map of loaded chunks, voxel access and per-chunk attachment slots
//! * **Tasks**: background chunk generation
//!
//! ## Data Flow
//!
//! 1. The store receives a voxel read or write
//! 2. Addressing resolves the chunk and its padded local offset
//! 3. A missing chunk is generated on demand when a solid voxel is written
//! 4. The chunk's volume is handed to the mesher

pub mod addressing;
pub mod chunk;
pub mod store;
pub mod tasks;
pub mod voxel_id;
