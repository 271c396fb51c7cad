//! Greedy meshing of voxel volumes.
//!
//! This module turns a dense voxel volume into quads, merging adjacent
//! coplanar faces of the same voxel id into larger rectangles. Transparent
//! materials are meshed into their own quad list so they can be drawn in a
//! separate pass.
//!
//! # Architecture
//! - [`VoxelVolume`]: A borrowed, size-checked box of voxels
//! - [`TransparencySet`]: Material ids meshed as transparent
//! - [`greedy_mesh`]: The mesher itself, with [`MeshScratch`] for buffer reuse
//! - [`MeshResult`]: Opaque and transparent [`QuadMesh`]es
//!
//! # Usage
//! ```
//! use voxel_chunker::meshing::{mesh_voxels, TransparencySet};
//! use voxel_chunker::voxels::voxel_id::VoxelId;
//!
//! let voxels = vec![VoxelId::new(1); 8];
//! let result = mesh_voxels(&voxels, [2, 2, 2], &TransparencySet::new()).unwrap();
//! assert_eq!(result.opaque.quad_count(), 6);
//! assert!(result.transparent.is_empty());
//! ```
//!
//! # Limitations
//! Faces are only merged within one volume. With a chunk padding of 0 the
//! faces on chunk borders are always emitted, even against a solid neighbour.

mod greedy;
mod mesh;
pub mod tasks;
mod transparency;
mod volume;

pub use greedy::{greedy_mesh, greedy_mesh_with_scratch, mesh_voxels, MeshScratch};
pub use mesh::{MeshQuad, MeshResult, QuadMesh};
pub use transparency::TransparencySet;
pub use volume::VoxelVolume;
