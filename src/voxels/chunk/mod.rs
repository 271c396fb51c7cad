//! # Chunk Module
//!
//! This module provides the [`VoxelChunk`] struct, a dense cube of voxel ids
//! covering one cell of the chunk grid, together with the chunk coordinate
//! type and the generator interface used to fill new chunks.
//!
//! ## Padding
//!
//! A chunk's edge length is `chunk_size + chunk_pad`. The padding is split in
//! two equal halves on either side of the core cells, so the cell for world
//! voxel `w` sits at local offset `(w & chunk_mask) + chunk_pad / 2`. A
//! generator may fill the padding with its neighbours' voxels so the mesher can
//! tell whether a boundary face is visible without reading another chunk.
//!
//! ## Memory Layout
//!
//! Voxels are stored in row-major order with strides `[1, side, side * side]`
//! (x varies fastest), which is the layout the mesher reads.

use crate::meshing::VoxelVolume;

use super::voxel_id::VoxelId;

pub mod coordinate;
pub mod generation;

pub use coordinate::ChunkCoordinate;
pub use generation::{
    CheckerboardGenerator, ChunkBounds, ChunkGenerator, EmptyGenerator, PerlinGenerator,
    RandomGenerator, SolidGenerator,
};

/// A dense cube of voxels belonging to one chunk coordinate.
///
/// Chunks are created by a [`ChunkGenerator`] and handed to the chunk store,
/// which owns them from then on.
#[derive(Debug, Clone, PartialEq)]
pub struct VoxelChunk {
    /// The position of this chunk in chunk coordinates.
    position: ChunkCoordinate,

    /// Edge length, padding included.
    side: usize,

    /// Voxel ids in row-major order.
    voxels: Vec<VoxelId>,

    /// `true` until a non-air voxel is written.
    ///
    /// The flag only ever goes from `true` to `false`. Erasing every voxel back
    /// to air afterwards does not make the chunk empty again.
    empty: bool,
}

impl VoxelChunk {
    /// Creates a chunk filled with air.
    ///
    /// # Arguments
    /// * `position` - The chunk coordinates of the new chunk
    /// * `side` - Edge length of the chunk, padding included
    ///
    /// # Panics
    /// If `side³` overflows `usize`. Sides validated by
    /// [`crate::voxels::addressing::ChunkAddressing`] never exceed
    /// [`crate::voxels::addressing::MAX_PADDED_SIDE`].
    pub fn new(position: ChunkCoordinate, side: usize) -> Self {
        VoxelChunk {
            position,
            side,
            voxels: vec![VoxelId::AIR; side * side * side],
            empty: true,
        }
    }

    /// Creates a chunk whose voxels are produced by `fill`, called once per
    /// local cell in storage order.
    ///
    /// # Arguments
    /// * `position` - The chunk coordinates of the new chunk
    /// * `side` - Edge length of the chunk, padding included
    /// * `fill` - Returns the voxel for local `(x, y, z)`
    pub fn from_fn(
        position: ChunkCoordinate,
        side: usize,
        mut fill: impl FnMut(usize, usize, usize) -> VoxelId,
    ) -> Self {
        let mut voxels = Vec::with_capacity(side * side * side);
        for z in 0..side {
            for y in 0..side {
                for x in 0..side {
                    voxels.push(fill(x, y, z));
                }
            }
        }
        let empty = voxels.iter().all(|voxel| voxel.is_air());

        VoxelChunk {
            position,
            side,
            voxels,
            empty,
        }
    }

    /// The coordinate this chunk was generated or registered for.
    pub fn position(&self) -> ChunkCoordinate {
        self.position
    }

    pub(crate) fn set_position(&mut self, position: ChunkCoordinate) {
        self.position = position;
    }

    /// Edge length in voxels, padding included.
    pub fn side(&self) -> usize {
        self.side
    }

    /// Extents along x, y and z.
    pub fn dims(&self) -> [usize; 3] {
        [self.side, self.side, self.side]
    }

    /// Whether no non-air voxel has ever been written to this chunk.
    pub fn is_empty(&self) -> bool {
        self.empty
    }

    /// All voxels in storage order.
    pub fn voxels(&self) -> &[VoxelId] {
        &self.voxels
    }

    /// Gets the voxel at local coordinates.
    ///
    /// # Panics
    /// Panics if any coordinate is outside `0..side`.
    pub fn get(&self, x: usize, y: usize, z: usize) -> VoxelId {
        self.voxels[self.index(x, y, z)]
    }

    /// Sets the voxel at local coordinates.
    ///
    /// Writing a non-air voxel clears the empty flag for good.
    ///
    /// # Panics
    /// Panics if any coordinate is outside `0..side`.
    pub fn set(&mut self, x: usize, y: usize, z: usize, voxel: VoxelId) {
        let index = self.index(x, y, z);
        self.voxels[index] = voxel;
        if !voxel.is_air() {
            self.empty = false;
        }
    }

    /// The whole padded chunk as a mesher input volume.
    pub fn volume(&self) -> VoxelVolume<'_> {
        VoxelVolume::cube(&self.voxels, self.side)
    }

    fn index(&self, x: usize, y: usize, z: usize) -> usize {
        assert!(
            x < self.side && y < self.side && z < self.side,
            "local voxel ({x}, {y}, {z}) is outside a chunk of side {}",
            self.side
        );
        x + self.side * (y + self.side * z)
    }
}
