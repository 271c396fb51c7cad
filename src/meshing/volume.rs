//! Borrowed voxel volumes handed to the mesher.

use crate::error::ChunkerError;
use crate::voxels::voxel_id::VoxelId;

/// A dense box of voxels with row-major strides `[1, dx, dx * dy]`.
///
/// The volume borrows its buffer; constructing one checks that the buffer
/// length matches the extents exactly.
#[derive(Debug, Clone, Copy)]
pub struct VoxelVolume<'a> {
    voxels: &'a [VoxelId],
    dims: [usize; 3],
}

impl<'a> VoxelVolume<'a> {
    /// Wraps a voxel buffer with the given extents.
    ///
    /// # Errors
    /// Returns [`ChunkerError::VolumeSizeMismatch`] if `voxels.len()` differs
    /// from `dims[0] * dims[1] * dims[2]` or that product overflows.
    pub fn new(voxels: &'a [VoxelId], dims: [usize; 3]) -> Result<Self, ChunkerError> {
        let expected = dims[0]
            .checked_mul(dims[1])
            .and_then(|area| area.checked_mul(dims[2]));
        if expected != Some(voxels.len()) {
            return Err(ChunkerError::VolumeSizeMismatch {
                dims,
                expected,
                actual: voxels.len(),
            });
        }
        Ok(VoxelVolume { voxels, dims })
    }

    /// A cube of edge `side` over a buffer the caller already sized as `side³`.
    pub(crate) fn cube(voxels: &'a [VoxelId], side: usize) -> Self {
        debug_assert_eq!(voxels.len(), side * side * side);
        VoxelVolume {
            voxels,
            dims: [side, side, side],
        }
    }

    pub fn dims(&self) -> [usize; 3] {
        self.dims
    }

    pub fn voxels(&self) -> &'a [VoxelId] {
        self.voxels
    }

    /// The voxel at `position`.
    ///
    /// # Panics
    /// Panics if any axis is outside the extents.
    pub fn get(&self, position: [usize; 3]) -> VoxelId {
        let [dx, dy, dz] = self.dims;
        assert!(
            position[0] < dx && position[1] < dy && position[2] < dz,
            "voxel {position:?} is outside a volume of extents {:?}",
            self.dims
        );
        self.voxels[position[0] + dx * (position[1] + dy * position[2])]
    }
}
