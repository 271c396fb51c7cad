//! Greedy meshing with transparency.
//!
//! The volume is swept once along each axis `d`. For every plane between two
//! layers of voxels (including the two outer boundaries) a front mask and a
//! back mask are computed, one cell per `(u, v)` position, holding the voxel
//! whose face is visible on that plane. Each mask is then covered greedily with
//! rectangles of equal voxel ids: grow the width along `u` first, then the
//! height along `v`, emit one quad, clear the covered cells and move on.
//!
//! Front quads face `+d` and back quads face `-d`; both lie on the plane
//! between the two layers, so the mesh of a solid box is its closed surface
//! with outward normals.

use cgmath::Vector3;

use crate::error::ChunkerError;
use crate::voxels::voxel_id::VoxelId;

use super::mesh::MeshResult;
use super::transparency::TransparencySet;
use super::volume::VoxelVolume;

/// Reusable mask buffers for [`greedy_mesh_with_scratch`].
///
/// A worker that meshes many chunks keeps one scratch and avoids reallocating
/// the masks for every call. Buffers grow to the largest plane seen.
#[derive(Debug, Default, Clone)]
pub struct MeshScratch {
    mask: Vec<VoxelId>,
    inverse_mask: Vec<VoxelId>,
}

impl MeshScratch {
    pub fn new() -> Self {
        Self::default()
    }

    fn prepare(&mut self, cells: usize) {
        self.mask.clear();
        self.mask.resize(cells, VoxelId::AIR);
        self.inverse_mask.clear();
        self.inverse_mask.resize(cells, VoxelId::AIR);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Winding {
    /// Quad faces `+d`.
    Front,
    /// Quad faces `-d`.
    Back,
}

/// Decides which face, if any, is visible between two neighbouring voxels.
///
/// `a` sits on the low side of the plane and `b` on the high side; either may
/// be air when the plane is a volume boundary.
///
/// # Returns
/// `(front, back)`: the voxel whose `+d` face is visible (from `a`) and the
/// voxel whose `-d` face is visible (from `b`), air where nothing is drawn.
fn resolve_faces(a: VoxelId, b: VoxelId) -> (VoxelId, VoxelId) {
    if a.is_transparent() && b.is_transparent() {
        if a != b {
            (a, b)
        } else {
            (VoxelId::AIR, VoxelId::AIR)
        }
    } else if !a.is_air() && (b.is_air() || b.is_transparent()) {
        (a, VoxelId::AIR)
    } else if !b.is_air() && (a.is_air() || a.is_transparent()) {
        (VoxelId::AIR, b)
    } else {
        (VoxelId::AIR, VoxelId::AIR)
    }
}

/// Covers one mask with maximal rectangles and emits a quad for each.
///
/// # Arguments
/// * `mask` - Cells in `u`-fastest order; cleared as quads are emitted
/// * `axes` - The sweep axis `d` followed by `u` and `v`
/// * `extent` - Mask size along `u` and `v`
/// * `depth` - Position of the plane along `d`
/// * `winding` - Which side the emitted quads face
/// * `result` - Receives the quads
fn merge_mask(
    mask: &mut [VoxelId],
    axes: [usize; 3],
    extent: [usize; 2],
    depth: i32,
    winding: Winding,
    result: &mut MeshResult,
) {
    let [d, u, v] = axes;
    let [dims_u, dims_v] = extent;

    let mut n = 0;
    for j in 0..dims_v {
        let mut i = 0;
        while i < dims_u {
            let voxel = mask[n];
            if voxel.is_air() {
                i += 1;
                n += 1;
                continue;
            }

            let mut width = 1;
            while i + width < dims_u && mask[n + width] == voxel {
                width += 1;
            }

            let mut height = 1;
            'grow: while j + height < dims_v {
                let row = n + height * dims_u;
                for cell in &mask[row..row + width] {
                    if *cell != voxel {
                        break 'grow;
                    }
                }
                height += 1;
            }

            let mut origin = Vector3::new(0, 0, 0);
            origin[d] = depth;
            origin[u] = i as i32;
            origin[v] = j as i32;

            let mut du = Vector3::new(0, 0, 0);
            let mut dv = Vector3::new(0, 0, 0);
            match winding {
                Winding::Front => {
                    du[u] = width as i32;
                    dv[v] = height as i32;
                }
                Winding::Back => {
                    du[v] = height as i32;
                    dv[u] = width as i32;
                }
            }

            result.push_quad(
                [
                    origin.into(),
                    (origin + du).into(),
                    (origin + du + dv).into(),
                    (origin + dv).into(),
                ],
                voxel,
            );

            for l in 0..height {
                let row = n + l * dims_u;
                mask[row..row + width].fill(VoxelId::AIR);
            }

            i += width;
            n += width;
        }
    }
}

/// Meshes a volume with freshly allocated scratch buffers.
pub fn greedy_mesh(volume: &VoxelVolume<'_>, transparency: &TransparencySet) -> MeshResult {
    greedy_mesh_with_scratch(volume, transparency, &mut MeshScratch::new())
}

/// Meshes a volume into opaque and transparent quads.
///
/// # Arguments
/// * `volume` - The voxels to mesh; padding cells are meshed like any other
/// * `transparency` - Materials whose voxels are treated as transparent
/// * `scratch` - Mask buffers, reused across calls
///
/// # Returns
/// The merged quads, routed by the transparency flag of their voxel.
///
/// # Performance
/// Linear in the number of voxels: every cell is visited twice per axis, once
/// to fill the masks and once while merging.
pub fn greedy_mesh_with_scratch(
    volume: &VoxelVolume<'_>,
    transparency: &TransparencySet,
    scratch: &mut MeshScratch,
) -> MeshResult {
    let mut result = MeshResult::new();
    let dims = volume.dims();
    if dims.contains(&0) {
        return result;
    }

    let voxel_at = |position: [usize; 3]| transparency.effective_type(volume.get(position));

    for d in 0..3 {
        let u = (d + 1) % 3;
        let v = (d + 2) % 3;
        let (dims_d, dims_u, dims_v) = (dims[d] as i64, dims[u], dims[v]);

        scratch.prepare(dims_u * dims_v);

        for plane in -1..dims_d {
            let mut n = 0;
            let mut position = [0; 3];
            for j in 0..dims_v {
                for i in 0..dims_u {
                    position[u] = i;
                    position[v] = j;

                    let a = if plane >= 0 {
                        position[d] = plane as usize;
                        voxel_at(position)
                    } else {
                        VoxelId::AIR
                    };
                    let b = if plane + 1 < dims_d {
                        position[d] = (plane + 1) as usize;
                        voxel_at(position)
                    } else {
                        VoxelId::AIR
                    };

                    let (front, back) = resolve_faces(a, b);
                    scratch.mask[n] = front;
                    scratch.inverse_mask[n] = back;
                    n += 1;
                }
            }

            let depth = (plane + 1) as i32;
            merge_mask(
                &mut scratch.mask,
                [d, u, v],
                [dims_u, dims_v],
                depth,
                Winding::Front,
                &mut result,
            );
            merge_mask(
                &mut scratch.inverse_mask,
                [d, u, v],
                [dims_u, dims_v],
                depth,
                Winding::Back,
                &mut result,
            );
        }
    }

    result
}

/// Validates a raw voxel buffer against its extents and meshes it.
///
/// # Errors
/// Returns [`ChunkerError::VolumeSizeMismatch`] if the buffer does not hold
/// exactly `dims[0] * dims[1] * dims[2]` voxels. Nothing is meshed then.
pub fn mesh_voxels(
    voxels: &[VoxelId],
    dims: [usize; 3],
    transparency: &TransparencySet,
) -> Result<MeshResult, ChunkerError> {
    let volume = VoxelVolume::new(voxels, dims)?;
    Ok(greedy_mesh(&volume, transparency))
}
