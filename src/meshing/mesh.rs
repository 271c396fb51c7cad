//! Quad mesh data structures produced by the greedy mesher.
//!
//! The mesher emits quads, not triangles: every [`MeshQuad`] references four
//! consecutive vertices of its own [`QuadMesh`] in winding order. Upload paths
//! that need triangles use [`QuadMesh::triangle_indices`] and
//! [`QuadMesh::vertex_bytes`].

use crate::voxels::voxel_id::VoxelId;

/// One merged face: four vertex indices and the voxel it was cut from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeshQuad {
    /// Indices into the owning mesh's vertex list, in winding order.
    pub indices: [u32; 4],
    /// The effective voxel id, transparency flag included.
    pub voxel: VoxelId,
}

/// Vertices and quads of one geometry class.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuadMesh {
    /// Integer voxel-grid positions.
    pub vertices: Vec<[i32; 3]>,
    pub quads: Vec<MeshQuad>,
}

impl QuadMesh {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends four vertices and the quad referencing them.
    ///
    /// # Arguments
    /// * `corners` - Quad corners in winding order
    /// * `voxel` - The voxel id the quad was cut from
    pub fn push_quad(&mut self, corners: [[i32; 3]; 4], voxel: VoxelId) {
        let base = self.vertices.len() as u32;
        self.vertices.extend_from_slice(&corners);
        self.quads.push(MeshQuad {
            indices: [base, base + 1, base + 2, base + 3],
            voxel,
        });
    }

    pub fn quad_count(&self) -> usize {
        self.quads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quads.is_empty()
    }

    /// The four corner positions of quad `index`, in winding order.
    ///
    /// # Panics
    /// Panics if `index` is out of range.
    pub fn quad_corners(&self, index: usize) -> [[i32; 3]; 4] {
        self.quads[index]
            .indices
            .map(|vertex| self.vertices[vertex as usize])
    }

    /// Area of quad `index` in voxel faces.
    pub fn quad_area(&self, index: usize) -> i64 {
        let [x, y, z] = self.cross(index);
        x.abs() + y.abs() + z.abs()
    }

    /// Unit normal of quad `index`, following the right-hand rule on its winding.
    ///
    /// Quads are axis-aligned, so exactly one component is non-zero.
    pub fn quad_normal(&self, index: usize) -> [i32; 3] {
        self.cross(index).map(|axis| axis.signum() as i32)
    }

    /// Two triangles per quad, `(0, 1, 2)` and `(0, 2, 3)`, preserving winding.
    pub fn triangle_indices(&self) -> Vec<u32> {
        let mut indices = Vec::with_capacity(self.quads.len() * 6);
        for quad in &self.quads {
            let [a, b, c, d] = quad.indices;
            indices.extend_from_slice(&[a, b, c, a, c, d]);
        }
        indices
    }

    /// The vertex list as raw bytes, three native-endian `i32` per vertex.
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    fn cross(&self, index: usize) -> [i64; 3] {
        let [c0, c1, _, c3] = self.quad_corners(index);
        let e1 = [0, 1, 2].map(|axis| (c1[axis] - c0[axis]) as i64);
        let e2 = [0, 1, 2].map(|axis| (c3[axis] - c0[axis]) as i64);
        [
            e1[1] * e2[2] - e1[2] * e2[1],
            e1[2] * e2[0] - e1[0] * e2[2],
            e1[0] * e2[1] - e1[1] * e2[0],
        ]
    }
}

/// Mesher output: opaque and transparent geometry, never mixed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MeshResult {
    pub opaque: QuadMesh,
    pub transparent: QuadMesh,
}

impl MeshResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Routes a quad to the transparent mesh if `voxel` carries the
    /// transparency flag, to the opaque mesh otherwise.
    pub fn push_quad(&mut self, corners: [[i32; 3]; 4], voxel: VoxelId) {
        if voxel.is_transparent() {
            self.transparent.push_quad(corners, voxel);
        } else {
            self.opaque.push_quad(corners, voxel);
        }
    }

    /// Quads in both meshes.
    pub fn quad_count(&self) -> usize {
        self.opaque.quad_count() + self.transparent.quad_count()
    }

    pub fn is_empty(&self) -> bool {
        self.opaque.is_empty() && self.transparent.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const UNIT_TOP: [[i32; 3]; 4] = [[0, 1, 0], [0, 1, 1], [1, 1, 1], [1, 1, 0]];

    #[test]
    fn push_quad_indexes_own_vertices() {
        let mut mesh = QuadMesh::new();
        mesh.push_quad(UNIT_TOP, VoxelId::new(1));
        mesh.push_quad(UNIT_TOP, VoxelId::new(2));
        assert_eq!(mesh.vertices.len(), 8);
        assert_eq!(mesh.quads[1].indices, [4, 5, 6, 7]);
        assert_eq!(mesh.quad_corners(1), UNIT_TOP);
    }

    #[test]
    fn normal_and_area_follow_winding() {
        let mut mesh = QuadMesh::new();
        mesh.push_quad(UNIT_TOP, VoxelId::new(1));
        mesh.push_quad([[0, 0, 0], [3, 0, 0], [3, 0, 2], [0, 0, 2]], VoxelId::new(1));
        assert_eq!(mesh.quad_normal(0), [0, 1, 0]);
        assert_eq!(mesh.quad_area(0), 1);
        assert_eq!(mesh.quad_normal(1), [0, -1, 0]);
        assert_eq!(mesh.quad_area(1), 6);
    }

    #[test]
    fn triangles_split_each_quad() {
        let mut mesh = QuadMesh::new();
        mesh.push_quad(UNIT_TOP, VoxelId::new(1));
        mesh.push_quad(UNIT_TOP, VoxelId::new(1));
        assert_eq!(mesh.triangle_indices(), vec![0, 1, 2, 0, 2, 3, 4, 5, 6, 4, 6, 7]);
    }

    #[test]
    fn vertex_bytes_cover_all_vertices() {
        let mut mesh = QuadMesh::new();
        mesh.push_quad(UNIT_TOP, VoxelId::new(1));
        assert_eq!(mesh.vertex_bytes().len(), 4 * 3 * 4);
    }

    #[test]
    fn result_routes_by_transparency_flag() {
        let mut result = MeshResult::new();
        assert!(result.is_empty());
        result.push_quad(UNIT_TOP, VoxelId::new(1));
        result.push_quad(UNIT_TOP, VoxelId::new(2).with_transparency(true));
        result.push_quad(UNIT_TOP, VoxelId::new(3).with_transparency(true));
        assert_eq!(result.opaque.quad_count(), 1);
        assert_eq!(result.transparent.quad_count(), 2);
        assert_eq!(result.quad_count(), 3);
        assert!(result.transparent.quads.iter().all(|q| q.voxel.is_transparent()));
    }
}
