//! Task for meshing a chunk on a worker thread.
//!
//! The task works on a snapshot of the chunk's voxels taken when it is
//! created, so the store stays unlocked while the mesher runs. The result is
//! attached to the chunk's mesh slot on the owning thread.
//!
//! Every snapshot carries a revision from [`TaskContext::next_mesh_revision`].
//! Results can come back in any order, so a mesh older than the one already
//! in the slot is dropped.

use std::sync::Arc;

use log::{debug, trace};
use web_time::Instant;

use crate::meshing::{greedy_mesh_with_scratch, MeshResult, MeshScratch, TransparencySet, VoxelVolume};
use crate::task_management::task::{Task, TaskContext, TaskResult};
use crate::voxels::chunk::{ChunkCoordinate, VoxelChunk};
use crate::voxels::voxel_id::VoxelId;

/// A task that meshes one chunk with the worker's scratch buffers.
pub struct ChunkMeshGenerationTask {
    coordinate: ChunkCoordinate,
    side: usize,
    /// Snapshot of the chunk's voxels, padding included.
    voxels: Vec<VoxelId>,
    transparency: Arc<TransparencySet>,
    revision: u64,
}

impl ChunkMeshGenerationTask {
    /// Creates a mesh task from a snapshot of `chunk`.
    ///
    /// # Arguments
    /// * `chunk` - The chunk to mesh; its voxels are copied
    /// * `transparency` - Materials meshed as transparent geometry
    /// * `revision` - Taken from [`TaskContext::next_mesh_revision`] before the snapshot
    pub fn new(chunk: &VoxelChunk, transparency: Arc<TransparencySet>, revision: u64) -> Self {
        ChunkMeshGenerationTask {
            coordinate: chunk.position(),
            side: chunk.side(),
            voxels: chunk.voxels().to_vec(),
            transparency,
            revision,
        }
    }
}

impl Task for ChunkMeshGenerationTask {
    fn process(&self, scratch: &mut MeshScratch) -> Box<dyn TaskResult + Send> {
        let start = Instant::now();
        let volume = VoxelVolume::cube(&self.voxels, self.side);
        let mesh = greedy_mesh_with_scratch(&volume, &self.transparency, scratch);
        trace!(
            "Meshed chunk {} into {} opaque and {} transparent quads in {:?}",
            self.coordinate,
            mesh.opaque.quad_count(),
            mesh.transparent.quad_count(),
            start.elapsed()
        );

        Box::new(ChunkMeshGenerationTaskResult {
            coordinate: self.coordinate,
            revision: self.revision,
            mesh,
        })
    }
}

/// The mesh produced for one chunk.
pub struct ChunkMeshGenerationTaskResult {
    coordinate: ChunkCoordinate,
    revision: u64,
    mesh: MeshResult,
}

impl TaskResult for ChunkMeshGenerationTaskResult {
    /// Replaces the contents of the chunk's mesh slot with the new mesh.
    ///
    /// A mesh for a chunk that was removed in the meantime is dropped, and
    /// so is a mesh of an older snapshot than the one in the slot.
    fn handle_result(self: Box<Self>, context: &mut TaskContext) -> Vec<Box<dyn Task + Send>> {
        let coordinate = self.coordinate;
        if !context.store.get().contains_chunk(coordinate) {
            debug!("Dropping mesh for unloaded chunk {coordinate}");
            context.forget_mesh_revision(coordinate);
            return Vec::new();
        }
        if !context.accept_mesh_revision(coordinate, self.revision) {
            debug!(
                "Dropping mesh revision {} for chunk {coordinate}, a newer one is attached",
                self.revision
            );
            return Vec::new();
        }

        let mut store = context.store.get_mut();
        store.attach_mesh(coordinate, None);
        store.attach_mesh(coordinate, Some(self.mesh));
        Vec::new()
    }
}
