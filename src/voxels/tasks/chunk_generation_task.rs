//! # Chunk Generation Task
//!
//! This module defines the `ChunkGenerationTask` which generates a chunk on a
//! worker thread. The task is scheduled for every missing chunk the engine
//! requests; the store is only locked on the owning thread, when the result
//! is registered.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use log::{debug, error};

use crate::error::ChunkerError;
use crate::meshing::tasks::chunk_mesh_generation_task::ChunkMeshGenerationTask;
use crate::meshing::MeshScratch;
use crate::task_management::task::{Task, TaskContext, TaskResult};
use crate::voxels::addressing::ChunkAddressing;
use crate::voxels::chunk::{ChunkCoordinate, ChunkGenerator, VoxelChunk};
use crate::voxels::store::generate_chunk;

/// A task that generates chunk data on a worker.
///
/// This task is responsible for:
/// 1. Running the generator for the chunk's bounds
/// 2. Registering the chunk in the store
/// 3. Scheduling mesh generation if the chunk holds any voxel
pub struct ChunkGenerationTask {
    addressing: ChunkAddressing,
    generator: Arc<dyn ChunkGenerator>,
    /// The position of the chunk to generate (in chunk coordinates)
    coordinate: ChunkCoordinate,
}

impl ChunkGenerationTask {
    /// Creates a new chunk generation task.
    ///
    /// # Arguments
    /// * `addressing` - The store's addressing, used to compute the chunk bounds
    /// * `generator` - The store's generator
    /// * `coordinate` - The chunk coordinates where the chunk should be generated
    pub fn new(
        addressing: ChunkAddressing,
        generator: Arc<dyn ChunkGenerator>,
        coordinate: ChunkCoordinate,
    ) -> Self {
        ChunkGenerationTask {
            addressing,
            generator,
            coordinate,
        }
    }
}

impl Task for ChunkGenerationTask {
    /// Runs the generator. A generator panic is reported as
    /// [`ChunkerError::GeneratorPanicked`] and leaves the worker running.
    fn process(&self, _scratch: &mut MeshScratch) -> Box<dyn TaskResult + Send> {
        let chunk = panic::catch_unwind(AssertUnwindSafe(|| {
            generate_chunk(&self.addressing, self.generator.as_ref(), self.coordinate)
        }))
        .unwrap_or(Err(ChunkerError::GeneratorPanicked(self.coordinate)));
        Box::new(ChunkGenerationTaskResult {
            coordinate: self.coordinate,
            chunk,
        })
    }
}

/// The generated chunk, or the reason generation failed.
pub struct ChunkGenerationTaskResult {
    coordinate: ChunkCoordinate,
    chunk: Result<VoxelChunk, ChunkerError>,
}

impl TaskResult for ChunkGenerationTaskResult {
    /// Registers the chunk unless one was stored at the same coordinate in the
    /// meantime, then schedules its mesh.
    ///
    /// The coordinate stops being pending either way, so a failed chunk is
    /// generated again the next time it is requested.
    fn handle_result(self: Box<Self>, context: &mut TaskContext) -> Vec<Box<dyn Task + Send>> {
        let coordinate = self.coordinate;
        context.pending_generation.remove(&coordinate);

        let chunk = match self.chunk {
            Ok(chunk) => chunk,
            Err(err) => {
                error!("Failed to generate chunk {coordinate}: {err}");
                return Vec::new();
            }
        };

        let revision = context.next_mesh_revision();
        let mut store = context.store.get_mut();
        if store.contains_chunk(coordinate) {
            debug!("Chunk {coordinate} was loaded while generating, keeping the loaded one");
            return Vec::new();
        }

        let mesh_task: Option<Box<dyn Task + Send>> = if chunk.is_empty() {
            None
        } else {
            Some(Box::new(ChunkMeshGenerationTask::new(
                &chunk,
                Arc::clone(&context.transparency),
                revision,
            )))
        };

        if let Err(err) = store.register_chunk(coordinate, chunk) {
            error!("Failed to register chunk {coordinate}: {err}");
            return Vec::new();
        }

        mesh_task.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ChunkerConfig;
    use crate::core::MtResource;
    use crate::meshing::TransparencySet;
    use crate::voxels::chunk::{ChunkBounds, SolidGenerator};
    use crate::voxels::store::ChunkStore;
    use crate::voxels::voxel_id::VoxelId;

    const CHUNK: ChunkCoordinate = ChunkCoordinate::new(0, -1, 0);

    fn context() -> (TaskContext, ChunkAddressing) {
        let config = ChunkerConfig {
            chunk_size: 4,
            ..ChunkerConfig::default()
        };
        let store =
            ChunkStore::new(&config, Arc::new(SolidGenerator { voxel: VoxelId::new(1) })).unwrap();
        let addressing = *store.addressing();
        let mut context = TaskContext::new(MtResource::new(store), Arc::new(TransparencySet::new()));
        context.pending_generation.insert(CHUNK);
        (context, addressing)
    }

    fn run(task: ChunkGenerationTask, context: &mut TaskContext) -> Vec<Box<dyn Task + Send>> {
        task.process(&mut MeshScratch::new()).handle_result(context)
    }

    #[test]
    fn generated_chunk_is_registered_and_meshed() {
        let (mut context, addressing) = context();
        let generator = context.store.get().generator();

        let follow_ups = run(ChunkGenerationTask::new(addressing, generator, CHUNK), &mut context);

        assert_eq!(follow_ups.len(), 1);
        assert!(context.pending_generation.is_empty());
        assert!(context.store.get().contains_chunk(CHUNK));
    }

    #[test]
    fn loaded_chunk_is_kept() {
        let (mut context, addressing) = context();
        let generator = context.store.get().generator();
        let loaded = VoxelChunk::new(CHUNK, addressing.padded_side());
        context.store.get_mut().register_chunk(CHUNK, loaded).unwrap();

        let follow_ups = run(ChunkGenerationTask::new(addressing, generator, CHUNK), &mut context);

        assert!(follow_ups.is_empty());
        assert!(context.store.get().get_chunk(CHUNK).unwrap().is_empty());
    }

    #[test]
    fn generator_panic_releases_the_chunk() {
        let (mut context, addressing) = context();
        let generator: Arc<dyn ChunkGenerator> =
            Arc::new(|_: &ChunkBounds| -> VoxelChunk { panic!("generator failed") });

        let follow_ups = run(ChunkGenerationTask::new(addressing, generator, CHUNK), &mut context);

        assert!(follow_ups.is_empty());
        assert!(context.pending_generation.is_empty());
        assert_eq!(context.store.get().chunk_count(), 0);
    }
}
