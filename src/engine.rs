//! # Chunk Engine
//!
//! The [`ChunkEngine`] automates the store and the mesher around an observer:
//!
//! 1. [`ChunkEngine::request_missing_chunks`] lists the chunks missing around
//!    a world position and notifies every subscriber about each of them
//! 2. a generation task is published for each missing chunk
//! 3. generated chunks are registered in the store and, unless empty, meshed
//! 4. the mesh is stored in the chunk's mesh slot
//!
//! Steps 2 to 4 happen on the worker pool. Results are only applied when the
//! owner calls [`ChunkEngine::process_tasks`] or [`ChunkEngine::finish_tasks`].

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use cgmath::Point3;
use log::{debug, error, warn};

use crate::config::ChunkerConfig;
use crate::core::MtResource;
use crate::error::ChunkerError;
use crate::meshing::tasks::chunk_mesh_generation_task::ChunkMeshGenerationTask;
use crate::meshing::{MeshResult, TransparencySet};
use crate::task_management::task::TaskContext;
use crate::task_management::TaskManager;
use crate::voxels::chunk::{ChunkCoordinate, ChunkGenerator};
use crate::voxels::store::ChunkStore;
use crate::voxels::tasks::chunk_generation_task::ChunkGenerationTask;

/// Pause between polls while waiting for the workers.
const FINISH_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Callback invoked with the coordinate of each missing chunk.
pub type MissingChunkSubscriber = Box<dyn FnMut(ChunkCoordinate)>;

/// Coordinates chunk generation and meshing on a worker pool.
pub struct ChunkEngine {
    task_manager: TaskManager,
    missing_chunk_subscribers: Vec<MissingChunkSubscriber>,
}

impl ChunkEngine {
    /// Creates the store and starts the workers.
    ///
    /// # Arguments
    /// * `config` - Store settings, transparent materials and worker count
    /// * `generator` - Fills newly generated chunks
    ///
    /// # Errors
    /// Returns the validation error of an invalid configuration.
    pub fn new(
        config: &ChunkerConfig,
        generator: Arc<dyn ChunkGenerator>,
    ) -> Result<Self, ChunkerError> {
        let store = ChunkStore::new(config, generator)?;
        let transparency: TransparencySet = config.transparent_materials.iter().copied().collect();

        let worker_count = if config.worker_count == 0 {
            warn!("worker_count is 0, starting one worker instead");
            1
        } else {
            config.worker_count
        };

        let context = TaskContext::new(MtResource::new(store), Arc::new(transparency));

        Ok(ChunkEngine {
            task_manager: TaskManager::new(worker_count, context),
            missing_chunk_subscribers: Vec::new(),
        })
    }

    /// A handle to the shared store. Meshes are in its mesh slots.
    pub fn store(&self) -> MtResource<ChunkStore<MeshResult>> {
        self.task_manager.context().store.clone()
    }

    pub fn transparency(&self) -> Arc<TransparencySet> {
        Arc::clone(&self.task_manager.context().transparency)
    }

    /// Registers a callback for every missing chunk found by
    /// [`ChunkEngine::request_missing_chunks`].
    pub fn subscribe_missing_chunks(&mut self, subscriber: impl FnMut(ChunkCoordinate) + 'static) {
        self.missing_chunk_subscribers.push(Box::new(subscriber));
    }

    /// Reports and schedules the chunks missing around a world position.
    ///
    /// Every subscriber is called once per missing chunk, in neighborhood
    /// order. A generation task is published for each missing chunk that has
    /// none pending yet.
    ///
    /// # Arguments
    /// * `position` - World position of the observer
    ///
    /// # Returns
    /// The missing chunk coordinates.
    pub fn request_missing_chunks(&mut self, position: Point3<f64>) -> Vec<ChunkCoordinate> {
        let (missing, addressing, generator) = {
            let store = self.task_manager.context().store.get();
            (
                store.missing_chunks_near(position, None),
                *store.addressing(),
                store.generator(),
            )
        };

        for &coordinate in &missing {
            for subscriber in &mut self.missing_chunk_subscribers {
                subscriber(coordinate);
            }

            if self
                .task_manager
                .context_mut()
                .pending_generation
                .insert(coordinate)
            {
                self.task_manager.publish_task(Box::new(ChunkGenerationTask::new(
                    addressing,
                    Arc::clone(&generator),
                    coordinate,
                )));
            }
        }

        debug!("{} missing chunks around {:?}", missing.len(), position);
        missing
    }

    /// Publishes a mesh task for a loaded chunk, e.g. after editing its voxels.
    ///
    /// # Returns
    /// `false` if the chunk is not loaded.
    pub fn schedule_mesh(&mut self, coordinate: ChunkCoordinate) -> bool {
        let task = {
            let context = self.task_manager.context_mut();
            let revision = context.next_mesh_revision();
            let store = context.store.get();
            match store.get_chunk(coordinate) {
                Some(chunk) => ChunkMeshGenerationTask::new(
                    chunk,
                    Arc::clone(&context.transparency),
                    revision,
                ),
                None => return false,
            }
        };
        self.task_manager.publish_task(Box::new(task));
        true
    }

    /// Applies finished results and hands queued tasks to free workers.
    pub fn process_tasks(&mut self) {
        self.task_manager.process_completed_tasks();
        self.task_manager.process_queued_tasks();
    }

    /// Blocks until every published task and its follow-ups are applied.
    ///
    /// Returns early, logging an error, if all workers have stopped.
    pub fn finish_tasks(&mut self) {
        loop {
            self.process_tasks();
            if self.task_manager.is_idle() {
                return;
            }
            if !self.task_manager.has_live_workers() {
                error!("All workers have stopped, abandoning queued tasks");
                return;
            }
            thread::sleep(FINISH_POLL_INTERVAL);
        }
    }

    /// Whether no task is queued or running.
    pub fn is_idle(&self) -> bool {
        self.task_manager.is_idle()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::sync::atomic::{AtomicBool, Ordering};

    use super::*;
    use crate::meshing::MeshScratch;
    use crate::task_management::task::{Task, TaskResult};
    use crate::voxels::chunk::{ChunkBounds, SolidGenerator, VoxelChunk};
    use crate::voxels::voxel_id::VoxelId;

    /// Takes its worker down with it.
    struct FatalTask;

    impl Task for FatalTask {
        fn process(&self, _scratch: &mut MeshScratch) -> Box<dyn TaskResult + Send> {
            panic!("worker task failed");
        }
    }

    fn engine(generator: Arc<dyn ChunkGenerator>) -> ChunkEngine {
        let config = ChunkerConfig {
            chunk_size: 4,
            chunk_distance: 1,
            worker_count: 2,
            transparent_materials: vec![3],
            ..ChunkerConfig::default()
        };
        ChunkEngine::new(&config, generator).unwrap()
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = ChunkerConfig {
            chunk_pad: 1,
            ..ChunkerConfig::default()
        };
        assert!(matches!(
            ChunkEngine::new(&config, Arc::new(SolidGenerator { voxel: VoxelId::new(1) })),
            Err(ChunkerError::OddChunkPad(1))
        ));
    }

    #[test]
    fn transparency_comes_from_config() {
        let engine = engine(Arc::new(SolidGenerator { voxel: VoxelId::new(1) }));
        assert!(engine.transparency().contains(3));
        assert!(!engine.transparency().contains(1));
    }

    #[test]
    fn pending_chunks_are_scheduled_once() {
        let mut engine = engine(Arc::new(SolidGenerator { voxel: VoxelId::new(1) }));
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        engine.subscribe_missing_chunks(move |coordinate| sink.borrow_mut().push(coordinate));

        let origin = Point3::new(0.0, 0.0, 0.0);
        let first = engine.request_missing_chunks(origin);
        // Still missing, so reported again, but not generated twice.
        let second = engine.request_missing_chunks(origin);
        assert_eq!(first.len(), 8);
        assert_eq!(first, second);
        assert_eq!(seen.borrow().len(), 16);

        engine.finish_tasks();
        assert!(engine.is_idle());
        assert_eq!(engine.store().get().chunk_count(), 8);
        assert!(engine.request_missing_chunks(origin).is_empty());
    }

    #[test]
    fn chunk_is_generated_again_after_generator_panic() {
        let failed = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&failed);
        let generator = move |bounds: &ChunkBounds| -> VoxelChunk {
            if !flag.swap(true, Ordering::SeqCst) {
                panic!("generator failed");
            }
            bounds.fill(|_| VoxelId::new(1))
        };
        let config = ChunkerConfig {
            chunk_size: 4,
            chunk_distance: 0,
            worker_count: 2,
            ..ChunkerConfig::default()
        };
        let mut engine = ChunkEngine::new(&config, Arc::new(generator)).unwrap();
        let origin = Point3::new(0.0, 0.0, 0.0);

        assert_eq!(engine.request_missing_chunks(origin), vec![ChunkCoordinate::ORIGIN]);
        engine.finish_tasks();
        assert!(failed.load(Ordering::SeqCst));
        assert_eq!(engine.store().get().chunk_count(), 0);
        assert!(engine.task_manager.has_live_workers());

        assert_eq!(engine.request_missing_chunks(origin), vec![ChunkCoordinate::ORIGIN]);
        engine.finish_tasks();
        assert_eq!(engine.store().get().chunk_count(), 1);
        assert_eq!(engine.store().get().meshes(ChunkCoordinate::ORIGIN).len(), 1);
        assert!(engine.request_missing_chunks(origin).is_empty());
    }

    #[test]
    fn finish_tasks_returns_when_every_worker_died() {
        let config = ChunkerConfig {
            worker_count: 1,
            ..ChunkerConfig::default()
        };
        let mut engine =
            ChunkEngine::new(&config, Arc::new(SolidGenerator { voxel: VoxelId::new(1) })).unwrap();
        assert!(engine.task_manager.publish_task(Box::new(FatalTask)));
        assert!(!engine.task_manager.publish_task(Box::new(FatalTask)));

        engine.finish_tasks();

        assert!(!engine.task_manager.has_live_workers());
        // The queued task has nowhere to run.
        assert!(!engine.is_idle());
    }

    #[test]
    fn solid_chunks_get_a_mesh() {
        let mut engine = engine(Arc::new(SolidGenerator { voxel: VoxelId::new(1) }));
        engine.request_missing_chunks(Point3::new(0.0, 0.0, 0.0));
        engine.finish_tasks();

        let store = engine.store();
        let store = store.get();
        for coordinate in store.chunk_coordinates() {
            let meshes = store.meshes(coordinate);
            assert_eq!(meshes.len(), 1);
            assert_eq!(meshes[0].opaque.quad_count(), 6);
        }
    }

    #[test]
    fn remeshing_replaces_the_slot() {
        let mut engine = engine(Arc::new(SolidGenerator { voxel: VoxelId::new(1) }));
        engine.request_missing_chunks(Point3::new(0.0, 0.0, 0.0));
        engine.finish_tasks();

        let coordinate = ChunkCoordinate::new(-1, -1, -1);
        {
            let store = engine.store();
            let mut store = store.get_mut();
            // Carve out one corner voxel: x, y and z = -1 in voxel coordinates.
            store
                .voxel_at_coordinates(-1, -1, -1, Some(VoxelId::AIR), false)
                .unwrap();
        }
        assert!(engine.schedule_mesh(coordinate));
        assert!(!engine.schedule_mesh(ChunkCoordinate::new(10, 10, 10)));
        engine.finish_tasks();

        let store = engine.store();
        let store = store.get();
        let meshes = store.meshes(coordinate);
        assert_eq!(meshes.len(), 1);
        assert!(meshes[0].opaque.quad_count() > 6);
    }

    #[test]
    fn empty_chunks_are_not_meshed() {
        let mut engine = engine(Arc::new(crate::voxels::chunk::EmptyGenerator));
        engine.request_missing_chunks(Point3::new(0.0, 0.0, 0.0));
        engine.finish_tasks();

        let store = engine.store();
        let store = store.get();
        assert_eq!(store.chunk_count(), 8);
        assert!(store
            .chunk_coordinates()
            .all(|coordinate| store.meshes(coordinate).is_empty()));
    }
}
