//! # Task Traits
//!
//! The contract between the [`super::TaskManager`] and the work it runs.
//!
//! A [`Task`] is processed on a worker thread and produces a [`TaskResult`].
//! The result is handed back to the thread that owns the manager, which calls
//! [`TaskResult::handle_result`] with the shared [`TaskContext`]. Handling a
//! result may produce follow-up tasks, which the manager publishes in turn.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::core::MtResource;
use crate::meshing::{MeshResult, MeshScratch, TransparencySet};
use crate::voxels::chunk::ChunkCoordinate;
use crate::voxels::store::ChunkStore;

/// State available to task results on the owning thread.
pub struct TaskContext {
    /// The chunk store, with a mesh slot holding [`MeshResult`]s.
    pub store: MtResource<ChunkStore<MeshResult>>,
    /// Materials meshed as transparent geometry.
    pub transparency: Arc<TransparencySet>,
    /// Chunks with a generation task published but not yet handled.
    pub pending_generation: HashSet<ChunkCoordinate>,
    /// Revision stamped on the next mesh snapshot.
    next_mesh_revision: u64,
    /// Revision of the newest mesh applied to each chunk.
    applied_mesh_revisions: HashMap<ChunkCoordinate, u64>,
}

impl TaskContext {
    pub fn new(store: MtResource<ChunkStore<MeshResult>>, transparency: Arc<TransparencySet>) -> Self {
        TaskContext {
            store,
            transparency,
            pending_generation: HashSet::new(),
            next_mesh_revision: 0,
            applied_mesh_revisions: HashMap::new(),
        }
    }

    /// Hands out increasing revisions, one per mesh snapshot.
    ///
    /// Take the revision before snapshotting the chunk, so a later revision
    /// always belongs to a later snapshot.
    pub fn next_mesh_revision(&mut self) -> u64 {
        let revision = self.next_mesh_revision;
        self.next_mesh_revision += 1;
        revision
    }

    /// Records `revision` as the chunk's current mesh unless a newer one was
    /// applied already.
    ///
    /// # Returns
    /// `false` if the mesh is outdated and must be dropped.
    pub fn accept_mesh_revision(&mut self, coordinate: ChunkCoordinate, revision: u64) -> bool {
        match self.applied_mesh_revisions.get(&coordinate) {
            Some(&applied) if applied > revision => false,
            _ => {
                self.applied_mesh_revisions.insert(coordinate, revision);
                true
            }
        }
    }

    /// Forgets the mesh revision of a chunk that is no longer loaded.
    pub fn forget_mesh_revision(&mut self, coordinate: ChunkCoordinate) {
        self.applied_mesh_revisions.remove(&coordinate);
    }
}

/// A unit of work executed on a worker thread.
///
/// Tasks own the data they work on. They must not hold the store lock for
/// longer than a snapshot takes, since the owning thread needs it to handle
/// results.
pub trait Task: Send {
    /// Processes the task on a worker thread.
    ///
    /// # Arguments
    /// * `scratch` - Mesher buffers owned by the worker running this task
    ///
    /// # Returns
    /// A boxed `TaskResult` that will be handled on the owning thread.
    fn process(&self, scratch: &mut MeshScratch) -> Box<dyn TaskResult + Send>;
}

/// The outcome of a [`Task`], applied on the thread that owns the manager.
pub trait TaskResult: Send {
    /// Applies the result to the shared state.
    ///
    /// # Arguments
    /// * `context` - The store, transparency set and generation bookkeeping
    ///
    /// # Returns
    /// Follow-up tasks to publish (can be empty).
    fn handle_result(self: Box<Self>, context: &mut TaskContext) -> Vec<Box<dyn Task + Send>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ChunkerConfig;
    use crate::voxels::chunk::EmptyGenerator;

    fn context() -> TaskContext {
        let store = ChunkStore::new(&ChunkerConfig::default(), Arc::new(EmptyGenerator)).unwrap();
        TaskContext::new(MtResource::new(store), Arc::new(TransparencySet::new()))
    }

    #[test]
    fn mesh_revisions_increase() {
        let mut context = context();
        let first = context.next_mesh_revision();
        let second = context.next_mesh_revision();
        assert!(second > first);
    }

    #[test]
    fn outdated_mesh_revisions_are_refused() {
        let mut context = context();
        let coordinate = ChunkCoordinate::new(1, -2, 0);
        let older = context.next_mesh_revision();
        let newer = context.next_mesh_revision();

        assert!(context.accept_mesh_revision(coordinate, newer));
        assert!(!context.accept_mesh_revision(coordinate, older));
        // Other chunks are tracked separately.
        assert!(context.accept_mesh_revision(ChunkCoordinate::ORIGIN, older));

        context.forget_mesh_revision(coordinate);
        assert!(context.accept_mesh_revision(coordinate, older));
    }
}
