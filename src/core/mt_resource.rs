use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// A thread-safe, reference-counted value behind a read-write lock.
///
/// `MtResource` is how state crosses between the caller's thread and worker
/// threads: cloning it shares the same value. The chunk engine keeps its
/// [`crate::voxels::store::ChunkStore`] in one, so every store access is
/// serialized by the lock.
///
/// A panic while a guard is held poisons the lock. The value is still handed
/// out afterwards, since every writer in this crate leaves it consistent
/// between statements.
///
/// # Type Parameters
/// - `T`: The type of the contained resource, must be `Send + Sync`
///
/// # Examples
///
/// ```
/// use std::thread;
/// use voxel_chunker::core::MtResource;
///
/// let counter = MtResource::new(0);
/// let worker_counter = counter.clone();
///
/// thread::spawn(move || {
///     *worker_counter.get_mut() += 1;
/// })
/// .join()
/// .unwrap();
///
/// assert_eq!(*counter.get(), 1);
/// ```
pub struct MtResource<T: Send + Sync> {
    resource: Arc<RwLock<T>>,
}

impl<T: Send + Sync> MtResource<T> {
    /// Creates a new `MtResource` containing the given value.
    ///
    /// # Arguments
    /// * `resource` - The value to be stored in the resource
    pub fn new(resource: T) -> Self {
        Self {
            resource: Arc::new(RwLock::new(resource)),
        }
    }

    /// Returns a read-only guard; blocks while a writer holds the lock.
    pub fn get(&self) -> RwLockReadGuard<'_, T> {
        self.resource.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns an exclusive guard; blocks while any other guard is held.
    pub fn get_mut(&self) -> RwLockWriteGuard<'_, T> {
        self.resource.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T: Send + Sync> Clone for MtResource<T> {
    fn clone(&self) -> Self {
        Self {
            resource: Arc::clone(&self.resource),
        }
    }
}
