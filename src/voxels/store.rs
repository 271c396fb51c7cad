//! # Chunk Store
//!
//! The [`ChunkStore`] owns every loaded [`VoxelChunk`], keyed by its
//! [`ChunkCoordinate`], and routes voxel reads and writes through
//! [`ChunkAddressing`]. Chunks enter the store in exactly three ways:
//!
//! 1. the auto-create path of [`ChunkStore::voxel_at_coordinates`],
//! 2. explicit [`ChunkStore::register_chunk`],
//! 3. a background generation task that registers its result.
//!
//! The store has no lock of its own. Shared use goes through
//! [`crate::core::MtResource`], as the engine does.
//!
//! ## Attachment slots
//!
//! Next to the voxels, each coordinate has two slots whose contents the store
//! never inspects: a list of meshes (`M`) and one bodies value (`B`), meant
//! for renderer and physics handles. Slots are independent of the chunk map,
//! so removing a chunk leaves its slots alone.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Arc;

use cgmath::Point3;
use log::{debug, error};

use crate::config::ChunkerConfig;
use crate::error::ChunkerError;

use super::addressing::ChunkAddressing;
use super::chunk::{ChunkCoordinate, ChunkGenerator, VoxelChunk};
use super::voxel_id::VoxelId;

/// Generates the chunk at `coordinate` and checks its edge length.
///
/// This is the store's creation path without the store, so it can run on a
/// worker thread while the store itself stays unlocked.
///
/// # Errors
/// Returns [`ChunkerError::ChunkSideMismatch`] if the generator returns a chunk
/// whose side is not `chunk_size + chunk_pad`.
pub fn generate_chunk(
    addressing: &ChunkAddressing,
    generator: &dyn ChunkGenerator,
    coordinate: ChunkCoordinate,
) -> Result<VoxelChunk, ChunkerError> {
    let bounds = addressing.chunk_bounds(coordinate);
    let mut chunk = generator.generate(&bounds);
    check_side(addressing, coordinate, &chunk)?;
    chunk.set_position(coordinate);
    Ok(chunk)
}

fn check_side(
    addressing: &ChunkAddressing,
    coordinate: ChunkCoordinate,
    chunk: &VoxelChunk,
) -> Result<(), ChunkerError> {
    let expected = addressing.padded_side();
    if chunk.side() != expected {
        return Err(ChunkerError::ChunkSideMismatch {
            coordinate,
            expected,
            actual: chunk.side(),
        });
    }
    Ok(())
}

/// Map of chunk coordinates to chunks, plus per-chunk attachment slots.
///
/// # Type Parameters
/// - `M`: Mesh handles stored in the mesh slot of each coordinate
/// - `B`: Physics bodies stored in the bodies slot of each coordinate
pub struct ChunkStore<M = (), B = ()> {
    addressing: ChunkAddressing,
    generator: Arc<dyn ChunkGenerator>,
    chunks: HashMap<ChunkCoordinate, VoxelChunk>,
    meshes: HashMap<ChunkCoordinate, Vec<M>>,
    bodies: HashMap<ChunkCoordinate, B>,
}

impl<M, B> ChunkStore<M, B> {
    /// Creates an empty store.
    ///
    /// # Arguments
    /// * `config` - Addressing settings; validated here
    /// * `generator` - Fills chunks created by the store
    ///
    /// # Errors
    /// Returns the validation error of an invalid configuration.
    pub fn new(
        config: &ChunkerConfig,
        generator: Arc<dyn ChunkGenerator>,
    ) -> Result<Self, ChunkerError> {
        let addressing = config.validate()?;
        debug!(
            "Chunk store created: chunk size {}, padding {}, cube size {}",
            addressing.chunk_size(),
            addressing.chunk_pad(),
            addressing.cube_size()
        );

        Ok(ChunkStore {
            addressing,
            generator,
            chunks: HashMap::new(),
            meshes: HashMap::new(),
            bodies: HashMap::new(),
        })
    }

    pub fn addressing(&self) -> &ChunkAddressing {
        &self.addressing
    }

    /// The generator used for chunks created by this store.
    pub fn generator(&self) -> Arc<dyn ChunkGenerator> {
        Arc::clone(&self.generator)
    }

    pub fn get_chunk(&self, coordinate: ChunkCoordinate) -> Option<&VoxelChunk> {
        self.chunks.get(&coordinate)
    }

    pub fn get_chunk_mut(&mut self, coordinate: ChunkCoordinate) -> Option<&mut VoxelChunk> {
        self.chunks.get_mut(&coordinate)
    }

    pub fn contains_chunk(&self, coordinate: ChunkCoordinate) -> bool {
        self.chunks.contains_key(&coordinate)
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// Coordinates of every loaded chunk, in no particular order.
    pub fn chunk_coordinates(&self) -> impl Iterator<Item = ChunkCoordinate> + '_ {
        self.chunks.keys().copied()
    }

    /// Stores a chunk at `coordinate`, replacing and returning any previous one.
    ///
    /// The chunk's own position is overwritten with `coordinate`.
    ///
    /// # Errors
    /// Returns [`ChunkerError::ChunkSideMismatch`] if the chunk's edge length
    /// is not `chunk_size + chunk_pad`; the store is left unchanged.
    pub fn register_chunk(
        &mut self,
        coordinate: ChunkCoordinate,
        mut chunk: VoxelChunk,
    ) -> Result<Option<VoxelChunk>, ChunkerError> {
        check_side(&self.addressing, coordinate, &chunk)?;
        chunk.set_position(coordinate);
        debug!("Registering chunk {coordinate}");
        Ok(self.chunks.insert(coordinate, chunk))
    }

    /// Removes the chunk at `coordinate`. Removing an absent chunk does nothing.
    pub fn remove_chunk(&mut self, coordinate: ChunkCoordinate) -> Option<VoxelChunk> {
        let removed = self.chunks.remove(&coordinate);
        if removed.is_some() {
            debug!("Removed chunk {coordinate}");
        }
        removed
    }

    /// Runs the generator for `coordinate` without registering the result.
    pub fn generate_chunk(&self, coordinate: ChunkCoordinate) -> Result<VoxelChunk, ChunkerError> {
        generate_chunk(&self.addressing, self.generator.as_ref(), coordinate)
    }

    /// The chunk coordinates around `center`, see [`ChunkAddressing::nearby_chunks`].
    pub fn nearby_chunks(&self, center: ChunkCoordinate, radius: Option<i32>) -> Vec<ChunkCoordinate> {
        self.addressing.nearby_chunks(center, radius)
    }

    /// The chunks around a world position that are not loaded, in neighborhood order.
    ///
    /// # Arguments
    /// * `position` - World position whose chunk is the neighborhood center
    /// * `radius` - Neighborhood radius in chunks, `None` for the configured distance
    pub fn missing_chunks_near(&self, position: Point3<f64>, radius: Option<i32>) -> Vec<ChunkCoordinate> {
        let center = self.addressing.chunk_at_position(position);
        self.nearby_chunks(center, radius)
            .into_iter()
            .filter(|coordinate| !self.chunks.contains_key(coordinate))
            .collect()
    }

    /// Reads, and optionally writes, the voxel at a voxel coordinate.
    ///
    /// If the containing chunk is not loaded, writing a non-air voxel with
    /// `auto_create` set generates and registers it first. Any other access to
    /// an absent chunk, in particular writing air, is a no-op that returns
    /// `(VoxelId::AIR, None)`.
    ///
    /// # Arguments
    /// * `x`, `y`, `z` - Voxel coordinates
    /// * `new_value` - Voxel to write, `None` to only read
    /// * `auto_create` - Whether a non-air write may create the chunk
    ///
    /// # Returns
    /// The voxel before the call and the chunk holding it.
    ///
    /// # Errors
    /// Returns [`ChunkerError::ChunkSideMismatch`] if auto-creation produced a
    /// chunk of the wrong size; nothing is registered in that case.
    pub fn voxel_at_coordinates(
        &mut self,
        x: i32,
        y: i32,
        z: i32,
        new_value: Option<VoxelId>,
        auto_create: bool,
    ) -> Result<(VoxelId, Option<&VoxelChunk>), ChunkerError> {
        let coordinate = self.addressing.chunk_at_coordinates(x, y, z);
        let writes_solid = new_value.is_some_and(|voxel| !voxel.is_air());

        let chunk = match self.chunks.entry(coordinate) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                if !(writes_solid && auto_create) {
                    return Ok((VoxelId::AIR, None));
                }
                let chunk = generate_chunk(&self.addressing, self.generator.as_ref(), coordinate)?;
                debug!("Created chunk {coordinate} for a write at ({x}, {y}, {z})");
                entry.insert(chunk)
            }
        };

        let [lx, ly, lz] = self.addressing.local_offset(x, y, z);
        let previous = chunk.get(lx, ly, lz);
        if let Some(voxel) = new_value {
            chunk.set(lx, ly, lz, voxel);
        }

        Ok((previous, Some(&*chunk)))
    }

    /// [`ChunkStore::voxel_at_coordinates`] for the voxel containing a world position.
    pub fn voxel_at_position(
        &mut self,
        position: Point3<f64>,
        new_value: Option<VoxelId>,
        auto_create: bool,
    ) -> Result<(VoxelId, Option<&VoxelChunk>), ChunkerError> {
        let voxel = self.addressing.voxel_at_position(position);
        self.voxel_at_coordinates(voxel.x, voxel.y, voxel.z, new_value, auto_create)
    }

    /// Flat voxel indices are no longer exposed; this always fails.
    ///
    /// # Errors
    /// Always returns [`ChunkerError::RemovedOperation`].
    #[deprecated(note = "use `voxel_at_coordinates`")]
    pub fn voxel_index_from_coordinates(&self, x: i32, y: i32, z: i32) -> Result<usize, ChunkerError> {
        error!("voxel_index_from_coordinates called for ({x}, {y}, {z}) but has been removed");
        Err(ChunkerError::RemovedOperation {
            name: "voxel_index_from_coordinates",
            replacement: "voxel_at_coordinates",
        })
    }

    /// Appends a mesh to the slot at `coordinate`, or clears the slot on `None`.
    pub fn attach_mesh(&mut self, coordinate: ChunkCoordinate, mesh: Option<M>) {
        match mesh {
            Some(mesh) => self.meshes.entry(coordinate).or_default().push(mesh),
            None => {
                self.meshes.remove(&coordinate);
            }
        }
    }

    /// Meshes attached at `coordinate`, oldest first.
    pub fn meshes(&self, coordinate: ChunkCoordinate) -> &[M] {
        self.meshes.get(&coordinate).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Empties the mesh slot at `coordinate` and returns its contents.
    pub fn take_meshes(&mut self, coordinate: ChunkCoordinate) -> Vec<M> {
        self.meshes.remove(&coordinate).unwrap_or_default()
    }

    /// Replaces the bodies at `coordinate`, or clears them on `None`.
    ///
    /// # Returns
    /// The bodies previously stored there.
    pub fn set_bodies(&mut self, coordinate: ChunkCoordinate, bodies: Option<B>) -> Option<B> {
        match bodies {
            Some(bodies) => self.bodies.insert(coordinate, bodies),
            None => self.bodies.remove(&coordinate),
        }
    }

    pub fn bodies(&self, coordinate: ChunkCoordinate) -> Option<&B> {
        self.bodies.get(&coordinate)
    }

    pub fn take_bodies(&mut self, coordinate: ChunkCoordinate) -> Option<B> {
        self.bodies.remove(&coordinate)
    }
}
