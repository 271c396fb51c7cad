//! # Chunk Generation
//!
//! Content generation is a collaborator of the chunk store: whenever a chunk
//! has to be created, the store computes the chunk's bounds and asks a
//! [`ChunkGenerator`] for the voxels. Any `Fn(&ChunkBounds) -> VoxelChunk`
//! closure is a generator, and a few simple terrains are provided here.
//!
//! ## Built-in generators
//! - [`EmptyGenerator`]: all air
//! - [`SolidGenerator`]: every voxel the same material
//! - [`CheckerboardGenerator`]: alternating materials in a 3D grid
//! - [`RandomGenerator`]: seeded random sparse voxels
//! - [`PerlinGenerator`]: Perlin noise terrain with caves and overhangs
//!
//! All of them are functions of the world voxel position, so padding cells
//! receive the same voxels as the neighbouring chunk's core cells.

use cgmath::{Point3, Vector3};
use noise::{NoiseFn, Perlin};

use crate::voxels::voxel_id::VoxelId;

use super::{ChunkCoordinate, VoxelChunk};

/// Threshold above which Perlin noise is considered solid for terrain generation.
pub const PERLIN_POSITIVE_THRESHOLD: f64 = 0.2;
/// Threshold below which Perlin noise is considered solid for terrain generation.
pub const PERLIN_NEGATIVE_THRESHOLD: f64 = -0.2;
/// Scaling factor applied to world coordinates when sampling Perlin noise.
pub const PERLIN_SCALE_FACTOR: f64 = 0.02;
/// Height, in voxels, of each material layer of the Perlin terrain.
pub const PERLIN_LAYER_HEIGHT: i32 = 8;

/// The region of the world covered by one chunk, as passed to a generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkBounds {
    /// Lowest world voxel of the chunk core, `coordinate << chunk_bits`.
    pub low: Point3<i32>,
    /// One past the highest world voxel, `(coordinate + 1) << chunk_bits`.
    pub high: Point3<i32>,
    /// The chunk being generated.
    pub coordinate: ChunkCoordinate,
    /// Total padding per axis around the core.
    pub chunk_pad: u32,
}

impl ChunkBounds {
    /// Edge length the generated chunk must have, padding included.
    pub fn padded_side(&self) -> usize {
        (self.high.x - self.low.x) as usize + self.chunk_pad as usize
    }

    /// World voxel position of a local cell, padding cells included.
    pub fn world_position(&self, local: [usize; 3]) -> Point3<i32> {
        let pad_half = (self.chunk_pad / 2) as i32;
        self.low + Vector3::new(local[0] as i32, local[1] as i32, local[2] as i32)
            - Vector3::new(pad_half, pad_half, pad_half)
    }

    /// Builds a chunk for these bounds from a function of world voxel positions.
    pub fn fill(&self, mut voxel_at: impl FnMut(Point3<i32>) -> VoxelId) -> VoxelChunk {
        VoxelChunk::from_fn(self.coordinate, self.padded_side(), |x, y, z| {
            voxel_at(self.world_position([x, y, z]))
        })
    }
}

/// Produces the voxels of a newly created chunk.
///
/// Implementations must return a chunk of edge length
/// [`ChunkBounds::padded_side`]; the store rejects anything else.
pub trait ChunkGenerator: Send + Sync {
    fn generate(&self, bounds: &ChunkBounds) -> VoxelChunk;
}

impl<F> ChunkGenerator for F
where
    F: Fn(&ChunkBounds) -> VoxelChunk + Send + Sync,
{
    fn generate(&self, bounds: &ChunkBounds) -> VoxelChunk {
        self(bounds)
    }
}

/// Generates chunks of air.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyGenerator;

impl ChunkGenerator for EmptyGenerator {
    fn generate(&self, bounds: &ChunkBounds) -> VoxelChunk {
        VoxelChunk::new(bounds.coordinate, bounds.padded_side())
    }
}

/// Generates chunks completely filled with one voxel.
#[derive(Debug, Clone, Copy)]
pub struct SolidGenerator {
    pub voxel: VoxelId,
}

impl ChunkGenerator for SolidGenerator {
    fn generate(&self, bounds: &ChunkBounds) -> VoxelChunk {
        bounds.fill(|_| self.voxel)
    }
}

/// Generates a 3D checkerboard: `even` where `x + y + z` is even, `odd` elsewhere.
///
/// Either voxel may be air.
#[derive(Debug, Clone, Copy)]
pub struct CheckerboardGenerator {
    pub even: VoxelId,
    pub odd: VoxelId,
}

impl ChunkGenerator for CheckerboardGenerator {
    fn generate(&self, bounds: &ChunkBounds) -> VoxelChunk {
        bounds.fill(|position| {
            let parity = (position.x as i64 + position.y as i64 + position.z as i64).rem_euclid(2);
            if parity == 0 {
                self.even
            } else {
                self.odd
            }
        })
    }
}

/// Generates sparse random voxels, reproducibly per seed and chunk.
#[derive(Debug, Clone)]
pub struct RandomGenerator {
    seed: u64,
    /// Fraction of voxels left as air.
    sparseness: f64,
    materials: Vec<VoxelId>,
}

impl RandomGenerator {
    /// Creates a random generator.
    ///
    /// # Arguments
    /// * `seed` - Base seed; each chunk derives its own seed from it
    /// * `sparseness` - Probability that a voxel is air, clamped to `0.0..=1.0`
    /// * `materials` - Voxels to pick from; an empty list generates only air
    pub fn new(seed: u64, sparseness: f64, materials: Vec<VoxelId>) -> Self {
        RandomGenerator {
            seed,
            sparseness: sparseness.clamp(0.0, 1.0),
            materials,
        }
    }

    fn chunk_seed(&self, coordinate: ChunkCoordinate) -> u64 {
        self.seed
            ^ (coordinate.x as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15)
            ^ (coordinate.y as u64).wrapping_mul(0xC2B2_AE3D_27D4_EB4F)
            ^ (coordinate.z as u64).wrapping_mul(0x1656_67B1_9E37_79F9)
    }
}

impl ChunkGenerator for RandomGenerator {
    fn generate(&self, bounds: &ChunkBounds) -> VoxelChunk {
        let mut rng = fastrand::Rng::with_seed(self.chunk_seed(bounds.coordinate));
        bounds.fill(|_| {
            if self.materials.is_empty() || rng.f64() < self.sparseness {
                VoxelId::AIR
            } else {
                self.materials[rng.usize(..self.materials.len())]
            }
        })
    }
}

/// Generates terrain by sampling 3D Perlin noise.
///
/// A voxel is solid where the noise falls outside
/// `PERLIN_NEGATIVE_THRESHOLD..=PERLIN_POSITIVE_THRESHOLD`, which yields
/// natural-looking terrain with caves and overhangs. Solid voxels are layered
/// by altitude through the material list.
#[derive(Clone)]
pub struct PerlinGenerator {
    perlin: Perlin,
    scale_factor: f64,
    materials: Vec<VoxelId>,
}

impl PerlinGenerator {
    /// Creates a Perlin terrain generator.
    ///
    /// # Arguments
    /// * `seed` - Noise seed
    /// * `materials` - Voxels used for successive altitude layers; an empty
    ///   list generates only air
    pub fn new(seed: u32, materials: Vec<VoxelId>) -> Self {
        PerlinGenerator {
            perlin: Perlin::new(seed),
            scale_factor: PERLIN_SCALE_FACTOR,
            materials,
        }
    }

    /// Replaces the factor applied to world coordinates before sampling.
    pub fn with_scale_factor(mut self, scale_factor: f64) -> Self {
        self.scale_factor = scale_factor;
        self
    }

    fn to_perlin_pos(&self, position: Point3<i32>) -> [f64; 3] {
        [
            position.x as f64 * self.scale_factor,
            position.y as f64 * self.scale_factor,
            position.z as f64 * self.scale_factor,
        ]
    }
}

impl ChunkGenerator for PerlinGenerator {
    fn generate(&self, bounds: &ChunkBounds) -> VoxelChunk {
        bounds.fill(|position| {
            if self.materials.is_empty() {
                return VoxelId::AIR;
            }
            let sample = self.perlin.get(self.to_perlin_pos(position));
            if (PERLIN_NEGATIVE_THRESHOLD..=PERLIN_POSITIVE_THRESHOLD).contains(&sample) {
                return VoxelId::AIR;
            }
            let layer = position.y.div_euclid(PERLIN_LAYER_HEIGHT);
            self.materials[layer.rem_euclid(self.materials.len() as i32) as usize]
        })
    }
}
