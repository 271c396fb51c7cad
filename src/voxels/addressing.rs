//! # Voxel Addressing
//!
//! Pure coordinate math between the three spaces the store works in:
//!
//! * **world** positions, in world units (`f64`),
//! * **voxel** coordinates, one integer per voxel (`position / cube_size`, floored),
//! * **chunk** coordinates, one integer per chunk (`voxel >> chunk_bits`).
//!
//! Inside a chunk a voxel lives at the padded local offset
//! `(voxel & chunk_mask) + chunk_pad / 2` on each axis.
//!
//! Because the chunk size is a power of two, the arithmetic right shift is a
//! floor division that is also correct for negative coordinates: voxel `-1`
//! belongs to chunk `-1` at local offset `chunk_size - 1`.

use cgmath::Point3;

use crate::config::ChunkerConfig;
use crate::error::ChunkerError;

use super::chunk::{ChunkBounds, ChunkCoordinate};

/// Largest padded chunk edge, in voxels. Keeps a chunk under `512^3` voxels.
pub const MAX_PADDED_SIDE: u32 = 512;

/// Validated addressing constants derived from a [`ChunkerConfig`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChunkAddressing {
    chunk_size: u32,
    chunk_bits: u32,
    chunk_mask: i32,
    chunk_pad: u32,
    chunk_pad_half: u32,
    cube_size: f64,
    chunk_distance: i32,
}

impl ChunkAddressing {
    /// Validates the configuration and derives the bit-level constants.
    ///
    /// # Errors
    /// * [`ChunkerError::InvalidChunkSize`] if `chunk_size` is not a power of two
    /// * [`ChunkerError::OddChunkPad`] if `chunk_pad` is odd
    /// * [`ChunkerError::ChunkTooLarge`] if `chunk_size + chunk_pad` exceeds [`MAX_PADDED_SIDE`]
    /// * [`ChunkerError::InvalidCubeSize`] if `cube_size` is not positive and finite
    pub fn new(config: &ChunkerConfig) -> Result<Self, ChunkerError> {
        if !config.chunk_size.is_power_of_two() {
            return Err(ChunkerError::InvalidChunkSize(config.chunk_size));
        }
        if config.chunk_pad % 2 != 0 {
            return Err(ChunkerError::OddChunkPad(config.chunk_pad));
        }
        let padded_side = config.chunk_size.checked_add(config.chunk_pad);
        if !matches!(padded_side, Some(side) if side <= MAX_PADDED_SIDE) {
            return Err(ChunkerError::ChunkTooLarge {
                size: config.chunk_size,
                pad: config.chunk_pad,
                max: MAX_PADDED_SIDE,
            });
        }
        if !(config.cube_size.is_finite() && config.cube_size > 0.0) {
            return Err(ChunkerError::InvalidCubeSize(config.cube_size));
        }

        Ok(ChunkAddressing {
            chunk_size: config.chunk_size,
            chunk_bits: config.chunk_size.trailing_zeros(),
            chunk_mask: (config.chunk_size - 1) as i32,
            chunk_pad: config.chunk_pad,
            chunk_pad_half: config.chunk_pad / 2,
            cube_size: config.cube_size,
            chunk_distance: config.chunk_distance,
        })
    }

    pub fn chunk_size(&self) -> u32 {
        self.chunk_size
    }

    /// `log2(chunk_size)`.
    pub fn chunk_bits(&self) -> u32 {
        self.chunk_bits
    }

    /// `chunk_size - 1`.
    pub fn chunk_mask(&self) -> i32 {
        self.chunk_mask
    }

    pub fn chunk_pad(&self) -> u32 {
        self.chunk_pad
    }

    pub fn chunk_pad_half(&self) -> u32 {
        self.chunk_pad_half
    }

    pub fn cube_size(&self) -> f64 {
        self.cube_size
    }

    /// Default neighborhood radius for [`ChunkAddressing::nearby_chunks`].
    pub fn chunk_distance(&self) -> i32 {
        self.chunk_distance
    }

    /// Edge length of a stored chunk, `chunk_size + chunk_pad`.
    pub fn padded_side(&self) -> usize {
        (self.chunk_size + self.chunk_pad) as usize
    }

    /// The chunk containing a voxel coordinate.
    pub fn chunk_at_coordinates(&self, x: i32, y: i32, z: i32) -> ChunkCoordinate {
        ChunkCoordinate::new(x >> self.chunk_bits, y >> self.chunk_bits, z >> self.chunk_bits)
    }

    /// The voxel containing a world position, `floor(position / cube_size)`.
    pub fn voxel_at_position(&self, position: Point3<f64>) -> Point3<i32> {
        Point3::new(
            (position.x / self.cube_size).floor() as i32,
            (position.y / self.cube_size).floor() as i32,
            (position.z / self.cube_size).floor() as i32,
        )
    }

    /// The chunk containing a world position.
    pub fn chunk_at_position(&self, position: Point3<f64>) -> ChunkCoordinate {
        let voxel = self.voxel_at_position(position);
        self.chunk_at_coordinates(voxel.x, voxel.y, voxel.z)
    }

    /// The voxel bounds of a chunk, as handed to the generator.
    ///
    /// `low` is `coordinate << chunk_bits` and `high` is
    /// `(coordinate + 1) << chunk_bits` on each axis.
    pub fn chunk_bounds(&self, coordinate: ChunkCoordinate) -> ChunkBounds {
        let bits = self.chunk_bits;
        ChunkBounds {
            low: Point3::new(coordinate.x << bits, coordinate.y << bits, coordinate.z << bits),
            high: Point3::new(
                (coordinate.x + 1) << bits,
                (coordinate.y + 1) << bits,
                (coordinate.z + 1) << bits,
            ),
            coordinate,
            chunk_pad: self.chunk_pad,
        }
    }

    /// The padded offset of a voxel inside its chunk.
    pub fn local_offset(&self, x: i32, y: i32, z: i32) -> [usize; 3] {
        let half = self.chunk_pad_half as usize;
        [
            (x & self.chunk_mask) as usize + half,
            (y & self.chunk_mask) as usize + half,
            (z & self.chunk_mask) as usize + half,
        ]
    }

    /// The voxel coordinate of a padded local offset inside a chunk.
    ///
    /// Inverse of [`ChunkAddressing::chunk_at_coordinates`] combined with
    /// [`ChunkAddressing::local_offset`] for offsets in the chunk core.
    pub fn voxel_from_local(&self, coordinate: ChunkCoordinate, local: [usize; 3]) -> Point3<i32> {
        let bits = self.chunk_bits;
        let half = self.chunk_pad_half as i32;
        Point3::new(
            (coordinate.x << bits) + local[0] as i32 - half,
            (coordinate.y << bits) + local[1] as i32 - half,
            (coordinate.z << bits) + local[2] as i32 - half,
        )
    }

    /// The chunk coordinates around `center`.
    ///
    /// Covers the half-open cube `center - radius .. center + radius` on each
    /// axis (edge `2 * radius`), enumerated with x outermost, then y, then z,
    /// all ascending. A radius of 0 yields `center` alone. `None` uses the
    /// configured chunk distance.
    pub fn nearby_chunks(&self, center: ChunkCoordinate, radius: Option<i32>) -> Vec<ChunkCoordinate> {
        let radius = radius.unwrap_or(self.chunk_distance).max(0);
        if radius == 0 {
            return vec![center];
        }

        let edge = (2 * radius) as usize;
        let mut nearby = Vec::with_capacity(edge * edge * edge);
        for x in (center.x - radius)..(center.x + radius) {
            for y in (center.y - radius)..(center.y + radius) {
                for z in (center.z - radius)..(center.z + radius) {
                    nearby.push(ChunkCoordinate::new(x, y, z));
                }
            }
        }
        nearby
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addressing(chunk_size: u32, chunk_pad: u32) -> ChunkAddressing {
        ChunkAddressing::new(&ChunkerConfig {
            chunk_size,
            chunk_pad,
            ..ChunkerConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn bits_and_mask_follow_chunk_size() {
        for bits in 0..=MAX_PADDED_SIDE.trailing_zeros() {
            let size = 1u32 << bits;
            let a = addressing(size, 0);
            assert_eq!(a.chunk_bits(), bits);
            assert_eq!(a.chunk_mask(), size as i32 - 1);
            for coordinate in [-70_000, -33, -1, 0, 1, 31, 32, 65_537] {
                let rebuilt =
                    ((coordinate >> a.chunk_bits()) << a.chunk_bits()) | (coordinate & a.chunk_mask());
                assert_eq!(rebuilt, coordinate);
            }
        }
    }

    #[test]
    fn rejects_non_power_of_two_sizes() {
        for size in [0, 3, 6, 24, 33, 100] {
            let config = ChunkerConfig {
                chunk_size: size,
                ..ChunkerConfig::default()
            };
            assert!(matches!(
                ChunkAddressing::new(&config),
                Err(ChunkerError::InvalidChunkSize(s)) if s == size
            ));
        }
    }

    #[test]
    fn rejects_chunks_past_the_edge_limit() {
        assert_eq!(addressing(MAX_PADDED_SIDE, 0).padded_side(), MAX_PADDED_SIDE as usize);

        for (chunk_size, chunk_pad) in [
            (MAX_PADDED_SIDE * 2, 0),
            (MAX_PADDED_SIDE, 2),
            (1 << 20, 0),
            (4, u32::MAX - 1),
        ] {
            let config = ChunkerConfig {
                chunk_size,
                chunk_pad,
                ..ChunkerConfig::default()
            };
            assert!(matches!(
                ChunkAddressing::new(&config),
                Err(ChunkerError::ChunkTooLarge { size, pad, .. }) if size == chunk_size && pad == chunk_pad
            ));
        }
    }

    #[test]
    fn rejects_bad_cube_sizes() {
        for cube_size in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let config = ChunkerConfig {
                cube_size,
                ..ChunkerConfig::default()
            };
            assert!(matches!(
                ChunkAddressing::new(&config),
                Err(ChunkerError::InvalidCubeSize(_))
            ));
        }
    }

    #[test]
    fn negative_voxels_floor_into_negative_chunks() {
        let a = addressing(32, 0);
        assert_eq!(a.chunk_at_coordinates(-1, 0, 31), ChunkCoordinate::new(-1, 0, 0));
        assert_eq!(a.chunk_at_coordinates(-32, -33, 32), ChunkCoordinate::new(-1, -2, 1));
        assert_eq!(a.local_offset(-1, -32, -33), [31, 0, 31]);
    }

    #[test]
    fn world_to_chunk_and_back_is_lossless() {
        let a = addressing(16, 4);
        for x in -40..40 {
            for y in [-17, -16, -1, 0, 15, 16] {
                let chunk = a.chunk_at_coordinates(x, y, -x);
                let local = a.local_offset(x, y, -x);
                for axis in local {
                    assert!(axis >= 2 && axis < 18);
                }
                assert_eq!(a.voxel_from_local(chunk, local), Point3::new(x, y, -x));
            }
        }
    }

    #[test]
    fn positions_floor_by_cube_size() {
        let a = addressing(32, 0);
        assert_eq!(a.voxel_at_position(Point3::new(24.9, 25.0, -0.1)), Point3::new(0, 1, -1));
        assert_eq!(
            a.chunk_at_position(Point3::new(800.0, -0.5, 799.9)),
            ChunkCoordinate::new(1, -1, 0)
        );
    }

    #[test]
    fn bounds_span_one_chunk() {
        let a = addressing(32, 2);
        let bounds = a.chunk_bounds(ChunkCoordinate::new(-1, 0, 2));
        assert_eq!(bounds.low, Point3::new(-32, 0, 64));
        assert_eq!(bounds.high, Point3::new(0, 32, 96));
        assert_eq!(bounds.padded_side(), a.padded_side());
    }

    #[test]
    fn nearby_chunks_enumerates_half_open_cube() {
        let a = addressing(32, 0);
        let nearby = a.nearby_chunks(ChunkCoordinate::new(5, 5, 5), Some(1));
        assert_eq!(
            nearby,
            vec![
                ChunkCoordinate::new(4, 4, 4),
                ChunkCoordinate::new(4, 4, 5),
                ChunkCoordinate::new(4, 5, 4),
                ChunkCoordinate::new(4, 5, 5),
                ChunkCoordinate::new(5, 4, 4),
                ChunkCoordinate::new(5, 4, 5),
                ChunkCoordinate::new(5, 5, 4),
                ChunkCoordinate::new(5, 5, 5),
            ]
        );
    }

    #[test]
    fn nearby_chunks_radius_zero_is_center() {
        let a = addressing(32, 0);
        let center = ChunkCoordinate::new(-3, 2, 9);
        assert_eq!(a.nearby_chunks(center, Some(0)), vec![center]);
    }

    #[test]
    fn nearby_chunks_defaults_to_chunk_distance() {
        let a = addressing(32, 0);
        assert_eq!(a.chunk_distance(), 2);
        assert_eq!(a.nearby_chunks(ChunkCoordinate::ORIGIN, None).len(), 64);
    }
}
