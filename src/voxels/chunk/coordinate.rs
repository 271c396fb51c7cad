//! Chunk coordinates and their string keys.

use std::fmt;
use std::str::FromStr;

use cgmath::Point3;

use crate::error::ChunkerError;

/// Separator between the axes of a chunk key.
pub const CHUNK_KEY_SEPARATOR: char = '|';

/// Position of a chunk in the chunk grid (not in voxels or world units).
///
/// Coordinates may be negative. The store keys its map on the coordinate
/// itself; [`ChunkCoordinate::key`] gives the equivalent `"x|y|z"` string for
/// callers that need a textual key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct ChunkCoordinate {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl ChunkCoordinate {
    /// The chunk at the origin of the grid.
    pub const ORIGIN: ChunkCoordinate = ChunkCoordinate { x: 0, y: 0, z: 0 };

    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        ChunkCoordinate { x, y, z }
    }

    /// The unique string key of this coordinate, e.g. `"-1|0|3"`.
    pub fn key(&self) -> String {
        self.to_string()
    }

    pub const fn to_array(self) -> [i32; 3] {
        [self.x, self.y, self.z]
    }
}

impl fmt::Display for ChunkCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{sep}{}{sep}{}",
            self.x,
            self.y,
            self.z,
            sep = CHUNK_KEY_SEPARATOR
        )
    }
}

impl FromStr for ChunkCoordinate {
    type Err = ChunkerError;

    fn from_str(key: &str) -> Result<Self, Self::Err> {
        let invalid = || ChunkerError::InvalidChunkKey(key.to_string());
        let mut axes = key.split(CHUNK_KEY_SEPARATOR).map(|axis| axis.parse::<i32>());
        match (axes.next(), axes.next(), axes.next(), axes.next()) {
            (Some(Ok(x)), Some(Ok(y)), Some(Ok(z)), None) => Ok(ChunkCoordinate::new(x, y, z)),
            _ => Err(invalid()),
        }
    }
}

impl From<Point3<i32>> for ChunkCoordinate {
    fn from(point: Point3<i32>) -> Self {
        ChunkCoordinate::new(point.x, point.y, point.z)
    }
}

impl From<ChunkCoordinate> for Point3<i32> {
    fn from(coordinate: ChunkCoordinate) -> Self {
        Point3::new(coordinate.x, coordinate.y, coordinate.z)
    }
}

impl From<[i32; 3]> for ChunkCoordinate {
    fn from(axes: [i32; 3]) -> Self {
        ChunkCoordinate::new(axes[0], axes[1], axes[2])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_joins_axes_with_separator() {
        assert_eq!(ChunkCoordinate::new(-1, 0, 3).key(), "-1|0|3");
    }

    #[test]
    fn key_parses_back() {
        let coordinate = ChunkCoordinate::new(i32::MIN, 7, i32::MAX);
        assert_eq!(coordinate.key().parse::<ChunkCoordinate>().unwrap(), coordinate);
    }

    #[test]
    fn malformed_keys_are_rejected() {
        for key in ["", "1|2", "1|2|3|4", "a|b|c", "1,2,3"] {
            assert!(
                matches!(key.parse::<ChunkCoordinate>(), Err(ChunkerError::InvalidChunkKey(_))),
                "accepted {key:?}"
            );
        }
    }

    #[test]
    fn converts_to_and_from_points() {
        let point = Point3::new(4, -5, 6);
        let coordinate = ChunkCoordinate::from(point);
        assert_eq!(coordinate, ChunkCoordinate::new(4, -5, 6));
        assert_eq!(Point3::from(coordinate), point);
    }
}
