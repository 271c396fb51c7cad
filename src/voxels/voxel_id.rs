//! # Voxel Id Module
//!
//! A voxel is stored as a single packed 32-bit id. The low 28 bits hold the
//! material, the top bit flags the voxel as transparent and the three bits in
//! between are reserved for a face direction. Call sites go through the
//! accessors on [`VoxelId`] instead of repeating the masks.
//!
//! ```text
//!  31  30..28        27..0
//! [T] [ face ] [   material id   ]
//! ```

use std::fmt;

/// Bit flagging a voxel as transparent.
pub const TRANSPARENT_MASK: u32 = 0x8000_0000;
/// Bits reserved for the direction a voxel faces.
pub const FACE_DIRECTION_MASK: u32 = 0x7000_0000;
/// Bits holding the material id.
pub const MATERIAL_MASK: u32 = 0x0FFF_FFFF;

const FACE_DIRECTION_SHIFT: u32 = 28;

/// A packed voxel value.
///
/// The raw value 0 is air: it never carries flags and is never rendered.
/// Two ids describe the same surface only if their raw values are equal, so a
/// transparent and an opaque voxel of the same material never merge.
///
/// # Memory Layout
/// `#[repr(transparent)]` over a `u32`, so voxel buffers can be viewed as raw
/// integer slices with `bytemuck` and handed to the mesher without copying.
#[repr(transparent)]
#[derive(Copy, Clone, Default, PartialEq, Eq, Hash, bytemuck::Pod, bytemuck::Zeroable)]
pub struct VoxelId(u32);

impl VoxelId {
    /// Empty space.
    pub const AIR: VoxelId = VoxelId(0);

    /// Creates an opaque voxel of the given material.
    ///
    /// Bits above the material range are discarded.
    pub const fn new(material: u32) -> Self {
        VoxelId(material & MATERIAL_MASK)
    }

    /// Wraps a raw packed value, flags included.
    pub const fn from_raw(raw: u32) -> Self {
        VoxelId(raw)
    }

    /// The raw packed value, flags included.
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// The material id with every flag removed.
    pub const fn material(self) -> u32 {
        self.0 & MATERIAL_MASK
    }

    /// Whether the transparency flag is set.
    pub const fn is_transparent(self) -> bool {
        self.0 & TRANSPARENT_MASK == TRANSPARENT_MASK
    }

    /// Whether this is air (raw value 0).
    pub const fn is_air(self) -> bool {
        self.0 == 0
    }

    /// The reserved face-direction bits, shifted down to `0..8`.
    pub const fn face_direction(self) -> u8 {
        ((self.0 & FACE_DIRECTION_MASK) >> FACE_DIRECTION_SHIFT) as u8
    }

    /// Returns a copy with the transparency flag set or cleared.
    ///
    /// Air stays air: flags are never attached to the value 0.
    pub const fn with_transparency(self, transparent: bool) -> Self {
        if self.is_air() {
            return self;
        }
        if transparent {
            VoxelId(self.0 | TRANSPARENT_MASK)
        } else {
            VoxelId(self.0 & !TRANSPARENT_MASK)
        }
    }

    /// Returns a copy with the face-direction bits replaced.
    pub const fn with_face_direction(self, direction: u8) -> Self {
        if self.is_air() {
            return self;
        }
        let bits = ((direction as u32) << FACE_DIRECTION_SHIFT) & FACE_DIRECTION_MASK;
        VoxelId((self.0 & !FACE_DIRECTION_MASK) | bits)
    }
}

impl From<u32> for VoxelId {
    fn from(raw: u32) -> Self {
        VoxelId::from_raw(raw)
    }
}

impl From<VoxelId> for u32 {
    fn from(voxel: VoxelId) -> Self {
        voxel.raw()
    }
}

impl fmt::Debug for VoxelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_air() {
            return write!(f, "VoxelId(air)");
        }
        write!(f, "VoxelId({}", self.material())?;
        if self.is_transparent() {
            write!(f, ", transparent")?;
        }
        if self.face_direction() != 0 {
            write!(f, ", face {}", self.face_direction())?;
        }
        write!(f, ")")
    }
}
