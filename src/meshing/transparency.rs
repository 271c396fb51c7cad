//! The set of materials rendered as transparent geometry.

use std::collections::HashSet;

use log::warn;

use crate::voxels::voxel_id::VoxelId;

/// Material ids whose voxels the mesher treats as transparent.
///
/// Air (material 0) can never be transparent and is refused on insert.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransparencySet {
    materials: HashSet<u32>,
}

impl TransparencySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a material id.
    ///
    /// # Returns
    /// `false` if the id was 0 or already present.
    pub fn insert(&mut self, material: u32) -> bool {
        if material == 0 {
            warn!("Ignoring material 0 in transparency set, air is never transparent");
            return false;
        }
        self.materials.insert(material)
    }

    pub fn contains(&self, material: u32) -> bool {
        self.materials.contains(&material)
    }

    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }

    /// The id the mesher compares: `voxel` with its transparency flag set if its
    /// material is in the set. Air stays air and a flag already set is kept.
    pub fn effective_type(&self, voxel: VoxelId) -> VoxelId {
        if !voxel.is_air() && self.contains(voxel.material()) {
            voxel.with_transparency(true)
        } else {
            voxel
        }
    }
}

impl FromIterator<u32> for TransparencySet {
    fn from_iter<I: IntoIterator<Item = u32>>(materials: I) -> Self {
        let mut set = TransparencySet::new();
        for material in materials {
            set.insert(material);
        }
        set
    }
}
