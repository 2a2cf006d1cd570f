//! # Voxel Type Module
//!
//! This module defines the materials a voxel cell can hold.
//! It provides conversion from integers and names, and the per-type
//! interaction class, face materials and durability lookups.

use num_derive::FromPrimitive;
use num_traits::FromPrimitive;

use super::{
    face_material::FaceMaterial, InteractionClass, VoxelTypeSize, VOXEL_TYPE_DURABILITY,
    VOXEL_TYPE_FACE_MATERIALS, VOXEL_TYPE_INTERACTIONS, VOXEL_TYPE_NAMES,
};

/// Enumerates all possible voxel materials in the world.
///
/// The discriminant order is significant: it indexes the interaction,
/// face material and durability tables in the parent module.
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default, FromPrimitive)]
pub enum VoxelType {
    /// Topsoil block with grass on top and dirt underneath.
    GRASS,

    /// Plain dirt found between the surface and the stone layer.
    DIRT,

    /// Liquid voxel. Never meshed and never hides a neighbour's face.
    WATER,

    /// Bulk underground material.
    STONE,

    /// Sand block, only placed by edits.
    SAND,

    /// Gold ore, only placed by edits.
    GOLD,

    /// Bedrock material written at the bedrock layer.
    OBSIDIAN,

    /// Redstone ore, only placed by edits.
    REDSTONE,

    /// Diamond ore, scattered between the diamond layers.
    DIAMOND,

    /// Empty cell.
    #[default]
    AIR,
}

impl VoxelType {
    /// Every voxel type, in discriminant order.
    pub const ALL: [VoxelType; 10] = [
        VoxelType::GRASS,
        VoxelType::DIRT,
        VoxelType::WATER,
        VoxelType::STONE,
        VoxelType::SAND,
        VoxelType::GOLD,
        VoxelType::OBSIDIAN,
        VoxelType::REDSTONE,
        VoxelType::DIAMOND,
        VoxelType::AIR,
    ];

    /// Converts a raw `VoxelTypeSize` to a `VoxelType`.
    ///
    /// # Returns
    /// `None` if the value doesn't correspond to a valid `VoxelType`.
    pub fn from_index(index: VoxelTypeSize) -> Option<Self> {
        FromPrimitive::from_u8(index)
    }

    /// Looks up a voxel type by its lowercase name (e.g. `"stone"`).
    pub fn from_name(name: &str) -> Option<Self> {
        VOXEL_TYPE_NAMES.get(name).copied()
    }

    /// How this voxel type interacts with face culling and collision.
    #[inline]
    pub fn interaction(self) -> InteractionClass {
        VOXEL_TYPE_INTERACTIONS[self as usize]
    }

    /// The face material for each side, in `BlockSide` order.
    #[inline]
    pub fn face_materials(self) -> &'static [FaceMaterial; 6] {
        &VOXEL_TYPE_FACE_MATERIALS[self as usize]
    }

    /// Number of hits needed to break this voxel; `-1` for unbreakable/empty.
    #[inline]
    pub fn durability(self) -> i32 {
        VOXEL_TYPE_DURABILITY[self as usize]
    }

    /// Whether a voxel of this type produces geometry of its own.
    #[inline]
    pub fn is_meshable(self) -> bool {
        self.interaction().is_meshable()
    }

    /// Whether a voxel of this type hides the adjacent face of its neighbour.
    #[inline]
    pub fn occludes(self) -> bool {
        self.interaction().occludes()
    }
}
