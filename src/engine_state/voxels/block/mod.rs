//! # Block Module
//!
//! This module provides the per-voxel material data: voxel types, their
//! interaction classes, face material assignment, durability, and the
//! texture-atlas rectangles used when emitting faces.

use block_type::VoxelType;
use face_material::FaceMaterial;

pub mod block_side;
pub mod block_type;
pub mod face_material;

/// The underlying integer type used to represent voxel types in memory.
pub type VoxelTypeSize = u8;

/// How a voxel participates in face culling and collision.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum InteractionClass {
    /// Nothing there. Never meshed, never occludes.
    EMPTY,
    /// Regular opaque block.
    SOLID,
    /// Fluid. Never meshed, never occludes.
    LIQUID,
    /// Ornamental block. Meshed and occluding like a solid one.
    DECORATIVE,
}

impl InteractionClass {
    /// Whether voxels of this class produce geometry of their own.
    #[inline]
    pub fn is_meshable(self) -> bool {
        !matches!(self, InteractionClass::EMPTY | InteractionClass::LIQUID)
    }

    /// Whether voxels of this class hide the adjacent face of a neighbour.
    ///
    /// Same as [`is_meshable`](Self::is_meshable): empty and liquid cells
    /// never occlude.
    #[inline]
    pub fn occludes(self) -> bool {
        self.is_meshable()
    }
}

/// Interaction class of each voxel type, indexed by `VoxelType as usize`.
pub static VOXEL_TYPE_INTERACTIONS: [InteractionClass; 10] = [
    InteractionClass::SOLID,  // GRASS
    InteractionClass::SOLID,  // DIRT
    InteractionClass::LIQUID, // WATER
    InteractionClass::SOLID,  // STONE
    InteractionClass::SOLID,  // SAND
    InteractionClass::SOLID,  // GOLD
    InteractionClass::SOLID,  // OBSIDIAN
    InteractionClass::SOLID,  // REDSTONE
    InteractionClass::SOLID,  // DIAMOND
    InteractionClass::EMPTY,  // AIR
];

/// Maps each voxel type to the face material used on each of its sides.
///
/// The inner array is in `BlockSide` order:
/// [FORWARD, BACK, LEFT, RIGHT, UP, DOWN]
pub static VOXEL_TYPE_FACE_MATERIALS: [[FaceMaterial; 6]; 10] = {
    use FaceMaterial as F;
    [
        // GRASS (sides: grass side, top: grass top, bottom: dirt)
        [F::GRASSSIDE, F::GRASSSIDE, F::GRASSSIDE, F::GRASSSIDE, F::GRASSTOP, F::DIRT],
        [F::DIRT; 6],
        [F::WATER; 6],
        [F::STONE; 6],
        [F::SAND; 6],
        [F::GOLD; 6],
        [F::OBSIDIAN; 6],
        [F::REDSTONE; 6],
        [F::DIAMOND; 6],
        [F::AIR; 6],
    ]
};

/// Hits needed to break each voxel type. AIR is `-1`.
pub static VOXEL_TYPE_DURABILITY: [i32; 10] = [1, 1, 1, 2, 1, 3, 8, 3, 4, -1];

/// Lowercase names accepted by [`VoxelType::from_name`].
pub static VOXEL_TYPE_NAMES: phf::Map<&'static str, VoxelType> = phf::phf_map! {
    "grass" => VoxelType::GRASS,
    "dirt" => VoxelType::DIRT,
    "water" => VoxelType::WATER,
    "stone" => VoxelType::STONE,
    "sand" => VoxelType::SAND,
    "gold" => VoxelType::GOLD,
    "obsidian" => VoxelType::OBSIDIAN,
    "redstone" => VoxelType::REDSTONE,
    "diamond" => VoxelType::DIAMOND,
    "air" => VoxelType::AIR,
};
