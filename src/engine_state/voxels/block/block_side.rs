//! # Block Side Module
//!
//! This module defines the six faces of a voxel cell, the neighbour each one
//! looks at during culling, and the constant normal it is emitted with.

use cgmath::Vector3;

/// Represents the six possible faces of a voxel.
///
/// The discriminants index the per-type face material table and fix the
/// order faces are emitted in, so they must not be reordered.
///
/// The order is: [FORWARD, BACK, LEFT, RIGHT, UP, DOWN]
#[derive(PartialEq, Eq, Hash, Copy, Clone, Debug)]
pub enum BlockSide {
    /// Facing positive Z
    FORWARD = 0,

    /// Facing negative Z
    BACK = 1,

    /// Facing negative X
    LEFT = 2,

    /// Facing positive X
    RIGHT = 3,

    /// Facing positive Y
    UP = 4,

    /// Facing negative Y
    DOWN = 5,
}

impl BlockSide {
    /// Returns an array containing all six faces in emission order.
    pub fn all() -> [BlockSide; 6] {
        [
            BlockSide::FORWARD,
            BlockSide::BACK,
            BlockSide::LEFT,
            BlockSide::RIGHT,
            BlockSide::UP,
            BlockSide::DOWN,
        ]
    }

    /// Offset from a cell to the neighbour this face touches.
    pub fn neighbour_offset(self) -> Vector3<i64> {
        match self {
            BlockSide::FORWARD => Vector3::new(0, 0, 1),
            BlockSide::BACK => Vector3::new(0, 0, -1),
            BlockSide::LEFT => Vector3::new(-1, 0, 0),
            BlockSide::RIGHT => Vector3::new(1, 0, 0),
            BlockSide::UP => Vector3::new(0, 1, 0),
            BlockSide::DOWN => Vector3::new(0, -1, 0),
        }
    }

    /// The constant normal written for every vertex of this face.
    pub fn normal(self) -> [f32; 3] {
        let offset = self.neighbour_offset();
        [offset.x as f32, offset.y as f32, offset.z as f32]
    }
}
