//! Vertex data structures for voxel rendering.
//!
//! This module defines the interleaved vertex format chunk meshes are packed
//! into before upload.

/// A vertex of a chunk mesh.
///
/// # Memory Layout
/// - Position: [f32; 3] (12 bytes)
/// - Normal: [f32; 3] (12 bytes)
/// - Texture Coordinates: [f32; 2] (8 bytes)
///
/// Total size: 32 bytes
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    /// Position in world space
    pub position: [f32; 3],
    /// Face normal, constant across a quad
    pub normal: [f32; 3],
    /// Texture atlas coordinates
    pub tex_coords: [f32; 2],
}

impl Vertex {
    /// Byte offsets of the position, normal and tex_coords attributes.
    pub const ATTRIBUTE_OFFSETS: [usize; 3] = [0, 12, 24];

    /// Distance in bytes between consecutive vertices.
    pub const STRIDE: usize = std::mem::size_of::<Vertex>();

    pub fn new(position: [f32; 3], normal: [f32; 3], tex_coords: [f32; 2]) -> Self {
        Vertex {
            position,
            normal,
            tex_coords,
        }
    }
}
