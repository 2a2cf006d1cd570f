//! Geometry output of the voxel engine.
//!
//! This module turns chunk voxel arrays into meshes a renderer can draw and
//! defines the interleaved vertex format those meshes are uploaded in. Drawing
//! itself is left to the embedding application.

pub mod meshing;
mod vertex;

// Re-export commonly used types
pub use meshing::{ChunkMesh, MeshFragment};
pub use vertex::Vertex;
