//! Mesh data for voxel rendering.
//!
//! # Architecture
//! - [`FaceQuad`]: corners, normal, UVs and two triangles of one visible face
//! - [`MeshBuffers`]: parallel attribute arrays shared by fragments and meshes
//! - [`MeshFragment`]: the geometry of a single voxel
//! - [`ChunkMesh`]: every fragment of a chunk merged into one buffer, with
//!   bounds and a collision surface

mod face;
mod mesh;

pub use face::{FaceQuad, INDICES_PER_FACE, VERTICES_PER_FACE};
pub use mesh::*;
