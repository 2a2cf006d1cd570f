//! Mesh generation for voxel chunks.
//!
//! Turning a voxel array into a draw-ready mesh takes three passes, each
//! finishing before the next starts:
//! 1. [`mesher`]: a parallel pass over every voxel that stages the visible
//!    faces of each one into a [`GeometryStaging`] store keyed by local
//!    coordinate
//! 2. [`assembler::collect_fragments`]: drains the store into one
//!    [`MeshFragment`] per voxel with geometry, then clears it
//! 3. [`assembler::merge_fragments`]: concatenates the fragments into a single
//!    [`ChunkMesh`], shifting indices by each fragment's vertex offset
//!
//! # Culling
//! Only faces toward an in-bounds solid neighbour are culled. Faces on the
//! chunk boundary are always kept, so adjacent chunks both emit the shared
//! seam.

use cgmath::Point3;

use crate::engine_state::voxels::{block::block_type::VoxelType, chunk::ChunkDimensions};

pub mod assembler;
pub mod mesh;
pub mod mesher;
mod staging;

pub use mesh::{Aabb, ChunkMesh, CollisionSurface, FaceQuad, MeshBuffers, MeshFragment};
pub use staging::GeometryStaging;

/// Runs the full meshing pipeline over one chunk's voxels.
///
/// # Arguments
/// * `voxels` - The chunk's voxel array in storage order
/// * `dimensions` - Chunk dimensions
/// * `location` - Absolute chunk origin
///
/// # Returns
/// The per-voxel fragments and the merged chunk mesh. Both are empty for a
/// chunk without visible faces or with degenerate dimensions.
pub fn build_chunk_mesh(
    voxels: &[VoxelType],
    dimensions: ChunkDimensions,
    location: Point3<i32>,
) -> (Vec<MeshFragment>, ChunkMesh) {
    let staging = GeometryStaging::new();
    build_chunk_mesh_with(&staging, voxels, dimensions, location)
}

/// Like [`build_chunk_mesh`], reusing an existing staging store.
///
/// The store is left empty on return.
pub fn build_chunk_mesh_with(
    staging: &GeometryStaging,
    voxels: &[VoxelType],
    dimensions: ChunkDimensions,
    location: Point3<i32>,
) -> (Vec<MeshFragment>, ChunkMesh) {
    let faces = mesher::stage_visible_faces(voxels, dimensions, location, staging);
    let fragments = assembler::collect_fragments(staging, dimensions);
    let mesh = assembler::merge_fragments(&fragments);

    log::trace!(
        "meshed {} faces into {} fragments ({} vertices, {} indices)",
        faces,
        fragments.len(),
        mesh.vertex_count(),
        mesh.index_count()
    );

    (fragments, mesh)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filled_cube_counts() {
        let dims = ChunkDimensions::new(2, 2, 2);
        let (fragments, mesh) =
            build_chunk_mesh(&[VoxelType::OBSIDIAN; 8], dims, Point3::new(0, 0, 0));

        // every voxel of a 2x2x2 block is a corner with three exposed faces
        assert_eq!(fragments.len(), 8);
        assert!(fragments.iter().all(|f| f.vertex_count() == 12 && f.index_count() == 18));
        assert_eq!(mesh.vertex_count(), 96);
        assert_eq!(mesh.index_count(), 144);
        assert_eq!(mesh.collision.triangle_count(), 48);
    }

    #[test]
    fn test_staging_is_reusable() {
        let staging = GeometryStaging::new();
        let dims = ChunkDimensions::new(1, 1, 1);

        let (_, first) =
            build_chunk_mesh_with(&staging, &[VoxelType::STONE], dims, Point3::new(0, 0, 0));
        assert!(staging.is_empty());
        let (_, second) =
            build_chunk_mesh_with(&staging, &[VoxelType::STONE], dims, Point3::new(0, 0, 0));

        assert_eq!(first.vertex_count(), 24);
        assert_eq!(first, second);
    }
}
