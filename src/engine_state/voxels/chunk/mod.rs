//! # Chunk Module
//!
//! This module provides the `Chunk` struct: a fixed-size box of voxel cells
//! that is generated, meshed and streamed as one unit.
//!
//! ## Storage
//!
//! Voxels are kept in one flat array of `width * height * depth` entries,
//! indexed `x + width * (y + height * z)` (see [`chunk_iteration`]). The array
//! is fully populated by the density field before any meshing reads it, and
//! edits mutate it in place.
//!
//! ## Geometry
//!
//! Each chunk keeps two products of the meshing pipeline:
//! - `fragments`: one small mesh per voxel that has at least one visible face
//! - `mesh`: all fragments concatenated into a single draw-ready buffer
//!
//! Both are replaced wholesale by [`Chunk::rebuild_mesh`].

use cgmath::Point3;
use serde::{Deserialize, Serialize};

use crate::engine_state::rendering::meshing::{self, ChunkMesh, MeshFragment};

use super::block::block_type::VoxelType;

mod chunk_creation;
pub mod chunk_iteration;

pub use chunk_creation::{ChunkBuilder, DensityField};

/// Width, height and depth of a chunk in voxels.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChunkDimensions {
    pub width: usize,
    pub height: usize,
    pub depth: usize,
}

impl ChunkDimensions {
    pub const fn new(width: usize, height: usize, depth: usize) -> Self {
        ChunkDimensions {
            width,
            height,
            depth,
        }
    }

    /// Number of cells in a chunk of these dimensions.
    #[inline]
    pub fn volume(&self) -> usize {
        self.width * self.height * self.depth
    }

    /// Whether any axis is zero. Degenerate chunks hold no voxels and no mesh.
    #[inline]
    pub fn is_degenerate(&self) -> bool {
        self.volume() == 0
    }
}

impl Default for ChunkDimensions {
    fn default() -> Self {
        ChunkDimensions::new(10, 10, 10)
    }
}

/// A box of voxels together with the geometry built from it.
///
/// Chunks are owned by the world registry once built. The streamer only
/// toggles `visible`; edits go through [`Chunk::set_voxel`] followed by
/// [`Chunk::rebuild_mesh`].
#[derive(Debug)]
pub struct Chunk {
    /// Absolute voxel coordinate of the chunk's (0, 0, 0) cell. Always a
    /// multiple of the chunk dimensions.
    pub location: Point3<i32>,

    pub dimensions: ChunkDimensions,

    voxels: Vec<VoxelType>,

    /// One fragment per voxel with visible faces, in storage order.
    pub fragments: Vec<MeshFragment>,

    /// The merged buffer of all fragments.
    pub mesh: ChunkMesh,

    /// Whether the renderer should draw this chunk.
    pub visible: bool,
}

impl Chunk {
    /// Wraps a fully populated voxel array and meshes it.
    ///
    /// # Arguments
    /// * `location` - Absolute origin of the chunk
    /// * `dimensions` - Size of the chunk; must match `voxels.len()`
    /// * `voxels` - Voxel types in storage order
    ///
    /// # Returns
    /// A hidden chunk with its fragments and merged mesh built. If `voxels`
    /// does not hold exactly `dimensions.volume()` entries it is padded with
    /// or truncated to AIR cells so the array is always complete.
    pub fn from_voxels(
        location: Point3<i32>,
        dimensions: ChunkDimensions,
        mut voxels: Vec<VoxelType>,
    ) -> Self {
        if voxels.len() != dimensions.volume() {
            log::warn!(
                "voxel array of {} entries does not match chunk volume {}",
                voxels.len(),
                dimensions.volume()
            );
            voxels.resize(dimensions.volume(), VoxelType::AIR);
        }

        let mut chunk = Chunk {
            location,
            dimensions,
            voxels,
            fragments: Vec::new(),
            mesh: ChunkMesh::default(),
            visible: false,
        };
        chunk.rebuild_mesh();
        chunk
    }

    /// Identifier used in logs, e.g. `chunk_x10_y0_z-20`.
    pub fn name(&self) -> String {
        chunk_name(self.location)
    }

    /// The full voxel array in storage order.
    pub fn voxels(&self) -> &[VoxelType] {
        &self.voxels
    }

    /// The voxel at a local coordinate, or `None` outside the chunk.
    pub fn voxel_at(&self, local: Point3<i64>) -> Option<VoxelType> {
        self.dimensions
            .checked_index(local)
            .map(|index| self.voxels[index])
    }

    /// Overwrites the voxel at a local coordinate.
    ///
    /// Does not touch the mesh; call [`Chunk::rebuild_mesh`] afterwards.
    ///
    /// # Returns
    /// The previous voxel type, or `None` if `local` is outside the chunk.
    pub fn set_voxel(&mut self, local: Point3<i64>, voxel_type: VoxelType) -> Option<VoxelType> {
        let index = self.dimensions.checked_index(local)?;
        Some(std::mem::replace(&mut self.voxels[index], voxel_type))
    }

    /// Re-runs meshing and assembly over the current voxel array, replacing
    /// the fragments and merged mesh.
    pub fn rebuild_mesh(&mut self) {
        let (fragments, mesh) =
            meshing::build_chunk_mesh(&self.voxels, self.dimensions, self.location);
        self.fragments = fragments;
        self.mesh = mesh;
    }

    /// Number of cells that produce geometry.
    pub fn meshable_count(&self) -> usize {
        self.voxels.iter().filter(|v| v.is_meshable()).count()
    }
}

/// Log name of the chunk at `location`.
pub fn chunk_name(location: Point3<i32>) -> String {
    format!("chunk_x{}_y{}_z{}", location.x, location.y, location.z)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid(dimensions: ChunkDimensions) -> Chunk {
        Chunk::from_voxels(
            Point3::new(0, 0, 0),
            dimensions,
            vec![VoxelType::STONE; dimensions.volume()],
        )
    }

    #[test]
    fn test_chunk_name() {
        let chunk = Chunk::from_voxels(
            Point3::new(10, 0, -20),
            ChunkDimensions::new(1, 1, 1),
            vec![VoxelType::AIR],
        );
        assert_eq!(chunk.name(), "chunk_x10_y0_z-20");
        assert!(!chunk.visible);
    }

    #[test]
    fn test_voxel_access() {
        let mut chunk = solid(ChunkDimensions::new(2, 3, 4));
        let local = Point3::new(1, 2, 3);

        assert_eq!(chunk.voxel_at(local), Some(VoxelType::STONE));
        assert_eq!(chunk.set_voxel(local, VoxelType::AIR), Some(VoxelType::STONE));
        assert_eq!(chunk.voxel_at(local), Some(VoxelType::AIR));
        assert_eq!(chunk.voxel_at(Point3::new(2, 0, 0)), None);
        assert_eq!(chunk.set_voxel(Point3::new(0, -1, 0), VoxelType::DIRT), None);
        assert_eq!(chunk.meshable_count(), 23);
    }

    #[test]
    fn test_short_voxel_array_is_padded() {
        let chunk = Chunk::from_voxels(
            Point3::new(0, 0, 0),
            ChunkDimensions::new(2, 2, 2),
            vec![VoxelType::DIRT],
        );
        assert_eq!(chunk.voxels().len(), 8);
        assert_eq!(chunk.meshable_count(), 1);
        assert_eq!(chunk.fragments.len(), 1);
    }

    #[test]
    fn test_edit_then_rebuild_changes_mesh() {
        let mut chunk = solid(ChunkDimensions::new(3, 3, 3));
        let before = chunk.mesh.vertex_count();

        chunk.set_voxel(Point3::new(1, 1, 1), VoxelType::AIR);
        chunk.rebuild_mesh();
        // the hollow centre exposes no new faces to the outside, but its six
        // neighbours now each show one face inward
        assert_eq!(chunk.mesh.vertex_count(), before + 6 * 4);
    }
}
