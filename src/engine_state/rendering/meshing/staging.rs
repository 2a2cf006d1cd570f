//! Concurrent per-voxel geometry staging.
//!
//! The mesher runs one work item per voxel and every item appends faces under
//! its own local coordinate. The assembler then drains the store key by key
//! and clears it, so a store can be reused for the next build.

use cgmath::Point3;
use dashmap::DashMap;

use super::mesh::{FaceQuad, MeshBuffers};

/// A sharded multimap from local voxel coordinate to staged face geometry.
#[derive(Debug, Default)]
pub struct GeometryStaging {
    entries: DashMap<Point3<usize>, MeshBuffers>,
}

impl GeometryStaging {
    pub fn new() -> Self {
        GeometryStaging {
            entries: DashMap::new(),
        }
    }

    /// Appends a face under `voxel`.
    pub fn push_face(&self, voxel: Point3<usize>, quad: &FaceQuad) {
        self.entries.entry(voxel).or_default().append_face(quad);
    }

    /// Removes and returns everything staged under `voxel`.
    pub fn take(&self, voxel: &Point3<usize>) -> Option<MeshBuffers> {
        self.entries.remove(voxel).map(|(_, buffers)| buffers)
    }

    /// Drops every staged entry.
    pub fn clear(&self) {
        self.entries.clear();
    }

    /// Number of voxels with staged geometry.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
