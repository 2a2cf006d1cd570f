//! Mesh data structures produced by the meshing pipeline.
//!
//! Geometry is kept as parallel attribute arrays (positions, normals, UVs)
//! plus a triangle index list. [`ChunkMesh::interleaved`] packs them into
//! GPU-ready [`Vertex`] records when a renderer needs a single buffer.

use cgmath::Point3;

use crate::engine_state::rendering::Vertex;

use super::face::FaceQuad;

/// Parallel vertex attribute arrays and a triangle index list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshBuffers {
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub uvs: Vec<[f32; 2]>,
    pub indices: Vec<u32>,
}

impl MeshBuffers {
    /// Creates zero-filled buffers of the given sizes, ready to be written
    /// through disjoint slices.
    pub fn zeroed(vertex_count: usize, index_count: usize) -> Self {
        MeshBuffers {
            positions: vec![[0.0; 3]; vertex_count],
            normals: vec![[0.0; 3]; vertex_count],
            uvs: vec![[0.0; 2]; vertex_count],
            indices: vec![0; index_count],
        }
    }

    /// Appends one face. Its indices must already be relative to this buffer.
    pub fn append_face(&mut self, quad: &FaceQuad) {
        self.positions.extend_from_slice(&quad.positions);
        self.normals.extend(std::iter::repeat(quad.normal).take(quad.positions.len()));
        self.uvs.extend_from_slice(&quad.uvs);
        self.indices.extend_from_slice(&quad.indices);
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    #[inline]
    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

/// The geometry of a single voxel, before merging.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshFragment {
    /// Local coordinate of the voxel this fragment was built from.
    pub voxel: Point3<usize>,
    pub buffers: MeshBuffers,
}

impl MeshFragment {
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.buffers.vertex_count()
    }

    #[inline]
    pub fn index_count(&self) -> usize {
        self.buffers.index_count()
    }
}

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: [f32; 3],
    pub max: [f32; 3],
}

impl Aabb {
    /// Tightest box around `points`, or `None` if there are none.
    pub fn from_points(points: &[[f32; 3]]) -> Option<Self> {
        let (first, rest) = points.split_first()?;
        let mut bounds = Aabb {
            min: *first,
            max: *first,
        };
        for point in rest {
            for axis in 0..3 {
                bounds.min[axis] = bounds.min[axis].min(point[axis]);
                bounds.max[axis] = bounds.max[axis].max(point[axis]);
            }
        }
        Some(bounds)
    }

    pub fn centre(&self) -> [f32; 3] {
        [
            (self.min[0] + self.max[0]) * 0.5,
            (self.min[1] + self.max[1]) * 0.5,
            (self.min[2] + self.max[2]) * 0.5,
        ]
    }

    pub fn size(&self) -> [f32; 3] {
        [
            self.max[0] - self.min[0],
            self.max[1] - self.min[1],
            self.max[2] - self.min[2],
        ]
    }
}

/// Triangle soup handed to a physics system.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CollisionSurface {
    pub vertices: Vec<[f32; 3]>,
    pub triangles: Vec<[u32; 3]>,
}

impl CollisionSurface {
    /// Derives a collision surface from merged mesh buffers.
    ///
    /// Trailing indices that do not form a whole triangle are ignored.
    pub fn from_buffers(buffers: &MeshBuffers) -> Self {
        CollisionSurface {
            vertices: buffers.positions.clone(),
            triangles: buffers
                .indices
                .chunks_exact(3)
                .map(|triangle| [triangle[0], triangle[1], triangle[2]])
                .collect(),
        }
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }
}

/// The merged, draw-ready mesh of one chunk.
///
/// An empty mesh (no visible faces) has no bounds and an empty collision
/// surface; this is a valid outcome, not an error.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChunkMesh {
    pub buffers: MeshBuffers,
    pub bounds: Option<Aabb>,
    pub collision: CollisionSurface,
}

impl ChunkMesh {
    /// Wraps merged buffers, computing bounds and the collision surface.
    pub fn from_buffers(buffers: MeshBuffers) -> Self {
        let bounds = Aabb::from_points(&buffers.positions);
        let collision = CollisionSurface::from_buffers(&buffers);
        ChunkMesh {
            buffers,
            bounds,
            collision,
        }
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.buffers.vertex_count()
    }

    #[inline]
    pub fn index_count(&self) -> usize {
        self.buffers.index_count()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.buffers.is_empty()
    }

    /// Packs the attribute arrays into one vertex per entry.
    pub fn interleaved(&self) -> Vec<Vertex> {
        let buffers = &self.buffers;
        buffers
            .positions
            .iter()
            .zip(&buffers.normals)
            .zip(&buffers.uvs)
            .map(|((position, normal), uv)| Vertex::new(*position, *normal, *uv))
            .collect()
    }

    /// Interleaved vertex data as raw bytes, for upload.
    pub fn vertex_bytes(&self) -> Vec<u8> {
        bytemuck::cast_slice(&self.interleaved()).to_vec()
    }

    /// The index buffer as raw bytes, for upload.
    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.buffers.indices)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::voxels::block::{block_side::BlockSide, face_material::FaceMaterial};

    fn one_face() -> MeshBuffers {
        let uv = FaceMaterial::SAND.uv_rect().unwrap();
        let mut buffers = MeshBuffers::default();
        buffers.append_face(&FaceQuad::new(BlockSide::FORWARD, [0.0, 0.0, 0.0], uv, 0));
        buffers
    }

    #[test]
    fn test_aabb_from_points() {
        assert!(Aabb::from_points(&[]).is_none());

        let bounds = Aabb::from_points(&[[1.0, -2.0, 3.0], [-1.0, 4.0, 0.0]]).unwrap();
        assert_eq!(bounds.min, [-1.0, -2.0, 0.0]);
        assert_eq!(bounds.max, [1.0, 4.0, 3.0]);
        assert_eq!(bounds.centre(), [0.0, 1.0, 1.5]);
        assert_eq!(bounds.size(), [2.0, 6.0, 3.0]);
    }

    #[test]
    fn test_chunk_mesh_byte_views() {
        let mesh = ChunkMesh::from_buffers(one_face());

        assert_eq!(mesh.collision.triangle_count(), 2);
        assert_eq!(mesh.index_bytes().len(), 6 * std::mem::size_of::<u32>());
        assert_eq!(mesh.vertex_bytes().len(), 4 * std::mem::size_of::<Vertex>());
        assert_eq!(mesh.interleaved()[0].normal, [0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_empty_chunk_mesh() {
        let mesh = ChunkMesh::from_buffers(MeshBuffers::default());
        assert!(mesh.is_empty());
        assert!(mesh.bounds.is_none());
        assert!(mesh.collision.is_empty());
        assert!(mesh.index_bytes().is_empty());
    }
}
