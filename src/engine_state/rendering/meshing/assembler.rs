//! Mesh assembly: staged geometry → per-voxel fragments → one merged mesh.
//!
//! Fragment collection walks the chunk in storage order and drains the
//! staging store one key at a time, so it runs on the calling thread. The
//! merge then writes every fragment into its own disjoint range of the
//! destination buffers, which lets the copy run in parallel.

use rayon::prelude::*;

use crate::engine_state::voxels::chunk::ChunkDimensions;

use super::{
    mesh::{ChunkMesh, MeshBuffers, MeshFragment},
    staging::GeometryStaging,
};

/// Drains `staging` into one fragment per voxel with geometry.
///
/// Fragments come out in storage order. The store is cleared afterwards,
/// including any entries keyed outside `dimensions`.
pub fn collect_fragments(
    staging: &GeometryStaging,
    dimensions: ChunkDimensions,
) -> Vec<MeshFragment> {
    let mut fragments = Vec::with_capacity(staging.len());

    for voxel in dimensions.coordinates() {
        let Some(buffers) = staging.take(&voxel) else {
            continue;
        };
        if buffers.is_empty() {
            continue;
        }
        fragments.push(MeshFragment { voxel, buffers });
    }

    staging.clear();
    fragments
}

/// Where each fragment starts in the merged buffers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FragmentOffset {
    pub vertex: usize,
    pub index: usize,
}

/// Prefix sums of fragment sizes, plus the total vertex and index counts.
pub fn fragment_offsets(fragments: &[MeshFragment]) -> (Vec<FragmentOffset>, usize, usize) {
    let mut offsets = Vec::with_capacity(fragments.len());
    let mut vertex = 0;
    let mut index = 0;

    for fragment in fragments {
        offsets.push(FragmentOffset { vertex, index });
        vertex += fragment.vertex_count();
        index += fragment.index_count();
    }

    (offsets, vertex, index)
}

/// Splits `buffer` into consecutive mutable slices of the given lengths.
fn split_by_lengths<T>(
    mut buffer: &mut [T],
    lengths: impl Iterator<Item = usize>,
) -> Vec<&mut [T]> {
    let mut slices = Vec::new();
    for length in lengths {
        let (head, tail) = std::mem::take(&mut buffer).split_at_mut(length);
        slices.push(head);
        buffer = tail;
    }
    slices
}

/// One fragment's destination ranges in the merged buffers.
struct MergeTarget<'a> {
    positions: &'a mut [[f32; 3]],
    normals: &'a mut [[f32; 3]],
    uvs: &'a mut [[f32; 2]],
    indices: &'a mut [u32],
}

/// Concatenates fragments into one mesh.
///
/// Attributes are copied verbatim; every index is shifted by the vertex
/// offset of its fragment so it stays valid in the merged buffer. Bounds and
/// the collision surface are computed from the result.
pub fn merge_fragments(fragments: &[MeshFragment]) -> ChunkMesh {
    let (offsets, vertex_count, index_count) = fragment_offsets(fragments);
    let mut merged = MeshBuffers::zeroed(vertex_count, index_count);

    {
        let vertex_lengths = || fragments.iter().map(MeshFragment::vertex_count);
        let positions = split_by_lengths(&mut merged.positions, vertex_lengths());
        let normals = split_by_lengths(&mut merged.normals, vertex_lengths());
        let uvs = split_by_lengths(&mut merged.uvs, vertex_lengths());
        let indices = split_by_lengths(
            &mut merged.indices,
            fragments.iter().map(MeshFragment::index_count),
        );

        let targets: Vec<MergeTarget> = positions
            .into_iter()
            .zip(normals)
            .zip(uvs)
            .zip(indices)
            .map(|(((positions, normals), uvs), indices)| MergeTarget {
                positions,
                normals,
                uvs,
                indices,
            })
            .collect();

        targets
            .into_par_iter()
            .zip(fragments.par_iter())
            .zip(offsets.par_iter())
            .for_each(|((target, fragment), offset)| {
                let source = &fragment.buffers;
                target.positions.copy_from_slice(&source.positions);
                target.normals.copy_from_slice(&source.normals);
                target.uvs.copy_from_slice(&source.uvs);

                let shift = offset.vertex as u32;
                for (dst, src) in target.indices.iter_mut().zip(&source.indices) {
                    *dst = src + shift;
                }
            });
    }

    ChunkMesh::from_buffers(merged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::{
        rendering::meshing::mesher::stage_visible_faces,
        voxels::block::block_type::VoxelType,
    };
    use cgmath::Point3;

    fn staged(voxels: &[VoxelType], dims: ChunkDimensions) -> GeometryStaging {
        let staging = GeometryStaging::new();
        stage_visible_faces(voxels, dims, Point3::new(0, 0, 0), &staging);
        staging
    }

    #[test]
    fn test_single_voxel_chunk() {
        let dims = ChunkDimensions::new(2, 2, 2);
        let mut voxels = vec![VoxelType::AIR; 8];
        voxels[dims.index_of(Point3::new(1, 0, 1))] = VoxelType::GRASS;
        let staging = staged(&voxels, dims);

        let fragments = collect_fragments(&staging, dims);
        assert!(staging.is_empty());
        assert_eq!(fragments.len(), 1);
        assert_eq!(fragments[0].voxel, Point3::new(1, 0, 1));

        let mesh = merge_fragments(&fragments);
        assert_eq!(mesh.vertex_count(), 24);
        assert_eq!(mesh.index_count(), 36);
        let bounds = mesh.bounds.unwrap();
        assert_eq!(bounds.min, [0.5, -0.5, 0.5]);
        assert_eq!(bounds.max, [1.5, 0.5, 1.5]);
    }

    #[test]
    fn test_merge_invariants() {
        let dims = ChunkDimensions::new(4, 3, 5);
        let voxels: Vec<VoxelType> = (0..dims.volume())
            .map(|i| if i % 3 == 0 { VoxelType::AIR } else { VoxelType::STONE })
            .collect();
        let fragments = collect_fragments(&staged(&voxels, dims), dims);
        let mesh = merge_fragments(&fragments);

        let vertex_sum: usize = fragments.iter().map(MeshFragment::vertex_count).sum();
        let index_sum: usize = fragments.iter().map(MeshFragment::index_count).sum();
        assert_eq!(mesh.vertex_count(), vertex_sum);
        assert_eq!(mesh.index_count(), index_sum);
        assert!(mesh
            .buffers
            .indices
            .iter()
            .all(|i| (*i as usize) < mesh.vertex_count()));
        assert!(fragments.len() <= voxels.iter().filter(|v| v.is_meshable()).count());
    }

    #[test]
    fn test_indices_are_shifted_per_fragment() {
        let dims = ChunkDimensions::new(3, 1, 1);
        let voxels = vec![VoxelType::DIRT, VoxelType::AIR, VoxelType::DIRT];
        let fragments = collect_fragments(&staged(&voxels, dims), dims);
        let (offsets, vertices, indices) = fragment_offsets(&fragments);

        assert_eq!(offsets[1], FragmentOffset { vertex: 24, index: 36 });
        assert_eq!((vertices, indices), (48, 72));

        let mesh = merge_fragments(&fragments);
        assert_eq!(&mesh.buffers.indices[36..42], &[27, 25, 24, 27, 26, 25]);
        assert_eq!(mesh.buffers.positions[24], fragments[1].buffers.positions[0]);
    }

    #[test]
    fn test_empty_chunk_gives_empty_mesh() {
        let dims = ChunkDimensions::new(3, 3, 3);
        let fragments = collect_fragments(&staged(&vec![VoxelType::AIR; 27], dims), dims);
        assert!(fragments.is_empty());

        let mesh = merge_fragments(&fragments);
        assert!(mesh.is_empty());
        assert!(mesh.bounds.is_none());
    }

    #[test]
    fn test_rebuild_is_idempotent() {
        let dims = ChunkDimensions::new(5, 5, 5);
        let voxels: Vec<VoxelType> = (0..dims.volume())
            .map(|i| if i % 7 < 3 { VoxelType::AIR } else { VoxelType::GOLD })
            .collect();

        let first = merge_fragments(&collect_fragments(&staged(&voxels, dims), dims));
        let second = merge_fragments(&collect_fragments(&staged(&voxels, dims), dims));
        assert_eq!(first.vertex_count(), second.vertex_count());
        assert_eq!(first.index_count(), second.index_count());
        assert_eq!(first, second);
    }
}
