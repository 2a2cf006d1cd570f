//! Per-voxel face culling.
//!
//! Every meshable voxel is processed independently: it reads its six
//! neighbours from the shared voxel array, records which faces are hidden in a
//! small bit mask, and stages a quad for each face that is not.
//!
//! A face is hidden only when its neighbour lies inside the chunk and occludes.
//! Neighbours across the chunk boundary are never consulted, so boundary faces
//! are always emitted.

use bitvec::prelude::*;
use cgmath::Point3;
use rayon::prelude::*;

use crate::engine_state::voxels::{
    block::{block_side::BlockSide, block_type::VoxelType, InteractionClass},
    chunk::ChunkDimensions,
};

use super::{mesh::FaceQuad, staging::GeometryStaging};

/// One bit per face, indexed by `BlockSide as usize`.
pub type FaceMask = BitArr!(for 6, in u8, Lsb0);

/// Computes which faces of the voxel at `local` are hidden by neighbours.
pub fn hidden_faces(
    voxels: &[VoxelType],
    dimensions: ChunkDimensions,
    local: Point3<usize>,
) -> FaceMask {
    face_mask(dimensions, local, |index| {
        voxels.get(index).map(|voxel| voxel.interaction())
    })
}

/// Builds the hidden-face mask from the interaction class of each in-chunk
/// neighbour, looked up by flat index.
pub fn face_mask(
    dimensions: ChunkDimensions,
    local: Point3<usize>,
    class_at: impl Fn(usize) -> Option<InteractionClass>,
) -> FaceMask {
    let mut mask: FaceMask = bitarr![u8, Lsb0; 0; 6];
    let Some(origin) = local.cast::<i64>() else {
        return mask;
    };

    for side in BlockSide::all() {
        let neighbour = origin + side.neighbour_offset();
        let hidden = dimensions
            .checked_index(neighbour)
            .and_then(&class_at)
            .is_some_and(InteractionClass::occludes);
        mask.set(side as usize, hidden);
    }

    mask
}

/// Whether all six faces are hidden.
#[inline]
pub fn fully_hidden(mask: &FaceMask) -> bool {
    mask[..6].all()
}

/// Stages the visible faces of every voxel in a chunk.
///
/// # Arguments
/// * `voxels` - The chunk's voxel array; read-only for the whole pass
/// * `dimensions` - Chunk dimensions; `voxels.len()` must equal the volume
/// * `location` - Absolute chunk origin, added to every emitted position
/// * `staging` - Receives faces keyed by local voxel coordinate
///
/// # Returns
/// The number of faces staged.
pub fn stage_visible_faces(
    voxels: &[VoxelType],
    dimensions: ChunkDimensions,
    location: Point3<i32>,
    staging: &GeometryStaging,
) -> usize {
    if dimensions.is_degenerate() || voxels.len() != dimensions.volume() {
        return 0;
    }

    let origin = [location.x as f32, location.y as f32, location.z as f32];

    voxels
        .par_iter()
        .enumerate()
        .map(|(index, voxel)| {
            if !voxel.is_meshable() {
                return 0;
            }

            let local = dimensions.coordinate_of(index);
            let mask = hidden_faces(voxels, dimensions, local);
            if fully_hidden(&mask) {
                return 0;
            }

            let centre = [
                origin[0] + local.x as f32,
                origin[1] + local.y as f32,
                origin[2] + local.z as f32,
            ];
            let materials = voxel.face_materials();

            let mut face_counter = 0u32;
            for side in BlockSide::all() {
                if mask[side as usize] {
                    continue;
                }
                let Some(uv) = materials[side as usize].uv_rect() else {
                    continue;
                };
                staging.push_face(local, &FaceQuad::new(side, centre, uv, face_counter));
                face_counter += 1;
            }
            face_counter as usize
        })
        .sum()
}
