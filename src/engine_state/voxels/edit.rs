//! # Edit Module
//!
//! Block removal and placement from a ray hit.
//!
//! A hit point lies on the face of the voxel that was struck. Stepping half a
//! voxel against the face normal lands inside that voxel (the removal target);
//! stepping half a voxel along it lands in the empty cell in front of the face
//! (the placement target). The hit chunk is the one holding the struck voxel.
//! When the target falls outside the hit chunk, it is resolved into the
//! neighbouring chunk one chunk-size step along each offending axis.
//!
//! Only the chunk that receives the change is rebuilt.

use cgmath::{Point3, Vector3};
use thiserror::Error;

use super::{block::block_type::VoxelType, world::World};

/// What an edit does to its target cell.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum EditAction {
    /// Clear the struck voxel.
    Remove,
    /// Put a voxel of this type in front of the struck face.
    Place(VoxelType),
}

/// A ray hit against the world together with the edit to perform.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct EditRequest {
    /// World-space point where the ray met a voxel face.
    pub hit_point: Point3<f32>,
    /// Outward unit normal of the face that was hit.
    pub hit_normal: Vector3<f32>,
    pub action: EditAction,
}

impl EditRequest {
    pub fn remove(hit_point: Point3<f32>, hit_normal: Vector3<f32>) -> Self {
        EditRequest {
            hit_point,
            hit_normal,
            action: EditAction::Remove,
        }
    }

    pub fn place(hit_point: Point3<f32>, hit_normal: Vector3<f32>, voxel_type: VoxelType) -> Self {
        EditRequest {
            hit_point,
            hit_normal,
            action: EditAction::Place(voxel_type),
        }
    }
}

/// Why an edit could not be applied.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EditError {
    /// The hit chunk, or the neighbour the target resolved to, is not built.
    #[error("no chunk is loaded at {0:?}")]
    UnknownChunk(Point3<i32>),

    /// The target cell is still outside the chunk it resolved to.
    #[error("cell {local:?} is outside chunk {chunk:?}")]
    OutOfBounds {
        chunk: Point3<i32>,
        local: Point3<i64>,
    },
}

/// The cell an edit writes to.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct EditTarget {
    /// Origin of the chunk that owns the cell.
    pub chunk: Point3<i32>,
    /// Cell coordinate within that chunk.
    pub local: Point3<i64>,
}

/// The result of a successful edit.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct EditOutcome {
    pub target: EditTarget,
    pub previous: VoxelType,
    pub current: VoxelType,
}

fn round_to_cell(point: Point3<f32>) -> Point3<i64> {
    Point3::new(
        point.x.round() as i64,
        point.y.round() as i64,
        point.z.round() as i64,
    )
}

/// Works out which cell of which chunk `request` affects.
///
/// # Errors
/// - `UnknownChunk` if the struck chunk or the resolved neighbour is not ready
/// - `OutOfBounds` if the target cannot be placed inside the resolved chunk
pub fn resolve(world: &World, request: &EditRequest) -> Result<EditTarget, EditError> {
    let half_normal = request.hit_normal * 0.5;
    let struck = round_to_cell(request.hit_point - half_normal);
    let target = match request.action {
        EditAction::Remove => struck,
        EditAction::Place(_) => round_to_cell(request.hit_point + half_normal),
    };

    let hit_chunk = world
        .chunk_origin_containing(struck)
        .ok_or(EditError::OutOfBounds {
            chunk: Point3::new(0, 0, 0),
            local: struck,
        })?;
    if world.chunk(hit_chunk).is_none() {
        return Err(EditError::UnknownChunk(hit_chunk));
    }

    let dims = world.chunk_dimensions();
    let mut chunk = hit_chunk;
    let mut local = Point3::new(
        target.x - hit_chunk.x as i64,
        target.y - hit_chunk.y as i64,
        target.z - hit_chunk.z as i64,
    );

    let step = |chunk_axis: &mut i32, local_axis: &mut i64, size: usize| {
        let size = size as i64;
        if *local_axis < 0 {
            *chunk_axis -= size as i32;
            *local_axis += size;
        } else if *local_axis >= size {
            *chunk_axis += size as i32;
            *local_axis -= size;
        }
    };
    step(&mut chunk.x, &mut local.x, dims.width);
    step(&mut chunk.y, &mut local.y, dims.height);
    step(&mut chunk.z, &mut local.z, dims.depth);

    if world.chunk(chunk).is_none() {
        return Err(EditError::UnknownChunk(chunk));
    }
    if !dims.contains(local) {
        return Err(EditError::OutOfBounds { chunk, local });
    }

    Ok(EditTarget { chunk, local })
}

/// Resolves and applies `request`, rebuilding only the chunk that changed.
pub fn apply(world: &mut World, request: &EditRequest) -> Result<EditOutcome, EditError> {
    let target = resolve(world, request)?;
    let current = match request.action {
        EditAction::Remove => VoxelType::AIR,
        EditAction::Place(voxel_type) => voxel_type,
    };

    let chunk = world
        .chunk_mut(target.chunk)
        .ok_or(EditError::UnknownChunk(target.chunk))?;
    let previous = chunk
        .set_voxel(target.local, current)
        .ok_or(EditError::OutOfBounds {
            chunk: target.chunk,
            local: target.local,
        })?;
    chunk.rebuild_mesh();

    log::debug!(
        "{:?} at {:?} in {}: {:?} -> {:?}",
        request.action,
        target.local,
        chunk.name(),
        previous,
        current
    );

    Ok(EditOutcome {
        target,
        previous,
        current,
    })
}
