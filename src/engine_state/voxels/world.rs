//! # World Module
//!
//! This module provides the `World` struct, the registry of every chunk that
//! has been requested, built, or is under construction.
//!
//! ## Chunk Lifecycle
//!
//! Each chunk origin moves through three states:
//!
//! ```text
//! Unrequested --begin_build--> Pending --finish_build--> Ready
//!      ^                           |
//!      +-------abandon_build-------+
//! ```
//!
//! Ready chunks never go back to pending. Edits mutate them in place and
//! rebuild their mesh; the streamer only flips their visibility.
//!
//! ## Single-Flight Builds
//!
//! `begin_build` on an origin that is already pending does not start a second
//! build. It records the visibility the caller asked for, which is applied
//! when the running build lands. Callers that need the chunk right away wait
//! for it through the task manager.
//!
//! ## Columns
//!
//! A column is every chunk stacked at one `(x, z)` origin. A column is marked
//! populated once all of its layers are ready.
//!
//! All coordinates here are absolute voxel coordinates; chunk origins are
//! multiples of the chunk dimensions.

use std::collections::{HashMap, HashSet};

use cgmath::{Point2, Point3};

use super::chunk::{Chunk, ChunkDimensions};

/// Where a chunk origin is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkState {
    Unrequested,
    Pending,
    Ready,
}

/// Outcome of asking the registry to start a build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildTicket {
    /// The caller owns the build and must hand the chunk to `finish_build`.
    Started,
    /// Another build is running; the requested visibility was recorded.
    AlreadyPending,
    /// The chunk exists; its visibility was set.
    AlreadyBuilt,
}

/// Registry of chunks keyed by origin.
pub struct World {
    chunk_dimensions: ChunkDimensions,

    /// Number of chunks stacked in every column.
    layers: u32,

    chunks: HashMap<Point3<i32>, Chunk>,

    /// Origins under construction, with the visibility to apply on completion.
    being_built: HashMap<Point3<i32>, bool>,

    /// Columns whose every layer is ready, keyed by `(x, z)` origin.
    columns: HashSet<Point2<i32>>,
}

impl World {
    /// Creates an empty registry.
    ///
    /// # Arguments
    /// * `chunk_dimensions` - Size of every chunk
    /// * `layers` - Number of chunks per column
    pub fn new(chunk_dimensions: ChunkDimensions, layers: u32) -> Self {
        World {
            chunk_dimensions,
            layers,
            chunks: HashMap::new(),
            being_built: HashMap::new(),
            columns: HashSet::new(),
        }
    }

    pub fn chunk_dimensions(&self) -> ChunkDimensions {
        self.chunk_dimensions
    }

    pub fn layers(&self) -> u32 {
        self.layers
    }

    /// The lifecycle state of `origin`.
    pub fn chunk_state(&self, origin: Point3<i32>) -> ChunkState {
        if self.chunks.contains_key(&origin) {
            ChunkState::Ready
        } else if self.being_built.contains_key(&origin) {
            ChunkState::Pending
        } else {
            ChunkState::Unrequested
        }
    }

    /// Claims the build of `origin`, or records `visible` against the build
    /// or chunk that already exists.
    pub fn begin_build(&mut self, origin: Point3<i32>, visible: bool) -> BuildTicket {
        if let Some(chunk) = self.chunks.get_mut(&origin) {
            chunk.visible = visible;
            return BuildTicket::AlreadyBuilt;
        }
        if let Some(requested) = self.being_built.get_mut(&origin) {
            *requested = visible;
            return BuildTicket::AlreadyPending;
        }
        self.being_built.insert(origin, visible);
        BuildTicket::Started
    }

    /// Stores a finished chunk and applies the visibility requested for it.
    ///
    /// # Returns
    /// `false` if a chunk already exists at that origin, in which case
    /// `chunk` is discarded and the stored one is kept.
    pub fn finish_build(&mut self, mut chunk: Chunk) -> bool {
        let origin = chunk.location;
        let requested = self.being_built.remove(&origin);

        if self.chunks.contains_key(&origin) {
            log::debug!("discarding duplicate build of {}", chunk.name());
            return false;
        }

        chunk.visible = requested.unwrap_or(chunk.visible);
        self.chunks.insert(origin, chunk);

        let column = Point2::new(origin.x, origin.z);
        if self.column_origins(column).all(|o| self.chunks.contains_key(&o)) {
            self.columns.insert(column);
        }
        true
    }

    /// Releases a pending build that will never land, so the origin can be
    /// requested again.
    ///
    /// # Returns
    /// `true` if `origin` was pending.
    pub fn abandon_build(&mut self, origin: Point3<i32>) -> bool {
        self.being_built.remove(&origin).is_some()
    }

    /// Origins of every layer of `column`, bottom first.
    pub fn column_origins(&self, column: Point2<i32>) -> impl Iterator<Item = Point3<i32>> {
        let height = self.chunk_dimensions.height as i32;
        (0..self.layers as i32).map(move |layer| Point3::new(column.x, layer * height, column.y))
    }

    /// Whether every layer of `column` is ready.
    pub fn is_column_built(&self, column: Point2<i32>) -> bool {
        self.columns.contains(&column)
    }

    /// Sets the visibility of every layer of `column`, including layers that
    /// are still being built.
    ///
    /// # Returns
    /// How many ready chunks changed visibility.
    pub fn set_column_visibility(&mut self, column: Point2<i32>, visible: bool) -> usize {
        let mut changed = 0;
        for origin in self.column_origins(column).collect::<Vec<_>>() {
            if let Some(chunk) = self.chunks.get_mut(&origin) {
                if chunk.visible != visible {
                    chunk.visible = visible;
                    changed += 1;
                }
            } else if let Some(requested) = self.being_built.get_mut(&origin) {
                *requested = visible;
            }
        }
        changed
    }

    /// Hides a column without discarding its chunks.
    pub fn hide_column(&mut self, column: Point2<i32>) -> usize {
        self.set_column_visibility(column, false)
    }

    /// Populated columns with at least one visible chunk.
    pub fn visible_columns(&self) -> Vec<Point2<i32>> {
        self.columns
            .iter()
            .copied()
            .filter(|column| {
                self.column_origins(*column)
                    .any(|origin| self.chunks.get(&origin).is_some_and(|c| c.visible))
            })
            .collect()
    }

    /// All populated columns.
    pub fn columns(&self) -> impl Iterator<Item = &Point2<i32>> {
        self.columns.iter()
    }

    pub fn chunk(&self, origin: Point3<i32>) -> Option<&Chunk> {
        self.chunks.get(&origin)
    }

    pub fn chunk_mut(&mut self, origin: Point3<i32>) -> Option<&mut Chunk> {
        self.chunks.get_mut(&origin)
    }

    pub fn chunks(&self) -> impl Iterator<Item = &Chunk> {
        self.chunks.values()
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    pub fn pending_count(&self) -> usize {
        self.being_built.len()
    }

    /// Columns with at least one layer still being built.
    pub fn pending_columns(&self) -> Vec<Point2<i32>> {
        let columns: HashSet<_> = self
            .being_built
            .keys()
            .map(|origin| Point2::new(origin.x, origin.z))
            .collect();
        columns.into_iter().collect()
    }

    /// Origin of the chunk slot that contains an absolute voxel coordinate,
    /// whether or not a chunk has been built there.
    pub fn chunk_origin_containing(&self, position: Point3<i64>) -> Option<Point3<i32>> {
        let dims = self.chunk_dimensions;
        if dims.is_degenerate() {
            return None;
        }
        let snap = |value: i64, size: usize| -> Option<i32> {
            let size = size as i64;
            i32::try_from(value.div_euclid(size) * size).ok()
        };
        Some(Point3::new(
            snap(position.x, dims.width)?,
            snap(position.y, dims.height)?,
            snap(position.z, dims.depth)?,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::voxels::block::block_type::VoxelType;

    const DIMS: ChunkDimensions = ChunkDimensions::new(2, 2, 2);

    fn chunk_at(origin: Point3<i32>) -> Chunk {
        Chunk::from_voxels(origin, DIMS, vec![VoxelType::STONE; DIMS.volume()])
    }

    #[test]
    fn test_single_flight() {
        let mut world = World::new(DIMS, 1);
        let origin = Point3::new(2, 0, 4);

        assert_eq!(world.chunk_state(origin), ChunkState::Unrequested);
        assert_eq!(world.begin_build(origin, true), BuildTicket::Started);
        assert_eq!(world.chunk_state(origin), ChunkState::Pending);
        assert_eq!(world.begin_build(origin, false), BuildTicket::AlreadyPending);
        assert_eq!(world.pending_count(), 1);

        assert!(world.finish_build(chunk_at(origin)));
        assert_eq!(world.chunk_state(origin), ChunkState::Ready);
        assert_eq!(world.pending_count(), 0);
        // the last request wins
        assert!(!world.chunk(origin).unwrap().visible);

        assert!(!world.finish_build(chunk_at(origin)));
        assert_eq!(world.chunk_count(), 1);
        assert_eq!(world.begin_build(origin, true), BuildTicket::AlreadyBuilt);
        assert!(world.chunk(origin).unwrap().visible);
    }

    #[test]
    fn test_abandoned_build_can_be_requested_again() {
        let mut world = World::new(DIMS, 1);
        let origin = Point3::new(0, 0, 2);

        assert!(!world.abandon_build(origin));
        world.begin_build(origin, true);
        assert!(world.abandon_build(origin));
        assert_eq!(world.chunk_state(origin), ChunkState::Unrequested);
        assert_eq!(world.begin_build(origin, true), BuildTicket::Started);
    }

    #[test]
    fn test_column_is_populated_when_all_layers_are_ready() {
        let mut world = World::new(DIMS, 3);
        let column = Point2::new(0, 2);
        let origins: Vec<_> = world.column_origins(column).collect();
        assert_eq!(origins[2], Point3::new(0, 4, 2));

        for origin in &origins {
            world.begin_build(*origin, true);
        }
        world.finish_build(chunk_at(origins[0]));
        world.finish_build(chunk_at(origins[2]));
        assert!(!world.is_column_built(column));

        world.finish_build(chunk_at(origins[1]));
        assert!(world.is_column_built(column));
        assert_eq!(world.visible_columns(), vec![column]);
    }

    #[test]
    fn test_hiding_keeps_chunks() {
        let mut world = World::new(DIMS, 2);
        let column = Point2::new(0, 0);
        for origin in world.column_origins(column).collect::<Vec<_>>() {
            world.begin_build(origin, true);
            world.finish_build(chunk_at(origin));
        }

        assert_eq!(world.hide_column(column), 2);
        assert_eq!(world.hide_column(column), 0);
        assert!(world.visible_columns().is_empty());
        assert_eq!(world.chunk_count(), 2);
        assert!(!world.chunk(Point3::new(0, 2, 0)).unwrap().mesh.is_empty());
    }

    #[test]
    fn test_hiding_pending_column_applies_on_completion() {
        let mut world = World::new(DIMS, 1);
        let origin = Point3::new(0, 0, 0);
        world.begin_build(origin, true);
        world.hide_column(Point2::new(0, 0));
        world.finish_build(chunk_at(origin));
        assert!(!world.chunk(origin).unwrap().visible);
    }

    #[test]
    fn test_chunk_origin_containing() {
        let world = World::new(ChunkDimensions::new(10, 10, 10), 3);
        assert_eq!(
            world.chunk_origin_containing(Point3::new(15, 0, -1)),
            Some(Point3::new(10, 0, -10))
        );
        assert_eq!(
            world.chunk_origin_containing(Point3::new(-10, 29, 9)),
            Some(Point3::new(-10, 20, 0))
        );
    }
}
