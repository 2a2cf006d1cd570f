//! # Chunk Build Task
//!
//! This module defines the `ChunkBuildTask` which runs the whole chunk
//! pipeline (generation, meshing, assembly) on a worker thread. The finished
//! chunk travels back in a `ChunkBuildResult` and is only stored in the world
//! when that result is handled on the owning thread.
//!
//! A build that panics still produces a result. It carries the origin back
//! so the pending build can be released and requested again.

use std::panic::{self, AssertUnwindSafe};
use std::time::Duration;

use cgmath::Point3;
use web_time::Instant;

use crate::engine_state::{
    task_management::task::{Task, TaskResult},
    voxels::{
        chunk::{Chunk, ChunkBuilder},
        world::World,
    },
};

/// Builds one chunk in the background.
pub struct ChunkBuildTask {
    builder: ChunkBuilder,
    /// Absolute origin of the chunk to build
    origin: Point3<i32>,
    /// Seed for the chunk's per-cell random streams
    build_seed: u64,
}

impl ChunkBuildTask {
    /// Creates a new chunk build task.
    ///
    /// # Arguments
    /// * `builder` - The generator and dimensions to build with
    /// * `origin` - Absolute origin of the chunk
    /// * `build_seed` - Seed for the per-cell random streams
    pub fn new(builder: ChunkBuilder, origin: Point3<i32>, build_seed: u64) -> Self {
        ChunkBuildTask {
            builder,
            origin,
            build_seed,
        }
    }
}

impl Task for ChunkBuildTask {
    fn process(&self) -> Box<dyn TaskResult + Send> {
        Box::new(ChunkBuildResult::catch(self.origin, || {
            self.builder.build_seeded(self.origin, self.build_seed)
        }))
    }
}

/// A chunk built on a worker, waiting to be stored.
pub struct ChunkBuildResult {
    origin: Point3<i32>,
    /// `None` if the build panicked
    chunk: Option<Chunk>,
    elapsed: Duration,
}

impl ChunkBuildResult {
    /// Runs `build`, turning a panic into an abandoned result for `origin`.
    pub fn catch(origin: Point3<i32>, build: impl FnOnce() -> Chunk) -> Self {
        let start = Instant::now();
        let chunk = panic::catch_unwind(AssertUnwindSafe(build)).ok();
        if chunk.is_none() {
            log::error!("Build of chunk at {:?} panicked", origin);
        }

        ChunkBuildResult {
            origin,
            chunk,
            elapsed: start.elapsed(),
        }
    }
}

impl TaskResult for ChunkBuildResult {
    /// Moves the chunk into the registry, completing its pending build, or
    /// releases the build if it failed.
    fn handle_result(self: Box<Self>, world: &mut World) -> Vec<Box<dyn Task + Send>> {
        let ChunkBuildResult {
            origin,
            chunk,
            elapsed,
        } = *self;
        let Some(chunk) = chunk else {
            if world.abandon_build(origin) {
                log::warn!("Released failed build of {:?} for a retry", origin);
            }
            return Vec::new();
        };

        let name = chunk.name();
        let voxels = chunk.meshable_count();
        let fragments = chunk.fragments.len();
        let vertices = chunk.mesh.vertex_count();

        if world.finish_build(chunk) {
            log::debug!(
                "Built {} in {:?}: {} solid voxels, {} fragments, {} vertices",
                name,
                elapsed,
                voxels,
                fragments,
                vertices
            );
        }

        Vec::new()
    }
}
