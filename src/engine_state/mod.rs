//! # Engine State Module
//!
//! The core module that owns a streamed voxel world and everything that acts
//! on it.
//!
//! ## Key Components
//!
//! * `EngineState` - The main state container tying the subsystems together
//! * `world_config` - World settings, loaded from JSON or built in code
//! * `rendering` - Per-voxel meshing and mesh assembly
//! * `task_management` - Manages background tasks and worker threads
//! * `voxels` - Voxel data, chunks, the chunk registry, streaming and edits
//!
//! ## Architecture
//!
//! `EngineState` is the single owner of the world registry. Chunk builds run
//! on worker threads but their results are applied here, on the thread that
//! drives the streaming loop, so the registry is only ever mutated from one
//! place.

use std::thread;

use cgmath::Point3;
use log::{info, warn};

use task_management::TaskManager;
use voxels::{
    chunk::{ChunkBuilder, DensityField},
    edit::{self, EditError, EditOutcome, EditRequest},
    streaming::{BuildProgress, ChunkStreamer, StreamingTick},
    world::World,
};
use world_config::{ConfigError, WorldConfig};

pub mod rendering;
pub mod task_management;
pub mod voxels;
pub mod world_config;

/// Somewhere to read the viewer position from, polled once per streaming
/// tick.
pub trait ViewerSource {
    fn viewer_position(&mut self) -> Point3<f32>;
}

impl<F> ViewerSource for F
where
    F: FnMut() -> Point3<f32>,
{
    fn viewer_position(&mut self) -> Point3<f32> {
        self()
    }
}

/// The main state container for a streamed voxel world
///
/// Owns the configuration, the chunk registry, the worker pool that builds
/// chunks and the streamer that decides what to build.
///
/// # Examples
///
/// ```rust,ignore
/// let mut engine = EngineState::new(WorldConfig::default())?;
/// let spawn = engine.build_world(|_| {});
/// engine.prebuild_extra_world();
///
/// // Streaming loop
/// loop {
///     engine.tick(viewer_position());
/// }
/// ```
pub struct EngineState {
    config: WorldConfig,
    /// The chunk registry
    pub world: World,
    /// Worker pool running chunk builds
    pub task_manager: TaskManager,
    /// Footprint tracking and column requests
    pub streamer: ChunkStreamer,
    /// Where the viewer starts, once the initial world is built
    spawn_point: Option<Point3<f32>>,
}

impl EngineState {
    /// Creates an engine for `config` with an empty world.
    ///
    /// # Errors
    /// `ConfigError::Invalid` if the config does not describe a buildable
    /// world.
    pub fn new(config: WorldConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let field = DensityField::new(config.seed, config.layers.clone().into());
        let builder = ChunkBuilder::new(field, config.chunk_dimensions);
        let world = World::new(config.chunk_dimensions, config.world_dimensions.y);
        let task_manager = TaskManager::new(config.worker_count);
        let streamer = ChunkStreamer::new(builder, &config);

        Ok(EngineState {
            config,
            world,
            task_manager,
            streamer,
            spawn_point: None,
        })
    }

    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    pub fn spawn_point(&self) -> Option<Point3<f32>> {
        self.spawn_point
    }

    /// Builds the initial world on this thread and returns the spawn point.
    ///
    /// # Arguments
    /// * `progress` - Called after every finished column
    pub fn build_world(&mut self, progress: impl FnMut(BuildProgress)) -> Point3<f32> {
        let spawn = self
            .streamer
            .build_world(&mut self.world, &mut self.task_manager, progress);
        self.spawn_point = Some(spawn);
        spawn
    }

    /// Requests the columns beyond the initial world in the background,
    /// hidden.
    ///
    /// # Returns
    /// How many chunk builds were started.
    pub fn prebuild_extra_world(&mut self) -> usize {
        self.streamer
            .prebuild_extra_world(&mut self.world, &mut self.task_manager)
    }

    /// Runs one streaming tick, hands queued builds to free workers and
    /// applies every build that has finished.
    pub fn tick(&mut self, viewer: Point3<f32>) -> StreamingTick {
        let tick = self
            .streamer
            .update(viewer, &mut self.world, &mut self.task_manager);
        self.task_manager.process_queued_tasks();
        self.task_manager.process_completed_tasks(&mut self.world);
        tick
    }

    /// Polls `viewer` and ticks every `poll_interval_ms`.
    ///
    /// # Arguments
    /// * `viewer` - Source of the viewer position
    /// * `max_ticks` - Stop after this many ticks; `None` runs forever
    ///
    /// # Returns
    /// The number of ticks run.
    pub fn run_streaming(
        &mut self,
        viewer: &mut impl ViewerSource,
        max_ticks: Option<usize>,
    ) -> usize {
        let interval = self.config.poll_interval();
        let mut ticks = 0;

        while max_ticks.map_or(true, |max| ticks < max) {
            let position = viewer.viewer_position();
            let tick = self.tick(position);
            ticks += 1;

            if tick.recomputed {
                info!(
                    "Tick {}: {} chunks ready, {} building, {} columns queued",
                    ticks,
                    self.world.chunk_count(),
                    self.world.pending_count(),
                    self.streamer.queued_columns()
                );
            }

            if max_ticks.map_or(true, |max| ticks < max) {
                thread::sleep(interval);
            }
        }

        ticks
    }

    /// Blocks until every requested chunk build has landed.
    pub fn finish_pending_builds(&mut self) {
        while self.task_manager.wait_for_completed_task(&mut self.world) {}
    }

    /// Removes or places a voxel from a ray hit, rebuilding only the chunk
    /// that changed.
    pub fn apply_edit(&mut self, request: &EditRequest) -> Result<EditOutcome, EditError> {
        match edit::apply(&mut self.world, request) {
            Ok(outcome) => {
                info!(
                    "{:?} -> {:?} at {:?} in chunk {:?}",
                    outcome.previous, outcome.current, outcome.target.local, outcome.target.chunk
                );
                Ok(outcome)
            }
            Err(err) => {
                warn!("Edit rejected: {}", err);
                Err(err)
            }
        }
    }
}
