//! # Chunk Streaming Module
//!
//! This module keeps the columns around a moving viewer built and visible.
//!
//! ## Footprint
//!
//! The viewer's column is its position snapped down to a multiple of the chunk
//! width and depth. The footprint is every column within `draw_radius` column
//! steps of it along x and z, ordered ring by ring outward so the nearest
//! columns are built first.
//!
//! ## Ticks
//!
//! A tick recomputes the footprint only after the viewer has moved further
//! than one chunk width or depth from where the last recomputation happened.
//! On recomputation:
//! - footprint columns that are already built are shown at once
//! - the rest go on a work queue
//! - populated columns outside the footprint are hidden, never destroyed
//!
//! Between recomputations, once the queue is empty, footprint columns whose
//! failed builds were released are queued again.
//!
//! Every tick, at most `columns_per_tick` queued columns are handed to the
//! task manager. Builds run on workers and land in the world when the task
//! manager applies their results.
//!
//! ## Synchronous Builds
//!
//! The initial world is built column by column on the calling thread. If an
//! origin in the column is already being built by a worker, the caller blocks
//! on the task manager until that build lands instead of building it twice.

use std::collections::{HashSet, VecDeque};

use cgmath::{MetricSpace, Point2, Point3};
use log::{debug, info, warn};
use web_time::Instant;

use crate::engine_state::{
    task_management::TaskManager,
    world_config::{WorldConfig, WorldDimensions, MAX_DRAW_RADIUS},
};

use super::{
    chunk::{ChunkBuilder, ChunkDimensions},
    tasks::chunk_generation_task::ChunkBuildTask,
    world::{BuildTicket, ChunkState, World},
};

/// Progress of the initial world build.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct BuildProgress {
    /// Columns finished so far.
    pub built: usize,
    /// Columns in the initial world.
    pub total: usize,
}

/// What one streaming tick did.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StreamingTick {
    /// Whether the footprint was recomputed this tick.
    pub recomputed: bool,
    /// Columns in the current footprint.
    pub footprint: usize,
    /// Footprint columns that were already built and were shown.
    pub shown: usize,
    /// Columns newly added to the work queue.
    pub queued: usize,
    /// Columns hidden because they left the footprint.
    pub hidden: usize,
    /// Columns handed to the task manager this tick.
    pub issued: usize,
}

/// The column containing a world-space position.
///
/// Positions beyond the range of `i32` columns snap to the outermost column.
pub fn viewer_column(position: Point3<f32>, dimensions: ChunkDimensions) -> Point2<i32> {
    Point2::new(
        snap_to_column(position.x, dimensions.width),
        snap_to_column(position.z, dimensions.depth),
    )
}

fn snap_to_column(value: f32, size: usize) -> i32 {
    let Ok(size) = i64::try_from(size) else {
        return 0;
    };
    if size == 0 {
        return 0;
    }
    let lowest = i64::from(i32::MIN) / size;
    let highest = i64::from(i32::MAX) / size;
    // float-to-int casts saturate, and NaN becomes zero
    let cell = (f64::from(value) / size as f64).floor() as i64;
    i32::try_from(cell.clamp(lowest, highest) * size).unwrap_or(0)
}

/// `base + steps * size`, or `None` if it leaves the `i32` range.
fn column_offset(base: i32, steps: i32, size: usize) -> Option<i32> {
    let size = i64::try_from(size).ok()?;
    let value = i64::from(steps)
        .checked_mul(size)?
        .checked_add(i64::from(base))?;
    i32::try_from(value).ok()
}

/// Columns within `radius` column steps of `centre`, nearest ring first.
///
/// The radius is clamped to `0..=MAX_DRAW_RADIUS`. Columns whose origin
/// would not fit in `i32` are left out.
pub fn footprint(
    centre: Point2<i32>,
    radius: i32,
    dimensions: ChunkDimensions,
) -> Vec<Point2<i32>> {
    let radius = radius.clamp(0, MAX_DRAW_RADIUS);
    let side = (2 * radius + 1) as usize;
    let mut columns = Vec::with_capacity(side * side);

    for ring in 0..=radius {
        for dz in -ring..=ring {
            for dx in -ring..=ring {
                if dx.abs().max(dz.abs()) != ring {
                    continue;
                }
                let x = column_offset(centre.x, dx, dimensions.width);
                let z = column_offset(centre.y, dz, dimensions.depth);
                if let (Some(x), Some(z)) = (x, z) {
                    columns.push(Point2::new(x, z));
                }
            }
        }
    }

    columns
}

/// Drives chunk column builds and visibility around a viewer.
pub struct ChunkStreamer {
    builder: ChunkBuilder,
    draw_radius: i32,
    columns_per_tick: usize,
    world_dimensions: WorldDimensions,
    extra_world_dimensions: WorldDimensions,

    /// Columns waiting to be issued, nearest first.
    queue: VecDeque<Point2<i32>>,

    /// The footprint from the last recomputation.
    footprint: HashSet<Point2<i32>>,

    /// Viewer position, rounded up, at the last recomputation.
    last_build_position: Option<Point3<f32>>,

    /// Source of per-chunk build seeds.
    build_seeds: fastrand::Rng,
}

impl ChunkStreamer {
    pub fn new(builder: ChunkBuilder, config: &WorldConfig) -> Self {
        ChunkStreamer {
            builder,
            draw_radius: config.draw_radius,
            columns_per_tick: config.columns_per_tick.max(1),
            world_dimensions: config.world_dimensions,
            extra_world_dimensions: config.extra_world_dimensions,
            queue: VecDeque::new(),
            footprint: HashSet::new(),
            last_build_position: None,
            build_seeds: fastrand::Rng::with_seed(config.seed as u64),
        }
    }

    pub fn builder(&self) -> &ChunkBuilder {
        &self.builder
    }

    /// Columns waiting to be issued.
    pub fn queued_columns(&self) -> usize {
        self.queue.len()
    }

    pub fn last_build_position(&self) -> Option<Point3<f32>> {
        self.last_build_position
    }

    fn mark_built_at(&mut self, position: Point3<f32>) {
        self.last_build_position = Some(Point3::new(
            position.x.ceil(),
            position.y.ceil(),
            position.z.ceil(),
        ));
    }

    /// Whether the viewer is far enough from the last recomputation to
    /// recompute the footprint.
    pub fn needs_rebuild(&self, viewer: Point3<f32>) -> bool {
        let Some(last) = self.last_build_position else {
            return true;
        };
        let dims = self.builder.dimensions();
        let moved = last.distance(viewer);
        moved > dims.width as f32 || moved > dims.depth as f32
    }

    /// Claims and publishes the build of one origin.
    ///
    /// # Returns
    /// `true` if a new build task was published.
    fn spawn_build(
        &mut self,
        world: &mut World,
        tasks: &mut TaskManager,
        origin: Point3<i32>,
        visible: bool,
    ) -> bool {
        match world.begin_build(origin, visible) {
            BuildTicket::Started => {
                let seed = self.build_seeds.u64(..);
                tasks.publish_task(Box::new(ChunkBuildTask::new(
                    self.builder.clone(),
                    origin,
                    seed,
                )));
                true
            }
            BuildTicket::AlreadyPending | BuildTicket::AlreadyBuilt => false,
        }
    }

    /// Requests every layer of `column` in the background.
    ///
    /// Origins already pending keep their running build and adopt `visible`;
    /// ready origins just have their visibility set.
    ///
    /// # Returns
    /// How many build tasks were published.
    pub fn request_chunk_column(
        &mut self,
        world: &mut World,
        tasks: &mut TaskManager,
        column: Point2<i32>,
        visible: bool,
    ) -> usize {
        let origins: Vec<_> = world.column_origins(column).collect();
        origins
            .into_iter()
            .filter(|origin| self.spawn_build(world, tasks, *origin, visible))
            .count()
    }

    /// Builds every layer of `column` on the calling thread.
    ///
    /// Origins already being built by a worker are waited for rather than
    /// built again.
    pub fn build_chunk_column(
        &mut self,
        world: &mut World,
        tasks: &mut TaskManager,
        column: Point2<i32>,
        visible: bool,
    ) {
        let origins: Vec<_> = world.column_origins(column).collect();
        for origin in origins {
            match world.begin_build(origin, visible) {
                BuildTicket::Started => {
                    let seed = self.build_seeds.u64(..);
                    let chunk = self.builder.build_seeded(origin, seed);
                    world.finish_build(chunk);
                }
                BuildTicket::AlreadyPending => {
                    debug!("Waiting for in-flight build of {:?}", origin);
                    while world.chunk_state(origin) == ChunkState::Pending {
                        if !tasks.wait_for_completed_task(world) {
                            break;
                        }
                    }
                    if world.chunk_state(origin) != ChunkState::Ready {
                        warn!("Build of {:?} never landed; building it here", origin);
                        world.begin_build(origin, visible);
                        let seed = self.build_seeds.u64(..);
                        world.finish_build(self.builder.build_seeded(origin, seed));
                    }
                }
                BuildTicket::AlreadyBuilt => {}
            }
        }
    }

    /// Builds the initial world column by column and returns the spawn point.
    ///
    /// `progress` is called after every column. The spawn point is the
    /// middle of the world, five voxels above the surface, and becomes the
    /// last rebuild position.
    pub fn build_world(
        &mut self,
        world: &mut World,
        tasks: &mut TaskManager,
        mut progress: impl FnMut(BuildProgress),
    ) -> Point3<f32> {
        let dims = self.builder.dimensions();
        let total = self.world_dimensions.column_count();
        let start = Instant::now();
        info!(
            "Building {} columns of {} chunks",
            total, self.world_dimensions.y
        );

        let mut built = 0;
        for z in 0..self.world_dimensions.z as i32 {
            for x in 0..self.world_dimensions.x as i32 {
                let column = Point2::new(x * dims.width as i32, z * dims.depth as i32);
                self.build_chunk_column(world, tasks, column, true);
                built += 1;
                debug!("Built column {:?} ({}/{})", column, built, total);
                progress(BuildProgress { built, total });
            }
        }

        let middle_x = self.world_dimensions.x as i64 * dims.width as i64 / 2;
        let middle_z = self.world_dimensions.z as i64 * dims.depth as i64 / 2;
        let middle_y = self.builder.field().surface_height(middle_x, middle_z) + 5;
        let spawn = Point3::new(middle_x as f32, middle_y as f32, middle_z as f32);
        self.mark_built_at(spawn);

        info!(
            "World built in {:?}: {} chunks, spawn at {:?}",
            start.elapsed(),
            world.chunk_count(),
            spawn
        );
        spawn
    }

    /// Requests the columns beyond the initial world, hidden, so they are
    /// ready when the viewer gets there.
    ///
    /// Covers the strips `x < world.x + extra.x` for `z >= world.z`, and
    /// `z < world.z + extra.z` for `x >= world.x`. Columns already requested
    /// are left alone.
    ///
    /// # Returns
    /// How many build tasks were published.
    pub fn prebuild_extra_world(&mut self, world: &mut World, tasks: &mut TaskManager) -> usize {
        let dims = self.builder.dimensions();
        let x_end = (self.world_dimensions.x + self.extra_world_dimensions.x) as i32;
        let z_end = (self.world_dimensions.z + self.extra_world_dimensions.z) as i32;
        let x_start = self.world_dimensions.x as i32;
        let z_start = self.world_dimensions.z as i32;

        let strips = (z_start..z_end)
            .flat_map(|z| (0..x_end).map(move |x| (x, z)))
            .chain((0..z_start).flat_map(|z| (x_start..x_end).map(move |x| (x, z))));

        let mut published = 0;
        for (x, z) in strips {
            let column = Point2::new(x * dims.width as i32, z * dims.depth as i32);
            let origins: Vec<_> = world.column_origins(column).collect();
            for origin in origins {
                if world.chunk_state(origin) == ChunkState::Unrequested
                    && self.spawn_build(world, tasks, origin, false)
                {
                    published += 1;
                }
            }
        }

        info!("Prebuilding {} chunks beyond the initial world", published);
        published
    }

    /// Runs one streaming tick for a viewer at `viewer`.
    pub fn update(
        &mut self,
        viewer: Point3<f32>,
        world: &mut World,
        tasks: &mut TaskManager,
    ) -> StreamingTick {
        let mut tick = StreamingTick::default();

        if self.needs_rebuild(viewer) {
            self.mark_built_at(viewer);
            self.recompute_footprint(viewer, world, &mut tick);
        } else if self.queue.is_empty() {
            tick.queued = self.requeue_released(world);
        }

        while tick.issued < self.columns_per_tick {
            let Some(column) = self.queue.pop_front() else {
                break;
            };
            self.request_chunk_column(world, tasks, column, true);
            tick.issued += 1;
        }

        tick
    }

    /// Queues footprint columns with a layer that is neither built nor being
    /// built, which happens when a build fails and is released.
    fn requeue_released(&mut self, world: &World) -> usize {
        let mut released: Vec<_> = self
            .footprint
            .iter()
            .copied()
            .filter(|column| {
                world
                    .column_origins(*column)
                    .any(|origin| world.chunk_state(origin) == ChunkState::Unrequested)
            })
            .collect();
        released.sort_by_key(|column| (column.y, column.x));

        if !released.is_empty() {
            debug!("Requeueing {} released columns", released.len());
        }
        let count = released.len();
        self.queue.extend(released);
        count
    }

    fn recompute_footprint(
        &mut self,
        viewer: Point3<f32>,
        world: &mut World,
        tick: &mut StreamingTick,
    ) {
        let dims = self.builder.dimensions();
        let centre = viewer_column(viewer, dims);
        let columns = footprint(centre, self.draw_radius, dims);
        self.footprint = columns.iter().copied().collect();

        tick.recomputed = true;
        tick.footprint = columns.len();

        // drop queued work that left the footprint
        let footprint = &self.footprint;
        self.queue.retain(|column| footprint.contains(column));
        let mut queued: HashSet<Point2<i32>> = self.queue.iter().copied().collect();

        for column in columns {
            if world.is_column_built(column) {
                world.set_column_visibility(column, true);
                tick.shown += 1;
            } else if queued.insert(column) {
                self.queue.push_back(column);
                tick.queued += 1;
            }
        }

        for column in world.visible_columns() {
            if !self.footprint.contains(&column) {
                world.hide_column(column);
                tick.hidden += 1;
            }
        }

        // pending columns that left the footprint land hidden
        let stale: Vec<_> = world
            .pending_columns()
            .into_iter()
            .filter(|column| !self.footprint.contains(column))
            .collect();
        for column in stale {
            world.hide_column(column);
        }

        info!(
            "Streaming around {:?}: {} columns in range, {} shown, {} queued, {} hidden",
            centre, tick.footprint, tick.shown, tick.queued, tick.hidden
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::voxels::{chunk::DensityField, noise::NoiseLayers};
    use std::sync::Arc;

    const DIMS: ChunkDimensions = ChunkDimensions::new(4, 4, 4);

    fn streamer(config: &WorldConfig) -> ChunkStreamer {
        let field = DensityField::new(config.seed, Arc::new(config.layers.clone()));
        ChunkStreamer::new(ChunkBuilder::new(field, config.chunk_dimensions), config)
    }

    fn config(draw_radius: i32) -> WorldConfig {
        WorldConfig {
            world_dimensions: WorldDimensions::new(2, 1, 2),
            extra_world_dimensions: WorldDimensions::new(1, 1, 1),
            chunk_dimensions: DIMS,
            draw_radius,
            columns_per_tick: 2,
            worker_count: 0,
            layers: NoiseLayers::default(),
            ..WorldConfig::default()
        }
    }

    #[test]
    fn test_viewer_column_floors() {
        assert_eq!(viewer_column(Point3::new(5.0, 9.0, 3.9), DIMS), Point2::new(4, 0));
        assert_eq!(viewer_column(Point3::new(-0.5, 0.0, -4.0), DIMS), Point2::new(-4, -4));
    }

    #[test]
    fn test_footprint_is_square_and_ring_ordered() {
        let columns = footprint(Point2::new(8, 0), 2, DIMS);
        assert_eq!(columns.len(), 25);
        assert_eq!(columns[0], Point2::new(8, 0));

        let unique: HashSet<_> = columns.iter().copied().collect();
        assert_eq!(unique.len(), 25);
        assert!(columns.iter().all(|c| (c.x - 8).abs() <= 8 && c.y.abs() <= 8));
        assert!(columns[1..9].iter().all(|c| (c.x - 8).abs() <= 4 && c.y.abs() <= 4));

        assert_eq!(footprint(Point2::new(0, 0), 0, DIMS), vec![Point2::new(0, 0)]);
    }

    #[test]
    fn test_far_viewer_snaps_to_outermost_column() {
        let dims = ChunkDimensions::new(10, 10, 10);
        let column = viewer_column(Point3::new(3.0e9, 0.0, -3.0e9), dims);
        assert_eq!(column, Point2::new(2_147_483_640, -2_147_483_640));

        let column = viewer_column(Point3::new(f32::INFINITY, 0.0, f32::NAN), dims);
        assert_eq!(column, Point2::new(2_147_483_640, 0));
        assert_eq!(
            viewer_column(Point3::new(5.0, 0.0, 5.0), ChunkDimensions::new(0, 1, 0)),
            Point2::new(0, 0)
        );
    }

    #[test]
    fn test_footprint_skips_columns_out_of_range() {
        let dims = ChunkDimensions::new(10, 10, 10);
        let edge = Point2::new(2_147_483_640, 0);
        let columns = footprint(edge, 1, dims);

        // the x + 1 side of the square does not fit in i32
        assert_eq!(columns.len(), 6);
        assert!(columns.iter().all(|c| c.x <= edge.x));
    }

    #[test]
    fn test_footprint_radius_is_capped() {
        let columns = footprint(Point2::new(0, 0), i32::MAX, DIMS);
        let side = 2 * MAX_DRAW_RADIUS as usize + 1;
        assert_eq!(columns.len(), side * side);
        assert_eq!(footprint(Point2::new(0, 0), -3, DIMS).len(), 1);
    }

    #[test]
    fn test_rebuild_threshold() {
        let config = config(1);
        let mut streamer = streamer(&config);
        assert!(streamer.needs_rebuild(Point3::new(0.0, 0.0, 0.0)));

        streamer.mark_built_at(Point3::new(0.2, 0.0, 0.0));
        assert_eq!(streamer.last_build_position(), Some(Point3::new(1.0, 0.0, 0.0)));
        assert!(!streamer.needs_rebuild(Point3::new(4.9, 0.0, 0.0)));
        assert!(streamer.needs_rebuild(Point3::new(5.1, 0.0, 0.0)));
    }

    #[test]
    fn test_build_world_reports_progress() {
        let config = config(1);
        let mut streamer = streamer(&config);
        let mut world = World::new(DIMS, 1);
        let mut tasks = TaskManager::new(0);
        let mut reports = Vec::new();

        let spawn = streamer.build_world(&mut world, &mut tasks, |p| reports.push(p));

        assert_eq!(reports.len(), 4);
        assert_eq!(reports[3], BuildProgress { built: 4, total: 4 });
        assert_eq!(world.chunk_count(), 4);
        assert_eq!((spawn.x, spawn.z), (4.0, 4.0));
        let surface = streamer.builder().field().surface_height(4, 4);
        assert_eq!(spawn.y, (surface + 5) as f32);
        assert!(!streamer.needs_rebuild(spawn));
    }

    #[test]
    fn test_update_budgets_and_hides() {
        let config = config(1);
        let mut streamer = streamer(&config);
        let mut world = World::new(DIMS, 1);
        let mut tasks = TaskManager::new(0);
        let viewer = Point3::new(1.0, 0.0, 1.0);

        let tick = streamer.update(viewer, &mut world, &mut tasks);
        assert!(tick.recomputed);
        assert_eq!(tick.footprint, 9);
        assert_eq!(tick.queued, 9);
        assert_eq!(tick.issued, 2);
        assert_eq!(streamer.queued_columns(), 7);

        for _ in 0..4 {
            tasks.process_queued_tasks();
            tasks.process_completed_tasks(&mut world);
            let tick = streamer.update(viewer, &mut world, &mut tasks);
            assert!(!tick.recomputed);
        }
        tasks.process_queued_tasks();
        tasks.process_completed_tasks(&mut world);
        assert_eq!(streamer.queued_columns(), 0);
        assert_eq!(world.visible_columns().len(), 9);

        // move far enough that the old footprint is out of range
        let far = Point3::new(41.0, 0.0, 1.0);
        let tick = streamer.update(far, &mut world, &mut tasks);
        assert!(tick.recomputed);
        assert_eq!(tick.hidden, 9);
        assert_eq!(world.chunk_count(), 9);
        assert!(world.chunks().all(|c| !c.visible));
    }

    #[test]
    fn test_released_column_is_requested_again() {
        let config = config(0);
        let mut streamer = streamer(&config);
        let mut world = World::new(DIMS, 1);
        let viewer = Point3::new(1.0, 0.0, 1.0);
        let origin = Point3::new(0, 0, 0);

        let mut tasks = TaskManager::new(0);
        let tick = streamer.update(viewer, &mut world, &mut tasks);
        assert_eq!(tick.issued, 1);
        assert_eq!(world.chunk_state(origin), ChunkState::Pending);

        // the build never lands and is released
        drop(tasks);
        assert!(world.abandon_build(origin));

        let mut tasks = TaskManager::new(0);
        let tick = streamer.update(viewer, &mut world, &mut tasks);
        assert!(!tick.recomputed);
        assert_eq!(tick.queued, 1);
        assert_eq!(tick.issued, 1);

        tasks.process_queued_tasks();
        tasks.process_completed_tasks(&mut world);
        assert!(world.is_column_built(Point2::new(0, 0)));
        assert_eq!(streamer.update(viewer, &mut world, &mut tasks).queued, 0);
    }

    #[test]
    fn test_prebuild_requests_hidden_strips() {
        let config = config(1);
        let mut streamer = streamer(&config);
        let mut world = World::new(DIMS, 1);
        let mut tasks = TaskManager::new(0);

        streamer.build_world(&mut world, &mut tasks, |_| {});
        let published = streamer.prebuild_extra_world(&mut world, &mut tasks);
        // a 3x3 area minus the 2x2 initial world
        assert_eq!(published, 5);

        tasks.process_queued_tasks();
        tasks.process_completed_tasks(&mut world);
        assert_eq!(world.chunk_count(), 9);
        assert_eq!(world.chunks().filter(|c| c.visible).count(), 4);
        assert_eq!(streamer.prebuild_extra_world(&mut world, &mut tasks), 0);
    }

    #[test]
    fn test_sync_build_waits_for_pending_origin() {
        let config = config(1);
        let mut streamer = streamer(&config);
        let mut world = World::new(DIMS, 1);
        let mut tasks = TaskManager::new(1);
        let column = Point2::new(0, 0);

        assert_eq!(streamer.request_chunk_column(&mut world, &mut tasks, column, false), 1);
        assert_eq!(world.pending_count(), 1);

        streamer.build_chunk_column(&mut world, &mut tasks, column, true);
        assert_eq!(world.pending_count(), 0);
        assert_eq!(world.chunk_count(), 1);
        assert!(world.chunk(Point3::new(0, 0, 0)).unwrap().visible);
        assert!(tasks.is_idle());
    }
}
