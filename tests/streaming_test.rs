use cgmath::{Point2, Point3};
use voxel_terrain::{
    BuildProgress, ChunkDimensions, ChunkState, EngineState, WorldConfig, WorldDimensions,
};

const DIMS: ChunkDimensions = ChunkDimensions::new(4, 8, 4);

fn config(worker_count: usize) -> WorldConfig {
    WorldConfig {
        world_dimensions: WorldDimensions::new(3, 2, 3),
        extra_world_dimensions: WorldDimensions::new(2, 2, 2),
        chunk_dimensions: DIMS,
        draw_radius: 1,
        poll_interval_ms: 0,
        columns_per_tick: 3,
        worker_count,
        seed: 9,
        ..WorldConfig::default()
    }
}

#[test]
fn test_initial_world_is_built_and_visible() {
    let mut engine = EngineState::new(config(2)).unwrap();
    let mut reports = Vec::new();
    let spawn = engine.build_world(|progress| reports.push(progress));

    assert_eq!(reports.last(), Some(&BuildProgress { built: 9, total: 9 }));
    assert_eq!(engine.world.chunk_count(), 9 * 2);
    assert_eq!(engine.world.pending_count(), 0);
    assert!(engine.world.chunks().all(|c| c.visible));
    assert_eq!(engine.world.visible_columns().len(), 9);

    assert_eq!((spawn.x, spawn.z), (6.0, 6.0));
    assert_eq!(engine.spawn_point(), Some(spawn));
}

#[test]
fn test_prebuilt_columns_land_hidden() {
    let mut engine = EngineState::new(config(3)).unwrap();
    engine.build_world(|_| {});

    // a 5 x 5 area minus the 3 x 3 initial world, two layers each
    assert_eq!(engine.prebuild_extra_world(), 16 * 2);
    engine.finish_pending_builds();

    assert_eq!(engine.world.chunk_count(), 25 * 2);
    assert_eq!(engine.world.chunks().filter(|c| c.visible).count(), 9 * 2);
    assert_eq!(
        engine.world.chunk_state(Point3::new(16, 8, 16)),
        ChunkState::Ready
    );
    assert!(engine.task_manager.is_idle());
}

#[test]
fn test_leaving_columns_hides_without_destroying() {
    let mut engine = EngineState::new(config(2)).unwrap();
    let spawn = engine.build_world(|_| {});
    let built = engine.world.chunk_count();

    // the first tick after the build stays put
    let tick = engine.tick(spawn);
    assert!(!tick.recomputed);

    let far = Point3::new(200.0, spawn.y, 200.0);
    let tick = engine.tick(far);
    assert!(tick.recomputed);
    assert_eq!(tick.footprint, 9);
    assert_eq!(tick.hidden, 9);

    for _ in 0..4 {
        engine.tick(far);
    }
    engine.finish_pending_builds();

    // the old columns are still stored, just hidden
    assert_eq!(engine.world.chunk_count(), built + 9 * 2);
    let old = Point2::new(0, 0);
    assert!(engine.world.is_column_built(old));
    assert!(engine
        .world
        .column_origins(old)
        .all(|origin| !engine.world.chunk(origin).unwrap().visible));

    let mut visible = engine.world.visible_columns();
    visible.sort_by_key(|c| (c.x, c.y));
    assert_eq!(visible.len(), 9);
    assert!(visible.iter().all(|c| (196..=204).contains(&c.x) && (196..=204).contains(&c.y)));

    // coming back shows them again without rebuilding
    let tick = engine.tick(spawn);
    assert!(tick.recomputed);
    assert_eq!(tick.shown, 9);
    assert_eq!(tick.queued, 0);
    assert_eq!(engine.world.chunk_count(), built + 9 * 2);
}

#[test]
fn test_run_streaming_with_workers() {
    let mut engine = EngineState::new(config(2)).unwrap();
    let spawn = engine.build_world(|_| {});

    let mut step = 0.0;
    let mut viewer = || {
        step += 10.0;
        Point3::new(spawn.x + step, spawn.y, spawn.z)
    };
    assert_eq!(engine.run_streaming(&mut viewer, Some(5)), 5);
    engine.finish_pending_builds();

    assert_eq!(engine.world.pending_count(), 0);
    assert!(engine.world.chunk_count() > 9 * 2);
    assert!(engine.world.visible_columns().len() <= 9);
}
