#![warn(rustdoc::missing_crate_level_docs)]
#![warn(rustdoc::invalid_rust_codeblocks)]

//! # Voxel Terrain
//!
//! Procedural voxel terrain built in fixed-size chunks and streamed around a
//! moving viewer.
//!
//! Each chunk goes through the same pipeline:
//!
//! 1. A layered-noise density field decides the type of every voxel
//! 2. The mesher emits one geometry fragment per solid voxel, culling faces
//!    that touch another solid voxel in the same chunk
//! 3. The assembler merges the fragments into one indexed mesh
//!
//! Builds run on a pool of worker threads. The streamer keeps the columns
//! within the draw radius built and visible, and hides columns the viewer has
//! left without destroying them.
//!
//! ## Key Modules
//!
//! * `engine_state` - The world registry, streaming, edits and the worker pool
//! * `engine_state::voxels` - Voxel types, noise, chunks and generation
//! * `engine_state::rendering` - Meshing, assembly and vertex layout
//!
//! ## Usage
//!
//! ```rust,ignore
//! use voxel_terrain::{EngineState, WorldConfig};
//!
//! let mut engine = EngineState::new(WorldConfig::default())?;
//! let spawn = engine.build_world(|progress| println!("{}/{}", progress.built, progress.total));
//! engine.prebuild_extra_world();
//! engine.run_streaming(&mut || spawn, Some(10));
//! ```
//!
//! ## Logging
//!
//! Everything logs through the `log` facade. `run()` installs `env_logger`
//! writing to stdout and filtered by `RUST_LOG`.

use cgmath::{Point3, Vector3};
use log::{error, info};

pub mod engine_state;

pub use engine_state::{
    rendering::{ChunkMesh, MeshFragment, Vertex},
    voxels::{
        block::block_type::VoxelType,
        chunk::{Chunk, ChunkBuilder, ChunkDimensions, DensityField},
        edit::{EditAction, EditError, EditOutcome, EditRequest},
        noise::{NoiseLayerConfig, NoiseLayers},
        streaming::{BuildProgress, StreamingTick},
        world::{ChunkState, World},
    },
    world_config::{ConfigError, WorldConfig, WorldDimensions},
    EngineState, ViewerSource,
};

/// Streaming ticks the demo viewer runs for.
const DEMO_TICKS: usize = 24;

/// Radians the demo viewer turns per tick.
const DEMO_ORBIT_STEP: f32 = 0.4;

/// A viewer circling the spawn point, far enough out to cross columns.
struct OrbitingViewer {
    centre: Point3<f32>,
    radius: f32,
    angle: f32,
}

impl ViewerSource for OrbitingViewer {
    fn viewer_position(&mut self) -> Point3<f32> {
        let offset = Vector3::new(self.angle.cos(), 0.0, self.angle.sin()) * self.radius;
        self.angle += DEMO_ORBIT_STEP;
        self.centre + offset
    }
}

/// Builds a world from the config file named by the first argument, or the
/// default config, and streams it around an orbiting viewer.
pub fn run() {
    let mut log_builder = env_logger::Builder::new();
    log_builder
        .target(env_logger::Target::Stdout)
        .parse_env("RUST_LOG")
        .init();

    info!("Logger initialized");

    let config = match std::env::args().nth(1) {
        Some(path) => match WorldConfig::from_file(&path) {
            Ok(config) => config,
            Err(err) => {
                error!("Couldn't load config {}: {}", path, err);
                return;
            }
        },
        None => WorldConfig::default(),
    };

    let mut engine = match EngineState::new(config) {
        Ok(engine) => engine,
        Err(err) => {
            error!("Couldn't start engine: {}", err);
            return;
        }
    };

    let spawn = engine.build_world(|progress| {
        info!("Built {}/{} columns", progress.built, progress.total);
    });
    engine.prebuild_extra_world();

    let dims = engine.config().chunk_dimensions;
    let mut viewer = OrbitingViewer {
        centre: spawn,
        radius: (dims.width.max(dims.depth) * 4) as f32,
        angle: 0.0,
    };
    let ticks = engine.run_streaming(&mut viewer, Some(DEMO_TICKS));

    info!(
        "Streamed {} ticks: {} chunks ready, {} columns visible",
        ticks,
        engine.world.chunk_count(),
        engine.world.visible_columns().len()
    );
}
