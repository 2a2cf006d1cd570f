//! World configuration.
//!
//! Everything that shapes a world is fixed when it starts: its extent, chunk
//! size, streaming radius and the six noise layers. A [`WorldConfig`] can be
//! built in code or loaded from JSON; fields missing from the JSON take their
//! defaults.

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::voxels::{chunk::ChunkDimensions, noise::NoiseLayers};

/// Largest accepted octave count for any noise layer.
pub const MAX_OCTAVES: u32 = 32;

/// Largest accepted streaming radius, in column steps.
pub const MAX_DRAW_RADIUS: i32 = 256;

/// Errors raised while loading or validating a [`WorldConfig`].
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    /// The config file is not valid JSON for a `WorldConfig`.
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    /// The config parsed but describes an unusable world.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// World extent in chunks: columns along x, layers along y, columns along z.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldDimensions {
    pub x: u32,
    pub y: u32,
    pub z: u32,
}

impl WorldDimensions {
    pub const fn new(x: u32, y: u32, z: u32) -> Self {
        WorldDimensions { x, y, z }
    }

    /// Number of columns in the x-z plane.
    pub fn column_count(&self) -> usize {
        self.x as usize * self.z as usize
    }
}

/// Settings for a streamed voxel world.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Extent of the initial world, built before streaming starts.
    pub world_dimensions: WorldDimensions,

    /// Extra columns beyond the initial world that can be prebuilt hidden.
    /// Only `x` and `z` are used.
    pub extra_world_dimensions: WorldDimensions,

    pub chunk_dimensions: ChunkDimensions,

    /// Columns within this many steps of the viewer's column stay visible.
    pub draw_radius: i32,

    /// Milliseconds between streaming ticks.
    pub poll_interval_ms: u64,

    /// Column builds issued per streaming tick.
    pub columns_per_tick: usize,

    /// Background chunk-build threads. Zero builds inline.
    pub worker_count: usize,

    /// Perlin permutation seed.
    pub seed: u32,

    pub layers: NoiseLayers,
}

impl Default for WorldConfig {
    fn default() -> Self {
        WorldConfig {
            world_dimensions: WorldDimensions::new(3, 3, 3),
            extra_world_dimensions: WorldDimensions::new(5, 3, 5),
            chunk_dimensions: ChunkDimensions::new(10, 10, 10),
            draw_radius: 8,
            poll_interval_ms: 500,
            columns_per_tick: 2,
            worker_count: 4,
            seed: 0,
            layers: NoiseLayers::default(),
        }
    }
}

impl WorldConfig {
    /// Parses and validates a config from a JSON string.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: WorldConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a JSON config file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    /// Serializes the config as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Checks that the config describes a world that can be built.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0..=MAX_DRAW_RADIUS).contains(&self.draw_radius) {
            return Err(ConfigError::Invalid(format!(
                "draw_radius must be between 0 and {}, got {}",
                MAX_DRAW_RADIUS, self.draw_radius
            )));
        }
        if self.world_dimensions.y == 0 {
            return Err(ConfigError::Invalid(
                "world_dimensions.y must be at least one layer".to_string(),
            ));
        }
        if self.columns_per_tick == 0 {
            return Err(ConfigError::Invalid(
                "columns_per_tick must be at least 1".to_string(),
            ));
        }
        for (name, layer) in self.layers.named() {
            if layer.octave_count > MAX_OCTAVES {
                return Err(ConfigError::Invalid(format!(
                    "layer {} has {} octaves, at most {} are supported",
                    name, layer.octave_count, MAX_OCTAVES
                )));
            }
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}
