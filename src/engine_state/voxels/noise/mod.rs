//! # Layered Noise Module
//!
//! Terrain layers are height fields built from fractal Brownian motion over
//! 2D Perlin noise. Every layer is described by a [`NoiseLayerConfig`]; the
//! six layers a world needs are bundled into [`NoiseLayers`] and shared
//! read-only by every chunk build.
//!
//! ## 3D Noise
//!
//! Caves use [`LayeredNoise::fbm_3d`], which averages six 2D evaluations taken
//! over every ordered pair of axes. This cancels the directional bias of any
//! single plane without paying for real 3D noise.

use noise::{NoiseFn, Perlin};
use serde::{Deserialize, Serialize};

/// Parameters of one fBM height layer.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoiseLayerConfig {
    /// Base frequency applied to world coordinates.
    pub scale: f64,
    /// Amplitude multiplier applied to every octave.
    pub height_scale: f64,
    /// Constant added to the summed octaves.
    pub height_offset: f64,
    /// Number of octaves. Zero yields a constant `height_offset`.
    pub octave_count: u32,
    /// Layer-specific threshold (diamond spawn chance, cave cut-off).
    pub probability: f64,
}

impl Default for NoiseLayerConfig {
    fn default() -> Self {
        NoiseLayerConfig {
            scale: 0.01,
            height_scale: 1.0,
            height_offset: 0.0,
            octave_count: 1,
            probability: 1.0,
        }
    }
}

impl NoiseLayerConfig {
    /// Creates a layer config from its five parameters.
    pub fn new(
        scale: f64,
        height_scale: f64,
        height_offset: f64,
        octave_count: u32,
        probability: f64,
    ) -> Self {
        NoiseLayerConfig {
            scale,
            height_scale,
            height_offset,
            octave_count,
            probability,
        }
    }
}

/// The six layers that drive voxel classification.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoiseLayers {
    /// Height of the grass layer.
    pub surface: NoiseLayerConfig,
    /// Everything below this height is stone.
    pub stone: NoiseLayerConfig,
    /// Upper bound of the diamond band. Its `probability` is the ore chance.
    pub diamond_top: NoiseLayerConfig,
    /// Lower bound of the diamond band.
    pub diamond_bottom: NoiseLayerConfig,
    /// The bedrock sheet; everything below it is empty.
    pub bedrock: NoiseLayerConfig,
    /// 3D cave field. Cells whose value is below `probability` are carved.
    pub caves: NoiseLayerConfig,
}

impl Default for NoiseLayers {
    fn default() -> Self {
        NoiseLayers {
            surface: NoiseLayerConfig::new(0.01, 5.0, 10.0, 4, 1.0),
            stone: NoiseLayerConfig::new(0.02, 4.0, 6.0, 4, 1.0),
            diamond_top: NoiseLayerConfig::new(0.03, 3.0, 6.0, 2, 0.05),
            diamond_bottom: NoiseLayerConfig::new(0.03, 2.0, 1.0, 2, 1.0),
            bedrock: NoiseLayerConfig::new(0.1, 1.0, 0.0, 1, 1.0),
            caves: NoiseLayerConfig::new(0.1, 2.0, 0.0, 2, 1.0),
        }
    }
}

impl NoiseLayers {
    /// All layers paired with their names, for validation and logging.
    pub fn named(&self) -> [(&'static str, &NoiseLayerConfig); 6] {
        [
            ("surface", &self.surface),
            ("stone", &self.stone),
            ("diamond_top", &self.diamond_top),
            ("diamond_bottom", &self.diamond_bottom),
            ("bedrock", &self.bedrock),
            ("caves", &self.caves),
        ]
    }
}

/// Perlin-backed fBM sampler.
///
/// Cheap to clone and safe to share across rayon workers.
#[derive(Clone)]
pub struct LayeredNoise {
    perlin: Perlin,
}

impl LayeredNoise {
    /// Creates a sampler whose permutation table is derived from `seed`.
    pub fn new(seed: u32) -> Self {
        LayeredNoise {
            perlin: Perlin::new(seed),
        }
    }

    /// Single 2D Perlin sample remapped to `[0, 1]`.
    #[inline]
    pub fn sample(&self, x: f64, z: f64) -> f64 {
        ((self.perlin.get([x, z]) + 1.0) * 0.5).clamp(0.0, 1.0)
    }

    /// 2D fractal Brownian motion at `(x, z)`.
    ///
    /// Sums `octave_count` samples at doubling frequency, each scaled by
    /// `height_scale`, then adds `height_offset`.
    pub fn fbm(&self, x: f64, z: f64, layer: &NoiseLayerConfig) -> f64 {
        let mut total = 0.0;
        let mut frequency = 1.0;
        for _ in 0..layer.octave_count {
            total += self.sample(x * layer.scale * frequency, z * layer.scale * frequency)
                * layer.height_scale;
            frequency *= 2.0;
        }
        total + layer.height_offset
    }

    /// Approximate 3D fBM: the mean of the six axis-pair permutations.
    pub fn fbm_3d(&self, x: f64, y: f64, z: f64, layer: &NoiseLayerConfig) -> f64 {
        let xy = self.fbm(x, y, layer);
        let yz = self.fbm(y, z, layer);
        let xz = self.fbm(x, z, layer);
        let yx = self.fbm(y, x, layer);
        let zy = self.fbm(z, y, layer);
        let zx = self.fbm(z, x, layer);

        (xy + yz + xz + yx + zy + zx) / 6.0
    }

    /// Integer layer height at a world column, truncated toward zero.
    #[inline]
    pub fn height(&self, x: i64, z: i64, layer: &NoiseLayerConfig) -> i64 {
        self.fbm(x as f64, z as f64, layer) as i64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_octaves_is_offset() {
        let noise = LayeredNoise::new(7);
        let layer = NoiseLayerConfig::new(0.05, 10.0, 12.5, 0, 1.0);

        for (x, z) in [(0, 0), (13, -4), (-250, 999)] {
            assert_eq!(noise.fbm(x as f64, z as f64, &layer), 12.5);
            assert_eq!(noise.height(x, z, &layer), 12);
        }
        assert_eq!(noise.fbm_3d(3.0, 4.0, 5.0, &layer), 12.5);
    }

    #[test]
    fn test_fbm_bounds() {
        let noise = LayeredNoise::new(1);
        let layer = NoiseLayerConfig::new(0.037, 3.0, -2.0, 4, 1.0);

        for x in -20..20 {
            for z in -20..20 {
                let value = noise.fbm(x as f64, z as f64, &layer);
                assert!((-2.0..=10.0).contains(&value), "fbm out of range: {}", value);
            }
        }
    }

    #[test]
    fn test_same_seed_same_field() {
        let a = LayeredNoise::new(42);
        let b = LayeredNoise::new(42);
        let layer = NoiseLayers::default().surface;

        for x in 0..16 {
            assert_eq!(
                a.fbm_3d(x as f64, 3.0, 7.0, &layer),
                b.fbm_3d(x as f64, 3.0, 7.0, &layer)
            );
        }
    }

    #[test]
    fn test_layer_config_from_json() {
        let layer: NoiseLayerConfig =
            serde_json::from_str(r#"{ "scale": 0.5, "octave_count": 3 }"#).unwrap();
        assert_eq!(layer.scale, 0.5);
        assert_eq!(layer.octave_count, 3);
        assert_eq!(layer.height_scale, 1.0);
    }
}
