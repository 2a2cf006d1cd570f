//! # Chunk Creation Module
//!
//! The density field generator. It classifies every cell of a chunk from the
//! layered noise fields in one data-parallel pass: each cell writes only its
//! own slot, so no synchronisation is needed beyond the final join.
//!
//! ## Classification
//!
//! First match wins:
//! 1. `y == bedrock` → OBSIDIAN
//! 2. `y < bedrock` → AIR
//! 3. cave value below the cave threshold → AIR
//! 4. `y == surface` → GRASS
//! 5. strictly inside the diamond band and the cell's random draw passes → DIAMOND
//! 6. `y < stone` → STONE
//! 7. `y < surface` → DIRT
//! 8. otherwise AIR

use std::sync::Arc;

use cgmath::Point3;
use rayon::prelude::*;

use crate::engine_state::voxels::{
    block::block_type::VoxelType,
    noise::{LayeredNoise, NoiseLayers},
};

use super::{Chunk, ChunkDimensions};

/// Generates voxel types for chunks from an immutable set of noise layers.
#[derive(Clone)]
pub struct DensityField {
    noise: LayeredNoise,
    layers: Arc<NoiseLayers>,
}

impl DensityField {
    /// Creates a generator over `layers` with a Perlin table derived from `seed`.
    pub fn new(seed: u32, layers: Arc<NoiseLayers>) -> Self {
        DensityField {
            noise: LayeredNoise::new(seed),
            layers,
        }
    }

    /// The layer configuration this generator reads.
    pub fn layers(&self) -> &NoiseLayers {
        &self.layers
    }

    /// Integer surface height of the world column at `(x, z)`.
    pub fn surface_height(&self, x: i64, z: i64) -> i64 {
        self.noise.height(x, z, &self.layers.surface)
    }

    /// Classifies a single cell at absolute position `position`.
    ///
    /// `rng` is the cell's own random stream. It is only drawn from when the
    /// cell falls inside the diamond band.
    pub fn classify(&self, position: Point3<i64>, rng: &mut fastrand::Rng) -> VoxelType {
        let layers = &*self.layers;
        let Point3 { x, y, z } = position;

        let surface = self.noise.height(x, z, &layers.surface);
        let stone = self.noise.height(x, z, &layers.stone);
        let diamond_top = self.noise.height(x, z, &layers.diamond_top);
        let diamond_bottom = self.noise.height(x, z, &layers.diamond_bottom);
        let bedrock = self.noise.height(x, z, &layers.bedrock);
        let cave = self
            .noise
            .fbm_3d(x as f64, y as f64, z as f64, &layers.caves) as i64;

        if y == bedrock {
            VoxelType::OBSIDIAN
        } else if y < bedrock {
            VoxelType::AIR
        } else if (cave as f64) < layers.caves.probability {
            VoxelType::AIR
        } else if y == surface {
            VoxelType::GRASS
        } else if y < diamond_top
            && y > diamond_bottom
            && rng.f64() <= layers.diamond_top.probability
        {
            VoxelType::DIAMOND
        } else if y < stone {
            VoxelType::STONE
        } else if y < surface {
            VoxelType::DIRT
        } else {
            VoxelType::AIR
        }
    }

    /// Fills a voxel array for the chunk at `location` (absolute origin).
    ///
    /// Every cell gets an independent random stream seeded from `build_seed`,
    /// so two builds with the same seed produce identical arrays.
    pub fn generate(
        &self,
        location: Point3<i32>,
        dimensions: ChunkDimensions,
        build_seed: u64,
    ) -> Vec<VoxelType> {
        let count = dimensions.volume();
        let mut seeder = fastrand::Rng::with_seed(build_seed);
        let cell_seeds: Vec<u64> = (0..count).map(|_| seeder.u64(..)).collect();

        let mut voxels = vec![VoxelType::AIR; count];
        voxels
            .par_iter_mut()
            .zip(cell_seeds.into_par_iter())
            .enumerate()
            .for_each(|(index, (voxel, cell_seed))| {
                let local = dimensions.coordinate_of(index);
                let position = Point3::new(
                    location.x as i64 + local.x as i64,
                    location.y as i64 + local.y as i64,
                    location.z as i64 + local.z as i64,
                );
                let mut rng = fastrand::Rng::with_seed(cell_seed);
                *voxel = self.classify(position, &mut rng);
            });

        voxels
    }
}

/// Builds complete chunks: generation followed by meshing and assembly.
///
/// Cheap to clone, so each background task can own one.
#[derive(Clone)]
pub struct ChunkBuilder {
    field: DensityField,
    dimensions: ChunkDimensions,
}

impl ChunkBuilder {
    pub fn new(field: DensityField, dimensions: ChunkDimensions) -> Self {
        ChunkBuilder { field, dimensions }
    }

    pub fn dimensions(&self) -> ChunkDimensions {
        self.dimensions
    }

    pub fn field(&self) -> &DensityField {
        &self.field
    }

    /// Builds the chunk at `location` with an explicit per-build seed.
    pub fn build_seeded(&self, location: Point3<i32>, build_seed: u64) -> Chunk {
        let voxels = self.field.generate(location, self.dimensions, build_seed);
        Chunk::from_voxels(location, self.dimensions, voxels)
    }

    /// Builds the chunk at `location` with a fresh random build seed.
    pub fn build(&self, location: Point3<i32>) -> Chunk {
        self.build_seeded(location, fastrand::u64(..))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::voxels::noise::NoiseLayerConfig;

    fn flat(offset: f64, probability: f64) -> NoiseLayerConfig {
        NoiseLayerConfig::new(0.01, 1.0, offset, 0, probability)
    }

    /// Constant layers: bedrock 0, diamond band (1, 4), stone 5, surface 8.
    fn flat_layers(diamond_probability: f64, cave_offset: f64) -> Arc<NoiseLayers> {
        Arc::new(NoiseLayers {
            surface: flat(8.0, 1.0),
            stone: flat(5.0, 1.0),
            diamond_top: flat(4.0, diamond_probability),
            diamond_bottom: flat(1.0, 1.0),
            bedrock: flat(0.0, 1.0),
            caves: flat(cave_offset, 1.0),
        })
    }

    fn column(field: &DensityField) -> Vec<VoxelType> {
        let dims = ChunkDimensions::new(1, 12, 1);
        field.generate(Point3::new(3, -2, 9), dims, 11)
    }

    #[test]
    fn test_layer_classification() {
        let field = DensityField::new(0, flat_layers(-1.0, 10.0));
        let voxels = column(&field);

        // voxels[i] is y = i - 2
        assert_eq!(voxels[0], VoxelType::AIR);
        assert_eq!(voxels[1], VoxelType::AIR);
        assert_eq!(voxels[2], VoxelType::OBSIDIAN);
        for y in 1..5 {
            assert_eq!(voxels[(y + 2) as usize], VoxelType::STONE, "y = {}", y);
        }
        for y in 5..8 {
            assert_eq!(voxels[(y + 2) as usize], VoxelType::DIRT, "y = {}", y);
        }
        assert_eq!(voxels[10], VoxelType::GRASS);
        assert_eq!(voxels[11], VoxelType::AIR);
    }

    #[test]
    fn test_diamond_band_is_exclusive() {
        let field = DensityField::new(0, flat_layers(1.0, 10.0));
        let voxels = column(&field);

        assert_eq!(voxels[3], VoxelType::STONE); // y = 1, band bottom
        assert_eq!(voxels[4], VoxelType::DIAMOND);
        assert_eq!(voxels[5], VoxelType::DIAMOND);
        assert_eq!(voxels[6], VoxelType::STONE); // y = 4, band top
    }

    #[test]
    fn test_caves_carve_everything_above_bedrock() {
        let field = DensityField::new(0, flat_layers(1.0, 0.0));
        let voxels = column(&field);

        assert_eq!(voxels[2], VoxelType::OBSIDIAN);
        assert!(voxels[3..].iter().all(|v| *v == VoxelType::AIR));
    }

    #[test]
    fn test_same_build_seed_is_reproducible() {
        let mut layers = NoiseLayers::default();
        layers.diamond_top = NoiseLayerConfig::new(0.03, 0.0, 30.0, 0, 0.5);
        layers.diamond_bottom = NoiseLayerConfig::new(0.03, 0.0, -30.0, 0, 1.0);
        let field = DensityField::new(5, Arc::new(layers));
        let dims = ChunkDimensions::new(6, 6, 6);
        let location = Point3::new(12, 0, -6);

        let a = field.generate(location, dims, 99);
        let b = field.generate(location, dims, 99);
        assert_eq!(a, b);
    }

    #[test]
    fn test_degenerate_chunk_is_empty() {
        let field = DensityField::new(0, Arc::new(NoiseLayers::default()));
        let voxels = field.generate(Point3::new(0, 0, 0), ChunkDimensions::new(0, 10, 10), 1);
        assert!(voxels.is_empty());
    }

    #[test]
    fn test_builder_meshes_generated_chunk() {
        let builder = ChunkBuilder::new(
            DensityField::new(0, flat_layers(-1.0, 10.0)),
            ChunkDimensions::new(4, 12, 4),
        );
        let chunk = builder.build_seeded(Point3::new(0, -2, 0), 3);

        // solid from bedrock (y = 0) to grass (y = 8)
        assert_eq!(chunk.meshable_count(), 4 * 9 * 4);
        assert!(!chunk.fragments.is_empty());
        assert!(chunk.fragments.len() <= chunk.meshable_count());
    }
}
