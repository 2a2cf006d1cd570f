//! # Voxel Terrain
//!
//! This module holds the voxel side of the engine: what a voxel is, how a
//! chunk of them is generated and stored, the registry of chunks, and the
//! streaming and editing that act on it.
//!
//! ## Architecture
//!
//! * **Block**: Voxel types, their faces and the atlas cells they sample
//! * **Noise**: Layered Perlin noise driving every terrain decision
//! * **Chunk**: Fixed-size voxel arrays and the density field that fills them
//! * **World**: The registry of chunks and their build lifecycle
//! * **Streaming**: Keeps the columns around the viewer built and visible
//! * **Edit**: Removes and places voxels from a ray hit
//! * **Tasks**: Background chunk builds
//!
//! ## Data Flow
//!
//! 1. The streamer decides which columns should exist around the viewer
//! 2. Build tasks generate, mesh and assemble each chunk on a worker
//! 3. Results land in the world on the owning thread
//! 4. Edits mutate a ready chunk in place and rebuild only its mesh

pub mod block;
pub mod chunk;
pub mod edit;
pub mod noise;
pub mod streaming;
pub mod tasks;
pub mod world;
