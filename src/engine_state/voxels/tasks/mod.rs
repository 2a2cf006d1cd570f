//! # Voxel Task System
//!
//! Background tasks for world generation. Chunk builds run here so the
//! streaming loop never blocks on noise evaluation or meshing.

pub mod chunk_generation_task;
