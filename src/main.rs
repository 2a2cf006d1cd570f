//! # Voxel Terrain Demo
//!
//! Builds a world and streams it around an orbiting viewer. Pass a JSON
//! world config path as the first argument to override the defaults.
//!
//! ## Usage
//!
//! ```bash
//! RUST_LOG=info cargo run --release -- world.json
//! ```

fn main() {
    voxel_terrain::run();
}
