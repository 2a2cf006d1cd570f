//! # Chunk Iteration Module
//!
//! Conversions between a chunk's flat voxel index and its local coordinate,
//! and an iterator over every local coordinate in storage order.
//!
//! Storage order is x-fastest: `index = x + width * (y + height * z)`.

use cgmath::Point3;

use super::ChunkDimensions;

/// An iterator over every local coordinate of a chunk, in storage order.
///
/// Yields `width * height * depth` coordinates, so a degenerate chunk
/// (any dimension zero) yields nothing.
pub struct LocalCoordinates {
    dimensions: ChunkDimensions,
    next_index: usize,
    len: usize,
}

impl LocalCoordinates {
    /// Creates an iterator over all cells of a chunk with `dimensions`.
    pub fn new(dimensions: ChunkDimensions) -> Self {
        LocalCoordinates {
            dimensions,
            next_index: 0,
            len: dimensions.volume(),
        }
    }
}

impl Iterator for LocalCoordinates {
    type Item = Point3<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next_index >= self.len {
            return None;
        }
        let coordinate = self.dimensions.coordinate_of(self.next_index);
        self.next_index += 1;
        Some(coordinate)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.len - self.next_index;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for LocalCoordinates {}

impl ChunkDimensions {
    /// Flat index of a local coordinate.
    #[inline]
    pub fn index_of(&self, local: Point3<usize>) -> usize {
        local.x + self.width * (local.y + self.height * local.z)
    }

    /// Local coordinate of a flat index. `index` must be below `volume()`.
    #[inline]
    pub fn coordinate_of(&self, index: usize) -> Point3<usize> {
        Point3::new(
            index % self.width,
            (index / self.width) % self.height,
            index / (self.width * self.height),
        )
    }

    /// Flat index of a signed local coordinate, or `None` outside the chunk.
    #[inline]
    pub fn checked_index(&self, local: Point3<i64>) -> Option<usize> {
        if self.contains(local) {
            Some(self.index_of(local.cast::<usize>()?))
        } else {
            None
        }
    }

    /// Whether a signed local coordinate lies inside the chunk.
    #[inline]
    pub fn contains(&self, local: Point3<i64>) -> bool {
        (0..self.width as i64).contains(&local.x)
            && (0..self.height as i64).contains(&local.y)
            && (0..self.depth as i64).contains(&local.z)
    }

    /// Iterates every local coordinate in storage order.
    pub fn coordinates(&self) -> LocalCoordinates {
        LocalCoordinates::new(*self)
    }
}
