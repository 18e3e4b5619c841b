//! Coordinate types and conversions for the world → region → chunk hierarchy.
//!
//! All cell coordinates are integers with Y+ up. World cells are grouped into
//! chunks of [`CHUNK_SIZE`]² cells, and chunks are grouped into regions of
//! [`CHUNKS_PER_REGION`]² chunks.
//!
//! ```text
//! world cell  ──div_euclid(REGION_SIZE)──▶ region index
//!             ──rem_euclid(REGION_SIZE)──▶ region-local cell
//! region cell ──div(CHUNK_SIZE)──────────▶ chunk index within region
//!             ──rem(CHUNK_SIZE)──────────▶ chunk-local cell
//! ```

use bevy::math::{IVec2, Vec2};

/// Integer cell coordinate.
pub type Coord = IVec2;

/// Chunk edge length in cells.
pub const CHUNK_SIZE: i32 = 64;

/// Number of chunks along a region edge.
pub const CHUNKS_PER_REGION: i32 = 8;

/// Region edge length in cells.
pub const REGION_SIZE: i32 = CHUNK_SIZE * CHUNKS_PER_REGION;

/// Number of cells in one chunk.
pub const CHUNK_AREA: usize = (CHUNK_SIZE * CHUNK_SIZE) as usize;

/// Number of chunks in one region.
pub const CHUNKS_IN_REGION: usize = (CHUNKS_PER_REGION * CHUNKS_PER_REGION) as usize;

/// Default conversion factor between world-space meters and cells.
pub const DEFAULT_CELLS_PER_METER: f32 = 20.0;

/// Returns the index of the region containing a world cell.
#[inline]
pub fn world_to_region(coord: Coord) -> Coord {
  coord.div_euclid(IVec2::splat(REGION_SIZE))
}

/// Returns the region-local cell (0..REGION_SIZE) of a world cell.
#[inline]
pub fn world_to_region_local(coord: Coord) -> Coord {
  coord.rem_euclid(IVec2::splat(REGION_SIZE))
}

/// Returns the chunk index (0..CHUNKS_PER_REGION) containing a region-local
/// cell.
#[inline]
pub fn region_to_chunk(local: Coord) -> Coord {
  local.div_euclid(IVec2::splat(CHUNK_SIZE))
}

/// Returns the chunk-local cell (0..CHUNK_SIZE) of any cell coordinate.
#[inline]
pub fn chunk_local(coord: Coord) -> Coord {
  coord.rem_euclid(IVec2::splat(CHUNK_SIZE))
}

/// Row-major index of a chunk-local cell.
#[inline]
pub fn cell_index(local: Coord) -> usize {
  (local.y * CHUNK_SIZE + local.x) as usize
}

/// Returns true if a coordinate lies inside `0..CHUNK_SIZE` on both axes.
#[inline]
pub fn in_chunk(local: Coord) -> bool {
  local.x >= 0 && local.y >= 0 && local.x < CHUNK_SIZE && local.y < CHUNK_SIZE
}

/// Checkerboard batch (0..4) of a chunk grid position.
///
/// Adjacent chunks, diagonals included, never share a batch.
#[inline]
pub fn batch_index(chunk_pos: Coord) -> u8 {
  (((chunk_pos.y & 1) << 1) | (chunk_pos.x & 1)) as u8
}

/// Converts a world-space position (meters) to a cell coordinate.
#[inline]
pub fn world_to_space(pos: Vec2, origin: Vec2, cells_per_meter: f32) -> Coord {
  ((pos - origin) * cells_per_meter).floor().as_ivec2()
}

/// Converts a cell coordinate to the world-space position of its
/// bottom-left corner.
#[inline]
pub fn space_to_world(coord: Coord, origin: Vec2, cells_per_meter: f32) -> Vec2 {
  coord.as_vec2() / cells_per_meter + origin
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_negative_coords_floor() {
    assert_eq!(world_to_region(IVec2::new(-1, -1)), IVec2::new(-1, -1));
    assert_eq!(
      world_to_region_local(IVec2::new(-1, -1)),
      IVec2::splat(REGION_SIZE - 1)
    );
    assert_eq!(chunk_local(IVec2::new(-1, 64)), IVec2::new(63, 0));
  }

  #[test]
  fn test_hierarchy_roundtrip() {
    let coord = IVec2::new(1234, -777);
    let region = world_to_region(coord);
    let local = world_to_region_local(coord);
    let chunk = region_to_chunk(local);
    let cell = chunk_local(local);
    assert_eq!(region * REGION_SIZE + chunk * CHUNK_SIZE + cell, coord);
  }

  #[test]
  fn test_cell_index_is_row_major() {
    assert_eq!(cell_index(IVec2::new(0, 0)), 0);
    assert_eq!(cell_index(IVec2::new(63, 0)), 63);
    assert_eq!(cell_index(IVec2::new(0, 1)), 64);
    assert_eq!(cell_index(IVec2::new(63, 63)), 4095);
  }

  #[test]
  fn test_batch_index_parity() {
    assert_eq!(batch_index(IVec2::new(0, 0)), 0);
    assert_eq!(batch_index(IVec2::new(1, 0)), 1);
    assert_eq!(batch_index(IVec2::new(0, 1)), 2);
    assert_eq!(batch_index(IVec2::new(1, 1)), 3);
    assert_eq!(batch_index(IVec2::new(-1, -1)), 3);
  }

  #[test]
  fn test_world_to_space_floors() {
    let cell = world_to_space(Vec2::new(-0.01, 0.26), Vec2::ZERO, 20.0);
    assert_eq!(cell, IVec2::new(-1, 5));
    let back = space_to_world(IVec2::new(20, -20), Vec2::new(1.0, 1.0), 20.0);
    assert_eq!(back, Vec2::new(2.0, 0.0));
  }
}
