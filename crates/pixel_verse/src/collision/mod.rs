//! Collision contours for pixel terrain.
//!
//! Chunks flagged with a pending collider rebuild are turned into closed
//! rings using marching squares contour extraction, with optional
//! Douglas-Peucker simplification.
//!
//! # Architecture
//!
//! 1. Every accepted dirty mark flags its chunk for a collider rebuild
//! 2. After physics, each flagged chunk of an active region is sampled into
//!    a solidity grid padded with one empty cell on every side
//! 3. Marching squares turns the grid into oriented segments, which are
//!    chained into rings in world cell units
//! 4. The rings are published; the flag is cleared
//!
//! # Usage
//!
//! ```ignore
//! app.insert_resource(CollisionConfig {
//!     collidable_state: MatterState::Solid,
//!     simplify_tolerance: 0.5,
//! });
//! ```

mod marching;
mod simplify;

use bevy::math::Vec2;
use bevy::prelude::Resource;
pub use marching::{
  EDGE_TABLE, EdgeSegment, NE, NW, SE, SW, connect_segments, marching_squares, segments,
  segments_for_case, signed_area,
};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
pub use simplify::{douglas_peucker, simplify_rings};

use crate::coords::{CHUNK_SIZE, Coord};
use crate::matter::{MatterState, Matters};
use crate::primitives::{Chunk, ChunkId, Surface};
use crate::world::{RegionState, Space};

/// Configuration for contour extraction.
#[derive(Resource, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollisionConfig {
  /// Atoms of this state count as solid.
  /// Default: solid
  pub collidable_state: MatterState,

  /// Douglas-Peucker tolerance in cells; `0` keeps every vertex.
  /// Default: 0.0
  pub simplify_tolerance: f32,
}

impl Default for CollisionConfig {
  fn default() -> Self {
    Self {
      collidable_state: MatterState::Solid,
      simplify_tolerance: 0.0,
    }
  }
}

/// Contour rings of one chunk.
#[derive(Clone, Debug, PartialEq)]
pub struct ChunkContours {
  pub chunk: ChunkId,
  /// World cell origin of the chunk.
  pub origin: Coord,
  /// Closed rings in world cell units. Outlines of solid areas run
  /// counter-clockwise, holes clockwise.
  pub rings: Vec<Vec<Vec2>>,
}

/// Samples a chunk into a `(CHUNK_SIZE + 2)²` grid with an empty border.
pub fn solidity_grid(chunk: &Chunk, matters: &Matters, collidable: MatterState) -> Surface<bool> {
  let size = (CHUNK_SIZE + 2) as u32;
  let mut grid = Surface::new(size, size);
  for y in 0..CHUNK_SIZE {
    for x in 0..CHUNK_SIZE {
      let local = Coord::new(x, y);
      let solid = matters.state_of(chunk.atom(local).matter) == Some(collidable);
      grid.set(local + Coord::ONE, solid);
    }
  }
  grid
}

/// Extracts the rings of one chunk.
pub fn chunk_contours(
  id: ChunkId,
  chunk: &Chunk,
  matters: &Matters,
  config: &CollisionConfig,
) -> ChunkContours {
  let grid = solidity_grid(chunk, matters, config.collidable_state);
  let rings = marching_squares(&grid, chunk.spatial_origin().as_vec2());
  let rings = if config.simplify_tolerance > 0.0 {
    simplify_rings(rings, config.simplify_tolerance)
  } else {
    rings
  };
  ChunkContours {
    chunk: id,
    origin: chunk.spatial_origin(),
    rings,
  }
}

/// Rebuilds contours of every flagged chunk in an active region and clears
/// the flags.
#[cfg_attr(feature = "tracy", tracing::instrument(skip_all))]
pub fn rebuild_contours(
  space: &mut Space,
  matters: &Matters,
  config: &CollisionConfig,
) -> Vec<ChunkContours> {
  let pending: Vec<ChunkId> = space
    .chunks()
    .iter()
    .enumerate()
    .filter(|(_, chunk)| {
      chunk.collider_pending()
        && space
          .region(chunk.region())
          .is_some_and(|r| r.state() == RegionState::Active)
    })
    .map(|(i, _)| ChunkId(i as u32))
    .collect();

  if pending.is_empty() {
    return Vec::new();
  }

  let chunks = space.chunks();
  let contours: Vec<ChunkContours> = pending
    .par_iter()
    .map(|&id| chunk_contours(id, &chunks[id.index()], matters, config))
    .collect();

  for &id in &pending {
    if let Some(chunk) = space.chunk_mut(id) {
      chunk.clear_collider_pending();
    }
  }

  contours
}

#[cfg(test)]
mod tests {
  use bevy::math::IVec2;

  use super::*;

  #[test]
  fn test_rebuild_clears_flag_and_places_rings() {
    let matters = Matters::builtin();
    let stone = matters.id_of("stone").unwrap();
    let mut space = Space::default();
    space.instantiate_region(IVec2::ZERO).unwrap();
    space.activate_generated(IVec2::ZERO);
    space.create_atom(IVec2::new(70, 5), stone, &matters);

    let contours = rebuild_contours(&mut space, &matters, &CollisionConfig::default());
    assert_eq!(contours.len(), space.chunks().len());
    let with_rings: Vec<_> = contours.iter().filter(|c| !c.rings.is_empty()).collect();
    assert_eq!(with_rings.len(), 1);
    assert_eq!(with_rings[0].origin, IVec2::new(64, 0));
    assert!(with_rings[0].rings[0].contains(&Vec2::new(70.5, 5.0)));

    assert!(space.chunks().iter().all(|c| !c.collider_pending()));
    assert!(rebuild_contours(&mut space, &matters, &CollisionConfig::default()).is_empty());
  }

  #[test]
  fn test_pending_regions_are_skipped() {
    let matters = Matters::builtin();
    let mut space = Space::default();
    space.instantiate_region(IVec2::ZERO).unwrap();
    let id = space.locate(IVec2::new(1, 1)).unwrap().0;
    space.chunk_mut(id).unwrap().mark_all_dirty();
    assert!(rebuild_contours(&mut space, &matters, &CollisionConfig::default()).is_empty());
    assert!(space.chunk(id).unwrap().collider_pending());
  }
}
