//! Region - a fixed grid of chunks plus its pixel buffer.

use crate::coords::{CHUNKS_IN_REGION, CHUNKS_PER_REGION, Coord, REGION_SIZE};
use crate::primitives::ChunkId;
use crate::render::{RegionPixels, region_pixels};

/// Lifecycle of a region.
///
/// ```text
/// PendingInitialization → PendingGeneration | PendingLoading → Active ⇄ Sleeping
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum RegionState {
  #[default]
  PendingInitialization,
  PendingGeneration,
  PendingLoading,
  /// Simulated and rendered.
  Active,
  /// Kept in memory, skipped by every pass.
  Sleeping,
}

impl RegionState {
  /// Whether the lifecycle allows moving from `self` to `next`.
  pub fn can_become(self, next: RegionState) -> bool {
    use RegionState::*;
    matches!(
      (self, next),
      (PendingInitialization, PendingGeneration | PendingLoading)
        | (PendingGeneration | PendingLoading, Active)
        | (Active, Sleeping)
        | (Sleeping, Active)
    )
  }
}

/// A [`CHUNKS_PER_REGION`]² block of chunks.
pub struct Region {
  index: Coord,
  /// Row-major, `y * CHUNKS_PER_REGION + x`.
  chunks: Vec<ChunkId>,
  state: RegionState,
  pixels: RegionPixels,
}

impl Region {
  pub(crate) fn new(index: Coord, chunks: Vec<ChunkId>) -> Self {
    debug_assert_eq!(chunks.len(), CHUNKS_IN_REGION);
    Self {
      index,
      chunks,
      state: RegionState::PendingInitialization,
      pixels: region_pixels(),
    }
  }

  /// Region grid position.
  #[inline]
  pub fn index(&self) -> Coord {
    self.index
  }

  /// World cell of the bottom-left corner.
  #[inline]
  pub fn origin(&self) -> Coord {
    self.index * REGION_SIZE
  }

  /// Ordering key used to keep the region list sorted, given the width of
  /// the region bounds.
  #[inline]
  pub fn sorting_weight(&self, width: i32) -> i64 {
    sorting_weight(self.index, width)
  }

  #[inline]
  pub fn state(&self) -> RegionState {
    self.state
  }

  #[inline]
  pub(crate) fn set_state(&mut self, state: RegionState) {
    self.state = state;
  }

  #[inline]
  pub fn chunk_ids(&self) -> &[ChunkId] {
    &self.chunks
  }

  /// Chunk at a position inside the region.
  #[inline]
  pub fn chunk_at(&self, regional: Coord) -> Option<ChunkId> {
    if regional.cmplt(Coord::ZERO).any() || regional.cmpge(Coord::splat(CHUNKS_PER_REGION)).any() {
      return None;
    }
    self
      .chunks
      .get((regional.y * CHUNKS_PER_REGION + regional.x) as usize)
      .copied()
  }

  #[inline]
  pub fn pixels(&self) -> &RegionPixels {
    &self.pixels
  }

  #[inline]
  pub(crate) fn chunks_and_pixels_mut(&mut self) -> (&[ChunkId], &mut RegionPixels) {
    (&self.chunks, &mut self.pixels)
  }
}

/// `width * index.y + index.x`.
#[inline]
pub fn sorting_weight(index: Coord, width: i32) -> i64 {
  width as i64 * index.y as i64 + index.x as i64
}
