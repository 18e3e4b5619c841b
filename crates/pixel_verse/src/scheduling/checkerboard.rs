//! 2x2 checkerboard scheduling.
//!
//! Chunks are split into four batches by the parity of their grid
//! position. Chunks in the same batch are never adjacent, so each batch
//! runs fully in parallel; batches run one after another.
//!
//! Dirty marks produced by a task are collected in [`DirtyMarks`] and
//! applied once all four batches are done. Two chunks of one batch may
//! share a neighbor, so neither writes that neighbor's dirty area directly.
//! A mark landing on a chunk of a later batch must also survive that
//! batch: it is not swept again this tick, but stays active for rendering
//! and the next tick.

use rayon::prelude::*;

use super::canvas::Canvas;
use crate::primitives::{ChunkId, CoordRect, DirtyArea, Neighborhood};
use crate::world::{RegionState, Space};

/// Dirty marks collected while processing one chunk.
pub struct DirtyMarks<'n> {
  neighborhood: &'n Neighborhood,
  own: DirtyArea,
  foreign: Vec<(ChunkId, CoordRect)>,
}

impl<'n> DirtyMarks<'n> {
  pub fn new(neighborhood: &'n Neighborhood) -> Self {
    Self {
      neighborhood,
      own: DirtyArea::clean(),
      foreign: Vec::new(),
    }
  }

  /// Marks a chunk-local rect. Parts overhanging the chunk go to the
  /// neighbors they reach.
  pub fn mark(&mut self, rect: CoordRect) {
    self.own.mark(rect, true);
    self.foreign.extend(self.neighborhood.overflow(rect));
  }

  pub fn own(&self) -> &DirtyArea {
    &self.own
  }

  pub fn foreign(&self) -> &[(ChunkId, CoordRect)] {
    &self.foreign
  }

  fn into_parts(self) -> (DirtyArea, Vec<(ChunkId, CoordRect)>) {
    (self.own, self.foreign)
  }
}

/// Runs `process` over every dirty chunk of every active region, one batch
/// at a time.
///
/// Each chunk's dirty area is taken before its batch starts, so
/// `process` receives the rect to sweep and records new marks in a fresh
/// [`DirtyMarks`]. Marks only reach the dirty areas after the last batch.
#[cfg_attr(feature = "tracy", tracing::instrument(skip_all))]
pub fn run_batches<F>(space: &mut Space, process: F)
where
  F: Fn(&Canvas<'_>, ChunkId, CoordRect, &mut DirtyMarks<'_>) + Sync,
{
  let (batches, regions, chunks) = space.batches_and_chunks_mut();
  let mut pending: Vec<(ChunkId, DirtyArea, Vec<(ChunkId, CoordRect)>)> = Vec::new();

  for batch in batches.iter() {
    let work: Vec<(ChunkId, CoordRect)> = batch
      .iter()
      .filter_map(|&id| {
        let chunk = &mut chunks[id.index()];
        if regions[chunk.region().index()].state() != RegionState::Active {
          return None;
        }
        chunk.take_dirty().map(|rect| (id, rect))
      })
      .collect();
    if work.is_empty() {
      continue;
    }

    let canvas = Canvas::new(chunks);
    let outcomes: Vec<_> = work
      .par_iter()
      .map(|&(id, rect)| {
        let mut marks = DirtyMarks::new(canvas.neighborhood(id));
        process(&canvas, id, rect, &mut marks);
        let (own, foreign) = marks.into_parts();
        (id, own, foreign)
      })
      .collect();
    pending.extend(outcomes);
  }

  for (id, own, foreign) in pending {
    if let Some(rect) = own.rect() {
      chunks[id.index()].mark_dirty(rect, false);
    }
    for (other, rect) in foreign {
      chunks[other.index()].mark_dirty(rect, true);
    }
  }
}
