//! Per-chunk dirty area.
//!
//! Tracks the bounding rect of cells that changed since the chunk was last
//! simulated. The rect is in chunk-local coordinates.

use crate::coords::CHUNK_SIZE;
use crate::primitives::CoordRect;

/// Every cell of a chunk.
pub const CHUNK_BOUNDS: CoordRect = CoordRect::square(CHUNK_SIZE);

/// Bounding rect of pending changes inside one chunk.
///
/// An active area always lies inside [`CHUNK_BOUNDS`]. An inactive area has
/// no rect at all.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DirtyArea {
  rect: Option<CoordRect>,
}

impl DirtyArea {
  /// Inactive area.
  pub const fn clean() -> Self {
    Self { rect: None }
  }

  /// Area covering the whole chunk.
  pub const fn full() -> Self {
    Self {
      rect: Some(CHUNK_BOUNDS),
    }
  }

  #[inline]
  pub fn is_active(&self) -> bool {
    self.rect.is_some()
  }

  #[inline]
  pub fn rect(&self) -> Option<CoordRect> {
    self.rect
  }

  /// Adds `rect` to the area.
  ///
  /// With `safe` the rect is first clipped to the chunk; a rect entirely
  /// outside is ignored. Without `safe` the caller guarantees containment.
  /// Returns false if nothing was marked.
  pub fn mark(&mut self, rect: CoordRect, safe: bool) -> bool {
    let rect = if safe {
      match rect.intersection(&CHUNK_BOUNDS) {
        Some(clipped) => clipped,
        None => return false,
      }
    } else {
      debug_assert!(
        CHUNK_BOUNDS.contains_rect(&rect),
        "unsafe dirty mark {rect:?} exceeds chunk bounds"
      );
      rect
    };

    self.rect = Some(match self.rect {
      Some(current) => current.union(&rect),
      None => rect,
    });
    true
  }

  pub fn mark_full(&mut self) {
    self.rect = Some(CHUNK_BOUNDS);
  }

  /// Deactivates the area and returns the rect it held.
  #[inline]
  pub fn take(&mut self) -> Option<CoordRect> {
    self.rect.take()
  }
}
