//! Chunk - a fixed square tile of atoms.
//!
//! A chunk owns its atoms, its dirty area and its neighbor links. Chunks are
//! created once per region and live as long as the [`Space`] does; only
//! their contents change.
//!
//! [`Space`]: crate::world::Space

use serde::{Deserialize, Serialize};

use crate::atom::{Atom, AtomRecord};
use crate::coords::{CHUNK_AREA, CHUNK_SIZE, Coord, batch_index};
use crate::primitives::{CoordRect, DirtyArea, Neighborhood, Surface};

/// Index of a chunk in the [`Space`](crate::world::Space) arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChunkId(pub(crate) u32);

impl ChunkId {
  #[inline]
  pub fn index(self) -> usize {
    self.0 as usize
  }
}

/// Index of a region in the [`Space`](crate::world::Space) arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RegionId(pub(crate) u32);

impl RegionId {
  #[inline]
  pub fn index(self) -> usize {
    self.0 as usize
  }
}

/// Flat snapshot of a chunk's atoms in row-major order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChunkSnapshot {
  pub atoms: Vec<AtomRecord>,
}

/// Snapshot length did not match the chunk area.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SnapshotSizeError {
  pub expected: usize,
  pub actual: usize,
}

impl std::fmt::Display for SnapshotSizeError {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(
      f,
      "chunk snapshot has {} atoms, expected {}",
      self.actual, self.expected
    )
  }
}

impl std::error::Error for SnapshotSizeError {}

/// A square tile of [`CHUNK_SIZE`]² atoms.
pub struct Chunk {
  atoms: Surface<Atom>,
  region: RegionId,
  /// Position within the region, `0..CHUNKS_PER_REGION`.
  regional_index: Coord,
  /// World cell of the bottom-left atom.
  spatial_origin: Coord,
  neighborhood: Neighborhood,
  dirty: DirtyArea,
  batch: u8,
  collider_pending: bool,
}

impl Chunk {
  /// Creates an empty chunk at `regional_index` inside the region whose
  /// bottom-left world cell is `region_origin`.
  pub fn new(region: RegionId, regional_index: Coord, region_origin: Coord) -> Self {
    let spatial_origin = region_origin + regional_index * CHUNK_SIZE;
    Self {
      atoms: Surface::new(CHUNK_SIZE as u32, CHUNK_SIZE as u32),
      region,
      regional_index,
      spatial_origin,
      neighborhood: Neighborhood::default(),
      dirty: DirtyArea::clean(),
      batch: batch_index(spatial_origin.div_euclid(Coord::splat(CHUNK_SIZE))),
      collider_pending: false,
    }
  }

  #[inline]
  pub fn region(&self) -> RegionId {
    self.region
  }

  #[inline]
  pub fn regional_index(&self) -> Coord {
    self.regional_index
  }

  #[inline]
  pub fn spatial_origin(&self) -> Coord {
    self.spatial_origin
  }

  /// Chunk grid position in the world.
  #[inline]
  pub fn spatial_index(&self) -> Coord {
    self.spatial_origin.div_euclid(Coord::splat(CHUNK_SIZE))
  }

  /// Checkerboard batch, 0..4.
  #[inline]
  pub fn batch_index(&self) -> u8 {
    self.batch
  }

  #[inline]
  pub fn neighborhood(&self) -> &Neighborhood {
    &self.neighborhood
  }

  #[inline]
  pub(crate) fn neighborhood_mut(&mut self) -> &mut Neighborhood {
    &mut self.neighborhood
  }

  #[inline]
  pub fn dirty_area(&self) -> &DirtyArea {
    &self.dirty
  }

  /// Marks a chunk-local rect dirty and flags the collider for rebuild.
  pub fn mark_dirty(&mut self, rect: CoordRect, safe: bool) {
    if self.dirty.mark(rect, safe) {
      self.collider_pending = true;
    }
  }

  /// Marks the whole chunk dirty.
  pub fn mark_all_dirty(&mut self) {
    self.dirty.mark_full();
    self.collider_pending = true;
  }

  /// Deactivates the dirty area, returning the rect to process.
  #[inline]
  pub(crate) fn take_dirty(&mut self) -> Option<CoordRect> {
    self.dirty.take()
  }

  #[inline]
  pub fn collider_pending(&self) -> bool {
    self.collider_pending
  }

  #[inline]
  pub(crate) fn clear_collider_pending(&mut self) {
    self.collider_pending = false;
  }

  /// Atom at a chunk-local cell. Panics outside the chunk.
  #[inline]
  pub fn atom(&self, local: Coord) -> Atom {
    self.atoms[local]
  }

  #[inline]
  pub fn get_atom(&self, local: Coord) -> Option<&Atom> {
    self.atoms.get(local)
  }

  /// Overwrites a cell without touching the dirty area. Returns `false`
  /// outside the chunk.
  #[inline]
  pub fn set_atom(&mut self, local: Coord, atom: Atom) -> bool {
    self.atoms.set(local, atom)
  }

  #[inline]
  pub fn atoms(&self) -> &[Atom] {
    self.atoms.as_slice()
  }

  #[inline]
  pub(crate) fn atoms_mut(&mut self) -> &mut [Atom] {
    self.atoms.as_slice_mut()
  }

  pub fn snapshot(&self) -> ChunkSnapshot {
    ChunkSnapshot {
      atoms: self.atoms().iter().map(AtomRecord::from).collect(),
    }
  }

  /// Replaces every atom from a snapshot and marks the chunk fully dirty.
  pub fn restore(&mut self, snapshot: &ChunkSnapshot) -> Result<(), SnapshotSizeError> {
    if snapshot.atoms.len() != CHUNK_AREA {
      return Err(SnapshotSizeError {
        expected: CHUNK_AREA,
        actual: snapshot.atoms.len(),
      });
    }
    for (slot, record) in self.atoms_mut().iter_mut().zip(&snapshot.atoms) {
      *slot = Atom::from(record);
    }
    self.mark_all_dirty();
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use bevy::math::IVec2;

  use super::*;
  use crate::matter::MatterId;

  fn chunk_at(regional: IVec2) -> Chunk {
    Chunk::new(RegionId(0), regional, IVec2::new(-512, 0))
  }

  #[test]
  fn test_spatial_origin_and_batch() {
    let chunk = chunk_at(IVec2::new(3, 2));
    assert_eq!(chunk.spatial_origin(), IVec2::new(-512 + 192, 128));
    assert_eq!(chunk.spatial_index(), IVec2::new(-5, 2));
    assert_eq!(chunk.batch_index(), 1);
  }

  #[test]
  fn test_mark_dirty_flags_collider() {
    let mut chunk = chunk_at(IVec2::ZERO);
    assert!(!chunk.collider_pending());
    chunk.mark_dirty(CoordRect::around(IVec2::new(-4, -4), 1), true);
    assert!(!chunk.collider_pending());
    chunk.mark_dirty(CoordRect::around(IVec2::new(4, 4), 1), true);
    assert!(chunk.collider_pending());
    assert!(chunk.dirty_area().is_active());
  }

  #[test]
  fn test_snapshot_restore() {
    let mut source = chunk_at(IVec2::ZERO);
    let atom = Atom {
      matter: MatterId(2),
      color: crate::render::rgb(10, 20, 30),
      temperature: 5.0,
      velocity: bevy::math::Vec2::ZERO,
    };
    source.set_atom(IVec2::new(7, 9), atom);
    let snapshot = source.snapshot();
    assert_eq!(snapshot.atoms.len(), CHUNK_AREA);

    let mut target = chunk_at(IVec2::new(1, 1));
    target.restore(&snapshot).unwrap();
    assert_eq!(target.atom(IVec2::new(7, 9)), atom);
    assert_eq!(target.atoms().iter().filter(|a| !a.is_empty()).count(), 1);
    assert!(target.dirty_area().is_active());
  }

  #[test]
  fn test_restore_rejects_wrong_size() {
    let mut chunk = chunk_at(IVec2::ZERO);
    let err = chunk
      .restore(&ChunkSnapshot { atoms: Vec::new() })
      .unwrap_err();
    assert_eq!(err.actual, 0);
    assert_eq!(err.expected, CHUNK_AREA);
  }
}
