//! Canvas - shared atom access for one checkerboard batch.
//!
//! The [`Canvas`] addresses atoms by chunk and chunk-local cell, following
//! neighbor links for cells that fall outside the chunk. It uses interior
//! mutability that is sound only when used with checkerboard scheduling.

use std::marker::PhantomData;

use crate::atom::Atom;
use crate::coords::{Coord, cell_index, in_chunk};
use crate::primitives::{Chunk, ChunkId, Locate, Neighborhood};

/// Cell address: owning chunk plus chunk-local coordinate.
pub type Cell = (ChunkId, Coord);

/// Hops a lookup may take before giving up. Motion is bounded well below a
/// chunk per tick, so real lookups need at most one.
const MAX_HOPS: usize = 3;

/// Atom storage of every chunk, writable from parallel tasks.
///
/// # Safety
/// This type provides interior mutability without runtime checks.
/// It is only safe to use with checkerboard scheduling, which guarantees
/// that chunks processed in the same batch never touch the same cell.
pub struct Canvas<'a> {
  atoms: Vec<*mut Atom>,
  neighborhoods: Vec<Neighborhood>,
  _marker: PhantomData<&'a mut [Chunk]>,
}

// SAFETY: Chunks of one batch are never adjacent and an atom moves less
// than half a chunk per tick, so parallel tasks never access the same cell.
unsafe impl Send for Canvas<'_> {}
unsafe impl Sync for Canvas<'_> {}

impl<'a> Canvas<'a> {
  /// Borrows every chunk for the lifetime of the canvas.
  pub fn new(chunks: &'a mut [Chunk]) -> Self {
    let mut atoms = Vec::with_capacity(chunks.len());
    let mut neighborhoods = Vec::with_capacity(chunks.len());
    for chunk in chunks.iter_mut() {
      neighborhoods.push(*chunk.neighborhood());
      atoms.push(chunk.atoms_mut().as_mut_ptr());
    }
    Self {
      atoms,
      neighborhoods,
      _marker: PhantomData,
    }
  }

  #[inline]
  pub fn neighborhood(&self, chunk: ChunkId) -> &Neighborhood {
    &self.neighborhoods[chunk.index()]
  }

  /// Resolves a possibly out-of-chunk coordinate to the chunk that holds
  /// it. `None` past the edge of the world.
  pub fn resolve(&self, chunk: ChunkId, local: Coord) -> Option<Cell> {
    let mut cell = (chunk, local);
    for _ in 0..MAX_HOPS {
      match self.neighborhood(cell.0).locate(cell.1) {
        Locate::Inside => return Some(cell),
        Locate::Neighbor(next, coord) => cell = (next, coord),
        Locate::Edge => return None,
      }
    }
    None
  }

  #[inline]
  fn slot(&self, cell: Cell) -> *mut Atom {
    debug_assert!(in_chunk(cell.1), "unresolved cell {cell:?}");
    // SAFETY: `cell.1` is inside the chunk, so the offset stays within the
    // chunk's atom buffer.
    unsafe { self.atoms[cell.0.index()].add(cell_index(cell.1)) }
  }

  /// Reads a resolved cell.
  #[inline]
  pub fn atom(&self, cell: Cell) -> Atom {
    // SAFETY: See the type-level safety note.
    unsafe { *self.slot(cell) }
  }

  /// Writes a resolved cell.
  #[inline]
  pub fn set(&self, cell: Cell, atom: Atom) {
    // SAFETY: See the type-level safety note.
    unsafe { *self.slot(cell) = atom }
  }

  /// Exchanges two resolved cells.
  #[inline]
  pub fn swap(&self, a: Cell, b: Cell) {
    if a == b {
      return;
    }
    // SAFETY: `a != b`, so the two slots are distinct. Checkerboard
    // scheduling guarantees no other task touches them.
    unsafe { std::ptr::swap(self.slot(a), self.slot(b)) }
  }
}
