//! Chunk neighbor linking.
//!
//! Links are wired once when a region is instantiated. Chunks are created
//! row by row, so inside a region every chunk can link back to its west,
//! south, south-west and south-east siblings as soon as it exists. Links
//! into other regions are patched afterwards for the boundary ring only.
//!
//! Every link is set on both ends in the same call.

use log::debug;

use crate::coords::{CHUNKS_PER_REGION, Coord};
use crate::primitives::{Chunk, ChunkId, Direction};

/// Directions a freshly created chunk can link to inside its region.
const BACKWARD: [Direction; 4] = [
  Direction::West,
  Direction::South,
  Direction::SouthWest,
  Direction::SouthEast,
];

/// Sets `a → b` along `direction` and `b → a` along its opposite.
pub(super) fn link(chunks: &mut [Chunk], a: ChunkId, direction: Direction, b: ChunkId) {
  chunks[a.index()].neighborhood_mut().set(direction, Some(b));
  chunks[b.index()]
    .neighborhood_mut()
    .set(direction.opposite(), Some(a));
}

/// Links a chunk at `regional` to its already-created siblings.
///
/// `created` is the region's chunk list so far, in creation order.
pub(super) fn link_inner(chunks: &mut [Chunk], created: &[ChunkId], regional: Coord, id: ChunkId) {
  for direction in BACKWARD {
    let other = regional + direction.offset();
    if other.x < 0 || other.y < 0 || other.x >= CHUNKS_PER_REGION {
      continue;
    }
    let slot = (other.y * CHUNKS_PER_REGION + other.x) as usize;
    if let Some(&other_id) = created.get(slot) {
      link(chunks, id, direction, other_id);
    }
  }
}

/// Whether a chunk at `regional` touches the region border.
#[inline]
pub(super) fn on_border(regional: Coord) -> bool {
  regional.x == 0
    || regional.y == 0
    || regional.x == CHUNKS_PER_REGION - 1
    || regional.y == CHUNKS_PER_REGION - 1
}

/// Panics if any link is one-sided or points at a chunk that is not the
/// geometric neighbor in that direction.
pub(super) fn verify(chunks: &[Chunk]) {
  let mut count = 0usize;
  for (index, chunk) in chunks.iter().enumerate() {
    let id = ChunkId(index as u32);
    for (direction, other) in chunk.neighborhood().iter() {
      let back = chunks[other.index()].neighborhood().get(direction.opposite());
      assert_eq!(
        back,
        Some(id),
        "one-sided link {direction:?} from chunk {id:?} to {other:?}"
      );
      assert_eq!(
        chunks[other.index()].spatial_index() - chunk.spatial_index(),
        direction.offset(),
        "link {direction:?} from chunk {id:?} skips a cell"
      );
      count += 1;
    }
  }
  debug!("Verified {} chunk links", count);
}
