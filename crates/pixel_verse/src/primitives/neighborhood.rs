//! Links from a chunk to its eight surrounding chunks.
//!
//! Links cross region boundaries. A missing link means the edge of the
//! instantiated world: lookups through it fail and dirty marks through it
//! are dropped.

use bevy::math::IVec2;

use crate::coords::{CHUNK_SIZE, Coord, in_chunk};
use crate::primitives::{ChunkId, CoordRect};

/// The eight neighbor directions, counter-clockwise from east.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
  East,
  NorthEast,
  North,
  NorthWest,
  West,
  SouthWest,
  South,
  SouthEast,
}

impl Direction {
  pub const ALL: [Direction; 8] = [
    Direction::East,
    Direction::NorthEast,
    Direction::North,
    Direction::NorthWest,
    Direction::West,
    Direction::SouthWest,
    Direction::South,
    Direction::SouthEast,
  ];

  /// Unit grid offset towards the neighbor.
  #[inline]
  pub const fn offset(self) -> IVec2 {
    match self {
      Direction::East => IVec2::new(1, 0),
      Direction::NorthEast => IVec2::new(1, 1),
      Direction::North => IVec2::new(0, 1),
      Direction::NorthWest => IVec2::new(-1, 1),
      Direction::West => IVec2::new(-1, 0),
      Direction::SouthWest => IVec2::new(-1, -1),
      Direction::South => IVec2::new(0, -1),
      Direction::SouthEast => IVec2::new(1, -1),
    }
  }

  #[inline]
  pub const fn opposite(self) -> Direction {
    match self {
      Direction::East => Direction::West,
      Direction::NorthEast => Direction::SouthWest,
      Direction::North => Direction::South,
      Direction::NorthWest => Direction::SouthEast,
      Direction::West => Direction::East,
      Direction::SouthWest => Direction::NorthEast,
      Direction::South => Direction::North,
      Direction::SouthEast => Direction::NorthWest,
    }
  }

  /// Direction for a unit offset; `None` for zero or non-unit offsets.
  pub fn from_offset(offset: IVec2) -> Option<Direction> {
    Direction::ALL.into_iter().find(|d| d.offset() == offset)
  }

  #[inline]
  const fn slot(self) -> usize {
    self as usize
  }
}

/// Where a chunk-local coordinate lands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Locate {
  /// Inside this chunk.
  Inside,
  /// In the linked neighbor, re-expressed in the neighbor's local space.
  /// The result may still lie outside that neighbor for coordinates more
  /// than one chunk away.
  Neighbor(ChunkId, Coord),
  /// Past the edge of the world.
  Edge,
}

/// Neighbor links of a chunk.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Neighborhood {
  links: [Option<ChunkId>; 8],
}

impl Neighborhood {
  #[inline]
  pub fn get(&self, direction: Direction) -> Option<ChunkId> {
    self.links[direction.slot()]
  }

  #[inline]
  pub(crate) fn set(&mut self, direction: Direction, chunk: Option<ChunkId>) {
    self.links[direction.slot()] = chunk;
  }

  /// Present links with their directions.
  pub fn iter(&self) -> impl Iterator<Item = (Direction, ChunkId)> + '_ {
    Direction::ALL
      .into_iter()
      .filter_map(|d| self.get(d).map(|id| (d, id)))
  }

  /// Resolves a chunk-local coordinate that may fall outside the chunk.
  pub fn locate(&self, coord: Coord) -> Locate {
    if in_chunk(coord) {
      return Locate::Inside;
    }
    let step = IVec2::new(overflow_axis(coord.x), overflow_axis(coord.y));
    match Direction::from_offset(step).and_then(|d| self.get(d)) {
      Some(id) => Locate::Neighbor(id, coord - step * CHUNK_SIZE),
      None => Locate::Edge,
    }
  }

  /// Parts of `rect` (chunk-local, possibly overhanging) that belong to
  /// neighbors, shifted into each neighbor's local space.
  ///
  /// A rect overhanging one edge reaches the straight neighbor; overhanging
  /// two edges at once also reaches the diagonal between them. The shifted
  /// rects are not clipped; mark them with `safe = true`.
  pub fn overflow(&self, rect: CoordRect) -> impl Iterator<Item = (ChunkId, CoordRect)> + '_ {
    let east = rect.max.x >= CHUNK_SIZE;
    let west = rect.min.x < 0;
    let north = rect.max.y >= CHUNK_SIZE;
    let south = rect.min.y < 0;

    Direction::ALL.into_iter().filter_map(move |direction| {
      let offset = direction.offset();
      let reaches_x = match offset.x {
        1 => east,
        -1 => west,
        _ => true,
      };
      let reaches_y = match offset.y {
        1 => north,
        -1 => south,
        _ => true,
      };
      if !(reaches_x && reaches_y) {
        return None;
      }
      let id = self.get(direction)?;
      Some((id, rect.shifted(-offset * CHUNK_SIZE)))
    })
  }
}

#[inline]
fn overflow_axis(v: i32) -> i32 {
  if v < 0 {
    -1
  } else if v >= CHUNK_SIZE {
    1
  } else {
    0
  }
}
