use bevy::math::IVec2;
use serde::{Deserialize, Serialize};

use crate::coords::Coord;

/// Axis-aligned rectangle of cells with inclusive `min` and `max` corners.
///
/// A rect always covers at least one cell; constructors order the corners.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CoordRect {
  pub min: Coord,
  pub max: Coord,
}

impl CoordRect {
  /// Creates a rect spanning two corners in any order.
  #[inline]
  pub fn new(a: Coord, b: Coord) -> Self {
    Self {
      min: a.min(b),
      max: a.max(b),
    }
  }

  /// Rect covering the single cell at `coord`.
  #[inline]
  pub const fn point(coord: Coord) -> Self {
    Self {
      min: coord,
      max: coord,
    }
  }

  /// Rect `0..size` on both axes.
  #[inline]
  pub const fn square(size: i32) -> Self {
    Self {
      min: IVec2::ZERO,
      max: IVec2::new(size - 1, size - 1),
    }
  }

  /// Rect spanning `a` and `b`, grown by `margin` cells on every side.
  #[inline]
  pub fn between(a: Coord, b: Coord, margin: i32) -> Self {
    Self {
      min: a.min(b) - margin,
      max: a.max(b) + margin,
    }
  }

  /// Rect centered on `center` reaching `radius` cells in every direction.
  #[inline]
  pub fn around(center: Coord, radius: i32) -> Self {
    Self::between(center, center, radius)
  }

  #[inline]
  pub fn width(&self) -> i32 {
    self.max.x - self.min.x + 1
  }

  #[inline]
  pub fn height(&self) -> i32 {
    self.max.y - self.min.y + 1
  }

  #[inline]
  pub fn contains(&self, coord: Coord) -> bool {
    coord.cmpge(self.min).all() && coord.cmple(self.max).all()
  }

  /// Returns true if `other` lies entirely inside this rect.
  #[inline]
  pub fn contains_rect(&self, other: &CoordRect) -> bool {
    self.contains(other.min) && self.contains(other.max)
  }

  /// Overlapping part of two rects, or `None` when they are disjoint.
  pub fn intersection(&self, other: &CoordRect) -> Option<CoordRect> {
    let min = self.min.max(other.min);
    let max = self.max.min(other.max);
    if min.x > max.x || min.y > max.y {
      return None;
    }
    Some(CoordRect { min, max })
  }

  /// Smallest rect covering both rects.
  #[inline]
  pub fn union(&self, other: &CoordRect) -> CoordRect {
    CoordRect {
      min: self.min.min(other.min),
      max: self.max.max(other.max),
    }
  }

  /// Grows the rect to include `coord`.
  #[inline]
  pub fn include(&self, coord: Coord) -> CoordRect {
    self.union(&CoordRect::point(coord))
  }

  /// Returns the rect translated by `offset`.
  #[inline]
  pub fn shifted(&self, offset: Coord) -> CoordRect {
    CoordRect {
      min: self.min + offset,
      max: self.max + offset,
    }
  }

  /// Iterates every cell row by row, bottom to top.
  pub fn cells(&self) -> impl Iterator<Item = Coord> + '_ {
    (self.min.y..=self.max.y)
      .flat_map(move |y| (self.min.x..=self.max.x).map(move |x| IVec2::new(x, y)))
  }
}
