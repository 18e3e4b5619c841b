//! Marching squares contour extraction.
//!
//! Extracts closed rings from a binary grid representing solid/empty cells.
//! Segments are oriented with the solid side on their left, so rings around
//! solid areas run counter-clockwise and holes run clockwise.

use std::collections::HashMap;

use bevy::math::Vec2;

use crate::coords::Coord;
use crate::primitives::Surface;

/// Edge segment within a cell, as start and end points in cell-local
/// space `[0, 1]`.
pub type EdgeSegment = ((f32, f32), (f32, f32));

const S: (f32, f32) = (0.5, 0.0);
const E: (f32, f32) = (1.0, 0.5);
const N: (f32, f32) = (0.5, 1.0);
const W: (f32, f32) = (0.0, 0.5);

/// Corner bits of a case index.
pub const SW: usize = 1;
pub const SE: usize = 2;
pub const NW: usize = 4;
pub const NE: usize = 8;

/// Lookup table for marching squares edge segments.
///
/// Case index is `sw | se << 1 | nw << 2 | ne << 3`.
///
/// Cell coordinate system (Y+ up):
///   NW---(0.5,1)---NE
///    |              |
///  (0,0.5)      (1,0.5)
///    |              |
///   SW---(0.5,0)---SE
///
/// The saddles (6 and 9) always connect NW with SE: in case 6 the solid
/// corners join through the center, in case 9 the empty ones do.
pub const EDGE_TABLE: [&[EdgeSegment]; 16] = [
  // 0: empty
  &[],
  // 1: SW
  &[(S, W)],
  // 2: SE
  &[(E, S)],
  // 3: SW+SE, bottom row
  &[(E, W)],
  // 4: NW
  &[(W, N)],
  // 5: SW+NW, left column
  &[(S, N)],
  // 6: SE+NW saddle, solid through the center
  &[(W, S), (E, N)],
  // 7: all but NE
  &[(E, N)],
  // 8: NE
  &[(N, E)],
  // 9: SW+NE saddle, empty through the center
  &[(S, W), (N, E)],
  // 10: SE+NE, right column
  &[(N, S)],
  // 11: all but NW
  &[(N, W)],
  // 12: NW+NE, top row
  &[(W, E)],
  // 13: all but SE
  &[(S, E)],
  // 14: all but SW
  &[(W, S)],
  // 15: solid
  &[],
];

/// Segments of one case. Indices above 15 use their low four bits.
#[inline]
pub fn segments_for_case(case: usize) -> &'static [EdgeSegment] {
  EDGE_TABLE[case & 15]
}

/// Case index of the 2x2 window whose bottom-left sample is `(x, y)`.
#[inline]
fn case_at(grid: &Surface<bool>, x: i32, y: i32) -> usize {
  let solid = |dx: i32, dy: i32| grid.get(Coord::new(x + dx, y + dy)).copied().unwrap_or(false);
  (solid(0, 0) as usize * SW)
    | (solid(1, 0) as usize * SE)
    | (solid(0, 1) as usize * NW)
    | (solid(1, 1) as usize * NE)
}

/// Raw oriented segments of a grid.
///
/// Sample `(i, j)` sits at `origin + (i - 0.5, j - 0.5)`. For a chunk grid
/// padded with one empty sample on every side, this puts cell `(x, y)` of
/// the chunk at `origin + (x + 0.5, y + 0.5)` and contour vertices on cell
/// edge midpoints.
pub fn segments(grid: &Surface<bool>, origin: Vec2) -> Vec<(Vec2, Vec2)> {
  let mut out = Vec::new();
  let width = grid.width() as i32;
  let height = grid.height() as i32;

  for cy in 0..height - 1 {
    for cx in 0..width - 1 {
      let base = origin + Vec2::new(cx as f32 - 0.5, cy as f32 - 0.5);
      for &((x1, y1), (x2, y2)) in segments_for_case(case_at(grid, cx, cy)) {
        out.push((base + Vec2::new(x1, y1), base + Vec2::new(x2, y2)));
      }
    }
  }

  out
}

/// Extracts closed rings from a grid.
///
/// The outermost samples should be empty; otherwise rings touching the
/// border stay open and are dropped.
pub fn marching_squares(grid: &Surface<bool>, origin: Vec2) -> Vec<Vec<Vec2>> {
  connect_segments(segments(grid, origin))
}

/// Snaps a point to integer grid for robust endpoint matching.
///
/// Marching squares produces coordinates at exact 0.5 intervals, so we
/// multiply by 2 and round to get exact integer keys for HashMap lookups.
fn grid_key(v: Vec2) -> (i32, i32) {
  ((v.x * 2.0).round() as i32, (v.y * 2.0).round() as i32)
}

/// Chains oriented segments into closed rings.
///
/// Every segment end is the start of exactly one other segment, so a ring
/// is followed by looking up the segment starting where the current one
/// ends until the walk returns to its first vertex.
pub fn connect_segments(segments: Vec<(Vec2, Vec2)>) -> Vec<Vec<Vec2>> {
  if segments.is_empty() {
    return vec![];
  }

  let mut starts: HashMap<(i32, i32), Vec<usize>> = HashMap::with_capacity(segments.len());
  for (i, (start, _)) in segments.iter().enumerate() {
    starts.entry(grid_key(*start)).or_default().push(i);
  }

  let mut used = vec![false; segments.len()];
  let mut rings = Vec::new();
  let mut open = 0usize;

  for first in 0..segments.len() {
    if used[first] {
      continue;
    }
    let origin_key = grid_key(segments[first].0);
    let mut ring = Vec::new();
    let mut current = first;
    let closed = loop {
      used[current] = true;
      let (start, end) = segments[current];
      ring.push(start);
      let key = grid_key(end);
      if key == origin_key {
        break true;
      }
      let next = starts
        .get(&key)
        .and_then(|candidates| candidates.iter().copied().find(|&i| !used[i]));
      match next {
        Some(i) => current = i,
        None => break false,
      }
    };

    if closed && ring.len() >= 3 {
      rings.push(ring);
    } else {
      open += 1;
    }
  }

  if open > 0 {
    log::debug!(
      "connect_segments: {} segments, {} open chains dropped",
      segments.len(),
      open
    );
  }

  rings
}

/// Signed area of a ring; positive for counter-clockwise rings.
pub fn signed_area(ring: &[Vec2]) -> f32 {
  let mut sum = 0.0;
  for (i, a) in ring.iter().enumerate() {
    let b = ring[(i + 1) % ring.len()];
    sum += a.x * b.y - b.x * a.y;
  }
  sum * 0.5
}
