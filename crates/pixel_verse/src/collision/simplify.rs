//! Douglas-Peucker ring simplification.

use bevy::math::Vec2;

/// Simplifies a closed ring, keeping every vertex that lies further than
/// `tolerance` from the simplified outline.
///
/// The ring is split at its two furthest-apart vertices so the result does
/// not depend on where the ring happens to start.
pub fn douglas_peucker(ring: &[Vec2], tolerance: f32) -> Vec<Vec2> {
  if ring.len() <= 3 || tolerance <= 0.0 {
    return ring.to_vec();
  }

  let (i1, i2) = find_furthest_pair(ring);
  let (half1, half2) = split_at_indices(ring, i1, i2);

  let mut simplified = simplify_open(&half1, tolerance);
  let mut rest = simplify_open(&half2, tolerance);

  // Each half ends where the other starts.
  simplified.pop();
  rest.pop();
  simplified.extend(rest);
  simplified
}

/// Simplifies every ring and drops the ones that collapse below a
/// triangle.
pub fn simplify_rings(rings: Vec<Vec<Vec2>>, tolerance: f32) -> Vec<Vec<Vec2>> {
  rings
    .into_iter()
    .map(|ring| douglas_peucker(&ring, tolerance))
    .filter(|ring| ring.len() >= 3)
    .collect()
}

fn find_furthest_pair(ring: &[Vec2]) -> (usize, usize) {
  let mut max_dist_sq = 0.0f32;
  let mut best = (0, ring.len() / 2);

  for i in 0..ring.len() {
    for j in i + 1..ring.len() {
      let dist_sq = ring[i].distance_squared(ring[j]);
      if dist_sq > max_dist_sq {
        max_dist_sq = dist_sq;
        best = (i, j);
      }
    }
  }

  best
}

/// Splits a ring into two open chains `start..=end` and `end..=start`
/// (wrapping).
fn split_at_indices(ring: &[Vec2], i1: usize, i2: usize) -> (Vec<Vec2>, Vec<Vec2>) {
  let (start, end) = (i1.min(i2), i1.max(i2));
  let first = ring[start..=end].to_vec();
  let mut second = ring[end..].to_vec();
  second.extend_from_slice(&ring[..=start]);
  (first, second)
}

fn simplify_open(chain: &[Vec2], tolerance: f32) -> Vec<Vec2> {
  let (Some(&first), Some(&last)) = (chain.first(), chain.last()) else {
    return Vec::new();
  };
  if chain.len() <= 2 {
    return chain.to_vec();
  }

  let mut max_dist_sq = 0.0f32;
  let mut max_idx = 0;
  for (i, &point) in chain.iter().enumerate().take(chain.len() - 1).skip(1) {
    let dist_sq = distance_to_segment_squared(point, first, last);
    if dist_sq > max_dist_sq {
      max_dist_sq = dist_sq;
      max_idx = i;
    }
  }

  if max_dist_sq > tolerance * tolerance {
    let mut left = simplify_open(&chain[..=max_idx], tolerance);
    let right = simplify_open(&chain[max_idx..], tolerance);
    left.pop();
    left.extend(right);
    left
  } else {
    vec![first, last]
  }
}

fn distance_to_segment_squared(point: Vec2, a: Vec2, b: Vec2) -> f32 {
  let ab = b - a;
  let len_sq = ab.length_squared();
  if len_sq < 1e-10 {
    return point.distance_squared(a);
  }
  let t = ((point - a).dot(ab) / len_sq).clamp(0.0, 1.0);
  point.distance_squared(a + t * ab)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_triangle_unchanged() {
    let triangle = [
      Vec2::new(0.0, 0.0),
      Vec2::new(10.0, 0.0),
      Vec2::new(5.0, 10.0),
    ];
    assert_eq!(douglas_peucker(&triangle, 1.0), triangle.to_vec());
  }

  #[test]
  fn test_collinear_points_removed() {
    let square: Vec<Vec2> = [
      (0.0, 0.0),
      (1.0, 0.0),
      (2.0, 0.0),
      (3.0, 0.0),
      (4.0, 0.0),
      (4.0, 4.0),
      (0.0, 4.0),
    ]
    .into_iter()
    .map(|(x, y)| Vec2::new(x, y))
    .collect();
    let simplified = douglas_peucker(&square, 0.1);
    assert_eq!(simplified.len(), 4);
    for corner in [Vec2::ZERO, Vec2::new(4.0, 0.0), Vec2::new(4.0, 4.0)] {
      assert!(simplified.contains(&corner));
    }
  }

  #[test]
  fn test_zero_tolerance_keeps_everything() {
    let ring = vec![
      Vec2::new(0.0, 0.0),
      Vec2::new(1.0, 0.0),
      Vec2::new(2.0, 0.0),
      Vec2::new(1.0, 1.0),
    ];
    assert_eq!(douglas_peucker(&ring, 0.0), ring);
  }

  #[test]
  fn test_point_to_segment_distance() {
    let d = distance_to_segment_squared(Vec2::new(5.0, 5.0), Vec2::ZERO, Vec2::new(10.0, 0.0));
    assert!((d - 25.0).abs() < 1e-4);
  }
}
