//! Region pixel buffers handed to renderers.
//!
//! Before physics runs each tick, the colors of every dirty chunk are copied
//! into its region's [`Surface<Rgba>`]. The returned [`PixelSpan`]s tell the
//! renderer which parts of which region buffers changed.

use crate::coords::{CHUNK_SIZE, Coord, REGION_SIZE};
use crate::primitives::{CoordRect, Surface};
use crate::world::{RegionState, Space};

/// RGBA pixel with 8 bits per channel, using sRGB color space.
pub type Rgba = palette::Srgba<u8>;

/// Fully transparent black; the color of empty cells.
pub const TRANSPARENT: Rgba = Rgba::new(0, 0, 0, 0);

/// Creates an opaque RGB color (alpha = 255).
#[inline]
pub const fn rgb(r: u8, g: u8, b: u8) -> Rgba {
  Rgba::new(r, g, b, 255)
}

/// Region-sized pixel buffer, row 0 at the bottom.
pub type RegionPixels = Surface<Rgba>;

/// Creates a transparent region buffer.
pub fn region_pixels() -> RegionPixels {
  Surface::filled(REGION_SIZE as u32, REGION_SIZE as u32, TRANSPARENT)
}

/// Part of a region buffer rewritten this tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PixelSpan {
  /// Region index.
  pub region: Coord,
  /// Region-local pixel rect.
  pub rect: CoordRect,
}

/// Copies the colors of dirty chunks in active regions into the region
/// buffers.
///
/// Only the dirty rect of each chunk is copied. Empty cells become
/// [`TRANSPARENT`].
#[cfg_attr(feature = "tracy", tracing::instrument(skip_all))]
pub fn refresh_pixels(space: &mut Space) -> Vec<PixelSpan> {
  let mut spans = Vec::new();
  let (regions, chunks) = space.regions_and_chunks_mut();

  for region in regions.iter_mut() {
    if region.state() != RegionState::Active {
      continue;
    }
    let region_index = region.index();
    let (chunk_ids, pixels) = region.chunks_and_pixels_mut();
    for &chunk_id in chunk_ids {
      let chunk = &chunks[chunk_id.index()];
      let Some(dirty) = chunk.dirty_area().rect() else {
        continue;
      };
      let origin = chunk.regional_index() * CHUNK_SIZE;
      for local in dirty.cells() {
        pixels[origin + local] = chunk.atom(local).color;
      }
      spans.push(PixelSpan {
        region: region_index,
        rect: dirty.shifted(origin),
      });
    }
  }

  spans
}
