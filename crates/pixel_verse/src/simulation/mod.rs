//! Cellular automaton simulation.
//!
//! A tick refreshes the pixel buffers, moves atoms in four checkerboard
//! batches and rebuilds contours for chunks whose contents changed.

pub mod hash;
pub mod physics;
mod ticker;

use bevy::prelude::Resource;
pub use ticker::{TickMode, Ticker};

use crate::collision::{ChunkContours, CollisionConfig, rebuild_contours};
use crate::matter::Matters;
use crate::render::PixelSpan;
use crate::scheduling::run_batches;
use crate::world::Space;

/// Context passed to the movement rules for deterministic randomness.
#[derive(Clone, Copy, Debug)]
pub struct SimContext {
  /// Number of the tick being run, starting at 1.
  pub tick: u64,
}

/// What a tick produced for render and collider consumers.
#[derive(Resource, Clone, Debug, Default)]
pub struct TickOutput {
  /// Last tick run.
  pub tick: u64,
  /// Region pixel spans rewritten, in the order they were copied.
  pub pixels: Vec<PixelSpan>,
  /// Rebuilt contours, one entry per chunk.
  pub contours: Vec<ChunkContours>,
}

impl TickOutput {
  /// Folds a later tick's output into this one.
  pub fn merge(&mut self, later: TickOutput) {
    self.tick = later.tick;
    self.pixels.extend(later.pixels);
    for contours in later.contours {
      match self.contours.iter_mut().find(|c| c.chunk == contours.chunk) {
        Some(existing) => *existing = contours,
        None => self.contours.push(contours),
      }
    }
  }

  pub fn clear(&mut self) {
    self.pixels.clear();
    self.contours.clear();
  }
}

/// Runs one simulation tick.
///
/// The tick counter advances first, so the first tick run is tick 1.
/// Pixels are refreshed before any atom moves: the buffers show the state
/// the previous tick left behind.
#[cfg_attr(feature = "tracy", tracing::instrument(skip_all, fields(tick = space.tick())))]
pub fn simulate_tick(
  space: &mut Space,
  matters: &Matters,
  collision: &CollisionConfig,
) -> TickOutput {
  let tick = space.increment_tick();
  let ctx = SimContext { tick };

  let pixels = space.refresh_pixels();

  run_batches(space, |canvas, chunk, rect, marks| {
    physics::process_chunk(canvas, matters, ctx, chunk, rect, marks);
  });

  let contours = rebuild_contours(space, matters, collision);

  TickOutput {
    tick,
    pixels,
    contours,
  }
}
