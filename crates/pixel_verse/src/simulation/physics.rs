//! Per-atom movement.
//!
//! Powders and liquids fall under gravity, displace lighter fluids and
//! settle sideways when blocked. Solids, gases and plasma stay put.
//!
//! Positions are tracked in the local space of the chunk being swept, and
//! resolved through the [`Canvas`] when they leave it.

use bevy::math::{IVec2, Vec2};

use super::SimContext;
use super::hash::hash21uu32;
use crate::atom::Atom;
use crate::coords::{Coord, cell_index};
use crate::matter::{Matter, MatterId, MatterState, Matters};
use crate::primitives::{ChunkId, CoordRect};
use crate::scheduling::{Canvas, Cell, DirtyMarks};

/// Fraction of a tick's motion an atom may spend.
pub const MOTION_PER_TICK: f32 = 1.0;
/// Velocity cap in cells per tick.
pub const MAX_SPEED: f32 = 32.0;
pub const GRAVITY: f32 = 9.8;
/// Gravity applied to `velocity.y` each tick an atom can fall.
pub const PER_TICK_GRAVITY: f32 = -GRAVITY / 120.0;

/// Whether an atom of `this` may move into the slot holding `other`.
///
/// Empty slots always pass. Same matter and solids never do. Otherwise the
/// mover must be strictly denser than the occupant.
pub fn is_passable(other: &Atom, this: MatterId, this_matter: &Matter, matters: &Matters) -> bool {
  if other.is_empty() {
    return true;
  }
  if other.matter == this {
    return false;
  }
  let Some(other_matter) = matters.get(other.matter) else {
    return false;
  };
  if other_matter.state == MatterState::Solid {
    return false;
  }
  this_matter.physics.density > other_matter.physics.density
}

/// Sweeps `rect` of a chunk in snake order.
///
/// Rows run bottom to top. The horizontal direction flips every row and
/// every tick.
#[cfg_attr(feature = "tracy", tracing::instrument(skip_all))]
pub fn process_chunk(
  canvas: &Canvas<'_>,
  matters: &Matters,
  ctx: SimContext,
  chunk: ChunkId,
  rect: CoordRect,
  marks: &mut DirtyMarks<'_>,
) {
  for y in rect.min.y..=rect.max.y {
    let ascending = (ctx.tick + y as u64) & 1 == 1;
    if ascending {
      for x in rect.min.x..=rect.max.x {
        process_atom(canvas, matters, ctx, chunk, IVec2::new(x, y), marks);
      }
    } else {
      for x in (rect.min.x..=rect.max.x).rev() {
        process_atom(canvas, matters, ctx, chunk, IVec2::new(x, y), marks);
      }
    }
  }
}

fn process_atom(
  canvas: &Canvas<'_>,
  matters: &Matters,
  ctx: SimContext,
  chunk: ChunkId,
  local: Coord,
  marks: &mut DirtyMarks<'_>,
) {
  let atom = canvas.atom((chunk, local));
  if atom.is_empty() {
    return;
  }
  let Some(matter) = matters.get(atom.matter) else {
    return;
  };

  match matter.state {
    state if state.is_mobile() => {
      let mover = Mover {
        canvas,
        matters,
        matter,
        id: atom.matter,
        chunk,
        origin: local,
      };
      if let Some(last) = mover.run(ctx) {
        marks.mark(CoordRect::between(local, last, 1));
      }
    }
    // Solids stay put; gases and plasma are reserved for buoyant movement.
    _ => {}
  }
}

/// Moves one powder or liquid atom.
struct Mover<'c, 'a> {
  canvas: &'c Canvas<'a>,
  matters: &'c Matters,
  matter: &'c Matter,
  id: MatterId,
  chunk: ChunkId,
  origin: Coord,
}

impl Mover<'_, '_> {
  /// Returns the final position (chunk-local to the swept chunk) if the
  /// atom moved.
  fn run(&self, ctx: SimContext) -> Option<Coord> {
    let here = (self.chunk, self.origin);
    let below = self.canvas.resolve(self.chunk, self.origin + IVec2::NEG_Y);

    match below {
      Some(cell) if self.passable(cell) => {
        let mut atom = self.canvas.atom(here);
        atom.velocity.y += PER_TICK_GRAVITY;
        atom.velocity = atom.velocity.clamp_length_max(MAX_SPEED);
        self.canvas.set(here, atom);
        let last = self.integrate(atom.velocity);
        (last != self.origin).then_some(last)
      }
      Some(cell) if self.same_state(cell) => {
        self.exchange(here, cell);
        self.settle(ctx)
      }
      _ => {
        let mut atom = self.canvas.atom(here);
        atom.velocity = Vec2::ZERO;
        self.canvas.set(here, atom);
        self.settle(ctx)
      }
    }
  }

  #[inline]
  fn passable(&self, cell: Cell) -> bool {
    is_passable(&self.canvas.atom(cell), self.id, self.matter, self.matters)
  }

  /// Whether `cell` holds a different atom of the same aggregate state.
  #[inline]
  fn same_state(&self, cell: Cell) -> bool {
    self
      .matters
      .state_of(self.canvas.atom(cell).matter)
      .is_some_and(|state| state == self.matter.state)
  }

  /// Perfectly inelastic vertical exchange: both atoms end up with the
  /// mean of their vertical velocities.
  fn exchange(&self, a: Cell, b: Cell) {
    let mut first = self.canvas.atom(a);
    let mut second = self.canvas.atom(b);
    let mean = (first.velocity.y + second.velocity.y) * 0.5;
    first.velocity.y = mean;
    second.velocity.y = mean;
    self.canvas.set(a, first);
    self.canvas.set(b, second);
  }

  /// Steps the atom along its velocity, one unit per step, until the
  /// motion budget runs out or it is blocked.
  fn integrate(&self, velocity: Vec2) -> Coord {
    let speed = velocity.length();
    if speed <= f32::EPSILON {
      return self.origin;
    }
    let direction = velocity / speed;
    let limit = Vec2::splat(MAX_SPEED - 1.0);

    let mut budget = MOTION_PER_TICK;
    let mut displacement = Vec2::ZERO;
    let mut last = self.origin;
    let mut last_cell = (self.chunk, self.origin);

    while budget > 0.0 {
      budget -= 1.0 / speed;
      displacement = (displacement + direction).clamp(-limit, limit);
      let next = self.origin + round_to_coord(displacement);
      if next == last {
        continue;
      }

      let target = self.canvas.resolve(self.chunk, next);
      match target {
        Some(cell) if self.passable(cell) => {
          self.canvas.swap(last_cell, cell);
          last = next;
          last_cell = cell;
        }
        Some(cell) if self.same_state(cell) => {
          self.exchange(last_cell, cell);
          break;
        }
        _ => {
          let mut atom = self.canvas.atom(last_cell);
          atom.velocity = Vec2::ZERO;
          self.canvas.set(last_cell, atom);
          break;
        }
      }
    }

    last
  }

  /// Tries to slide a blocked atom: diagonally down first, then, for
  /// liquids, straight sideways. The preferred side is hashed from the
  /// tick and cell.
  fn settle(&self, ctx: SimContext) -> Option<Coord> {
    let main = if hash21uu32(ctx.tick as u32, cell_index(self.origin) as u32) & 1 == 0 {
      -1
    } else {
      1
    };
    let sides = [main, -main];
    let here = (self.chunk, self.origin);

    for dx in sides {
      let side = self.resolve_passable(IVec2::new(dx, 0));
      let diagonal = self.resolve_passable(IVec2::new(dx, -1));
      if let (Some(_), Some(target)) = (side, diagonal) {
        self.canvas.swap(here, target);
        return Some(self.origin + IVec2::new(dx, -1));
      }
    }

    if self.matter.state == MatterState::Liquid {
      for dx in sides {
        if let Some(target) = self.resolve_passable(IVec2::new(dx, 0)) {
          self.canvas.swap(here, target);
          return Some(self.origin + IVec2::new(dx, 0));
        }
      }
    }

    None
  }

  fn resolve_passable(&self, offset: IVec2) -> Option<Cell> {
    self
      .canvas
      .resolve(self.chunk, self.origin + offset)
      .filter(|&cell| self.passable(cell))
  }
}

/// Rounds half away from zero on each axis.
#[inline]
fn round_to_coord(v: Vec2) -> Coord {
  IVec2::new(v.x.round() as i32, v.y.round() as i32)
}
