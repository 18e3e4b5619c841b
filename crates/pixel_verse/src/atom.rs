//! Atom cell format.
//!
//! An atom has no identity beyond its slot: moving an atom swaps two slots,
//! destroying one overwrites its slot with [`Atom::EMPTY`].

use bevy::math::Vec2;
use serde::{Deserialize, Serialize};

use crate::matter::{Matter, MatterId};
use crate::render::{Rgba, TRANSPARENT};

/// One grid cell.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Atom {
  pub matter: MatterId,
  pub color: Rgba,
  pub temperature: f32,
  /// Cells per tick. Only powders and liquids use it.
  pub velocity: Vec2,
}

impl Atom {
  pub const EMPTY: Self = Self {
    matter: MatterId::EMPTY,
    color: TRANSPARENT,
    temperature: 0.0,
    velocity: Vec2::ZERO,
  };

  /// Creates a resting atom of `matter`, picking its color from `color_seed`.
  pub fn create(id: MatterId, matter: &Matter, color_seed: u32) -> Self {
    Self {
      matter: id,
      color: matter.sample(color_seed),
      temperature: matter.creation_temperature,
      velocity: Vec2::ZERO,
    }
  }

  #[inline]
  pub fn is_empty(&self) -> bool {
    self.matter.is_empty()
  }
}

impl Default for Atom {
  fn default() -> Self {
    Self::EMPTY
  }
}

/// Persistable part of an atom: `(matter, color, temperature)`.
///
/// Velocity is transient and restarts at zero.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct AtomRecord {
  pub matter: u16,
  pub color: [u8; 4],
  pub temperature: f32,
}

impl From<&Atom> for AtomRecord {
  fn from(atom: &Atom) -> Self {
    Self {
      matter: atom.matter.0,
      color: [atom.color.red, atom.color.green, atom.color.blue, atom.color.alpha],
      temperature: atom.temperature,
    }
  }
}

impl From<&AtomRecord> for Atom {
  fn from(record: &AtomRecord) -> Self {
    if record.matter == 0 {
      return Atom::EMPTY;
    }
    let [r, g, b, a] = record.color;
    Atom {
      matter: MatterId(record.matter),
      color: Rgba::new(r, g, b, a),
      temperature: record.temperature,
      velocity: Vec2::ZERO,
    }
  }
}
