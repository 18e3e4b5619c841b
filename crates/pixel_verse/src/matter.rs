//! Matter definitions and registry.
//!
//! Every atom references a [`Matter`] through a [`MatterId`]. The registry is
//! read-only while the simulation runs; it is built once from a
//! [`MattersConfig`] (TOML) or from [`MattersConfig::builtin`].

use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;

use bevy::prelude::Resource;
use log::warn;
use serde::{Deserialize, Serialize};

use crate::config::ConfigError;
use crate::render::{Rgba, rgb};
use crate::simulation::hash::hash11uu32;

/// Handle into the [`Matters`] registry.
///
/// [`MatterId::EMPTY`] marks an empty atom slot and never names a matter.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MatterId(pub u16);

impl MatterId {
  pub const EMPTY: MatterId = MatterId(0);

  #[inline]
  pub fn is_empty(self) -> bool {
    self == Self::EMPTY
  }
}

/// Aggregate state, which selects the movement rule.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatterState {
  /// Never moves, blocks everything.
  Solid,
  /// Falls and piles diagonally.
  Powder,
  /// Falls and spreads sideways.
  Liquid,
  /// Carried but not moved yet.
  Gaseous,
  /// Carried but not moved yet.
  Plasma,
}

impl MatterState {
  /// Powders and liquids are moved by the physics pass.
  #[inline]
  pub fn is_mobile(self) -> bool {
    matches!(self, MatterState::Powder | MatterState::Liquid)
  }
}

/// Physical constants of a matter.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PhysicProperties {
  /// Relative density; a denser fluid sinks through a lighter one.
  pub density: f32,
  pub friction: f32,
  pub elasticity: f32,
}

/// Immutable description of a material.
#[derive(Clone, Debug, PartialEq)]
pub struct Matter {
  /// String id, e.g. `"water"`.
  pub name: String,
  pub state: MatterState,
  pub physics: PhysicProperties,
  /// Temperature assigned to freshly created atoms.
  pub creation_temperature: f32,
  /// Colors new atoms pick from. Never empty.
  pub palette: Vec<Rgba>,
}

impl Matter {
  /// Picks a palette color from a seed.
  pub fn sample(&self, seed: u32) -> Rgba {
    let index = hash11uu32(seed) as usize % self.palette.len().max(1);
    self.palette.get(index).copied().unwrap_or(Rgba::new(255, 0, 255, 255))
  }
}

/// Registry failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
  /// A matter with this name is already registered.
  DuplicateName(String),
  /// All `u16` ids are taken.
  Full,
  /// No matter is registered under this name.
  UnknownMatter(String),
}

impl std::fmt::Display for RegistryError {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      RegistryError::DuplicateName(name) => write!(f, "matter '{name}' is already registered"),
      RegistryError::Full => write!(f, "matter registry is full"),
      RegistryError::UnknownMatter(name) => write!(f, "unknown matter '{name}'"),
    }
  }
}

impl std::error::Error for RegistryError {}

/// Matter registry.
///
/// Ids are dense: the n-th registered matter gets `MatterId(n + 1)`.
#[derive(Resource, Clone, Debug, Default)]
pub struct Matters {
  entries: Vec<Matter>,
  by_name: HashMap<String, MatterId>,
}

impl Matters {
  /// Creates an empty registry.
  pub fn new() -> Self {
    Self::default()
  }

  /// Registry holding the built-in matters.
  pub fn builtin() -> Self {
    Self::from(MattersConfig::builtin())
  }

  /// Adds a matter and returns its id.
  pub fn register(&mut self, matter: Matter) -> Result<MatterId, RegistryError> {
    if self.by_name.contains_key(&matter.name) {
      return Err(RegistryError::DuplicateName(matter.name));
    }
    let raw = u16::try_from(self.entries.len() + 1).map_err(|_| RegistryError::Full)?;
    let id = MatterId(raw);
    self.by_name.insert(matter.name.clone(), id);
    self.entries.push(matter);
    Ok(id)
  }

  /// Looks up a matter. Returns `None` for [`MatterId::EMPTY`] and unknown ids.
  #[inline]
  pub fn get(&self, id: MatterId) -> Option<&Matter> {
    (id.0 as usize)
      .checked_sub(1)
      .and_then(|index| self.entries.get(index))
  }

  /// Resolves a string id.
  pub fn id_of(&self, name: &str) -> Result<MatterId, RegistryError> {
    self.by_name.get(name).copied().ok_or_else(|| {
      warn!("Matter '{}' is not registered", name);
      RegistryError::UnknownMatter(name.to_owned())
    })
  }

  /// State of the matter in a slot, `None` for empty slots.
  #[inline]
  pub fn state_of(&self, id: MatterId) -> Option<MatterState> {
    self.get(id).map(|m| m.state)
  }

  pub fn iter(&self) -> impl Iterator<Item = (MatterId, &Matter)> {
    self
      .entries
      .iter()
      .enumerate()
      .map(|(i, m)| (MatterId(i as u16 + 1), m))
  }

  #[must_use]
  pub fn len(&self) -> usize {
    self.entries.len()
  }

  #[must_use]
  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }
}

/// Serializable matter definition.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MatterDef {
  pub name: String,
  pub state: MatterState,
  pub density: f32,
  #[serde(default)]
  pub friction: f32,
  #[serde(default)]
  pub elasticity: f32,
  #[serde(default)]
  pub temperature: f32,
  /// Hex colors, `"#rrggbb"`.
  pub palette: Vec<String>,
}

/// Serializable list of matters, loadable from TOML.
///
/// ```toml
/// [[matters]]
/// name = "water"
/// state = "liquid"
/// density = 1.0
/// palette = ["#40a4df", "#3791cd"]
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MattersConfig {
  pub matters: Vec<MatterDef>,
}

impl MattersConfig {
  pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
    Ok(toml::from_str(source)?)
  }

  pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
    Self::from_toml_str(&std::fs::read_to_string(path)?)
  }

  /// Default matter set.
  pub fn builtin() -> Self {
    fn def(
      name: &str,
      state: MatterState,
      density: f32,
      friction: f32,
      temperature: f32,
      palette: &[&str],
    ) -> MatterDef {
      MatterDef {
        name: name.to_owned(),
        state,
        density,
        friction,
        elasticity: 0.0,
        temperature,
        palette: palette.iter().map(|c| (*c).to_owned()).collect(),
      }
    }

    Self {
      matters: vec![
        def(
          "stone",
          MatterState::Solid,
          2.6,
          0.9,
          20.0,
          &["#808080", "#767676", "#6c6c6c", "#626262"],
        ),
        def(
          "sand",
          MatterState::Powder,
          1.6,
          0.6,
          20.0,
          &["#edc9af", "#e1bf92", "#dab482", "#d2aa73"],
        ),
        def(
          "water",
          MatterState::Liquid,
          1.0,
          0.0,
          15.0,
          &["#40a4df", "#3791cd", "#2e7ebb"],
        ),
        def(
          "oil",
          MatterState::Liquid,
          0.8,
          0.1,
          20.0,
          &["#3b2f1e", "#33281a", "#2b2116"],
        ),
        def(
          "steam",
          MatterState::Gaseous,
          0.0006,
          0.0,
          110.0,
          &["#dce6ec", "#d2dde4"],
        ),
        def(
          "fire",
          MatterState::Plasma,
          0.0003,
          0.0,
          900.0,
          &["#ff7a1a", "#ffb11a", "#ff4d0d"],
        ),
      ],
    }
  }
}

fn parse_palette(name: &str, colors: &[String]) -> Vec<Rgba> {
  let palette: Vec<Rgba> = colors
    .iter()
    .filter_map(|hex| match palette::Srgb::<u8>::from_str(hex) {
      Ok(color) => Some(rgb(color.red, color.green, color.blue)),
      Err(e) => {
        warn!("Matter '{}': bad palette color '{}': {}", name, hex, e);
        None
      }
    })
    .collect();
  if palette.is_empty() {
    vec![Rgba::new(255, 0, 255, 255)]
  } else {
    palette
  }
}

impl From<MatterDef> for Matter {
  fn from(def: MatterDef) -> Self {
    Matter {
      palette: parse_palette(&def.name, &def.palette),
      name: def.name,
      state: def.state,
      physics: PhysicProperties {
        density: def.density,
        friction: def.friction,
        elasticity: def.elasticity,
      },
      creation_temperature: def.temperature,
    }
  }
}

impl From<MattersConfig> for Matters {
  /// Builds a registry. Later duplicates of a name are dropped with a
  /// warning.
  fn from(config: MattersConfig) -> Self {
    let mut matters = Matters::new();
    for def in config.matters {
      if let Err(e) = matters.register(Matter::from(def)) {
        warn!("Skipping matter definition: {}", e);
      }
    }
    matters
  }
}
