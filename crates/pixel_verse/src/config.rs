//! TOML configuration.
//!
//! ```toml
//! [simulation]
//! ticks_per_second = 60.0
//! mode = "limited"
//! max_catch_up_ticks = 8
//!
//! [space]
//! cells_per_meter = 20.0
//! origin = [0.0, 0.0]
//! region_count = [1, 1]
//!
//! [collision]
//! collidable_state = "solid"
//! simplify_tolerance = 0.0
//! ```
//!
//! Every field is optional; missing ones take their defaults.

use std::path::Path;

use bevy::math::{IVec2, Vec2};
use bevy::prelude::Resource;
use serde::{Deserialize, Serialize};

use crate::collision::CollisionConfig;
use crate::coords::DEFAULT_CELLS_PER_METER;
use crate::simulation::TickMode;

/// Failure to load a configuration file.
#[derive(Debug)]
pub enum ConfigError {
  Io(std::io::Error),
  Parse(toml::de::Error),
}

impl std::fmt::Display for ConfigError {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      ConfigError::Io(e) => write!(f, "failed to read config: {e}"),
      ConfigError::Parse(e) => write!(f, "failed to parse config: {e}"),
    }
  }
}

impl std::error::Error for ConfigError {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    match self {
      ConfigError::Io(e) => Some(e),
      ConfigError::Parse(e) => Some(e),
    }
  }
}

impl From<std::io::Error> for ConfigError {
  fn from(e: std::io::Error) -> Self {
    ConfigError::Io(e)
  }
}

impl From<toml::de::Error> for ConfigError {
  fn from(e: toml::de::Error) -> Self {
    ConfigError::Parse(e)
  }
}

/// Tick scheduling settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
  pub ticks_per_second: f64,
  pub mode: TickMode,
  /// Upper bound on ticks run in one update by
  /// [`TickMode::ImmediatelyCompensating`].
  pub max_catch_up_ticks: u32,
}

impl Default for SimulationConfig {
  fn default() -> Self {
    Self {
      ticks_per_second: 60.0,
      mode: TickMode::Limited,
      max_catch_up_ticks: 8,
    }
  }
}

/// Space layout settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpaceConfig {
  pub cells_per_meter: f32,
  /// World-space position of cell (0, 0).
  pub origin: Vec2,
  /// Regions instantiated at startup, starting at region (0, 0).
  pub region_count: IVec2,
}

impl Default for SpaceConfig {
  fn default() -> Self {
    Self {
      cells_per_meter: DEFAULT_CELLS_PER_METER,
      origin: Vec2::ZERO,
      region_count: IVec2::ONE,
    }
  }
}

/// Root configuration resource.
#[derive(Resource, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VerseConfig {
  pub simulation: SimulationConfig,
  pub space: SpaceConfig,
  pub collision: CollisionConfig,
}

impl VerseConfig {
  pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
    Ok(toml::from_str(source)?)
  }

  pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
    Self::from_toml_str(&std::fs::read_to_string(path)?)
  }
}
