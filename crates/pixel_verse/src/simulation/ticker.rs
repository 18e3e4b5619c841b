//! Fixed-rate tick scheduling.
//!
//! The [`Ticker`] reconciles wall-clock time with the tick counter and
//! tells the caller how many ticks to run this update.

use bevy::prelude::Resource;
use log::warn;
use serde::{Deserialize, Serialize};

use crate::config::SimulationConfig;

/// How ticks are paced against wall-clock time.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TickMode {
  /// One tick whenever the tick interval has elapsed since the last one.
  /// Lost time is never made up.
  #[default]
  Limited,
  /// One tick per update.
  Unlimited,
  /// At most one tick per update while behind schedule.
  Compensating,
  /// As many ticks as needed to catch up, capped per update.
  ImmediatelyCompensating,
}

/// Tick pacing state.
#[derive(Resource, Clone, Debug)]
pub struct Ticker {
  mode: TickMode,
  ticks_per_second: f64,
  max_catch_up_ticks: u32,
  start: Option<f64>,
  next_tick: f64,
  ticks_run: u64,
}

impl Default for Ticker {
  fn default() -> Self {
    Self::new(&SimulationConfig::default())
  }
}

impl Ticker {
  pub fn new(config: &SimulationConfig) -> Self {
    Self {
      mode: config.mode,
      ticks_per_second: config.ticks_per_second.max(f64::EPSILON),
      max_catch_up_ticks: config.max_catch_up_ticks.max(1),
      start: None,
      next_tick: 0.0,
      ticks_run: 0,
    }
  }

  #[inline]
  pub fn mode(&self) -> TickMode {
    self.mode
  }

  pub fn set_mode(&mut self, mode: TickMode) {
    self.mode = mode;
  }

  /// Ticks granted since the ticker started.
  #[inline]
  pub fn ticks_run(&self) -> u64 {
    self.ticks_run
  }

  #[inline]
  fn interval(&self) -> f64 {
    1.0 / self.ticks_per_second
  }

  /// Number of ticks to run at time `now` (seconds, monotonic).
  pub fn advance(&mut self, now: f64) -> u32 {
    let start = *self.start.get_or_insert(now);

    let ticks = match self.mode {
      TickMode::Limited => {
        if now >= self.next_tick {
          self.next_tick = now + self.interval();
          1
        } else {
          0
        }
      }
      TickMode::Unlimited => 1,
      TickMode::Compensating => u32::from(self.ticks_run < self.due(start, now)),
      TickMode::ImmediatelyCompensating => {
        let behind = self.due(start, now).saturating_sub(self.ticks_run);
        if behind > self.max_catch_up_ticks as u64 {
          warn!(
            "Simulation is {} ticks behind, running {}",
            behind, self.max_catch_up_ticks
          );
        }
        behind.min(self.max_catch_up_ticks as u64) as u32
      }
    };

    self.ticks_run += ticks as u64;
    ticks
  }

  /// Ticks that should have run by `now`.
  #[inline]
  fn due(&self, start: f64, now: f64) -> u64 {
    ((now - start).max(0.0) * self.ticks_per_second).floor() as u64
  }
}
