//! ECS plugin and systems for the Space.
//!
//! Installs the simulation resources and runs due ticks every `Update`.

use bevy::prelude::*;

use super::Space;
use crate::collision::CollisionConfig;
use crate::config::VerseConfig;
use crate::matter::Matters;
use crate::simulation::{TickOutput, Ticker, simulate_tick};

/// Plugin driving the falling-sand simulation.
///
/// Resources already present when the plugin is built are kept, so a
/// custom [`Matters`] registry or a prepared [`Space`] can be inserted
/// before adding the plugin.
#[derive(Default)]
pub struct VersePlugin {
  pub config: VerseConfig,
}

impl VersePlugin {
  pub fn new(config: VerseConfig) -> Self {
    Self { config }
  }
}

impl Plugin for VersePlugin {
  fn build(&self, app: &mut App) {
    log::info!(
      "Building pixel verse: {} ticks/s ({:?}), {}x{} regions",
      self.config.simulation.ticks_per_second,
      self.config.simulation.mode,
      self.config.space.region_count.x,
      self.config.space.region_count.y
    );

    if !app.world().contains_resource::<Matters>() {
      app.insert_resource(Matters::builtin());
    }
    if !app.world().contains_resource::<Space>() {
      app.insert_resource(Space::from_config(&self.config.space));
    }

    app
      .insert_resource(self.config.clone())
      .insert_resource(self.config.collision.clone())
      .insert_resource(Ticker::new(&self.config.simulation))
      .init_resource::<TickOutput>()
      .add_systems(Update, run_simulation);
  }
}

/// Runs the ticks the [`Ticker`] grants for this frame.
///
/// [`TickOutput`] holds what the ticks of this frame produced; it is
/// emptied at the start of every frame.
pub fn run_simulation(
  time: Res<Time>,
  mut ticker: ResMut<Ticker>,
  mut space: ResMut<Space>,
  matters: Res<Matters>,
  collision: Res<CollisionConfig>,
  mut output: ResMut<TickOutput>,
) {
  output.clear();
  let ticks = ticker.advance(time.elapsed_secs_f64());
  for _ in 0..ticks {
    let tick = simulate_tick(&mut space, &matters, &collision);
    output.merge(tick);
  }
}
