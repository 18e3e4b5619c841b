//! Pixel Verse - chunked falling-sand cellular automaton for Bevy.
//!
//! A [`Space`] holds regions of 8×8 chunks of 64×64 atoms. Every tick the
//! dirty parts of each chunk are redrawn into region pixel buffers, atoms
//! fall and flow in four race-free checkerboard batches, and chunks whose
//! contents changed get fresh collision contours.
//!
//! ```ignore
//! App::new()
//!   .add_plugins(MinimalPlugins)
//!   .add_plugins(VersePlugin::new(VerseConfig::load("verse.toml")?))
//!   .run();
//! ```

pub mod atom;
pub mod collision;
pub mod config;
pub mod coords;
pub mod matter;
pub mod primitives;
pub mod render;
pub mod scheduling;
pub mod simulation;
#[cfg(feature = "tracy")]
mod tracy_init;
pub mod world;

pub use atom::{Atom, AtomRecord};
pub use collision::{ChunkContours, CollisionConfig, rebuild_contours};
pub use config::{ConfigError, SimulationConfig, SpaceConfig, VerseConfig};
pub use coords::{CHUNK_SIZE, CHUNKS_PER_REGION, Coord, REGION_SIZE};
pub use matter::{
  Matter, MatterDef, MatterId, MatterState, Matters, MattersConfig, PhysicProperties,
  RegistryError,
};
pub use primitives::{Chunk, ChunkId, ChunkSnapshot, CoordRect, DirtyArea, RegionId, Surface};
pub use render::{PixelSpan, Rgba, rgb};
pub use simulation::{SimContext, TickMode, TickOutput, Ticker, simulate_tick};
#[cfg(feature = "tracy")]
pub use tracy_init::init_tracy;
pub use world::plugin::VersePlugin;
pub use world::{Region, RegionState, Space, SpaceError};
