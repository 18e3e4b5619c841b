//! Space - the owner of every region and chunk.
//!
//! Regions and chunks live in flat arenas addressed by [`RegionId`] and
//! [`ChunkId`]. Nothing is ever removed, so ids stay valid for the life of
//! the space.
//!
//! World edits outside instantiated regions are silently ignored.

mod linking;
pub mod plugin;
mod region;

use bevy::math::Vec2;
use bevy::prelude::Resource;
use log::{info, warn};
pub use region::{Region, RegionState, sorting_weight};

use crate::atom::Atom;
use crate::config::SpaceConfig;
use crate::coords::{
  CHUNK_SIZE, CHUNKS_IN_REGION, CHUNKS_PER_REGION, Coord, REGION_SIZE, chunk_local,
  region_to_chunk, space_to_world, world_to_region, world_to_region_local, world_to_space,
};
use crate::matter::{MatterId, Matters};
use crate::primitives::{CHUNK_BOUNDS, Chunk, ChunkId, CoordRect, Direction, RegionId};
use crate::render::{PixelSpan, refresh_pixels};
use crate::simulation::hash::hash31uu32;

/// Space construction failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpaceError {
  /// A region with this index already exists.
  RegionExists(Coord),
}

impl std::fmt::Display for SpaceError {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      SpaceError::RegionExists(index) => {
        write!(f, "region ({}, {}) already exists", index.x, index.y)
      }
    }
  }
}

impl std::error::Error for SpaceError {}

/// The simulated world.
#[derive(Resource)]
pub struct Space {
  chunks: Vec<Chunk>,
  regions: Vec<Region>,
  /// Region ids sorted by [`sorting_weight`] over the current bounds.
  order: Vec<RegionId>,
  /// Bounding rect of all region indices.
  bounds: Option<CoordRect>,
  /// Chunk ids per checkerboard batch.
  batches: [Vec<ChunkId>; 4],
  tick: u64,
  cells_per_meter: f32,
  origin: Vec2,
}

impl Default for Space {
  fn default() -> Self {
    Self::new(SpaceConfig::default().cells_per_meter, Vec2::ZERO)
  }
}

impl Space {
  /// Creates a space with no regions.
  pub fn new(cells_per_meter: f32, origin: Vec2) -> Self {
    Self {
      chunks: Vec::new(),
      regions: Vec::new(),
      order: Vec::new(),
      bounds: None,
      batches: Default::default(),
      tick: 0,
      cells_per_meter,
      origin,
    }
  }

  /// Creates a space with `region_count` empty, active regions.
  ///
  /// No generator runs: the regions start out empty and fully dirty.
  pub fn from_config(config: &SpaceConfig) -> Self {
    let mut space = Self::new(config.cells_per_meter, config.origin);
    for y in 0..config.region_count.y {
      for x in 0..config.region_count.x {
        let index = Coord::new(x, y);
        match space.instantiate_region(index) {
          Ok(_) => {
            space.activate_generated(index);
          }
          Err(e) => warn!("{}", e),
        }
      }
    }
    space
  }

  // --- Structure ---

  /// Creates the region at `index` with all its chunks and links them to
  /// their neighbors, including chunks of adjacent existing regions.
  ///
  /// The region starts in [`RegionState::PendingGeneration`].
  pub fn instantiate_region(&mut self, index: Coord) -> Result<RegionId, SpaceError> {
    if self.region_by_index(index).is_some() {
      return Err(SpaceError::RegionExists(index));
    }

    let region_id = RegionId(self.regions.len() as u32);
    let region_origin = index * REGION_SIZE;
    let mut created = Vec::with_capacity(CHUNKS_IN_REGION);

    for y in 0..CHUNKS_PER_REGION {
      for x in 0..CHUNKS_PER_REGION {
        let regional = Coord::new(x, y);
        let id = ChunkId(self.chunks.len() as u32);
        let chunk = Chunk::new(region_id, regional, region_origin);
        self.batches[chunk.batch_index() as usize].push(id);
        self.chunks.push(chunk);
        linking::link_inner(&mut self.chunks, &created, regional, id);
        created.push(id);
      }
    }

    let mut region = Region::new(index, created);
    region.set_state(RegionState::PendingGeneration);
    self.regions.push(region);
    self.order.push(region_id);
    self.bounds = Some(match self.bounds {
      Some(bounds) => bounds.include(index),
      None => CoordRect::point(index),
    });
    self.sort_regions();
    self.link_outer(region_id);

    info!(
      "Region ({}, {}) created with {} chunks",
      index.x, index.y, CHUNKS_IN_REGION
    );

    if cfg!(debug_assertions) {
      self.verify_links();
    }
    Ok(region_id)
  }

  fn sort_regions(&mut self) {
    let width = self.bounds.map_or(1, |b| b.width());
    let regions = &self.regions;
    self
      .order
      .sort_by_key(|id| regions[id.index()].sorting_weight(width));
  }

  /// Links the border chunks of a new region to chunks of regions that
  /// already exist around it.
  fn link_outer(&mut self, region_id: RegionId) {
    let region_index = self.regions[region_id.index()].index();
    for slot in 0..CHUNKS_IN_REGION {
      let id = self.regions[region_id.index()].chunk_ids()[slot];
      let chunk = &self.chunks[id.index()];
      if !linking::on_border(chunk.regional_index()) {
        continue;
      }
      let spatial = chunk.spatial_index();
      for direction in Direction::ALL {
        let target = spatial + direction.offset();
        if target.div_euclid(Coord::splat(CHUNKS_PER_REGION)) == region_index {
          continue;
        }
        if let Some(other) = self.chunk_at_spatial(target) {
          linking::link(&mut self.chunks, id, direction, other);
        }
      }
    }
  }

  /// Panics if any chunk link is one-sided or spatially wrong.
  pub fn verify_links(&self) {
    linking::verify(&self.chunks);
  }

  /// Finds a region by index.
  ///
  /// This is a linear scan over the sorted region list; spaces hold few
  /// regions.
  pub fn region_by_index(&self, index: Coord) -> Option<RegionId> {
    self
      .order
      .iter()
      .copied()
      .find(|id| self.regions[id.index()].index() == index)
  }

  /// Chunk at a world chunk grid position.
  pub fn chunk_at_spatial(&self, spatial: Coord) -> Option<ChunkId> {
    let per_region = Coord::splat(CHUNKS_PER_REGION);
    let region = self.region_by_index(spatial.div_euclid(per_region))?;
    self.regions[region.index()].chunk_at(spatial.rem_euclid(per_region))
  }

  #[inline]
  pub fn region(&self, id: RegionId) -> Option<&Region> {
    self.regions.get(id.index())
  }

  /// Regions in sorted order.
  pub fn regions(&self) -> impl Iterator<Item = &Region> {
    self.order.iter().map(|id| &self.regions[id.index()])
  }

  /// Bounding rect of all region indices.
  #[inline]
  pub fn bounds(&self) -> Option<CoordRect> {
    self.bounds
  }

  #[inline]
  pub fn chunk(&self, id: ChunkId) -> Option<&Chunk> {
    self.chunks.get(id.index())
  }

  /// Mutable chunk access for bulk writers such as world generators.
  #[inline]
  pub fn chunk_mut(&mut self, id: ChunkId) -> Option<&mut Chunk> {
    self.chunks.get_mut(id.index())
  }

  #[inline]
  pub fn chunks(&self) -> &[Chunk] {
    &self.chunks
  }

  /// Chunk ids of one checkerboard batch.
  #[inline]
  pub fn batch(&self, batch: u8) -> &[ChunkId] {
    &self.batches[batch as usize & 3]
  }

  pub(crate) fn regions_and_chunks_mut(&mut self) -> (&mut [Region], &[Chunk]) {
    (&mut self.regions, &self.chunks)
  }

  /// Split borrow used by the tick passes.
  pub(crate) fn batches_and_chunks_mut(
    &mut self,
  ) -> (&[Vec<ChunkId>; 4], &[Region], &mut [Chunk]) {
    (&self.batches, &self.regions, &mut self.chunks)
  }

  // --- Lifecycle ---

  /// Moves a region along its lifecycle. Returns `false` for unknown
  /// regions and disallowed transitions.
  pub fn set_region_state(&mut self, index: Coord, state: RegionState) -> bool {
    let Some(id) = self.region_by_index(index) else {
      return false;
    };
    let region = &mut self.regions[id.index()];
    if !region.state().can_become(state) {
      warn!(
        "Region ({}, {}) cannot go from {:?} to {:?}",
        index.x,
        index.y,
        region.state(),
        state
      );
      return false;
    }
    region.set_state(state);
    true
  }

  /// Hands a generated or loaded region over to the simulation: every chunk
  /// is marked fully dirty and the region becomes active.
  pub fn activate_generated(&mut self, index: Coord) -> bool {
    if !self.set_region_state(index, RegionState::Active) {
      return false;
    }
    let Some(id) = self.region_by_index(index) else {
      return false;
    };
    for &chunk in self.regions[id.index()].chunk_ids() {
      self.chunks[chunk.index()].mark_all_dirty();
    }
    true
  }

  // --- Ticks ---

  #[inline]
  pub fn tick(&self) -> u64 {
    self.tick
  }

  /// Advances the tick counter and returns the new value.
  #[inline]
  pub fn increment_tick(&mut self) -> u64 {
    self.tick += 1;
    self.tick
  }

  /// Copies dirty chunk colors into the region pixel buffers.
  pub fn refresh_pixels(&mut self) -> Vec<PixelSpan> {
    refresh_pixels(self)
  }

  // --- Coordinates ---

  #[inline]
  pub fn cells_per_meter(&self) -> f32 {
    self.cells_per_meter
  }

  #[inline]
  pub fn origin(&self) -> Vec2 {
    self.origin
  }

  /// World-space position to cell, `floor((pos - origin) * cells_per_meter)`.
  #[inline]
  pub fn world_to_space(&self, pos: Vec2) -> Coord {
    world_to_space(pos, self.origin, self.cells_per_meter)
  }

  /// Bottom-left corner of a cell in world space.
  #[inline]
  pub fn space_to_world(&self, coord: Coord) -> Vec2 {
    space_to_world(coord, self.origin, self.cells_per_meter)
  }

  /// Resolves a world cell to its chunk and chunk-local cell.
  pub fn locate(&self, coord: Coord) -> Option<(ChunkId, Coord)> {
    let region = self.region_by_index(world_to_region(coord))?;
    let chunk = self.regions[region.index()]
      .chunk_at(region_to_chunk(world_to_region_local(coord)))?;
    Some((chunk, chunk_local(coord)))
  }

  // --- Atoms ---

  pub fn get_atom(&self, coord: Coord) -> Option<Atom> {
    let (chunk, local) = self.locate(coord)?;
    Some(self.chunks[chunk.index()].atom(local))
  }

  /// Writes an atom and marks its surroundings dirty. Returns `false`
  /// outside instantiated regions.
  pub fn set_atom(&mut self, coord: Coord, atom: Atom) -> bool {
    let Some((chunk, local)) = self.locate(coord) else {
      return false;
    };
    self.chunks[chunk.index()].set_atom(local, atom);
    self.mark_dirty(CoordRect::around(coord, 1));
    true
  }

  /// Creates a resting atom of `matter` at a world cell.
  pub fn create_atom(&mut self, coord: Coord, matter: MatterId, matters: &Matters) -> bool {
    let Some(def) = matters.get(matter) else {
      warn!("Cannot create atom of unregistered matter {:?}", matter);
      return false;
    };
    let seed = hash31uu32(coord.x as u32, coord.y as u32, self.tick as u32);
    self.set_atom(coord, Atom::create(matter, def, seed))
  }

  /// Empties a world cell.
  pub fn remove_atom(&mut self, coord: Coord) -> bool {
    self.set_atom(coord, Atom::EMPTY)
  }

  /// Fills the empty cells of a disc with new atoms of `matter`.
  ///
  /// Returns the number of atoms created.
  pub fn paint(
    &mut self,
    center: Coord,
    radius: i32,
    matter: MatterId,
    matters: &Matters,
    seed: u32,
  ) -> usize {
    let Some(def) = matters.get(matter) else {
      warn!("Cannot paint unregistered matter {:?}", matter);
      return 0;
    };
    let radius = radius.clamp(0, CHUNK_SIZE);
    let mut reached = false;
    let mut painted = 0;

    for coord in disc(center, radius) {
      let Some((chunk, local)) = self.locate(coord) else {
        continue;
      };
      reached = true;
      let chunk = &mut self.chunks[chunk.index()];
      if !chunk.atom(local).is_empty() {
        continue;
      }
      let color_seed = hash31uu32(seed, coord.x as u32, coord.y as u32);
      chunk.set_atom(local, Atom::create(matter, def, color_seed));
      painted += 1;
    }

    self.finish_brush(center, radius, reached, "Paint");
    painted
  }

  /// Empties every cell of a disc. Returns the number of atoms removed.
  pub fn erase(&mut self, center: Coord, radius: i32) -> usize {
    let radius = radius.clamp(0, CHUNK_SIZE);
    let mut reached = false;
    let mut erased = 0;

    for coord in disc(center, radius) {
      let Some((chunk, local)) = self.locate(coord) else {
        continue;
      };
      reached = true;
      let chunk = &mut self.chunks[chunk.index()];
      if chunk.atom(local).is_empty() {
        continue;
      }
      chunk.set_atom(local, Atom::EMPTY);
      erased += 1;
    }

    self.finish_brush(center, radius, reached, "Erase");
    erased
  }

  fn finish_brush(&mut self, center: Coord, radius: i32, reached: bool, what: &str) {
    if !reached {
      warn!(
        "{} at ({}, {}) is outside every region",
        what, center.x, center.y
      );
      return;
    }
    self.mark_dirty(CoordRect::around(center, radius + 1));
  }

  // --- Dirty tracking ---

  /// Marks a world rect dirty in every chunk it touches.
  ///
  /// The rect is narrowed to each overlapped region, then to each overlapped
  /// chunk. Parts outside instantiated regions are dropped.
  pub fn mark_dirty(&mut self, rect: CoordRect) {
    let first = world_to_region(rect.min);
    let last = world_to_region(rect.max);
    for ry in first.y..=last.y {
      for rx in first.x..=last.x {
        let index = Coord::new(rx, ry);
        let Some(region) = self.region_by_index(index) else {
          continue;
        };
        let region_rect = CoordRect::square(REGION_SIZE).shifted(index * REGION_SIZE);
        if let Some(part) = rect.intersection(&region_rect) {
          self.mark_region_dirty(region, part);
        }
      }
    }
  }

  fn mark_region_dirty(&mut self, region: RegionId, rect: CoordRect) {
    let region = &self.regions[region.index()];
    let origin = region.origin();
    let local = rect.shifted(-origin);
    let first = region_to_chunk(local.min);
    let last = region_to_chunk(local.max);
    for cy in first.y..=last.y {
      for cx in first.x..=last.x {
        let Some(chunk) = region.chunk_at(Coord::new(cx, cy)) else {
          continue;
        };
        let chunk = &mut self.chunks[chunk.index()];
        if let Some(part) = rect
          .shifted(-chunk.spatial_origin())
          .intersection(&CHUNK_BOUNDS)
        {
          chunk.mark_dirty(part, false);
        }
      }
    }
  }
}

/// Cells of a disc: for each column `x` in `-r..=r`, rows
/// `-h..=h` with `h = floor(sqrt(r² - x²))`.
fn disc(center: Coord, radius: i32) -> impl Iterator<Item = Coord> {
  (-radius..=radius).flat_map(move |x| {
    let h = ((radius * radius - x * x) as f32).sqrt().floor() as i32;
    (-h..=h).map(move |y| center + Coord::new(x, y))
  })
}
