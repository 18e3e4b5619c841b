//! E2E tests for atom movement.
//!
//! Each test builds a small scene in an active region, runs whole ticks and
//! checks where the atoms ended up.

use std::collections::HashMap;

use bevy::math::IVec2;
use pixel_verse::{
  Atom, CollisionConfig, CoordRect, MatterId, Matters, RegionState, Space, simulate_tick,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

struct Scene {
  space: Space,
  matters: Matters,
  collision: CollisionConfig,
}

impl Scene {
  /// One active region at (0, 0), already swept once so no chunk is dirty.
  fn new() -> Self {
    Self::with_regions(&[IVec2::ZERO])
  }

  fn with_regions(regions: &[IVec2]) -> Self {
    let mut space = Space::default();
    for &index in regions {
      space.instantiate_region(index).unwrap();
      assert!(space.activate_generated(index));
    }
    let mut scene = Self {
      space,
      matters: Matters::builtin(),
      collision: CollisionConfig::default(),
    };
    scene.tick();
    assert!(
      scene
        .space
        .chunks()
        .iter()
        .all(|c| !c.dirty_area().is_active())
    );
    scene
  }

  fn id(&self, name: &str) -> MatterId {
    self.matters.id_of(name).unwrap()
  }

  fn put(&mut self, name: &str, at: IVec2) {
    let id = self.id(name);
    assert!(self.space.create_atom(at, id, &self.matters));
  }

  fn matter_at(&self, at: IVec2) -> MatterId {
    self.space.get_atom(at).unwrap().matter
  }

  fn is(&self, name: &str, at: IVec2) -> bool {
    self.matter_at(at) == self.id(name)
  }

  fn tick(&mut self) {
    simulate_tick(&mut self.space, &self.matters, &self.collision);
  }

  fn ticks(&mut self, n: usize) {
    for _ in 0..n {
      self.tick();
    }
  }

  /// Stone floor on `y = 0` and walls on both sides of column `x`, leaving
  /// a one-cell-wide well.
  fn well(&mut self, x: i32, height: i32) {
    for dx in -1..=1 {
      self.put("stone", IVec2::new(x + dx, 0));
    }
    for y in 1..=height {
      self.put("stone", IVec2::new(x - 1, y));
      self.put("stone", IVec2::new(x + 1, y));
    }
  }

  fn census(&self) -> HashMap<MatterId, usize> {
    let mut counts = HashMap::new();
    for chunk in self.space.chunks() {
      for atom in chunk.atoms() {
        if !atom.is_empty() {
          *counts.entry(atom.matter).or_insert(0) += 1;
        }
      }
    }
    counts
  }
}

#[test]
fn liquid_column_settles_in_three_ticks() {
  let mut scene = Scene::new();
  scene.well(10, 10);
  for y in 4..=6 {
    scene.put("water", IVec2::new(10, y));
  }

  scene.ticks(3);

  for y in 1..=3 {
    assert!(scene.is("water", IVec2::new(10, y)), "no water at y = {y}");
  }
  for y in 4..=6 {
    assert!(
      scene.matter_at(IVec2::new(10, y)).is_empty(),
      "water left at y = {y}"
    );
  }
}

#[test]
fn settled_column_goes_quiet() {
  let mut scene = Scene::new();
  scene.well(10, 10);
  for y in 1..=3 {
    scene.put("water", IVec2::new(10, y));
  }

  scene.ticks(3);

  assert!(
    scene
      .space
      .chunks()
      .iter()
      .all(|c| !c.dirty_area().is_active())
  );
  for y in 1..=3 {
    assert!(scene.is("water", IVec2::new(10, y)));
  }
}

#[test]
fn atom_crosses_chunk_boundary_and_marks_neighbor() {
  let mut scene = Scene::new();
  let water = scene.id("water");
  let def = scene.matters.get(water).unwrap().clone();

  // Write without marking the lower chunk, then dirty only the upper one.
  let (upper, local) = scene.space.locate(IVec2::new(10, 64)).unwrap();
  let (lower, _) = scene.space.locate(IVec2::new(10, 63)).unwrap();
  let chunk = scene.space.chunk_mut(upper).unwrap();
  chunk.set_atom(local, Atom::create(water, &def, 0));
  chunk.mark_dirty(CoordRect::point(local), false);
  assert!(!scene.space.chunk(lower).unwrap().dirty_area().is_active());

  scene.tick();

  assert!(scene.is("water", IVec2::new(10, 63)));
  assert!(scene.matter_at(IVec2::new(10, 64)).is_empty());
  let dirty = scene
    .space
    .chunk(lower)
    .unwrap()
    .dirty_area()
    .rect()
    .expect("lower chunk should be dirty");
  assert!(dirty.contains(IVec2::new(10, 63)), "dirty = {dirty:?}");
}

#[test]
fn atom_resting_in_a_later_batch_stays_visible() {
  let mut scene = Scene::new();
  for x in 9..=11 {
    scene.put("stone", IVec2::new(x, 126));
  }
  for y in 127..=130 {
    scene.put("stone", IVec2::new(9, y));
    scene.put("stone", IVec2::new(11, y));
  }
  scene.put("water", IVec2::new(10, 128));
  let color = scene.space.get_atom(IVec2::new(10, 128)).unwrap().color;

  let (upper, _) = scene.space.locate(IVec2::new(10, 128)).unwrap();
  let (lower, _) = scene.space.locate(IVec2::new(10, 127)).unwrap();
  let batch = |id| scene.space.chunk(id).unwrap().batch_index();
  assert!(batch(upper) < batch(lower));

  scene.tick();

  assert!(scene.is("water", IVec2::new(10, 127)));
  let dirty = scene
    .space
    .chunk(lower)
    .unwrap()
    .dirty_area()
    .rect()
    .expect("lower chunk should stay dirty");
  assert!(dirty.contains(IVec2::new(10, 63)), "dirty = {dirty:?}");

  scene.ticks(4);

  assert!(scene.is("water", IVec2::new(10, 127)));
  let region = scene.space.regions().next().unwrap();
  assert_eq!(region.pixels()[IVec2::new(10, 127)], color);
  assert_eq!(
    region.pixels()[IVec2::new(10, 128)],
    pixel_verse::render::TRANSPARENT
  );
}

#[test]
fn atom_crosses_region_boundary() {
  let mut scene = Scene::with_regions(&[IVec2::new(0, 0), IVec2::new(0, 1)]);
  scene.put("sand", IVec2::new(100, 512));
  scene.tick();
  assert!(scene.is("sand", IVec2::new(100, 511)));
}

#[test]
fn world_edge_blocks_falling() {
  let mut scene = Scene::new();
  scene.put("sand", IVec2::new(5, 0));
  scene.ticks(5);
  assert!(scene.is("sand", IVec2::new(5, 0)));
}

#[test]
fn denser_powder_sinks_through_liquid() {
  let mut scene = Scene::new();
  scene.well(10, 6);
  scene.put("water", IVec2::new(10, 1));
  scene.put("sand", IVec2::new(10, 2));

  scene.ticks(3);

  assert!(scene.is("sand", IVec2::new(10, 1)));
  assert!(scene.is("water", IVec2::new(10, 2)));
}

#[test]
fn water_sinks_below_oil() {
  let mut scene = Scene::new();
  scene.well(20, 6);
  scene.put("oil", IVec2::new(20, 1));
  scene.put("water", IVec2::new(20, 2));

  scene.ticks(3);

  assert!(scene.is("water", IVec2::new(20, 1)));
  assert!(scene.is("oil", IVec2::new(20, 2)));
}

#[test]
fn lighter_liquid_stays_on_top() {
  let mut scene = Scene::new();
  scene.well(20, 6);
  scene.put("water", IVec2::new(20, 1));
  scene.put("oil", IVec2::new(20, 2));

  scene.ticks(3);

  assert!(scene.is("water", IVec2::new(20, 1)));
  assert!(scene.is("oil", IVec2::new(20, 2)));
}

#[test]
fn powder_slides_off_diagonally() {
  let mut scene = Scene::new();
  for x in 20..=40 {
    scene.put("stone", IVec2::new(x, 0));
  }
  scene.put("sand", IVec2::new(30, 1));
  scene.put("sand", IVec2::new(30, 2));

  scene.ticks(2);

  assert!(scene.is("sand", IVec2::new(30, 1)));
  assert!(scene.matter_at(IVec2::new(30, 2)).is_empty());
  let left = scene.is("sand", IVec2::new(29, 1));
  let right = scene.is("sand", IVec2::new(31, 1));
  assert!(left ^ right, "left = {left}, right = {right}");
}

#[test]
fn powder_on_flat_floor_does_not_spread() {
  let mut scene = Scene::new();
  for x in 20..=40 {
    scene.put("stone", IVec2::new(x, 0));
  }
  scene.put("sand", IVec2::new(30, 1));
  scene.ticks(4);
  assert!(scene.is("sand", IVec2::new(30, 1)));
}

#[test]
fn liquid_flows_sideways_on_flat_floor() {
  let mut scene = Scene::new();
  for x in 20..=40 {
    scene.put("stone", IVec2::new(x, 0));
  }
  scene.put("water", IVec2::new(30, 1));

  scene.tick();

  assert!(scene.matter_at(IVec2::new(30, 1)).is_empty());
  let water = scene.id("water");
  let on_row = (20..=40)
    .filter(|&x| scene.matter_at(IVec2::new(x, 1)) == water)
    .count();
  assert_eq!(on_row, 1);
}

#[test]
fn solids_never_move() {
  let mut scene = Scene::new();
  scene.put("stone", IVec2::new(50, 50));
  scene.ticks(5);
  assert!(scene.is("stone", IVec2::new(50, 50)));
}

#[test]
fn gases_and_plasma_stay_put() {
  let mut scene = Scene::new();
  scene.put("steam", IVec2::new(60, 60));
  scene.put("fire", IVec2::new(70, 60));
  scene.ticks(5);
  assert!(scene.is("steam", IVec2::new(60, 60)));
  assert!(scene.is("fire", IVec2::new(70, 60)));
}

#[test]
fn gravity_accelerates_falling_atoms() {
  let mut scene = Scene::new();
  scene.put("sand", IVec2::new(200, 400));

  scene.ticks(30);

  let sand = scene.id("sand");
  let y = (0..=400)
    .find(|&y| scene.matter_at(IVec2::new(200, y)) == sand)
    .expect("sand vanished");
  assert!(y <= 360, "sand only fell to y = {y}");
  assert!(y > 0);
}

#[test]
fn random_scene_conserves_atoms() {
  let mut scene = Scene::new();
  let names = ["sand", "water", "oil", "stone"];
  let mut rng = StdRng::seed_from_u64(0x5eed);
  for y in 40..100 {
    for x in 40..100 {
      if rng.gen_bool(0.45) {
        let name = names[rng.gen_range(0..names.len())];
        scene.put(name, IVec2::new(x, y));
      }
    }
  }
  let before = scene.census();

  scene.ticks(40);

  assert_eq!(scene.census(), before);
}

#[test]
fn sleeping_region_is_frozen() {
  let mut scene = Scene::new();
  scene.put("sand", IVec2::new(100, 100));
  assert!(
    scene
      .space
      .set_region_state(IVec2::ZERO, RegionState::Sleeping)
  );
  scene.ticks(3);
  assert!(scene.is("sand", IVec2::new(100, 100)));

  assert!(
    scene
      .space
      .set_region_state(IVec2::ZERO, RegionState::Active)
  );
  scene.tick();
  assert!(scene.is("sand", IVec2::new(100, 99)));
}

#[test]
fn pixels_show_previous_tick() {
  let mut scene = Scene::new();
  scene.put("sand", IVec2::new(100, 100));
  let color = scene.space.get_atom(IVec2::new(100, 100)).unwrap().color;

  scene.tick();
  let region = scene.space.regions().next().unwrap();
  assert_eq!(region.pixels()[IVec2::new(100, 100)], color);

  scene.tick();
  let region = scene.space.regions().next().unwrap();
  assert_eq!(region.pixels()[IVec2::new(100, 99)], color);
  assert_eq!(
    region.pixels()[IVec2::new(100, 100)],
    pixel_verse::render::TRANSPARENT
  );
}
