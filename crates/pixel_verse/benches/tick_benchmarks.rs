//! Benchmarks for whole simulation ticks and contour extraction.
//!
//! Scenes range from an idle region (dirty tracking skips everything) to a
//! region full of falling powder and liquid.

use bevy::math::{IVec2, Vec2};
use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use pixel_verse::collision::marching_squares;
use pixel_verse::{CollisionConfig, Coord, Matters, Space, Surface, simulate_tick};
use rand::prelude::*;

fn active_space(regions: IVec2) -> Space {
  let mut space = Space::default();
  for y in 0..regions.y {
    for x in 0..regions.x {
      let index = IVec2::new(x, y);
      space.instantiate_region(index).unwrap();
      space.activate_generated(index);
    }
  }
  space
}

/// Region with a stone floor and a rain of sand and water above it.
fn rain_scene(matters: &Matters, density: f64, seed: u64) -> Space {
  let mut space = active_space(IVec2::ONE);
  let mut rng = StdRng::seed_from_u64(seed);
  let stone = matters.id_of("stone").unwrap();
  let sand = matters.id_of("sand").unwrap();
  let water = matters.id_of("water").unwrap();

  for x in 0..512 {
    space.create_atom(IVec2::new(x, 0), stone, matters);
  }
  for y in 64..448 {
    for x in 0..512 {
      if rng.gen_bool(density) {
        let id = if rng.gen_bool(0.5) { sand } else { water };
        space.create_atom(IVec2::new(x, y), id, matters);
      }
    }
  }
  space
}

fn bench_idle(c: &mut Criterion) {
  let matters = Matters::builtin();
  let collision = CollisionConfig::default();
  let mut group = c.benchmark_group("tick/idle");

  for regions in [IVec2::ONE, IVec2::splat(2), IVec2::splat(4)] {
    let mut space = active_space(regions);
    simulate_tick(&mut space, &matters, &collision);
    let label = format!("{}x{}", regions.x, regions.y);
    group.bench_with_input(BenchmarkId::from_parameter(label), &regions, |b, _| {
      b.iter(|| simulate_tick(black_box(&mut space), &matters, &collision))
    });
  }
  group.finish();
}

fn bench_rain(c: &mut Criterion) {
  let matters = Matters::builtin();
  let collision = CollisionConfig::default();
  let mut group = c.benchmark_group("tick/rain");
  group.sample_size(20);

  for density in [0.05, 0.25, 0.5] {
    group.throughput(Throughput::Elements(512 * 384));
    group.bench_with_input(
      BenchmarkId::from_parameter(density),
      &density,
      |b, &density| {
        b.iter_batched(
          || rain_scene(&matters, density, 1),
          |mut space| {
            for _ in 0..8 {
              simulate_tick(&mut space, &matters, &collision);
            }
            space
          },
          criterion::BatchSize::LargeInput,
        )
      },
    );
  }
  group.finish();
}

fn bench_contours(c: &mut Criterion) {
  let mut group = c.benchmark_group("collision/marching_squares");
  group.throughput(Throughput::Elements(1));
  let mut rng = StdRng::seed_from_u64(3);

  let mut terrain = Surface::new(66, 66);
  for x in 1..65 {
    let height = 32 + rng.gen_range(-4..=4);
    for y in 1..height {
      terrain.set(Coord::new(x, y), true);
    }
  }
  let mut noise = Surface::new(66, 66);
  for y in 1..65 {
    for x in 1..65 {
      noise.set(Coord::new(x, y), rng.gen_bool(0.5));
    }
  }

  for (name, grid) in [("terrain", &terrain), ("noise", &noise)] {
    group.bench_with_input(BenchmarkId::from_parameter(name), grid, |b, grid| {
      b.iter(|| marching_squares(black_box(grid), Vec2::ZERO))
    });
  }
  group.finish();
}

criterion_group!(benches, bench_idle, bench_rain, bench_contours);
criterion_main!(benches);
