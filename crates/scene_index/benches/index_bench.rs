//! Spatial index benchmarks.
//!
//! - **build**: uniform tessellation at increasing depth
//! - **insert**: point placement of a fixed entity set
//! - **retrack**: one tick of random-walk movement

use std::collections::HashMap;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use scene_index::glam::DVec3;
use scene_index::{IndexConfig, OctIndex, QuadIndex};

const EXTENT: f64 = 1024.0;
const ENTITIES: usize = 10_000;

fn config(max_depth: u32) -> IndexConfig {
  IndexConfig {
    region_extent: EXTENT,
    max_depth,
    ..IndexConfig::default()
  }
}

fn scatter(rng: &mut StdRng, count: usize) -> HashMap<u32, DVec3> {
  let half = EXTENT * 0.5;
  (0..count as u32)
    .map(|id| {
      let p = DVec3::new(
        rng.random_range(-half..half),
        rng.random_range(-half..half),
        rng.random_range(-half..half),
      );
      (id, p)
    })
    .collect()
}

fn bench_build(c: &mut Criterion) {
  let mut group = c.benchmark_group("build");

  for depth in [2, 4, 6] {
    group.bench_with_input(BenchmarkId::new("quad", depth), &depth, |b, &depth| {
      b.iter(|| black_box(QuadIndex::<u32>::build(&config(depth)).unwrap()))
    });
  }
  for depth in [2, 3, 4] {
    group.bench_with_input(BenchmarkId::new("oct", depth), &depth, |b, &depth| {
      b.iter(|| black_box(OctIndex::<u32>::build(&config(depth)).unwrap()))
    });
  }

  group.finish();
}

fn bench_insert(c: &mut Criterion) {
  let mut group = c.benchmark_group("insert");
  group.throughput(Throughput::Elements(ENTITIES as u64));

  let positions = scatter(&mut StdRng::seed_from_u64(1), ENTITIES);
  let empty = OctIndex::<u32>::build(&config(4)).unwrap();

  group.bench_function("oct_depth_4", |b| {
    b.iter(|| {
      let mut index = empty.clone();
      for (&id, &p) in &positions {
        index.insert_or_update(id, p, false).unwrap();
      }
      black_box(index.len())
    })
  });

  group.finish();
}

fn bench_retrack(c: &mut Criterion) {
  let mut group = c.benchmark_group("retrack");
  group.throughput(Throughput::Elements(ENTITIES as u64));

  let mut rng = StdRng::seed_from_u64(2);
  let start = scatter(&mut rng, ENTITIES);
  let mut index = OctIndex::<u32>::build(&config(4)).unwrap();
  for (&id, &p) in &start {
    index.insert_or_update(id, p, false).unwrap();
  }

  // Small steps: most entities stay in their leaf.
  let half = EXTENT * 0.5 - 1.0;
  let moved: HashMap<u32, DVec3> = start
    .iter()
    .map(|(&id, &p)| {
      let step = DVec3::new(
        rng.random_range(-4.0..4.0),
        rng.random_range(-4.0..4.0),
        rng.random_range(-4.0..4.0),
      );
      (id, (p + step).clamp(DVec3::splat(-half), DVec3::splat(half)))
    })
    .collect();

  group.bench_function("oct_depth_4_small_steps", |b| {
    b.iter(|| {
      let mut index = index.clone();
      black_box(index.retrack(&moved).rehomed.len())
    })
  });

  group.finish();
}

criterion_group!(benches, bench_build, bench_insert, bench_retrack);
criterion_main!(benches);
