//! Scene index inspector.
//!
//! Builds a quadtree or octree index from a scene file, scatters entities
//! with a seeded RNG, random-walks the dynamic ones for a number of ticks,
//! and reports re-homes, evictions, consistency, and optionally the tree.
//!
//! ```text
//! RUST_LOG=scene_index=debug index_inspect --config scene.toml --octree --dump
//! ```

mod config;

use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use scene_index::{Direction, Oct, Quad, RegionVector, SpatialIndex, SpatialTopology};
use tracing::info;
use tracing_subscriber::EnvFilter;

use config::SceneFile;

#[derive(Parser, Debug)]
#[command(name = "index_inspect")]
#[command(about = "Simulates entity movement through a scene index and reports")]
struct Args {
  /// Scene TOML file. Defaults apply when omitted.
  #[arg(short, long)]
  config: Option<PathBuf>,

  /// Override the number of entities.
  #[arg(short, long)]
  entities: Option<usize>,

  /// Override the number of ticks.
  #[arg(short, long)]
  ticks: Option<u32>,

  /// Override the RNG seed.
  #[arg(long)]
  seed: Option<u64>,

  /// Index a cube instead of a square.
  #[arg(long)]
  octree: bool,

  /// Print the occupied part of the tree after the run.
  #[arg(long)]
  dump: bool,
}

fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
    .init();

  let args = Args::parse();
  let mut scene = match &args.config {
    Some(path) => SceneFile::load(path)?,
    None => SceneFile::default(),
  };
  if let Some(entities) = args.entities {
    scene.simulation.entities = entities;
  }
  if let Some(ticks) = args.ticks {
    scene.simulation.ticks = ticks;
  }
  if let Some(seed) = args.seed {
    scene.simulation.seed = seed;
  }

  if args.octree {
    run::<Oct>(&scene, args.dump)
  } else {
    run::<Quad>(&scene, args.dump)
  }
}

fn random_vector<V: RegionVector>(rng: &mut StdRng, half: f64) -> V {
  if half <= 0.0 {
    return V::splat(0.0);
  }
  V::from_array3([
    rng.random_range(-half..half),
    rng.random_range(-half..half),
    rng.random_range(-half..half),
  ])
}

fn run<T: SpatialTopology>(scene: &SceneFile, dump: bool) -> Result<()> {
  let sim = &scene.simulation;
  let mut index: SpatialIndex<T, u32> =
    SpatialIndex::build(&scene.index).context("Invalid [index] configuration")?;
  let mut rng = StdRng::seed_from_u64(sim.seed);

  println!(
    "{:?} index: extent {}, depth {}, {} nodes, leaf side {}",
    T::default(),
    scene.index.region_extent,
    scene.index.max_depth,
    index.tree().node_count(),
    scene.index.side_length_at(scene.index.max_depth),
  );

  let mut positions: HashMap<u32, T::Vector> = HashMap::with_capacity(sim.entities);
  let mut misses = 0;
  for entity in 0..sim.entities as u32 {
    let position = random_vector(&mut rng, scene.index.region_extent * 0.5);
    let is_static = rng.random_bool(sim.static_fraction);
    match index.insert_or_update(entity, position, is_static) {
      Ok(_) => {
        positions.insert(entity, position);
      }
      Err(_) => misses += 1,
    }
  }
  println!("placed {} entities ({} misses)", index.len(), misses);

  for tick in 1..=sim.ticks {
    for (entity, position) in positions.iter_mut() {
      let is_static = index.tracked(entity).is_some_and(|record| record.is_static);
      if !is_static {
        *position = position.mul_add_scalar(random_vector(&mut rng, 1.0), sim.step);
      }
    }

    let report = index.retrack(&positions);
    for entity in report.evicted.iter().chain(&report.untracked) {
      positions.remove(entity);
    }
    println!(
      "tick {:>3}: checked {:>6}  rehomed {:>5}  evicted {:>4}",
      tick,
      report.checked,
      report.rehomed.len(),
      report.evicted.len(),
    );
  }

  let metrics = index.metrics();
  info!(
    avg_retrack_us = metrics.avg_retrack_us(),
    total_rehomed = metrics.total_rehomed,
    total_misses = metrics.total_misses,
    "simulation finished"
  );

  report_busiest_leaf(&index);

  let report = index.check_consistency();
  println!(
    "consistency: {} entities, {} nodes, {} errors",
    report.entities_checked,
    report.nodes_checked,
    report.errors.len()
  );
  report.into_result().context("Index is inconsistent")?;

  if dump {
    print!("{}", index.dump().occupied_only());
  }
  Ok(())
}

/// Print the fullest leaf and what its neighbours hold.
fn report_busiest_leaf<T: SpatialTopology>(index: &SpatialIndex<T, u32>) {
  let Some(busiest) = index
    .tree()
    .leaves()
    .max_by_key(|leaf| leaf.data().entities.len())
  else {
    return;
  };

  println!(
    "busiest leaf {:?}: {} entities",
    busiest.id(),
    busiest.data().entities.len()
  );
  for (&dir, neighbour) in T::DIRECTIONS.iter().zip(index.neighbours_of(busiest.id())) {
    let count = neighbour.map_or(0, |id| index.entities_at(id).len());
    let label = match neighbour {
      Some(_) => format!("{} entities", count),
      None => "boundary".to_string(),
    };
    println!("  {:<6} {}", direction_name(dir), label);
  }
}

fn direction_name(dir: Direction) -> &'static str {
  match dir {
    Direction::Up => "up",
    Direction::Down => "down",
    Direction::Left => "left",
    Direction::Right => "right",
    Direction::Top => "top",
    Direction::Bottom => "bottom",
  }
}
