//! Scene file parsing.

use std::path::Path;

use anyhow::{Context, Result};
use scene_index::IndexConfig;
use serde::Deserialize;

/// Root of a scene file: an `[index]` table and a `[simulation]` table.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SceneFile {
  pub index: IndexConfig,
  pub simulation: Simulation,
}

/// Random-walk parameters.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Simulation {
  pub entities: usize,
  pub ticks: u32,
  /// Maximum per-axis displacement per tick.
  pub step: f64,
  /// Share of entities spawned static, 0.0-1.0.
  pub static_fraction: f64,
  pub seed: u64,
}

impl Default for Simulation {
  fn default() -> Self {
    Self {
      entities: 1_000,
      ticks: 10,
      step: 8.0,
      static_fraction: 0.1,
      seed: 0,
    }
  }
}

impl SceneFile {
  /// Load a scene from a TOML file.
  pub fn load(path: &Path) -> Result<Self> {
    let content = std::fs::read_to_string(path)
      .with_context(|| format!("Failed to read scene file: {}", path.display()))?;
    let scene: SceneFile = toml::from_str(&content).context("Failed to parse scene TOML")?;

    if !(0.0..=1.0).contains(&scene.simulation.static_fraction) {
      anyhow::bail!(
        "static_fraction must be within 0.0-1.0, got {}",
        scene.simulation.static_fraction
      );
    }
    if !scene.simulation.step.is_finite() || scene.simulation.step < 0.0 {
      anyhow::bail!("step must be a non-negative number, got {}", scene.simulation.step);
    }

    Ok(scene)
  }
}
