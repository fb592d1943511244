//! IndexConfig - region size, tessellation depth, and placement rules.

use std::path::Path;

use serde::Deserialize;

use crate::error::ConfigError;
use crate::subdivision::topology::Topology;

/// Upper bound on `DIMENSIONS * max_depth`, i.e. at most 2^24 leaves.
pub const MAX_LEAF_BITS: u32 = 24;

/// What to do with a position that no child region contains.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlacementPolicy {
  /// Report [`PlacementError::OutsideRegion`](crate::PlacementError) and
  /// leave the entity unindexed.
  #[default]
  Reject,
  /// Descend into the child whose centre is nearest.
  Clamp,
}

/// Configuration supplied once at build time.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
  /// Side length of the indexed square/cube, centred on the origin.
  pub region_extent: f64,

  /// Uniform tessellation depth. 0 keeps a single root leaf.
  pub max_depth: u32,

  /// Sized placement stops descending at the first node where
  /// `object_size / node_side_length` exceeds this ratio.
  pub size_ratio_threshold: f64,

  pub placement: PlacementPolicy,
}

impl Default for IndexConfig {
  fn default() -> Self {
    Self {
      region_extent: 1024.0,
      max_depth: 4,
      size_ratio_threshold: 0.5,
      placement: PlacementPolicy::Reject,
    }
  }
}

impl IndexConfig {
  /// Load configuration from a TOML file. Missing keys take their defaults.
  ///
  /// The result is not validated yet; [`SpatialIndex::build`](crate::SpatialIndex::build)
  /// does that once the topology is known.
  pub fn load(path: &Path) -> Result<Self, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
      path: path.to_path_buf(),
      source,
    })?;
    Self::from_toml_str(&content)
  }

  pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
    Ok(toml::from_str(content)?)
  }

  /// Check the configuration against topology `T`.
  pub fn validate<T: Topology>(&self) -> Result<(), ConfigError> {
    if !self.region_extent.is_finite() || self.region_extent <= 0.0 {
      return Err(ConfigError::InvalidExtent(self.region_extent));
    }
    if !self.size_ratio_threshold.is_finite() || self.size_ratio_threshold <= 0.0 {
      return Err(ConfigError::InvalidRatio(self.size_ratio_threshold));
    }

    let bits = (T::DIMENSIONS as u32).saturating_mul(self.max_depth);
    if bits > MAX_LEAF_BITS {
      return Err(ConfigError::DepthTooLarge {
        depth: self.max_depth,
        bits,
        limit: MAX_LEAF_BITS,
      });
    }
    Ok(())
  }

  /// Side length of a node at `depth`.
  #[inline]
  pub fn side_length_at(&self, depth: u32) -> f64 {
    self.region_extent / f64::from(depth).exp2()
  }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;
