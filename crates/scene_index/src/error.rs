//! Recoverable error types.
//!
//! Structural faults (double split, stale node handles) panic instead; they
//! indicate caller bugs, not data-dependent failures.

use std::fmt::Debug;
use std::path::PathBuf;

use thiserror::Error;

use crate::subdivision::NodeId;

/// Invalid or unreadable [`IndexConfig`](crate::IndexConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("failed to read config file {}", .path.display())]
  Io {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("failed to parse config TOML")]
  Parse(#[from] toml::de::Error),

  #[error("region_extent must be finite and positive, got {0}")]
  InvalidExtent(f64),

  #[error("size_ratio_threshold must be finite and positive, got {0}")]
  InvalidRatio(f64),

  #[error("max_depth {depth} yields 2^{bits} leaves, limit is 2^{limit}")]
  DepthTooLarge { depth: u32, bits: u32, limit: u32 },
}

/// An entity could not be placed in the index.
///
/// Generic over the position vector so both quad and oct indices report the
/// offending coordinates.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum PlacementError<V: Debug> {
  #[error("position {position:?} is outside the indexed region [{min:?}, {max:?})")]
  OutsideRegion { position: V, min: V, max: V },

  #[error("position {0:?} is not finite")]
  NonFinite(V),

  #[error("object size {0} is negative or not finite")]
  NegativeSize(f64),
}

/// One broken invariant found by
/// [`SpatialIndex::check_consistency`](crate::SpatialIndex::check_consistency).
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ConsistencyError<E: Debug> {
  #[error("entity {entity:?} is recorded in node {node:?}, which no longer exists")]
  StaleNode { entity: E, node: NodeId },

  #[error("entity {entity:?} is recorded in node {node:?} but not listed there")]
  MissingFromNode { entity: E, node: NodeId },

  #[error("entity {entity:?} is listed {count} times in node {node:?}")]
  DuplicateInNode { entity: E, node: NodeId, count: usize },

  #[error("node {node:?} lists entity {entity:?}, which is not tracked there")]
  Untracked { entity: E, node: NodeId },

  #[error("entity {entity:?} is stored in node {node:?}, whose region does not hold its position")]
  Misplaced { entity: E, node: NodeId },
}
