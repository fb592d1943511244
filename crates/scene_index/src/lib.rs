//! scene_index - spatial subdivision for scene culling and LOD
//!
//! This crate provides the spatial tree a real-time renderer uses to decide
//! which objects live near each other. It is engine independent: entity ids,
//! positions, and configuration come in through plain Rust types, and the
//! Bevy bridge lives in `scene_index_bevy`.
//!
//! # Features
//!
//! - **Subdivision tree**: one generic node arena for quadtrees and octrees,
//!   with split/merge and neighbour links that stay symmetric across sibling
//!   subtree boundaries
//! - **Spatial index**: uniform tessellation of a square/cubic region, point
//!   and size-aware placement, per-tick re-homing of moving entities
//! - **Diagnostics**: consistency checking and a depth-indented tree dump
//! - **Metrics** (feature `metrics`): node and timing statistics
//!
//! # Example
//!
//! ```
//! use scene_index::glam::DVec2;
//! use scene_index::{Direction, IndexConfig, QuadIndex};
//!
//! let config = IndexConfig {
//!   region_extent: 100.0,
//!   max_depth: 2,
//!   ..IndexConfig::default()
//! };
//! let mut index: QuadIndex<u32> = QuadIndex::build(&config).unwrap();
//!
//! let leaf = index.insert_or_update(7, DVec2::new(10.0, 10.0), false).unwrap();
//! assert_eq!(index.region(leaf).unwrap().side_length, 25.0);
//!
//! // Walk to the leaf on the left of the one holding entity 7.
//! let left = index.tree().neighbour(leaf, Direction::Left).unwrap();
//! assert!(index.entities_at(left).is_empty());
//! ```

pub mod error;
pub mod index;
pub mod metrics;
pub mod subdivision;

pub use glam;

// Re-export commonly used items
pub use error::{ConfigError, ConsistencyError, PlacementError};
pub use index::consistency::ConsistencyReport;
pub use index::{
  positions_from_fn, EntityPositions, EntityUpdate, IndexConfig, IndexTree, PlacementPolicy,
  Region, RegionNode, RegionVector, Rehome, RetrackReport, SpatialIndex, SpatialTopology,
  TrackedEntity, TreeDump,
};
pub use metrics::IndexMetrics;
pub use subdivision::topology::{Direction, Oct, Quad, Topology};
pub use subdivision::{NodeId, NodeRef, OctTree, QuadTree, SubdivisionTree};

/// Spatial index over a square region.
pub type QuadIndex<E> = SpatialIndex<Quad, E>;

/// Spatial index over a cubic region.
pub type OctIndex<E> = SpatialIndex<Oct, E>;
