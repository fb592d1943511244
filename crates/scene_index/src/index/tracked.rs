//! Tracked entity records and position sources.

use std::collections::{BTreeMap, HashMap};
use std::hash::{BuildHasher, Hash};

use crate::subdivision::NodeId;

/// Index bookkeeping for one entity.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrackedEntity<V> {
  /// Node whose entity list holds this entity.
  pub node: NodeId,
  /// Position at the last placement.
  pub position: V,
  /// Object size for size-aware placement, `None` for point placement.
  pub size: Option<f64>,
  /// Static entities are placed once and never retracked.
  pub is_static: bool,
}

/// One `(entity, position, is_static)` tuple from the entity collaborator.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EntityUpdate<E, V> {
  pub entity: E,
  pub position: V,
  pub size: Option<f64>,
  pub is_static: bool,
}

impl<E, V> EntityUpdate<E, V> {
  pub fn point(entity: E, position: V, is_static: bool) -> Self {
    Self {
      entity,
      position,
      size: None,
      is_static,
    }
  }
}

/// Source of current world positions, read during
/// [`SpatialIndex::retrack`](crate::SpatialIndex::retrack).
///
/// `None` means the entity no longer exists and should be untracked.
pub trait EntityPositions<E, V> {
  fn position(&self, entity: &E) -> Option<V>;
}

impl<E: Eq + Hash, V: Copy, S: BuildHasher> EntityPositions<E, V> for HashMap<E, V, S> {
  fn position(&self, entity: &E) -> Option<V> {
    self.get(entity).copied()
  }
}

impl<E: Ord, V: Copy> EntityPositions<E, V> for BTreeMap<E, V> {
  fn position(&self, entity: &E) -> Option<V> {
    self.get(entity).copied()
  }
}

/// Closure-backed [`EntityPositions`], see [`positions_from_fn`].
#[derive(Clone, Copy, Debug)]
pub struct FromFn<F>(F);

impl<E, V, F> EntityPositions<E, V> for FromFn<F>
where
  F: Fn(&E) -> Option<V>,
{
  fn position(&self, entity: &E) -> Option<V> {
    (self.0)(entity)
  }
}

/// Wrap a lookup closure as an [`EntityPositions`] source.
pub fn positions_from_fn<E, V, F>(lookup: F) -> FromFn<F>
where
  F: Fn(&E) -> Option<V>,
{
  FromFn(lookup)
}
