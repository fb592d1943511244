//! Spatial index over a uniformly tessellated subdivision tree.
//!
//! # Module Structure
//!
//! - [`config`]: `IndexConfig`, `PlacementPolicy`
//! - [`region`]: node geometry and the `SpatialTopology` trait
//! - [`tracked`]: per-entity records and position sources
//! - [`consistency`]: diagnostic pass over the entity bookkeeping
//! - [`dump`]: depth-indented debug listing
//!
//! # Placement
//!
//! Point placement walks from the root into the unique child whose half-open
//! region contains the position until it reaches a leaf. Sized placement stops
//! early, at the first node on that path whose side is too small relative to
//! the object (see [`IndexConfig::size_ratio_threshold`]).
//!
//! Positions outside the root region are handled by
//! [`PlacementPolicy`]: rejected (the default) or clamped into the nearest
//! child at every level.

pub mod config;
pub mod consistency;
pub mod dump;
pub mod region;
pub mod tracked;

use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;

use smallvec::SmallVec;
#[cfg(feature = "tracing")]
use tracing::{debug, trace};
use web_time::Instant;

pub use self::config::{IndexConfig, PlacementPolicy};
pub use self::dump::TreeDump;
pub use self::region::{Region, RegionNode, RegionVector, SpatialTopology};
pub use self::tracked::{positions_from_fn, EntityPositions, EntityUpdate, FromFn, TrackedEntity};
use crate::error::{ConfigError, PlacementError};
use crate::metrics::IndexMetrics;
use crate::subdivision::{NodeId, SubdivisionTree};

/// Tree type owned by a [`SpatialIndex`].
pub type IndexTree<T, E> = SubdivisionTree<T, RegionNode<<T as SpatialTopology>::Vector, E>>;

/// One entity moved to a different node by [`SpatialIndex::retrack`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rehome<E> {
  pub entity: E,
  pub from: NodeId,
  pub to: NodeId,
}

/// Outcome of one [`SpatialIndex::retrack`] pass.
#[derive(Clone, Debug, PartialEq)]
pub struct RetrackReport<E> {
  /// Dynamic entities whose position was read.
  pub checked: usize,
  pub rehomed: Vec<Rehome<E>>,
  /// Entities whose new position could not be placed; no longer tracked.
  pub evicted: Vec<E>,
  /// Entities the position source no longer knows; no longer tracked.
  pub untracked: Vec<E>,
}

impl<E> Default for RetrackReport<E> {
  fn default() -> Self {
    Self {
      checked: 0,
      rehomed: Vec::new(),
      evicted: Vec::new(),
      untracked: Vec::new(),
    }
  }
}

impl<E> RetrackReport<E> {
  /// Entities that stopped being tracked during the pass.
  pub fn dropped(&self) -> usize {
    self.evicted.len() + self.untracked.len()
  }
}

/// Dynamic spatial index: a uniformly built tree plus entity bookkeeping.
///
/// Each tracked entity is listed in exactly one node's
/// [`RegionNode::entities`].
#[derive(Clone, Debug)]
pub struct SpatialIndex<T: SpatialTopology, E> {
  tree: IndexTree<T, E>,
  tracked: HashMap<E, TrackedEntity<T::Vector>>,
  config: IndexConfig,
  metrics: IndexMetrics,
}

impl<T, E> SpatialIndex<T, E>
where
  T: SpatialTopology,
  E: Copy + Eq + Hash + Debug,
{
  /// Build the tree over `[-extent/2, extent/2)` per axis, split uniformly to
  /// `config.max_depth`.
  #[cfg_attr(
    feature = "tracing",
    tracing::instrument(skip_all, fields(topology = ?T::default(), max_depth = config.max_depth))
  )]
  pub fn build(config: &IndexConfig) -> Result<Self, ConfigError> {
    config.validate::<T>()?;
    let start = Instant::now();

    let root = RegionNode::new(Region::centered(config.region_extent));
    let mut tree = SubdivisionTree::new(root);

    // Level by level, so every neighbour exists before its children do.
    let mut level = vec![tree.root()];
    for _ in 0..config.max_depth {
      let mut next = Vec::with_capacity(level.len() * T::CHILD_COUNT);
      for id in level {
        next.extend(tree.split_with(id, |slot, parent: &RegionNode<T::Vector, E>| {
          RegionNode::new(parent.region.child(T::slot_sign(slot)))
        }));
      }
      level = next;
    }

    let mut metrics = IndexMetrics::new();
    metrics.record_tree(
      tree.iter().map(|node| (node.depth(), node.is_leaf())),
      start.elapsed().as_micros() as u64,
    );
    #[cfg(feature = "tracing")]
    debug!(
      nodes = tree.node_count(),
      leaves = level.len(),
      leaf_side = config.side_length_at(config.max_depth),
      "built spatial index"
    );

    Ok(Self {
      tree,
      tracked: HashMap::new(),
      config: config.clone(),
      metrics,
    })
  }

  /// Place `entity` at a point, moving it if it is already tracked.
  ///
  /// On a placement miss the entity is left untracked.
  pub fn insert_or_update(
    &mut self,
    entity: E,
    position: T::Vector,
    is_static: bool,
  ) -> Result<NodeId, PlacementError<T::Vector>> {
    self.place(entity, position, None, is_static)
  }

  /// Like [`insert_or_update`](Self::insert_or_update) for an object of
  /// extent `size`, which may settle above leaf level.
  pub fn insert_or_update_sized(
    &mut self,
    entity: E,
    position: T::Vector,
    size: f64,
    is_static: bool,
  ) -> Result<NodeId, PlacementError<T::Vector>> {
    self.place(entity, position, Some(size), is_static)
  }

  /// Apply a batch of updates from the entity collaborator.
  ///
  /// Returns the entities that could not be placed.
  pub fn apply_updates<I>(&mut self, updates: I) -> Vec<(E, PlacementError<T::Vector>)>
  where
    I: IntoIterator<Item = EntityUpdate<E, T::Vector>>,
  {
    updates
      .into_iter()
      .filter_map(|update| {
        self
          .place(update.entity, update.position, update.size, update.is_static)
          .err()
          .map(|err| (update.entity, err))
      })
      .collect()
  }

  /// Stop tracking `entity`. Returns its last record, if it was tracked.
  pub fn remove(&mut self, entity: &E) -> Option<TrackedEntity<T::Vector>> {
    let record = self.tracked.remove(entity)?;
    self.unlist(record.node, entity);
    self.metrics.set_tracked(self.tracked.len());
    Some(record)
  }

  /// Re-read every dynamic entity's position and re-home the ones that left
  /// their node.
  ///
  /// The search for the new node starts at the nearest ancestor of the old
  /// one that contains the new position. Static entities are skipped.
  #[cfg_attr(
    feature = "tracing",
    tracing::instrument(skip_all, fields(tracked = self.tracked.len()))
  )]
  pub fn retrack<S>(&mut self, positions: &S) -> RetrackReport<E>
  where
    S: EntityPositions<E, T::Vector> + ?Sized,
  {
    let start = Instant::now();
    let mut report = RetrackReport::default();

    let dynamic: Vec<(E, TrackedEntity<T::Vector>)> = self
      .tracked
      .iter()
      .filter(|(_, record)| !record.is_static)
      .map(|(entity, record)| (*entity, *record))
      .collect();

    for (entity, record) in dynamic {
      report.checked += 1;

      let Some(position) = positions.position(&entity) else {
        self.remove(&entity);
        report.untracked.push(entity);
        continue;
      };

      let still_inside = self.tree.contains(record.node)
        && self.tree.data(record.node).region.contains(position);
      if still_inside {
        if let Some(tracked) = self.tracked.get_mut(&entity) {
          tracked.position = position;
        }
        continue;
      }

      let anchor = self.nearest_containing_ancestor(record.node, position);
      match self.locate(anchor, position, record.size) {
        // Clamped positions outside the root can land back in the same node.
        Ok(to) if to == record.node => {
          if let Some(tracked) = self.tracked.get_mut(&entity) {
            tracked.position = position;
          }
        }
        Ok(to) => {
          self.unlist(record.node, &entity);
          self.tree.data_mut(to).entities.push(entity);
          self.tracked.insert(
            entity,
            TrackedEntity {
              node: to,
              position,
              ..record
            },
          );
          #[cfg(feature = "tracing")]
          trace!(?entity, from = ?record.node, ?to, "re-homed");
          report.rehomed.push(Rehome {
            entity,
            from: record.node,
            to,
          });
        }
        #[cfg_attr(not(feature = "tracing"), allow(unused_variables))]
        Err(err) => {
          #[cfg(feature = "tracing")]
          debug!(?entity, %err, "evicting entity");
          self.metrics.record_miss();
          self.remove(&entity);
          report.evicted.push(entity);
        }
      }
    }

    self.metrics.set_tracked(self.tracked.len());
    self.metrics.record_retrack(
      report.rehomed.len(),
      report.dropped(),
      start.elapsed().as_micros() as u64,
    );
    #[cfg(feature = "tracing")]
    debug!(
      checked = report.checked,
      rehomed = report.rehomed.len(),
      dropped = report.dropped(),
      "retrack complete"
    );
    report
  }

  /// Neighbour table of `node` in direction slot order.
  ///
  /// # Panics
  ///
  /// Panics if `node` does not exist.
  pub fn neighbours_of(&self, node: NodeId) -> SmallVec<[Option<NodeId>; 6]> {
    self.tree.neighbours(node)
  }

  /// Entities placed directly in `node`. Empty for unknown nodes.
  pub fn entities_at(&self, node: NodeId) -> &[E] {
    self
      .tree
      .node(node)
      .map(|node| node.data().entities.as_slice())
      .unwrap_or_default()
  }

  pub fn node_of(&self, entity: &E) -> Option<NodeId> {
    self.tracked.get(entity).map(|record| record.node)
  }

  /// Leaf that point placement would choose for `position`, honouring the
  /// placement policy. `None` on a miss.
  pub fn leaf_at(&self, position: T::Vector) -> Option<NodeId> {
    self.locate(self.tree.root(), position, None).ok()
  }

  pub fn region(&self, node: NodeId) -> Option<&Region<T::Vector>> {
    self.tree.node(node).map(|node| &node.data().region)
  }

  pub fn tracked(&self, entity: &E) -> Option<&TrackedEntity<T::Vector>> {
    self.tracked.get(entity)
  }

  /// All tracked entities with their records, in no particular order.
  pub fn iter_tracked(&self) -> impl Iterator<Item = (&E, &TrackedEntity<T::Vector>)> {
    self.tracked.iter()
  }

  /// Number of tracked entities.
  pub fn len(&self) -> usize {
    self.tracked.len()
  }

  pub fn is_empty(&self) -> bool {
    self.tracked.is_empty()
  }

  /// Read-only access to the tree. Topology is fixed after build.
  pub fn tree(&self) -> &IndexTree<T, E> {
    &self.tree
  }

  pub fn config(&self) -> &IndexConfig {
    &self.config
  }

  pub fn metrics(&self) -> &IndexMetrics {
    &self.metrics
  }

  /// Depth-indented listing of the tree for diagnostics.
  pub fn dump(&self) -> TreeDump<'_, T, E> {
    TreeDump::new(self)
  }

  fn place(
    &mut self,
    entity: E,
    position: T::Vector,
    size: Option<f64>,
    is_static: bool,
  ) -> Result<NodeId, PlacementError<T::Vector>> {
    let target = match self.locate(self.tree.root(), position, size) {
      Ok(target) => target,
      Err(err) => {
        #[cfg(feature = "tracing")]
        debug!(?entity, %err, "placement miss");
        self.metrics.record_miss();
        self.remove(&entity);
        return Err(err);
      }
    };

    let record = TrackedEntity {
      node: target,
      position,
      size,
      is_static,
    };
    if let Some(previous) = self.tracked.insert(entity, record) {
      if previous.node == target {
        return Ok(target);
      }
      self.unlist(previous.node, &entity);
    }
    self.tree.data_mut(target).entities.push(entity);
    self.metrics.set_tracked(self.tracked.len());
    Ok(target)
  }

  /// Descend from `from` to the node `position` belongs in.
  fn locate(
    &self,
    from: NodeId,
    position: T::Vector,
    size: Option<f64>,
  ) -> Result<NodeId, PlacementError<T::Vector>> {
    if !position.is_finite() {
      return Err(PlacementError::NonFinite(position));
    }
    if let Some(size) = size {
      if !size.is_finite() || size < 0.0 {
        return Err(PlacementError::NegativeSize(size));
      }
    }

    let clamp = self.config.placement == PlacementPolicy::Clamp;
    let start = &self.tree.data(from).region;
    if !clamp && !start.contains(position) {
      let root = &self.tree.data(self.tree.root()).region;
      return Err(PlacementError::OutsideRegion {
        position,
        min: root.min,
        max: root.max,
      });
    }

    let mut current = from;
    loop {
      if let Some(size) = size {
        let side = self.tree.data(current).region.side_length;
        if size / side > self.config.size_ratio_threshold {
          return Ok(current);
        }
      }
      if self.tree.is_leaf(current) {
        return Ok(current);
      }
      current = self.select_child(current, position);
    }
  }

  /// Child containing `position`, or the one with the nearest centre.
  fn select_child(&self, node: NodeId, position: T::Vector) -> NodeId {
    let mut nearest: Option<(f64, NodeId)> = None;
    for child in self.tree.children(node) {
      let region = &self.tree.data(child).region;
      if region.contains(position) {
        return child;
      }
      let distance = region.center.distance_squared(position);
      if nearest.map_or(true, |(best, _)| distance < best) {
        nearest = Some((distance, child));
      }
    }
    nearest.map_or(node, |(_, child)| child)
  }

  fn nearest_containing_ancestor(&self, node: NodeId, position: T::Vector) -> NodeId {
    if !self.tree.contains(node) {
      return self.tree.root();
    }
    let mut current = node;
    while !self.tree.data(current).region.contains(position) {
      match self.tree.parent(current) {
        Some(parent) => current = parent,
        None => break,
      }
    }
    current
  }

  /// Drop `entity` from the entity list of `node`.
  fn unlist(&mut self, node: NodeId, entity: &E) {
    if !self.tree.contains(node) {
      return;
    }
    let entities = &mut self.tree.data_mut(node).entities;
    if let Some(index) = entities.iter().position(|listed| listed == entity) {
      entities.swap_remove(index);
    }
  }
}
