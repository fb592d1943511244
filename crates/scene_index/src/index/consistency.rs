//! Diagnostic pass over the entity bookkeeping, used to catch re-homing bugs.

use std::fmt::Debug;
use std::hash::Hash;

#[cfg(feature = "tracing")]
use tracing::warn;

use super::{RegionVector, SpatialIndex, SpatialTopology};
use crate::error::ConsistencyError;

/// Result of [`SpatialIndex::check_consistency`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConsistencyReport<E: Debug> {
  pub entities_checked: usize,
  pub nodes_checked: usize,
  pub errors: Vec<ConsistencyError<E>>,
}

impl<E: Debug> ConsistencyReport<E> {
  pub fn is_ok(&self) -> bool {
    self.errors.is_empty()
  }

  /// First error found, if any.
  pub fn into_result(self) -> Result<(), ConsistencyError<E>> {
    match self.errors.into_iter().next() {
      Some(err) => Err(err),
      None => Ok(()),
    }
  }
}

impl<T, E> SpatialIndex<T, E>
where
  T: SpatialTopology,
  E: Copy + Eq + Hash + Debug,
{
  /// Verify that the tracked-entity map and the per-node entity lists agree.
  ///
  /// Every tracked entity must be listed exactly once, in the node its
  /// record names, and every listed entity must be tracked there. Entities
  /// inside the root region must also sit in a node whose region contains
  /// their last position.
  pub fn check_consistency(&self) -> ConsistencyReport<E> {
    let tree = self.tree();
    let root_region = &tree.data(tree.root()).region;
    let mut errors = Vec::new();

    for (&entity, record) in self.iter_tracked() {
      let Some(node) = tree.node(record.node) else {
        errors.push(ConsistencyError::StaleNode {
          entity,
          node: record.node,
        });
        continue;
      };

      let count = node
        .data()
        .entities
        .iter()
        .filter(|listed| **listed == entity)
        .count();
      match count {
        0 => errors.push(ConsistencyError::MissingFromNode {
          entity,
          node: record.node,
        }),
        1 => {}
        count => errors.push(ConsistencyError::DuplicateInNode {
          entity,
          node: record.node,
          count,
        }),
      }

      let position = record.position;
      if position.is_finite()
        && root_region.contains(position)
        && !node.data().region.contains(position)
      {
        errors.push(ConsistencyError::Misplaced {
          entity,
          node: record.node,
        });
      }
    }

    let mut nodes_checked = 0;
    for node in tree.iter() {
      nodes_checked += 1;
      for &entity in &node.data().entities {
        if self.node_of(&entity) != Some(node.id()) {
          errors.push(ConsistencyError::Untracked {
            entity,
            node: node.id(),
          });
        }
      }
    }

    #[cfg(feature = "tracing")]
    if !errors.is_empty() {
      warn!(errors = errors.len(), first = %errors[0], "spatial index is inconsistent");
    }

    ConsistencyReport {
      entities_checked: self.len(),
      nodes_checked,
      errors,
    }
  }
}
