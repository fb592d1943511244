//! Neighbour wiring for freshly split children.

use super::topology::Topology;
use super::{NodeId, SubdivisionTree};

/// Link every child of `parent` to its neighbours.
///
/// Sides facing a sibling are linked one way per child; the sibling does the
/// reverse when its own turn comes. Sides facing out of the parent are linked
/// both ways to the mirrored child of the parent's neighbour, when that
/// neighbour has already been split. Otherwise the side stays absent.
pub(crate) fn wire_children<T: Topology, P>(
  tree: &mut SubdivisionTree<T, P>,
  parent: NodeId,
  children: &[NodeId],
) {
  debug_assert_eq!(children.len(), T::CHILD_COUNT);

  for (slot, &child) in children.iter().enumerate() {
    for &dir in T::DIRECTIONS {
      if let Some(sibling) = T::sibling(slot, dir) {
        tree.set_neighbour(child, dir, children[sibling]);
        continue;
      }

      let Some(across) = tree.neighbour(parent, dir) else {
        continue;
      };
      if let Some(facing) = tree.child(across, T::mirrored(slot, dir)) {
        tree.set_neighbour(child, dir, facing);
        tree.set_neighbour(facing, dir.opposite(), child);
      }
    }
  }
}

#[cfg(test)]
#[path = "wiring_test.rs"]
mod wiring_test;
