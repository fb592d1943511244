//! Human-readable tree listing. Not a stable format.

use std::fmt::{self, Debug, Display, Write as _};
use std::hash::Hash;

use super::{RegionVector, SpatialIndex, SpatialTopology};

/// Depth-indented listing of every node with its bounds and the positions of
/// the entities it holds. Created by [`SpatialIndex::dump`].
///
/// ```text
/// [0] side 100 min (-50.00, -50.00) max (50.00, 50.00)
///   [1] side 50 min (-50.00, 0.00) max (0.00, 50.00)
///     - 7 @ (-10.00, 10.00)
/// ```
pub struct TreeDump<'a, T: SpatialTopology, E> {
  index: &'a SpatialIndex<T, E>,
  occupied_only: bool,
}

impl<'a, T, E> TreeDump<'a, T, E>
where
  T: SpatialTopology,
  E: Copy + Eq + Hash + Debug,
{
  pub(super) fn new(index: &'a SpatialIndex<T, E>) -> Self {
    Self {
      index,
      occupied_only: false,
    }
  }

  /// Skip subtrees that hold no entities.
  pub fn occupied_only(mut self) -> Self {
    self.occupied_only = true;
    self
  }

  fn subtree_occupied(&self, node: crate::NodeId) -> bool {
    self
      .index
      .tree()
      .iter_from(node)
      .any(|n| !n.data().entities.is_empty())
  }
}

fn write_vector<V: RegionVector>(out: &mut impl fmt::Write, v: V, dims: usize) -> fmt::Result {
  out.write_char('(')?;
  for (axis, component) in v.to_array3().iter().take(dims).enumerate() {
    if axis > 0 {
      out.write_str(", ")?;
    }
    write!(out, "{:.2}", component)?;
  }
  out.write_char(')')
}

impl<T, E> Display for TreeDump<'_, T, E>
where
  T: SpatialTopology,
  E: Copy + Eq + Hash + Debug,
{
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let tree = self.index.tree();
    let mut pending = vec![tree.root()];

    while let Some(id) = pending.pop() {
      if self.occupied_only && !self.subtree_occupied(id) {
        continue;
      }
      let depth = tree.depth(id) as usize;
      let node = tree.data(id);
      let region = &node.region;

      write!(f, "{:indent$}[{}] side {} min ", "", depth, region.side_length, indent = depth * 2)?;
      write_vector(f, region.min, T::DIMENSIONS)?;
      f.write_str(" max ")?;
      write_vector(f, region.max, T::DIMENSIONS)?;
      f.write_char('\n')?;

      for entity in &node.entities {
        write!(f, "{:indent$}- {:?} @ ", "", entity, indent = depth * 2 + 2)?;
        match self.index.tracked(entity) {
          Some(record) => write_vector(f, record.position, T::DIMENSIONS)?,
          None => f.write_str("?")?,
        }
        f.write_char('\n')?;
      }

      let first = pending.len();
      pending.extend(tree.children(id));
      pending[first..].reverse();
    }
    Ok(())
  }
}
