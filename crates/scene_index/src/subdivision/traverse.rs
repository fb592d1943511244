//! Borrowed node views and pre-order traversal.

use std::fmt;

use super::topology::{Direction, Topology};
use super::{NodeId, SubdivisionTree};

/// Borrowed view of a live node.
pub struct NodeRef<'a, T: Topology, P> {
  tree: &'a SubdivisionTree<T, P>,
  id: NodeId,
}

// Manual impls: a derive would demand `P: Clone`/`P: Debug`.
impl<T: Topology, P> Clone for NodeRef<'_, T, P> {
  fn clone(&self) -> Self {
    *self
  }
}

impl<T: Topology, P> Copy for NodeRef<'_, T, P> {}

impl<T: Topology, P> fmt::Debug for NodeRef<'_, T, P> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("NodeRef")
      .field("id", &self.id)
      .field("depth", &self.depth())
      .field("leaf", &self.is_leaf())
      .finish()
  }
}

impl<'a, T: Topology, P> NodeRef<'a, T, P> {
  pub(super) fn new(tree: &'a SubdivisionTree<T, P>, id: NodeId) -> Self {
    Self { tree, id }
  }

  #[inline]
  pub fn id(&self) -> NodeId {
    self.id
  }

  #[inline]
  pub fn data(&self) -> &'a P {
    self.tree.data(self.id)
  }

  #[inline]
  pub fn depth(&self) -> u32 {
    self.tree.depth(self.id)
  }

  #[inline]
  pub fn is_leaf(&self) -> bool {
    self.tree.is_leaf(self.id)
  }

  pub fn parent(&self) -> Option<Self> {
    self.tree.parent(self.id).map(|id| Self::new(self.tree, id))
  }

  pub fn children(&self) -> impl Iterator<Item = NodeRef<'a, T, P>> + 'a {
    let tree = self.tree;
    tree.children(self.id).map(move |id| NodeRef::new(tree, id))
  }

  pub fn neighbour(&self, dir: Direction) -> Option<Self> {
    self
      .tree
      .neighbour(self.id, dir)
      .map(|id| Self::new(self.tree, id))
  }
}

/// Pre-order iterator over a subtree. Children are visited in slot order.
pub struct Iter<'a, T: Topology, P> {
  tree: &'a SubdivisionTree<T, P>,
  stack: Vec<NodeId>,
}

impl<'a, T: Topology, P> Iterator for Iter<'a, T, P> {
  type Item = NodeRef<'a, T, P>;

  fn next(&mut self) -> Option<Self::Item> {
    let id = self.stack.pop()?;
    let first = self.stack.len();
    self.stack.extend(self.tree.children(id));
    self.stack[first..].reverse();
    Some(NodeRef::new(self.tree, id))
  }
}

impl<T: Topology, P> SubdivisionTree<T, P> {
  /// Pre-order iteration over the whole tree.
  pub fn iter(&self) -> Iter<'_, T, P> {
    self.iter_from(self.root())
  }

  /// Pre-order iteration over the subtree rooted at `id`.
  ///
  /// Yields nothing if `id` is stale.
  pub fn iter_from(&self, id: NodeId) -> Iter<'_, T, P> {
    let stack = if self.contains(id) { vec![id] } else { Vec::new() };
    Iter { tree: self, stack }
  }

  /// All leaves in pre-order.
  pub fn leaves(&self) -> impl Iterator<Item = NodeRef<'_, T, P>> {
    self.iter().filter(|node| node.is_leaf())
  }

  /// Visit every payload in pre-order together with its depth.
  pub fn traverse<F>(&self, visit: F)
  where
    F: FnMut(&P, u32),
  {
    self.traverse_from(self.root(), visit);
  }

  /// Visit every payload below `id` (inclusive) in pre-order.
  pub fn traverse_from<F>(&self, id: NodeId, mut visit: F)
  where
    F: FnMut(&P, u32),
  {
    for node in self.iter_from(id) {
      visit(node.data(), node.depth());
    }
  }
}
