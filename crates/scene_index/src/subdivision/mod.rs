//! Subdivision tree with live neighbour links.
//!
//! Nodes are stored in an arena and addressed by generational [`NodeId`]
//! handles. A node exclusively owns its children; parent and neighbour links
//! are plain handles used for lookup only.
//!
//! # Module Structure
//!
//! - [`topology`]: `Direction`, `Topology` and the `Quad`/`Oct` layouts
//! - `wiring`: neighbour wiring performed when a node splits
//! - [`traverse`]: `NodeRef` views and pre-order iteration
//!
//! # Stale links
//!
//! [`SubdivisionTree::merge`] frees the discarded subtree without rewriting
//! links that outside nodes hold into it. Freed handles never compare equal
//! to a live node again (the slot generation is bumped), so every read path
//! reports such links as absent.

pub mod topology;
pub mod traverse;
mod wiring;

use smallvec::SmallVec;

use self::topology::{Direction, Oct, Quad, Topology};
pub use self::traverse::{Iter, NodeRef};

/// Handle to a node in a [`SubdivisionTree`].
///
/// Handles stay valid until the node is discarded by a merge.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32, u32);

impl NodeId {
  /// Arena slot of this handle.
  #[inline]
  pub const fn index(self) -> usize {
    self.0 as usize
  }

  /// Generation of the arena slot this handle was issued for.
  #[inline]
  pub const fn generation(self) -> u32 {
    self.1
  }
}

/// Per-node record stored in the arena.
#[derive(Clone, Debug)]
struct NodeRecord<T: Topology, P> {
  payload: P,
  children: T::Children,
  neighbours: T::Neighbours,
  depth: u32,
  parent: Option<NodeId>,
  child_slot: u8,
}

#[derive(Clone, Debug)]
struct ArenaSlot<T: Topology, P> {
  generation: u32,
  node: Option<NodeRecord<T, P>>,
}

/// Subdivision tree generic over its [`Topology`] and per-node payload `P`.
///
/// The tree always has a root. The payload is opaque to the tree; callers
/// derive child payloads when splitting (see [`SubdivisionTree::split_with`]).
#[derive(Clone, Debug)]
pub struct SubdivisionTree<T: Topology, P> {
  slots: Vec<ArenaSlot<T, P>>,
  free_list: Vec<u32>,
  root: NodeId,
  live: usize,
}

/// Quadtree over payload `P`.
pub type QuadTree<P> = SubdivisionTree<Quad, P>;

/// Octree over payload `P`.
pub type OctTree<P> = SubdivisionTree<Oct, P>;

impl<T: Topology, P> SubdivisionTree<T, P> {
  /// Create a tree consisting of a single root leaf.
  pub fn new(root_payload: P) -> Self {
    let mut tree = Self {
      slots: Vec::new(),
      free_list: Vec::new(),
      root: NodeId(0, 0),
      live: 0,
    };
    tree.root = tree.alloc(NodeRecord {
      payload: root_payload,
      children: T::Children::default(),
      neighbours: T::Neighbours::default(),
      depth: 0,
      parent: None,
      child_slot: 0,
    });
    tree
  }

  /// The root node.
  #[inline]
  pub fn root(&self) -> NodeId {
    self.root
  }

  /// Number of live nodes, root included.
  #[inline]
  pub fn node_count(&self) -> usize {
    self.live
  }

  /// Check if `id` refers to a live node of this tree.
  #[inline]
  pub fn contains(&self, id: NodeId) -> bool {
    self.record(id).is_some()
  }

  /// Borrowed view of a node, or `None` if the handle is stale.
  pub fn node(&self, id: NodeId) -> Option<NodeRef<'_, T, P>> {
    self.contains(id).then(|| NodeRef::new(self, id))
  }

  /// Child at `index`, or `None` if out of range or empty.
  ///
  /// # Panics
  ///
  /// Panics if `id` is not a live node.
  pub fn child(&self, id: NodeId, index: usize) -> Option<NodeId> {
    let link = *self.expect_record(id).children.as_ref().get(index)?;
    self.live_link(link)
  }

  /// Live children in ascending slot order.
  ///
  /// # Panics
  ///
  /// Panics if `id` is not a live node.
  pub fn children(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
    self
      .expect_record(id)
      .children
      .as_ref()
      .iter()
      .filter_map(move |link| self.live_link(*link))
  }

  /// A node is a leaf iff every child slot is empty.
  ///
  /// # Panics
  ///
  /// Panics if `id` is not a live node.
  pub fn is_leaf(&self, id: NodeId) -> bool {
    self.expect_record(id).children.as_ref().iter().all(Option::is_none)
  }

  /// # Panics
  ///
  /// Panics if `id` is not a live node.
  pub fn is_root(&self, id: NodeId) -> bool {
    self.expect_record(id).parent.is_none()
  }

  /// Number of splits between the root and this node.
  ///
  /// # Panics
  ///
  /// Panics if `id` is not a live node.
  pub fn depth(&self, id: NodeId) -> u32 {
    self.expect_record(id).depth
  }

  /// # Panics
  ///
  /// Panics if `id` is not a live node.
  pub fn parent(&self, id: NodeId) -> Option<NodeId> {
    self.expect_record(id).parent
  }

  /// Index of this node within its parent's children, `None` for the root.
  ///
  /// # Panics
  ///
  /// Panics if `id` is not a live node.
  pub fn child_slot(&self, id: NodeId) -> Option<usize> {
    let record = self.expect_record(id);
    record.parent.map(|_| usize::from(record.child_slot))
  }

  /// # Panics
  ///
  /// Panics if `id` is not a live node.
  pub fn data(&self, id: NodeId) -> &P {
    &self.expect_record(id).payload
  }

  /// # Panics
  ///
  /// Panics if `id` is not a live node.
  pub fn data_mut(&mut self, id: NodeId) -> &mut P {
    &mut self.expect_record_mut(id).payload
  }

  /// Replace the payload of a node, returning the previous one.
  ///
  /// # Panics
  ///
  /// Panics if `id` is not a live node.
  pub fn set_data(&mut self, id: NodeId, payload: P) -> P {
    std::mem::replace(&mut self.expect_record_mut(id).payload, payload)
  }

  /// Neighbour on side `dir`, or `None` at the domain boundary.
  ///
  /// # Panics
  ///
  /// Panics if `id` is not a live node or if the topology has no slot for
  /// `dir` (e.g. [`Direction::Top`] on a quadtree).
  pub fn neighbour(&self, id: NodeId, dir: Direction) -> Option<NodeId> {
    assert!(
      T::has_direction(dir),
      "{:?} has no {:?} neighbour slot",
      T::default(),
      dir
    );
    self.live_link(self.expect_record(id).neighbours.as_ref()[dir.index()])
  }

  /// Snapshot of the neighbour table in [`Topology::DIRECTIONS`] order.
  ///
  /// # Panics
  ///
  /// Panics if `id` is not a live node.
  pub fn neighbours(&self, id: NodeId) -> SmallVec<[Option<NodeId>; 6]> {
    self
      .expect_record(id)
      .neighbours
      .as_ref()
      .iter()
      .map(|link| self.live_link(*link))
      .collect()
  }

  /// Split a leaf, giving every child a default payload.
  ///
  /// See [`SubdivisionTree::split_with`].
  pub fn split(&mut self, id: NodeId) -> SmallVec<[NodeId; 8]>
  where
    P: Default,
  {
    self.split_with(id, |_, _| P::default())
  }

  /// Split a leaf into `T::CHILD_COUNT` children.
  ///
  /// `derive(slot, parent_payload)` produces each child's payload. Children
  /// are linked to their siblings and, across the parent's boundary, to the
  /// facing children of the parent's neighbours. The parent's own neighbour
  /// table is left untouched.
  ///
  /// Returns the new children in slot order.
  ///
  /// # Panics
  ///
  /// Panics if `id` is not a live node or already has a child in any slot.
  /// Splitting twice without a merge in between is a caller bug.
  pub fn split_with<F>(&mut self, id: NodeId, mut derive: F) -> SmallVec<[NodeId; 8]>
  where
    F: FnMut(usize, &P) -> P,
  {
    let record = self.expect_record(id);
    if let Some(slot) = record.children.as_ref().iter().position(Option::is_some) {
      panic!("child already exists in slot {} of {:?}", slot, id);
    }

    let depth = record.depth + 1;
    let payloads: SmallVec<[P; 8]> = (0..T::CHILD_COUNT)
      .map(|slot| derive(slot, &record.payload))
      .collect();

    let children: SmallVec<[NodeId; 8]> = payloads
      .into_iter()
      .enumerate()
      .map(|(slot, payload)| {
        self.alloc(NodeRecord {
          payload,
          children: T::Children::default(),
          neighbours: T::Neighbours::default(),
          depth,
          parent: Some(id),
          child_slot: slot as u8,
        })
      })
      .collect();

    let record = self.expect_record_mut(id);
    for (slot, child) in children.iter().enumerate() {
      record.children.as_mut()[slot] = Some(*child);
    }

    wiring::wire_children(self, id, &children);
    children
  }

  /// Discard every descendant of `id`, turning it back into a leaf.
  ///
  /// Links held by outside nodes into the discarded subtree are not
  /// rewritten; they read back as absent from then on.
  ///
  /// Returns the number of nodes freed.
  ///
  /// # Panics
  ///
  /// Panics if `id` is not a live node.
  pub fn merge(&mut self, id: NodeId) -> usize {
    let record = self.expect_record_mut(id);
    let mut pending: Vec<NodeId> = record.children.as_ref().iter().flatten().copied().collect();
    record.children = T::Children::default();

    let mut freed = 0;
    while let Some(child) = pending.pop() {
      if let Some(removed) = self.free(child) {
        pending.extend(removed.children.as_ref().iter().flatten().copied());
        freed += 1;
      }
    }
    freed
  }

  /// Point the `dir` slot of `id` at `target`.
  fn set_neighbour(&mut self, id: NodeId, dir: Direction, target: NodeId) {
    self.expect_record_mut(id).neighbours.as_mut()[dir.index()] = Some(target);
  }

  #[inline]
  fn live_link(&self, link: Option<NodeId>) -> Option<NodeId> {
    link.filter(|id| self.contains(*id))
  }

  #[inline]
  fn record(&self, id: NodeId) -> Option<&NodeRecord<T, P>> {
    let slot = self.slots.get(id.index())?;
    if slot.generation != id.generation() {
      return None;
    }
    slot.node.as_ref()
  }

  fn expect_record(&self, id: NodeId) -> &NodeRecord<T, P> {
    self
      .record(id)
      .unwrap_or_else(|| panic!("node {:?} does not exist", id))
  }

  fn expect_record_mut(&mut self, id: NodeId) -> &mut NodeRecord<T, P> {
    self
      .slots
      .get_mut(id.index())
      .filter(|slot| slot.generation == id.generation())
      .and_then(|slot| slot.node.as_mut())
      .unwrap_or_else(|| panic!("node {:?} does not exist", id))
  }

  fn alloc(&mut self, record: NodeRecord<T, P>) -> NodeId {
    self.live += 1;
    if let Some(index) = self.free_list.pop() {
      let slot = &mut self.slots[index as usize];
      slot.node = Some(record);
      return NodeId(index, slot.generation);
    }

    let index = u32::try_from(self.slots.len()).expect("subdivision arena exceeded u32 slots");
    self.slots.push(ArenaSlot {
      generation: 0,
      node: Some(record),
    });
    NodeId(index, 0)
  }

  fn free(&mut self, id: NodeId) -> Option<NodeRecord<T, P>> {
    let slot = self.slots.get_mut(id.index())?;
    if slot.generation != id.generation() {
      return None;
    }
    let record = slot.node.take()?;
    slot.generation = slot.generation.wrapping_add(1);
    self.free_list.push(id.0);
    self.live -= 1;
    Some(record)
  }
}

impl<T: Topology, P: Default> Default for SubdivisionTree<T, P> {
  fn default() -> Self {
    Self::new(P::default())
  }
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod mod_test;
