//! Neighbour directions and child layouts for quad and oct subdivision.
//!
//! # Child layout
//!
//! ```text
//!        Up (+Y)
//!     +-----+-----+
//!     |  0  |  1  |
//!  L  +-----+-----+  R (+X)
//!     |  3  |  2  |
//!     +-----+-----+
//!        Down
//! ```
//!
//! Quad children form a clockwise ring starting at the upper-left. Oct
//! children reuse that ring twice: slots 0..4 sit below the centre (-Z,
//! `Bottom`) and slots 4..8 sit above it (+Z, `Top`), with slot `i` directly
//! beneath slot `i + 4`.
//!
//! All tables are associated constants, so layout lookups never branch on the
//! dimension at runtime.

use std::fmt::Debug;

use super::NodeId;

/// A neighbour slot of a node.
///
/// The discriminant is the slot index in a node's neighbour table. Quadtrees
/// use the first four, octrees all six.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Direction {
  /// +Y
  Up,
  /// -Y
  Down,
  /// -X
  Left,
  /// +X
  Right,
  /// +Z (octree only)
  Top,
  /// -Z (octree only)
  Bottom,
}

impl Direction {
  /// Directions available in two dimensions, in slot order.
  pub const PLANAR: [Self; 4] = [Self::Up, Self::Down, Self::Left, Self::Right];

  /// Directions available in three dimensions, in slot order.
  pub const ALL: [Self; 6] = [
    Self::Up,
    Self::Down,
    Self::Left,
    Self::Right,
    Self::Top,
    Self::Bottom,
  ];

  /// Returns the direction pointing the other way along the same axis.
  pub const fn opposite(self) -> Self {
    match self {
      Self::Up => Self::Down,
      Self::Down => Self::Up,
      Self::Left => Self::Right,
      Self::Right => Self::Left,
      Self::Top => Self::Bottom,
      Self::Bottom => Self::Top,
    }
  }

  /// Slot index in a neighbour table.
  #[inline]
  pub const fn index(self) -> usize {
    self as usize
  }
}

/// Fixed-size storage for child or neighbour links.
pub trait SlotArray:
  Copy + Debug + Default + AsRef<[Option<NodeId>]> + AsMut<[Option<NodeId>]>
{
}

impl<const N: usize> SlotArray for [Option<NodeId>; N] where [Option<NodeId>; N]: Default {}

/// Shape of one subdivision step.
///
/// Implemented by [`Quad`] and [`Oct`]. The two lookup functions drive the
/// neighbour wiring performed by
/// [`SubdivisionTree::split_with`](super::SubdivisionTree::split_with).
pub trait Topology: Copy + Debug + Default + Send + Sync + 'static {
  /// Number of spatial axes.
  const DIMENSIONS: usize;

  /// Children created by one split (`2^DIMENSIONS`).
  const CHILD_COUNT: usize;

  /// Directions that have a neighbour slot, in slot order.
  const DIRECTIONS: &'static [Direction];

  /// Child link storage, `CHILD_COUNT` entries.
  type Children: SlotArray;

  /// Neighbour link storage, one entry per direction.
  type Neighbours: SlotArray;

  /// Sibling facing `slot` on side `dir` within the same split.
  ///
  /// Returns `None` when that side faces out of the parent.
  fn sibling(slot: usize, dir: Direction) -> Option<usize>;

  /// Slot of the child in the parent's neighbour on side `dir` that shares
  /// the boundary with `slot`.
  ///
  /// Only meaningful for sides where [`Topology::sibling`] returns `None`.
  fn mirrored(slot: usize, dir: Direction) -> usize;

  /// Whether `dir` has a slot in this topology's neighbour table.
  #[inline]
  fn has_direction(dir: Direction) -> bool {
    dir.index() < Self::DIRECTIONS.len()
  }
}

/// Sibling table indexed by `[slot][direction]` for the clockwise quad ring.
const QUAD_SIBLINGS: [[Option<u8>; 4]; 4] = [
  // Up, Down, Left, Right
  [None, Some(3), None, Some(1)],
  [None, Some(2), Some(0), None],
  [Some(1), None, Some(3), None],
  [Some(0), None, None, Some(2)],
];

/// Reflection across the vertical axis (crossing a Left/Right boundary).
const QUAD_MIRROR_X: [u8; 4] = [1, 0, 3, 2];

/// Reflection across the horizontal axis (crossing an Up/Down boundary).
const QUAD_MIRROR_Y: [u8; 4] = [3, 2, 1, 0];

/// Sign of each quad slot's centre offset along X and Y.
pub(crate) const QUAD_SIGNS: [[f64; 2]; 4] = [[-1.0, 1.0], [1.0, 1.0], [1.0, -1.0], [-1.0, -1.0]];

/// Slots per ring in the oct layout.
const RING: usize = 4;

/// Two-dimensional subdivision: four children, four neighbours.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Quad;

impl Topology for Quad {
  const DIMENSIONS: usize = 2;
  const CHILD_COUNT: usize = 4;
  const DIRECTIONS: &'static [Direction] = &Direction::PLANAR;

  type Children = [Option<NodeId>; 4];
  type Neighbours = [Option<NodeId>; 4];

  #[inline]
  fn sibling(slot: usize, dir: Direction) -> Option<usize> {
    match dir {
      Direction::Top | Direction::Bottom => None,
      _ => QUAD_SIBLINGS[slot][dir.index()].map(usize::from),
    }
  }

  #[inline]
  fn mirrored(slot: usize, dir: Direction) -> usize {
    match dir {
      Direction::Left | Direction::Right => usize::from(QUAD_MIRROR_X[slot]),
      Direction::Up | Direction::Down => usize::from(QUAD_MIRROR_Y[slot]),
      Direction::Top | Direction::Bottom => slot,
    }
  }
}

/// Three-dimensional subdivision: eight children, six neighbours.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Oct;

impl Topology for Oct {
  const DIMENSIONS: usize = 3;
  const CHILD_COUNT: usize = 8;
  const DIRECTIONS: &'static [Direction] = &Direction::ALL;

  type Children = [Option<NodeId>; 8];
  type Neighbours = [Option<NodeId>; 6];

  #[inline]
  fn sibling(slot: usize, dir: Direction) -> Option<usize> {
    let upper = slot >= RING;
    match dir {
      Direction::Top => (!upper).then_some(slot + RING),
      Direction::Bottom => upper.then(|| slot - RING),
      _ => {
        let base = slot - slot % RING;
        Quad::sibling(slot % RING, dir).map(|local| base + local)
      }
    }
  }

  #[inline]
  fn mirrored(slot: usize, dir: Direction) -> usize {
    match dir {
      // Crossing a Top/Bottom boundary lands in the other ring, same column.
      Direction::Top | Direction::Bottom => slot ^ RING,
      _ => {
        let base = slot - slot % RING;
        base + Quad::mirrored(slot % RING, dir)
      }
    }
  }
}

/// Sign of each oct slot's centre offset along X, Y and Z.
pub(crate) fn oct_signs(slot: usize) -> [f64; 3] {
  let [x, y] = QUAD_SIGNS[slot % RING];
  let z = if slot >= RING { 1.0 } else { -1.0 };
  [x, y, z]
}

#[cfg(test)]
#[path = "topology_test.rs"]
mod topology_test;
