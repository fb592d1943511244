//! Region geometry for index nodes.
//!
//! Regions use half-open containment (`min <= p < max` per axis) so that
//! siblings partition their parent without overlap.

use std::fmt::Debug;

use glam::{DVec2, DVec3};

use crate::subdivision::topology::{oct_signs, Oct, Quad, Topology, QUAD_SIGNS};

/// Double-precision vector usable as a region coordinate.
pub trait RegionVector: Copy + Debug + PartialEq + Send + Sync + 'static {
  /// Vector with every component set to `value`.
  fn splat(value: f64) -> Self;

  /// `min <= self < max` on every axis.
  fn within(self, min: Self, max: Self) -> bool;

  /// Per axis: `a` where `sign > 0`, otherwise `b`.
  fn select_positive(sign: Self, a: Self, b: Self) -> Self;

  fn is_finite(self) -> bool;

  fn distance_squared(self, other: Self) -> f64;

  /// Components padded to three axes with zero.
  fn to_array3(self) -> [f64; 3];

  fn from_array3(array: [f64; 3]) -> Self;

  fn mul_add_scalar(self, sign: Self, scale: f64) -> Self;
}

impl RegionVector for DVec2 {
  #[inline]
  fn splat(value: f64) -> Self {
    DVec2::splat(value)
  }

  #[inline]
  fn within(self, min: Self, max: Self) -> bool {
    self.cmpge(min).all() && self.cmplt(max).all()
  }

  #[inline]
  fn select_positive(sign: Self, a: Self, b: Self) -> Self {
    DVec2::select(sign.cmpgt(DVec2::ZERO), a, b)
  }

  #[inline]
  fn is_finite(self) -> bool {
    DVec2::is_finite(self)
  }

  #[inline]
  fn distance_squared(self, other: Self) -> f64 {
    DVec2::distance_squared(self, other)
  }

  #[inline]
  fn to_array3(self) -> [f64; 3] {
    [self.x, self.y, 0.0]
  }

  #[inline]
  fn from_array3(array: [f64; 3]) -> Self {
    DVec2::new(array[0], array[1])
  }

  #[inline]
  fn mul_add_scalar(self, sign: Self, scale: f64) -> Self {
    self + sign * scale
  }
}

impl RegionVector for DVec3 {
  #[inline]
  fn splat(value: f64) -> Self {
    DVec3::splat(value)
  }

  #[inline]
  fn within(self, min: Self, max: Self) -> bool {
    self.cmpge(min).all() && self.cmplt(max).all()
  }

  #[inline]
  fn select_positive(sign: Self, a: Self, b: Self) -> Self {
    DVec3::select(sign.cmpgt(DVec3::ZERO), a, b)
  }

  #[inline]
  fn is_finite(self) -> bool {
    DVec3::is_finite(self)
  }

  #[inline]
  fn distance_squared(self, other: Self) -> f64 {
    DVec3::distance_squared(self, other)
  }

  #[inline]
  fn to_array3(self) -> [f64; 3] {
    self.to_array()
  }

  #[inline]
  fn from_array3(array: [f64; 3]) -> Self {
    DVec3::from_array(array)
  }

  #[inline]
  fn mul_add_scalar(self, sign: Self, scale: f64) -> Self {
    self + sign * scale
  }
}

/// A [`Topology`] with coordinates attached.
pub trait SpatialTopology: Topology {
  type Vector: RegionVector;

  /// Sign (+1/-1 per axis) of a child's centre offset from its parent's.
  fn slot_sign(slot: usize) -> Self::Vector;
}

impl SpatialTopology for Quad {
  type Vector = DVec2;

  #[inline]
  fn slot_sign(slot: usize) -> DVec2 {
    DVec2::from_array(QUAD_SIGNS[slot])
  }
}

impl SpatialTopology for Oct {
  type Vector = DVec3;

  #[inline]
  fn slot_sign(slot: usize) -> DVec3 {
    DVec3::from_array(oct_signs(slot))
  }
}

/// Square or cubic region covered by one node.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Region<V> {
  pub side_length: f64,
  pub center: V,
  /// Minimum corner (inclusive).
  pub min: V,
  /// Maximum corner (exclusive).
  pub max: V,
}

impl<V: RegionVector> Region<V> {
  /// Region of side `extent` centred on the origin.
  pub fn centered(extent: f64) -> Self {
    let half = extent * 0.5;
    Self {
      side_length: extent,
      center: V::splat(0.0),
      min: V::splat(-half),
      max: V::splat(half),
    }
  }

  /// Sub-region for the child whose offset signs are `sign`.
  ///
  /// Corners are copied from this region's corners and centre, never
  /// recomputed, so sibling boundaries line up exactly.
  pub fn child(&self, sign: V) -> Self {
    Self {
      side_length: self.side_length * 0.5,
      center: self.center.mul_add_scalar(sign, self.side_length * 0.25),
      min: V::select_positive(sign, self.center, self.min),
      max: V::select_positive(sign, self.max, self.center),
    }
  }

  #[inline]
  pub fn contains(&self, point: V) -> bool {
    point.within(self.min, self.max)
  }
}

/// Payload stored in every index node.
#[derive(Clone, Debug, PartialEq)]
pub struct RegionNode<V, E> {
  pub region: Region<V>,
  /// Entities placed directly in this node.
  pub entities: Vec<E>,
}

impl<V, E> RegionNode<V, E> {
  pub fn new(region: Region<V>) -> Self {
    Self {
      region,
      entities: Vec::new(),
    }
  }
}
