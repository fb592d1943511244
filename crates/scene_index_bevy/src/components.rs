//! Components marking entities for spatial indexing.

use bevy::prelude::*;

/// Marks an entity for the scene index.
///
/// Static entities are placed when the component is added or changed and are
/// never re-read afterwards.
#[derive(Component, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[require(Transform)]
pub struct Tracked {
  pub is_static: bool,
}

impl Tracked {
  pub const STATIC: Self = Self { is_static: true };
  pub const DYNAMIC: Self = Self { is_static: false };
}

/// World-space extent used for size-aware placement. Without it the entity
/// is placed as a point.
#[derive(Component, Clone, Copy, Debug, PartialEq)]
pub struct TrackedSize(pub f32);
