//! Resources holding the index and its per-frame statistics.

use bevy::prelude::*;
use scene_index::{OctIndex, RetrackReport};

/// The scene's spatial index, keyed by entity.
#[derive(Resource, Deref, DerefMut)]
pub struct SceneIndex(pub OctIndex<Entity>);

/// Snapshot of the last sync, for debug overlays.
#[derive(Resource, Debug, Default)]
pub struct SceneIndexStats {
  pub tracked: usize,
  /// Entities that could not be placed when added or changed, this frame.
  pub placement_misses: usize,
  pub last_retrack: RetrackReport<Entity>,
}
