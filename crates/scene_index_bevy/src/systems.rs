//! Systems syncing tracked entities into the index. Run chained in `Last`.

use bevy::prelude::*;
use scene_index::glam::DVec3;
use scene_index::positions_from_fn;

use crate::components::{Tracked, TrackedSize};
use crate::resources::{SceneIndex, SceneIndexStats};

fn to_dvec3(v: Vec3) -> DVec3 {
  DVec3::new(v.x as f64, v.y as f64, v.z as f64)
}

/// Drop entities whose [`Tracked`] component was removed or that despawned.
pub fn untrack_removed(mut removed: RemovedComponents<Tracked>, mut index: ResMut<SceneIndex>) {
  for entity in removed.read() {
    index.remove(&entity);
  }
}

/// Place entities whose [`Tracked`] or [`TrackedSize`] was added or changed.
///
/// Entities that are not indexed, because they were evicted or never fit, are
/// retried whenever their transform changes. Entities that lost their
/// [`TrackedSize`] go back to point placement.
pub fn track_changed(
  changed: Query<
    (
      Entity,
      Ref<Tracked>,
      Ref<GlobalTransform>,
      Option<Ref<TrackedSize>>,
    ),
    Or<(
      Changed<Tracked>,
      Changed<TrackedSize>,
      Changed<GlobalTransform>,
    )>,
  >,
  unsized: Query<(&Tracked, &GlobalTransform), Without<TrackedSize>>,
  mut size_removed: RemovedComponents<TrackedSize>,
  mut index: ResMut<SceneIndex>,
  mut stats: ResMut<SceneIndexStats>,
) {
  stats.placement_misses = 0;

  let mut unsized_placed = Vec::new();
  for entity in size_removed.read() {
    let Ok((tracked, transform)) = unsized.get(entity) else {
      continue;
    };
    unsized_placed.push(entity);
    let position = to_dvec3(transform.translation());
    if let Err(err) = index.insert_or_update(entity, position, tracked.is_static) {
      debug!("{entity} not indexed: {err}");
      stats.placement_misses += 1;
    }
  }

  for (entity, tracked, transform, size) in &changed {
    if unsized_placed.contains(&entity) {
      continue;
    }
    let resized = size.as_ref().is_some_and(|size| size.is_changed());
    let retry = transform.is_changed() && index.node_of(&entity).is_none();
    if !tracked.is_changed() && !resized && !retry {
      continue;
    }

    let position = to_dvec3(transform.translation());
    let placed = match size {
      Some(size) => index.insert_or_update_sized(entity, position, size.0 as f64, tracked.is_static),
      None => index.insert_or_update(entity, position, tracked.is_static),
    };
    if let Err(err) = placed {
      debug!("{entity} not indexed: {err}");
      stats.placement_misses += 1;
    }
  }
}

/// Re-home dynamic entities that moved out of their node.
pub fn retrack_dynamic(
  transforms: Query<&GlobalTransform, With<Tracked>>,
  mut index: ResMut<SceneIndex>,
  mut stats: ResMut<SceneIndexStats>,
) {
  let positions = positions_from_fn(|entity: &Entity| {
    transforms
      .get(*entity)
      .ok()
      .map(|transform| to_dvec3(transform.translation()))
  });
  stats.last_retrack = index.retrack(&positions);
  stats.tracked = index.len();
}
