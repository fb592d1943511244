//! App-level tests for the scene index bridge.

use bevy::prelude::*;
use scene_index::glam::DVec3;
use scene_index::IndexConfig;

use super::{SceneIndex, SceneIndexPlugin, SceneIndexStats, Tracked, TrackedSize};

fn test_app() -> App {
  let mut app = App::new();
  app.add_plugins(SceneIndexPlugin {
    config: IndexConfig {
      region_extent: 100.0,
      max_depth: 2,
      ..IndexConfig::default()
    },
  });
  app
}

fn spawn_at(app: &mut App, tracked: Tracked, at: Vec3) -> Entity {
  app
    .world_mut()
    .spawn((tracked, GlobalTransform::from_translation(at)))
    .id()
}

fn move_to(app: &mut App, entity: Entity, at: Vec3) {
  app
    .world_mut()
    .entity_mut(entity)
    .insert(GlobalTransform::from_translation(at));
}

fn index(app: &App) -> &SceneIndex {
  app.world().resource::<SceneIndex>()
}

#[test]
fn test_added_entity_is_indexed() {
  let mut app = test_app();
  let entity = spawn_at(&mut app, Tracked::DYNAMIC, Vec3::new(10.0, 10.0, 10.0));
  app.update();

  let node = index(&app).node_of(&entity).expect("entity should be tracked");
  assert!(index(&app).entities_at(node).contains(&entity));
  assert_eq!(app.world().resource::<SceneIndexStats>().tracked, 1);
}

#[test]
fn test_moving_entity_is_rehomed() {
  let mut app = test_app();
  let entity = spawn_at(&mut app, Tracked::DYNAMIC, Vec3::new(10.0, 10.0, 10.0));
  app.update();
  let before = index(&app).node_of(&entity).unwrap();

  move_to(&mut app, entity, Vec3::new(-10.0, -10.0, -10.0));
  app.update();

  let after = index(&app).node_of(&entity).unwrap();
  assert_ne!(before, after);
  let stats = app.world().resource::<SceneIndexStats>();
  assert_eq!(stats.last_retrack.rehomed.len(), 1);
  assert!(index(&app).check_consistency().is_ok());
}

#[test]
fn test_static_entity_is_not_retracked() {
  let mut app = test_app();
  let entity = spawn_at(&mut app, Tracked::STATIC, Vec3::new(10.0, 10.0, 10.0));
  app.update();
  let before = index(&app).node_of(&entity).unwrap();

  move_to(&mut app, entity, Vec3::new(-10.0, -10.0, -10.0));
  app.update();

  assert_eq!(index(&app).node_of(&entity), Some(before));
  assert_eq!(index(&app).tracked(&entity).unwrap().position, DVec3::splat(10.0));
}

#[test]
fn test_despawned_entity_is_untracked() {
  let mut app = test_app();
  let entity = spawn_at(&mut app, Tracked::DYNAMIC, Vec3::ZERO);
  app.update();
  assert_eq!(index(&app).len(), 1);

  app.world_mut().despawn(entity);
  app.update();
  assert!(index(&app).is_empty());
}

#[test]
fn test_sized_entity_stops_above_leaves() {
  let mut app = test_app();
  let entity = app
    .world_mut()
    .spawn((
      Tracked::DYNAMIC,
      TrackedSize(40.0),
      GlobalTransform::from_translation(Vec3::splat(10.0)),
    ))
    .id();
  app.update();

  let node = index(&app).node_of(&entity).unwrap();
  assert_eq!(index(&app).tree().depth(node), 1, "40 / 50 exceeds the ratio");
}

#[test]
fn test_removing_size_falls_back_to_point_placement() {
  let mut app = test_app();
  let entity = app
    .world_mut()
    .spawn((
      Tracked::STATIC,
      TrackedSize(40.0),
      GlobalTransform::from_translation(Vec3::splat(10.0)),
    ))
    .id();
  app.update();
  assert_eq!(index(&app).tracked(&entity).unwrap().size, Some(40.0));

  app.world_mut().entity_mut(entity).remove::<TrackedSize>();
  app.update();

  let record = index(&app).tracked(&entity).unwrap();
  assert_eq!(record.size, None);
  assert!(index(&app).tree().is_leaf(record.node));
  assert!(index(&app).check_consistency().is_ok());
}

#[test]
fn test_entity_returning_to_region_is_indexed_again() {
  let mut app = test_app();
  let entity = spawn_at(&mut app, Tracked::DYNAMIC, Vec3::new(10.0, 10.0, 10.0));
  app.update();

  move_to(&mut app, entity, Vec3::new(500.0, 0.0, 0.0));
  app.update();
  assert!(index(&app).node_of(&entity).is_none());
  let stats = app.world().resource::<SceneIndexStats>();
  assert_eq!(stats.last_retrack.evicted, vec![entity]);

  move_to(&mut app, entity, Vec3::new(-10.0, 10.0, 10.0));
  app.update();

  let node = index(&app).node_of(&entity).expect("entity should be indexed again");
  assert!(index(&app).entities_at(node).contains(&entity));
  assert!(index(&app).check_consistency().is_ok());
}

#[test]
fn test_outside_region_counts_as_miss() {
  let mut app = test_app();
  let entity = spawn_at(&mut app, Tracked::DYNAMIC, Vec3::splat(500.0));
  app.update();

  assert!(index(&app).node_of(&entity).is_none());
  assert_eq!(app.world().resource::<SceneIndexStats>().placement_misses, 1);
}

#[test]
fn test_invalid_config_skips_plugin() {
  let mut app = App::new();
  app.add_plugins(SceneIndexPlugin {
    config: IndexConfig {
      region_extent: 0.0,
      ..IndexConfig::default()
    },
  });
  app.update();
  assert!(app.world().get_resource::<SceneIndex>().is_none());
}
