//! Bevy bridge for scene_index.
//!
//! Entities carrying [`Tracked`] are placed into an octree [`SceneIndex`]
//! resource from their `GlobalTransform`, re-homed every frame while they
//! move, and untracked when the component goes away.
//!
//! ```ignore
//! app.add_plugins(SceneIndexPlugin::default());
//! commands.spawn((Mesh3d(mesh), Tracked::default()));
//! ```

pub mod components;
pub mod resources;
pub mod systems;

#[cfg(test)]
mod plugin_test;

use bevy::prelude::*;
pub use components::{Tracked, TrackedSize};
pub use resources::{SceneIndex, SceneIndexStats};
use scene_index::{IndexConfig, OctIndex};

/// Builds the index at startup and keeps it in sync in [`Last`], after
/// transform propagation.
#[derive(Default)]
pub struct SceneIndexPlugin {
  pub config: IndexConfig,
}

impl Plugin for SceneIndexPlugin {
  fn build(&self, app: &mut App) {
    let index = match OctIndex::<Entity>::build(&self.config) {
      Ok(index) => index,
      Err(err) => {
        error!("scene index disabled: {err}");
        return;
      }
    };

    app
      .insert_resource(SceneIndex(index))
      .init_resource::<SceneIndexStats>()
      .add_systems(
        Last,
        (
          systems::untrack_removed,
          systems::track_changed,
          systems::retrack_dynamic,
        )
          .chain(),
      );
  }
}
