pub mod terrain;

use bevy::prelude::*;

use terrain::SurfacePlugin;

pub struct AppPlugin;

impl Plugin for AppPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(
            DefaultPlugins
                .set(WindowPlugin {
                    primary_window: Window {
                        title: "Terrain Surface".to_string(),
                        ..default()
                    }
                    .into(),
                    ..default()
                })
        )
        .add_plugins(SurfacePlugin);
    }
}
