// src/terrain/plugin.rs
use bevy::prelude::*;

use crate::terrain::config::SurfaceConfig;
use crate::terrain::surface::Surface;

/// One terrain patch: its surface and the patch offset used for tiling.
///
/// Any mutable access (e.g. a generator writing heights) marks the patch
/// changed, and its `Mesh3d` is rebuilt in the next `Update`.
#[derive(Component, Debug)]
pub struct SurfacePatch {
    pub surface: Surface,
    pub offset: IVec2,
}

impl SurfacePatch {
    pub fn new(surface: Surface, offset: IVec2) -> Self {
        Self { surface, offset }
    }
}

/// Rebuilds changed patches into their mesh assets.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub struct SurfaceRebuildSet;

pub struct SurfacePlugin;

impl Plugin for SurfacePlugin {
    fn build(&self, app: &mut App) {
        app
            .init_resource::<SurfaceConfig>()
            .add_systems(
                Update,
                rebuild_surface_patches_system.in_set(SurfaceRebuildSet),
            );
    }
}

pub fn rebuild_surface_patches_system(
    mut meshes: ResMut<Assets<Mesh>>,
    mut q_patches: Query<(Entity, &mut SurfacePatch, &Mesh3d), Changed<SurfacePatch>>,
) {
    for (e, mut patch, mesh3d) in q_patches.iter_mut() {
        let Some(mesh) = meshes.get_mut(&mesh3d.0) else {
            warn!("surface patch {e:?} has no mesh asset");
            continue;
        };
        // Rebuilding only touches scratch; it is not a content change.
        let patch = patch.bypass_change_detection();
        let offset = patch.offset;
        if let Err(err) = patch.surface.rebuild(mesh, offset.x, offset.y) {
            warn!("surface patch {e:?} not rebuilt: {err}");
        }
    }
}
