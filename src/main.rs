use std::f32::consts::FRAC_PI_2;

use bevy::prelude::*;
use noisy_bevy::simplex_noise_2d_seeded;
use terrain_surface::terrain::{surface_mesh, HeightField, SurfaceConfig, SurfacePatch};
use terrain_surface::AppPlugin;

/// Patches per side of the demo grid.
const PATCHES: i32 = 3;
/// Number of atlas textures the generator picks from.
const TEXTURES: i32 = 4;

#[derive(Resource)]
struct Seed(f32);

fn main() -> AppExit {
    App::new()
        .add_plugins(AppPlugin)
        .insert_resource(SurfaceConfig {
            height_scale: 6.0,
            ..default()
        })
        .insert_resource(Seed(1234.))
        .add_systems(Startup, setup)
        .add_systems(Update, reseed_on_space)
        .run()
}

fn setup(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    cfg: Res<SurfaceConfig>,
    seed: Res<Seed>,
) {
    let material = materials.add(StandardMaterial {
        base_color: Color::srgb(0.45, 0.55, 0.35),
        perceptual_roughness: 0.9,
        ..default()
    });

    let step = Vec2::new((cfg.width - 1) as f32, (cfg.height - 1) as f32);
    for py in 0..PATCHES {
        for px in 0..PATCHES {
            let mut surface = match cfg.build() {
                Ok(s) => s,
                Err(err) => {
                    error!("invalid surface config: {err}");
                    return;
                }
            };
            // Patch offsets are in grid cells so tiling lines up across patches.
            let offset = IVec2::new(px, py) * step.as_ivec2();
            generate(surface.points_mut(), offset, seed.0);

            info!("spawning surface patch at {offset}");
            commands.spawn((
                Name::new(format!("Patch {px},{py}")),
                SurfacePatch::new(surface, offset),
                Mesh3d(meshes.add(surface_mesh())),
                MeshMaterial3d(material.clone()),
                // Surfaces are z-up.
                Transform::from_xyz(offset.x as f32, 0.0, -offset.y as f32)
                    .with_rotation(Quat::from_rotation_x(-FRAC_PI_2)),
            ));
        }
    }

    let extent = step * PATCHES as f32;
    commands.spawn((
        Name::new("Camera"),
        Camera3d::default(),
        Transform::from_xyz(-20.0, 45.0, 30.0)
            .looking_at(Vec3::new(extent.x * 0.5, 0.0, -extent.y * 0.5), Vec3::Y),
    ));
    commands.spawn((
        Name::new("Sun"),
        DirectionalLight {
            shadows_enabled: true,
            ..default()
        },
        Transform::from_rotation(Quat::from_euler(
            EulerRot::ZYX,
            0.0,
            std::f32::consts::FRAC_PI_4,
            -std::f32::consts::FRAC_PI_4,
        )),
    ));
}

fn reseed_on_space(
    keys: Res<ButtonInput<KeyCode>>,
    mut seed: ResMut<Seed>,
    mut q_patches: Query<&mut SurfacePatch>,
) {
    if !keys.just_pressed(KeyCode::Space) {
        return;
    }
    seed.0 += 1.0;
    for mut patch in q_patches.iter_mut() {
        let offset = patch.offset;
        generate(patch.surface.points_mut(), offset, seed.0);
    }
}

/// Stand-in terrain generator: seeded simplex heights with texture bands.
fn generate(field: &mut HeightField, offset: IVec2, seed: f32) {
    field.for_each_mut(|x, y, p| {
        let world = Vec2::new((offset.x + x as i32) as f32, (offset.y + y as i32) as f32);
        let h = simplex_noise_2d_seeded(world * 0.03, seed)
            + 0.25 * simplex_noise_2d_seeded(world * 0.12, seed + 17.0);
        let band = ((h * 0.5 + 0.5).clamp(0.0, 0.999) * TEXTURES as f32).floor();

        p.height = h;
        p.texture_index = band as i32;
        p.blend = (h * 0.5 + 0.5) * TEXTURES as f32 - band;
        p.blend = p.blend.clamp(0.0, 1.0);
    });
}
