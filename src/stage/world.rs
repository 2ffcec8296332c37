//! World setup for the main stage: lights, ground and sky.
use bevy::pbr::NotShadowCaster;
use bevy::prelude::*;

use super::SetupError;
use crate::physics::{Aabb, StaticCollider};
use crate::settings::Settings;

/// Half size of the square ground plane.
pub const GROUND_HALF_SIZE: f32 = 20.0;

const SUN_ILLUMINANCE: f32 = 10_000.0;
const SKY_FILL_ILLUMINANCE: f32 = 2_500.0;
const AMBIENT_BRIGHTNESS: f32 = 400.0;

#[derive(Component)]
pub struct Sun;

/// Soft light from straight above standing in for a sky/ground hemisphere light.
#[derive(Component)]
pub struct SkyFill;

#[derive(Component)]
pub struct Ground;

/// Light levels for a given intensity multiplier: (sun, sky fill, ambient).
#[must_use]
pub fn light_levels(intensity: f32) -> (f32, f32, f32) {
    let k = intensity.max(0.0);
    (SUN_ILLUMINANCE * k, SKY_FILL_ILLUMINANCE * k, AMBIENT_BRIGHTNESS * k)
}

/// Spawn the lights and the ground plane.
#[allow(clippy::needless_pass_by_value)]
pub fn create_world(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    settings: Res<Settings>,
) {
    let (sun, fill, ambient) = light_levels(settings.graphics.light_intensity);

    commands.spawn((
        DirectionalLightBundle {
            directional_light: DirectionalLight {
                illuminance: sun,
                shadows_enabled: settings.graphics.shadows,
                ..default()
            },
            transform: Transform::from_xyz(10.0, 20.0, 10.0).looking_at(Vec3::ZERO, Vec3::Y),
            ..default()
        },
        Sun,
        Name::new("sun"),
    ));

    commands.spawn((
        DirectionalLightBundle {
            directional_light: DirectionalLight {
                illuminance: fill,
                shadows_enabled: false,
                color: Color::srgb(0.72, 0.78, 0.90),
                ..default()
            },
            transform: Transform::from_rotation(Quat::from_rotation_x(-std::f32::consts::FRAC_PI_2)),
            ..default()
        },
        SkyFill,
        Name::new("sky_fill"),
    ));

    commands.insert_resource(AmbientLight { color: Color::WHITE, brightness: ambient });

    let size = GROUND_HALF_SIZE * 2.0;
    commands.spawn((
        PbrBundle {
            mesh: meshes.add(Plane3d::default().mesh().size(size, size)),
            material: materials.add(StandardMaterial {
                base_color: Color::srgb(0.42, 0.52, 0.38),
                perceptual_roughness: 1.0,
                metallic: 0.0,
                ..default()
            }),
            ..default()
        },
        StaticCollider::solid(Aabb::new(
            Vec3::new(-GROUND_HALF_SIZE, -1.0, -GROUND_HALF_SIZE),
            Vec3::new(GROUND_HALF_SIZE, 0.0, GROUND_HALF_SIZE),
        )),
        NotShadowCaster,
        Ground,
        Name::new("ground"),
    ));
}

/// Fail when world setup did not produce its lights.
///
/// # Errors
/// `SetupError::LightsMissing` if the sun or the sky fill is absent.
#[allow(clippy::needless_pass_by_value)]
pub fn verify_lights(
    sun: Query<(), With<Sun>>,
    fill: Query<(), With<SkyFill>>,
    ambient: Option<Res<AmbientLight>>,
) -> Result<(), SetupError> {
    if sun.is_empty() || fill.is_empty() || ambient.is_none() {
        return Err(SetupError::LightsMissing);
    }
    Ok(())
}

/// Re-apply light intensities and shadows when the settings change.
#[allow(clippy::needless_pass_by_value)]
pub fn apply_light_settings(
    settings: Res<Settings>,
    mut ambient: ResMut<AmbientLight>,
    mut suns: Query<&mut DirectionalLight, (With<Sun>, Without<SkyFill>)>,
    mut fills: Query<&mut DirectionalLight, (With<SkyFill>, Without<Sun>)>,
) {
    if !settings.is_changed() {
        return;
    }
    let (sun, fill, amb) = light_levels(settings.graphics.light_intensity);
    for mut light in &mut suns {
        light.illuminance = sun;
        light.shadows_enabled = settings.graphics.shadows;
    }
    for mut light in &mut fills {
        light.illuminance = fill;
    }
    ambient.brightness = amb;
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::ecs::system::RunSystemOnce;

    #[test]
    fn half_intensity_halves_every_light() {
        let (sun, fill, ambient) = light_levels(0.5);
        assert_eq!(sun, SUN_ILLUMINANCE / 2.0);
        assert_eq!(fill, SKY_FILL_ILLUMINANCE / 2.0);
        assert_eq!(ambient, AMBIENT_BRIGHTNESS / 2.0);
        assert_eq!(light_levels(-1.0), (0.0, 0.0, 0.0));
    }

    #[test]
    fn missing_lights_fail_fast() {
        let mut world = World::new();
        assert_eq!(world.run_system_once(verify_lights), Err(SetupError::LightsMissing));

        world.spawn(Sun);
        world.spawn(SkyFill);
        assert_eq!(world.run_system_once(verify_lights), Err(SetupError::LightsMissing));

        world.insert_resource(AmbientLight::default());
        assert_eq!(world.run_system_once(verify_lights), Ok(()));
    }
}
