//! Third-person follow camera.
//!
//! The rig orbits a look-at point above the player. Pointer and joystick
//! deltas turn it (`apply_delta`), `place` moves the camera transform around
//! the target (`follow_player` does both each frame), and `toggle_projection` swaps between perspective and a fixed
//! zoom orthographic view.

use bevy::prelude::*;
use bevy::render::camera::ScalingMode;

use super::PlayerIntent;
use crate::settings::{ControlsSettings, Settings};

// Keeps the camera from flipping over the top of the player.
const CAMERA_MAX_PHI_DEG: f32 = 85.0;

/// Orbit state of the follow camera. Angles are in degrees.
#[derive(Component, Debug, Clone)]
pub struct ThirdPersonCamera {
    /// Entity being followed.
    pub target: Option<Entity>,
    /// Horizontal orbit angle around the target.
    pub theta: f32,
    /// Elevation above the target's horizontal plane.
    pub phi: f32,
    /// Distance from the look-at point.
    pub radius: f32,
    /// Look-at point relative to the target translation.
    pub offset: Vec3,
    /// Orthographic projection active.
    pub ortho: bool,
}

impl Default for ThirdPersonCamera {
    fn default() -> Self {
        Self { target: None, theta: 90.0, phi: 0.0, radius: 3.0, offset: Vec3::Y, ortho: false }
    }
}

impl ThirdPersonCamera {
    /// Apply a look delta (x right, y up) scaled by the pointer sensitivity.
    pub fn apply_delta(&mut self, delta: Vec2, controls: &ControlsSettings) {
        let mut d = delta * (controls.mouse_sensitivity * 0.5);
        if controls.invert_x {
            d.x = -d.x;
        }
        if controls.invert_y {
            d.y = -d.y;
        }
        self.theta = (self.theta - d.x).rem_euclid(360.0);
        self.phi = (self.phi + d.y).clamp(-CAMERA_MAX_PHI_DEG, CAMERA_MAX_PHI_DEG);
    }

    #[must_use]
    pub fn look_at_point(&self, target: Vec3) -> Vec3 {
        target + self.offset
    }

    /// Camera position for a target at `target`.
    #[must_use]
    pub fn eye(&self, target: Vec3) -> Vec3 {
        let (st, ct) = self.theta.to_radians().sin_cos();
        let (sp, cp) = self.phi.to_radians().sin_cos();
        self.look_at_point(target) + Vec3::new(st * cp, sp, ct * cp) * self.radius
    }

    /// Move `camera` onto the orbit and aim it at the look-at point.
    pub fn place(&self, camera: &mut Transform, target: Vec3) {
        let look = self.look_at_point(target);
        *camera = Transform::from_translation(self.eye(target)).looking_at(look, Vec3::Y);
    }
}

/// Turn the rig by this frame's look delta and move it around its target.
#[allow(clippy::needless_pass_by_value)]
pub fn follow_player(
    intent: Res<PlayerIntent>,
    settings: Res<Settings>,
    targets: Query<&Transform, Without<ThirdPersonCamera>>,
    mut cameras: Query<(&mut Transform, &mut ThirdPersonCamera)>,
) {
    let delta = Vec2::new(intent.0.move_right, intent.0.move_top) * settings.camera.look_scale;
    for (mut tf, mut rig) in &mut cameras {
        let Some(target) = rig.target.and_then(|e| targets.get(e).ok()) else { continue };
        if delta != Vec2::ZERO {
            rig.apply_delta(delta, &settings.controls);
        }
        rig.place(&mut tf, target.translation);
    }
}

/// Build the orthographic projection used by the alternate view.
#[must_use]
pub fn orthographic(zoom: f32) -> Projection {
    Projection::Orthographic(OrthographicProjection {
        scaling_mode: ScalingMode::WindowSize(zoom.max(0.01)),
        ..default()
    })
}

/// Swap between perspective and orthographic projection on the mapped key.
#[allow(clippy::needless_pass_by_value)]
pub fn toggle_projection(
    keys: Res<ButtonInput<KeyCode>>,
    settings: Res<Settings>,
    mut cameras: Query<(&mut Projection, &mut ThirdPersonCamera)>,
) {
    if !keys.just_pressed(settings.controls.key("toggle_camera", KeyCode::KeyC)) {
        return;
    }
    for (mut projection, mut rig) in &mut cameras {
        rig.ortho = !rig.ortho;
        *projection = if rig.ortho {
            orthographic(settings.camera.ortho_zoom)
        } else {
            Projection::Perspective(PerspectiveProjection::default())
        };
        info!("camera: {}", if rig.ortho { "orthographic" } else { "perspective" });
    }
}
