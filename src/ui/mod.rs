//! Debug overlay and collider gizmos.
//!
//! F1 toggles a text overlay with FPS, player position, headings and the
//! locomotion state; F2 draws every collider and body box. Both keys come
//! from the keybind table.

use bevy::diagnostic::{Diagnostic, DiagnosticsStore, FrameTimeDiagnosticsPlugin};
use bevy::prelude::*;

use crate::locomotion::{heading_of, AnimClip};
use crate::physics::{Body, StaticCollider};
use crate::player::{InputDevice, Player, ThirdPersonCamera};
use crate::settings::Settings;
use crate::stage::GameStage;

/// State for the debug overlay visibility.
#[derive(Resource, Default)]
pub struct DebugOverlayState {
    pub visible: bool,
}

#[derive(Resource)]
pub struct DebugOverlayTimer(pub Timer);

impl Default for DebugOverlayTimer {
    fn default() -> Self {
        Self(Timer::from_seconds(0.25, TimerMode::Repeating))
    }
}

#[derive(Resource, Default)]
pub struct ColliderGizmos(pub bool);

#[derive(Component)]
pub struct DebugOverlayText;

pub struct DebugUiPlugin;

impl Plugin for DebugUiPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<DebugOverlayState>()
            .init_resource::<DebugOverlayTimer>()
            .init_resource::<ColliderGizmos>()
            .add_systems(Startup, spawn_debug_overlay)
            .add_systems(Update, (toggle_debug_overlay, toggle_collider_gizmos))
            .add_systems(
                Update,
                (update_debug_overlay, draw_collider_gizmos).run_if(in_state(GameStage::Main)),
            );
    }
}

#[allow(clippy::needless_pass_by_value)]
pub fn toggle_debug_overlay(
    mut state: ResMut<DebugOverlayState>,
    input: Res<ButtonInput<KeyCode>>,
    settings: Res<Settings>,
    mut text: Query<&mut Text, With<DebugOverlayText>>,
) {
    if !input.just_pressed(settings.controls.key("toggle_debug", KeyCode::F1)) {
        return;
    }
    state.visible = !state.visible;
    if !state.visible {
        for mut t in &mut text {
            t.sections[0].value.clear();
        }
    }
}

#[allow(clippy::needless_pass_by_value)]
pub fn toggle_collider_gizmos(
    mut gizmos: ResMut<ColliderGizmos>,
    input: Res<ButtonInput<KeyCode>>,
    settings: Res<Settings>,
) {
    if input.just_pressed(settings.controls.key("toggle_colliders", KeyCode::F2)) {
        gizmos.0 = !gizmos.0;
    }
}

pub fn spawn_debug_overlay(mut commands: Commands) {
    commands.spawn((
        TextBundle::from_section(
            "",
            TextStyle { font_size: 18.0, color: Color::srgb(1.0, 1.0, 0.0), ..default() },
        )
        .with_style(Style {
            position_type: PositionType::Absolute,
            left: Val::Px(10.0),
            top: Val::Px(10.0),
            ..default()
        }),
        DebugOverlayText,
    ));
}

/// Values shown by the overlay.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct OverlaySnapshot {
    pub fps: f64,
    pub frame_time_ms: f64,
    pub position: Option<Vec3>,
    /// (camera, player) headings in radians.
    pub headings: Option<(f32, f32)>,
    pub clip: AnimClip,
    pub can_jump: bool,
    pub grounded: bool,
    pub touch: bool,
}

/// Compass label for a heading (radians, `atan2(x, z)`).
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn compass(heading: f32) -> &'static str {
    const LABELS: [&str; 8] = ["+Z", "+X+Z", "+X", "+X-Z", "-Z", "-X-Z", "-X", "-X+Z"];
    let octant = (heading.to_degrees() / 45.0).round().rem_euclid(8.0);
    LABELS[octant as usize % 8]
}

#[must_use]
pub fn overlay_text(s: &OverlaySnapshot) -> String {
    let pos = s.position.map_or_else(
        || "Pos: N/A".to_string(),
        |p| format!("Pos: ({:.2}, {:.2}, {:.2})", p.x, p.y, p.z),
    );
    let headings = s.headings.map_or_else(
        || "Heading: N/A".to_string(),
        |(cam, player)| {
            format!(
                "Heading: camera {:.1}° ({}) | player {:.1}° ({})",
                cam.to_degrees(),
                compass(cam),
                player.to_degrees(),
                compass(player)
            )
        },
    );
    format!(
        "FPS: {:.1} ({:.2} ms)\n{pos}\n{headings}\nClip: {} | can jump: {} | grounded: {}\nInput: {}",
        s.fps,
        s.frame_time_ms,
        s.clip,
        s.can_jump,
        s.grounded,
        if s.touch { "touch" } else { "keyboard/pointer" },
    )
}

#[derive(bevy::ecs::system::SystemParam)]
pub struct DebugOverlayCtx<'w, 's> {
    pub diagnostics: Res<'w, DiagnosticsStore>,
    pub state: Res<'w, DebugOverlayState>,
    pub device: Res<'w, InputDevice>,
    pub time: Res<'w, Time>,
    pub timer: ResMut<'w, DebugOverlayTimer>,
    pub text: Query<'w, 's, &'static mut Text, With<DebugOverlayText>>,
    pub players: Query<'w, 's, (&'static Transform, &'static Player, &'static Body)>,
    pub cameras: Query<'w, 's, &'static Transform, With<ThirdPersonCamera>>,
}

/// Refresh the overlay text at a fixed interval while it is visible.
pub fn update_debug_overlay(mut ctx: DebugOverlayCtx<'_, '_>) {
    if !ctx.timer.0.tick(ctx.time.delta()).just_finished() || !ctx.state.visible {
        return;
    }
    let Ok(mut text) = ctx.text.get_single_mut() else { return };

    let fps = ctx
        .diagnostics
        .get(&FrameTimeDiagnosticsPlugin::FPS)
        .and_then(Diagnostic::smoothed)
        .unwrap_or(0.0);
    let frame_time_ms = ctx
        .diagnostics
        .get(&FrameTimeDiagnosticsPlugin::FRAME_TIME)
        .and_then(Diagnostic::smoothed)
        .unwrap_or(0.0);

    let mut snap = OverlaySnapshot { fps, frame_time_ms, touch: ctx.device.touch, ..default() };
    if let Ok((tf, player, body)) = ctx.players.get_single() {
        snap.position = Some(tf.translation);
        snap.clip = player.locomotion.clip;
        snap.can_jump = player.locomotion.can_jump;
        snap.grounded = body.grounded;
        if let Ok(cam) = ctx.cameras.get_single() {
            snap.headings = Some((heading_of(*cam.forward()), heading_of(*tf.back())));
        }
    }
    text.sections[0].value = overlay_text(&snap);
}

/// Outline colliders (solid white, sensors cyan) and bodies (green).
#[allow(clippy::needless_pass_by_value)]
pub fn draw_collider_gizmos(
    enabled: Res<ColliderGizmos>,
    mut gizmos: Gizmos,
    colliders: Query<&StaticCollider>,
    bodies: Query<(&Transform, &Body)>,
) {
    if !enabled.0 {
        return;
    }
    for c in &colliders {
        let color = if c.sensor { Color::srgb(0.0, 1.0, 1.0) } else { Color::WHITE };
        gizmos.cuboid(Transform::from_translation(c.aabb.center()).with_scale(c.aabb.size()), color);
    }
    for (tf, body) in &bodies {
        let b = body.aabb_at(tf.translation);
        gizmos.cuboid(Transform::from_translation(b.center()).with_scale(b.size()), Color::srgb(0.0, 1.0, 0.0));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::{FRAC_PI_2, PI};

    #[test]
    fn compass_octants() {
        assert_eq!(compass(0.0), "+Z");
        assert_eq!(compass(FRAC_PI_2), "+X");
        assert_eq!(compass(-FRAC_PI_2), "-X");
        assert_eq!(compass(PI), "-Z");
        assert_eq!(compass(-PI), "-Z");
    }

    #[test]
    fn overlay_lists_locomotion_state() {
        let text = overlay_text(&OverlaySnapshot {
            fps: 59.94,
            frame_time_ms: 16.683,
            position: Some(Vec3::new(1.0, 0.0, -2.5)),
            headings: Some((-FRAC_PI_2, 0.0)),
            clip: AnimClip::Run,
            can_jump: true,
            grounded: true,
            touch: false,
        });
        assert!(text.starts_with("FPS: 59.9 (16.68 ms)\n"));
        assert!(text.contains("Pos: (1.00, 0.00, -2.50)"));
        assert!(text.contains("camera -90.0° (-X)"));
        assert!(text.contains("Clip: run | can jump: true | grounded: true"));
        assert!(text.ends_with("Input: keyboard/pointer"));
    }

    #[test]
    fn overlay_without_player() {
        let text = overlay_text(&OverlaySnapshot::default());
        assert!(text.contains("Pos: N/A"));
        assert!(text.contains("Heading: N/A"));
    }
}
