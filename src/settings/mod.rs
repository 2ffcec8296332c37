//! Settings, types and defaults.
//!
//! Settings are stored as a RON file under `data/settings/` and are hot-reloadable
//! using the RON watcher utilities (see `ron::setup_ron_watcher`).
use bevy::prelude::{KeyCode, Resource, Vec3};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

use crate::locomotion::LocomotionConfig;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphicsSettings {
    #[serde(default = "GraphicsSettings::default_vsync")]
    pub vsync: bool, // Enable vertical sync to cap FPS to the display refresh rate.
    #[serde(default = "GraphicsSettings::default_shadows")]
    pub shadows: bool, // Enable/disable directional light shadows
    #[serde(default = "GraphicsSettings::default_light_intensity")]
    pub light_intensity: f32, // Multiplier applied to ambient, sun and sky-fill lights
}

impl GraphicsSettings {
    fn default_vsync() -> bool { true }
    fn default_shadows() -> bool { true }
    fn default_light_intensity() -> f32 { 0.5 }
}

impl Default for GraphicsSettings {
    fn default() -> Self {
        Self {
            vsync: Self::default_vsync(),
            shadows: Self::default_shadows(),
            light_intensity: Self::default_light_intensity(),
        }
    }
}

/// Whether the virtual joystick and buttons drive the player.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TouchMode {
    /// Switch to touch controls on the first touch event.
    #[default]
    Auto,
    On,
    Off,
}

/// Controls / input settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControlsSettings {
    #[serde(default)]
    pub invert_y: bool, // Invert pointer Y axis
    #[serde(default)]
    pub invert_x: bool, // Invert pointer X axis
    #[serde(default = "ControlsSettings::default_sensitivity")]
    pub mouse_sensitivity: f32, // Pointer sensitivity multiplier
    #[serde(default)]
    pub touch: TouchMode,
    #[serde(default = "ControlsSettings::default_keybinds")]
    pub keybinds: HashMap<String, String>, // Map of action names to key identifiers (editable by user)
}

impl ControlsSettings {
    fn default_sensitivity() -> f32 { 1.0 }

    fn default_keybinds() -> HashMap<String, String> {
        [
            ("forward", "W"),
            ("jump", "Space"),
            ("pause", "Escape"),
            ("toggle_camera", "C"),
            ("toggle_debug", "F1"),
            ("toggle_colliders", "F2"),
            ("dump_debug", "F3"),
        ]
        .into_iter()
        .map(|(action, key)| (action.to_string(), key.to_string()))
        .collect()
    }

    /// Key bound to `action`, or `default` when unbound or unrecognised.
    #[must_use]
    pub fn key(&self, action: &str, default: KeyCode) -> KeyCode {
        self.keybinds
            .get(action)
            .and_then(|s| Settings::keycode_from_str(s))
            .unwrap_or(default)
    }
}

impl Default for ControlsSettings {
    fn default() -> Self {
        Self {
            invert_y: false,
            invert_x: false,
            mouse_sensitivity: Self::default_sensitivity(),
            touch: TouchMode::default(),
            keybinds: Self::default_keybinds(),
        }
    }
}

/// Player locomotion tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocomotionSettings {
    #[serde(default = "LocomotionSettings::default_run_speed")]
    pub run_speed: f32, // Forward speed (units/s)
    #[serde(default = "LocomotionSettings::default_turn_speed")]
    pub turn_speed: f32, // Turn rate toward the camera heading with keyboard/mouse (rad/s)
    #[serde(default = "LocomotionSettings::default_touch_turn_speed")]
    pub touch_turn_speed: f32, // Turn rate with touch controls (rad/s)
    #[serde(default = "LocomotionSettings::default_dead_zone_deg")]
    pub dead_zone_deg: f32, // Heading difference ignored by the turn logic
    #[serde(default = "LocomotionSettings::default_jump_impulse")]
    pub jump_impulse: f32,
    #[serde(default = "LocomotionSettings::default_jump_duration_ms")]
    pub jump_duration_ms: u64, // Length of the jump clip; jumping is locked for this long
    #[serde(default = "LocomotionSettings::default_clip_blend_ms")]
    pub clip_blend_ms: u64, // Cross-fade between clips
}

impl LocomotionSettings {
    fn default_run_speed() -> f32 { 4.0 }
    fn default_turn_speed() -> f32 { 4.0 }
    fn default_touch_turn_speed() -> f32 { 2.0 }
    fn default_dead_zone_deg() -> f32 { 7.5 }
    fn default_jump_impulse() -> f32 { 6.0 }
    fn default_jump_duration_ms() -> u64 { 650 }
    fn default_clip_blend_ms() -> u64 { 500 }

    /// Controller tuning for the active input device.
    #[must_use]
    pub fn config(&self, touch: bool) -> LocomotionConfig {
        LocomotionConfig {
            run_speed: self.run_speed,
            turn_speed: if touch { self.touch_turn_speed } else { self.turn_speed },
            dead_zone: self.dead_zone_deg.to_radians(),
            jump_impulse: self.jump_impulse,
            jump_duration: Duration::from_millis(self.jump_duration_ms),
            clip_blend: Duration::from_millis(self.clip_blend_ms),
        }
    }
}

impl Default for LocomotionSettings {
    fn default() -> Self {
        Self {
            run_speed: Self::default_run_speed(),
            turn_speed: Self::default_turn_speed(),
            touch_turn_speed: Self::default_touch_turn_speed(),
            dead_zone_deg: Self::default_dead_zone_deg(),
            jump_impulse: Self::default_jump_impulse(),
            jump_duration_ms: Self::default_jump_duration_ms(),
            clip_blend_ms: Self::default_clip_blend_ms(),
        }
    }
}

/// Third-person camera rig.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CameraSettings {
    #[serde(default = "CameraSettings::default_offset")]
    pub offset: (f32, f32, f32), // Look-at point relative to the player
    #[serde(default = "CameraSettings::default_target_radius")]
    pub target_radius: f32, // Distance from the look-at point
    #[serde(default = "CameraSettings::default_initial_theta_deg")]
    pub initial_theta_deg: f32, // Starting orbit angle around the player
    #[serde(default = "CameraSettings::default_look_scale")]
    pub look_scale: f32, // Multiplier applied to pointer/joystick deltas
    #[serde(default = "CameraSettings::default_ortho_zoom")]
    pub ortho_zoom: f32, // Pixels per world unit for the orthographic view
}

impl CameraSettings {
    fn default_offset() -> (f32, f32, f32) { (0.0, 1.0, 0.0) }
    fn default_target_radius() -> f32 { 3.0 }
    fn default_initial_theta_deg() -> f32 { 90.0 }
    fn default_look_scale() -> f32 { 2.0 }
    fn default_ortho_zoom() -> f32 { 10.0 }

    #[must_use]
    pub fn offset_vec(&self) -> Vec3 {
        Vec3::new(self.offset.0, self.offset.1, self.offset.2)
    }
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            offset: Self::default_offset(),
            target_radius: Self::default_target_radius(),
            initial_theta_deg: Self::default_initial_theta_deg(),
            look_scale: Self::default_look_scale(),
            ortho_zoom: Self::default_ortho_zoom(),
        }
    }
}

/// Physics step and player body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhysicsSettings {
    #[serde(default = "PhysicsSettings::default_fixed_hz")]
    pub fixed_hz: u32, // Fixed simulation rate
    #[serde(default = "PhysicsSettings::default_max_substeps")]
    pub max_substeps: u32, // Most fixed steps simulated per rendered frame
    #[serde(default = "PhysicsSettings::default_gravity")]
    pub gravity: f32,
    #[serde(default = "PhysicsSettings::default_ground_friction")]
    pub ground_friction: f32, // Horizontal damping (1/s) while grounded and not driven
    #[serde(default = "PhysicsSettings::default_player_size")]
    pub player_size: (f32, f32, f32), // Player box (width, height, depth) in world units
    #[serde(default = "PhysicsSettings::default_player_offset")]
    pub player_offset: (f32, f32, f32), // Box center relative to the player origin
    #[serde(default = "PhysicsSettings::default_player_mass")]
    pub player_mass: f32,
}

impl PhysicsSettings {
    fn default_fixed_hz() -> u32 { 120 }
    fn default_max_substeps() -> u32 { 10 }
    fn default_gravity() -> f32 { -9.81 }
    fn default_ground_friction() -> f32 { 10.0 }
    fn default_player_size() -> (f32, f32, f32) { (0.5, 1.0, 0.4) }
    fn default_player_offset() -> (f32, f32, f32) { (0.0, 0.5, 0.0) }
    fn default_player_mass() -> f32 { 1.0 }
}

impl Default for PhysicsSettings {
    fn default() -> Self {
        Self {
            fixed_hz: Self::default_fixed_hz(),
            max_substeps: Self::default_max_substeps(),
            gravity: Self::default_gravity(),
            ground_friction: Self::default_ground_friction(),
            player_size: Self::default_player_size(),
            player_offset: Self::default_player_offset(),
            player_mass: Self::default_player_mass(),
        }
    }
}

/// Atmosphere settings to configure the bevy_atmosphere crate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AtmosphereSettings {
    #[serde(default = "AtmosphereSettings::default_enabled")]
    pub enabled: bool, // Enable the sky renderer (requires a restart)
    #[serde(default = "AtmosphereSettings::default_resolution")]
    pub resolution: u32, // Resolution of each skybox face (Auto update at runtime)
    #[serde(default = "AtmosphereSettings::default_dithering")]
    pub dithering: bool, // Reduce color banding in the sky (Auto update at runtime)
}

impl AtmosphereSettings {
    fn default_enabled() -> bool { true }
    fn default_resolution() -> u32 { 512 }
    fn default_dithering() -> bool { true }
}

impl Default for AtmosphereSettings {
    fn default() -> Self {
        Self {
            enabled: Self::default_enabled(),
            resolution: Self::default_resolution(),
            dithering: Self::default_dithering(),
        }
    }
}

/// Asset paths, relative to the `assets/` directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetSettings {
    #[serde(default = "AssetSettings::default_terrace")]
    pub terrace: String,
    #[serde(default = "AssetSettings::default_player")]
    pub player: String,
    #[serde(default = "AssetSettings::default_bird")]
    pub bird: String,
}

impl AssetSettings {
    fn default_terrace() -> String { "glb/terrace.glb".to_string() }
    fn default_player() -> String { "glb/idle.glb".to_string() }
    fn default_bird() -> String { "glb/bird.glb".to_string() }
}

impl Default for AssetSettings {
    fn default() -> Self {
        Self {
            terrace: Self::default_terrace(),
            player: Self::default_player(),
            bird: Self::default_bird(),
        }
    }
}

/// Top-level Settings
#[derive(Resource, Clone, Debug, Default, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub graphics: GraphicsSettings,
    #[serde(default)]
    pub controls: ControlsSettings,
    #[serde(default)]
    pub locomotion: LocomotionSettings,
    #[serde(default)]
    pub camera: CameraSettings,
    #[serde(default)]
    pub physics: PhysicsSettings,
    #[serde(default)]
    pub atmosphere: AtmosphereSettings,
    #[serde(default)]
    pub assets: AssetSettings,
}

/// Key names understood in `controls.keybinds` (matched case-insensitively).
const KEY_NAMES: &[(&str, KeyCode)] = &[
    ("A", KeyCode::KeyA), ("B", KeyCode::KeyB), ("C", KeyCode::KeyC), ("D", KeyCode::KeyD),
    ("E", KeyCode::KeyE), ("F", KeyCode::KeyF), ("G", KeyCode::KeyG), ("H", KeyCode::KeyH),
    ("I", KeyCode::KeyI), ("J", KeyCode::KeyJ), ("K", KeyCode::KeyK), ("L", KeyCode::KeyL),
    ("M", KeyCode::KeyM), ("N", KeyCode::KeyN), ("O", KeyCode::KeyO), ("P", KeyCode::KeyP),
    ("Q", KeyCode::KeyQ), ("R", KeyCode::KeyR), ("S", KeyCode::KeyS), ("T", KeyCode::KeyT),
    ("U", KeyCode::KeyU), ("V", KeyCode::KeyV), ("W", KeyCode::KeyW), ("X", KeyCode::KeyX),
    ("Y", KeyCode::KeyY), ("Z", KeyCode::KeyZ),
    ("0", KeyCode::Digit0), ("1", KeyCode::Digit1), ("2", KeyCode::Digit2), ("3", KeyCode::Digit3),
    ("4", KeyCode::Digit4), ("5", KeyCode::Digit5), ("6", KeyCode::Digit6), ("7", KeyCode::Digit7),
    ("8", KeyCode::Digit8), ("9", KeyCode::Digit9),
    ("F1", KeyCode::F1), ("F2", KeyCode::F2), ("F3", KeyCode::F3), ("F4", KeyCode::F4),
    ("F5", KeyCode::F5), ("F6", KeyCode::F6), ("F7", KeyCode::F7), ("F8", KeyCode::F8),
    ("F9", KeyCode::F9), ("F10", KeyCode::F10), ("F11", KeyCode::F11), ("F12", KeyCode::F12),
    ("UP", KeyCode::ArrowUp), ("ARROWUP", KeyCode::ArrowUp),
    ("DOWN", KeyCode::ArrowDown), ("ARROWDOWN", KeyCode::ArrowDown),
    ("LEFT", KeyCode::ArrowLeft), ("ARROWLEFT", KeyCode::ArrowLeft),
    ("RIGHT", KeyCode::ArrowRight), ("ARROWRIGHT", KeyCode::ArrowRight),
    ("SPACE", KeyCode::Space), ("TAB", KeyCode::Tab),
    ("ENTER", KeyCode::Enter), ("RETURN", KeyCode::Enter),
    ("ESC", KeyCode::Escape), ("ESCAPE", KeyCode::Escape),
    ("BACKSPACE", KeyCode::Backspace),
    ("SHIFT", KeyCode::ShiftLeft), ("LSHIFT", KeyCode::ShiftLeft), ("RSHIFT", KeyCode::ShiftRight),
    ("CTRL", KeyCode::ControlLeft), ("LCTRL", KeyCode::ControlLeft), ("RCTRL", KeyCode::ControlRight),
    ("ALT", KeyCode::AltLeft), ("LALT", KeyCode::AltLeft), ("RALT", KeyCode::AltRight),
];

impl Settings {
    #[must_use]
    pub fn defaults() -> Self { Settings::default() }

    /// Convert a key identifier (e.g. from `controls.keybinds`) into a `KeyCode`.
    ///
    /// # Arguments
    /// * `name` - The key identifier to convert (e.g. "W", "Space", "F1").
    ///
    /// # Returns
    /// The matching `KeyCode`, or `None` if the name is unknown.
    #[must_use]
    pub fn keycode_from_str(name: &str) -> Option<KeyCode> {
        let upper = name.trim().to_ascii_uppercase();
        KEY_NAMES
            .iter()
            .find(|(n, _)| *n == upper)
            .map(|(_, k)| *k)
    }
}

pub mod loader;
