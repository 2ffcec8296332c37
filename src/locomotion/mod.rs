//! Player locomotion: turn-to-camera heading, run/idle transitions and jumps.
//!
//! Everything in here is plain math over `bevy::math` types so it can be
//! driven from systems, tests and benchmarks alike. The engine-facing side
//! lives in `crate::player::movement`.
//!
//! # Example:
//!
//! ```
//! use terrace::locomotion::{FrameInput, Locomotion, LocomotionConfig};
//!
//! let config = LocomotionConfig::default();
//! let mut loco = Locomotion::default();
//! let input = FrameInput { forward: true, ..Default::default() };
//! let out = loco.step(&input, 0.0, 0.0, 0.0, &config);
//! assert!(out.planar_velocity.is_some());
//! ```
pub mod controller;
pub mod heading;

use std::time::Duration;

pub use controller::*;
pub use heading::*;

/// Named animation clips the locomotion controller switches between.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum AnimClip {
    #[default]
    Idle,
    Run,
    JumpRunning,
}

impl AnimClip {
    /// Clip name as authored in the player's glTF file.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            AnimClip::Idle => "idle",
            AnimClip::Run => "run",
            AnimClip::JumpRunning => "jump_running",
        }
    }
}

impl std::fmt::Display for AnimClip {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A request to start playing `clip`, cross-fading over `blend`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ClipRequest {
    pub clip: AnimClip,
    pub blend: Duration,
    pub looping: bool,
}

/// Per-frame player intent.
///
/// Produced by the input systems, consumed exactly once by the locomotion
/// update and then reset.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FrameInput {
    /// Forward key (or touch move button) held this frame.
    pub forward: bool,
    /// Jump key (or touch jump button) asserted this frame.
    pub jump: bool,
    /// Vertical look delta (pointer drag / joystick), positive is up.
    pub move_top: f32,
    /// Horizontal look delta (pointer drag / joystick), positive is right.
    pub move_right: f32,
}

impl FrameInput {
    /// Return the accumulated intent and leave a zeroed one in its place.
    pub fn take(&mut self) -> FrameInput {
        std::mem::take(self)
    }
}

/// Tuning for the locomotion controller.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LocomotionConfig {
    /// Forward speed in world units per second.
    pub run_speed: f32,
    /// Angular speed (rad/s) applied when turning toward the camera heading.
    pub turn_speed: f32,
    /// Heading difference (radians) below which no turn is applied.
    pub dead_zone: f32,
    /// Upward impulse applied on jump.
    pub jump_impulse: f32,
    /// Length of the jump clip; `can_jump` stays false for this long.
    pub jump_duration: Duration,
    /// Cross-fade used for every clip change.
    pub clip_blend: Duration,
}

impl Default for LocomotionConfig {
    fn default() -> Self {
        Self {
            run_speed: 4.0,
            turn_speed: 4.0,
            dead_zone: std::f32::consts::PI / 24.0,
            jump_impulse: 6.0,
            jump_duration: Duration::from_millis(650),
            clip_blend: Duration::from_millis(500),
        }
    }
}
