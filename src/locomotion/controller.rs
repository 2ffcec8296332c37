//! Idle/run/jump state machine with a timestamped jump cooldown.

use bevy::math::Vec2;

use super::{turn_rate, AnimClip, ClipRequest, FrameInput, LocomotionConfig};

/// What the engine should do with the player this frame.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LocomotionOutput {
    /// Angular velocity about Y (rad/s). Zero means stop turning.
    pub angular_velocity_y: f32,
    /// Horizontal velocity `(x, z)` to drive the body with, if moving.
    pub planar_velocity: Option<Vec2>,
    /// Upward impulse to apply once.
    pub jump_impulse: Option<f32>,
    /// Clips to start, in order.
    pub play: Vec<ClipRequest>,
}

/// Locomotion state owned by the player.
#[derive(Clone, Debug, PartialEq)]
pub struct Locomotion {
    /// Clip currently playing.
    pub clip: AnimClip,
    /// Gate for jumping; false while a jump is in progress.
    pub can_jump: bool,
    /// Time (seconds) at which the running jump ends.
    pub jump_ends_at: Option<f64>,
}

impl Default for Locomotion {
    fn default() -> Self {
        Self { clip: AnimClip::Idle, can_jump: true, jump_ends_at: None }
    }
}

impl Locomotion {
    /// Advance one frame.
    ///
    /// `now` is elapsed time in seconds, `camera_heading` and
    /// `player_heading` come from [`super::heading_of`].
    pub fn step(
        &mut self,
        input: &FrameInput,
        now: f64,
        camera_heading: f32,
        player_heading: f32,
        config: &LocomotionConfig,
    ) -> LocomotionOutput {
        let mut out = LocomotionOutput::default();

        self.finish_jump(now, config, &mut out);

        out.angular_velocity_y =
            turn_rate(camera_heading, player_heading, config.turn_speed, config.dead_zone);

        if input.forward {
            if self.clip == AnimClip::Idle && self.can_jump {
                self.switch(AnimClip::Run, true, config, &mut out);
            }
            let (sin, cos) = camera_heading.sin_cos();
            out.planar_velocity = Some(Vec2::new(sin, cos) * config.run_speed);
        } else if self.clip == AnimClip::Run && self.can_jump {
            self.switch(AnimClip::Idle, true, config, &mut out);
        }

        if input.jump {
            out.jump_impulse = self.try_jump(now, config, &mut out);
        }

        out
    }

    /// Seconds until the current jump ends, if one is running.
    #[must_use]
    pub fn jump_remaining(&self, now: f64) -> Option<f64> {
        self.jump_ends_at.map(|t| (t - now).max(0.0))
    }

    fn finish_jump(&mut self, now: f64, config: &LocomotionConfig, out: &mut LocomotionOutput) {
        let Some(ends_at) = self.jump_ends_at else { return };
        if now < ends_at {
            return;
        }
        self.jump_ends_at = None;
        self.can_jump = true;
        // overrides whatever the player is doing when the jump ends
        self.switch(AnimClip::Idle, true, config, out);
    }

    fn try_jump(&mut self, now: f64, config: &LocomotionConfig, out: &mut LocomotionOutput) -> Option<f32> {
        if !self.can_jump {
            return None;
        }
        self.can_jump = false;
        self.jump_ends_at = Some(now + config.jump_duration.as_secs_f64());
        self.switch(AnimClip::JumpRunning, false, config, out);
        Some(config.jump_impulse)
    }

    fn switch(&mut self, clip: AnimClip, looping: bool, config: &LocomotionConfig, out: &mut LocomotionOutput) {
        self.clip = clip;
        out.play.push(ClipRequest { clip, blend: config.clip_blend, looping });
    }
}
