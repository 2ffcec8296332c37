//! Kinematic body integration: gravity, impulses, drive and ground contact.
//!
//! The step is axis-separated: horizontal motion is resolved per axis against
//! solid colliders first, then vertical motion lands on (or bumps into) them.

use bevy::prelude::*;

use super::Aabb;

/// Fastest downward speed a body can reach.
pub const TERMINAL_VELOCITY: f32 = -50.0;
/// Obstacles whose top is at most this far above the feet are stepped over.
pub const STEP_HEIGHT: f32 = 0.3;

/// Dynamic box body moved by the fixed-step integrator.
#[derive(Component, Clone, Debug)]
pub struct Body {
    /// Linear velocity in world units per second.
    pub velocity: Vec3,
    /// Angular velocity about +Y in radians per second.
    pub angular_velocity_y: f32,
    /// Horizontal velocity imposed this frame; `None` lets friction act.
    pub drive: Option<Vec2>,
    pub mass: f32,
    /// Half size of the collision box.
    pub half_extents: Vec3,
    /// Box center relative to the entity translation.
    pub offset: Vec3,
    /// Resting on a collider after the last step.
    pub grounded: bool,
}

impl Body {
    #[must_use]
    pub fn new(size: Vec3, offset: Vec3, mass: f32) -> Self {
        Self {
            velocity: Vec3::ZERO,
            angular_velocity_y: 0.0,
            drive: None,
            mass: mass.max(f32::EPSILON),
            half_extents: size * 0.5,
            offset,
            grounded: false,
        }
    }

    /// World-space box for a body at `translation`.
    #[must_use]
    pub fn aabb_at(&self, translation: Vec3) -> Aabb {
        Aabb::from_center_half_extents(translation + self.offset, self.half_extents)
    }

    /// Add an instantaneous impulse (`velocity += impulse / mass`).
    pub fn apply_impulse(&mut self, impulse: Vec3) {
        self.velocity += impulse / self.mass;
    }
}

/// World parameters for a single integration step.
#[derive(Clone, Copy, Debug)]
pub struct StepParams {
    pub gravity: f32,
    pub friction: f32,
    pub dt: f32,
}

/// Integrate `body` for one fixed step starting at `translation`.
///
/// `solids` are the non-sensor colliders the body can stand on or be
/// blocked by. Returns the new translation.
#[must_use]
pub fn step_body(translation: Vec3, body: &mut Body, solids: &[Aabb], params: StepParams) -> Vec3 {
    let dt = params.dt;

    body.velocity.y = (body.velocity.y + params.gravity * dt).max(TERMINAL_VELOCITY);

    match body.drive {
        Some(drive) => {
            body.velocity.x = drive.x;
            body.velocity.z = drive.y;
        }
        None if body.grounded => {
            let keep = (1.0 - params.friction * dt).max(0.0);
            body.velocity.x *= keep;
            body.velocity.z *= keep;
        }
        None => {}
    }

    let mut pos = translation;

    // horizontal, one axis at a time
    for axis in [Vec3::X, Vec3::Z] {
        let delta = axis * body.velocity.dot(axis) * dt;
        if delta == Vec3::ZERO {
            continue;
        }
        let moved = body.aabb_at(pos + delta);
        let feet = moved.min.y;
        let blocked = solids
            .iter()
            .any(|s| s.intersects(&moved) && s.max.y - feet > STEP_HEIGHT);
        if blocked {
            body.velocity -= axis * body.velocity.dot(axis);
        } else {
            pos += delta;
        }
    }

    // vertical
    let dy = body.velocity.y * dt;
    let moved = body.aabb_at(pos + Vec3::Y * dy);
    body.grounded = false;
    let hits = solids.iter().filter(|s| s.intersects(&moved));
    if body.velocity.y <= 0.0 {
        let top = hits.map(|s| s.max.y).fold(f32::NEG_INFINITY, f32::max);
        if top.is_finite() {
            // feet rest on the highest surface under the box
            let feet_offset = body.offset.y - body.half_extents.y;
            pos.y = top - feet_offset;
            body.velocity.y = 0.0;
            body.grounded = true;
        } else {
            pos.y += dy;
        }
    } else {
        let ceiling = hits.map(|s| s.min.y).fold(f32::INFINITY, f32::min);
        if ceiling.is_finite() {
            let head_offset = body.offset.y + body.half_extents.y;
            pos.y = ceiling - head_offset;
            body.velocity.y = 0.0;
        } else {
            pos.y += dy;
        }
    }

    pos
}

/// Rotate `rotation` by `angular_velocity_y * dt` about world Y.
#[must_use]
pub fn step_rotation(rotation: Quat, angular_velocity_y: f32, dt: f32) -> Quat {
    if angular_velocity_y == 0.0 {
        return rotation;
    }
    (Quat::from_rotation_y(angular_velocity_y * dt) * rotation).normalize()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ground() -> Aabb {
        Aabb::new(Vec3::new(-50.0, -1.0, -50.0), Vec3::new(50.0, 0.0, 50.0))
    }

    fn params() -> StepParams {
        StepParams { gravity: -9.81, friction: 10.0, dt: 1.0 / 120.0 }
    }

    fn player() -> Body {
        Body::new(Vec3::new(0.5, 1.0, 0.4), Vec3::new(0.0, 0.5, 0.0), 1.0)
    }

    #[test]
    fn falls_and_lands_on_ground() {
        let mut body = player();
        let mut pos = Vec3::new(0.0, 2.0, 0.0);
        for _ in 0..240 {
            pos = step_body(pos, &mut body, &[ground()], params());
        }
        assert!(body.grounded);
        assert!(pos.y.abs() < 1e-4, "feet should rest at y=0, got {}", pos.y);
        assert_eq!(body.velocity.y, 0.0);
    }

    #[test]
    fn impulse_lifts_then_gravity_returns() {
        let mut body = player();
        let mut pos = Vec3::ZERO;
        pos = step_body(pos, &mut body, &[ground()], params());
        assert!(body.grounded);

        body.apply_impulse(Vec3::Y * 6.0);
        pos = step_body(pos, &mut body, &[ground()], params());
        assert!(pos.y > 0.0);
        assert!(!body.grounded);

        let mut peak = pos.y;
        for _ in 0..240 {
            pos = step_body(pos, &mut body, &[ground()], params());
            peak = peak.max(pos.y);
        }
        assert!(peak > 1.5 && peak < 2.0, "peak {peak}");
        assert!(body.grounded);
    }

    #[test]
    fn heavier_body_gets_less_velocity_from_impulse() {
        let mut light = player();
        let mut heavy = Body::new(Vec3::ONE, Vec3::ZERO, 3.0);
        light.apply_impulse(Vec3::Y * 6.0);
        heavy.apply_impulse(Vec3::Y * 6.0);
        assert_eq!(light.velocity.y, 6.0);
        assert_eq!(heavy.velocity.y, 2.0);
    }

    #[test]
    fn drive_moves_and_friction_stops() {
        let mut body = player();
        let mut pos = Vec3::ZERO;
        body.drive = Some(Vec2::new(4.0, 0.0));
        for _ in 0..120 {
            pos = step_body(pos, &mut body, &[ground()], params());
        }
        assert!((pos.x - 4.0).abs() < 0.05, "moved {}", pos.x);

        body.drive = None;
        for _ in 0..240 {
            pos = step_body(pos, &mut body, &[ground()], params());
        }
        assert!(body.velocity.x.abs() < 1e-3);
    }

    #[test]
    fn wall_blocks_but_low_step_does_not() {
        let wall = Aabb::new(Vec3::new(1.0, 0.0, -5.0), Vec3::new(2.0, 3.0, 5.0));
        let step = Aabb::new(Vec3::new(-10.0, 0.0, -5.0), Vec3::new(-1.0, 0.2, 5.0));
        let solids = [ground(), wall, step];

        let mut body = player();
        let mut pos = Vec3::ZERO;
        body.drive = Some(Vec2::new(4.0, 0.0));
        for _ in 0..120 {
            pos = step_body(pos, &mut body, &solids, params());
        }
        assert!(pos.x < 1.0 - 0.2, "wall should stop the box, x = {}", pos.x);

        body.drive = Some(Vec2::new(-4.0, 0.0));
        for _ in 0..120 {
            pos = step_body(pos, &mut body, &solids, params());
        }
        assert!(pos.x < -1.2, "step should be climbed, x = {}", pos.x);
        assert!((pos.y - 0.2).abs() < 0.05);
    }

    #[test]
    fn rotation_integrates_about_y() {
        let r = step_rotation(Quat::IDENTITY, 4.0, 0.25);
        let dir = r * Vec3::Z;
        assert!((dir.x.atan2(dir.z) - 1.0).abs() < 1e-5);
        assert_eq!(step_rotation(r, 0.0, 1.0), r);
    }
}
