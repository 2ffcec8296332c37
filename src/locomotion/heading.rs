//! Heading math used to turn the player toward the camera.

use bevy::math::Vec3;
use std::f32::consts::PI;

/// Heading angle (radians, `-PI..=PI`) of a direction's horizontal part.
///
/// Measured from +Z toward +X, so a rotation of `a` about +Y maps +Z to
/// heading `a`.
#[inline]
#[must_use]
pub fn heading_of(dir: Vec3) -> f32 {
    dir.x.atan2(dir.z)
}

/// Signed angular velocity about Y that turns `player` toward `camera`.
///
/// Returns 0 inside the dead zone. The sign flips once when the raw
/// difference exceeds `PI - dead_zone` (the short way round crosses the
/// `-PI/PI` seam) and once more when the camera heading is the smaller one.
#[must_use]
pub fn turn_rate(camera: f32, player: f32, speed: f32, dead_zone: f32) -> f32 {
    let l = (camera - player).abs();
    if l <= dead_zone {
        return 0.0;
    }

    let mut rate = speed;
    if l > PI - dead_zone {
        rate = -rate;
    }
    if camera < player {
        rate = -rate;
    }
    rate
}

#[cfg(test)]
mod tests {
    use super::*;

    const D: f32 = PI / 24.0;

    #[test]
    fn heading_follows_rotation_about_y() {
        let a = 0.7_f32;
        let dir = bevy::math::Quat::from_rotation_y(a) * Vec3::Z;
        assert!((heading_of(dir) - a).abs() < 1e-5);
        assert!((heading_of(Vec3::X) - PI / 2.0).abs() < 1e-6);
        // vertical component is ignored
        assert!((heading_of(Vec3::new(0.0, 5.0, 1.0))).abs() < 1e-6);
    }

    #[test]
    fn no_turn_inside_dead_zone() {
        assert_eq!(turn_rate(0.1, 0.1 + D * 0.5, 4.0, D), 0.0);
        assert_eq!(turn_rate(1.0, 1.0, 4.0, D), 0.0);
    }

    #[test]
    fn turns_toward_camera_on_short_arc() {
        // camera ahead of player: positive rate increases the player heading
        assert_eq!(turn_rate(1.0, 0.0, 4.0, D), 4.0);
        // camera behind player
        assert_eq!(turn_rate(0.0, 1.0, 4.0, D), -4.0);
    }

    #[test]
    fn wraps_around_past_half_turn() {
        // camera at 0, player at PI: l = PI > PI - D, camera < player
        assert_eq!(turn_rate(0.0, PI, 4.0, D), 4.0);
        // camera near +PI, player near -PI: the short way crosses the seam
        let cam = PI - 0.1;
        let player = -PI + 0.1;
        assert_eq!(turn_rate(cam, player, 2.0, D), -2.0);
    }

    #[test]
    fn sign_flips_exactly_above_pi_minus_dead_zone() {
        let below = PI - D - 0.01;
        let above = PI - D + 0.01;
        assert_eq!(turn_rate(below, 0.0, 4.0, D), 4.0);
        assert_eq!(turn_rate(above, 0.0, 4.0, D), -4.0);
    }
}
