//! Player movement: runs the locomotion controller once per frame.
//!
//! Reads the accumulated `PlayerIntent`, derives the camera and player
//! headings and hands the controller's output to the physics body and the
//! animation system.

use bevy::prelude::*;

use super::{InputDevice, PlayClip, Player, PlayerIntent, ThirdPersonCamera};
use crate::locomotion::heading_of;
use crate::physics::Body;
use crate::settings::Settings;

/// Drive the player from this frame's intent.
///
/// # Arguments
/// * `intent` - accumulated input, reset here after use
/// * `device` - picks the desktop or touch turn speed
/// * `cameras` - the follow camera whose heading the player turns toward
/// * `players` - player state and physics body to drive
#[allow(clippy::needless_pass_by_value)]
pub fn drive_player(
    time: Res<Time>,
    settings: Res<Settings>,
    device: Res<InputDevice>,
    mut intent: ResMut<PlayerIntent>,
    cameras: Query<&Transform, (With<ThirdPersonCamera>, Without<Player>)>,
    mut players: Query<(Entity, &Transform, &mut Player, &mut Body)>,
    mut clips: EventWriter<PlayClip>,
) {
    let input = intent.0.take();
    let Ok(camera) = cameras.get_single() else { return };
    let config = settings.locomotion.config(device.touch);
    let camera_heading = heading_of(*camera.forward());
    let now = time.elapsed_seconds_f64();

    for (entity, tf, mut player, mut body) in &mut players {
        // the model faces local +Z
        let player_heading = heading_of(*tf.back());
        let out = player.locomotion.step(&input, now, camera_heading, player_heading, &config);

        body.angular_velocity_y = out.angular_velocity_y;
        body.drive = out.planar_velocity;
        if let Some(impulse) = out.jump_impulse {
            body.apply_impulse(Vec3::Y * impulse);
        }
        for req in out.play {
            debug!("player: {}", req.clip);
            clips.send(PlayClip {
                target: entity,
                clip: req.clip.name().to_string(),
                blend: req.blend,
                looping: req.looping,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locomotion::{AnimClip, FrameInput};
    use bevy::ecs::system::RunSystemOnce;

    fn world_with_player() -> (World, Entity) {
        let mut world = World::new();
        world.init_resource::<Time>();
        world.init_resource::<Settings>();
        world.init_resource::<InputDevice>();
        world.init_resource::<PlayerIntent>();
        world.init_resource::<Events<PlayClip>>();

        // camera looking along -Z
        world.spawn((Transform::from_xyz(0.0, 1.0, 3.0), ThirdPersonCamera::default()));
        let player = world
            .spawn((
                Transform::from_rotation(Quat::from_rotation_y(std::f32::consts::PI)),
                Player::default(),
                Body::new(Vec3::new(0.5, 1.0, 0.4), Vec3::new(0.0, 0.5, 0.0), 1.0),
            ))
            .id();
        (world, player)
    }

    fn sent_clips(world: &World) -> Vec<String> {
        let events = world.resource::<Events<PlayClip>>();
        events.get_reader().read(events).map(|e| e.clip.clone()).collect()
    }

    #[test]
    fn forward_drives_body_along_camera_heading() {
        let (mut world, player) = world_with_player();
        world.resource_mut::<PlayerIntent>().0 = FrameInput { forward: true, ..Default::default() };
        world.run_system_once(drive_player);

        let body = world.get::<Body>(player).unwrap();
        let drive = body.drive.unwrap();
        assert!(drive.x.abs() < 1e-5);
        assert!((drive.y + 4.0).abs() < 1e-5, "runs toward -Z, got {drive:?}");
        assert_eq!(body.angular_velocity_y, 0.0, "already facing the camera heading");

        assert_eq!(world.get::<Player>(player).unwrap().locomotion.clip, AnimClip::Run);
        assert_eq!(sent_clips(&world), vec!["run".to_string()]);
        assert_eq!(world.resource::<PlayerIntent>().0, FrameInput::default());
    }

    #[test]
    fn jump_applies_impulse_once() {
        let (mut world, player) = world_with_player();
        world.resource_mut::<PlayerIntent>().0 = FrameInput { jump: true, ..Default::default() };
        world.run_system_once(drive_player);
        let vy = world.get::<Body>(player).unwrap().velocity.y;
        assert!((vy - 6.0).abs() < 1e-5);

        // still cooling down: a second jump is ignored
        world.resource_mut::<PlayerIntent>().0 = FrameInput { jump: true, ..Default::default() };
        world.run_system_once(drive_player);
        assert!((world.get::<Body>(player).unwrap().velocity.y - vy).abs() < 1e-5);
        assert_eq!(sent_clips(&world), vec!["jump_running".to_string()]);
    }

    #[test]
    fn no_camera_means_no_drive() {
        let mut world = World::new();
        world.init_resource::<Time>();
        world.init_resource::<Settings>();
        world.init_resource::<InputDevice>();
        world.init_resource::<PlayerIntent>();
        world.init_resource::<Events<PlayClip>>();
        let player = world
            .spawn((Transform::IDENTITY, Player::default(), Body::new(Vec3::ONE, Vec3::ZERO, 1.0)))
            .id();
        world.resource_mut::<PlayerIntent>().0 = FrameInput { forward: true, ..Default::default() };
        world.run_system_once(drive_player);
        assert!(world.get::<Body>(player).unwrap().drive.is_none());
    }
}
