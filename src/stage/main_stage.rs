//! Main stage: camera, terrace, player and bird, then controls and
//! collision wiring.
//!
//! The spawn systems run once on entering `GameStage::Main`, in the order
//! the stage plugin chains them. Scene meshes are only available a frame
//! later, so their material, shadow and collider treatment happens in
//! `prepare_scene_meshes` as they appear.

use bevy::pbr::{NotShadowCaster, NotShadowReceiver};
use bevy::prelude::*;
use bevy_atmosphere::prelude::AtmosphereCamera;
use std::time::Duration;

use super::{LoadedScenes, SetupError};
use crate::locomotion::AnimClip;
use crate::physics::{Aabb, Body, CollisionEvent, CollisionPhase, CollisionWatch, StaticCollider};
use crate::player::{Bird, ClipLibrary, PlayClip, Player, Terrace, ThirdPersonCamera};
use crate::settings::Settings;

/// Where the bird perches.
pub const BIRD_POSITION: Vec3 = Vec3::new(1.0, 1.0, 1.0);
const BIRD_SENSOR_SIZE: f32 = 0.25;
const PLAYER_SCALE: f32 = 2.0;
const PLAYER_YAW: f32 = std::f32::consts::PI + 0.1;

/// Mesh treatment for everything spawned under a scene root.
#[derive(Component, Clone, Copy, Debug)]
pub struct SceneModel {
    /// Meshes cast and receive shadows.
    pub shadows: bool,
    /// Meshes named like `mesh` become static colliders.
    pub colliders: bool,
}

/// Player/bird pair whose contacts are logged.
#[derive(Resource, Clone, Copy, Debug)]
pub struct CollisionLog {
    pub player: Entity,
    pub bird: Entity,
}

/// Spawn the follow camera. The rig is attached to the player later.
#[allow(clippy::needless_pass_by_value)]
pub fn create_camera(mut commands: Commands, settings: Res<Settings>) {
    let mut camera = commands.spawn((
        Camera3dBundle::default(),
        ThirdPersonCamera {
            theta: settings.camera.initial_theta_deg,
            radius: settings.camera.target_radius,
            offset: settings.camera.offset_vec(),
            ..default()
        },
        Name::new("camera"),
    ));
    if settings.atmosphere.enabled {
        camera.insert(AtmosphereCamera::default());
    }
}

#[allow(clippy::needless_pass_by_value)]
pub fn create_terrace(mut commands: Commands, scenes: Res<LoadedScenes>) {
    commands.spawn((
        SceneBundle { scene: scenes.terrace.scene.clone(), ..default() },
        SceneModel { shadows: false, colliders: true },
        Terrace,
        Name::new("terrace"),
    ));
}

#[allow(clippy::needless_pass_by_value)]
pub fn create_player(
    mut commands: Commands,
    scenes: Res<LoadedScenes>,
    settings: Res<Settings>,
    mut graphs: ResMut<Assets<AnimationGraph>>,
) {
    let physics = &settings.physics;
    let (w, h, d) = physics.player_size;
    let (ox, oy, oz) = physics.player_offset;

    let player = commands
        .spawn((
            SceneBundle {
                scene: scenes.player.scene.clone(),
                transform: Transform::from_rotation(Quat::from_rotation_y(PLAYER_YAW))
                    .with_scale(Vec3::splat(PLAYER_SCALE)),
                ..default()
            },
            Player::default(),
            Body::new(Vec3::new(w, h, d), Vec3::new(ox, oy, oz), physics.player_mass),
            CollisionWatch::default(),
            SceneModel { shadows: true, colliders: false },
            Name::new("player"),
        ))
        .id();

    let mut library = ClipLibrary::new(&scenes.player.clips, &mut graphs);
    library.pending = Some(idle_request(player));
    commands.entity(player).insert(library);
    info!("player spawned with {} clips", scenes.player.clips.len());
}

#[allow(clippy::needless_pass_by_value)]
pub fn create_bird(
    mut commands: Commands,
    scenes: Res<LoadedScenes>,
    mut graphs: ResMut<Assets<AnimationGraph>>,
) {
    let bird = commands
        .spawn((
            SceneBundle {
                scene: scenes.bird.scene.clone(),
                transform: Transform::from_translation(BIRD_POSITION),
                ..default()
            },
            StaticCollider::sensor(Aabb::from_center_half_extents(
                BIRD_POSITION,
                Vec3::splat(BIRD_SENSOR_SIZE * 0.5),
            )),
            SceneModel { shadows: true, colliders: false },
            Bird,
            Name::new("bird"),
        ))
        .id();

    let mut library = ClipLibrary::new(&scenes.bird.clips, &mut graphs);
    if library.has(AnimClip::Idle.name()) {
        library.pending = Some(idle_request(bird));
    }
    commands.entity(bird).insert(library);
}

fn idle_request(target: Entity) -> PlayClip {
    PlayClip {
        target,
        clip: AnimClip::Idle.name().to_string(),
        blend: Duration::ZERO,
        looping: true,
    }
}

/// Whether a mesh (or the node holding it) is meant to collide.
#[must_use]
pub fn is_collision_mesh(name: Option<&str>, parent_name: Option<&str>) -> bool {
    [name, parent_name]
        .into_iter()
        .flatten()
        .any(|n| n.to_lowercase().contains("mesh"))
}

/// Apply material, shadow and collider treatment to freshly spawned scene meshes.
#[allow(clippy::needless_pass_by_value, clippy::type_complexity)]
pub fn prepare_scene_meshes(
    mut commands: Commands,
    added: Query<
        (Entity, &Handle<Mesh>, &Handle<StandardMaterial>, &GlobalTransform),
        Added<Handle<Mesh>>,
    >,
    parents: Query<&Parent>,
    names: Query<&Name>,
    models: Query<&SceneModel>,
    meshes: Res<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    for (entity, mesh, material, global) in &added {
        let Some(model) = parents.iter_ancestors(entity).find_map(|e| models.get(e).ok()) else {
            continue;
        };

        if let Some(mat) = materials.get_mut(material) {
            mat.metallic = 0.0;
            mat.perceptual_roughness = 1.0;
        }
        if !model.shadows {
            commands.entity(entity).insert((NotShadowCaster, NotShadowReceiver));
        }
        if !model.colliders {
            continue;
        }

        let name = names.get(entity).ok().map(Name::as_str);
        let parent_name = parents
            .get(entity)
            .ok()
            .and_then(|p| names.get(p.get()).ok())
            .map(Name::as_str);
        if !is_collision_mesh(name, parent_name) {
            continue;
        }
        let Some(bounds) = meshes.get(mesh).and_then(Mesh::compute_aabb) else {
            warn!("mesh {entity:?} has no positions, skipping collider");
            continue;
        };
        let local = Aabb::from_center_half_extents(bounds.center.into(), bounds.half_extents.into());
        let world = local.transformed(&global.affine());
        debug!("collider {:?} {:?}..{:?}", name.unwrap_or("?"), world.min, world.max);
        commands.entity(entity).insert(StaticCollider::solid(world));
    }
}

/// Attach the camera rig to the player.
///
/// # Errors
/// `KeyboardMissing` without keyboard input, `PlayerMissing` without a player.
#[allow(clippy::needless_pass_by_value)]
pub fn wire_controls(
    keyboard: Option<Res<ButtonInput<KeyCode>>>,
    settings: Res<Settings>,
    players: Query<Entity, With<Player>>,
    mut cameras: Query<&mut ThirdPersonCamera>,
) -> Result<(), SetupError> {
    if keyboard.is_none() {
        return Err(SetupError::KeyboardMissing);
    }
    let player = players.get_single().map_err(|_| SetupError::PlayerMissing)?;
    for mut rig in &mut cameras {
        rig.target = Some(player);
        rig.offset = settings.camera.offset_vec();
        rig.radius = settings.camera.target_radius;
        rig.theta = settings.camera.initial_theta_deg;
    }
    Ok(())
}

/// Register the player/bird pair for contact logging.
///
/// # Errors
/// `PlayerMissing` or `BirdMissing` when either is absent.
#[allow(clippy::needless_pass_by_value)]
pub fn wire_collisions(
    mut commands: Commands,
    players: Query<Entity, (With<Player>, With<CollisionWatch>)>,
    birds: Query<Entity, With<Bird>>,
) -> Result<(), SetupError> {
    let player = players.get_single().map_err(|_| SetupError::PlayerMissing)?;
    let bird = birds.get_single().map_err(|_| SetupError::BirdMissing)?;
    commands.insert_resource(CollisionLog { player, bird });
    Ok(())
}

/// Log line for a player contact, or `None` for ground contacts.
#[must_use]
pub fn collision_message(is_bird: bool, other_name: Option<&str>, phase: CollisionPhase) -> Option<String> {
    if is_bird {
        return Some(format!("player and bird: {phase}"));
    }
    let name = other_name.unwrap_or("unnamed");
    if name == "ground" {
        return None;
    }
    Some(format!("player and {name}: {phase}"))
}

#[allow(clippy::needless_pass_by_value)]
pub fn log_player_collisions(
    mut events: EventReader<CollisionEvent>,
    log: Option<Res<CollisionLog>>,
    names: Query<&Name>,
) {
    let Some(log) = log else {
        events.clear();
        return;
    };
    for ev in events.read().filter(|ev| ev.entity == log.player) {
        let name = names.get(ev.other).ok().map(Name::as_str);
        let Some(msg) = collision_message(ev.other == log.bird, name, ev.phase) else { continue };
        match ev.phase {
            CollisionPhase::Colliding => trace!("{msg}"),
            CollisionPhase::Start | CollisionPhase::End => info!("{msg}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::ecs::system::RunSystemOnce;

    #[test]
    fn collider_names_match_case_insensitively() {
        assert!(is_collision_mesh(Some("Stairs_Mesh.0"), None));
        assert!(is_collision_mesh(None, Some("MESH_wall")));
        assert!(!is_collision_mesh(Some("railing"), Some("Plant")));
        assert!(!is_collision_mesh(None, None));
    }

    #[test]
    fn collision_messages() {
        assert_eq!(
            collision_message(true, Some("bird"), CollisionPhase::Start).as_deref(),
            Some("player and bird: start")
        );
        assert_eq!(
            collision_message(false, Some("wall_mesh"), CollisionPhase::Colliding).as_deref(),
            Some("player and wall_mesh: collision")
        );
        assert_eq!(collision_message(false, Some("ground"), CollisionPhase::End), None);
        assert_eq!(
            collision_message(false, Some("Background_mesh"), CollisionPhase::Start).as_deref(),
            Some("player and Background_mesh: start")
        );
        assert_eq!(
            collision_message(false, Some("playground_mesh"), CollisionPhase::End).as_deref(),
            Some("player and playground_mesh: end")
        );
    }

    #[test]
    fn controls_need_keyboard_and_player() {
        let mut world = World::new();
        world.init_resource::<Settings>();
        assert_eq!(world.run_system_once(wire_controls), Err(SetupError::KeyboardMissing));

        world.init_resource::<ButtonInput<KeyCode>>();
        assert_eq!(world.run_system_once(wire_controls), Err(SetupError::PlayerMissing));

        let player = world.spawn(Player::default()).id();
        let camera = world.spawn(ThirdPersonCamera { theta: 10.0, ..default() }).id();
        assert_eq!(world.run_system_once(wire_controls), Ok(()));

        let rig = world.get::<ThirdPersonCamera>(camera).unwrap();
        assert_eq!(rig.target, Some(player));
        assert_eq!(rig.theta, 90.0);
        assert_eq!(rig.radius, 3.0);
        assert_eq!(rig.offset, Vec3::Y);
    }

    #[test]
    fn collisions_need_player_and_bird() {
        let mut world = World::new();
        assert_eq!(world.run_system_once(wire_collisions), Err(SetupError::PlayerMissing));

        let player = world.spawn((Player::default(), CollisionWatch::default())).id();
        assert_eq!(world.run_system_once(wire_collisions), Err(SetupError::BirdMissing));

        let bird = world.spawn(Bird).id();
        assert_eq!(world.run_system_once(wire_collisions), Ok(()));
        let log = world.resource::<CollisionLog>();
        assert_eq!((log.player, log.bird), (player, bird));
    }
}
