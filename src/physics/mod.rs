//! Fixed-step kinematic physics for the player and the static world.
//!
//! Bodies are boxes integrated in `FixedUpdate`; the world is a set of
//! `StaticCollider` boxes (the ground, terrace meshes and sensor volumes).
//! Watched bodies report contacts as `CollisionEvent`s.
//!
//! ```ignore
//! app.add_plugins(PhysicsPlugin);
//! commands.spawn((SpatialBundle::default(), Body::new(size, offset, 1.0), CollisionWatch::default()));
//! ```
pub mod body;
pub mod collision;

use bevy::prelude::*;
use std::collections::HashSet;
use std::time::Duration;

pub use body::*;
pub use collision::*;

use crate::settings::Settings;

/// Immovable collision volume in world space.
#[derive(Component, Clone, Copy, Debug)]
pub struct StaticCollider {
    pub aabb: Aabb,
    /// Sensors report contacts but never block bodies.
    pub sensor: bool,
}

impl StaticCollider {
    #[must_use]
    pub fn solid(aabb: Aabb) -> Self {
        Self { aabb, sensor: false }
    }

    #[must_use]
    pub fn sensor(aabb: Aabb) -> Self {
        Self { aabb, sensor: true }
    }
}

#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum PhysicsSet {
    Integrate,
    Detect,
}

pub struct PhysicsPlugin;

impl Plugin for PhysicsPlugin {
    fn build(&self, app: &mut App) {
        let hz = app
            .world()
            .get_resource::<Settings>()
            .map_or_else(|| Settings::default().physics.fixed_hz, |s| s.physics.fixed_hz);
        app.insert_resource(Time::<Fixed>::from_hz(f64::from(hz.max(1))))
            .add_event::<CollisionEvent>()
            .configure_sets(FixedUpdate, (PhysicsSet::Integrate, PhysicsSet::Detect).chain())
            // must run before RunFixedMainLoop
            .add_systems(PreUpdate, sync_fixed_timestep)
            .add_systems(FixedUpdate, integrate_bodies.in_set(PhysicsSet::Integrate))
            .add_systems(FixedUpdate, detect_collisions.in_set(PhysicsSet::Detect));
    }
}

/// Keep the fixed rate and the sub-step cap in line with `Settings.physics`.
///
/// The virtual clock may advance at most `max_substeps` fixed steps per
/// frame, so a long frame never triggers an unbounded catch-up.
#[allow(clippy::needless_pass_by_value)]
pub fn sync_fixed_timestep(
    settings: Res<Settings>,
    mut fixed: ResMut<Time<Fixed>>,
    mut virt: ResMut<Time<Virtual>>,
    mut last: Local<Option<(u32, u32)>>,
) {
    let hz = settings.physics.fixed_hz.max(1);
    let substeps = settings.physics.max_substeps.max(1);
    if *last == Some((hz, substeps)) {
        return;
    }

    let step = Duration::from_secs_f64(1.0 / f64::from(hz));
    fixed.set_timestep(step);
    virt.set_max_delta(step * substeps);
    debug!("physics: {hz} Hz, up to {substeps} sub-steps per frame");
    *last = Some((hz, substeps));
}

/// Advance every `Body` by one fixed step.
#[allow(clippy::needless_pass_by_value)]
pub fn integrate_bodies(
    time: Res<Time>,
    settings: Res<Settings>,
    colliders: Query<&StaticCollider>,
    mut bodies: Query<(&mut Transform, &mut Body)>,
) {
    let solids: Vec<Aabb> = colliders
        .iter()
        .filter(|c| !c.sensor)
        .map(|c| c.aabb)
        .collect();

    let params = StepParams {
        gravity: settings.physics.gravity,
        friction: settings.physics.ground_friction,
        dt: time.delta_seconds(),
    };

    for (mut tf, mut body) in &mut bodies {
        tf.translation = step_body(tf.translation, &mut body, &solids, params);
        tf.rotation = step_rotation(tf.rotation, body.angular_velocity_y, params.dt);
    }
}

/// Compare each watched body against every collider and other body and
/// emit start/colliding/end events.
#[allow(clippy::needless_pass_by_value)]
pub fn detect_collisions(
    colliders: Query<(Entity, &StaticCollider)>,
    others: Query<(Entity, &Transform, &Body)>,
    mut watched: Query<(Entity, &Transform, &Body, &mut CollisionWatch)>,
    mut events: EventWriter<CollisionEvent>,
) {
    for (entity, tf, body, mut watch) in &mut watched {
        // grown slightly so resting contact counts as touching
        let mut bounds = body.aabb_at(tf.translation);
        bounds.min -= Vec3::splat(0.01);
        bounds.max += Vec3::splat(0.01);

        let mut touching: HashSet<Entity> = colliders
            .iter()
            .filter(|(_, c)| c.aabb.intersects(&bounds))
            .map(|(e, _)| e)
            .collect();
        touching.extend(
            others
                .iter()
                .filter(|(e, o_tf, o_body)| *e != entity && o_body.aabb_at(o_tf.translation).intersects(&bounds))
                .map(|(e, _, _)| e),
        );

        for (other, phase) in watch.update(touching) {
            events.send(CollisionEvent { entity, other, phase });
        }
    }
}
