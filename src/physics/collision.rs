//! Axis-aligned boxes and start/colliding/end contact tracking.

use bevy::prelude::*;
use std::collections::HashSet;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    #[must_use]
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min: min.min(max), max: min.max(max) }
    }

    #[must_use]
    pub fn from_center_half_extents(center: Vec3, half_extents: Vec3) -> Self {
        let h = half_extents.abs();
        Self { min: center - h, max: center + h }
    }

    /// Strict overlap test; boxes that only touch do not intersect.
    #[must_use]
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.y < other.max.y
            && self.max.y > other.min.y
            && self.min.z < other.max.z
            && self.max.z > other.min.z
    }

    #[must_use]
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    #[must_use]
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// Bounding box of this box after an affine transform.
    #[must_use]
    pub fn transformed(&self, affine: &bevy::math::Affine3A) -> Aabb {
        let corners = [
            Vec3::new(self.min.x, self.min.y, self.min.z),
            Vec3::new(self.max.x, self.min.y, self.min.z),
            Vec3::new(self.min.x, self.max.y, self.min.z),
            Vec3::new(self.max.x, self.max.y, self.min.z),
            Vec3::new(self.min.x, self.min.y, self.max.z),
            Vec3::new(self.max.x, self.min.y, self.max.z),
            Vec3::new(self.min.x, self.max.y, self.max.z),
            Vec3::new(self.max.x, self.max.y, self.max.z),
        ];
        let mut min = Vec3::splat(f32::INFINITY);
        let mut max = Vec3::splat(f32::NEG_INFINITY);
        for c in corners {
            let p = affine.transform_point3(c);
            min = min.min(p);
            max = max.max(p);
        }
        Aabb { min, max }
    }
}

/// Contact phase reported for a pair of colliding objects.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CollisionPhase {
    Start,
    Colliding,
    End,
}

impl std::fmt::Display for CollisionPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            CollisionPhase::Start => "start",
            CollisionPhase::Colliding => "collision",
            CollisionPhase::End => "end",
        })
    }
}

/// Contact between a watched body (`entity`) and something else.
#[derive(Event, Clone, Copy, Debug, PartialEq)]
pub struct CollisionEvent {
    pub entity: Entity,
    pub other: Entity,
    pub phase: CollisionPhase,
}

/// Marks a body whose contacts are reported as `CollisionEvent`s.
#[derive(Component, Default, Debug)]
pub struct CollisionWatch {
    touching: HashSet<Entity>,
}

impl CollisionWatch {
    /// Replace the current contact set with `now_touching` and return the
    /// phase of every contact, ended ones included.
    pub fn update(&mut self, now_touching: HashSet<Entity>) -> Vec<(Entity, CollisionPhase)> {
        let mut out: Vec<(Entity, CollisionPhase)> = now_touching
            .iter()
            .map(|&e| {
                let phase = if self.touching.contains(&e) {
                    CollisionPhase::Colliding
                } else {
                    CollisionPhase::Start
                };
                (e, phase)
            })
            .collect();
        out.extend(
            self.touching
                .difference(&now_touching)
                .map(|&e| (e, CollisionPhase::End)),
        );
        self.touching = now_touching;
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn touching_boxes_do_not_intersect() {
        let a = Aabb::new(Vec3::ZERO, Vec3::ONE);
        let b = Aabb::new(Vec3::new(1.0, 0.0, 0.0), Vec3::new(2.0, 1.0, 1.0));
        let c = Aabb::new(Vec3::splat(0.5), Vec3::splat(1.5));
        assert!(!a.intersects(&b));
        assert!(a.intersects(&c));
        assert!(c.intersects(&a));
    }

    #[test]
    fn new_orders_corners() {
        let a = Aabb::new(Vec3::ONE, Vec3::ZERO);
        assert_eq!(a.min, Vec3::ZERO);
        assert_eq!(a.size(), Vec3::ONE);
        assert_eq!(a.center(), Vec3::splat(0.5));
    }

    #[test]
    fn transformed_box_encloses_rotated_corners() {
        let a = Aabb::new(Vec3::new(-1.0, 0.0, -0.5), Vec3::new(1.0, 1.0, 0.5));
        let affine = bevy::math::Affine3A::from_scale_rotation_translation(
            Vec3::splat(2.0),
            Quat::from_rotation_y(std::f32::consts::FRAC_PI_2),
            Vec3::new(0.0, 1.0, 0.0),
        );
        let t = a.transformed(&affine);
        assert!((t.min - Vec3::new(-1.0, 1.0, -2.0)).abs().max_element() < 1e-5);
        assert!((t.max - Vec3::new(1.0, 3.0, 2.0)).abs().max_element() < 1e-5);
    }

    #[test]
    fn watch_reports_start_colliding_end() {
        let mut world = World::new();
        let bird = world.spawn_empty().id();
        let wall = world.spawn_empty().id();
        let mut watch = CollisionWatch::default();

        let first = watch.update(HashSet::from([bird]));
        assert_eq!(first, vec![(bird, CollisionPhase::Start)]);

        let mut second = watch.update(HashSet::from([bird, wall]));
        second.sort_by_key(|(e, _)| *e);
        let mut expected = vec![(bird, CollisionPhase::Colliding), (wall, CollisionPhase::Start)];
        expected.sort_by_key(|(e, _)| *e);
        assert_eq!(second, expected);

        let third = watch.update(HashSet::from([wall]));
        assert!(third.contains(&(bird, CollisionPhase::End)));
        assert!(third.contains(&(wall, CollisionPhase::Colliding)));

        let fourth = watch.update(HashSet::new());
        assert_eq!(fourth, vec![(wall, CollisionPhase::End)]);
    }

    #[test]
    fn phases_display_like_contact_events() {
        assert_eq!(CollisionPhase::Start.to_string(), "start");
        assert_eq!(CollisionPhase::Colliding.to_string(), "collision");
        assert_eq!(CollisionPhase::End.to_string(), "end");
    }
}
