//! Player components and systems (input, camera, movement, animation).
//!
//! The module provides the `Player` component, the `Bird` and `Terrace`
//! markers and the `PlayerPlugin` that wires the per-frame player systems.
//!
//! # Example:
//!
//! ```ignore
//! app.add_plugins(PlayerPlugin);
//! commands.spawn((
//!     SceneBundle { scene, ..default() },
//!     Player::default(),
//!     Body::new(size, offset, 1.0),
//! ));
//! ```
pub mod animation;
pub mod camera;
pub mod input;
pub mod movement;

use bevy::prelude::*;

pub use animation::*;
pub use camera::*;
pub use input::*;
pub use movement::*;

use crate::locomotion::Locomotion;
use crate::stage::GameStage;

/// The controllable character.
#[derive(Component, Debug, Default)]
pub struct Player {
    pub locomotion: Locomotion,
}

/// The bird sharing the scene with the player.
#[derive(Component)]
pub struct Bird;

#[derive(Component)]
pub struct Terrace;

/// Ordering of the per-frame player systems.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum PlayerSet {
    Input,
    Drive,
    Animate,
}

pub struct PlayerPlugin;

impl Plugin for PlayerPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<PlayClip>()
            .init_resource::<PlayerIntent>()
            .init_resource::<InputDevice>()
            .configure_sets(
                Update,
                (PlayerSet::Input, PlayerSet::Drive, PlayerSet::Animate)
                    .chain()
                    .run_if(in_state(GameStage::Main)),
            )
            .add_systems(Startup, spawn_touch_widgets)
            .add_systems(Update, (gather_input, cursor_grab, sync_touch_widgets).in_set(PlayerSet::Input))
            .add_systems(Update, (follow_player, drive_player, toggle_projection).chain().in_set(PlayerSet::Drive))
            .add_systems(
                Update,
                (link_animation_players, play_clips).chain().in_set(PlayerSet::Animate),
            );
    }
}
