//! Game stages: asset preloading, then the playable main scene.
//!
//! `StagePlugin` owns the `GameStage` state machine. Setup systems that can
//! fail return `Result<(), SetupError>` and are piped into
//! `report_setup_error`, which ends the app on the first error.
//!
//! # Example:
//!
//! ```ignore
//! app.add_plugins(StagePlugin);
//! // later, anywhere
//! app.add_systems(Update, my_system.run_if(in_state(GameStage::Main)));
//! ```
pub mod error;
pub mod main_stage;
pub mod preload;
pub mod world;

use bevy::prelude::*;

pub use error::*;
pub use main_stage::*;
pub use preload::*;
pub use world::*;

#[derive(States, Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum GameStage {
    #[default]
    Preload,
    Main,
}

pub struct StagePlugin;

impl Plugin for StagePlugin {
    fn build(&self, app: &mut App) {
        app.init_state::<GameStage>()
            .add_systems(OnEnter(GameStage::Preload), (begin_preload, spawn_preload_text))
            .add_systems(
                Update,
                poll_preload
                    .pipe(report_setup_error)
                    .run_if(in_state(GameStage::Preload)),
            )
            .add_systems(OnExit(GameStage::Preload), despawn_preload_text)
            .add_systems(
                OnEnter(GameStage::Main),
                (
                    create_world,
                    verify_lights.pipe(report_setup_error),
                    create_camera,
                    create_terrace,
                    create_player,
                    create_bird,
                    wire_controls.pipe(report_setup_error),
                    wire_collisions.pipe(report_setup_error),
                    |stage: Res<State<GameStage>>| info!("stage {:?} ready", stage.get()),
                )
                    .chain(),
            )
            .add_systems(
                Update,
                (prepare_scene_meshes, log_player_collisions, apply_light_settings)
                    .run_if(in_state(GameStage::Main)),
            );
    }
}
