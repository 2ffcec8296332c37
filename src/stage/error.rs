//! Fatal setup errors and their reporter.
//!
//! These are configuration assertions: when one fires the game logs it and
//! exits instead of limping on with a half-built scene.

use bevy::prelude::*;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SetupError {
    /// World setup finished without its lights.
    LightsMissing,
    PlayerMissing,
    BirdMissing,
    /// No keyboard input resource to bind controls to.
    KeyboardMissing,
    /// A glTF file loaded but contains no scene.
    SceneMissing { asset: &'static str },
    AssetLoadFailed { asset: &'static str },
}

impl fmt::Display for SetupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SetupError::LightsMissing => write!(f, "lights not loaded"),
            SetupError::PlayerMissing => write!(f, "player not created"),
            SetupError::BirdMissing => write!(f, "bird not created"),
            SetupError::KeyboardMissing => write!(f, "keyboard input not available"),
            SetupError::SceneMissing { asset } => write!(f, "'{asset}' has no scene"),
            SetupError::AssetLoadFailed { asset } => write!(f, "failed to load '{asset}'"),
        }
    }
}

impl std::error::Error for SetupError {}

/// Pipe target for fallible setup systems: log the error and exit.
pub fn report_setup_error(In(result): In<Result<(), SetupError>>, mut exit: EventWriter<AppExit>) {
    if let Err(e) = result {
        error!("setup failed: {e}");
        exit.send(AppExit::error());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::ecs::system::RunSystemOnce;

    #[test]
    fn messages_name_the_missing_piece() {
        assert_eq!(SetupError::LightsMissing.to_string(), "lights not loaded");
        assert_eq!(SetupError::BirdMissing.to_string(), "bird not created");
        assert_eq!(
            SetupError::SceneMissing { asset: "terrace" }.to_string(),
            "'terrace' has no scene"
        );
    }

    #[test]
    fn reporter_exits_only_on_error() {
        let mut world = World::new();
        world.init_resource::<Events<AppExit>>();

        world.run_system_once_with(Ok(()), report_setup_error);
        assert!(world.resource::<Events<AppExit>>().is_empty());

        world.run_system_once_with(Err(SetupError::PlayerMissing), report_setup_error);
        let events = world.resource::<Events<AppExit>>();
        let mut reader = events.get_reader();
        let sent: Vec<&AppExit> = reader.read(events).collect();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].is_error());
    }
}
