//! Preload stage: request the three glTF files and hand their scenes on.
//!
//! `begin_preload` runs when the stage is entered; `poll_preload` checks the
//! load state every frame and, once everything is in, inserts `LoadedScenes`
//! and switches to `GameStage::Main`.

use bevy::asset::LoadState;
use bevy::gltf::Gltf;
use bevy::prelude::*;

use super::{GameStage, SetupError};
use crate::settings::Settings;

/// Handles of the glTF files being loaded.
#[derive(Resource, Debug, Clone)]
pub struct SceneAssets {
    pub terrace: Handle<Gltf>,
    pub player: Handle<Gltf>,
    pub bird: Handle<Gltf>,
}

impl SceneAssets {
    fn named(&self) -> [(&'static str, &Handle<Gltf>); 3] {
        [("terrace", &self.terrace), ("player", &self.player), ("bird", &self.bird)]
    }
}

/// Root scene of one glTF file plus its named animation clips.
#[derive(Debug, Clone)]
pub struct LoadedScene {
    pub scene: Handle<Scene>,
    /// Clips sorted by name.
    pub clips: Vec<(String, Handle<AnimationClip>)>,
}

/// The three scene graphs the main stage is built from.
#[derive(Resource, Debug, Clone)]
pub struct LoadedScenes {
    pub terrace: LoadedScene,
    pub player: LoadedScene,
    pub bird: LoadedScene,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AssetStatus {
    Pending,
    Ready,
    Failed,
}

/// Fold per-asset status into "all ready?" or the first failure.
///
/// # Errors
/// `SetupError::AssetLoadFailed` naming the first asset that failed.
pub fn preload_ready(statuses: &[(&'static str, AssetStatus)]) -> Result<bool, SetupError> {
    if let Some((asset, _)) = statuses.iter().find(|(_, s)| *s == AssetStatus::Failed) {
        return Err(SetupError::AssetLoadFailed { asset: *asset });
    }
    Ok(statuses.iter().all(|(_, s)| *s == AssetStatus::Ready))
}

/// Take the first scene of a loaded file and its named clips.
///
/// # Errors
/// `SetupError::SceneMissing` when the file has no scenes.
pub fn loaded_scene(
    asset: &'static str,
    scenes: &[Handle<Scene>],
    clips: impl IntoIterator<Item = (String, Handle<AnimationClip>)>,
) -> Result<LoadedScene, SetupError> {
    let scene = scenes.first().cloned().ok_or(SetupError::SceneMissing { asset })?;
    let mut clips: Vec<_> = clips.into_iter().filter(|(name, _)| !name.is_empty()).collect();
    clips.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(LoadedScene { scene, clips })
}

/// Request the terrace, player and bird files.
#[allow(clippy::needless_pass_by_value)]
pub fn begin_preload(mut commands: Commands, asset_server: Res<AssetServer>, settings: Res<Settings>) {
    let paths = &settings.assets;
    info!("preloading {}, {}, {}", paths.terrace, paths.player, paths.bird);
    commands.insert_resource(SceneAssets {
        terrace: asset_server.load(paths.terrace.clone()),
        player: asset_server.load(paths.player.clone()),
        bird: asset_server.load(paths.bird.clone()),
    });
}

fn status_of(asset_server: &AssetServer, handle: &Handle<Gltf>) -> AssetStatus {
    if asset_server.is_loaded_with_dependencies(handle.id()) {
        AssetStatus::Ready
    } else if matches!(asset_server.load_state(handle.id()), LoadState::Failed(..)) {
        AssetStatus::Failed
    } else {
        AssetStatus::Pending
    }
}

/// Wait for the files, then hand their scenes to the main stage.
///
/// # Errors
/// Fails when a file cannot be loaded or has no scene.
#[allow(clippy::needless_pass_by_value)]
pub fn poll_preload(
    mut commands: Commands,
    asset_server: Res<AssetServer>,
    assets: Res<SceneAssets>,
    gltfs: Res<Assets<Gltf>>,
    mut next: ResMut<NextState<GameStage>>,
) -> Result<(), SetupError> {
    let statuses = assets.named().map(|(name, h)| (name, status_of(&asset_server, h)));
    if !preload_ready(&statuses)? {
        return Ok(());
    }

    let extract = |asset: &'static str, handle: &Handle<Gltf>| {
        let gltf = gltfs.get(handle).ok_or(SetupError::AssetLoadFailed { asset })?;
        loaded_scene(
            asset,
            &gltf.scenes,
            gltf.named_animations.iter().map(|(name, clip)| (name.to_string(), clip.clone())),
        )
    };

    let loaded = LoadedScenes {
        terrace: extract("terrace", &assets.terrace)?,
        player: extract("player", &assets.player)?,
        bird: extract("bird", &assets.bird)?,
    };
    info!(
        "assets ready: player clips [{}]",
        loaded.player.clips.iter().map(|(n, _)| n.as_str()).collect::<Vec<_>>().join(", ")
    );

    commands.insert_resource(loaded);
    next.set(GameStage::Main);
    Ok(())
}

/// Marks the loading text (and the UI camera showing it) while assets stream in.
#[derive(Component)]
pub struct PreloadText;

pub fn spawn_preload_text(mut commands: Commands) {
    commands.spawn((Camera2dBundle::default(), PreloadText));
    commands.spawn((
        TextBundle::from_section(
            "Loading...",
            TextStyle { font_size: 28.0, color: Color::WHITE, ..default() },
        )
        .with_style(Style {
            position_type: PositionType::Absolute,
            left: Val::Px(24.0),
            bottom: Val::Px(24.0),
            ..default()
        }),
        PreloadText,
    ));
}

pub fn despawn_preload_text(mut commands: Commands, q: Query<Entity, With<PreloadText>>) {
    for e in &q {
        commands.entity(e).despawn_recursive();
    }
}
