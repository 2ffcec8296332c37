use bevy::diagnostic::{FrameTimeDiagnosticsPlugin, LogDiagnosticsPlugin};
use bevy::log::LogPlugin;
use bevy::prelude::*;
use bevy::window::{PresentMode, Window, WindowPlugin};
use bevy_atmosphere::prelude::*;
use terrace::debug::DebugDumpPlugin;
use terrace::physics::PhysicsPlugin;
use terrace::player::PlayerPlugin;
use terrace::settings::loader as settings_loader;
use terrace::stage::StagePlugin;
use terrace::ui::DebugUiPlugin;

mod app;
use app::{sync_atmosphere_settings, sync_vsync_settings};

fn main() {
    let settings = settings_loader::load_settings_from_dir(settings_loader::SETTINGS_DIR);
    let settings_watcher = settings_loader::setup_settings_watcher(settings_loader::SETTINGS_DIR)
        .unwrap_or_else(|_| settings_loader::SettingsWatcher::stub());

    let mut app = App::new();

    app.add_plugins(
        DefaultPlugins
            .set(WindowPlugin {
                primary_window: Some(Window {
                    title: "terrace".into(),
                    position: WindowPosition::Centered(MonitorSelection::Primary),
                    present_mode: if settings.graphics.vsync {
                        PresentMode::Fifo
                    } else {
                        PresentMode::AutoNoVsync
                    },
                    fit_canvas_to_parent: true,
                    ..default()
                }),
                ..default()
            })
            .set(LogPlugin {
                filter: "wgpu=error,naga=warn,terrace=debug".into(),
                ..default()
            }),
    )
    .add_plugins(FrameTimeDiagnosticsPlugin)
    .add_plugins(LogDiagnosticsPlugin::default())
    .add_plugins((StagePlugin, PhysicsPlugin, PlayerPlugin, DebugUiPlugin, DebugDumpPlugin));

    if settings.atmosphere.enabled {
        app.add_plugins(AtmospherePlugin)
            .insert_resource(AtmosphereModel::default())
            .insert_resource(AtmosphereSettings {
                resolution: settings.atmosphere.resolution,
                dithering: settings.atmosphere.dithering,
                ..Default::default()
            });
        app.add_systems(Update, sync_atmosphere_settings);
    }

    app.insert_resource(settings.clone());
    app.insert_resource(settings_watcher);

    app.add_systems(Update, settings_loader::check_settings_changes);
    app.add_systems(Update, sync_vsync_settings);

    app.run();
}
