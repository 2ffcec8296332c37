//! Display-related systems.
use bevy::prelude::*;
use bevy::window::{PresentMode, PrimaryWindow};
use terrace::settings::Settings;

/// Sync `Settings.graphics.vsync` into the present mode of the primary window,
/// so vsync can be toggled at runtime by editing the settings file.
#[allow(clippy::needless_pass_by_value)]
pub fn sync_vsync_settings(
    settings: Res<Settings>,
    mut windows: Query<&mut Window, With<PrimaryWindow>>,
    mut last: Local<Option<bool>>,
) {
    let desired = settings.graphics.vsync;
    if *last == Some(desired) {
        return;
    }
    for mut w in &mut windows {
        w.present_mode = if desired { PresentMode::Fifo } else { PresentMode::AutoNoVsync };
    }
    *last = Some(desired);
}
