//! Atmosphere-related systems.
//! Keeps the sky renderer in line with the `Settings` resource.
use bevy::prelude::*;
use bevy_atmosphere::prelude::AtmosphereSettings as BevyAtmosphereSettings;
use terrace::settings::Settings;

/// Sync `Settings.atmosphere` resolution and dithering into the running
/// `BevyAtmosphereSettings`.
///
/// `enabled` is only read at startup, toggling it requires a restart.
#[allow(clippy::needless_pass_by_value)]
pub fn sync_atmosphere_settings(
    settings: Res<Settings>,
    mut last: Local<Option<(u32, bool)>>,
    mut atm_settings: ResMut<BevyAtmosphereSettings>,
) {
    let current = (settings.atmosphere.resolution, settings.atmosphere.dithering);
    if *last == Some(current) {
        return;
    }
    atm_settings.resolution = current.0;
    atm_settings.dithering = current.1;
    debug!("atmosphere: resolution {} dithering {}", current.0, current.1);
    *last = Some(current);
}
