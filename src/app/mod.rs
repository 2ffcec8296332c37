pub mod atmosphere;
pub mod display;

pub use atmosphere::sync_atmosphere_settings;
pub use display::sync_vsync_settings;
