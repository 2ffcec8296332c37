pub mod debug;
pub mod locomotion;
pub mod physics;
pub mod player;
pub mod ron;
pub use crate::ron as ron_loader;
pub mod settings;
pub mod stage;
pub mod ui;
