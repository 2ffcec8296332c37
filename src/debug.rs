//! Debug dump (F3 default): writes diagnostics, entity and asset counts,
//! memory use and the player's locomotion state to a timestamped text file
//! in `./debug-dumps/`.
//!
//! Handy for capturing what the controller was doing at a given moment
//! without attaching a debugger.
use bevy::diagnostic::{Diagnostic, DiagnosticPath, DiagnosticsStore, FrameTimeDiagnosticsPlugin};
use bevy::pbr::StandardMaterial;
use bevy::prelude::*;
use bevy::render::mesh::Mesh;
use chrono::{DateTime, Utc};
use std::fmt::Write;
use std::fs;
use std::time::{SystemTime, UNIX_EPOCH};
use sysinfo::{Pid, ProcessExt, System, SystemExt};

use crate::physics::Body;
use crate::player::{InputDevice, Player};
use crate::settings::Settings;

pub const DUMP_DIR: &str = "debug-dumps";

pub struct DebugDumpPlugin;

impl Plugin for DebugDumpPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Update, debug_input_system);
    }
}

fn kb_to_mb(kb: u64) -> String {
    format!("{:.2} MB", (kb as f64) / 1024.0)
}

/// Player state captured for the dump.
#[derive(Clone, Debug, PartialEq)]
pub struct PlayerDump {
    pub translation: Vec3,
    pub velocity: Vec3,
    pub grounded: bool,
    pub clip: String,
    pub can_jump: bool,
    /// Seconds left in the running jump.
    pub jump_remaining: Option<f64>,
}

/// Everything written to one dump file.
#[derive(Clone, Debug, Default)]
pub struct DumpReport {
    pub epoch_secs: u64,
    pub human_ts: String,
    pub fps: f64,
    pub frame_time: f64,
    pub entities: usize,
    pub meshes: usize,
    pub materials: usize,
    pub animation_graphs: usize,
    pub process_mem_kb: u64,
    pub total_mem_kb: u64,
    pub used_mem_kb: u64,
    pub touch: bool,
    pub player: Option<PlayerDump>,
}

impl DumpReport {
    #[must_use]
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        writeln!(out, "Debug dump: {}", self.epoch_secs).ok();
        writeln!(out, "Timestamp: {} (epoch secs: {})", self.human_ts, self.epoch_secs).ok();
        writeln!(out, "FPS: {:.1}, frame_time: {:.4} ms", self.fps, self.frame_time * 1000.0).ok();
        writeln!(out, "Entities: {}", self.entities).ok();
        writeln!(
            out,
            "Assets: meshes={} materials={} animation_graphs={}",
            self.meshes, self.materials, self.animation_graphs
        )
        .ok();
        writeln!(out, "Process memory: {}", kb_to_mb(self.process_mem_kb)).ok();
        writeln!(
            out,
            "System memory: total={} used={}",
            kb_to_mb(self.total_mem_kb),
            kb_to_mb(self.used_mem_kb)
        )
        .ok();
        writeln!(out, "Input: {}", if self.touch { "touch" } else { "keyboard/pointer" }).ok();

        match &self.player {
            Some(p) => {
                writeln!(out, "\nPlayer:").ok();
                let t = p.translation;
                writeln!(out, "  position: ({:.3}, {:.3}, {:.3})", t.x, t.y, t.z).ok();
                let v = p.velocity;
                writeln!(out, "  velocity: ({:.3}, {:.3}, {:.3})", v.x, v.y, v.z).ok();
                writeln!(out, "  grounded: {}", p.grounded).ok();
                writeln!(out, "  clip: {}", p.clip).ok();
                writeln!(out, "  can_jump: {}", p.can_jump).ok();
                if let Some(r) = p.jump_remaining {
                    writeln!(out, "  jump ends in: {r:.3} s").ok();
                }
            }
            None => {
                writeln!(out, "\nPlayer: (not spawned)").ok();
            }
        }
        out
    }
}

/// Write a dump when the mapped debug key (F3 default) is pressed.
#[allow(clippy::needless_pass_by_value, clippy::too_many_arguments)]
fn debug_input_system(
    keys: Res<ButtonInput<KeyCode>>,
    settings: Res<Settings>,
    time: Res<Time>,
    diagnostics: Res<DiagnosticsStore>,
    query_entities: Query<Entity>,
    players: Query<(&Transform, &Player, &Body)>,
    device: Option<Res<InputDevice>>,
    meshes: Res<Assets<Mesh>>,
    materials: Res<Assets<StandardMaterial>>,
    graphs: Res<Assets<AnimationGraph>>,
) {
    if !keys.just_pressed(settings.controls.key("dump_debug", KeyCode::F3)) {
        return;
    }

    let now = SystemTime::now();
    let epoch_secs = now.duration_since(UNIX_EPOCH).map(|d| d.as_secs()).unwrap_or_default();
    let dt: DateTime<Utc> = DateTime::from(now);

    let smoothed = |path: &DiagnosticPath| diagnostics.get(path).and_then(Diagnostic::smoothed).unwrap_or(0.0);

    let mut sys = System::new_all();
    sys.refresh_all();
    let pid = std::process::id();
    let process_mem_kb = sys.process(Pid::from(pid as usize)).map_or(0, |p| p.memory());

    let elapsed = time.elapsed_seconds_f64();
    let player = players.get_single().ok().map(|(tf, player, body)| PlayerDump {
        translation: tf.translation,
        velocity: body.velocity,
        grounded: body.grounded,
        clip: player.locomotion.clip.to_string(),
        can_jump: player.locomotion.can_jump,
        jump_remaining: player.locomotion.jump_remaining(elapsed),
    });

    let report = DumpReport {
        epoch_secs,
        human_ts: dt.format("%Y-%m-%d %H:%M:%S").to_string(),
        fps: smoothed(&FrameTimeDiagnosticsPlugin::FPS),
        frame_time: smoothed(&FrameTimeDiagnosticsPlugin::FRAME_TIME),
        entities: query_entities.iter().count(),
        meshes: meshes.len(),
        materials: materials.len(),
        animation_graphs: graphs.len(),
        process_mem_kb,
        total_mem_kb: sys.total_memory(),
        used_mem_kb: sys.used_memory(),
        touch: device.is_some_and(|d| d.touch),
        player,
    };

    let fname = format!("{DUMP_DIR}/debug-{epoch_secs}.txt");
    if let Err(e) = fs::create_dir_all(DUMP_DIR) {
        error!("debug dump: failed to create dir '{}': {}", DUMP_DIR, e);
        return;
    }
    if let Err(e) = fs::write(&fname, report.to_text()) {
        error!("debug dump: failed to write {}: {}", fname, e);
    } else {
        info!("wrote debug dump: {}", fname);
    }
}
