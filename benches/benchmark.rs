use bevy::math::{Vec2, Vec3};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

use terrace::locomotion::{turn_rate, FrameInput, Locomotion, LocomotionConfig};
use terrace::physics::{step_body, Aabb, Body, StepParams};
use terrace::player::ThirdPersonCamera;
use terrace::settings::ControlsSettings;

/// Deterministic LCG in `[-1, 1)`, so every run sees the same inputs.
fn lcg(state: &mut u32) -> f32 {
    *state = state.wrapping_mul(1664525).wrapping_add(1013904223);
    (((*state >> 16) & 0x7fff) as f32 / 32767.0) * 2.0 - 1.0
}

/// Heading pairs spread over the full circle, including the wrap-around branch
fn bench_turn_rate(c: &mut Criterion) {
    let dead_zone = std::f32::consts::PI / 24.0;
    c.bench_function("turn_rate", |b| {
        b.iter(|| {
            let mut state: u32 = 0x12345678;
            let mut acc = 0.0;
            for _ in 0..1_000usize {
                let cam = lcg(&mut state) * std::f32::consts::PI;
                let player = lcg(&mut state) * std::f32::consts::PI;
                acc += turn_rate(black_box(cam), black_box(player), 4.0, dead_zone);
            }
            black_box(acc);
        })
    });
}

/// One minute of 60 Hz frames with forward held and a jump every second
fn bench_locomotion_step(c: &mut Criterion) {
    let config = LocomotionConfig::default();
    c.bench_function("locomotion_step_minute", |b| {
        b.iter(|| {
            let mut loco = Locomotion::default();
            let mut clips = 0usize;
            for frame in 0..3_600u32 {
                let now = f64::from(frame) / 60.0;
                let input = FrameInput { forward: frame % 200 < 150, jump: frame % 60 == 0, ..Default::default() };
                let out = loco.step(black_box(&input), now, 0.3, -0.2, &config);
                clips += out.play.len();
            }
            black_box(clips);
        })
    });
}

/// A body running across a small field of boxes at 120 Hz
fn bench_step_body(c: &mut Criterion) {
    let mut solids = vec![Aabb::new(Vec3::new(-50.0, -1.0, -50.0), Vec3::new(50.0, 0.0, 50.0))];
    for i in 0..32 {
        let x = (i % 8) as f32 * 3.0 - 12.0;
        let z = (i / 8) as f32 * 3.0 - 6.0;
        solids.push(Aabb::new(Vec3::new(x, 0.0, z), Vec3::new(x + 1.0, 0.2 + (i % 3) as f32 * 0.4, z + 1.0)));
    }
    let params = StepParams { gravity: -9.81, friction: 10.0, dt: 1.0 / 120.0 };

    c.bench_function("step_body_1200", |b| {
        b.iter(|| {
            let mut body = Body::new(Vec3::new(0.5, 1.0, 0.4), Vec3::new(0.0, 0.5, 0.0), 1.0);
            let mut pos = Vec3::new(-14.0, 0.0, -7.0);
            for i in 0..1_200u32 {
                body.drive = Some(Vec2::new(4.0, 2.0));
                if i % 240 == 0 {
                    body.apply_impulse(Vec3::Y * 6.0);
                }
                pos = step_body(pos, &mut body, black_box(&solids), params);
            }
            black_box(pos);
        })
    });
}

/// Randomized camera deltas to approximate pointer input
fn bench_camera_orbit(c: &mut Criterion) {
    let controls = ControlsSettings::default();
    c.bench_function("camera_orbit_random", |b| {
        b.iter(|| {
            let mut rig = ThirdPersonCamera::default();
            let mut state: u32 = 0x9e3779b9;
            let mut eye = Vec3::ZERO;
            for _ in 0..1_000usize {
                let d = Vec2::new(lcg(&mut state), lcg(&mut state)) * 100.0;
                rig.apply_delta(black_box(d), &controls);
                eye += rig.eye(Vec3::ZERO);
            }
            black_box((rig.theta, rig.phi, eye));
        })
    });
}

criterion_group!(benches, bench_turn_rate, bench_locomotion_step, bench_step_body, bench_camera_orbit);
criterion_main!(benches);
