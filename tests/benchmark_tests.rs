//! Performance guards for the per-tick hot path

use server::config::GameRules;
use server::game::{Bullet, GameState};
use server::physics::{resolve_collisions, Aabb};
use shared::{decode_payload, encode_frame, FRAME_HEADER_LEN};
use std::time::Instant;

fn crowded_state(bullets: usize) -> GameState {
    let mut state = GameState::new(GameRules::default());
    for id in 0..5 {
        state.upsert_player(id, (200, 200, 200));
        let player = state.players.get_mut(&id).unwrap();
        player.x = 100.0 + id as f32 * 150.0;
        player.y = 300.0;
    }
    for i in 0..bullets {
        state.append_bullet(Bullet {
            x: (i % 800) as f32,
            y: (i % 600) as f32,
            dx: 0.0,
            dy: 0.0,
            owner_id: (i % 5) as u32,
        });
    }
    state
}

/// Benchmarks box overlap tests
#[test]
fn benchmark_aabb_overlap() {
    let player = Aabb::centered(100.0, 100.0, 20.0);
    let bullet = Aabb::centered(110.0, 105.0, 8.0);

    let iterations = 100_000;
    let start = Instant::now();

    for _ in 0..iterations {
        let _ = player.overlaps(&bullet);
    }

    let duration = start.elapsed();
    println!(
        "AABB overlap: {} iterations in {:?} ({:.2} ns/iter)",
        iterations,
        duration,
        duration.as_nanos() as f64 / iterations as f64
    );

    assert!(duration.as_millis() < 100);
}

/// Benchmarks hit resolution with a full arena and many bullets
#[test]
fn benchmark_collision_resolution() {
    let template = crowded_state(1_000);
    let iterations = 1_000;
    let start = Instant::now();

    for _ in 0..iterations {
        let mut players = template.players.clone();
        let _ = resolve_collisions(template.bullets.clone(), &mut players, &template.rules);
    }

    let duration = start.elapsed();
    println!(
        "Collision resolution: 1000 bullets x {} iterations in {:?} ({:.2} μs/iter)",
        iterations,
        duration,
        duration.as_micros() as f64 / iterations as f64
    );

    assert!(duration.as_millis() < 5000);
}

/// Benchmarks encoding and decoding a busy snapshot
#[test]
fn benchmark_snapshot_encoding() {
    let state = crowded_state(200);
    let packet = state.snapshot(Instant::now()).to_packet();

    let iterations = 10_000;
    let start = Instant::now();

    for _ in 0..iterations {
        let frame = encode_frame(&packet).unwrap();
        let _ = decode_payload(&frame[FRAME_HEADER_LEN..]).unwrap();
    }

    let duration = start.elapsed();
    println!(
        "Snapshot encoding: {} iterations in {:?} ({:.2} μs/iter)",
        iterations,
        duration,
        duration.as_micros() as f64 / iterations as f64
    );

    assert!(duration.as_millis() < 5000);
}

/// Stress test of many full ticks
#[test]
fn stress_test_many_ticks() {
    let mut state = crowded_state(0);
    let start = Instant::now();

    for tick in 0..10_000u32 {
        let shooter = tick % 5;
        state.apply_shoot(shooter, 1.0, 0.0);
        state.step(Instant::now());
    }

    let duration = start.elapsed();
    println!("10000 ticks in {:?}, {} bullets live", duration, state.bullets.len());

    assert!(state.bullets.len() < 10_000);
    assert!(duration.as_millis() < 5000);
}
