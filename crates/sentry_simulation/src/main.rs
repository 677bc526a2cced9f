//! Headless симуляция sentry
//!
//! Один sentry патрулирует квадрат вокруг стены, цель идёт по скрипту:
//! проходит за стеной, выходит на виду, убегает бегом, потом checkpoint reset.
//!
//! Usage: sentry_simulation [config.json]

use std::process::ExitCode;
use std::time::Duration;

use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use sentry_simulation::{
    create_headless_app, log_error, log_info, spawn_sentry, spawn_target, Health, Obstacle, ObstacleField,
    ResetSentries, Sentry, SentryConfig, TargetMovementMode, SIMULATION_HZ,
};

const TICKS: u32 = 60 * 40;
const RESET_TICK: u32 = 60 * 30;

fn main() -> ExitCode {
    let mut app = create_headless_app();

    let config = match std::env::args().nth(1) {
        Some(path) => match SentryConfig::from_json_file(&path) {
            Ok(config) => {
                log_info(&format!("Loaded sentry config from {}", path));
                config
            }
            Err(error) => {
                log_error(&format!("Invalid sentry config {}: {}", path, error));
                return ExitCode::FAILURE;
            }
        },
        None => SentryConfig::default(),
    };

    // Каждый app.update() = ровно один fixed step
    app.insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_secs_f64(
        1.0 / SIMULATION_HZ,
    )));

    app.insert_resource(ObstacleField::new(vec![Obstacle::cuboid(
        Vec3::new(0.0, 1.0, -6.0),
        Vec3::new(3.0, 1.5, 0.25),
    )]));

    let waypoints = vec![
        Vec3::new(-8.0, 0.0, 0.0),
        Vec3::new(8.0, 0.0, 0.0),
        Vec3::new(8.0, 0.0, 6.0),
        Vec3::new(-8.0, 0.0, 6.0),
    ];

    let world = app.world_mut();
    let spawned = {
        let mut commands = world.commands();
        spawn_sentry(&mut commands, config, waypoints)
            .map(|sentry| (sentry, spawn_target(&mut commands, Vec3::new(0.0, 0.0, -12.0))))
    };
    world.flush();

    let (sentry, target) = match spawned {
        Ok(entities) => entities,
        Err(error) => {
            log_error(&format!("Invalid sentry config: {}", error));
            return ExitCode::FAILURE;
        }
    };

    log_info(&format!("Starting headless sentry simulation ({} ticks)", TICKS));

    for tick in 0..TICKS {
        script_target(&mut app, target, tick);

        if tick == RESET_TICK {
            log_info("🏁 Checkpoint reached, resetting sentries");
            app.world_mut().send_event(ResetSentries::all());
        }

        app.update();

        if tick % 300 == 0 {
            let world = app.world();
            if let (Some(sentry_state), Some(transform)) =
                (world.get::<Sentry>(sentry), world.get::<Transform>(sentry))
            {
                log_info(&format!(
                    "Tick {}: sentry {} at {:.1?}",
                    tick,
                    sentry_state.kind(),
                    transform.translation
                ));
            }
        }
    }

    if let Some(health) = app.world().get::<Health>(target) {
        log_info(&format!("Simulation complete! Target health: {}/{}", health.current, health.max));
    }

    ExitCode::SUCCESS
}

/// Скрипт цели: позиция и режим движения от номера tick
fn script_target(app: &mut App, target: Entity, tick: u32) {
    let t = tick as f32 / SIMULATION_HZ as f32;

    let (position, mode) = if t < 8.0 {
        // Крадётся за стеной
        (Vec3::new(-4.0 + t, 0.0, -12.0), TargetMovementMode::Sneaking)
    } else if t < 16.0 {
        // Вышел из-за стены, идёт к патрулю
        (Vec3::new(4.0, 0.0, -12.0 + (t - 8.0) * 1.2), TargetMovementMode::Normal)
    } else {
        // Убегает бегом
        (Vec3::new(4.0 + (t - 16.0) * 5.0, 0.0, -2.4), TargetMovementMode::Sprinting)
    };

    let mut entity = app.world_mut().entity_mut(target);
    if let Some(mut transform) = entity.get_mut::<Transform>() {
        transform.translation = position;
    }
    if let Some(mut current_mode) = entity.get_mut::<TargetMovementMode>() {
        *current_mode = mode;
    }
}
