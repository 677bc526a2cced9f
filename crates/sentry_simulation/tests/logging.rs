//! Логи симуляции через MemoryLogger
//!
//! Logger глобальный на процесс: все тесты файла делят один MemoryLogger.

use std::time::Duration;

use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use once_cell::sync::Lazy;
use sentry_simulation::logger::MemoryLogger;
use sentry_simulation::{
    create_headless_app, sentry_bundle, set_logger_if_needed, target_bundle, LogLevel, NavAgent, ResetSentries,
    Sentry, SentryConfig, SIMULATION_HZ,
};

static MEMORY: Lazy<MemoryLogger> = Lazy::new(|| {
    let memory = MemoryLogger::new();
    set_logger_if_needed(Box::new(memory.clone()));
    memory
});

fn create_test_app() -> App {
    // Logger до create_headless_app, иначе init_logger поставит ConsoleLogger
    Lazy::force(&MEMORY);

    let mut app = create_headless_app();
    app.insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_secs_f64(
        1.0 / SIMULATION_HZ,
    )));
    // Первый update только запускает часы (delta = 0), fixed step не идёт
    app.update();
    app
}

#[test]
fn test_state_change_is_logged() {
    let mut app = create_test_app();
    let waypoints = vec![Vec3::ZERO, Vec3::new(0.0, 0.0, 10.0)];
    app.world_mut()
        .spawn(sentry_bundle(Sentry::new(SentryConfig::default(), waypoints)));
    app.world_mut().spawn(target_bundle(Vec3::new(0.0, 0.0, -8.0)));

    app.update();

    let lines = MEMORY.lines();
    let change = lines
        .iter()
        .find(|(_, line)| line.contains("Sentry state changed: Patrol → Suspect"));
    assert!(change.is_some(), "log lines: {:?}", lines);

    let (level, line) = change.unwrap();
    assert_eq!(*level, LogLevel::Info);
    // "[timestamp] message"
    assert!(line.starts_with('['));
}

#[test]
fn test_reset_of_unknown_entity_warns() {
    let mut app = create_test_app();
    let not_a_sentry = app.world_mut().spawn(Transform::default()).id();

    app.world_mut().send_event(ResetSentries::one(not_a_sentry));
    app.update();

    let warned = MEMORY
        .lines()
        .iter()
        .any(|(level, line)| *level == LogLevel::Warning && line.contains("is not a sentry"));
    assert!(warned);
}

#[test]
fn test_navigator_not_ready_is_logged_once() {
    let mut app = create_test_app();
    let waypoints = vec![Vec3::ZERO, Vec3::new(0.0, 0.0, 10.0)];
    let not_ready = NavAgent {
        enabled: false,
        ..default()
    };
    app.world_mut()
        .spawn((sentry_bundle(Sentry::new(SentryConfig::default(), waypoints)), not_ready));

    for _ in 0..10 {
        app.update();
    }

    let waiting: Vec<_> = MEMORY
        .lines()
        .into_iter()
        .filter(|(_, line)| line.contains("navigator not ready"))
        .collect();
    assert_eq!(waiting.len(), 1, "log lines: {:?}", waiting);
    assert_eq!(waiting[0].0, LogLevel::Debug);
}
