//! Sentry Simulation Core
//!
//! ECS-симуляция на Bevy 0.16: sentry агенты патрулируют маршрут, замечают цель
//! (distance → FOV → line-of-sight), проверяют подозрения и преследуют/атакуют.
//!
//! - `ai`: perception + Patrol/Suspect/Chase state machine, ECS glue
//! - `navigation`: headless navigator (по прямой)
//! - `occlusion`: Rapier raycast / аналитические препятствия
//! - `combat`: Health цели и применение ударов

use bevy::prelude::*;

// Публичные модули
pub mod ai;
pub mod combat;
pub mod config;
pub mod geometry;
pub mod logger;
pub mod navigation;
pub mod occlusion;

// Re-export базовых типов для удобства
pub use ai::{
    sentry_bundle, spawn_sentry, spawn_target, target_bundle, ResetSentries, Sentry, SentryPlugin,
    SentryState, SentryStateChanged, SentryStateKind, SentryStrike, SentryTarget, TargetMovementMode,
};
pub use combat::{DamageDealt, Dead, EntityDied, Health, RespawnPoint};
pub use config::{ConfigError, SentryConfig, VisionConfig};
pub use geometry::Pose;
pub use logger::{init_logger, log, log_error, log_info, log_warning, set_log_level, set_logger, set_logger_if_needed, LogLevel, LogPrinter};
pub use navigation::NavAgent;
pub use occlusion::{Obstacle, ObstacleField};

/// Частота simulation tick (FixedUpdate)
pub const SIMULATION_HZ: f64 = 60.0;

/// Главный plugin симуляции (fixed clock + sentry AI)
pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        app
            // Fixed timestep 60Hz для simulation tick (легче считать интервалы)
            .insert_resource(Time::<Fixed>::from_hz(SIMULATION_HZ))
            .add_plugins(SentryPlugin);
    }
}

/// Создаёт minimal Bevy App для headless симуляции
pub fn create_headless_app() -> App {
    let mut app = App::new();
    init_logger();
    app.add_plugins((MinimalPlugins, SimulationPlugin));

    app
}

/// Snapshot мира для сравнения детерминизма
pub fn world_snapshot<T: Component>(world: &mut World) -> Vec<u8>
where
    T: std::fmt::Debug,
{
    let mut snapshot = Vec::new();

    let mut query = world.query::<(Entity, &T)>();
    let mut entities: Vec<_> = query.iter(world).collect();

    // Сортируем по Entity ID для детерминизма
    entities.sort_by_key(|(entity, _)| entity.index());

    // Сериализуем в байты через Debug (простейший способ)
    for (entity, component) in entities {
        snapshot.extend_from_slice(&entity.index().to_le_bytes());
        snapshot.extend_from_slice(format!("{:?}", component).as_bytes());
    }

    snapshot
}
