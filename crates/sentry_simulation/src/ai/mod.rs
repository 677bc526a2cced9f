//! Sentry AI: perception + Patrol/Suspect/Chase state machine
//!
//! Чистая логика (perception, brain) не знает про ECS: всё окружение приходит
//! через collaborators. ECS glue: в `systems`.

use bevy::prelude::*;

pub mod brain;
pub mod collaborators;
pub mod events;
pub mod perception;
pub mod route;
pub mod state;
pub mod systems;


// Re-export основных типов
pub use brain::{DetectionRanges, Sentry};
pub use collaborators::{DamageSink, MovementIntent, Navigator, Surroundings, TargetMovementMode, TrackedTarget};
pub use events::{ResetSentries, SentryStateChanged, SentryStrike};
pub use perception::{OcclusionQuery, OpenSight, Perception};
pub use route::PatrolRoute;
pub use state::{ScanState, SearchPhase, SentryState, SentryStateKind, StateTransition};

use crate::combat::{apply_sentry_strikes, restore_targets_on_reset, DamageDealt, EntityDied, Health, RespawnPoint};
use crate::config::{ConfigError, SentryConfig};
use crate::navigation::{step_nav_agents, NavAgent};

/// Маркер цели, за которой следят sentries (игрок)
///
/// Автоматически добавляет Transform, TargetMovementMode, Health через Required Components.
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
#[require(Transform, TargetMovementMode, Health)]
pub struct SentryTarget;

/// Sentry AI Plugin
///
/// Регистрирует системы в FixedUpdate для детерминизма.
/// Порядок выполнения:
/// 1. handle_reset_requests: ResetSentries → Patrol на первом waypoint
/// 2. restore_targets_on_reset: общий сброс возвращает цели здоровье
/// 3. tick_sentries: perception + state machine → movement intents
/// 4. step_nav_agents: движение к destination
/// 5. apply_sentry_strikes: SentryStrike → Health (смерть → respawn)
pub struct SentryPlugin;

impl Plugin for SentryPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<ResetSentries>()
            .add_event::<SentryStateChanged>()
            .add_event::<SentryStrike>()
            .add_event::<DamageDealt>()
            .add_event::<EntityDied>();

        app.register_type::<Sentry>()
            .register_type::<SentryTarget>()
            .register_type::<TargetMovementMode>()
            .register_type::<NavAgent>()
            .register_type::<Health>()
            .register_type::<RespawnPoint>()
            .register_type::<crate::occlusion::ObstacleField>();

        app.add_systems(
            FixedUpdate,
            (
                systems::handle_reset_requests,
                restore_targets_on_reset,
                systems::tick_sentries,
                step_nav_agents,
                apply_sentry_strikes,
            )
                .chain(), // Последовательное выполнение для детерминизма
        );
    }
}

/// Компоненты sentry: стоит на первом waypoint, смотрит в -Z
pub fn sentry_bundle(sentry: Sentry) -> impl Bundle {
    let start = sentry.route().first().unwrap_or(Vec3::ZERO);
    (Transform::from_translation(start), sentry)
}

/// Компоненты цели: respawn на точке спавна, пока checkpoint её не сдвинет
pub fn target_bundle(position: Vec3) -> impl Bundle {
    (SentryTarget, Transform::from_translation(position), RespawnPoint(position))
}

/// Spawn helper: валидирует config и создаёт sentry entity
pub fn spawn_sentry(
    commands: &mut Commands,
    config: SentryConfig,
    waypoints: Vec<Vec3>,
) -> Result<Entity, ConfigError> {
    let sentry = Sentry::try_new(config, waypoints)?;
    let entity = commands.spawn(sentry_bundle(sentry)).id();

    crate::log_info(&format!("🛡️ Spawned sentry {:?}", entity));
    Ok(entity)
}

/// Spawn helper для цели
pub fn spawn_target(commands: &mut Commands, position: Vec3) -> Entity {
    commands.spawn(target_bundle(position)).id()
}
