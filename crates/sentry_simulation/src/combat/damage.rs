//! Применение ударов sentry к Health цели
//!
//! State machine только сообщает "ударил на N" (SentryStrike), само здоровье
//! меняется здесь, после того как все sentries отработали tick.

use bevy::prelude::*;

use crate::ai::events::SentryStrike;
use crate::combat::health::Health;
use crate::combat::respawn::RespawnPoint;

/// Событие: урон нанесен
///
/// Используется для UI, звуков, эффектов.
#[derive(Event, Debug, Clone, PartialEq, Eq)]
pub struct DamageDealt {
    pub attacker: Entity,
    pub target: Entity,
    pub damage: u32,
    pub target_died: bool,
}

/// Событие: цель погибла (health дошёл до 0)
#[derive(Event, Debug, Clone, PartialEq, Eq)]
pub struct EntityDied {
    pub entity: Entity,
    pub killer: Option<Entity>,
}

/// Компонент-маркер: entity мертв (Health = 0)
///
/// Деспавн не автоматический: что делать с мёртвой целью решает игра.
#[derive(Component, Debug)]
pub struct Dead;

/// Система: SentryStrike → Health
///
/// 1. Читаем SentryStrike события (мёртвую цель больше не бьём)
/// 2. Применяем damage к Health
/// 3. Генерируем DamageDealt и EntityDied события
/// 4. Смерть: respawn на RespawnPoint с полным здоровьем, иначе маркер Dead
pub fn apply_sentry_strikes(
    mut commands: Commands,
    mut strikes: EventReader<SentryStrike>,
    mut damage_dealt_events: EventWriter<DamageDealt>,
    mut entity_died_events: EventWriter<EntityDied>,
    mut targets: Query<(&mut Health, &mut Transform, Option<&RespawnPoint>)>,
) {
    for strike in strikes.read() {
        let Ok((mut health, mut transform, respawn_point)) = targets.get_mut(strike.target) else {
            crate::log_warning(&format!("SentryStrike: target {:?} has no Health component", strike.target));
            continue;
        };

        if !health.is_alive() {
            continue;
        }

        health.take_damage(strike.damage);
        let target_died = !health.is_alive();

        crate::log(&format!(
            "💥 {:?} → {:?}: {} damage (health: {}/{})",
            strike.sentry, strike.target, strike.damage, health.current, health.max
        ));

        damage_dealt_events.write(DamageDealt {
            attacker: strike.sentry,
            target: strike.target,
            damage: strike.damage,
            target_died,
        });

        if !target_died {
            continue;
        }

        entity_died_events.write(EntityDied {
            entity: strike.target,
            killer: Some(strike.sentry),
        });
        crate::log_info(&format!("💀 Target {:?} killed by {:?}", strike.target, strike.sentry));

        match respawn_point {
            Some(point) => {
                point.respawn(&mut transform, &mut health);
                crate::log_info(&format!("Target {:?} respawned at {:?}", strike.target, point.0));
            }
            None => {
                commands.entity(strike.target).insert(Dead);
            }
        }
    }
}

/// Система: общий сброс (checkpoint) возвращает цели здоровье
///
/// Точка respawn переезжает на текущую позицию цели.
pub fn restore_targets_on_reset(
    mut commands: Commands,
    mut resets: EventReader<crate::ai::events::ResetSentries>,
    mut targets: Query<(Entity, &mut Health, &Transform, Option<&mut RespawnPoint>), With<crate::ai::SentryTarget>>,
) {
    // Сброс одного sentry цель не трогает
    let full_reset = resets.read().any(|reset| reset.sentry.is_none());
    if !full_reset {
        return;
    }

    for (entity, mut health, transform, respawn_point) in targets.iter_mut() {
        health.restore();
        commands.entity(entity).remove::<Dead>();

        if let Some(mut point) = respawn_point {
            point.0 = transform.translation;
            crate::log(&format!("Respawn point set to {:?}", point.0));
        }
    }
}
