//! Respawn цели: куда вернуть цель после смерти
//!
//! Стартовая точка = позиция при спавне, checkpoint (общий ResetSentries)
//! переносит её туда, где цель стоит в момент сброса.

use bevy::prelude::*;

use crate::combat::health::Health;

/// Точка respawn цели
///
/// Без этого компонента смерть оставляет цель лежать с маркером `Dead`.
#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect)]
#[reflect(Component)]
pub struct RespawnPoint(pub Vec3);

impl RespawnPoint {
    /// Переносит цель на точку respawn с полным здоровьем
    pub fn respawn(&self, transform: &mut Transform, health: &mut Health) {
        transform.translation = self.0;
        health.restore();
    }
}
