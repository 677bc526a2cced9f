//! Здоровье цели: получатель ударов sentry

use bevy::prelude::*;

use crate::ai::collaborators::DamageSink;

/// Здоровье
///
/// Инвариант: 0 ≤ current ≤ max
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Reflect)]
#[reflect(Component)]
pub struct Health {
    pub current: u32,
    pub max: u32,
}

impl Default for Health {
    fn default() -> Self {
        Self::new(100) // Default 100 HP
    }
}

impl Health {
    pub fn new(max: u32) -> Self {
        Self { current: max, max }
    }

    pub fn is_alive(&self) -> bool {
        self.current > 0
    }

    pub fn take_damage(&mut self, amount: u32) {
        self.current = self.current.saturating_sub(amount);
    }

    /// Полное восстановление (respawn на checkpoint)
    pub fn restore(&mut self) {
        self.current = self.max;
    }
}

impl DamageSink for Health {
    fn apply_damage(&mut self, amount: u32) {
        self.take_damage(amount);
    }
}
