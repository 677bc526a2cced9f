//! Внешние collaborators state machine: navigation, target, damage sink
//!
//! Sentry не ищет их сам, всё передаётся явно в `Surroundings` на каждый tick.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::ai::perception::OcclusionQuery;

/// Режим движения цели (модулирует immediate chase radius)
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Eq, Reflect, Serialize, Deserialize)]
#[reflect(Component)]
pub enum TargetMovementMode {
    #[default]
    Normal,
    /// Бег: шумно, радиус растёт, включается "слух"
    Sprinting,
    /// Крадётся: радиус сужается
    Sneaking,
}

/// Movement intent для navigator
///
/// `destination: None`: оставить текущую цель navigator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MovementIntent {
    pub destination: Option<Vec3>,
    pub speed: f32,
    pub stopped: bool,
}

impl MovementIntent {
    pub fn move_to(destination: Vec3, speed: f32) -> Self {
        Self {
            destination: Some(destination),
            speed,
            stopped: false,
        }
    }

    /// Продолжить движение к уже выставленной цели
    pub fn resume(speed: f32) -> Self {
        Self {
            destination: None,
            speed,
            stopped: false,
        }
    }

    pub fn halt() -> Self {
        Self {
            destination: None,
            speed: 0.0,
            stopped: true,
        }
    }
}

/// Navigation collaborator (pathfinding + locomotion снаружи)
pub trait Navigator {
    /// false: агент ещё не на navmesh / мир не готов
    fn is_ready(&self) -> bool;
    /// true пока путь считается: arrival проверки подавляются
    fn path_pending(&self) -> bool;
    fn remaining_distance(&self) -> f32;
    fn submit(&mut self, intent: MovementIntent);
    /// Сбросить текущий путь
    fn cancel(&mut self);
}

/// Получатель урона (цель)
pub trait DamageSink {
    fn apply_damage(&mut self, amount: u32);
}

/// Отслеживаемая цель: read-only позиция + damage sink
pub trait TrackedTarget: DamageSink {
    fn position(&self) -> Vec3;
}

/// Всё окружение sentry на один tick
pub struct Surroundings<'a> {
    pub navigator: &'a mut dyn Navigator,
    pub occlusion: &'a dyn OcclusionQuery,
    /// None: цель ещё не заспавнена / не найдена
    pub target: Option<&'a mut dyn TrackedTarget>,
}

impl<'a> Surroundings<'a> {
    pub fn target_position(&self) -> Option<Vec3> {
        self.target.as_deref().map(|target| target.position())
    }

    /// Отправить intent только если navigator готов (иначе no-op)
    pub fn steer(&mut self, intent: MovementIntent) {
        if self.navigator.is_ready() {
            self.navigator.submit(intent);
        }
    }

    /// Navigator готов и путь досчитан, агент в пределах `tolerance`
    pub fn arrived(&self, tolerance: f32) -> bool {
        self.navigator.is_ready()
            && !self.navigator.path_pending()
            && self.navigator.remaining_distance() < tolerance
    }

    pub fn strike(&mut self, amount: u32) -> bool {
        match self.target.as_deref_mut() {
            Some(target) => {
                target.apply_damage(amount);
                true
            }
            None => false,
        }
    }
}
