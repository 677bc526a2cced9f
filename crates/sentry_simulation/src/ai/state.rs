//! Sentry FSM состояния
//!
//! Каждый variant несёт только свои таймеры/флаги: чужие таймеры при смене
//! состояния физически пропадают, на входе всё инициализируется заново.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::geometry::yaw_offset;

/// Вид состояния без данных (логирование, события, сравнения)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect, Serialize, Deserialize)]
pub enum SentryStateKind {
    Patrol,
    Suspect,
    Chase,
}

impl SentryStateKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SentryStateKind::Patrol => "Patrol",
            SentryStateKind::Suspect => "Suspect",
            SentryStateKind::Chase => "Chase",
        }
    }

    /// Emoji для логов
    pub fn tag(&self) -> &'static str {
        match self {
            SentryStateKind::Patrol => "🚶",
            SentryStateKind::Suspect => "🔍",
            SentryStateKind::Chase => "⚔️",
        }
    }
}

impl fmt::Display for SentryStateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Смена состояния за tick (net: откуда → куда)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateTransition {
    pub from: SentryStateKind,
    pub to: SentryStateKind,
}

/// Осмотр на месте (Suspect после прихода в last known position)
#[derive(Debug, Clone, Copy, PartialEq, Reflect)]
pub struct ScanState {
    pub investigate_timer: f32,
    /// Таймер смены left/right
    pub look_timer: f32,
    pub looking_left: bool,
    pub look_left: Quat,
    pub look_right: Quat,
}

impl ScanState {
    /// Начать осмотр: ±half_angle от текущего heading, сначала влево
    pub fn begin(heading: Quat, half_angle_degrees: f32) -> Self {
        Self {
            investigate_timer: 0.0,
            look_timer: 0.0,
            looking_left: true,
            look_left: yaw_offset(heading, half_angle_degrees),
            look_right: yaw_offset(heading, -half_angle_degrees),
        }
    }

    pub fn look_target(&self) -> Quat {
        if self.looking_left {
            self.look_left
        } else {
            self.look_right
        }
    }
}

/// Фаза Suspect: идём к точке или уже осматриваемся
#[derive(Debug, Clone, Copy, PartialEq, Reflect)]
pub enum SearchPhase {
    Approach,
    Scan(ScanState),
}

#[derive(Debug, Clone, PartialEq, Reflect)]
pub enum SentryState {
    /// Обход waypoints
    Patrol {
        /// Сколько уже стоим на текущем waypoint
        wait_timer: f32,
    },

    /// Что-то заметили: идём проверить
    Suspect {
        last_known_target: Vec3,
        /// Сколько секунд подряд цель видна (consecutive, не суммарно)
        spot_timer: f32,
        search: SearchPhase,
    },

    /// Преследование + атака
    Chase {
        last_known_target: Vec3,
        /// Сколько секунд подряд цель не видна
        lose_sight_timer: f32,
    },
}

impl Default for SentryState {
    fn default() -> Self {
        Self::patrol()
    }
}

impl SentryState {
    pub fn patrol() -> Self {
        Self::Patrol { wait_timer: 0.0 }
    }

    pub fn suspect(trigger: Vec3) -> Self {
        Self::Suspect {
            last_known_target: trigger,
            spot_timer: 0.0,
            search: SearchPhase::Approach,
        }
    }

    pub fn chase(last_known_target: Vec3) -> Self {
        Self::Chase {
            last_known_target,
            lose_sight_timer: 0.0,
        }
    }

    pub fn kind(&self) -> SentryStateKind {
        match self {
            SentryState::Patrol { .. } => SentryStateKind::Patrol,
            SentryState::Suspect { .. } => SentryStateKind::Suspect,
            SentryState::Chase { .. } => SentryStateKind::Chase,
        }
    }

    /// Last known target position (только Suspect/Chase)
    pub fn last_known_target(&self) -> Option<Vec3> {
        match self {
            SentryState::Patrol { .. } => None,
            SentryState::Suspect { last_known_target, .. } | SentryState::Chase { last_known_target, .. } => {
                Some(*last_known_target)
            }
        }
    }

    /// Дошли ли до точки подозрения (идёт осмотр)
    pub fn has_reached_suspect_position(&self) -> bool {
        matches!(
            self,
            SentryState::Suspect {
                search: SearchPhase::Scan(_),
                ..
            }
        )
    }
}
