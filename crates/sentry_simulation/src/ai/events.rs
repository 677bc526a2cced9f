//! Sentry events: входящие команды и исходящие уведомления state machine

use bevy::prelude::*;

use crate::ai::state::SentryStateKind;

/// Запрос принудительного сброса в Patrol (checkpoint, respawn игрока)
///
/// `sentry: None`: сбросить всех sentries сразу.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResetSentries {
    pub sentry: Option<Entity>,
}

impl ResetSentries {
    pub fn all() -> Self {
        Self { sentry: None }
    }

    pub fn one(sentry: Entity) -> Self {
        Self { sentry: Some(sentry) }
    }
}

/// Sentry сменил состояние (net за tick)
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct SentryStateChanged {
    pub sentry: Entity,
    pub from: SentryStateKind,
    pub to: SentryStateKind,
}

/// Sentry нанёс удар цели (применяется к Health в combat)
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct SentryStrike {
    pub sentry: Entity,
    pub target: Entity,
    pub damage: u32,
}
