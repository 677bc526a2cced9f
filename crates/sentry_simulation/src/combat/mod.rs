//! Combat: target-side здоровье и применение ударов sentry
//!
//! ECS ответственность:
//! - Game state: Health цели, RespawnPoint
//! - Events: SentryStrike (от AI) → DamageDealt, EntityDied
//!
//! Решение "бить или нет" (дистанция, cooldown) принимает state machine в `ai::brain`.

pub mod damage;
pub mod health;
pub mod respawn;

// Re-export основных типов
pub use damage::{apply_sentry_strikes, restore_targets_on_reset, DamageDealt, Dead, EntityDied};
pub use health::Health;
pub use respawn::RespawnPoint;
