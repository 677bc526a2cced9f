//! Параметры sentry: vision, скорости, таймеры, атака
//!
//! Defaults = значения из исходного контроллера (inspector). Конфиг валидируется
//! один раз при загрузке/спавне; в runtime `Sentry::tick` считает его корректным.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Все collision groups (obstacle filter по умолчанию)
pub const ALL_OBSTACLE_GROUPS: u32 = u32::MAX;

/// Ошибки конфигурации (setup-time контракт, не runtime)
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{field} must be positive, got {value}")]
    NonPositive { field: &'static str, value: f32 },

    #[error("{field} must not be negative, got {value}")]
    Negative { field: &'static str, value: f32 },

    #[error("sprint multiplier must be >= 1, got {0}")]
    SprintMultiplier(f32),

    #[error("sneak multiplier must be in (0, 1], got {0}")]
    SneakMultiplier(f32),

    #[error("view angle must be in (0, 360] degrees, got {0}")]
    ViewAngle(f32),

    #[error("invalid sentry config JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("cannot read sentry config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Параметры зрения (perception)
#[derive(Debug, Clone, PartialEq, Reflect, Serialize, Deserialize)]
#[serde(default)]
pub struct VisionConfig {
    /// Максимальная дистанция обнаружения (метры)
    pub view_radius: f32,
    /// Полный угол конуса (градусы)
    pub view_angle_degrees: f32,
    /// Высота глаз над pivot (origin LOS луча)
    pub eye_height: f32,
    /// Collision groups, которые блокируют обзор
    pub obstacle_groups: u32,
}

impl Default for VisionConfig {
    fn default() -> Self {
        Self {
            view_radius: 15.0,
            view_angle_degrees: 90.0,
            eye_height: 1.0,
            obstacle_groups: ALL_OBSTACLE_GROUPS,
        }
    }
}

impl VisionConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("view_radius", self.view_radius)?;
        non_negative("eye_height", self.eye_height)?;
        if !(self.view_angle_degrees > 0.0 && self.view_angle_degrees <= 360.0) {
            return Err(ConfigError::ViewAngle(self.view_angle_degrees));
        }
        Ok(())
    }
}

/// Параметры поведения sentry
#[derive(Debug, Clone, PartialEq, Reflect, Serialize, Deserialize)]
#[serde(default)]
pub struct SentryConfig {
    // --- Patrol ---
    /// Пауза на waypoint (секунды)
    pub wait_time: f32,
    pub move_speed: f32,
    /// Дистанция "дошли" для navigator.remaining_distance
    pub arrival_tolerance: f32,

    // --- Detection ---
    pub vision: VisionConfig,
    /// Отдельный обзор для Chase (None → тот же `vision`)
    pub chase_vision: Option<VisionConfig>,
    /// Базовый радиус мгновенного перехода в Chase
    pub immediate_chase_radius: f32,
    /// Сколько секунд подряд надо видеть цель в Suspect, чтобы перейти в Chase
    pub suspect_to_chase_lapse: f32,

    // --- Dynamic detection ---
    pub sprint_chase_radius_multiplier: f32,
    pub sneak_chase_radius_multiplier: f32,

    // --- Suspect ---
    pub suspect_speed: f32,
    pub investigate_time: f32,
    /// Период смены left/right при осмотре (секунды)
    pub look_swap_interval: f32,
    /// Отклонение взгляда при осмотре (градусы, в каждую сторону)
    pub scan_half_angle_degrees: f32,
    /// Скорость slerp при осмотре (множитель dt)
    pub scan_turn_rate: f32,

    // --- Chase ---
    pub chase_speed: f32,
    pub lose_sight_time: f32,

    // --- Attack ---
    pub attack_distance: f32,
    pub attack_interval: f32,
    pub attack_damage: u32,
    /// Скорость разворота к цели в радиусе атаки (множитель dt)
    pub face_turn_rate: f32,
}

impl Default for SentryConfig {
    fn default() -> Self {
        Self {
            wait_time: 2.0,
            move_speed: 3.5,
            arrival_tolerance: 0.5,
            vision: VisionConfig::default(),
            chase_vision: None,
            immediate_chase_radius: 5.0,
            suspect_to_chase_lapse: 1.5,
            sprint_chase_radius_multiplier: 1.5,
            sneak_chase_radius_multiplier: 0.5,
            suspect_speed: 4.5,
            investigate_time: 4.0,
            look_swap_interval: 1.0,
            scan_half_angle_degrees: 45.0,
            scan_turn_rate: 3.0,
            chase_speed: 6.0,
            lose_sight_time: 3.0,
            attack_distance: 2.0,
            attack_interval: 1.5,
            attack_damage: 34,
            face_turn_rate: 5.0,
        }
    }
}

impl SentryConfig {
    /// Vision для Chase (отдельный или общий)
    pub fn chase_vision(&self) -> &VisionConfig {
        self.chase_vision.as_ref().unwrap_or(&self.vision)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.vision.validate()?;
        if let Some(chase_vision) = &self.chase_vision {
            chase_vision.validate()?;
        }

        positive("wait_time", self.wait_time)?;
        positive("move_speed", self.move_speed)?;
        positive("arrival_tolerance", self.arrival_tolerance)?;
        positive("immediate_chase_radius", self.immediate_chase_radius)?;
        positive("suspect_to_chase_lapse", self.suspect_to_chase_lapse)?;
        positive("suspect_speed", self.suspect_speed)?;
        positive("investigate_time", self.investigate_time)?;
        positive("look_swap_interval", self.look_swap_interval)?;
        positive("scan_half_angle_degrees", self.scan_half_angle_degrees)?;
        positive("scan_turn_rate", self.scan_turn_rate)?;
        positive("chase_speed", self.chase_speed)?;
        positive("lose_sight_time", self.lose_sight_time)?;
        positive("attack_distance", self.attack_distance)?;
        positive("attack_interval", self.attack_interval)?;
        positive("face_turn_rate", self.face_turn_rate)?;

        if !(self.sprint_chase_radius_multiplier >= 1.0) {
            return Err(ConfigError::SprintMultiplier(self.sprint_chase_radius_multiplier));
        }
        if !(self.sneak_chase_radius_multiplier > 0.0 && self.sneak_chase_radius_multiplier <= 1.0) {
            return Err(ConfigError::SneakMultiplier(self.sneak_chase_radius_multiplier));
        }

        Ok(())
    }

    /// Парсит JSON (отсутствующие поля → defaults) и валидирует
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: SentryConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&json)
    }
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NonPositive { field, value })
    }
}

fn non_negative(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Negative { field, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentry_config_default() {
        let config = SentryConfig::default();
        assert_eq!(config.vision.view_radius, 15.0);
        assert_eq!(config.vision.view_angle_degrees, 90.0);
        assert_eq!(config.immediate_chase_radius, 5.0);
        assert_eq!(config.suspect_to_chase_lapse, 1.5);
        assert_eq!(config.lose_sight_time, 3.0);
        assert_eq!(config.attack_damage, 34);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_chase_vision_falls_back_to_vision() {
        let mut config = SentryConfig::default();
        assert_eq!(config.chase_vision(), &config.vision);

        config.chase_vision = Some(VisionConfig {
            view_radius: 25.0,
            ..default()
        });
        assert_eq!(config.chase_vision().view_radius, 25.0);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let config = SentryConfig {
            lose_sight_time: 0.0,
            ..default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NonPositive { field: "lose_sight_time", .. })
        ));

        let config = SentryConfig {
            sprint_chase_radius_multiplier: 0.8,
            ..default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::SprintMultiplier(_))));

        let config = SentryConfig {
            sneak_chase_radius_multiplier: 1.5,
            ..default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::SneakMultiplier(_))));

        let config = SentryConfig {
            vision: VisionConfig {
                view_angle_degrees: 400.0,
                ..default()
            },
            ..default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::ViewAngle(_))));

        let config = SentryConfig {
            attack_interval: f32::NAN,
            ..default()
        };
        assert!(config.validate().is_err(), "NaN не проходит валидацию");
    }

    #[test]
    fn test_from_json_partial_uses_defaults() {
        let config = SentryConfig::from_json_str(
            r#"{ "chase_speed": 8.0, "vision": { "view_radius": 20.0 } }"#,
        )
        .unwrap();

        assert_eq!(config.chase_speed, 8.0);
        assert_eq!(config.vision.view_radius, 20.0);
        assert_eq!(config.vision.view_angle_degrees, 90.0);
        assert_eq!(config.move_speed, 3.5);
    }

    #[test]
    fn test_from_json_rejects_invalid() {
        assert!(matches!(
            SentryConfig::from_json_str("{ not json"),
            Err(ConfigError::Json(_))
        ));
        assert!(matches!(
            SentryConfig::from_json_str(r#"{ "wait_time": -1.0 }"#),
            Err(ConfigError::NonPositive { field: "wait_time", .. })
        ));
    }

    #[test]
    fn test_from_json_file_missing() {
        let result = SentryConfig::from_json_file("/definitely/not/here/sentry.json");
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }
}
