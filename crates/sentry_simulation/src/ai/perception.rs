//! Perception Engine: distance → FOV угол → line-of-sight
//!
//! Проверки идут строго в этом порядке, дорогой occlusion запрос делается
//! только когда цель уже в радиусе и в конусе. Без состояния и без рандома.

use bevy::prelude::*;

use crate::config::VisionConfig;
use crate::geometry::{angle_between_degrees, Pose};

/// Occlusion collaborator: блокирует ли что-то отрезок
pub trait OcclusionQuery {
    /// `direction` нормализован, `max_distance`: длина отрезка.
    /// `obstacle_groups`: какие collision groups считаются препятствием.
    fn is_blocked(&self, origin: Vec3, direction: Vec3, max_distance: f32, obstacle_groups: u32) -> bool;
}

/// Ничего не блокирует (пустой мир / physics ещё не готова)
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenSight;

impl OcclusionQuery for OpenSight {
    fn is_blocked(&self, _origin: Vec3, _direction: Vec3, _max_distance: f32, _obstacle_groups: u32) -> bool {
        false
    }
}

/// Результат perception на текущий tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Perception {
    pub visible: bool,
    /// Позиция цели на момент проверки
    pub target_position: Vec3,
    pub distance: f32,
}

impl Perception {
    /// Позиция цели, если она видна
    pub fn sighted_position(&self) -> Option<Vec3> {
        self.visible.then_some(self.target_position)
    }
}

/// Видит ли агент цель
///
/// visible ⇔ distance ≤ view_radius И angle(forward, dir) < view_angle/2 И луч от
/// глаз до цели ничем не перекрыт. Цель в точке агента (нулевое направление) не видна.
pub fn evaluate(
    pose: &Pose,
    target_position: Vec3,
    vision: &VisionConfig,
    occlusion: &dyn OcclusionQuery,
) -> Perception {
    let distance = pose.distance_to(target_position);
    let hidden = Perception {
        visible: false,
        target_position,
        distance,
    };

    if distance > vision.view_radius {
        return hidden;
    }

    let Some(angle) = angle_between_degrees(pose.forward(), target_position - pose.position) else {
        return hidden;
    };
    if angle >= vision.view_angle_degrees * 0.5 {
        return hidden;
    }

    let eye = pose.eye(vision.eye_height);
    let segment = target_position - eye;
    let blocked = match segment.try_normalize() {
        Some(direction) => occlusion.is_blocked(eye, direction, segment.length(), vision.obstacle_groups),
        // Цель ровно в точке глаз: перекрывать нечему
        None => false,
    };

    Perception {
        visible: !blocked,
        target_position,
        distance,
    }
}
