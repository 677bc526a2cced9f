//! Pose и чистые геометрические helpers (distance, angle, yaw rotation)
//!
//! Конвенция Bevy: Y вверх, forward = -Z. Все функции чистые, никакого
//! глобального "current transform".

use bevy::prelude::*;

/// Поза агента: позиция + ориентация
#[derive(Debug, Clone, Copy, PartialEq, Reflect)]
pub struct Pose {
    pub position: Vec3,
    pub rotation: Quat,
}

impl Default for Pose {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
        }
    }
}

impl Pose {
    pub fn new(position: Vec3, rotation: Quat) -> Self {
        Self { position, rotation }
    }

    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            rotation: Quat::IDENTITY,
        }
    }

    /// Поза, смотрящая вдоль `direction` (только yaw). Нулевое направление → identity.
    pub fn facing(position: Vec3, direction: Vec3) -> Self {
        Self {
            position,
            rotation: yaw_look_rotation(direction).unwrap_or(Quat::IDENTITY),
        }
    }

    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::NEG_Z
    }

    /// Точка глаз (origin для line-of-sight луча)
    pub fn eye(&self, eye_height: f32) -> Vec3 {
        self.position + Vec3::Y * eye_height
    }

    pub fn distance_to(&self, point: Vec3) -> f32 {
        self.position.distance(point)
    }

    pub fn write_to(&self, transform: &mut Transform) {
        transform.translation = self.position;
        transform.rotation = self.rotation;
    }
}

impl From<&Transform> for Pose {
    fn from(transform: &Transform) -> Self {
        Self {
            position: transform.translation,
            rotation: transform.rotation,
        }
    }
}

/// Угол между векторами в градусах. `None` если хотя бы один нулевой.
pub fn angle_between_degrees(a: Vec3, b: Vec3) -> Option<f32> {
    let a = a.try_normalize()?;
    let b = b.try_normalize()?;
    Some(a.dot(b).clamp(-1.0, 1.0).acos().to_degrees())
}

/// Rotation вокруг вертикальной оси, смотрящая вдоль горизонтальной проекции `direction`
pub fn yaw_look_rotation(direction: Vec3) -> Option<Quat> {
    let flat = Vec3::new(direction.x, 0.0, direction.z).try_normalize()?;
    Some(Quat::from_rotation_y(f32::atan2(-flat.x, -flat.z)))
}

/// Поворот на `degrees` вокруг Y относительно `rotation` (положительный = влево)
pub fn yaw_offset(rotation: Quat, degrees: f32) -> Quat {
    rotation * Quat::from_rotation_y(degrees.to_radians())
}

/// Плавный поворот: slerp с фактором, зажатым в [0, 1]
pub fn turn_towards(current: Quat, target: Quat, factor: f32) -> Quat {
    current.slerp(target, factor.clamp(0.0, 1.0))
}

/// Границы FOV конуса (левая, правая) в горизонтальной плоскости
pub fn fov_edges(pose: &Pose, view_angle_degrees: f32) -> (Vec3, Vec3) {
    let half = view_angle_degrees * 0.5;
    let left = yaw_offset(pose.rotation, half) * Vec3::NEG_Z;
    let right = yaw_offset(pose.rotation, -half) * Vec3::NEG_Z;
    (left, right)
}
