//! Occlusion backends для line-of-sight
//!
//! - `RapierOcclusion`: raycast через Rapier scene query (когда есть physics world)
//! - `ObstacleField`: аналитические сферы/AABB, работает без Rapier (headless, тесты)

use bevy::prelude::*;
use bevy_rapier3d::prelude::*;
use serde::{Deserialize, Serialize};

use crate::ai::perception::OcclusionQuery;

/// Collision group стен/препятствий (блокируют взгляд)
pub const OBSTACLE_GROUP: Group = Group::GROUP_1;

/// Фильтр луча: только collider'ы из `obstacle_groups`
pub fn sight_groups(obstacle_groups: u32) -> CollisionGroups {
    CollisionGroups::new(Group::ALL, Group::from_bits_truncate(obstacle_groups))
}

/// Line-of-sight через Rapier raycast
///
/// Сам наблюдатель и цель в луче игнорируются (их collider'ы лежат на концах отрезка).
pub struct RapierOcclusion<'a, 'w> {
    context: &'a RapierContext<'w>,
    ignored: &'a [Entity],
}

impl<'a, 'w> RapierOcclusion<'a, 'w> {
    pub fn new(context: &'a RapierContext<'w>, ignored: &'a [Entity]) -> Self {
        Self { context, ignored }
    }
}

impl OcclusionQuery for RapierOcclusion<'_, '_> {
    fn is_blocked(&self, origin: Vec3, direction: Vec3, max_distance: f32, obstacle_groups: u32) -> bool {
        let ignored = self.ignored;
        let predicate = |entity: Entity| !ignored.contains(&entity);
        let filter = QueryFilter::new()
            .exclude_sensors()
            .groups(sight_groups(obstacle_groups))
            .predicate(&predicate);

        self.context
            .cast_ray(origin, direction, max_distance, true, filter)
            .is_some()
    }
}

/// Форма препятствия
#[derive(Debug, Clone, Copy, PartialEq, Reflect, Serialize, Deserialize)]
pub enum ObstacleShape {
    Sphere { center: Vec3, radius: f32 },
    /// Axis-aligned box
    Cuboid { min: Vec3, max: Vec3 },
}

/// Препятствие + его collision groups (membership bits)
#[derive(Debug, Clone, Copy, PartialEq, Reflect, Serialize, Deserialize)]
pub struct Obstacle {
    pub shape: ObstacleShape,
    pub groups: u32,
}

impl Obstacle {
    pub fn sphere(center: Vec3, radius: f32) -> Self {
        Self {
            shape: ObstacleShape::Sphere { center, radius },
            groups: OBSTACLE_GROUP.bits(),
        }
    }

    /// Box по центру и half extents
    pub fn cuboid(center: Vec3, half_extents: Vec3) -> Self {
        Self {
            shape: ObstacleShape::Cuboid {
                min: center - half_extents,
                max: center + half_extents,
            },
            groups: OBSTACLE_GROUP.bits(),
        }
    }

    pub fn with_groups(mut self, groups: u32) -> Self {
        self.groups = groups;
        self
    }

    /// Расстояние вдоль луча до первого пересечения (0 если origin внутри)
    pub fn ray_hit(&self, origin: Vec3, direction: Vec3) -> Option<f32> {
        match self.shape {
            ObstacleShape::Sphere { center, radius } => ray_sphere(origin, direction, center, radius),
            ObstacleShape::Cuboid { min, max } => ray_aabb(origin, direction, min, max),
        }
    }
}

/// Набор аналитических препятствий (resource)
#[derive(Resource, Debug, Clone, Default, PartialEq, Reflect, Serialize, Deserialize)]
#[reflect(Resource)]
pub struct ObstacleField {
    pub obstacles: Vec<Obstacle>,
}

impl ObstacleField {
    pub fn new(obstacles: Vec<Obstacle>) -> Self {
        Self { obstacles }
    }

    pub fn with(mut self, obstacle: Obstacle) -> Self {
        self.obstacles.push(obstacle);
        self
    }
}

impl OcclusionQuery for ObstacleField {
    fn is_blocked(&self, origin: Vec3, direction: Vec3, max_distance: f32, obstacle_groups: u32) -> bool {
        self.obstacles
            .iter()
            .filter(|obstacle| obstacle.groups & obstacle_groups != 0)
            .filter_map(|obstacle| obstacle.ray_hit(origin, direction))
            .any(|distance| distance <= max_distance)
    }
}

fn ray_sphere(origin: Vec3, direction: Vec3, center: Vec3, radius: f32) -> Option<f32> {
    let to_origin = origin - center;
    let c = to_origin.length_squared() - radius * radius;
    if c <= 0.0 {
        return Some(0.0);
    }

    let b = to_origin.dot(direction);
    if b > 0.0 {
        // Сфера позади луча
        return None;
    }

    let discriminant = b * b - c;
    if discriminant < 0.0 {
        return None;
    }
    Some(-b - discriminant.sqrt())
}

/// Slab test
fn ray_aabb(origin: Vec3, direction: Vec3, min: Vec3, max: Vec3) -> Option<f32> {
    let mut t_min = 0.0_f32;
    let mut t_max = f32::INFINITY;

    for axis in 0..3 {
        let o = origin[axis];
        let d = direction[axis];
        let (lo, hi) = (min[axis], max[axis]);

        if d.abs() < f32::EPSILON {
            if o < lo || o > hi {
                return None;
            }
            continue;
        }

        let inv = 1.0 / d;
        let mut t0 = (lo - o) * inv;
        let mut t1 = (hi - o) * inv;
        if t0 > t1 {
            std::mem::swap(&mut t0, &mut t1);
        }
        t_min = t_min.max(t0);
        t_max = t_max.min(t1);
        if t_min > t_max {
            return None;
        }
    }

    Some(t_min)
}
