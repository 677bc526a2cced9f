//! Patrol route: фиксированная циклическая последовательность waypoints

use bevy::prelude::*;

/// Waypoints + cursor
///
/// Инвариант: cursor ∈ [0, N) при N > 0; для пустого маршрута cursor = 0.
#[derive(Debug, Clone, Default, PartialEq, Reflect)]
pub struct PatrolRoute {
    waypoints: Vec<Vec3>,
    cursor: usize,
}

impl PatrolRoute {
    pub fn new(waypoints: Vec<Vec3>) -> Self {
        Self { waypoints, cursor: 0 }
    }

    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn waypoints(&self) -> &[Vec3] {
        &self.waypoints
    }

    pub fn first(&self) -> Option<Vec3> {
        self.waypoints.first().copied()
    }

    pub fn current(&self) -> Option<Vec3> {
        self.waypoints.get(self.cursor).copied()
    }

    /// Сдвинуть cursor на 1 (mod N) и вернуть новый waypoint
    pub fn advance(&mut self) -> Option<Vec3> {
        if self.waypoints.is_empty() {
            return None;
        }
        self.cursor = (self.cursor + 1) % self.waypoints.len();
        self.current()
    }

    pub fn rewind(&mut self) {
        self.cursor = 0;
    }
}
