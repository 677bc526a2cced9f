//! Headless навигация: прямолинейный агент без navmesh
//!
//! Sentry выставляет intent (destination / speed / stopped), `step_nav_agents`
//! двигает Transform. Путь "считается" один step: сразу после нового
//! destination `path_pending = true`, arrival проверки подавлены.

use bevy::prelude::*;

use crate::ai::collaborators::{MovementIntent, Navigator};
use crate::geometry::yaw_look_rotation;

/// Навигационный агент (аналог NavMeshAgent, но по прямой)
#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect)]
#[reflect(Component)]
pub struct NavAgent {
    pub destination: Option<Vec3>,
    /// Скорость движения (m/s)
    pub speed: f32,
    pub stopped: bool,
    pub path_pending: bool,
    /// false: агент не на navmesh (не спавнен / телепортируется)
    pub enabled: bool,
}

impl Default for NavAgent {
    fn default() -> Self {
        Self {
            destination: None,
            speed: 0.0,
            stopped: false,
            path_pending: false,
            enabled: true,
        }
    }
}

impl NavAgent {
    /// Оставшаяся дистанция до destination (0 если пути нет)
    pub fn remaining_distance(&self, position: Vec3) -> f32 {
        self.destination.map_or(0.0, |destination| position.distance(destination))
    }

    pub fn apply(&mut self, intent: MovementIntent) {
        if let Some(destination) = intent.destination {
            if self.destination != Some(destination) {
                self.path_pending = true;
            }
            self.destination = Some(destination);
        }
        self.speed = intent.speed;
        self.stopped = intent.stopped;
    }

    pub fn clear(&mut self) {
        self.destination = None;
        self.path_pending = false;
    }

    /// Один шаг движения: по прямой к destination, без overshoot
    ///
    /// Поворачивает агента по yaw в сторону движения.
    pub fn step(&mut self, transform: &mut Transform, dt: f32) {
        // Путь "досчитан" к следующему step
        self.path_pending = false;

        if !self.enabled || self.stopped {
            return;
        }
        let Some(destination) = self.destination else {
            return;
        };

        let offset = destination - transform.translation;
        let distance = offset.length();
        let max_step = self.speed * dt;
        if distance <= f32::EPSILON || max_step <= 0.0 {
            return;
        }

        if distance <= max_step {
            transform.translation = destination;
        } else {
            transform.translation += offset / distance * max_step;
        }

        if let Some(rotation) = yaw_look_rotation(offset) {
            transform.rotation = rotation;
        }
    }
}

/// NavAgent + текущая позиция → `Navigator` для state machine
pub struct AgentNavigator<'a> {
    pub agent: &'a mut NavAgent,
    pub position: Vec3,
}

impl<'a> AgentNavigator<'a> {
    pub fn new(agent: &'a mut NavAgent, position: Vec3) -> Self {
        Self { agent, position }
    }
}

impl Navigator for AgentNavigator<'_> {
    fn is_ready(&self) -> bool {
        self.agent.enabled
    }

    fn path_pending(&self) -> bool {
        self.agent.path_pending
    }

    fn remaining_distance(&self) -> f32 {
        self.agent.remaining_distance(self.position)
    }

    fn submit(&mut self, intent: MovementIntent) {
        self.agent.apply(intent);
    }

    fn cancel(&mut self) {
        self.agent.clear();
    }
}

/// Система: двигаем всех NavAgent (FixedUpdate, после tick_sentries)
pub fn step_nav_agents(mut agents: Query<(&mut NavAgent, &mut Transform)>, time: Res<Time<Fixed>>) {
    let delta = time.delta_secs();

    for (mut agent, mut transform) in agents.iter_mut() {
        agent.step(&mut transform, delta);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_destination_is_pending_for_one_step() {
        let mut agent = NavAgent::default();
        let mut transform = Transform::default();

        agent.apply(MovementIntent::move_to(Vec3::new(0.0, 0.0, -10.0), 2.0));
        assert!(agent.path_pending);

        agent.step(&mut transform, 0.5);
        assert!(!agent.path_pending);

        // Тот же destination повторно: не пересчитываем путь
        agent.apply(MovementIntent::move_to(Vec3::new(0.0, 0.0, -10.0), 2.0));
        assert!(!agent.path_pending);
    }

    #[test]
    fn test_step_moves_without_overshoot() {
        let mut agent = NavAgent::default();
        let mut transform = Transform::default();
        agent.apply(MovementIntent::move_to(Vec3::new(3.0, 0.0, 0.0), 2.0));

        agent.step(&mut transform, 1.0);
        assert_eq!(transform.translation, Vec3::new(2.0, 0.0, 0.0));
        assert!((agent.remaining_distance(transform.translation) - 1.0).abs() < 1e-5);

        agent.step(&mut transform, 1.0);
        assert_eq!(transform.translation, Vec3::new(3.0, 0.0, 0.0));
        assert_eq!(agent.remaining_distance(transform.translation), 0.0);
    }

    #[test]
    fn test_step_faces_movement_direction() {
        let mut agent = NavAgent::default();
        let mut transform = Transform::default();
        agent.apply(MovementIntent::move_to(Vec3::new(5.0, 0.0, 0.0), 1.0));

        agent.step(&mut transform, 0.1);
        let forward = transform.rotation * Vec3::NEG_Z;
        assert!((forward - Vec3::X).length() < 1e-4);
    }

    #[test]
    fn test_halt_keeps_destination() {
        let mut agent = NavAgent::default();
        let mut transform = Transform::default();
        agent.apply(MovementIntent::move_to(Vec3::new(0.0, 0.0, -5.0), 2.0));
        agent.apply(MovementIntent::halt());

        agent.step(&mut transform, 1.0);
        assert_eq!(transform.translation, Vec3::ZERO);
        assert_eq!(agent.destination, Some(Vec3::new(0.0, 0.0, -5.0)));

        // resume → едем к прежней цели
        agent.apply(MovementIntent::resume(2.0));
        agent.step(&mut transform, 1.0);
        assert_eq!(transform.translation, Vec3::new(0.0, 0.0, -2.0));
    }

    #[test]
    fn test_disabled_agent_does_not_move() {
        let mut agent = NavAgent {
            enabled: false,
            ..default()
        };
        let mut transform = Transform::default();
        agent.apply(MovementIntent::move_to(Vec3::X * 4.0, 2.0));

        agent.step(&mut transform, 1.0);
        assert_eq!(transform.translation, Vec3::ZERO);

        let navigator = AgentNavigator::new(&mut agent, Vec3::ZERO);
        assert!(!navigator.is_ready());
    }

    #[test]
    fn test_cancel_clears_path() {
        let mut agent = NavAgent::default();
        {
            let mut navigator = AgentNavigator::new(&mut agent, Vec3::ZERO);
            navigator.submit(MovementIntent::move_to(Vec3::new(0.0, 0.0, 8.0), 3.5));
            assert!(navigator.path_pending());
            assert_eq!(navigator.remaining_distance(), 8.0);

            navigator.cancel();
            assert!(!navigator.path_pending());
            assert_eq!(navigator.remaining_distance(), 0.0);
        }
        assert_eq!(agent.destination, None);
    }
}
