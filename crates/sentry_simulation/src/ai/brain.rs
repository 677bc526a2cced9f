//! Sentry behavior state machine: Patrol → Suspect → Chase
//!
//! Порядок одного tick:
//! 1. attack cooldown копится всегда (атака сразу при возврате в радиус)
//! 2. immediate chase radius пересчитывается от режима движения цели (+ "слух" на бег)
//! 3. Patrol/Suspect: perception → возможный переход
//! 4. логика активного состояния → movement intent для navigator
//!
//! Всё синхронно, никаких panic: нет цели / пустой маршрут / navigator не готов →
//! соответствующее поведение просто пропускается в этот tick.

use bevy::prelude::*;

use crate::ai::collaborators::{MovementIntent, Navigator, Surroundings, TargetMovementMode};
use crate::ai::perception;
use crate::ai::route::PatrolRoute;
use crate::ai::state::{ScanState, SearchPhase, SentryState, SentryStateKind, StateTransition};
use crate::config::{ConfigError, SentryConfig};
use crate::geometry::{turn_towards, yaw_look_rotation, Pose};
use crate::navigation::NavAgent;

/// Текущие радиусы обнаружения (debug overlay / gizmos)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetectionRanges {
    pub view_radius: f32,
    pub immediate_chase_radius: f32,
    pub attack_distance: f32,
}

/// Sentry: AI агент с собственной state machine
///
/// Каждый экземпляр полностью независим: никакого общего состояния между агентами.
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
#[require(Transform, NavAgent)]
pub struct Sentry {
    config: SentryConfig,
    state: SentryState,
    /// Состояние на конец прошлого tick (для логирования смены)
    previous: SentryStateKind,
    route: PatrolRoute,
    /// Секунды с последней атаки (зажато на attack_interval)
    attack_cooldown: f32,
    /// Immediate chase radius с учётом режима движения цели
    chase_radius: f32,
    /// Navigator уже получил первый waypoint
    started: bool,
    /// "navigator not ready" уже залогирован
    waiting_logged: bool,
}

impl Sentry {
    /// Конфиг считается валидным (см. `try_new`)
    pub fn new(config: SentryConfig, waypoints: Vec<Vec3>) -> Self {
        Self {
            chase_radius: config.immediate_chase_radius,
            // Первая атака в радиусе: сразу
            attack_cooldown: config.attack_interval,
            config,
            state: SentryState::patrol(),
            previous: SentryStateKind::Patrol,
            route: PatrolRoute::new(waypoints),
            started: false,
            waiting_logged: false,
        }
    }

    pub fn try_new(config: SentryConfig, waypoints: Vec<Vec3>) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::new(config, waypoints))
    }

    pub fn config(&self) -> &SentryConfig {
        &self.config
    }

    pub fn state(&self) -> &SentryState {
        &self.state
    }

    pub fn kind(&self) -> SentryStateKind {
        self.state.kind()
    }

    pub fn previous_kind(&self) -> SentryStateKind {
        self.previous
    }

    pub fn route(&self) -> &PatrolRoute {
        &self.route
    }

    pub fn attack_cooldown(&self) -> f32 {
        self.attack_cooldown
    }

    pub fn immediate_chase_radius(&self) -> f32 {
        self.chase_radius
    }

    pub fn last_known_target(&self) -> Option<Vec3> {
        self.state.last_known_target()
    }

    pub fn has_reached_suspect_position(&self) -> bool {
        self.state.has_reached_suspect_position()
    }

    pub fn detection_ranges(&self) -> DetectionRanges {
        let view_radius = match self.state.kind() {
            SentryStateKind::Chase => self.config.chase_vision().view_radius,
            _ => self.config.vision.view_radius,
        };
        DetectionRanges {
            view_radius,
            immediate_chase_radius: self.chase_radius,
            attack_distance: self.config.attack_distance,
        }
    }

    /// Один simulation tick
    ///
    /// Возвращает net смену состояния за этот tick (если была).
    pub fn tick(
        &mut self,
        dt: f32,
        mode: TargetMovementMode,
        pose: &mut Pose,
        world: &mut Surroundings,
    ) -> Option<StateTransition> {
        let from = self.state.kind();

        if !self.started {
            self.start(world);
        }

        if self.attack_cooldown < self.config.attack_interval {
            self.attack_cooldown = (self.attack_cooldown + dt).min(self.config.attack_interval);
        }

        self.update_radius_and_listen(mode, pose, world);

        match self.state.kind() {
            SentryStateKind::Patrol => {
                self.look_for_target(dt, pose, world);
                if self.state.kind() == SentryStateKind::Patrol {
                    self.patrol(dt, world);
                }
            }
            SentryStateKind::Suspect => {
                self.look_for_target(dt, pose, world);
                if self.state.kind() == SentryStateKind::Suspect {
                    self.investigate(dt, pose, world);
                }
            }
            SentryStateKind::Chase => self.pursue(dt, pose, world),
        }

        self.note_state_change();

        let to = self.state.kind();
        (from != to).then_some(StateTransition { from, to })
    }

    /// Принудительный сброс (checkpoint / respawn)
    ///
    /// Patrol, позиция = первый waypoint, все таймеры = 0, путь navigator сброшен.
    pub fn reset_to_patrol(
        &mut self,
        pose: &mut Pose,
        navigator: &mut dyn Navigator,
    ) -> Option<StateTransition> {
        let from = self.state.kind();

        self.state = SentryState::patrol();
        self.route.rewind();
        if let Some(first) = self.route.first() {
            pose.position = first;
        }
        self.attack_cooldown = 0.0;
        self.chase_radius = self.config.immediate_chase_radius;
        self.started = true;
        self.previous = SentryStateKind::Patrol;
        navigator.cancel();

        crate::log_info(&format!("🔄 Sentry reset to Patrol (was {})", from));

        (from != SentryStateKind::Patrol).then_some(StateTransition {
            from,
            to: SentryStateKind::Patrol,
        })
    }

    fn start(&mut self, world: &mut Surroundings) {
        if !world.navigator.is_ready() {
            if !self.waiting_logged {
                crate::log("Sentry: navigator not ready, patrol start postponed");
                self.waiting_logged = true;
            }
            return;
        }
        self.started = true;

        match self.route.current() {
            Some(first) => world.steer(MovementIntent::move_to(first, self.config.move_speed)),
            None => crate::log("Sentry: empty patrol route, patrol movement disabled"),
        }
    }

    fn note_state_change(&mut self) {
        let current = self.state.kind();
        if current != self.previous {
            crate::log_info(&format!(
                "{} Sentry state changed: {} → {}",
                current.tag(),
                self.previous,
                current
            ));
            self.previous = current;
        }
    }

    /// Радиус от режима движения цели; бегущую цель в радиусе "слышно" без зрения
    fn update_radius_and_listen(&mut self, mode: TargetMovementMode, pose: &Pose, world: &Surroundings) {
        let Some(target_position) = world.target_position() else {
            return;
        };

        let base = self.config.immediate_chase_radius;
        self.chase_radius = match mode {
            TargetMovementMode::Sprinting => base * self.config.sprint_chase_radius_multiplier,
            TargetMovementMode::Sneaking => base * self.config.sneak_chase_radius_multiplier,
            TargetMovementMode::Normal => base,
        };

        if mode != TargetMovementMode::Sprinting || self.state.kind() == SentryStateKind::Chase {
            return;
        }

        let distance = pose.distance_to(target_position);
        if distance <= self.chase_radius {
            if self.state.kind() == SentryStateKind::Patrol {
                crate::log(&format!(
                    "👂 Sentry heard sprinting target at {:.1}m (radius {:.1}m)",
                    distance, self.chase_radius
                ));
            }
            self.state = SentryState::suspect(target_position);
        }
    }

    /// Perception для Patrol/Suspect
    fn look_for_target(&mut self, dt: f32, pose: &Pose, world: &Surroundings) {
        let Some(target_position) = world.target_position() else {
            return;
        };

        let sight = perception::evaluate(pose, target_position, &self.config.vision, world.occlusion);

        if !sight.visible {
            // Уверенность копится только на consecutive видимых tick'ах
            if let SentryState::Suspect { spot_timer, .. } = &mut self.state {
                *spot_timer = 0.0;
            }
            return;
        }

        if sight.distance < self.chase_radius {
            self.state = SentryState::chase(target_position);
            return;
        }

        let lapse = self.config.suspect_to_chase_lapse;
        let escalation = match &mut self.state {
            SentryState::Patrol { .. } => Some(SentryState::suspect(target_position)),
            SentryState::Suspect {
                last_known_target,
                spot_timer,
                search,
            } => {
                *last_known_target = target_position;
                // Цель снова видна: идём дальше, а не стоим и осматриваемся
                *search = SearchPhase::Approach;
                *spot_timer += dt;
                (*spot_timer >= lapse).then(|| SentryState::chase(target_position))
            }
            SentryState::Chase { .. } => None,
        };

        if let Some(next) = escalation {
            self.state = next;
        }
    }

    fn patrol(&mut self, dt: f32, world: &mut Surroundings) {
        if !world.navigator.is_ready() || self.route.is_empty() {
            return;
        }

        world.steer(MovementIntent::resume(self.config.move_speed));

        if !world.arrived(self.config.arrival_tolerance) {
            return;
        }

        let SentryState::Patrol { wait_timer } = &mut self.state else {
            return;
        };
        *wait_timer += dt;
        if *wait_timer >= self.config.wait_time {
            *wait_timer = 0.0;
            self.go_to_next_point(world);
        }
    }

    fn investigate(&mut self, dt: f32, pose: &mut Pose, world: &mut Surroundings) {
        let SentryState::Suspect {
            last_known_target,
            search,
            ..
        } = &mut self.state
        else {
            return;
        };

        let mut arrived = false;
        let finished = match &mut *search {
            SearchPhase::Approach => {
                world.steer(MovementIntent::move_to(*last_known_target, self.config.suspect_speed));
                arrived = world.arrived(self.config.arrival_tolerance);
                false
            }
            SearchPhase::Scan(scan) => {
                world.steer(MovementIntent::halt());

                scan.investigate_timer += dt;
                scan.look_timer += dt;
                if scan.look_timer >= self.config.look_swap_interval {
                    scan.looking_left = !scan.looking_left;
                    scan.look_timer = 0.0;
                }

                pose.rotation = turn_towards(pose.rotation, scan.look_target(), dt * self.config.scan_turn_rate);

                scan.investigate_timer >= self.config.investigate_time
            }
        };

        if arrived {
            *search = SearchPhase::Scan(ScanState::begin(pose.rotation, self.config.scan_half_angle_degrees));
        }

        if finished {
            crate::log("🔍 Sentry: nothing found, back to patrol");
            self.return_to_patrol(world);
        }
    }

    fn pursue(&mut self, dt: f32, pose: &mut Pose, world: &mut Surroundings) {
        let Some(target_position) = world.target_position() else {
            return;
        };

        // Chase смотрит своим vision, без ограничения Suspect-радиусом
        let sight = perception::evaluate(pose, target_position, self.config.chase_vision(), world.occlusion);

        let SentryState::Chase {
            last_known_target,
            lose_sight_timer,
        } = &mut self.state
        else {
            return;
        };

        match sight.sighted_position() {
            Some(seen) => {
                *lose_sight_timer = 0.0;
                *last_known_target = seen;
            }
            None => *lose_sight_timer += dt,
        }

        if *lose_sight_timer >= self.config.lose_sight_time {
            crate::log("👻 Sentry lost sight of target, back to patrol");
            self.return_to_patrol(world);
            return;
        }

        let destination = *last_known_target;

        if sight.distance <= self.config.attack_distance {
            world.steer(MovementIntent::halt());

            if let Some(facing) = yaw_look_rotation(target_position - pose.position) {
                pose.rotation = turn_towards(pose.rotation, facing, dt * self.config.face_turn_rate);
            }

            if self.attack_cooldown >= self.config.attack_interval {
                if world.strike(self.config.attack_damage) {
                    crate::log(&format!("🗡️ Sentry strikes target for {}", self.config.attack_damage));
                }
                self.attack_cooldown = 0.0;
            }
        } else {
            world.steer(MovementIntent::move_to(destination, self.config.chase_speed));
        }
    }

    fn return_to_patrol(&mut self, world: &mut Surroundings) {
        self.state = SentryState::patrol();
        self.go_to_next_point(world);
    }

    fn go_to_next_point(&mut self, world: &mut Surroundings) {
        if let Some(next) = self.route.advance() {
            world.steer(MovementIntent::move_to(next, self.config.move_speed));
        }
    }
}
