//! ECS glue: собирает collaborators из мира и тикает каждого Sentry
//!
//! Порядок в FixedUpdate (см. SentryPlugin):
//! handle_reset_requests → restore_targets_on_reset → tick_sentries → step_nav_agents → apply_sentry_strikes

use bevy::prelude::*;
use bevy_rapier3d::prelude::*;

use crate::ai::brain::Sentry;
use crate::ai::collaborators::{DamageSink, Surroundings, TargetMovementMode, TrackedTarget};
use crate::ai::events::{ResetSentries, SentryStateChanged, SentryStrike};
use crate::ai::perception::{OcclusionQuery, OpenSight};
use crate::ai::state::StateTransition;
use crate::ai::SentryTarget;
use crate::combat::Dead;
use crate::geometry::Pose;
use crate::navigation::{AgentNavigator, NavAgent};
use crate::occlusion::{ObstacleField, RapierOcclusion};

/// Снимок цели на tick: позиция + накопленный урон от этого sentry
struct EcsTarget {
    position: Vec3,
    damage: u32,
}

impl EcsTarget {
    fn at(position: Vec3) -> Self {
        Self { position, damage: 0 }
    }
}

impl DamageSink for EcsTarget {
    fn apply_damage(&mut self, amount: u32) {
        self.damage = self.damage.saturating_add(amount);
    }
}

impl TrackedTarget for EcsTarget {
    fn position(&self) -> Vec3 {
        self.position
    }
}

/// Что уже залогировали про деградированный режим (чтобы не спамить каждый tick)
#[derive(Default)]
pub struct DegradedWarnings {
    occlusion: bool,
    target: bool,
}

/// Система: один tick state machine для каждого sentry
pub fn tick_sentries(
    time: Res<Time<Fixed>>,
    rapier: ReadRapierContext,
    obstacles: Option<Res<ObstacleField>>,
    mut sentries: Query<(Entity, &mut Sentry, &mut Transform, &mut NavAgent)>,
    targets: Query<(Entity, &Transform, &TargetMovementMode), (With<SentryTarget>, Without<Sentry>, Without<Dead>)>,
    mut state_events: EventWriter<SentryStateChanged>,
    mut strike_events: EventWriter<SentryStrike>,
    mut warnings: Local<DegradedWarnings>,
) {
    let dt = time.delta_secs();
    let rapier_context = rapier.single().ok();
    let obstacle_field = obstacles.as_deref();

    if rapier_context.is_none() && obstacle_field.is_none() && !warnings.occlusion {
        crate::log("Sentry: no Rapier context and no ObstacleField, line of sight is never blocked");
        warnings.occlusion = true;
    }

    // Одна живая цель на мир; нет цели (или их несколько) → sentries без perception
    let target = targets
        .single()
        .ok()
        .map(|(entity, transform, mode)| (entity, transform.translation, *mode));
    if target.is_none() && !warnings.target {
        crate::log("Sentry: no single SentryTarget in the world, perception skipped");
        warnings.target = true;
    } else if target.is_some() {
        warnings.target = false;
    }

    for (entity, mut sentry, mut transform, mut agent) in sentries.iter_mut() {
        let position = transform.translation;
        let mut pose = Pose::from(&*transform);

        let mode = target.map_or(TargetMovementMode::Normal, |(_, _, mode)| mode);
        let mut ecs_target = target.map(|(_, target_position, _)| EcsTarget::at(target_position));

        let ignored = [entity, target.map_or(entity, |(target_entity, _, _)| target_entity)];
        let rapier_occlusion;
        let occlusion: &dyn OcclusionQuery = match (rapier_context.as_ref(), obstacle_field) {
            (Some(context), _) => {
                rapier_occlusion = RapierOcclusion::new(context, &ignored);
                &rapier_occlusion as &dyn OcclusionQuery
            }
            (None, Some(field)) => field as &dyn OcclusionQuery,
            (None, None) => &OpenSight as &dyn OcclusionQuery,
        };

        let mut navigator = AgentNavigator::new(&mut agent, position);
        let transition = {
            let mut world = Surroundings {
                navigator: &mut navigator,
                occlusion,
                target: ecs_target.as_mut().map(|target| target as &mut dyn TrackedTarget),
            };
            sentry.tick(dt, mode, &mut pose, &mut world)
        };

        pose.write_to(&mut transform);

        if let Some(StateTransition { from, to }) = transition {
            state_events.write(SentryStateChanged {
                sentry: entity,
                from,
                to,
            });
        }

        if let (Some((target_entity, _, _)), Some(hit)) = (target, ecs_target) {
            if hit.damage > 0 {
                strike_events.write(SentryStrike {
                    sentry: entity,
                    target: target_entity,
                    damage: hit.damage,
                });
            }
        }
    }
}

/// Система: ResetSentries → Sentry::reset_to_patrol
pub fn handle_reset_requests(
    mut requests: EventReader<ResetSentries>,
    mut sentries: Query<(Entity, &mut Sentry, &mut Transform, &mut NavAgent)>,
    mut state_events: EventWriter<SentryStateChanged>,
) {
    for request in requests.read() {
        match request.sentry {
            Some(entity) => match sentries.get_mut(entity) {
                Ok((entity, mut sentry, mut transform, mut agent)) => {
                    reset_one(entity, &mut sentry, &mut transform, &mut agent, &mut state_events);
                }
                Err(_) => {
                    crate::log_warning(&format!("ResetSentries: entity {:?} is not a sentry", entity));
                }
            },
            None => {
                for (entity, mut sentry, mut transform, mut agent) in sentries.iter_mut() {
                    reset_one(entity, &mut sentry, &mut transform, &mut agent, &mut state_events);
                }
            }
        }
    }
}

fn reset_one(
    entity: Entity,
    sentry: &mut Sentry,
    transform: &mut Transform,
    agent: &mut NavAgent,
    state_events: &mut EventWriter<SentryStateChanged>,
) {
    let mut pose = Pose::from(&*transform);
    let mut navigator = AgentNavigator::new(agent, pose.position);

    let transition = sentry.reset_to_patrol(&mut pose, &mut navigator);
    pose.write_to(transform);

    if let Some(StateTransition { from, to }) = transition {
        state_events.write(SentryStateChanged {
            sentry: entity,
            from,
            to,
        });
    }
}
