//! Combat FSM: tick одного врага
//!
//! Порядок внутри тика строгий:
//! 1. perception (PerceptionGate)
//! 2. exit conditions текущего состояния → максимум один переход
//! 3. body (возможно уже нового) состояния: движение, facing, атака
//!
//! Гистерезис:
//! - Chase → Attack на attack_range, Attack → Chase только после 1.2 × attack_range
//! - Chase → Search только после 1.5 × detection_range

use std::f32::consts::TAU;
use std::time::Duration;

use bevy::prelude::*;
use rand::Rng;

use crate::ai::agent::EnemyAgent;
use crate::ai::collaborators::Collaborators;
use crate::ai::events::{AgentMessage, CombatAction, Cue};
use crate::ai::perception::Detection;
use crate::ai::state::AIState;

/// Attack → Chase когда дистанция > attack_range × factor
pub const ATTACK_EXIT_FACTOR: f32 = 1.2;

/// Chase → Search когда дистанция > detection_range × factor
pub const PURSUIT_EXIT_FACTOR: f32 = 1.5;

/// Без navigation считаем что дошли, если ближе этого (метры)
pub const ARRIVAL_TOLERANCE: f32 = 0.25;

impl EnemyAgent {
    /// Один тик симуляции. Мёртвый агент инертен.
    pub fn tick(&mut self, delta: Duration, ctx: &mut Collaborators<'_>) {
        if self.is_dead {
            return;
        }
        self.elapsed += delta;

        let sensed = self.perception.sense(
            ctx.spatial,
            self.position,
            self.config.detection_range,
            &self.config.hostile,
            ctx.outbox.agent(),
        );

        if let Some(next) = self.evaluate_transition(sensed, ctx) {
            self.enter_state(next, ctx);
        }

        self.run_state_body(ctx);
    }

    /// Exit conditions текущего состояния (в порядке таблицы переходов)
    fn evaluate_transition(
        &mut self,
        sensed: Option<Detection>,
        ctx: &Collaborators<'_>,
    ) -> Option<AIState> {
        let now = self.elapsed;

        match self.fsm.state() {
            AIState::Idle => {
                if let Some(detection) = sensed {
                    self.acquire(detection);
                    Some(AIState::Chase)
                } else if self.fsm.dwell(now) >= self.config.idle_dwell() {
                    // Включительно: ровно idle_dwell (3.0 s) уже Patrol, 2.9 s ещё Idle
                    Some(AIState::Patrol)
                } else {
                    None
                }
            }

            AIState::Patrol => sensed.map(|detection| {
                self.acquire(detection);
                AIState::Chase
            }),

            AIState::Chase => match self.target_distance(ctx) {
                None => Some(AIState::Search),
                Some(distance) if distance <= self.config.attack_range => Some(AIState::Attack),
                Some(distance) if distance > self.config.detection_range * PURSUIT_EXIT_FACTOR => {
                    Some(AIState::Search)
                }
                Some(_) => None,
            },

            AIState::Attack => match self.target_distance(ctx) {
                None => Some(AIState::Search),
                Some(distance) if distance > self.config.attack_range * ATTACK_EXIT_FACTOR => {
                    Some(AIState::Chase)
                }
                Some(_) => None,
            },

            AIState::Search => {
                if let Some(detection) = sensed {
                    self.acquire(detection);
                    Some(AIState::Chase)
                } else if self.search_finished(ctx) {
                    Some(AIState::Return)
                } else {
                    None
                }
            }

            AIState::Return => {
                let at_home = self.destination == Some(self.home) && self.arrived(ctx);
                at_home.then_some(AIState::Idle)
            }
        }
    }

    /// Переход + side effects входа. Тот же state: no-op.
    pub(crate) fn enter_state(&mut self, next: AIState, ctx: &mut Collaborators<'_>) {
        let previous = self.fsm.state();
        if !self.fsm.transition(next, self.elapsed) {
            return;
        }

        crate::logger::log(&format!(
            "AI: {:?} {} → {} (t={:.2}s)",
            ctx.outbox.agent(),
            previous.as_str(),
            next.as_str(),
            self.elapsed.as_secs_f32()
        ));

        match next {
            AIState::Idle => {
                self.stop(ctx);
                self.target = None;
                self.last_known_target_position = None;
                self.patrol_point = None;
                self.perception.forget();
            }
            AIState::Attack => self.stop(ctx),
            AIState::Patrol => self.patrol_point = None,
            AIState::Chase | AIState::Search | AIState::Return => {}
        }

        let speed = self.speed_for(next);
        ctx.set_speed(speed);
        ctx.outbox.cue(Cue::MoveSpeed(speed));
    }

    fn run_state_body(&mut self, ctx: &mut Collaborators<'_>) {
        match self.fsm.state() {
            AIState::Idle => {}

            AIState::Patrol => {
                let needs_point = self.patrol_point.is_none() || self.arrived(ctx);
                if needs_point {
                    self.patrol_point = self.roll_patrol_point(ctx);
                }
                if let Some(point) = self.patrol_point {
                    self.move_to(point, ctx);
                }
            }

            AIState::Chase => {
                if let Some(target_position) = self.target_position(ctx) {
                    self.last_known_target_position = Some(target_position);
                    self.face(target_position);
                    self.move_to(target_position, ctx);
                }
            }

            AIState::Attack => {
                let (Some(target), Some(target_position)) = (self.target, self.target_position(ctx))
                else {
                    return;
                };
                self.last_known_target_position = Some(target_position);
                self.face(target_position);

                if self
                    .attack_timer
                    .is_ready(self.elapsed, self.config.attack_cooldown())
                {
                    self.resolve_attack(target, ctx);
                }
            }

            AIState::Search => {
                if let Some(point) = self.last_known_target_position {
                    self.move_to(point, ctx);
                }
            }

            AIState::Return => {
                let home = self.home;
                self.move_to(home, ctx);
            }
        }
    }

    /// Единственное место, где урон уходит наружу
    fn resolve_attack(&mut self, target: Entity, ctx: &mut Collaborators<'_>) {
        self.attack_timer.record(self.elapsed);

        let action = CombatAction {
            attacker: ctx.outbox.agent(),
            target,
            damage: self.stats.attack,
        };
        ctx.outbox.push(AgentMessage::Attack(action));
        ctx.outbox.cue(Cue::Attack);

        crate::logger::log(&format!(
            "⚔️ AI: {:?} attacks {:?} for {} (t={:.2}s)",
            action.attacker,
            target,
            action.damage,
            self.elapsed.as_secs_f32()
        ));
    }

    fn acquire(&mut self, detection: Detection) {
        self.target = Some(detection.target);
        self.last_known_target_position = Some(detection.position);
    }

    fn target_position(&self, ctx: &Collaborators<'_>) -> Option<Vec3> {
        self.target.and_then(|target| ctx.spatial.position_of(target))
    }

    /// None = target потерян (нет handle или entity уже нет)
    fn target_distance(&self, ctx: &Collaborators<'_>) -> Option<f32> {
        self.target_position(ctx)
            .map(|position| self.position.distance(position))
    }

    fn search_finished(&self, ctx: &Collaborators<'_>) -> bool {
        let Some(last_known) = self.last_known_target_position else {
            // Искать негде
            return true;
        };
        let arrived = self.destination == Some(last_known) && self.arrived(ctx);
        arrived || self.fsm.dwell(self.elapsed) >= self.config.search_timeout()
    }

    /// Дошли до текущего destination
    fn arrived(&self, ctx: &Collaborators<'_>) -> bool {
        let Some(destination) = self.destination else {
            return false;
        };
        ctx.navigation_arrived()
            .unwrap_or_else(|| self.position.distance(destination) <= ARRIVAL_TOLERANCE)
    }

    /// Запрос движения (повторный запрос той же точки не отправляем)
    fn move_to(&mut self, destination: Vec3, ctx: &mut Collaborators<'_>) {
        if self.destination == Some(destination) {
            return;
        }
        self.destination = Some(destination);
        ctx.request_move(destination);
    }

    fn stop(&mut self, ctx: &mut Collaborators<'_>) {
        self.destination = None;
        ctx.reset_path();
    }

    fn face(&mut self, point: Vec3) {
        let mut direction = point - self.position;
        direction.y = 0.0;
        let direction = direction.normalize_or_zero();
        if direction != Vec3::ZERO {
            self.facing = direction;
        }
    }

    fn speed_for(&self, state: AIState) -> f32 {
        match state {
            AIState::Idle | AIState::Attack => 0.0,
            AIState::Chase => self.stats.speed * self.config.chase_speed_multiplier,
            AIState::Patrol | AIState::Search | AIState::Return => self.stats.speed,
        }
    }

    /// Случайная точка в patrol_radius вокруг home, через NavMesh sample
    fn roll_patrol_point(&mut self, ctx: &Collaborators<'_>) -> Option<Vec3> {
        let radius = self.config.patrol_radius;
        let angle = self.rng.gen_range(0.0..TAU);
        let distance = radius * self.rng.gen::<f32>().sqrt();
        let candidate = self.home + Vec3::new(angle.cos() * distance, 0.0, angle.sin() * distance);

        ctx.nearest_reachable(candidate, radius)
    }
}
