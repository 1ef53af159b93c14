//! EnemyAgent: данные одного врага
//!
//! Поведение разложено по модулям:
//! - ai::fsm: tick (perception → transition → state body)
//! - combat::lifecycle: take_damage / heal / death sequence

use std::time::Duration;

use bevy::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::ai::perception::PerceptionGate;
use crate::ai::state::{AIState, StateMachine};
use crate::combat::attacker::AttackTimer;
use crate::components::Health;
use crate::config::{AIConfig, EnemyStats};
use crate::navigation::NavAgent;

/// Враг
///
/// Инварианты:
/// - 0 ≤ health.current ≤ stats.max_health
/// - is_dead монотонный: раз true, навсегда true
/// - target: слабая ссылка, агент никогда не создаёт и не удаляет цель
#[derive(Component, Debug, Clone)]
#[require(NavAgent, Transform)]
pub struct EnemyAgent {
    pub(crate) stats: EnemyStats,
    pub(crate) config: AIConfig,
    pub(crate) health: Health,
    pub(crate) mana: u32,
    pub(crate) fsm: StateMachine,
    pub(crate) is_dead: bool,
    pub(crate) attack_timer: AttackTimer,
    pub(crate) perception: PerceptionGate,
    pub(crate) target: Option<Entity>,
    pub(crate) last_known_target_position: Option<Vec3>,
    pub(crate) home: Vec3,
    pub(crate) position: Vec3,
    /// Направление взгляда (XZ, unit)
    pub(crate) facing: Vec3,
    /// Последняя запрошенная у navigation точка
    pub(crate) destination: Option<Vec3>,
    pub(crate) patrol_point: Option<Vec3>,
    /// Монотонные часы агента (сумма delta всех тиков)
    pub(crate) elapsed: Duration,
    pub(crate) rng: ChaCha8Rng,
}

impl EnemyAgent {
    /// Новый враг на spawn точке `home` в состоянии Idle с полным HP
    pub fn new(stats: EnemyStats, config: AIConfig, home: Vec3, seed: u64) -> Self {
        Self {
            health: Health::new(stats.max_health),
            mana: stats.max_mana,
            stats,
            config,
            fsm: StateMachine::new(Duration::ZERO),
            is_dead: false,
            attack_timer: AttackTimer::default(),
            perception: PerceptionGate::new(),
            target: None,
            last_known_target_position: None,
            home,
            position: home,
            facing: Vec3::NEG_Z,
            destination: None,
            patrol_point: None,
            elapsed: Duration::ZERO,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    pub fn stats(&self) -> &EnemyStats {
        &self.stats
    }

    pub fn config(&self) -> &AIConfig {
        &self.config
    }

    pub fn state(&self) -> AIState {
        self.fsm.state()
    }

    /// stateChangeTime (часы агента)
    pub fn state_changed_at(&self) -> Duration {
        self.fsm.changed_at()
    }

    pub fn health(&self) -> u32 {
        self.health.current
    }

    pub fn max_health(&self) -> u32 {
        self.health.max
    }

    pub fn mana(&self) -> u32 {
        self.mana
    }

    pub fn is_dead(&self) -> bool {
        self.is_dead
    }

    pub fn target(&self) -> Option<Entity> {
        self.target
    }

    pub fn last_known_target_position(&self) -> Option<Vec3> {
        self.last_known_target_position
    }

    pub fn last_attack_time(&self) -> Option<Duration> {
        self.attack_timer.last_attack()
    }

    pub fn perception(&self) -> &PerceptionGate {
        &self.perception
    }

    pub fn home(&self) -> Vec3 {
        self.home
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Позицию двигает navigation снаружи, адаптер синхронизирует перед tick
    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    pub fn facing(&self) -> Vec3 {
        self.facing
    }

    pub fn destination(&self) -> Option<Vec3> {
        self.destination
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Списать ману, false если не хватает
    pub fn spend_mana(&mut self, amount: u32) -> bool {
        if self.is_dead || self.mana < amount {
            return false;
        }
        self.mana -= amount;
        true
    }

    pub fn restore_mana(&mut self, amount: u32) {
        if self.is_dead {
            return;
        }
        self.mana = self.mana.saturating_add(amount).min(self.stats.max_mana);
    }
}
