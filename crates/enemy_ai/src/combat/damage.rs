//! Damage pipeline (ECS сторона)
//!
//! Входящие изменения здоровья врагов: EnemyHealthRequest → EnemyAgent::take_damage/heal
//! (SimulationSet::Damage, между тиками, строго в порядке отправки).
//! Исходящий урон врагов: CombatAction → Health цели → DamageDealt
//! (SimulationSet::Resolve, после тиков).

use bevy::prelude::*;

use crate::ai::agent::EnemyAgent;
use crate::ai::collaborators::{Collaborators, LootTable, Navigation};
use crate::ai::events::{CombatAction, Outbox};
use crate::ai::systems::{AgentOutput, SpatialSnapshot, TargetQuery};
use crate::combat::loot::DropTable;
use crate::components::Health;
use crate::navigation::NavAgent;

/// Что сделать со здоровьем врага
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthChange {
    /// Урон (от игрока, ловушки, скрипта). amount < 0 считается нулём.
    Damage { amount: i32, source: Option<Entity> },
    /// Лечение (clamp к max_health)
    Heal { amount: i32 },
}

/// Запрос на изменение здоровья врага
///
/// Урон и лечение идут одним потоком событий: за кадр они применяются
/// в том порядке, в котором их отправили.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnemyHealthRequest {
    pub target: Entity,
    pub change: HealthChange,
}

impl EnemyHealthRequest {
    pub fn damage(target: Entity, amount: i32, source: Option<Entity>) -> Self {
        Self {
            target,
            change: HealthChange::Damage { amount, source },
        }
    }

    pub fn heal(target: Entity, amount: i32) -> Self {
        Self {
            target,
            change: HealthChange::Heal { amount },
        }
    }
}

/// Событие: урон врага применён к цели
///
/// Генерируется после применения CombatAction к Health цели.
/// Используется для UI, звуков, эффектов.
#[derive(Event, Debug, Clone)]
pub struct DamageDealt {
    pub attacker: Entity,
    pub target: Entity,
    pub damage: u32,
    pub target_died: bool,
}

/// Компонент-маркер: entity мертв
///
/// Врагу ставится вместе с DespawnAfter, цели (игроку) при Health = 0.
/// Мёртвые выпадают из TargetQuery и не тикаются.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dead;

/// Компонент: деспавн entity после timeout
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct DespawnAfter {
    /// Время деспавна (в секундах от старта симуляции)
    pub despawn_time: f32,
}

/// Система: EnemyHealthRequest события → ядро врага
pub fn apply_enemy_damage(
    mut requests: EventReader<EnemyHealthRequest>,
    mut agents: Query<(&mut EnemyAgent, Option<&mut NavAgent>)>,
    targets: TargetQuery,
    mut drop_table: Option<ResMut<DropTable>>,
    mut output: AgentOutput,
    time: Res<Time<Fixed>>,
) {
    let now = time.elapsed_secs();
    let mut snapshot = None;

    for request in requests.read() {
        let Ok((mut agent, mut nav)) = agents.get_mut(request.target) else {
            crate::logger::log_warning(&format!(
                "EnemyHealthRequest: {:?} is not an enemy agent, {:?} ignored",
                request.target, request.change
            ));
            continue;
        };

        let (amount, source) = match request.change {
            HealthChange::Heal { amount } => {
                agent.heal(amount);
                continue;
            }
            HealthChange::Damage { amount, source } => (amount, source),
        };

        // Snapshot нужен только если кто-то реально получил урон
        let spatial: &SpatialSnapshot =
            snapshot.get_or_insert_with(|| SpatialSnapshot::from_query(&targets));

        let mut outbox = Outbox::new(request.target);
        {
            let mut ctx = Collaborators {
                navigation: nav.as_deref_mut().map(|n| n as &mut dyn Navigation),
                spatial,
                loot: drop_table.as_deref_mut().map(|t| t as &mut dyn LootTable),
                outbox: &mut outbox,
            };
            agent.take_damage(amount, source, &mut ctx);
        }
        output.dispatch(&mut outbox, now);
    }
}

/// Система: CombatAction врагов → Health цели
///
/// Цель без Health пропускается с warning, уже мёртвая пропускается молча.
pub fn apply_combat_actions(
    mut commands: Commands,
    mut actions: EventReader<CombatAction>,
    mut damage_dealt_events: EventWriter<DamageDealt>,
    mut targets: Query<&mut Health, Without<EnemyAgent>>,
) {
    for action in actions.read() {
        let Ok(mut health) = targets.get_mut(action.target) else {
            crate::logger::log_warning(&format!(
                "CombatAction: target {:?} has no Health, attack from {:?} dropped",
                action.target, action.attacker
            ));
            continue;
        };
        if !health.is_alive() {
            continue;
        }

        let applied = health.take_damage(action.damage);
        let target_died = !health.is_alive();

        damage_dealt_events.write(DamageDealt {
            attacker: action.attacker,
            target: action.target,
            damage: applied,
            target_died,
        });

        if target_died {
            commands.entity(action.target).try_insert(Dead);
            crate::logger::log_info(&format!(
                "💀 Target {:?} killed by {:?}",
                action.target, action.attacker
            ));
        }
    }
}

/// Система: убирает трупы врагов, у которых истёк DespawnAfter
///
/// Срок считается по Time<Fixed>, так что деспавн детерминирован по тикам.
pub fn despawn_after_timeout(
    mut commands: Commands,
    corpses: Query<(Entity, &DespawnAfter, Option<&EnemyAgent>)>,
    time: Res<Time<Fixed>>,
) {
    let now = time.elapsed_secs();

    for (entity, despawn_after, agent) in corpses.iter() {
        if now < despawn_after.despawn_time {
            continue;
        }
        let name = agent.map_or("<unknown>", |agent| agent.stats().name.as_str());
        crate::logger::log(&format!(
            "⚰️ Enemy '{}' {:?} corpse removed at t={:.2}s",
            name, entity, now
        ));
        commands.entity(entity).despawn();
    }
}
