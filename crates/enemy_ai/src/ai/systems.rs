//! ECS адаптер для EnemyAgent
//!
//! Роль "внешнего simulation loop": раз в FixedUpdate собираем spatial
//! snapshot, тикаем каждого живого врага, доставляем его Outbox в Bevy Events.

use bevy::ecs::system::SystemParam;
use bevy::prelude::*;

use crate::ai::agent::EnemyAgent;
use crate::ai::collaborators::{Collaborators, LootTable, Navigation, PerceptionError, SpatialQuery};
use crate::ai::events::{
    AgentMessage, CombatAction, EnemyAttacked, EnemyCue, EnemyDamaged, EnemyDied, Outbox,
};
use crate::combat::{Dead, DespawnAfter, DropTable};
use crate::components::{Actor, TargetTag};
use crate::config::HostileFilter;
use crate::navigation::NavAgent;

/// Всё, во что враг может прицелиться (не враги, не мёртвые)
pub type TargetQuery<'w, 's> = Query<
    'w,
    's,
    (Entity, &'static Transform, Option<&'static TargetTag>, Option<&'static Actor>),
    (Without<EnemyAgent>, Without<Dead>),
>;

#[derive(Debug, Clone, PartialEq)]
struct SpatialEntry {
    entity: Entity,
    position: Vec3,
    tag: Option<String>,
    faction_id: Option<u64>,
}

/// Owned snapshot perceivable entities на один кадр
///
/// Отсортирован по Entity: ответ query_nearby не зависит от порядка
/// итерации archetype storage.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpatialSnapshot {
    entries: Vec<SpatialEntry>,
}

impl SpatialSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_query(targets: &TargetQuery) -> Self {
        let mut snapshot = Self::new();
        for (entity, transform, tag, actor) in targets.iter() {
            snapshot.insert(
                entity,
                transform.translation,
                tag.map(|t| t.as_str().to_string()),
                actor.map(|a| a.faction_id),
            );
        }
        snapshot
    }

    pub fn insert(
        &mut self,
        entity: Entity,
        position: Vec3,
        tag: Option<String>,
        faction_id: Option<u64>,
    ) {
        let entry = SpatialEntry {
            entity,
            position,
            tag,
            faction_id,
        };
        match self.entries.binary_search_by_key(&entity, |e| e.entity) {
            Ok(index) => self.entries[index] = entry,
            Err(index) => self.entries.insert(index, entry),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl SpatialQuery for SpatialSnapshot {
    fn query_nearby(
        &self,
        center: Vec3,
        radius: f32,
        filter: &HostileFilter,
    ) -> Result<Vec<Entity>, PerceptionError> {
        Ok(self
            .entries
            .iter()
            .filter(|e| filter.matches(e.tag.as_deref(), e.faction_id))
            .filter(|e| e.position.distance(center) <= radius)
            .map(|e| e.entity)
            .collect())
    }

    fn position_of(&self, entity: Entity) -> Option<Vec3> {
        self.entries
            .binary_search_by_key(&entity, |e| e.entity)
            .ok()
            .map(|index| self.entries[index].position)
    }
}

/// Доставка Outbox наружу (cue/attack/damage/death события + despawn)
#[derive(SystemParam)]
pub struct AgentOutput<'w, 's> {
    commands: Commands<'w, 's>,
    cues: EventWriter<'w, EnemyCue>,
    actions: EventWriter<'w, CombatAction>,
    attacked: EventWriter<'w, EnemyAttacked>,
    damaged: EventWriter<'w, EnemyDamaged>,
    died: EventWriter<'w, EnemyDied>,
}

impl AgentOutput<'_, '_> {
    /// `now_secs`: текущее время Time<Fixed> (для DespawnAfter)
    pub fn dispatch(&mut self, outbox: &mut Outbox, now_secs: f32) {
        let agent = outbox.agent();

        for message in outbox.drain() {
            match message {
                AgentMessage::Cue(cue) => {
                    self.cues.write(EnemyCue { entity: agent, cue });
                }
                AgentMessage::Attack(action) => {
                    self.actions.write(action);
                    self.attacked.write(EnemyAttacked {
                        attacker: action.attacker,
                        target: action.target,
                    });
                }
                AgentMessage::Damaged { amount, source } => {
                    self.damaged.write(EnemyDamaged {
                        entity: agent,
                        amount,
                        source,
                    });
                }
                AgentMessage::Died { killer } => {
                    self.died.write(EnemyDied {
                        entity: agent,
                        killer,
                    });
                }
                AgentMessage::Despawn { after } => {
                    self.commands.entity(agent).try_insert((
                        Dead,
                        DespawnAfter {
                            despawn_time: now_secs + after.as_secs_f32(),
                        },
                    ));
                }
            }
        }
    }
}

/// Система: tick всех живых врагов
///
/// Позиция агента берётся из Transform (его двигает navigation), стейт
/// меняется только внутри EnemyAgent::tick.
pub fn tick_enemy_agents(
    mut agents: Query<(Entity, &mut EnemyAgent, Option<&mut NavAgent>, &Transform), Without<Dead>>,
    targets: TargetQuery,
    mut drop_table: Option<ResMut<DropTable>>,
    mut output: AgentOutput,
    time: Res<Time<Fixed>>,
) {
    let spatial = SpatialSnapshot::from_query(&targets);
    let delta = time.delta();
    let now = time.elapsed_secs();

    for (entity, mut agent, mut nav, transform) in agents.iter_mut() {
        agent.set_position(transform.translation);

        let mut outbox = Outbox::new(entity);
        {
            let mut ctx = Collaborators {
                navigation: nav.as_deref_mut().map(|n| n as &mut dyn Navigation),
                spatial: &spatial,
                loot: drop_table.as_deref_mut().map(|t| t as &mut dyn LootTable),
                outbox: &mut outbox,
            };
            agent.tick(delta, &mut ctx);
        }
        output.dispatch(&mut outbox, now);
    }
}

/// Система: facing агента → rotation Transform (forward = -Z)
pub fn sync_enemy_facing(mut agents: Query<(&EnemyAgent, &mut Transform), Changed<EnemyAgent>>) {
    for (agent, mut transform) in agents.iter_mut() {
        let facing = agent.facing();
        if facing == Vec3::ZERO {
            continue;
        }
        let rotation = Quat::from_rotation_arc(Vec3::NEG_Z, facing);
        if transform.rotation != rotation {
            transform.rotation = rotation;
        }
    }
}
