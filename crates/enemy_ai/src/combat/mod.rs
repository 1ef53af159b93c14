//! Combat module: здоровье и смерть врагов, урон по целям, дроп
//!
//! Ядро:
//! - attacker: AttackTimer (cooldown атак)
//! - lifecycle: EnemyAgent::take_damage / heal / death sequence
//!
//! ECS:
//! - damage: EnemyHealthRequest → ядро, CombatAction → Health цели, despawn
//! - loot: DropTable (LootTable для ECS) + LootDrop entities

use bevy::prelude::*;

pub mod attacker;
pub mod damage;
pub mod lifecycle;
pub mod loot;

// Re-export основных типов
pub use attacker::AttackTimer;
pub use damage::{
    apply_combat_actions, apply_enemy_damage, despawn_after_timeout, DamageDealt, Dead,
    DespawnAfter, EnemyHealthRequest, HealthChange,
};
pub use loot::{spawn_loot_drops, DropTable, LootDrop, LootDropped};

use crate::SimulationSet;

/// Combat Plugin
///
/// Порядок выполнения (FixedUpdate):
/// 1. Damage: apply_enemy_damage (урон/лечение между тиками)
/// 2. Resolve: apply_combat_actions (атаки этого тика → Health цели)
/// 3. Cleanup: spawn_loot_drops, despawn_after_timeout
pub struct CombatPlugin;

impl Plugin for CombatPlugin {
    fn build(&self, app: &mut App) {
        // Регистрация событий
        app.add_event::<EnemyHealthRequest>()
            .add_event::<DamageDealt>()
            .add_event::<LootDropped>();

        app.add_systems(
            FixedUpdate,
            (
                apply_enemy_damage.in_set(SimulationSet::Damage),
                apply_combat_actions.in_set(SimulationSet::Resolve),
                (spawn_loot_drops, despawn_after_timeout)
                    .chain()
                    .in_set(SimulationSet::Cleanup),
            ),
        );
    }
}
