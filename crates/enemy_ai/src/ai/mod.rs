//! Enemy AI module
//!
//! Ядро (plain Rust, без World/Query):
//! - agent: EnemyAgent (данные врага)
//! - fsm: tick (perception → transition → state body)
//! - perception: PerceptionGate (nearest hostile в detection_range)
//! - state: AIState + StateMachine
//!
//! Адаптер (Bevy): systems.rs, события в events.rs.

use bevy::prelude::*;

pub mod agent;
pub mod collaborators;
pub mod events;
pub mod fsm;
pub mod perception;
pub mod state;
pub mod systems;


// Re-export основных типов
pub use agent::EnemyAgent;
pub use collaborators::{
    Collaborators, ItemHandle, LootTable, Navigation, PerceptionError, SpatialQuery,
};
pub use events::{
    AgentMessage, CombatAction, Cue, EnemyAttacked, EnemyCue, EnemyDamaged, EnemyDied, Outbox,
};
pub use fsm::{ARRIVAL_TOLERANCE, ATTACK_EXIT_FACTOR, PURSUIT_EXIT_FACTOR};
pub use perception::{detect, Detection, PerceptionGate};
pub use state::{AIState, StateMachine};
pub use systems::{sync_enemy_facing, tick_enemy_agents, AgentOutput, SpatialSnapshot, TargetQuery};

use crate::SimulationSet;

/// AI Plugin
///
/// Регистрирует AI события и системы в FixedUpdate (SimulationSet::Ai).
/// Порядок выполнения:
/// 1. tick_enemy_agents: perception + FSM + Outbox → Events
/// 2. sync_enemy_facing: facing → Transform.rotation
pub struct AIPlugin;

impl Plugin for AIPlugin {
    fn build(&self, app: &mut App) {
        app.register_type::<AIState>()
            .add_event::<EnemyCue>()
            .add_event::<EnemyAttacked>()
            .add_event::<EnemyDamaged>()
            .add_event::<EnemyDied>()
            .add_event::<CombatAction>();

        app.add_systems(
            FixedUpdate,
            (tick_enemy_agents, sync_enemy_facing)
                .chain()
                .in_set(SimulationSet::Ai),
        );
    }
}
