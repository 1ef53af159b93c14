//! Enemy AI Core
//!
//! Контроллер врага: PerceptionGate + combat FSM (Idle, Patrol, Chase,
//! Attack, Search, Return) + health/death lifecycle.
//!
//! Слои:
//! - Ядро (EnemyAgent): plain Rust, тик = perception → transition → body.
//!   Коллабораторы (navigation, spatial query, loot) передаются на каждый вызов.
//! - ECS адаптер (Bevy 0.16): FixedUpdate системы играют роль внешнего
//!   simulation loop и коллабораторов.

use std::time::Duration;

use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

// Публичные модули
pub mod ai;
pub mod combat;
pub mod components;
pub mod config;
pub mod logger;
pub mod navigation;

// Re-export базовых типов для удобства
pub use ai::{
    AIPlugin, AIState, AgentMessage, CombatAction, Collaborators, Cue, EnemyAgent, EnemyAttacked,
    EnemyCue, EnemyDamaged, EnemyDied, ItemHandle, LootTable, Navigation, Outbox,
    PerceptionError, PerceptionGate, SpatialQuery, SpatialSnapshot,
};
pub use combat::{
    CombatPlugin, DamageDealt, Dead, DespawnAfter, DropTable, EnemyHealthRequest, HealthChange,
    LootDrop, LootDropped,
};
pub use components::*;
pub use config::{AIConfig, ConfigError, EnemyStats, EnemyTemplate, HostileFilter};
pub use logger::init_logger;
pub use navigation::{NavAgent, NavigationPlugin};

/// Шаг симуляции: 64Hz (1/64 s точно представимо в f32 и Duration)
pub const FIXED_TIMESTEP: Duration = Duration::from_micros(15_625);

/// Фазы одного FixedUpdate тика (выполняются строго по порядку)
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SimulationSet {
    /// Движение navigation агентов к их destination
    Navigation,
    /// Внешний урон/лечение по врагам (между тиками)
    Damage,
    /// Tick врагов
    Ai,
    /// Атаки этого тика → Health целей
    Resolve,
    /// Дроп, деспавн
    Cleanup,
}

/// Главный plugin симуляции (объединяет все подсистемы)
pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        app.configure_sets(
            FixedUpdate,
            (
                SimulationSet::Navigation,
                SimulationSet::Damage,
                SimulationSet::Ai,
                SimulationSet::Resolve,
                SimulationSet::Cleanup,
            )
                .chain(),
        );

        app.insert_resource(Time::<Fixed>::from_duration(FIXED_TIMESTEP));

        // Seed из create_headless_app не перетираем
        if !app.world().contains_resource::<DeterministicRng>() {
            app.insert_resource(DeterministicRng::new(42));
        }
        if !app.world().contains_resource::<DropTable>() {
            let seed = app
                .world_mut()
                .get_resource_mut::<DeterministicRng>()
                .map(|mut rng| rng.next_seed())
                .unwrap_or_default();
            app.insert_resource(DropTable::with_default_items(seed));
        }

        app.add_plugins((NavigationPlugin, CombatPlugin, AIPlugin));
    }
}

/// Детерминистичный RNG resource (seeded)
///
/// Источник seed для per-agent RNG и drop table.
#[derive(Resource)]
pub struct DeterministicRng {
    pub rng: ChaCha8Rng,
    pub seed: u64,
}

impl DeterministicRng {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }

    pub fn next_seed(&mut self) -> u64 {
        self.rng.gen()
    }
}

/// Создаёт minimal Bevy App для headless симуляции
///
/// Время ручное: каждый app.update() = ровно один FIXED_TIMESTEP.
/// Первый update даёт нулевой delta (Bevy стартует часы).
pub fn create_headless_app(seed: u64) -> App {
    let mut app = App::new();
    init_logger();
    app.add_plugins(MinimalPlugins)
        .insert_resource(DeterministicRng::new(seed))
        .insert_resource(Time::<Fixed>::from_duration(FIXED_TIMESTEP))
        .insert_resource(TimeUpdateStrategy::ManualDuration(FIXED_TIMESTEP));

    app
}

/// Спавн врага из шаблона на точке `position` (она же home)
pub fn spawn_enemy(world: &mut World, template: &EnemyTemplate, position: Vec3, seed: u64) -> Entity {
    let agent = EnemyAgent::new(template.stats.clone(), template.ai.clone(), position, seed);

    crate::logger::log(&format!(
        "Spawning enemy '{}' at {:?} (seed {})",
        template.stats.name, position, seed
    ));

    world
        .spawn((agent, Transform::from_translation(position)))
        .id()
}

/// Snapshot мира для сравнения детерминизма
///
/// Байты компонентов `T` в порядке `Entity` (полный `Ord`, с учётом generation).
/// Два прогона с одним seed должны давать одинаковый snapshot.
pub fn world_snapshot<T: Component>(world: &mut World) -> Vec<u8>
where
    T: std::fmt::Debug,
{
    let mut query = world.query::<(Entity, &T)>();
    let mut entries: Vec<_> = query.iter(world).collect();
    entries.sort_by_key(|(entity, _)| *entity);

    let mut snapshot = Vec::new();
    for (entity, component) in entries {
        snapshot.extend_from_slice(&entity.to_bits().to_le_bytes());
        // Debug форма: f32 печатаются точно, для побайтового сравнения хватает
        snapshot.extend_from_slice(format!("{:?}", component).as_bytes());
    }

    snapshot
}
