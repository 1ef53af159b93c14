//! Drop table: один Bernoulli trial на смерть, предмет выбирается равномерно
//!
//! Генерация предметов (rarity, affixes) не здесь: наружу уходит только
//! ItemHandle. Размещение в мире буферизуется и превращается в LootDrop
//! entities в SimulationSet::Cleanup.

use bevy::prelude::*;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::ai::collaborators::{ItemHandle, LootTable};

/// Предмет на земле
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct LootDrop {
    pub item: ItemHandle,
}

/// Событие: предмет выпал из врага
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct LootDropped {
    pub item: ItemHandle,
    pub position: Vec3,
}

/// Loot коллаборатор для ECS (seeded, детерминированный)
#[derive(Resource, Debug, Clone)]
pub struct DropTable {
    items: Vec<ItemHandle>,
    rng: ChaCha8Rng,
    pending: Vec<(ItemHandle, Vec3)>,
}

impl DropTable {
    pub fn new(items: Vec<ItemHandle>, seed: u64) -> Self {
        Self {
            items,
            rng: ChaCha8Rng::seed_from_u64(seed),
            pending: Vec::new(),
        }
    }

    /// Базовый набор (handles 1..=4)
    pub fn with_default_items(seed: u64) -> Self {
        Self::new((1..=4).map(ItemHandle).collect(), seed)
    }

    pub fn items(&self) -> &[ItemHandle] {
        &self.items
    }

    /// Размещения, ещё не превращённые в entities
    pub fn pending(&self) -> &[(ItemHandle, Vec3)] {
        &self.pending
    }

    pub fn take_pending(&mut self) -> Vec<(ItemHandle, Vec3)> {
        std::mem::take(&mut self.pending)
    }
}

impl LootTable for DropTable {
    fn roll_drop(&mut self, drop_rate: f32) -> Option<ItemHandle> {
        if self.items.is_empty() || !drop_rate.is_finite() {
            return None;
        }
        // gen_bool паникует вне [0, 1]
        let chance = f64::from(drop_rate.clamp(0.0, 1.0));
        if !self.rng.gen_bool(chance) {
            return None;
        }
        let index = self.rng.gen_range(0..self.items.len());
        self.items.get(index).copied()
    }

    fn place_drop(&mut self, item: ItemHandle, position: Vec3) {
        self.pending.push((item, position));
    }
}

/// Система: pending drops → LootDrop entities + LootDropped события
pub fn spawn_loot_drops(
    mut commands: Commands,
    drop_table: Option<ResMut<DropTable>>,
    mut dropped_events: EventWriter<LootDropped>,
) {
    let Some(mut drop_table) = drop_table else {
        return;
    };
    if drop_table.pending().is_empty() {
        return;
    }

    for (item, position) in drop_table.take_pending() {
        commands.spawn((LootDrop { item }, Transform::from_translation(position)));
        dropped_events.write(LootDropped { item, position });
        crate::logger::log(&format!("🎁 Loot {:?} dropped at {:?}", item, position));
    }
}
