//! Базовые компоненты акторов мира: Actor, Health, TargetTag
//!
//! Это "противоположная сторона" для врагов: игроки, NPC, всё во что можно
//! прицелиться. Здоровье самого врага живёт внутри EnemyAgent.

use bevy::prelude::*;

/// Актор (игрок, NPC): живое существо с фракцией
#[derive(Component, Debug, Clone, Default, Reflect)]
#[reflect(Component)]
#[require(Health, Transform)]
pub struct Actor {
    /// Stable ID фракции (для HostileFilter::OtherFaction)
    pub faction_id: u64,
}

/// Тег для HostileFilter::Tag ("Player", "Escort", ...)
#[derive(Component, Debug, Clone, PartialEq, Eq, Reflect)]
#[reflect(Component)]
pub struct TargetTag(pub String);

impl TargetTag {
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Здоровье
///
/// Инвариант: 0 ≤ current ≤ max
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Reflect)]
#[reflect(Component)]
pub struct Health {
    pub current: u32,
    pub max: u32,
}

impl Default for Health {
    fn default() -> Self {
        Self::new(100)
    }
}

impl Health {
    pub fn new(max: u32) -> Self {
        Self { current: max, max }
    }

    pub fn is_alive(&self) -> bool {
        self.current > 0
    }

    /// Возвращает реально снятое количество (после clamp к нулю)
    pub fn take_damage(&mut self, amount: u32) -> u32 {
        let applied = amount.min(self.current);
        self.current -= applied;
        applied
    }

    /// Возвращает реально восстановленное количество (после clamp к max)
    pub fn heal(&mut self, amount: u32) -> u32 {
        let applied = amount.min(self.max - self.current);
        self.current += applied;
        applied
    }
}
