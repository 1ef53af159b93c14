//! Внешние коллабораторы врага (navigation, spatial query, loot)
//!
//! Ядро ничего не ищет само: все коллабораторы передаются явно через
//! `Collaborators` на каждый вызов tick/take_damage. Реализации живут
//! снаружи (ECS адаптер, движок, тестовые fakes).

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ai::events::Outbox;
use crate::config::HostileFilter;

/// Ошибки spatial query коллаборатора
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PerceptionError {
    #[error("spatial query service unavailable")]
    Unavailable,
    #[error("spatial query failed: {0}")]
    QueryFailed(String),
}

/// Navigation (pathfinding снаружи, мы только просим "иди в точку P")
pub trait Navigation {
    fn request_move(&mut self, destination: Vec3);

    fn has_arrived(&self) -> bool;

    fn is_path_pending(&self) -> bool;

    fn reset_path(&mut self);

    /// Скорость передвижения (м/с)
    fn set_speed(&mut self, _speed: f32) {}

    /// Ближайшая достижимая точка к `point` (NavMesh sample).
    /// По умолчанию считаем любую точку достижимой.
    fn nearest_reachable(&self, point: Vec3, _max_distance: f32) -> Option<Vec3> {
        Some(point)
    }

    /// Навсегда выключить движение (смерть)
    fn disable(&mut self) {
        self.reset_path();
    }
}

/// Spatial query (range query + проверка что handle ещё жив)
pub trait SpatialQuery {
    fn query_nearby(
        &self,
        center: Vec3,
        radius: f32,
        filter: &HostileFilter,
    ) -> Result<Vec<Entity>, PerceptionError>;

    /// Позиция entity, None если entity уже нет (despawned / stale)
    fn position_of(&self, entity: Entity) -> Option<Vec3>;
}

/// Handle предмета из drop table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Reflect)]
pub struct ItemHandle(pub u32);

/// Loot коллаборатор (генерация предметов снаружи)
pub trait LootTable {
    fn roll_drop(&mut self, drop_rate: f32) -> Option<ItemHandle>;

    fn place_drop(&mut self, item: ItemHandle, position: Vec3);
}

/// Набор коллабораторов для одного вызова ядра
///
/// navigation = None: движение деградирует в "стоим на месте".
/// loot = None: смерть без дропа.
pub struct Collaborators<'a> {
    pub navigation: Option<&'a mut dyn Navigation>,
    pub spatial: &'a dyn SpatialQuery,
    pub loot: Option<&'a mut dyn LootTable>,
    pub outbox: &'a mut Outbox,
}

impl Collaborators<'_> {
    pub fn request_move(&mut self, destination: Vec3) {
        if let Some(nav) = self.navigation.as_deref_mut() {
            nav.request_move(destination);
        }
    }

    pub fn reset_path(&mut self) {
        if let Some(nav) = self.navigation.as_deref_mut() {
            nav.reset_path();
        }
    }

    pub fn set_speed(&mut self, speed: f32) {
        if let Some(nav) = self.navigation.as_deref_mut() {
            nav.set_speed(speed);
        }
    }

    pub fn disable_navigation(&mut self) {
        if let Some(nav) = self.navigation.as_deref_mut() {
            nav.disable();
        }
    }

    /// None если navigation нет (тогда решает вызывающий)
    pub fn navigation_arrived(&self) -> Option<bool> {
        self.navigation
            .as_deref()
            .map(|nav| !nav.is_path_pending() && nav.has_arrived())
    }

    pub fn nearest_reachable(&self, point: Vec3, max_distance: f32) -> Option<Vec3> {
        match self.navigation.as_deref() {
            Some(nav) => nav.nearest_reachable(point, max_distance),
            None => Some(point),
        }
    }
}
