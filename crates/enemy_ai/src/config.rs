//! Шаблоны врагов: статы + параметры AI
//!
//! Загружаются один раз (JSON), дальше read-only. Врагу достаётся копия
//! шаблона при спавне.

use std::time::Duration;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Ошибки загрузки/валидации шаблона
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse enemy template: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Кого считаем враждебной целью
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Reflect)]
#[serde(rename_all = "snake_case")]
pub enum HostileFilter {
    /// Entities с заданным TargetTag (например "Player")
    Tag(String),
    /// Любой Actor с другим faction_id
    OtherFaction(u64),
}

impl Default for HostileFilter {
    fn default() -> Self {
        Self::Tag("Player".to_string())
    }
}

impl HostileFilter {
    pub fn matches(&self, tag: Option<&str>, faction_id: Option<u64>) -> bool {
        match self {
            HostileFilter::Tag(wanted) => tag == Some(wanted.as_str()),
            HostileFilter::OtherFaction(own) => faction_id.is_some_and(|f| f != *own),
        }
    }
}

/// Статы врага (immutable template)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Reflect)]
#[serde(default)]
pub struct EnemyStats {
    pub name: String,
    pub max_health: u32,
    pub max_mana: u32,
    /// Урон одной атаки (CombatAction.damage)
    pub attack: u32,
    pub defense: u32,
    /// Базовая скорость передвижения (м/с)
    pub speed: f32,
    pub level: u32,
    pub experience: u32,
    /// Шанс дропа [0, 1], один Bernoulli trial при смерти
    pub drop_rate: f32,
    pub gold_reward: u32,
}

impl Default for EnemyStats {
    fn default() -> Self {
        Self {
            name: "Grunt".to_string(),
            max_health: 100,
            max_mana: 0,
            attack: 10,
            defense: 0,
            speed: 3.5,
            level: 1,
            experience: 10,
            drop_rate: 0.3,
            gold_reward: 5,
        }
    }
}

/// Параметры AI (дистанции в метрах, времена в секундах)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Reflect)]
#[serde(default)]
pub struct AIConfig {
    /// Радиус обнаружения врагов
    pub detection_range: f32,
    /// Дистанция удара (Chase → Attack)
    pub attack_range: f32,
    /// Cooldown между атаками
    pub attack_cooldown: f32,
    /// Idle → Patrol после стольких секунд без обнаружения
    pub idle_dwell: f32,
    /// Search сдаётся через столько секунд
    pub search_timeout: f32,
    /// Радиус patrol точек вокруг home
    pub patrol_radius: f32,
    /// Chase скорость = stats.speed × multiplier
    pub chase_speed_multiplier: f32,
    /// Задержка деспавна после смерти
    pub despawn_delay: f32,
    pub hostile: HostileFilter,
}

impl Default for AIConfig {
    fn default() -> Self {
        Self {
            detection_range: 10.0,
            attack_range: 2.0,
            attack_cooldown: 1.5,
            idle_dwell: 3.0,
            search_timeout: 8.0,
            patrol_radius: 10.0,
            chase_speed_multiplier: 1.5,
            despawn_delay: 3.0,
            hostile: HostileFilter::default(),
        }
    }
}

impl AIConfig {
    pub fn attack_cooldown(&self) -> Duration {
        seconds(self.attack_cooldown)
    }

    pub fn idle_dwell(&self) -> Duration {
        seconds(self.idle_dwell)
    }

    pub fn search_timeout(&self) -> Duration {
        seconds(self.search_timeout)
    }

    pub fn despawn_delay(&self) -> Duration {
        seconds(self.despawn_delay)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("ai.detection_range", self.detection_range)?;
        positive("ai.attack_range", self.attack_range)?;
        positive("ai.patrol_radius", self.patrol_radius)?;
        positive("ai.chase_speed_multiplier", self.chase_speed_multiplier)?;
        non_negative_secs("ai.attack_cooldown", self.attack_cooldown)?;
        non_negative_secs("ai.idle_dwell", self.idle_dwell)?;
        non_negative_secs("ai.search_timeout", self.search_timeout)?;
        non_negative_secs("ai.despawn_delay", self.despawn_delay)?;
        Ok(())
    }
}

/// Полный шаблон врага (как лежит в JSON)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnemyTemplate {
    #[serde(default)]
    pub stats: EnemyStats,
    #[serde(default)]
    pub ai: AIConfig,
}

impl EnemyTemplate {
    pub fn from_json(source: &str) -> Result<Self, ConfigError> {
        let template: Self = serde_json::from_str(source)?;
        template.validate()?;
        Ok(template)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.stats.max_health == 0 {
            return Err(ConfigError::Invalid {
                field: "stats.max_health",
                reason: "must be greater than zero".to_string(),
            });
        }
        if !(0.0..=1.0).contains(&self.stats.drop_rate) {
            return Err(ConfigError::Invalid {
                field: "stats.drop_rate",
                reason: format!("{} is outside [0, 1]", self.stats.drop_rate),
            });
        }
        if !self.stats.speed.is_finite() || self.stats.speed < 0.0 {
            return Err(ConfigError::Invalid {
                field: "stats.speed",
                reason: format!("{} is not a non-negative number", self.stats.speed),
            });
        }
        self.ai.validate()
    }
}

/// Секунды → Duration; мусор (NaN, отрицательные) даёт ноль
fn seconds(value: f32) -> Duration {
    Duration::try_from_secs_f32(value).unwrap_or(Duration::ZERO)
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            field,
            reason: format!("{} must be a positive number", value),
        })
    }
}

fn non_negative_secs(field: &'static str, value: f32) -> Result<(), ConfigError> {
    Duration::try_from_secs_f32(value)
        .map(|_| ())
        .map_err(|_| ConfigError::Invalid {
            field,
            reason: format!("{} is not a valid duration in seconds", value),
        })
}
