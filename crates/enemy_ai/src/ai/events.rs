//! Исходящие сообщения врага и ECS события
//!
//! Ядро пишет в `Outbox` (очередь на один вызов), доставкой занимается
//! адаптер: `AgentOutput::dispatch` превращает сообщения в Bevy Events.
//! Порядок эмиссии сохраняется, порядок доставки подписчикам не важен.

use std::time::Duration;

use bevy::prelude::*;

/// Семантические cue для презентации (анимация/звук снаружи)
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Cue {
    Attack,
    Die,
    /// Новая скорость передвижения (для blend анимации ходьбы/бега)
    MoveSpeed(f32),
}

impl Cue {
    pub fn name(&self) -> &'static str {
        match self {
            Cue::Attack => "Attack",
            Cue::Die => "Die",
            Cue::MoveSpeed(_) => "MoveSpeed",
        }
    }
}

/// Одна резолюция атаки (живёт в пределах одного тика)
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct CombatAction {
    pub attacker: Entity,
    pub target: Entity,
    pub damage: u32,
}

/// Сообщение от ядра наружу
#[derive(Debug, Clone, PartialEq)]
pub enum AgentMessage {
    Cue(Cue),
    /// Урон наружу (damage sink) + OnAttack
    Attack(CombatAction),
    /// OnDamaged: реально снятое HP
    Damaged {
        amount: u32,
        source: Option<Entity>,
    },
    /// OnDeath
    Died { killer: Option<Entity> },
    /// Убрать агента из симуляции через `after`
    Despawn { after: Duration },
}

/// Очередь сообщений одного агента
#[derive(Debug, Clone, PartialEq)]
pub struct Outbox {
    agent: Entity,
    messages: Vec<AgentMessage>,
}

impl Outbox {
    pub fn new(agent: Entity) -> Self {
        Self {
            agent,
            messages: Vec::new(),
        }
    }

    pub fn agent(&self) -> Entity {
        self.agent
    }

    pub fn push(&mut self, message: AgentMessage) {
        self.messages.push(message);
    }

    pub fn cue(&mut self, cue: Cue) {
        self.push(AgentMessage::Cue(cue));
    }

    pub fn messages(&self) -> &[AgentMessage] {
        &self.messages
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn drain(&mut self) -> std::vec::Drain<'_, AgentMessage> {
        self.messages.drain(..)
    }
}

// ============================================================================
// ECS events (адаптер)
// ============================================================================

/// Event: presentation cue (playCue(agentId, cueName))
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct EnemyCue {
    pub entity: Entity,
    pub cue: Cue,
}

/// Event: OnAttack(agentId, targetId)
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnemyAttacked {
    pub attacker: Entity,
    pub target: Entity,
}

/// Event: OnDamaged(agentId, amount)
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnemyDamaged {
    pub entity: Entity,
    pub amount: u32,
    pub source: Option<Entity>,
}

/// Event: OnDeath(agentId)
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnemyDied {
    pub entity: Entity,
    pub killer: Option<Entity>,
}
