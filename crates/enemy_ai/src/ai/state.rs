//! FSM состояния врага и запись о последнем переходе

use std::time::Duration;

use bevy::prelude::*;

/// Состояния врага
///
/// Смерть сюда не входит: это отдельный terminal флаг в EnemyAgent,
/// state при смерти просто замораживается.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Reflect)]
pub enum AIState {
    /// Стоим на посту, ждём врага
    #[default]
    Idle,
    /// Ходим по случайным точкам вокруг home
    Patrol,
    /// Преследуем target
    Chase,
    /// Бьём target (melee, cooldown)
    Attack,
    /// Идём к последней известной позиции target
    Search,
    /// Возвращаемся на home
    Return,
}

impl AIState {
    pub const ALL: [AIState; 6] = [
        AIState::Idle,
        AIState::Patrol,
        AIState::Chase,
        AIState::Attack,
        AIState::Search,
        AIState::Return,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AIState::Idle => "Idle",
            AIState::Patrol => "Patrol",
            AIState::Chase => "Chase",
            AIState::Attack => "Attack",
            AIState::Search => "Search",
            AIState::Return => "Return",
        }
    }
}

/// Текущее состояние + момент входа в него (часы агента)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateMachine {
    state: AIState,
    changed_at: Duration,
}

impl Default for StateMachine {
    fn default() -> Self {
        Self::new(Duration::ZERO)
    }
}

impl StateMachine {
    pub fn new(now: Duration) -> Self {
        Self {
            state: AIState::Idle,
            changed_at: now,
        }
    }

    pub fn state(&self) -> AIState {
        self.state
    }

    pub fn changed_at(&self) -> Duration {
        self.changed_at
    }

    /// Dwell time: сколько прошло с последнего перехода
    pub fn dwell(&self, now: Duration) -> Duration {
        now.saturating_sub(self.changed_at)
    }

    /// Переход в `next`. Повторный вход в то же состояние ничего не делает
    /// (таймер dwell не сбрасывается). Возвращает true если переход был.
    pub fn transition(&mut self, next: AIState, now: Duration) -> bool {
        if self.state == next {
            return false;
        }
        self.state = next;
        self.changed_at = now;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ai_state_default() {
        assert_eq!(AIState::default(), AIState::Idle);
        assert_eq!(StateMachine::default().state(), AIState::Idle);
    }

    #[test]
    fn test_transition_resets_timestamp() {
        let mut fsm = StateMachine::new(Duration::ZERO);

        assert!(fsm.transition(AIState::Patrol, Duration::from_secs(3)));
        assert_eq!(fsm.state(), AIState::Patrol);
        assert_eq!(fsm.changed_at(), Duration::from_secs(3));
        assert_eq!(fsm.dwell(Duration::from_secs(5)), Duration::from_secs(2));
    }

    #[test]
    fn test_same_state_reentry_is_noop() {
        let mut fsm = StateMachine::new(Duration::ZERO);
        fsm.transition(AIState::Chase, Duration::from_secs(1));

        assert!(!fsm.transition(AIState::Chase, Duration::from_secs(4)));
        assert_eq!(fsm.changed_at(), Duration::from_secs(1));
    }

    #[test]
    fn test_state_names_unique() {
        let mut names: Vec<_> = AIState::ALL.iter().map(AIState::as_str).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), AIState::ALL.len());
    }
}
