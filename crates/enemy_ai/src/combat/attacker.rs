//! Attack cooldown: момент последней атаки на часах агента

use std::time::Duration;

/// Cooldown gate для атак
///
/// `last_attack = None`: ещё не атаковали, первая атака доступна сразу.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AttackTimer {
    last_attack: Option<Duration>,
}

impl AttackTimer {
    pub fn last_attack(&self) -> Option<Duration> {
        self.last_attack
    }

    /// now − last_attack ≥ cooldown
    pub fn is_ready(&self, now: Duration, cooldown: Duration) -> bool {
        match self.last_attack {
            None => true,
            Some(last) => now.saturating_sub(last) >= cooldown,
        }
    }

    pub fn record(&mut self, now: Duration) {
        self.last_attack = Some(now);
    }
}
