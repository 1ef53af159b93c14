//! Health & lifecycle врага: TakeDamage, Heal, death sequence
//!
//! Вызывается снаружи между тиками (EnemyHealthRequest события в ECS).
//! Боевые числа приходят из дизайнерских данных: никаких panic, только clamp.

use bevy::prelude::*;

use crate::ai::agent::EnemyAgent;
use crate::ai::collaborators::Collaborators;
use crate::ai::events::{AgentMessage, Cue};
use crate::ai::state::AIState;

impl EnemyAgent {
    /// Урон по врагу. Отрицательный amount считается нулём.
    ///
    /// Удар из Idle/Patrol всегда провоцирует Chase, даже если источник не
    /// проходит обычный perception check: target = source (если известен).
    pub fn take_damage(&mut self, amount: i32, source: Option<Entity>, ctx: &mut Collaborators<'_>) {
        if self.is_dead {
            return;
        }

        let requested = u32::try_from(amount).unwrap_or(0);
        let applied = self.health.take_damage(requested);
        ctx.outbox.push(AgentMessage::Damaged { amount: applied, source });

        if !self.health.is_alive() {
            self.die(source, ctx);
            return;
        }

        if matches!(self.fsm.state(), AIState::Idle | AIState::Patrol) {
            self.target = source;
            self.last_known_target_position = source.and_then(|s| ctx.spatial.position_of(s));

            crate::logger::log(&format!(
                "🔥 {:?} hit by {:?} for {} → forced Chase",
                ctx.outbox.agent(),
                source,
                applied
            ));
            self.enter_state(AIState::Chase, ctx);
        }
    }

    /// Лечение, clamp к max_health. Отрицательный amount считается нулём.
    pub fn heal(&mut self, amount: i32) {
        if self.is_dead {
            return;
        }
        let requested = u32::try_from(amount).unwrap_or(0);
        self.health.heal(requested);
    }

    /// Death sequence: ровно один раз (guard по is_dead)
    fn die(&mut self, killer: Option<Entity>, ctx: &mut Collaborators<'_>) {
        if self.is_dead {
            return;
        }
        self.is_dead = true;

        ctx.outbox.cue(Cue::Die);

        // Движение и коллизии выключает navigation коллаборатор
        self.destination = None;
        ctx.disable_navigation();

        // Один Bernoulli trial на весь дроп
        let drop_rate = self.stats.drop_rate;
        let position = self.position;
        if let Some(loot) = ctx.loot.as_deref_mut() {
            if let Some(item) = loot.roll_drop(drop_rate) {
                loot.place_drop(item, position);
            }
        }

        ctx.outbox.push(AgentMessage::Died { killer });
        ctx.outbox.push(AgentMessage::Despawn {
            after: self.config.despawn_delay(),
        });

        crate::logger::log_info(&format!(
            "💀 {} {:?} died (killer: {:?}, state frozen at {})",
            self.stats.name,
            ctx.outbox.agent(),
            killer,
            self.fsm.state().as_str()
        ));
    }
}
