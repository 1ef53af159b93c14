//! Headless демо enemy AI
//!
//! Один враг, один игрок: игрок стоит за пределами detection_range, потом
//! подходит вплотную. В лог уходит таймлайн состояний и атак.

use bevy::prelude::*;
use enemy_ai::{
    create_headless_app, spawn_enemy, AIState, DamageDealt, EnemyAgent, EnemyTemplate, Health,
    SimulationPlugin, TargetTag, FIXED_TIMESTEP,
};

const TEMPLATE: &str = r#"{
    "stats": { "name": "Skeleton", "max_health": 60, "attack": 8, "speed": 3.0, "drop_rate": 0.5 },
    "ai": { "detection_range": 8.0, "attack_range": 1.5 }
}"#;

fn main() {
    let seed = 42;
    println!("Starting enemy AI headless demo (seed: {})", seed);

    let template = match EnemyTemplate::from_json(TEMPLATE) {
        Ok(template) => template,
        Err(err) => {
            enemy_ai::logger::log_error(&format!("Invalid enemy template: {}", err));
            return;
        }
    };

    let mut app = create_headless_app(seed);
    app.add_plugins(SimulationPlugin);

    let enemy = spawn_enemy(app.world_mut(), &template, Vec3::ZERO, seed);
    let player = app
        .world_mut()
        .spawn((
            TargetTag::new("Player"),
            Health::new(100),
            Transform::from_xyz(20.0, 0.0, 0.0),
        ))
        .id();

    let ticks_per_second = (1.0 / FIXED_TIMESTEP.as_secs_f32()).round() as usize;
    let mut last_state = AIState::Idle;

    for tick in 0..ticks_per_second * 20 {
        // На 8-й секунде игрок подходит к врагу
        if tick == ticks_per_second * 8 {
            if let Some(mut transform) = app.world_mut().get_mut::<Transform>(player) {
                transform.translation = Vec3::new(4.0, 0.0, 0.0);
            }
        }

        app.update();

        for event in app.world().resource::<Events<DamageDealt>>().iter_current_update_events() {
            println!(
                "  t={:>5.2}s {:?} hits {:?} for {} (target died: {})",
                tick as f32 / ticks_per_second as f32,
                event.attacker,
                event.target,
                event.damage,
                event.target_died
            );
        }

        let Some(agent) = app.world().get::<EnemyAgent>(enemy) else {
            break;
        };
        if agent.state() != last_state {
            println!(
                "  t={:>5.2}s {} → {}",
                agent.elapsed().as_secs_f32(),
                last_state.as_str(),
                agent.state().as_str()
            );
            last_state = agent.state();
        }
    }

    let player_health = app.world().get::<Health>(player).map(|h| h.current);
    println!("Demo complete! Player health: {:?}", player_health);
}
