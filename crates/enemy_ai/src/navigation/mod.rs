//! Headless navigation для врагов
//!
//! NavAgent: простейшая реализация Navigation (прямая линия до точки,
//! без NavMesh). В игре её заменяет движковый NavigationAgent, в тестах и
//! headless режиме она двигает Transform сама.
//!
//! Path pending держится ровно до следующего advance (имитация асинхронного
//! расчёта пути).

use bevy::prelude::*;

use crate::ai::collaborators::Navigation;
use crate::SimulationSet;

/// Navigation state одного актора
#[derive(Component, Debug, Clone, PartialEq)]
pub struct NavAgent {
    destination: Option<Vec3>,
    speed: f32,
    stopping_distance: f32,
    path_pending: bool,
    arrived: bool,
    enabled: bool,
}

impl Default for NavAgent {
    fn default() -> Self {
        Self {
            destination: None,
            speed: 0.0,
            stopping_distance: 0.1,
            path_pending: false,
            arrived: false,
            enabled: true,
        }
    }
}

impl NavAgent {
    pub fn with_stopping_distance(mut self, stopping_distance: f32) -> Self {
        self.stopping_distance = stopping_distance.max(0.0);
        self
    }

    pub fn destination(&self) -> Option<Vec3> {
        self.destination
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Один шаг движения к destination (прямая линия, без overshoot)
    pub fn advance(&mut self, position: &mut Vec3, delta_secs: f32) {
        if !self.enabled {
            return;
        }
        let Some(destination) = self.destination else {
            return;
        };

        // Путь "посчитан"
        self.path_pending = false;

        let to_destination = destination - *position;
        let distance = to_destination.length();
        if distance <= self.stopping_distance {
            self.arrived = true;
            return;
        }

        let step = self.speed * delta_secs;
        if step >= distance {
            *position = destination;
            self.arrived = true;
        } else if step > 0.0 {
            *position += to_destination / distance * step;
        }
    }
}

impl Navigation for NavAgent {
    fn request_move(&mut self, destination: Vec3) {
        if !self.enabled {
            return;
        }
        self.destination = Some(destination);
        self.path_pending = true;
        self.arrived = false;
    }

    fn has_arrived(&self) -> bool {
        self.arrived
    }

    fn is_path_pending(&self) -> bool {
        self.path_pending
    }

    fn reset_path(&mut self) {
        self.destination = None;
        self.path_pending = false;
        self.arrived = false;
    }

    fn set_speed(&mut self, speed: f32) {
        self.speed = speed.max(0.0);
    }

    fn disable(&mut self) {
        self.reset_path();
        self.speed = 0.0;
        self.enabled = false;
    }
}

/// Система: двигаем всех NavAgent к их destination
pub fn advance_nav_agents(mut agents: Query<(&mut NavAgent, &mut Transform)>, time: Res<Time<Fixed>>) {
    let delta = time.delta_secs();

    for (mut nav, mut transform) in agents.iter_mut() {
        nav.advance(&mut transform.translation, delta);
    }
}

/// Navigation Plugin (headless mover)
pub struct NavigationPlugin;

impl Plugin for NavigationPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            FixedUpdate,
            advance_nav_agents.in_set(SimulationSet::Navigation),
        );
    }
}
