//! ECS компоненты мира (вне самого врага)
//!
//! - actor: Actor, Health, TargetTag (цели и их здоровье)

pub mod actor;

pub use actor::*;
