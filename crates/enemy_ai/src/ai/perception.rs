//! PerceptionGate: видит ли враг цель в этом тике
//!
//! Выбор цели: ближайшая (nearest-first), при равной дистанции меньший
//! Entity. Порядок ответа spatial query на результат не влияет.

use bevy::prelude::*;

use crate::ai::collaborators::SpatialQuery;
use crate::config::HostileFilter;

/// Результат обнаружения
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Detection {
    pub target: Entity,
    pub position: Vec3,
    pub distance: f32,
}

/// Чистый detect: query → фильтр stale/out-of-range → nearest
///
/// Ошибка коллаборатора логируется и считается "никого не видим".
pub fn detect(
    spatial: &dyn SpatialQuery,
    origin: Vec3,
    radius: f32,
    filter: &HostileFilter,
    exclude: Entity,
) -> Option<Detection> {
    if !radius.is_finite() || radius <= 0.0 {
        return None;
    }

    let candidates = match spatial.query_nearby(origin, radius, filter) {
        Ok(candidates) => candidates,
        Err(err) => {
            crate::logger::log_warning(&format!(
                "Perception: {:?} query failed ({}), treating as no detection",
                exclude, err
            ));
            return None;
        }
    };

    candidates
        .into_iter()
        .filter(|&candidate| candidate != exclude)
        .filter_map(|candidate| {
            // Handle без позиции = уже despawned
            let position = spatial.position_of(candidate)?;
            let distance = origin.distance(position);
            (distance <= radius).then_some(Detection {
                target: candidate,
                position,
                distance,
            })
        })
        .min_by(|a, b| {
            a.distance
                .total_cmp(&b.distance)
                .then_with(|| a.target.cmp(&b.target))
        })
}

/// Perception врага с кешем последнего обнаружения
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PerceptionGate {
    last_detection: Option<Detection>,
}

impl PerceptionGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sense(
        &mut self,
        spatial: &dyn SpatialQuery,
        origin: Vec3,
        radius: f32,
        filter: &HostileFilter,
        exclude: Entity,
    ) -> Option<Detection> {
        let detection = detect(spatial, origin, radius, filter, exclude);
        if detection.is_some() {
            self.last_detection = detection;
        }
        detection
    }

    /// Последняя удачная детекция (target + где его видели)
    pub fn last_detection(&self) -> Option<&Detection> {
        self.last_detection.as_ref()
    }

    pub fn forget(&mut self) {
        self.last_detection = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::collaborators::PerceptionError;

    struct StaticWorld {
        // (entity, position, tag) в "произвольном" порядке ответа
        entities: Vec<(Entity, Vec3, &'static str)>,
        stale: Vec<Entity>,
        failing: bool,
    }

    impl StaticWorld {
        fn new(entities: Vec<(Entity, Vec3, &'static str)>) -> Self {
            Self {
                entities,
                stale: Vec::new(),
                failing: false,
            }
        }
    }

    impl SpatialQuery for StaticWorld {
        fn query_nearby(
            &self,
            _center: Vec3,
            _radius: f32,
            filter: &HostileFilter,
        ) -> Result<Vec<Entity>, PerceptionError> {
            if self.failing {
                return Err(PerceptionError::Unavailable);
            }
            // Грубый broadphase: отдаём всех подходящих, radius проверяет gate
            Ok(self
                .entities
                .iter()
                .filter(|(_, _, tag)| filter.matches(Some(*tag), None))
                .map(|(entity, _, _)| *entity)
                .collect())
        }

        fn position_of(&self, entity: Entity) -> Option<Vec3> {
            if self.stale.contains(&entity) {
                return None;
            }
            self.entities
                .iter()
                .find(|(e, _, _)| *e == entity)
                .map(|(_, position, _)| *position)
        }
    }

    fn player_filter() -> HostileFilter {
        HostileFilter::Tag("Player".to_string())
    }

    const SELF: Entity = Entity::from_raw(100);

    #[test]
    fn test_detect_picks_nearest_not_first() {
        let far = Entity::from_raw(1);
        let near = Entity::from_raw(2);
        let world = StaticWorld::new(vec![
            (far, Vec3::new(8.0, 0.0, 0.0), "Player"),
            (near, Vec3::new(3.0, 0.0, 0.0), "Player"),
        ]);

        let detection = detect(&world, Vec3::ZERO, 10.0, &player_filter(), SELF)
            .expect("someone in range");

        assert_eq!(detection.target, near);
        assert_eq!(detection.distance, 3.0);
    }

    #[test]
    fn test_detect_tie_break_by_entity() {
        let a = Entity::from_raw(5);
        let b = Entity::from_raw(3);
        let world = StaticWorld::new(vec![
            (a, Vec3::new(4.0, 0.0, 0.0), "Player"),
            (b, Vec3::new(-4.0, 0.0, 0.0), "Player"),
        ]);

        let detection = detect(&world, Vec3::ZERO, 10.0, &player_filter(), SELF).unwrap();
        assert_eq!(detection.target, b);
    }

    #[test]
    fn test_detect_ignores_out_of_range_filtered_and_stale() {
        let outside = Entity::from_raw(1);
        let npc = Entity::from_raw(2);
        let stale = Entity::from_raw(3);
        let mut world = StaticWorld::new(vec![
            (outside, Vec3::new(10.5, 0.0, 0.0), "Player"),
            (npc, Vec3::new(1.0, 0.0, 0.0), "Npc"),
            (stale, Vec3::new(2.0, 0.0, 0.0), "Player"),
        ]);
        world.stale.push(stale);

        assert!(detect(&world, Vec3::ZERO, 10.0, &player_filter(), SELF).is_none());
    }

    #[test]
    fn test_detect_excludes_self() {
        let world = StaticWorld::new(vec![(SELF, Vec3::ZERO, "Player")]);
        assert!(detect(&world, Vec3::ZERO, 10.0, &player_filter(), SELF).is_none());
    }

    #[test]
    fn test_detect_failure_is_no_detection() {
        let mut world = StaticWorld::new(vec![(Entity::from_raw(1), Vec3::X, "Player")]);
        world.failing = true;

        assert!(detect(&world, Vec3::ZERO, 10.0, &player_filter(), SELF).is_none());
    }

    #[test]
    fn test_detect_rejects_bad_radius() {
        let world = StaticWorld::new(vec![(Entity::from_raw(1), Vec3::ZERO, "Player")]);

        assert!(detect(&world, Vec3::ZERO, 0.0, &player_filter(), SELF).is_none());
        assert!(detect(&world, Vec3::ZERO, -1.0, &player_filter(), SELF).is_none());
        assert!(detect(&world, Vec3::ZERO, f32::NAN, &player_filter(), SELF).is_none());
    }

    #[test]
    fn test_gate_caches_last_detection() {
        let player = Entity::from_raw(1);
        let mut world = StaticWorld::new(vec![(player, Vec3::new(2.0, 0.0, 0.0), "Player")]);
        let mut gate = PerceptionGate::new();

        assert!(gate.sense(&world, Vec3::ZERO, 10.0, &player_filter(), SELF).is_some());

        // Цель ушла: кеш остаётся
        world.entities[0].1 = Vec3::new(50.0, 0.0, 0.0);
        assert!(gate.sense(&world, Vec3::ZERO, 10.0, &player_filter(), SELF).is_none());

        let cached = gate.last_detection().expect("cached");
        assert_eq!(cached.target, player);
        assert_eq!(cached.position, Vec3::new(2.0, 0.0, 0.0));

        gate.forget();
        assert!(gate.last_detection().is_none());
    }
}
