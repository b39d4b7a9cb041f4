//! Warmup spawn relocation
//!
//! During warmup every spawn is moved away from the engine's spawn point.
//! Maps with a waypoint table cycle through it; other maps get a small
//! upward nudge with the camera looking down.

use crate::config::Waypoint;
use crate::engine::{Engine, EngineError};
use log::debug;
use std::collections::HashMap;
use warmup_shared::{PlayerId, Transform, Vec3, NUDGE_ROTATION, SPAWN_NUDGE_HEIGHT};

/// Waypoints shipped with the server, keyed by map name.
pub fn builtin_waypoints() -> HashMap<String, Vec<Waypoint>> {
    let karkand = vec![
        // square to hotel corridor facing south
        Waypoint::new((-186.0, 156.0, 44.0), (162.0, 0.0, 0.0)),
        // square to hotel east main arches
        Waypoint::new((-168.0, 156.0, 35.0), (-175.0, 0.0, 0.0)),
        // east street, hotel north spawn height
        Waypoint::new((-139.0, 156.0, 28.0), (-118.0, 0.0, 0.0)),
        // east street, south spawn height
        Waypoint::new((-140.0, 156.0, 1.0), (-68.0, 0.0, 0.0)),
        // east street, first corridor from the hill
        Waypoint::new((-144.0, 156.0, -18.0), (-112.0, 0.0, 0.0)),
        // chicken coop
        Waypoint::new((-178.0, 156.0, -26.0), (-94.0, 0.0, 0.0)),
        // box by south roof
        Waypoint::new((-178.0, 156.0, -12.0), (-91.0, 0.0, 0.0)),
        // barricades south of burning car
        Waypoint::new((-211.0, 156.0, -37.0), (-3.0, 0.0, 0.0)),
        // burning car
        Waypoint::new((-226.0, 156.0, -21.0), (41.0, 0.0, 0.0)),
        // back of hotel
        Waypoint::new((-229.0, 156.0, -7.0), (-86.0, 0.0, 0.0)),
        // fence by hotel arch
        Waypoint::new((-249.0, 156.0, 17.0), (45.0, 0.0, 0.0)),
        // tree north-west of hotel by telephone booth
        Waypoint::new((-253.0, 156.0, 34.0), (104.0, 0.0, 0.0)),
        // south of north hotel phone booth
        Waypoint::new((-225.0, 156.0, 65.0), (121.0, 0.0, 0.0)),
    ];

    HashMap::from([("strike_at_karkand".to_string(), karkand)])
}

#[derive(Debug, Clone)]
pub struct SpawnRelocator {
    waypoints: HashMap<String, Vec<Waypoint>>,
    current_map: String,
    cursor: usize,
}

impl SpawnRelocator {
    /// Builds the table from the built-in waypoints with `extra` taking precedence.
    pub fn new(extra: HashMap<String, Vec<Waypoint>>) -> Self {
        let mut waypoints = builtin_waypoints();
        waypoints.extend(extra.into_iter().filter(|(_, list)| !list.is_empty()));
        Self {
            waypoints,
            current_map: String::new(),
            cursor: 0,
        }
    }

    pub fn current_map(&self) -> &str {
        &self.current_map
    }

    /// Switches the active map. The waypoint cursor restarts on a new map.
    pub fn set_map(&mut self, map: &str) {
        if self.current_map != map {
            self.current_map = map.to_string();
            self.cursor = 0;
        }
    }

    pub fn has_waypoints(&self) -> bool {
        self.waypoints.contains_key(&self.current_map)
    }

    /// Advances the round-robin cursor and returns the next waypoint as an
    /// engine transform, or `None` if the map has no table.
    pub fn next_waypoint(&mut self) -> Option<Transform> {
        let list = self.waypoints.get(&self.current_map)?;
        self.cursor = (self.cursor + 1) % list.len();
        let waypoint = list[self.cursor];
        Some(Transform::new(
            waypoint.position,
            waypoint.heading.to_engine(),
        ))
    }

    /// Destination used when the map has no waypoints.
    pub fn nudge(current: Transform) -> Transform {
        Transform::new(
            current
                .position
                .offset(Vec3::new(0.0, SPAWN_NUDGE_HEIGHT, 0.0)),
            NUDGE_ROTATION,
        )
    }

    /// Moves a freshly spawned player and returns where they were put.
    pub fn relocate(
        &mut self,
        engine: &mut dyn Engine,
        id: PlayerId,
    ) -> Result<Transform, EngineError> {
        let destination = match self.next_waypoint() {
            Some(transform) => transform,
            None => {
                let current = engine.vehicle_transform(id)?;
                debug!("Nudging player {} from {}", id, current.position);
                Self::nudge(current)
            }
        };

        engine.set_vehicle_position(id, destination.position)?;
        engine.set_vehicle_rotation(id, destination.rotation)?;
        Ok(destination)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::SimEngine;
    use assert_approx_eq::assert_approx_eq;
    use warmup_shared::{Rotation, Team};

    #[test]
    fn test_round_robin_wraps() {
        let mut relocator = SpawnRelocator::new(HashMap::new());
        relocator.set_map("strike_at_karkand");
        let n = builtin_waypoints()["strike_at_karkand"].len();

        let picks: Vec<Transform> = (0..2 * n)
            .map(|_| relocator.next_waypoint().unwrap())
            .collect();
        for k in 0..n {
            assert_eq!(picks[k], picks[k + n]);
        }
        assert_ne!(picks[0], picks[1]);
    }

    #[test]
    fn test_waypoint_orientation_is_permuted() {
        let extra = HashMap::from([(
            "test_map".to_string(),
            vec![Waypoint::new((1.0, 2.0, 3.0), (90.0, 10.0, 5.0))],
        )]);
        let mut relocator = SpawnRelocator::new(extra);
        relocator.set_map("test_map");

        let transform = relocator.next_waypoint().unwrap();
        assert_eq!(transform.position, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(transform.rotation, Rotation::new(5.0, 10.0, -90.0));
    }

    #[test]
    fn test_map_change_resets_cursor() {
        let mut relocator = SpawnRelocator::new(HashMap::new());
        relocator.set_map("strike_at_karkand");
        let first = relocator.next_waypoint().unwrap();
        relocator.next_waypoint();

        relocator.set_map("dalian_plant");
        assert!(relocator.next_waypoint().is_none());

        relocator.set_map("strike_at_karkand");
        assert_eq!(relocator.next_waypoint().unwrap(), first);
    }

    #[test]
    fn test_same_map_keeps_cursor() {
        let mut relocator = SpawnRelocator::new(HashMap::new());
        relocator.set_map("strike_at_karkand");
        let first = relocator.next_waypoint().unwrap();
        relocator.set_map("strike_at_karkand");
        assert_ne!(relocator.next_waypoint().unwrap(), first);
    }

    #[test]
    fn test_nudge_fallback() {
        let current = Transform::new(Vec3::new(10.0, 20.0, 30.0), Rotation::new(45.0, 0.0, 0.0));
        let nudged = SpawnRelocator::nudge(current);
        assert_approx_eq!(nudged.position.y, 23.0, 0.0001);
        assert_eq!(nudged.position.x, 10.0);
        assert_eq!(nudged.rotation, NUDGE_ROTATION);
    }

    #[test]
    fn test_relocate_writes_transform() {
        let mut engine = SimEngine::new("dalian_plant");
        engine.add_player(1, "Alice", Team::A);
        engine.place_player(1, Vec3::new(5.0, 50.0, 5.0));

        let mut relocator = SpawnRelocator::new(HashMap::new());
        relocator.set_map("dalian_plant");
        let destination = relocator.relocate(&mut engine, 1).unwrap();

        let now = engine.vehicle_transform(1).unwrap();
        assert_eq!(now, destination);
        assert_approx_eq!(now.position.y, 53.0, 0.0001);
    }

    #[test]
    fn test_relocate_failure_is_reported() {
        let mut engine = SimEngine::new("dalian_plant");
        let mut relocator = SpawnRelocator::new(HashMap::new());
        relocator.set_map("dalian_plant");
        assert_eq!(
            relocator.relocate(&mut engine, 7),
            Err(EngineError::PlayerNotFound(7))
        );
    }
}
