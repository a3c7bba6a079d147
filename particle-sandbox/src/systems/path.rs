// Copyright 2025 John Brosnihan
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//! Path-following steering
//!
//! Entities with a [`PathTarget`] steer toward `target_pos`, slowing down
//! linearly inside `6 * radius`. Within `2 * radius` they have arrived: the
//! next waypoint (if any) becomes the target, otherwise a stopping follower
//! drops its target. Arrival frames add no steering force.

use crate::ecs::components::{PathTarget, Transform};
use crate::ecs::{Frame, System};
use tracing::trace;

/// Arrival distance as a multiple of the entity's radius
pub const ARRIVAL_RADII: f64 = 2.0;

/// Slowdown distance as a multiple of the entity's radius
pub const SLOWDOWN_RADII: f64 = 6.0;

/// Steers path followers toward their targets
#[derive(Debug, Default)]
pub struct PathSystem;

impl PathSystem {
    /// Create a path system
    pub fn new() -> Self {
        PathSystem
    }
}

/// Desired speed at `dist` from the target
fn desired_speed(dist: f64, radius: f64, max_speed: f64) -> f64 {
    let slowdown = radius * SLOWDOWN_RADII;
    if dist < slowdown {
        dist / slowdown * max_speed
    } else {
        max_speed
    }
}

/// Steer one entity; returns false on an arrival frame
fn steer(path: &mut PathTarget, transform: &mut Transform) -> bool {
    let Some(target) = path.target_pos else {
        return false;
    };

    let offset = target - transform.position;
    let dist = offset.length();

    if dist < transform.radius * ARRIVAL_RADII {
        if let Some(next) = path.waypoints.pop_front() {
            path.target_pos = Some(next);
            return false;
        }
        if path.stop_at_target {
            path.target_pos = None;
            return false;
        }
    }

    let speed = desired_speed(dist, transform.radius, transform.max_speed);
    transform.acceleration += offset.normalize_or_zero() * speed * path.strength;
    true
}

impl System for PathSystem {
    fn run(&mut self, frame: &mut Frame<'_>) {
        let components = frame.world.components_mut();
        let transforms = &mut components.transforms;

        for (entity, path) in components.path_targets.iter_mut() {
            let Some(transform) = transforms.get_mut(entity) else {
                continue;
            };
            let had_target = path.target_pos;
            if !steer(path, transform) && had_target.is_some() {
                trace!(%entity, next = ?path.target_pos, "path target reached");
            }
        }
    }

    fn name(&self) -> &str {
        "path"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::{Entity, World};
    use crate::systems::test_support::run_once;
    use glam::DVec2;

    const EPSILON: f64 = 1e-9;

    fn follower(world: &mut World, position: DVec2, path: PathTarget) -> Entity {
        let e = world.create_entity();
        world.add_component(e, Transform::new(position, 5.0, 4.0));
        world.add_component(e, path);
        e
    }

    fn step(world: &mut World) {
        run_once(&mut PathSystem::new(), world, &[], &mut Vec::new());
    }

    #[test]
    fn test_no_target_is_noop() {
        let mut world = World::new();
        let e = follower(&mut world, DVec2::ZERO, PathTarget::default());

        step(&mut world);

        assert_eq!(world.get::<Transform>(e).unwrap().acceleration, DVec2::ZERO);
        assert!(!world.get::<PathTarget>(e).unwrap().is_active());
    }

    #[test]
    fn test_arrival_clears_target() {
        let mut world = World::new();
        let e = follower(
            &mut world,
            DVec2::new(100.0, 100.0),
            PathTarget::new(Some(DVec2::new(105.0, 100.0)), 1.0, true),
        );

        step(&mut world);

        assert!(world.get::<PathTarget>(e).unwrap().target_pos.is_none());
        assert_eq!(world.get::<Transform>(e).unwrap().acceleration, DVec2::ZERO);
    }

    #[test]
    fn test_arrival_advances_waypoint() {
        let mut world = World::new();
        let e = follower(
            &mut world,
            DVec2::ZERO,
            PathTarget::new(Some(DVec2::new(1.0, 0.0)), 1.0, true)
                .with_waypoints([DVec2::new(200.0, 0.0), DVec2::new(200.0, 200.0)]),
        );

        step(&mut world);

        let path = world.get::<PathTarget>(e).unwrap();
        assert_eq!(path.target_pos, Some(DVec2::new(200.0, 0.0)));
        assert_eq!(path.waypoints.len(), 1);
        assert_eq!(world.get::<Transform>(e).unwrap().acceleration, DVec2::ZERO);

        // Steering resumes on the next frame
        step(&mut world);
        let acc = world.get::<Transform>(e).unwrap().acceleration;
        assert!((acc - DVec2::new(4.0, 0.0)).length() < EPSILON);
    }

    #[test]
    fn test_non_stopping_follower_keeps_steering_on_arrival() {
        let mut world = World::new();
        let e = follower(
            &mut world,
            DVec2::ZERO,
            PathTarget::new(Some(DVec2::new(3.0, 4.0)), 1.0, false),
        );

        step(&mut world);

        let path = world.get::<PathTarget>(e).unwrap();
        assert_eq!(path.target_pos, Some(DVec2::new(3.0, 4.0)));

        // dist 5, slowdown 30: speed = 5 / 30 * 4
        let acc = world.get::<Transform>(e).unwrap().acceleration;
        let expected = DVec2::new(0.6, 0.8) * (5.0 / 30.0 * 4.0);
        assert!((acc - expected).length() < EPSILON);
    }

    #[test]
    fn test_full_speed_outside_slowdown() {
        let mut world = World::new();
        let e = follower(
            &mut world,
            DVec2::ZERO,
            PathTarget::new(Some(DVec2::new(0.0, 100.0)), 0.5, true),
        );

        step(&mut world);

        let acc = world.get::<Transform>(e).unwrap().acceleration;
        assert!((acc - DVec2::new(0.0, 2.0)).length() < EPSILON);
    }

    #[test]
    fn test_slowdown_is_linear() {
        assert_eq!(desired_speed(0.0, 5.0, 4.0), 0.0);
        assert!((desired_speed(15.0, 5.0, 4.0) - 2.0).abs() < EPSILON);
        assert_eq!(desired_speed(30.0, 5.0, 4.0), 4.0);
        assert_eq!(desired_speed(300.0, 5.0, 4.0), 4.0);
    }

    #[test]
    fn test_path_without_transform_is_skipped() {
        let mut world = World::new();
        let e = world.create_entity();
        world.add_component(e, PathTarget::new(Some(DVec2::new(50.0, 50.0)), 1.0, true));

        step(&mut world);
        assert_eq!(
            world.get::<PathTarget>(e).unwrap().target_pos,
            Some(DVec2::new(50.0, 50.0))
        );
    }
}
