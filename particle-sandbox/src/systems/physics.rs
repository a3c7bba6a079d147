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
//! Semi-implicit Euler integration
//!
//! # Algorithm
//!
//! For each transform:
//! 1. v(t+dt) = clamp(v(t) + a(t), max_speed)
//! 2. x(t+dt) = x(t) + v(t+dt) * dt * 60
//! 3. a = 0
//!
//! Velocity is in units per 60 Hz frame, hence the `* 60` on the position
//! step. Walls reflect: once a circle's edge is past a wall, the velocity
//! component into that wall is negated. Position is never clamped.

use crate::config::Bounds;
use crate::ecs::components::Transform;
use crate::ecs::{Frame, System};
use glam::DVec2;

/// Integrates velocity and position, then reflects off the world bounds
#[derive(Debug, Default)]
pub struct PhysicsSystem;

impl PhysicsSystem {
    /// Create a physics system
    pub fn new() -> Self {
        PhysicsSystem
    }
}

/// Advance one transform by one step
pub fn integrate(transform: &mut Transform, motion_scale: f64, bounds: Bounds) {
    transform.velocity = (transform.velocity + transform.acceleration).clamp_length_max(transform.max_speed);
    transform.position += transform.velocity * motion_scale;
    transform.acceleration = DVec2::ZERO;

    let DVec2 { x, y } = transform.position;
    let r = transform.radius;
    if x < r || x > bounds.width - r {
        transform.velocity.x = -transform.velocity.x;
    }
    if y < r || y > bounds.height - r {
        transform.velocity.y = -transform.velocity.y;
    }
}

impl System for PhysicsSystem {
    fn run(&mut self, frame: &mut Frame<'_>) {
        let motion_scale = frame.config.motion_scale();
        let bounds = frame.config.bounds;

        for (_, transform) in frame.world.table_mut::<Transform>().iter_mut() {
            integrate(transform, motion_scale, bounds);
        }
    }

    fn name(&self) -> &str {
        "physics"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimConfig;
    use crate::ecs::{Entity, World};
    use crate::systems::test_support::{run_once, run_with_config};

    const EPSILON: f64 = 1e-9;

    fn spawn(world: &mut World, position: DVec2, velocity: DVec2, max_speed: f64) -> Entity {
        let e = world.create_entity();
        world.add_component(e, Transform::new(position, 5.0, max_speed).with_velocity(velocity));
        e
    }

    #[test]
    fn test_acceleration_applied_then_reset() {
        let mut world = World::new();
        let e = spawn(&mut world, DVec2::new(100.0, 100.0), DVec2::ZERO, 10.0);
        world.get_mut::<Transform>(e).unwrap().acceleration = DVec2::new(1.0, 2.0);

        run_once(&mut PhysicsSystem::new(), &mut world, &[], &mut Vec::new());

        let t = world.get::<Transform>(e).unwrap();
        assert!((t.velocity - DVec2::new(1.0, 2.0)).length() < EPSILON);
        assert!((t.position - DVec2::new(101.0, 102.0)).length() < EPSILON);
        assert_eq!(t.acceleration, DVec2::ZERO);
    }

    #[test]
    fn test_speed_clamped() {
        let mut world = World::new();
        let e = spawn(&mut world, DVec2::new(100.0, 100.0), DVec2::new(30.0, 40.0), 5.0);

        run_once(&mut PhysicsSystem::new(), &mut world, &[], &mut Vec::new());

        let t = world.get::<Transform>(e).unwrap();
        assert!((t.velocity.length() - 5.0).abs() < EPSILON);
        assert!((t.velocity - DVec2::new(3.0, 4.0)).length() < EPSILON);
    }

    #[test]
    fn test_zero_max_speed_never_moves() {
        let mut world = World::new();
        let e = spawn(&mut world, DVec2::new(50.0, 50.0), DVec2::new(3.0, 0.0), 0.0);
        world.get_mut::<Transform>(e).unwrap().acceleration = DVec2::new(9.0, 9.0);

        run_once(&mut PhysicsSystem::new(), &mut world, &[], &mut Vec::new());

        let t = world.get::<Transform>(e).unwrap();
        assert_eq!(t.velocity, DVec2::ZERO);
        assert_eq!(t.position, DVec2::new(50.0, 50.0));
    }

    #[test]
    fn test_timestep_scales_motion() {
        let mut world = World::new();
        let e = spawn(&mut world, DVec2::new(100.0, 100.0), DVec2::new(2.0, 0.0), 10.0);
        let config = SimConfig::default().with_timestep(1.0 / 30.0);

        run_with_config(&mut PhysicsSystem::new(), &mut world, &config, &[], &mut Vec::new());

        let t = world.get::<Transform>(e).unwrap();
        assert!((t.position.x - 104.0).abs() < EPSILON);
    }

    #[test]
    fn test_wall_reflection() {
        let mut world = World::new();
        // Moving into the left wall
        let left = spawn(&mut world, DVec2::new(5.5, 100.0), DVec2::new(-1.0, 0.0), 10.0);
        // Moving into the bottom wall (height 720)
        let bottom = spawn(&mut world, DVec2::new(100.0, 714.5), DVec2::new(0.0, 1.0), 10.0);
        // Well inside
        let inside = spawn(&mut world, DVec2::new(640.0, 360.0), DVec2::new(1.0, 1.0), 10.0);

        run_once(&mut PhysicsSystem::new(), &mut world, &[], &mut Vec::new());

        let t = world.get::<Transform>(left).unwrap();
        assert!((t.position.x - 4.5).abs() < EPSILON);
        assert_eq!(t.velocity, DVec2::new(1.0, 0.0));

        let t = world.get::<Transform>(bottom).unwrap();
        assert!((t.position.y - 715.5).abs() < EPSILON);
        assert_eq!(t.velocity, DVec2::new(0.0, -1.0));

        let t = world.get::<Transform>(inside).unwrap();
        assert_eq!(t.velocity, DVec2::new(1.0, 1.0));
    }

    #[test]
    fn test_reflection_is_not_a_clamp() {
        let mut t = Transform::new(DVec2::new(1279.0, 360.0), 5.0, 10.0).with_velocity(DVec2::new(3.0, 0.0));
        integrate(&mut t, 1.0, Bounds::default());

        // Overshoots the right wall; only the velocity turns around
        assert!((t.position.x - 1282.0).abs() < EPSILON);
        assert_eq!(t.velocity.x, -3.0);

        integrate(&mut t, 1.0, Bounds::default());
        assert!((t.position.x - 1279.0).abs() < EPSILON);
    }
}
