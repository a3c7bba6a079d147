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
//! Circle collision detection and response
//!
//! Every unordered pair of collidable entities is tested, in Collider table
//! order (outer index before inner). Overlapping pairs are pushed apart
//! along the contact normal by half the overlap each and have their
//! velocities reflected about it. Obstacles keep both position and
//! velocity. Each overlapping pair is recorded for the rule stage.
//!
//! A Collider on an entity without a Transform is ignored.
//!
//! # Complexity
//!
//! O(N²) in the number of colliders. There is no broad phase.

use crate::ecs::components::Transform;
use crate::ecs::{CollisionPair, Entity, Frame, System};
use glam::DVec2;
use tracing::trace;

/// Detects and resolves circle overlaps
#[derive(Debug, Default)]
pub struct CollisionSystem {
    candidates: Vec<(Entity, bool)>,
}

impl CollisionSystem {
    /// Create a collision system
    pub fn new() -> Self {
        Self::default()
    }
}

/// Reflect `velocity` about the plane with unit normal `normal`
fn reflect(velocity: DVec2, normal: DVec2) -> DVec2 {
    velocity - 2.0 * velocity.dot(normal) * normal
}

impl System for CollisionSystem {
    fn run(&mut self, frame: &mut Frame<'_>) {
        let components = frame.world.components_mut();

        // Ids are collected first so resolution can borrow transforms mutably
        self.candidates.clear();
        self.candidates.extend(
            components
                .colliders
                .entities()
                .iter()
                .filter(|&&entity| components.transforms.contains(entity))
                .map(|&entity| (entity, components.obstacles.contains(entity))),
        );

        let transforms = &mut components.transforms;
        for (i, &(id_a, a_is_obstacle)) in self.candidates.iter().enumerate() {
            for &(id_b, b_is_obstacle) in &self.candidates[i + 1..] {
                let Some((a, b)) = transforms.get_pair_mut(id_a, id_b) else {
                    continue;
                };

                let offset = b.position - a.position;
                let dist_sq = offset.length_squared();
                let min_dist = a.radius + b.radius;
                if dist_sq >= min_dist * min_dist {
                    continue;
                }

                let normal = offset.normalize_or_zero();
                let overlap = min_dist - dist_sq.sqrt();
                let push = normal * (overlap * 0.5);

                if !a_is_obstacle {
                    a.position -= push;
                    a.velocity = reflect(a.velocity, normal);
                }
                if !b_is_obstacle {
                    b.position += push;
                    b.velocity = reflect(b.velocity, -normal);
                }

                trace!(a = %id_a, b = %id_b, overlap, "collision");
                frame.collisions.push(CollisionPair::new(id_a, id_b));
            }
        }
    }

    fn name(&self) -> &str {
        "collision"
    }
}
