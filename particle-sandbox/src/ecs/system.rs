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
//! System execution framework
//!
//! Systems contain the per-frame logic. Each one gets exclusive access to a
//! [`Frame`]: the world, the read-only configuration, the rule list and the
//! collision buffer shared between the collision and rule passes.

use crate::config::SimConfig;
use crate::ecs::{Entity, World};
use crate::rules::Rule;
use serde::{Deserialize, Serialize};

/// Two entities found overlapping this frame, in scan order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CollisionPair {
    /// Entity from the outer loop of the scan
    pub a: Entity,
    /// Entity from the inner loop of the scan
    pub b: Entity,
}

impl CollisionPair {
    /// Create a pair
    pub fn new(a: Entity, b: Entity) -> Self {
        CollisionPair { a, b }
    }
}

/// Everything a system may touch during one update
pub struct Frame<'a> {
    /// Component store
    pub world: &'a mut World,
    /// Fixed timestep, bounds and prefab defaults
    pub config: &'a SimConfig,
    /// Rules in registration order
    pub rules: &'a [Rule],
    /// Pairs recorded by collision resolution this frame
    pub collisions: &'a mut Vec<CollisionPair>,
    /// Index of the frame being computed, starting at 0
    pub index: u64,
}

/// Trait for systems that operate on the sandbox each frame
pub trait System: Send + Sync {
    /// Execute the system for one frame
    fn run(&mut self, frame: &mut Frame<'_>);

    /// Get the name of this system for debugging
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct CountingSystem {
        run_count: usize,
    }

    impl System for CountingSystem {
        fn run(&mut self, frame: &mut Frame<'_>) {
            self.run_count += 1;
            frame.world.create_entity();
        }
    }

    #[test]
    fn test_system_runs_against_frame() {
        let mut world = World::new();
        let config = SimConfig::default();
        let mut collisions = Vec::new();
        let mut system = CountingSystem { run_count: 0 };

        let mut frame = Frame {
            world: &mut world,
            config: &config,
            rules: &[],
            collisions: &mut collisions,
            index: 0,
        };
        system.run(&mut frame);
        system.run(&mut frame);

        assert_eq!(system.run_count, 2);
        assert_eq!(world.entity_count(), 2);
        assert!(system.name().contains("CountingSystem"));
    }
}
