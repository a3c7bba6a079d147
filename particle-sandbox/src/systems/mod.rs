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
//! Per-frame sandbox systems
//!
//! One system per stage of the frame pipeline:
//!
//! - [`ForceSystem`]: radial force fields and directional zones
//! - [`PathSystem`]: steering toward targets and waypoints
//! - [`PhysicsSystem`]: velocity and position integration with wall reflection
//! - [`CollisionSystem`]: pairwise circle overlap and elastic response
//! - [`RuleSystem`]: collision rules over this frame's pairs

mod collision;
mod force;
mod path;
mod physics;
mod rule;

pub use collision::CollisionSystem;
pub use force::ForceSystem;
pub use path::PathSystem;
pub use physics::PhysicsSystem;
pub use rule::RuleSystem;

use crate::ecs::scheduler::stages;
use crate::ecs::Scheduler;

/// Register the five core systems in their standard stages
pub fn register_core_systems(scheduler: &mut Scheduler) {
    scheduler.add_system(ForceSystem::new(), stages::FORCES);
    scheduler.add_system(PathSystem::new(), stages::STEERING);
    scheduler.add_system(PhysicsSystem::new(), stages::INTEGRATION);
    scheduler.add_system(CollisionSystem::new(), stages::COLLISION);
    scheduler.add_system(RuleSystem::new(), stages::RULES);
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_systems_order() {
        let mut scheduler = Scheduler::new();
        register_core_systems(&mut scheduler);

        assert_eq!(scheduler.system_count(), 5);
        assert_eq!(
            scheduler.system_names(),
            vec!["force", "path", "physics", "collision", "rule"]
        );
    }
}
