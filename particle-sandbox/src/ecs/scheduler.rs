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
//! Staged system scheduler
//!
//! Systems are grouped into stages that run in ascending order. Systems in
//! the same stage run in the order they were added. The resulting order is
//! total and fixed, which the sandbox relies on: forces must be accumulated
//! before integration, and rules only see pairs the collision stage
//! produced in the same frame.

use crate::ecs::system::{Frame, System};
use tracing::trace;

/// Stage identifier for grouping systems
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StageId(pub usize);

impl StageId {
    /// Create a new stage ID
    pub fn new(id: usize) -> Self {
        StageId(id)
    }
}

/// Standard sandbox stages
pub mod stages {
    use super::StageId;

    /// Radial and zone force accumulation
    pub const FORCES: StageId = StageId(0);

    /// Path-following steering
    pub const STEERING: StageId = StageId(1);

    /// Velocity and position integration
    pub const INTEGRATION: StageId = StageId(2);

    /// Collision detection and response
    pub const COLLISION: StageId = StageId(3);

    /// Collision rule evaluation
    pub const RULES: StageId = StageId(4);
}

/// A system with metadata for scheduling
struct ScheduledSystem {
    system: Box<dyn System>,
    stage: StageId,
}

/// Runs systems stage by stage
///
/// # Examples
///
/// ```
/// use particle_sandbox::ecs::scheduler::{Scheduler, stages};
/// use particle_sandbox::ecs::{Frame, System};
///
/// struct MySystem;
/// impl System for MySystem {
///     fn run(&mut self, _frame: &mut Frame<'_>) {}
/// }
///
/// let mut scheduler = Scheduler::new();
/// scheduler.add_system(MySystem, stages::INTEGRATION);
/// assert_eq!(scheduler.system_count(), 1);
/// ```
pub struct Scheduler {
    /// Kept sorted by stage; ties keep insertion order
    systems: Vec<ScheduledSystem>,
}

impl Scheduler {
    /// Create a new scheduler
    pub fn new() -> Self {
        Scheduler {
            systems: Vec::new(),
        }
    }

    /// Add a system to a specific stage
    ///
    /// The system runs after every system already registered in the same
    /// or an earlier stage.
    pub fn add_system<S: System + 'static>(&mut self, system: S, stage: StageId) {
        let position = self.systems.partition_point(|s| s.stage <= stage);
        self.systems.insert(
            position,
            ScheduledSystem {
                system: Box::new(system),
                stage,
            },
        );
    }

    /// Get the number of registered systems
    pub fn system_count(&self) -> usize {
        self.systems.len()
    }

    /// Get the number of stages in use
    pub fn stage_count(&self) -> usize {
        self.systems
            .iter()
            .map(|s| s.stage.0 + 1)
            .max()
            .unwrap_or(0)
    }

    /// System names in execution order
    pub fn system_names(&self) -> Vec<&str> {
        self.systems.iter().map(|s| s.system.name()).collect()
    }

    /// Run every system once, in stage order
    pub fn run(&mut self, frame: &mut Frame<'_>) {
        for scheduled in &mut self.systems {
            trace!(system = scheduled.system.name(), stage = scheduled.stage.0, "running system");
            scheduled.system.run(frame);
        }
    }

    /// Clear all systems from the scheduler
    pub fn clear(&mut self) {
        self.systems.clear();
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}
