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
//! Collision rule evaluation
//!
//! Every rule is checked against every pair recorded this frame, rules in
//! registration order and pairs in scan order. Actions apply immediately,
//! so a pair whose entity was destroyed by an earlier rule no longer
//! matches anything.

use crate::ecs::components::Transform;
use crate::ecs::{Frame, System};
use crate::rules::Action;
use tracing::{debug, warn};

/// Applies rule actions to this frame's collision pairs
#[derive(Debug, Default)]
pub struct RuleSystem;

impl RuleSystem {
    /// Create a rule system
    pub fn new() -> Self {
        RuleSystem
    }
}

impl System for RuleSystem {
    fn run(&mut self, frame: &mut Frame<'_>) {
        for (index, rule) in frame.rules.iter().enumerate() {
            for &pair in frame.collisions.iter() {
                if !rule.condition.matches(pair, frame.world) {
                    continue;
                }
                debug!(
                    frame = frame.index,
                    rule = index,
                    a = %pair.a,
                    b = %pair.b,
                    action = ?rule.action,
                    "rule fired"
                );

                match &rule.action {
                    Action::Destroy { target } => {
                        frame.world.remove_entity(target.select(pair));
                    }
                    Action::Spawn { prefab } => {
                        let Some(position) = frame.world.get::<Transform>(pair.a).map(|t| t.position) else {
                            warn!(frame = frame.index, rule = index, entity = %pair.a, "spawn source has no transform");
                            continue;
                        };
                        let spawned = prefab.build(frame.world, &frame.config.prefabs, position);
                        debug!(frame = frame.index, rule = index, entity = %spawned, ?prefab, "spawned");
                    }
                }
            }
        }
    }

    fn name(&self) -> &str {
        "rule"
    }
}
