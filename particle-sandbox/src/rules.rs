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
//! Declarative collision rules
//!
//! A rule binds a condition over this frame's collision pairs to an action
//! on the store. Matching is order-sensitive: `tag_a` is compared against
//! the first entity of the recorded pair and `tag_b` against the second.

use crate::ecs::components::Tag;
use crate::ecs::{CollisionPair, Entity, World};
use crate::prefabs::Prefab;
use serde::{Deserialize, Serialize};

/// When a rule fires
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Condition {
    /// A pair whose first entity is tagged `tag_a` and second `tag_b`
    Collision {
        /// Tag of the pair's first entity
        #[serde(rename = "tagA")]
        tag_a: Tag,
        /// Tag of the pair's second entity
        #[serde(rename = "tagB")]
        tag_b: Tag,
    },
}

impl Condition {
    /// Shorthand for a collision condition
    pub fn collision(tag_a: impl Into<Tag>, tag_b: impl Into<Tag>) -> Self {
        Condition::Collision {
            tag_a: tag_a.into(),
            tag_b: tag_b.into(),
        }
    }

    /// Check a pair against the condition
    ///
    /// Entities without a tag (including ones removed earlier this frame)
    /// never match.
    pub fn matches(&self, pair: CollisionPair, world: &World) -> bool {
        match self {
            Condition::Collision { tag_a, tag_b } => {
                world.get::<Tag>(pair.a) == Some(tag_a) && world.get::<Tag>(pair.b) == Some(tag_b)
            }
        }
    }
}

/// Which member of a pair an action targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Target {
    /// The pair's first entity
    A,
    /// The pair's second entity
    B,
}

impl Target {
    /// Pick the targeted entity out of a pair
    pub fn select(&self, pair: CollisionPair) -> Entity {
        match self {
            Target::A => pair.a,
            Target::B => pair.b,
        }
    }
}

/// What a rule does when it fires
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Action {
    /// Remove one member of the pair from the store
    Destroy {
        /// Member to remove
        target: Target,
    },
    /// Build a prefab at the first member's position
    Spawn {
        /// Prefab to build
        #[serde(default)]
        prefab: Prefab,
    },
}

impl Action {
    /// Destroy one member of the pair
    pub fn destroy(target: Target) -> Self {
        Action::Destroy { target }
    }

    /// Spawn the default prefab (a follower)
    pub fn spawn() -> Self {
        Action::Spawn {
            prefab: Prefab::default(),
        }
    }
}

/// Condition → action binding
///
/// # Examples
///
/// ```
/// use particle_sandbox::rules::{Action, Condition, Rule, Target};
///
/// let rule = Rule::new(
///     Condition::collision("attractor", "follower"),
///     Action::destroy(Target::B),
/// );
/// let json = serde_json::to_string(&rule).unwrap();
/// assert!(json.contains("\"tagA\":\"attractor\""));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    /// When to fire
    #[serde(rename = "if")]
    pub condition: Condition,
    /// What to do
    #[serde(rename = "then")]
    pub action: Action,
}

impl Rule {
    /// Create a rule
    pub fn new(condition: Condition, action: Action) -> Self {
        Rule { condition, action }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_condition_is_order_sensitive() {
        let mut world = World::new();
        let attractor = world.create_entity();
        let follower = world.create_entity();
        world.add_component(attractor, Tag::Attractor);
        world.add_component(follower, Tag::Follower);

        let condition = Condition::collision("attractor", "follower");
        assert!(condition.matches(CollisionPair::new(attractor, follower), &world));
        assert!(!condition.matches(CollisionPair::new(follower, attractor), &world));
    }

    #[test]
    fn test_condition_untagged_never_matches() {
        let mut world = World::new();
        let a = world.create_entity();
        let b = world.create_entity();
        world.add_component(a, Tag::Attractor);

        let condition = Condition::collision("attractor", "follower");
        assert!(!condition.matches(CollisionPair::new(a, b), &world));

        // Removed entity behaves like an untagged one
        world.add_component(b, Tag::Follower);
        world.remove_entity(b);
        assert!(!condition.matches(CollisionPair::new(a, b), &world));
    }

    #[test]
    fn test_custom_tags_match() {
        let mut world = World::new();
        let a = world.create_entity();
        let b = world.create_entity();
        world.add_component(a, Tag::from("goal"));
        world.add_component(b, Tag::from("ball"));

        assert!(Condition::collision("goal", "ball").matches(CollisionPair::new(a, b), &world));
    }

    #[test]
    fn test_target_select() {
        let pair = CollisionPair::new(Entity::new(1), Entity::new(2));
        assert_eq!(Target::A.select(pair), Entity::new(1));
        assert_eq!(Target::B.select(pair), Entity::new(2));
    }

    #[test]
    fn test_rule_json_shape() {
        let rule = Rule::new(
            Condition::collision("attractor", "follower"),
            Action::destroy(Target::B),
        );
        let value = serde_json::to_value(&rule).unwrap();
        assert_eq!(
            value,
            json!({
                "if": { "type": "collision", "tagA": "attractor", "tagB": "follower" },
                "then": { "type": "destroy", "target": "b" }
            })
        );
    }

    #[test]
    fn test_spawn_defaults_to_follower() {
        let rule: Rule = serde_json::from_value(json!({
            "if": { "type": "collision", "tagA": "zone", "tagB": "node" },
            "then": { "type": "spawn" }
        }))
        .unwrap();
        assert_eq!(rule.action, Action::Spawn { prefab: Prefab::Follower });
        assert_eq!(rule.action, Action::spawn());
    }
}
