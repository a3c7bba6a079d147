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
//! Entity builders
//!
//! Every prefab starts from a node (transform, collider, `node` tag) and
//! layers behaviour on top. Builders that add a behaviour also retag the
//! entity so rules can match on it.
//!
//! # Examples
//!
//! ```
//! use glam::DVec2;
//! use particle_sandbox::config::PrefabConfig;
//! use particle_sandbox::ecs::components::{ForceField, Tag};
//! use particle_sandbox::ecs::World;
//! use particle_sandbox::prefabs;
//!
//! let mut world = World::new();
//! let config = PrefabConfig::default();
//! let blob = prefabs::create_blob(&mut world, &config, DVec2::new(100.0, 100.0), ForceField::default());
//! assert_eq!(world.get::<Tag>(blob), Some(&Tag::Attractor));
//! ```

use crate::config::PrefabConfig;
use crate::ecs::components::{Collider, ForceField, ObstacleTag, PathTarget, Tag, Transform, ZoneForce};
use crate::ecs::{Entity, World};
use glam::DVec2;
use serde::{Deserialize, Serialize};

/// Prefabs a rule can spawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Prefab {
    /// Plain node
    Node,
    /// Follower with no target
    #[default]
    Follower,
    /// Obstacle of node radius
    Obstacle,
}

impl Prefab {
    /// Build the prefab at `position`
    pub fn build(&self, world: &mut World, config: &PrefabConfig, position: DVec2) -> Entity {
        match self {
            Prefab::Node => create_node(world, config, position),
            Prefab::Follower => create_follower(world, config, position, None),
            Prefab::Obstacle => create_obstacle(world, position, config.node_radius),
        }
    }
}

/// Base entity: transform, optional circle collider and a `node` tag
///
/// # Panics
///
/// Panics if `radius` is not positive or `max_speed` is negative.
pub fn create_node_with(
    world: &mut World,
    position: DVec2,
    radius: f64,
    max_speed: f64,
    collider: bool,
) -> Entity {
    let entity = world.create_entity();
    world.add_component(entity, Transform::new(position, radius, max_speed));
    if collider {
        world.add_component(entity, Collider::circle());
    }
    world.add_component(entity, Tag::Node);
    entity
}

/// Default-sized collidable node
pub fn create_node(world: &mut World, config: &PrefabConfig, position: DVec2) -> Entity {
    create_node_with(world, position, config.node_radius, config.max_blob_speed, true)
}

/// Attach a radial field and retag the entity as its field kind
pub fn add_force_field(world: &mut World, entity: Entity, field: ForceField) -> Entity {
    world.add_component(entity, field);
    world.add_component(entity, field.kind.tag());
    entity
}

/// Attach steering state
pub fn add_path_follower(world: &mut World, entity: Entity, path: PathTarget) -> Entity {
    world.add_component(entity, path);
    entity
}

/// Attach a zone force
///
/// A `node` (or untagged) entity becomes a `zone`; more specific tags are
/// left alone.
pub fn add_zone_force(world: &mut World, entity: Entity, zone: ZoneForce) -> Entity {
    world.add_component(entity, zone);
    if matches!(world.get::<Tag>(entity), None | Some(Tag::Node)) {
        world.add_component(entity, Tag::Zone);
    }
    entity
}

/// Node carrying a radial field
pub fn create_blob(world: &mut World, config: &PrefabConfig, position: DVec2, field: ForceField) -> Entity {
    let entity = create_node(world, config, position);
    add_force_field(world, entity, field)
}

/// Small fast node tagged `follower`, optionally steering to `target`
pub fn create_follower(
    world: &mut World,
    config: &PrefabConfig,
    position: DVec2,
    target: Option<DVec2>,
) -> Entity {
    let entity = create_node_with(
        world,
        position,
        config.follower_radius,
        config.max_follower_speed,
        true,
    );
    world.add_component(entity, Tag::Follower);
    if let Some(target) = target {
        add_path_follower(world, entity, PathTarget::new(Some(target), 1.0, true));
    }
    entity
}

/// Immovable node tagged `obstacle`
///
/// # Panics
///
/// Panics if `radius` is not positive.
pub fn create_obstacle(world: &mut World, position: DVec2, radius: f64) -> Entity {
    let entity = create_node_with(world, position, radius, 0.0, true);
    world.add_component(entity, ObstacleTag);
    world.add_component(entity, Tag::Obstacle);
    entity
}
