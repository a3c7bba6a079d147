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
//! World snapshots
//!
//! A snapshot is every component table, in kind order, with each table's
//! entries in insertion order, plus the rule list. Restoring it reproduces
//! the tables exactly, including iteration order, so a restored world
//! steps identically to the one it was taken from.
//!
//! The JSON form is:
//!
//! ```json
//! {
//!   "tables": [
//!     { "kind": "Transform", "entries": [[1, { "position": [0.0, 0.0], ... }]] },
//!     { "kind": "Tag", "entries": [[1, "node"]] }
//!   ],
//!   "rules": []
//! }
//! ```
//!
//! Entities that carry no components are not recorded.

use crate::ecs::components::{
    Collider, ComponentKind, Components, ForceField, ObstacleTag, PathTarget, Tag, Transform,
    ZoneForce,
};
use crate::ecs::{Component, ComponentTable, Entity, World};
use crate::error::{Result, SandboxError};
use crate::rules::Rule;
use serde::{Deserialize, Serialize};

/// One component table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "entries")]
pub enum TableSnapshot {
    /// Transform entries
    Transform(Vec<(Entity, Transform)>),
    /// Collider entries
    Collider(Vec<(Entity, Collider)>),
    /// ObstacleTag entries
    ObstacleTag(Vec<(Entity, ObstacleTag)>),
    /// Tag entries
    Tag(Vec<(Entity, Tag)>),
    /// ForceField entries
    ForceField(Vec<(Entity, ForceField)>),
    /// ZoneForce entries
    ZoneForce(Vec<(Entity, ZoneForce)>),
    /// PathTarget entries
    PathTarget(Vec<(Entity, PathTarget)>),
}

impl TableSnapshot {
    /// Copy one kind's table out of the store
    pub fn capture(components: &Components, kind: ComponentKind) -> Self {
        fn entries<T: Clone>(table: &ComponentTable<T>) -> Vec<(Entity, T)> {
            table.iter().map(|(entity, c)| (entity, c.clone())).collect()
        }

        match kind {
            ComponentKind::Transform => TableSnapshot::Transform(entries(&components.transforms)),
            ComponentKind::Collider => TableSnapshot::Collider(entries(&components.colliders)),
            ComponentKind::ObstacleTag => TableSnapshot::ObstacleTag(entries(&components.obstacles)),
            ComponentKind::Tag => TableSnapshot::Tag(entries(&components.tags)),
            ComponentKind::ForceField => TableSnapshot::ForceField(entries(&components.force_fields)),
            ComponentKind::ZoneForce => TableSnapshot::ZoneForce(entries(&components.zone_forces)),
            ComponentKind::PathTarget => TableSnapshot::PathTarget(entries(&components.path_targets)),
        }
    }

    /// Kind of the table
    pub fn kind(&self) -> ComponentKind {
        match self {
            TableSnapshot::Transform(_) => ComponentKind::Transform,
            TableSnapshot::Collider(_) => ComponentKind::Collider,
            TableSnapshot::ObstacleTag(_) => ComponentKind::ObstacleTag,
            TableSnapshot::Tag(_) => ComponentKind::Tag,
            TableSnapshot::ForceField(_) => ComponentKind::ForceField,
            TableSnapshot::ZoneForce(_) => ComponentKind::ZoneForce,
            TableSnapshot::PathTarget(_) => ComponentKind::PathTarget,
        }
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        match self {
            TableSnapshot::Transform(entries) => entries.len(),
            TableSnapshot::Collider(entries) => entries.len(),
            TableSnapshot::ObstacleTag(entries) => entries.len(),
            TableSnapshot::Tag(entries) => entries.len(),
            TableSnapshot::ForceField(entries) => entries.len(),
            TableSnapshot::ZoneForce(entries) => entries.len(),
            TableSnapshot::PathTarget(entries) => entries.len(),
        }
    }

    /// Check if the table has no entries
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Entity ids in entry order
    pub fn entities(&self) -> Vec<Entity> {
        fn ids<T>(entries: &[(Entity, T)]) -> Vec<Entity> {
            entries.iter().map(|(entity, _)| *entity).collect()
        }

        match self {
            TableSnapshot::Transform(entries) => ids(entries),
            TableSnapshot::Collider(entries) => ids(entries),
            TableSnapshot::ObstacleTag(entries) => ids(entries),
            TableSnapshot::Tag(entries) => ids(entries),
            TableSnapshot::ForceField(entries) => ids(entries),
            TableSnapshot::ZoneForce(entries) => ids(entries),
            TableSnapshot::PathTarget(entries) => ids(entries),
        }
    }

    /// Reject values that break component invariants
    pub fn validate(&self) -> Result<()> {
        let kind = self.kind();
        let invalid = |entity: Entity, reason: &str| SandboxError::InvalidComponent {
            kind,
            entity,
            reason: reason.to_string(),
        };

        if let Some(entity) = self.entities().into_iter().find(|&e| e > Entity::MAX) {
            return Err(invalid(entity, "entity id is out of range"));
        }

        match self {
            TableSnapshot::Transform(entries) => {
                for (entity, t) in entries {
                    if !t.is_valid() {
                        return Err(invalid(*entity, "needs finite vectors, radius > 0 and max speed >= 0"));
                    }
                }
            }
            TableSnapshot::ForceField(entries) => {
                for (entity, field) in entries {
                    if !field.strength.is_finite() {
                        return Err(invalid(*entity, "strength must be finite"));
                    }
                    if !(field.range_mul > 0.0 && field.range_mul.is_finite()) {
                        return Err(invalid(*entity, "range multiplier must be positive and finite"));
                    }
                }
            }
            TableSnapshot::ZoneForce(entries) => {
                for (entity, zone) in entries {
                    if !(zone.direction.is_finite() && zone.strength.is_finite()) {
                        return Err(invalid(*entity, "direction and strength must be finite"));
                    }
                    if !(zone.radius > 0.0 && zone.radius.is_finite()) {
                        return Err(invalid(*entity, "radius must be positive and finite"));
                    }
                }
            }
            TableSnapshot::PathTarget(entries) => {
                for (entity, path) in entries {
                    let target_ok = path.target_pos.map_or(true, |p| p.is_finite());
                    if !(target_ok && path.waypoints.iter().all(|w| w.is_finite()) && path.strength.is_finite()) {
                        return Err(invalid(*entity, "target, waypoints and strength must be finite"));
                    }
                }
            }
            TableSnapshot::Collider(_) | TableSnapshot::ObstacleTag(_) | TableSnapshot::Tag(_) => {}
        }
        Ok(())
    }

    /// Insert every entry into `world`, in order
    fn restore(self, world: &mut World) {
        match self {
            TableSnapshot::Transform(entries) => insert_all(world, entries),
            TableSnapshot::Collider(entries) => insert_all(world, entries),
            TableSnapshot::ObstacleTag(entries) => insert_all(world, entries),
            TableSnapshot::Tag(entries) => insert_all(world, entries),
            TableSnapshot::ForceField(entries) => insert_all(world, entries),
            TableSnapshot::ZoneForce(entries) => insert_all(
                world,
                entries
                    .into_iter()
                    .map(|(e, z)| (e, ZoneForce::new(z.direction, z.strength, z.radius))),
            ),
            TableSnapshot::PathTarget(entries) => insert_all(world, entries),
        }
    }
}

fn insert_all<T: Component>(world: &mut World, entries: impl IntoIterator<Item = (Entity, T)>) {
    for (entity, component) in entries {
        world.insert_restored(entity, component);
    }
}

/// Complete serialisable world state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Component tables in kind order
    pub tables: Vec<TableSnapshot>,
    /// Rules in registration order
    #[serde(default)]
    pub rules: Vec<Rule>,
}

impl Snapshot {
    /// Capture every table of `world` and the given rules
    pub fn capture(world: &World, rules: &[Rule]) -> Self {
        Snapshot {
            tables: ComponentKind::ALL
                .into_iter()
                .map(|kind| TableSnapshot::capture(world.components(), kind))
                .collect(),
            rules: rules.to_vec(),
        }
    }

    /// Total number of component entries
    pub fn component_count(&self) -> usize {
        self.tables.iter().map(TableSnapshot::len).sum()
    }

    /// Check every table
    pub fn validate(&self) -> Result<()> {
        self.tables.iter().try_for_each(TableSnapshot::validate)
    }

    /// Replace the contents of `world` with this snapshot's tables
    ///
    /// Validation happens first, so an invalid snapshot leaves `world`
    /// untouched. The world's id counter moves past every restored id.
    pub fn restore(self, world: &mut World) -> Result<Vec<Rule>> {
        self.validate()?;
        world.clear();
        for table in self.tables {
            table.restore(world);
        }
        Ok(self.rules)
    }

    /// Encode as JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Decode from JSON without validating
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
