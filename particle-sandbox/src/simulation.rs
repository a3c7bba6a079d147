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
//! Frame driver
//!
//! [`Simulation`] owns the component store, the staged system pipeline,
//! the configuration, the rule list and the per-frame collision buffer.
//! One call to [`Simulation::update`] runs force, path, physics, collision
//! and rule systems to completion, in that order.

use crate::config::SimConfig;
use crate::ecs::components::ComponentValue;
use crate::ecs::{CollisionPair, Component, ComponentTable, Entity, Frame, Scheduler, World};
use crate::error::Result;
use crate::rules::Rule;
use crate::snapshot::Snapshot;
use crate::systems::register_core_systems;
use tracing::{debug, info, trace_span};

/// A running sandbox
///
/// # Examples
///
/// ```
/// use glam::DVec2;
/// use particle_sandbox::config::SimConfig;
/// use particle_sandbox::ecs::components::{ForceField, Transform};
/// use particle_sandbox::Simulation;
///
/// let mut sim = Simulation::new(SimConfig::default());
/// let source = sim.create_entity();
/// sim.add_component(source, Transform::new(DVec2::new(100.0, 100.0), 20.0, 2.0));
/// sim.add_component(source, ForceField::default());
///
/// let target = sim.create_entity();
/// sim.add_component(target, Transform::new(DVec2::new(135.0, 100.0), 10.0, 2.0));
///
/// sim.update();
/// let moved = sim.world().get::<Transform>(target).unwrap();
/// assert!(moved.position.x < 135.0);
/// ```
pub struct Simulation {
    world: World,
    scheduler: Scheduler,
    config: SimConfig,
    rules: Vec<Rule>,
    collisions: Vec<CollisionPair>,
    frame: u64,
}

impl Simulation {
    /// Create an empty simulation with the core systems installed
    ///
    /// # Panics
    ///
    /// Panics if `config` fails validation. Use `try_new` for fallible
    /// construction.
    pub fn new(config: SimConfig) -> Self {
        match Self::try_new(config) {
            Ok(sim) => sim,
            Err(err) => panic!("{err}"),
        }
    }

    /// Create an empty simulation, rejecting an invalid configuration
    pub fn try_new(config: SimConfig) -> Result<Self> {
        config.validate()?;
        let mut scheduler = Scheduler::new();
        register_core_systems(&mut scheduler);
        Ok(Simulation {
            world: World::new(),
            scheduler,
            config,
            rules: Vec::new(),
            collisions: Vec::new(),
            frame: 0,
        })
    }

    /// Run one frame
    pub fn update(&mut self) {
        let _span = trace_span!("frame", frame = self.frame).entered();
        self.collisions.clear();

        let mut frame = Frame {
            world: &mut self.world,
            config: &self.config,
            rules: &self.rules,
            collisions: &mut self.collisions,
            index: self.frame,
        };
        self.scheduler.run(&mut frame);
        self.frame += 1;
    }

    /// Create a new entity with no components
    pub fn create_entity(&mut self) -> Entity {
        self.world.create_entity()
    }

    /// Insert or replace a component, returning the previous value
    pub fn add_component<T: Component>(&mut self, entity: Entity, component: T) -> Option<T> {
        self.world.add_component(entity, component)
    }

    /// Kind-erased [`add_component`](Self::add_component)
    pub fn insert_value(&mut self, entity: Entity, value: ComponentValue) {
        self.world.insert_value(entity, value);
    }

    /// Full table of one kind
    pub fn table<T: Component>(&self) -> &ComponentTable<T> {
        self.world.table()
    }

    /// Mutable table of one kind
    pub fn table_mut<T: Component>(&mut self) -> &mut ComponentTable<T> {
        self.world.table_mut()
    }

    /// Table by kind name; unknown names yield an empty list
    pub fn table_by_name(&self, name: &str) -> Vec<(Entity, ComponentValue)> {
        self.world.table_by_name(name)
    }

    /// Destroy an entity; unknown ids are ignored
    pub fn remove_entity(&mut self, entity: Entity) -> bool {
        self.world.remove_entity(entity)
    }

    /// Append a rule; it is evaluated after the ones already registered
    pub fn add_rule(&mut self, rule: Rule) {
        debug!(index = self.rules.len(), ?rule, "added rule");
        self.rules.push(rule);
    }

    /// Remove the rule at `index`; out-of-range is a no-op
    pub fn remove_rule(&mut self, index: usize) -> Option<Rule> {
        if index >= self.rules.len() {
            return None;
        }
        let rule = self.rules.remove(index);
        debug!(index, ?rule, "removed rule");
        Some(rule)
    }

    /// Rules in evaluation order
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Pairs recorded during the last completed frame
    pub fn collisions(&self) -> &[CollisionPair] {
        &self.collisions
    }

    /// Number of frames completed
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// The component store
    pub fn world(&self) -> &World {
        &self.world
    }

    /// The component store, mutably
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// Active configuration
    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Capture the world and rules
    pub fn snapshot(&self) -> Snapshot {
        Snapshot::capture(&self.world, &self.rules)
    }

    /// Serialise the world and rules to JSON
    pub fn export_snapshot(&self) -> Result<String> {
        let snapshot = self.snapshot();
        let json = snapshot.to_json()?;
        info!(
            components = snapshot.component_count(),
            rules = snapshot.rules.len(),
            bytes = json.len(),
            "exported snapshot"
        );
        Ok(json)
    }

    /// Replace the world and rules with a JSON snapshot
    ///
    /// On error the simulation is left unchanged.
    pub fn import_snapshot(&mut self, json: &str) -> Result<()> {
        let snapshot = Snapshot::from_json(json)?;
        self.restore(snapshot)
    }

    /// Replace the world and rules with `snapshot`
    pub fn restore(&mut self, snapshot: Snapshot) -> Result<()> {
        let components = snapshot.component_count();
        self.rules = snapshot.restore(&mut self.world)?;
        self.collisions.clear();
        info!(
            components,
            entities = self.world.entity_count(),
            rules = self.rules.len(),
            "imported snapshot"
        );
        Ok(())
    }
}

impl Default for Simulation {
    fn default() -> Self {
        Self::new(SimConfig::default())
    }
}
