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
//! Component storage
//!
//! Every component kind lives in its own [`ComponentTable`]: a dense array of
//! values with a sparse entity-to-slot index. Tables iterate in insertion
//! order, and removal shifts later entries down instead of swapping, so the
//! order systems observe is stable for the lifetime of the entries. The
//! collision scan depends on that for reproducible pair order.

use crate::ecs::components::{ComponentKind, ComponentValue, Components};
use crate::ecs::Entity;
use std::collections::HashMap;

/// Trait implemented by every component type
///
/// Ties a Rust type to its [`ComponentKind`] and to the table that stores it
/// inside [`Components`], which is what lets the store offer typed access
/// without any runtime type lookup.
pub trait Component: Clone + Send + Sync + 'static {
    /// The kind this type is stored under
    const KIND: ComponentKind;

    /// Borrow this kind's table
    fn table(components: &Components) -> &ComponentTable<Self>;

    /// Mutably borrow this kind's table
    fn table_mut(components: &mut Components) -> &mut ComponentTable<Self>;

    /// Wrap the value in the kind-erased union
    fn into_value(self) -> ComponentValue;
}

/// Kind-erased view over one component table
///
/// Lets the store walk all tables uniformly when an entity is removed or
/// when the whole store is summarised.
pub trait ComponentStorage: Send + Sync {
    /// Kind stored in this table
    fn kind(&self) -> ComponentKind;

    /// Number of entries
    fn len(&self) -> usize;

    /// Check if the table is empty
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Check if an entity has an entry in this table
    fn contains(&self, entity: Entity) -> bool;

    /// Drop the entity's entry, returning whether one existed
    fn remove_entity(&mut self, entity: Entity) -> bool;

    /// Entities with an entry, in iteration order
    fn entity_ids(&self) -> &[Entity];

    /// Clear all entries
    fn clear(&mut self);
}

/// Insertion-ordered dense storage for one component kind
///
/// Values are kept contiguously in `components`, with `index_to_entity`
/// running in parallel. `entity_to_index` maps back from an entity to its
/// slot.
#[derive(Debug, Clone)]
pub struct ComponentTable<T> {
    /// Mapping from Entity to dense array index
    entity_to_index: HashMap<Entity, usize>,
    /// Mapping from dense array index back to Entity
    index_to_entity: Vec<Entity>,
    components: Vec<T>,
}

impl<T> ComponentTable<T> {
    /// Create a new empty table
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Create a new table with the given capacity
    pub fn with_capacity(capacity: usize) -> Self {
        ComponentTable {
            entity_to_index: HashMap::with_capacity(capacity),
            index_to_entity: Vec::with_capacity(capacity),
            components: Vec::with_capacity(capacity),
        }
    }

    /// Get the number of components stored
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// Check if the table is empty
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Insert or replace the component for `entity`
    ///
    /// Replacing keeps the entity's slot, so iteration order is unchanged.
    /// Returns the previous value if there was one.
    pub fn insert(&mut self, entity: Entity, component: T) -> Option<T> {
        if let Some(&index) = self.entity_to_index.get(&entity) {
            return Some(std::mem::replace(&mut self.components[index], component));
        }

        let new_index = self.components.len();
        self.components.push(component);
        self.entity_to_index.insert(entity, new_index);
        self.index_to_entity.push(entity);

        debug_assert_eq!(self.entity_to_index.len(), self.index_to_entity.len());
        debug_assert_eq!(self.entity_to_index.len(), self.components.len());
        None
    }

    /// Remove the component for `entity`, preserving the order of the rest
    pub fn remove(&mut self, entity: Entity) -> Option<T> {
        let index = self.entity_to_index.remove(&entity)?;
        let component = self.components.remove(index);
        self.index_to_entity.remove(index);

        // Everything after the hole moved down one slot
        for (offset, shifted) in self.index_to_entity[index..].iter().enumerate() {
            self.entity_to_index.insert(*shifted, index + offset);
        }

        debug_assert_eq!(self.entity_to_index.len(), self.index_to_entity.len());
        debug_assert_eq!(self.entity_to_index.len(), self.components.len());
        Some(component)
    }

    /// Get a reference to the component for `entity`
    pub fn get(&self, entity: Entity) -> Option<&T> {
        let index = self.entity_to_index.get(&entity)?;
        Some(&self.components[*index])
    }

    /// Get a mutable reference to the component for `entity`
    pub fn get_mut(&mut self, entity: Entity) -> Option<&mut T> {
        let index = self.entity_to_index.get(&entity)?;
        Some(&mut self.components[*index])
    }

    /// Mutably borrow two distinct entries at once
    ///
    /// Returns `None` if either entity is missing or both are the same.
    pub fn get_pair_mut(&mut self, a: Entity, b: Entity) -> Option<(&mut T, &mut T)> {
        let ia = *self.entity_to_index.get(&a)?;
        let ib = *self.entity_to_index.get(&b)?;
        if ia == ib {
            return None;
        }
        if ia < ib {
            let (head, tail) = self.components.split_at_mut(ib);
            Some((&mut head[ia], &mut tail[0]))
        } else {
            let (head, tail) = self.components.split_at_mut(ia);
            Some((&mut tail[0], &mut head[ib]))
        }
    }

    /// Check if an entity has a component in this table
    pub fn contains(&self, entity: Entity) -> bool {
        self.entity_to_index.contains_key(&entity)
    }

    /// Get the slot for an entity, if it exists
    pub fn get_index(&self, entity: Entity) -> Option<usize> {
        self.entity_to_index.get(&entity).copied()
    }

    /// Entities in iteration order
    pub fn entities(&self) -> &[Entity] {
        &self.index_to_entity
    }

    /// The dense component array, in iteration order
    pub fn components(&self) -> &[T] {
        &self.components
    }

    /// Mutable dense component array, in iteration order
    pub fn components_mut(&mut self) -> &mut [T] {
        &mut self.components
    }

    /// Iterate `(entity, component)` pairs in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (Entity, &T)> + '_ {
        self.index_to_entity.iter().copied().zip(self.components.iter())
    }

    /// Iterate `(entity, component)` pairs mutably in insertion order
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (Entity, &mut T)> + '_ {
        self.index_to_entity
            .iter()
            .copied()
            .zip(self.components.iter_mut())
    }

    /// Remove every entry
    pub fn clear(&mut self) {
        self.entity_to_index.clear();
        self.index_to_entity.clear();
        self.components.clear();
    }
}

#[cfg(feature = "parallel")]
impl<T: Send> ComponentTable<T> {
    /// Parallel counterpart of [`iter_mut`](Self::iter_mut)
    ///
    /// Each item is a disjoint slot, so per-entity work can run on the rayon
    /// pool without changing what any single entry ends up holding.
    pub fn par_iter_mut(
        &mut self,
    ) -> impl rayon::iter::IndexedParallelIterator<Item = (Entity, &mut T)> + '_ {
        use rayon::prelude::*;

        self.index_to_entity
            .par_iter()
            .copied()
            .zip(self.components.par_iter_mut())
    }
}

impl<T> Default for ComponentTable<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Component> ComponentStorage for ComponentTable<T> {
    fn kind(&self) -> ComponentKind {
        T::KIND
    }

    fn len(&self) -> usize {
        self.components.len()
    }

    fn contains(&self, entity: Entity) -> bool {
        self.entity_to_index.contains_key(&entity)
    }

    fn remove_entity(&mut self, entity: Entity) -> bool {
        self.remove(entity).is_some()
    }

    fn entity_ids(&self) -> &[Entity] {
        &self.index_to_entity
    }

    fn clear(&mut self) {
        ComponentTable::clear(self);
    }
}
