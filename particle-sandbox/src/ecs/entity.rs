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
//! Entity identifiers
//!
//! Entities are opaque handles that tie components together. Ids are handed
//! out in increasing order and are never reused once an entity is removed,
//! so a stale id simply stops matching anything in the store.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for an entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Entity(u64);

impl Entity {
    /// Largest id the store accepts; `u64::MAX` has no successor to reserve
    pub const MAX: Entity = Entity(u64::MAX - 1);

    /// Create an entity handle from a raw id
    pub fn new(id: u64) -> Self {
        Entity(id)
    }

    /// Get the raw u64 value
    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Entity({})", self.0)
    }
}

/// Monotonic id source
///
/// Ids start at 1. The allocator never hands out an id twice, even after
/// the entity it named has been removed.
#[derive(Debug, Clone)]
pub struct EntityAllocator {
    next: u64,
}

impl EntityAllocator {
    /// Create an allocator whose first id is 1
    pub fn new() -> Self {
        EntityAllocator { next: 1 }
    }

    /// Hand out the next unused id
    ///
    /// # Panics
    ///
    /// Panics once every id up to [`Entity::MAX`] has been handed out or
    /// reserved.
    pub fn allocate(&mut self) -> Entity {
        assert!(self.next <= Entity::MAX.0, "Entity ids exhausted");
        let entity = Entity(self.next);
        self.next += 1;
        entity
    }

    /// Make sure `entity` and everything below it is never handed out
    ///
    /// Used when entities arrive from outside the allocator (snapshot import
    /// or components attached to a hand-made id). Callers keep `entity` at or
    /// below [`Entity::MAX`]; the counter saturates rather than wrapping.
    pub fn reserve_through(&mut self, entity: Entity) {
        if entity.0 >= self.next {
            self.next = entity.0.saturating_add(1);
        }
    }

    /// Whether `entity` has never been handed out and may still be adopted
    pub fn is_unissued(&self, entity: Entity) -> bool {
        entity.0 >= self.next && entity <= Entity::MAX
    }

    /// The id the next call to `allocate` will return
    pub fn peek(&self) -> Entity {
        Entity(self.next)
    }
}

impl Default for EntityAllocator {
    fn default() -> Self {
        Self::new()
    }
}
