//! Entity Component System (ECS) core implementation
//!
//! This module provides the foundational ECS architecture including:
//! - Entity ids that are never reused
//! - Insertion-ordered component tables, one per kind
//! - The component store ([`World`])
//! - The system trait and staged scheduler

mod entity;
mod component;
mod system;
mod world;

pub mod components;
pub mod scheduler;

pub use entity::{Entity, EntityAllocator};
pub use component::{Component, ComponentStorage, ComponentTable};
pub use system::{CollisionPair, Frame, System};
pub use scheduler::{Scheduler, StageId};
pub use world::World;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_world_creation() {
        let world = World::new();
        assert_eq!(world.entity_count(), 0);
    }

    #[test]
    fn test_entity_creation() {
        let mut world = World::new();
        let entity = world.create_entity();
        assert_eq!(world.entity_count(), 1);
        assert!(world.is_entity_alive(entity));
    }
}
