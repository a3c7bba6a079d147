//! World management
//!
//! The World is the component store: it owns the entity set and one table
//! per component kind, and is the only place entities are created or
//! destroyed.

use crate::ecs::component::{Component, ComponentTable};
use crate::ecs::components::{ComponentKind, ComponentValue, Components};
use crate::ecs::entity::EntityAllocator;
use crate::ecs::Entity;
use std::collections::BTreeSet;
use tracing::{debug, warn};

/// The main ECS world container
///
/// World manages entity lifecycles and serves as the central
/// access point for component tables.
#[derive(Debug, Clone, Default)]
pub struct World {
    allocator: EntityAllocator,
    alive_entities: BTreeSet<Entity>,
    components: Components,
}

impl World {
    /// Create a new empty world
    pub fn new() -> Self {
        World {
            allocator: EntityAllocator::new(),
            alive_entities: BTreeSet::new(),
            components: Components::new(),
        }
    }

    /// Create a new entity with a never-before-used id
    ///
    /// # Panics
    ///
    /// Panics if every id up to [`Entity::MAX`] is already taken.
    pub fn create_entity(&mut self) -> Entity {
        let entity = self.allocator.allocate();
        self.alive_entities.insert(entity);
        debug!(%entity, "created entity");
        entity
    }

    /// Insert or replace a component, returning the previous value
    ///
    /// The entity does not need any other component first. An id that was
    /// never handed out is registered as alive, so every table entry always
    /// belongs to a live entity. Writes to a removed id (or one above
    /// [`Entity::MAX`]) are dropped: removed ids stay dead.
    pub fn add_component<T: Component>(&mut self, entity: Entity, component: T) -> Option<T> {
        if !self.register(entity) {
            return None;
        }
        T::table_mut(&mut self.components).insert(entity, component)
    }

    /// Kind-erased [`add_component`](Self::add_component)
    pub fn insert_value(&mut self, entity: Entity, value: ComponentValue) {
        if self.register(entity) {
            self.components.insert_value(entity, value);
        }
    }

    /// Insert a component for an id coming from a snapshot
    ///
    /// Unlike [`add_component`](Self::add_component) this adopts ids the
    /// allocator already issued, since restoring follows a [`clear`](Self::clear).
    /// The id must be at or below [`Entity::MAX`].
    pub(crate) fn insert_restored<T: Component>(&mut self, entity: Entity, component: T) {
        self.adopt(entity);
        T::table_mut(&mut self.components).insert(entity, component);
    }

    /// Detach one component, leaving the entity alive
    pub fn remove_component<T: Component>(&mut self, entity: Entity) -> Option<T> {
        T::table_mut(&mut self.components).remove(entity)
    }

    /// Get an entity's component of type `T`
    pub fn get<T: Component>(&self, entity: Entity) -> Option<&T> {
        T::table(&self.components).get(entity)
    }

    /// Mutably get an entity's component of type `T`
    pub fn get_mut<T: Component>(&mut self, entity: Entity) -> Option<&mut T> {
        T::table_mut(&mut self.components).get_mut(entity)
    }

    /// Check if an entity has a component of type `T`
    pub fn has<T: Component>(&self, entity: Entity) -> bool {
        T::table(&self.components).contains(entity)
    }

    /// Full table for a kind; empty if never populated
    pub fn table<T: Component>(&self) -> &ComponentTable<T> {
        T::table(&self.components)
    }

    /// Mutable table for a kind; systems update components in place here
    pub fn table_mut<T: Component>(&mut self) -> &mut ComponentTable<T> {
        T::table_mut(&mut self.components)
    }

    /// Table lookup by kind name, for editors and inspectors
    ///
    /// Unknown names yield an empty list.
    pub fn table_by_name(&self, name: &str) -> Vec<(Entity, ComponentValue)> {
        match name.parse::<ComponentKind>() {
            Ok(kind) => self.components.entries(kind),
            Err(_) => Vec::new(),
        }
    }

    /// All tables
    pub fn components(&self) -> &Components {
        &self.components
    }

    /// All tables, mutably, for split borrows across kinds
    pub fn components_mut(&mut self) -> &mut Components {
        &mut self.components
    }

    /// Destroy an entity and purge it from every table
    ///
    /// Removing an unknown or already-removed id is a no-op. Returns true if
    /// the entity was alive.
    pub fn remove_entity(&mut self, entity: Entity) -> bool {
        let was_alive = self.alive_entities.remove(&entity);
        let purged = self.components.remove_entity(entity);
        if was_alive {
            debug!(%entity, components = purged, "removed entity");
        }
        was_alive
    }

    /// Check if an entity is alive
    pub fn is_entity_alive(&self, entity: Entity) -> bool {
        self.alive_entities.contains(&entity)
    }

    /// Get the number of alive entities
    pub fn entity_count(&self) -> usize {
        self.alive_entities.len()
    }

    /// Alive entities in id order
    pub fn entities(&self) -> impl Iterator<Item = Entity> + '_ {
        self.alive_entities.iter().copied()
    }

    /// Remove every entity and component
    ///
    /// The id counter is not reset, so ids handed out before the clear are
    /// never handed out again.
    pub fn clear(&mut self) {
        self.alive_entities.clear();
        self.components.clear();
    }

    fn register(&mut self, entity: Entity) -> bool {
        if self.alive_entities.contains(&entity) {
            return true;
        }
        if !self.allocator.is_unissued(entity) {
            warn!(%entity, "ignoring component for a removed or out-of-range entity");
            return false;
        }
        self.adopt(entity);
        true
    }

    fn adopt(&mut self, entity: Entity) {
        if self.alive_entities.insert(entity) {
            self.allocator.reserve_through(entity);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::components::{Collider, ComponentValue, Tag, Transform};
    use glam::DVec2;

    fn transform() -> Transform {
        Transform::new(DVec2::new(1.0, 1.0), 5.0, 2.0)
    }

    #[test]
    fn test_world_entity_lifecycle() {
        let mut world = World::new();

        let e1 = world.create_entity();
        let e2 = world.create_entity();

        assert_eq!(world.entity_count(), 2);
        assert!(world.is_entity_alive(e1));
        assert!(world.is_entity_alive(e2));

        assert!(world.remove_entity(e1));
        assert_eq!(world.entity_count(), 1);
        assert!(!world.is_entity_alive(e1));
        assert!(world.is_entity_alive(e2));
    }

    #[test]
    fn test_ids_never_reused() {
        let mut world = World::new();
        let e1 = world.create_entity();
        world.remove_entity(e1);
        let e2 = world.create_entity();
        assert_ne!(e1, e2);
        assert!(e2 > e1);
    }

    #[test]
    fn test_remove_entity_purges_components() {
        let mut world = World::new();
        let e = world.create_entity();
        world.add_component(e, transform());
        world.add_component(e, Collider::circle());
        world.add_component(e, Tag::Follower);

        world.remove_entity(e);

        assert!(world.get::<Transform>(e).is_none());
        assert!(world.get::<Collider>(e).is_none());
        assert!(world.get::<Tag>(e).is_none());
        assert!(world.entities().all(|alive| alive != e));
    }

    #[test]
    fn test_remove_entity_is_idempotent() {
        let mut world = World::new();
        let e = world.create_entity();
        assert!(world.remove_entity(e));
        assert!(!world.remove_entity(e));
        assert!(!world.remove_entity(Entity::new(999)));
        assert_eq!(world.entity_count(), 0);
    }

    #[test]
    fn test_add_component_replaces() {
        let mut world = World::new();
        let e = world.create_entity();
        assert!(world.add_component(e, Tag::Node).is_none());
        assert_eq!(world.add_component(e, Tag::Zone), Some(Tag::Node));
        assert_eq!(world.get::<Tag>(e), Some(&Tag::Zone));
        assert_eq!(world.table::<Tag>().len(), 1);
    }

    #[test]
    fn test_add_component_registers_unknown_id() {
        let mut world = World::new();
        let outsider = Entity::new(40);
        world.add_component(outsider, Tag::Node);
        assert!(world.is_entity_alive(outsider));

        // The allocator must skip past the adopted id
        let fresh = world.create_entity();
        assert!(fresh > outsider);
    }

    #[test]
    fn test_add_component_to_removed_entity_is_dropped() {
        let mut world = World::new();
        let e = world.create_entity();
        world.add_component(e, transform());
        world.remove_entity(e);

        assert!(world.add_component(e, Tag::Node).is_none());
        world.insert_value(e, ComponentValue::Collider(Collider::circle()));

        assert!(!world.is_entity_alive(e));
        assert!(!world.has::<Tag>(e));
        assert!(!world.has::<Collider>(e));
        assert_eq!(world.entity_count(), 0);
    }

    #[test]
    fn test_add_component_after_clear_is_dropped() {
        let mut world = World::new();
        let e = world.create_entity();
        world.clear();

        world.add_component(e, Tag::Node);
        assert!(!world.is_entity_alive(e));
        assert!(world.table::<Tag>().is_empty());
    }

    #[test]
    fn test_add_component_rejects_id_past_max() {
        let mut world = World::new();
        let beyond = Entity::new(u64::MAX);
        world.add_component(beyond, Tag::Node);
        assert!(!world.is_entity_alive(beyond));

        world.add_component(Entity::MAX, Tag::Zone);
        assert!(world.is_entity_alive(Entity::MAX));
    }

    #[test]
    fn test_insert_restored_adopts_issued_id() {
        let mut world = World::new();
        let e = world.create_entity();
        world.clear();

        world.insert_restored(e, Tag::Node);
        assert!(world.is_entity_alive(e));
        assert!(world.create_entity() > e);
    }

    #[test]
    fn test_entities_in_id_order() {
        let mut world = World::new();
        world.insert_restored(Entity::new(5), Tag::Node);
        world.insert_restored(Entity::new(2), Tag::Zone);
        let fresh = world.create_entity();

        let ids: Vec<_> = world.entities().collect();
        assert_eq!(ids, vec![Entity::new(2), Entity::new(5), fresh]);
    }

    #[test]
    fn test_table_of_unpopulated_kind_is_empty() {
        let world = World::new();
        assert!(world.table::<Transform>().is_empty());
        assert!(world.table_by_name("Transform").is_empty());
        assert!(world.table_by_name("NoSuchKind").is_empty());
    }

    #[test]
    fn test_table_by_name() {
        let mut world = World::new();
        let e = world.create_entity();
        world.add_component(e, Tag::Attractor);

        let entries = world.table_by_name("Tag");
        assert_eq!(entries, vec![(e, ComponentValue::Tag(Tag::Attractor))]);
    }

    #[test]
    fn test_mutation_through_table() {
        let mut world = World::new();
        let e = world.create_entity();
        world.add_component(e, transform());

        for (_, t) in world.table_mut::<Transform>().iter_mut() {
            t.velocity = DVec2::new(3.0, 0.0);
        }
        assert_eq!(world.get::<Transform>(e).unwrap().velocity, DVec2::new(3.0, 0.0));
    }

    #[test]
    fn test_remove_component_keeps_entity() {
        let mut world = World::new();
        let e = world.create_entity();
        world.add_component(e, Collider::circle());
        assert!(world.remove_component::<Collider>(e).is_some());
        assert!(!world.has::<Collider>(e));
        assert!(world.is_entity_alive(e));
    }

    #[test]
    fn test_world_clear() {
        let mut world = World::new();
        let e = world.create_entity();
        world.add_component(e, transform());
        world.create_entity();

        assert_eq!(world.entity_count(), 2);
        world.clear();
        assert_eq!(world.entity_count(), 0);
        assert!(world.table::<Transform>().is_empty());

        let next = world.create_entity();
        assert!(next > e);
    }
}
