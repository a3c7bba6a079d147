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
//! Force accumulation
//!
//! Two additive passes over every transform:
//!
//! 1. **Radial fields**: each [`ForceField`] pulls (or pushes) targets within
//!    `radius * range_mul` of its owner, with magnitude shaped by the field's
//!    [`Falloff`](crate::ecs::components::Falloff).
//! 2. **Zones**: each [`ZoneForce`] pushes targets within its disc along a
//!    fixed world-space direction, scaled by `1 - dist / radius`.
//!
//! Sources are read from a snapshot taken before any acceleration changes,
//! so each target's result is independent of the others. With the
//! `parallel` feature the per-target work is spread over the rayon pool;
//! both paths add contributions in the same order (fields in table order,
//! then zones in table order) and give identical results.
//!
//! # Complexity
//!
//! O((F + Z) · N) for F fields, Z zones and N transforms.

use crate::ecs::components::{ForceField, Transform, ZoneForce};
use crate::ecs::{Entity, Frame, System, World};
use glam::DVec2;

/// A radial field with its owner's position and radius
#[derive(Debug, Clone, Copy)]
struct FieldSource {
    entity: Entity,
    position: DVec2,
    max_range_sq: f64,
    field: ForceField,
}

/// A zone with its owner's position
#[derive(Debug, Clone, Copy)]
struct ZoneSource {
    entity: Entity,
    position: DVec2,
    zone: ZoneForce,
}

/// Accumulates radial and zone forces into acceleration
#[derive(Debug, Default)]
pub struct ForceSystem {
    fields: Vec<FieldSource>,
    zones: Vec<ZoneSource>,
}

impl ForceSystem {
    /// Create a force system
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot every source that has a transform; others emit nothing
    fn collect_sources(&mut self, world: &World) {
        let components = world.components();
        let transforms = &components.transforms;

        self.fields.clear();
        self.fields.extend(components.force_fields.iter().filter_map(|(entity, field)| {
            let owner = transforms.get(entity)?;
            let max_range = owner.radius * field.range_mul;
            Some(FieldSource {
                entity,
                position: owner.position,
                max_range_sq: max_range * max_range,
                field: *field,
            })
        }));

        self.zones.clear();
        self.zones.extend(components.zone_forces.iter().filter_map(|(entity, zone)| {
            let owner = transforms.get(entity)?;
            Some(ZoneSource {
                entity,
                position: owner.position,
                zone: *zone,
            })
        }));
    }

    #[cfg(feature = "parallel")]
    fn apply(&self, world: &mut World) {
        use rayon::prelude::*;

        let fields = &self.fields;
        let zones = &self.zones;
        world
            .table_mut::<Transform>()
            .par_iter_mut()
            .for_each(|(entity, transform)| accumulate(entity, transform, fields, zones));
    }

    #[cfg(not(feature = "parallel"))]
    fn apply(&self, world: &mut World) {
        for (entity, transform) in world.table_mut::<Transform>().iter_mut() {
            accumulate(entity, transform, &self.fields, &self.zones);
        }
    }
}

/// Add every field and zone contribution to one target
fn accumulate(entity: Entity, target: &mut Transform, fields: &[FieldSource], zones: &[ZoneSource]) {
    let mut acceleration = target.acceleration;

    for source in fields {
        if source.entity == entity {
            continue;
        }
        let offset = source.position - target.position;
        let dist_sq = offset.length_squared();
        if dist_sq > source.max_range_sq {
            continue;
        }
        let magnitude = source.field.signed_magnitude(dist_sq, source.max_range_sq);
        acceleration += offset.normalize_or_zero() * magnitude;
    }

    for source in zones {
        if source.entity == entity {
            continue;
        }
        let radius = source.zone.radius;
        let dist_sq = target.position.distance_squared(source.position);
        if dist_sq > radius * radius {
            continue;
        }
        let falloff = 1.0 - dist_sq.sqrt() / radius;
        acceleration += source.zone.direction * source.zone.strength * falloff;
    }

    target.acceleration = acceleration;
}

impl System for ForceSystem {
    fn run(&mut self, frame: &mut Frame<'_>) {
        self.collect_sources(frame.world);
        if self.fields.is_empty() && self.zones.is_empty() {
            return;
        }
        self.apply(frame.world);
    }

    fn name(&self) -> &str {
        "force"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::components::{Falloff, FieldKind};
    use crate::systems::test_support::run_once;

    const EPSILON: f64 = 1e-9;

    fn body(world: &mut World, x: f64, y: f64, radius: f64) -> Entity {
        let e = world.create_entity();
        world.add_component(e, Transform::new(DVec2::new(x, y), radius, 10.0));
        e
    }

    fn step(world: &mut World) {
        run_once(&mut ForceSystem::new(), world, &[], &mut Vec::new());
    }

    fn acceleration(world: &World, e: Entity) -> DVec2 {
        world.get::<Transform>(e).unwrap().acceleration
    }

    #[test]
    fn test_attractor_pulls_target() {
        let mut world = World::new();
        let source = body(&mut world, 100.0, 100.0, 20.0);
        world.add_component(source, ForceField::default());
        let target = body(&mut world, 130.0, 100.0, 10.0);

        step(&mut world);

        let acc = acceleration(&world, target);
        assert!(acc.x < 0.0);
        assert_eq!(acc.y, 0.0);
        assert!((acc.x + 50.0 / 900.0).abs() < EPSILON);
    }

    #[test]
    fn test_field_skips_owner() {
        let mut world = World::new();
        let source = body(&mut world, 100.0, 100.0, 20.0);
        world.add_component(source, ForceField::default());

        step(&mut world);
        assert_eq!(acceleration(&world, source), DVec2::ZERO);
    }

    #[test]
    fn test_repeller_pushes_target() {
        let mut world = World::new();
        let source = body(&mut world, 100.0, 100.0, 20.0);
        world.add_component(
            source,
            ForceField::new(50.0, FieldKind::Repeller, 2.0, Falloff::Linear),
        );
        let target = body(&mut world, 100.0, 120.0, 5.0);

        step(&mut world);

        let acc = acceleration(&world, target);
        assert!(acc.y > 0.0);
        assert!(acc.x.abs() < EPSILON);
        assert!((acc.y - 25.0).abs() < EPSILON);
    }

    #[test]
    fn test_out_of_range_target_unaffected() {
        let mut world = World::new();
        let source = body(&mut world, 0.0, 0.0, 10.0);
        world.add_component(source, ForceField::default());
        let far = body(&mut world, 20.5, 0.0, 1.0);

        step(&mut world);
        assert_eq!(acceleration(&world, far), DVec2::ZERO);
    }

    #[test]
    fn test_linear_edge_of_range_is_zero() {
        let mut world = World::new();
        let source = body(&mut world, 0.0, 0.0, 10.0);
        world.add_component(source, ForceField::new(50.0, FieldKind::Attractor, 2.0, Falloff::Linear));
        let edge = body(&mut world, 20.0, 0.0, 1.0);

        step(&mut world);
        assert_eq!(acceleration(&world, edge), DVec2::ZERO);
    }

    #[test]
    fn test_coincident_target_gets_finite_zero_force() {
        let mut world = World::new();
        let source = body(&mut world, 50.0, 50.0, 10.0);
        world.add_component(source, ForceField::default());
        let target = body(&mut world, 50.0, 50.0, 10.0);

        step(&mut world);

        let acc = acceleration(&world, target);
        assert!(acc.is_finite());
        assert_eq!(acc, DVec2::ZERO);
    }

    #[test]
    fn test_sourceless_field_is_ignored() {
        let mut world = World::new();
        let orphan = world.create_entity();
        world.add_component(orphan, ForceField::default());
        let target = body(&mut world, 0.0, 0.0, 1.0);

        step(&mut world);
        assert_eq!(acceleration(&world, target), DVec2::ZERO);
    }

    #[test]
    fn test_superposition() {
        let field_a = ForceField::new(30.0, FieldKind::Attractor, 5.0, Falloff::Exp);
        let field_b = ForceField::new(12.0, FieldKind::Repeller, 5.0, Falloff::InvSq);

        let solo = |field: ForceField, at: DVec2| {
            let mut world = World::new();
            let source = body(&mut world, at.x, at.y, 20.0);
            world.add_component(source, field);
            let target = body(&mut world, 40.0, 35.0, 5.0);
            step(&mut world);
            acceleration(&world, target)
        };

        let a_only = solo(field_a, DVec2::new(10.0, 10.0));
        let b_only = solo(field_b, DVec2::new(60.0, 20.0));

        let mut world = World::new();
        let a = body(&mut world, 10.0, 10.0, 20.0);
        world.add_component(a, field_a);
        let b = body(&mut world, 60.0, 20.0, 20.0);
        world.add_component(b, field_b);
        let target = body(&mut world, 40.0, 35.0, 5.0);
        step(&mut world);

        let combined = acceleration(&world, target);
        assert!((combined - (a_only + b_only)).length() < EPSILON);
    }

    #[test]
    fn test_accumulates_onto_existing_acceleration() {
        let mut world = World::new();
        let source = body(&mut world, 0.0, 0.0, 20.0);
        world.add_component(source, ForceField::new(10.0, FieldKind::Attractor, 2.0, Falloff::Linear));
        let target = body(&mut world, 20.0, 0.0, 1.0);
        world.get_mut::<Transform>(target).unwrap().acceleration = DVec2::new(0.0, 3.0);

        step(&mut world);

        let acc = acceleration(&world, target);
        assert!((acc.x + 5.0).abs() < EPSILON);
        assert_eq!(acc.y, 3.0);
    }

    #[test]
    fn test_zone_pushes_along_direction() {
        let mut world = World::new();
        let zone = body(&mut world, 0.0, 0.0, 10.0);
        world.add_component(zone, ZoneForce::new(DVec2::new(0.0, 1.0), 20.0, 100.0));
        let target = body(&mut world, 50.0, 0.0, 5.0);

        step(&mut world);

        // Push is along +Y even though the target sits on the +X axis
        let acc = acceleration(&world, target);
        assert!(acc.x.abs() < EPSILON);
        assert!((acc.y - 10.0).abs() < EPSILON);
    }

    #[test]
    fn test_zone_edges() {
        let mut world = World::new();
        let zone = body(&mut world, 0.0, 0.0, 10.0);
        world.add_component(zone, ZoneForce::new(DVec2::X, 20.0, 100.0));
        let edge = body(&mut world, 100.0, 0.0, 1.0);
        let outside = body(&mut world, 0.0, 100.1, 1.0);

        step(&mut world);

        assert_eq!(acceleration(&world, edge), DVec2::ZERO);
        assert_eq!(acceleration(&world, outside), DVec2::ZERO);
        assert_eq!(acceleration(&world, zone), DVec2::ZERO);
    }

    #[test]
    fn test_empty_tables_are_noop() {
        let mut world = World::new();
        let target = body(&mut world, 5.0, 5.0, 1.0);
        step(&mut world);
        assert_eq!(acceleration(&world, target), DVec2::ZERO);

        let mut empty = World::new();
        step(&mut empty);
        assert_eq!(empty.entity_count(), 0);
    }
}
