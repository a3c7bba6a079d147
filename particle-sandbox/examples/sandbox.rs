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
//! Headless sandbox demo
//!
//! Builds the default scene (an attractor, a repeller, a wind zone, a ring
//! of followers and an obstacle), installs two rules that turn every follower
//! the attractor swallows into a node, and steps the world.
//! Set `RUST_LOG=particle_sandbox=debug` to see rule firings, or pass a path
//! to write the final snapshot as JSON.

use glam::DVec2;
use particle_sandbox::ecs::components::{Falloff, FieldKind, ForceField, Tag, Transform, ZoneForce};
use particle_sandbox::prefabs::{self, Prefab};
use particle_sandbox::rules::{Action, Condition, Rule, Target};
use particle_sandbox::{SimConfig, Simulation};
use tracing_subscriber::EnvFilter;

const FRAMES: u64 = 600;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    println!("Particle Sandbox - Headless Demo");
    println!("================================\n");

    let mut sim = Simulation::try_new(SimConfig::default())?;
    let config = sim.config().prefabs;
    let bounds = sim.config().bounds;
    let center = DVec2::new(bounds.width / 2.0, bounds.height / 2.0);
    let world = sim.world_mut();

    prefabs::create_blob(
        world,
        &config,
        center - DVec2::new(200.0, 0.0),
        ForceField::new(60.0, FieldKind::Attractor, 6.0, Falloff::InvSq),
    );
    prefabs::create_blob(
        world,
        &config,
        center + DVec2::new(200.0, 0.0),
        ForceField::new(40.0, FieldKind::Repeller, 4.0, Falloff::Linear),
    );
    let zone = prefabs::create_node(world, &config, center + DVec2::new(0.0, 200.0));
    prefabs::add_zone_force(world, zone, ZoneForce::new(DVec2::new(1.0, -1.0), 0.5, 150.0));
    prefabs::create_obstacle(world, center, 35.0);

    for i in 0..24 {
        let angle = i as f64 * std::f64::consts::TAU / 24.0;
        let start = center + DVec2::from_angle(angle) * 300.0;
        let target = (i % 3 == 0).then(|| center - DVec2::from_angle(angle) * 300.0);
        prefabs::create_follower(world, &config, start, target);
    }

    // Spawn runs first; once B is destroyed its tag no longer matches
    sim.add_rule(Rule::new(
        Condition::collision("attractor", "follower"),
        Action::Spawn { prefab: Prefab::Node },
    ));
    sim.add_rule(Rule::new(
        Condition::collision("attractor", "follower"),
        Action::destroy(Target::B),
    ));

    println!("Initial scene: {} entities", sim.world().entity_count());

    let mut total_collisions = 0;
    for _ in 0..FRAMES {
        sim.update();
        total_collisions += sim.collisions().len();
        if sim.frame() % 120 == 0 {
            report(&sim);
        }
    }

    println!("\nSimulated {} frames, {} collisions", sim.frame(), total_collisions);

    let json = sim.export_snapshot()?;
    match std::env::args().nth(1) {
        Some(path) => {
            std::fs::write(&path, &json)?;
            println!("Snapshot written to {path} ({} bytes)", json.len());
        }
        None => println!("Snapshot size: {} bytes (pass a path to save it)", json.len()),
    }

    Ok(())
}

fn report(sim: &Simulation) {
    let world = sim.world();
    let followers = world
        .table::<Tag>()
        .iter()
        .filter(|(_, tag)| **tag == Tag::Follower)
        .count();
    let speed: f64 = world
        .table::<Transform>()
        .components()
        .iter()
        .map(|t| t.velocity.length())
        .sum();
    println!(
        "  frame {:>4}: {:>3} entities, {:>3} followers, total speed {:.2}",
        sim.frame(),
        world.entity_count(),
        followers,
        speed
    );
}
