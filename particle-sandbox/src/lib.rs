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
//! # Particle Sandbox
//!
//! An ECS (Entity Component System) simulation core for an interactive 2D
//! particle sandbox. Rendering, input and editing live outside this crate;
//! they drive it through [`Simulation`] and read component tables back.
//!
//! ## Features
//!
//! - **ECS Architecture**: insertion-ordered component tables with ids that are never reused
//! - **Force Fields**: radial attractors and repellers with linear, inverse-square or exponential falloff
//! - **Zones**: directional pushes over a disc
//! - **Steering**: path following with waypoints and arrival slowdown
//! - **Collisions**: exhaustive circle overlap with elastic response and immovable obstacles
//! - **Rules**: "on collision between tag A and tag B, destroy or spawn"
//! - **Snapshots**: JSON export and import of the whole world and rule set
//! - **Parallelization**: optional Rayon force accumulation (`parallel` feature)
//!
//! ## Example
//!
//! ```rust
//! use glam::DVec2;
//! use particle_sandbox::config::SimConfig;
//! use particle_sandbox::ecs::components::ForceField;
//! use particle_sandbox::prefabs;
//! use particle_sandbox::rules::{Action, Condition, Rule, Target};
//! use particle_sandbox::Simulation;
//!
//! let mut sim = Simulation::new(SimConfig::default());
//! let config = sim.config().prefabs;
//! prefabs::create_blob(sim.world_mut(), &config, DVec2::new(200.0, 200.0), ForceField::default());
//! prefabs::create_follower(sim.world_mut(), &config, DVec2::new(260.0, 200.0), None);
//! sim.add_rule(Rule::new(
//!     Condition::collision("attractor", "follower"),
//!     Action::destroy(Target::B),
//! ));
//!
//! for _ in 0..120 {
//!     sim.update();
//! }
//! ```
//!
//! ## Logging
//!
//! The crate emits [`tracing`] events and installs no subscriber.

#![warn(missing_docs)]

/// Simulation configuration
pub mod config;

/// Entity Component System implementation
pub mod ecs;

/// Boundary errors
pub mod error;

/// Entity builders
pub mod prefabs;

/// Collision rules
pub mod rules;

/// Frame driver
pub mod simulation;

/// World snapshots
pub mod snapshot;

/// Per-frame systems
pub mod systems;

pub use config::SimConfig;
pub use ecs::{Entity, World};
pub use error::{Result, SandboxError};
pub use simulation::Simulation;
