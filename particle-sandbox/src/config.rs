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
//! Simulation configuration
//!
//! Fixed timestep, world bounds and prefab defaults are set once when the
//! simulation is built and handed to every system as read-only state.
//!
//! # Timestep Guidelines
//!
//! Motion is scaled by `dt * 60`, so velocities are "units per 60 Hz frame"
//! regardless of the timestep. The default `1/60` makes that scale factor 1.

use crate::error::{Result, SandboxError};
use serde::{Deserialize, Serialize};

/// Default fixed timestep (60 Hz)
pub const DEFAULT_TIMESTEP: f64 = 1.0 / 60.0;

/// Reference rate velocities are expressed against
pub const REFERENCE_RATE: f64 = 60.0;

/// Rectangular world extent, origin at the top-left corner
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    /// Width in world units
    pub width: f64,
    /// Height in world units
    pub height: f64,
}

impl Bounds {
    /// Create bounds of the given size
    pub fn new(width: f64, height: f64) -> Self {
        Bounds { width, height }
    }
}

impl Default for Bounds {
    fn default() -> Self {
        Bounds::new(1280.0, 720.0)
    }
}

/// Sizes and speed caps used by the prefab builders
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrefabConfig {
    /// Radius of a plain node
    pub node_radius: f64,
    /// Radius of a follower
    pub follower_radius: f64,
    /// Speed cap for followers
    pub max_follower_speed: f64,
    /// Speed cap for nodes and blobs
    pub max_blob_speed: f64,
}

impl Default for PrefabConfig {
    fn default() -> Self {
        PrefabConfig {
            node_radius: 20.0,
            follower_radius: 8.0,
            max_follower_speed: 4.0,
            max_blob_speed: 2.0,
        }
    }
}

/// Process-wide simulation settings
///
/// # Examples
///
/// ```
/// use particle_sandbox::config::{Bounds, SimConfig};
///
/// let config = SimConfig::default()
///     .with_timestep(1.0 / 120.0)
///     .with_bounds(Bounds::new(800.0, 600.0));
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Fixed timestep in seconds
    pub timestep: f64,
    /// World extent used for wall reflection
    pub bounds: Bounds,
    /// Prefab defaults, also used by the spawn rule action
    pub prefabs: PrefabConfig,
}

impl SimConfig {
    /// Builder-style timestep
    pub fn with_timestep(mut self, timestep: f64) -> Self {
        self.timestep = timestep;
        self
    }

    /// Builder-style bounds
    pub fn with_bounds(mut self, bounds: Bounds) -> Self {
        self.bounds = bounds;
        self
    }

    /// Builder-style prefab defaults
    pub fn with_prefabs(mut self, prefabs: PrefabConfig) -> Self {
        self.prefabs = prefabs;
        self
    }

    /// Load from JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self> {
        let config: SimConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the configuration is usable
    pub fn validate(&self) -> Result<()> {
        let dt = self.timestep;
        if dt <= 0.0 || !dt.is_finite() {
            return Err(SandboxError::InvalidConfig(format!(
                "timestep {dt} must be positive and finite"
            )));
        }

        let Bounds { width, height } = self.bounds;
        if !(width > 0.0 && height > 0.0 && width.is_finite() && height.is_finite()) {
            return Err(SandboxError::InvalidConfig(format!(
                "bounds {width}x{height} must be positive and finite"
            )));
        }

        let p = &self.prefabs;
        if !(p.node_radius > 0.0 && p.follower_radius > 0.0) {
            return Err(SandboxError::InvalidConfig(
                "prefab radii must be positive".to_string(),
            ));
        }
        if p.max_follower_speed < 0.0 || p.max_blob_speed < 0.0 {
            return Err(SandboxError::InvalidConfig(
                "prefab speed caps must be non-negative".to_string(),
            ));
        }

        Ok(())
    }

    /// Position scale applied to velocity each step (`dt * 60`)
    pub fn motion_scale(&self) -> f64 {
        self.timestep * REFERENCE_RATE
    }
}

impl Default for SimConfig {
    fn default() -> Self {
        SimConfig {
            timestep: DEFAULT_TIMESTEP,
            bounds: Bounds::default(),
            prefabs: PrefabConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = SimConfig::default();
        assert!(config.validate().is_ok());
        assert!((config.motion_scale() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_invalid_timesteps() {
        for dt in [0.0, -0.01, f64::NAN, f64::INFINITY] {
            let config = SimConfig::default().with_timestep(dt);
            let err = config.validate().unwrap_err();
            assert!(err.to_string().contains("timestep"));
        }
    }

    #[test]
    fn test_invalid_bounds() {
        let config = SimConfig::default().with_bounds(Bounds::new(0.0, 100.0));
        assert!(matches!(config.validate(), Err(SandboxError::InvalidConfig(_))));
    }

    #[test]
    fn test_from_json_partial() {
        let config = SimConfig::from_json(r#"{"bounds": {"width": 400, "height": 300}}"#).unwrap();
        assert_eq!(config.bounds, Bounds::new(400.0, 300.0));
        assert_eq!(config.timestep, DEFAULT_TIMESTEP);
        assert_eq!(config.prefabs, PrefabConfig::default());
    }

    #[test]
    fn test_from_json_rejects_bad_values() {
        assert!(SimConfig::from_json(r#"{"timestep": -1}"#).is_err());
        assert!(matches!(
            SimConfig::from_json("{"),
            Err(SandboxError::Json(_))
        ));
    }

    #[test]
    fn test_motion_scale() {
        let config = SimConfig::default().with_timestep(1.0 / 30.0);
        assert!((config.motion_scale() - 2.0).abs() < 1e-12);
    }
}
