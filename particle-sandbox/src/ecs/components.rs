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
//! Sandbox components
//!
//! Plain data records attached to entities: kinematic state, collision
//! markers, labels, force sources and steering state. Loosely typed string
//! fields from the editor side (tag labels, field kind, falloff) are closed
//! enums here, each with an explicit fallback for unrecognised input.

use crate::ecs::component::{Component, ComponentStorage, ComponentTable};
use crate::ecs::Entity;
use crate::error::SandboxError;
use glam::DVec2;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// Clamp applied to squared distance by the inverse-square falloff
pub const INV_SQ_EPSILON: f64 = 1e-4;

/// Kinematic state of an entity
///
/// Every moving, colliding or force-emitting entity carries one. `radius`
/// doubles as the collision radius and as the length scale for force range
/// and steering thresholds.
///
/// # Examples
///
/// ```
/// use glam::DVec2;
/// use particle_sandbox::ecs::components::Transform;
///
/// let t = Transform::new(DVec2::new(10.0, 20.0), 5.0, 3.0);
/// assert_eq!(t.velocity, DVec2::ZERO);
/// assert!(t.is_valid());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    /// World-space position
    pub position: DVec2,
    /// Velocity in units per reference frame (60 Hz)
    pub velocity: DVec2,
    /// Acceleration accumulated this frame; reset by integration
    pub acceleration: DVec2,
    /// Collision radius, always > 0
    pub radius: f64,
    /// Speed cap, always >= 0
    pub max_speed: f64,
}

impl Transform {
    /// Create a transform at rest
    ///
    /// # Panics
    ///
    /// Panics if `radius` is not positive or `max_speed` is negative (or
    /// either is not finite). Use `try_new` for fallible construction.
    pub fn new(position: DVec2, radius: f64, max_speed: f64) -> Self {
        assert!(
            radius > 0.0 && radius.is_finite(),
            "Transform radius must be positive and finite"
        );
        assert!(
            max_speed >= 0.0 && max_speed.is_finite(),
            "Transform max speed must be non-negative and finite"
        );
        Transform {
            position,
            velocity: DVec2::ZERO,
            acceleration: DVec2::ZERO,
            radius,
            max_speed,
        }
    }

    /// Try to create a transform at rest
    ///
    /// Returns `None` if the radius or max speed is out of range.
    pub fn try_new(position: DVec2, radius: f64, max_speed: f64) -> Option<Self> {
        if radius > 0.0 && radius.is_finite() && max_speed >= 0.0 && max_speed.is_finite() {
            Some(Self::new(position, radius, max_speed))
        } else {
            None
        }
    }

    /// Builder-style initial velocity
    pub fn with_velocity(mut self, velocity: DVec2) -> Self {
        self.velocity = velocity;
        self
    }

    /// Check if all vectors are finite and the scalars are in range
    pub fn is_valid(&self) -> bool {
        self.position.is_finite()
            && self.velocity.is_finite()
            && self.acceleration.is_finite()
            && self.radius > 0.0
            && self.radius.is_finite()
            && self.max_speed >= 0.0
            && self.max_speed.is_finite()
    }
}

/// Collision shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColliderShape {
    /// Circle of the transform's radius
    #[default]
    Circle,
}

/// Marks an entity as collidable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Collider {
    /// Shape used for overlap tests
    pub shape: ColliderShape,
}

impl Collider {
    /// A circle collider
    pub fn circle() -> Self {
        Collider {
            shape: ColliderShape::Circle,
        }
    }
}

/// Marker: the entity is never moved or deflected by collision response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ObstacleTag;

/// Label used by rendering and by collision rules
///
/// The well-known labels get their own variants; anything else a user types
/// into the editor is kept verbatim in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Tag {
    /// Plain node with no behaviour of its own
    Node,
    /// Carries an attracting force field
    Attractor,
    /// Carries a repelling force field
    Repeller,
    /// Path-following particle
    Follower,
    /// Immovable obstacle
    Obstacle,
    /// Carries a zone force
    Zone,
    /// Any other label
    Other(String),
}

impl Tag {
    /// The label as it appears in snapshots and rule conditions
    pub fn as_str(&self) -> &str {
        match self {
            Tag::Node => "node",
            Tag::Attractor => "attractor",
            Tag::Repeller => "repeller",
            Tag::Follower => "follower",
            Tag::Obstacle => "obstacle",
            Tag::Zone => "zone",
            Tag::Other(label) => label,
        }
    }
}

impl From<&str> for Tag {
    fn from(label: &str) -> Self {
        match label {
            "node" => Tag::Node,
            "attractor" => Tag::Attractor,
            "repeller" => Tag::Repeller,
            "follower" => Tag::Follower,
            "obstacle" => Tag::Obstacle,
            "zone" => Tag::Zone,
            other => Tag::Other(other.to_string()),
        }
    }
}

impl From<String> for Tag {
    fn from(label: String) -> Self {
        Tag::from(label.as_str())
    }
}

impl From<Tag> for String {
    fn from(tag: Tag) -> Self {
        match tag {
            Tag::Other(label) => label,
            known => known.as_str().to_string(),
        }
    }
}

impl FromStr for Tag {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Tag::from(s))
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Direction of a radial force field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FieldKind {
    /// Pulls targets toward the source
    #[default]
    Attractor,
    /// Pushes targets away from the source
    Repeller,
}

impl FieldKind {
    /// Label as stored in snapshots
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldKind::Attractor => "attractor",
            FieldKind::Repeller => "repeller",
        }
    }

    /// The tag an entity takes on when it carries this kind of field
    pub fn tag(&self) -> Tag {
        match self {
            FieldKind::Attractor => Tag::Attractor,
            FieldKind::Repeller => Tag::Repeller,
        }
    }
}

impl From<&str> for FieldKind {
    /// Anything other than `"repeller"` attracts
    fn from(label: &str) -> Self {
        match label {
            "repeller" => FieldKind::Repeller,
            _ => FieldKind::Attractor,
        }
    }
}

impl From<String> for FieldKind {
    fn from(label: String) -> Self {
        FieldKind::from(label.as_str())
    }
}

impl From<FieldKind> for String {
    fn from(kind: FieldKind) -> Self {
        kind.as_str().to_string()
    }
}

/// Shape of a radial field's decay with distance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Falloff {
    /// `strength * (1 - d / range)`
    Linear,
    /// `strength / max(d², ε)`
    #[default]
    InvSq,
    /// `strength * exp(-3 d² / range²)`
    Exp,
}

impl Falloff {
    /// Label as stored in snapshots
    pub fn as_str(&self) -> &'static str {
        match self {
            Falloff::Linear => "linear",
            Falloff::InvSq => "invSq",
            Falloff::Exp => "exp",
        }
    }

    /// Unsigned force magnitude at squared distance `dist_sq`
    ///
    /// `max_range_sq` is the square of the field's maximum range. Only the
    /// inverse-square curve clamps the distance; the other two are exact at
    /// both ends of the range.
    ///
    /// ```
    /// use particle_sandbox::ecs::components::Falloff;
    ///
    /// assert_eq!(Falloff::Linear.magnitude(10.0, 0.0, 100.0), 10.0);
    /// assert_eq!(Falloff::Linear.magnitude(10.0, 100.0, 100.0), 0.0);
    /// assert!(Falloff::InvSq.magnitude(10.0, 0.0, 100.0).is_finite());
    /// ```
    pub fn magnitude(&self, strength: f64, dist_sq: f64, max_range_sq: f64) -> f64 {
        match self {
            Falloff::Linear => strength * (1.0 - dist_sq.sqrt() / max_range_sq.sqrt()),
            Falloff::InvSq => strength / dist_sq.max(INV_SQ_EPSILON),
            Falloff::Exp => strength * (-3.0 * dist_sq / max_range_sq).exp(),
        }
    }
}

impl From<&str> for Falloff {
    /// Unrecognised labels fall back to inverse-square
    fn from(label: &str) -> Self {
        match label {
            "linear" => Falloff::Linear,
            "exp" => Falloff::Exp,
            _ => Falloff::InvSq,
        }
    }
}

impl From<String> for Falloff {
    fn from(label: String) -> Self {
        Falloff::from(label.as_str())
    }
}

impl From<Falloff> for String {
    fn from(falloff: Falloff) -> Self {
        falloff.as_str().to_string()
    }
}

/// Radial force source
///
/// Acts on every other transform within `radius * range_mul` of the owner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForceField {
    /// Signed base strength
    pub strength: f64,
    /// Attract or repel
    pub kind: FieldKind,
    /// Range as a multiple of the owner's radius, > 0
    pub range_mul: f64,
    /// Decay curve
    pub falloff: Falloff,
}

impl ForceField {
    /// Create a force field
    ///
    /// # Panics
    ///
    /// Panics if `range_mul` is not positive and finite.
    pub fn new(strength: f64, kind: FieldKind, range_mul: f64, falloff: Falloff) -> Self {
        assert!(
            range_mul > 0.0 && range_mul.is_finite(),
            "Force field range multiplier must be positive and finite"
        );
        ForceField {
            strength,
            kind,
            range_mul,
            falloff,
        }
    }

    /// Signed magnitude: positive pulls toward the source
    pub fn signed_magnitude(&self, dist_sq: f64, max_range_sq: f64) -> f64 {
        let magnitude = self.falloff.magnitude(self.strength, dist_sq, max_range_sq);
        match self.kind {
            FieldKind::Attractor => magnitude,
            FieldKind::Repeller => -magnitude,
        }
    }
}

impl Default for ForceField {
    fn default() -> Self {
        ForceField::new(50.0, FieldKind::Attractor, 2.0, Falloff::InvSq)
    }
}

/// Directional push over a disc
///
/// Unlike [`ForceField`] the force does not point at or away from the
/// source: every target in range is pushed along the same world-space
/// `direction`, scaled only by how close it is to the centre.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoneForce {
    /// Unit push direction
    pub direction: DVec2,
    /// Push strength at the centre
    pub strength: f64,
    /// Disc radius, > 0
    pub radius: f64,
}

impl ZoneForce {
    /// Create a zone force, normalising `direction`
    ///
    /// A zero or non-finite direction falls back to +X.
    ///
    /// # Panics
    ///
    /// Panics if `radius` is not positive and finite.
    pub fn new(direction: DVec2, strength: f64, radius: f64) -> Self {
        assert!(
            radius > 0.0 && radius.is_finite(),
            "Zone radius must be positive and finite"
        );
        ZoneForce {
            direction: direction.try_normalize().unwrap_or(DVec2::X),
            strength,
            radius,
        }
    }
}

impl Default for ZoneForce {
    fn default() -> Self {
        ZoneForce::new(DVec2::X, 20.0, 100.0)
    }
}

/// Steering state for path following
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathTarget {
    /// Current target; `None` disables steering
    pub target_pos: Option<DVec2>,
    /// Targets to visit after the current one, front first
    pub waypoints: VecDeque<DVec2>,
    /// Clear the target on arrival when no waypoints remain
    pub stop_at_target: bool,
    /// Steering gain
    pub strength: f64,
}

impl PathTarget {
    /// Create a steering state aimed at `target_pos`
    pub fn new(target_pos: Option<DVec2>, strength: f64, stop_at_target: bool) -> Self {
        PathTarget {
            target_pos,
            waypoints: VecDeque::new(),
            stop_at_target,
            strength,
        }
    }

    /// Builder-style waypoint queue
    pub fn with_waypoints(mut self, waypoints: impl IntoIterator<Item = DVec2>) -> Self {
        self.waypoints.extend(waypoints);
        self
    }

    /// Queue another waypoint behind the existing ones
    pub fn push_waypoint(&mut self, waypoint: DVec2) {
        self.waypoints.push_back(waypoint);
    }

    /// Whether the entity is currently steering
    pub fn is_active(&self) -> bool {
        self.target_pos.is_some()
    }
}

impl Default for PathTarget {
    fn default() -> Self {
        PathTarget::new(None, 1.0, true)
    }
}

/// Identifier for each component kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ComponentKind {
    /// [`Transform`]
    Transform,
    /// [`Collider`]
    Collider,
    /// [`ObstacleTag`]
    ObstacleTag,
    /// [`Tag`]
    Tag,
    /// [`ForceField`]
    ForceField,
    /// [`ZoneForce`]
    ZoneForce,
    /// [`PathTarget`]
    PathTarget,
}

impl ComponentKind {
    /// Every kind, in table order
    pub const ALL: [ComponentKind; 7] = [
        ComponentKind::Transform,
        ComponentKind::Collider,
        ComponentKind::ObstacleTag,
        ComponentKind::Tag,
        ComponentKind::ForceField,
        ComponentKind::ZoneForce,
        ComponentKind::PathTarget,
    ];

    /// Kind name as used by the editor and snapshots
    pub fn name(&self) -> &'static str {
        match self {
            ComponentKind::Transform => "Transform",
            ComponentKind::Collider => "Collider",
            ComponentKind::ObstacleTag => "ObstacleTag",
            ComponentKind::Tag => "Tag",
            ComponentKind::ForceField => "ForceField",
            ComponentKind::ZoneForce => "ZoneForce",
            ComponentKind::PathTarget => "PathTarget",
        }
    }
}

impl FromStr for ComponentKind {
    type Err = SandboxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ComponentKind::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| SandboxError::UnknownComponentKind(s.to_string()))
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A component of any kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ComponentValue {
    /// [`Transform`]
    Transform(Transform),
    /// [`Collider`]
    Collider(Collider),
    /// [`ObstacleTag`]
    ObstacleTag(ObstacleTag),
    /// [`Tag`]
    Tag(Tag),
    /// [`ForceField`]
    ForceField(ForceField),
    /// [`ZoneForce`]
    ZoneForce(ZoneForce),
    /// [`PathTarget`]
    PathTarget(PathTarget),
}

impl ComponentValue {
    /// Kind of the wrapped component
    pub fn kind(&self) -> ComponentKind {
        match self {
            ComponentValue::Transform(_) => ComponentKind::Transform,
            ComponentValue::Collider(_) => ComponentKind::Collider,
            ComponentValue::ObstacleTag(_) => ComponentKind::ObstacleTag,
            ComponentValue::Tag(_) => ComponentKind::Tag,
            ComponentValue::ForceField(_) => ComponentKind::ForceField,
            ComponentValue::ZoneForce(_) => ComponentKind::ZoneForce,
            ComponentValue::PathTarget(_) => ComponentKind::PathTarget,
        }
    }
}

/// One table per component kind
///
/// Fields are public so systems can borrow several tables at once, e.g.
/// path targets mutably while transforms are also mutable.
#[derive(Debug, Clone, Default)]
pub struct Components {
    /// Transform table
    pub transforms: ComponentTable<Transform>,
    /// Collider table
    pub colliders: ComponentTable<Collider>,
    /// ObstacleTag table
    pub obstacles: ComponentTable<ObstacleTag>,
    /// Tag table
    pub tags: ComponentTable<Tag>,
    /// ForceField table
    pub force_fields: ComponentTable<ForceField>,
    /// ZoneForce table
    pub zone_forces: ComponentTable<ZoneForce>,
    /// PathTarget table
    pub path_targets: ComponentTable<PathTarget>,
}

impl Components {
    /// Create an empty table set
    pub fn new() -> Self {
        Self::default()
    }

    /// All tables behind the uniform storage interface, in kind order
    pub fn storages(&self) -> [&dyn ComponentStorage; 7] {
        [
            &self.transforms,
            &self.colliders,
            &self.obstacles,
            &self.tags,
            &self.force_fields,
            &self.zone_forces,
            &self.path_targets,
        ]
    }

    /// Mutable counterpart of [`storages`](Self::storages)
    pub fn storages_mut(&mut self) -> [&mut dyn ComponentStorage; 7] {
        [
            &mut self.transforms,
            &mut self.colliders,
            &mut self.obstacles,
            &mut self.tags,
            &mut self.force_fields,
            &mut self.zone_forces,
            &mut self.path_targets,
        ]
    }

    /// Table behind the uniform interface for one kind
    pub fn storage(&self, kind: ComponentKind) -> &dyn ComponentStorage {
        match kind {
            ComponentKind::Transform => &self.transforms,
            ComponentKind::Collider => &self.colliders,
            ComponentKind::ObstacleTag => &self.obstacles,
            ComponentKind::Tag => &self.tags,
            ComponentKind::ForceField => &self.force_fields,
            ComponentKind::ZoneForce => &self.zone_forces,
            ComponentKind::PathTarget => &self.path_targets,
        }
    }

    /// Drop `entity` from every table; returns how many entries went
    pub fn remove_entity(&mut self, entity: Entity) -> usize {
        self.storages_mut()
            .into_iter()
            .filter_map(|storage| storage.remove_entity(entity).then_some(()))
            .count()
    }

    /// Insert or replace a kind-erased component
    pub fn insert_value(&mut self, entity: Entity, value: ComponentValue) {
        match value {
            ComponentValue::Transform(c) => {
                self.transforms.insert(entity, c);
            }
            ComponentValue::Collider(c) => {
                self.colliders.insert(entity, c);
            }
            ComponentValue::ObstacleTag(c) => {
                self.obstacles.insert(entity, c);
            }
            ComponentValue::Tag(c) => {
                self.tags.insert(entity, c);
            }
            ComponentValue::ForceField(c) => {
                self.force_fields.insert(entity, c);
            }
            ComponentValue::ZoneForce(c) => {
                self.zone_forces.insert(entity, c);
            }
            ComponentValue::PathTarget(c) => {
                self.path_targets.insert(entity, c);
            }
        }
    }

    /// Copy out one kind's table as `(entity, value)` pairs, in table order
    pub fn entries(&self, kind: ComponentKind) -> Vec<(Entity, ComponentValue)> {
        fn collect<T: Component>(table: &ComponentTable<T>) -> Vec<(Entity, ComponentValue)> {
            table
                .iter()
                .map(|(entity, value)| (entity, value.clone().into_value()))
                .collect()
        }

        match kind {
            ComponentKind::Transform => collect(&self.transforms),
            ComponentKind::Collider => collect(&self.colliders),
            ComponentKind::ObstacleTag => collect(&self.obstacles),
            ComponentKind::Tag => collect(&self.tags),
            ComponentKind::ForceField => collect(&self.force_fields),
            ComponentKind::ZoneForce => collect(&self.zone_forces),
            ComponentKind::PathTarget => collect(&self.path_targets),
        }
    }

    /// Clear every table
    pub fn clear(&mut self) {
        for storage in self.storages_mut() {
            storage.clear();
        }
    }
}

macro_rules! impl_component {
    ($ty:ident, $field:ident) => {
        impl Component for $ty {
            const KIND: ComponentKind = ComponentKind::$ty;

            fn table(components: &Components) -> &ComponentTable<Self> {
                &components.$field
            }

            fn table_mut(components: &mut Components) -> &mut ComponentTable<Self> {
                &mut components.$field
            }

            fn into_value(self) -> ComponentValue {
                ComponentValue::$ty(self)
            }
        }
    };
}

impl_component!(Transform, transforms);
impl_component!(Collider, colliders);
impl_component!(ObstacleTag, obstacles);
impl_component!(Tag, tags);
impl_component!(ForceField, force_fields);
impl_component!(ZoneForce, zone_forces);
impl_component!(PathTarget, path_targets);
