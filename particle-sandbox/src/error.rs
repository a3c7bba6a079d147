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
//! Error types for the sandbox boundary
//!
//! The frame loop itself never fails; these errors only come out of the
//! edges where outside data enters the core: configuration, snapshot
//! import and kind names typed by a user.

use crate::ecs::components::ComponentKind;
use crate::ecs::Entity;

/// Errors raised at the sandbox boundary
#[derive(Debug, thiserror::Error)]
pub enum SandboxError {
    /// A component kind name did not match any known kind
    #[error("unknown component kind: {0}")]
    UnknownComponentKind(String),

    /// Snapshot or config JSON could not be encoded or decoded
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// An imported component breaks a data-model invariant
    #[error("invalid {kind} on {entity}: {reason}")]
    InvalidComponent {
        /// Kind of the offending component
        kind: ComponentKind,
        /// Entity it was attached to
        entity: Entity,
        /// What was wrong with it
        reason: String,
    },

    /// Simulation configuration is out of range
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result alias for boundary operations
pub type Result<T> = std::result::Result<T, SandboxError>;
