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
//! 2D circle physics
//!
//! Elastic, translation-only collision simulation over point-mass circles:
//! - [`PhysicsSystem`]: the per-frame step (broad phase, resolution,
//!   triggers, integration)
//! - [`PhysicsBody`] and [`Collider`]: moving bodies and their shapes
//! - [`TriggerCollider`]: overlap zones reporting enter/exit/stay
//! - [`Aabb`] and [`Quadtree`]: the broad-phase spatial index

mod aabb;
mod body;
mod collider;
mod quadtree;
mod system;

pub use aabb::Aabb;
pub use body::{BodyId, Collision, Mass, PhysicsBody};
pub use collider::{Collider, ColliderId, ColliderRole, TriggerCollider, TriggerEvent};
pub use quadtree::{Quadtree, QuadtreeItem};
pub use system::PhysicsSystem;
