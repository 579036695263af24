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
//! # Arcade Core
//!
//! The runtime core of a real-time 2D arcade game: entity lifecycle with
//! hookable events, cooperative coroutine scheduling, and an elastic circle
//! physics simulation with quadtree broad phase.
//!
//! ## Features
//!
//! - **Entity Lifecycle**: destroyable entities with update/destroy hooks and
//!   parent-follows-destruction cascades
//! - **Coroutines**: multi-frame behaviors driven one slice per frame, with
//!   suspend/resume and timed continuations
//! - **Circle Physics**: velocity integration and elastic collision
//!   resolution over point-mass circles
//! - **Trigger Zones**: enter/exit/stay overlap events without resolution
//! - **Broad Phase**: adaptive quadtree candidate-pair detection
//!
//! Everything is single-threaded and frame-stepped: the external loop calls,
//! once per frame, entity update, then the clock pump, then the physics
//! update.
//!
//! ## Example
//!
//! ```rust
//! use arcade_core::{EntitySystem, GameClock, Mass, PhysicsSystem, Transform};
//! use glam::DVec2;
//!
//! let entities = EntitySystem::new();
//! let clock = GameClock::new();
//! let physics = PhysicsSystem::new();
//!
//! let asteroid = entities.new_entity();
//! let body = physics.new_body(&asteroid, Transform::new(), Mass::new(4.0));
//! body.add_circle_collider(20.0);
//! body.set_velocity(DVec2::new(0.05, 0.0));
//!
//! // One frame, 16 ms.
//! entities.update(16.0);
//! clock.advance(16.0);
//! clock.run_due_callbacks();
//! physics.update(16.0);
//! ```

#![warn(missing_docs)]

/// Hook lists: subscribable callback collections
pub mod hooks;

/// Entities and the entity system
pub mod entity;

/// Coroutine tasks and the game clock
pub mod task;

/// Bodies, colliders, triggers and the physics system
pub mod physics;

/// Hierarchical 2D transforms
pub mod transform;

pub use entity::{Entity, EntityId, EntitySystem};
pub use hooks::{HookList, Unsubscriber};
pub use physics::{
    Aabb, BodyId, Collider, ColliderId, ColliderRole, Collision, Mass, PhysicsBody, PhysicsSystem,
    Quadtree, QuadtreeItem, TriggerCollider, TriggerEvent,
};
pub use task::{
    resume_after, Coroutine, FnCoroutine, GameClock, ResumeHandle, Sequence, Step, Task,
    WaitInstruction,
};
pub use transform::Transform;
