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
//! Physics system
//!
//! The [`PhysicsSystem`] owns the live bodies, colliders and triggers and
//! advances the simulation one step per frame: broad phase over a fresh
//! quadtree, exact circle tests, elastic impulse resolution, collision and
//! trigger hooks, then position integration.

use glam::DVec2;
use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::Rc;

use crate::entity::Entity;
use crate::transform::Transform;

use super::aabb::Aabb;
use super::body::{BodyId, Collision, Mass, PhysicsBody};
use super::collider::{Collider, ColliderId, TriggerCollider};
use super::quadtree::{Quadtree, QuadtreeItem};

pub(crate) struct PhysicsSystemInner {
    bodies: RefCell<Vec<PhysicsBody>>,
    colliders: RefCell<Vec<Collider>>,
    triggers: RefCell<Vec<TriggerCollider>>,
    next_body_id: Cell<u64>,
    next_collider_id: Cell<u64>,
}

impl PhysicsSystemInner {
    pub(crate) fn allocate_collider_id(&self) -> ColliderId {
        let id = self.next_collider_id.get();
        self.next_collider_id.set(id + 1);
        ColliderId::new(id)
    }

    pub(crate) fn register_collider(&self, collider: Collider) {
        self.colliders.borrow_mut().push(collider);
    }

    pub(crate) fn discard_body(&self, id: BodyId) {
        self.bodies.borrow_mut().retain(|body| body.id() != id);
    }

    pub(crate) fn discard_collider(&self, id: ColliderId) {
        self.colliders
            .borrow_mut()
            .retain(|collider| collider.id() != id);
    }

    pub(crate) fn discard_trigger(&self, collider_id: ColliderId) {
        self.triggers
            .borrow_mut()
            .retain(|trigger| trigger.collider().id() != collider_id);
    }
}

/// The collision and motion simulation for a set of circle bodies.
///
/// `PhysicsSystem` is a cheap clonable handle; clones refer to the same
/// system. The external frame loop calls [`PhysicsSystem::update`] once per
/// frame, after entity updates.
///
/// Bodies, colliders and triggers are destroyed with their entities; all of
/// them may also be destroyed directly, including from hooks running inside
/// an update.
///
/// # Examples
///
/// ```
/// use arcade_core::{EntitySystem, Mass, PhysicsSystem, Transform};
/// use glam::DVec2;
///
/// let entities = EntitySystem::new();
/// let physics = PhysicsSystem::new();
///
/// let entity = entities.new_entity();
/// let body = physics.new_body(&entity, Transform::new(), Mass::new(1.0));
/// body.add_circle_collider(10.0);
/// body.set_velocity(DVec2::new(0.1, 0.0));
///
/// physics.update(16.0);
/// assert_eq!(body.transform().x(), 1.6);
///
/// entity.destroy();
/// assert_eq!(physics.body_count(), 0);
/// ```
#[derive(Clone)]
pub struct PhysicsSystem {
    inner: Rc<PhysicsSystemInner>,
}

impl PhysicsSystem {
    /// Create an empty physics system
    pub fn new() -> Self {
        PhysicsSystem {
            inner: Rc::new(PhysicsSystemInner {
                bodies: RefCell::new(Vec::new()),
                colliders: RefCell::new(Vec::new()),
                triggers: RefCell::new(Vec::new()),
                next_body_id: Cell::new(0),
                next_collider_id: Cell::new(0),
            }),
        }
    }

    /// Create a physics body tied to the entity's lifetime
    ///
    /// The transform must not have a parent: the system integrates positions
    /// by writing into it directly. The body starts at rest; give it a shape
    /// with [`PhysicsBody::add_circle_collider`].
    pub fn new_body(&self, entity: &Entity, transform: Transform, mass: Mass) -> PhysicsBody {
        let id = BodyId::new(self.inner.next_body_id.get());
        self.inner.next_body_id.set(id.raw() + 1);

        log::debug!("created {} for {}", id, entity.id());

        let body = PhysicsBody::new(
            id,
            entity.clone(),
            transform,
            mass,
            Rc::downgrade(&self.inner),
        );
        self.inner.bodies.borrow_mut().push(body.clone());
        body
    }

    /// Create a circle trigger zone tied to the entity's lifetime
    ///
    /// The trigger detects overlaps with every collider in the system but
    /// never causes collision resolution.
    pub fn new_circle_trigger(
        &self,
        entity: &Entity,
        transform: Transform,
        radius: f64,
    ) -> TriggerCollider {
        let id = self.inner.allocate_collider_id();
        let collider = Collider::new_trigger(id, transform, radius, Rc::downgrade(&self.inner));
        self.inner.register_collider(collider.clone());

        let trigger = TriggerCollider::new(collider, entity.clone(), Rc::downgrade(&self.inner));
        self.inner.triggers.borrow_mut().push(trigger.clone());
        trigger
    }

    /// Advance the simulation by `delta_ms` milliseconds
    ///
    /// One step runs, in order:
    /// 1. broad phase: a quadtree over every live collider yields candidate
    ///    pairs;
    /// 2. narrow phase: candidates are re-checked with the exact circle
    ///    test; trigger overlaps are recorded, regular overlaps become body
    ///    contacts (one per body pair, however many colliders touch);
    /// 3. resolution: approaching contacts receive an elastic impulse; all
    ///    impulses are applied before any collision hook runs, then each
    ///    pair's hooks fire once from each side, skipping sides destroyed by
    ///    an earlier hook;
    /// 4. trigger diffing: exit, enter and stay hooks per trigger;
    /// 5. integration: every live body moves by `velocity * delta_ms`.
    ///
    /// Hooks may create and destroy entities, bodies, colliders and triggers
    /// freely; the step iterates over snapshots.
    pub fn update(&self, delta_ms: f64) {
        let colliders: Vec<Collider> = self.inner.colliders.borrow().clone();
        let triggers: Vec<TriggerCollider> = self.inner.triggers.borrow().clone();

        let tree = Quadtree::build(
            colliders
                .iter()
                .enumerate()
                .map(|(index, collider)| QuadtreeItem {
                    aabb: collider.aabb(),
                    payload: index,
                })
                .collect(),
        );
        let candidates = tree.nearby_pairs();

        log::trace!(
            "physics step: {} colliders, {} candidate pairs",
            colliders.len(),
            candidates.len()
        );

        let trigger_index: BTreeMap<ColliderId, TriggerCollider> = triggers
            .iter()
            .map(|trigger| (trigger.collider().id(), trigger.clone()))
            .collect();

        // Narrow phase. Trigger overlaps go into the trigger's current set;
        // regular overlaps collapse to one contact per body pair.
        let mut contacts: BTreeMap<(BodyId, BodyId), (PhysicsBody, PhysicsBody)> = BTreeMap::new();
        for (i, j) in candidates {
            let a = &colliders[i];
            let b = &colliders[j];
            if !a.overlaps(b) {
                continue;
            }

            if let Some(trigger) = trigger_index.get(&a.id()) {
                trigger.record_touch(b.clone());
            }
            if let Some(trigger) = trigger_index.get(&b.id()) {
                trigger.record_touch(a.clone());
            }

            if let (Some(body_a), Some(body_b)) = (a.body(), b.body()) {
                if body_a.id() == body_b.id() {
                    continue;
                }
                let (first, second) = if body_a.id() < body_b.id() {
                    (body_a, body_b)
                } else {
                    (body_b, body_a)
                };
                contacts
                    .entry((first.id(), second.id()))
                    .or_insert((first, second));
            }
        }

        // Resolution. Impulses for every approaching contact first, hooks
        // afterwards, so a hook that destroys a body cannot leave another
        // contact half-resolved.
        let mut resolved: Vec<(PhysicsBody, PhysicsBody)> = Vec::new();
        for (body_a, body_b) in contacts.into_values() {
            let separation = body_a.transform().position() - body_b.transform().position();
            let dist_sq = separation.length_squared();
            if dist_sq == 0.0 {
                // Coincident centers: no usable normal.
                continue;
            }

            let relative_velocity = body_a.velocity() - body_b.velocity();
            let approach = relative_velocity.dot(separation);
            if approach > 0.0 {
                // Already separating.
                continue;
            }

            let inverse_mass_sum = body_a.mass().inverse() + body_b.mass().inverse();
            if inverse_mass_sum > 0.0 {
                let t = -2.0 * approach / inverse_mass_sum / dist_sq;
                let impulse = separation * t;
                body_a.add_impulse(impulse);
                body_b.add_impulse(-impulse);
            }
            resolved.push((body_a, body_b));
        }

        for (body_a, body_b) in resolved {
            if !body_a.is_destroyed() {
                body_a.run_collision_hooks(&Collision::new(body_a.clone(), body_b.clone()));
            }
            if !body_b.is_destroyed() {
                body_b.run_collision_hooks(&Collision::new(body_b.clone(), body_a.clone()));
            }
        }

        for trigger in &triggers {
            if !trigger.is_destroyed() {
                trigger.run_diff();
            }
        }

        let bodies: Vec<PhysicsBody> = self.inner.bodies.borrow().clone();
        for body in bodies {
            if !body.is_destroyed() {
                body.transform().translate(body.velocity() * delta_ms);
            }
        }
    }

    /// Get the number of live bodies
    pub fn body_count(&self) -> usize {
        self.inner.bodies.borrow().len()
    }

    /// Get the number of live colliders, trigger colliders included
    pub fn collider_count(&self) -> usize {
        self.inner.colliders.borrow().len()
    }

    /// Get the number of live triggers
    pub fn trigger_count(&self) -> usize {
        self.inner.triggers.borrow().len()
    }

    /// Get the total kinetic energy of all live bodies
    ///
    /// Infinite-mass bodies contribute zero. Elastic resolution leaves this
    /// total unchanged.
    pub fn kinetic_energy(&self) -> f64 {
        self.inner
            .bodies
            .borrow()
            .iter()
            .map(PhysicsBody::kinetic_energy)
            .sum()
    }

    /// Get the total momentum of all live bodies
    ///
    /// Infinite-mass bodies contribute zero. Resolution between finite
    /// masses leaves this total unchanged.
    pub fn total_momentum(&self) -> DVec2 {
        self.inner
            .bodies
            .borrow()
            .iter()
            .map(PhysicsBody::momentum)
            .sum()
    }

    /// Get the node bounding boxes of a quadtree built over the current
    /// colliders, root first
    ///
    /// Debug introspection for visualizing the broad phase; the returned tree
    /// matches what the next [`PhysicsSystem::update`] would build if nothing
    /// moves.
    pub fn debug_bounding_boxes(&self) -> Vec<Aabb> {
        let tree = Quadtree::build(
            self.inner
                .colliders
                .borrow()
                .iter()
                .enumerate()
                .map(|(index, collider)| QuadtreeItem {
                    aabb: collider.aabb(),
                    payload: index,
                })
                .collect(),
        );
        tree.node_bounds()
    }
}

impl Default for PhysicsSystem {
    fn default() -> Self {
        Self::new()
    }
}
