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
//! Colliders and trigger zones
//!
//! A [`Collider`] is a circle used for overlap testing. Its role decides what
//! an overlap means: a regular collider belongs to a physics body and
//! overlaps are resolved with impulses; a trigger collider belongs to an
//! entity and overlaps only produce enter/exit/stay events through its
//! [`TriggerCollider`] handle.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use crate::entity::Entity;
use crate::hooks::{HookList, Unsubscriber};
use crate::transform::Transform;

use super::aabb::Aabb;
use super::body::{PhysicsBody, WeakPhysicsBody};
use super::system::PhysicsSystemInner;

/// Unique identifier for a collider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ColliderId(u64);

impl ColliderId {
    /// Create a new ColliderId from a raw u64 value
    pub fn new(id: u64) -> Self {
        ColliderId(id)
    }

    /// Get the raw u64 value
    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ColliderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Collider({})", self.0)
    }
}

/// What an overlap with this collider means
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColliderRole {
    /// Body-owned; overlapping regular colliders are resolved with impulses
    Regular,
    /// Entity-owned overlap sensor; never resolved, only reported
    Trigger,
}

enum Owner {
    Body(WeakPhysicsBody),
    Trigger,
}

struct ColliderInner {
    id: ColliderId,
    radius: Cell<f64>,
    transform: Transform,
    owner: Owner,
    destroyed: Cell<bool>,
    system: Weak<PhysicsSystemInner>,
}

/// A circle collider, centered on its transform.
///
/// `Collider` is a cheap clonable handle; clones refer to the same collider.
/// Regular colliders are created with
/// [`PhysicsBody::add_circle_collider`]; trigger colliders are created
/// through [`PhysicsSystem::new_circle_trigger`](super::PhysicsSystem::new_circle_trigger)
/// and owned by the returned [`TriggerCollider`].
#[derive(Clone)]
pub struct Collider {
    inner: Rc<ColliderInner>,
}

impl Collider {
    pub(crate) fn new_regular(
        id: ColliderId,
        body: &PhysicsBody,
        radius: f64,
        system: Weak<PhysicsSystemInner>,
    ) -> Self {
        assert!(radius > 0.0, "collider radius must be positive, got {radius}");
        Collider {
            inner: Rc::new(ColliderInner {
                id,
                radius: Cell::new(radius),
                transform: body.transform().clone(),
                owner: Owner::Body(body.downgrade()),
                destroyed: Cell::new(false),
                system,
            }),
        }
    }

    pub(crate) fn new_trigger(
        id: ColliderId,
        transform: Transform,
        radius: f64,
        system: Weak<PhysicsSystemInner>,
    ) -> Self {
        assert!(radius > 0.0, "collider radius must be positive, got {radius}");
        Collider {
            inner: Rc::new(ColliderInner {
                id,
                radius: Cell::new(radius),
                transform,
                owner: Owner::Trigger,
                destroyed: Cell::new(false),
                system,
            }),
        }
    }

    /// Get the collider's stable identifier
    pub fn id(&self) -> ColliderId {
        self.inner.id
    }

    /// Get the circle radius
    pub fn radius(&self) -> f64 {
        self.inner.radius.get()
    }

    /// Set the circle radius
    pub fn set_radius(&self, radius: f64) {
        assert!(radius > 0.0, "collider radius must be positive, got {radius}");
        self.inner.radius.set(radius);
    }

    /// Get the transform the circle is centered on
    pub fn transform(&self) -> &Transform {
        &self.inner.transform
    }

    /// Get the collider's role
    pub fn role(&self) -> ColliderRole {
        match self.inner.owner {
            Owner::Body(_) => ColliderRole::Regular,
            Owner::Trigger => ColliderRole::Trigger,
        }
    }

    /// Get the body that owns this collider, if it is a live regular collider
    pub fn body(&self) -> Option<PhysicsBody> {
        match &self.inner.owner {
            Owner::Body(body) => body.upgrade(),
            Owner::Trigger => None,
        }
    }

    /// Get the collider's current axis-aligned bounding box
    pub fn aabb(&self) -> Aabb {
        let center = self.inner.transform.position();
        let radius = self.inner.radius.get();
        Aabb::new(
            center.x - radius,
            center.x + radius,
            center.y - radius,
            center.y + radius,
        )
    }

    /// Check whether the circles overlap
    ///
    /// The test is strict: circles that merely touch do not overlap.
    pub fn overlaps(&self, other: &Collider) -> bool {
        let separation = self.inner.transform.position() - other.inner.transform.position();
        let radii = self.inner.radius.get() + other.inner.radius.get();
        separation.length_squared() < radii * radii
    }

    /// Destroy this collider, removing it from collision detection
    ///
    /// Destroying an already-destroyed collider is a no-op. Destroying the
    /// inner collider of a live trigger leaves the trigger inert; prefer
    /// [`TriggerCollider::destroy`].
    pub fn destroy(&self) {
        if self.inner.destroyed.replace(true) {
            return;
        }

        log::debug!("destroying {}", self.inner.id);

        if let Some(system) = self.inner.system.upgrade() {
            system.discard_collider(self.inner.id);
        }

        if let Owner::Body(body) = &self.inner.owner {
            if let Some(body) = body.upgrade() {
                body.detach_collider(self.inner.id);
            }
        }
    }

    /// Check whether this collider has been destroyed
    pub fn is_destroyed(&self) -> bool {
        self.inner.destroyed.get()
    }
}

impl PartialEq for Collider {
    fn eq(&self, other: &Self) -> bool {
        self.inner.id == other.inner.id
    }
}

impl Eq for Collider {}

impl fmt::Debug for Collider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Collider")
            .field("id", &self.inner.id)
            .field("radius", &self.inner.radius.get())
            .field("role", &self.role())
            .field("destroyed", &self.inner.destroyed.get())
            .finish()
    }
}

struct TriggerInner {
    collider: Collider,
    entity: Entity,
    current: RefCell<Vec<Collider>>,
    previous: RefCell<Vec<Collider>>,
    enter_hooks: HookList<TriggerEvent>,
    exit_hooks: HookList<TriggerEvent>,
    stay_hooks: HookList<TriggerEvent>,
    destroyed: Cell<bool>,
    entity_unsub: RefCell<Option<Unsubscriber>>,
    system: Weak<PhysicsSystemInner>,
}

/// An overlap sensor zone.
///
/// Create triggers with
/// [`PhysicsSystem::new_circle_trigger`](super::PhysicsSystem::new_circle_trigger).
/// `TriggerCollider` is a cheap clonable handle; clones refer to the same
/// trigger. A trigger is destroyed together with its entity.
///
/// Each physics step compares the set of colliders overlapping the trigger
/// against the previous step's set:
/// - colliders present only last step fire the exit hooks,
/// - colliders present only this step fire the enter hooks,
/// - colliders present in both fire the stay hooks.
#[derive(Clone)]
pub struct TriggerCollider {
    inner: Rc<TriggerInner>,
}

impl TriggerCollider {
    pub(crate) fn new(
        collider: Collider,
        entity: Entity,
        system: Weak<PhysicsSystemInner>,
    ) -> Self {
        let trigger = TriggerCollider {
            inner: Rc::new(TriggerInner {
                collider,
                entity,
                current: RefCell::new(Vec::new()),
                previous: RefCell::new(Vec::new()),
                enter_hooks: HookList::new(),
                exit_hooks: HookList::new(),
                stay_hooks: HookList::new(),
                destroyed: Cell::new(false),
                entity_unsub: RefCell::new(None),
                system,
            }),
        };

        let unsub = {
            let handle = trigger.clone();
            trigger.inner.entity.on_destroy(move || handle.destroy())
        };
        *trigger.inner.entity_unsub.borrow_mut() = Some(unsub);

        trigger
    }

    /// Get the underlying circle collider
    pub fn collider(&self) -> &Collider {
        &self.inner.collider
    }

    /// Get the entity this trigger belongs to
    pub fn entity(&self) -> &Entity {
        &self.inner.entity
    }

    /// Get the transform the trigger zone is centered on
    pub fn transform(&self) -> &Transform {
        self.inner.collider.transform()
    }

    /// Add a hook that runs when a collider starts overlapping the trigger
    pub fn on_enter<F>(&self, hook: F) -> Unsubscriber
    where
        F: FnMut(&TriggerEvent) + 'static,
    {
        self.inner.enter_hooks.subscribe(hook)
    }

    /// Add a hook that runs when a collider stops overlapping the trigger
    pub fn on_exit<F>(&self, hook: F) -> Unsubscriber
    where
        F: FnMut(&TriggerEvent) + 'static,
    {
        self.inner.exit_hooks.subscribe(hook)
    }

    /// Add a hook that runs each step a collider keeps overlapping the
    /// trigger, from the step after it entered
    pub fn on_stay<F>(&self, hook: F) -> Unsubscriber
    where
        F: FnMut(&TriggerEvent) + 'static,
    {
        self.inner.stay_hooks.subscribe(hook)
    }

    /// Destroy this trigger and its collider
    ///
    /// Destroying an already-destroyed trigger is a no-op. No exit events are
    /// delivered for overlaps in progress.
    pub fn destroy(&self) {
        if self.inner.destroyed.replace(true) {
            return;
        }

        let entity_unsub = self.inner.entity_unsub.borrow_mut().take();
        if let Some(mut unsub) = entity_unsub {
            unsub.unsubscribe();
        }

        if let Some(system) = self.inner.system.upgrade() {
            system.discard_trigger(self.inner.collider.id());
        }

        self.inner.collider.destroy();
        self.inner.current.borrow_mut().clear();
        self.inner.previous.borrow_mut().clear();

        // Release closures captured by trigger hooks, breaking any reference
        // cycles through this trigger.
        self.inner.enter_hooks.clear();
        self.inner.exit_hooks.clear();
        self.inner.stay_hooks.clear();
    }

    /// Check whether this trigger has been destroyed
    pub fn is_destroyed(&self) -> bool {
        self.inner.destroyed.get()
    }

    /// Records a collider as overlapping the trigger this step.
    pub(crate) fn record_touch(&self, other: Collider) {
        let mut current = self.inner.current.borrow_mut();
        if !current.iter().any(|collider| collider.id() == other.id()) {
            current.push(other);
        }
    }

    /// Diffs this step's touch set against the previous step's and fires
    /// exit, enter and stay hooks. Rolls the current set into the previous.
    pub(crate) fn run_diff(&self) {
        let current = std::mem::take(&mut *self.inner.current.borrow_mut());
        let previous = std::mem::replace(&mut *self.inner.previous.borrow_mut(), current.clone());

        let in_current =
            |id: ColliderId| current.iter().any(|collider| collider.id() == id);
        let in_previous =
            |id: ColliderId| previous.iter().any(|collider| collider.id() == id);

        for collider in &previous {
            if !in_current(collider.id()) {
                self.inner
                    .exit_hooks
                    .run(&TriggerEvent::new(self.clone(), collider.clone()));
            }
        }

        // An exit hook may destroy the trigger; stop delivering events if so.
        if self.inner.destroyed.get() {
            return;
        }

        for collider in &current {
            if !in_previous(collider.id()) {
                self.inner
                    .enter_hooks
                    .run(&TriggerEvent::new(self.clone(), collider.clone()));
            }
        }

        if self.inner.destroyed.get() {
            return;
        }

        for collider in &current {
            if in_previous(collider.id()) {
                self.inner
                    .stay_hooks
                    .run(&TriggerEvent::new(self.clone(), collider.clone()));
            }
        }
    }
}

impl PartialEq for TriggerCollider {
    fn eq(&self, other: &Self) -> bool {
        self.inner.collider == other.inner.collider
    }
}

impl Eq for TriggerCollider {}

impl fmt::Debug for TriggerCollider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TriggerCollider")
            .field("id", &self.inner.collider.id())
            .field("destroyed", &self.inner.destroyed.get())
            .finish()
    }
}

/// One trigger overlap transition, passed to enter, exit and stay hooks.
#[derive(Clone)]
pub struct TriggerEvent {
    trigger: TriggerCollider,
    other: Collider,
}

impl TriggerEvent {
    pub(crate) fn new(trigger: TriggerCollider, other: Collider) -> Self {
        TriggerEvent { trigger, other }
    }

    /// Get the trigger the overlap happened on
    pub fn trigger(&self) -> &TriggerCollider {
        &self.trigger
    }

    /// Get the collider that overlapped the trigger
    pub fn other(&self) -> &Collider {
        &self.other
    }
}
