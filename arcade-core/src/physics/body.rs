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
//! Physics bodies
//!
//! A [`PhysicsBody`] is the moving, massy part of an entity: velocity, mass,
//! collision hooks and the regular colliders that give it a shape. Bodies are
//! created through [`PhysicsSystem::new_body`](super::PhysicsSystem::new_body)
//! and destroyed with their entity.

use glam::DVec2;
use std::any::Any;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use crate::entity::Entity;
use crate::hooks::{HookList, Unsubscriber};
use crate::transform::Transform;

use super::collider::{Collider, ColliderId};
use super::system::PhysicsSystemInner;

/// The mass of a physics body: positive and finite, or infinite.
///
/// Infinite mass marks an immovable body (a level boundary, say): its inverse
/// is zero, so impulses never change its velocity.
///
/// # Examples
///
/// ```
/// use arcade_core::Mass;
///
/// assert_eq!(Mass::new(4.0).inverse(), 0.25);
/// assert_eq!(Mass::INFINITE.inverse(), 0.0);
/// assert!(Mass::try_new(-1.0).is_none());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mass(f64);

impl Mass {
    /// The mass of an immovable body
    pub const INFINITE: Mass = Mass(f64::INFINITY);

    /// Create a mass from a positive value
    ///
    /// # Panics
    ///
    /// Panics if `value` is not positive or is NaN. Use [`Mass::try_new`] for
    /// a fallible variant. `f64::INFINITY` is accepted.
    pub fn new(value: f64) -> Self {
        assert!(value > 0.0, "mass must be positive, got {value}");
        Mass(value)
    }

    /// Create a mass from a positive value, or `None` if the value is not
    /// positive or is NaN
    pub fn try_new(value: f64) -> Option<Self> {
        if value > 0.0 {
            Some(Mass(value))
        } else {
            None
        }
    }

    /// Get the mass value
    pub fn value(&self) -> f64 {
        self.0
    }

    /// Get the reciprocal mass; zero for an infinite mass
    pub fn inverse(&self) -> f64 {
        if self.0.is_infinite() {
            0.0
        } else {
            1.0 / self.0
        }
    }

    /// Check whether this is the mass of an immovable body
    pub fn is_infinite(&self) -> bool {
        self.0.is_infinite()
    }
}

impl fmt::Display for Mass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Mass({})", self.0)
    }
}

/// Unique identifier for a physics body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BodyId(u64);

impl BodyId {
    /// Create a new BodyId from a raw u64 value
    pub fn new(id: u64) -> Self {
        BodyId(id)
    }

    /// Get the raw u64 value
    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for BodyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Body({})", self.0)
    }
}

pub(crate) struct BodyInner {
    id: BodyId,
    entity: Entity,
    transform: Transform,
    mass: Cell<Mass>,
    velocity: Cell<DVec2>,
    collision_hooks: HookList<Collision>,
    colliders: RefCell<Vec<Collider>>,
    data: RefCell<Vec<Rc<dyn Any>>>,
    destroyed: Cell<bool>,
    entity_unsub: RefCell<Option<Unsubscriber>>,
    system: Weak<PhysicsSystemInner>,
}

/// A point-mass circle body moved by the physics system.
///
/// Create bodies with
/// [`PhysicsSystem::new_body`](super::PhysicsSystem::new_body). `PhysicsBody`
/// is a cheap clonable handle; clones refer to the same body.
///
/// The body's transform must not have a parent: the physics system writes
/// positions directly into it, and a parented transform would compose the
/// integration twice.
///
/// A body is destroyed together with its entity, taking all of its colliders
/// with it.
#[derive(Clone)]
pub struct PhysicsBody {
    inner: Rc<BodyInner>,
}

/// Non-owning reference to a body, held by its colliders.
pub(crate) struct WeakPhysicsBody {
    inner: Weak<BodyInner>,
}

impl WeakPhysicsBody {
    pub(crate) fn upgrade(&self) -> Option<PhysicsBody> {
        self.inner.upgrade().map(|inner| PhysicsBody { inner })
    }
}

impl PhysicsBody {
    pub(crate) fn new(
        id: BodyId,
        entity: Entity,
        transform: Transform,
        mass: Mass,
        system: Weak<PhysicsSystemInner>,
    ) -> Self {
        let body = PhysicsBody {
            inner: Rc::new(BodyInner {
                id,
                entity,
                transform,
                mass: Cell::new(mass),
                velocity: Cell::new(DVec2::ZERO),
                collision_hooks: HookList::new(),
                colliders: RefCell::new(Vec::new()),
                data: RefCell::new(Vec::new()),
                destroyed: Cell::new(false),
                entity_unsub: RefCell::new(None),
                system,
            }),
        };

        let unsub = {
            let handle = body.clone();
            body.inner.entity.on_destroy(move || handle.destroy())
        };
        *body.inner.entity_unsub.borrow_mut() = Some(unsub);

        body
    }

    pub(crate) fn downgrade(&self) -> WeakPhysicsBody {
        WeakPhysicsBody {
            inner: Rc::downgrade(&self.inner),
        }
    }

    /// Get the body's stable identifier
    pub fn id(&self) -> BodyId {
        self.inner.id
    }

    /// Get the entity this body belongs to
    pub fn entity(&self) -> &Entity {
        &self.inner.entity
    }

    /// Get the body's transform
    pub fn transform(&self) -> &Transform {
        &self.inner.transform
    }

    /// Get the body's mass
    pub fn mass(&self) -> Mass {
        self.inner.mass.get()
    }

    /// Set the body's mass
    pub fn set_mass(&self, mass: Mass) {
        self.inner.mass.set(mass);
    }

    /// Get the body's velocity in pixels per millisecond
    pub fn velocity(&self) -> DVec2 {
        self.inner.velocity.get()
    }

    /// Set the body's velocity in pixels per millisecond
    pub fn set_velocity(&self, velocity: DVec2) {
        self.inner.velocity.set(velocity);
    }

    /// Get the body's speed, the magnitude of its velocity
    pub fn speed(&self) -> f64 {
        self.inner.velocity.get().length()
    }

    /// Apply an impulse, changing velocity by `impulse / mass`
    ///
    /// An infinite-mass body is unaffected.
    pub fn add_impulse(&self, impulse: DVec2) {
        let delta = impulse * self.inner.mass.get().inverse();
        self.inner.velocity.set(self.inner.velocity.get() + delta);
    }

    /// Get the body's kinetic energy, `m·v²/2`
    ///
    /// An infinite-mass body contributes zero: immovable bodies are excluded
    /// from energy accounting.
    pub fn kinetic_energy(&self) -> f64 {
        let mass = self.inner.mass.get();
        if mass.is_infinite() {
            return 0.0;
        }
        0.5 * mass.value() * self.inner.velocity.get().length_squared()
    }

    /// Get the body's momentum, `m·v`
    ///
    /// An infinite-mass body contributes zero.
    pub fn momentum(&self) -> DVec2 {
        let mass = self.inner.mass.get();
        if mass.is_infinite() {
            return DVec2::ZERO;
        }
        self.inner.velocity.get() * mass.value()
    }

    /// Attach a circle collider of the given radius, centered on the body's
    /// transform
    ///
    /// The collider participates in collision resolution and is destroyed
    /// with the body.
    pub fn add_circle_collider(&self, radius: f64) -> Collider {
        let system = self.inner.system.upgrade();
        let id = system
            .as_ref()
            .map_or(ColliderId::new(0), |system| system.allocate_collider_id());

        let collider = Collider::new_regular(id, self, radius, self.inner.system.clone());
        if self.inner.destroyed.get() {
            collider.destroy();
        } else {
            self.inner.colliders.borrow_mut().push(collider.clone());
            if let Some(system) = system {
                system.register_collider(collider.clone());
            }
        }
        collider
    }

    /// Add a hook that runs once per resolved collision involving this body
    ///
    /// The hook receives a [`Collision`] with this body as
    /// [`Collision::body`] and the other participant as [`Collision::other`].
    pub fn on_collision<F>(&self, hook: F) -> Unsubscriber
    where
        F: FnMut(&Collision) + 'static,
    {
        self.inner.collision_hooks.subscribe(hook)
    }

    /// Attach an opaque data payload to this body
    ///
    /// Payloads are kept in attachment order and looked up by type with
    /// [`PhysicsBody::first_data`]. Attaching more than one payload of a type
    /// is allowed; lookups find the earliest.
    pub fn add_data(&self, data: Rc<dyn Any>) {
        self.inner.data.borrow_mut().push(data);
    }

    /// Get the earliest attached payload of type `T`, if any
    pub fn first_data<T: Any>(&self) -> Option<Rc<T>> {
        self.inner
            .data
            .borrow()
            .iter()
            .find_map(|data| Rc::clone(data).downcast::<T>().ok())
    }

    /// Get every attached payload of type `T`, in attachment order
    pub fn all_data<T: Any>(&self) -> Vec<Rc<T>> {
        self.inner
            .data
            .borrow()
            .iter()
            .filter_map(|data| Rc::clone(data).downcast::<T>().ok())
            .collect()
    }

    /// Destroy this body and all of its colliders
    ///
    /// Destroying an already-destroyed body is a no-op. The body is removed
    /// from its system, so it takes no further part in collision detection or
    /// integration.
    pub fn destroy(&self) {
        if self.inner.destroyed.replace(true) {
            return;
        }

        log::debug!("destroying {}", self.inner.id);

        let entity_unsub = self.inner.entity_unsub.borrow_mut().take();
        if let Some(mut unsub) = entity_unsub {
            unsub.unsubscribe();
        }

        if let Some(system) = self.inner.system.upgrade() {
            system.discard_body(self.inner.id);
        }

        let colliders = std::mem::take(&mut *self.inner.colliders.borrow_mut());
        for collider in colliders {
            collider.destroy();
        }

        // Release closures captured by collision hooks, breaking any
        // reference cycles through this body.
        self.inner.collision_hooks.clear();
        self.inner.data.borrow_mut().clear();
    }

    /// Check whether this body has been destroyed
    pub fn is_destroyed(&self) -> bool {
        self.inner.destroyed.get()
    }

    /// Detaches a destroyed collider from the body's collider list.
    pub(crate) fn detach_collider(&self, id: ColliderId) {
        self.inner
            .colliders
            .borrow_mut()
            .retain(|collider| collider.id() != id);
    }

    pub(crate) fn run_collision_hooks(&self, collision: &Collision) {
        self.inner.collision_hooks.run(collision);
    }
}

impl PartialEq for PhysicsBody {
    fn eq(&self, other: &Self) -> bool {
        self.inner.id == other.inner.id
    }
}

impl Eq for PhysicsBody {}

impl fmt::Debug for PhysicsBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PhysicsBody")
            .field("id", &self.inner.id)
            .field("mass", &self.inner.mass.get())
            .field("velocity", &self.inner.velocity.get())
            .field("destroyed", &self.inner.destroyed.get())
            .finish()
    }
}

/// One resolved collision, seen from one body's perspective.
///
/// Each resolved body pair produces two of these, one per side with the roles
/// swapped. The record is a single-frame value: handles inside it stay valid,
/// but the geometry they describe moves on.
#[derive(Clone)]
pub struct Collision {
    body: PhysicsBody,
    other: PhysicsBody,
}

impl Collision {
    pub(crate) fn new(body: PhysicsBody, other: PhysicsBody) -> Self {
        Collision { body, other }
    }

    /// Get the body whose hooks this collision was delivered to
    pub fn body(&self) -> &PhysicsBody {
        &self.body
    }

    /// Get the other body in the collision
    pub fn other(&self) -> &PhysicsBody {
        &self.other
    }
}
