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
//! Entity handles
//!
//! Entities are the logical identities of the simulation. An entity carries
//! no data of its own beyond its hook lists: behavior is attached by
//! subscribing update hooks, and collaborators (physics bodies, trigger
//! zones, tasks) tie their own lifetimes to the entity's destroy hooks.

use crate::hooks::{HookList, Unsubscriber};
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use super::system::EntitySystemInner;

/// Unique identifier for an entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(u64);

impl EntityId {
    /// Create a new EntityId from a raw u64 value
    pub fn new(id: u64) -> Self {
        EntityId(id)
    }

    /// Get the raw u64 value
    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Entity({})", self.0)
    }
}

pub(crate) struct EntityInner {
    id: EntityId,
    update_hooks: HookList<f64>,
    destroy_hooks: HookList<()>,
    destroyed: Cell<bool>,
    parent_unsub: RefCell<Option<Unsubscriber>>,
    system: Weak<EntitySystemInner>,
}

/// An object in the game.
///
/// Create entities with [`EntitySystem::new_entity`](super::EntitySystem::new_entity).
/// `Entity` is a cheap clonable handle; clones refer to the same entity.
///
/// Update hooks run once per frame for as long as the entity is alive and
/// stop after it is destroyed. Destroy hooks run exactly once, when the
/// entity is destroyed.
///
/// An entity may have a parent entity, in which case it is destroyed when
/// the parent is destroyed. This is useful for objects that are logically
/// part of another object, like the gun system on a spaceship. Parent chains
/// must not contain cycles; this is the caller's responsibility.
///
/// # Examples
///
/// ```
/// use arcade_core::EntitySystem;
///
/// let system = EntitySystem::new();
/// let entity = system.new_entity();
///
/// entity.on_update(|delta_ms| {
///     assert_eq!(delta_ms, 16.0);
/// });
///
/// system.update(16.0);
/// entity.destroy();
/// assert!(entity.is_destroyed());
/// ```
#[derive(Clone)]
pub struct Entity {
    inner: Rc<EntityInner>,
}

impl Entity {
    pub(crate) fn new(id: EntityId, system: Weak<EntitySystemInner>) -> Self {
        Entity {
            inner: Rc::new(EntityInner {
                id,
                update_hooks: HookList::new(),
                destroy_hooks: HookList::new(),
                destroyed: Cell::new(false),
                parent_unsub: RefCell::new(None),
                system,
            }),
        }
    }

    /// Get the entity's stable identifier
    pub fn id(&self) -> EntityId {
        self.inner.id
    }

    /// Add a hook that runs on every frame until this entity is destroyed
    ///
    /// The hook receives the frame's delta time in milliseconds. Returns an
    /// unsubscriber that removes the hook.
    pub fn on_update<F>(&self, mut hook: F) -> Unsubscriber
    where
        F: FnMut(f64) + 'static,
    {
        self.inner.update_hooks.subscribe(move |delta| hook(*delta))
    }

    /// Add a hook that runs when this entity is destroyed
    pub fn on_destroy<F>(&self, mut hook: F) -> Unsubscriber
    where
        F: FnMut() + 'static,
    {
        self.inner.destroy_hooks.subscribe(move |()| hook())
    }

    /// Destroy this entity
    ///
    /// Destroying an already-destroyed entity is a no-op. Otherwise the
    /// entity is removed from its system's live set, so destroy hooks that
    /// inspect the system already see it absent, and then the destroy hooks
    /// run (snapshotted). Both hook lists are cleared afterwards, releasing
    /// any state captured by subscribed closures. An entity destroyed during
    /// the update broadcast still receives the current frame's update; its
    /// update hooks are released when the broadcast finishes.
    pub fn destroy(&self) {
        if self.inner.destroyed.replace(true) {
            return;
        }

        log::debug!("destroying {}", self.inner.id);

        let parent_unsub = self.inner.parent_unsub.borrow_mut().take();
        if let Some(mut unsub) = parent_unsub {
            unsub.unsubscribe();
        }

        if let Some(system) = self.inner.system.upgrade() {
            system.discard(self.inner.id);
        }

        self.inner.destroy_hooks.run(&());

        // A destroy during the update broadcast must not rob snapshotted
        // entities of this frame's update; the system clears the hooks once
        // the pass ends.
        match self.inner.system.upgrade() {
            Some(system) if system.is_updating() => system.defer_hook_clear(self.clone()),
            _ => self.inner.update_hooks.clear(),
        }
        self.inner.destroy_hooks.clear();
    }

    /// Check whether this entity has been destroyed
    pub fn is_destroyed(&self) -> bool {
        self.inner.destroyed.get()
    }

    /// Set the parent of this entity, causing it to be destroyed when the
    /// parent is destroyed
    ///
    /// Any previous parent binding is unsubscribed first. Passing `None`
    /// clears the binding.
    pub fn set_parent(&self, parent: Option<&Entity>) {
        let previous = self.inner.parent_unsub.borrow_mut().take();
        if let Some(mut unsub) = previous {
            unsub.unsubscribe();
        }

        if let Some(parent) = parent {
            let child = self.clone();
            let unsub = parent.on_destroy(move || child.destroy());
            *self.inner.parent_unsub.borrow_mut() = Some(unsub);
        }
    }

    /// Runs the update hooks on this entity.
    pub(crate) fn update(&self, delta_ms: f64) {
        self.inner.update_hooks.run(&delta_ms);
    }

    /// Releases the update hooks of an entity destroyed mid-broadcast.
    pub(crate) fn clear_update_hooks(&self) {
        self.inner.update_hooks.clear();
    }
}

impl PartialEq for Entity {
    fn eq(&self, other: &Self) -> bool {
        self.inner.id == other.inner.id
    }
}

impl Eq for Entity {}

impl std::hash::Hash for Entity {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.inner.id.hash(state);
    }
}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entity")
            .field("id", &self.inner.id)
            .field("destroyed", &self.inner.destroyed.get())
            .finish()
    }
}
