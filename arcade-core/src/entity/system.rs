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
//! Entity system
//!
//! The [`EntitySystem`] owns the set of live entities and drives the
//! per-frame update broadcast.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use super::object::{Entity, EntityId};

pub(crate) struct EntitySystemInner {
    live: RefCell<Vec<Entity>>,
    next_id: Cell<u64>,
    updating: Cell<bool>,
    deferred_hook_clears: RefCell<Vec<Entity>>,
}

impl EntitySystemInner {
    /// Removes the entity from the live set.
    pub(crate) fn discard(&self, id: EntityId) {
        self.live.borrow_mut().retain(|entity| entity.id() != id);
    }

    /// Whether an update broadcast is iterating this frame's snapshot.
    pub(crate) fn is_updating(&self) -> bool {
        self.updating.get()
    }

    /// Queues an entity whose update hooks get cleared once the in-progress
    /// broadcast has delivered the whole snapshot.
    pub(crate) fn defer_hook_clear(&self, entity: Entity) {
        self.deferred_hook_clears.borrow_mut().push(entity);
    }
}

/// The owner of all live entities.
///
/// `EntitySystem` is a cheap clonable handle; clones refer to the same
/// system, which lets hooks capture it to spawn entities mid-frame.
///
/// [`EntitySystem::update`] broadcasts the frame update over a snapshot of
/// the live set: entities created during the broadcast start updating next
/// frame, and entities destroyed during the broadcast are removed starting
/// next frame. Entities update in creation order.
#[derive(Clone)]
pub struct EntitySystem {
    inner: Rc<EntitySystemInner>,
}

impl EntitySystem {
    /// Create a new empty entity system
    pub fn new() -> Self {
        EntitySystem {
            inner: Rc::new(EntitySystemInner {
                live: RefCell::new(Vec::new()),
                next_id: Cell::new(0),
                updating: Cell::new(false),
                deferred_hook_clears: RefCell::new(Vec::new()),
            }),
        }
    }

    /// Create and return a new entity registered in this system
    pub fn new_entity(&self) -> Entity {
        let id = EntityId::new(self.inner.next_id.get());
        self.inner.next_id.set(id.raw() + 1);

        let entity = Entity::new(id, Rc::downgrade(&self.inner));
        self.inner.live.borrow_mut().push(entity.clone());
        entity
    }

    /// Run the update hooks of every live entity
    ///
    /// `delta_ms` is the approximate number of milliseconds since the last
    /// frame. The live set is snapshotted first, so entities created or
    /// destroyed by a running hook do not perturb this pass.
    pub fn update(&self, delta_ms: f64) {
        let snapshot: Vec<Entity> = self.inner.live.borrow().clone();
        self.inner.updating.set(true);
        for entity in snapshot {
            entity.update(delta_ms);
        }
        self.inner.updating.set(false);

        // Entities destroyed during the broadcast keep their update hooks
        // until every snapshotted entity has received this frame's update.
        let deferred = std::mem::take(&mut *self.inner.deferred_hook_clears.borrow_mut());
        for entity in deferred {
            entity.clear_update_hooks();
        }
    }

    /// Get the number of live entities
    pub fn entity_count(&self) -> usize {
        self.inner.live.borrow().len()
    }

    /// Check whether the entity is in this system's live set
    pub fn contains(&self, entity: &Entity) -> bool {
        self.inner
            .live
            .borrow()
            .iter()
            .any(|live| live.id() == entity.id())
    }
}

impl Default for EntitySystem {
    fn default() -> Self {
        Self::new()
    }
}
