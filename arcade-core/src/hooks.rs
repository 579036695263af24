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
//! Hook lists
//!
//! A [`HookList`] is an ordered list of callbacks. Subscribing returns an
//! [`Unsubscriber`] that removes the callback again; running the list invokes
//! every callback with a shared argument. Hook lists are the event primitive
//! behind entity updates, destroy notifications, collision hooks and trigger
//! zones.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

type HookFn<T> = Rc<RefCell<dyn FnMut(&T)>>;

struct HookEntry<T> {
    id: u64,
    hook: HookFn<T>,
}

/// An ordered list of callbacks.
///
/// Callbacks are invoked in insertion order. [`HookList::run`] snapshots the
/// list before iterating, so hooks subscribed or unsubscribed by a running
/// hook only take effect on the next run.
///
/// # Examples
///
/// ```
/// use arcade_core::hooks::HookList;
/// use std::cell::Cell;
/// use std::rc::Rc;
///
/// let hooks: HookList<f64> = HookList::new();
/// let count = Rc::new(Cell::new(0));
///
/// let counter = Rc::clone(&count);
/// let mut subscription = hooks.subscribe(move |_delta| counter.set(counter.get() + 1));
///
/// hooks.run(&16.0);
/// assert_eq!(count.get(), 1);
///
/// subscription.unsubscribe();
/// hooks.run(&16.0);
/// assert_eq!(count.get(), 1);
/// ```
pub struct HookList<T> {
    entries: Rc<RefCell<Vec<HookEntry<T>>>>,
    next_id: Cell<u64>,
}

impl<T: 'static> HookList<T> {
    /// Create an empty hook list
    pub fn new() -> Self {
        HookList {
            entries: Rc::new(RefCell::new(Vec::new())),
            next_id: Cell::new(0),
        }
    }

    /// Add a hook to the list
    ///
    /// Returns an [`Unsubscriber`] that removes the hook. Dropping the
    /// unsubscriber without calling it leaves the hook subscribed.
    pub fn subscribe<F>(&self, hook: F) -> Unsubscriber
    where
        F: FnMut(&T) + 'static,
    {
        let id = self.next_id.get();
        self.next_id.set(id + 1);

        self.entries.borrow_mut().push(HookEntry {
            id,
            hook: Rc::new(RefCell::new(hook)),
        });

        let entries = Rc::downgrade(&self.entries);
        Unsubscriber::new(move || {
            if let Some(entries) = entries.upgrade() {
                entries.borrow_mut().retain(|entry| entry.id != id);
            }
        })
    }

    /// Run every hook in the list with the given argument
    ///
    /// The subscriber list is snapshotted before iterating: changes made by a
    /// running hook only take effect the next time the list is run.
    pub fn run(&self, arg: &T) {
        let snapshot: Vec<HookFn<T>> = self
            .entries
            .borrow()
            .iter()
            .map(|entry| Rc::clone(&entry.hook))
            .collect();

        for hook in snapshot {
            (hook.borrow_mut())(arg);
        }
    }

    /// Get the number of subscribed hooks
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    /// Check whether the list has no subscribed hooks
    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    /// Remove every hook from the list
    ///
    /// Outstanding unsubscribers stay valid and become no-ops.
    pub fn clear(&self) {
        self.entries.borrow_mut().clear();
    }
}

impl<T: 'static> Default for HookList<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// A handle that removes a hook from the [`HookList`] it came from.
///
/// Calling [`Unsubscriber::unsubscribe`] more than once is a safe no-op,
/// as is calling it after the hook list itself has been dropped.
pub struct Unsubscriber {
    action: Option<Box<dyn FnOnce()>>,
}

impl Unsubscriber {
    fn new(action: impl FnOnce() + 'static) -> Self {
        Unsubscriber {
            action: Some(Box::new(action)),
        }
    }

    /// Remove the subscribed hook; later calls do nothing
    pub fn unsubscribe(&mut self) {
        if let Some(action) = self.action.take() {
            action();
        }
    }
}
