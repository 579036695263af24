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
//! Coroutines bound to entities
//!
//! A [`Coroutine`] is a computation that runs in slices between suspension
//! points. A [`Task`] attaches a coroutine to an entity so that one slice
//! runs per frame from the entity's update hook; destroying the entity
//! naturally stops the task, because the driving hook lives on the entity.

use crate::entity::Entity;
use crate::hooks::Unsubscriber;
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

/// The outcome of one coroutine slice.
pub enum Step {
    /// Wait for the next frame; the next slice runs on the next update
    Yield,
    /// Stop updating until an external continuation resumes the task
    WaitFor(WaitInstruction),
    /// The coroutine has finished
    Done,
}

/// A resumable computation stepped once per frame.
///
/// Implementors keep their own state between slices; the scheduler never
/// restarts a coroutine from the beginning. `delta_ms` is the time since the
/// previous frame (0 for the initial slice run by [`Task::start`]).
///
/// Delegating to a nested coroutine is explicit: forward `step` calls to the
/// child and propagate its [`Step`] until it returns [`Step::Done`], or use
/// [`Sequence`] for the common run-to-completion chain.
pub trait Coroutine {
    /// Run the next slice of this computation
    fn step(&mut self, delta_ms: f64) -> Step;
}

/// A [`Coroutine`] implemented by a closure.
///
/// # Examples
///
/// ```
/// use arcade_core::{FnCoroutine, Step};
///
/// let mut remaining = 3;
/// let mut countdown = FnCoroutine::new(move |_delta_ms| {
///     remaining -= 1;
///     if remaining == 0 {
///         Step::Done
///     } else {
///         Step::Yield
///     }
/// });
/// # let _ = &mut countdown;
/// ```
pub struct FnCoroutine<F: FnMut(f64) -> Step> {
    step_fn: F,
}

impl<F: FnMut(f64) -> Step> FnCoroutine<F> {
    /// Wrap a closure as a coroutine
    pub fn new(step_fn: F) -> Self {
        FnCoroutine { step_fn }
    }
}

impl<F: FnMut(f64) -> Step> Coroutine for FnCoroutine<F> {
    fn step(&mut self, delta_ms: f64) -> Step {
        (self.step_fn)(delta_ms)
    }
}

/// Runs a list of coroutines to completion, one after another.
///
/// When a stage finishes, the next stage starts within the same slice, so a
/// chain of immediately-completing stages costs a single frame. Suspensions
/// of the current stage surface to the driving task unchanged.
#[derive(Default)]
pub struct Sequence {
    stages: VecDeque<Box<dyn Coroutine>>,
}

impl Sequence {
    /// Create an empty sequence (completes immediately)
    pub fn new() -> Self {
        Sequence {
            stages: VecDeque::new(),
        }
    }

    /// Append a stage to run after the current ones
    pub fn then<C: Coroutine + 'static>(mut self, stage: C) -> Self {
        self.stages.push_back(Box::new(stage));
        self
    }
}

impl Coroutine for Sequence {
    fn step(&mut self, delta_ms: f64) -> Step {
        while let Some(current) = self.stages.front_mut() {
            match current.step(delta_ms) {
                Step::Done => {
                    self.stages.pop_front();
                }
                step => return step,
            }
        }
        Step::Done
    }
}

/// Takes control away from a coroutine until custom code resumes it.
///
/// Created with [`WaitInstruction::new`] or helpers like
/// [`resume_after`](super::resume_after). The registrar receives a
/// [`ResumeHandle`] and arranges for it to be called later; the task does
/// not run again until then.
pub struct WaitInstruction {
    register: Box<dyn FnOnce(ResumeHandle)>,
}

impl WaitInstruction {
    /// Create a wait instruction from a registrar for the resume continuation
    pub fn new<F>(register: F) -> Self
    where
        F: FnOnce(ResumeHandle) + 'static,
    {
        WaitInstruction {
            register: Box::new(register),
        }
    }

    pub(crate) fn apply(self, task: &Task) {
        task.yield_control();
        let handle = ResumeHandle {
            task: task.clone(),
            consumed: Rc::new(Cell::new(false)),
        };
        (self.register)(handle);
    }
}

/// Resumes a task that yielded a [`WaitInstruction`].
///
/// The first call to [`ResumeHandle::resume`] wins; later calls (including
/// through clones) are no-ops. A generic resume-later primitive cannot
/// assume its continuation runs exactly once, so the guard lives here.
#[derive(Clone)]
pub struct ResumeHandle {
    task: Task,
    consumed: Rc<Cell<bool>>,
}

impl ResumeHandle {
    /// Resume the suspended task; later calls do nothing
    pub fn resume(&self) {
        if self.consumed.replace(true) {
            return;
        }
        self.task.resume_control();
    }
}

struct TaskInner {
    entity: Entity,
    coroutine: RefCell<Box<dyn Coroutine>>,
    suspended: Cell<bool>,
    yielding: Cell<bool>,
    done: Cell<bool>,
    started_once: Cell<bool>,
    update_unsub: RefCell<Option<Unsubscriber>>,
}

/// A coroutine attached to an entity, run in slices from the entity's
/// update hook.
///
/// A new task is suspended; [`Task::start`] subscribes it to the entity's
/// update hook and, on the first start, runs the slice up to the first
/// suspension point immediately. [`Task::suspend`] pauses it without losing
/// progress. Destroying the entity stops the task for good: the driving
/// update hook lives on the entity.
///
/// If a slice panics, the task is marked done and the panic propagates out
/// of the driving update call.
///
/// # Examples
///
/// ```
/// use arcade_core::{EntitySystem, FnCoroutine, Step, Task};
///
/// let system = EntitySystem::new();
/// let entity = system.new_entity();
///
/// let mut frames = 0;
/// let task = Task::new(
///     &entity,
///     FnCoroutine::new(move |_delta_ms| {
///         frames += 1;
///         if frames < 3 {
///             Step::Yield
///         } else {
///             Step::Done
///         }
///     }),
/// );
///
/// task.start(); // runs the first slice immediately
/// system.update(16.0);
/// system.update(16.0);
/// assert!(task.is_done());
/// ```
#[derive(Clone)]
pub struct Task {
    inner: Rc<TaskInner>,
}

impl Task {
    /// Create a suspended task attached to the entity
    pub fn new<C: Coroutine + 'static>(entity: &Entity, coroutine: C) -> Self {
        Task {
            inner: Rc::new(TaskInner {
                entity: entity.clone(),
                coroutine: RefCell::new(Box::new(coroutine)),
                suspended: Cell::new(true),
                yielding: Cell::new(false),
                done: Cell::new(false),
                started_once: Cell::new(false),
                update_unsub: RefCell::new(None),
            }),
        }
    }

    /// Start or resume this task
    ///
    /// No-op while the task is running or waiting on an external resume.
    /// The first start runs the coroutine up to its first suspension point
    /// before returning.
    pub fn start(&self) {
        if self.inner.suspended.get() && !self.inner.yielding.get() {
            self.subscribe_update();
            self.inner.suspended.set(false);

            if !self.inner.started_once.get() {
                self.run_slice(0.0);
                self.inner.started_once.set(true);
            }
        }
    }

    /// Pause the task so it no longer runs when its entity updates
    ///
    /// The coroutine's progress is kept; [`Task::start`] resumes it.
    pub fn suspend(&self) {
        if !self.inner.suspended.get() {
            let unsub = self.inner.update_unsub.borrow_mut().take();
            if let Some(mut unsub) = unsub {
                unsub.unsubscribe();
            }
            self.inner.suspended.set(true);
        }
    }

    /// Check whether the coroutine has finished (normally or by panicking)
    pub fn is_done(&self) -> bool {
        self.inner.done.get()
    }

    fn subscribe_update(&self) {
        let task = self.clone();
        let unsub = self.inner.entity.on_update(move |delta_ms| task.drive(delta_ms));
        *self.inner.update_unsub.borrow_mut() = Some(unsub);
    }

    fn drive(&self, delta_ms: f64) {
        if self.inner.done.get() {
            self.suspend();
            return;
        }
        self.run_slice(delta_ms);
    }

    fn run_slice(&self, delta_ms: f64) {
        // Mark done up front so a panicking slice leaves the task finished;
        // the flag is cleared again on any non-terminal outcome.
        self.inner.done.set(true);

        let step = self.inner.coroutine.borrow_mut().step(delta_ms);
        match step {
            Step::Done => {}
            Step::Yield => {
                self.inner.done.set(false);
            }
            Step::WaitFor(instruction) => {
                self.inner.done.set(false);
                instruction.apply(self);
            }
        }
    }

    fn yield_control(&self) {
        let unsub = self.inner.update_unsub.borrow_mut().take();
        if let Some(mut unsub) = unsub {
            unsub.unsubscribe();
        }
        self.inner.yielding.set(true);
    }

    pub(crate) fn resume_control(&self) {
        if !self.inner.suspended.get() {
            self.subscribe_update();
        }
        self.inner.yielding.set(false);
    }
}
