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
//! Game clock and delayed callbacks
//!
//! The [`GameClock`] is the simulation's time source. The external frame
//! loop advances it once per frame and pumps it with
//! [`GameClock::run_due_callbacks`]; everything else reads time from it or
//! schedules callbacks against it.

use std::cell::{Cell, RefCell};
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::rc::Rc;

use super::coroutine::WaitInstruction;

struct ScheduledEvent {
    deadline_ms: f64,
    seq: u64,
    callback: Box<dyn FnOnce()>,
}

// Ordering is by deadline with the insertion sequence as tiebreaker; the
// callback takes no part in comparisons.
impl PartialEq for ScheduledEvent {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for ScheduledEvent {}

impl PartialOrd for ScheduledEvent {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ScheduledEvent {
    fn cmp(&self, other: &Self) -> Ordering {
        self.deadline_ms
            .total_cmp(&other.deadline_ms)
            .then(self.seq.cmp(&other.seq))
    }
}

struct ClockInner {
    now_ms: Cell<f64>,
    // Min-heap on deadline via Reverse
    queue: RefCell<BinaryHeap<std::cmp::Reverse<ScheduledEvent>>>,
    next_seq: Cell<u64>,
}

/// Frame-driven time source with a deadline-ordered callback queue.
///
/// `GameClock` is a cheap clonable handle; clones refer to the same clock.
/// The external frame loop is expected to call [`GameClock::advance`] with
/// the frame's delta and then [`GameClock::run_due_callbacks`] once per
/// frame.
///
/// Scheduled callbacks are not tied to any entity: callers must guard
/// against firing after the objects they refer to are destroyed.
///
/// # Examples
///
/// ```
/// use arcade_core::GameClock;
/// use std::cell::Cell;
/// use std::rc::Rc;
///
/// let clock = GameClock::new();
/// let fired = Rc::new(Cell::new(false));
///
/// let sink = Rc::clone(&fired);
/// clock.run_after_delay(500.0, move || sink.set(true));
///
/// clock.advance(499.0);
/// clock.run_due_callbacks();
/// assert!(!fired.get());
///
/// clock.advance(1.0);
/// clock.run_due_callbacks();
/// assert!(fired.get());
/// ```
#[derive(Clone)]
pub struct GameClock {
    inner: Rc<ClockInner>,
}

impl GameClock {
    /// Create a new clock at time zero with no scheduled callbacks
    pub fn new() -> Self {
        GameClock {
            inner: Rc::new(ClockInner {
                now_ms: Cell::new(0.0),
                queue: RefCell::new(BinaryHeap::new()),
                next_seq: Cell::new(0),
            }),
        }
    }

    /// Get the current time in milliseconds
    pub fn now_ms(&self) -> f64 {
        self.inner.now_ms.get()
    }

    /// Advance the clock by `delta_ms` milliseconds
    pub fn advance(&self, delta_ms: f64) {
        self.inner.now_ms.set(self.inner.now_ms.get() + delta_ms);
    }

    /// Schedule a callback to run after the specified delay
    ///
    /// The callback fires on the first [`GameClock::run_due_callbacks`] pump
    /// at or after `now + delay_ms`.
    pub fn run_after_delay<F>(&self, delay_ms: f64, callback: F)
    where
        F: FnOnce() + 'static,
    {
        let seq = self.inner.next_seq.get();
        self.inner.next_seq.set(seq + 1);

        self.inner
            .queue
            .borrow_mut()
            .push(std::cmp::Reverse(ScheduledEvent {
                deadline_ms: self.now_ms() + delay_ms,
                seq,
                callback: Box::new(callback),
            }));
    }

    /// Run all scheduled callbacks whose deadline has passed
    ///
    /// Pops the earliest event; if it is due, fires it and continues, else
    /// pushes it back and stops. The heap is deadline-sorted, so the first
    /// not-yet-due event ends the pump. Callbacks may schedule further
    /// callbacks; ones already due fire within the same pump.
    pub fn run_due_callbacks(&self) {
        loop {
            // Pop outside of the callback invocation so callbacks can
            // schedule new events.
            let event = self.inner.queue.borrow_mut().pop();
            let Some(std::cmp::Reverse(event)) = event else {
                break;
            };

            if self.now_ms() >= event.deadline_ms {
                (event.callback)();
            } else {
                self.inner.queue.borrow_mut().push(std::cmp::Reverse(event));
                break;
            }
        }
    }

    /// Get the number of callbacks waiting to fire
    pub fn pending_callbacks(&self) -> usize {
        self.inner.queue.borrow().len()
    }
}

impl Default for GameClock {
    fn default() -> Self {
        Self::new()
    }
}

/// Returns a wait instruction that resumes the suspended coroutine after the
/// given delay on the clock.
///
/// The coroutine resumes on the first clock pump at or after the deadline.
pub fn resume_after(clock: &GameClock, delay_ms: f64) -> WaitInstruction {
    let clock = clock.clone();
    WaitInstruction::new(move |resume| {
        clock.run_after_delay(delay_ms, move || resume.resume());
    })
}
