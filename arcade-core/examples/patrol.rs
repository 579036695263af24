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
//! Headless coroutine demo: a sentry patrols between two waypoints, pausing
//! at each end.
//!
//! The behavior is a single coroutine: walk right, wait half a second, walk
//! back, wait again. Run with `RUST_LOG=info` to watch the waypoints go by.

use arcade_core::{
    resume_after, EntitySystem, FnCoroutine, GameClock, Sequence, Step, Task, Transform,
};

const FRAME_MS: f64 = 16.0;
const SPEED: f64 = 0.12; // px per ms
const LEFT_POST: f64 = 0.0;
const RIGHT_POST: f64 = 240.0;
const PAUSE_MS: f64 = 500.0;

/// Walks the transform toward `target_x` at patrol speed, one slice per
/// frame, finishing when it arrives.
fn walk_to(transform: Transform, target_x: f64) -> FnCoroutine<impl FnMut(f64) -> Step> {
    FnCoroutine::new(move |delta_ms| {
        let step = SPEED * delta_ms;
        let gap = target_x - transform.local_x();
        if gap.abs() <= step {
            transform.set_local_x(target_x);
            log::info!("reached waypoint {target_x}");
            Step::Done
        } else {
            transform.add_x(step.copysign(gap));
            Step::Yield
        }
    })
}

fn pause(clock: GameClock) -> FnCoroutine<impl FnMut(f64) -> Step> {
    let mut waited = false;
    FnCoroutine::new(move |_delta_ms| {
        if waited {
            Step::Done
        } else {
            waited = true;
            log::info!("pausing for {PAUSE_MS} ms at t = {} ms", clock.now_ms());
            Step::WaitFor(resume_after(&clock, PAUSE_MS))
        }
    })
}

fn main() {
    env_logger::init();

    let entities = EntitySystem::new();
    let clock = GameClock::new();

    let sentry = entities.new_entity();
    let transform = Transform::new();

    let route = Sequence::new()
        .then(walk_to(transform.clone(), RIGHT_POST))
        .then(pause(clock.clone()))
        .then(walk_to(transform.clone(), LEFT_POST))
        .then(pause(clock.clone()))
        .then(walk_to(transform.clone(), RIGHT_POST));

    let task = Task::new(&sentry, route);
    task.start();

    let mut frames = 0u32;
    while !task.is_done() {
        entities.update(FRAME_MS);
        clock.advance(FRAME_MS);
        clock.run_due_callbacks();
        frames += 1;
    }

    println!(
        "patrol finished after {frames} frames ({} ms simulated), ending at x = {}",
        clock.now_ms(),
        transform.x()
    );
}
