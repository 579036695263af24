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
//! Trigger zone integration tests: enter/exit/stay sequencing as bodies move
//! through a zone across frames.

use arcade_core::{EntitySystem, Mass, PhysicsBody, PhysicsSystem, Transform, TriggerCollider};
use glam::DVec2;
use std::cell::RefCell;
use std::rc::Rc;

struct Zone {
    trigger: TriggerCollider,
    events: Rc<RefCell<Vec<&'static str>>>,
}

fn zone_at(entities: &EntitySystem, physics: &PhysicsSystem, x: f64, radius: f64) -> Zone {
    let entity = entities.new_entity();
    let transform = Transform::new();
    transform.set_local_x(x);
    let trigger = physics.new_circle_trigger(&entity, transform, radius);

    let events: Rc<RefCell<Vec<&'static str>>> = Rc::new(RefCell::new(Vec::new()));
    {
        let events = Rc::clone(&events);
        trigger.on_enter(move |_| events.borrow_mut().push("enter"));
    }
    {
        let events = Rc::clone(&events);
        trigger.on_exit(move |_| events.borrow_mut().push("exit"));
    }
    {
        let events = Rc::clone(&events);
        trigger.on_stay(move |_| events.borrow_mut().push("stay"));
    }

    Zone { trigger, events }
}

fn moving_ball(
    entities: &EntitySystem,
    physics: &PhysicsSystem,
    x: f64,
    velocity_x: f64,
    radius: f64,
) -> PhysicsBody {
    let entity = entities.new_entity();
    let transform = Transform::new();
    transform.set_local_x(x);
    let body = physics.new_body(&entity, transform, Mass::new(1.0));
    body.add_circle_collider(radius);
    body.set_velocity(DVec2::new(velocity_x, 0.0));
    body
}

#[test]
fn test_pass_through_produces_enter_stays_exit() {
    let entities = EntitySystem::new();
    let physics = PhysicsSystem::new();

    let zone = zone_at(&entities, &physics, 0.0, 20.0);
    // Overlap while |x| < 25; starts outside, crosses, leaves.
    moving_ball(&entities, &physics, 26.0, -10.0, 5.0);

    let mut per_frame = Vec::new();
    for _ in 0..8 {
        physics.update(1.0);
        per_frame.push(zone.events.borrow_mut().split_off(0));
    }

    let expected: Vec<Vec<&str>> = vec![
        vec![],        // x = 26, outside
        vec!["enter"], // x = 16
        vec!["stay"],  // x = 6
        vec!["stay"],  // x = -4
        vec!["stay"],  // x = -14
        vec!["stay"],  // x = -24
        vec!["exit"],  // x = -34
        vec![],
    ];
    assert_eq!(per_frame, expected);
}

#[test]
fn test_touching_boundary_does_not_trigger() {
    let entities = EntitySystem::new();
    let physics = PhysicsSystem::new();

    let zone = zone_at(&entities, &physics, 0.0, 20.0);
    // Exactly touching: distance 25 equals the radius sum, overlap is strict.
    moving_ball(&entities, &physics, 25.0, 0.0, 5.0);

    physics.update(1.0);
    assert!(zone.events.borrow().is_empty());
}

#[test]
fn test_two_bodies_tracked_independently() {
    let entities = EntitySystem::new();
    let physics = PhysicsSystem::new();

    let zone = zone_at(&entities, &physics, 0.0, 20.0);
    let inside = moving_ball(&entities, &physics, 0.0, 0.0, 5.0);
    moving_ball(&entities, &physics, 100.0, 0.0, 5.0);

    physics.update(1.0);
    assert_eq!(*zone.events.borrow(), vec!["enter"]);
    zone.events.borrow_mut().clear();

    physics.update(1.0);
    assert_eq!(*zone.events.borrow(), vec!["stay"]);
    zone.events.borrow_mut().clear();

    // Removing the overlapping body ends the overlap without an exit until
    // the next diff runs.
    inside.entity().destroy();
    physics.update(1.0);
    assert_eq!(*zone.events.borrow(), vec!["exit"]);
}

#[test]
fn test_trigger_event_reaches_other_body() {
    let entities = EntitySystem::new();
    let physics = PhysicsSystem::new();

    let zone_entity = entities.new_entity();
    let trigger = physics.new_circle_trigger(&zone_entity, Transform::new(), 20.0);
    let ball = moving_ball(&entities, &physics, 10.0, 0.0, 5.0);

    let entered = Rc::new(RefCell::new(None));
    {
        let entered = Rc::clone(&entered);
        trigger.on_enter(move |event| {
            *entered.borrow_mut() = event.other().body().map(|body| body.id());
        });
    }

    physics.update(1.0);
    assert_eq!(*entered.borrow(), Some(ball.id()));
}

#[test]
fn test_triggers_never_resolve_collisions() {
    let entities = EntitySystem::new();
    let physics = PhysicsSystem::new();

    zone_at(&entities, &physics, 0.0, 20.0);
    let ball = moving_ball(&entities, &physics, 10.0, -1.0, 5.0);

    physics.update(0.0);

    // Deep inside the zone and approaching its center, yet unaffected.
    assert_eq!(ball.velocity(), DVec2::new(-1.0, 0.0));
}

#[test]
fn test_enter_hook_destroying_trigger_stops_later_events() {
    let entities = EntitySystem::new();
    let physics = PhysicsSystem::new();

    let zone = zone_at(&entities, &physics, 0.0, 20.0);
    moving_ball(&entities, &physics, 0.0, 0.0, 5.0);

    {
        let trigger = zone.trigger.clone();
        zone.trigger.on_enter(move |_| trigger.destroy());
    }

    physics.update(1.0);
    assert_eq!(*zone.events.borrow(), vec!["enter"]);
    assert!(zone.trigger.is_destroyed());

    zone.events.borrow_mut().clear();
    physics.update(1.0);
    assert!(zone.events.borrow().is_empty());
}
