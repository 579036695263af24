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
//! Collision resolution integration tests: conservation laws, mass rules,
//! skip conditions and hook delivery.

use approx::assert_relative_eq;
use arcade_core::{BodyId, EntitySystem, Mass, PhysicsBody, PhysicsSystem, Transform};
use glam::DVec2;
use std::cell::RefCell;
use std::rc::Rc;

fn ball(
    entities: &EntitySystem,
    physics: &PhysicsSystem,
    position: DVec2,
    velocity: DVec2,
    mass: Mass,
    radius: f64,
) -> PhysicsBody {
    let entity = entities.new_entity();
    let transform = Transform::new();
    transform.set_local_x(position.x);
    transform.set_local_y(position.y);
    let body = physics.new_body(&entity, transform, mass);
    body.add_circle_collider(radius);
    body.set_velocity(velocity);
    body
}

#[test]
fn test_head_on_equal_mass_swap() {
    let entities = EntitySystem::new();
    let physics = PhysicsSystem::new();

    let left = ball(
        &entities,
        &physics,
        DVec2::new(0.0, 0.0),
        DVec2::new(1.0, 0.0),
        Mass::new(1.0),
        10.0,
    );
    let right = ball(
        &entities,
        &physics,
        DVec2::new(15.0, 0.0),
        DVec2::new(-1.0, 0.0),
        Mass::new(1.0),
        10.0,
    );

    physics.update(0.0);

    // A perfect head-on elastic collision between equal masses swaps the
    // velocities exactly.
    assert_eq!(left.velocity(), DVec2::new(-1.0, 0.0));
    assert_eq!(right.velocity(), DVec2::new(1.0, 0.0));
}

#[test]
fn test_resolution_conserves_momentum_and_energy() {
    let entities = EntitySystem::new();
    let physics = PhysicsSystem::new();

    let a = ball(
        &entities,
        &physics,
        DVec2::new(0.0, 0.0),
        DVec2::new(0.3, 0.1),
        Mass::new(2.0),
        10.0,
    );
    let b = ball(
        &entities,
        &physics,
        DVec2::new(12.0, 5.0),
        DVec2::new(-0.2, 0.05),
        Mass::new(3.0),
        10.0,
    );

    let momentum_before = physics.total_momentum();
    let energy_before = physics.kinetic_energy();

    physics.update(0.0);

    // The pair overlaps and approaches, so an impulse was exchanged.
    assert_ne!(a.velocity(), DVec2::new(0.3, 0.1));
    assert_ne!(b.velocity(), DVec2::new(-0.2, 0.05));

    let momentum_after = physics.total_momentum();
    assert_relative_eq!(momentum_before.x, momentum_after.x, epsilon = 1e-9);
    assert_relative_eq!(momentum_before.y, momentum_after.y, epsilon = 1e-9);
    assert_relative_eq!(energy_before, physics.kinetic_energy(), epsilon = 1e-9);
}

#[test]
fn test_infinite_mass_body_never_moves() {
    let entities = EntitySystem::new();
    let physics = PhysicsSystem::new();

    let wall = ball(
        &entities,
        &physics,
        DVec2::new(0.0, 0.0),
        DVec2::ZERO,
        Mass::INFINITE,
        10.0,
    );
    let shot = ball(
        &entities,
        &physics,
        DVec2::new(15.0, 0.0),
        DVec2::new(-1.0, 0.0),
        Mass::new(1.0),
        10.0,
    );

    physics.update(0.0);

    assert_eq!(wall.velocity(), DVec2::ZERO);
    // Against an immovable wall the shot reflects at full speed.
    assert_eq!(shot.velocity(), DVec2::new(1.0, 0.0));
}

#[test]
fn test_separating_overlap_receives_no_impulse() {
    let entities = EntitySystem::new();
    let physics = PhysicsSystem::new();

    let left = ball(
        &entities,
        &physics,
        DVec2::new(0.0, 0.0),
        DVec2::new(-1.0, 0.0),
        Mass::new(1.0),
        10.0,
    );
    let right = ball(
        &entities,
        &physics,
        DVec2::new(15.0, 0.0),
        DVec2::new(1.0, 0.0),
        Mass::new(1.0),
        10.0,
    );

    let hooked = Rc::new(RefCell::new(Vec::new()));
    {
        let hooked = Rc::clone(&hooked);
        left.on_collision(move |collision| hooked.borrow_mut().push(collision.other().id()));
    }

    physics.update(0.0);

    assert_eq!(left.velocity(), DVec2::new(-1.0, 0.0));
    assert_eq!(right.velocity(), DVec2::new(1.0, 0.0));
    assert!(
        hooked.borrow().is_empty(),
        "separating pairs are not resolved, so no hooks fire"
    );
}

#[test]
fn test_coincident_centers_are_skipped() {
    let entities = EntitySystem::new();
    let physics = PhysicsSystem::new();

    let a = ball(
        &entities,
        &physics,
        DVec2::new(5.0, 5.0),
        DVec2::new(1.0, 0.0),
        Mass::new(1.0),
        10.0,
    );
    let b = ball(
        &entities,
        &physics,
        DVec2::new(5.0, 5.0),
        DVec2::new(-1.0, 0.0),
        Mass::new(1.0),
        10.0,
    );

    physics.update(0.0);

    // No usable normal: velocities untouched, and nothing NaN'd.
    assert_eq!(a.velocity(), DVec2::new(1.0, 0.0));
    assert_eq!(b.velocity(), DVec2::new(-1.0, 0.0));
}

#[test]
fn test_hooks_fire_once_per_side_with_swapped_roles() {
    let entities = EntitySystem::new();
    let physics = PhysicsSystem::new();

    let left = ball(
        &entities,
        &physics,
        DVec2::new(0.0, 0.0),
        DVec2::new(1.0, 0.0),
        Mass::new(1.0),
        10.0,
    );
    let right = ball(
        &entities,
        &physics,
        DVec2::new(15.0, 0.0),
        DVec2::new(-1.0, 0.0),
        Mass::new(1.0),
        10.0,
    );

    let seen: Rc<RefCell<Vec<(BodyId, BodyId)>>> = Rc::new(RefCell::new(Vec::new()));
    for body in [&left, &right] {
        let seen = Rc::clone(&seen);
        body.on_collision(move |collision| {
            seen.borrow_mut()
                .push((collision.body().id(), collision.other().id()));
        });
    }

    physics.update(0.0);

    assert_eq!(
        *seen.borrow(),
        vec![(left.id(), right.id()), (right.id(), left.id())]
    );
}

#[test]
fn test_hook_sees_post_impulse_velocities() {
    let entities = EntitySystem::new();
    let physics = PhysicsSystem::new();

    let left = ball(
        &entities,
        &physics,
        DVec2::new(0.0, 0.0),
        DVec2::new(1.0, 0.0),
        Mass::new(1.0),
        10.0,
    );
    ball(
        &entities,
        &physics,
        DVec2::new(15.0, 0.0),
        DVec2::new(-1.0, 0.0),
        Mass::new(1.0),
        10.0,
    );

    let observed = Rc::new(RefCell::new(Vec::new()));
    {
        let observed = Rc::clone(&observed);
        left.on_collision(move |collision| {
            observed
                .borrow_mut()
                .push((collision.body().velocity(), collision.other().velocity()));
        });
    }

    physics.update(0.0);

    // Impulses apply before any hook runs.
    assert_eq!(
        *observed.borrow(),
        vec![(DVec2::new(-1.0, 0.0), DVec2::new(1.0, 0.0))]
    );
}

#[test]
fn test_hook_destroying_other_body_suppresses_its_hooks() {
    let entities = EntitySystem::new();
    let physics = PhysicsSystem::new();

    let left = ball(
        &entities,
        &physics,
        DVec2::new(0.0, 0.0),
        DVec2::new(1.0, 0.0),
        Mass::new(1.0),
        10.0,
    );
    let right = ball(
        &entities,
        &physics,
        DVec2::new(15.0, 0.0),
        DVec2::new(-1.0, 0.0),
        Mass::new(1.0),
        10.0,
    );

    // The lower-id side's hooks run first and destroy the other body.
    {
        let right = right.clone();
        left.on_collision(move |_| right.entity().destroy());
    }

    let right_hook_ran = Rc::new(RefCell::new(false));
    {
        let right_hook_ran = Rc::clone(&right_hook_ran);
        right.on_collision(move |_| *right_hook_ran.borrow_mut() = true);
    }

    physics.update(0.0);

    assert!(right.is_destroyed());
    assert!(
        !*right_hook_ran.borrow(),
        "a destroyed side's hooks must be skipped"
    );
    // The impulse had already been exchanged before the hook destroyed it.
    assert_eq!(left.velocity(), DVec2::new(-1.0, 0.0));
}

#[test]
fn test_data_payload_lookup_across_collision() {
    struct Hittable {
        damage: f64,
    }

    let entities = EntitySystem::new();
    let physics = PhysicsSystem::new();

    let shot = ball(
        &entities,
        &physics,
        DVec2::new(0.0, 0.0),
        DVec2::new(1.0, 0.0),
        Mass::new(1.0),
        10.0,
    );
    let target = ball(
        &entities,
        &physics,
        DVec2::new(15.0, 0.0),
        DVec2::new(-1.0, 0.0),
        Mass::new(1.0),
        10.0,
    );
    target.add_data(Rc::new(Hittable { damage: 25.0 }));

    let damage_dealt = Rc::new(RefCell::new(None));
    {
        let damage_dealt = Rc::clone(&damage_dealt);
        shot.on_collision(move |collision| {
            if let Some(hittable) = collision.other().first_data::<Hittable>() {
                *damage_dealt.borrow_mut() = Some(hittable.damage);
            }
        });
    }

    physics.update(0.0);

    assert_eq!(*damage_dealt.borrow(), Some(25.0));
}
