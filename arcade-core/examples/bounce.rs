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
//! Headless bouncing-asteroids demo.
//!
//! Drifting circle bodies wrap around a screen-sized field and bounce off
//! each other elastically. Run with `RUST_LOG=info` (or `debug`) to watch the
//! simulation; the conservation totals at the end stay put because every
//! collision is elastic.

use arcade_core::{Entity, EntitySystem, Mass, PhysicsBody, PhysicsSystem, Transform};
use glam::DVec2;

const WIDTH: f64 = 800.0;
const HEIGHT: f64 = 600.0;
const FRAME_MS: f64 = 16.0;

fn spawn_asteroid(
    entities: &EntitySystem,
    physics: &PhysicsSystem,
    position: DVec2,
    velocity: DVec2,
    radius: f64,
) -> (Entity, PhysicsBody) {
    let entity = entities.new_entity();
    let transform = Transform::new();
    transform.set_local_x(position.x);
    transform.set_local_y(position.y);

    // Mass scales with area, like the asteroids it stands in for.
    let body = physics.new_body(&entity, transform, Mass::new(radius * radius));
    body.add_circle_collider(radius);
    body.set_velocity(velocity);

    // Screen wrap: entity update, not physics, owns this behavior.
    {
        let transform = body.transform().clone();
        entity.on_update(move |_delta_ms| {
            transform.set_local_x(transform.local_x().rem_euclid(WIDTH));
            transform.set_local_y(transform.local_y().rem_euclid(HEIGHT));
        });
    }

    (entity, body)
}

fn main() {
    env_logger::init();

    let entities = EntitySystem::new();
    let physics = PhysicsSystem::new();

    let asteroids = [
        (DVec2::new(100.0, 100.0), DVec2::new(0.06, 0.02), 30.0),
        (DVec2::new(700.0, 120.0), DVec2::new(-0.05, 0.03), 24.0),
        (DVec2::new(400.0, 500.0), DVec2::new(0.01, -0.07), 36.0),
        (DVec2::new(200.0, 400.0), DVec2::new(0.04, -0.01), 20.0),
        (DVec2::new(600.0, 350.0), DVec2::new(-0.03, -0.04), 28.0),
        (DVec2::new(350.0, 80.0), DVec2::new(-0.02, 0.06), 22.0),
    ];
    let bodies: Vec<PhysicsBody> = asteroids
        .iter()
        .map(|&(position, velocity, radius)| {
            spawn_asteroid(&entities, &physics, position, velocity, radius).1
        })
        .collect();

    let energy_start = physics.kinetic_energy();
    let momentum_start = physics.total_momentum();
    log::info!(
        "starting: {} bodies, energy {:.3}, momentum ({:.3}, {:.3})",
        physics.body_count(),
        energy_start,
        momentum_start.x,
        momentum_start.y
    );

    let collisions = std::rc::Rc::new(std::cell::Cell::new(0u32));
    for body in &bodies {
        let sink = std::rc::Rc::clone(&collisions);
        // Every pair fires once from each side, so halve the tally at the end.
        body.on_collision(move |_| sink.set(sink.get() + 1));
    }

    for frame in 0..1200 {
        entities.update(FRAME_MS);
        physics.update(FRAME_MS);

        if frame % 120 == 0 {
            for (index, body) in bodies.iter().enumerate() {
                log::info!(
                    "frame {frame}: asteroid {index} at ({:.1}, {:.1}), speed {:.3}",
                    body.transform().x(),
                    body.transform().y(),
                    body.speed()
                );
            }
        }
    }

    let energy_end = physics.kinetic_energy();
    log::info!(
        "finished: energy {:.3} (started {:.3}), broad-phase nodes: {}",
        energy_end,
        energy_start,
        physics.debug_bounding_boxes().len()
    );
    println!(
        "simulated 1200 frames, {} collisions; kinetic energy {:.6} -> {:.6}",
        collisions.get() / 2,
        energy_start,
        energy_end
    );
}
