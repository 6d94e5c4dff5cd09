//! Ordered force stages.
//!
//! Stages run in a fixed order every tick, and each stage reads the
//! velocity already mutated by the stages before it. That same-tick
//! read/write ordering is part of the model's behavior, not an accident:
//! reordering the stages or snapshotting velocities changes the motion.
//!
//! Mandatory order: wall bounce, gravity, pressure repulsion, viscosity,
//! then integration with the boundary clamp. The spring stage exists but is
//! not wired into the default tick; callers invoke it separately when a
//! scene wants cohesion.

use bevy::prelude::*;

use crate::sim::collider::ColliderArena;
use crate::sim::params::SimParams;
use crate::sim::particle::Particles;

/// Reflect the velocity of every particle that touches a wall and is moving
/// into it.
///
/// The mean of a particle's virtual collider vectors approximates the wall
/// normal. When the velocity points against that normal, its normal
/// component is flipped; the tangential component is untouched, so this is
/// a perfectly elastic bounce.
pub fn apply_wall_bounce(particles: &mut Particles, arena: &ColliderArena) {
    for i in 0..particles.len() {
        let span = arena.virtual_span(i);
        if span.is_empty() {
            continue;
        }

        let mut normal = Vec2::ZERO;
        for k in span.clone() {
            normal += arena.vectors[k];
        }
        normal /= span.len() as f32;

        let along = particles.velocities[i].dot(normal);
        if along < 0.0 {
            particles.velocities[i] -= 2.0 * along * normal / normal.length_squared();
        }
    }
}

/// Accelerate every particle along gravity, scaled by its mass.
///
/// The mass scaling is part of the model, not an attempt at physical
/// accuracy.
pub fn apply_gravity(particles: &mut Particles, params: &SimParams) {
    for (velocity, &mass) in particles.velocities.iter_mut().zip(&particles.masses) {
        *velocity += params.dt * params.gravity * mass;
    }
}

/// Push every particle along each of its collider vectors, weighted by the
/// summed pseudo-pressures of the pair.
///
/// Both real and virtual colliders use the same formula; the virtual side
/// contributes zero partner pressure, so wall repulsion comes from the
/// particle's own crowding.
pub fn apply_pressure(
    particles: &mut Particles,
    arena: &ColliderArena,
    pressures: &[f32],
    params: &SimParams,
) {
    for i in 0..particles.len() {
        let mut push = Vec2::ZERO;
        for k in arena.span(i) {
            push += (pressures[i] + arena.pressures[k]) * arena.vectors[k];
        }
        particles.velocities[i] +=
            params.dt * params.pressure_amplifier * particles.masses[i] * push;
    }
}

/// Drag every particle's velocity toward the velocities of its colliders.
///
/// Virtual wall colliders carry zero velocity, so this stage also damps
/// motion near walls. A particle with no colliders is left untouched.
pub fn apply_viscosity(particles: &mut Particles, arena: &ColliderArena, params: &SimParams) {
    for i in 0..particles.len() {
        let velocity = particles.velocities[i];
        let mut drag = Vec2::ZERO;
        for k in arena.span(i) {
            drag += arena.velocities[k] - velocity;
        }
        particles.velocities[i] += params.dt * params.viscosity * drag;
    }
}

/// Optional spring stage: each collider contributes along its vector scaled
/// by `(equilibrium overlap - actual overlap)`, pushing the pair apart
/// below the equilibrium overlap and pulling it together above.
///
/// Not part of the default tick.
pub fn apply_spring(particles: &mut Particles, arena: &ColliderArena, params: &SimParams) {
    for i in 0..particles.len() {
        let mut pull = Vec2::ZERO;
        for k in arena.span(i) {
            pull += (params.spring_overlap_balance - arena.overlaps[k]) * arena.vectors[k];
        }
        particles.velocities[i] += params.dt * params.spring_amplifier * pull;
    }
}

/// Integrate positions and clamp them into the domain.
///
/// The clamp keeps every coordinate within half a radius of the walls no
/// matter how large the pre-clamp velocity is; it is a hard safety net
/// on top of the bounce stage.
pub fn apply_velocity(particles: &mut Particles, params: &SimParams) {
    let margin = params.margin();
    let low = params.bounds_min + Vec2::splat(margin);
    let high = params.bounds_max - Vec2::splat(margin);
    for (position, velocity) in particles.positions.iter_mut().zip(&particles.velocities) {
        *position += params.dt * *velocity;
        *position = position.clamp(low, high);
    }
}
