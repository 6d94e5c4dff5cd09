//! The simulation core: owns all state and runs the fixed-dt tick.
//!
//! Tick structure:
//!
//! 1. neighbor query over the spatial grid
//! 2. collider assembly (real neighbors, then virtual wall images)
//! 3. pseudo-pressure solve
//! 4. ordered force stages and integration
//! 5. boundary kinematics for the next tick
//!
//! Every fallible step runs before the first particle mutation, so a tick
//! either commits in full or returns an error with particle state exactly
//! as it was. Callers treat a `step` error as fatal and stop ticking.

use bevy::prelude::*;

use crate::error::Result;
use crate::sim::boundary::{collect_segments, Body};
use crate::sim::collider::ColliderArena;
use crate::sim::forces;
use crate::sim::geometry::points_to_segments;
use crate::sim::params::SimParams;
use crate::sim::particle::Particles;
use crate::sim::pressure;
use crate::sim::spatial::SpatialGrid;

/// Owns the particle population, boundary bodies, and per-tick scratch
/// state.
#[derive(Resource)]
pub struct Simulation {
    params: SimParams,
    particles: Particles,
    bodies: Vec<Body>,
    grid: SpatialGrid,
    arena: ColliderArena,
    tick: u64,
}

impl Simulation {
    /// Build a simulation from validated parameters: spawn the population
    /// and size the neighbor grid to the domain.
    pub fn new(params: SimParams, bodies: Vec<Body>) -> Result<Self> {
        let particles = Particles::spawn_random(&params)?;
        let grid = SpatialGrid::for_domain(params.bounds_min, params.bounds_max, params.diameter());

        info!(
            particles = particles.len(),
            bodies = bodies.len(),
            dt = params.dt,
            "simulation ready"
        );

        Ok(Self {
            params,
            particles,
            bodies,
            grid,
            arena: ColliderArena::default(),
            tick: 0,
        })
    }

    /// Like [`Simulation::new`] but with an explicit starting population,
    /// for staged scenes and tests.
    pub fn with_particles(params: SimParams, particles: Particles, bodies: Vec<Body>) -> Result<Self> {
        params.validate()?;
        let grid = SpatialGrid::for_domain(params.bounds_min, params.bounds_max, params.diameter());
        Ok(Self {
            params,
            particles,
            bodies,
            grid,
            arena: ColliderArena::default(),
            tick: 0,
        })
    }

    /// Advance the world by one fixed timestep.
    ///
    /// On error the particle population is untouched; boundary bodies are
    /// only advanced after the particle update commits.
    pub fn step(&mut self) -> Result<()> {
        let diameter = self.params.diameter();

        self.grid.build(&self.particles.positions);
        let neighbor_sets = self.grid.neighbors(&self.particles.positions, diameter);

        let segments = collect_segments(&self.bodies);
        let hits = points_to_segments(&self.particles.positions, &segments);

        self.arena.assemble(
            &self.particles.positions,
            &self.particles.velocities,
            &self.particles.masses,
            &neighbor_sets,
            &hits,
            segments.len(),
            self.params.particle_radius,
        )?;

        let pressures = pressure::solve(&mut self.arena, diameter)?;

        // All fallible work is done; from here the tick commits.
        forces::apply_wall_bounce(&mut self.particles, &self.arena);
        forces::apply_gravity(&mut self.particles, &self.params);
        forces::apply_pressure(&mut self.particles, &self.arena, &pressures, &self.params);
        forces::apply_viscosity(&mut self.particles, &self.arena, &self.params);
        forces::apply_velocity(&mut self.particles, &self.params);

        for body in &mut self.bodies {
            body.advance(self.params.dt);
        }

        self.tick += 1;
        Ok(())
    }

    /// Run the optional spring stage against the colliders assembled by the
    /// most recent [`Simulation::step`]. Has no effect before the first
    /// step.
    pub fn apply_spring_stage(&mut self) {
        // No arena before the first step.
        if self.arena.particle_count() != self.particles.len() {
            return;
        }
        forces::apply_spring(&mut self.particles, &self.arena, &self.params);
    }

    /// Parameters the simulation was built with.
    pub fn params(&self) -> &SimParams {
        &self.params
    }

    /// Read-only view of the particle population.
    pub fn particles(&self) -> &Particles {
        &self.particles
    }

    /// Read-only view of the boundary bodies.
    pub fn bodies(&self) -> &[Body] {
        &self.bodies
    }

    /// Ticks committed so far.
    pub fn tick(&self) -> u64 {
        self.tick
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::boundary::box_walls;

    fn small_world(count: usize, seed: u64) -> Result<Simulation> {
        let params = SimParams::default()
            .with_particle_count(count)
            .with_seed(seed);
        Simulation::new(params, vec![box_walls(Vec2::ZERO, Vec2::ONE)])
    }

    #[test]
    fn particles_stay_in_bounds_over_many_ticks() -> Result<()> {
        let mut sim = small_world(100, 11)?;
        for _ in 0..200 {
            sim.step()?;
        }

        let margin = sim.params().margin();
        for p in &sim.particles().positions {
            assert!(p.x >= margin && p.x <= 1.0 - margin);
            assert!(p.y >= margin && p.y <= 1.0 - margin);
            assert!(p.is_finite());
        }
        Ok(())
    }

    #[test]
    fn seeded_runs_are_identical() -> Result<()> {
        let mut a = small_world(60, 3)?;
        let mut b = small_world(60, 3)?;
        for _ in 0..50 {
            a.step()?;
            b.step()?;
        }
        assert_eq!(a.particles().positions, b.particles().positions);
        assert_eq!(a.particles().velocities, b.particles().velocities);
        Ok(())
    }

    #[test]
    fn coincident_pair_separates_monotonically() -> Result<()> {
        let params = SimParams {
            gravity: Vec2::ZERO,
            ..SimParams::default()
        };
        let particles = Particles::from_parts(
            vec![Vec2::splat(0.5), Vec2::splat(0.5)],
            vec![Vec2::ZERO; 2],
            vec![0.2; 2],
        )?;
        let mut sim = Simulation::with_particles(params, particles, vec![])?;

        let mut last = 0.0f32;
        let diameter = sim.params().diameter();
        for _ in 0..800 {
            sim.step()?;
            let d = (sim.particles().positions[0] - sim.particles().positions[1]).length();
            assert!(d >= last, "separation must not shrink: {d} < {last}");
            last = d;
            if d >= diameter {
                break;
            }
        }
        assert!(last >= diameter, "pair never fully separated: {last}");
        Ok(())
    }

    #[test]
    fn spring_stage_before_first_step_is_a_no_op() -> Result<()> {
        let mut sim = small_world(12, 6)?;
        let before = sim.particles().velocities.clone();

        sim.apply_spring_stage();
        assert_eq!(sim.particles().velocities, before);

        // After a step the stage operates normally.
        sim.step()?;
        sim.apply_spring_stage();
        Ok(())
    }

    #[test]
    fn tick_counts_committed_steps() -> Result<()> {
        let mut sim = small_world(10, 1)?;
        assert_eq!(sim.tick(), 0);
        sim.step()?;
        sim.step()?;
        assert_eq!(sim.tick(), 2);
        Ok(())
    }

    #[test]
    fn bodies_advance_with_the_world() -> Result<()> {
        use crate::sim::boundary::{AngularRateFn, Body, MotionFn};
        use crate::sim::geometry::Segment;

        let params = SimParams::default().with_particle_count(4).with_seed(2);
        let paddle = Body::prescribed(
            "paddle",
            vec![Segment::new(Vec2::new(0.4, 0.5), Vec2::new(0.6, 0.5))],
            MotionFn::Constant {
                velocity: [0.0, -0.1],
            },
            AngularRateFn::Zero,
        );
        let mut sim = Simulation::new(params, vec![paddle])?;

        let before = sim.bodies()[0].segments()[0].a;
        for _ in 0..10 {
            sim.step()?;
        }
        let after = sim.bodies()[0].segments()[0].a;
        assert!((after.y - (before.y - 0.1 * 10.0 * 0.005)).abs() < 1e-5);
        Ok(())
    }
}
