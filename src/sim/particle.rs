//! Particle population storage and spawning.
//!
//! The population lives in parallel arrays (SoA layout) so the per-tick
//! assembly and integration passes stay cache-friendly. It is created once
//! at world start and never resized at runtime; only the force integrator
//! mutates it, once per tick.

use bevy::prelude::*;
use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::error::{Error, Result};
use crate::sim::params::SimParams;

/// The particle population: positions, velocities, and masses in parallel
/// arrays of identical length.
#[derive(Clone, Debug, Default)]
pub struct Particles {
    /// Particle positions.
    pub positions: Vec<Vec2>,
    /// Particle velocities.
    pub velocities: Vec<Vec2>,
    /// Particle masses, all positive.
    pub masses: Vec<f32>,
}

impl Particles {
    /// Spawn the population described by `params`: uniformly random
    /// positions inside the domain, zero velocity, uniform mass.
    ///
    /// A fixed `seed` makes placement reproducible; `None` seeds from
    /// entropy.
    pub fn spawn_random(params: &SimParams) -> Result<Self> {
        params.validate()?;

        let mut rng: StdRng = match params.seed {
            Some(s) => SeedableRng::seed_from_u64(s),
            None => SeedableRng::seed_from_u64(rand::rng().random()),
        };

        let n = params.particle_count;
        let min = params.bounds_min;
        let max = params.bounds_max;

        let mut positions = Vec::with_capacity(n);
        for _ in 0..n {
            positions.push(Vec2::new(
                rng.random_range(min.x..max.x),
                rng.random_range(min.y..max.y),
            ));
        }

        Ok(Self {
            positions,
            velocities: vec![Vec2::ZERO; n],
            masses: vec![params.particle_mass; n],
        })
    }

    /// Build a population from explicit state. Used by tests and by callers
    /// that stage their own scenes; shapes and masses are validated.
    pub fn from_parts(positions: Vec<Vec2>, velocities: Vec<Vec2>, masses: Vec<f32>) -> Result<Self> {
        if velocities.len() != positions.len() {
            return Err(Error::ShapeMismatch {
                what: "particle velocities",
                expected: positions.len(),
                got: velocities.len(),
            });
        }
        if masses.len() != positions.len() {
            return Err(Error::ShapeMismatch {
                what: "particle masses",
                expected: positions.len(),
                got: masses.len(),
            });
        }
        if !masses.iter().all(|&m| m.is_finite() && m > 0.0) {
            return Err(Error::InvalidParam(
                "particle masses must be finite and > 0".into(),
            ));
        }
        Ok(Self {
            positions,
            velocities,
            masses,
        })
    }

    /// Number of particles.
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Whether the population is empty.
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}
