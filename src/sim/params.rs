//! Simulation parameters.
//!
//! These parameters control the behavior of the particle simulation. They
//! are immutable from the core's point of view: the simulation receives
//! them at construction and per tick, and never mutates them.

use bevy::prelude::*;

use crate::error::{Error, Result};

/// Parameters controlling the particle simulation behavior.
///
/// The defaults reproduce the reference "crate" scene: 500 particles of
/// uniform mass falling inside a unit box at 0.005 s per tick.
#[derive(Resource, Clone, Debug, Reflect)]
#[reflect(Resource)]
pub struct SimParams {
    /// Number of particles spawned at world start. The population is never
    /// resized afterwards.
    pub particle_count: usize,

    /// Uniform particle mass. Must be positive.
    pub particle_mass: f32,

    /// Particle radius. The interaction cutoff is twice this value.
    pub particle_radius: f32,

    /// Fixed timestep in seconds, applied once per tick.
    pub dt: f32,

    /// Gravity acceleration vector. The default points along +y, matching
    /// screen coordinates where y grows downward.
    pub gravity: Vec2,

    /// Gain applied to the pseudo-pressure repulsion force.
    pub pressure_amplifier: f32,

    /// Damping rate toward collider velocities.
    /// Higher values = more syrup-like motion.
    pub viscosity: f32,

    /// Gain for the optional spring stage.
    pub spring_amplifier: f32,

    /// Target equilibrium overlap for the optional spring stage, in [0, 1].
    pub spring_overlap_balance: f32,

    /// Simulation domain bounds (min corner).
    pub bounds_min: Vec2,

    /// Simulation domain bounds (max corner).
    pub bounds_max: Vec2,

    /// RNG seed for particle placement. `None` seeds from entropy.
    pub seed: Option<u64>,
}

impl Default for SimParams {
    fn default() -> Self {
        Self {
            particle_count: 500,
            particle_mass: 0.2,
            particle_radius: 0.01,
            dt: 0.005,
            gravity: Vec2::new(0.0, 9.81),
            pressure_amplifier: 500.0,
            viscosity: 1.0,
            spring_amplifier: 500.0,
            spring_overlap_balance: 0.2,
            bounds_min: Vec2::ZERO,
            bounds_max: Vec2::ONE,
            seed: None,
        }
    }
}

impl SimParams {
    /// Interaction cutoff distance: twice the particle radius. Colliders at
    /// or beyond this distance have zero overlap.
    pub fn diameter(&self) -> f32 {
        2.0 * self.particle_radius
    }

    /// Clamp margin per axis: particle centers stay within
    /// `[min + radius/2, max - radius/2]` after integration.
    pub fn margin(&self) -> f32 {
        self.particle_radius / 2.0
    }

    /// Set the particle count.
    pub fn with_particle_count(mut self, count: usize) -> Self {
        self.particle_count = count;
        self
    }

    /// Set the placement seed for reproducible runs.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set the gravity vector.
    pub fn with_gravity(mut self, gravity: Vec2) -> Self {
        self.gravity = gravity;
        self
    }

    /// Set the fixed timestep.
    pub fn with_dt(mut self, dt: f32) -> Self {
        self.dt = dt;
        self
    }

    /// Check that every parameter is finite and in its legal range.
    pub fn validate(&self) -> Result<()> {
        if self.particle_count == 0 {
            return Err(Error::InvalidParam("particle_count must be > 0".into()));
        }
        if !self.particle_mass.is_finite() || self.particle_mass <= 0.0 {
            return Err(Error::InvalidParam(
                "particle_mass must be finite and > 0".into(),
            ));
        }
        if !self.particle_radius.is_finite() || self.particle_radius <= 0.0 {
            return Err(Error::InvalidParam(
                "particle_radius must be finite and > 0".into(),
            ));
        }
        if !self.dt.is_finite() || self.dt <= 0.0 {
            return Err(Error::InvalidParam("dt must be finite and > 0".into()));
        }
        if !self.gravity.is_finite() {
            return Err(Error::InvalidParam("gravity must be finite".into()));
        }
        for (name, value) in [
            ("pressure_amplifier", self.pressure_amplifier),
            ("viscosity", self.viscosity),
            ("spring_amplifier", self.spring_amplifier),
            ("spring_overlap_balance", self.spring_overlap_balance),
        ] {
            if !value.is_finite() {
                return Err(Error::InvalidParam(format!("{name} must be finite")));
            }
        }
        if !self.bounds_min.is_finite() || !self.bounds_max.is_finite() {
            return Err(Error::InvalidParam("domain bounds must be finite".into()));
        }
        if self.bounds_max.x <= self.bounds_min.x || self.bounds_max.y <= self.bounds_min.y {
            return Err(Error::InvalidParam(
                "bounds_max must exceed bounds_min on both axes".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let params = SimParams::default();
        assert!(params.validate().is_ok());
        assert_eq!(params.diameter(), 0.02);
        assert_eq!(params.margin(), 0.005);
    }

    #[test]
    fn bad_params_rejected() {
        let params = SimParams::default().with_dt(0.0);
        assert!(params.validate().is_err());

        let params = SimParams {
            particle_mass: -1.0,
            ..SimParams::default()
        };
        assert!(params.validate().is_err());

        let params = SimParams {
            bounds_max: Vec2::new(-1.0, 1.0),
            ..SimParams::default()
        };
        assert!(params.validate().is_err());
    }

    #[test]
    fn builders_apply() {
        let params = SimParams::default()
            .with_particle_count(16)
            .with_seed(7)
            .with_gravity(Vec2::ZERO);
        assert_eq!(params.particle_count, 16);
        assert_eq!(params.seed, Some(7));
        assert_eq!(params.gravity, Vec2::ZERO);
    }
}
