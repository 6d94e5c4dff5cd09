//! Core particle simulation module.
//!
//! The per-tick pipeline assembles, for every particle, a list of
//! interaction partners ("colliders"): real neighbors found by the spatial
//! grid, followed by virtual images mirrored across nearby wall segments.
//! A scalar pseudo-pressure is computed from collider overlaps and
//! redistributed back onto the colliders, after which the force stages run
//! in a fixed order: wall bounce, gravity, pressure repulsion, viscosity
//! damping, and finally explicit integration with a boundary clamp.
//! Boundary bodies advance their own kinematics at the end of each tick.
//!
//! # Components
//!
//! - [`params`]: Simulation parameters (timestep, coefficients, domain)
//! - [`particle`]: Particle population storage and spawning
//! - [`spatial`]: Uniform grid neighbor search
//! - [`geometry`]: Segments and point-to-segment queries
//! - [`collider`]: Collider arena assembly
//! - [`pressure`]: Pseudo-pressure solver
//! - [`forces`]: Force stages and integration
//! - [`boundary`]: Boundary bodies (fixed / prescribed / free)
//! - [`config`]: World configuration loading
//! - [`simulation`]: The tick orchestrator
//! - [`plugin`]: Bevy plugin for easy integration

pub mod boundary;
pub mod collider;
pub mod config;
pub mod forces;
pub mod geometry;
pub mod params;
pub mod particle;
pub mod plugin;
pub mod pressure;
pub mod simulation;
pub mod spatial;

/// Prelude for convenient imports.
pub mod prelude {
    pub use super::boundary::*;
    pub use super::collider::*;
    pub use super::config::*;
    pub use super::geometry::*;
    pub use super::params::*;
    pub use super::particle::*;
    pub use super::plugin::*;
    pub use super::simulation::*;
    pub use super::spatial::*;
}
