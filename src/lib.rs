//! crate2d - real-time 2D pseudo-physical particle simulation
//!
//! Particles repel when overlapping, bounce off segment walls, damp toward
//! the velocity of their interaction partners, and fall under gravity,
//! integrated explicitly at a fixed timestep. Walls belong to boundary
//! bodies that can be fixed in place, driven by scripted motion functions,
//! or moved freely with externally set velocities.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use bevy::prelude::*;
//! use crate2d::prelude::*;
//!
//! fn main() -> crate2d::Result<()> {
//!     let (params, bodies) = WorldConfig::default().build()?;
//!
//!     let mut app = App::new();
//!     app.add_plugins(MinimalPlugins)
//!         .add_plugins(CrateSimPlugin::new(params, bodies));
//!
//!     // One tick per update; the plugin steps at the configured fixed dt.
//!     for _ in 0..600 {
//!         app.update();
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - [`sim`]: Core simulation module
//!   - [`sim::params`]: Simulation parameters
//!   - [`sim::particle`]: Particle population storage
//!   - [`sim::spatial`]: Uniform grid for neighbor search
//!   - [`sim::geometry`]: Segments and nearest-point queries
//!   - [`sim::collider`]: Per-particle interaction assembly
//!   - [`sim::pressure`]: Pseudo-pressure solver
//!   - [`sim::forces`]: Ordered force stages and integration
//!   - [`sim::boundary`]: Boundary bodies and their kinematics
//!   - [`sim::config`]: World configuration loading
//!   - [`sim::simulation`]: The per-tick pipeline
//!   - [`sim::plugin`]: Bevy plugin
//! - [`error`]: Error type and `Result` alias

pub mod error;
pub mod sim;

pub use error::{Error, Result};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::sim::prelude::*;
}
