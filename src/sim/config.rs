//! YAML scene configuration.
//!
//! A scene file sets simulation parameters and declares boundary bodies.
//! Every field has a default, so an empty document is a valid scene: the
//! reference crate of 500 particles falling inside a unit box.
//!
//! ```yaml
//! params:
//!   particle_count: 500
//!   dt: 0.005
//!   gravity: [0.0, 9.81]
//!   seed: 42
//! bodies:
//!   - name: lift
//!     kind: prescribed
//!     segments:
//!       - [[0.0, 0.0], [1.0, 0.0]]
//!     scale: [0.4, 1.0]
//!     offset: [0.3, 0.9]
//!     motion:
//!       fn: oscillate
//!       axis: [0.0, 0.05]
//!       frequency_hz: 0.5
//!     angular:
//!       fn: zero
//! ```
//!
//! Bodies declare motion by naming a registry variant; a scene file cannot
//! supply code. When no bodies are declared, the domain's four walls are
//! added as one fixed body.

use std::path::Path;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::sim::boundary::{box_walls, AngularRateFn, Body, MotionFn};
use crate::sim::geometry::Segment;
use crate::sim::params::SimParams;

/// A whole scene: parameters plus boundary bodies.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WorldConfig {
    /// Simulation parameters; missing fields take their defaults.
    #[serde(default)]
    pub params: ParamsConfig,
    /// Boundary bodies. Empty means the domain walls only.
    #[serde(default)]
    pub bodies: Vec<BodyConfig>,
}

/// Serializable mirror of [`SimParams`].
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct ParamsConfig {
    pub particle_count: usize,
    pub particle_mass: f32,
    pub particle_radius: f32,
    pub dt: f32,
    pub gravity: [f32; 2],
    pub pressure_amplifier: f32,
    pub viscosity: f32,
    pub spring_amplifier: f32,
    pub spring_overlap_balance: f32,
    pub bounds_min: [f32; 2],
    pub bounds_max: [f32; 2],
    pub seed: Option<u64>,
}

impl Default for ParamsConfig {
    fn default() -> Self {
        let p = SimParams::default();
        Self {
            particle_count: p.particle_count,
            particle_mass: p.particle_mass,
            particle_radius: p.particle_radius,
            dt: p.dt,
            gravity: p.gravity.into(),
            pressure_amplifier: p.pressure_amplifier,
            viscosity: p.viscosity,
            spring_amplifier: p.spring_amplifier,
            spring_overlap_balance: p.spring_overlap_balance,
            bounds_min: p.bounds_min.into(),
            bounds_max: p.bounds_max.into(),
            seed: p.seed,
        }
    }
}

impl From<ParamsConfig> for SimParams {
    fn from(c: ParamsConfig) -> Self {
        Self {
            particle_count: c.particle_count,
            particle_mass: c.particle_mass,
            particle_radius: c.particle_radius,
            dt: c.dt,
            gravity: c.gravity.into(),
            pressure_amplifier: c.pressure_amplifier,
            viscosity: c.viscosity,
            spring_amplifier: c.spring_amplifier,
            spring_overlap_balance: c.spring_overlap_balance,
            bounds_min: c.bounds_min.into(),
            bounds_max: c.bounds_max.into(),
            seed: c.seed,
        }
    }
}

/// One boundary body as declared in a scene file. Segments are given in
/// body-local coordinates and placed into the world by `scale` then
/// `offset`, once.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BodyConfig {
    pub name: String,
    /// Segments as endpoint pairs, body-local.
    pub segments: Vec<[[f32; 2]; 2]>,
    #[serde(default = "default_scale")]
    pub scale: [f32; 2],
    #[serde(default)]
    pub offset: [f32; 2],
    #[serde(flatten)]
    pub kind: BodyKindConfig,
}

fn default_scale() -> [f32; 2] {
    [1.0, 1.0]
}

/// How a configured body moves.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BodyKindConfig {
    Fixed,
    Free {
        velocity: [f32; 2],
        #[serde(default)]
        angular_rate: f32,
    },
    Prescribed {
        motion: MotionFn,
        #[serde(default = "zero_rate")]
        angular: AngularRateFn,
    },
}

fn zero_rate() -> AngularRateFn {
    AngularRateFn::Zero
}

impl BodyConfig {
    fn build(self) -> Body {
        let segments: Vec<Segment> = self
            .segments
            .iter()
            .map(|[a, b]| Segment::new(Vec2::from(*a), Vec2::from(*b)))
            .collect();
        let body = match self.kind {
            BodyKindConfig::Fixed => Body::fixed(self.name, segments),
            BodyKindConfig::Free {
                velocity,
                angular_rate,
            } => Body::free(self.name, segments, Vec2::from(velocity), angular_rate),
            BodyKindConfig::Prescribed { motion, angular } => {
                Body::prescribed(self.name, segments, motion, angular)
            }
        };
        body.placed(Vec2::from(self.scale), Vec2::from(self.offset))
    }
}

impl WorldConfig {
    /// Load a scene from a YAML file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_str(&text)
    }

    /// Parse a scene from YAML text.
    pub fn from_str(text: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(text)?)
    }

    /// Validate and build the runtime scene. A scene without bodies gets
    /// the domain's four walls as one fixed body.
    pub fn build(self) -> Result<(SimParams, Vec<Body>)> {
        let params: SimParams = self.params.into();
        params.validate()?;

        for body in &self.bodies {
            if body.segments.is_empty() {
                return Err(Error::Config(format!("body '{}' has no segments", body.name)));
            }
        }

        let mut bodies: Vec<Body> = self.bodies.into_iter().map(BodyConfig::build).collect();
        if bodies.is_empty() {
            bodies.push(box_walls(params.bounds_min, params.bounds_max));
        }

        debug!(bodies = bodies.len(), "scene built");
        Ok((params, bodies))
    }
}
