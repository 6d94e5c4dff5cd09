//! App integration.
//!
//! The plugin owns the scene description until the app is built, then
//! inserts the [`Simulation`] resource and a tick system. The tick system
//! runs once per app update; drive the app with a fixed-rate runner (or a
//! plain `loop { app.update(); }` for headless batch runs) to get the
//! fixed-dt semantics.
//!
//! A step error halts the simulation permanently rather than panicking:
//! the error is logged once and the world is left at its last committed
//! tick for inspection.

use bevy::prelude::*;

use crate::sim::boundary::Body;
use crate::sim::params::SimParams;
use crate::sim::simulation::Simulation;

/// Adds the particle simulation to a Bevy app.
pub struct CrateSimPlugin {
    params: SimParams,
    bodies: Vec<Body>,
}

impl CrateSimPlugin {
    /// Plugin for a scene with explicit parameters and bodies, as produced
    /// by [`WorldConfig::build`](crate::sim::config::WorldConfig::build).
    pub fn new(params: SimParams, bodies: Vec<Body>) -> Self {
        Self { params, bodies }
    }
}

impl Default for CrateSimPlugin {
    /// The reference scene: default parameters inside the domain walls.
    fn default() -> Self {
        Self::new(SimParams::default(), Vec::new())
    }
}

impl Plugin for CrateSimPlugin {
    fn build(&self, app: &mut App) {
        let mut bodies = self.bodies.clone();
        if bodies.is_empty() {
            bodies.push(crate::sim::boundary::box_walls(
                self.params.bounds_min,
                self.params.bounds_max,
            ));
        }

        let simulation = match Simulation::new(self.params.clone(), bodies) {
            Ok(simulation) => simulation,
            Err(error) => {
                error!(%error, "simulation could not be created; not ticking");
                return;
            }
        };

        app.register_type::<SimParams>()
            .insert_resource(self.params.clone())
            .insert_resource(simulation)
            .add_systems(Update, run_tick);
    }
}

/// Advance the simulation by one tick per app update, halting on the first
/// error.
fn run_tick(simulation: Option<ResMut<Simulation>>, mut halted: Local<bool>) {
    if *halted {
        return;
    }
    let Some(mut simulation) = simulation else {
        return;
    };
    if let Err(error) = simulation.step() {
        error!(%error, tick = simulation.tick(), "tick failed; halting simulation");
        *halted = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_app() -> App {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.add_plugins(CrateSimPlugin::new(
            SimParams::default().with_particle_count(20).with_seed(5),
            Vec::new(),
        ));
        app
    }

    #[test]
    fn plugin_inserts_simulation_and_ticks() {
        let mut app = test_app();
        app.update();
        app.update();
        app.update();

        let simulation = app.world().resource::<Simulation>();
        assert_eq!(simulation.tick(), 3);
        assert_eq!(simulation.particles().len(), 20);
    }

    #[test]
    fn default_scene_gets_domain_walls() {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.add_plugins(CrateSimPlugin::new(
            SimParams::default().with_particle_count(8).with_seed(1),
            Vec::new(),
        ));
        app.update();

        let simulation = app.world().resource::<Simulation>();
        assert_eq!(simulation.bodies().len(), 1);
        assert_eq!(simulation.bodies()[0].name(), "walls");
    }
}
