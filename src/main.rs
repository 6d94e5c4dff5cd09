//! Headless scene runner: load a YAML scene, tick it a fixed number of
//! times, and report where the particles ended up.

use std::path::PathBuf;

use anyhow::Context;
use bevy::log::LogPlugin;
use bevy::prelude::*;
use clap::Parser;

use crate2d::prelude::*;

#[derive(Parser, Debug)]
#[command(version, about = "2D particle crate simulation")]
struct Args {
    /// Scene file (YAML). Omit for the default crate scene.
    config: Option<PathBuf>,

    /// Number of ticks to run.
    #[arg(long, default_value_t = 2000)]
    ticks: u64,

    /// Override the scene's placement seed.
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => WorldConfig::from_path(path)
            .with_context(|| format!("loading scene {}", path.display()))?,
        None => WorldConfig::default(),
    };
    let (mut params, bodies) = config.build().context("building scene")?;
    if let Some(seed) = args.seed {
        params = params.with_seed(seed);
    }

    let mut app = App::new();
    app.add_plugins(MinimalPlugins)
        .add_plugins(LogPlugin::default())
        .add_plugins(CrateSimPlugin::new(params, bodies));

    for _ in 0..args.ticks {
        app.update();
    }

    let simulation = app.world().resource::<Simulation>();
    let particles = simulation.particles();
    let mean_speed = if particles.is_empty() {
        0.0
    } else {
        particles.velocities.iter().map(|v| v.length()).sum::<f32>() / particles.len() as f32
    };
    info!(
        ticks = simulation.tick(),
        particles = particles.len(),
        mean_speed,
        "run finished"
    );

    Ok(())
}
