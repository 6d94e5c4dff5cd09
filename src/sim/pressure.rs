//! Pseudo-pressure solve.
//!
//! Pressure here is not a PDE quantity but a per-particle crowding scalar:
//! each collider contributes its normalized penetration depth times its
//! weight, and the sum is the particle's pseudo-pressure. The solve then
//! writes pressures back onto the colliders so the force pass can read the
//! partner's crowding without another gather: a real collider receives its
//! partner particle's pressure, a virtual collider receives zero (walls do
//! not push back through the image; the image's own overlap term already
//! repels).

use crate::error::{Error, Result};
use crate::sim::collider::{ColliderArena, NO_PARTNER};

/// Run the pressure solve over a freshly assembled arena.
///
/// Fills `arena.overlaps` and `arena.pressures` and returns the
/// per-particle pseudo-pressures. A non-finite or negative particle
/// pressure is fatal and nothing downstream of the arena is touched.
pub fn solve(arena: &mut ColliderArena, diameter: f32) -> Result<Vec<f32>> {
    let pressures = particle_pressures(arena, diameter)?;
    distribute(arena, &pressures);
    Ok(pressures)
}

/// Compute each collider's overlap and sum per-particle pseudo-pressures.
///
/// Overlap is `1 - clamp(distance / diameter, 0, 1)`: 1 at full
/// coincidence, 0 at or beyond the interaction cutoff.
fn particle_pressures(arena: &mut ColliderArena, diameter: f32) -> Result<Vec<f32>> {
    let n = arena.particle_count();
    let mut pressures = Vec::with_capacity(n);

    for i in 0..n {
        let mut pressure = 0.0;
        for k in arena.span(i) {
            let distance = arena.vectors[k].length();
            let overlap = 1.0 - (distance / diameter).clamp(0.0, 1.0);
            arena.overlaps[k] = overlap;
            pressure += overlap * arena.weights[k];
        }
        // Written as a negated check so NaN is caught too.
        if !(pressure >= 0.0) {
            return Err(Error::NegativePressure {
                particle: i,
                pressure,
            });
        }
        pressures.push(pressure);
    }

    Ok(pressures)
}

/// Write each collider's partner pressure back onto the collider.
fn distribute(arena: &mut ColliderArena, pressures: &[f32]) {
    for k in 0..arena.total() {
        let partner = arena.partners[k];
        arena.pressures[k] = if partner == NO_PARTNER {
            0.0
        } else {
            pressures[partner]
        };
    }
}
