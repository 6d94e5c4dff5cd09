//! Per-particle interaction assembly.
//!
//! Every tick the assembler rebuilds, for each particle, an ordered list of
//! colliders: one *real* collider per neighbor (relative vector, partner
//! mass, partner velocity captured at assembly time), followed by one
//! *virtual* collider per wall segment within one particle radius. A
//! virtual collider mirrors the particle across the nearest wall point,
//! placing an image partner at twice the standoff, so wall repulsion can
//! reuse the particle-particle force formula:
//!
//! ```text
//!   segment
//!       +
//!       |
//! *-----|-----* image
//! p     |
//!       +
//! ```
//!
//! All colliders live in one contiguous arena with an offset table per
//! particle, rather than one allocation per particle, so the solver and
//! force passes stream through memory.

use bevy::prelude::*;

use crate::error::{Error, Result};
use crate::sim::geometry::SegmentHit;

/// Partner index stored for virtual colliders, which have no backing
/// particle.
pub(crate) const NO_PARTNER: usize = usize::MAX;

/// Below this squared distance two particles are treated as coincident and
/// given a deterministic tie-break direction, so mutual repulsion stays
/// well defined.
const COINCIDENT_EPS_SQ: f32 = 1e-12;

/// Length of the tie-break vector substituted for a coincident pair.
const TIE_BREAK_LEN: f32 = 1e-6;

/// Contiguous storage for every particle's colliders, rebuilt each tick.
///
/// For particle `i`, colliders occupy `starts[i]..starts[i + 1]`; real
/// colliders come first, virtual ones from `virtual_starts[i]`.
#[derive(Clone, Debug, Default)]
pub struct ColliderArena {
    /// Relative vector per collider: source position minus partner (or
    /// image) position.
    pub(crate) vectors: Vec<Vec2>,
    /// Partner weight per collider: partner mass for real colliders, the
    /// owning particle's own mass for virtual ones.
    pub(crate) weights: Vec<f32>,
    /// Partner velocity per collider, captured at assembly time; zero for
    /// virtual colliders.
    pub(crate) velocities: Vec<Vec2>,
    /// Normalized penetration depth per collider, filled by the pressure
    /// solver.
    pub(crate) overlaps: Vec<f32>,
    /// Redistributed pseudo-pressure per collider, filled by the pressure
    /// solver.
    pub(crate) pressures: Vec<f32>,
    /// Backing particle index per collider; `NO_PARTNER` for virtual ones.
    pub(crate) partners: Vec<usize>,
    /// Offset table, length n + 1.
    pub(crate) starts: Vec<usize>,
    /// Absolute index where particle i's virtual colliders begin.
    pub(crate) virtual_starts: Vec<usize>,
}

impl ColliderArena {
    /// Rebuild the arena from this tick's neighbor sets and segment hits.
    ///
    /// `hits` must be the row-major output of the point-to-segment query
    /// for `segment_count` segments. Shape disagreements and out-of-range
    /// partner indices are fatal; the arena is left unread in that case and
    /// particle state has not been touched yet.
    pub fn assemble(
        &mut self,
        positions: &[Vec2],
        velocities: &[Vec2],
        masses: &[f32],
        neighbor_sets: &[Vec<usize>],
        hits: &[SegmentHit],
        segment_count: usize,
        radius: f32,
    ) -> Result<()> {
        let n = positions.len();
        if velocities.len() != n {
            return Err(Error::ShapeMismatch {
                what: "particle velocities",
                expected: n,
                got: velocities.len(),
            });
        }
        if masses.len() != n {
            return Err(Error::ShapeMismatch {
                what: "particle masses",
                expected: n,
                got: masses.len(),
            });
        }
        if neighbor_sets.len() != n {
            return Err(Error::ShapeMismatch {
                what: "neighbor sets",
                expected: n,
                got: neighbor_sets.len(),
            });
        }
        if hits.len() != n * segment_count {
            return Err(Error::ShapeMismatch {
                what: "segment hits",
                expected: n * segment_count,
                got: hits.len(),
            });
        }

        self.vectors.clear();
        self.weights.clear();
        self.velocities.clear();
        self.partners.clear();
        self.starts.clear();
        self.virtual_starts.clear();

        for i in 0..n {
            self.starts.push(self.vectors.len());

            for &j in &neighbor_sets[i] {
                if j >= n {
                    return Err(Error::PartnerOutOfRange {
                        particle: i,
                        partner: j,
                        count: n,
                    });
                }
                let mut vector = positions[i] - positions[j];
                if vector.length_squared() < COINCIDENT_EPS_SQ {
                    vector = tie_break(i, j);
                }
                self.vectors.push(vector);
                self.weights.push(masses[j]);
                self.velocities.push(velocities[j]);
                self.partners.push(j);
            }

            self.virtual_starts.push(self.vectors.len());

            for s in 0..segment_count {
                let hit = hits[i * segment_count + s];
                if hit.distance <= radius {
                    // Image partner at twice the standoff from the wall.
                    self.vectors.push(2.0 * (positions[i] - hit.closest));
                    self.weights.push(masses[i]);
                    self.velocities.push(Vec2::ZERO);
                    self.partners.push(NO_PARTNER);
                }
            }
        }
        self.starts.push(self.vectors.len());

        let total = self.vectors.len();
        self.overlaps.clear();
        self.overlaps.resize(total, 0.0);
        self.pressures.clear();
        self.pressures.resize(total, 0.0);

        Ok(())
    }

    /// Number of particles the arena was last assembled for.
    pub fn particle_count(&self) -> usize {
        self.starts.len().saturating_sub(1)
    }

    /// Total collider count across all particles.
    pub fn total(&self) -> usize {
        self.vectors.len()
    }

    /// All colliders of particle `i`, real first.
    pub fn span(&self, i: usize) -> std::ops::Range<usize> {
        self.starts[i]..self.starts[i + 1]
    }

    /// Real colliders of particle `i`.
    pub fn real_span(&self, i: usize) -> std::ops::Range<usize> {
        self.starts[i]..self.virtual_starts[i]
    }

    /// Virtual colliders of particle `i`.
    pub fn virtual_span(&self, i: usize) -> std::ops::Range<usize> {
        self.virtual_starts[i]..self.starts[i + 1]
    }
}

/// Opposite unit directions for the two members of a coincident pair,
/// scaled down to keep the overlap at essentially full coincidence.
fn tie_break(i: usize, j: usize) -> Vec2 {
    if i < j {
        Vec2::new(TIE_BREAK_LEN, 0.0)
    } else {
        Vec2::new(-TIE_BREAK_LEN, 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::geometry::{points_to_segments, Segment};

    fn assemble(
        positions: &[Vec2],
        velocities: &[Vec2],
        masses: &[f32],
        neighbor_sets: &[Vec<usize>],
        segments: &[Segment],
        radius: f32,
    ) -> Result<ColliderArena> {
        let hits = points_to_segments(positions, segments);
        let mut arena = ColliderArena::default();
        arena.assemble(
            positions,
            velocities,
            masses,
            neighbor_sets,
            &hits,
            segments.len(),
            radius,
        )?;
        Ok(arena)
    }

    #[test]
    fn real_colliders_carry_partner_state() -> Result<()> {
        let positions = vec![Vec2::new(0.5, 0.5), Vec2::new(0.505, 0.5)];
        let velocities = vec![Vec2::ZERO, Vec2::new(0.1, -0.2)];
        let masses = vec![0.2, 0.3];
        let sets = vec![vec![1], vec![0]];

        let arena = assemble(&positions, &velocities, &masses, &sets, &[], 0.01)?;

        assert_eq!(arena.particle_count(), 2);
        let k = arena.real_span(0).start;
        assert!((arena.vectors[k] - Vec2::new(-0.005, 0.0)).length() < 1e-7);
        assert_eq!(arena.weights[k], 0.3);
        assert_eq!(arena.velocities[k], Vec2::new(0.1, -0.2));
        assert_eq!(arena.partners[k], 1);
        Ok(())
    }

    #[test]
    fn virtual_collider_mirrors_across_wall() -> Result<()> {
        // Particle 0.004 above the bottom wall, radius 0.01.
        let positions = vec![Vec2::new(0.5, 0.004)];
        let velocities = vec![Vec2::ZERO];
        let masses = vec![0.2];
        let sets = vec![vec![]];
        let wall = Segment::new(Vec2::ZERO, Vec2::new(1.0, 0.0));

        let arena = assemble(&positions, &velocities, &masses, &sets, &[wall], 0.01)?;

        let span = arena.virtual_span(0);
        assert_eq!(span.len(), 1);
        let k = span.start;
        // Image at twice the standoff: vector = 2 * (p - c).
        assert!((arena.vectors[k] - Vec2::new(0.0, 0.008)).length() < 1e-7);
        assert_eq!(arena.weights[k], 0.2);
        assert_eq!(arena.velocities[k], Vec2::ZERO);
        assert_eq!(arena.partners[k], NO_PARTNER);
        Ok(())
    }

    #[test]
    fn reals_precede_virtuals() -> Result<()> {
        let positions = vec![Vec2::new(0.5, 0.005), Vec2::new(0.508, 0.005)];
        let velocities = vec![Vec2::ZERO; 2];
        let masses = vec![0.2; 2];
        let sets = vec![vec![1], vec![0]];
        let wall = Segment::new(Vec2::ZERO, Vec2::new(1.0, 0.0));

        let arena = assemble(&positions, &velocities, &masses, &sets, &[wall], 0.01)?;

        for i in 0..2 {
            assert_eq!(arena.real_span(i).len(), 1);
            assert_eq!(arena.virtual_span(i).len(), 1);
            assert!(arena.real_span(i).end <= arena.virtual_span(i).start);
        }
        Ok(())
    }

    #[test]
    fn distant_walls_yield_no_virtuals() -> Result<()> {
        let positions = vec![Vec2::new(0.5, 0.5)];
        let wall = Segment::new(Vec2::ZERO, Vec2::new(1.0, 0.0));
        let arena = assemble(
            &positions,
            &[Vec2::ZERO],
            &[0.2],
            &[vec![]],
            &[wall],
            0.01,
        )?;

        assert_eq!(arena.span(0).len(), 0);
        Ok(())
    }

    #[test]
    fn coincident_pair_gets_opposite_tie_breaks() -> Result<()> {
        let positions = vec![Vec2::splat(0.5), Vec2::splat(0.5)];
        let velocities = vec![Vec2::ZERO; 2];
        let masses = vec![0.2; 2];
        let sets = vec![vec![1], vec![0]];

        let arena = assemble(&positions, &velocities, &masses, &sets, &[], 0.01)?;

        let v0 = arena.vectors[arena.real_span(0).start];
        let v1 = arena.vectors[arena.real_span(1).start];
        assert!(v0.length() > 0.0);
        assert_eq!(v0, -v1);
        Ok(())
    }

    #[test]
    fn out_of_range_partner_is_fatal() {
        let positions = vec![Vec2::splat(0.5)];
        let err = assemble(&positions, &[Vec2::ZERO], &[0.2], &[vec![3]], &[], 0.01);
        assert!(matches!(
            err,
            Err(Error::PartnerOutOfRange {
                particle: 0,
                partner: 3,
                count: 1
            })
        ));
    }

    #[test]
    fn shape_mismatch_is_fatal() {
        let positions = vec![Vec2::splat(0.5); 2];
        let err = assemble(&positions, &[Vec2::ZERO; 2], &[0.2; 2], &[vec![]], &[], 0.01);
        assert!(matches!(err, Err(Error::ShapeMismatch { .. })));
    }
}
