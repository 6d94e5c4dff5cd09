//! Wall segments and nearest-point queries.
//!
//! Boundary bodies expose their geometry as line segments; the collider
//! assembler asks, for every (particle, segment) pair, for the nearest
//! point on the segment and the distance to it. The simulation core treats
//! the batch query as a fixed-contract service.

use bevy::prelude::*;

/// A wall segment between two endpoints, owned by exactly one boundary body.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Segment {
    /// First endpoint.
    pub a: Vec2,
    /// Second endpoint.
    pub b: Vec2,
}

impl Segment {
    /// Create a segment between two endpoints.
    pub fn new(a: Vec2, b: Vec2) -> Self {
        Self { a, b }
    }

    /// The point on this segment nearest to `point`. A degenerate segment
    /// (coincident endpoints) answers with that single point.
    pub fn closest_point(&self, point: Vec2) -> Vec2 {
        let ab = self.b - self.a;
        let len_sq = ab.length_squared();
        if len_sq <= f32::EPSILON {
            return self.a;
        }
        let t = ((point - self.a).dot(ab) / len_sq).clamp(0.0, 1.0);
        self.a + ab * t
    }
}

/// Nearest point on a segment and the distance to it, for one
/// (particle, segment) pair.
#[derive(Clone, Copy, Debug)]
pub struct SegmentHit {
    /// Nearest point on the segment.
    pub closest: Vec2,
    /// Distance from the query point to `closest`.
    pub distance: f32,
}

/// Nearest point and distance for every (point, segment) pair, row-major
/// with stride `segments.len()`.
pub fn points_to_segments(points: &[Vec2], segments: &[Segment]) -> Vec<SegmentHit> {
    let mut hits = Vec::with_capacity(points.len() * segments.len());
    for &p in points {
        for segment in segments {
            let closest = segment.closest_point(p);
            hits.push(SegmentHit {
                closest,
                distance: (p - closest).length(),
            });
        }
    }
    hits
}

/// Rotate a vector 90 degrees clockwise (in screen coordinates, y down).
/// Used for the tangential direction of rotating boundary bodies.
#[inline]
pub fn perp_cw(v: Vec2) -> Vec2 {
    Vec2::new(v.y, -v.x)
}
