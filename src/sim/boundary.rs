//! Movable boundary bodies.
//!
//! A boundary body owns a set of wall segments and advances them in place
//! once per tick. Three kinds exist: `Fixed` bodies never move, `Free`
//! bodies drift with a constant linear and angular velocity, and
//! `Prescribed` bodies evaluate named motion functions of elapsed time.
//! Motion functions form a closed registry of variants deserialized from
//! scene configuration; configuration never supplies code.
//!
//! Rotation uses the small-angle approximation: each endpoint moves along
//! its clockwise tangent around the placement anchor instead of along an
//! arc. The anchor itself never moves, matching the reference behavior
//! even for translating bodies.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::sim::geometry::{perp_cw, Segment};

/// A named motion function: center velocity as a function of elapsed time.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "fn", rename_all = "snake_case")]
pub enum MotionFn {
    /// Always zero.
    Zero,
    /// Constant velocity.
    Constant { velocity: [f32; 2] },
    /// Sinusoidal velocity along a fixed axis:
    /// `axis * sin(2 * pi * frequency_hz * t)`.
    Oscillate { axis: [f32; 2], frequency_hz: f32 },
}

impl MotionFn {
    /// Velocity at elapsed time `t`.
    pub fn velocity_at(&self, t: f32) -> Vec2 {
        match self {
            Self::Zero => Vec2::ZERO,
            Self::Constant { velocity } => Vec2::from(*velocity),
            Self::Oscillate { axis, frequency_hz } => {
                Vec2::from(*axis) * (std::f32::consts::TAU * frequency_hz * t).sin()
            }
        }
    }
}

/// A named angular-rate function: clockwise rate as a function of elapsed
/// time.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "fn", rename_all = "snake_case")]
pub enum AngularRateFn {
    /// Always zero.
    Zero,
    /// Constant clockwise rate.
    Constant { rate: f32 },
    /// Sinusoidal rate: `amplitude * sin(2 * pi * frequency_hz * t)`.
    Oscillate { amplitude: f32, frequency_hz: f32 },
}

impl AngularRateFn {
    /// Clockwise rate at elapsed time `t`.
    pub fn rate_at(&self, t: f32) -> f32 {
        match self {
            Self::Zero => 0.0,
            Self::Constant { rate } => *rate,
            Self::Oscillate {
                amplitude,
                frequency_hz,
            } => amplitude * (std::f32::consts::TAU * frequency_hz * t).sin(),
        }
    }
}

/// How a body moves.
#[derive(Clone, Debug)]
pub enum BodyKind {
    /// Never moves.
    Fixed,
    /// Drifts with whatever linear and angular velocity it currently has.
    Free,
    /// Evaluates motion functions of accumulated elapsed time each step.
    Prescribed {
        motion: MotionFn,
        angular: AngularRateFn,
        /// Total time this body has been advanced.
        elapsed: f32,
    },
}

/// A boundary body: named, placed once, advanced every tick.
#[derive(Clone, Debug)]
pub struct Body {
    name: String,
    kind: BodyKind,
    segments: Vec<Segment>,
    /// Kinematic pivot, set at placement.
    anchor: Vec2,
    center_velocity: Vec2,
    angular_rate: f32,
}

impl Body {
    /// A body that never moves.
    pub fn fixed(name: impl Into<String>, segments: Vec<Segment>) -> Self {
        Self {
            name: name.into(),
            kind: BodyKind::Fixed,
            segments,
            anchor: Vec2::ZERO,
            center_velocity: Vec2::ZERO,
            angular_rate: 0.0,
        }
    }

    /// A body drifting with constant linear and angular velocity.
    pub fn free(
        name: impl Into<String>,
        segments: Vec<Segment>,
        center_velocity: Vec2,
        angular_rate: f32,
    ) -> Self {
        Self {
            name: name.into(),
            kind: BodyKind::Free,
            segments,
            anchor: Vec2::ZERO,
            center_velocity,
            angular_rate,
        }
    }

    /// A body driven by motion functions of elapsed time.
    pub fn prescribed(
        name: impl Into<String>,
        segments: Vec<Segment>,
        motion: MotionFn,
        angular: AngularRateFn,
    ) -> Self {
        Self {
            name: name.into(),
            kind: BodyKind::Prescribed {
                motion,
                angular,
                elapsed: 0.0,
            },
            segments,
            anchor: Vec2::ZERO,
            center_velocity: Vec2::ZERO,
            angular_rate: 0.0,
        }
    }

    /// Scale the segments componentwise, then translate them by `offset`.
    /// The offset becomes the kinematic pivot. Called once, at scene build.
    pub fn placed(mut self, scale: Vec2, offset: Vec2) -> Self {
        for segment in &mut self.segments {
            segment.a = segment.a * scale + offset;
            segment.b = segment.b * scale + offset;
        }
        self.anchor = offset;
        self
    }

    /// Body name, for logs and scene lookup.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current wall segments.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Velocity of a point rigidly attached to this body.
    pub fn point_velocity(&self, point: Vec2) -> Vec2 {
        self.center_velocity + perp_cw(point - self.anchor) * self.angular_rate
    }

    /// Advance the body's segments by one step of `dt` seconds.
    pub fn advance(&mut self, dt: f32) {
        match &mut self.kind {
            BodyKind::Fixed => return,
            BodyKind::Free => {}
            BodyKind::Prescribed {
                motion,
                angular,
                elapsed,
            } => {
                *elapsed += dt;
                self.center_velocity = motion.velocity_at(*elapsed);
                self.angular_rate = angular.rate_at(*elapsed);
            }
        }

        for i in 0..self.segments.len() {
            let segment = self.segments[i];
            let va = self.point_velocity(segment.a);
            let vb = self.point_velocity(segment.b);
            self.segments[i].a = segment.a + va * dt;
            self.segments[i].b = segment.b + vb * dt;
        }
    }
}

/// The four walls of an axis-aligned box as one fixed body. The default
/// scene for a world with no configured bodies.
pub fn box_walls(min: Vec2, max: Vec2) -> Body {
    Body::fixed(
        "walls",
        vec![
            Segment::new(min, Vec2::new(min.x, max.y)),
            Segment::new(min, Vec2::new(max.x, min.y)),
            Segment::new(Vec2::new(max.x, min.y), max),
            Segment::new(Vec2::new(min.x, max.y), max),
        ],
    )
}

/// Flatten every body's segments into one list, in body order, for the
/// per-tick distance query.
pub fn collect_segments(bodies: &[Body]) -> Vec<Segment> {
    bodies
        .iter()
        .flat_map(|body| body.segments().iter().copied())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_box() -> Vec<Segment> {
        vec![
            Segment::new(Vec2::new(0.0, 0.0), Vec2::new(0.0, 1.0)),
            Segment::new(Vec2::new(0.0, 0.0), Vec2::new(1.0, 0.0)),
            Segment::new(Vec2::new(1.0, 0.0), Vec2::new(1.0, 1.0)),
            Segment::new(Vec2::new(0.0, 1.0), Vec2::new(1.0, 1.0)),
        ]
    }

    #[test]
    fn fixed_body_is_bit_identical_after_advancing() {
        let mut body = Body::fixed("walls", unit_box());
        let before = body.segments().to_vec();
        for _ in 0..1000 {
            body.advance(0.005);
        }
        assert_eq!(body.segments(), &before[..]);
    }

    #[test]
    fn prescribed_constant_velocity_translates_by_ct() {
        let segments = vec![Segment::new(Vec2::ZERO, Vec2::new(0.2, 0.0))];
        let c = Vec2::new(0.1, -0.05);
        let mut body = Body::prescribed(
            "lift",
            segments.clone(),
            MotionFn::Constant {
                velocity: [c.x, c.y],
            },
            AngularRateFn::Zero,
        );

        // 200 steps of 0.005 s: total elapsed time 1.0 s.
        for _ in 0..200 {
            body.advance(0.005);
        }

        let moved = body.segments()[0];
        assert!((moved.a - (segments[0].a + c)).length() < 1e-4);
        assert!((moved.b - (segments[0].b + c)).length() < 1e-4);
    }

    #[test]
    fn free_body_rotates_endpoints_along_tangents() {
        let segments = vec![Segment::new(Vec2::new(0.1, 0.0), Vec2::new(-0.1, 0.0))];
        let mut body = Body::free("paddle", segments, Vec2::ZERO, 1.0);

        body.advance(0.01);

        // Clockwise in screen coordinates (y down): the +x endpoint moves
        // toward -y, the -x endpoint toward +y.
        let seg = body.segments()[0];
        assert!(seg.a.y < 0.0);
        assert!(seg.b.y > 0.0);
        assert!((seg.a.x - 0.1).abs() < 1e-6);
    }

    #[test]
    fn point_velocity_combines_translation_and_rotation() {
        let segments = vec![Segment::new(Vec2::new(0.1, 0.0), Vec2::new(-0.1, 0.0))];
        let body = Body::free("paddle", segments, Vec2::new(0.5, 0.0), 2.0);

        // Anchor at the origin: a point at +x gets the clockwise tangent
        // (0, -1) scaled by the rate, on top of the center velocity.
        let v = body.point_velocity(Vec2::new(0.1, 0.0));
        assert!((v - Vec2::new(0.5, -0.2)).length() < 1e-6);

        // The anchor itself only translates.
        assert_eq!(body.point_velocity(Vec2::ZERO), Vec2::new(0.5, 0.0));
    }

    #[test]
    fn placement_scales_then_translates() {
        let segments = vec![Segment::new(Vec2::ZERO, Vec2::ONE)];
        let body =
            Body::fixed("box", segments).placed(Vec2::new(0.5, 0.25), Vec2::new(0.1, 0.2));

        let seg = body.segments()[0];
        assert_eq!(seg.a, Vec2::new(0.1, 0.2));
        assert_eq!(seg.b, Vec2::new(0.6, 0.45));
    }

    #[test]
    fn prescribed_evaluates_at_accumulated_time() {
        // Quarter-period of a 1 Hz oscillation: velocity peaks at t = 0.25.
        let motion = MotionFn::Oscillate {
            axis: [1.0, 0.0],
            frequency_hz: 1.0,
        };
        assert!((motion.velocity_at(0.25).x - 1.0).abs() < 1e-6);
        assert!(motion.velocity_at(0.5).x.abs() < 1e-6);

        let rate = AngularRateFn::Oscillate {
            amplitude: 2.0,
            frequency_hz: 1.0,
        };
        assert!((rate.rate_at(0.25) - 2.0).abs() < 1e-6);
    }

    #[test]
    fn motion_fns_deserialize_from_yaml() {
        let motion: MotionFn =
            serde_yaml::from_str("fn: constant\nvelocity: [0.0, -0.1]").unwrap();
        assert_eq!(
            motion,
            MotionFn::Constant {
                velocity: [0.0, -0.1]
            }
        );

        let rate: AngularRateFn = serde_yaml::from_str("fn: zero").unwrap();
        assert_eq!(rate, AngularRateFn::Zero);
    }

    #[test]
    fn collect_segments_preserves_body_order() {
        let a = Body::fixed("a", vec![Segment::new(Vec2::ZERO, Vec2::X)]);
        let b = Body::fixed("b", vec![Segment::new(Vec2::Y, Vec2::ONE)]);
        let all = collect_segments(&[a, b]);
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].b, Vec2::X);
        assert_eq!(all[1].a, Vec2::Y);
    }
}
