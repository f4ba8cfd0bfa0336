//! Shared data model: colors, strokes and the canonical `Shape` enum
//!
//! Mirrors spec.md §3. Every fitted `Shape` variant carries the error that
//! produced it, plus a derived `normalized_error` convenience field
//! generalized from the teacher's `DetectedShape.confidence: f64`.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::geometry::Point;

/// An RGB color, constructible from a 24-bit packed code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Builds a color from a packed `0xRRGGBB` code.
    pub fn from_code(code: u32) -> Self {
        Self {
            r: ((code >> 16) & 0xff) as u8,
            g: ((code >> 8) & 0xff) as u8,
            b: (code & 0xff) as u8,
        }
    }

    pub fn to_code(self) -> u32 {
        ((self.r as u32) << 16) | ((self.g as u32) << 8) | self.b as u32
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::new(0, 0, 0)
    }
}

/// A freehand stroke: a color, a width in pixels, and an ordered, non-empty
/// sequence of points.
///
/// Mutated only by appending points while its generating gesture is
/// active; frozen once committed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stroke {
    pub id: Uuid,
    pub color: Color,
    pub width: f64,
    pub points: Vec<Point>,
}

impl Stroke {
    pub fn new(id: Uuid, color: Color, width: f64, start: Point) -> Self {
        Self { id, color, width, points: vec![start] }
    }

    pub fn push(&mut self, p: Point) {
        self.points.push(p);
    }
}

/// A canonical geometric shape, or a fallback simplified polyline.
///
/// Variant invariants (enforced by each fitter before it returns `Some`):
/// - `Ellipse`: `rx >= ry > 0`
/// - `Rectangle`: `width, height > 0`
/// - `Square`: `side > 0`
/// - `EquilateralPolygon`: `sides >= 3`
/// - `Star`: `points >= 3`, `outer_radius, inner_radius > 0`;
///   `step_pattern` coprime to `points` and in `[2, points-1]` iff `self_crossing`
/// - `Polyline`: `vertices.len() >= 2`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Shape {
    RawPoints {
        points: Vec<Point>,
    },
    Circle {
        center: Point,
        radius: f64,
        error: f64,
    },
    Ellipse {
        center: Point,
        rx: f64,
        ry: f64,
        rotation: f64,
        error: f64,
    },
    Rectangle {
        center: Point,
        width: f64,
        height: f64,
        rotation: f64,
        error: f64,
    },
    Square {
        center: Point,
        side: f64,
        rotation: f64,
        error: f64,
    },
    EquilateralPolygon {
        center: Point,
        radius: f64,
        rotation: f64,
        sides: u32,
        error: f64,
    },
    Star {
        center: Point,
        outer_radius: f64,
        inner_radius: f64,
        rotation: f64,
        points: u32,
        self_crossing: bool,
        step_pattern: u32,
        error: f64,
    },
    Polyline {
        vertices: Vec<Point>,
        error: f64,
    },
}

impl Shape {
    /// The fitting error that produced this shape. `RawPoints` has no
    /// associated error (it is the raw, un-fitted stroke).
    pub fn error(&self) -> Option<f64> {
        match self {
            Shape::RawPoints { .. } => None,
            Shape::Circle { error, .. }
            | Shape::Ellipse { error, .. }
            | Shape::Rectangle { error, .. }
            | Shape::Square { error, .. }
            | Shape::EquilateralPolygon { error, .. }
            | Shape::Star { error, .. }
            | Shape::Polyline { error, .. } => Some(*error),
        }
    }

    /// A characteristic linear size used to normalize the error (radius,
    /// half-diagonal, circumradius, ...), mirroring what the selector uses
    /// internally (spec.md §4.J).
    pub fn size(&self) -> Option<f64> {
        match self {
            Shape::RawPoints { .. } => None,
            Shape::Circle { radius, .. } => Some(*radius),
            Shape::Ellipse { rx, .. } => Some(*rx),
            Shape::Rectangle { width, height, .. } => {
                Some((width * width + height * height).sqrt() / 2.0)
            }
            Shape::Square { side, .. } => Some(side * std::f64::consts::SQRT_2 / 2.0),
            Shape::EquilateralPolygon { radius, .. } => Some(*radius),
            Shape::Star { outer_radius, .. } => Some(*outer_radius),
            Shape::Polyline { vertices, .. } => {
                crate::geometry::bounding_box(vertices).map(|bb| bb.max_dimension() / 2.0)
            }
        }
    }

    /// `error / size`, the same quantity the selector ranks shapes by,
    /// exposed on every emitted shape so a host need not recompute it.
    pub fn normalized_error(&self) -> Option<f64> {
        let err = self.error()?;
        let size = self.size()?;
        if size < f64::EPSILON {
            return None;
        }
        Some(err / (size * size))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn color_round_trips_through_code() {
        let c = Color::new(0x12, 0x34, 0x56);
        assert_eq!(Color::from_code(c.to_code()), c);
    }

    #[test]
    fn raw_points_has_no_error() {
        let s = Shape::RawPoints { points: vec![Point::zero()] };
        assert_eq!(s.error(), None);
        assert_eq!(s.normalized_error(), None);
    }

    #[test]
    fn circle_normalized_error_scales_with_size() {
        let small = Shape::Circle { center: Point::zero(), radius: 10.0, error: 1.0 };
        let big = Shape::Circle { center: Point::zero(), radius: 100.0, error: 1.0 };
        assert!(small.normalized_error().unwrap() > big.normalized_error().unwrap());
    }
}
