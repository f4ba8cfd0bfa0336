//! Geometry primitives module
//!
//! Point, distance, rotation, bounding box and point-to-segment distance
//! helpers shared by every resampler, fitter and metric in the pipeline.

use serde::{Deserialize, Serialize};

/// A single 2D point in canvas pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn zero() -> Self {
        Self { x: 0.0, y: 0.0 }
    }

    pub fn add(self, other: Point) -> Point {
        Point::new(self.x + other.x, self.y + other.y)
    }

    pub fn sub(self, other: Point) -> Point {
        Point::new(self.x - other.x, self.y - other.y)
    }

    pub fn scale(self, s: f64) -> Point {
        Point::new(self.x * s, self.y * s)
    }

    pub fn dot(self, other: Point) -> f64 {
        self.x * other.x + self.y * other.y
    }

    pub fn norm2(self) -> f64 {
        self.dot(self)
    }

    pub fn norm(self) -> f64 {
        self.norm2().sqrt()
    }

    /// Linear interpolation between `self` and `other` at parameter `t` in [0, 1]
    pub fn lerp(self, other: Point, t: f64) -> Point {
        Point::new(self.x + (other.x - self.x) * t, self.y + (other.y - self.y) * t)
    }
}

/// Axis-aligned bounding box of a point set
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min: Point,
    pub max: Point,
}

impl BoundingBox {
    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    pub fn max_dimension(&self) -> f64 {
        self.width().max(self.height())
    }

    pub fn center(&self) -> Point {
        self.min.lerp(self.max, 0.5)
    }
}

/// Squared Euclidean distance between two points
pub fn distance2(a: Point, b: Point) -> f64 {
    a.sub(b).norm2()
}

/// Euclidean distance between two points
pub fn distance(a: Point, b: Point) -> f64 {
    distance2(a, b).sqrt()
}

/// Unsigned angle in radians between two vectors, in `[0, pi]`
pub fn angle_between(a: Point, b: Point) -> f64 {
    let denom = a.norm() * b.norm();
    if denom < f64::EPSILON {
        return 0.0;
    }
    (a.dot(b) / denom).clamp(-1.0, 1.0).acos()
}

/// Signed angle in radians from `a` to `b`, in `(-pi, pi]`
pub fn signed_angle_between(a: Point, b: Point) -> f64 {
    let cross = a.x * b.y - a.y * b.x;
    let dot = a.dot(b);
    cross.atan2(dot)
}

/// Rotates `p` about `center` by `angle_rad` radians, counter-clockwise
pub fn rotate_point(p: Point, center: Point, angle_rad: f64) -> Point {
    let (s, c) = angle_rad.sin_cos();
    let v = p.sub(center);
    Point::new(center.x + v.x * c - v.y * s, center.y + v.x * s + v.y * c)
}

/// Axis-aligned bounding box of a non-empty point slice
pub fn bounding_box(points: &[Point]) -> Option<BoundingBox> {
    let first = *points.first()?;
    let mut min = first;
    let mut max = first;
    for &p in &points[1..] {
        min.x = min.x.min(p.x);
        min.y = min.y.min(p.y);
        max.x = max.x.max(p.x);
        max.y = max.y.max(p.y);
    }
    Some(BoundingBox { min, max })
}

/// Arithmetic mean of a non-empty point slice
pub fn centroid(points: &[Point]) -> Option<Point> {
    if points.is_empty() {
        return None;
    }
    let sum = points.iter().fold(Point::zero(), |acc, &p| acc.add(p));
    Some(sum.scale(1.0 / points.len() as f64))
}

/// Perpendicular distance from `p` to the segment `a`-`b`.
///
/// A degenerate zero-length segment falls back to point-to-point distance.
pub fn point_segment_distance(p: Point, a: Point, b: Point) -> f64 {
    point_segment_distance2(p, a, b).sqrt()
}

/// Squared perpendicular distance from `p` to the segment `a`-`b`
pub fn point_segment_distance2(p: Point, a: Point, b: Point) -> f64 {
    let ab = b.sub(a);
    let len2 = ab.norm2();
    if len2 < f64::EPSILON {
        return distance2(p, a);
    }
    let t = (p.sub(a).dot(ab) / len2).clamp(0.0, 1.0);
    let proj = a.add(ab.scale(t));
    distance2(p, proj)
}
