//! Shape-error metric module
//!
//! The bidirectional Hausdorff-squared distance between a stroke's point
//! set and a parametric shape boundary. This is the single objective every
//! gradient-refining fitter in `fit/` optimizes (spec.md §4.D).
//!
//! The bidirectionality matters: a one-sided (stroke-to-shape only) metric
//! is degenerate, since a huge enclosing circle can drive it to zero
//! without ever touching the stroke from the outside.

use crate::geometry::{distance2, Point};

/// A parametric shape boundary a fitter can measure a point set against.
pub trait ShapeModel {
    /// Squared distance from `p` to the shape boundary.
    fn distance2_to(&self, p: Point) -> f64;

    /// `n` points sampled along the shape boundary, used for the
    /// shape-to-stroke half of the metric.
    fn sample(&self, n: usize) -> Vec<Point>;
}

/// `max(max_p distance2_to(p), max_s min_p ||s - p||^2)` — the squared
/// bidirectional Hausdorff distance between `points` and `shape`.
pub fn error<S: ShapeModel + ?Sized>(points: &[Point], shape: &S, sample_count: usize) -> f64 {
    if points.is_empty() {
        return 0.0;
    }
    let stroke_to_shape = points
        .iter()
        .map(|&p| shape.distance2_to(p))
        .fold(0.0, f64::max);

    let samples = shape.sample(sample_count);
    let shape_to_stroke = samples
        .iter()
        .map(|&s| {
            points
                .iter()
                .map(|&p| distance2(s, p))
                .fold(f64::MAX, f64::min)
        })
        .fold(0.0, f64::max);

    stroke_to_shape.max(shape_to_stroke)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::rotate_point;

    struct Circle {
        center: Point,
        radius: f64,
    }

    impl ShapeModel for Circle {
        fn distance2_to(&self, p: Point) -> f64 {
            let d = crate::geometry::distance(p, self.center) - self.radius;
            d * d
        }

        fn sample(&self, n: usize) -> Vec<Point> {
            (0..n)
                .map(|i| {
                    let t = 2.0 * std::f64::consts::PI * i as f64 / n as f64;
                    rotate_point(
                        Point::new(self.center.x + self.radius, self.center.y),
                        self.center,
                        t,
                    )
                })
                .collect()
        }
    }

    #[test]
    fn exact_circle_has_zero_error() {
        let circle = Circle { center: Point::new(0.0, 0.0), radius: 10.0 };
        let points = circle.sample(64);
        assert!(error(&points, &circle, 64) < 1e-9);
    }

    #[test]
    fn enclosing_circle_does_not_cheat_to_zero() {
        // A huge circle has near-zero stroke-to-shape error but large
        // shape-to-stroke error: bidirectionality must catch it.
        let tiny_points = vec![Point::new(0.0, 0.0), Point::new(1.0, 0.0), Point::new(0.0, 1.0)];
        let huge_circle = Circle { center: Point::new(0.0, 0.0), radius: 1000.0 };
        let e = error(&tiny_points, &huge_circle, 64);
        assert!(e > 1e6);
    }

    #[test]
    fn empty_points_have_zero_error() {
        let circle = Circle { center: Point::new(0.0, 0.0), radius: 10.0 };
        assert_eq!(error(&[], &circle, 64), 0.0);
    }
}
