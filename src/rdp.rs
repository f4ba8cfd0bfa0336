//! Polyline simplifier module (Ramer-Douglas-Peucker)
//!
//! Recursively drops points that lie within `epsilon` of the chord
//! connecting their neighbors, producing a simplified vertex list plus the
//! maximum perpendicular distance of any original point to it.

use crate::geometry::{point_segment_distance, Point};

/// Result of simplifying a polyline
#[derive(Debug, Clone, PartialEq)]
pub struct SimplifiedPolyline {
    pub vertices: Vec<Point>,
    pub max_error: f64,
}

/// Simplifies `points` with tolerance `epsilon` (default `2 * stroke_width`,
/// spec.md §4.E).
pub fn simplify(points: &[Point], epsilon: f64) -> SimplifiedPolyline {
    if points.len() < 3 {
        return SimplifiedPolyline {
            vertices: points.to_vec(),
            max_error: 0.0,
        };
    }

    let vertices = rdp_recursive(points, epsilon);
    let max_error = max_perpendicular_error(points, &vertices);
    SimplifiedPolyline { vertices, max_error }
}

fn rdp_recursive(points: &[Point], epsilon: f64) -> Vec<Point> {
    let n = points.len();
    if n < 3 {
        return points.to_vec();
    }

    let first = points[0];
    let last = points[n - 1];

    let mut max_dist = -1.0f64;
    let mut max_index = 0usize;
    for (i, &p) in points.iter().enumerate().take(n - 1).skip(1) {
        let d = point_segment_distance(p, first, last);
        if d > max_dist {
            max_dist = d;
            max_index = i;
        }
    }

    if max_dist > epsilon {
        let mut left = rdp_recursive(&points[..=max_index], epsilon);
        let right = rdp_recursive(&points[max_index..], epsilon);
        left.pop(); // avoid duplicating the split point
        left.extend(right);
        left
    } else {
        vec![first, last]
    }
}

/// Maximum perpendicular distance of any point in `original` to its
/// nearest segment of `simplified`.
fn max_perpendicular_error(original: &[Point], simplified: &[Point]) -> f64 {
    if simplified.len() < 2 {
        return 0.0;
    }
    original
        .iter()
        .map(|&p| {
            simplified
                .windows(2)
                .map(|w| point_segment_distance(p, w[0], w[1]))
                .fold(f64::MAX, f64::min)
        })
        .fold(0.0, f64::max)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_input_untouched() {
        let pts = vec![Point::new(0.0, 0.0), Point::new(1.0, 1.0)];
        let out = simplify(&pts, 1.0);
        assert_eq!(out.vertices, pts);
    }

    #[test]
    fn straight_line_collapses_to_endpoints() {
        let pts: Vec<Point> = (0..20).map(|i| Point::new(i as f64, 0.0)).collect();
        let out = simplify(&pts, 0.5);
        assert_eq!(out.vertices.len(), 2);
        assert_eq!(out.vertices[0], pts[0]);
        assert_eq!(*out.vertices.last().unwrap(), *pts.last().unwrap());
        assert!(out.max_error < 1e-9);
    }

    #[test]
    fn sharp_corner_preserved() {
        let mut pts: Vec<Point> = (0..10).map(|i| Point::new(i as f64, 0.0)).collect();
        pts.extend((0..10).map(|i| Point::new(9.0, i as f64)));
        let out = simplify(&pts, 0.5);
        assert_eq!(out.vertices.len(), 3);
    }

    #[test]
    fn all_original_points_within_epsilon_of_simplified() {
        let pts = vec![
            Point::new(0.0, 0.0),
            Point::new(10.0, 1.0),
            Point::new(20.0, -1.0),
            Point::new(30.0, 15.0),
            Point::new(40.0, 14.0),
            Point::new(50.0, 0.0),
        ];
        let epsilon = 2.0;
        let out = simplify(&pts, epsilon);
        for &p in &pts {
            let d = out
                .vertices
                .windows(2)
                .map(|w| point_segment_distance(p, w[0], w[1]))
                .fold(f64::MAX, f64::min);
            assert!(d <= epsilon + 1e-9, "point {:?} is {d} from simplified polyline", p);
        }
    }

    #[test]
    fn square_outline_keeps_four_corners() {
        let mut pts = Vec::new();
        for i in 0..=25 {
            pts.push(Point::new(i as f64 * 4.0, 0.0));
        }
        for i in 0..=25 {
            pts.push(Point::new(100.0, i as f64 * 4.0));
        }
        for i in 0..=25 {
            pts.push(Point::new(100.0 - i as f64 * 4.0, 100.0));
        }
        for i in 0..=25 {
            pts.push(Point::new(0.0, 100.0 - i as f64 * 4.0));
        }
        let out = simplify(&pts, 1.0);
        // Closed square: 4 corners + duplicated closing vertex.
        assert_eq!(out.vertices.len(), 5);
    }
}
