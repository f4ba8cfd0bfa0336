//! Shape selector module (spec.md §4.J)
//!
//! Runs every eligible fitter, ranks the results by a size-normalized
//! error against per-type tolerances, and either returns the best
//! qualifying canonical shape or falls back to a simplified polyline.

use log::info;

use crate::config::Config;
use crate::fit::polygon::PolygonOrStar;
use crate::fit::{self, Candidates};
use crate::geometry::Point;
use crate::rdp;
use crate::shape::Shape;

/// Tie-break priority when normalized errors are within 5% of the best
/// (spec.md §4.J): lower rank wins.
fn priority_rank(shape: &Shape) -> u8 {
    match shape {
        Shape::Circle { .. } => 0,
        Shape::Square { .. } => 1,
        Shape::EquilateralPolygon { .. } => 2,
        Shape::Ellipse { .. } => 3,
        Shape::Rectangle { .. } => 4,
        Shape::Star { .. } => 5,
        Shape::Polyline { .. } => 6,
        Shape::RawPoints { .. } => 7,
    }
}

fn tolerance_for(shape: &Shape, config: &Config) -> f64 {
    let t = &config.tolerances;
    match shape {
        Shape::Circle { .. } => t.circle,
        Shape::Square { .. } => t.square,
        Shape::EquilateralPolygon { .. } => t.polygon,
        Shape::Ellipse { .. } => t.ellipse,
        Shape::Rectangle { .. } => t.rectangle,
        Shape::Star { .. } => t.star,
        Shape::Polyline { .. } | Shape::RawPoints { .. } => f64::MAX,
    }
}

fn candidates_to_shapes(c: &Candidates) -> Vec<Shape> {
    let mut shapes = Vec::new();
    if let Some(f) = c.circle {
        shapes.push(Shape::Circle { center: f.center, radius: f.radius, error: f.error });
    }
    if let Some(f) = c.ellipse {
        shapes.push(Shape::Ellipse {
            center: f.center,
            rx: f.rx,
            ry: f.ry,
            rotation: f.rotation,
            error: f.error,
        });
    }
    if let Some(f) = c.square {
        shapes.push(Shape::Square { center: f.center, side: f.side, rotation: f.rotation, error: f.error });
    }
    if let Some(f) = c.rectangle {
        shapes.push(Shape::Rectangle {
            center: f.center,
            width: f.width,
            height: f.height,
            rotation: f.rotation,
            error: f.error,
        });
    }
    match c.polygon_or_star {
        Some(PolygonOrStar::Polygon(p)) => shapes.push(Shape::EquilateralPolygon {
            center: p.center,
            radius: p.radius,
            rotation: p.rotation,
            sides: p.sides,
            error: p.error,
        }),
        Some(PolygonOrStar::Star(s)) => shapes.push(Shape::Star {
            center: s.center,
            outer_radius: s.outer_radius,
            inner_radius: s.inner_radius,
            rotation: s.rotation,
            points: s.points,
            self_crossing: s.self_crossing,
            step_pattern: s.step_pattern,
            error: s.error,
        }),
        None => {}
    }
    shapes
}

/// Selects the best canonical shape for `points`, or falls back to a
/// simplified `Polyline`.
pub fn select(points: &[Point], stroke_width: f64, config: &Config) -> Shape {
    if points.len() < 2 {
        return Shape::RawPoints { points: points.to_vec() };
    }

    let candidates = fit::fit_all(points, stroke_width, config);
    let shapes = candidates_to_shapes(&candidates);

    let qualifying: Vec<(Shape, f64)> = shapes
        .into_iter()
        .filter_map(|s| {
            let ne = s.normalized_error()?;
            if ne < tolerance_for(&s, config) {
                Some((s, ne))
            } else {
                None
            }
        })
        .collect();

    if qualifying.is_empty() {
        let epsilon = config.rdp_epsilon_multiplier * stroke_width;
        let simplified = rdp::simplify(points, epsilon);
        let vertices = if simplified.vertices.len() >= 2 {
            simplified.vertices
        } else {
            vec![points[0], *points.last().unwrap()]
        };
        info!("selector: no shape qualified, falling back to polyline");
        return Shape::Polyline { vertices, error: simplified.max_error };
    }

    let min_error = qualifying.iter().map(|(_, ne)| *ne).fold(f64::MAX, f64::min);
    let best = qualifying
        .into_iter()
        .filter(|(_, ne)| *ne <= min_error * 1.05)
        .min_by_key(|(s, _)| priority_rank(s))
        .map(|(s, _)| s)
        .expect("qualifying set is non-empty");

    info!(
        "selector: chose {:?} (normalized error {:.6})",
        std::mem::discriminant(&best),
        best.normalized_error().unwrap_or(0.0)
    );
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::rotate_point;

    fn circle_points(center: Point, radius: f64, n: usize) -> Vec<Point> {
        (0..n)
            .map(|i| {
                let t = 2.0 * std::f64::consts::PI * i as f64 / n as f64;
                Point::new(center.x + radius * t.cos(), center.y + radius * t.sin())
            })
            .collect()
    }

    fn square_points(center: Point, side: f64, n_per_side: usize) -> Vec<Point> {
        let hw = side / 2.0;
        let corners = [
            Point::new(-hw, -hw),
            Point::new(hw, -hw),
            Point::new(hw, hw),
            Point::new(-hw, hw),
        ];
        let mut pts = Vec::new();
        for i in 0..4 {
            let a = corners[i];
            let b = corners[(i + 1) % 4];
            for k in 0..n_per_side {
                let t = k as f64 / n_per_side as f64;
                pts.push(center.add(a.lerp(b, t)));
            }
        }
        pts
    }

    #[test]
    fn two_points_yield_raw_points() {
        // A single-sample stroke: below the 2-vertex floor for Polyline.
        let pts = vec![Point::new(5.0, 5.0)];
        let config = Config::default();
        match select(&pts, 2.0, &config) {
            Shape::RawPoints { points } => assert_eq!(points, pts),
            other => panic!("expected RawPoints, got {other:?}"),
        }
    }

    #[test]
    fn two_point_gesture_yields_two_vertex_polyline() {
        let pts = vec![Point::new(10.0, 10.0), Point::new(200.0, 150.0)];
        let config = Config::default();
        match select(&pts, 2.0, &config) {
            Shape::Polyline { vertices, .. } => assert_eq!(vertices, pts),
            other => panic!("expected Polyline, got {other:?}"),
        }
    }

    #[test]
    fn clean_circle_selected_as_circle() {
        let pts = circle_points(Point::new(200.0, 200.0), 100.0, 64);
        let config = Config::default();
        match select(&pts, 2.0, &config) {
            Shape::Circle { center, radius, .. } => {
                assert!(crate::geometry::distance(center, Point::new(200.0, 200.0)) < 2.0);
                assert!((radius - 100.0).abs() < 2.0);
            }
            other => panic!("expected Circle, got {other:?}"),
        }
    }

    #[test]
    fn clean_square_preferred_over_rectangle() {
        let pts = square_points(Point::new(300.0, 300.0), 100.0, 16);
        let config = Config::default();
        match select(&pts, 2.0, &config) {
            Shape::Square { side, rotation, .. } => {
                assert!((side - 100.0).abs() < 3.0);
                let rot_deg = rotation.to_degrees().rem_euclid(90.0);
                assert!(rot_deg.min(90.0 - rot_deg) < 2.0);
            }
            other => panic!("expected Square, got {other:?}"),
        }
    }

    #[test]
    fn open_jagged_stroke_falls_back_to_polyline() {
        let pts = vec![
            Point::new(0.0, 0.0),
            Point::new(5.0, 37.0),
            Point::new(40.0, 2.0),
            Point::new(12.0, 80.0),
            Point::new(90.0, 91.0),
        ];
        let config = Config::default();
        match select(&pts, 2.0, &config) {
            Shape::Polyline { .. } => {}
            other => panic!("expected Polyline, got {other:?}"),
        }
    }

    #[test]
    fn rotation_does_not_change_chosen_shape_type() {
        let pts = circle_points(Point::new(0.0, 0.0), 60.0, 50);
        let rotated: Vec<Point> = pts.iter().map(|&p| rotate_point(p, Point::zero(), 0.9)).collect();
        let config = Config::default();
        let a = select(&pts, 2.0, &config);
        let b = select(&rotated, 2.0, &config);
        assert_eq!(priority_rank(&a), priority_rank(&b));
    }
}
