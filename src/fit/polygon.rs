//! Polygon / Star fitter (spec.md §4.I)
//!
//! RDP simplification -> centroid/radius clustering -> classification
//! (equilateral polygon / starfish / self-crossing star) -> step-pattern
//! search -> alternating gradient-descent refinement.

use std::f64::consts::PI;

use log::debug;

use crate::fit::refine::descend_vector;
use crate::geometry::{centroid, distance2, signed_angle_between, Point};
use crate::hausdorff::{self, ShapeModel};
use crate::rdp;
use crate::resample::resample;

const MIN_SEGMENTS: usize = 3;
const OUTER_LOOPS: usize = 3;
const INNER_STEPS: usize = 5;
const LEARNING_RATE: f64 = 0.1;
const FD_DELTA: f64 = 1e-3;
/// `(max - min) / mean` below this is treated as a single-radius shape.
const SINGLE_RADIUS_SPREAD: f64 = 0.25;
/// Minimum relative gap between the two radius groups' means to call it a
/// genuine two-radius star rather than sampling noise.
const TWO_RADIUS_GAP: f64 = 0.25;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PolygonFit {
    pub center: Point,
    pub radius: f64,
    pub rotation: f64,
    pub sides: u32,
    pub error: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StarFit {
    pub center: Point,
    pub outer_radius: f64,
    pub inner_radius: f64,
    pub rotation: f64,
    pub points: u32,
    pub self_crossing: bool,
    pub step_pattern: u32,
    pub error: f64,
}

/// Either of the two shapes this fitter can produce.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PolygonOrStar {
    Polygon(PolygonFit),
    Star(StarFit),
}

fn gcd(a: u32, b: u32) -> u32 {
    if b == 0 {
        a
    } else {
        gcd(b, a % b)
    }
}

fn polar(center: Point, radius: f64, angle: f64) -> Point {
    Point::new(center.x + radius * angle.cos(), center.y + radius * angle.sin())
}

/// Regular `sides`-gon, traversed in order (step = 1).
struct PolygonModel {
    center: Point,
    radius: f64,
    rotation: f64,
    sides: u32,
}

impl PolygonModel {
    fn vertices(&self) -> Vec<Point> {
        (0..self.sides)
            .map(|i| polar(self.center, self.radius, self.rotation + 2.0 * PI * i as f64 / self.sides as f64))
            .collect()
    }
}

impl ShapeModel for PolygonModel {
    fn distance2_to(&self, p: Point) -> f64 {
        let v = self.vertices();
        let n = v.len();
        (0..n)
            .map(|i| crate::geometry::point_segment_distance2(p, v[i], v[(i + 1) % n]))
            .fold(f64::MAX, f64::min)
    }

    fn sample(&self, n: usize) -> Vec<Point> {
        let mut v = self.vertices();
        v.push(v[0]);
        resample(&v, n)
    }
}

/// A star / star-polygon boundary: either `points` vertices visited via a
/// self-crossing step pattern (single shared radius, or an alternating
/// radius per visit for the rarer two-radius self-crossing case), or
/// `2*points` alternating outer/inner vertices for the ordinary
/// (non-crossing) starfish silhouette.
struct StarModel {
    center: Point,
    outer_radius: f64,
    inner_radius: f64,
    rotation: f64,
    points: u32,
    self_crossing: bool,
    step_pattern: u32,
}

impl StarModel {
    fn vertices(&self) -> Vec<Point> {
        if self.self_crossing {
            let n = self.points as usize;
            (0..n)
                .map(|i| {
                    let j = (i * self.step_pattern as usize) % n;
                    let angle = self.rotation + 2.0 * PI * j as f64 / n as f64;
                    let r = if i % 2 == 0 { self.outer_radius } else { self.inner_radius };
                    polar(self.center, r, angle)
                })
                .collect()
        } else {
            let n = 2 * self.points as usize;
            (0..n)
                .map(|i| {
                    let angle = self.rotation + PI * i as f64 / self.points as f64;
                    let r = if i % 2 == 0 { self.outer_radius } else { self.inner_radius };
                    polar(self.center, r, angle)
                })
                .collect()
        }
    }
}

impl ShapeModel for StarModel {
    fn distance2_to(&self, p: Point) -> f64 {
        let v = self.vertices();
        let n = v.len();
        (0..n)
            .map(|i| crate::geometry::point_segment_distance2(p, v[i], v[(i + 1) % n]))
            .fold(f64::MAX, f64::min)
    }

    fn sample(&self, n: usize) -> Vec<Point> {
        let mut v = self.vertices();
        v.push(v[0]);
        resample(&v, n)
    }
}

/// Closes the RDP output (spec.md §4.I step 2): averages the first and
/// last vertex and drops the duplicate tail, leaving `n` unique vertices.
fn close_and_dedupe(rdp_vertices: &[Point]) -> Vec<Point> {
    let m = rdp_vertices.len();
    let averaged = rdp_vertices[0].lerp(rdp_vertices[m - 1], 0.5);
    let mut unique = vec![averaged];
    unique.extend_from_slice(&rdp_vertices[1..m - 1]);
    unique
}

/// Winding number of the closed vertex loop around `center`, used to
/// decide whether a two-radius candidate is the ordinary (non-crossing)
/// starfish silhouette or a self-intersecting path — the winding-number
/// variant chosen in favor of the "alternating count >= 1.5n" heuristic,
/// which is more robust on open or noisily-sampled curves (spec.md §9).
fn winding_number(vertices: &[Point], center: Point) -> f64 {
    let n = vertices.len();
    let mut total = 0.0;
    for i in 0..n {
        let a = vertices[i].sub(center);
        let b = vertices[(i + 1) % n].sub(center);
        total += signed_angle_between(a, b);
    }
    total / (2.0 * PI)
}

enum Classification {
    SingleRadius,
    TwoRadiusAlternating,
    TwoRadiusCrossing,
}

fn classify(vertices: &[Point], center: Point, radii: &[f64]) -> Classification {
    let max = radii.iter().cloned().fold(f64::MIN, f64::max);
    let min = radii.iter().cloned().fold(f64::MAX, f64::min);
    let mean: f64 = radii.iter().sum::<f64>() / radii.len() as f64;

    if mean < f64::EPSILON || (max - min) / mean < SINGLE_RADIUS_SPREAD {
        return Classification::SingleRadius;
    }

    let midpoint = (max + min) / 2.0;
    let low: Vec<f64> = radii.iter().cloned().filter(|&r| r < midpoint).collect();
    let high: Vec<f64> = radii.iter().cloned().filter(|&r| r >= midpoint).collect();

    if low.len() != high.len() || low.len() < 2 {
        return Classification::SingleRadius;
    }

    let mean_low: f64 = low.iter().sum::<f64>() / low.len() as f64;
    let mean_high: f64 = high.iter().sum::<f64>() / high.len() as f64;
    let combined_mean = (mean_low + mean_high) / 2.0;
    if combined_mean < f64::EPSILON || (mean_high - mean_low) / combined_mean <= TWO_RADIUS_GAP {
        return Classification::SingleRadius;
    }

    let winding = winding_number(vertices, center).abs();
    if (winding - 1.0).abs() < 0.5 {
        Classification::TwoRadiusAlternating
    } else {
        Classification::TwoRadiusCrossing
    }
}

/// Two-radius analogue of `search_step_pattern` (spec.md §4.I step 5):
/// chooses the step minimizing the 1-to-1 vertex-aligned squared error
/// between the RDP vertices (alternating outer/inner per visit) and a
/// `k`-tip self-crossing star traversed in that pattern.
fn search_step_pattern_two_radius(
    vertices: &[Point],
    center: Point,
    outer_radius: f64,
    inner_radius: f64,
    k: usize,
) -> (u32, f64) {
    let rotation0 = (vertices[0].y - center.y).atan2(vertices[0].x - center.x);

    let mut best_step = 1u32;
    let mut best_error = f64::MAX;

    for step in 2..k as u32 {
        if gcd(step, k as u32) != 1 {
            continue;
        }
        let mut sq_error = 0.0;
        for (j, &v) in vertices.iter().enumerate() {
            let tip = ((j / 2) * step as usize) % k;
            let angle = rotation0 + 2.0 * PI * tip as f64 / k as f64;
            let r = if j % 2 == 0 { outer_radius } else { inner_radius };
            let ideal = polar(center, r, angle);
            sq_error += distance2(v, ideal);
        }
        if sq_error < best_error {
            best_error = sq_error;
            best_step = step;
        }
    }
    (best_step, best_error)
}

/// Chooses the step pattern minimizing the 1-to-1 vertex-aligned squared
/// error between the RDP vertices and a regular `n`-gon traversed in that
/// pattern (spec.md §4.I step 5).
fn search_step_pattern(vertices: &[Point], center: Point, radius: f64) -> (u32, f64) {
    let n = vertices.len();
    let rotation0 = (vertices[0].y - center.y).atan2(vertices[0].x - center.x);

    let mut best_step = 1u32;
    let mut best_error = f64::MAX;

    for step in 1..n as u32 {
        if gcd(step, n as u32) != 1 {
            continue;
        }
        let mut sq_error = 0.0;
        for (j, &v) in vertices.iter().enumerate() {
            let k = (j * step as usize) % n;
            let angle = rotation0 + 2.0 * PI * k as f64 / n as f64;
            let ideal = polar(center, radius, angle);
            sq_error += distance2(v, ideal);
        }
        if sq_error < best_error {
            best_error = sq_error;
            best_step = step;
        }
    }
    (best_step, best_error)
}

/// Fits a polygon or star to `points`. Requires at least 3 RDP segments
/// (spec.md §4.J).
pub fn fit(points: &[Point], epsilon: f64, sample_count: usize) -> Option<PolygonOrStar> {
    let simplified = rdp::simplify(points, epsilon);
    if simplified.vertices.len() < MIN_SEGMENTS + 1 {
        debug!("polygon/star fit declined: fewer than {MIN_SEGMENTS} RDP segments");
        return None;
    }

    let unique = close_and_dedupe(&simplified.vertices);
    let n = unique.len();
    if n < 3 {
        debug!("polygon/star fit declined: fewer than 3 unique vertices");
        return None;
    }

    let center = centroid(&unique)?;
    let radii: Vec<f64> = unique.iter().map(|&v| crate::geometry::distance(v, center)).collect();
    let mean_radius = radii.iter().sum::<f64>() / radii.len() as f64;

    match classify(&unique, center, &radii) {
        Classification::SingleRadius => {
            let (step, _) = search_step_pattern(&unique, center, mean_radius);
            let rotation0 = (unique[0].y - center.y).atan2(unique[0].x - center.x);

            if step == 1 {
                let refined = descend_vector(
                    vec![mean_radius, rotation0],
                    OUTER_LOOPS * 2,
                    LEARNING_RATE,
                    FD_DELTA,
                    INNER_STEPS,
                    0.0,
                    |p| {
                        let model = PolygonModel { center, radius: p[0].max(1e-6), rotation: p[1], sides: n as u32 };
                        hausdorff::error(&unique, &model, sample_count)
                    },
                    |p| vec![p[0].max(1e-6), p[1]],
                );
                let model = PolygonModel { center, radius: refined[0], rotation: refined[1], sides: n as u32 };
                let error = hausdorff::error(points, &model, sample_count);
                Some(PolygonOrStar::Polygon(PolygonFit {
                    center,
                    radius: refined[0],
                    rotation: refined[1],
                    sides: n as u32,
                    error,
                }))
            } else {
                let refined = descend_vector(
                    vec![mean_radius, rotation0],
                    OUTER_LOOPS * 2,
                    LEARNING_RATE,
                    FD_DELTA,
                    INNER_STEPS,
                    0.0,
                    |p| {
                        let model = StarModel {
                            center,
                            outer_radius: p[0].max(1e-6),
                            inner_radius: p[0].max(1e-6),
                            rotation: p[1],
                            points: n as u32,
                            self_crossing: true,
                            step_pattern: step,
                        };
                        hausdorff::error(&unique, &model, sample_count)
                    },
                    |p| vec![p[0].max(1e-6), p[1]],
                );
                let model = StarModel {
                    center,
                    outer_radius: refined[0],
                    inner_radius: refined[0],
                    rotation: refined[1],
                    points: n as u32,
                    self_crossing: true,
                    step_pattern: step,
                };
                let error = hausdorff::error(points, &model, sample_count);
                Some(PolygonOrStar::Star(StarFit {
                    center,
                    outer_radius: refined[0],
                    inner_radius: refined[0],
                    rotation: refined[1],
                    points: n as u32,
                    self_crossing: true,
                    step_pattern: step,
                    error,
                }))
            }
        }
        two_radius @ (Classification::TwoRadiusAlternating | Classification::TwoRadiusCrossing) => {
            let self_crossing = matches!(two_radius, Classification::TwoRadiusCrossing);
            let k = n / 2;
            let midpoint = {
                let max = radii.iter().cloned().fold(f64::MIN, f64::max);
                let min = radii.iter().cloned().fold(f64::MAX, f64::min);
                (max + min) / 2.0
            };
            let mean_outer: f64 = {
                let v: Vec<f64> = radii.iter().cloned().filter(|&r| r >= midpoint).collect();
                v.iter().sum::<f64>() / v.len() as f64
            };
            let mean_inner: f64 = {
                let v: Vec<f64> = radii.iter().cloned().filter(|&r| r < midpoint).collect();
                v.iter().sum::<f64>() / v.len() as f64
            };
            let rotation0 = (unique[0].y - center.y).atan2(unique[0].x - center.x);
            let step_pattern = if self_crossing {
                search_step_pattern_two_radius(&unique, center, mean_outer, mean_inner, k).0
            } else {
                1
            };

            let refined = descend_vector(
                vec![mean_outer, mean_inner, rotation0],
                OUTER_LOOPS * 3,
                LEARNING_RATE,
                FD_DELTA,
                INNER_STEPS,
                0.0,
                |p| {
                    let model = StarModel {
                        center,
                        outer_radius: p[0].max(1e-6),
                        inner_radius: p[1].max(1e-6),
                        rotation: p[2],
                        points: k as u32,
                        self_crossing,
                        step_pattern,
                    };
                    hausdorff::error(&unique, &model, sample_count)
                },
                |p| vec![p[0].max(1e-6), p[1].max(1e-6), p[2]],
            );

            let model = StarModel {
                center,
                outer_radius: refined[0],
                inner_radius: refined[1],
                rotation: refined[2],
                points: k as u32,
                self_crossing,
                step_pattern,
            };
            let error = hausdorff::error(points, &model, sample_count);
            Some(PolygonOrStar::Star(StarFit {
                center,
                outer_radius: refined[0],
                inner_radius: refined[1],
                rotation: refined[2],
                points: k as u32,
                self_crossing,
                step_pattern,
                error,
            }))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn regular_ngon_points(center: Point, radius: f64, n: u32, step: u32, rotation: f64) -> Vec<Point> {
        let mut pts: Vec<Point> = (0..n)
            .map(|i| {
                let k = (i * step) % n;
                polar(center, radius, rotation + 2.0 * PI * k as f64 / n as f64)
            })
            .collect();
        pts.push(pts[0]);
        pts
    }

    #[test]
    fn triangle_classified_as_polygon() {
        let pts = regular_ngon_points(Point::new(100.0, 100.0), 80.0, 3, 1, 0.0);
        match fit(&pts, 2.0, 64).unwrap() {
            PolygonOrStar::Polygon(p) => {
                assert_eq!(p.sides, 3);
                assert!((p.radius - 80.0).abs() < 5.0);
            }
            PolygonOrStar::Star(_) => panic!("expected polygon"),
        }
    }

    #[test]
    fn pentagram_classified_as_self_crossing_star() {
        let pts = regular_ngon_points(Point::new(0.0, 0.0), 100.0, 5, 2, 0.0);
        match fit(&pts, 2.0, 64).unwrap() {
            PolygonOrStar::Star(s) => {
                assert!(s.self_crossing);
                assert_eq!(s.points, 5);
                assert_eq!(s.step_pattern, 2);
            }
            PolygonOrStar::Polygon(_) => panic!("expected self-crossing star"),
        }
    }

    #[test]
    fn too_few_segments_fails() {
        let pts = vec![Point::new(0.0, 0.0), Point::new(10.0, 0.0), Point::new(10.0, 10.0)];
        assert!(fit(&pts, 2.0, 64).is_none());
    }

    #[test]
    fn hexagon_classified_as_polygon_with_six_sides() {
        let pts = regular_ngon_points(Point::new(50.0, 50.0), 60.0, 6, 1, 0.2);
        match fit(&pts, 2.0, 64).unwrap() {
            PolygonOrStar::Polygon(p) => assert_eq!(p.sides, 6),
            PolygonOrStar::Star(_) => panic!("expected polygon"),
        }
    }

    #[test]
    fn two_radius_starfish_outline_is_non_crossing_star() {
        // A 5-point starfish silhouette: walk outer, inner, outer, inner...
        let k = 5u32;
        let center = Point::new(0.0, 0.0);
        let outer = 100.0;
        let inner = 40.0;
        let mut pts = Vec::new();
        for i in 0..2 * k {
            let angle = PI * i as f64 / k as f64;
            let r = if i % 2 == 0 { outer } else { inner };
            pts.push(polar(center, r, angle));
        }
        pts.push(pts[0]);
        match fit(&pts, 2.0, 64).unwrap() {
            PolygonOrStar::Star(s) => {
                assert!(!s.self_crossing, "expected non-crossing starfish");
                assert_eq!(s.points, 5);
                assert!(s.outer_radius > s.inner_radius);
            }
            PolygonOrStar::Polygon(_) => panic!("expected star"),
        }
    }

    #[test]
    fn two_radius_self_crossing_star_picks_error_minimizing_step_not_smallest_coprime() {
        // 8 tips, visited with step=5. The smallest coprime-to-8 step (3)
        // fits this data poorly; only the error-minimizing search recovers 5.
        let k = 8u32;
        let center = Point::new(0.0, 0.0);
        let outer = 120.0;
        let inner = 50.0;
        let true_step = 5u32;

        let mut pts = Vec::new();
        for pair in 0..k {
            let tip = (pair * true_step) % k;
            let angle = 2.0 * PI * tip as f64 / k as f64;
            pts.push(polar(center, outer, angle));
            pts.push(polar(center, inner, angle));
        }
        pts.push(pts[0]);

        match fit(&pts, 2.0, 64).unwrap() {
            PolygonOrStar::Star(s) => {
                assert!(s.self_crossing, "expected self-crossing classification");
                assert_eq!(s.points, k);
                assert_eq!(s.step_pattern, true_step);
            }
            PolygonOrStar::Polygon(_) => panic!("expected star"),
        }
    }
}
