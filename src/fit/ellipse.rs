//! Ellipse fitter (spec.md §4.G)
//!
//! Three-phase estimation: a PCA seed from the point covariance, a 1-D
//! refinement of the major radius, then a 5-parameter refinement on the
//! two-focus representation of the ellipse.

use log::debug;
use nalgebra::{Matrix2, SymmetricEigen};

use crate::fit::refine::{descend_scalar, descend_vector};
use crate::geometry::{centroid, distance, rotate_point, Point};
use crate::hausdorff::{self, ShapeModel};

const NEWTON_ITERS: usize = 20;
const MIN_POINTS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EllipseFit {
    pub center: Point,
    pub rx: f64,
    pub ry: f64,
    pub rotation: f64,
    pub error: f64,
}

pub struct EllipseModel {
    pub center: Point,
    pub rx: f64,
    pub ry: f64,
    pub rotation: f64,
}

impl EllipseModel {
    /// Nearest point on the ellipse boundary to `p`, found by Newton
    /// iteration on the parametric angle `t`. The Hessian `g'(t)` can
    /// vanish near the ellipse's axes on highly eccentric shapes; when it
    /// does, fall back to a small normalized step instead of diverging
    /// (spec.md §9).
    fn nearest_angle(&self, p: Point) -> f64 {
        let local = rotate_point(p, self.center, -self.rotation).sub(self.center);
        let rx = self.rx.max(1e-9);
        let ry = self.ry.max(1e-9);

        let mut t = (local.y / ry).atan2(local.x / rx);
        for _ in 0..NEWTON_ITERS {
            let (s, c) = t.sin_cos();
            let g = rx * local.x * s - ry * local.y * c + (ry * ry - rx * rx) * s * c;
            let g_prime =
                rx * local.x * c + ry * local.y * s + (ry * ry - rx * rx) * (2.0 * t).cos();

            if g_prime.abs() < 1e-9 {
                t -= 0.05 * g.signum();
            } else {
                let step = g / g_prime;
                t -= step;
            }
        }
        t
    }

    fn point_at(&self, t: f64) -> Point {
        let local = Point::new(self.rx * t.cos(), self.ry * t.sin());
        rotate_point(self.center.add(local), self.center, self.rotation)
    }
}

impl ShapeModel for EllipseModel {
    fn distance2_to(&self, p: Point) -> f64 {
        let t = self.nearest_angle(p);
        let nearest = self.point_at(t);
        crate::geometry::distance2(p, nearest)
    }

    fn sample(&self, n: usize) -> Vec<Point> {
        (0..n)
            .map(|i| {
                let t = 2.0 * std::f64::consts::PI * i as f64 / n.max(1) as f64;
                self.point_at(t)
            })
            .collect()
    }
}

fn pca_seed(points: &[Point]) -> Option<(Point, f64, f64, f64)> {
    let mean = centroid(points)?;
    let n = points.len() as f64;
    let mut cov = Matrix2::zeros();
    for &p in points {
        let dx = p.x - mean.x;
        let dy = p.y - mean.y;
        cov[(0, 0)] += dx * dx;
        cov[(0, 1)] += dx * dy;
        cov[(1, 0)] += dx * dy;
        cov[(1, 1)] += dy * dy;
    }
    cov /= n;

    let eig = SymmetricEigen::new(cov);
    let (i_max, i_min) = if eig.eigenvalues[0] >= eig.eigenvalues[1] {
        (0, 1)
    } else {
        (1, 0)
    };
    let lambda1 = eig.eigenvalues[i_max].max(0.0);
    let lambda2 = eig.eigenvalues[i_min].max(0.0);
    let major = eig.eigenvectors.column(i_max);
    let rotation = major[1].atan2(major[0]);

    let rx = (2.0 * lambda1).sqrt();
    let ry = (2.0 * lambda2).sqrt();
    Some((mean, rx, ry, rotation))
}

/// Parameters of the two-focus representation: `(f1, f2, major_axis_length)`.
struct FociParams {
    f1: Point,
    f2: Point,
    length: f64,
}

fn to_foci(center: Point, rx: f64, ry: f64, rotation: f64) -> FociParams {
    let c = (rx * rx - ry * ry).max(0.0).sqrt();
    let dir = Point::new(rotation.cos(), rotation.sin());
    FociParams {
        f1: center.sub(dir.scale(c)),
        f2: center.add(dir.scale(c)),
        length: 2.0 * rx,
    }
}

/// Converts the 5 foci parameters back to `(center, rx, ry, rotation)`.
/// Returns `None` if the parameters no longer describe a valid ellipse
/// (major axis shorter than the focal separation).
fn from_foci(params: &[f64]) -> Option<(Point, f64, f64, f64)> {
    let f1 = Point::new(params[0], params[1]);
    let f2 = Point::new(params[2], params[3]);
    let length = params[4];

    let center = f1.lerp(f2, 0.5);
    let c = distance(f1, f2) / 2.0;
    let rx = length / 2.0;
    if rx <= c || rx <= 0.0 {
        return None;
    }
    let ry = (rx * rx - c * c).sqrt();
    let rotation = if c < 1e-9 {
        0.0
    } else {
        (f2.y - f1.y).atan2(f2.x - f1.x)
    };
    Some((center, rx, ry, rotation))
}

/// Fits an ellipse to `points`. Requires at least 5 points (spec.md §4.G).
pub fn fit(points: &[Point], sample_count: usize) -> Option<EllipseFit> {
    if points.len() < MIN_POINTS {
        debug!("ellipse fit declined: fewer than {MIN_POINTS} points");
        return None;
    }

    let (center, rx0, ry0, rotation0) = pca_seed(points)?;
    if ry0 < f64::EPSILON {
        debug!("ellipse fit declined: degenerate PCA (zero minor axis)");
        return None;
    }

    let objective_rx = |rx: f64| {
        let model = EllipseModel { center, rx, ry: ry0, rotation: rotation0 };
        hausdorff::error(points, &model, sample_count)
    };
    let rx1 = descend_scalar(rx0, 20, 0.1, 0.1, 5, 0.0, objective_rx, |rx| rx.max(ry0));

    let foci0 = to_foci(center, rx1, ry0, rotation0);
    let params0 = vec![foci0.f1.x, foci0.f1.y, foci0.f2.x, foci0.f2.y, foci0.length];

    let objective_foci = |params: &[f64]| match from_foci(params) {
        Some((c, rx, ry, rot)) => {
            let model = EllipseModel { center: c, rx, ry, rotation: rot };
            hausdorff::error(points, &model, sample_count)
        }
        None => f64::MAX / 2.0,
    };
    let project_foci = |params: Vec<f64>| {
        // Keep the major axis length from collapsing onto (or past) the
        // focal separation; everything else is left to the optimizer.
        let mut p = params;
        let f1 = Point::new(p[0], p[1]);
        let f2 = Point::new(p[2], p[3]);
        let min_length = 2.0 * distance(f1, f2) + 1e-6;
        if p[4] < min_length {
            p[4] = min_length;
        }
        p
    };

    let refined = descend_vector(params0, 10, 0.1, 0.1, 5, 1e-3, objective_foci, project_foci);
    let (center, rx, ry, rotation) = from_foci(&refined).unwrap_or((center, rx1, ry0, rotation0));

    if !(rx >= ry && ry > 0.0 && rx.is_finite() && ry.is_finite()) {
        debug!("ellipse fit declined: invalid refined parameters");
        return None;
    }

    let model = EllipseModel { center, rx, ry, rotation };
    let error = hausdorff::error(points, &model, sample_count);

    Some(EllipseFit { center, rx, ry, rotation, error })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ellipse_points(center: Point, rx: f64, ry: f64, rotation: f64, n: usize) -> Vec<Point> {
        (0..n)
            .map(|i| {
                let t = 2.0 * std::f64::consts::PI * i as f64 / n as f64;
                let local = Point::new(rx * t.cos(), ry * t.sin());
                rotate_point(center.add(local), center, rotation)
            })
            .collect()
    }

    #[test]
    fn fails_below_five_points() {
        let pts = vec![Point::new(0.0, 0.0); 4];
        assert!(fit(&pts, 64).is_none());
    }

    #[test]
    fn circle_is_an_ellipse_with_equal_radii() {
        let pts = ellipse_points(Point::new(0.0, 0.0), 50.0, 50.0, 0.0, 64);
        let f = fit(&pts, 64).unwrap();
        assert!((f.rx - f.ry).abs() < 1.0);
        assert!(f.error < 1.0);
    }

    #[test]
    fn recovers_rotated_ellipse_parameters() {
        let rotation = 30.0f64.to_radians();
        let pts = ellipse_points(Point::new(400.0, 400.0), 150.0, 60.0, rotation, 64);
        let f = fit(&pts, 64).unwrap();
        assert!((145.0..=155.0).contains(&f.rx), "rx={}", f.rx);
        assert!((55.0..=65.0).contains(&f.ry), "ry={}", f.ry);
        let rotation_deg = f.rotation.to_degrees().rem_euclid(180.0);
        let diff = (rotation_deg - 30.0).abs().min((rotation_deg - 210.0).abs());
        assert!(diff < 5.0, "rotation={rotation_deg}");
    }

    #[test]
    fn translation_invariant_error() {
        let pts_a = ellipse_points(Point::new(0.0, 0.0), 80.0, 40.0, 0.4, 64);
        let pts_b: Vec<Point> = pts_a.iter().map(|p| p.add(Point::new(300.0, 700.0))).collect();
        let fa = fit(&pts_a, 64).unwrap();
        let fb = fit(&pts_b, 64).unwrap();
        assert!((fa.rx - fb.rx).abs() < 1e-2);
        assert!((fa.ry - fb.ry).abs() < 1e-2);
    }
}
