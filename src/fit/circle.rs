//! Circle fitter (spec.md §4.F)
//!
//! Pratt's algebraic least-squares circle fit. Centroid subtraction keeps
//! the moment accumulation well-conditioned; the characteristic equation
//! in the Pratt parameter is solved by Newton's method seeded at zero.

use log::debug;

use crate::geometry::{centroid, distance2, Point};
use crate::hausdorff::ShapeModel;

const NEWTON_ITERS: usize = 20;
const NEWTON_TOL: f64 = 1e-12;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CircleFit {
    pub center: Point,
    pub radius: f64,
    pub error: f64,
}

pub struct CircleModel {
    pub center: Point,
    pub radius: f64,
}

impl ShapeModel for CircleModel {
    fn distance2_to(&self, p: Point) -> f64 {
        let d = crate::geometry::distance(p, self.center) - self.radius;
        d * d
    }

    fn sample(&self, n: usize) -> Vec<Point> {
        (0..n)
            .map(|i| {
                let t = 2.0 * std::f64::consts::PI * i as f64 / n.max(1) as f64;
                Point::new(
                    self.center.x + self.radius * t.cos(),
                    self.center.y + self.radius * t.sin(),
                )
            })
            .collect()
    }
}

/// Fits a circle to `points` via Pratt's algebraic method. Returns `None`
/// for fewer than three points or a numerically degenerate configuration
/// (spec.md §7, kinds 1-2).
pub fn fit(points: &[Point], sample_count: usize) -> Option<CircleFit> {
    if points.len() < 3 {
        debug!("circle fit declined: fewer than 3 points");
        return None;
    }

    let mean = centroid(points)?;
    let n = points.len() as f64;

    let mut mxx = 0.0;
    let mut myy = 0.0;
    let mut mxy = 0.0;
    let mut mxz = 0.0;
    let mut myz = 0.0;
    let mut mzz = 0.0;

    for &p in points {
        let xi = p.x - mean.x;
        let yi = p.y - mean.y;
        let zi = xi * xi + yi * yi;
        mxx += xi * xi;
        myy += yi * yi;
        mxy += xi * yi;
        mxz += xi * zi;
        myz += yi * zi;
        mzz += zi * zi;
    }
    mxx /= n;
    myy /= n;
    mxy /= n;
    mxz /= n;
    myz /= n;
    mzz /= n;

    let mz = mxx + myy;
    let cov_xy = mxx * myy - mxy * mxy;
    let var_z = mzz - mz * mz;

    let a2 = 4.0 * cov_xy - 3.0 * mz * mz - mzz;
    let a1 = var_z * mz + 4.0 * cov_xy * mz - mxz * mxz - myz * myz;
    let a0 = mxz * mxz * myy + myz * myz * mxx - var_z * cov_xy - 2.0 * mxz * myz * mxy
        - mz * mz * mz;
    let a22 = a2 + a2;

    let mut x = 0.0f64;
    let mut y = a0;
    for _ in 0..NEWTON_ITERS {
        let dy = a1 + x * (a22 + 16.0 * x * x);
        if dy.abs() < f64::EPSILON {
            debug!("circle fit declined: zero Newton derivative");
            return None;
        }
        let x_new = x - y / dy;
        if !x_new.is_finite() {
            debug!("circle fit declined: non-finite Newton step");
            return None;
        }
        let y_new = a0 + x_new * (a1 + x_new * (a2 + 4.0 * x_new * x_new));
        if y_new.abs() >= y.abs() {
            break;
        }
        let converged = (x_new - x).abs() < NEWTON_TOL;
        x = x_new;
        y = y_new;
        if converged {
            break;
        }
    }

    let det = x * x - x * mz + cov_xy;
    if det.abs() < f64::EPSILON {
        debug!("circle fit declined: singular linear system");
        return None;
    }

    let cx = (mxz * (myy - x) - myz * mxy) / det / 2.0;
    let cy = (myz * (mxx - x) - mxz * mxy) / det / 2.0;

    let radius_sq = cx * cx + cy * cy + mz + 2.0 * x;
    if !(radius_sq > 0.0) {
        debug!("circle fit declined: negative radius^2");
        return None;
    }
    let radius = radius_sq.sqrt();
    let center = Point::new(cx + mean.x, cy + mean.y);

    let model = CircleModel { center, radius };
    let error = crate::hausdorff::error(points, &model, sample_count);

    Some(CircleFit { center, radius, error })
}
