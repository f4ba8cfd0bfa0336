//! Square / Rectangle fitter (spec.md §4.H)
//!
//! Shared preamble: a coarse rotation search over a 90 degree quadrant
//! seeds the minimum-area oriented bounding box, which both branches then
//! refine independently by alternating gradient-descent blocks.

use log::debug;

use crate::fit::refine::descend_scalar;
use crate::geometry::{bounding_box, centroid, rotate_point, Point};
use crate::hausdorff::{self, ShapeModel};
use crate::resample::resample;

const MIN_POINTS: usize = 4;
const OUTER_LOOPS: usize = 3;
const INNER_STEPS: usize = 5;
const LEARNING_RATE: f64 = 0.1;
const FD_DELTA: f64 = 1e-3;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RectangleFit {
    pub center: Point,
    pub width: f64,
    pub height: f64,
    pub rotation: f64,
    pub error: f64,
    pub square_error: f64,
    pub squareness: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SquareFit {
    pub center: Point,
    pub side: f64,
    pub rotation: f64,
    pub error: f64,
}

struct RectModel {
    center: Point,
    width: f64,
    height: f64,
    rotation: f64,
}

impl RectModel {
    fn corners(&self) -> [Point; 4] {
        let hw = self.width / 2.0;
        let hh = self.height / 2.0;
        let local = [
            Point::new(-hw, -hh),
            Point::new(hw, -hh),
            Point::new(hw, hh),
            Point::new(-hw, hh),
        ];
        let mut out = [Point::zero(); 4];
        for (i, &l) in local.iter().enumerate() {
            out[i] = rotate_point(self.center.add(l), self.center, self.rotation);
        }
        out
    }
}

impl ShapeModel for RectModel {
    fn distance2_to(&self, p: Point) -> f64 {
        let c = self.corners();
        (0..4)
            .map(|i| crate::geometry::point_segment_distance2(p, c[i], c[(i + 1) % 4]))
            .fold(f64::MAX, f64::min)
    }

    fn sample(&self, n: usize) -> Vec<Point> {
        let c = self.corners();
        let closed = vec![c[0], c[1], c[2], c[3], c[0]];
        resample(&closed, n)
    }
}

/// Coarse minimum-area oriented bounding box, searched over 90 one-degree
/// steps (rectangles have two-fold symmetry, so a quarter turn suffices).
/// Returns `(rotation, center, width, height)`.
fn coarse_seed(points: &[Point]) -> Option<(f64, Point, f64, f64)> {
    let pivot = centroid(points)?;
    let mut best: Option<(f64, f64, Point, f64, f64)> = None;

    for deg in 0..90 {
        let theta = (deg as f64).to_radians();
        let rotated: Vec<Point> = points.iter().map(|&p| rotate_point(p, pivot, -theta)).collect();
        let bb = bounding_box(&rotated)?;
        let area = bb.width() * bb.height();
        if best.as_ref().map_or(true, |&(a, ..)| area < a) {
            let center_world = rotate_point(bb.center(), pivot, theta);
            best = Some((area, theta, center_world, bb.width(), bb.height()));
        }
    }

    let (_, theta, center, w, h) = best?;
    if w < f64::EPSILON || h < f64::EPSILON {
        return None;
    }
    Some((theta, center, w, h))
}

fn alternate_refine_rect(
    points: &[Point],
    center: Point,
    mut width: f64,
    mut height: f64,
    mut rotation: f64,
    sample_count: usize,
) -> (f64, f64, f64) {
    for _ in 0..OUTER_LOOPS {
        width = descend_scalar(
            width,
            INNER_STEPS,
            LEARNING_RATE,
            FD_DELTA,
            INNER_STEPS,
            0.0,
            |w| {
                let model = RectModel { center, width: w, height, rotation };
                hausdorff::error(points, &model, sample_count)
            },
            |w| w.max(1e-6),
        );
        height = descend_scalar(
            height,
            INNER_STEPS,
            LEARNING_RATE,
            FD_DELTA,
            INNER_STEPS,
            0.0,
            |h| {
                let model = RectModel { center, width, height: h, rotation };
                hausdorff::error(points, &model, sample_count)
            },
            |h| h.max(1e-6),
        );
        rotation = descend_scalar(
            rotation,
            INNER_STEPS,
            LEARNING_RATE,
            FD_DELTA,
            INNER_STEPS,
            0.0,
            |r| {
                let model = RectModel { center, width, height, rotation: r };
                hausdorff::error(points, &model, sample_count)
            },
            |r| r,
        );
    }
    (width, height, rotation)
}

/// Fits an axis-free rectangle. Requires at least 4 points (spec.md §4.J).
pub fn fit_rectangle(points: &[Point], sample_count: usize) -> Option<RectangleFit> {
    if points.len() < MIN_POINTS {
        debug!("rectangle fit declined: fewer than {MIN_POINTS} points");
        return None;
    }
    let (rotation0, center, w0, h0) = coarse_seed(points)?;
    let (width, height, rotation) =
        alternate_refine_rect(points, center, w0, h0, rotation0, sample_count);

    let model = RectModel { center, width, height, rotation };
    let error = hausdorff::error(points, &model, sample_count);

    let squareness = 1.0 - width.min(height) / width.max(height);
    let square_error = fit_square(points, sample_count).map(|s| s.error).unwrap_or(f64::MAX);

    Some(RectangleFit { center, width, height, rotation, error, square_error, squareness })
}

struct SquareModel {
    center: Point,
    side: f64,
    rotation: f64,
}

impl ShapeModel for SquareModel {
    fn distance2_to(&self, p: Point) -> f64 {
        let rect = RectModel { center: self.center, width: self.side, height: self.side, rotation: self.rotation };
        rect.distance2_to(p)
    }

    fn sample(&self, n: usize) -> Vec<Point> {
        let rect = RectModel { center: self.center, width: self.side, height: self.side, rotation: self.rotation };
        rect.sample(n)
    }
}

/// Fits a square. Requires at least 4 points (spec.md §4.J).
pub fn fit_square(points: &[Point], sample_count: usize) -> Option<SquareFit> {
    if points.len() < MIN_POINTS {
        debug!("square fit declined: fewer than {MIN_POINTS} points");
        return None;
    }
    let (rotation0, center, w0, h0) = coarse_seed(points)?;
    let mut side = (w0 + h0) / 2.0;
    let mut rotation = rotation0;

    for _ in 0..OUTER_LOOPS {
        side = descend_scalar(
            side,
            INNER_STEPS,
            LEARNING_RATE,
            FD_DELTA,
            INNER_STEPS,
            0.0,
            |s| {
                let model = SquareModel { center, side: s, rotation };
                hausdorff::error(points, &model, sample_count)
            },
            |s| s.max(1e-6),
        );
        rotation = descend_scalar(
            rotation,
            INNER_STEPS,
            LEARNING_RATE,
            FD_DELTA,
            INNER_STEPS,
            0.0,
            |r| {
                let model = SquareModel { center, side, rotation: r };
                hausdorff::error(points, &model, sample_count)
            },
            |r| r,
        );
    }

    let model = SquareModel { center, side, rotation };
    let error = hausdorff::error(points, &model, sample_count);
    Some(SquareFit { center, side, rotation, error })
}
