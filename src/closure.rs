//! Closure detector module
//!
//! Decides whether a stroke's endpoints are close enough, relative to its
//! extent, to treat it as a closed shape.

use crate::geometry::{bounding_box, distance, Point};

/// Returns `true` if `points` form a "mostly closed" stroke: the distance
/// between the first and last point is less than `ratio` times the
/// bounding box's largest dimension. Requires at least 3 points.
pub fn is_closed(points: &[Point], ratio: f64) -> bool {
    if points.len() < 3 {
        return false;
    }
    let bb = match bounding_box(points) {
        Some(bb) => bb,
        None => return false,
    };
    let d = bb.max_dimension();
    if d < f64::EPSILON {
        return true;
    }
    let gap = distance(*points.first().unwrap(), *points.last().unwrap());
    gap < ratio * d
}
