//! Resampler module
//!
//! Redistributes a stroke's points at uniform arc-length spacing, so every
//! downstream fitter sees a fixed-cardinality, evenly-sampled point set.

use crate::geometry::{distance, Point};

/// Resamples `points` to exactly `count` points at uniform arc-length
/// spacing along the input polyline.
///
/// Inputs shorter than two points are returned verbatim, matching the
/// spec's handling of degenerate strokes.
pub fn resample(points: &[Point], count: usize) -> Vec<Point> {
    if points.len() < 2 || count < 2 {
        return points.to_vec();
    }

    let total_length: f64 = points
        .windows(2)
        .map(|w| distance(w[0], w[1]))
        .sum();

    if total_length < f64::EPSILON {
        // All points coincide: every resampled point is the same point.
        return vec![points[0]; count];
    }

    let interval = total_length / (count as f64 - 1.0);
    let mut out = Vec::with_capacity(count);
    out.push(points[0]);

    let mut accumulated = 0.0;
    let mut prev = points[0];

    for &next in &points[1..] {
        let mut segment = distance(prev, next);
        // The segment can need to emit more than one point (short segments
        // relative to `interval`), so re-derive the remaining length after
        // every emission instead of consuming the whole segment at once:
        // shrinking `prev` towards `next` keeps the loop from running
        // forever on a single long segment (spec.md §9).
        while accumulated + segment >= interval && out.len() < count {
            let remaining = interval - accumulated;
            let t = if segment > f64::EPSILON { remaining / segment } else { 1.0 };
            let new_point = prev.lerp(next, t);
            out.push(new_point);
            segment -= remaining;
            accumulated = 0.0;
            prev = new_point;
        }
        accumulated += segment;
        prev = next;
    }

    if out.len() < count {
        out.push(*points.last().unwrap());
    }
    // Numerical slack can occasionally leave us one point short or long;
    // clamp to the exact requested count.
    while out.len() < count {
        out.push(*points.last().unwrap());
    }
    out.truncate(count);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_input_returned_verbatim() {
        let pts = vec![Point::new(0.0, 0.0)];
        assert_eq!(resample(&pts, 64), pts);
    }

    #[test]
    fn produces_exact_count() {
        let pts = vec![
            Point::new(0.0, 0.0),
            Point::new(100.0, 0.0),
            Point::new(100.0, 100.0),
        ];
        for n in [2, 5, 17, 64, 200] {
            let out = resample(&pts, n);
            assert_eq!(out.len(), n);
        }
    }

    #[test]
    fn uniform_spacing_on_straight_line() {
        let pts = vec![Point::new(0.0, 0.0), Point::new(63.0, 0.0)];
        let out = resample(&pts, 64);
        assert_eq!(out.len(), 64);
        for i in 0..out.len() - 1 {
            let d = distance(out[i], out[i + 1]);
            assert!((d - 1.0).abs() < 1e-9, "segment {i} had length {d}");
        }
    }

    #[test]
    fn consecutive_distances_within_5_percent_on_polyline() {
        let pts = vec![
            Point::new(0.0, 0.0),
            Point::new(40.0, 0.0),
            Point::new(40.0, 90.0),
            Point::new(200.0, 90.0),
        ];
        let out = resample(&pts, 64);
        let dists: Vec<f64> = out.windows(2).map(|w| distance(w[0], w[1])).collect();
        let max = dists.iter().cloned().fold(f64::MIN, f64::max);
        let min = dists.iter().cloned().fold(f64::MAX, f64::min);
        // Endpoints can be short by construction; check the interior run.
        let interior = &dists[1..dists.len() - 1];
        let imax = interior.iter().cloned().fold(f64::MIN, f64::max);
        let imin = interior.iter().cloned().fold(f64::MAX, f64::min);
        assert!(imax <= imin * 1.05 + 1e-9, "min={min} max={max} imin={imin} imax={imax}");
    }

    #[test]
    fn endpoints_preserved() {
        let pts = vec![
            Point::new(5.0, 5.0),
            Point::new(50.0, 5.0),
            Point::new(50.0, 60.0),
        ];
        let out = resample(&pts, 64);
        assert_eq!(*out.first().unwrap(), pts[0]);
        let last_d = distance(*out.last().unwrap(), *pts.last().unwrap());
        assert!(last_d < 1e-6);
    }

    #[test]
    fn coincident_points_do_not_panic() {
        let pts = vec![Point::new(1.0, 1.0); 5];
        let out = resample(&pts, 10);
        assert_eq!(out.len(), 10);
    }

    #[test]
    fn long_single_segment_terminates() {
        // A single very long segment historically risked an infinite loop
        // if `segment` was not shrunk after each emission (spec.md §9).
        let pts = vec![Point::new(0.0, 0.0), Point::new(1.0e6, 0.0)];
        let out = resample(&pts, 64);
        assert_eq!(out.len(), 64);
    }
}
