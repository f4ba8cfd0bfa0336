//! Fitter dispatch
//!
//! Each fitter is a pure function `(points, config) -> Option<ShapeFit>`.
//! `fit_all` runs every fitter eligible for the stroke and hands the
//! results to the selector (spec.md §4.J, §9 "dynamic-dispatch fitters").

pub mod circle;
pub mod ellipse;
pub mod polygon;
pub mod rect;
pub mod refine;

use crate::closure::is_closed;
use crate::config::Config;
use crate::geometry::Point;
use crate::resample::resample;

/// Every candidate fit produced for one stroke. `None` fields mean that
/// fitter declined (too few points, not closed, numerical degeneracy).
#[derive(Debug, Clone, Default)]
pub struct Candidates {
    pub circle: Option<circle::CircleFit>,
    pub ellipse: Option<ellipse::EllipseFit>,
    pub rectangle: Option<rect::RectangleFit>,
    pub square: Option<rect::SquareFit>,
    pub polygon_or_star: Option<polygon::PolygonOrStar>,
}

/// Runs every fitter eligible for `points` under `config` (spec.md §2: on
/// commit, resample via B, test closure via C, then run the applicable
/// fitters; spec.md §4.J: circle/ellipse need closure; square/rectangle need
/// >= 4 points; polygon/star needs >= 3 RDP segments, checked internally).
///
/// Raw pointer samples are non-uniformly spaced (a stroke drawn slowly
/// through one arc and quickly through another), which biases the
/// moment-based circle/ellipse fits toward the densely-sampled region, so
/// every fitter sees the uniformly resampled stroke, never the raw input.
pub fn fit_all(points: &[Point], stroke_width: f64, config: &Config) -> Candidates {
    let n = config.resample_count;
    let resampled = resample(points, n);
    let closed = is_closed(&resampled, config.closure_threshold_ratio);
    let epsilon = config.rdp_epsilon_multiplier * stroke_width;

    Candidates {
        circle: if closed { circle::fit(&resampled, n) } else { None },
        ellipse: if closed { ellipse::fit(&resampled, n) } else { None },
        rectangle: rect::fit_rectangle(&resampled, n),
        square: rect::fit_square(&resampled, n),
        polygon_or_star: polygon::fit(&resampled, epsilon, n),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_stroke_has_no_circle_or_ellipse_candidate() {
        let pts = vec![Point::new(0.0, 0.0), Point::new(100.0, 0.0), Point::new(100.0, 100.0)];
        let config = Config::default();
        let candidates = fit_all(&pts, 2.0, &config);
        assert!(candidates.circle.is_none());
        assert!(candidates.ellipse.is_none());
    }
}
