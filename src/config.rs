//! Runtime configuration
//!
//! A single explicit record threaded through the orchestrator and every
//! fitter. There is no global mutable state (spec.md §9).

use serde::{Deserialize, Serialize};

/// Per-shape-type normalized-error tolerances used by the selector (spec.md §4.J).
///
/// These constants are not specified by the source material; they were
/// chosen empirically against the literal scenarios in spec.md §8 and
/// documented in DESIGN.md.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tolerances {
    pub circle: f64,
    pub ellipse: f64,
    pub square: f64,
    pub rectangle: f64,
    pub polygon: f64,
    pub star: f64,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            circle: 0.04,
            ellipse: 0.05,
            square: 0.05,
            rectangle: 0.06,
            polygon: 0.08,
            star: 0.10,
        }
    }
}

/// Recognized configuration options (spec.md §6)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Idle-after-finger-down interval triggering `TIMEOUT`, in milliseconds.
    pub timeout_ms: u64,
    /// Minimum displacement to emit `FINGER_MOVED_FAR`, in pixels.
    pub moved_far_threshold_px: f64,
    /// First-to-last distance as a fraction of bounding-box max dimension
    /// below which a stroke is closed.
    pub closure_threshold_ratio: f64,
    /// Polyline simplification tolerance in units of stroke width.
    pub rdp_epsilon_multiplier: f64,
    /// Resampled point count, and the shape-sampling count used by the
    /// shape-error metric.
    pub resample_count: usize,
    /// Per-shape error tolerances.
    pub tolerances: Tolerances,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            timeout_ms: 250,
            moved_far_threshold_px: 30.0,
            closure_threshold_ratio: 0.15,
            rdp_epsilon_multiplier: 2.0,
            resample_count: 64,
            tolerances: Tolerances::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_spec() {
        let c = Config::default();
        assert_eq!(c.timeout_ms, 250);
        assert_eq!(c.moved_far_threshold_px, 30.0);
        assert_eq!(c.closure_threshold_ratio, 0.15);
        assert_eq!(c.rdp_epsilon_multiplier, 2.0);
        assert_eq!(c.resample_count, 64);
    }
}
