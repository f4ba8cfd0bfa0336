//! Orchestrator (spec.md §4.N)
//!
//! Owns every piece of cross-component mutable state: the stroke history,
//! the live in-progress stroke, the gesture state machine, and the
//! pointer tracker. Pointer/command input goes in; a stream of
//! [`RenderHint`] values comes out. This is the crate's only stateful
//! entry point — everything else is pure functions over point lists.

use log::debug;
use serde::Serialize;
use uuid::Uuid;

use crate::config::Config;
use crate::error::CoreError;
use crate::geometry::Point;
use crate::gesture::{self, Action, Event, GestureState};
use crate::pointer::PointerTracker;
use crate::select;
use crate::shape::{Color, Shape, Stroke};
use crate::store::StrokeHistory;

/// What the core emits to the outside world (spec.md §6). The renderer is
/// free to draw these however it pleases.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum RenderHint {
    MarkerAt(Point, Color, f64),
    LiveStroke(Color, f64, Vec<Point>),
    /// Accompanied by the id of the stroke that produced it, so a host can
    /// correlate a committed shape back to its originating gesture.
    CommittedShape(Shape, Uuid),
    HistoryReplaced(Vec<Shape>),
}

/// Glues components A-M into the stateful core described by spec.md §4.N.
pub struct Orchestrator {
    config: Config,
    gesture: GestureState,
    pointers: PointerTracker,
    history: StrokeHistory,
    live: Option<Stroke>,
    pen_color: Color,
    pen_width: f64,
    marker_position: Point,
}

impl Orchestrator {
    pub fn new(config: Config) -> Self {
        let pointers = PointerTracker::new(config.timeout_ms, config.moved_far_threshold_px);
        Self {
            config,
            gesture: GestureState::new(),
            pointers,
            history: StrokeHistory::new(),
            live: None,
            pen_color: Color::default(),
            pen_width: 2.0,
            marker_position: Point::zero(),
        }
    }

    pub fn set_pen(&mut self, color: Color, width: f64) {
        self.pen_color = color;
        self.pen_width = width;
    }

    pub fn history(&self) -> &StrokeHistory {
        &self.history
    }

    pub fn is_fresh_stroke(&self) -> bool {
        self.gesture.fresh_stroke
    }

    pub fn pointer_down(&mut self, id: i64, pos: Point, now_ms: u64) -> Vec<RenderHint> {
        self.marker_position = pos;
        let events = self.pointers.pointer_down(id, pos, now_ms);
        self.drain_events(events)
    }

    pub fn pointer_move(&mut self, id: i64, pos: Point) -> Vec<RenderHint> {
        self.marker_position = pos;
        let mut hints = Vec::new();
        if self.is_primary_drawing(id) {
            if let Some(stroke) = &mut self.live {
                stroke.push(pos);
                hints.push(RenderHint::LiveStroke(stroke.color, stroke.width, stroke.points.clone()));
            }
        }
        let events = self.pointers.pointer_move(id, pos);
        hints.extend(self.drain_events(events));
        hints
    }

    pub fn pointer_up(&mut self, id: i64) -> Vec<RenderHint> {
        let events = self.pointers.pointer_up(id);
        self.drain_events(events)
    }

    /// Host-driven timer tick (spec.md §5): delivers `TIMEOUT` if the
    /// pointer tracker's deadline has elapsed.
    pub fn tick_timeout(&mut self, now_ms: u64) -> Vec<RenderHint> {
        match self.pointers.check_timeout(now_ms) {
            Some(event) => self.drain_events(vec![event]),
            None => Vec::new(),
        }
    }

    pub fn undo(&mut self) -> Vec<RenderHint> {
        self.drain_events(vec![Event::Undo])
    }

    pub fn clear(&mut self) -> Vec<RenderHint> {
        self.drain_events(vec![Event::Clear])
    }

    /// Re-runs the shape pipeline on the top-of-stack shape's points,
    /// replacing it (spec.md §4.N). `RawPoints` and `Polyline` carry their
    /// own points directly; fitted shapes are re-sampled from their own
    /// boundary before re-fitting, which is a no-op refit in practice but
    /// keeps this operation total over every `Shape` variant.
    pub fn fit_last(&mut self) -> Result<(), CoreError> {
        if self.history.is_empty() {
            return Err(CoreError::EmptyHistory);
        }
        let points = {
            let top = self.history.top().expect("checked non-empty above");
            source_points(top)
        };
        if points.len() < 2 {
            return Err(CoreError::EmptyStroke);
        }
        let refitted = select::select(&points, self.pen_width, &self.config);
        if let Some(top) = self.history.top_mut() {
            *top = refitted;
        }
        Ok(())
    }

    fn is_primary_drawing(&self, id: i64) -> bool {
        self.gesture.state == gesture::State::Drawing && self.primary_pointer_id() == Some(id)
    }

    fn primary_pointer_id(&self) -> Option<i64> {
        self.pointers.primary_id()
    }

    fn primary_position(&self) -> Point {
        self.pointers.primary_position().unwrap_or(self.marker_position)
    }

    fn drain_events(&mut self, events: Vec<Event>) -> Vec<RenderHint> {
        let mut hints = Vec::new();
        for event in events {
            let actions = self.gesture.apply(event);
            debug!("orchestrator: event={event:?} -> actions={actions:?}");
            for action in actions {
                hints.extend(self.run_action(action));
            }
        }
        hints
    }

    fn run_action(&mut self, action: Action) -> Vec<RenderHint> {
        match action {
            Action::CreateStroke => {
                let id = Uuid::new_v4();
                let start = self.primary_position();
                self.live = Some(Stroke::new(id, self.pen_color, self.pen_width, start));
                vec![RenderHint::LiveStroke(self.pen_color, self.pen_width, vec![start])]
            }
            Action::SaveStroke => self.commit_live_stroke(),
            Action::AbandonStroke => {
                self.live = None;
                Vec::new()
            }
            Action::ProcessUndo => {
                self.history.pop();
                vec![RenderHint::HistoryReplaced(self.history.as_slice().to_vec())]
            }
            Action::ProcessClear => {
                self.history.clear();
                vec![RenderHint::HistoryReplaced(self.history.as_slice().to_vec())]
            }
            Action::MoveMarker => vec![RenderHint::MarkerAt(self.marker_position, self.pen_color, self.pen_width)],
            Action::AbortTooManyFingers
            | Action::InitTransform
            | Action::EnterFreshStroke
            | Action::SetTimeoutElapsed
            | Action::SetMovedFar => Vec::new(),
        }
    }

    fn commit_live_stroke(&mut self) -> Vec<RenderHint> {
        let Some(stroke) = self.live.take() else {
            return Vec::new();
        };
        let shape = select::select(&stroke.points, stroke.width, &self.config);
        self.history.append(shape.clone());
        vec![RenderHint::CommittedShape(shape, stroke.id)]
    }
}

/// The point set a fitted `Shape` should be re-fit from.
fn source_points(shape: &Shape) -> Vec<Point> {
    match shape {
        Shape::RawPoints { points } | Shape::Polyline { vertices: points, .. } => points.clone(),
        other => {
            let size = other.size().unwrap_or(1.0).max(1.0);
            let n = (size.sqrt().ceil() as usize * 8).clamp(16, 256);
            sample_boundary(other, n)
        }
    }
}

fn sample_boundary(shape: &Shape, n: usize) -> Vec<Point> {
    use crate::fit::circle::CircleModel;
    use crate::fit::ellipse::EllipseModel;
    use crate::geometry::rotate_point;
    use crate::hausdorff::ShapeModel;
    use crate::resample::resample;

    match shape {
        Shape::Circle { center, radius, .. } => {
            CircleModel { center: *center, radius: *radius }.sample(n)
        }
        Shape::Ellipse { center, rx, ry, rotation, .. } => {
            EllipseModel { center: *center, rx: *rx, ry: *ry, rotation: *rotation }.sample(n)
        }
        Shape::Rectangle { center, width, height, rotation, .. } => {
            let (hw, hh) = (width / 2.0, height / 2.0);
            let local = [
                Point::new(-hw, -hh),
                Point::new(hw, -hh),
                Point::new(hw, hh),
                Point::new(-hw, hh),
            ];
            let corners: Vec<Point> =
                local.iter().map(|&l| rotate_point(center.add(l), *center, *rotation)).collect();
            resample(&closed(&corners), n)
        }
        Shape::Square { center, side, rotation, .. } => {
            let hw = side / 2.0;
            let local = [
                Point::new(-hw, -hw),
                Point::new(hw, -hw),
                Point::new(hw, hw),
                Point::new(-hw, hw),
            ];
            let corners: Vec<Point> =
                local.iter().map(|&l| rotate_point(center.add(l), *center, *rotation)).collect();
            resample(&closed(&corners), n)
        }
        Shape::EquilateralPolygon { center, radius, rotation, sides, .. } => {
            let vertices: Vec<Point> = (0..*sides)
                .map(|i| {
                    let t = *rotation + 2.0 * std::f64::consts::PI * i as f64 / *sides as f64;
                    center.add(Point::new(radius * t.cos(), radius * t.sin()))
                })
                .collect();
            resample(&closed(&vertices), n)
        }
        Shape::Star { center, outer_radius, inner_radius, rotation, points, .. } => {
            let k = points * 2;
            let vertices: Vec<Point> = (0..k)
                .map(|i| {
                    let r = if i % 2 == 0 { *outer_radius } else { *inner_radius };
                    let t = *rotation + 2.0 * std::f64::consts::PI * i as f64 / k as f64;
                    center.add(Point::new(r * t.cos(), r * t.sin()))
                })
                .collect();
            resample(&closed(&vertices), n)
        }
        Shape::RawPoints { .. } | Shape::Polyline { .. } => Vec::new(),
    }
}

fn closed(vertices: &[Point]) -> Vec<Point> {
    let mut v = vertices.to_vec();
    if let Some(&first) = vertices.first() {
        v.push(first);
    }
    v
}
