//! Gesture state machine (spec.md §4.K)
//!
//! A plain synchronous transition function: no coroutines, no hidden
//! timers. The caller is responsible for serializing event delivery
//! (spec.md §5) and for actually running the 250ms host timer that
//! delivers `Timeout` (spec.md §4.L).

/// The four gesture states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Idle,
    MovingMarker,
    Drawing,
    Transform,
}

/// Events delivered to the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    F1Down,
    F2Down,
    F3Down,
    FingerUp,
    FingerMovedFar,
    Timeout,
    Undo,
    Clear,
}

/// Actions the orchestrator must execute, in the order emitted
/// (spec.md §5).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    CreateStroke,
    SaveStroke,
    AbandonStroke,
    ProcessUndo,
    ProcessClear,
    MoveMarker,
    AbortTooManyFingers,
    InitTransform,
    EnterFreshStroke,
    SetTimeoutElapsed,
    SetMovedFar,
}

/// `{Idle, MovingMarker, Drawing, Transform}` plus the `freshStroke`
/// modifier and the two sticky flags `timeoutElapsed`/`movedFar`, which
/// reset on every finger-down event (spec.md §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GestureState {
    pub state: State,
    pub fresh_stroke: bool,
    pub timeout_elapsed: bool,
    pub moved_far: bool,
}

impl Default for GestureState {
    fn default() -> Self {
        Self {
            state: State::Idle,
            fresh_stroke: false,
            timeout_elapsed: false,
            moved_far: false,
        }
    }
}

impl GestureState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies `event`, mutating state in place, and returns the actions
    /// the orchestrator must run, in order.
    ///
    /// Every event has a transition: an event unlisted for the current
    /// state is a no-op (spec.md §7, kind 3) except in `Transform`, whose
    /// catch-all still records the appropriate sticky flag.
    pub fn apply(&mut self, event: Event) -> Vec<Action> {
        if matches!(event, Event::F1Down | Event::F2Down | Event::F3Down) {
            self.timeout_elapsed = false;
            self.moved_far = false;
        }

        let mut actions = Vec::new();

        match (self.state, event) {
            (State::Idle, Event::F1Down) => {
                self.state = State::MovingMarker;
            }
            (State::Idle, Event::Undo) => {
                actions.push(Action::ProcessUndo);
                self.fresh_stroke = false;
            }
            (State::Idle, Event::Clear) => {
                actions.push(Action::ProcessClear);
                self.fresh_stroke = false;
            }
            (State::Idle, Event::Timeout) => {
                self.timeout_elapsed = true;
                actions.push(Action::SetTimeoutElapsed);
            }

            (State::MovingMarker, Event::F2Down) => {
                self.state = State::Drawing;
                actions.push(Action::CreateStroke);
            }
            (State::MovingMarker, Event::F3Down) => {
                self.state = State::Idle;
                actions.push(Action::AbortTooManyFingers);
                self.fresh_stroke = false;
            }
            (State::MovingMarker, Event::FingerUp) => {
                self.state = State::Idle;
            }
            (State::MovingMarker, Event::FingerMovedFar) => {
                self.moved_far = true;
                actions.push(Action::MoveMarker);
                self.fresh_stroke = false;
            }
            (State::MovingMarker, Event::Undo) => {
                actions.push(Action::ProcessUndo);
                self.fresh_stroke = false;
            }
            (State::MovingMarker, Event::Clear) => {
                actions.push(Action::ProcessClear);
                self.fresh_stroke = false;
            }

            (State::Drawing, Event::F3Down) => {
                if self.moved_far {
                    actions.push(Action::SaveStroke);
                } else {
                    actions.push(Action::AbandonStroke);
                }
                actions.push(Action::InitTransform);
                self.state = State::Transform;
            }
            (State::Drawing, Event::FingerUp) => {
                actions.push(Action::SaveStroke);
                if !self.fresh_stroke {
                    actions.push(Action::EnterFreshStroke);
                }
                self.fresh_stroke = true;
                self.state = State::Idle;
            }
            (State::Drawing, Event::FingerMovedFar) => {
                self.moved_far = true;
                actions.push(Action::SetMovedFar);
            }
            (State::Drawing, Event::Undo) => {
                actions.push(Action::ProcessUndo);
                self.state = State::Idle;
                self.fresh_stroke = false;
            }
            (State::Drawing, Event::Clear) => {
                actions.push(Action::ProcessClear);
                self.state = State::Idle;
                self.fresh_stroke = false;
            }

            (State::Transform, Event::FingerUp) => {
                self.state = State::Idle;
            }
            (State::Transform, Event::Undo) => {
                actions.push(Action::ProcessUndo);
                self.state = State::Idle;
                self.fresh_stroke = false;
            }
            (State::Transform, Event::Clear) => {
                actions.push(Action::ProcessClear);
                self.state = State::Idle;
                self.fresh_stroke = false;
            }
            (State::Transform, other) => match other {
                Event::Timeout => {
                    self.timeout_elapsed = true;
                    actions.push(Action::SetTimeoutElapsed);
                }
                Event::FingerMovedFar => {
                    self.moved_far = true;
                    actions.push(Action::SetMovedFar);
                }
                _ => {}
            },

            _ => {}
        }

        actions
    }
}
