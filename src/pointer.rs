//! Multi-pointer event handler (spec.md §4.L)
//!
//! Tracks up to three concurrent pointers by system-assigned id, in the
//! order they arrive, and translates raw pointer input into the gesture
//! events consumed by [`crate::gesture::GestureState`]. The 250ms timer
//! itself is host-owned (spec.md §5): this tracker only computes when the
//! timer should be (re)armed and tells the caller, via [`check_timeout`],
//! whether a given tick is due.
//!
//! [`check_timeout`]: PointerTracker::check_timeout

use log::trace;

use crate::geometry::{distance, Point};
use crate::gesture::Event;

const MAX_POINTERS: usize = 3;

#[derive(Debug, Clone, Copy)]
struct PointerSlot {
    id: i64,
    position: Point,
    reference: Point,
}

/// Translates `pointerDown`/`pointerMove`/`pointerUp` (spec.md §6) into
/// `F1_DOWN`/`F2_DOWN`/`F3_DOWN`/`FINGER_MOVED_FAR`/`FINGER_UP` events.
#[derive(Debug, Clone)]
pub struct PointerTracker {
    slots: [Option<PointerSlot>; MAX_POINTERS],
    timeout_ms: u64,
    moved_far_threshold_px: f64,
    deadline_ms: Option<u64>,
}

const DOWN_EVENTS: [Event; MAX_POINTERS] = [Event::F1Down, Event::F2Down, Event::F3Down];

impl PointerTracker {
    pub fn new(timeout_ms: u64, moved_far_threshold_px: f64) -> Self {
        Self {
            slots: [None; MAX_POINTERS],
            timeout_ms,
            moved_far_threshold_px,
            deadline_ms: None,
        }
    }

    fn slot_index_of(&self, id: i64) -> Option<usize> {
        self.slots.iter().position(|s| s.map(|s| s.id) == Some(id))
    }

    fn occupied_count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    /// `now_ms` is a host-supplied monotonic timestamp, used only to arm
    /// the timeout deadline; the tracker holds no real clock.
    pub fn pointer_down(&mut self, id: i64, pos: Point, now_ms: u64) -> Vec<Event> {
        if self.slot_index_of(id).is_some() {
            // Re-delivered down for an already-tracked id: host misuse, ignored (spec §7 kind 4).
            return Vec::new();
        }
        let Some(free) = self.slots.iter().position(|s| s.is_none()) else {
            trace!("pointer_down: ignoring 4th+ concurrent finger id={id}");
            return Vec::new();
        };
        self.slots[free] = Some(PointerSlot { id, position: pos, reference: pos });
        self.deadline_ms = Some(now_ms + self.timeout_ms);
        trace!("pointer_down: slot={free} id={id}");
        vec![DOWN_EVENTS[free]]
    }

    pub fn pointer_move(&mut self, id: i64, pos: Point) -> Vec<Event> {
        let Some(idx) = self.slot_index_of(id) else {
            return Vec::new();
        };
        let slot = self.slots[idx].as_mut().unwrap();
        slot.position = pos;

        // Only the primary (slot 0) or secondary (slot 1) finger's motion
        // drives the marker / abort-detection logic (spec.md §4.L).
        if idx < 2 && distance(pos, slot.reference) > self.moved_far_threshold_px {
            slot.reference = pos;
            trace!("pointer_move: slot={idx} id={id} moved far");
            return vec![Event::FingerMovedFar];
        }
        Vec::new()
    }

    pub fn pointer_up(&mut self, id: i64) -> Vec<Event> {
        let Some(idx) = self.slot_index_of(id) else {
            return Vec::new();
        };
        self.slots[idx] = None;
        if self.occupied_count() == 0 {
            self.deadline_ms = None;
        }
        trace!("pointer_up: slot={idx} id={id}");
        vec![Event::FingerUp]
    }

    /// Called by the host's timer on every tick with the current time.
    /// Returns `Timeout` at most once per arm window.
    pub fn check_timeout(&mut self, now_ms: u64) -> Option<Event> {
        let deadline = self.deadline_ms?;
        if now_ms >= deadline {
            self.deadline_ms = None;
            Some(Event::Timeout)
        } else {
            None
        }
    }

    pub fn tracked_count(&self) -> usize {
        self.occupied_count()
    }

    /// The id currently occupying slot 0 (the primary finger), if any.
    pub fn primary_id(&self) -> Option<i64> {
        self.slots[0].map(|s| s.id)
    }

    /// The current position of the primary finger, if any.
    pub fn primary_position(&self) -> Option<Point> {
        self.slots[0].map(|s| s.position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_three_pointers_assign_slots_in_order() {
        let mut t = PointerTracker::new(250, 30.0);
        assert_eq!(t.pointer_down(10, Point::zero(), 0), vec![Event::F1Down]);
        assert_eq!(t.pointer_down(20, Point::zero(), 0), vec![Event::F2Down]);
        assert_eq!(t.pointer_down(30, Point::zero(), 0), vec![Event::F3Down]);
    }

    #[test]
    fn fourth_finger_is_ignored() {
        let mut t = PointerTracker::new(250, 30.0);
        t.pointer_down(1, Point::zero(), 0);
        t.pointer_down(2, Point::zero(), 0);
        t.pointer_down(3, Point::zero(), 0);
        let actions = t.pointer_down(4, Point::zero(), 0);
        assert!(actions.is_empty());
        assert_eq!(t.tracked_count(), 3);
    }

    #[test]
    fn primary_finger_moving_far_emits_event_and_advances_reference() {
        let mut t = PointerTracker::new(250, 30.0);
        t.pointer_down(1, Point::new(0.0, 0.0), 0);
        let actions = t.pointer_move(1, Point::new(50.0, 0.0));
        assert_eq!(actions, vec![Event::FingerMovedFar]);
        // Reference advanced: a further small move does not refire.
        let actions = t.pointer_move(1, Point::new(55.0, 0.0));
        assert!(actions.is_empty());
    }

    #[test]
    fn third_finger_moving_far_does_not_emit() {
        let mut t = PointerTracker::new(250, 30.0);
        t.pointer_down(1, Point::zero(), 0);
        t.pointer_down(2, Point::zero(), 0);
        t.pointer_down(3, Point::zero(), 0);
        let actions = t.pointer_move(3, Point::new(500.0, 500.0));
        assert!(actions.is_empty());
    }

    #[test]
    fn pointer_up_frees_slot_for_reuse() {
        let mut t = PointerTracker::new(250, 30.0);
        t.pointer_down(1, Point::zero(), 0);
        assert_eq!(t.pointer_up(1), vec![Event::FingerUp]);
        assert_eq!(t.tracked_count(), 0);
        assert_eq!(t.pointer_down(2, Point::zero(), 0), vec![Event::F1Down]);
    }

    #[test]
    fn unknown_id_move_and_up_are_ignored() {
        let mut t = PointerTracker::new(250, 30.0);
        t.pointer_down(1, Point::zero(), 0);
        assert!(t.pointer_move(99, Point::new(1000.0, 1000.0)).is_empty());
        assert!(t.pointer_up(99).is_empty());
        assert_eq!(t.tracked_count(), 1);
    }

    #[test]
    fn timeout_fires_once_per_arm() {
        let mut t = PointerTracker::new(250, 30.0);
        t.pointer_down(1, Point::zero(), 1_000);
        assert!(t.check_timeout(1_100).is_none());
        assert_eq!(t.check_timeout(1_250), Some(Event::Timeout));
        assert!(t.check_timeout(2_000).is_none());
    }

    #[test]
    fn timeout_cancelled_once_all_fingers_up() {
        let mut t = PointerTracker::new(250, 30.0);
        t.pointer_down(1, Point::zero(), 1_000);
        t.pointer_up(1);
        assert!(t.check_timeout(5_000).is_none());
    }

    #[test]
    fn new_finger_down_rearms_timeout() {
        let mut t = PointerTracker::new(250, 30.0);
        t.pointer_down(1, Point::zero(), 1_000);
        t.pointer_down(2, Point::zero(), 1_100);
        assert!(t.check_timeout(1_250).is_none());
        assert_eq!(t.check_timeout(1_350), Some(Event::Timeout));
    }
}
