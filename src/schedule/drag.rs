//! Pointer gesture tracking for drag-to-reschedule.
//!
//! `Idle → Armed` on press over a bar, `Armed → Dragging` once the pointer has
//! moved further than the threshold, and release either commits a drop
//! (from `Dragging`) or reports a plain click (from `Armed`).

use egui::{Pos2, Vec2};

use crate::error::{Error, Result};
use crate::model::{Flight, TimelineViewport};
use crate::schedule::layout::{CellIndex, CellKey};

pub const DEFAULT_DRAG_THRESHOLD: f32 = 5.0;

/// Transient state of the one flight being dragged.
#[derive(Debug, Clone, PartialEq)]
pub struct DragSession {
    pub flight_id: String,
    pub origin: Pos2,
    pub origin_cell: CellKey,
    pub pointer: Pos2,
    /// Pointer position relative to the bar's departure edge at press time.
    pub grab: Vec2,
    /// Horizontal movement converted to whole minutes.
    pub delta_minutes: i32,
    /// Last cell the bar's departure edge was seen over while dragging.
    pub hover_cell: Option<CellKey>,
}

impl DragSession {
    pub fn offset(&self) -> Vec2 {
        self.pointer - self.origin
    }

    /// Where the departure edge of the moved bar currently is.
    pub fn anchor(&self) -> Pos2 {
        self.pointer - self.grab
    }

    /// Cell the flight would land in if released now.
    pub fn target_cell(&self) -> &CellKey {
        self.hover_cell.as_ref().unwrap_or(&self.origin_cell)
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum GestureState {
    #[default]
    Idle,
    Armed(DragSession),
    Dragging(DragSession),
}

/// Outcome of a pointer release.
#[derive(Debug, Clone, PartialEq)]
pub enum Release {
    /// No gesture was in progress.
    Idle,
    /// Movement stayed under the threshold.
    Click { flight_id: String },
    Drop {
        flight_id: String,
        delta_minutes: i32,
        target: CellKey,
    },
    /// The flight disappeared from the data set mid-gesture.
    Aborted { flight_id: String },
}

#[derive(Debug, Clone)]
pub struct DragGesture {
    state: GestureState,
    threshold: f32,
}

impl Default for DragGesture {
    fn default() -> Self {
        Self::new(DEFAULT_DRAG_THRESHOLD)
    }
}

impl DragGesture {
    pub fn new(threshold: f32) -> Self {
        Self {
            state: GestureState::Idle,
            threshold,
        }
    }

    pub fn state(&self) -> &GestureState {
        &self.state
    }

    pub fn session(&self) -> Option<&DragSession> {
        match &self.state {
            GestureState::Idle => None,
            GestureState::Armed(s) | GestureState::Dragging(s) => Some(s),
        }
    }

    pub fn is_active(&self) -> bool {
        !matches!(self.state, GestureState::Idle)
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, GestureState::Dragging(_))
    }

    /// Pointer pressed at `pos` over `flight_id`, whose bar starts at
    /// `anchor` inside `origin_cell`.
    pub fn press(
        &mut self,
        flight_id: &str,
        pos: Pos2,
        anchor: Pos2,
        origin_cell: CellKey,
    ) -> Result<()> {
        if self.is_active() {
            return Err(Error::DragInProgress);
        }
        tracing::debug!(flight = flight_id, "drag armed");
        self.state = GestureState::Armed(DragSession {
            flight_id: flight_id.to_string(),
            origin: pos,
            origin_cell,
            pointer: pos,
            grab: pos - anchor,
            delta_minutes: 0,
            hover_cell: None,
        });
        Ok(())
    }

    /// Pointer moved. Returns true while the gesture is a drag.
    pub fn move_to<C>(&mut self, pos: Pos2, viewport: &TimelineViewport, cells: &C) -> bool
    where
        C: CellIndex + ?Sized,
    {
        let state = std::mem::take(&mut self.state);
        self.state = match state {
            GestureState::Idle => GestureState::Idle,
            GestureState::Armed(mut session) => {
                session.pointer = pos;
                if session.origin.distance(pos) > self.threshold {
                    tracing::debug!(flight = %session.flight_id, "drag started");
                    Self::track(&mut session, viewport, cells);
                    GestureState::Dragging(session)
                } else {
                    GestureState::Armed(session)
                }
            }
            GestureState::Dragging(mut session) => {
                session.pointer = pos;
                Self::track(&mut session, viewport, cells);
                GestureState::Dragging(session)
            }
        };
        self.is_dragging()
    }

    fn track<C>(session: &mut DragSession, viewport: &TimelineViewport, cells: &C)
    where
        C: CellIndex + ?Sized,
    {
        session.delta_minutes = viewport.x_to_minutes(session.pointer.x - session.origin.x);
        // An overnight bar reaches into the next column; the cell is decided by
        // where the bar starts, not by where it was grabbed.
        if let Some(cell) = cells.cell_at(session.anchor()) {
            session.hover_cell = Some(cell);
        }
    }

    /// Pointer released at `pos`. The gesture always ends here.
    pub fn release<C>(
        &mut self,
        pos: Pos2,
        viewport: &TimelineViewport,
        cells: &C,
        flights: &[Flight],
    ) -> Release
    where
        C: CellIndex + ?Sized,
    {
        self.move_to(pos, viewport, cells);
        match std::mem::take(&mut self.state) {
            GestureState::Idle => Release::Idle,
            GestureState::Armed(session) | GestureState::Dragging(session)
                if !flights.iter().any(|f| f.id == session.flight_id) =>
            {
                tracing::debug!(flight = %session.flight_id, "dragged flight vanished, gesture aborted");
                Release::Aborted {
                    flight_id: session.flight_id,
                }
            }
            GestureState::Armed(session) => Release::Click {
                flight_id: session.flight_id,
            },
            GestureState::Dragging(session) => {
                let target = session.target_cell().clone();
                tracing::debug!(
                    flight = %session.flight_id,
                    delta = session.delta_minutes,
                    registration = %target.registration,
                    date = %target.date,
                    "drag released"
                );
                Release::Drop {
                    flight_id: session.flight_id,
                    delta_minutes: session.delta_minutes,
                    target,
                }
            }
        }
    }

    /// Abandon any gesture without producing a change.
    pub fn cancel(&mut self) {
        self.state = GestureState::Idle;
    }

    /// Minutes and pixel offset to draw `flight_id` at while it is dragged.
    pub fn preview(&self, flight_id: &str) -> Option<(i32, Vec2)> {
        match &self.state {
            GestureState::Dragging(s) if s.flight_id == flight_id => {
                Some((s.delta_minutes, s.offset()))
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Two columns of 1440 px, one row of 100 px, single registration.
    struct Grid;

    impl CellIndex for Grid {
        fn cell_at(&self, pos: Pos2) -> Option<CellKey> {
            if !(0.0..100.0).contains(&pos.y) {
                return None;
            }
            match pos.x {
                x if (0.0..1440.0).contains(&x) => Some(CellKey::new("A", "15/01")),
                x if (1440.0..2880.0).contains(&x) => Some(CellKey::new("A", "16/01")),
                _ => None,
            }
        }
    }

    fn vp() -> TimelineViewport {
        TimelineViewport::new(1440.0)
    }

    fn flights() -> Vec<Flight> {
        let mut f = Flight::new("F1", "A", "15/01", "10:00", "11:00").unwrap();
        f.id = "F1".into();
        vec![f]
    }

    fn armed() -> DragGesture {
        let mut g = DragGesture::new(5.0);
        let at = Pos2::new(600.0, 50.0);
        g.press("F1", at, at, CellKey::new("A", "15/01")).unwrap();
        g
    }

    #[test]
    fn test_press_arms_without_dragging() {
        let g = armed();
        assert!(g.is_active());
        assert!(!g.is_dragging());
        assert!(g.preview("F1").is_none());
    }

    #[test]
    fn test_movement_under_threshold_stays_armed() {
        let mut g = armed();
        assert!(!g.move_to(Pos2::new(603.0, 54.0), &vp(), &Grid));
        assert!(!g.move_to(Pos2::new(605.0, 50.0), &vp(), &Grid));
        assert!(matches!(g.state(), GestureState::Armed(_)));
    }

    #[test]
    fn test_crossing_threshold_by_one_starts_drag() {
        let mut g = armed();
        assert!(g.move_to(Pos2::new(606.0, 50.0), &vp(), &Grid));
        let (minutes, offset) = g.preview("F1").unwrap();
        assert_eq!(minutes, 6);
        assert_eq!(offset, Vec2::new(6.0, 0.0));
    }

    #[test]
    fn test_click_when_released_in_place() {
        let mut g = armed();
        let out = g.release(Pos2::new(600.0, 50.0), &vp(), &Grid, &flights());
        assert_eq!(out, Release::Click { flight_id: "F1".into() });
        assert!(!g.is_active());
    }

    #[test]
    fn test_drop_reports_delta_and_hovered_cell() {
        let mut g = armed();
        g.move_to(Pos2::new(700.0, 50.0), &vp(), &Grid);
        g.move_to(Pos2::new(1600.0, 50.0), &vp(), &Grid);
        let out = g.release(Pos2::new(2040.0, 50.0), &vp(), &Grid, &flights());
        assert_eq!(
            out,
            Release::Drop {
                flight_id: "F1".into(),
                delta_minutes: 1440,
                target: CellKey::new("A", "16/01"),
            }
        );
    }

    #[test]
    fn test_release_outside_grid_keeps_last_hovered_cell() {
        let mut g = armed();
        g.move_to(Pos2::new(1500.0, 50.0), &vp(), &Grid);
        let out = g.release(Pos2::new(1500.0, 500.0), &vp(), &Grid, &flights());
        match out {
            Release::Drop { target, .. } => assert_eq!(target, CellKey::new("A", "16/01")),
            other => panic!("expected drop, got {other:?}"),
        }
    }

    #[test]
    fn test_release_without_any_hovered_cell_falls_back_to_origin() {
        let mut g = armed();
        let out = g.release(Pos2::new(600.0, 900.0), &vp(), &Grid, &flights());
        match out {
            Release::Drop {
                target,
                delta_minutes,
                ..
            } => {
                assert_eq!(target, CellKey::new("A", "15/01"));
                assert_eq!(delta_minutes, 0);
            }
            other => panic!("expected drop, got {other:?}"),
        }
    }

    #[test]
    fn test_second_press_is_rejected_while_active() {
        let mut g = armed();
        g.move_to(Pos2::new(650.0, 50.0), &vp(), &Grid);
        let err = g
            .press("F2", Pos2::ZERO, Pos2::ZERO, CellKey::new("A", "15/01"))
            .unwrap_err();
        assert!(matches!(err, Error::DragInProgress));
        assert_eq!(g.session().unwrap().flight_id, "F1");
    }

    #[test]
    fn test_vanished_flight_aborts_silently() {
        let mut g = armed();
        g.move_to(Pos2::new(700.0, 50.0), &vp(), &Grid);
        let out = g.release(Pos2::new(700.0, 50.0), &vp(), &Grid, &[]);
        assert_eq!(out, Release::Aborted { flight_id: "F1".into() });
        assert!(!g.is_active());
    }

    #[test]
    fn test_release_when_idle() {
        let mut g = DragGesture::default();
        assert_eq!(
            g.release(Pos2::ZERO, &vp(), &Grid, &flights()),
            Release::Idle
        );
    }

    #[test]
    fn test_cancel_resets() {
        let mut g = armed();
        g.move_to(Pos2::new(700.0, 50.0), &vp(), &Grid);
        g.cancel();
        assert!(!g.is_active());
        assert!(g.preview("F1").is_none());
    }

    #[test]
    fn test_target_follows_bar_start_not_grab_point() {
        // 22:00-04:00 bar starting at x = 1320, grabbed past midnight
        let mut g = DragGesture::new(5.0);
        g.press(
            "F1",
            Pos2::new(1500.0, 50.0),
            Pos2::new(1320.0, 50.0),
            CellKey::new("A", "15/01"),
        )
        .unwrap();

        assert!(g.move_to(Pos2::new(1506.0, 50.0), &vp(), &Grid));
        let out = g.release(Pos2::new(1506.0, 50.0), &vp(), &Grid, &flights());
        assert_eq!(
            out,
            Release::Drop {
                flight_id: "F1".into(),
                delta_minutes: 6,
                target: CellKey::new("A", "15/01"),
            }
        );

        // moving the start itself past midnight does change the day
        g.press(
            "F1",
            Pos2::new(1500.0, 50.0),
            Pos2::new(1320.0, 50.0),
            CellKey::new("A", "15/01"),
        )
        .unwrap();
        g.move_to(Pos2::new(1650.0, 50.0), &vp(), &Grid);
        match g.release(Pos2::new(1650.0, 50.0), &vp(), &Grid, &flights()) {
            Release::Drop { target, .. } => assert_eq!(target, CellKey::new("A", "16/01")),
            other => panic!("expected drop, got {other:?}"),
        }
    }
}
