//! The timeline controller.
//!
//! [`GanttEngine`] owns every piece of transient scheduling state: the
//! viewport, the current layout, the drag session, the open change request
//! and the optimistic overrides. The flight list itself belongs to the
//! caller and is only ever replaced with what the store returns.

use std::sync::Arc;
use std::time::Duration;

use egui::{Pos2, Vec2};

use crate::error::{Error, Result};
use crate::model::{Flight, TimelineViewport};
use crate::notify::{Notice, Notifier};
use crate::schedule::change::{self, Edit};
use crate::schedule::confirm::{ChangeRequest, ConfirmationWorkflow};
use crate::schedule::drag::{DragGesture, Release, DEFAULT_DRAG_THRESHOLD};
use crate::schedule::layout::{GanttLayout, LayoutOptions};
use crate::schedule::pending::{PendingUpdate, UpdateCoordinator};
use crate::store::{Audit, FlightStore};

/// What the UI should do after a pointer release.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PointerOutcome {
    Nothing,
    /// A click on a flight: show its details.
    OpenDetails(String),
    /// A drop produced a change request; show the reason dialog.
    AwaitingConfirmation,
}

pub struct GanttEngine {
    pub viewport: TimelineViewport,
    pub options: LayoutOptions,
    gesture: DragGesture,
    workflow: ConfirmationWorkflow,
    coordinator: UpdateCoordinator,
    layout: GanttLayout,
    fleet: Vec<String>,
    changed_by: String,
}

impl GanttEngine {
    pub fn new(store: Arc<dyn FlightStore>) -> Self {
        Self {
            viewport: TimelineViewport::default(),
            options: LayoutOptions::default(),
            gesture: DragGesture::new(DEFAULT_DRAG_THRESHOLD),
            workflow: ConfirmationWorkflow::default(),
            coordinator: UpdateCoordinator::new(store),
            layout: GanttLayout::default(),
            fleet: Vec::new(),
            changed_by: "User".into(),
        }
    }

    pub fn with_viewport(mut self, viewport: TimelineViewport) -> Self {
        self.viewport = viewport;
        self
    }

    pub fn with_options(mut self, options: LayoutOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_drag_threshold(mut self, threshold: f32) -> Self {
        self.gesture = DragGesture::new(threshold);
        self
    }

    pub fn with_changed_by(mut self, changed_by: impl Into<String>) -> Self {
        self.changed_by = changed_by.into();
        self
    }

    pub fn set_changed_by(&mut self, changed_by: impl Into<String>) {
        self.changed_by = changed_by.into();
    }

    /// Tails that always get a timeline row, typically the active
    /// registrations.
    pub fn set_fleet(&mut self, fleet: Vec<String>) {
        self.fleet = fleet;
    }

    /// Flights as they should be displayed, overrides applied.
    pub fn display_flights(&self, flights: &[Flight]) -> Vec<Flight> {
        self.coordinator.overlay(flights)
    }

    /// Recompute the layout for this frame.
    pub fn relayout(&mut self, flights: &[Flight]) -> &GanttLayout {
        let shown = self.coordinator.overlay(flights);
        self.layout =
            GanttLayout::build_with_fleet(&shown, &self.fleet, &self.viewport, &self.options);
        &self.layout
    }

    pub fn layout(&self) -> &GanttLayout {
        &self.layout
    }

    pub fn gesture(&self) -> &DragGesture {
        &self.gesture
    }

    /// Minutes and pixel offset for drawing `flight_id` mid-drag.
    pub fn drag_preview(&self, flight_id: &str) -> Option<(i32, Vec2)> {
        self.gesture.preview(flight_id)
    }

    pub fn pending(&self, flight_id: &str) -> Option<&PendingUpdate> {
        self.coordinator.pending(flight_id)
    }

    pub fn is_busy(&self) -> bool {
        self.coordinator.in_flight() > 0
    }

    /// Pointer pressed at `pos` (grid coordinates). Returns whether a flight
    /// was grabbed.
    pub fn press(&mut self, pos: Pos2) -> Result<bool> {
        let Some(bar) = self.layout.bar_at(pos) else {
            return Ok(false);
        };
        if self.workflow.is_open() {
            return Err(Error::RequestOpen);
        }
        if self.coordinator.is_pending(&bar.flight_id) {
            return Err(Error::UpdateInFlight(bar.flight_id.clone()));
        }
        self.gesture
            .press(&bar.flight_id, pos, bar.rect.left_center(), bar.cell.clone())?;
        Ok(true)
    }

    /// Pointer moved. Returns true while a flight is being dragged.
    pub fn drag(&mut self, pos: Pos2) -> bool {
        self.gesture.move_to(pos, &self.viewport, &self.layout)
    }

    /// Pointer released. `flights` is the current list from the store.
    pub fn release(&mut self, pos: Pos2, flights: &[Flight]) -> Result<PointerOutcome> {
        match self
            .gesture
            .release(pos, &self.viewport, &self.layout, flights)
        {
            Release::Idle | Release::Aborted { .. } => Ok(PointerOutcome::Nothing),
            Release::Click { flight_id } => Ok(PointerOutcome::OpenDetails(flight_id)),
            Release::Drop {
                flight_id,
                delta_minutes,
                target,
            } => {
                let flight = find(flights, &flight_id)?;
                let edits = change::reschedule(flight, delta_minutes, &target)?;
                match ChangeRequest::edit(flight, edits) {
                    Some(request) => {
                        self.submit(request)?;
                        Ok(PointerOutcome::AwaitingConfirmation)
                    }
                    None => Ok(PointerOutcome::Nothing),
                }
            }
        }
    }

    pub fn cancel_drag(&mut self) {
        self.gesture.cancel();
    }

    /// Ask to apply `edits` to `flight`. Returns false when nothing would
    /// change.
    pub fn request_edit(&mut self, flight: &Flight, edits: Vec<Edit>) -> Result<bool> {
        let edits = change::normalize(flight, edits);
        // validate before anything is staged
        change::preview(flight, &edits)?;
        match ChangeRequest::edit(flight, edits) {
            Some(request) => {
                self.submit(request)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub fn request_delete(&mut self, flight: &Flight) -> Result<()> {
        self.submit(ChangeRequest::delete(flight))
    }

    fn submit(&mut self, request: ChangeRequest) -> Result<()> {
        if self.workflow.is_open() {
            return Err(Error::RequestOpen);
        }
        let staged = match &request.mutation {
            change::Mutation::Edit(_) => {
                self.coordinator
                    .stage(&request.flight_id, request.mutation.clone())?;
                true
            }
            change::Mutation::Delete if self.coordinator.is_pending(&request.flight_id) => {
                return Err(Error::UpdateInFlight(request.flight_id.clone()));
            }
            change::Mutation::Delete => false,
        };
        let flight_id = request.flight_id.clone();
        if let Err(e) = self.workflow.open(request) {
            if staged {
                self.coordinator.discard(&flight_id);
            }
            return Err(e);
        }
        Ok(())
    }

    /// The change awaiting confirmation, if any.
    pub fn open_request(&self) -> Option<&ChangeRequest> {
        self.workflow.current()
    }

    /// Confirm the open request with `reason` and hand it to the store.
    pub fn confirm(&mut self, reason: &str, notifier: &mut dyn Notifier) -> Result<()> {
        let Some((request, reason)) = self.workflow.confirm(reason) else {
            return Ok(());
        };
        let flight_id = request.flight_id.clone();
        let audit = Audit::new(self.changed_by.clone(), &reason);
        if let Err(e) = self.coordinator.dispatch(request, audit) {
            self.coordinator.discard(&flight_id);
            notifier.notify(Notice::error(e.to_string()));
            return Err(e);
        }
        Ok(())
    }

    /// Discard the open request and any override it staged.
    pub fn cancel(&mut self) {
        if let Some(request) = self.workflow.cancel() {
            self.coordinator.discard(&request.flight_id);
        }
    }

    /// Drain settled changes; returns a refetched flight list when one
    /// arrived.
    pub fn poll(&mut self, notifier: &mut dyn Notifier) -> Option<Vec<Flight>> {
        self.coordinator.poll(notifier)
    }

    /// Block until outstanding changes settle.
    pub fn wait_idle(
        &mut self,
        notifier: &mut dyn Notifier,
        timeout: Duration,
    ) -> Option<Vec<Flight>> {
        self.coordinator.wait_idle(notifier, timeout)
    }
}

fn find<'a>(flights: &'a [Flight], id: &str) -> Result<&'a Flight> {
    flights
        .iter()
        .find(|f| f.id == id)
        .ok_or_else(|| Error::NotFound(id.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FlightDataset, FlightField};
    use crate::store::DatasetStore;

    fn setup() -> (GanttEngine, Vec<Flight>) {
        let mut f = Flight::new("ROM001", "A", "15/01", "10:00", "11:00").unwrap();
        f.id = "F1".into();
        let mut g = Flight::new("ROM002", "A", "16/01", "08:00", "09:00").unwrap();
        g.id = "F2".into();
        let flights = vec![f, g];
        let store = Arc::new(DatasetStore::in_memory(FlightDataset::new(flights.clone())));
        let mut engine = GanttEngine::new(store).with_viewport(TimelineViewport::new(1440.0));
        engine.relayout(&flights);
        (engine, flights)
    }

    fn centre(engine: &GanttEngine, id: &str) -> Pos2 {
        engine.layout().bar(id).unwrap().rect.center()
    }

    #[test_log::test]
    fn test_cancel_rolls_back_override() {
        let (mut engine, flights) = setup();
        let start = centre(&engine, "F1");
        engine.press(start).unwrap();
        engine.drag(start + Vec2::new(60.0, 0.0));
        let outcome = engine.release(start + Vec2::new(60.0, 0.0), &flights).unwrap();
        assert_eq!(outcome, PointerOutcome::AwaitingConfirmation);
        assert_eq!(engine.display_flights(&flights)[0].std, "11:00");

        engine.cancel();
        assert!(engine.open_request().is_none());
        assert_eq!(engine.display_flights(&flights)[0].std, "10:00");
    }

    #[test_log::test]
    fn test_pending_flight_cannot_be_grabbed() {
        let (mut engine, flights) = setup();
        engine
            .request_edit(
                &flights[0],
                vec![Edit::field(FlightField::FlightPositioning, "ferry_flight")],
            )
            .unwrap();
        engine.relayout(&flights);
        let err = engine.press(centre(&engine, "F1")).unwrap_err();
        assert!(matches!(err, Error::RequestOpen));

        let mut notices = Vec::new();
        engine.confirm("", &mut notices).unwrap();
        // pending until settled changes are drained
        let err = engine.press(centre(&engine, "F1")).unwrap_err();
        assert!(matches!(err, Error::UpdateInFlight(_)));

        let refreshed = engine
            .wait_idle(&mut notices, Duration::from_secs(5))
            .unwrap();
        engine.relayout(&refreshed);
        assert!(engine.press(centre(&engine, "F1")).unwrap());
    }

    #[test_log::test]
    fn test_noop_edit_opens_nothing() {
        let (mut engine, flights) = setup();
        let changed = engine
            .request_edit(&flights[0], vec![Edit::field(FlightField::Registration, "A")])
            .unwrap();
        assert!(!changed);
        assert!(engine.open_request().is_none());
    }

    #[test_log::test]
    fn test_invalid_edit_is_rejected_before_staging() {
        let (mut engine, flights) = setup();
        let err = engine
            .request_edit(
                &flights[0],
                vec![Edit::Times {
                    std: "9:00".into(),
                    sta: "11:00".into(),
                }],
            )
            .unwrap_err();
        assert!(matches!(err, Error::InvalidTime(_)));
        assert!(engine.pending("F1").is_none());
    }

    #[test_log::test]
    fn test_delete_goes_through_confirmation() {
        let (mut engine, flights) = setup();
        engine.request_delete(&flights[1]).unwrap();
        assert!(engine.open_request().unwrap().is_delete());
        assert!(matches!(
            engine.request_delete(&flights[0]),
            Err(Error::RequestOpen)
        ));

        let mut notices = Vec::new();
        engine.confirm("Reactionary", &mut notices).unwrap();
        let refreshed = engine
            .wait_idle(&mut notices, Duration::from_secs(5))
            .unwrap();
        assert_eq!(refreshed.len(), 1);
        assert_eq!(notices, vec![Notice::success("Flight ROM002 deleted")]);
    }
}
