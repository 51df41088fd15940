#[cfg(test)]
mod gantt_scenarios {
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use egui::{vec2, Pos2};

    use flight_gantt_app::model::{ActivityEntry, Flight, FlightDataset, FlightField};
    use flight_gantt_app::notify::{Notice, NoticeKind};
    use flight_gantt_app::schedule::{Edit, GanttEngine, GestureState, PointerOutcome};
    use flight_gantt_app::store::{Audit, DatasetStore, FlightStore};
    use flight_gantt_app::{Error, Result};

    // ========================================================================
    // 1. Setup
    // ========================================================================

    /// Dataset store that counts mutations and can be told to fail them.
    struct RecordingStore {
        inner: DatasetStore,
        writes: AtomicUsize,
        failing: AtomicBool,
    }

    impl RecordingStore {
        fn new(flights: Vec<Flight>) -> Self {
            Self {
                inner: DatasetStore::in_memory(FlightDataset::new(flights)),
                writes: AtomicUsize::new(0),
                failing: AtomicBool::new(false),
            }
        }

        fn writes(&self) -> usize {
            self.writes.load(Ordering::SeqCst)
        }

        fn write(&self) -> Result<()> {
            self.writes.fetch_add(1, Ordering::SeqCst);
            if self.failing.load(Ordering::SeqCst) {
                return Err(Error::Storage("backend unavailable".into()));
            }
            Ok(())
        }
    }

    impl FlightStore for RecordingStore {
        fn fetch_flights(&self) -> Result<Vec<Flight>> {
            self.inner.fetch_flights()
        }

        fn update_flight_times(&self, id: &str, std: &str, sta: &str, audit: &Audit) -> Result<()> {
            self.write()?;
            self.inner.update_flight_times(id, std, sta, audit)
        }

        fn update_field(
            &self,
            id: &str,
            field: FlightField,
            value: &str,
            audit: &Audit,
        ) -> Result<()> {
            self.write()?;
            self.inner.update_field(id, field, value, audit)
        }

        fn delete_flight(&self, id: &str, audit: &Audit) -> Result<()> {
            self.write()?;
            self.inner.delete_flight(id, audit)
        }

        fn activity_log(&self, flight_id: Option<&str>) -> Result<Vec<ActivityEntry>> {
            self.inner.activity_log(flight_id)
        }
    }

    fn flight(id: &str, no: &str, reg: &str, date: &str, std: &str, sta: &str) -> Flight {
        let mut f = Flight::new(no, reg, date, std, sta).unwrap();
        f.id = id.into();
        f
    }

    /// Registration A over 15/01 and 16/01 at the default 480 px day width,
    /// i.e. 3 minutes per pixel.
    fn setup() -> (GanttEngine, Arc<RecordingStore>, Vec<Flight>) {
        setup_with(vec![
            flight("F1", "ROM001", "A", "15/01", "10:00", "11:00"),
            flight("F2", "ROM002", "A", "15/01", "14:00", "15:00"),
            flight("F3", "ROM003", "A", "16/01", "08:00", "09:00"),
        ])
    }

    fn setup_with(fleet: Vec<Flight>) -> (GanttEngine, Arc<RecordingStore>, Vec<Flight>) {
        let store = Arc::new(RecordingStore::new(fleet));
        let mut engine = GanttEngine::new(store.clone()).with_changed_by("ops");
        let flights = store.fetch_flights().unwrap();
        engine.relayout(&flights);
        (engine, store, flights)
    }

    fn bar_center(engine: &GanttEngine, id: &str) -> Pos2 {
        engine.layout().bar(id).expect("bar laid out").rect.center()
    }

    fn settle(engine: &mut GanttEngine, notices: &mut Vec<Notice>) -> Vec<Flight> {
        engine
            .wait_idle(notices, Duration::from_secs(5))
            .expect("refetched flight list")
    }

    fn by_id<'a>(flights: &'a [Flight], id: &str) -> Option<&'a Flight> {
        flights.iter().find(|f| f.id == id)
    }

    // ========================================================================
    // 2. Scenarios
    // ========================================================================

    #[test_log::test]
    fn test_movement_within_threshold_is_a_click() {
        let (mut engine, store, flights) = setup();
        let start = bar_center(&engine, "F1");

        // [Act] total displacement exactly at the 5 px threshold
        assert!(engine.press(start).unwrap());
        assert!(!engine.drag(start + vec2(5.0, 0.0)));
        assert!(matches!(engine.gesture().state(), GestureState::Armed(_)));
        let outcome = engine.release(start + vec2(3.0, 4.0), &flights).unwrap();

        // [Assert]
        assert_eq!(outcome, PointerOutcome::OpenDetails("F1".into()));
        assert!(engine.open_request().is_none());
        assert!(engine.pending("F1").is_none());
        assert_eq!(store.writes(), 0);
    }

    #[test_log::test]
    fn test_exceeding_threshold_by_one_starts_a_drag() {
        let (mut engine, store, _) = setup();
        let start = bar_center(&engine, "F1");

        engine.press(start).unwrap();
        assert!(engine.drag(start + vec2(6.0, 0.0)));
        assert!(matches!(engine.gesture().state(), GestureState::Dragging(_)));
        assert_eq!(engine.drag_preview("F1").map(|(minutes, _)| minutes), Some(18));

        engine.cancel_drag();
        assert!(!engine.gesture().is_active());
        assert_eq!(store.writes(), 0);
    }

    #[test_log::test]
    fn test_click_opens_details_without_persistence() {
        let (mut engine, store, flights) = setup();
        let at = bar_center(&engine, "F3");

        engine.press(at).unwrap();
        let outcome = engine.release(at, &flights).unwrap();

        assert_eq!(outcome, PointerOutcome::OpenDetails("F3".into()));
        assert!(engine.wait_idle(&mut Vec::new(), Duration::from_millis(10)).is_none());
        assert_eq!(store.writes(), 0);
    }

    #[test_log::test]
    fn test_simple_drag_moves_times_only() {
        let (mut engine, store, flights) = setup();
        let start = bar_center(&engine, "F1");

        // [Act] +40 px is +120 minutes, staying in (A, 15/01)
        engine.press(start).unwrap();
        engine.drag(start + vec2(20.0, 0.0));
        let outcome = engine.release(start + vec2(40.0, 0.0), &flights).unwrap();
        assert_eq!(outcome, PointerOutcome::AwaitingConfirmation);

        let request = engine.open_request().expect("change request").clone();
        assert_eq!(request.changes, ["Time: 10:00-11:00 → 12:00-13:00"]);
        assert_eq!(
            request.edits(),
            [Edit::Times {
                std: "12:00".into(),
                sta: "13:00".into()
            }]
        );

        // the override is visible before anything is persisted
        let shown = engine.display_flights(&flights);
        let f1 = by_id(&shown, "F1").unwrap();
        assert_eq!((f1.std.as_str(), f1.sta.as_str(), f1.date.as_str()), ("12:00", "13:00", "15/01"));
        assert_eq!(store.writes(), 0);

        // [Act] confirm and let the worker finish
        let mut notices = Vec::new();
        engine.confirm("Weather", &mut notices).unwrap();
        let refreshed = settle(&mut engine, &mut notices);

        // [Assert]
        let f1 = by_id(&refreshed, "F1").unwrap();
        assert_eq!((f1.std.as_str(), f1.sta.as_str()), ("12:00", "13:00"));
        assert_eq!(f1.registration, "A");
        assert_eq!(f1.date, "15/01");
        assert_eq!(store.writes(), 1);
        assert!(engine.pending("F1").is_none());
        assert!(!engine.is_busy());
        assert_eq!(notices, [Notice::success("Flight ROM001 updated")]);

        let log = store.activity_log(Some("F1")).unwrap();
        assert_eq!(log.len(), 2);
        assert!(log.iter().all(|e| e.reason.as_deref() == Some("Weather")));
        assert!(log.iter().all(|e| e.changed_by == "ops"));
    }

    #[test_log::test]
    fn test_overnight_bar_grabbed_past_midnight_keeps_its_date() {
        let (mut engine, store, flights) = setup_with(vec![
            flight("N1", "ROM900", "A", "15/01", "22:00", "04:00"),
            flight("F3", "ROM003", "A", "16/01", "08:00", "09:00"),
        ]);
        let bar = engine.layout().bar("N1").unwrap().rect;
        // 22:00 starts at x = 440 and the bar runs 120 px into 16/01
        assert!(bar.right() > 480.0);
        let grab = Pos2::new(520.0, bar.center().y);
        assert_eq!(engine.layout().bar_at(grab).map(|b| b.flight_id.as_str()), Some("N1"));

        engine.press(grab).unwrap();
        assert!(engine.drag(grab + vec2(6.0, 0.0)));
        let outcome = engine.release(grab + vec2(6.0, 0.0), &flights).unwrap();

        assert_eq!(outcome, PointerOutcome::AwaitingConfirmation);
        let request = engine.open_request().unwrap();
        assert_eq!(request.changes, ["Time: 22:00-04:00 → 22:18-04:18"]);
        assert_eq!(store.writes(), 0);
    }

    #[test_log::test]
    fn test_cross_cell_drop_changes_date_only() {
        let (mut engine, store, flights) = setup();
        let start = bar_center(&engine, "F2");

        // [Act] one full day width to the right lands in (A, 16/01)
        engine.press(start).unwrap();
        let outcome = engine.release(start + vec2(480.0, 0.0), &flights).unwrap();
        assert_eq!(outcome, PointerOutcome::AwaitingConfirmation);

        // [Assert]
        let request = engine.open_request().unwrap().clone();
        assert_eq!(request.changes, ["Date: 15/01 → 16/01"]);
        assert!(!request.description().contains("Registration"));

        let mut notices = Vec::new();
        engine.confirm("", &mut notices).unwrap();
        let refreshed = settle(&mut engine, &mut notices);
        let f2 = by_id(&refreshed, "F2").unwrap();
        assert_eq!((f2.date.as_str(), f2.std.as_str(), f2.registration.as_str()), ("16/01", "14:00", "A"));
        assert_eq!(store.writes(), 1);

        let log = store.activity_log(Some("F2")).unwrap();
        assert_eq!(log[0].field_name, "date");
        assert_eq!(log[0].reason, None);
    }

    #[test_log::test]
    fn test_drop_onto_registered_tail_without_flights() {
        let (mut engine, store, flights) = setup();
        engine.set_fleet(vec!["A".into(), "B".into()]);
        engine.relayout(&flights);
        let row_b = engine.layout().row("B").expect("empty fleet row").clone();
        assert_eq!(row_b.flight_count, 0);

        let start = bar_center(&engine, "F1");
        engine.press(start).unwrap();
        let outcome = engine
            .release(Pos2::new(start.x, row_b.top + row_b.height / 2.0), &flights)
            .unwrap();
        assert_eq!(outcome, PointerOutcome::AwaitingConfirmation);
        assert_eq!(engine.open_request().unwrap().changes, ["Registration: A → B"]);

        let mut notices = Vec::new();
        engine.confirm("", &mut notices).unwrap();
        let refreshed = settle(&mut engine, &mut notices);
        assert_eq!(by_id(&refreshed, "F1").unwrap().registration, "B");
        assert_eq!(store.writes(), 1);
    }

    #[test_log::test]
    fn test_failed_persistence_clears_override() {
        let (mut engine, store, flights) = setup();
        store.failing.store(true, Ordering::SeqCst);
        let start = bar_center(&engine, "F1");

        engine.press(start).unwrap();
        engine.release(start + vec2(40.0, 0.0), &flights).unwrap();
        let mut notices = Vec::new();
        engine.confirm("Technical and Aircraft Equipment", &mut notices).unwrap();
        assert!(engine.pending("F1").is_some());

        let refreshed = settle(&mut engine, &mut notices);

        // [Assert] pending gone, display back to the stored value
        assert!(engine.pending("F1").is_none());
        let shown = engine.display_flights(&refreshed);
        assert_eq!(by_id(&shown, "F1").unwrap().std, "10:00");
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].kind, NoticeKind::Error);
        assert!(notices[0].message.contains("Failed to update flight ROM001"));
        assert!(notices[0].message.contains("backend unavailable"));

        // the flight can be dragged again
        engine.relayout(&refreshed);
        assert!(engine.press(bar_center(&engine, "F1")).unwrap());
    }

    #[test_log::test]
    fn test_flight_deleted_before_confirmation() {
        let (mut engine, store, flights) = setup();
        let start = bar_center(&engine, "F1");

        engine.press(start).unwrap();
        engine.release(start + vec2(40.0, 0.0), &flights).unwrap();

        // someone else removes the flight while the dialog is open
        store.inner.delete_flight("F1", &Audit::new("night shift", "")).unwrap();

        let mut notices = Vec::new();
        engine.confirm("Reactionary", &mut notices).unwrap();
        let refreshed = settle(&mut engine, &mut notices);

        assert!(by_id(&refreshed, "F1").is_none());
        assert!(engine.pending("F1").is_none());
        assert_eq!(notices[0].kind, NoticeKind::Error);
        assert!(notices[0].message.contains("ROM001"));
    }

    #[test_log::test]
    fn test_release_after_flight_vanished_is_ignored() {
        let (mut engine, store, flights) = setup();
        let start = bar_center(&engine, "F1");
        let remaining: Vec<Flight> = flights.into_iter().filter(|f| f.id != "F1").collect();

        engine.press(start).unwrap();
        engine.drag(start + vec2(40.0, 0.0));
        let outcome = engine.release(start + vec2(40.0, 0.0), &remaining).unwrap();

        assert_eq!(outcome, PointerOutcome::Nothing);
        assert!(engine.open_request().is_none());
        assert!(engine.pending("F1").is_none());
        assert_eq!(store.writes(), 0);
    }

    #[test_log::test]
    fn test_cancelled_request_persists_nothing() {
        let (mut engine, store, flights) = setup();
        let start = bar_center(&engine, "F1");

        engine.press(start).unwrap();
        engine.release(start + vec2(40.0, 0.0), &flights).unwrap();
        engine.cancel();

        assert!(engine.open_request().is_none());
        assert_eq!(by_id(&engine.display_flights(&flights), "F1").unwrap().std, "10:00");
        assert!(!engine.is_busy());
        assert_eq!(store.writes(), 0);
    }
}
