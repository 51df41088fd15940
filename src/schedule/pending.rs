//! Optimistic updates.
//!
//! A committed change is recorded here first so the timeline shows it at
//! once, then handed to a single persistence worker thread. When the worker
//! reports back (success or failure) the override is dropped and the freshly
//! fetched flight list takes over.

use std::collections::HashMap;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::error::{Error, Result};
use crate::model::Flight;
use crate::notify::{Notice, Notifier};
use crate::schedule::change::{self, Edit, Mutation};
use crate::schedule::confirm::ChangeRequest;
use crate::store::{Audit, FlightStore};

/// Display override for one flight until its change settles.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingUpdate {
    pub mutation: Mutation,
    /// Set once the change has been handed to the worker.
    pub dispatched: bool,
}

impl PendingUpdate {
    /// `flight` as it will look once the change lands. Deletions and edits
    /// that no longer apply leave it unchanged.
    pub fn apply_to(&self, flight: &Flight) -> Flight {
        match &self.mutation {
            Mutation::Edit(edits) => {
                change::preview(flight, edits).unwrap_or_else(|_| flight.clone())
            }
            Mutation::Delete => flight.clone(),
        }
    }
}

struct Job {
    flight_id: String,
    flight_no: String,
    changes: Vec<String>,
    mutation: Mutation,
    audit: Audit,
}

/// Result of one job, with the list refetched right after it.
struct Settlement {
    flight_id: String,
    flight_no: String,
    deleted: bool,
    outcome: Result<()>,
    flights: Option<Vec<Flight>>,
}

pub struct UpdateCoordinator {
    pending: HashMap<String, PendingUpdate>,
    jobs: Option<Sender<Job>>,
    settled: Receiver<Settlement>,
    worker: Option<JoinHandle<()>>,
    in_flight: usize,
}

impl UpdateCoordinator {
    pub fn new(store: Arc<dyn FlightStore>) -> Self {
        let (job_tx, job_rx) = mpsc::channel::<Job>();
        let (settled_tx, settled_rx) = mpsc::channel::<Settlement>();
        let spawned = thread::Builder::new()
            .name("flight-store".into())
            .spawn(move || run_worker(store, job_rx, settled_tx));
        let worker = match spawned {
            Ok(handle) => Some(handle),
            Err(e) => {
                tracing::error!(error = %e, "could not start persistence worker");
                None
            }
        };
        Self {
            pending: HashMap::new(),
            jobs: Some(job_tx),
            settled: settled_rx,
            worker,
            in_flight: 0,
        }
    }

    /// Record an override for `flight_id`. Only one change per flight may
    /// be outstanding.
    pub fn stage(&mut self, flight_id: &str, mutation: Mutation) -> Result<()> {
        if self.pending.contains_key(flight_id) {
            return Err(Error::UpdateInFlight(flight_id.to_string()));
        }
        self.pending.insert(
            flight_id.to_string(),
            PendingUpdate {
                mutation,
                dispatched: false,
            },
        );
        Ok(())
    }

    /// Roll back an override that was never dispatched.
    pub fn discard(&mut self, flight_id: &str) -> Option<PendingUpdate> {
        match self.pending.get(flight_id) {
            Some(p) if !p.dispatched => self.pending.remove(flight_id),
            _ => None,
        }
    }

    /// Send a confirmed request to the worker.
    pub fn dispatch(&mut self, request: ChangeRequest, audit: Audit) -> Result<()> {
        match self.pending.get_mut(&request.flight_id) {
            Some(p) if p.dispatched => {
                return Err(Error::UpdateInFlight(request.flight_id));
            }
            Some(p) => p.dispatched = true,
            None => {
                self.pending.insert(
                    request.flight_id.clone(),
                    PendingUpdate {
                        mutation: request.mutation.clone(),
                        dispatched: true,
                    },
                );
            }
        }

        let flight_id = request.flight_id.clone();
        tracing::info!(
            flight = %request.flight_no,
            change = %request.description(),
            reason = audit.reason.as_deref().unwrap_or(""),
            "dispatching change"
        );
        let job = Job {
            flight_id: request.flight_id,
            flight_no: request.flight_no,
            changes: request.changes,
            mutation: request.mutation,
            audit,
        };
        let sent = self
            .jobs
            .as_ref()
            .map(|tx| tx.send(job).is_ok())
            .unwrap_or(false);
        if !sent {
            self.pending.remove(&flight_id);
            return Err(Error::Storage("persistence worker is not running".into()));
        }
        self.in_flight += 1;
        Ok(())
    }

    pub fn pending(&self, flight_id: &str) -> Option<&PendingUpdate> {
        self.pending.get(flight_id)
    }

    pub fn is_pending(&self, flight_id: &str) -> bool {
        self.pending.contains_key(flight_id)
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Flights with every pending override applied.
    pub fn overlay(&self, flights: &[Flight]) -> Vec<Flight> {
        flights
            .iter()
            .map(|f| match self.pending.get(&f.id) {
                Some(p) => p.apply_to(f),
                None => f.clone(),
            })
            .collect()
    }

    /// Drain settled jobs without blocking. Returns the most recent refetched
    /// flight list, if any job settled.
    pub fn poll(&mut self, notifier: &mut dyn Notifier) -> Option<Vec<Flight>> {
        let mut latest = None;
        while let Ok(settlement) = self.settled.try_recv() {
            if let Some(flights) = self.settle(settlement, notifier) {
                latest = Some(flights);
            }
        }
        latest
    }

    /// Block until every dispatched job has settled or `timeout` elapses.
    pub fn wait_idle(
        &mut self,
        notifier: &mut dyn Notifier,
        timeout: Duration,
    ) -> Option<Vec<Flight>> {
        let deadline = Instant::now() + timeout;
        let mut latest = None;
        while self.in_flight > 0 {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.settled.recv_timeout(remaining) {
                Ok(settlement) => {
                    if let Some(flights) = self.settle(settlement, notifier) {
                        latest = Some(flights);
                    }
                }
                Err(RecvTimeoutError::Timeout) => {
                    tracing::warn!(in_flight = self.in_flight, "timed out waiting for persistence");
                    break;
                }
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }
        latest
    }

    fn settle(&mut self, s: Settlement, notifier: &mut dyn Notifier) -> Option<Vec<Flight>> {
        self.in_flight = self.in_flight.saturating_sub(1);
        match &s.outcome {
            Ok(()) if s.deleted => notifier.notify(Notice::success(format!(
                "Flight {} deleted",
                s.flight_no
            ))),
            Ok(()) => notifier.notify(Notice::success(format!(
                "Flight {} updated",
                s.flight_no
            ))),
            Err(e) => notifier.notify(Notice::error(format!(
                "Failed to update flight {}: {}",
                s.flight_no, e
            ))),
        }
        // cleared whatever the outcome; the refetched list is authoritative
        self.pending.remove(&s.flight_id);
        s.flights
    }
}

impl Drop for UpdateCoordinator {
    fn drop(&mut self) {
        self.jobs.take();
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                tracing::error!("persistence worker panicked");
            }
        }
    }
}

fn run_worker(store: Arc<dyn FlightStore>, jobs: Receiver<Job>, settled: Sender<Settlement>) {
    for job in jobs {
        let outcome = execute(store.as_ref(), &job);
        if let Err(e) = &outcome {
            tracing::error!(flight = %job.flight_no, error = %e, "change failed");
        }
        let flights = match store.fetch_flights() {
            Ok(flights) => Some(flights),
            Err(e) => {
                tracing::warn!(error = %e, "refetch after change failed");
                None
            }
        };
        let settlement = Settlement {
            deleted: job.mutation == Mutation::Delete,
            flight_id: job.flight_id,
            flight_no: job.flight_no,
            outcome,
            flights,
        };
        if settled.send(settlement).is_err() {
            break;
        }
    }
    tracing::debug!("persistence worker stopped");
}

/// Run one job's store calls in order. A failure after at least one call
/// succeeded is reported as a partial commit; nothing is rolled back.
fn execute(store: &dyn FlightStore, job: &Job) -> Result<()> {
    let edits = match &job.mutation {
        Mutation::Delete => return store.delete_flight(&job.flight_id, &job.audit),
        Mutation::Edit(edits) => edits,
    };

    for (i, edit) in edits.iter().enumerate() {
        let result = match edit {
            Edit::Times { std, sta } => {
                store.update_flight_times(&job.flight_id, std, sta, &job.audit)
            }
            Edit::Field { field, value } => {
                store.update_field(&job.flight_id, *field, value, &job.audit)
            }
        };
        if let Err(e) = result {
            if i == 0 {
                return Err(e);
            }
            return Err(Error::PartialCommit {
                applied: job.changes[..i.min(job.changes.len())].join(", "),
                source: Box::new(e),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::model::{ActivityEntry, FlightDataset, FlightField};
    use crate::notify::NoticeKind;
    use crate::store::DatasetStore;

    const WAIT: Duration = Duration::from_secs(5);

    fn flight() -> Flight {
        Flight::new("ROM001", "A", "15/01", "10:00", "11:00").unwrap()
    }

    fn times(std: &str, sta: &str) -> Edit {
        Edit::Times {
            std: std.into(),
            sta: sta.into(),
        }
    }

    /// Accepts time updates, rejects everything else.
    struct TimesOnly(DatasetStore);

    impl FlightStore for TimesOnly {
        fn fetch_flights(&self) -> Result<Vec<Flight>> {
            self.0.fetch_flights()
        }
        fn update_flight_times(&self, id: &str, std: &str, sta: &str, a: &Audit) -> Result<()> {
            self.0.update_flight_times(id, std, sta, a)
        }
        fn update_field(&self, _: &str, _: FlightField, _: &str, _: &Audit) -> Result<()> {
            Err(Error::Storage("backend unavailable".into()))
        }
        fn delete_flight(&self, _: &str, _: &Audit) -> Result<()> {
            Err(Error::Storage("backend unavailable".into()))
        }
        fn activity_log(&self, id: Option<&str>) -> Result<Vec<ActivityEntry>> {
            self.0.activity_log(id)
        }
    }

    /// Blocks every call until released, to observe in-flight state.
    struct Gate {
        inner: DatasetStore,
        open: Mutex<bool>,
        cv: std::sync::Condvar,
    }

    impl Gate {
        fn wait(&self) {
            let mut open = self.open.lock().unwrap();
            while !*open {
                open = self.cv.wait(open).unwrap();
            }
        }
        fn release(&self) {
            *self.open.lock().unwrap() = true;
            self.cv.notify_all();
        }
    }

    impl FlightStore for Gate {
        fn fetch_flights(&self) -> Result<Vec<Flight>> {
            self.inner.fetch_flights()
        }
        fn update_flight_times(&self, id: &str, std: &str, sta: &str, a: &Audit) -> Result<()> {
            self.wait();
            self.inner.update_flight_times(id, std, sta, a)
        }
        fn update_field(&self, id: &str, f: FlightField, v: &str, a: &Audit) -> Result<()> {
            self.wait();
            self.inner.update_field(id, f, v, a)
        }
        fn delete_flight(&self, id: &str, a: &Audit) -> Result<()> {
            self.wait();
            self.inner.delete_flight(id, a)
        }
        fn activity_log(&self, id: Option<&str>) -> Result<Vec<ActivityEntry>> {
            self.inner.activity_log(id)
        }
    }

    fn audit() -> Audit {
        Audit::new("ops", "Weather")
    }

    #[test_log::test]
    fn test_override_visible_until_settled() {
        let f = flight();
        let gate = Arc::new(Gate {
            inner: DatasetStore::in_memory(FlightDataset::new(vec![f.clone()])),
            open: Mutex::new(false),
            cv: std::sync::Condvar::new(),
        });
        let mut coordinator = UpdateCoordinator::new(gate.clone());

        let request = ChangeRequest::edit(&f, vec![times("12:00", "13:00")]).unwrap();
        coordinator.stage(&f.id, request.mutation.clone()).unwrap();
        let shown = coordinator.overlay(std::slice::from_ref(&f));
        assert_eq!(shown[0].std, "12:00");

        coordinator.dispatch(request, audit()).unwrap();
        let mut notices = Vec::new();
        assert!(coordinator.poll(&mut notices).is_none());
        assert!(coordinator.is_pending(&f.id));
        assert_eq!(coordinator.in_flight(), 1);

        gate.release();
        let flights = coordinator.wait_idle(&mut notices, WAIT).unwrap();
        assert!(!coordinator.is_pending(&f.id));
        assert_eq!(flights[0].std, "12:00");
        assert_eq!(notices, vec![Notice::success("Flight ROM001 updated")]);
    }

    #[test_log::test]
    fn test_second_change_for_same_flight_is_rejected() {
        let f = flight();
        let store = Arc::new(DatasetStore::in_memory(FlightDataset::new(vec![f.clone()])));
        let mut coordinator = UpdateCoordinator::new(store);
        coordinator.stage(&f.id, Mutation::Delete).unwrap();
        assert!(matches!(
            coordinator.stage(&f.id, Mutation::Delete),
            Err(Error::UpdateInFlight(_))
        ));
    }

    #[test_log::test]
    fn test_discard_rolls_back_undispatched_only() {
        let f = flight();
        let store = Arc::new(DatasetStore::in_memory(FlightDataset::new(vec![f.clone()])));
        let mut coordinator = UpdateCoordinator::new(store);
        coordinator
            .stage(&f.id, Mutation::Edit(vec![times("12:00", "13:00")]))
            .unwrap();
        assert!(coordinator.discard(&f.id).is_some());
        assert_eq!(coordinator.overlay(std::slice::from_ref(&f))[0].std, "10:00");
        assert_eq!(coordinator.pending_count(), 0);
    }

    #[test_log::test]
    fn test_partial_commit_is_reported_and_cleared() {
        let f = flight();
        let store = Arc::new(TimesOnly(DatasetStore::in_memory(FlightDataset::new(vec![
            f.clone(),
        ]))));
        let mut coordinator = UpdateCoordinator::new(store.clone());
        let request = ChangeRequest::edit(
            &f,
            vec![times("12:00", "13:00"), Edit::field(FlightField::Date, "16/01")],
        )
        .unwrap();
        coordinator.stage(&f.id, request.mutation.clone()).unwrap();
        coordinator.dispatch(request, audit()).unwrap();

        let mut notices = Vec::new();
        let flights = coordinator.wait_idle(&mut notices, WAIT).unwrap();
        assert_eq!(coordinator.pending_count(), 0);
        // time change stays applied, date change never landed
        assert_eq!(flights[0].std, "12:00");
        assert_eq!(flights[0].date, "15/01");
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].kind, NoticeKind::Error);
        assert!(notices[0].message.contains("Time: 10:00-11:00 → 12:00-13:00 was saved"));
    }

    #[test_log::test]
    fn test_failed_delete_clears_pending() {
        let f = flight();
        let store = Arc::new(TimesOnly(DatasetStore::in_memory(FlightDataset::new(vec![
            f.clone(),
        ]))));
        let mut coordinator = UpdateCoordinator::new(store);
        coordinator
            .dispatch(ChangeRequest::delete(&f), audit())
            .unwrap();
        let mut notices = Vec::new();
        let flights = coordinator.wait_idle(&mut notices, WAIT).unwrap();
        assert_eq!(flights.len(), 1);
        assert!(!coordinator.is_pending(&f.id));
        assert_eq!(notices[0].kind, NoticeKind::Error);
    }
}
