//! Persistence collaborator used by the schedule engine.
//!
//! All flight mutations go through [`FlightStore`]; the engine never edits
//! the flight list it displays. After a mutation the caller refetches.
//! The fleet register is kept behind [`RegistrationStore`].

mod dataset;

pub use dataset::DatasetStore;

use crate::error::Result;
use crate::model::{
    ActivityEntry, Flight, FlightField, Registration, RegistrationDraft, RegistrationStatus,
};

/// Who made a change and why.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Audit {
    pub changed_by: String,
    pub reason: Option<String>,
}

impl Audit {
    /// An empty or blank reason is recorded as no reason.
    pub fn new(changed_by: impl Into<String>, reason: &str) -> Self {
        let reason = reason.trim();
        Self {
            changed_by: changed_by.into(),
            reason: (!reason.is_empty()).then(|| reason.to_string()),
        }
    }
}

pub trait FlightStore: Send + Sync {
    fn fetch_flights(&self) -> Result<Vec<Flight>>;

    fn update_flight_times(&self, id: &str, std: &str, sta: &str, audit: &Audit) -> Result<()>;

    fn update_field(&self, id: &str, field: FlightField, value: &str, audit: &Audit)
        -> Result<()>;

    fn delete_flight(&self, id: &str, audit: &Audit) -> Result<()>;

    /// Activity entries, newest first, optionally for a single flight.
    fn activity_log(&self, flight_id: Option<&str>) -> Result<Vec<ActivityEntry>>;
}

/// Aircraft register. Tails are unique ignoring case and stored upper case.
pub trait RegistrationStore: Send + Sync {
    /// All registrations, sorted by tail.
    fn list_registrations(&self) -> Result<Vec<Registration>>;

    fn add_registration(&self, draft: &RegistrationDraft) -> Result<Registration>;

    fn update_registration(&self, id: &str, draft: &RegistrationDraft) -> Result<Registration>;

    fn set_registration_status(&self, id: &str, status: RegistrationStatus) -> Result<()>;

    fn delete_registration(&self, id: &str) -> Result<()>;
}
