use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use chrono::Utc;

use super::{Audit, FlightStore, RegistrationStore};
use crate::error::{Error, Result};
use crate::io::file;
use crate::model::{
    ActivityEntry, Flight, FlightDataset, FlightField, Registration, RegistrationDraft,
    RegistrationStatus,
};

/// Flights, fleet register and activity log kept in memory, optionally
/// mirrored to a JSON file after every mutation.
pub struct DatasetStore {
    data: Mutex<FlightDataset>,
    path: Option<PathBuf>,
}

impl DatasetStore {
    pub fn in_memory(dataset: FlightDataset) -> Self {
        Self {
            data: Mutex::new(dataset),
            path: None,
        }
    }

    /// Open the dataset file at `path`. A missing file is seeded with the
    /// sample fleet and written out.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let dataset = if path.exists() {
            file::load_dataset(&path)?
        } else {
            tracing::info!(path = %path.display(), "no dataset found, seeding sample flights");
            let sample = FlightDataset::sample();
            file::save_dataset(&sample, &path)?;
            sample
        };
        tracing::info!(
            path = %path.display(),
            flights = dataset.flights.len(),
            registrations = dataset.registrations.len(),
            "dataset opened"
        );
        Ok(Self {
            data: Mutex::new(dataset),
            path: Some(path),
        })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn snapshot(&self) -> Result<FlightDataset> {
        Ok(self.lock()?.clone())
    }

    /// Add flights, e.g. from a CSV import. Returns how many were added.
    pub fn append_flights(&self, flights: Vec<Flight>) -> Result<usize> {
        self.mutate(|data| {
            let count = flights.len();
            data.flights.extend(flights);
            Ok(count)
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, FlightDataset>> {
        self.data
            .lock()
            .map_err(|_| Error::Storage("dataset lock poisoned".into()))
    }

    /// Apply `change` to a copy of the dataset and publish the copy only
    /// once it has been saved. On any error the stored dataset is untouched.
    fn mutate<T>(&self, change: impl FnOnce(&mut FlightDataset) -> Result<T>) -> Result<T> {
        let mut data = self.lock()?;
        let mut draft = data.clone();
        let out = change(&mut draft)?;
        draft.touch();
        if let Some(path) = &self.path {
            if let Err(e) = file::save_dataset(&draft, path) {
                tracing::warn!(path = %path.display(), error = %e, "dataset save failed, change discarded");
                return Err(e);
            }
        }
        *data = draft;
        Ok(out)
    }
}

fn record(
    data: &mut FlightDataset,
    flight_id: &str,
    field_name: &str,
    old_value: String,
    new_value: String,
    audit: &Audit,
) {
    data.activity.push(ActivityEntry {
        id: uuid::Uuid::new_v4().to_string(),
        flight_id: Some(flight_id.to_string()),
        field_name: field_name.to_string(),
        old_value,
        new_value,
        changed_by: audit.changed_by.clone(),
        changed_at: Utc::now(),
        reason: audit.reason.clone(),
    });
}

fn find_mut<'a>(data: &'a mut FlightDataset, id: &str) -> Result<&'a mut Flight> {
    data.flights
        .iter_mut()
        .find(|f| f.id == id)
        .ok_or_else(|| Error::NotFound(id.to_string()))
}

fn find_registration_mut<'a>(
    data: &'a mut FlightDataset,
    id: &str,
) -> Result<&'a mut Registration> {
    data.registrations
        .iter_mut()
        .find(|r| r.id == id)
        .ok_or_else(|| Error::NotFound(id.to_string()))
}

/// Tails are unique across the register, ignoring case.
fn ensure_unique_tail(data: &FlightDataset, tail: &str, except_id: Option<&str>) -> Result<()> {
    let taken = data
        .registrations
        .iter()
        .any(|r| Some(r.id.as_str()) != except_id && r.registration.eq_ignore_ascii_case(tail));
    if taken {
        return Err(Error::InvalidValue {
            field: "registration",
            value: tail.to_string(),
        });
    }
    Ok(())
}

impl FlightStore for DatasetStore {
    fn fetch_flights(&self) -> Result<Vec<Flight>> {
        Ok(self.lock()?.flights.clone())
    }

    fn update_flight_times(&self, id: &str, std: &str, sta: &str, audit: &Audit) -> Result<()> {
        self.mutate(|data| {
            let flight = find_mut(data, id)?;
            let (old_std, old_sta) = (flight.std.clone(), flight.sta.clone());
            flight.set_times(std, sta)?;
            record(data, id, "std", old_std, std.to_string(), audit);
            record(data, id, "sta", old_sta, sta.to_string(), audit);
            Ok(())
        })?;
        tracing::info!(flight = id, std, sta, "flight times updated");
        Ok(())
    }

    fn update_field(
        &self,
        id: &str,
        field: FlightField,
        value: &str,
        audit: &Audit,
    ) -> Result<()> {
        self.mutate(|data| {
            let flight = find_mut(data, id)?;
            let old = flight.field_value(field);
            flight.set_field(field, value)?;
            let new = flight.field_value(field);
            record(data, id, field.as_str(), old, new, audit);
            Ok(())
        })?;
        tracing::info!(flight = id, field = field.as_str(), value, "flight field updated");
        Ok(())
    }

    fn delete_flight(&self, id: &str, audit: &Audit) -> Result<()> {
        self.mutate(|data| {
            let flight = find_mut(data, id)?;
            let label = format!("{} ({})", flight.flight_no, flight.registration);
            record(data, id, "flight_deleted", label, "DELETED".into(), audit);
            data.flights.retain(|f| f.id != id);
            // the flight row is gone, keep its history but unlink it
            for entry in data.activity.iter_mut() {
                if entry.flight_id.as_deref() == Some(id) {
                    entry.flight_id = None;
                }
            }
            Ok(())
        })?;
        tracing::info!(flight = id, "flight deleted");
        Ok(())
    }

    fn activity_log(&self, flight_id: Option<&str>) -> Result<Vec<ActivityEntry>> {
        let data = self.lock()?;
        let mut entries: Vec<ActivityEntry> = data
            .activity
            .iter()
            .filter(|e| flight_id.map_or(true, |id| e.flight_id.as_deref() == Some(id)))
            .cloned()
            .collect();
        // reversed first so equal timestamps stay newest first under the stable sort
        entries.reverse();
        entries.sort_by(|a, b| b.changed_at.cmp(&a.changed_at));
        Ok(entries)
    }
}

impl RegistrationStore for DatasetStore {
    fn list_registrations(&self) -> Result<Vec<Registration>> {
        let mut list = self.lock()?.registrations.clone();
        list.sort_by(|a, b| a.registration.cmp(&b.registration));
        Ok(list)
    }

    fn add_registration(&self, draft: &RegistrationDraft) -> Result<Registration> {
        let draft = draft.normalized()?;
        let added = self.mutate(|data| {
            ensure_unique_tail(data, &draft.registration, None)?;
            let registration = draft.into_registration();
            data.registrations.push(registration.clone());
            Ok(registration)
        })?;
        tracing::info!(registration = %added.registration, "registration added");
        Ok(added)
    }

    fn update_registration(&self, id: &str, draft: &RegistrationDraft) -> Result<Registration> {
        let draft = draft.normalized()?;
        let updated = self.mutate(|data| {
            ensure_unique_tail(data, &draft.registration, Some(id))?;
            let entry = find_registration_mut(data, id)?;
            entry.registration = draft.registration;
            entry.status = draft.status;
            entry.aircraft_type = draft.aircraft_type;
            entry.operator = draft.operator;
            entry.updated_at = Utc::now();
            Ok(entry.clone())
        })?;
        tracing::info!(registration = %updated.registration, "registration updated");
        Ok(updated)
    }

    fn set_registration_status(&self, id: &str, status: RegistrationStatus) -> Result<()> {
        self.mutate(|data| {
            let entry = find_registration_mut(data, id)?;
            entry.status = status;
            entry.updated_at = Utc::now();
            Ok(())
        })?;
        tracing::info!(registration = id, status = status.as_str(), "registration status changed");
        Ok(())
    }

    fn delete_registration(&self, id: &str) -> Result<()> {
        self.mutate(|data| {
            let before = data.registrations.len();
            data.registrations.retain(|r| r.id != id);
            if data.registrations.len() == before {
                return Err(Error::NotFound(id.to_string()));
            }
            Ok(())
        })?;
        tracing::info!(registration = id, "registration deleted");
        Ok(())
    }
}
