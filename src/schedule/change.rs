//! Field-level edits and the human-readable summaries shown before they are saved.

use crate::error::Result;
use crate::model::{Flight, FlightField};
use crate::schedule::layout::CellKey;
use crate::schedule::time;

/// One persisted modification of a flight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Edit {
    Times { std: String, sta: String },
    Field { field: FlightField, value: String },
}

impl Edit {
    pub fn field(field: FlightField, value: impl Into<String>) -> Self {
        Edit::Field {
            field,
            value: value.into(),
        }
    }

    pub fn apply(&self, flight: &mut Flight) -> Result<()> {
        match self {
            Edit::Times { std, sta } => flight.set_times(std, sta),
            Edit::Field { field, value } => flight.set_field(*field, value),
        }
    }

    /// True when applying the edit would leave `flight` unchanged.
    pub fn is_noop(&self, flight: &Flight) -> bool {
        match self {
            Edit::Times { std, sta } => *std == flight.std && *sta == flight.sta,
            Edit::Field { field, value } => flight.field_value(*field) == value.trim(),
        }
    }

    /// `Time: 10:00-11:00 → 12:00-13:00` style summary against `before`.
    pub fn describe(&self, before: &Flight) -> String {
        match self {
            Edit::Times { std, sta } => format!(
                "Time: {}-{} → {}-{}",
                before.std, before.sta, std, sta
            ),
            Edit::Field { field, value } => format!(
                "{}: {} → {}",
                field.label(),
                before.field_value(*field),
                value
            ),
        }
    }

    /// Persistence order inside one commit: time, date, registration, rest.
    fn rank(&self) -> u8 {
        match self {
            Edit::Times { .. } => 0,
            Edit::Field {
                field: FlightField::Date,
                ..
            } => 1,
            Edit::Field {
                field: FlightField::Registration,
                ..
            } => 2,
            Edit::Field { .. } => 3,
        }
    }
}

/// What a confirmed change request will do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    Edit(Vec<Edit>),
    Delete,
}

/// Drop no-op edits and put the rest in persistence order.
pub fn normalize(flight: &Flight, edits: Vec<Edit>) -> Vec<Edit> {
    let mut kept: Vec<Edit> = edits.into_iter().filter(|e| !e.is_noop(flight)).collect();
    kept.sort_by_key(Edit::rank);
    kept
}

/// Edits produced by dropping `flight` on `target` after moving it by
/// `delta_minutes`. Only what actually differs is included.
pub fn reschedule(flight: &Flight, delta_minutes: i32, target: &CellKey) -> Result<Vec<Edit>> {
    let edits = vec![
        Edit::Times {
            std: time::shift_time(&flight.std, delta_minutes)?,
            sta: time::shift_time(&flight.sta, delta_minutes)?,
        },
        Edit::field(FlightField::Date, target.date.clone()),
        Edit::field(FlightField::Registration, target.registration.clone()),
    ];
    Ok(normalize(flight, edits))
}

/// Apply `edits` to a copy of `flight`.
pub fn preview(flight: &Flight, edits: &[Edit]) -> Result<Flight> {
    let mut next = flight.clone();
    for edit in edits {
        edit.apply(&mut next)?;
    }
    Ok(next)
}
