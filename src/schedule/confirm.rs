//! Confirmation of committed changes before they are persisted.

use crate::error::{Error, Result};
use crate::model::Flight;
use crate::schedule::change::{Edit, Mutation};

/// Standard delay/change reasons offered by the reason dialog.
pub const REASONS: &[&str] = &[
    "Passenger and Baggage",
    "Cargo and Mail",
    "Aircraft and Ramp Handling",
    "Technical and Aircraft Equipment",
    "Damage to Aircraft & EDP/Automated Equipment Failure",
    "Flight Operations and Crewing",
    "Weather",
    "ATFM + AIRPORT + GOVERNMENTAL AUTHORITIES",
    "AIR TRAFFIC FLOW MANAGEMENT RESTRICTIONS",
    "AIRPORT AND GOVERNMENTAL AUTHORITIES",
    "Reactionary",
    "Miscellaneous",
    OTHER_REASON,
];

/// Selecting this reason requires free text.
pub const OTHER_REASON: &str = "Other";

/// Reason text for a dialog selection, or `None` while it is incomplete.
pub fn resolve_reason(selected: Option<&str>, custom: &str) -> Option<String> {
    match selected? {
        OTHER_REASON => {
            let custom = custom.trim();
            (!custom.is_empty()).then(|| custom.to_string())
        }
        reason => Some(reason.to_string()),
    }
}

/// A change waiting for the user's confirmation.
#[derive(Debug, Clone, PartialEq)]
pub struct ChangeRequest {
    pub flight_id: String,
    pub flight_no: String,
    /// One human-readable line per change.
    pub changes: Vec<String>,
    pub mutation: Mutation,
}

impl ChangeRequest {
    /// Request for `edits` against `flight`; `None` when nothing would change.
    pub fn edit(flight: &Flight, edits: Vec<Edit>) -> Option<Self> {
        if edits.is_empty() {
            return None;
        }
        Some(Self {
            flight_id: flight.id.clone(),
            flight_no: flight.flight_no.clone(),
            changes: edits.iter().map(|e| e.describe(flight)).collect(),
            mutation: Mutation::Edit(edits),
        })
    }

    pub fn delete(flight: &Flight) -> Self {
        Self {
            flight_id: flight.id.clone(),
            flight_no: flight.flight_no.clone(),
            changes: vec![format!(
                "Delete flight {} ({})",
                flight.flight_no, flight.registration
            )],
            mutation: Mutation::Delete,
        }
    }

    pub fn description(&self) -> String {
        self.changes.join(", ")
    }

    pub fn edits(&self) -> &[Edit] {
        match &self.mutation {
            Mutation::Edit(edits) => edits,
            Mutation::Delete => &[],
        }
    }

    pub fn is_delete(&self) -> bool {
        self.mutation == Mutation::Delete
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
enum State {
    #[default]
    Closed,
    Open(ChangeRequest),
}

/// `Closed → Open(request) → Closed`. One request at a time.
#[derive(Debug, Clone, Default)]
pub struct ConfirmationWorkflow {
    state: State,
}

impl ConfirmationWorkflow {
    pub fn open(&mut self, request: ChangeRequest) -> Result<()> {
        if self.is_open() {
            return Err(Error::RequestOpen);
        }
        tracing::debug!(flight = %request.flight_no, change = %request.description(), "awaiting confirmation");
        self.state = State::Open(request);
        Ok(())
    }

    pub fn is_open(&self) -> bool {
        matches!(self.state, State::Open(_))
    }

    pub fn current(&self) -> Option<&ChangeRequest> {
        match &self.state {
            State::Open(request) => Some(request),
            State::Closed => None,
        }
    }

    /// Close with a reason; returns the request to execute. An empty reason
    /// is accepted.
    pub fn confirm(&mut self, reason: &str) -> Option<(ChangeRequest, String)> {
        match std::mem::take(&mut self.state) {
            State::Open(request) => Some((request, reason.trim().to_string())),
            State::Closed => None,
        }
    }

    /// Close without executing; returns the discarded request.
    pub fn cancel(&mut self) -> Option<ChangeRequest> {
        match std::mem::take(&mut self.state) {
            State::Open(request) => {
                tracing::debug!(flight = %request.flight_no, "change discarded");
                Some(request)
            }
            State::Closed => None,
        }
    }
}
