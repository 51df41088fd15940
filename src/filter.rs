//! Flight list filtering for the side panel and the timeline.

use std::collections::BTreeSet;

use crate::model::{Flight, FlightStatus, FlightType};
use crate::schedule::layout::sorted_dates;

/// Filter panel state. Empty fields match everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlightFilter {
    /// Case-insensitive match on flight number or operator.
    pub search: String,
    pub registration: Option<String>,
    pub statuses: Vec<FlightStatus>,
    pub flight_types: Vec<FlightType>,
    pub operator: Option<String>,
    pub client: Option<String>,
}

impl FlightFilter {
    pub fn matches(&self, flight: &Flight) -> bool {
        let search = self.search.trim().to_lowercase();
        if !search.is_empty()
            && !flight.flight_no.to_lowercase().contains(&search)
            && !flight.operator.to_lowercase().contains(&search)
        {
            return false;
        }
        if self
            .registration
            .as_ref()
            .is_some_and(|r| *r != flight.registration)
        {
            return false;
        }
        if !self.statuses.is_empty() && !self.statuses.contains(&flight.status) {
            return false;
        }
        if !self.flight_types.is_empty() && !self.flight_types.contains(&flight.flight_type) {
            return false;
        }
        if self.operator.as_ref().is_some_and(|o| *o != flight.operator) {
            return false;
        }
        !self.client.as_ref().is_some_and(|c| *c != flight.client_name)
    }

    pub fn apply(&self, flights: &[Flight]) -> Vec<Flight> {
        flights.iter().filter(|f| self.matches(f)).cloned().collect()
    }

    pub fn is_active(&self) -> bool {
        self.active_count() > 0
    }

    /// Number of criteria currently narrowing the list.
    pub fn active_count(&self) -> usize {
        [
            !self.search.trim().is_empty(),
            self.registration.is_some(),
            !self.statuses.is_empty(),
            !self.flight_types.is_empty(),
            self.operator.is_some(),
            self.client.is_some(),
        ]
        .into_iter()
        .filter(|on| *on)
        .count()
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn toggle_status(&mut self, status: FlightStatus) {
        toggle(&mut self.statuses, status);
    }

    pub fn toggle_flight_type(&mut self, flight_type: FlightType) {
        toggle(&mut self.flight_types, flight_type);
    }
}

fn toggle<T: PartialEq>(items: &mut Vec<T>, item: T) {
    if let Some(pos) = items.iter().position(|i| *i == item) {
        items.remove(pos);
    } else {
        items.push(item);
    }
}

fn unique_sorted<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    values
        .filter(|v| !v.trim().is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}

pub fn registrations(flights: &[Flight]) -> Vec<String> {
    unique_sorted(flights.iter().map(|f| f.registration.as_str()))
}

pub fn operators(flights: &[Flight]) -> Vec<String> {
    unique_sorted(flights.iter().map(|f| f.operator.as_str()))
}

pub fn clients(flights: &[Flight]) -> Vec<String> {
    unique_sorted(flights.iter().map(|f| f.client_name.as_str()))
}

/// Week and date selection of the timeline view.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TimelineFilter {
    pub week: Option<u32>,
    pub date: Option<String>,
}

impl TimelineFilter {
    pub fn matches(&self, flight: &Flight) -> bool {
        self.week.map_or(true, |w| flight.week_number == w)
            && self.date.as_ref().map_or(true, |d| *d == flight.date)
    }

    pub fn apply(&self, flights: &[Flight]) -> Vec<Flight> {
        flights.iter().filter(|f| self.matches(f)).cloned().collect()
    }
}

pub fn available_weeks(flights: &[Flight]) -> Vec<u32> {
    flights
        .iter()
        .map(|f| f.week_number)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Date labels present in `flights`, in calendar order.
pub fn available_dates(flights: &[Flight]) -> Vec<String> {
    sorted_dates(flights.iter().map(|f| f.date.as_str()))
}
