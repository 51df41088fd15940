//! Greedy interval partitioning of the flights in one (registration, date) cell.

use crate::error::Result;
use crate::model::Flight;
use crate::schedule::time;

/// Lane placement for every flight of a group.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LaneAssignment {
    /// `(flight id, lane)` in departure order.
    pub slots: Vec<(String, usize)>,
    /// Number of lanes the group occupies; at least 1 for a non-empty group.
    pub lane_count: usize,
}

impl LaneAssignment {
    pub fn lane_of(&self, flight_id: &str) -> Option<usize> {
        self.slots
            .iter()
            .find(|(id, _)| id == flight_id)
            .map(|(_, lane)| *lane)
    }
}

/// Assign each flight the first lane that is free at its departure.
///
/// Flights are sorted by STD (stable, so equal departures keep their input
/// order). A lane is free when its busy-until is at or before the departure.
/// Overlapping flights never share a lane; the packing is not guaranteed to be
/// minimal.
pub fn assign_lanes(flights: &[&Flight]) -> Result<LaneAssignment> {
    let mut ordered: Vec<&Flight> = flights.to_vec();
    ordered.sort_by(|a, b| a.std.cmp(&b.std));

    let mut lane_end_times: Vec<i32> = Vec::new();
    let mut slots = Vec::with_capacity(ordered.len());

    for flight in ordered {
        let (start, end) = time::interval(&flight.std, &flight.sta)?;
        let lane = match lane_end_times.iter().position(|&busy_until| busy_until <= start) {
            Some(free) => free,
            None => {
                lane_end_times.push(0);
                lane_end_times.len() - 1
            }
        };
        lane_end_times[lane] = end;
        slots.push((flight.id.clone(), lane));
    }

    Ok(LaneAssignment {
        slots,
        lane_count: lane_end_times.len(),
    })
}
