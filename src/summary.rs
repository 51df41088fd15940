//! Fleet statistics and weekly/monthly roll-ups.

use std::collections::BTreeMap;

use crate::model::{Flight, FlightStatus};
use crate::schedule::layout::date_sort_key;
use crate::schedule::time::{self, MINUTES_PER_DAY};

/// Ground time added to every sector when counting block time.
pub const BLOCK_BUFFER_MINUTES: i32 = 60;

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// English month name for 1-based `month`.
pub fn month_name(month: u32) -> &'static str {
    month
        .checked_sub(1)
        .and_then(|i| MONTH_NAMES.get(i as usize))
        .copied()
        .unwrap_or("Unknown")
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DashboardStats {
    pub total: usize,
    pub operational: usize,
    pub aog: usize,
    pub total_capacity: u64,
    pub capacity_used: u64,
    /// Rounded percentage; 0 without capacity.
    pub utilization: u32,
}

impl DashboardStats {
    pub fn compute(flights: &[Flight]) -> Self {
        let total_capacity: u64 = flights.iter().map(|f| u64::from(f.total_capacity)).sum();
        let capacity_used: u64 = flights.iter().map(|f| u64::from(f.capacity_used)).sum();
        let utilization = if total_capacity > 0 {
            (capacity_used as f64 / total_capacity as f64 * 100.0).round() as u32
        } else {
            0
        };
        Self {
            total: flights.len(),
            operational: flights
                .iter()
                .filter(|f| f.status == FlightStatus::Operational)
                .count(),
            aog: flights.iter().filter(|f| f.status == FlightStatus::Aog).count(),
            total_capacity,
            capacity_used,
            utilization,
        }
    }
}

/// Block minutes for one sector: airborne time plus the ground buffer.
/// Equal times count as no airborne time here; malformed times count as 0.
pub fn block_minutes(std: &str, sta: &str) -> i32 {
    let (Ok(start), Ok(mut end)) = (time::parse_time(std), time::parse_time(sta)) else {
        return 0;
    };
    if end < start {
        end += MINUTES_PER_DAY;
    }
    end - start + BLOCK_BUFFER_MINUTES
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    Week,
    Month,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PeriodSummary {
    /// Week or month number.
    pub period: u32,
    pub flights: usize,
    pub revenue: f64,
    /// Registrations in first-seen order.
    pub aircraft: Vec<String>,
    /// Flights grouped by date label, dates in calendar order.
    pub by_date: Vec<(String, Vec<Flight>)>,
    pub block_minutes: i32,
}

impl PeriodSummary {
    pub fn unique_aircraft(&self) -> usize {
        self.aircraft.len()
    }

    fn new(period: u32) -> Self {
        Self {
            period,
            flights: 0,
            revenue: 0.0,
            aircraft: Vec::new(),
            by_date: Vec::new(),
            block_minutes: 0,
        }
    }

    fn add(&mut self, flight: &Flight) {
        self.flights += 1;
        self.revenue += flight.revenue;
        if !self.aircraft.contains(&flight.registration) {
            self.aircraft.push(flight.registration.clone());
        }
        match self.by_date.iter_mut().find(|(d, _)| *d == flight.date) {
            Some((_, list)) => list.push(flight.clone()),
            None => self.by_date.push((flight.date.clone(), vec![flight.clone()])),
        }
        self.block_minutes += block_minutes(&flight.std, &flight.sta);
    }
}

/// One summary per week or month present in `flights`, ascending.
pub fn summarize(flights: &[Flight], period: Period) -> Vec<PeriodSummary> {
    let mut map: BTreeMap<u32, PeriodSummary> = BTreeMap::new();
    for flight in flights {
        let key = match period {
            Period::Week => flight.week_number,
            Period::Month => flight.month_number,
        };
        map.entry(key)
            .or_insert_with(|| PeriodSummary::new(key))
            .add(flight);
    }
    map.into_values()
        .map(|mut s| {
            s.by_date.sort_by_key(|(d, _)| date_sort_key(d));
            s
        })
        .collect()
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SummaryTotals {
    pub flights: usize,
    pub revenue: f64,
    /// Largest fleet used in any single period.
    pub max_aircraft: usize,
    pub block_hours: i32,
    pub block_mins: i32,
}

pub fn totals(summaries: &[PeriodSummary]) -> SummaryTotals {
    let block: i32 = summaries.iter().map(|s| s.block_minutes).sum();
    SummaryTotals {
        flights: summaries.iter().map(|s| s.flights).sum(),
        revenue: summaries.iter().map(|s| s.revenue).sum(),
        max_aircraft: summaries
            .iter()
            .map(PeriodSummary::unique_aircraft)
            .max()
            .unwrap_or(0),
        block_hours: block / 60,
        block_mins: block % 60,
    }
}
