use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::flight::{Flight, FlightPositioning, FlightStatus, FlightType};
use super::registration::{Registration, RegistrationDraft, RegistrationStatus};

/// One audited change to a flight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityEntry {
    pub id: String,
    /// `None` once the flight itself has been deleted.
    pub flight_id: Option<String>,
    pub field_name: String,
    pub old_value: String,
    pub new_value: String,
    pub changed_by: String,
    pub changed_at: DateTime<Utc>,
    pub reason: Option<String>,
}

/// The flight table, fleet register and activity log, as saved to disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlightDataset {
    pub flights: Vec<Flight>,
    #[serde(default)]
    pub registrations: Vec<Registration>,
    #[serde(default)]
    pub activity: Vec<ActivityEntry>,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
}

impl Default for FlightDataset {
    fn default() -> Self {
        Self {
            flights: Vec::new(),
            registrations: Vec::new(),
            activity: Vec::new(),
            created: Utc::now(),
            modified: Utc::now(),
        }
    }
}

impl FlightDataset {
    pub fn new(flights: Vec<Flight>) -> Self {
        Self {
            flights,
            ..Default::default()
        }
    }

    /// Touch the modified timestamp.
    pub fn touch(&mut self) {
        self.modified = Utc::now();
    }

    /// Demonstration fleet for a first run: three aircraft over three days,
    /// with overlapping rotations and an overnight sector.
    pub fn sample() -> Self {
        #[rustfmt::skip]
        let rows: &[(&str, &str, &str, &str, &str, &str, &str, &str, FlightType, FlightStatus, FlightPositioning, f64)] = &[
            ("ROM101", "YR-ABC", "15/01", "Monday",    "06:00", "09:15", "OTP", "LEJ", FlightType::Schedule, FlightStatus::Operational, FlightPositioning::LiveFlight,  42_000.0),
            ("ROM102", "YR-ABC", "15/01", "Monday",    "08:30", "10:00", "LEJ", "CGN", FlightType::Charter,  FlightStatus::Operational, FlightPositioning::FerryFlight,      0.0),
            ("ROM103", "YR-ABC", "15/01", "Monday",    "22:40", "01:10", "CGN", "OTP", FlightType::Schedule, FlightStatus::Operational, FlightPositioning::LiveFlight,  38_500.0),
            ("ROM104", "YR-ABC", "16/01", "Tuesday",   "10:00", "11:00", "OTP", "IST", FlightType::Acmi,     FlightStatus::Operational, FlightPositioning::LiveFlight,  27_000.0),
            ("ATC201", "ER-BAJ", "15/01", "Monday",    "09:15", "14:30", "KIV", "DXB", FlightType::Charter,  FlightStatus::Operational, FlightPositioning::LiveFlight,  69_000.0),
            ("ATC202", "ER-BAJ", "16/01", "Tuesday",   "02:00", "07:20", "DXB", "KIV", FlightType::Charter,  FlightStatus::Operational, FlightPositioning::LiveFlight,  64_000.0),
            ("ATC203", "ER-BAJ", "16/01", "Tuesday",   "05:30", "06:45", "DXB", "SHJ", FlightType::Adhoc,    FlightStatus::Operational, FlightPositioning::SpareFlight,  9_500.0),
            ("ATC204", "ER-BAJ", "17/01", "Wednesday", "13:00", "18:10", "KIV", "FRA", FlightType::Schedule, FlightStatus::Operational, FlightPositioning::LiveFlight,  51_000.0),
            ("OAR301", "LZ-CGW", "16/01", "Tuesday",   "00:00", "00:00", "SOF", "SOF", FlightType::Maintenance, FlightStatus::Aog,      FlightPositioning::FerryFlight,      0.0),
            ("OAR302", "LZ-CGW", "17/01", "Wednesday", "11:00", "13:45", "SOF", "MXP", FlightType::Acmi,     FlightStatus::Maintenance, FlightPositioning::LiveFlight,      0.0),
            ("OAR303", "LZ-CGW", "17/01", "Wednesday", "12:30", "15:00", "MXP", "SOF", FlightType::Acmi,     FlightStatus::Cancelled,   FlightPositioning::LiveFlight,      0.0),
        ];

        let flights = rows
            .iter()
            .enumerate()
            .map(|(i, row)| {
                let (flight_no, reg, date, day, std, sta, adep, ades, flight_type, status, positioning, revenue) = *row;
                let operator = match reg {
                    "YR-ABC" => "Romcargo",
                    "ER-BAJ" => "Aerotranscargo",
                    _ => "One Air",
                };
                let total_capacity = 100 + (i as u32 % 3) * 20;
                let capacity_used = if revenue > 0.0 { total_capacity * 3 / 4 } else { 0 };
                Flight {
                    id: uuid::Uuid::new_v4().to_string(),
                    flight_no: flight_no.to_string(),
                    registration: reg.to_string(),
                    date: date.to_string(),
                    week_number: 3,
                    month_number: 1,
                    day: day.to_string(),
                    std: std.to_string(),
                    sta: sta.to_string(),
                    adep: adep.to_string(),
                    ades: ades.to_string(),
                    status,
                    flight_type,
                    flight_positioning: positioning,
                    operator: operator.to_string(),
                    client_name: format!("{operator} Logistics"),
                    contract_id: format!("CTR-2025-{:03}", i + 1),
                    revenue,
                    total_capacity,
                    capacity_used,
                    capacity_available: total_capacity - capacity_used,
                }
            })
            .collect();

        #[rustfmt::skip]
        let fleet = [
            ("YR-ABC", "B747", "Romcargo"),
            ("ER-BAJ", "B747", "Aerotranscargo"),
            ("LZ-CGW", "B777", "One Air"),
        ];
        let registrations = fleet
            .iter()
            .map(|(tail, aircraft_type, operator)| {
                RegistrationDraft {
                    registration: tail.to_string(),
                    status: RegistrationStatus::Active,
                    aircraft_type: aircraft_type.to_string(),
                    operator: operator.to_string(),
                }
                .into_registration()
            })
            .collect();

        Self {
            registrations,
            ..Self::new(flights)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::time;

    #[test]
    fn test_sample_times_are_well_formed() {
        let sample = FlightDataset::sample();
        assert!(!sample.flights.is_empty());
        for f in &sample.flights {
            assert!(time::duration(&f.std, &f.sta).is_ok(), "{}", f.flight_no);
            assert_eq!(f.capacity_used + f.capacity_available, f.total_capacity);
            assert!(
                sample.registrations.iter().any(|r| r.registration == f.registration),
                "{} flies an unregistered tail",
                f.flight_no
            );
        }
    }

    #[test]
    fn test_dataset_without_registrations_still_loads() {
        let json = r#"{"flights":[],"created":"2025-01-15T00:00:00Z","modified":"2025-01-15T00:00:00Z"}"#;
        let ds: FlightDataset = serde_json::from_str(json).unwrap();
        assert!(ds.registrations.is_empty());
        assert!(ds.activity.is_empty());
    }

    #[test]
    fn test_dataset_json_round_trip_keeps_activity() {
        let mut ds = FlightDataset::sample();
        ds.activity.push(ActivityEntry {
            id: "1".into(),
            flight_id: Some(ds.flights[0].id.clone()),
            field_name: "std".into(),
            old_value: "06:00".into(),
            new_value: "07:00".into(),
            changed_by: "ops".into(),
            changed_at: Utc::now(),
            reason: Some("Weather".into()),
        });
        let json = serde_json::to_string(&ds).unwrap();
        let back: FlightDataset = serde_json::from_str(&json).unwrap();
        assert_eq!(back.flights, ds.flights);
        assert_eq!(back.activity, ds.activity);
    }
}
