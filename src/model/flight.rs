use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::schedule::time;

/// Operational status of the aircraft flying a rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlightStatus {
    Operational,
    Aog,
    Maintenance,
    Cancelled,
}

impl FlightStatus {
    pub fn all() -> &'static [FlightStatus] {
        &[
            FlightStatus::Operational,
            FlightStatus::Aog,
            FlightStatus::Maintenance,
            FlightStatus::Cancelled,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FlightStatus::Operational => "operational",
            FlightStatus::Aog => "aog",
            FlightStatus::Maintenance => "maintenance",
            FlightStatus::Cancelled => "cancelled",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            FlightStatus::Operational => "Operational",
            FlightStatus::Aog => "AOG",
            FlightStatus::Maintenance => "Maintenance",
            FlightStatus::Cancelled => "Cancelled",
        }
    }
}

impl FromStr for FlightStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "operational" => Ok(FlightStatus::Operational),
            "aog" => Ok(FlightStatus::Aog),
            "maintenance" => Ok(FlightStatus::Maintenance),
            "cancelled" | "canceled" => Ok(FlightStatus::Cancelled),
            _ => Err(Error::InvalidValue {
                field: "status",
                value: s.to_string(),
            }),
        }
    }
}

/// Commercial category of a flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlightType {
    Charter,
    Schedule,
    Acmi,
    Maintenance,
    Adhoc,
}

impl FlightType {
    pub fn all() -> &'static [FlightType] {
        &[
            FlightType::Charter,
            FlightType::Schedule,
            FlightType::Acmi,
            FlightType::Maintenance,
            FlightType::Adhoc,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FlightType::Charter => "charter",
            FlightType::Schedule => "schedule",
            FlightType::Acmi => "acmi",
            FlightType::Maintenance => "maintenance",
            FlightType::Adhoc => "adhoc",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            FlightType::Charter => "Charter",
            FlightType::Schedule => "Schedule",
            FlightType::Acmi => "ACMI",
            FlightType::Maintenance => "Maintenance",
            FlightType::Adhoc => "Ad hoc",
        }
    }
}

impl FromStr for FlightType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().replace([' ', '-', '_'], "").as_str() {
            "charter" => Ok(FlightType::Charter),
            "schedule" | "scheduled" => Ok(FlightType::Schedule),
            "acmi" => Ok(FlightType::Acmi),
            "maintenance" => Ok(FlightType::Maintenance),
            "adhoc" => Ok(FlightType::Adhoc),
            _ => Err(Error::InvalidValue {
                field: "flight type",
                value: s.to_string(),
            }),
        }
    }
}

/// Whether the rotation carries revenue cargo or just moves the aircraft.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlightPositioning {
    #[default]
    LiveFlight,
    FerryFlight,
    SpareFlight,
}

impl FlightPositioning {
    pub fn all() -> &'static [FlightPositioning] {
        &[
            FlightPositioning::LiveFlight,
            FlightPositioning::FerryFlight,
            FlightPositioning::SpareFlight,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FlightPositioning::LiveFlight => "live_flight",
            FlightPositioning::FerryFlight => "ferry_flight",
            FlightPositioning::SpareFlight => "spare_flight",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            FlightPositioning::LiveFlight => "Live flight",
            FlightPositioning::FerryFlight => "Ferry flight",
            FlightPositioning::SpareFlight => "Spare flight",
        }
    }
}

impl FromStr for FlightPositioning {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().replace([' ', '-'], "_").as_str() {
            "live_flight" | "live" => Ok(FlightPositioning::LiveFlight),
            "ferry_flight" | "ferry" => Ok(FlightPositioning::FerryFlight),
            "spare_flight" | "spare" => Ok(FlightPositioning::SpareFlight),
            _ => Err(Error::InvalidValue {
                field: "positioning",
                value: s.to_string(),
            }),
        }
    }
}

/// Fields the persistence layer can update one at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FlightField {
    Registration,
    FlightNo,
    Status,
    FlightType,
    WeekNumber,
    Date,
    FlightPositioning,
    Adep,
    Ades,
}

impl FlightField {
    /// Column name written to the activity log.
    pub fn as_str(&self) -> &'static str {
        match self {
            FlightField::Registration => "registration",
            FlightField::FlightNo => "flightNo",
            FlightField::Status => "status",
            FlightField::FlightType => "flightType",
            FlightField::WeekNumber => "weekNumber",
            FlightField::Date => "date",
            FlightField::FlightPositioning => "flightPositioning",
            FlightField::Adep => "adep",
            FlightField::Ades => "ades",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            FlightField::Registration => "Registration",
            FlightField::FlightNo => "Flight No",
            FlightField::Status => "Status",
            FlightField::FlightType => "Flight Type",
            FlightField::WeekNumber => "Week",
            FlightField::Date => "Date",
            FlightField::FlightPositioning => "Positioning",
            FlightField::Adep => "ADEP",
            FlightField::Ades => "ADES",
        }
    }
}

impl fmt::Display for FlightField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A single scheduled cargo rotation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Flight {
    pub id: String,
    pub flight_no: String,
    /// Aircraft tail number; the row key of the timeline.
    pub registration: String,
    /// Calendar day label, e.g. `15/01`.
    pub date: String,
    pub week_number: u32,
    #[serde(default = "default_month")]
    pub month_number: u32,
    /// Weekday name.
    #[serde(default)]
    pub day: String,
    /// Scheduled departure, `HH:MM` local.
    pub std: String,
    /// Scheduled arrival, `HH:MM` local. Earlier than `std` means overnight.
    pub sta: String,
    pub adep: String,
    #[serde(default)]
    pub ades: String,
    pub status: FlightStatus,
    pub flight_type: FlightType,
    #[serde(default)]
    pub flight_positioning: FlightPositioning,
    #[serde(default)]
    pub operator: String,
    #[serde(default)]
    pub client_name: String,
    #[serde(default)]
    pub contract_id: String,
    #[serde(default)]
    pub revenue: f64,
    #[serde(default)]
    pub total_capacity: u32,
    #[serde(default)]
    pub capacity_used: u32,
    #[serde(default)]
    pub capacity_available: u32,
}

fn default_month() -> u32 {
    1
}

impl Flight {
    /// Create a flight with validated times and neutral commercial fields.
    pub fn new(
        flight_no: impl Into<String>,
        registration: impl Into<String>,
        date: impl Into<String>,
        std: &str,
        sta: &str,
    ) -> Result<Self> {
        time::parse_time(std)?;
        time::parse_time(sta)?;
        Ok(Self {
            id: uuid::Uuid::new_v4().to_string(),
            flight_no: flight_no.into(),
            registration: registration.into(),
            date: date.into(),
            week_number: 1,
            month_number: 1,
            day: String::new(),
            std: std.to_string(),
            sta: sta.to_string(),
            adep: String::new(),
            ades: String::new(),
            status: FlightStatus::Operational,
            flight_type: FlightType::Schedule,
            flight_positioning: FlightPositioning::LiveFlight,
            operator: String::new(),
            client_name: String::new(),
            contract_id: String::new(),
            revenue: 0.0,
            total_capacity: 0,
            capacity_used: 0,
            capacity_available: 0,
        })
    }

    /// Block duration in minutes; overnight aware.
    pub fn duration_minutes(&self) -> Result<i32> {
        time::duration(&self.std, &self.sta)
    }

    /// Current value of an updatable field, rendered as text.
    pub fn field_value(&self, field: FlightField) -> String {
        match field {
            FlightField::Registration => self.registration.clone(),
            FlightField::FlightNo => self.flight_no.clone(),
            FlightField::Status => self.status.as_str().to_string(),
            FlightField::FlightType => self.flight_type.as_str().to_string(),
            FlightField::WeekNumber => self.week_number.to_string(),
            FlightField::Date => self.date.clone(),
            FlightField::FlightPositioning => self.flight_positioning.as_str().to_string(),
            FlightField::Adep => self.adep.clone(),
            FlightField::Ades => self.ades.clone(),
        }
    }

    /// Parse `value` for `field` and assign it.
    pub fn set_field(&mut self, field: FlightField, value: &str) -> Result<()> {
        match field {
            FlightField::Registration => self.registration = required("registration", value)?,
            FlightField::FlightNo => self.flight_no = required("flight number", value)?,
            FlightField::Status => self.status = value.parse()?,
            FlightField::FlightType => self.flight_type = value.parse()?,
            FlightField::WeekNumber => {
                self.week_number = value.trim().parse().map_err(|_| Error::InvalidValue {
                    field: "week number",
                    value: value.to_string(),
                })?
            }
            FlightField::Date => self.date = required("date", value)?,
            FlightField::FlightPositioning => self.flight_positioning = value.parse()?,
            FlightField::Adep => self.adep = value.trim().to_string(),
            FlightField::Ades => self.ades = value.trim().to_string(),
        }
        Ok(())
    }

    /// Replace both scheduled times after validating them.
    pub fn set_times(&mut self, std: &str, sta: &str) -> Result<()> {
        time::parse_time(std)?;
        time::parse_time(sta)?;
        self.std = std.to_string();
        self.sta = sta.to_string();
        Ok(())
    }
}

/// Trimmed `value`, which must not be blank; these fields key timeline rows
/// and columns.
fn required(field: &'static str, value: &str) -> Result<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(Error::InvalidValue {
            field,
            value: value.to_string(),
        });
    }
    Ok(value.to_string())
}
